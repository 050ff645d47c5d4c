use petri_reach_lib::net::{
    ids::PlaceId, initialized::InitializedNet, marking::Marking, pnml::parse_pnml,
};

fn wrap(page: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<pnml>
  <net id="net" type="http://www.pnml.org/version-2009/grammar/ptnet">
    <page id="page">
{}
    </page>
  </net>
</pnml>"#,
        page
    )
}

#[test]
fn load_token_ring_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/token_ring.pnml");
    let net = InitializedNet::from_file(path).unwrap();

    assert_eq!(net.net.place_names(), ["idle", "busy"]);
    assert_eq!(net.initial_marking, Marking::from(vec![1, 0]));
    assert_eq!(net.net.transition_count(), 2);
    assert_eq!(net.net.place_by_name("busy"), Some(PlaceId::new(1)));
    assert_eq!(net.net.place_by_name("missing"), None);

    let start = net.net.transition_by_name("start").unwrap();
    let finish = net.net.transition_by_name("finish").unwrap();
    assert_eq!(net.net.transition(start).unwrap().pre(), [1, 0]);
    assert_eq!(net.net.transition(start).unwrap().post(), [0, 1]);
    assert_eq!(net.net.transition(finish).unwrap().pre(), [0, 1]);
    assert_eq!(net.net.transition(finish).unwrap().post(), [1, 0]);
}

#[test]
fn multiple_arcs_to_one_transition() {
    let net = parse_pnml(&wrap(
        r#"
      <place id="a"><initialMarking><text>3</text></initialMarking></place>
      <place id="b"/>
      <place id="c"/>
      <transition id="t"/>
      <arc id="e1" source="a" target="t"><inscription><text>2</text></inscription></arc>
      <arc id="e2" source="t" target="b"/>
      <arc id="e3" source="t" target="c"><inscription><text>4</text></inscription></arc>
"#,
    ))
    .unwrap();

    let transition = &net.net.transitions()[0];
    assert_eq!(transition.pre(), [2, 0, 0]);
    assert_eq!(transition.post(), [0, 1, 4]);
    assert_eq!(net.initial_marking, Marking::from(vec![3, 0, 0]));
}

#[test]
fn empty_net() {
    let net = parse_pnml(&wrap("")).unwrap();

    assert_eq!(net.net.place_count(), 0);
    assert_eq!(net.net.transition_count(), 0);
}

#[test]
fn negative_initial_marking() {
    let result = parse_pnml(&wrap(
        r#"<place id="a"><initialMarking><text>-1</text></initialMarking></place>"#,
    ));

    assert!(result.is_err());
}

#[test]
fn duplicate_place_ids() {
    let result = parse_pnml(&wrap(r#"<place id="a"/><place id="a"/>"#));

    assert!(result.unwrap_err().to_string().contains("Duplicate place ids"));
}

#[test]
fn shared_place_and_transition_id() {
    let result = parse_pnml(&wrap(r#"<place id="x"/><transition id="x"/>"#));

    assert!(result.is_err());
}

#[test]
fn arc_to_missing_node() {
    let result = parse_pnml(&wrap(
        r#"<place id="a"/><transition id="t"/><arc id="e" source="a" target="u"/>"#,
    ));

    assert!(result.unwrap_err().to_string().contains("'u' does not exist"));
}

#[test]
fn arc_between_places() {
    let result = parse_pnml(&wrap(
        r#"<place id="a"/><place id="b"/><arc id="e" source="a" target="b"/>"#,
    ));

    assert!(result.unwrap_err().to_string().contains("must connect a place and a transition"));
}

#[test]
fn arc_without_source() {
    let result = parse_pnml(&wrap(r#"<place id="a"/><arc id="e" target="a"/>"#));

    assert!(result.is_err());
}

#[test]
fn invalid_xml() {
    assert!(parse_pnml("<pnml><net>").is_err());
}
