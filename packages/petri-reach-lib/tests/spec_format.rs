use petri_reach_lib::{
    analysis::analyzer::ReachabilityAnalyzer,
    config::AnalysisConfig,
    net::{
        PetriNet,
        initialized::InitializedNet,
        marking::Marking,
        spec::{ToSpecFormat, parse_spec},
        transition::Transition,
    },
};

#[test]
fn parse_from_spec() {
    let spec = r#"
    vars
        p1 p2 p3
    rules
        p1 >= 1 ->
            p1' = p1-1,
            p2' = p2+1;
        p2 >= 1 ->
            p2' = p2-1,
            p3' = p3+1;
    init
        p1=2, p2=0, p3=0
    target
        p1=0, p2=0, p3=2"#;

    let net = parse_spec(spec).unwrap();

    assert_eq!(net.net.place_names(), ["p1", "p2", "p3"]);
    assert_eq!(net.initial_marking, Marking::from(vec![2, 0, 0]));
    assert_eq!(net.net.transitions()[0].pre(), [1, 0, 0]);
    assert_eq!(net.net.transitions()[0].post(), [0, 1, 0]);
    assert_eq!(net.net.transitions()[1].name(), "t1");

    let result = ReachabilityAnalyzer::new(&net.net, AnalysisConfig::default())
        .analyse(&net.initial_marking);
    assert!(result.is_bounded());
    // (2,0,0) (1,1,0) (0,2,0) (0,1,1) (1,0,1) (0,0,2)
    assert_eq!(result.node_count(), 6);
}

#[test]
fn load_producer_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/producer.spec");
    let net = InitializedNet::from_file(path).unwrap();

    assert_eq!(net.net.place_names(), ["ready", "buffer"]);
    // a guard without update keeps its tokens
    assert_eq!(net.net.transitions()[0].pre(), [1, 0]);
    assert_eq!(net.net.transitions()[0].post(), [1, 1]);

    let result = ReachabilityAnalyzer::new(&net.net, AnalysisConfig::default())
        .analyse(&net.initial_marking);
    assert!(result.is_unbounded());
}

#[test]
fn places_on_several_lines() {
    let spec = "vars\n  a\n  b\nrules\ninit\n  a=1, b=2\n";

    let net = parse_spec(spec).unwrap();
    assert_eq!(net.net.place_names(), ["a", "b"]);
    assert_eq!(net.net.transition_count(), 0);
    assert_eq!(net.initial_marking, Marking::from(vec![1, 2]));
}

#[test]
fn unknown_variable() {
    let spec = "vars\n  a\nrules\n  b >= 1 -> a' = a+1;\ninit\n  a=0\n";

    let error = parse_spec(spec).unwrap_err();
    assert!(error.to_string().contains("'b' not found"));
}

#[test]
fn update_from_other_place() {
    let spec = "vars\n  a b\nrules\n  a >= 1 -> b' = a+1;\ninit\n  a=1\n";

    assert!(parse_spec(spec).is_err());
}

#[test]
fn update_consumes_more_than_guard() {
    let spec = "vars\n  a\nrules\n  a >= 1 -> a' = a-2;\ninit\n  a=3\n";

    assert!(parse_spec(spec).is_err());
}

#[test]
fn duplicate_variable() {
    let spec = "vars\n  a a\nrules\ninit\n  a=1\n";

    assert!(parse_spec(spec).is_err());
}

#[test]
fn trailing_garbage() {
    let spec = "vars\n  a\nrules\ninit\n  a=1\nfoo";

    assert!(parse_spec(spec).is_err());
}

#[test]
fn write_and_read_back() {
    let mut net = PetriNet::with_place_names(vec!["idle".into(), "busy".into(), "done".into()]);
    net.add_transition(Transition::new("t0", vec![1, 0, 0], vec![0, 1, 0]));
    net.add_transition(Transition::new("t1", vec![0, 2, 0], vec![0, 0, 3]));
    net.add_transition(Transition::new("t2", vec![0, 0, 0], vec![0, 0, 0]));
    let net = InitializedNet::new(net, vec![4, 0, 1].into());

    let text = net.to_spec_format();
    assert!(text.starts_with("vars\n    idle busy done\n"));

    assert_eq!(parse_spec(&text).unwrap(), net);
}

#[test]
fn write_invalid_place_names() {
    let mut net = PetriNet::with_place_names(vec!["rules".into(), "my place".into()]);
    net.add_transition(Transition::new("t0", vec![1, 0], vec![0, 1]));
    let net = InitializedNet::new(net, vec![1, 0].into());

    let text = net.to_spec_format();
    assert!(text.starts_with("vars\n    p0 p1\n"));

    let parsed = parse_spec(&text).unwrap();
    assert_eq!(parsed.net.transitions(), net.net.transitions());
    assert_eq!(parsed.initial_marking, net.initial_marking);
}

#[test]
fn json_file_round_trip() {
    let path = std::env::temp_dir().join("petri_reach_json_round_trip.json");
    let net = parse_spec(
        "vars\n  a b\nrules\n  a >= 1 -> a' = a-1, b' = b+1;\ninit\n  a=1\n",
    )
    .unwrap();

    net.to_json_file(&path).unwrap();
    let loaded = InitializedNet::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, net);
}

#[test]
fn spec_file_round_trip() {
    let path = std::env::temp_dir().join("petri_reach_spec_round_trip.spec");
    let source = concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/producer.spec");
    let net = InitializedNet::from_file(source).unwrap();

    net.to_spec_file(&path).unwrap();
    let loaded = InitializedNet::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, net);
}

#[test]
fn json_with_wrong_lengths() {
    let json = r#"{
        "net": {
            "place_names": ["a", "b"],
            "transitions": [{ "name": "t0", "pre": [1], "post": [0] }]
        },
        "initial_marking": [1, 0]
    }"#;

    assert!(InitializedNet::from_json(json).is_err());
}

#[test]
fn unsupported_extension() {
    assert!(InitializedNet::from_file("net.txt").is_err());
}
