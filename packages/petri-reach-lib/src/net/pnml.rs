use anyhow::Context;
use hashbrown::HashMap;
use roxmltree::{Document, Node};

use crate::net::{
    PetriNet, ids::PlaceId, initialized::InitializedNet, marking::Marking,
    transition::Transition,
};

#[derive(Debug, Clone)]
struct PnmlNode<'a> {
    id: &'a str,
    name: String,
}

#[derive(Debug, Clone)]
struct PnmlArc<'a> {
    source: &'a str,
    target: &'a str,
    weight: u32,
}

/// Text of the first `inner` element below the first `outer` element below
/// `node`, e.g. `name/text` or `inscription/text`.
fn nested_text<'a>(node: Node<'a, '_>, outer: &str, inner: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.has_tag_name(outer))?
        .descendants()
        .find(|n| n.has_tag_name(inner))?
        .text()
        .map(str::trim)
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &str) -> anyhow::Result<&'a str> {
    node.attribute(attribute).with_context(|| {
        format!(
            "<{}> element without '{}' attribute",
            node.tag_name().name(),
            attribute
        )
    })
}

fn named_nodes<'a>(root: Node<'a, '_>, tag: &str) -> anyhow::Result<Vec<PnmlNode<'a>>> {
    root.descendants()
        .filter(|n| n.has_tag_name(tag))
        .map(|n| {
            let id = required_attribute(n, "id")?;
            let name = nested_text(n, "name", "text")
                .filter(|name| !name.is_empty())
                .unwrap_or(id)
                .to_string();
            Ok(PnmlNode { id, name })
        })
        .collect()
}

/// Reads a place/transition net from PNML.
///
/// Missing names fall back to the element id, missing or non-numeric arc
/// inscriptions to weight 1 and missing initial markings to 0.
pub fn parse_pnml(text: &str) -> anyhow::Result<InitializedNet> {
    let document = Document::parse(text).context("Invalid XML")?;
    let root = document.root_element();

    let places = named_nodes(root, "place")?;
    let transitions = named_nodes(root, "transition")?;

    let arcs = root
        .descendants()
        .filter(|n| n.has_tag_name("arc"))
        .map(|n| {
            Ok(PnmlArc {
                source: required_attribute(n, "source")?,
                target: required_attribute(n, "target")?,
                weight: nested_text(n, "inscription", "text")
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(1),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut initial = Vec::with_capacity(places.len());
    for place in root.descendants().filter(|n| n.has_tag_name("place")) {
        let tokens = nested_text(place, "initialMarking", "text")
            .and_then(|t| t.parse::<i64>().ok())
            .unwrap_or(0);
        if tokens < 0 {
            anyhow::bail!(
                "Invalid initial marking {} for place '{}'.",
                tokens,
                place.attribute("id").unwrap_or_default()
            );
        }
        initial.push(
            u32::try_from(tokens)
                .with_context(|| format!("Initial marking {} is too large.", tokens))?,
        );
    }

    build_net(&places, &transitions, &arcs, initial)
}

fn build_net(
    places: &[PnmlNode],
    transitions: &[PnmlNode],
    arcs: &[PnmlArc],
    initial: Vec<u32>,
) -> anyhow::Result<InitializedNet> {
    let place_index = places
        .iter()
        .enumerate()
        .map(|(i, place)| (place.id, PlaceId::new(i)))
        .collect::<HashMap<_, _>>();
    if place_index.len() != places.len() {
        anyhow::bail!("Duplicate place ids found.");
    }

    let transition_index = transitions
        .iter()
        .enumerate()
        .map(|(i, transition)| (transition.id, i))
        .collect::<HashMap<_, _>>();
    if transition_index.len() != transitions.len() {
        anyhow::bail!("Duplicate transition ids found.");
    }

    if let Some(id) = place_index
        .keys()
        .find(|id| transition_index.contains_key(**id))
    {
        anyhow::bail!("Id '{}' is used by a place and a transition.", id);
    }

    let place_count = places.len();
    let mut pre = vec![vec![0; place_count]; transitions.len()];
    let mut post = vec![vec![0; place_count]; transitions.len()];

    for arc in arcs {
        for endpoint in [arc.source, arc.target] {
            if !place_index.contains_key(endpoint) && !transition_index.contains_key(endpoint) {
                anyhow::bail!("Arc endpoint '{}' does not exist.", endpoint);
            }
        }

        match (
            place_index.get(arc.source),
            transition_index.get(arc.target),
            transition_index.get(arc.source),
            place_index.get(arc.target),
        ) {
            (Some(place), Some(&transition), _, _) => pre[transition][place.index()] = arc.weight,
            (_, _, Some(&transition), Some(place)) => post[transition][place.index()] = arc.weight,
            _ => anyhow::bail!(
                "Invalid arc {} -> {}. Arcs must connect a place and a transition.",
                arc.source,
                arc.target
            ),
        }
    }

    let mut net = PetriNet::with_place_names(places.iter().map(|p| p.name.clone()).collect());
    for ((transition, pre), post) in transitions.iter().zip(pre).zip(post) {
        net.add_transition(Transition::new(transition.name.clone(), pre, post));
    }

    Ok(InitializedNet::new(net, Marking::from(initial)))
}

#[test]
fn test_pnml_defaults() {
    let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<pnml>
  <net id="n" type="http://www.pnml.org/version-2009/grammar/ptnet">
    <page id="page">
      <place id="a"><initialMarking><text>2</text></initialMarking></place>
      <place id="b"><name><text>buffer</text></name></place>
      <transition id="t"/>
      <arc id="e1" source="a" target="t"><inscription><text>x</text></inscription></arc>
      <arc id="e2" source="t" target="b"><inscription><text>3</text></inscription></arc>
    </page>
  </net>
</pnml>"#;

    let net = parse_pnml(text).unwrap();
    assert_eq!(net.net.place_names(), ["a", "buffer"]);
    assert_eq!(net.initial_marking, Marking::from(vec![2, 0]));
    assert_eq!(net.net.transitions()[0].name(), "t");
    assert_eq!(net.net.transitions()[0].pre(), [1, 0]);
    assert_eq!(net.net.transitions()[0].post(), [0, 3]);
}
