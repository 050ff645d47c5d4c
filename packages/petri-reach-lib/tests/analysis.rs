use petri_reach_lib::{
    analysis::{
        AnalysisResult, SerializableAnalysisResult, UnboundednessWitness,
        analyzer::ReachabilityAnalyzer,
    },
    config::AnalysisConfig,
    net::{
        PetriNet,
        ids::PlaceId,
        marking::{DEFAULT_CAP, Marking},
    },
};

fn analyse(net: &PetriNet, start: Vec<u32>) -> AnalysisResult {
    ReachabilityAnalyzer::new(net, AnalysisConfig::default()).analyse(&start.into())
}

fn self_loop_growth() -> PetriNet {
    let mut net = PetriNet::new(1);
    net.add_transition_vectors(vec![1], vec![2]);
    net
}

fn token_ring() -> PetriNet {
    let mut net = PetriNet::new(2);
    net.add_transition_vectors(vec![1, 0], vec![0, 1]);
    net.add_transition_vectors(vec![0, 1], vec![1, 0]);
    net
}

#[test]
fn unbounded_self_loop() {
    let result = analyse(&self_loop_growth(), vec![1]);

    assert!(result.is_unbounded());
    assert_eq!(
        result.witness(),
        Some(&UnboundednessWitness::new(vec![1].into(), vec![2].into()))
    );
    assert_eq!(
        result.witness().unwrap().growing_places(),
        vec![PlaceId::new(0)]
    );
    assert_eq!(result.node_count(), 1);
    assert_eq!(result.edge_count(), 1);
}

#[test]
fn bounded_token_ring() {
    let result = analyse(&token_ring(), vec![1, 0]);

    assert!(result.is_bounded());
    assert_eq!(result.witness(), None);
    assert_eq!(result.node_count(), 2);
    assert_eq!(result.edge_count(), 2);
    assert_eq!(result.graph.node_count(), 2);
    assert_eq!(result.graph.edge_count(), 2);
}

#[test]
fn dead_start_marking() {
    let result = analyse(&token_ring(), vec![0, 0]);

    assert!(result.is_bounded());
    assert_eq!(result.node_count(), 1);
    assert_eq!(result.edge_count(), 0);
}

#[test]
fn net_without_transitions() {
    let result = analyse(&PetriNet::new(3), vec![1, 2, 3]);

    assert!(result.is_bounded());
    assert_eq!(result.node_count(), 1);
    assert_eq!(result.edge_count(), 0);
    assert_eq!(result.graph.root(), Some(&Marking::from(vec![1, 2, 3])));
}

#[test]
fn witness_below_root() {
    // p0 -> p1, then p1 doubles itself
    let mut net = PetriNet::new(2);
    net.add_transition_vectors(vec![1, 0], vec![0, 1]);
    net.add_transition_vectors(vec![0, 1], vec![0, 2]);

    let result = analyse(&net, vec![1, 0]);

    assert!(result.is_unbounded());
    assert_eq!(
        result.witness(),
        Some(&UnboundednessWitness::new(
            vec![0, 1].into(),
            vec![0, 2].into()
        ))
    );
    assert_eq!(result.node_count(), 2);
    assert_eq!(result.edge_count(), 2);
}

#[test]
fn witness_prefers_oldest_ancestor() {
    let mut net = PetriNet::new(3);
    net.add_transition_vectors(vec![1, 0, 0], vec![0, 1, 0]);
    net.add_transition_vectors(vec![0, 1, 0], vec![1, 2, 1]);

    let result = analyse(&net, vec![1, 0, 0]);

    // (1, 2, 1) dominates both (1, 0, 0) and (0, 1, 0)
    let witness = result.witness().unwrap();
    assert_eq!(witness.dominated, Marking::from(vec![1, 0, 0]));
    assert_eq!(witness.dominating, Marking::from(vec![1, 2, 1]));
}

#[test]
fn revisited_marking_is_no_witness() {
    // t1 goes back to the start marking, t2 only shuffles tokens around
    let mut net = PetriNet::new(2);
    net.add_transition_vectors(vec![1, 0], vec![0, 1]);
    net.add_transition_vectors(vec![0, 1], vec![1, 0]);
    net.add_transition_vectors(vec![1, 0], vec![1, 0]);

    let result = analyse(&net, vec![1, 0]);

    assert!(result.is_bounded());
    assert_eq!(result.node_count(), 2);
    assert_eq!(result.edge_count(), 3);
}

#[test]
fn cap_prunes_successors() {
    let mut net = PetriNet::new(2);
    net.add_transition_vectors(vec![1, 0], vec![0, 2]);

    let result = analyse(&net, vec![1, 0]);
    assert_eq!(result.node_count(), 2);

    let capped = ReachabilityAnalyzer::new(&net, AnalysisConfig::default().with_cap(1))
        .analyse(&vec![1, 0].into());
    assert!(capped.is_bounded());
    assert_eq!(capped.node_count(), 1);
    assert_eq!(capped.edge_count(), 0);
}

#[test]
fn growth_hidden_by_cap() {
    let net = self_loop_growth();

    let result = ReachabilityAnalyzer::new(&net, AnalysisConfig::default().with_cap(1))
        .analyse(&vec![1].into());

    assert!(result.is_bounded());
    assert_eq!(result.node_count(), 1);
    assert_eq!(result.edge_count(), 0);
}

#[test]
fn growth_stops_at_default_cap() {
    let mut net = PetriNet::new(1);
    net.add_transition_vectors(vec![0], vec![1]);

    let result = analyse(&net, vec![DEFAULT_CAP]);

    assert!(result.is_bounded());
    assert_eq!(result.node_count(), 1);
    assert_eq!(result.edge_count(), 0);

    // one token below the cap the growth is still visible
    let result = analyse(&net, vec![DEFAULT_CAP - 1]);
    assert!(result.is_unbounded());
    assert_eq!(
        result.witness(),
        Some(&UnboundednessWitness::new(
            vec![DEFAULT_CAP - 1].into(),
            vec![DEFAULT_CAP].into()
        ))
    );
}

#[test]
fn analysis_is_deterministic() {
    let mut net = PetriNet::new(3);
    net.add_transition_vectors(vec![1, 0, 0], vec![0, 1, 1]);
    net.add_transition_vectors(vec![0, 1, 0], vec![1, 0, 0]);
    net.add_transition_vectors(vec![0, 0, 1], vec![0, 0, 0]);

    let first = analyse(&net, vec![1, 0, 0]);
    let second = analyse(&net, vec![1, 0, 0]);

    assert_eq!(
        SerializableAnalysisResult::from(&first).witness,
        SerializableAnalysisResult::from(&second).witness
    );
    assert_eq!(first.node_count(), second.node_count());
    assert_eq!(first.edge_count(), second.edge_count());
    assert_eq!(
        first.graph.markings().collect::<Vec<_>>(),
        second.graph.markings().collect::<Vec<_>>()
    );
}

#[test]
fn witness_is_part_of_graph() {
    let result = analyse(&self_loop_growth(), vec![1]);
    let witness = result.witness().unwrap();

    assert!(result.graph.contains(&witness.dominated));
    assert!(result.graph.contains(&witness.dominating));
    assert_eq!(result.graph.node_count() as u64, result.node_count() + 1);
    assert_eq!(result.graph.edge_count() as u64, result.edge_count());
}

#[test]
fn graphviz_highlights_witness() {
    let net = self_loop_growth();
    let result = analyse(&net, vec![1]);

    let dot = result.to_graphviz(&net);

    assert!(dot.starts_with("digraph reachability_graph {"));
    assert!(dot.contains(
        "n0 [label=\"(1)\", fillcolor=\"red\", style=\"bold,filled\"];"
    ));
    assert!(dot.contains(
        "n1 [label=\"(2)\", fillcolor=\"pink\", style=\"filled\"];"
    ));
    assert!(dot.contains("n0 -> n1 [label=\"t0\"];"));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn serializable_result() {
    let result = analyse(&token_ring(), vec![1, 0]);
    let serializable = SerializableAnalysisResult::from(&result);

    assert!(serializable.is_bounded());
    assert_eq!(serializable.witness, None);
    assert_eq!(serializable.statistics.node_count, 2);

    let json = serde_json::to_value(&serializable).unwrap();
    assert_eq!(json["bounded"], true);
    assert_eq!(json["statistics"]["edge_count"], 2);
}
