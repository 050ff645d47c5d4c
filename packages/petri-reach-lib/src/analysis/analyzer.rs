use std::time::Instant;

use hashbrown::HashSet;
use petgraph::graph::NodeIndex;

use crate::{
    analysis::{
        AnalysisResult, AnalysisStatistics, Boundedness, UnboundednessWitness,
        graph::ReachabilityGraph,
    },
    config::AnalysisConfig,
    net::{PetriNet, ids::TransitionId, marking::Marking},
};

/// One marking on the current search path and the index of the next
/// transition to try from it.
#[derive(Debug)]
struct Frame {
    marking: Marking,
    node: NodeIndex,
    next_transition: usize,
}

impl Frame {
    fn new(marking: Marking, node: NodeIndex) -> Self {
        Frame {
            marking,
            node,
            next_transition: 0,
        }
    }
}

/// Explores the markings reachable from a start marking and decides whether
/// the net is bounded.
///
/// The search is a depth-first search over markings. Transitions are tried in
/// index order, and a transition is only fired if no place ends up above the
/// configured cap. A marking that was seen before ends its branch. A new
/// marking that dominates a marking on the current path (from the start
/// marking down to its parent) proves that the net is unbounded: the
/// transitions in between can be repeated forever, adding tokens every time.
/// The search stops at the first such pair.
///
/// The cap makes the search finite. It is an approximation: a net whose
/// growth only becomes visible beyond the cap is reported as bounded. The cap
/// applies to the marking after firing (see
/// [DEFAULT_CAP](crate::net::marking::DEFAULT_CAP)), so a marking at
/// the cap whose only successors exceed it has no outgoing edges, even where
/// a check of `m - pre` alone would report the net as unbounded.
///
/// The search path lives on an explicit stack, so deep state spaces do not
/// exhaust the call stack.
pub struct ReachabilityAnalyzer<'n> {
    net: &'n PetriNet,
    config: AnalysisConfig,
}

impl<'n> ReachabilityAnalyzer<'n> {
    pub fn new(net: &'n PetriNet, config: AnalysisConfig) -> Self {
        ReachabilityAnalyzer { net, config }
    }

    pub fn analyse(&self, start: &Marking) -> AnalysisResult {
        assert_eq!(
            start.place_count(),
            self.net.place_count(),
            "Start marking has to cover every place of the net"
        );

        let _span = tracing::debug_span!(
            "ReachabilityAnalyzer::analyse",
            places = self.net.place_count(),
            transitions = self.net.transition_count()
        )
        .entered();
        let start_time = Instant::now();

        let mut graph = ReachabilityGraph::with_root(start.clone());
        let mut visited = HashSet::new();
        visited.insert(start.clone());

        let root = graph.add_marking(start.clone());
        let mut path = vec![Frame::new(start.clone(), root)];
        let mut node_count: u64 = 1;
        let mut edge_count: u64 = 0;
        let mut status = Boundedness::Bounded;

        while let Some(frame) = path.last_mut() {
            let Some((transition, successor)) = self.next_successor(frame) else {
                path.pop();
                continue;
            };

            edge_count += 1;
            let successor_node = graph.add_edge(frame.node, successor.clone(), transition);

            if !visited.insert(successor.clone()) {
                continue;
            }

            if let Some(ancestor) = path
                .iter()
                .find(|ancestor| successor.dominates(&ancestor.marking))
            {
                tracing::debug!(
                    "{} dominates {} after firing {}",
                    successor,
                    ancestor.marking,
                    transition
                );
                status = Boundedness::Unbounded(UnboundednessWitness::new(
                    ancestor.marking.clone(),
                    successor,
                ));
                break;
            }

            node_count += 1;
            path.push(Frame::new(successor, successor_node));
        }

        let statistics = AnalysisStatistics::new(node_count, edge_count, start_time.elapsed());
        tracing::info!(
            "Analysis finished: bounded = {}, {} nodes, {} edges, {:?}",
            status.is_bounded(),
            statistics.node_count,
            statistics.edge_count,
            statistics.time
        );

        AnalysisResult::new(status, statistics, graph)
    }

    /// Advances `frame` to its next enabled transition and fires it.
    fn next_successor(&self, frame: &mut Frame) -> Option<(TransitionId, Marking)> {
        let cap = *self.config.get_cap();
        let transitions = self.net.transitions();

        while frame.next_transition < transitions.len() {
            let index = frame.next_transition;
            frame.next_transition += 1;

            if let Some(successor) = frame.marking.fire(&transitions[index], cap) {
                return Some((TransitionId::new(index), successor));
            }
        }

        None
    }
}
