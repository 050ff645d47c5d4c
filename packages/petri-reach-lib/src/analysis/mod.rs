use serde::{Deserialize, Serialize};

use crate::{
    analysis::graph::{GraphvizOptions, ReachabilityGraph},
    net::{PetriNet, ids::PlaceId, marking::Marking},
};

pub mod analyzer;
pub mod graph;

/// Two markings on one search path, where the later one dominates the
/// earlier one. Repeating the transitions between them keeps growing the
/// places in [UnboundednessWitness::growing_places].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnboundednessWitness {
    pub dominated: Marking,
    pub dominating: Marking,
}

impl UnboundednessWitness {
    pub fn new(dominated: Marking, dominating: Marking) -> Self {
        debug_assert!(dominating.dominates(&dominated));
        Self {
            dominated,
            dominating,
        }
    }

    pub fn growing_places(&self) -> Vec<PlaceId> {
        self.dominating.growing_places(&self.dominated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundedness {
    Bounded,
    Unbounded(UnboundednessWitness),
}

impl Boundedness {
    pub fn is_bounded(&self) -> bool {
        matches!(self, Boundedness::Bounded)
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Boundedness::Unbounded(_))
    }

    pub fn witness(&self) -> Option<&UnboundednessWitness> {
        match self {
            Boundedness::Bounded => None,
            Boundedness::Unbounded(witness) => Some(witness),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    /// Markings that were expanded. An unboundedness witness only shows up as
    /// an edge target and is not counted.
    pub node_count: u64,
    /// Fired `(marking, transition)` pairs.
    pub edge_count: u64,
    pub time: std::time::Duration,
}

impl AnalysisStatistics {
    pub fn new(node_count: u64, edge_count: u64, time: std::time::Duration) -> Self {
        AnalysisStatistics {
            node_count,
            edge_count,
            time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub status: Boundedness,
    pub statistics: AnalysisStatistics,
    pub graph: ReachabilityGraph,
}

impl AnalysisResult {
    pub fn new(
        status: Boundedness,
        statistics: AnalysisStatistics,
        graph: ReachabilityGraph,
    ) -> Self {
        Self {
            status,
            statistics,
            graph,
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.status.is_bounded()
    }

    pub fn is_unbounded(&self) -> bool {
        self.status.is_unbounded()
    }

    pub fn witness(&self) -> Option<&UnboundednessWitness> {
        self.status.witness()
    }

    pub fn node_count(&self) -> u64 {
        self.statistics.node_count
    }

    pub fn edge_count(&self) -> u64 {
        self.statistics.edge_count
    }

    /// DOT rendering of the graph with the witness highlighted.
    pub fn to_graphviz(&self, net: &PetriNet) -> String {
        let mut options = GraphvizOptions::default().with_net(net);
        if let Some(witness) = self.witness() {
            options = options.with_witness(witness);
        }
        self.graph.to_graphviz(&options)
    }
}

/// The parts of an [AnalysisResult] that are worth writing out, i.e.
/// everything but the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableAnalysisResult {
    pub bounded: bool,
    pub witness: Option<UnboundednessWitness>,
    pub statistics: AnalysisStatistics,
}

impl SerializableAnalysisResult {
    pub fn is_bounded(&self) -> bool {
        self.bounded
    }
}

impl From<&AnalysisResult> for SerializableAnalysisResult {
    fn from(result: &AnalysisResult) -> Self {
        SerializableAnalysisResult {
            bounded: result.is_bounded(),
            witness: result.witness().cloned(),
            statistics: result.statistics.clone(),
        }
    }
}
