use hashbrown::HashMap;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::{
    analysis::UnboundednessWitness,
    net::{PetriNet, ids::TransitionId, marking::Marking},
};

/// Markings connected by the transitions fired between them. Every marking
/// occurs at most once, and so does every `(source, transition, target)`
/// edge.
#[derive(Debug, Clone, Default)]
pub struct ReachabilityGraph {
    graph: DiGraph<Marking, TransitionId>,
    index: HashMap<Marking, NodeIndex>,
    root: Option<NodeIndex>,
}

impl ReachabilityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: Marking) -> Self {
        let mut graph = Self::new();
        let node = graph.add_marking(root);
        graph.root = Some(node);
        graph
    }

    /// Adds `marking` if it is not part of the graph yet and returns its node.
    pub fn add_marking(&mut self, marking: Marking) -> NodeIndex {
        if let Some(&node) = self.index.get(&marking) {
            return node;
        }

        let node = self.graph.add_node(marking.clone());
        self.index.insert(marking, node);
        node
    }

    /// Adds the edge `from -[transition]-> to`, adding `to` if needed. Returns
    /// the node of `to`.
    pub fn add_edge(
        &mut self,
        from: NodeIndex,
        to: Marking,
        transition: TransitionId,
    ) -> NodeIndex {
        let target = self.add_marking(to);

        let exists = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .any(|edge| edge.target() == target && *edge.weight() == transition);
        if !exists {
            self.graph.add_edge(from, target, transition);
        }

        target
    }

    pub fn node(&self, marking: &Marking) -> Option<NodeIndex> {
        self.index.get(marking).copied()
    }

    pub fn marking(&self, node: NodeIndex) -> &Marking {
        &self.graph[node]
    }

    pub fn root(&self) -> Option<&Marking> {
        self.root.map(|node| &self.graph[node])
    }

    pub fn contains(&self, marking: &Marking) -> bool {
        self.index.contains_key(marking)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn markings(&self) -> impl Iterator<Item = &Marking> {
        self.graph.node_weights()
    }

    /// All edges as `(source, transition, target)`.
    pub fn edges(&self) -> impl Iterator<Item = (&Marking, TransitionId, &Marking)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()],
                *edge.weight(),
                &self.graph[edge.target()],
            )
        })
    }

    /// Outgoing edges of `marking` in the order they were added.
    pub fn successors(&self, marking: &Marking) -> Vec<(TransitionId, &Marking)> {
        let Some(node) = self.node(marking) else {
            return vec![];
        };

        // petgraph lists the edges of a node newest first
        let mut successors = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (*edge.weight(), &self.graph[edge.target()]))
            .collect::<Vec<_>>();
        successors.reverse();
        successors
    }

    /// Renders the graph in the DOT language.
    pub fn to_graphviz(&self, options: &GraphvizOptions) -> String {
        let mut dot = String::new();
        dot.push_str("digraph reachability_graph {\n");
        dot.push_str("fontname=\"Helvetica,Arial,sans-serif\"\n");
        dot.push_str(
            "node [fontname=\"Helvetica,Arial,sans-serif\", shape=ellipse]\n",
        );
        dot.push_str("edge [fontname=\"Helvetica,Arial,sans-serif\"]\n");

        for node in self.graph.node_indices() {
            let marking = &self.graph[node];
            let mut style = vec![];
            let mut fill = None;

            if Some(node) == self.root {
                style.push("bold");
            }
            if options.current == Some(marking) {
                fill = Some("yellow");
            }
            if let Some(witness) = options.witness {
                if witness.dominating == *marking {
                    fill = Some("pink");
                }
                if witness.dominated == *marking {
                    fill = Some("red");
                }
            }

            let mut attributes = format!("label=\"{}\"", marking);
            if let Some(color) = fill {
                style.push("filled");
                attributes.push_str(&format!(", fillcolor=\"{}\"", color));
            }
            if !style.is_empty() {
                attributes.push_str(&format!(", style=\"{}\"", style.join(",")));
            }

            dot.push_str(&format!("    n{} [{}];\n", node.index(), attributes));
        }

        for edge in self.graph.edge_references() {
            let transition = *edge.weight();
            let label = options
                .net
                .and_then(|net| net.transition(transition))
                .map(|t| t.name().to_string())
                .unwrap_or_else(|| transition.to_string());

            dot.push_str(&format!(
                "    n{} -> n{} [label=\"{}\"];\n",
                edge.source().index(),
                edge.target().index(),
                label.replace('"', "\\\"")
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

/// What [ReachabilityGraph::to_graphviz] highlights. Without a net, edges are
/// labelled with transition ids instead of names.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphvizOptions<'a> {
    pub net: Option<&'a PetriNet>,
    pub current: Option<&'a Marking>,
    pub witness: Option<&'a UnboundednessWitness>,
}

impl<'a> GraphvizOptions<'a> {
    pub fn with_net(mut self, net: &'a PetriNet) -> Self {
        self.net = Some(net);
        self
    }

    pub fn with_current(mut self, current: &'a Marking) -> Self {
        self.current = Some(current);
        self
    }

    pub fn with_witness(mut self, witness: &'a UnboundednessWitness) -> Self {
        self.witness = Some(witness);
        self
    }
}

#[test]
fn test_edges_are_unique() {
    let mut graph = ReachabilityGraph::with_root(vec![1, 0].into());
    let root = graph.node(&vec![1, 0].into()).unwrap();

    let target = graph.add_edge(root, vec![0, 1].into(), TransitionId::new(0));
    graph.add_edge(root, vec![0, 1].into(), TransitionId::new(0));
    graph.add_edge(target, vec![1, 0].into(), TransitionId::new(1));

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(
        graph.successors(&vec![0, 1].into()),
        vec![(TransitionId::new(1), &Marking::from(vec![1, 0]))]
    );
}
