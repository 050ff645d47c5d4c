use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(usize);

impl PlaceId {
    pub fn new(index: usize) -> Self {
        PlaceId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn iter_places(place_count: usize) -> impl Iterator<Item = PlaceId> {
        (0..place_count).map(PlaceId)
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl From<usize> for PlaceId {
    fn from(index: usize) -> Self {
        PlaceId(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(usize);

impl TransitionId {
    pub fn new(index: usize) -> Self {
        TransitionId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn iter_transitions(transition_count: usize) -> impl Iterator<Item = TransitionId> {
        (0..transition_count).map(TransitionId)
    }
}

impl std::fmt::Display for TransitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<usize> for TransitionId {
    fn from(index: usize) -> Self {
        TransitionId(index)
    }
}

/// Any node of the net graph.
///
/// Renderers tend to number places and transitions in a single integer range,
/// places first and transitions offset by the place count. A bare integer of
/// that range is only meaningful together with the place count, so the
/// conversions below take it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Place(PlaceId),
    Transition(TransitionId),
}

impl NodeId {
    /// Decodes a shared-range id. Returns `None` if `raw` lies past the last
    /// transition.
    pub fn from_shared(raw: usize, place_count: usize, transition_count: usize) -> Option<Self> {
        if raw < place_count {
            Some(NodeId::Place(PlaceId(raw)))
        } else if raw < place_count + transition_count {
            Some(NodeId::Transition(TransitionId(raw - place_count)))
        } else {
            None
        }
    }

    pub fn to_shared(self, place_count: usize) -> usize {
        match self {
            NodeId::Place(place) => place.0,
            NodeId::Transition(transition) => place_count + transition.0,
        }
    }

    pub fn as_place(self) -> Option<PlaceId> {
        match self {
            NodeId::Place(place) => Some(place),
            NodeId::Transition(_) => None,
        }
    }

    pub fn as_transition(self) -> Option<TransitionId> {
        match self {
            NodeId::Place(_) => None,
            NodeId::Transition(transition) => Some(transition),
        }
    }
}

impl From<PlaceId> for NodeId {
    fn from(place: PlaceId) -> Self {
        NodeId::Place(place)
    }
}

impl From<TransitionId> for NodeId {
    fn from(transition: TransitionId) -> Self {
        NodeId::Transition(transition)
    }
}

#[test]
fn test_shared_ids_1() {
    // 3 places, 2 transitions: 0..3 are places, 3..5 are transitions
    assert_eq!(
        NodeId::from_shared(2, 3, 2),
        Some(NodeId::Place(PlaceId::new(2)))
    );
    assert_eq!(
        NodeId::from_shared(3, 3, 2),
        Some(NodeId::Transition(TransitionId::new(0)))
    );
    assert_eq!(
        NodeId::from_shared(4, 3, 2),
        Some(NodeId::Transition(TransitionId::new(1)))
    );
    assert_eq!(NodeId::from_shared(5, 3, 2), None);
}

#[test]
fn test_shared_ids_2() {
    let transition = NodeId::from(TransitionId::new(1));
    assert_eq!(transition.to_shared(3), 4);
    assert_eq!(NodeId::from_shared(4, 3, 2), Some(transition));
    assert_eq!(transition.as_place(), None);
    assert_eq!(NodeId::from(PlaceId::new(0)).to_shared(3), 0);
}
