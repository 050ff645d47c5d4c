use serde::{Deserialize, Serialize};

use crate::net::{
    ids::{PlaceId, TransitionId},
    marking::Marking,
    transition::Transition,
};

pub mod ids;
pub mod initialized;
pub mod marking;
pub mod model;
pub mod pnml;
pub mod spec;
pub mod transition;

/// Topology of a place/transition net. Places and transitions are addressed by
/// their position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetriNet {
    place_names: Vec<String>,
    transitions: Vec<Transition>,
}

impl PetriNet {
    /// Creates a net without transitions whose places are named `p0`, `p1`, ...
    pub fn new(place_count: usize) -> Self {
        Self::with_place_names(
            PlaceId::iter_places(place_count)
                .map(|place| place.to_string())
                .collect(),
        )
    }

    pub fn with_place_names(place_names: Vec<String>) -> Self {
        Self {
            place_names,
            transitions: vec![],
        }
    }

    pub fn add_transition(&mut self, transition: Transition) -> TransitionId {
        assert_eq!(
            transition.place_count(),
            self.place_count(),
            "Transition has to cover every place of the net"
        );

        self.transitions.push(transition);
        TransitionId::new(self.transitions.len() - 1)
    }

    /// Adds an unnamed transition from dense `pre` and `post` vectors. It is
    /// named after its id.
    pub fn add_transition_vectors(&mut self, pre: Vec<u32>, post: Vec<u32>) -> TransitionId {
        let name = TransitionId::new(self.transitions.len()).to_string();
        self.add_transition(Transition::new(name, pre, post))
    }

    pub fn place_count(&self) -> usize {
        self.place_names.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id.index())
    }

    pub fn iter_transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> {
        self.transitions
            .iter()
            .enumerate()
            .map(|(i, transition)| (TransitionId::new(i), transition))
    }

    pub fn place_names(&self) -> &[String] {
        &self.place_names
    }

    pub fn place_name(&self, place: PlaceId) -> Option<&str> {
        self.place_names.get(place.index()).map(String::as_str)
    }

    pub fn place_by_name(&self, name: &str) -> Option<PlaceId> {
        self.place_names
            .iter()
            .position(|place_name| place_name == name)
            .map(PlaceId::new)
    }

    pub fn transition_by_name(&self, name: &str) -> Option<TransitionId> {
        self.transitions
            .iter()
            .position(|transition| transition.name() == name)
            .map(TransitionId::new)
    }

    /// Transitions that can fire at `marking` without pushing a place above
    /// `cap`, in index order.
    pub fn enabled<'a>(
        &'a self,
        marking: &'a Marking,
        cap: u32,
    ) -> impl Iterator<Item = TransitionId> + 'a {
        self.iter_transitions()
            .filter(move |(_, transition)| marking.fire(transition, cap).is_some())
            .map(|(id, _)| id)
    }
}
