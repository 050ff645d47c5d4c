use serde::{Deserialize, Serialize};

use crate::net::ids::PlaceId;

/// A transition with one `pre` and one `post` entry per place. `pre` is what
/// the transition needs and consumes, `post` what it produces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    name: String,
    pre: Box<[u32]>,
    post: Box<[u32]>,
}

impl Transition {
    pub fn new(name: impl Into<String>, pre: Vec<u32>, post: Vec<u32>) -> Self {
        assert_eq!(
            pre.len(),
            post.len(),
            "Pre and post vectors of a transition must have the same length"
        );

        Self {
            name: name.into(),
            pre: pre.into_boxed_slice(),
            post: post.into_boxed_slice(),
        }
    }

    /// Builds a transition from sparse `(weight, place)` arcs.
    pub fn from_arcs(
        name: impl Into<String>,
        place_count: usize,
        input: &[(u32, PlaceId)],
        output: &[(u32, PlaceId)],
    ) -> Self {
        let mut pre = vec![0; place_count];
        let mut post = vec![0; place_count];

        for (weight, place) in input {
            pre[place.index()] = *weight;
        }
        for (weight, place) in output {
            post[place.index()] = *weight;
        }

        Self::new(name, pre, post)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn place_count(&self) -> usize {
        self.pre.len()
    }

    pub fn pre(&self) -> &[u32] {
        &self.pre
    }

    pub fn post(&self) -> &[u32] {
        &self.post
    }

    /// Net change of the token count of `place` when firing.
    pub fn effect(&self, place: PlaceId) -> i64 {
        i64::from(self.post[place.index()]) - i64::from(self.pre[place.index()])
    }
}
