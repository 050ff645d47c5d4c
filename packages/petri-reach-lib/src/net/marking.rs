use std::ops::Index;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::net::{ids::PlaceId, transition::Transition};

/// Upper bound for the token count of a single place during firing and
/// exploration. Markings above it are never produced.
///
/// The cap is checked against the marking after firing (`m - pre + post`),
/// not only against `m - pre`. A transition that would push a place past the
/// cap is therefore not fired at all, so verdicts at the cap boundary can
/// differ from tools that only bound `m - pre`: a single place at the cap with
/// a transition adding one token is bounded here.
pub const DEFAULT_CAP: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marking {
    tokens: Box<[u32]>,
}

impl Marking {
    pub fn new(tokens: Box<[u32]>) -> Self {
        Marking { tokens }
    }

    pub fn place_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u32> {
        self.tokens.iter()
    }

    pub fn is_within(&self, cap: u32) -> bool {
        self.tokens.iter().all(|&tokens| tokens <= cap)
    }

    /// Fires `transition`, returning the successor marking if the transition
    /// is enabled and no place ends up above `cap`.
    pub fn fire(&self, transition: &Transition, cap: u32) -> Option<Marking> {
        debug_assert_eq!(
            self.place_count(),
            transition.place_count(),
            "Marking and transition must cover the same places"
        );

        self.tokens
            .iter()
            .zip(transition.pre().iter().zip(transition.post().iter()))
            .map(|(&tokens, (&pre, &post))| {
                tokens
                    .checked_sub(pre)
                    .and_then(|remaining| remaining.checked_add(post))
                    .filter(|&result| result <= cap)
            })
            .collect::<Option<Box<[u32]>>>()
            .map(Marking::new)
    }

    pub fn is_enabled(&self, transition: &Transition) -> bool {
        self.tokens
            .iter()
            .zip(transition.pre().iter())
            .all(|(tokens, pre)| tokens >= pre)
    }

    /// Adds `delta` tokens to a single place. Fails if the place does not
    /// exist or the count would become negative.
    pub fn with_delta(&self, place: PlaceId, delta: i64) -> Option<Marking> {
        let current = *self.tokens.get(place.index())?;
        let updated = u32::try_from(i64::from(current).checked_add(delta)?).ok()?;

        let mut tokens = self.tokens.clone();
        tokens[place.index()] = updated;
        Some(Marking::new(tokens))
    }

    /// `self` dominates `other` if it holds at least as many tokens in every
    /// place and strictly more in at least one.
    pub fn dominates(&self, other: &Marking) -> bool {
        debug_assert_eq!(self.place_count(), other.place_count());

        let mut strictly_greater = false;
        for (a, b) in self.tokens.iter().zip(other.tokens.iter()) {
            if a < b {
                return false;
            }
            if a > b {
                strictly_greater = true;
            }
        }
        strictly_greater
    }

    /// Places where `self` holds strictly more tokens than `other`.
    pub fn growing_places(&self, other: &Marking) -> Vec<PlaceId> {
        self.tokens
            .iter()
            .zip(other.tokens.iter())
            .positions(|(a, b)| a > b)
            .map(PlaceId::new)
            .collect()
    }
}

impl std::fmt::Display for Marking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.tokens.iter().join(", "))
    }
}

impl From<Box<[u32]>> for Marking {
    fn from(tokens: Box<[u32]>) -> Self {
        Marking::new(tokens)
    }
}

impl From<&[u32]> for Marking {
    fn from(tokens: &[u32]) -> Self {
        Marking::new(tokens.into())
    }
}

impl From<Vec<u32>> for Marking {
    fn from(tokens: Vec<u32>) -> Self {
        Marking::new(tokens.into_boxed_slice())
    }
}

impl FromIterator<u32> for Marking {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Marking::new(iter.into_iter().collect())
    }
}

impl Index<PlaceId> for Marking {
    type Output = u32;

    fn index(&self, place: PlaceId) -> &Self::Output {
        &self.tokens[place.index()]
    }
}

impl Index<usize> for Marking {
    type Output = u32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

#[test]
fn test_fire_1() {
    let transition = Transition::new("t0", vec![1, 0], vec![0, 2]);
    let marking = Marking::from(vec![1, 3]);

    assert_eq!(
        marking.fire(&transition, DEFAULT_CAP),
        Some(vec![0, 5].into())
    );
    assert_eq!(
        Marking::from(vec![0, 3]).fire(&transition, DEFAULT_CAP),
        None
    );
}

#[test]
fn test_fire_cap() {
    let transition = Transition::new("t0", vec![0], vec![1]);

    assert_eq!(
        Marking::from(vec![9]).fire(&transition, 10),
        Some(vec![10].into())
    );
    assert_eq!(Marking::from(vec![10]).fire(&transition, 10), None);
}

#[test]
fn test_fire_at_default_cap() {
    let grow = Transition::new("t0", vec![0], vec![1]);
    let consume = Transition::new("t1", vec![1], vec![1]);
    let at_cap = Marking::from(vec![DEFAULT_CAP]);

    // the result is bounded, not just `m - pre`
    assert_eq!(at_cap.fire(&grow, DEFAULT_CAP), None);
    assert_eq!(at_cap.fire(&consume, DEFAULT_CAP), Some(at_cap.clone()));
}

#[test]
fn test_dominates() {
    let a = Marking::from(vec![1, 2, 3]);

    assert!(Marking::from(vec![1, 2, 4]).dominates(&a));
    assert!(!a.dominates(&a));
    assert!(!Marking::from(vec![2, 1, 3]).dominates(&a));
    assert!(!a.dominates(&Marking::from(vec![1, 2, 4])));
}

#[test]
fn test_with_delta() {
    let marking = Marking::from(vec![0, 2]);

    assert_eq!(
        marking.with_delta(PlaceId::new(1), -2),
        Some(vec![0, 0].into())
    );
    assert_eq!(marking.with_delta(PlaceId::new(0), -1), None);
    assert_eq!(marking.with_delta(PlaceId::new(2), 1), None);
}

#[test]
fn test_display() {
    assert_eq!(Marking::from(vec![1, 0, 12]).to_string(), "(1, 0, 12)");
    assert_eq!(Marking::from(vec![7]).to_string(), "(7)");
}
