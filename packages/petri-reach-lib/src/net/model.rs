use crate::{
    analysis::{AnalysisResult, analyzer::ReachabilityAnalyzer, graph::ReachabilityGraph},
    config::AnalysisConfig,
    net::{
        PetriNet,
        ids::{PlaceId, TransitionId},
        initialized::InitializedNet,
        marking::{DEFAULT_CAP, Marking},
        transition::Transition,
    },
};

/// A loaded net together with the marking that is edited and played
/// interactively.
#[derive(Debug, Clone)]
pub struct LoadedNet {
    net: PetriNet,
    live: Marking,
    initial: Marking,
    cap: u32,
    history: ReachabilityGraph,
}

impl LoadedNet {
    fn new(net: PetriNet, initial: Marking) -> Self {
        assert_eq!(
            initial.place_count(),
            net.place_count(),
            "Initial marking has to cover every place of the net"
        );

        LoadedNet {
            history: ReachabilityGraph::with_root(initial.clone()),
            live: initial.clone(),
            initial,
            net,
            cap: DEFAULT_CAP,
        }
    }

    fn restart_history(&mut self) {
        self.history = ReachabilityGraph::with_root(self.live.clone());
    }
}

/// The net being worked on, or nothing if no net was loaded yet.
///
/// All editing operations are transactions: they either apply completely and
/// report success, or change nothing and report failure. Analysis always
/// starts from a copy of the initial marking, never from the live one.
#[derive(Debug, Clone, Default)]
pub enum NetModel {
    #[default]
    Unloaded,
    Loaded(LoadedNet),
}

impl NetModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole model. Every `pre` and `post` vector must have one
    /// entry per place of `initial_marking`.
    pub fn load(&mut self, initial_marking: Marking, transitions: Vec<Transition>) {
        let mut net = PetriNet::new(initial_marking.place_count());
        for transition in transitions {
            net.add_transition(transition);
        }

        *self = NetModel::Loaded(LoadedNet::new(net, initial_marking));
    }

    pub fn load_net(&mut self, net: InitializedNet) {
        *self = NetModel::Loaded(LoadedNet::new(net.net, net.initial_marking));
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, NetModel::Loaded(_))
    }

    fn loaded(&self) -> Option<&LoadedNet> {
        match self {
            NetModel::Loaded(loaded) => Some(loaded),
            NetModel::Unloaded => None,
        }
    }

    fn loaded_mut(&mut self) -> Option<&mut LoadedNet> {
        match self {
            NetModel::Loaded(loaded) => Some(loaded),
            NetModel::Unloaded => None,
        }
    }

    pub fn net(&self) -> Option<&PetriNet> {
        self.loaded().map(|loaded| &loaded.net)
    }

    pub fn place_count(&self) -> usize {
        self.net().map_or(0, PetriNet::place_count)
    }

    /// Sets the token limit used by [NetModel::fire].
    pub fn set_cap(&mut self, cap: u32) {
        if let Some(loaded) = self.loaded_mut() {
            loaded.cap = cap;
        }
    }

    /// Fires a transition on the live marking. Fails without changing
    /// anything if the transition does not exist, is not enabled, or would
    /// push a place above the cap.
    pub fn fire(&mut self, transition: TransitionId) -> bool {
        let Some(loaded) = self.loaded_mut() else {
            return false;
        };
        let Some(successor) = loaded
            .net
            .transition(transition)
            .and_then(|t| loaded.live.fire(t, loaded.cap))
        else {
            return false;
        };

        tracing::debug!("fired {}: {} -> {}", transition, loaded.live, successor);

        let from = loaded.history.add_marking(loaded.live.clone());
        loaded.history.add_edge(from, successor.clone(), transition);
        loaded.live = successor;
        true
    }

    /// Adds `delta` tokens to `place`. On success the edited marking becomes
    /// the new initial marking.
    pub fn change_mark(&mut self, delta: i64, place: PlaceId) -> bool {
        let Some(loaded) = self.loaded_mut() else {
            return false;
        };
        let Some(edited) = loaded.live.with_delta(place, delta) else {
            return false;
        };

        loaded.live = edited;
        loaded.initial = loaded.live.clone();
        loaded.restart_history();
        true
    }

    /// Overwrites the live marking, e.g. with a marking picked from a
    /// reachability graph. Returns `false` if no net is loaded.
    ///
    /// Panics if `marking` does not cover exactly the places of the net.
    pub fn set_mark(&mut self, marking: &Marking) -> bool {
        let Some(loaded) = self.loaded_mut() else {
            return false;
        };
        assert_eq!(
            marking.place_count(),
            loaded.net.place_count(),
            "Marking has to cover every place of the net"
        );

        loaded.live = marking.clone();
        true
    }

    /// Moves the live marking back to the initial marking and forgets the
    /// firing history.
    pub fn reset(&mut self) -> bool {
        let Some(loaded) = self.loaded_mut() else {
            return false;
        };

        loaded.live = loaded.initial.clone();
        loaded.restart_history();
        true
    }

    pub fn snapshot(&self) -> Option<Marking> {
        self.loaded().map(|loaded| loaded.live.clone())
    }

    pub fn initial_marking(&self) -> Option<&Marking> {
        self.loaded().map(|loaded| &loaded.initial)
    }

    /// Markings visited by firing since the last load, edit or reset.
    pub fn history(&self) -> Option<&ReachabilityGraph> {
        self.loaded().map(|loaded| &loaded.history)
    }

    /// Transitions that [NetModel::fire] would accept right now.
    pub fn enabled_transitions(&self) -> Vec<TransitionId> {
        self.loaded()
            .map(|loaded| loaded.net.enabled(&loaded.live, loaded.cap).collect())
            .unwrap_or_default()
    }

    /// Analyses the net from its initial marking and puts the live marking
    /// back to the initial marking. The firing history is kept.
    pub fn analyse(&mut self, config: &AnalysisConfig) -> Option<AnalysisResult> {
        let loaded = self.loaded_mut()?;

        let result =
            ReachabilityAnalyzer::new(&loaded.net, config.clone()).analyse(&loaded.initial);
        loaded.live = loaded.initial.clone();

        Some(result)
    }
}
