use bevy::prelude::*;
use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::ai::error::FsmError;

/// Tag types usable as state or event identifiers.
pub trait FsmKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T: Copy + Eq + Hash + Debug + Send + Sync + 'static> FsmKey for T {}

pub type Callback = Box<dyn FnMut() + Send + Sync>;
pub type UpdateCallback = Box<dyn FnMut(f32) + Send + Sync>;

/// A named state with optional enter/exit/update behavior.
pub struct State<S> {
    kind: S,
    name: String,
    on_enter: Option<Callback>,
    on_exit: Option<Callback>,
    on_update: Option<UpdateCallback>,
}

impl<S: FsmKey> State<S> {
    pub fn new(kind: S, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            on_enter: None,
            on_exit: None,
            on_update: None,
        }
    }

    pub fn on_enter(mut self, f: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_exit(mut self, f: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(f32) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn kind(&self) -> S {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn enter(&mut self) {
        if let Some(f) = self.on_enter.as_mut() {
            f();
        }
    }

    fn exit(&mut self) {
        if let Some(f) = self.on_exit.as_mut() {
            f();
        }
    }
}

impl<S: Debug> Debug for State<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Event-driven state machine with a deterministic transition table.
///
/// There is always exactly one current state. For each (event, from-state)
/// pair at most one to-state is registered. Events without a transition
/// from the current state are ignored.
pub struct StateMachine<S, E> {
    states: FxHashMap<S, State<S>>,
    transitions: FxHashMap<(E, S), S>,
    current: S,
    default: S,
}

impl<S: FsmKey, E: FsmKey> StateMachine<S, E> {
    /// Creates the machine with `default` registered and current.
    /// Its enter behavior is not run.
    pub fn new(default: State<S>) -> Self {
        let kind = default.kind;
        let mut states = FxHashMap::default();
        states.insert(kind, default);
        Self {
            states,
            transitions: FxHashMap::default(),
            current: kind,
            default: kind,
        }
    }

    /// Registers a state. Returns false, keeping the existing one, if the
    /// kind is already registered.
    pub fn add_state(&mut self, state: State<S>) -> bool {
        if self.states.contains_key(&state.kind) {
            return false;
        }
        self.states.insert(state.kind, state);
        true
    }

    pub fn add_transition(&mut self, event: E, from: S, to: S) -> Result<(), FsmError> {
        for kind in [from, to] {
            if !self.states.contains_key(&kind) {
                return Err(FsmError::UnknownState(format!("{:?}", kind)));
            }
        }
        match self.transitions.get(&(event, from)) {
            Some(existing) if *existing != to => Err(FsmError::ConflictingTransition {
                event: format!("{:?}", event),
                from: format!("{:?}", from),
                existing: format!("{:?}", existing),
                requested: format!("{:?}", to),
            }),
            Some(_) => Ok(()),
            None => {
                self.transitions.insert((event, from), to);
                Ok(())
            }
        }
    }

    /// Follows the transition for `event` from the current state, running
    /// the old state's exit and the new state's enter. Returns false when no
    /// transition applies.
    pub fn handle_event(&mut self, event: E) -> bool {
        let Some(&to) = self.transitions.get(&(event, self.current)) else {
            trace!("[FSM] {:?} ignored in {:?}", event, self.current);
            return false;
        };
        debug!("[FSM] {:?}: {:?} -> {:?}", event, self.current, to);
        self.switch_to(to);
        true
    }

    /// Runs the current state's update behavior.
    pub fn update(&mut self, dt: f32) {
        if let Some(state) = self.states.get_mut(&self.current) {
            if let Some(f) = state.on_update.as_mut() {
                f(dt);
            }
        }
    }

    /// Switches to `kind` without a transition lookup.
    ///
    /// Exit and enter behaviors still run. Meant for resets and debugging,
    /// not for normal event flow.
    pub fn make_current(&mut self, kind: S) -> Result<(), FsmError> {
        if !self.states.contains_key(&kind) {
            return Err(FsmError::UnknownState(format!("{:?}", kind)));
        }
        self.switch_to(kind);
        Ok(())
    }

    /// Forces the default state back in.
    pub fn reset(&mut self) {
        let default = self.default;
        self.switch_to(default);
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn current_state_name(&self) -> &str {
        self.states.get(&self.current).map(|s| s.name()).unwrap_or_default()
    }

    pub fn default_state(&self) -> S {
        self.default
    }

    pub fn state(&self, kind: S) -> Option<&State<S>> {
        self.states.get(&kind)
    }

    pub fn transition(&self, event: E, from: S) -> Option<S> {
        self.transitions.get(&(event, from)).copied()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    fn switch_to(&mut self, to: S) {
        if let Some(state) = self.states.get_mut(&self.current) {
            state.exit();
        }
        self.current = to;
        if let Some(state) = self.states.get_mut(&to) {
            state.enter();
        }
    }
}

impl<S: FsmKey, E: FsmKey> Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("default", &self.default)
            .field("states", &self.states.len())
            .field("transitions", &self.transitions.len())
            .finish()
    }
}
