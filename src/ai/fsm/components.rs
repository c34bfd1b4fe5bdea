use bevy::prelude::*;

use super::state_machine::{FsmKey, StateMachine};

/// Per-entity state machine. Events queued with [`NpcBrain::send`] are
/// handled in order on the next tick, before the current state updates.
#[derive(Component)]
pub struct NpcBrain<S: FsmKey, E: FsmKey> {
    pub machine: StateMachine<S, E>,
    pending: Vec<E>,
}

impl<S: FsmKey, E: FsmKey> NpcBrain<S, E> {
    pub fn new(machine: StateMachine<S, E>) -> Self {
        Self { machine, pending: Vec::new() }
    }

    pub fn send(&mut self, event: E) {
        self.pending.push(event);
    }

    pub fn pending(&self) -> &[E] {
        &self.pending
    }
}

pub fn tick_state_machines<S: FsmKey, E: FsmKey>(
    time: Res<Time>,
    mut brains: Query<&mut NpcBrain<S, E>>,
) {
    let dt = time.delta_secs();
    for mut brain in &mut brains {
        let brain = &mut *brain;
        for event in brain.pending.drain(..) {
            brain.machine.handle_event(event);
        }
        brain.machine.update(dt);
    }
}
