mod state_machine;
mod components;


pub use state_machine::{Callback, FsmKey, State, StateMachine, UpdateCallback};
pub use components::{tick_state_machines, NpcBrain};
