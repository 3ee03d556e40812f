//! Conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The conversation store is the executor that applies the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{ConvContext, ConvState, Message, MessageId, Sender};
pub use transition::{transition, TransitionError};
