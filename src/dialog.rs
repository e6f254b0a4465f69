//! Conversational dialog state machine
//!
//! Implements the Elm Architecture pattern: inbound events resolve to typed
//! intents, a pure transition decides the next session state and the effects
//! to run, and the router executes those effects.

mod effect;
pub mod event;
pub mod keyboards;
mod reply;
pub mod state;
pub(crate) mod transition;
pub mod views;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
#[allow(unused_imports)] // Public API re-exports
pub use event::{ButtonAction, EventKind, InboundEvent, Intent, JoinCode, MenuCommand, Sender};
#[allow(unused_imports)] // Public API re-exports
pub use reply::{InlineButton, Keyboard, Reply};
#[allow(unused_imports)] // Public API re-exports
pub use state::{
    DialogContext, PollDraft, PollEditMode, ProfileField, SessionState, MAX_POLL_OPTIONS,
    MIN_POLL_OPTIONS,
};
#[allow(unused_imports)] // Public API re-exports
pub use transition::{transition, TransitionError, TransitionResult};
