//! Completion orchestration and answer delivery
//!
//! [`Orchestrator`] runs the tool-calling rounds. [`Delivery`] turns the
//! outcome into a complete reply (optionally with audio) or a cancellable
//! text stream.

mod delivery;
mod error;
mod orchestrator;

pub use delivery::{stream_error_fragment, Delivery, SpeakOptions, SpeakReply, TextStream};
pub use error::{ChatError, ChatResult};
pub use orchestrator::{Finalized, Orchestrator, PreparedStream};
