//! Session-management core of a real-time audio playback node.
//!
//! One [`Player`] per logical channel, registered in a [`SessionContext`],
//! pulled at a fixed cadence by an external voice transport and reaped by a
//! [`CleanupTask`] once abandoned. The decoding engine and the transport
//! itself are collaborators behind the traits in [`engine`] and [`voice`].

pub mod common;
pub mod configs;
pub mod engine;
pub mod player;
pub mod protocol;
pub mod server;
pub mod voice;

pub use common::errors::{EngineError, PlayerError};
pub use common::types::{ContextId, SessionId};
pub use player::{AudioLossCounter, FrameProvider, Player};
pub use server::{CleanupTask, SessionContext};

#[cfg(test)]
pub(crate) mod testutil;
