//! Boundary trait for the real-time voice transport.

use crate::player::FrameProvider;

/// One attached real-time transport.
///
/// The transport owns itself, its connection teardown and its frame clock;
/// the session core only checks liveness and hands it a frame provider to
/// drive.
pub trait VoiceTransport: Send + Sync {
    /// Whether the underlying connection is open.
    fn is_open(&self) -> bool;

    /// Installs the provider the transport will pull at its frame cadence.
    fn set_frame_provider(&self, provider: FrameProvider);
}
