//! Boundary traits for the decoding/transcoding engine that produces audio
//! frames for one session.

use std::sync::{Arc, Weak};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::common::{errors::EngineError, types::SessionId};

/// Number of equalizer bands exposed by the engine's filter chain.
pub const EQ_BAND_COUNT: usize = 15;

/// A track handed to the engine for playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub identifier: String,
    /// Track length in milliseconds. Zero when unknown.
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub is_stream: bool,
}

/// Track lifecycle callbacks.
///
/// The player registers itself exactly once at construction; the engine
/// must invoke these from a tokio runtime context. This is a single fixed
/// listener, not an extension point.
pub trait TrackEventListener: Send + Sync {
    fn on_track_start(&self);
    fn on_track_end(&self);
}

/// One session's playback engine instance.
///
/// The engine carries its own internal synchronization: play/stop/seek and
/// friends are safe against concurrent `provide` calls. The session core
/// only serializes the bookkeeping around it.
pub trait PlaybackEngine: Send + Sync {
    /// Registers the lifecycle listener. Called once, before any playback.
    fn set_listener(&self, listener: Weak<dyn TrackEventListener>);

    /// Starts `track`, replacing whatever is currently playing.
    fn play(&self, track: Track);

    /// Stops the current track. No-op when idle.
    fn stop(&self);

    fn set_paused(&self, paused: bool);

    /// Volume as an integer percentage.
    fn set_volume(&self, volume: i32);

    /// Repositions the current track. No-op when idle.
    fn seek(&self, position_ms: u64);

    /// Position of the playing track in milliseconds, or `None` when idle.
    fn position(&self) -> Option<u64>;

    /// Whether a track is currently loaded, paused or not.
    fn has_track(&self) -> bool;

    /// Attaches or updates the equalizer (`Some`), or detaches it from the
    /// signal path entirely (`None`).
    fn apply_equalizer(&self, gains: Option<[f32; EQ_BAND_COUNT]>);

    /// Pulls the next encoded frame. Non-blocking; `None` when no frame is
    /// ready for this cadence tick.
    fn provide(&self) -> Option<Bytes>;

    /// Releases the engine. No frame may be provided once this returns.
    fn close(&self) -> Result<(), EngineError>;
}

/// Creates engine instances, one per session.
pub trait EngineFactory: Send + Sync {
    fn create_engine(&self, session_id: SessionId) -> Arc<dyn PlaybackEngine>;
}
