pub mod loss;
pub mod provider;
pub mod state;

pub use loss::AudioLossCounter;
pub use provider::FrameProvider;
pub use state::PlayerState;

use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, AtomicI32, Ordering},
};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, warn};

use crate::{
    common::{
        errors::PlayerError,
        types::{SessionId, now_ms},
    },
    engine::{EQ_BAND_COUNT, PlaybackEngine, Track, TrackEventListener},
    protocol::OutgoingMessage,
    server::SessionContext,
    voice::VoiceTransport,
};

/// Fixed cadence of the periodic state broadcast.
const UPDATE_INTERVAL: Duration = Duration::from_secs(5);

/// Gain bounds enforced by the engine's equalizer filter.
const GAIN_MIN: f32 = -0.25;
const GAIN_MAX: f32 = 1.0;

struct EqualizerState {
    gains: [f32; EQ_BAND_COUNT],
    /// Whether the filter is currently attached to the signal path. Derived
    /// from the gains by a full scan after every mutation.
    applied: bool,
}

/// One session's playback state and control surface.
///
/// Control commands, the frame-pull cadence, the broadcast task and the
/// cleanup sweep may all touch a player concurrently; every bookkeeping
/// field is an atomic or sits behind its own lock.
pub struct Player {
    session_id: SessionId,
    session: Weak<SessionContext>,
    engine: Arc<dyn PlaybackEngine>,
    loss_counter: Arc<AudioLossCounter>,
    paused: AtomicBool,
    volume: AtomicI32,
    equalizer: Mutex<EqualizerState>,
    broadcast_task: Mutex<Option<JoinHandle<()>>>,
    transport: Mutex<Option<Weak<dyn VoiceTransport>>>,
    /// Time of construction or of the last track end. Only meaningful while
    /// idle.
    last_active: Mutex<Instant>,
    closing: Arc<AtomicBool>,
}

impl Player {
    /// Must only be called by [`SessionContext::create`], which owns the
    /// registry entry this player lives in.
    pub(crate) fn new(session: &Arc<SessionContext>, session_id: SessionId) -> Arc<Self> {
        let engine = session.engines().create_engine(session_id);
        let player = Arc::new(Self {
            session_id,
            session: Arc::downgrade(session),
            engine,
            loss_counter: Arc::new(AudioLossCounter::default()),
            paused: AtomicBool::new(false),
            volume: AtomicI32::new(100),
            equalizer: Mutex::new(EqualizerState {
                gains: [0.0; EQ_BAND_COUNT],
                applied: false,
            }),
            broadcast_task: Mutex::new(None),
            transport: Mutex::new(None),
            last_active: Mutex::new(Instant::now()),
            closing: Arc::new(AtomicBool::new(false)),
        });
        let listener: Weak<dyn TrackEventListener> = Arc::downgrade(&player);
        player.engine.set_listener(listener);
        player
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Starts `track`, replacing whatever was playing, and immediately
    /// broadcasts a state snapshot.
    pub fn play(&self, track: Track) {
        self.engine.play(track);
        self.send_update();
    }

    /// Stops the current track without destroying the player.
    pub fn stop(&self) {
        self.engine.stop();
    }

    /// Session-level pause, distinct from the context-wide global pause.
    pub fn set_pause(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
        self.engine.set_paused(paused);
    }

    pub fn set_volume(&self, volume: i32) {
        self.volume.store(volume, Ordering::Release);
        self.engine.set_volume(volume);
    }

    /// Repositions the current track.
    pub fn seek_to(&self, position_ms: u64) -> Result<(), PlayerError> {
        if !self.engine.has_track() {
            return Err(PlayerError::InvalidState(
                "can't seek when not playing anything",
            ));
        }
        self.engine.seek(position_ms);
        Ok(())
    }

    /// Sets one equalizer band's gain.
    ///
    /// The filter stays attached iff any band is non-zero. That is re-derived
    /// by scanning the full band set after every mutation rather than tracked
    /// incrementally.
    pub fn set_band_gain(&self, band: usize, gain: f32) {
        debug!("Setting band {}'s gain to {}", band, gain);
        let mut eq = self.equalizer.lock();
        if band >= EQ_BAND_COUNT {
            warn!("Ignoring gain for out-of-range equalizer band {}", band);
            return;
        }
        eq.gains[band] = gain.clamp(GAIN_MIN, GAIN_MAX);
        if eq.gains[band] == 0.0 {
            if !eq.applied {
                return;
            }
            if eq.gains.iter().any(|g| *g != 0.0) {
                self.engine.apply_equalizer(Some(eq.gains));
            } else {
                self.engine.apply_equalizer(None);
                eq.applied = false;
            }
        } else {
            self.engine.apply_equalizer(Some(eq.gains));
            eq.applied = true;
        }
    }

    /// Hands the frame supply over to `transport`.
    ///
    /// The binding is weak: the transport owns itself and its own teardown,
    /// the player only ever checks liveness through it.
    pub fn provide_to(&self, transport: &Arc<dyn VoiceTransport>) {
        *self.transport.lock() = Some(Arc::downgrade(transport));
        transport.set_frame_provider(FrameProvider::new(
            self.engine.clone(),
            self.loss_counter.clone(),
            self.closing.clone(),
        ));
    }

    /// Releases the engine. Must only be invoked through
    /// [`SessionContext::destroy`] so the registry stays consistent.
    ///
    /// Does not wait for in-flight frame pulls; the closing flag guarantees
    /// none of them succeeds after this returns.
    pub(crate) fn destroy(&self) -> Result<(), PlayerError> {
        self.closing.store(true, Ordering::Release);
        self.cancel_broadcast();
        self.engine.close()?;
        Ok(())
    }

    fn cancel_broadcast(&self) {
        if let Some(task) = self.broadcast_task.lock().take() {
            task.abort();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn volume(&self) -> i32 {
        self.volume.load(Ordering::Acquire)
    }

    pub fn band_gains(&self) -> [f32; EQ_BAND_COUNT] {
        self.equalizer.lock().gains
    }

    pub fn is_equalizer_applied(&self) -> bool {
        self.equalizer.lock().applied
    }

    /// Whether a track is loaded, paused or not.
    pub fn has_playing_track(&self) -> bool {
        self.engine.has_track()
    }

    /// Whether a track is loaded and audible.
    pub fn is_playing(&self) -> bool {
        self.engine.has_track() && !self.is_paused()
    }

    /// Whether an attached transport is still alive and open.
    pub fn is_voice_connected(&self) -> bool {
        match self.transport.lock().as_ref().and_then(|t| t.upgrade()) {
            Some(transport) => transport.is_open(),
            None => false,
        }
    }

    /// Time of construction or of the last track end.
    pub fn last_active(&self) -> Instant {
        *self.last_active.lock()
    }

    pub fn loss_counter(&self) -> &AudioLossCounter {
        &self.loss_counter
    }

    /// Position snapshot paired with the wall clock.
    pub fn state(&self) -> PlayerState {
        PlayerState {
            time: now_ms(),
            position: self.engine.position(),
        }
    }

    fn send_update(&self) {
        if let Some(session) = self.session.upgrade() {
            session.send(&OutgoingMessage::PlayerUpdate {
                session_id: self.session_id,
                state: self.state(),
            });
        }
    }
}

impl TrackEventListener for Player {
    /// Starts the broadcast task unless one is already live. First tick is
    /// immediate, then every five seconds until cancelled.
    fn on_track_start(&self) {
        let mut slot = self.broadcast_task.lock();
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }
        let session = self.session.clone();
        let session_id = self.session_id;
        let engine = self.engine.clone();
        *slot = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(UPDATE_INTERVAL);
            loop {
                interval.tick().await;
                let Some(context) = session.upgrade() else { break };
                if context.is_global_paused() {
                    continue;
                }
                context.send(&OutgoingMessage::PlayerUpdate {
                    session_id,
                    state: PlayerState {
                        time: now_ms(),
                        position: engine.position(),
                    },
                });
            }
        }));
    }

    /// Cancellation is best-effort: an in-flight tick may still emit once
    /// after the abort is requested.
    fn on_track_end(&self) {
        self.cancel_broadcast();
        *self.last_active.lock() = Instant::now();
    }
}
