//! Mock collaborators shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering},
    },
};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    common::{
        errors::EngineError,
        types::{ContextId, SessionId},
    },
    engine::{EQ_BAND_COUNT, EngineFactory, PlaybackEngine, Track, TrackEventListener},
    player::FrameProvider,
    server::SessionContext,
    voice::VoiceTransport,
};

pub(crate) fn track(identifier: &str) -> Track {
    Track {
        identifier: identifier.to_string(),
        length: 212_000,
        is_stream: false,
    }
}

/// In-memory engine that fires lifecycle callbacks synchronously.
#[derive(Default)]
pub(crate) struct MockEngine {
    listener: Mutex<Option<Weak<dyn TrackEventListener>>>,
    track: Mutex<Option<Track>>,
    position: AtomicU64,
    pub(crate) paused: AtomicBool,
    pub(crate) volume: AtomicI32,
    pub(crate) frames: Mutex<VecDeque<Bytes>>,
    pub(crate) equalizer: Mutex<Option<[f32; EQ_BAND_COUNT]>>,
    pub(crate) closed: AtomicBool,
    pub(crate) fail_close: AtomicBool,
}

impl MockEngine {
    pub(crate) fn queue_frame(&self, data: &'static [u8]) {
        self.frames.lock().push_back(Bytes::from_static(data));
    }

    fn fire(&self, f: impl Fn(&dyn TrackEventListener)) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener.and_then(|l| l.upgrade()) {
            f(&*listener);
        }
    }
}

impl PlaybackEngine for MockEngine {
    fn set_listener(&self, listener: Weak<dyn TrackEventListener>) {
        *self.listener.lock() = Some(listener);
    }

    fn play(&self, track: Track) {
        let replaced = self.track.lock().replace(track).is_some();
        self.position.store(0, Ordering::Release);
        if replaced {
            self.fire(|l| l.on_track_end());
        }
        self.fire(|l| l.on_track_start());
    }

    fn stop(&self) {
        if self.track.lock().take().is_some() {
            self.fire(|l| l.on_track_end());
        }
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    fn set_volume(&self, volume: i32) {
        self.volume.store(volume, Ordering::Release);
    }

    fn seek(&self, position_ms: u64) {
        self.position.store(position_ms, Ordering::Release);
    }

    fn position(&self) -> Option<u64> {
        self.has_track()
            .then(|| self.position.load(Ordering::Acquire))
    }

    fn has_track(&self) -> bool {
        self.track.lock().is_some()
    }

    fn apply_equalizer(&self, gains: Option<[f32; EQ_BAND_COUNT]>) {
        *self.equalizer.lock() = gains;
    }

    fn provide(&self) -> Option<Bytes> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        self.frames.lock().pop_front()
    }

    fn close(&self) -> Result<(), EngineError> {
        self.closed.store(true, Ordering::Release);
        self.track.lock().take();
        if self.fail_close.load(Ordering::Acquire) {
            return Err(EngineError::new("decoder refused to shut down"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockFactory {
    engines: Mutex<Vec<(SessionId, Arc<MockEngine>)>>,
}

impl MockFactory {
    pub(crate) fn engine_for(&self, session_id: SessionId) -> Option<Arc<MockEngine>> {
        self.engines
            .lock()
            .iter()
            .find(|(id, _)| *id == session_id)
            .map(|(_, engine)| engine.clone())
    }
}

impl EngineFactory for MockFactory {
    fn create_engine(&self, session_id: SessionId) -> Arc<dyn PlaybackEngine> {
        let engine = Arc::new(MockEngine::default());
        self.engines.lock().push((session_id, engine.clone()));
        engine
    }
}

#[derive(Default)]
pub(crate) struct MockTransport {
    pub(crate) open: AtomicBool,
    pub(crate) provider: Mutex<Option<FrameProvider>>,
}

impl VoiceTransport for MockTransport {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn set_frame_provider(&self, provider: FrameProvider) {
        *self.provider.lock() = Some(provider);
    }
}

pub(crate) struct TestHarness {
    pub(crate) context: Arc<SessionContext>,
    pub(crate) factory: Arc<MockFactory>,
    pub(crate) events: flume::Receiver<String>,
}

pub(crate) fn harness() -> TestHarness {
    let (tx, rx) = flume::unbounded();
    let factory = Arc::new(MockFactory::default());
    let context = SessionContext::new(ContextId::generate(), factory.clone(), tx);
    TestHarness {
        context,
        factory,
        events: rx,
    }
}

/// Drains every event currently on the wire, parsed as JSON.
pub(crate) fn drain_ops(events: &flume::Receiver<String>) -> Vec<serde_json::Value> {
    events
        .try_iter()
        .map(|json| serde_json::from_str(&json).unwrap())
        .collect()
}
