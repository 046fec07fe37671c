use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{engine::PlaybackEngine, player::AudioLossCounter};

/// Pull adapter driven by the voice transport at its own frame cadence.
///
/// Availability check and retrieval are split so the transport can skip
/// retrieval cheaply on an empty tick while accounting stays exact: one
/// counter event per [`can_provide`](Self::can_provide) call, none for
/// retrieval.
pub struct FrameProvider {
    engine: Arc<dyn PlaybackEngine>,
    loss_counter: Arc<AudioLossCounter>,
    closing: Arc<AtomicBool>,
    last_frame: Mutex<Option<Bytes>>,
}

impl FrameProvider {
    pub(crate) fn new(
        engine: Arc<dyn PlaybackEngine>,
        loss_counter: Arc<AudioLossCounter>,
        closing: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            loss_counter,
            closing,
            last_frame: Mutex::new(None),
        }
    }

    /// Pulls the next frame from the engine and buffers it.
    ///
    /// Once destroy has been requested this returns `false` without touching
    /// the counters: the session is being torn down, not losing frames.
    pub fn can_provide(&self) -> bool {
        if self.closing.load(Ordering::Acquire) {
            return false;
        }
        match self.engine.provide() {
            Some(frame) => {
                self.loss_counter.record_success();
                *self.last_frame.lock() = Some(frame);
                true
            }
            None => {
                self.loss_counter.record_loss();
                *self.last_frame.lock() = None;
                false
            }
        }
    }

    /// Takes the frame buffered by the most recent successful
    /// [`can_provide`](Self::can_provide); `None` without one.
    pub fn retrieve_opus_frame(&self) -> Option<Bytes> {
        self.last_frame.lock().take()
    }
}
