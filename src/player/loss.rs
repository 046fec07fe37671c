use std::sync::atomic::{AtomicU64, Ordering};

/// Frame-delivery accounting for one session.
///
/// Exactly one of the two counters is bumped per frame-cadence tick by
/// [`FrameProvider::can_provide`](crate::player::FrameProvider::can_provide).
/// Totals only ever increase; there is no reset.
#[derive(Debug, Default)]
pub struct AudioLossCounter {
    success: AtomicU64,
    loss: AtomicU64,
}

impl AudioLossCounter {
    pub(crate) fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_loss(&self) {
        self.loss.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames delivered since creation.
    pub fn successes(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    /// Cadence ticks that found no frame since creation.
    pub fn losses(&self) -> u64 {
        self.loss.load(Ordering::Relaxed)
    }
}
