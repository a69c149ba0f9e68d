use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-slot admission for the frame pipeline.
///
/// At most one [`InFlight`] token exists at a time. A frame that finds the
/// slot taken is dropped by the caller; nothing is queued.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    busy: Arc<AtomicBool>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                busy: self.busy.clone(),
            })
    }
}

/// Proof that a frame owns the pipeline. Dropping it frees the slot.
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
