//! Shared engine handle
//!
//! For hosts whose audio callback and UI run on different threads. A single
//! lock guards the filter state, ring buffer and leveling state together, so
//! a level readout never observes a half-written window.

use std::sync::Arc;

use evo_core::BAND_COUNT;
use parking_lot::{Mutex, MutexGuard};

use crate::engine::EqEngine;
use crate::host::HostStream;

/// Cloneable, lock-protected engine
#[derive(Debug, Clone, Default)]
pub struct SharedEngine {
    inner: Arc<Mutex<EqEngine>>,
}

impl SharedEngine {
    pub fn new(engine: EqEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Audio-callback entry point
    pub fn process_buffer<H: HostStream + ?Sized>(
        &self,
        host: &H,
        pcm: &mut [i16],
        frames: i32,
    ) -> bool {
        self.inner.lock().process_buffer(host, pcm, frames)
    }

    pub fn levels(&self) -> [f32; BAND_COUNT] {
        self.inner.lock().levels()
    }

    pub fn peaks(&self) -> [f32; BAND_COUNT] {
        self.inner.lock().peaks()
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut EqEngine) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn lock(&self) -> MutexGuard<'_, EqEngine> {
        self.inner.lock()
    }
}

impl From<EqEngine> for SharedEngine {
    fn from(engine: EqEngine) -> Self {
        Self::new(engine)
    }
}
