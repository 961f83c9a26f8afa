//! Debouncer shared between an interrupt handler and the main loop
//!
//! Processing and queries each run inside one lock, so a reader never sees the debounced
//! state from one sample paired with the edge flags of another. Use
//! [`CriticalSectionRawMutex`](embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex) when
//! processing happens in interrupt context.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::debounce::{SampleWindowDebouncer, Snapshot, DEFAULT_WINDOW};
use crate::pins::Pins;

/// Lock-protected [`SampleWindowDebouncer`]
pub struct SharedDebouncer<M: RawMutex, const N: usize = DEFAULT_WINDOW> {
    inner: Mutex<M, RefCell<SampleWindowDebouncer<N>>>,
}

impl<M: RawMutex, const N: usize> SharedDebouncer<M, N> {
    /// Wraps a debouncer, usable in a `static`
    pub const fn new(debouncer: SampleWindowDebouncer<N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(debouncer)),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut SampleWindowDebouncer<N>) -> R) -> R {
        self.inner.lock(|debouncer| f(&mut debouncer.borrow_mut()))
    }

    /// Processes one raw port read, see [`SampleWindowDebouncer::process`]
    ///
    /// Returns the level and edge flags produced by this sample.
    pub fn process(&self, raw: u8) -> Snapshot {
        self.with(|debouncer| {
            debouncer.process(raw);
            debouncer.snapshot()
        })
    }

    /// Processes a polarity corrected sample, see [`SampleWindowDebouncer::process_active`]
    pub fn process_active(&self, active: Pins) -> Snapshot {
        self.with(|debouncer| {
            debouncer.process_active(active);
            debouncer.snapshot()
        })
    }

    /// Channels in `mask` that became pressed on the last processed sample
    pub fn pressed(&self, mask: Pins) -> Pins {
        self.with(|debouncer| debouncer.pressed(mask))
    }

    /// Channels in `mask` that became released on the last processed sample
    pub fn released(&self, mask: Pins) -> Pins {
        self.with(|debouncer| debouncer.released(mask))
    }

    /// Channels in `mask` that are currently pressed
    pub fn debounced_state(&self, mask: Pins) -> Pins {
        self.with(|debouncer| debouncer.debounced_state(mask))
    }

    /// Channels in `mask` that flipped on the last processed sample
    pub fn changed(&self, mask: Pins) -> Pins {
        self.with(|debouncer| debouncer.changed(mask))
    }

    /// Consistent copy of the level and edge flags
    pub fn snapshot(&self) -> Snapshot {
        self.with(|debouncer| debouncer.snapshot())
    }

    /// See [`SampleWindowDebouncer::is_idle`]
    pub fn is_idle(&self, mask: Pins) -> bool {
        self.with(|debouncer| debouncer.is_idle(mask))
    }

    /// Forgets all samples and returns to the idle state
    pub fn reset(&self) {
        self.with(|debouncer| debouncer.reset())
    }
}
