//! Sample window debouncer
//!
//! Every processed sample is polarity corrected so that a set bit always means "pressed",
//! stored in a fixed ring of `N` slots, and the debounced state is the AND of the whole ring.
//! A press therefore needs `N` consecutive active samples while a release is reported on the
//! first inactive one.

use crate::pins::Pins;
use crate::{Error, Result};

/// Window size used when none is given
pub const DEFAULT_WINDOW: usize = 10;

/// Largest supported window size
pub const MAX_WINDOW: usize = 255;

/// Debounced level and edge flags captured after one processed sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Channels currently debounced as pressed
    pub state: Pins,
    /// Channels whose debounced level flipped on the last processed sample
    pub changed: Pins,
}

impl Snapshot {
    /// Channels in `mask` that became pressed on the last processed sample
    pub fn pressed(&self, mask: Pins) -> Pins {
        mask & self.changed & self.state
    }

    /// Channels in `mask` that became released on the last processed sample
    pub fn released(&self, mask: Pins) -> Pins {
        mask & self.changed & !self.state
    }

    /// Channels in `mask` that are currently pressed
    pub fn debounced_state(&self, mask: Pins) -> Pins {
        mask & self.state
    }

    /// Channels in `mask` that flipped on the last processed sample
    pub fn changed(&self, mask: Pins) -> Pins {
        mask & self.changed
    }
}

/// Debouncer for all channels of one 8-bit port
#[derive(Debug, Clone)]
pub struct SampleWindowDebouncer<const N: usize = DEFAULT_WINDOW> {
    /// Polarity corrected samples, oldest overwritten first
    window: [u8; N],
    /// Next slot to overwrite
    cursor: usize,
    /// Channels wired with pull-ups, inverted before use
    pulled_up: Pins,
    state: Pins,
    changed: Pins,
}

impl<const N: usize> SampleWindowDebouncer<N> {
    /// Creates a debouncer whose window starts out idle
    ///
    /// Channels in `pulled_up` idle high and are pressed when low, every other channel idles
    /// low and is pressed when high. Fails if `N` is zero or larger than [`MAX_WINDOW`].
    pub const fn new(pulled_up: Pins) -> Result<Self> {
        if N == 0 {
            return Err(Error::ZeroWindow);
        }

        if N > MAX_WINDOW {
            return Err(Error::WindowTooLarge(N));
        }

        Ok(Self {
            window: [0; N],
            cursor: 0,
            pulled_up,
            state: Pins::empty(),
            changed: Pins::empty(),
        })
    }

    /// Processes one raw port read
    ///
    /// Should be called on a regular interval, typically every 1 to 10 ms. The debounce time is
    /// `N` times that interval.
    pub fn process(&mut self, raw: u8) {
        let active = Pins::from_bits_retain(raw) ^ self.pulled_up;
        trace!("raw sample {}, active {}", raw, active.bits());
        self.process_active(active);
    }

    /// Processes a sample that is already polarity corrected
    ///
    /// Useful to load the debouncer with the pins that raised a wake-up interrupt before regular
    /// sampling starts.
    pub fn process_active(&mut self, active: Pins) {
        self.window[self.cursor] = active.bits();
        self.cursor += 1;
        if self.cursor >= N {
            self.cursor = 0;
        }

        let state = Pins::from_bits_retain(self.window.iter().fold(0xFF, |acc, sample| acc & sample));
        self.changed = state ^ self.state;
        self.state = state;

        if !self.changed.is_empty() {
            debug!(
                "debounced state {}, pressed {}, released {}",
                state.bits(),
                self.pressed(Pins::all()).bits(),
                self.released(Pins::all()).bits()
            );
        }
    }

    /// Channels in `mask` that became pressed on the last processed sample
    pub fn pressed(&self, mask: Pins) -> Pins {
        self.snapshot().pressed(mask)
    }

    /// Channels in `mask` that became released on the last processed sample
    pub fn released(&self, mask: Pins) -> Pins {
        self.snapshot().released(mask)
    }

    /// Channels in `mask` that are currently pressed
    pub fn debounced_state(&self, mask: Pins) -> Pins {
        self.snapshot().debounced_state(mask)
    }

    /// Channels in `mask` that flipped on the last processed sample
    pub fn changed(&self, mask: Pins) -> Pins {
        self.snapshot().changed(mask)
    }

    /// Copy of the current level and edge flags
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            changed: self.changed,
        }
    }

    /// Returns true when no channel in `mask` is pressed or partway through a press
    ///
    /// Once idle, sampling can stop until the next pin interrupt.
    pub fn is_idle(&self, mask: Pins) -> bool {
        self.debounced_state(mask).is_empty() && self.window.iter().all(|sample| sample & mask.bits() == 0)
    }

    /// Channels wired with pull-ups
    pub fn pulled_up(&self) -> Pins {
        self.pulled_up
    }

    /// Number of samples in the window
    pub const fn window_len(&self) -> usize {
        N
    }

    /// Forgets all samples and returns to the idle state
    pub fn reset(&mut self) {
        self.window = [0; N];
        self.cursor = 0;
        self.state = Pins::empty();
        self.changed = Pins::empty();
    }
}
