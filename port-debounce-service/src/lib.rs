//! Sample-window button debouncing for a single 8-bit GPIO port
//!
//! Raw port bytes are fed into a [`SampleWindowDebouncer`] on a fixed cadence. A channel
//! latches pressed once every sample in the window agrees it is active and drops back to
//! released on the first sample that reports it inactive.

#![no_std]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

pub mod debounce;
pub mod pins;
pub mod port;
pub mod sampler;
pub mod shared;

pub use debounce::{SampleWindowDebouncer, Snapshot, DEFAULT_WINDOW, MAX_WINDOW};
pub use pins::Pins;
pub use port::{PinPort, PortReader};
pub use sampler::{PortEvent, Sampler, SamplerConfig};
pub use shared::SharedDebouncer;

/// Debouncer configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The sample window has no slots
    ZeroWindow,
    /// The sample window is larger than [`MAX_WINDOW`]
    WindowTooLarge(usize),
    /// A channel index does not fit in an 8-bit port
    ChannelOutOfRange(u8),
}

/// Debouncer result type
pub type Result<T> = core::result::Result<T, Error>;
