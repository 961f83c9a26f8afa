//! Channel masks for an 8-bit port

use bitflags::bitflags;

use crate::{Error, Result};

/// Number of channels on one port
pub const PORT_WIDTH: u8 = 8;

bitflags! {
    /// Set of channels on a port, one bit per pin
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pins: u8 {
        /// Port pin 0
        const PIN_0 = 1 << 0;
        /// Port pin 1
        const PIN_1 = 1 << 1;
        /// Port pin 2
        const PIN_2 = 1 << 2;
        /// Port pin 3
        const PIN_3 = 1 << 3;
        /// Port pin 4
        const PIN_4 = 1 << 4;
        /// Port pin 5
        const PIN_5 = 1 << 5;
        /// Port pin 6
        const PIN_6 = 1 << 6;
        /// Port pin 7
        const PIN_7 = 1 << 7;
    }
}

impl Pins {
    /// Mask holding the single channel at `index`
    pub const fn channel(index: u8) -> Result<Self> {
        if index >= PORT_WIDTH {
            return Err(Error::ChannelOutOfRange(index));
        }
        Ok(Self::from_bits_retain(1 << index))
    }
}
