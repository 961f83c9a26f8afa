//! Raw port sources

use core::convert::Infallible;

use embedded_hal_1::digital::InputPin;

use crate::pins::PORT_WIDTH;
use crate::{Error, Result};

/// Source of raw 8-bit port snapshots
pub trait PortReader {
    /// Error returned when the port cannot be read
    type Error;

    /// Reads the instantaneous level of every pin on the port, one bit per pin
    fn read_port(&mut self) -> core::result::Result<u8, Self::Error>;
}

impl<F: FnMut() -> u8> PortReader for F {
    type Error = Infallible;

    fn read_port(&mut self) -> core::result::Result<u8, Infallible> {
        Ok(self())
    }
}

/// Port assembled from individual input pins
///
/// Bit `i` of each snapshot is set when `pins[i]` reads high. Bits past `K` read as zero.
pub struct PinPort<P, const K: usize> {
    pins: [P; K],
}

impl<P: InputPin, const K: usize> PinPort<P, K> {
    /// Creates a port from up to eight pins
    ///
    /// More pins than the port is wide is reported as [`Error::ChannelOutOfRange`] with the pin
    /// count, saturated to `u8::MAX`.
    pub fn new(pins: [P; K]) -> Result<Self> {
        if K > PORT_WIDTH as usize {
            return Err(Error::ChannelOutOfRange(u8::try_from(K).unwrap_or(u8::MAX)));
        }

        Ok(Self { pins })
    }

    /// Gives the pins back
    pub fn release(self) -> [P; K] {
        self.pins
    }
}

impl<P: InputPin, const K: usize> PortReader for PinPort<P, K> {
    type Error = P::Error;

    fn read_port(&mut self) -> core::result::Result<u8, P::Error> {
        let mut raw = 0;
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_high()? {
                raw |= 1 << bit;
            }
        }
        Ok(raw)
    }
}
