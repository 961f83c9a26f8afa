//! Periodic port sampling

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::{Sender, TrySendError};
use embassy_time::{Duration, Ticker};

use crate::debounce::Snapshot;
use crate::pins::Pins;
use crate::port::PortReader;
use crate::shared::SharedDebouncer;

/// Sampling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Time between two port reads
    pub interval: Duration,
}

impl SamplerConfig {
    /// Creates a configuration sampling every `interval`
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Time a press must be held before it is reported with a window of `N` samples
    pub fn debounce_time<const N: usize>(&self) -> Duration {
        self.interval * N as u32
    }
}

/// Samples every 10ms
impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
        }
    }
}

/// Debounced edges produced by one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortEvent {
    /// Channels that became pressed
    pub pressed: Pins,
    /// Channels that became released
    pub released: Pins,
}

impl PortEvent {
    fn from_snapshot(snapshot: Snapshot) -> Option<Self> {
        if snapshot.changed.is_empty() {
            return None;
        }

        Some(Self {
            pressed: snapshot.pressed(Pins::all()),
            released: snapshot.released(Pins::all()),
        })
    }
}

/// Feeds a [`SharedDebouncer`] from a [`PortReader`]
pub struct Sampler<R> {
    reader: R,
    config: SamplerConfig,
}

impl<R: PortReader> Sampler<R> {
    /// Creates a sampler
    pub fn new(reader: R, config: SamplerConfig) -> Self {
        Self { reader, config }
    }

    /// Returns the sampling configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Reads the port once and processes the sample
    pub fn sample<M: RawMutex, const N: usize>(
        &mut self,
        debouncer: &SharedDebouncer<M, N>,
    ) -> Result<Option<PortEvent>, R::Error> {
        let raw = self.reader.read_port()?;
        Ok(PortEvent::from_snapshot(debouncer.process(raw)))
    }

    /// Samples once and queues any resulting event
    ///
    /// Events are dropped with a warning when the queue is full.
    pub fn poll<M: RawMutex, EM: RawMutex, const N: usize, const Q: usize>(
        &mut self,
        debouncer: &SharedDebouncer<M, N>,
        events: &Sender<'_, EM, PortEvent, Q>,
    ) -> Result<Option<PortEvent>, R::Error> {
        let event = self.sample(debouncer)?;

        if let Some(event) = event {
            if let Err(TrySendError::Full(dropped)) = events.try_send(event) {
                warn!(
                    "Event queue full, dropped pressed {} released {}",
                    dropped.pressed.bits(),
                    dropped.released.bits()
                );
            }
        }

        Ok(event)
    }

    /// Samples the port every configured interval, forever
    ///
    /// Only returns if the port cannot be read.
    pub async fn run<M: RawMutex, EM: RawMutex, const N: usize, const Q: usize>(
        &mut self,
        debouncer: &SharedDebouncer<M, N>,
        events: Sender<'_, EM, PortEvent, Q>,
    ) -> Result<(), R::Error> {
        debug!(
            "Sampling every {} us, debounce time {} us",
            self.config.interval.as_micros(),
            self.config.debounce_time::<N>().as_micros()
        );

        let mut ticker = Ticker::every(self.config.interval);
        loop {
            self.poll(debouncer, &events)?;
            ticker.next().await;
        }
    }

    /// Gives the reader back
    pub fn release(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::channel::Channel;

    use super::*;
    use crate::debounce::SampleWindowDebouncer;

    const BUTTON: Pins = Pins::PIN_1;

    fn debouncer<const N: usize>(pulled_up: Pins) -> SharedDebouncer<NoopRawMutex, N> {
        SharedDebouncer::new(SampleWindowDebouncer::new(pulled_up).unwrap())
    }

    /// Port that fails once its scripted samples run out
    struct DisconnectingPort<'a> {
        samples: core::slice::Iter<'a, u8>,
    }

    impl PortReader for DisconnectingPort<'_> {
        type Error = ();

        fn read_port(&mut self) -> Result<u8, ()> {
            self.samples.next().copied().ok_or(())
        }
    }

    #[test]
    fn test_debounce_time() {
        let config = SamplerConfig::default();
        assert_eq!(config.interval, Duration::from_millis(10));
        assert_eq!(config.debounce_time::<10>(), Duration::from_millis(100));
        assert_eq!(SamplerConfig::new(Duration::from_millis(1)).debounce_time::<5>(), Duration::from_millis(5));
    }

    #[test]
    fn test_sample_reports_edges() {
        let debouncer = debouncer::<3>(Pins::all());
        let mut raw = [0xFFu8, 0xFD, 0xFD, 0xFD, 0xFD, 0xFF].into_iter();
        let mut sampler = Sampler::new(move || raw.next().unwrap_or(0xFF), SamplerConfig::default());

        assert_eq!(sampler.sample(&debouncer), Ok(None));
        assert_eq!(sampler.sample(&debouncer), Ok(None));
        assert_eq!(sampler.sample(&debouncer), Ok(None));
        assert_eq!(
            sampler.sample(&debouncer),
            Ok(Some(PortEvent {
                pressed: BUTTON,
                released: Pins::empty(),
            }))
        );
        assert_eq!(sampler.sample(&debouncer), Ok(None));
        assert_eq!(
            sampler.sample(&debouncer),
            Ok(Some(PortEvent {
                pressed: Pins::empty(),
                released: BUTTON,
            }))
        );
        assert_eq!(debouncer.debounced_state(BUTTON), Pins::empty());
    }

    #[test]
    fn test_poll_queues_events() {
        let debouncer = debouncer::<1>(Pins::empty());
        let events: Channel<NoopRawMutex, PortEvent, 2> = Channel::new();
        let mut raw = [0x01u8, 0x01, 0x00].into_iter();
        let mut sampler = Sampler::new(move || raw.next().unwrap_or(0), SamplerConfig::default());

        for _ in 0..3 {
            sampler.poll(&debouncer, &events.sender()).unwrap();
        }

        let pressed = block_on(events.receive());
        assert_eq!(pressed.pressed, Pins::PIN_0);
        let released = block_on(events.receive());
        assert_eq!(released.released, Pins::PIN_0);
        assert!(events.try_receive().is_err());
    }

    #[test]
    fn test_poll_full_queue_keeps_sampling() {
        let debouncer = debouncer::<1>(Pins::empty());
        let events: Channel<NoopRawMutex, PortEvent, 1> = Channel::new();
        let mut raw = [0x04u8, 0x00, 0x04].into_iter();
        let mut sampler = Sampler::new(move || raw.next().unwrap_or(0), SamplerConfig::default());

        let first = sampler.poll(&debouncer, &events.sender()).unwrap();
        let second = sampler.poll(&debouncer, &events.sender()).unwrap();
        let third = sampler.poll(&debouncer, &events.sender()).unwrap();

        assert_eq!(first.map(|event| event.pressed), Some(Pins::PIN_2));
        assert_eq!(second.map(|event| event.released), Some(Pins::PIN_2));
        assert_eq!(third.map(|event| event.pressed), Some(Pins::PIN_2));
        assert_eq!(debouncer.debounced_state(Pins::all()), Pins::PIN_2);

        // Only the first event fit
        assert_eq!(events.try_receive().ok().map(|event| event.pressed), Some(Pins::PIN_2));
        assert!(events.try_receive().is_err());
    }

    #[test]
    fn test_run_stops_on_read_error() {
        let debouncer = debouncer::<2>(Pins::empty());
        let events: Channel<NoopRawMutex, PortEvent, 4> = Channel::new();
        let samples = [0x01u8, 0x01, 0x01, 0x00, 0x00];
        // Zero interval so the ticker never waits
        let mut sampler = Sampler::new(
            DisconnectingPort {
                samples: samples.iter(),
            },
            SamplerConfig::new(Duration::from_ticks(0)),
        );

        assert_eq!(block_on(sampler.run(&debouncer, events.sender())), Err(()));

        let pressed = events.try_receive().unwrap();
        assert_eq!(pressed.pressed, Pins::PIN_0);
        assert_eq!(pressed.released, Pins::empty());
        let released = events.try_receive().unwrap();
        assert_eq!(released.released, Pins::PIN_0);
        assert!(events.try_receive().is_err());
        assert!(debouncer.is_idle(Pins::all()));
        let mut port = sampler.release();
        assert!(port.samples.next().is_none());
    }

    #[test]
    fn test_release_reader() {
        let sampler = Sampler::new(|| 0x5Au8, SamplerConfig::default());
        let mut reader = sampler.release();
        assert_eq!(reader.read_port(), Ok(0x5A));
    }
}
