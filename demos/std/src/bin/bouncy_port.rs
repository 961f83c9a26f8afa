use embassy_executor::{Executor, Spawner};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Duration;
use log::{error, info};
use port_debounce_service::{Pins, PortEvent, SampleWindowDebouncer, Sampler, SamplerConfig, SharedDebouncer};
use static_cell::StaticCell;

/// Pulled up, reads low while pressed
const SELECT: Pins = Pins::PIN_2;
/// Pulled down, reads high while pressed
const START: Pins = Pins::PIN_3;

const WINDOW: usize = 5;
const SAMPLE_INTERVAL: Duration = Duration::from_millis(2);
/// One press and one release for each button
const EXPECTED_EVENTS: usize = 4;

static PORT: SharedDebouncer<CriticalSectionRawMutex, WINDOW> = SharedDebouncer::new(
    match SampleWindowDebouncer::new(SELECT) {
        Ok(debouncer) => debouncer,
        Err(_) => panic!("invalid port configuration"),
    },
);

static EVENTS: Channel<CriticalSectionRawMutex, PortEvent, 4> = Channel::new();

/// Whether a button held over `held` is electrically closed at `tick`, with contact bounce on
/// both edges
fn contact(tick: u32, held: core::ops::Range<u32>) -> bool {
    let bouncing = (held.start..held.start + 6).contains(&tick) || (held.end..held.end + 4).contains(&tick);
    if bouncing {
        tick % 2 == 0
    } else {
        held.contains(&tick)
    }
}

/// Raw port level for one sample of the scripted button presses
fn bouncy_port(tick: u32) -> u8 {
    let mut raw = SELECT.bits();
    if contact(tick, 20..60) {
        raw &= !SELECT.bits();
    }
    if contact(tick, 80..120) {
        raw |= START.bits();
    }
    raw
}

#[embassy_executor::task]
async fn sampler_task() {
    let mut tick = 0;
    let reader = move || {
        let raw = bouncy_port(tick);
        tick += 1;
        raw
    };

    let mut sampler = Sampler::new(reader, SamplerConfig::new(SAMPLE_INTERVAL));
    info!(
        "Debounce time {} ms",
        sampler.config().debounce_time::<WINDOW>().as_millis()
    );

    if sampler.run(&PORT, EVENTS.sender()).await.is_err() {
        error!("Port read failed");
    }
}

async fn run(spawner: Spawner) {
    spawner.must_spawn(sampler_task());

    for _ in 0..EXPECTED_EVENTS {
        let event = EVENTS.receive().await;

        if event.pressed.contains(SELECT) {
            info!("Select pressed");
        }
        if event.released.contains(SELECT) {
            info!("Select released");
        }
        if event.pressed.contains(START) {
            info!("Start pressed");
        }
        if event.released.contains(START) {
            info!("Start released");
        }
    }

    embassy_time::Timer::after(SAMPLE_INTERVAL * 2 * WINDOW as u32).await;
    info!("Port idle: {}", PORT.is_idle(SELECT | START));
    std::process::exit(0);
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    run(spawner).await;
}

fn main() {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    static EXECUTOR: StaticCell<Executor> = StaticCell::new();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(main_task(spawner));
    });
}
