//! Pin waveform checks against the simulated timer.

#![cfg(not(all(target_arch = "arm", target_os = "none")))]

use overflow_toggle::{
    sim::{Simulator, Transition, DEFAULT_ISR_LATENCY},
    OverflowTimer, Prescaler, Timer16, ToggleBuilder, ToggleConfig, Toggler,
};

const CLOCK_HZ: u32 = 16_000_000;
const BLINK: ToggleConfig = ToggleConfig::new(CLOCK_HZ, Prescaler::Div1024, 64755);
/// Clock cycles between overflows for `BLINK`.
const INTERVAL: u64 = (65536 - 64755) * 1024;

type Error = Box<dyn std::error::Error>;

/// Initialize a toggler in a fresh simulator.
fn setup(config: &ToggleConfig) -> Simulator {
    let mut sim = Simulator::new(config.clock_hz());
    let (timer, pin) = sim.take_peripherals().unwrap();
    sim.attach(Toggler::initialize(config, timer, pin));
    sim
}

fn spacing(transitions: &[Transition]) -> Vec<u64> {
    transitions
        .windows(2)
        .map(|pair| pair[1].cycle - pair[0].cycle)
        .collect()
}

#[test]
fn ten_hertz_from_sixteen_megahertz() {
    let mut sim = setup(&BLINK);
    sim.enable_interrupts();
    sim.advance_ns(1_000_000_000);

    let transitions = sim.transitions();
    assert_eq!(transitions.len(), 20);
    for gap in spacing(&transitions) {
        // 49.984 ms, within one timer tick of 50 ms.
        assert_eq!(sim.cycles_to_ns(gap), 49_984_000);
    }
    // Levels alternate, starting high.
    for (idx, transition) in transitions.iter().enumerate() {
        assert_eq!(transition.level, idx % 2 == 0);
    }
}

#[test]
fn waveform_is_periodic() {
    let mut sim = setup(&BLINK);
    sim.enable_interrupts();
    sim.advance(40 * INTERVAL);

    let start = sim.transitions()[0].cycle;
    let period = 2 * INTERVAL;
    let mut sample = start;
    while sample + period < sim.now() {
        assert_eq!(sim.level_at(sample), sim.level_at(sample + period), "{sample}");
        // Coprime with the interval, so samples land all over the period.
        sample += 12_345;
    }
}

#[test]
fn rearming_keeps_intervals_equal() {
    let mut sim = setup(&BLINK);
    sim.set_isr_latency(100);
    sim.enable_interrupts();
    sim.advance(100 * INTERVAL);

    let transitions = sim.transitions();
    assert_eq!(transitions.len(), 99);
    // Every toggle is exactly one latency after its overflow. Nothing accumulates.
    for (idx, transition) in transitions.iter().enumerate() {
        assert_eq!(transition.cycle, (idx as u64 + 1) * INTERVAL + 100);
    }
}

#[test]
fn long_latency_is_a_constant_error() {
    let mut sim = setup(&BLINK);
    // More than one prescaled tick passes before the handler re-arms the counter.
    sim.set_isr_latency(1500);
    sim.enable_interrupts();
    sim.advance(50 * INTERVAL);

    let gaps = spacing(&sim.transitions());
    assert!(gaps.len() > 40);
    assert!(gaps.iter().all(|gap| *gap == INTERVAL + 1024), "{gaps:?}");
}

#[test]
fn no_global_interrupts_no_toggles() {
    let mut sim = setup(&BLINK);
    sim.advance(10 * INTERVAL);

    assert!(sim.transitions().is_empty());
    assert!(!sim.pin_level());
    // The counter kept wrapping from zero, and the flag stays pending.
    assert!(sim.wraps() >= 1);
    assert!(sim.overflow_flag());
    assert_eq!(sim.toggler().unwrap().overflows(), 0);
}

#[test]
fn pending_overflow_runs_once_interrupts_enable() {
    let mut sim = setup(&BLINK);
    sim.advance(INTERVAL + 10);
    assert!(sim.overflow_flag());

    sim.enable_interrupts();
    sim.advance(DEFAULT_ISR_LATENCY);
    assert_eq!(sim.transitions().len(), 1);
    assert!(!sim.overflow_flag());
}

#[test]
fn disabling_overflow_interrupt_stops_toggling() {
    let mut sim = setup(&BLINK);
    sim.enable_interrupts();
    // Stop between overflows, so no handler entry is in flight.
    sim.advance(5 * INTERVAL - INTERVAL / 2);
    let toggled = sim.transitions().len();
    assert_eq!(toggled, 4);

    sim.toggler_mut()
        .unwrap()
        .timer_mut()
        .disable_overflow_interrupt();
    let wraps = sim.wraps();
    sim.advance(20 * INTERVAL);

    assert_eq!(sim.transitions().len(), toggled);
    // The counter still wraps, and nothing services the flag.
    assert!(sim.wraps() > wraps);
    assert!(sim.overflow_flag());
}

#[test]
fn disabling_global_interrupts_stops_toggling() {
    let mut sim = setup(&BLINK);
    sim.enable_interrupts();
    sim.advance(3 * INTERVAL - INTERVAL / 2);
    sim.disable_interrupts();
    let toggled = sim.transitions().len();
    sim.advance(10 * INTERVAL);
    assert_eq!(sim.transitions().len(), toggled);
}

#[test]
fn builder_config_drives_simulator() -> Result<(), Error> {
    // At /16, 50 ms needs more than 16 bits of ticks.
    let config = ToggleBuilder::new(Timer16::QTimer, 24_000_000)
        .interval_us(50_000)
        .config()?;
    assert_eq!(config.prescaler(), Prescaler::Div32);

    let mut sim = setup(&config);
    sim.enable_interrupts();
    sim.advance_ns(1_000_000_000);

    let transitions = sim.transitions();
    assert_eq!(transitions.len(), 19);
    for gap in spacing(&transitions) {
        assert_eq!(sim.cycles_to_ns(gap), 50_000_000);
    }
    Ok(())
}

#[test]
fn counter_starts_at_preload() {
    let sim = setup(&BLINK);
    assert_eq!(sim.counter(), 64755);
    assert!(sim.pin_is_output());
    assert_eq!(sim.toggler().unwrap().timer().counter(), 64755);
}
