//! A cycle-level model of a 16-bit overflow timer driving an output pin.
//!
//! The model follows ATmega328P timer/counter 1 in normal mode:
//!
//! - the counter counts up once per `prescaler` clock cycles, and wraps from
//!   0xFFFF to zero, setting the overflow flag.
//! - the counter never reloads itself. Whatever runs in the handler has to
//!   re-arm it.
//! - the overflow flag clears when the processor enters the interrupt vector.
//! - the prescaler keeps running when software writes the counter.
//!
//! The processor needs a configurable number of cycles to enter the handler.
//! The timer keeps counting during those cycles. Once in the handler, the
//! handler runs in zero time.
//!
//! Use [`Simulator::take_peripherals`] to get a timer and a pin, build a
//! [`Toggler`] from them, and [`attach`](Simulator::attach) it as the overflow
//! handler.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{OverflowTimer, Prescaler, TogglePin, Toggler, COUNTER_SPAN};

/// Cycles from an overflow until the handler runs, unless changed.
///
/// The ATmega328P needs at least four cycles to vector into a handler.
pub const DEFAULT_ISR_LATENCY: u64 = 4;

/// A toggler built from simulated peripherals.
pub type SimToggler = Toggler<SimTimer, SimPin>;

/// The two states of a running toggler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglerState {
    /// The counter is incrementing towards the next overflow.
    Counting,
    /// An overflow is being serviced. This includes the cycles the
    /// processor spends entering the handler.
    HandlingOverflow,
}

/// A change of the pin's driven level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Clock cycle of the change, counted from simulator creation.
    pub cycle: u64,
    /// The level after the change.
    pub level: bool,
}

#[derive(Debug, Default)]
struct TimerRegs {
    counter: u16,
    /// `None` when the timer has no clock source.
    prescaler: Option<Prescaler>,
    /// Clock cycles accumulated towards the next tick.
    phase: u32,
    overflow_flag: bool,
    overflow_interrupt: bool,
    wraps: u64,
}

impl TimerRegs {
    /// Cycles until the counter next wraps, if it's counting.
    fn cycles_to_wrap(&self) -> Option<u64> {
        let divisor = self.prescaler?.divisor() as u64;
        let ticks = COUNTER_SPAN as u64 - self.counter as u64;
        Some(ticks * divisor - self.phase as u64)
    }

    fn run(&mut self, cycles: u64) {
        let Some(prescaler) = self.prescaler else {
            return;
        };
        let divisor = prescaler.divisor() as u64;
        let total = self.phase as u64 + cycles;
        self.phase = (total % divisor) as u32;

        let counter = self.counter as u64 + total / divisor;
        let wraps = counter / COUNTER_SPAN as u64;
        if wraps > 0 {
            self.overflow_flag = true;
            self.wraps += wraps;
        }
        self.counter = (counter % COUNTER_SPAN as u64) as u16;
    }
}

#[derive(Debug, Default)]
struct PinRegs {
    output: bool,
    level: bool,
    transitions: Vec<Transition>,
}

/// State shared between the simulator and its peripheral handles.
#[derive(Debug, Default)]
struct Bus {
    now: Cell<u64>,
    timer: RefCell<TimerRegs>,
    pin: RefCell<PinRegs>,
}

/// Simulated timer registers.
#[derive(Debug)]
pub struct SimTimer {
    bus: Rc<Bus>,
}

impl OverflowTimer for SimTimer {
    fn set_counter(&mut self, value: u16) {
        self.bus.timer.borrow_mut().counter = value;
    }
    fn counter(&self) -> u16 {
        self.bus.timer.borrow().counter
    }
    fn configure(&mut self, prescaler: Prescaler) {
        let mut timer = self.bus.timer.borrow_mut();
        timer.prescaler = Some(prescaler);
        timer.phase = 0;
    }
    fn enable_overflow_interrupt(&mut self) {
        self.bus.timer.borrow_mut().overflow_interrupt = true;
    }
    fn disable_overflow_interrupt(&mut self) {
        self.bus.timer.borrow_mut().overflow_interrupt = false;
    }
}

/// Simulated output pin registers.
#[derive(Debug)]
pub struct SimPin {
    bus: Rc<Bus>,
}

impl TogglePin for SimPin {
    fn set_output(&mut self) {
        self.bus.pin.borrow_mut().output = true;
    }
    fn toggle(&mut self) {
        let mut pin = self.bus.pin.borrow_mut();
        pin.level = !pin.level;
        // An input pin doesn't drive anything.
        if pin.output {
            let transition = Transition {
                cycle: self.bus.now.get(),
                level: pin.level,
            };
            pin.transitions.push(transition);
        }
    }
    fn is_set(&self) -> bool {
        self.bus.pin.borrow().level
    }
}

/// A microcontroller with one 16-bit timer, one pin, and one interrupt vector.
#[derive(Debug)]
pub struct Simulator {
    clock_hz: u32,
    bus: Rc<Bus>,
    taken: bool,
    global_interrupts: bool,
    isr_latency: u64,
    /// Cycle at which the processor finishes entering the handler.
    entry_at: Option<u64>,
    handler: Option<SimToggler>,
}

impl Simulator {
    /// A simulator clocked at `clock_hz`, with interrupts disabled.
    ///
    /// # Panics
    ///
    /// Panics if `clock_hz` is zero.
    pub fn new(clock_hz: u32) -> Self {
        assert!(clock_hz != 0, "simulator clock cannot be zero");
        Self {
            clock_hz,
            bus: Rc::default(),
            taken: false,
            global_interrupts: false,
            isr_latency: DEFAULT_ISR_LATENCY,
            entry_at: None,
            handler: None,
        }
    }

    /// Set the cycles between an overflow and the handler running.
    pub fn set_isr_latency(&mut self, cycles: u64) -> &mut Self {
        self.isr_latency = cycles;
        self
    }

    /// Take the timer and the pin. Returns `None` after the first call.
    pub fn take_peripherals(&mut self) -> Option<(SimTimer, SimPin)> {
        if self.taken {
            return None;
        }
        self.taken = true;
        Some((
            SimTimer {
                bus: Rc::clone(&self.bus),
            },
            SimPin {
                bus: Rc::clone(&self.bus),
            },
        ))
    }

    /// Install `toggler` as the overflow interrupt handler.
    ///
    /// Returns the previous handler, if any.
    pub fn attach(&mut self, toggler: SimToggler) -> Option<SimToggler> {
        self.handler.replace(toggler)
    }

    /// The installed handler.
    pub fn toggler(&self) -> Option<&SimToggler> {
        self.handler.as_ref()
    }

    pub fn toggler_mut(&mut self) -> Option<&mut SimToggler> {
        self.handler.as_mut()
    }

    /// Set the processor's global interrupt flag.
    pub fn enable_interrupts(&mut self) {
        self.global_interrupts = true;
    }

    /// Clear the processor's global interrupt flag.
    pub fn disable_interrupts(&mut self) {
        self.global_interrupts = false;
    }

    /// Run the processor for `cycles` clock cycles.
    pub fn advance(&mut self, cycles: u64) {
        let end = self.now() + cycles;
        loop {
            let now = self.now();
            if let Some(entry_at) = self.entry_at {
                if entry_at > end {
                    self.run_timer(end - now);
                    break;
                }
                self.run_timer(entry_at - now);
                self.entry_at = None;
                self.dispatch();
                continue;
            }
            if self.interrupt_pending() {
                self.entry_at = Some(now + self.isr_latency);
                continue;
            }
            let next_wrap = self.bus.timer.borrow().cycles_to_wrap();
            match next_wrap {
                Some(wrap) if now + wrap <= end => self.run_timer(wrap),
                _ => {
                    self.run_timer(end - now);
                    break;
                }
            }
        }
    }

    /// Run the processor for about `nanos` nanoseconds.
    pub fn advance_ns(&mut self, nanos: u64) {
        self.advance(self.ns_to_cycles(nanos));
    }

    fn run_timer(&mut self, cycles: u64) {
        self.bus.now.set(self.bus.now.get() + cycles);
        self.bus.timer.borrow_mut().run(cycles);
    }

    fn interrupt_pending(&self) -> bool {
        let timer = self.bus.timer.borrow();
        self.global_interrupts && timer.overflow_interrupt && timer.overflow_flag
    }

    /// Vector into the overflow handler.
    fn dispatch(&mut self) {
        self.bus.timer.borrow_mut().overflow_flag = false;
        if let Some(handler) = &mut self.handler {
            handler.on_overflow();
        }
    }

    pub fn state(&self) -> TogglerState {
        if self.entry_at.is_some() {
            TogglerState::HandlingOverflow
        } else {
            TogglerState::Counting
        }
    }

    /// Clock cycles since the simulator was created.
    pub fn now(&self) -> u64 {
        self.bus.now.get()
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub fn cycles_to_ns(&self, cycles: u64) -> u64 {
        (cycles as u128 * 1_000_000_000 / self.clock_hz as u128) as u64
    }

    pub fn ns_to_cycles(&self, nanos: u64) -> u64 {
        (nanos as u128 * self.clock_hz as u128 / 1_000_000_000) as u64
    }

    pub fn counter(&self) -> u16 {
        self.bus.timer.borrow().counter
    }

    /// Number of times the counter wrapped, handled or not.
    pub fn wraps(&self) -> u64 {
        self.bus.timer.borrow().wraps
    }

    pub fn overflow_flag(&self) -> bool {
        self.bus.timer.borrow().overflow_flag
    }

    /// The pin's data bit.
    pub fn pin_level(&self) -> bool {
        self.bus.pin.borrow().level
    }

    pub fn pin_is_output(&self) -> bool {
        self.bus.pin.borrow().output
    }

    /// Every change of the driven pin level, oldest first.
    pub fn transitions(&self) -> Vec<Transition> {
        self.bus.pin.borrow().transitions.clone()
    }

    /// The driven level at `cycle`, from the recorded transitions.
    ///
    /// The pin starts low. A transition at `cycle` counts.
    pub fn level_at(&self, cycle: u64) -> bool {
        self.bus
            .pin
            .borrow()
            .transitions
            .iter()
            .take_while(|transition| transition.cycle <= cycle)
            .last()
            .map_or(false, |transition| transition.level)
    }
}
