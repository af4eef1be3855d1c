//! The overflow-driven pin toggler.

use crate::{Prescaler, ToggleConfig};

/// A 16-bit timer that counts up and signals an overflow when it wraps.
///
/// Implementations are thin wrappers over hardware registers. None of these
/// methods may block.
pub trait OverflowTimer {
    /// Write the counter register.
    fn set_counter(&mut self, value: u16);
    /// Read the counter register.
    fn counter(&self) -> u16;
    /// Select normal (free-running, count up) mode clocked through `prescaler`.
    ///
    /// The counter starts counting once this returns.
    fn configure(&mut self, prescaler: Prescaler);
    fn enable_overflow_interrupt(&mut self);
    fn disable_overflow_interrupt(&mut self);
    /// Acknowledge a pending overflow.
    ///
    /// Hardware that clears the flag when it enters the interrupt vector
    /// can keep the default.
    fn clear_overflow(&mut self) {}
}

/// A digital output that can flip its level.
pub trait TogglePin {
    /// Drive the pin as an output.
    fn set_output(&mut self);
    /// Flip the output level.
    fn toggle(&mut self);
    /// Returns `true` if the output data bit is set.
    fn is_set(&self) -> bool;
}

/// Owns a timer and a pin, and flips the pin on every timer overflow.
///
/// Create one with [`initialize`](Toggler::initialize), then call
/// [`on_overflow`](Toggler::on_overflow) from the timer's interrupt handler.
/// Once initialized, the handler is the only code that should touch the
/// timer or the pin. Move the toggler into a [`PeripheralSlot`](crate::PeripheralSlot)
/// (or an RTIC local resource) to make that explicit.
#[derive(Debug)]
pub struct Toggler<T, P> {
    timer: T,
    pin: P,
    preload: u16,
    overflows: u32,
}

impl<T: OverflowTimer, P: TogglePin> Toggler<T, P> {
    /// Configure the pin and timer, and arm the overflow interrupt.
    ///
    /// This doesn't enable interrupts globally; do that last, after the
    /// toggler is somewhere the interrupt handler can reach it.
    pub fn initialize(config: &ToggleConfig, mut timer: T, mut pin: P) -> Self {
        pin.set_output();
        timer.set_counter(config.preload());
        timer.configure(config.prescaler());
        timer.enable_overflow_interrupt();
        Self {
            timer,
            pin,
            preload: config.preload(),
            overflows: 0,
        }
    }

    /// Handle a timer overflow.
    ///
    /// Toggles the pin, then re-arms the counter with the preload. The timer
    /// doesn't reload on its own; without this, the next interval would
    /// start from zero.
    pub fn on_overflow(&mut self) {
        self.pin.toggle();
        self.timer.set_counter(self.preload);
        self.timer.clear_overflow();
        self.overflows = self.overflows.wrapping_add(1);
    }

    /// Number of overflows handled so far. Wraps at `u32::MAX`.
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    pub fn preload(&self) -> u16 {
        self.preload
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable access to the timer, for example to stop the overflow interrupt.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Give back the timer and the pin.
    pub fn release(self) -> (T, P) {
        (self.timer, self.pin)
    }
}

/// Spin forever.
///
/// Call this after enabling interrupts. All of the work happens in the
/// overflow handler.
pub fn idle() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::{OverflowTimer, TogglePin, Toggler};
    use crate::{Prescaler, ToggleConfig};

    #[derive(Debug, Default)]
    struct Timer {
        counter: u16,
        prescaler: Option<Prescaler>,
        interrupt: bool,
        clears: usize,
    }

    impl OverflowTimer for Timer {
        fn set_counter(&mut self, value: u16) {
            self.counter = value;
        }
        fn counter(&self) -> u16 {
            self.counter
        }
        fn configure(&mut self, prescaler: Prescaler) {
            self.prescaler = Some(prescaler);
        }
        fn enable_overflow_interrupt(&mut self) {
            self.interrupt = true;
        }
        fn disable_overflow_interrupt(&mut self) {
            self.interrupt = false;
        }
        fn clear_overflow(&mut self) {
            self.clears += 1;
        }
    }

    #[derive(Debug, Default)]
    struct Pin {
        output: bool,
        level: bool,
    }

    impl TogglePin for Pin {
        fn set_output(&mut self) {
            self.output = true;
        }
        fn toggle(&mut self) {
            self.level = !self.level;
        }
        fn is_set(&self) -> bool {
            self.level
        }
    }

    const CONFIG: ToggleConfig = ToggleConfig::new(16_000_000, Prescaler::Div1024, 64755);

    #[test]
    fn initialize_programs_every_register() {
        let toggler = Toggler::initialize(&CONFIG, Timer::default(), Pin::default());
        let (timer, pin) = toggler.release();
        assert!(pin.output);
        assert!(!pin.level);
        assert_eq!(timer.counter, 64755);
        assert_eq!(timer.prescaler, Some(Prescaler::Div1024));
        assert!(timer.interrupt);
        assert_eq!(timer.clears, 0);
    }

    #[test]
    fn overflow_toggles_and_rearms() {
        let mut toggler = Toggler::initialize(&CONFIG, Timer::default(), Pin::default());
        // Hardware wrapped and kept counting a little.
        toggler.timer_mut().set_counter(3);

        toggler.on_overflow();
        assert!(toggler.pin().is_set());
        assert_eq!(toggler.timer().counter(), 64755);
        assert_eq!(toggler.timer().clears, 1);

        toggler.on_overflow();
        assert!(!toggler.pin().is_set());
        assert_eq!(toggler.overflows(), 2);
    }

    #[test]
    fn overflow_count_wraps() {
        let mut toggler = Toggler::initialize(&CONFIG, Timer::default(), Pin::default());
        toggler.overflows = u32::MAX;
        toggler.on_overflow();
        assert_eq!(toggler.overflows(), 0);
    }
}
