//! Blink an LED from the timer overflow interrupt.
//!
//! The main thread configures the timer, hands it to the interrupt handler,
//! then idles. The board's build script sets the blink interval; change it
//! with `BOARD_TOGGLE_INTERVAL_US`.

#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use board::interrupt;
    use overflow_toggle::PeripheralSlot;

    /// The only owner of the timer and the LED once `main` hands them off.
    static TOGGLER: PeripheralSlot<board::Toggler> = PeripheralSlot::new();

    #[imxrt_rt::entry]
    fn main() -> ! {
        let board::Resources { tmr, led } = board::prepare().unwrap();
        let toggler = board::Toggler::initialize(&board::TOGGLE_CONFIG, tmr, led);
        if TOGGLER.install(toggler).is_err() {
            panic!("toggler already installed");
        }
        // Safety: the handler's state is in place.
        unsafe { board::enable_interrupts() };
        overflow_toggle::idle()
    }

    #[imxrt_rt::interrupt]
    fn TMR1() {
        TOGGLER.with(board::Toggler::on_overflow);
    }
}

/// The firmware only runs on the embedded target.
#[cfg(not(target_os = "none"))]
fn main() {}
