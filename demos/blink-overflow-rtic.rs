//! Blink an LED from the timer overflow interrupt, using RTIC.
//!
//! RTIC owns the hand-off: the toggler is a local resource of the
//! overflow task, and RTIC unmasks the interrupt after `init`.

#![no_std]
#![no_main]

use imxrt_rt as _;

#[rtic::app(device = board::rtic_support, peripherals = false)]
mod app {
    #[local]
    struct Local {
        toggler: board::Toggler,
    }

    #[shared]
    struct Shared {}

    #[init]
    fn init(_: init::Context) -> (Shared, Local, init::Monotonics) {
        let board::Resources { tmr, led } = board::prepare().unwrap();
        let toggler = board::Toggler::initialize(&board::TOGGLE_CONFIG, tmr, led);
        (Shared {}, Local { toggler }, init::Monotonics())
    }

    #[task(binds = TMR1, local = [toggler])]
    fn tmr1(cx: tmr1::Context) {
        cx.local.toggler.on_overflow();
    }
}
