//! Toggle a pin from a 16-bit timer's overflow interrupt.
//!
//! This crate blinks an LED, or produces any other fixed-frequency square
//! wave, without blocking the main thread. A 16-bit timer counts up from a
//! preload value and overflows. The overflow interrupt handler flips the pin
//! and re-arms the counter with the same preload. The main thread does
//! nothing but idle.
//!
//! The crate achieves this with
//!
//! - a build-time API that turns a clock, a prescaler, and a target interval
//!   into a counter preload.
//! - a runtime library, generic over the timer and pin hardware, that
//!   programs the timer and handles overflows.
//!
//! Both APIs are exposed from the same package. The build-time API, and a
//! simulator for testing, are only available on the host.
//!
//! # Host configuration
//!
//! In your firmware, create a `build.rs` script that computes the
//! configuration. The simplest `build.rs` looks like this:
//!
//! ```no_run
//! use overflow_toggle::{Timer16, ToggleBuilder};
//!
//! /// CHANGE ME depending on the clock that reaches your timer.
//! const TIMER_CLOCK_HZ: u32 = 16_000_000;
//!
//! fn main() {
//!     ToggleBuilder::new(Timer16::AvrTimer1, TIMER_CLOCK_HZ)
//!         .interval_us(50_000)
//!         .build()
//!         .unwrap();
//! }
//! ```
//!
//! Depend on `overflow-toggle` in both the `[dependencies]` and
//! `[build-dependencies]` sections of your Cargo.toml, then include the
//! generated constant with [`include_config!`].
//!
//! # Target integration
//!
//! Implement [`OverflowTimer`] and [`TogglePin`] for your hardware. Then,
//!
//! 1. [`initialize`](Toggler::initialize) a [`Toggler`] from the generated
//!    configuration.
//! 2. move the toggler into a [`PeripheralSlot`], or an RTIC local resource.
//! 3. call [`on_overflow`](Toggler::on_overflow) from the timer's interrupt
//!    handler.
//! 4. unmask the interrupt, enable interrupts, and [`idle`].
//!
//! The `board` package in this repository does this for a few i.MX RT
//! development boards.
//!
//! # Limitations
//!
//! The timer must not reload itself on overflow; the handler always writes
//! the preload. The cycles that the processor spends entering the handler
//! are lost from the next interval only when they exceed one prescaled tick.
//! There's no support for changing the frequency after initialization.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std)]

mod config;
mod macros;
mod slot;
mod toggler;

pub use config::{ConfigError, Prescaler, Timer16, ToggleConfig, COUNTER_SPAN};
pub use slot::PeripheralSlot;
pub use toggler::{idle, OverflowTimer, TogglePin, Toggler};

cfg_if::cfg_if! {
    if #[cfg(not(all(target_arch = "arm", target_os = "none")))] {
        mod host;
        pub use host::*;
    }
}
