//! A very simple, multi-board BSP for overflow-toggle demos.
#![no_std]

use imxrt_ral as ral;
use overflow_toggle::{OverflowTimer, Prescaler, TogglePin};

mod qtimer;

cfg_if::cfg_if! {
    if #[cfg(feature = "teensy4")] {
        mod shared { pub mod imxrt10xx; }
        use shared::imxrt10xx::prepare_tmr;

        mod teensy4;
        pub use teensy4::*;
    } else if #[cfg(feature = "imxrt1010evk")] {
        mod shared { pub mod imxrt10xx; }
        use shared::imxrt10xx::prepare_tmr;

        mod imxrt1010evk;
        pub use imxrt1010evk::*;
    } else if #[cfg(feature = "imxrt1170evk-cm7")] {
        mod shared { pub mod imxrt11xx; }
        use shared::imxrt11xx::prepare_tmr;

        mod imxrt1170evk_cm7;
        pub use imxrt1170evk_cm7::*;
    } else {
        compile_error!("No board feature selected!");
    }
}

overflow_toggle::include_config!();

/// The toggler that the demos run.
pub type Toggler = overflow_toggle::Toggler<Tmr, Led>;

/// Report the blink configuration over RTT.
#[cfg(all(
    target_arch = "arm",
    any(feature = "imxrt1010evk", feature = "imxrt1170evk-cm7")
))]
fn log_toggle_config() {
    rtt_target::rprintln!(
        "TMR1 overflows every {} us ({} Hz {}, preload {})",
        TOGGLE_CONFIG.interval_us(),
        TOGGLE_CONFIG.clock_hz(),
        TOGGLE_CONFIG.prescaler(),
        TOGGLE_CONFIG.preload()
    );
}

/// Use this with `#[interrupt]`.
pub use ral::Interrupt as interrupt;

/// Channel 0 of a quad timer, counting up through all 16 bits.
pub struct Tmr(&'static qtimer::RegisterBlock);

impl Tmr {
    fn new(tmr: &ral::tmr::RegisterBlock) -> Self {
        // Safety: the TMR instance's first 0x20 bytes are channel 0.
        let ch0: &'static qtimer::RegisterBlock = unsafe { &*core::ptr::from_ref(tmr).cast() };
        // Stop the channel, just in case it was used by the boot ROM.
        ral::write_reg!(qtimer, ch0, CTRL, 0);
        ral::write_reg!(qtimer, ch0, SCTRL, 0);
        // Rolling over starts from zero; the handler re-arms the preload.
        ral::write_reg!(qtimer, ch0, LOAD, 0);
        ral::modify_reg!(qtimer, ch0, ENBL, ENBL: 0b1111);
        Self(ch0)
    }
}

impl OverflowTimer for Tmr {
    fn set_counter(&mut self, value: u16) {
        ral::write_reg!(qtimer, self.0, CNTR, value);
    }
    fn counter(&self) -> u16 {
        ral::read_reg!(qtimer, self.0, CNTR)
    }
    fn configure(&mut self, prescaler: Prescaler) {
        // The build script only selects quad timer prescalers.
        debug_assert!(prescaler.log2() <= 7);
        let pcs = qtimer::PCS_IP_BUS_DIV1 | prescaler.log2() as u16;
        // Writing a count mode starts the counter.
        ral::write_reg!(
            qtimer,
            self.0,
            CTRL,
            CM: qtimer::CM_RISING_PRIMARY,
            PCS: pcs,
            LENGTH: 0,
            DIR: 0
        );
    }
    fn enable_overflow_interrupt(&mut self) {
        ral::modify_reg!(qtimer, self.0, SCTRL, TOFIE: 1);
    }
    fn disable_overflow_interrupt(&mut self) {
        ral::modify_reg!(qtimer, self.0, SCTRL, TOFIE: 0);
    }
    fn clear_overflow(&mut self) {
        // TOF clears on a zero write. Writing ones to the other flags does nothing.
        ral::modify_reg!(qtimer, self.0, SCTRL, TOF: 0);
        while ral::read_reg!(qtimer, self.0, SCTRL, TOF == 1) {
            ral::modify_reg!(qtimer, self.0, SCTRL, TOF: 0);
        }
    }
}

unsafe impl Send for Tmr {}

pub struct Led {
    offset: u32,
    port: &'static ral::gpio::RegisterBlock,
}

impl Led {
    fn new(offset: u32, port: &ral::gpio::RegisterBlock) -> Self {
        Led {
            offset,
            port: unsafe { core::mem::transmute(port) },
        }
    }
    fn mask(&self) -> u32 {
        1 << self.offset
    }
}

impl TogglePin for Led {
    fn set_output(&mut self) {
        ral::modify_reg!(ral::gpio, self.port, GDIR, |gdir| gdir | self.mask());
    }
    fn toggle(&mut self) {
        ral::write_reg!(ral::gpio, self.port, DR_TOGGLE, self.mask());
    }
    fn is_set(&self) -> bool {
        ral::read_reg!(ral::gpio, self.port, DR) & self.mask() != 0
    }
}

unsafe impl Send for Led {}

pub struct Resources {
    pub led: crate::Led,
    pub tmr: crate::Tmr,
}

/// Unmask the timer interrupt, then enable interrupts.
///
/// # Safety
///
/// The handler may run as soon as this returns. Whatever it touches must
/// already be in place.
#[cfg(target_arch = "arm")]
pub unsafe fn enable_interrupts() {
    unsafe {
        cortex_m::peripheral::NVIC::unmask(TMR_INTERRUPT);
        cortex_m::interrupt::enable();
    }
}
