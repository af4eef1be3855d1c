//! iMXRT1010EVK support.

use crate::ral;

#[cfg(target_arch = "arm")]
use imxrt1010evk_fcb as _;
#[cfg(target_arch = "arm")]
use panic_rtt_target as _;

const LED_OFFSET: u32 = 11;

/// The interrupt that `enable_interrupts` unmasks.
pub const TMR_INTERRUPT: ral::Interrupt = ral::Interrupt::TMR1;

pub mod rtic_support {
    pub use crate::ral::*;
}

/// Prepare the board for the demos.
///
/// Call this first. Panics if something went wrong.
pub fn prepare() -> Option<crate::Resources> {
    #[cfg(target_arch = "arm")]
    {
        rtt_target::rtt_init_print!();
        crate::log_toggle_config();
    }

    let iomuxc = unsafe { ral::iomuxc::IOMUXC::instance() };
    // Set the GPIO pad to a GPIO function (ALT 5)
    ral::write_reg!(ral::iomuxc, iomuxc, SW_MUX_CTL_PAD_GPIO_11, 5);
    // Increase drive strength, but leave other fields at their current value...
    ral::modify_reg!(ral::iomuxc, iomuxc, SW_PAD_CTL_PAD_GPIO_11, DSE: DSE_7_R0_7);

    let tmr = crate::prepare_tmr()?;

    let gpio1 = unsafe { ral::gpio::GPIO1::instance() };
    Some(crate::Resources {
        led: crate::Led::new(LED_OFFSET, &gpio1),
        tmr,
    })
}
