//! Code shared across all i.MX RT 11xx chips.

use crate::ral;

pub(crate) fn prepare_tmr() -> Option<crate::Tmr> {
    #[cfg(feature = "rtic")]
    {
        unsafe extern "C" {
            // Not actually mut in cortex-m. But, no one is reading it...
            static __INTERRUPTS: [core::cell::UnsafeCell<unsafe extern "C" fn()>; 240];
            fn TMR1();
        }
        unsafe {
            __INTERRUPTS[crate::ral::Interrupt::TMR1 as usize]
                .get()
                .write_volatile(TMR1);
        }
    }

    let ccm = unsafe { ral::ccm::CCM::instance() };

    // Change the bus clock to the 24 MHz XTAL. The quad timers count
    // the bus clock, and the build script expects 24 MHz.
    //
    // If we decrease the bus speed too much, we seem to reach a condition
    // where we can't re-flash the device. 24 MHz has been fine with pyOCD.
    let clock_root_2 = &ccm.CLOCK_ROOT[2];
    ral::modify_reg!(ral::ccm::clockroot, clock_root_2, CLOCK_ROOT_CONTROL, MUX: 0b001, DIV: 0);
    while ral::read_reg!(
        ral::ccm::clockroot,
        clock_root_2,
        CLOCK_ROOT_STATUS0,
        CHANGING == 1
    ) {}

    // Enable the clock gate to TMR1.
    ral::write_reg!(ral::ccm, ccm, LPCG66_DIRECT, 1);

    let tmr = unsafe { ral::tmr::TMR1::instance() };
    Some(crate::Tmr::new(&tmr))
}
