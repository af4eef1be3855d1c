//! Code shared across all i.MX RT 10xx chips.
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
            __INTERRUPTS[crate::ral::interrupt::TMR1 as usize]
                .get()
                .write_volatile(TMR1);
        }
    }
    let ccm = unsafe { ral::ccm::CCM::instance() };
    // Enable the TMR1 clock gate. The timer counts the IPG clock, which
    // we leave as the boot ROM configured it.
    ral::modify_reg!(ral::ccm, ccm, CCGR6, CG13: 0b11);

    let tmr = unsafe { ral::tmr::TMR1::instance() };
    Some(crate::Tmr::new(&tmr))
}
