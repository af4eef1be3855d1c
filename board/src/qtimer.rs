//! Quad timer (TMR) channel registers.
//!
//! Only the first channel of a TMR instance is described. Field modules
//! follow the `ral` layout, so the `ral` register macros work with them.

#![allow(non_snake_case, non_upper_case_globals, dead_code)]

use crate::ral::RWRegister;

/// One TMR channel, 0x20 bytes.
#[repr(C)]
pub struct RegisterBlock {
    pub COMP1: RWRegister<u16>,
    pub COMP2: RWRegister<u16>,
    pub CAPT: RWRegister<u16>,
    pub LOAD: RWRegister<u16>,
    pub HOLD: RWRegister<u16>,
    pub CNTR: RWRegister<u16>,
    pub CTRL: RWRegister<u16>,
    pub SCTRL: RWRegister<u16>,
    pub CMPLD1: RWRegister<u16>,
    pub CMPLD2: RWRegister<u16>,
    pub CSCTRL: RWRegister<u16>,
    pub FILT: RWRegister<u16>,
    pub DMA: RWRegister<u16>,
    _reserved: [u16; 2],
    /// Channel enables. Only valid in channel 0.
    pub ENBL: RWRegister<u16>,
}

const _: () = assert!(core::mem::size_of::<RegisterBlock>() == 0x20);

macro_rules! field {
    ($name:ident, $offset:expr, $width:expr) => {
        pub mod $name {
            pub const offset: u16 = $offset;
            pub const mask: u16 = ((1 << $width) - 1) << offset;
            pub mod R {}
            pub mod W {}
            pub mod RW {}
        }
    };
}

pub mod LOAD {}
pub mod CNTR {}

pub mod CTRL {
    field!(CM, 13, 3);
    field!(PCS, 9, 4);
    field!(SCS, 7, 2);
    field!(ONCE, 6, 1);
    field!(LENGTH, 5, 1);
    field!(DIR, 4, 1);
    field!(COINIT, 3, 1);
    field!(OUTMODE, 0, 3);
}

pub mod SCTRL {
    field!(TCF, 15, 1);
    field!(TCFIE, 14, 1);
    field!(TOF, 13, 1);
    field!(TOFIE, 12, 1);
    field!(IEF, 11, 1);
    field!(IEFIE, 10, 1);
}

pub mod ENBL {
    field!(ENBL, 0, 4);
}

/// Count rising edges of the primary source.
pub const CM_RISING_PRIMARY: u16 = 0b001;
/// Primary count source: IP bus clock, divided by `1 << (PCS - PCS_IP_BUS_DIV1)`.
pub const PCS_IP_BUS_DIV1: u16 = 0b1000;
