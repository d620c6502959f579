// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PEC global XSCOM register definitions.

#![expect(missing_docs)] // register names match the hardware documentation

use std::fmt;

/// Number of registers in the nest bank.
pub const PHB4_PEC_NEST_REGS_COUNT: usize = 0xf;
/// Number of registers in the pci bank.
pub const PHB4_PEC_PCI_REGS_COUNT: usize = 0x3;

/// Index of a register in the PEC nest bank.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NestReg(pub u32);

impl NestReg {
    pub const PBCQ_HW_CONFIG: Self = Self(0x00);
    pub const DROP_PRIO_CTRL: Self = Self(0x01);
    pub const PBCQ_ERR_INJECT: Self = Self(0x02);
    pub const PCI_NEST_CLK_TRACE_CTL: Self = Self(0x03);
    pub const PBCQ_PMON_CTRL: Self = Self(0x04);
    pub const PBCQ_PBUS_ADDR_EXT: Self = Self(0x05);
    pub const PBCQ_PRED_VEC_TIMEOUT: Self = Self(0x06);
    pub const CAPP_CTRL: Self = Self(0x07);
    pub const PBCQ_READ_STK_OVR: Self = Self(0x08);
    pub const PBCQ_WRITE_STK_OVR: Self = Self(0x09);
    pub const PBCQ_STORE_STK_OVR: Self = Self(0x0a);
    pub const PBCQ_RETRY_BKOFF_CTRL: Self = Self(0x0b);
}

impl fmt::Debug for NestReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NestReg({:#04x})", self.0)
    }
}

/// Index of a register in the PEC pci bank.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PciReg(pub u32);

impl PciReg {
    pub const PBAIB_HW_CONFIG: Self = Self(0x00);
    pub const PBAIB_READ_STK_OVR: Self = Self(0x02);
}

impl fmt::Debug for PciReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PciReg({:#04x})", self.0)
    }
}

/// Nest registers the guest is allowed to write.
pub const NEST_WRITABLE_REGS: &[u32] = &[
    NestReg::PBCQ_HW_CONFIG.0,
    NestReg::DROP_PRIO_CTRL.0,
    NestReg::PBCQ_ERR_INJECT.0,
    NestReg::PCI_NEST_CLK_TRACE_CTL.0,
    NestReg::PBCQ_PMON_CTRL.0,
    NestReg::PBCQ_PBUS_ADDR_EXT.0,
    NestReg::PBCQ_PRED_VEC_TIMEOUT.0,
    NestReg::CAPP_CTRL.0,
    NestReg::PBCQ_READ_STK_OVR.0,
    NestReg::PBCQ_WRITE_STK_OVR.0,
    NestReg::PBCQ_STORE_STK_OVR.0,
    NestReg::PBCQ_RETRY_BKOFF_CTRL.0,
];

/// PCI registers the guest is allowed to write.
pub const PCI_WRITABLE_REGS: &[u32] = &[PciReg::PBAIB_HW_CONFIG.0, PciReg::PBAIB_READ_STK_OVR.0];
