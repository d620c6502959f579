// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Emulator for the PCI Express controller complex (PEC) found on POWER9 and
//! POWER10 chips.
//!
//! A PEC exposes two banks of XSCOM registers ("nest" and "pci") and hosts
//! between one and three PHB stacks, depending on its position on the chip.
//! The PHB devices themselves are provided by the caller through
//! [`stack::PhbFactory`].

#![forbid(unsafe_code)]

pub mod bank;
pub mod dt;
pub mod family;
pub mod pec;
pub mod regs;
pub mod stack;
pub mod xscom;

#[cfg(test)]
mod test_helpers;

pub use pec::PecConfig;
pub use pec::PecError;
pub use pec::PhbPec;

/// The maximum number of stacks a single PEC can host.
pub const PHB4_PEC_MAX_STACKS: usize = 3;

/// Size in bytes of a single XSCOM register.
const XSCOM_REG_SIZE: u64 = 8;
const XSCOM_REG_SHIFT: u32 = XSCOM_REG_SIZE.trailing_zeros();
