// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Fixed-size banks of 64-bit XSCOM registers with a write allow-list.

use crate::XSCOM_REG_SHIFT;
use crate::regs::NEST_WRITABLE_REGS;
use crate::regs::PCI_WRITABLE_REGS;
use crate::regs::PHB4_PEC_NEST_REGS_COUNT;
use crate::regs::PHB4_PEC_PCI_REGS_COUNT;
use std::fmt;

/// Identifies one of the two register banks of a PEC.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BankKind {
    /// Registers on the PowerBus side of the PEC.
    Nest,
    /// Registers on the PCI side of the PEC.
    Pci,
}

impl BankKind {
    /// Number of registers backing a bank of this kind.
    pub const fn regs_count(&self) -> usize {
        match self {
            BankKind::Nest => PHB4_PEC_NEST_REGS_COUNT,
            BankKind::Pci => PHB4_PEC_PCI_REGS_COUNT,
        }
    }

    /// Registers of this kind the guest may write.
    pub const fn writable_regs(&self) -> &'static [u32] {
        match self {
            BankKind::Nest => NEST_WRITABLE_REGS,
            BankKind::Pci => PCI_WRITABLE_REGS,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            BankKind::Nest => "nest",
            BankKind::Pci => "pci",
        }
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.suffix())
    }
}

/// A bank of 64-bit registers.
///
/// Any register can be read. Registers outside the bank read as zero, and
/// registers that were never written read as zero too. Writes are only
/// stored for registers in the bank's allow-list; other writes are reported
/// as guest errors and dropped.
#[derive(Debug)]
pub struct RegisterBank {
    name: String,
    regs: Box<[u64]>,
    writable: &'static [u32],
    rejected_writes: u64,
}

impl RegisterBank {
    /// Creates a zeroed bank for the PEC `index` on chip `chip_id`.
    pub fn new(kind: BankKind, chip_id: u32, index: u32) -> Self {
        Self {
            name: format!("xscom-pec-{}.{}-{}", chip_id, index, kind),
            regs: vec![0; kind.regs_count()].into(),
            writable: kind.writable_regs(),
            rejected_writes: 0,
        }
    }

    /// The debug name of the bank's XSCOM region.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of registers backing this bank.
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    /// The size of the bank's XSCOM region in bytes.
    pub fn size(&self) -> u64 {
        (self.regs.len() as u64) << XSCOM_REG_SHIFT
    }

    /// Returns whether the guest may write register `reg`.
    pub fn is_writable(&self, reg: u32) -> bool {
        self.writable.contains(&reg)
    }

    /// The number of writes dropped because they targeted a register outside
    /// the allow-list.
    pub fn rejected_writes(&self) -> u64 {
        self.rejected_writes
    }

    /// Reads register `reg`.
    pub fn read(&self, reg: u32) -> u64 {
        self.regs.get(reg as usize).copied().unwrap_or(0)
    }

    /// Writes `val` to register `reg`.
    ///
    /// Returns `false` if the write was dropped.
    pub fn write(&mut self, reg: u32, val: u64) -> bool {
        if self.is_writable(reg)
            && let Some(slot) = self.regs.get_mut(reg as usize)
        {
            *slot = val;
            return true;
        }

        self.rejected_writes += 1;
        tracing::warn!(
            bank = %self.name,
            reg = format_args!("{:#x}", reg),
            val = format_args!("{:#x}", val),
            "unsupported register access"
        );
        false
    }
}
