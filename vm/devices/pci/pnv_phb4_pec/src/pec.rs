// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The PEC device.

use crate::PHB4_PEC_MAX_STACKS;
use crate::XSCOM_REG_SHIFT;
use crate::bank::BankKind;
use crate::bank::RegisterBank;
use crate::family::PecFamily;
use crate::stack::PecHandle;
use crate::stack::PecStack;
use crate::stack::PhbFactory;
use crate::xscom::DecodedXscomAccess;
use crate::xscom::decode_register;
use crate::xscom::decode_xscom_access;
use arrayvec::ArrayVec;
use chipset_device::ChipsetDevice;
use chipset_device::io::IoError;
use chipset_device::io::IoResult;
use chipset_device::xscom::ControlXscomIntercept;
use chipset_device::xscom::RegisterXscomIntercept;
use chipset_device::xscom::XscomIntercept;
use thiserror::Error;
use zerocopy::IntoBytes;
use zerocopy::byteorder::big_endian::U64;

/// Configuration of a single PEC.
#[derive(Debug, Copy, Clone)]
pub struct PecConfig {
    /// The chip the PEC is on.
    pub chip_id: u32,
    /// The PEC's index on the chip.
    pub index: u32,
    /// The number of PECs the chip declares.
    pub num_pecs: u32,
    /// The chip generation.
    pub family: &'static PecFamily,
    /// Whether each stack creates a PHB on its own.
    pub populate_default_phbs: bool,
}

/// Errors building a PEC.
#[derive(Debug, Error)]
pub enum PecError {
    /// The PEC index is not below the chip's PEC count.
    #[error("invalid PEC index: {index} (chip {chip_id} has {num_pecs} PECs)")]
    InvalidIndex {
        /// The chip the PEC was to be created on.
        chip_id: u32,
        /// The requested index.
        index: u32,
        /// The chip's PEC count.
        num_pecs: u32,
    },
    /// The chip declares more PECs than its generation has.
    #[error("chip declares {num_pecs} PECs but {family} chips have at most {max}")]
    TooManyPecs {
        /// The generation name.
        family: &'static str,
        /// The chip's PEC count.
        num_pecs: u32,
        /// The generation's PEC count.
        max: u32,
    },
    /// The default PHB of a stack could not be created.
    #[error("failed to realize PHB{phb_index} on chip {chip_id} PEC{pec} stack {stack_no}")]
    PhbRealize {
        /// The chip the PEC is on.
        chip_id: u32,
        /// The PEC index.
        pec: u32,
        /// The stack hosting the PHB.
        stack_no: u32,
        /// The PHB index.
        phb_index: u32,
        /// The PHB model's error.
        #[source]
        source: anyhow::Error,
    },
}

/// A POWER PCI Express controller complex.
pub struct PhbPec {
    chip_id: u32,
    index: u32,
    family: &'static PecFamily,
    nest_base: u32,
    pci_base: u32,

    nest_regs: RegisterBank,
    pci_regs: RegisterBank,
    nest_regs_mr: Box<dyn ControlXscomIntercept>,
    pci_regs_mr: Box<dyn ControlXscomIntercept>,

    /// Live stacks, indexed by stack number.
    stacks: ArrayVec<PecStack, PHB4_PEC_MAX_STACKS>,
}

impl std::fmt::Debug for PhbPec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhbPec")
            .field("chip_id", &self.chip_id)
            .field("index", &self.index)
            .field("family", &self.family.name)
            .field("nest_regs", &self.nest_regs)
            .field("pci_regs", &self.pci_regs)
            .field("stacks", &self.stacks)
            .finish_non_exhaustive()
    }
}

impl PhbPec {
    /// Builds and realizes a PEC.
    ///
    /// The PEC's stacks are created and, if
    /// [`PecConfig::populate_default_phbs`] is set, each is populated with a
    /// PHB built by `phbs`. The two register banks are mapped through
    /// `register_xscom`.
    pub fn new(
        register_xscom: &mut dyn RegisterXscomIntercept,
        phbs: &mut dyn PhbFactory,
        config: PecConfig,
    ) -> Result<Self, PecError> {
        let PecConfig {
            chip_id,
            index,
            num_pecs,
            family,
            populate_default_phbs,
        } = config;

        if num_pecs > family.max_pecs() {
            return Err(PecError::TooManyPecs {
                family: family.name,
                num_pecs,
                max: family.max_pecs(),
            });
        }

        let geometry = (index < num_pecs)
            .then(|| {
                Some((
                    family.num_stacks(index)?,
                    family.xscom_base(BankKind::Nest, index)?,
                    family.xscom_base(BankKind::Pci, index)?,
                ))
            })
            .flatten();
        let Some((num_stacks, nest_base, pci_base)) = geometry else {
            return Err(PecError::InvalidIndex {
                chip_id,
                index,
                num_pecs,
            });
        };

        let handle = PecHandle {
            chip_id,
            pec_index: index,
            family,
        };

        // Slots are filled in stack order; the first one the PEC does not
        // have ends the live prefix.
        let mut stacks: ArrayVec<PecStack, PHB4_PEC_MAX_STACKS> = (0..PHB4_PEC_MAX_STACKS as u32)
            .map_while(|stack_no| PecStack::new(handle, stack_no))
            .collect();
        debug_assert_eq!(stacks.len(), num_stacks as usize);

        for stack in stacks.iter_mut() {
            stack
                .realize(phbs, populate_default_phbs)
                .map_err(|source| PecError::PhbRealize {
                    chip_id,
                    pec: index,
                    stack_no: stack.stack_no(),
                    phb_index: stack.phb_index(),
                    source,
                })?;
        }

        let nest_regs = RegisterBank::new(BankKind::Nest, chip_id, index);
        let pci_regs = RegisterBank::new(BankKind::Pci, chip_id, index);

        let mut nest_regs_mr = register_xscom.new_xscom_region(nest_regs.name(), nest_regs.size());
        nest_regs_mr.map((nest_base as u64) << XSCOM_REG_SHIFT);
        let mut pci_regs_mr = register_xscom.new_xscom_region(pci_regs.name(), pci_regs.size());
        pci_regs_mr.map((pci_base as u64) << XSCOM_REG_SHIFT);

        tracing::debug!(
            chip_id,
            index,
            num_stacks,
            family = family.name,
            nest_base = format_args!("{:#x}", nest_base),
            pci_base = format_args!("{:#x}", pci_base),
            "realized pec"
        );

        Ok(Self {
            chip_id,
            index,
            family,
            nest_base,
            pci_base,
            nest_regs,
            pci_regs,
            nest_regs_mr,
            pci_regs_mr,
            stacks,
        })
    }

    /// The chip the PEC is on.
    pub fn chip_id(&self) -> u32 {
        self.chip_id
    }

    /// The PEC's index on the chip.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The PEC's generation.
    pub fn family(&self) -> &'static PecFamily {
        self.family
    }

    /// The number of live stacks.
    pub fn num_stacks(&self) -> u32 {
        self.stacks.len() as u32
    }

    /// The live stacks, in stack number order.
    pub fn stacks(&self) -> &[PecStack] {
        &self.stacks
    }

    /// The live stack `stack_no`, if it exists.
    pub fn stack(&self, stack_no: u32) -> Option<&PecStack> {
        self.stacks.get(stack_no as usize)
    }

    /// The chip-wide PHB index of stack `stack_no`, or `None` if the stack is
    /// not live.
    ///
    /// This is the index handed to the stack's default PHB and advertised in
    /// the device tree.
    pub fn phb_index(&self, stack_no: u32) -> Option<u32> {
        self.stack(stack_no).map(PecStack::phb_index)
    }

    /// PCB address of the nest register bank.
    pub fn xscom_nest_base(&self) -> u32 {
        self.nest_base
    }

    /// PCB address of the pci register bank.
    pub fn xscom_pci_base(&self) -> u32 {
        self.pci_base
    }

    /// The register bank of the given kind.
    pub fn bank(&self, kind: BankKind) -> &RegisterBank {
        match kind {
            BankKind::Nest => &self.nest_regs,
            BankKind::Pci => &self.pci_regs,
        }
    }

    fn bank_mut(&mut self, kind: BankKind) -> &mut RegisterBank {
        match kind {
            BankKind::Nest => &mut self.nest_regs,
            BankKind::Pci => &mut self.pci_regs,
        }
    }

    /// Reads a register of one of the banks by bank-relative byte offset.
    ///
    /// `len` must be 8.
    pub fn read_reg(&self, kind: BankKind, offset: u64, len: usize) -> Result<u64, IoError> {
        let reg = decode_register(offset, len)?;
        Ok(self.bank(kind).read(reg))
    }

    /// Writes a register of one of the banks by bank-relative byte offset.
    ///
    /// Writes to registers that are not writable are dropped but still
    /// complete successfully. `len` must be 8.
    pub fn write_reg(
        &mut self,
        kind: BankKind,
        offset: u64,
        len: usize,
        val: u64,
    ) -> Result<(), IoError> {
        let reg = decode_register(offset, len)?;
        self.bank_mut(kind).write(reg, val);
        Ok(())
    }

    fn decode(&self, addr: u64, len: usize) -> DecodedXscomAccess {
        decode_xscom_access(
            self.nest_regs_mr.as_ref(),
            self.pci_regs_mr.as_ref(),
            addr,
            len,
        )
    }
}

impl ChipsetDevice for PhbPec {
    fn supports_xscom(&mut self) -> Option<&mut dyn XscomIntercept> {
        Some(self)
    }
}

impl XscomIntercept for PhbPec {
    fn xscom_read(&mut self, addr: u64, data: &mut [u8]) -> IoResult {
        match self.decode(addr, data.len()) {
            DecodedXscomAccess::UnexpectedIntercept => {
                tracing::error!("unexpected intercept at address {:#x}", addr);
                data.fill(!0);
            }
            DecodedXscomAccess::Invalid(err) => return IoResult::Err(err),
            DecodedXscomAccess::Register(kind, reg) => {
                let val = U64::new(self.bank(kind).read(reg));
                data.copy_from_slice(val.as_bytes());
            }
        }
        IoResult::Ok
    }

    fn xscom_write(&mut self, addr: u64, data: &[u8]) -> IoResult {
        match self.decode(addr, data.len()) {
            DecodedXscomAccess::UnexpectedIntercept => {
                tracing::error!("unexpected intercept at address {:#x}", addr);
            }
            DecodedXscomAccess::Invalid(err) => return IoResult::Err(err),
            DecodedXscomAccess::Register(kind, reg) => {
                let mut val = U64::ZERO;
                val.as_mut_bytes().copy_from_slice(data);
                self.bank_mut(kind).write(reg, val.get());
            }
        }
        IoResult::Ok
    }
}
