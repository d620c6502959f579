// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Device tree description of a PEC.
//!
//! Firmware finds PECs through `pbcq@<nest base>` nodes under the chip's
//! XSCOM node. Each node lists the two register bank ranges and has one
//! `stack@<n>` child per live stack carrying the stack's PHB index.

use crate::bank::BankKind;
use crate::pec::PhbPec;
use std::fmt;
use vm_fdt::FdtWriter;
use zerocopy::IntoBytes;
use zerocopy::byteorder::big_endian::U32;

/// The device tree node of a PEC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PecTopology {
    /// PCB address of the nest bank.
    pub nest_base: u32,
    /// Size of the nest XSCOM range.
    pub nest_size: u32,
    /// PCB address of the pci bank.
    pub pci_base: u32,
    /// Size of the pci XSCOM range.
    pub pci_size: u32,
    /// The PEC's index on the chip.
    pub index: u32,
    /// The PEC node's `compatible` string.
    pub compatible: &'static str,
    /// One entry per live stack, in stack number order.
    pub stacks: Vec<StackTopology>,
}

/// The device tree node of a PEC stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackTopology {
    /// The stack's position in its PEC.
    pub stack_no: u32,
    /// The chip-wide index of the stack's PHB.
    pub phb_index: u32,
    /// The stack node's `compatible` string.
    pub compatible: &'static str,
}

/// Describes a realized PEC.
pub fn emit(pec: &PhbPec) -> PecTopology {
    let family = pec.family();
    PecTopology {
        nest_base: pec.xscom_nest_base(),
        nest_size: family.xscom_size(BankKind::Nest),
        pci_base: pec.xscom_pci_base(),
        pci_size: family.xscom_size(BankKind::Pci),
        index: pec.index(),
        compatible: family.compat,
        stacks: pec
            .stacks()
            .iter()
            .map(|stack| StackTopology {
                stack_no: stack.stack_no(),
                phb_index: stack.phb_index(),
                compatible: family.stk_compat,
            })
            .collect(),
    }
}

impl PecTopology {
    /// The node name.
    pub fn name(&self) -> String {
        format!("pbcq@{:x}", self.nest_base)
    }

    /// The `reg` cells: `<nest_base nest_size pci_base pci_size>`.
    pub fn reg(&self) -> [u32; 4] {
        [self.nest_base, self.nest_size, self.pci_base, self.pci_size]
    }

    /// The `reg` property as stored in the flattened tree.
    pub fn reg_bytes(&self) -> Vec<u8> {
        self.reg().map(U32::new).as_bytes().to_vec()
    }

    /// Appends the PEC node as a child of the node currently open in `fdt`.
    pub fn write_fdt(&self, fdt: &mut FdtWriter) -> Result<(), vm_fdt::Error> {
        let pbcq = fdt.begin_node(&self.name())?;
        fdt.property("reg", &self.reg_bytes())?;
        fdt.property_u32("ibm,pec-index", self.index)?;
        fdt.property_u32("#address-cells", 1)?;
        fdt.property_u32("#size-cells", 0)?;
        fdt.property_string("compatible", self.compatible)?;

        for stack in &self.stacks {
            let node = fdt.begin_node(&stack.name())?;
            fdt.property_string("compatible", stack.compatible)?;
            fdt.property_u32("reg", stack.stack_no)?;
            fdt.property_u32("ibm,phb-index", stack.phb_index)?;
            fdt.end_node(node)?;
        }

        fdt.end_node(pbcq)
    }
}

impl StackTopology {
    /// The node name.
    pub fn name(&self) -> String {
        format!("stack@{:x}", self.stack_no)
    }
}

/// Renders the node in device tree source syntax.
impl fmt::Display for PecTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [nest_base, nest_size, pci_base, pci_size] = self.reg();
        writeln!(f, "{} {{", self.name())?;
        writeln!(
            f,
            "    reg = <{:#x} {:#x} {:#x} {:#x}>;",
            nest_base, nest_size, pci_base, pci_size
        )?;
        writeln!(f, "    ibm,pec-index = <{:#x}>;", self.index)?;
        writeln!(f, "    #address-cells = <0x1>;")?;
        writeln!(f, "    #size-cells = <0x0>;")?;
        writeln!(f, "    compatible = \"{}\";", self.compatible)?;
        for stack in &self.stacks {
            writeln!(f)?;
            writeln!(f, "    {} {{", stack.name())?;
            writeln!(f, "        compatible = \"{}\";", stack.compatible)?;
            writeln!(f, "        reg = <{:#x}>;", stack.stack_no)?;
            writeln!(f, "        ibm,phb-index = <{:#x}>;", stack.phb_index)?;
            writeln!(f, "    }};")?;
        }
        writeln!(f, "}};")
    }
}
