// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-generation PEC constants.

use crate::bank::BankKind;

/// Static description of a generation of PECs.
///
/// Everything that differs between chip generations lives here, so a single
/// [`PhbPec`](crate::PhbPec) type covers all of them.
#[derive(Debug)]
pub struct PecFamily {
    /// Human readable generation name.
    pub name: &'static str,
    /// PCB address of the nest bank of PEC 0.
    pub xscom_nest_base: u32,
    /// Distance between the nest banks of consecutive PECs.
    pub xscom_nest_stride: u32,
    /// Size of the nest XSCOM range advertised to firmware.
    pub xscom_nest_size: u32,
    /// PCB address of the pci bank of PEC 0.
    pub xscom_pci_base: u32,
    /// Distance between the pci banks of consecutive PECs.
    pub xscom_pci_stride: u32,
    /// Size of the pci XSCOM range advertised to firmware.
    pub xscom_pci_size: u32,
    /// `compatible` string of the PEC node.
    pub compat: &'static str,
    /// `compatible` string of each stack node.
    pub stk_compat: &'static str,
    /// Version register value handed to each PHB.
    pub phb_version: u64,
    /// Number of stacks of each PEC, indexed by PEC index.
    pub num_stacks: &'static [u32],
}

/// POWER9 PECs, hosting PHB4 bridges.
///
/// PEC0 has 1 stack, PEC1 has 2 and PEC2 has 3.
pub const PEC_POWER9: PecFamily = PecFamily {
    name: "power9",
    xscom_nest_base: 0x4010c00,
    xscom_nest_stride: 0x400,
    xscom_nest_size: 0x100,
    xscom_pci_base: 0xd010800,
    xscom_pci_stride: 0x1000000,
    xscom_pci_size: 0x200,
    compat: "ibm,power9-pbcq",
    stk_compat: "ibm,power9-phb-stack",
    phb_version: 0x0000_00a4_0000_0002,
    num_stacks: &[1, 2, 3],
};

/// POWER10 PECs, hosting PHB5 bridges.
pub const PEC_POWER10: PecFamily = PecFamily {
    name: "power10",
    xscom_nest_base: 0x3011800,
    xscom_nest_stride: 0x1000000,
    xscom_nest_size: 0x100,
    xscom_pci_base: 0x8010800,
    xscom_pci_stride: 0x1000000,
    xscom_pci_size: 0x200,
    compat: "ibm,power10-pbcq",
    stk_compat: "ibm,power10-phb-stack",
    phb_version: 0x0000_00a5_0000_0001,
    num_stacks: &[3, 3],
};

impl PecFamily {
    /// The largest number of PECs a chip of this generation can have.
    pub fn max_pecs(&self) -> u32 {
        self.num_stacks.len() as u32
    }

    /// Number of stacks of the PEC at `index`, or `None` if the generation
    /// has no such PEC.
    pub fn num_stacks(&self, index: u32) -> Option<u32> {
        self.num_stacks.get(index as usize).copied()
    }

    /// PCB address of the given bank of the PEC at `index`, or `None` if the
    /// generation has no such PEC.
    pub fn xscom_base(&self, kind: BankKind, index: u32) -> Option<u32> {
        if index >= self.max_pecs() {
            return None;
        }
        let (base, stride) = match kind {
            BankKind::Nest => (self.xscom_nest_base, self.xscom_nest_stride),
            BankKind::Pci => (self.xscom_pci_base, self.xscom_pci_stride),
        };
        stride.checked_mul(index)?.checked_add(base)
    }

    /// Size of the XSCOM range of the given bank advertised to firmware.
    pub fn xscom_size(&self, kind: BankKind) -> u32 {
        match kind {
            BankKind::Nest => self.xscom_nest_size,
            BankKind::Pci => self.xscom_pci_size,
        }
    }

    /// The chip-wide PHB index of stack `stack_no` of the PEC at `pec_index`.
    ///
    /// PHBs are numbered consecutively across PECs, so this is the number of
    /// stacks on all lower PECs plus `stack_no`. Returns `None` if the PEC
    /// does not have that stack.
    pub fn phb_index(&self, pec_index: u32, stack_no: u32) -> Option<u32> {
        if stack_no >= self.num_stacks(pec_index)? {
            return None;
        }
        self.num_stacks[..pec_index as usize]
            .iter()
            .try_fold(stack_no, |acc, &n| acc.checked_add(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PHB4_PEC_MAX_STACKS;

    #[test]
    fn test_tables_fit_stack_slots() {
        for family in [&PEC_POWER9, &PEC_POWER10] {
            assert!(
                family
                    .num_stacks
                    .iter()
                    .all(|&n| n >= 1 && n as usize <= PHB4_PEC_MAX_STACKS)
            );
        }
    }

    #[test]
    fn test_num_stacks() {
        assert_eq!(PEC_POWER9.max_pecs(), 3);
        assert_eq!(PEC_POWER9.num_stacks(0), Some(1));
        assert_eq!(PEC_POWER9.num_stacks(1), Some(2));
        assert_eq!(PEC_POWER9.num_stacks(2), Some(3));
        assert_eq!(PEC_POWER9.num_stacks(3), None);

        assert_eq!(PEC_POWER10.max_pecs(), 2);
        assert_eq!(PEC_POWER10.num_stacks(1), Some(3));
    }

    #[test]
    fn test_phb_index_is_dense() {
        for family in [&PEC_POWER9, &PEC_POWER10] {
            let ids: Vec<u32> = (0..family.max_pecs())
                .flat_map(|pec| {
                    (0..family.num_stacks(pec).unwrap())
                        .map(move |stk| family.phb_index(pec, stk).unwrap())
                })
                .collect();
            let expected: Vec<u32> = (0..ids.len() as u32).collect();
            assert_eq!(ids, expected, "{}", family.name);
        }

        assert_eq!(PEC_POWER9.phb_index(0, 0), Some(0));
        assert_eq!(PEC_POWER9.phb_index(1, 1), Some(2));
        assert_eq!(PEC_POWER9.phb_index(2, 0), Some(3));
        assert_eq!(PEC_POWER9.phb_index(2, 2), Some(5));
        assert_eq!(PEC_POWER10.phb_index(1, 0), Some(3));
    }

    #[test]
    fn test_phb_index_missing_stack() {
        // PEC0 has a single stack; its second slot must not alias PEC1's
        // first PHB.
        assert_eq!(PEC_POWER9.phb_index(0, 1), None);
        assert_eq!(PEC_POWER9.phb_index(1, 2), None);
        assert_eq!(PEC_POWER9.phb_index(1, u32::MAX), None);
        assert_eq!(PEC_POWER9.phb_index(3, 0), None);
        assert_eq!(PEC_POWER9.phb_index(u32::MAX, 0), None);
        assert_eq!(PEC_POWER10.phb_index(2, 0), None);
    }

    #[test]
    fn test_xscom_bases() {
        assert_eq!(PEC_POWER9.xscom_base(BankKind::Nest, 0), Some(0x4010c00));
        assert_eq!(PEC_POWER9.xscom_base(BankKind::Nest, 2), Some(0x4011400));
        assert_eq!(PEC_POWER9.xscom_base(BankKind::Pci, 1), Some(0xe010800));
        assert_eq!(PEC_POWER10.xscom_base(BankKind::Nest, 1), Some(0x4011800));
        assert_eq!(PEC_POWER10.xscom_base(BankKind::Pci, 1), Some(0x9010800));

        assert_eq!(PEC_POWER9.xscom_base(BankKind::Nest, 3), None);
        assert_eq!(PEC_POWER9.xscom_base(BankKind::Pci, u32::MAX), None);
        assert_eq!(PEC_POWER10.xscom_base(BankKind::Pci, 2), None);
    }

    #[test]
    fn test_sibling_ranges_do_not_overlap() {
        for family in [&PEC_POWER9, &PEC_POWER10] {
            for kind in [BankKind::Nest, BankKind::Pci] {
                let size = family.xscom_size(kind);
                for i in 0..family.max_pecs() {
                    for j in 0..family.max_pecs() {
                        if i == j {
                            continue;
                        }
                        let a = family.xscom_base(kind, i).unwrap();
                        let b = family.xscom_base(kind, j).unwrap();
                        assert!(a + size <= b || b + size <= a, "{} {kind} {i} {j}", family.name);
                    }
                }
            }
        }
    }
}
