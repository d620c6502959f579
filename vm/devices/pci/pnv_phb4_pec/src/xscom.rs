// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decoding of XSCOM accesses into PEC register bank accesses.

use crate::XSCOM_REG_SHIFT;
use crate::XSCOM_REG_SIZE;
use crate::bank::BankKind;
use chipset_device::io::IoError;
use chipset_device::xscom::ControlXscomIntercept;

/// Converts a bank-relative byte offset into a register index.
///
/// PEC registers only support 8-byte accesses. The XSCOM transport is
/// expected to reject anything else before it reaches the device, so other
/// sizes are reported as errors rather than emulated.
///
/// No bounds check is performed: indices past the end of a bank read as zero
/// and reject writes. Indices too large for a `u32` decode to `u32::MAX`,
/// which is past the end of every bank.
pub fn decode_register(offset: u64, len: usize) -> Result<u32, IoError> {
    if len as u64 != XSCOM_REG_SIZE {
        tracing::error!(offset, len, "invalid xscom access size");
        return Err(IoError::InvalidAccessSize);
    }
    if offset & (XSCOM_REG_SIZE - 1) != 0 {
        tracing::error!(offset, "unaligned xscom access");
        return Err(IoError::UnalignedAccess);
    }
    Ok(u32::try_from(offset >> XSCOM_REG_SHIFT).unwrap_or(u32::MAX))
}

/// The target of an XSCOM access.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DecodedXscomAccess {
    /// The address is in neither of the PEC's regions.
    UnexpectedIntercept,
    /// Register access to one of the banks.
    Register(BankKind, u32),
    /// The access itself is malformed.
    Invalid(IoError),
}

/// Routes an absolute XSCOM byte address to one of the PEC's two regions.
pub(crate) fn decode_xscom_access(
    nest: &dyn ControlXscomIntercept,
    pci: &dyn ControlXscomIntercept,
    addr: u64,
    len: usize,
) -> DecodedXscomAccess {
    let (kind, offset) = if let Some(offset) = nest.offset_of(addr) {
        (BankKind::Nest, offset)
    } else if let Some(offset) = pci.offset_of(addr) {
        (BankKind::Pci, offset)
    } else {
        return DecodedXscomAccess::UnexpectedIntercept;
    };

    match decode_register(offset, len) {
        Ok(reg) => DecodedXscomAccess::Register(kind, reg),
        Err(err) => DecodedXscomAccess::Invalid(err),
    }
}
