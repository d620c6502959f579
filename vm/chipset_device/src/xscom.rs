// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! XSCOM (control bus) intercept traits.
//!
//! XSCOM registers are 64 bits wide and identified by a PCB address. The
//! traits in this module operate on byte addresses, i.e. the PCB address
//! shifted left by 3.

use crate::io::IoResult;

/// Implemented by devices which respond to XSCOM accesses.
///
/// Accesses carry one whole register. `data` holds the register value in
/// big-endian byte order, the device's native order, regardless of the host.
pub trait XscomIntercept {
    /// Dispatch an XSCOM read to the device with the given byte address.
    fn xscom_read(&mut self, addr: u64, data: &mut [u8]) -> IoResult;
    /// Dispatch an XSCOM write to the device with the given byte address.
    fn xscom_write(&mut self, addr: u64, data: &[u8]) -> IoResult;
}

/// Used by devices to allocate XSCOM regions during construction.
pub trait RegisterXscomIntercept {
    /// Creates a new, unmapped XSCOM region `len` bytes long.
    fn new_xscom_region(&mut self, debug_name: &str, len: u64) -> Box<dyn ControlXscomIntercept>;
}

/// A handle to an XSCOM region owned by a device.
pub trait ControlXscomIntercept: Send {
    /// Maps the region at the given byte address.
    fn map(&mut self, addr: u64);

    /// Returns the currently mapped address.
    ///
    /// Returns `None` if the region is currently unmapped.
    fn addr(&self) -> Option<u64>;

    /// Returns the length of the region in bytes.
    fn len(&self) -> u64;

    /// Returns the offset of `addr` from the region's base address.
    ///
    /// Returns `None` if the provided `addr` is outside of the region, or the
    /// region is currently unmapped.
    fn offset_of(&self, addr: u64) -> Option<u64> {
        let base = self.addr()?;
        addr.checked_sub(base).filter(|&offset| offset < self.len())
    }
}
