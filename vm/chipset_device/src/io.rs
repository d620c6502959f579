// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Result types for device bus accesses.

/// An error returned by a device bus access.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IoError {
    /// The access size is not supported by the device.
    InvalidAccessSize,
    /// The address is not aligned to the access size.
    UnalignedAccess,
}

/// The result of a device bus access.
///
/// Devices report errors through this type rather than `Result` so that the
/// bus can decide how to surface them to the guest.
#[must_use]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IoResult {
    /// The access completed.
    Ok,
    /// The access failed.
    Err(IoError),
}

impl IoResult {
    /// Panics if the access did not complete.
    #[track_caller]
    pub fn unwrap(self) {
        match self {
            IoResult::Ok => {}
            IoResult::Err(err) => panic!("unexpected io error: {:?}", err),
        }
    }
}
