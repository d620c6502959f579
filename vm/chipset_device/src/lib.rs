// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Types and traits to model chipset devices and their bus interfaces.

#![forbid(unsafe_code)]

pub mod io;
pub mod xscom;

/// Implemented by any device that is considered part of the chipset.
///
/// Devices advertise the buses they respond to by returning `Some` from the
/// corresponding `supports_*` method.
pub trait ChipsetDevice: 'static + Send {
    /// Optionally returns a trait object to send control-bus (XSCOM)
    /// accesses to.
    fn supports_xscom(&mut self) -> Option<&mut dyn xscom::XscomIntercept> {
        None
    }
}
