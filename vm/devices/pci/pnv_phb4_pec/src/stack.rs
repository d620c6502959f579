// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! PEC stacks and the interface to the PHB devices they host.

use crate::family::PecFamily;
use std::fmt::Debug;

/// Identity of the PEC that owns a stack.
///
/// This is a copy of the owner's fixed configuration taken when the stack is
/// created. It does not keep the PEC alive.
#[derive(Debug, Copy, Clone)]
pub struct PecHandle {
    /// The chip the PEC is on.
    pub chip_id: u32,
    /// The PEC's index on the chip.
    pub pec_index: u32,
    /// The PEC's generation.
    pub family: &'static PecFamily,
}

impl PecHandle {
    /// The chip-wide PHB index of the given stack of this PEC, or `None` if
    /// the PEC has no such stack.
    pub fn phb_index(&self, stack_no: u32) -> Option<u32> {
        self.family.phb_index(self.pec_index, stack_no)
    }
}

/// Configuration handed to the PHB model when a stack populates its default
/// PHB.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PhbConfig {
    /// The chip the PHB is on.
    pub chip_id: u32,
    /// The chip-wide PHB index.
    pub phb_index: u32,
    /// The PHB version register value.
    pub version: u64,
    /// The index of the PEC hosting the PHB.
    pub pec_index: u32,
    /// The stack hosting the PHB.
    pub stack_no: u32,
}

/// A PHB device attached to a stack.
pub trait PhbDevice: Debug + Send {
    /// The configuration the PHB was created with.
    fn config(&self) -> &PhbConfig;
}

/// Builds the PHB devices for stacks.
pub trait PhbFactory {
    /// Creates a new PHB with the given configuration.
    fn new_phb(&mut self, config: PhbConfig) -> anyhow::Result<Box<dyn PhbDevice>>;
}

/// A [`PhbFactory`] for configurations that never populate default PHBs.
pub struct NoPhbs;

impl PhbFactory for NoPhbs {
    fn new_phb(&mut self, config: PhbConfig) -> anyhow::Result<Box<dyn PhbDevice>> {
        anyhow::bail!("no PHB model available for PHB{}", config.phb_index)
    }
}

/// One stack of a PEC.
#[derive(Debug)]
pub struct PecStack {
    stack_no: u32,
    phb_index: u32,
    pec: PecHandle,
    phb: Option<Box<dyn PhbDevice>>,
    realized: bool,
}

impl PecStack {
    /// Returns `None` if the PEC has no stack `stack_no`.
    pub(crate) fn new(pec: PecHandle, stack_no: u32) -> Option<Self> {
        Some(Self {
            stack_no,
            phb_index: pec.phb_index(stack_no)?,
            pec,
            phb: None,
            realized: false,
        })
    }

    /// The stack's position in its PEC.
    pub fn stack_no(&self) -> u32 {
        self.stack_no
    }

    /// The chip-wide index of the PHB hosted by this stack.
    pub fn phb_index(&self) -> u32 {
        self.phb_index
    }

    /// The PHB hosted by this stack, if any.
    pub fn phb(&self) -> Option<&dyn PhbDevice> {
        self.phb.as_deref()
    }

    /// The configuration of this stack's default PHB.
    pub fn phb_config(&self) -> PhbConfig {
        PhbConfig {
            chip_id: self.pec.chip_id,
            phb_index: self.phb_index,
            version: self.pec.family.phb_version,
            pec_index: self.pec.pec_index,
            stack_no: self.stack_no,
        }
    }

    /// Realizes the stack, creating the default PHB if `populate_default_phb`
    /// is set.
    ///
    /// Must be called exactly once.
    pub(crate) fn realize(
        &mut self,
        phbs: &mut dyn PhbFactory,
        populate_default_phb: bool,
    ) -> anyhow::Result<()> {
        assert!(!self.realized, "stack {} realized twice", self.stack_no);
        self.realized = true;

        if !populate_default_phb {
            return Ok(());
        }

        let config = self.phb_config();
        tracing::debug!(
            chip_id = config.chip_id,
            pec = config.pec_index,
            stack = config.stack_no,
            phb = config.phb_index,
            "creating default phb"
        );
        self.phb = Some(phbs.new_phb(config)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::PEC_POWER9;
    use crate::test_helpers::FailingPhbs;
    use crate::test_helpers::RecordingPhbs;

    fn handle(pec_index: u32) -> PecHandle {
        PecHandle {
            chip_id: 1,
            pec_index,
            family: &PEC_POWER9,
        }
    }

    #[test]
    fn test_missing_stack() {
        assert!(PecStack::new(handle(0), 1).is_none());
        assert!(PecStack::new(handle(2), 3).is_none());
        assert!(PecStack::new(handle(3), 0).is_none());
        assert_eq!(handle(0).phb_index(1), None);
        assert_eq!(handle(1).phb_index(1), Some(2));
    }

    #[test]
    fn test_realize_without_defaults() {
        let mut phbs = RecordingPhbs::default();
        let mut stack = PecStack::new(handle(1), 1).unwrap();
        stack.realize(&mut phbs, false).unwrap();
        assert!(stack.phb().is_none());
        assert!(phbs.created.is_empty());
    }

    #[test]
    fn test_realize_default_phb() {
        let mut phbs = RecordingPhbs::default();
        let mut stack = PecStack::new(handle(2), 1).unwrap();
        stack.realize(&mut phbs, true).unwrap();

        let expected = PhbConfig {
            chip_id: 1,
            phb_index: 4,
            version: 0xa4_0000_0002,
            pec_index: 2,
            stack_no: 1,
        };
        assert_eq!(phbs.created, [expected]);
        assert_eq!(stack.phb().unwrap().config(), &expected);
        assert_eq!(stack.phb_index(), 4);
    }

    #[test]
    fn test_realize_failure_propagates() {
        let mut stack = PecStack::new(handle(0), 0).unwrap();
        let err = stack.realize(&mut FailingPhbs, true).unwrap_err();
        assert!(err.to_string().contains("PHB0"));
        assert!(stack.phb().is_none());

        let err = PecStack::new(handle(1), 0)
            .unwrap()
            .realize(&mut NoPhbs, true)
            .unwrap_err();
        assert_eq!(err.to_string(), "no PHB model available for PHB1");
    }

    #[test]
    #[should_panic(expected = "realized twice")]
    fn test_realize_is_one_shot() {
        let mut stack = PecStack::new(handle(0), 0).unwrap();
        stack.realize(&mut NoPhbs, false).unwrap();
        let _ = stack.realize(&mut NoPhbs, false);
    }
}
