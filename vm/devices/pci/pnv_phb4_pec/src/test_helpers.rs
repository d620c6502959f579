// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::stack::PhbConfig;
use crate::stack::PhbDevice;
use crate::stack::PhbFactory;
use chipset_device::xscom::ControlXscomIntercept;
use chipset_device::xscom::RegisterXscomIntercept;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use tracing::Level;
use tracing::Subscriber;
use tracing::field::Field;
use tracing::field::Visit;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Default)]
pub struct TestXscomRegistration {
    pub regions: Vec<(String, u64)>,
}

impl RegisterXscomIntercept for TestXscomRegistration {
    fn new_xscom_region(&mut self, debug_name: &str, len: u64) -> Box<dyn ControlXscomIntercept> {
        self.regions.push((debug_name.to_owned(), len));
        Box::new(TestXscomRegion { mapping: None, len })
    }
}

pub struct TestXscomRegion {
    mapping: Option<u64>,
    len: u64,
}

impl TestXscomRegion {
    pub fn mapped(addr: u64, len: u64) -> Self {
        Self {
            mapping: Some(addr),
            len,
        }
    }
}

impl ControlXscomIntercept for TestXscomRegion {
    fn map(&mut self, addr: u64) {
        match self.mapping {
            Some(_) => panic!("already mapped"),
            None => self.mapping = Some(addr),
        }
    }

    fn addr(&self) -> Option<u64> {
        self.mapping
    }

    fn len(&self) -> u64 {
        self.len
    }
}

#[derive(Debug)]
pub struct TestPhb {
    config: PhbConfig,
}

impl PhbDevice for TestPhb {
    fn config(&self) -> &PhbConfig {
        &self.config
    }
}

/// Builds [`TestPhb`]s, remembering the configuration of each.
#[derive(Default)]
pub struct RecordingPhbs {
    pub created: Vec<PhbConfig>,
}

impl PhbFactory for RecordingPhbs {
    fn new_phb(&mut self, config: PhbConfig) -> anyhow::Result<Box<dyn PhbDevice>> {
        self.created.push(config);
        Ok(Box::new(TestPhb { config }))
    }
}

pub struct FailingPhbs;

impl PhbFactory for FailingPhbs {
    fn new_phb(&mut self, config: PhbConfig) -> anyhow::Result<Box<dyn PhbDevice>> {
        anyhow::bail!("PHB{} rejected its configuration", config.phb_index)
    }
}

struct WarningRecorder(Arc<Mutex<Vec<String>>>);

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningRecorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            self.0.lock().unwrap().push(visitor.0);
        }
    }
}

/// Runs `f`, returning the messages of the warnings it logged on this thread.
pub fn capture_warnings(f: impl FnOnce()) -> Vec<String> {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(WarningRecorder(messages.clone()));
    tracing::subscriber::with_default(subscriber, f);
    messages.lock().unwrap().clone()
}

/// Runs `f`, returning the number of warnings it logged on this thread.
pub fn count_warnings(f: impl FnOnce()) -> usize {
    capture_warnings(f).len()
}
