use crate::strategies::OutputBackend;
use anyhow::Result;
use common::{IntegrationAdapter, TrackingResult};

pub struct Dispatcher {
    backend: OutputBackend,
}

impl Dispatcher {
    pub fn new(backend: OutputBackend) -> Self {
        Self { backend }
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.backend.initialize()
    }

    pub fn send(&self, result: &TrackingResult) -> Result<()> {
        self.backend.send(result)
    }
}
