use crate::osc::GazeOsc;
use anyhow::Result;
use common::{IntegrationAdapter, TrackingResult};
use log::info;

pub struct OscStrategy {
    inner: GazeOsc,
}

impl OscStrategy {
    pub fn new(target_addr: &str, prefix: &str) -> Self {
        Self {
            inner: GazeOsc::new(target_addr, prefix),
        }
    }
}

impl IntegrationAdapter for OscStrategy {
    fn initialize(&mut self) -> Result<()> {
        self.inner.initialize()?;
        info!("OSC output ready");
        Ok(())
    }

    fn send(&self, result: &TrackingResult) -> Result<()> {
        self.inner.send(result)
    }
}
