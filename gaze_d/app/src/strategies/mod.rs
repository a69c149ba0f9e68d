pub mod generic_udp;
pub mod osc;

use anyhow::Result;
use common::{IntegrationAdapter, OutputConfig, OutputMode, TrackingResult};
use generic_udp::GenericUdpStrategy;
use osc::OscStrategy;

pub enum OutputBackend {
    Osc(OscStrategy),
    Generic(GenericUdpStrategy),
}

impl IntegrationAdapter for OutputBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Osc(s) => s.initialize(),
            Self::Generic(s) => s.initialize(),
        }
    }

    fn send(&self, result: &TrackingResult) -> Result<()> {
        match self {
            Self::Osc(s) => s.send(result),
            Self::Generic(s) => s.send(result),
        }
    }
}

pub fn create_strategy(config: &OutputConfig) -> OutputBackend {
    let target = format!("{}:{}", config.send_address, config.send_port);
    match config.mode {
        OutputMode::Generic => OutputBackend::Generic(GenericUdpStrategy::new(target)),
        OutputMode::Osc => OutputBackend::Osc(OscStrategy::new(&target, &config.address_prefix)),
    }
}
