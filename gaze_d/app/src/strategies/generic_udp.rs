use anyhow::{Context, Result};
use common::{IntegrationAdapter, TrackingResult};
use log::info;
use std::net::UdpSocket;

/// Sends every result as a single JSON datagram.
pub struct GenericUdpStrategy {
    socket: Option<UdpSocket>,
    target_address: String,
}

impl GenericUdpStrategy {
    pub fn new(target_address: String) -> Self {
        Self {
            socket: None,
            target_address,
        }
    }
}

impl IntegrationAdapter for GenericUdpStrategy {
    fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind result socket")?;
        socket
            .connect(&self.target_address)
            .with_context(|| format!("No route for tracking results to {}", self.target_address))?;
        socket
            .set_nonblocking(true)
            .context("Failed to make result socket non-blocking")?;

        info!("Streaming tracking results as JSON to {}", self.target_address);
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&self, result: &TrackingResult) -> Result<()> {
        let Some(socket) = &self.socket else {
            return Ok(());
        };
        let payload = serde_json::to_vec(result).context("Failed to encode tracking result")?;
        socket
            .send(&payload)
            .with_context(|| format!("Failed to send result at {}ms", result.timestamp_ms))?;
        Ok(())
    }
}
