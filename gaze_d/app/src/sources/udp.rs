use anyhow::{Context, Result};
use api::{FaceFrame, FaceTrackingSource};
use log::{info, warn};
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

const READ_TIMEOUT: Duration = Duration::from_millis(100);
const MAX_DATAGRAM: usize = 65_535;

/// Receives one JSON-encoded [`FaceFrame`] per datagram.
///
/// Frames with a non-positive timestamp are stamped with their arrival time
/// relative to `initialize`.
pub struct UdpFaceSource {
    bind_address: String,
    socket: Option<UdpSocket>,
    buf: Vec<u8>,
    started: Instant,
}

impl UdpFaceSource {
    pub fn new(bind_address: String) -> Self {
        Self {
            bind_address,
            socket: None,
            buf: vec![0u8; MAX_DATAGRAM],
            started: Instant::now(),
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

impl FaceTrackingSource for UdpFaceSource {
    fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind(&self.bind_address)
            .with_context(|| format!("Failed to bind frame socket on {}", self.bind_address))?;
        socket
            .set_read_timeout(Some(READ_TIMEOUT))
            .context("Failed to set read timeout")?;

        info!("Listening for face frames on {}", socket.local_addr()?);
        self.socket = Some(socket);
        self.started = Instant::now();
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<FaceFrame>> {
        let Some(socket) = &self.socket else {
            return Ok(None);
        };

        let (len, src) = match socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None)
            }
            Err(e) => return Err(e).context("Failed to receive face frame"),
        };

        match serde_json::from_slice::<FaceFrame>(&self.buf[..len]) {
            Ok(mut frame) => {
                if frame.timestamp_ms <= 0.0 {
                    frame.timestamp_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                }
                Ok(Some(frame))
            }
            Err(e) => {
                warn!("Ignoring malformed frame packet from {}: {}", src, e);
                Ok(None)
            }
        }
    }

    fn unload(&mut self) {
        if self.socket.take().is_some() {
            info!("Closed face frame socket {}", self.bind_address);
        }
    }
}
