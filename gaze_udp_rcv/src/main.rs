use anyhow::{Context, Result};
use api::TrackingResult;
use log::{error, info, warn};
use std::net::UdpSocket;

const DEFAULT_PORT: u16 = 9000;

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let port = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u16>())
        .transpose()
        .context("Port must be a number")?
        .unwrap_or(DEFAULT_PORT);
    let addr = format!("0.0.0.0:{}", port);
    let socket = UdpSocket::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening for gaze results on {}...", addr);

    let mut buf = [0u8; 65535];
    let mut last_result: Option<TrackingResult> = None;

    loop {
        match socket.recv_from(&mut buf) {
            Ok((amt, src)) => {
                let slice = &buf[..amt];

                match serde_json::from_slice::<TrackingResult>(slice) {
                    Ok(result) => {
                        let changed = last_result
                            .map(|last| {
                                last.eye_position != result.eye_position
                                    || last.blink_level != result.blink_level
                            })
                            .unwrap_or(true);
                        if changed {
                            println!(
                                "[{}] t={:.0}ms gaze=({:.3}, {:.3}) blink={:.2} pan={:.3} tilt={:.3} brow={:?} mouth={:?}",
                                src,
                                result.timestamp_ms,
                                result.eye_position.x,
                                result.eye_position.y,
                                result.blink_level,
                                result.head.pan,
                                result.head.tilt,
                                result.expressions.brow,
                                result.expressions.mouth,
                            );
                        }
                        last_result = Some(result);
                    }
                    Err(e) => {
                        warn!("Failed to deserialize packet from {}: {}", src, e);
                        if let Ok(s) = std::str::from_utf8(slice) {
                            warn!("Raw data: {}", s);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error receiving data: {}", e);
            }
        }
    }
}
