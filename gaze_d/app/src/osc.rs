use anyhow::Result;
use common::TrackingResult;
use rosc::{encoder, OscBundle, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;

/// Sends each conditioned result as one OSC bundle of float messages.
pub struct GazeOsc {
    socket: Option<UdpSocket>,
    target_addr: String,
    prefix: String,
}

impl GazeOsc {
    pub fn new(target_addr: &str, prefix: &str) -> Self {
        Self {
            socket: None,
            target_addr: target_addr.to_string(),
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        self.socket = Some(socket);
        Ok(())
    }

    pub fn send(&self, result: &TrackingResult) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("GazeOsc not initialized"))?;

        let bundle = OscBundle {
            timetag: rosc::OscTime::from((0, 0)),
            content: build_messages(&self.prefix, result)
                .into_iter()
                .map(OscPacket::Message)
                .collect(),
        };

        let msg_buf = encoder::encode(&OscPacket::Bundle(bundle))?;
        socket.send_to(&msg_buf, &self.target_addr)?;

        Ok(())
    }
}

/// Messages for one result: gaze, blink and head angles always, expression
/// scores only when the frame carried them.
pub fn build_messages(prefix: &str, result: &TrackingResult) -> Vec<OscMessage> {
    let mut messages = Vec::with_capacity(8);

    macro_rules! add_msg {
        ($name:expr, $val:expr) => {
            messages.push(OscMessage {
                addr: format!("{}/{}", prefix, $name),
                args: vec![OscType::Float($val)],
            });
        };
    }

    add_msg!("x", result.eye_position.x);
    add_msg!("y", result.eye_position.y);
    add_msg!("blink", result.blink_level);
    add_msg!("pan", result.head.pan);
    add_msg!("tilt", result.head.tilt);
    add_msg!("roll", result.head.roll);

    if let Some(brow) = result.expressions.brow {
        add_msg!("brow", brow);
    }
    if let Some(mouth) = result.expressions.mouth {
        add_msg!("mouth", mouth);
    }

    messages
}
