//! Adapters that turn an external face tracker into a stream of
//! [`api::FaceFrame`]s.

pub mod replay;
pub mod udp;

use api::FaceTrackingSource;
use common::SourceConfig;
pub use replay::ReplaySource;
pub use udp::UdpFaceSource;

pub type BoxedSource = Box<dyn FaceTrackingSource + Send>;

pub fn create_source(config: &SourceConfig) -> BoxedSource {
    match config {
        SourceConfig::Udp { bind_address, port } => {
            Box::new(UdpFaceSource::new(format!("{}:{}", bind_address, port)))
        }
        SourceConfig::Replay {
            path,
            looped,
            realtime,
        } => Box::new(ReplaySource::new(path.clone(), *looped, *realtime)),
    }
}

