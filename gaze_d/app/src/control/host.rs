use axum::Router;
use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct ControlHost;

impl ControlHost {
    /// Binds `0.0.0.0:port` and serves `app_router` until the runtime stops.
    pub async fn start(port: u16, app_router: Router) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        Self::serve(listener, app_router).await
    }

    pub async fn serve(listener: TcpListener, app_router: Router) -> anyhow::Result<()> {
        info!("Calibration control listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app_router).await?;
        Ok(())
    }
}
