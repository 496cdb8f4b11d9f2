use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;

/// Extra ports tried above the configured one when it is taken.
pub const PORT_FALLBACK_RANGE: u16 = 20;

/// Binds the first free port in `port..=port + fallback`. The error from the
/// last attempt is returned when every port is taken.
pub async fn bind_listener(host: IpAddr, port: u16, fallback: u16) -> io::Result<(TcpListener, SocketAddr)> {
    let mut last_err = None;
    for candidate in port..=port.saturating_add(fallback) {
        let addr = SocketAddr::from((host, candidate));
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok((listener, addr)),
            Err(e) => {
                tracing::warn!(%addr, error = %e, "Address unavailable");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrInUse, "no port to try")))
}
