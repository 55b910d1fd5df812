use std::io;
use std::net::{IpAddr, SocketAddr, TcpListener};

use socket2::Socket;

use crate::error::ProbeError;
use crate::probe::{bind_tcp, bind_udp};

/// A port held open for both TCP and UDP.
///
/// Unlike a plain availability check, nobody else can bind the port while the
/// reservation is alive. Dropping it closes both sockets.
#[derive(Debug)]
pub struct PortReservation {
    port: u16,
    tcp: Socket,
    udp: Socket,
}

impl PortReservation {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Close both sockets and hand back the port number.
    pub fn release(self) -> u16 {
        self.port
    }

    /// Keep the TCP listener for the caller's own use and free the UDP side.
    pub fn into_tcp_listener(self) -> TcpListener {
        drop(self.udp);
        TcpListener::from(self.tcp)
    }
}

/// Bind `host:port` for TCP and UDP and keep both sockets open.
pub fn reserve_port(host: IpAddr, port: u16) -> Result<PortReservation, ProbeError> {
    let addr = SocketAddr::new(host, port);
    let reserve_err = |source: io::Error| ProbeError::Reserve { port, source };
    let tcp = bind_tcp(addr).map_err(reserve_err)?;
    let udp = bind_udp(addr).map_err(reserve_err)?;
    Ok(PortReservation { port, tcp, udp })
}
