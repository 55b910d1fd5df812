use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ProbeError;
use crate::range::PortRange;
use crate::reservation::{self, PortReservation};

/// Wildcard address used when no bind host is configured.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

fn new_socket(addr: SocketAddr, ty: Type, protocol: Protocol) -> io::Result<Socket> {
    Socket::new(Domain::for_address(addr), ty, Some(protocol))
}

/// Bind a TCP listener with `SO_REUSEADDR` so a port in TIME_WAIT can be rebound.
pub(crate) fn bind_tcp(addr: SocketAddr) -> io::Result<Socket> {
    let socket = new_socket(addr, Type::STREAM, Protocol::TCP)?;
    // Must precede bind to have any effect.
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    Ok(socket)
}

/// Bind a UDP socket without address reuse. UDP has no TIME_WAIT, and reuse
/// would let the bind share a port another reuse-enabled socket still holds.
pub(crate) fn bind_udp(addr: SocketAddr) -> io::Result<Socket> {
    let socket = new_socket(addr, Type::DGRAM, Protocol::UDP)?;
    socket.bind(&addr.into())?;
    Ok(socket)
}

/// Try to bind a TCP listener and a UDP socket on `host:port`.
///
/// Both sockets are closed again before this returns, whichever bind fails.
pub fn check_on(host: IpAddr, port: u16) -> io::Result<()> {
    let addr = SocketAddr::new(host, port);
    let _tcp = bind_tcp(addr)?;
    let _udp = bind_udp(addr)?;
    Ok(())
}

/// Check if `port` can be bound for both TCP and UDP on `host`.
pub fn is_available_on(host: IpAddr, port: u16) -> bool {
    match check_on(host, port) {
        Ok(()) => true,
        Err(e) => {
            warn!(port, %host, "error while probing port: {}", e);
            false
        }
    }
}

/// Check if `port` can be bound for both TCP and UDP on all interfaces.
pub fn is_available(port: u16) -> bool {
    is_available_on(DEFAULT_HOST, port)
}

/// Picks random ports from a range and probes them until one is free.
///
/// The generator belongs to the probe, so two probes never share state. Nothing
/// is held between the check and the caller's own bind: another process (or
/// another probe) may take the port in that window. Use [`PortProbe::reserve`]
/// when that matters.
#[derive(Debug, Clone)]
pub struct PortProbe<R = StdRng> {
    rng: R,
    range: PortRange,
    host: IpAddr,
    max_attempts: Option<u64>,
}

impl PortProbe<StdRng> {
    /// Probe the dynamic range on all interfaces with an OS-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Build a probe from the user's config file settings.
    pub fn from_config(cfg: &Config) -> Result<Self, ProbeError> {
        Ok(Self::new()
            .range(cfg.range()?)
            .host(cfg.bind_host)
            .max_attempts(cfg.max_attempts))
    }
}

impl Default for PortProbe<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PortProbe<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            range: PortRange::DYNAMIC,
            host: DEFAULT_HOST,
            max_attempts: None,
        }
    }

    pub fn range(mut self, range: PortRange) -> Self {
        self.range = range;
        self
    }

    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Cap on probes per search. `None` searches until a port turns up.
    pub fn max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn port_range(&self) -> PortRange {
        self.range
    }

    pub fn bind_host(&self) -> IpAddr {
        self.host
    }

    pub fn is_available(&self, port: u16) -> bool {
        is_available_on(self.host, port)
    }

    pub fn random_candidate(&mut self) -> u16 {
        self.range.sample(&mut self.rng)
    }

    /// Return a random port that was free when checked. Loops until it finds one.
    pub fn random_free_port(&mut self) -> u16 {
        loop {
            let port = self.random_candidate();
            debug!(port, "probing candidate");
            if self.is_available(port) {
                debug!(port, "found free port");
                return port;
            }
        }
    }

    /// Like [`random_free_port`](Self::random_free_port) but gives up after
    /// `max_attempts` probes when a cap is set.
    pub fn find_free_port(&mut self) -> Result<u16, ProbeError> {
        let mut attempts = 0;
        self.search(&mut attempts, |probe, port| {
            probe.is_available(port).then_some(port)
        })
    }

    /// Find `count` distinct free ports. Duplicate candidates count against
    /// the same `max_attempts` budget as busy ones.
    pub fn free_ports(&mut self, count: usize) -> Result<Vec<u16>, ProbeError> {
        let mut ports = Vec::with_capacity(count);
        let mut attempts = 0;
        while ports.len() < count {
            let port = self.search(&mut attempts, |probe, port| {
                if ports.contains(&port) {
                    debug!(port, "duplicate port, retrying");
                    return None;
                }
                probe.is_available(port).then_some(port)
            })?;
            ports.push(port);
        }
        Ok(ports)
    }

    /// Bind a random free port and keep holding it until the reservation is
    /// released or dropped.
    pub fn reserve(&mut self) -> Result<PortReservation, ProbeError> {
        let mut attempts = 0;
        self.search(&mut attempts, |probe, port| match reservation::reserve_port(probe.host, port) {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(port, "error while reserving port: {}", e);
                None
            }
        })
    }

    /// Draw candidates until `attempt` accepts one. `attempts` carries the
    /// probe count across calls so callers can share one budget.
    fn search<T>(
        &mut self,
        attempts: &mut u64,
        mut attempt: impl FnMut(&Self, u16) -> Option<T>,
    ) -> Result<T, ProbeError> {
        loop {
            if let Some(max) = self.max_attempts {
                if *attempts >= max {
                    return Err(ProbeError::Exhausted {
                        attempts: *attempts,
                        range: self.range,
                    });
                }
            }
            *attempts += 1;
            let port = self.random_candidate();
            debug!(port, attempts = *attempts, "probing candidate");
            if let Some(found) = attempt(&*self, port) {
                debug!(port, attempts = *attempts, "found free port");
                return Ok(found);
            }
        }
    }
}
