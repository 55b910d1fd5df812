use std::io;

use thiserror::Error;

use crate::range::PortRange;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid port range {min}-{max}: lower bound must be below upper bound")]
    InvalidRange { min: u16, max: u16 },

    #[error("malformed port range '{0}', expected MIN-MAX")]
    MalformedRange(String),

    #[error("no free port found in {range} after {attempts} attempts")]
    Exhausted { attempts: u64, range: PortRange },

    #[error("failed to reserve port {port}: {source}")]
    Reserve {
        port: u16,
        #[source]
        source: io::Error,
    },
}
