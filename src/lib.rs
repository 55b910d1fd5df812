//! Find TCP/UDP ports that are free to bind, for spinning up local services
//! in tests without hard-coding port numbers.
//!
//! ```no_run
//! use portprobe::PortProbe;
//!
//! let mut probe = PortProbe::new();
//! let port = probe.random_free_port();
//! assert!(portprobe::is_available(port));
//! ```

pub mod config;
pub mod error;
pub mod probe;
pub mod range;
pub mod reservation;

pub use config::Config;
pub use error::ProbeError;
pub use probe::{PortProbe, check_on, is_available, is_available_on};
pub use range::PortRange;
pub use reservation::{PortReservation, reserve_port};
