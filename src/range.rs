use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::ProbeError;

/// Lowest port of the IANA dynamic/private range.
pub const DYNAMIC_MIN: u16 = 49152;
/// Exclusive upper bound for generated candidates.
pub const DYNAMIC_MAX: u16 = 65534;

/// Half-open interval of ports, `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    min: u16,
    max: u16,
}

impl PortRange {
    /// Candidates are drawn from `[49152, 65534)`, so 65534 itself is never produced.
    pub const DYNAMIC: PortRange = PortRange {
        min: DYNAMIC_MIN,
        max: DYNAMIC_MAX,
    };

    pub fn new(min: u16, max: u16) -> Result<Self, ProbeError> {
        if min >= max {
            return Err(ProbeError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    /// Exclusive upper bound.
    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn len(&self) -> u16 {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.min >= self.max
    }

    pub fn contains(&self, port: u16) -> bool {
        port >= self.min && port < self.max
    }

    /// Draw a port uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        rng.random_range(self.min..self.max)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::DYNAMIC
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for PortRange {
    type Err = ProbeError;

    /// Parse `MIN-MAX`, e.g. `50000-51000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ProbeError::MalformedRange(s.to_string());
        let (min, max) = s.split_once('-').ok_or_else(malformed)?;
        let min: u16 = min.trim().parse().map_err(|_| malformed())?;
        let max: u16 = max.trim().parse().map_err(|_| malformed())?;
        Self::new(min, max)
    }
}
