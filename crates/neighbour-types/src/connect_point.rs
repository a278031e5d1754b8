//! Device, port and connect point identifiers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Identifier of a forwarding device (e.g. `of:0000000000000001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Arc<str>);

impl DeviceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        DeviceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        DeviceId::new(id)
    }
}

/// Port number on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNumber(u64);

impl PortNumber {
    pub const fn new(port: u64) -> Self {
        PortNumber(port)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PortNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(PortNumber)
            .map_err(|_| ParseError::InvalidPortNumber(s.to_string()))
    }
}

impl From<u64> for PortNumber {
    fn from(port: u64) -> Self {
        PortNumber(port)
    }
}

/// A specific port on a specific device: the point where a frame enters
/// (ingress) or leaves (egress) the managed network.
///
/// # Examples
///
/// ```
/// use neighbour_types::ConnectPoint;
///
/// let cp: ConnectPoint = "of:0000000000000001/3".parse().unwrap();
/// assert_eq!(cp.device_id().as_str(), "of:0000000000000001");
/// assert_eq!(cp.port().as_u64(), 3);
/// assert_eq!(cp.to_string(), "of:0000000000000001/3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectPoint {
    device_id: DeviceId,
    port: PortNumber,
}

impl ConnectPoint {
    pub fn new(device_id: impl Into<DeviceId>, port: u64) -> Self {
        Self {
            device_id: device_id.into(),
            port: PortNumber(port),
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn port(&self) -> PortNumber {
        self.port
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.port)
    }
}

impl FromStr for ConnectPoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, port) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidConnectPoint(s.to_string()))?;

        if device.is_empty() {
            return Err(ParseError::InvalidConnectPoint(s.to_string()));
        }

        Ok(ConnectPoint::new(device, port.parse::<PortNumber>()?.as_u64()))
    }
}
