//! Value types shared by the neighbour resolution engine and the
//! applications that register handlers with it.
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`ConnectPoint`]: a device/port pair where frames enter or leave the network
//! - [`ApplicationId`]: identity of the application owning a registration

mod app;
mod connect_point;
mod mac;
mod vlan;

pub use app::ApplicationId;
pub use connect_point::{ConnectPoint, DeviceId, PortNumber};
pub use mac::MacAddress;
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),

    #[error("invalid connect point: {0} (expected <device>/<port>)")]
    InvalidConnectPoint(String),
}
