//! Logical interfaces and interface-scoped handler matching.

use crate::context::NeighbourMessageContext;
use neighbour_types::{ConnectPoint, MacAddress, VlanId};
use std::fmt;
use std::net::IpAddr;

/// A logical L3 interface bound to one connect point.
///
/// Used both as a handler constraint and as a forwarding destination.
/// Unset fields act as wildcards when matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interface {
    name: String,
    connect_point: ConnectPoint,
    ip_addresses: Vec<IpAddr>,
    mac: Option<MacAddress>,
    vlan: Option<VlanId>,
}

impl Interface {
    pub fn new(name: impl Into<String>, connect_point: ConnectPoint) -> Self {
        Self {
            name: name.into(),
            connect_point,
            ip_addresses: Vec::new(),
            mac: None,
            vlan: None,
        }
    }

    /// Sets the interface MAC; the all-zero MAC means "any".
    pub fn with_mac(mut self, mac: MacAddress) -> Self {
        self.mac = (!mac.is_zero()).then_some(mac);
        self
    }

    pub fn with_vlan(mut self, vlan: VlanId) -> Self {
        self.vlan = Some(vlan);
        self
    }

    pub fn with_ip_addresses(mut self, addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        self.ip_addresses = addresses.into_iter().collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connect_point(&self) -> &ConnectPoint {
        &self.connect_point
    }

    pub fn ip_addresses(&self) -> &[IpAddr] {
        &self.ip_addresses
    }

    pub fn mac(&self) -> Option<MacAddress> {
        self.mac
    }

    pub fn vlan(&self) -> Option<VlanId> {
        self.vlan
    }

    /// Whether a message received on this interface's port belongs to it.
    ///
    /// All three rules must hold:
    /// - the destination MAC is broadcast, or the interface has no MAC, or
    ///   they are equal
    /// - the interface has no VLAN, or the message VLAN is equal
    /// - the interface has no addresses, or one of them is the target
    pub fn matches(&self, context: &NeighbourMessageContext) -> bool {
        let dst_mac = context.dst_mac();
        let mac_ok = dst_mac.is_broadcast() || self.mac.map_or(true, |mac| mac == dst_mac);
        let vlan_ok = self.vlan.map_or(true, |vlan| context.vlan() == Some(vlan));
        let ip_ok = self.ip_addresses.is_empty() || self.ip_addresses.contains(&context.target());

        mac_ok && vlan_ok && ip_ok
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.connect_point)
    }
}
