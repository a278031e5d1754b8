//! Classified neighbour messages.

use neighbour_types::{ConnectPoint, MacAddress, VlanId};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Resolution protocol a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighbourProtocol {
    Arp,
    Ndp,
}

impl fmt::Display for NeighbourProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighbourProtocol::Arp => write!(f, "ARP"),
            NeighbourProtocol::Ndp => write!(f, "NDP"),
        }
    }
}

/// Request (ARP request, neighbour solicitation) or reply (ARP reply,
/// neighbour advertisement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighbourMessageType {
    Request,
    Reply,
}

/// Fields of an ARP packet for Ethernet/IPv4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub message_type: NeighbourMessageType,
    pub sender_mac: MacAddress,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddress,
    pub target_ip: Ipv4Addr,
}

/// Fields of an ICMPv6 neighbour solicitation or advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdpMessage {
    pub message_type: NeighbourMessageType,
    pub src_ip: Ipv6Addr,
    pub dst_ip: Ipv6Addr,
    pub target: Ipv6Addr,
}

/// Protocol-specific part of a neighbour message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighbourMessage {
    Arp(ArpMessage),
    Ndp(NdpMessage),
}

/// A classified neighbour message together with where and how it arrived.
///
/// Contexts are immutable and cheap to clone; the raw frame is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighbourMessageContext {
    in_port: ConnectPoint,
    src_mac: MacAddress,
    dst_mac: MacAddress,
    vlan: Option<VlanId>,
    message: NeighbourMessage,
    packet: Arc<[u8]>,
}

impl NeighbourMessageContext {
    pub fn new(
        in_port: ConnectPoint,
        src_mac: MacAddress,
        dst_mac: MacAddress,
        vlan: Option<VlanId>,
        message: NeighbourMessage,
        packet: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            in_port,
            src_mac,
            dst_mac,
            vlan,
            message,
            packet: packet.into(),
        }
    }

    /// Connect point the frame was received on
    pub fn in_port(&self) -> &ConnectPoint {
        &self.in_port
    }

    pub fn protocol(&self) -> NeighbourProtocol {
        match self.message {
            NeighbourMessage::Arp(_) => NeighbourProtocol::Arp,
            NeighbourMessage::Ndp(_) => NeighbourProtocol::Ndp,
        }
    }

    pub fn message_type(&self) -> NeighbourMessageType {
        match &self.message {
            NeighbourMessage::Arp(arp) => arp.message_type,
            NeighbourMessage::Ndp(ndp) => ndp.message_type,
        }
    }

    pub fn message(&self) -> &NeighbourMessage {
        &self.message
    }

    pub fn src_mac(&self) -> MacAddress {
        self.src_mac
    }

    pub fn dst_mac(&self) -> MacAddress {
        self.dst_mac
    }

    /// VLAN of the received frame, `None` when untagged
    pub fn vlan(&self) -> Option<VlanId> {
        self.vlan
    }

    /// Address being resolved
    pub fn target(&self) -> IpAddr {
        match &self.message {
            NeighbourMessage::Arp(arp) => IpAddr::V4(arp.target_ip),
            NeighbourMessage::Ndp(ndp) => IpAddr::V6(ndp.target),
        }
    }

    /// Address of the host that sent the message
    pub fn sender(&self) -> IpAddr {
        match &self.message {
            NeighbourMessage::Arp(arp) => IpAddr::V4(arp.sender_ip),
            NeighbourMessage::Ndp(ndp) => IpAddr::V6(ndp.src_ip),
        }
    }

    /// The frame exactly as received, VLAN tag included
    pub fn packet(&self) -> &[u8] {
        &self.packet
    }
}

impl fmt::Display for NeighbourMessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {} -> {} on {}",
            self.protocol(),
            self.message_type(),
            self.sender(),
            self.target(),
            self.in_port
        )?;
        if let Some(vlan) = self.vlan {
            write!(f, " vlan {}", vlan)?;
        }
        Ok(())
    }
}
