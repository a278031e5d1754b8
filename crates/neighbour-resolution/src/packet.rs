//! Packet transport values: interception selectors, priorities, inbound and
//! outbound packets, and the per-packet processing context.

use neighbour_types::{ConnectPoint, DeviceId, PortNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// EtherType of ARP frames.
pub const ETHERTYPE_ARP: u16 = 0x0806;
/// EtherType of IPv6 frames.
pub const ETHERTYPE_IPV6: u16 = 0x86dd;
/// IPv6 next header value for ICMPv6.
pub const IP_PROTO_ICMPV6: u8 = 58;
/// ICMPv6 Neighbor Solicitation type.
pub const ICMPV6_NEIGHBOR_SOLICITATION: u8 = 135;
/// ICMPv6 Neighbor Advertisement type.
pub const ICMPV6_NEIGHBOR_ADVERTISEMENT: u8 = 136;

/// Frame class requested from the packet transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrafficSelector {
    /// EtherType ARP
    Arp,
    /// IPv6 / ICMPv6 type 135
    NeighborSolicitation,
    /// IPv6 / ICMPv6 type 136
    NeighborAdvertisement,
}

impl TrafficSelector {
    /// Every selector the engine may request.
    pub const ALL: [TrafficSelector; 3] = [
        TrafficSelector::Arp,
        TrafficSelector::NeighborSolicitation,
        TrafficSelector::NeighborAdvertisement,
    ];

    /// Selectors for IPv6 neighbour discovery.
    pub const NDP: [TrafficSelector; 2] = [
        TrafficSelector::NeighborSolicitation,
        TrafficSelector::NeighborAdvertisement,
    ];

    pub fn eth_type(&self) -> u16 {
        match self {
            TrafficSelector::Arp => ETHERTYPE_ARP,
            TrafficSelector::NeighborSolicitation | TrafficSelector::NeighborAdvertisement => {
                ETHERTYPE_IPV6
            }
        }
    }

    pub fn ip_protocol(&self) -> Option<u8> {
        match self {
            TrafficSelector::Arp => None,
            _ => Some(IP_PROTO_ICMPV6),
        }
    }

    pub fn icmpv6_type(&self) -> Option<u8> {
        match self {
            TrafficSelector::Arp => None,
            TrafficSelector::NeighborSolicitation => Some(ICMPV6_NEIGHBOR_SOLICITATION),
            TrafficSelector::NeighborAdvertisement => Some(ICMPV6_NEIGHBOR_ADVERTISEMENT),
        }
    }

    pub fn is_ndp(&self) -> bool {
        !matches!(self, TrafficSelector::Arp)
    }
}

impl fmt::Display for TrafficSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficSelector::Arp => write!(f, "eth_type=0x{:04x}", ETHERTYPE_ARP),
            _ => write!(
                f,
                "eth_type=0x{:04x},ip_proto={},icmpv6_type={}",
                self.eth_type(),
                IP_PROTO_ICMPV6,
                self.icmpv6_type().unwrap_or_default()
            ),
        }
    }
}

/// Priority attached to packet interception requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketPriority(u32);

impl PacketPriority {
    /// Priority used for control-plane protocol interception.
    pub const CONTROL: PacketPriority = PacketPriority(40000);
    /// Highest priority accepted by the transport.
    pub const MAX: PacketPriority = PacketPriority(65535);

    pub const fn new(value: u32) -> Self {
        PacketPriority(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PacketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A frame handed to the transport for transmission out of one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPacket {
    pub device_id: DeviceId,
    pub output_port: PortNumber,
    pub data: Vec<u8>,
}

impl OutboundPacket {
    pub fn new(out: &ConnectPoint, data: Vec<u8>) -> Self {
        Self {
            device_id: out.device_id().clone(),
            output_port: out.port(),
            data,
        }
    }

    /// Connect point the packet leaves through.
    pub fn connect_point(&self) -> ConnectPoint {
        ConnectPoint::new(self.device_id.clone(), self.output_port.as_u64())
    }
}

/// A frame delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    received_from: ConnectPoint,
    data: Arc<[u8]>,
}

impl InboundPacket {
    pub fn new(received_from: ConnectPoint, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            received_from,
            data: data.into(),
        }
    }

    pub fn received_from(&self) -> &ConnectPoint {
        &self.received_from
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Processing context for one inbound packet.
///
/// Processors run in sequence over the same context; once a processor
/// blocks it, later processors see it as handled.
#[derive(Debug, Clone)]
pub struct PacketContext {
    inbound: InboundPacket,
    handled: bool,
}

impl PacketContext {
    pub fn new(inbound: InboundPacket) -> Self {
        Self {
            inbound,
            handled: false,
        }
    }

    pub fn inbound(&self) -> &InboundPacket {
        &self.inbound
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Marks the packet as consumed.
    pub fn block(&mut self) {
        self.handled = true;
    }
}

/// Outcome of offering a frame to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDisposition {
    /// Frame was a neighbour message and has been consumed
    Blocked,
    /// Frame is not a neighbour message; other processors may take it
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selector_match_fields() {
        assert_eq!(TrafficSelector::Arp.eth_type(), 0x0806);
        assert_eq!(TrafficSelector::Arp.ip_protocol(), None);
        assert_eq!(
            TrafficSelector::NeighborSolicitation.icmpv6_type(),
            Some(135)
        );
        assert_eq!(
            TrafficSelector::NeighborAdvertisement.icmpv6_type(),
            Some(136)
        );
        assert!(TrafficSelector::NDP.iter().all(TrafficSelector::is_ndp));
        assert!(!TrafficSelector::Arp.is_ndp());
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(TrafficSelector::Arp.to_string(), "eth_type=0x0806");
        assert_eq!(
            TrafficSelector::NeighborSolicitation.to_string(),
            "eth_type=0x86dd,ip_proto=58,icmpv6_type=135"
        );
    }

    #[test]
    fn test_packet_context_block() {
        let inbound = InboundPacket::new(ConnectPoint::new("of:1", 1), vec![0u8; 14]);
        let mut context = PacketContext::new(inbound);
        assert!(!context.is_handled());
        context.block();
        assert!(context.is_handled());
    }

    #[test]
    fn test_outbound_connect_point() {
        let cp = ConnectPoint::new("of:1", 7);
        let packet = OutboundPacket::new(&cp, vec![1, 2, 3]);
        assert_eq!(packet.connect_point(), cp);
        assert_eq!(packet.output_port.as_u64(), 7);
    }
}
