//! Neighbour message classification.
//!
//! Turns a raw inbound Ethernet frame into a [`NeighbourMessageContext`]
//! when it carries ARP, an ICMPv6 Neighbor Solicitation or an ICMPv6
//! Neighbor Advertisement. Anything else, including malformed frames,
//! yields `None` and is left to other packet processors.

use crate::context::{
    ArpMessage, NdpMessage, NeighbourMessage, NeighbourMessageContext, NeighbourMessageType,
};
use crate::frame;
use neighbour_types::{ConnectPoint, MacAddress};
use smoltcp::wire::{
    ArpOperation, ArpPacket, ArpRepr, EthernetFrame, EthernetProtocol, Icmpv6Message,
    Icmpv6Packet, IpProtocol, Ipv6Packet, NdiscRepr,
};
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::trace;

/// ICMPv6 header, reserved/flags word and target address.
const NDISC_MIN_LEN: usize = 24;

/// Classifies an inbound frame received on `in_port`.
///
/// 802.1Q-tagged frames are classified by their inner EtherType and the
/// context records the VLAN. The returned context keeps the frame exactly
/// as received.
pub fn classify(packet: &[u8], in_port: &ConnectPoint) -> Option<NeighbourMessageContext> {
    let untagged = frame::untag(packet)?;
    let eth = EthernetFrame::new_checked(untagged.frame.as_ref()).ok()?;

    let message = match eth.ethertype() {
        EthernetProtocol::Arp => classify_arp(eth.payload())?,
        EthernetProtocol::Ipv6 => classify_ndp(eth.payload())?,
        _ => return None,
    };

    Some(NeighbourMessageContext::new(
        in_port.clone(),
        MacAddress::new(eth.src_addr().0),
        MacAddress::new(eth.dst_addr().0),
        untagged.vlan,
        message,
        packet,
    ))
}

fn classify_arp(payload: &[u8]) -> Option<NeighbourMessage> {
    let arp = ArpPacket::new_checked(payload).ok()?;
    let repr = ArpRepr::parse(&arp).ok()?;

    #[allow(unreachable_patterns)]
    match repr {
        ArpRepr::EthernetIpv4 {
            operation,
            source_hardware_addr,
            source_protocol_addr,
            target_hardware_addr,
            target_protocol_addr,
        } => Some(NeighbourMessage::Arp(ArpMessage {
            message_type: match operation {
                ArpOperation::Request => NeighbourMessageType::Request,
                _ => NeighbourMessageType::Reply,
            },
            sender_mac: MacAddress::new(source_hardware_addr.0),
            sender_ip: Ipv4Addr::from(source_protocol_addr.0),
            target_mac: MacAddress::new(target_hardware_addr.0),
            target_ip: Ipv4Addr::from(target_protocol_addr.0),
        })),
        _ => None,
    }
}

fn classify_ndp(payload: &[u8]) -> Option<NeighbourMessage> {
    let ipv6 = Ipv6Packet::new_checked(payload).ok()?;
    if ipv6.next_header() != IpProtocol::Icmpv6 {
        return None;
    }

    let icmp_payload = ipv6.payload();
    if icmp_payload.len() < NDISC_MIN_LEN {
        trace!(len = icmp_payload.len(), "ICMPv6 message too short for neighbour discovery");
        return None;
    }

    let icmp = Icmpv6Packet::new_checked(icmp_payload).ok()?;
    let message_type = match icmp.msg_type() {
        Icmpv6Message::NeighborSolicit => NeighbourMessageType::Request,
        Icmpv6Message::NeighborAdvert => NeighbourMessageType::Reply,
        _ => return None,
    };

    let target = match NdiscRepr::parse(&icmp).ok()? {
        NdiscRepr::NeighborSolicit { target_addr, .. } => target_addr,
        NdiscRepr::NeighborAdvert { target_addr, .. } => target_addr,
        _ => return None,
    };

    Some(NeighbourMessage::Ndp(NdpMessage {
        message_type,
        src_ip: Ipv6Addr::from(ipv6.src_addr().0),
        dst_ip: Ipv6Addr::from(ipv6.dst_addr().0),
        target: Ipv6Addr::from(target.0),
    }))
}
