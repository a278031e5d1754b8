//! Reply construction.
//!
//! Builds the protocol-correct answer to a neighbour message, sent back to
//! the requester on the requester's VLAN.

use crate::context::{ArpMessage, NdpMessage, NeighbourMessage, NeighbourMessageContext};
use crate::frame;
use neighbour_types::MacAddress;
use smoltcp::phy::ChecksumCapabilities;
use smoltcp::wire::{
    ArpOperation, ArpPacket, ArpRepr, EthernetAddress, EthernetFrame, EthernetProtocol,
    EthernetRepr, Icmpv6Packet, Icmpv6Repr, IpAddress, IpProtocol, Ipv4Address, Ipv6Address,
    Ipv6Packet, Ipv6Repr, NdiscNeighborFlags, NdiscRepr,
};

/// Hop limit required on neighbour discovery messages.
pub const NDP_HOP_LIMIT: u8 = 255;

/// Builds a reply announcing that the message target lives at `target_mac`.
pub fn build_reply(context: &NeighbourMessageContext, target_mac: MacAddress) -> Vec<u8> {
    let untagged = match context.message() {
        NeighbourMessage::Arp(arp) => arp_reply(context, arp, target_mac),
        NeighbourMessage::Ndp(ndp) => ndp_reply(context, ndp, target_mac),
    };
    match context.vlan() {
        Some(vlan) => frame::retag(&untagged, Some(vlan)),
        None => untagged,
    }
}

fn arp_reply(context: &NeighbourMessageContext, arp: &ArpMessage, target_mac: MacAddress) -> Vec<u8> {
    let our_mac = EthernetAddress(*target_mac.as_bytes());
    let requester_mac = EthernetAddress(*context.src_mac().as_bytes());

    let arp_repr = ArpRepr::EthernetIpv4 {
        operation: ArpOperation::Reply,
        source_hardware_addr: our_mac,
        source_protocol_addr: Ipv4Address(arp.target_ip.octets()),
        target_hardware_addr: requester_mac,
        target_protocol_addr: Ipv4Address(arp.sender_ip.octets()),
    };
    let eth_repr = EthernetRepr {
        src_addr: our_mac,
        dst_addr: requester_mac,
        ethertype: EthernetProtocol::Arp,
    };

    let mut buf = vec![0u8; eth_repr.buffer_len() + arp_repr.buffer_len()];
    let mut eth = EthernetFrame::new_unchecked(&mut buf);
    eth_repr.emit(&mut eth);
    let mut arp_packet = ArpPacket::new_unchecked(eth.payload_mut());
    arp_repr.emit(&mut arp_packet);
    buf
}

fn ndp_reply(context: &NeighbourMessageContext, ndp: &NdpMessage, target_mac: MacAddress) -> Vec<u8> {
    let our_mac = EthernetAddress(*target_mac.as_bytes());
    let src_addr = Ipv6Address(ndp.target.octets());
    let dst_addr = Ipv6Address(ndp.src_ip.octets());

    let icmp_repr = Icmpv6Repr::Ndisc(NdiscRepr::NeighborAdvert {
        flags: NdiscNeighborFlags::SOLICITED | NdiscNeighborFlags::OVERRIDE,
        target_addr: src_addr,
        lladdr: Some(our_mac.into()),
    });
    let ipv6_repr = Ipv6Repr {
        src_addr,
        dst_addr,
        next_header: IpProtocol::Icmpv6,
        payload_len: icmp_repr.buffer_len(),
        hop_limit: NDP_HOP_LIMIT,
    };
    let eth_repr = EthernetRepr {
        src_addr: our_mac,
        dst_addr: EthernetAddress(*context.src_mac().as_bytes()),
        ethertype: EthernetProtocol::Ipv6,
    };

    let mut buf =
        vec![0u8; eth_repr.buffer_len() + ipv6_repr.buffer_len() + icmp_repr.buffer_len()];
    let mut eth = EthernetFrame::new_unchecked(&mut buf);
    eth_repr.emit(&mut eth);

    let mut ipv6 = Ipv6Packet::new_unchecked(eth.payload_mut());
    ipv6_repr.emit(&mut ipv6);

    let mut icmp = Icmpv6Packet::new_unchecked(ipv6.payload_mut());
    icmp_repr.emit(
        &IpAddress::Ipv6(src_addr),
        &IpAddress::Ipv6(dst_addr),
        &mut icmp,
        &ChecksumCapabilities::default(),
    );
    buf
}
