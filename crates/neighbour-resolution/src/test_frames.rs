//! Hand-built neighbour frames for unit tests.

use crate::frame;
use neighbour_types::VlanId;
use std::net::{Ipv4Addr, Ipv6Addr};

pub const HOST_MAC: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
pub const ROUTER_MAC: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x00, 0xaa];
pub const HOST_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
pub const GATEWAY_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 254);
pub const HOST_IP6: Ipv6Addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1);
pub const GATEWAY_IP6: Ipv6Addr = Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0xfe);

pub fn arp_frame(
    op: u16,
    sender_mac: [u8; 6],
    sender_ip: Ipv4Addr,
    target_mac: [u8; 6],
    target_ip: Ipv4Addr,
    eth_dst: [u8; 6],
    vlan: Option<VlanId>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(42);
    out.extend_from_slice(&eth_dst);
    out.extend_from_slice(&sender_mac);
    out.extend_from_slice(&[0x08, 0x06]);
    out.extend_from_slice(&[0x00, 0x01, 0x08, 0x00, 0x06, 0x04]);
    out.extend_from_slice(&op.to_be_bytes());
    out.extend_from_slice(&sender_mac);
    out.extend_from_slice(&sender_ip.octets());
    out.extend_from_slice(&target_mac);
    out.extend_from_slice(&target_ip.octets());
    frame::retag(&out, vlan)
}

pub fn arp_request(
    sender_mac: [u8; 6],
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
    vlan: Option<VlanId>,
) -> Vec<u8> {
    arp_frame(1, sender_mac, sender_ip, [0; 6], target_ip, [0xff; 6], vlan)
}

pub fn solicited_node_mac(target: Ipv6Addr) -> [u8; 6] {
    let o = target.octets();
    [0x33, 0x33, 0xff, o[13], o[14], o[15]]
}

fn solicited_node_ip(target: Ipv6Addr) -> Ipv6Addr {
    let o = target.octets();
    Ipv6Addr::new(
        0xff02,
        0,
        0,
        0,
        0,
        1,
        0xff00 | u16::from(o[13]),
        u16::from_be_bytes([o[14], o[15]]),
    )
}

fn icmpv6_frame(
    eth_src: [u8; 6],
    eth_dst: [u8; 6],
    src_ip: Ipv6Addr,
    dst_ip: Ipv6Addr,
    icmp: &[u8],
    vlan: Option<VlanId>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(14 + 40 + icmp.len());
    out.extend_from_slice(&eth_dst);
    out.extend_from_slice(&eth_src);
    out.extend_from_slice(&[0x86, 0xdd]);
    out.extend_from_slice(&[0x60, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&(icmp.len() as u16).to_be_bytes());
    out.extend_from_slice(&[58, 255]);
    out.extend_from_slice(&src_ip.octets());
    out.extend_from_slice(&dst_ip.octets());
    out.extend_from_slice(icmp);
    frame::retag(&out, vlan)
}

/// Neighbor Solicitation with a source link-layer address option.
pub fn neighbor_solicitation(
    src_mac: [u8; 6],
    src_ip: Ipv6Addr,
    target: Ipv6Addr,
    vlan: Option<VlanId>,
) -> Vec<u8> {
    let mut icmp = vec![135, 0, 0, 0, 0, 0, 0, 0];
    icmp.extend_from_slice(&target.octets());
    icmp.extend_from_slice(&[1, 1]);
    icmp.extend_from_slice(&src_mac);
    icmpv6_frame(
        src_mac,
        solicited_node_mac(target),
        src_ip,
        solicited_node_ip(target),
        &icmp,
        vlan,
    )
}

/// Unsolicited Neighbor Advertisement for `src_ip` sent to one neighbour.
pub fn neighbor_advertisement(
    src_mac: [u8; 6],
    src_ip: Ipv6Addr,
    dst_mac: [u8; 6],
    dst_ip: Ipv6Addr,
) -> Vec<u8> {
    let mut icmp = vec![136, 0, 0, 0, 0x20, 0, 0, 0];
    icmp.extend_from_slice(&src_ip.octets());
    icmp.extend_from_slice(&[2, 1]);
    icmp.extend_from_slice(&src_mac);
    icmpv6_frame(src_mac, dst_mac, src_ip, dst_ip, &icmp, None)
}
