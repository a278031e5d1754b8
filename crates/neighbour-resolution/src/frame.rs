//! 802.1Q tag handling for Ethernet frames.
//!
//! The frame codec only understands untagged Ethernet, so tags are removed
//! before parsing and put back after a reply has been built.

use byteorder::{BigEndian, ByteOrder};
use neighbour_types::VlanId;
use std::borrow::Cow;

/// EtherType (TPID) of an 802.1Q tag.
pub const ETHERTYPE_VLAN: u16 = 0x8100;

/// Destination plus source MAC.
const MAC_HEADER_LEN: usize = 12;
const ETHERNET_HEADER_LEN: usize = 14;
const VLAN_TAG_LEN: usize = 4;

/// An Ethernet frame with its 802.1Q tag removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Untagged<'a> {
    pub vlan: Option<VlanId>,
    pub frame: Cow<'a, [u8]>,
}

/// Splits the 802.1Q tag off a frame.
///
/// Untagged frames are borrowed unchanged. Returns `None` when the frame is
/// too short to hold the Ethernet header it claims to have.
pub fn untag(frame: &[u8]) -> Option<Untagged<'_>> {
    if frame.len() < ETHERNET_HEADER_LEN {
        return None;
    }

    if BigEndian::read_u16(&frame[MAC_HEADER_LEN..ETHERNET_HEADER_LEN]) != ETHERTYPE_VLAN {
        return Some(Untagged {
            vlan: None,
            frame: Cow::Borrowed(frame),
        });
    }

    if frame.len() < ETHERNET_HEADER_LEN + VLAN_TAG_LEN {
        return None;
    }

    let tci = BigEndian::read_u16(&frame[ETHERNET_HEADER_LEN..ETHERNET_HEADER_LEN + 2]);
    let mut inner = Vec::with_capacity(frame.len() - VLAN_TAG_LEN);
    inner.extend_from_slice(&frame[..MAC_HEADER_LEN]);
    inner.extend_from_slice(&frame[MAC_HEADER_LEN + VLAN_TAG_LEN..]);

    Some(Untagged {
        vlan: VlanId::from_tci(tci),
        frame: Cow::Owned(inner),
    })
}

/// Rewrites the frame's 802.1Q tag.
///
/// Any existing tag is removed; a new one carrying `vlan` (priority 0) is
/// inserted after the MAC addresses when `vlan` is set. Frames too short to
/// carry an Ethernet header are returned unchanged.
pub fn retag(frame: &[u8], vlan: Option<VlanId>) -> Vec<u8> {
    let Some(untagged) = untag(frame) else {
        return frame.to_vec();
    };
    let inner = untagged.frame;

    match vlan {
        None => inner.into_owned(),
        Some(vlan) => {
            let mut out = Vec::with_capacity(inner.len() + VLAN_TAG_LEN);
            out.extend_from_slice(&inner[..MAC_HEADER_LEN]);

            let mut tag = [0u8; VLAN_TAG_LEN];
            BigEndian::write_u16(&mut tag[..2], ETHERTYPE_VLAN);
            BigEndian::write_u16(&mut tag[2..], vlan.as_u16());
            out.extend_from_slice(&tag);

            out.extend_from_slice(&inner[MAC_HEADER_LEN..]);
            out
        }
    }
}
