//! Collaborator services the engine runs against.
//!
//! The packet transport and edge-port inventory are owned by the host
//! platform. The engine only needs the narrow surface below.

use crate::packet::{OutboundPacket, PacketPriority, TrafficSelector};
use neighbour_types::{ApplicationId, ConnectPoint};

/// Packet-in/packet-out transport.
pub trait PacketService: Send + Sync {
    /// Start delivering frames matching `selector` to the engine
    fn request_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        app_id: &ApplicationId,
    );

    /// Stop delivering frames matching `selector`
    fn cancel_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        app_id: &ApplicationId,
    );

    /// Transmit a frame out of a single port
    fn emit(&self, packet: OutboundPacket);
}

/// Inventory of edge ports: ports facing hosts rather than other switches.
pub trait EdgePortService: Send + Sync {
    fn is_edge_point(&self, point: &ConnectPoint) -> bool;

    fn edge_points(&self) -> Vec<ConnectPoint>;
}
