//! Actions a handler can take on a neighbour message.
//!
//! Every emission passes through the edge-port guard: frames are only ever
//! sent out of ports facing hosts, never back into the switching fabric.
//! Suppressed emissions are logged and counted but not reported to the
//! handler.

use crate::context::NeighbourMessageContext;
use crate::frame;
use crate::interface::Interface;
use crate::packet::OutboundPacket;
use crate::reply;
use crate::services::{EdgePortService, PacketService};
use crate::stats::DispatchCounters;
use neighbour_types::{ConnectPoint, MacAddress};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// A single action on a neighbour message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighbourAction {
    /// Answer the requester, claiming the target lives at this MAC
    Reply(MacAddress),
    /// Send the original frame out of one connect point
    Forward(ConnectPoint),
    /// Send the original frame to an interface, on the interface's VLAN
    ForwardToInterface(Interface),
    /// Send the original frame out of every edge port except ingress
    Flood,
    /// Consume the message without emitting anything
    Drop,
}

/// Guarded path to the packet transport.
pub(crate) struct Emitter {
    packet_service: Arc<dyn PacketService>,
    edge_service: Arc<dyn EdgePortService>,
    counters: Arc<DispatchCounters>,
}

impl Emitter {
    pub(crate) fn new(
        packet_service: Arc<dyn PacketService>,
        edge_service: Arc<dyn EdgePortService>,
        counters: Arc<DispatchCounters>,
    ) -> Self {
        Self {
            packet_service,
            edge_service,
            counters,
        }
    }

    /// Emits `data` out of `out` if it is an edge port. Returns whether the
    /// frame was handed to the transport.
    fn send_to(&self, data: Vec<u8>, out: &ConnectPoint) -> bool {
        if !self.edge_service.is_edge_point(out) {
            debug!(out_port = %out, "Not emitting neighbour frame to non-edge port");
            DispatchCounters::incr(&self.counters.frames_guarded);
            return false;
        }

        trace!(out_port = %out, len = data.len(), "Emitting neighbour frame");
        self.packet_service.emit(OutboundPacket::new(out, data));
        DispatchCounters::incr(&self.counters.frames_emitted);
        true
    }

    fn edge_points(&self) -> Vec<ConnectPoint> {
        self.edge_service.edge_points()
    }
}

/// Action surface handed to handlers, bound to one neighbour message.
///
/// One instance is created per dispatched message and shared by every
/// handler invoked for it. It is cheap to clone and may be kept beyond
/// the handler call.
#[derive(Clone)]
pub struct NeighbourMessageActions {
    context: NeighbourMessageContext,
    emitter: Arc<Emitter>,
    emissions: Arc<AtomicUsize>,
}

impl NeighbourMessageActions {
    pub(crate) fn new(context: NeighbourMessageContext, emitter: Arc<Emitter>) -> Self {
        Self {
            context,
            emitter,
            emissions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The message these actions apply to
    pub fn context(&self) -> &NeighbourMessageContext {
        &self.context
    }

    /// Performs `action`.
    pub fn execute(&self, action: NeighbourAction) {
        match action {
            NeighbourAction::Reply(mac) => self.reply(mac),
            NeighbourAction::Forward(out) => self.forward(&out),
            NeighbourAction::ForwardToInterface(intf) => self.forward_to_interface(&intf),
            NeighbourAction::Flood => self.flood(),
            NeighbourAction::Drop => self.drop(),
        }
    }

    /// Replies to the requester on its ingress port and VLAN.
    pub fn reply(&self, target_mac: MacAddress) {
        let data = reply::build_reply(&self.context, target_mac);
        debug!(
            in_port = %self.context.in_port(),
            target = %self.context.target(),
            mac = %target_mac,
            "Replying to neighbour message"
        );
        self.record(self.emitter.send_to(data, self.context.in_port()));
    }

    /// Forwards the original frame, unmodified, out of `out_port`.
    pub fn forward(&self, out_port: &ConnectPoint) {
        let data = self.context.packet().to_vec();
        self.record(self.emitter.send_to(data, out_port));
    }

    /// Forwards the original frame to `intf`.
    ///
    /// The frame is re-tagged with the interface VLAN, or untagged when the
    /// interface has none, and sent out of the interface's connect point.
    pub fn forward_to_interface(&self, intf: &Interface) {
        let data = frame::retag(self.context.packet(), intf.vlan());
        self.record(self.emitter.send_to(data, intf.connect_point()));
    }

    /// Sends the original frame out of every edge port except ingress.
    pub fn flood(&self) {
        let in_port = self.context.in_port();
        let mut sent = false;
        for point in self.emitter.edge_points() {
            if &point == in_port {
                continue;
            }
            sent |= self.emitter.send_to(self.context.packet().to_vec(), &point);
        }
        self.record(sent);
    }

    /// Consumes the message without emitting anything.
    pub fn drop(&self) {
        trace!(in_port = %self.context.in_port(), "Dropping neighbour message");
    }

    /// Number of actions so far that put at least one frame on the wire.
    pub(crate) fn emissions(&self) -> usize {
        self.emissions.load(Ordering::Relaxed)
    }

    fn record(&self, emitted: bool) {
        if emitted {
            self.emissions.fetch_add(1, Ordering::Relaxed);
        }
    }
}
