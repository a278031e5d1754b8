//! Shared mocks and frame builders for integration tests.

#![allow(dead_code)]

use neighbour_resolution::*;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, Mutex};

// ============================================================================
// MOCK SERVICES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Request(TrafficSelector, PacketPriority),
    Cancel(TrafficSelector, PacketPriority),
}

/// Packet transport that records every call.
#[derive(Default)]
pub struct MockPacketService {
    pub calls: Mutex<Vec<TransportCall>>,
    pub emitted: Mutex<Vec<OutboundPacket>>,
}

impl MockPacketService {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn emitted(&self) -> Vec<OutboundPacket> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.emitted.lock().unwrap().clear();
    }
}

impl PacketService for MockPacketService {
    fn request_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        _app_id: &ApplicationId,
    ) {
        self.calls
            .lock()
            .unwrap()
            .push(TransportCall::Request(selector, priority));
    }

    fn cancel_packets(
        &self,
        selector: TrafficSelector,
        priority: PacketPriority,
        _app_id: &ApplicationId,
    ) {
        self.calls
            .lock()
            .unwrap()
            .push(TransportCall::Cancel(selector, priority));
    }

    fn emit(&self, packet: OutboundPacket) {
        self.emitted.lock().unwrap().push(packet);
    }
}

/// Edge inventory backed by a fixed list.
pub struct MockEdgePortService {
    pub edges: Vec<ConnectPoint>,
}

impl EdgePortService for MockEdgePortService {
    fn is_edge_point(&self, point: &ConnectPoint) -> bool {
        self.edges.contains(point)
    }

    fn edge_points(&self) -> Vec<ConnectPoint> {
        self.edges.clone()
    }
}

/// Handler that records the messages it sees and then runs an action.
pub struct RecordingHandler {
    pub seen: Mutex<Vec<NeighbourMessageContext>>,
    action: Option<NeighbourAction>,
}

impl RecordingHandler {
    pub fn new(action: Option<NeighbourAction>) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            action,
        })
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl NeighbourMessageHandler for RecordingHandler {
    fn handle_message(
        &self,
        context: &NeighbourMessageContext,
        actions: &NeighbourMessageActions,
    ) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(context.clone());
        if let Some(action) = &self.action {
            actions.execute(action.clone());
        }
        Ok(())
    }
}

// ============================================================================
// FIXTURE
// ============================================================================

pub struct Fixture {
    pub transport: Arc<MockPacketService>,
    pub manager: NeighbourResolutionManager,
}

pub fn app(id: u16) -> ApplicationId {
    ApplicationId::new(id, format!("org.sonic.app{}", id))
}

pub fn cp(device: &str, port: u64) -> ConnectPoint {
    ConnectPoint::new(device, port)
}

/// Routes engine logs to the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture(config: NeighbourConfig, edges: Vec<ConnectPoint>) -> Fixture {
    init_tracing();
    let transport = Arc::new(MockPacketService::default());
    let manager = NeighbourResolutionManager::new(
        ApplicationId::new(1, "org.sonic.neighbour"),
        config,
        transport.clone(),
        Arc::new(MockEdgePortService { edges }),
    );
    Fixture { transport, manager }
}

pub fn as_handler<H: NeighbourMessageHandler + 'static>(
    handler: &Arc<H>,
) -> Arc<dyn NeighbourMessageHandler> {
    handler.clone()
}

// ============================================================================
// FRAME BUILDERS
// ============================================================================

pub fn arp_request(
    sender_mac: MacAddress,
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
    vlan: Option<VlanId>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(42);
    out.extend_from_slice(&[0xff; 6]);
    out.extend_from_slice(sender_mac.as_bytes());
    out.extend_from_slice(&[0x08, 0x06]);
    out.extend_from_slice(&[0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01]);
    out.extend_from_slice(sender_mac.as_bytes());
    out.extend_from_slice(&sender_ip.octets());
    out.extend_from_slice(&[0; 6]);
    out.extend_from_slice(&target_ip.octets());
    frame::retag(&out, vlan)
}

pub fn neighbor_solicitation(
    src_mac: MacAddress,
    src_ip: Ipv6Addr,
    target: Ipv6Addr,
    vlan: Option<VlanId>,
) -> Vec<u8> {
    let t = target.octets();
    let dst_mac = [0x33, 0x33, 0xff, t[13], t[14], t[15]];
    let dst_ip = Ipv6Addr::new(
        0xff02,
        0,
        0,
        0,
        0,
        1,
        0xff00 | u16::from(t[13]),
        u16::from_be_bytes([t[14], t[15]]),
    );

    let mut icmp = vec![135, 0, 0, 0, 0, 0, 0, 0];
    icmp.extend_from_slice(&t);
    icmp.extend_from_slice(&[1, 1]);
    icmp.extend_from_slice(src_mac.as_bytes());

    let mut out = Vec::new();
    out.extend_from_slice(&dst_mac);
    out.extend_from_slice(src_mac.as_bytes());
    out.extend_from_slice(&[0x86, 0xdd, 0x60, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&(icmp.len() as u16).to_be_bytes());
    out.extend_from_slice(&[58, 255]);
    out.extend_from_slice(&src_ip.octets());
    out.extend_from_slice(&dst_ip.octets());
    out.extend_from_slice(&icmp);
    frame::retag(&out, vlan)
}

/// An IPv4/UDP frame: not a neighbour message.
pub fn ipv4_frame(src_mac: MacAddress) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&[0xff; 6]);
    out.extend_from_slice(src_mac.as_bytes());
    out.extend_from_slice(&[0x08, 0x00]);
    out.extend_from_slice(&[0x45, 0, 0, 28, 0, 0, 0, 0, 64, 17, 0, 0]);
    out.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
    out.extend_from_slice(&[0, 68, 0, 67, 0, 8, 0, 0]);
    out
}
