//! Concurrency tests for neighbour message dispatch
//!
//! Packet processing runs on many threads while registrations change
//! underneath it. Dispatch must never block on registration, and the
//! interception state must end consistent with the registry.

mod common;

use common::*;
use neighbour_resolution::*;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const HOST_MAC: MacAddress = MacAddress::new([0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
const ROUTER_MAC: MacAddress = MacAddress::new([0x00, 0x00, 0x00, 0x00, 0x00, 0xaa]);

struct CountingHandler {
    invocations: AtomicUsize,
}

impl NeighbourMessageHandler for CountingHandler {
    fn handle_message(
        &self,
        _context: &NeighbourMessageContext,
        actions: &NeighbourMessageActions,
    ) -> anyhow::Result<()> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        actions.reply(ROUTER_MAC);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch_on_many_ports() {
    let ports: Vec<ConnectPoint> = (1..=8).map(|p| cp("of:1", p)).collect();
    let f = Arc::new(fixture(NeighbourConfig::default(), ports.clone()));

    let handler = Arc::new(CountingHandler {
        invocations: AtomicUsize::new(0),
    });
    for port in &ports {
        f.manager
            .register_handler(port, as_handler(&handler), &app(1));
    }

    let mut tasks = Vec::new();
    for (i, port) in ports.iter().cloned().enumerate() {
        let f = f.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            for n in 0..50u8 {
                let sender = Ipv4Addr::new(10, 0, i as u8, n);
                let frame = arp_request(HOST_MAC, sender, Ipv4Addr::new(10, 0, 0, 254), None);
                assert_eq!(
                    f.manager.handle_frame(&frame, &port),
                    PacketDisposition::Blocked
                );
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(handler.invocations.load(Ordering::Relaxed), 8 * 50);
    assert_eq!(f.transport.emitted().len(), 8 * 50);

    let stats = f.manager.stats();
    assert_eq!(stats.messages_dispatched, 400);
    assert_eq!(stats.handler_faults, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registration_churn_during_dispatch() {
    let ingress = cp("of:1", 1);
    let f = Arc::new(fixture(NeighbourConfig::default(), vec![ingress.clone()]));

    let anchor = Arc::new(CountingHandler {
        invocations: AtomicUsize::new(0),
    });
    f.manager
        .register_handler(&ingress, as_handler(&anchor), &app(1));

    let dispatcher = {
        let f = f.clone();
        let ingress = ingress.clone();
        tokio::task::spawn_blocking(move || {
            let frame = arp_request(
                HOST_MAC,
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(10, 0, 0, 254),
                None,
            );
            for _ in 0..500 {
                f.manager.handle_frame(&frame, &ingress);
            }
        })
    };

    let churner = {
        let f = f.clone();
        let ingress = ingress.clone();
        tokio::task::spawn_blocking(move || {
            for _ in 0..200 {
                let transient = as_handler(&RecordingHandler::new(None));
                f.manager.register_handler(&ingress, transient.clone(), &app(2));
                f.manager.unregister_handler(&ingress, &transient, &app(2));
            }
        })
    };

    dispatcher.await.unwrap();
    churner.await.unwrap();

    // The anchor registration is never removed, so every frame reaches it.
    assert_eq!(anchor.invocations.load(Ordering::Relaxed), 500);
    assert_eq!(f.manager.requested_selectors(), vec![TrafficSelector::Arp]);

    f.manager.unregister_handlers(&app(1));
    assert!(f.manager.requested_selectors().is_empty());
    assert!(f.manager.handler_registrations().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_keeps_interception_consistent() {
    let f = Arc::new(fixture(NeighbourConfig::default(), vec![]));

    let mut tasks = Vec::new();
    for worker in 0..4u16 {
        let f = f.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            for port in 0..25u64 {
                let h = as_handler(&RecordingHandler::new(None));
                let point = cp("of:1", port);
                f.manager.register_handler(&point, h.clone(), &app(worker));
                f.manager.unregister_handler(&point, &h, &app(worker));
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(f.manager.handler_registrations().is_empty());
    assert!(f.manager.requested_selectors().is_empty());

    // Requests and cancels strictly alternate, starting with a request.
    let calls = f.transport.calls();
    assert!(!calls.is_empty());
    for (i, call) in calls.iter().enumerate() {
        let expected = if i % 2 == 0 {
            TransportCall::Request(TrafficSelector::Arp, PacketPriority::CONTROL)
        } else {
            TransportCall::Cancel(TrafficSelector::Arp, PacketPriority::CONTROL)
        };
        assert_eq!(call, &expected);
    }
}
