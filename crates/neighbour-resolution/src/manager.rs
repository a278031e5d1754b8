//! NeighbourResolutionManager - neighbour message dispatch
//!
//! Owns the handler registry, keeps packet interception in step with it,
//! and dispatches classified ARP/NDP messages to the handlers registered
//! for their ingress connect point.

use crate::actions::{Emitter, NeighbourMessageActions};
use crate::classifier;
use crate::config::NeighbourConfig;
use crate::context::NeighbourMessageContext;
use crate::error::Result;
use crate::handler::NeighbourMessageHandler;
use crate::interface::Interface;
use crate::packet::{PacketContext, PacketDisposition, PacketPriority, TrafficSelector};
use crate::registry::{HandlerRegistration, HandlerRegistry};
use crate::services::{EdgePortService, PacketService};
use crate::stats::{DispatchCounters, DispatchStats};
use neighbour_types::{ApplicationId, ConnectPoint};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Which frame classes are currently requested from the transport.
#[derive(Debug)]
struct Interception {
    config: NeighbourConfig,
    arp: bool,
    ndp: bool,
}

impl Interception {
    /// Requests or cancels frame classes so that ARP is intercepted exactly
    /// while handlers exist, and NDP additionally only while enabled.
    fn sync(&mut self, have_handlers: bool, service: &dyn PacketService, app_id: &ApplicationId) {
        let priority = self.config.priority();

        let want_arp = have_handlers;
        if want_arp != self.arp {
            toggle(service, TrafficSelector::Arp, want_arp, priority, app_id);
            self.arp = want_arp;
        }

        let want_ndp = have_handlers && self.config.ndp_enabled;
        if want_ndp != self.ndp {
            for selector in TrafficSelector::NDP {
                toggle(service, selector, want_ndp, priority, app_id);
            }
            self.ndp = want_ndp;
        }
    }
}

fn toggle(
    service: &dyn PacketService,
    selector: TrafficSelector,
    request: bool,
    priority: PacketPriority,
    app_id: &ApplicationId,
) {
    if request {
        info!(%selector, %priority, "Requesting neighbour packets");
        service.request_packets(selector, priority, app_id);
    } else {
        info!(%selector, %priority, "Cancelling neighbour packets");
        service.cancel_packets(selector, priority, app_id);
    }
}

/// Neighbour resolution dispatch engine.
///
/// Registration calls, configuration changes and shutdown are serialized
/// with each other. Packet processing never waits on them and may run on
/// any number of threads at once.
pub struct NeighbourResolutionManager {
    app_id: ApplicationId,
    registry: HandlerRegistry,
    interception: Mutex<Interception>,
    warn_on_duplicate_replies: AtomicBool,
    packet_service: Arc<dyn PacketService>,
    emitter: Arc<Emitter>,
    counters: Arc<DispatchCounters>,
}

impl NeighbourResolutionManager {
    /// Creates the engine. No packets are requested until the first
    /// handler registers.
    pub fn new(
        app_id: ApplicationId,
        config: NeighbourConfig,
        packet_service: Arc<dyn PacketService>,
        edge_service: Arc<dyn EdgePortService>,
    ) -> Self {
        info!(
            app_id = %app_id,
            ndp_enabled = config.ndp_enabled,
            priority = config.packet_priority,
            "Initializing neighbour resolution"
        );

        let counters = Arc::new(DispatchCounters::default());
        let emitter = Arc::new(Emitter::new(
            packet_service.clone(),
            edge_service,
            counters.clone(),
        ));

        Self {
            app_id,
            registry: HandlerRegistry::new(),
            warn_on_duplicate_replies: AtomicBool::new(config.warn_on_duplicate_replies),
            interception: Mutex::new(Interception {
                config,
                arp: false,
                ndp: false,
            }),
            packet_service,
            emitter,
            counters,
        }
    }

    pub fn app_id(&self) -> &ApplicationId {
        &self.app_id
    }

    pub fn config(&self) -> NeighbourConfig {
        self.interception.lock().config.clone()
    }

    /// Applies a configuration change.
    ///
    /// Toggling `ndp_enabled` requests or cancels NDP interception at once
    /// when handlers are registered. A priority change re-requests every
    /// intercepted class at the new priority.
    #[instrument(skip(self, config), fields(ndp_enabled = config.ndp_enabled))]
    pub fn modified(&self, config: NeighbourConfig) -> Result<()> {
        config.validate()?;

        let mut interception = self.interception.lock();
        if interception.config == config {
            return Ok(());
        }

        if interception.config.packet_priority != config.packet_priority {
            // Withdraw everything at the old priority; sync re-requests below.
            interception.sync(false, self.packet_service.as_ref(), &self.app_id);
        }

        if interception.config.ndp_enabled != config.ndp_enabled {
            info!(ndp_enabled = config.ndp_enabled, "NDP interception changed");
        }

        self.warn_on_duplicate_replies
            .store(config.warn_on_duplicate_replies, Ordering::Relaxed);
        interception.config = config;
        interception.sync(
            !self.registry.is_empty(),
            self.packet_service.as_ref(),
            &self.app_id,
        );
        Ok(())
    }

    /// Registers `handler` for every neighbour message received on `point`.
    pub fn register_handler(
        &self,
        point: &ConnectPoint,
        handler: Arc<dyn NeighbourMessageHandler>,
        app_id: &ApplicationId,
    ) {
        let registration = HandlerRegistration::new(handler, None, app_id.clone());
        self.register(point.clone(), registration);
    }

    /// Registers `handler` for messages received on the interface's connect
    /// point that also match the interface.
    pub fn register_interface_handler(
        &self,
        intf: &Interface,
        handler: Arc<dyn NeighbourMessageHandler>,
        app_id: &ApplicationId,
    ) {
        let registration = HandlerRegistration::new(handler, Some(intf.clone()), app_id.clone());
        self.register(intf.connect_point().clone(), registration);
    }

    /// Removes a registration made with [`register_handler`]. Unknown
    /// registrations are ignored.
    ///
    /// [`register_handler`]: Self::register_handler
    pub fn unregister_handler(
        &self,
        point: &ConnectPoint,
        handler: &Arc<dyn NeighbourMessageHandler>,
        app_id: &ApplicationId,
    ) {
        let registration = HandlerRegistration::new(handler.clone(), None, app_id.clone());
        self.unregister(point, &registration);
    }

    /// Removes a registration made with [`register_interface_handler`].
    /// Unknown registrations are ignored.
    ///
    /// [`register_interface_handler`]: Self::register_interface_handler
    pub fn unregister_interface_handler(
        &self,
        intf: &Interface,
        handler: &Arc<dyn NeighbourMessageHandler>,
        app_id: &ApplicationId,
    ) {
        let registration =
            HandlerRegistration::new(handler.clone(), Some(intf.clone()), app_id.clone());
        self.unregister(intf.connect_point(), &registration);
    }

    /// Removes every registration owned by `app_id`. Returns the number
    /// removed.
    pub fn unregister_handlers(&self, app_id: &ApplicationId) -> usize {
        let mut interception = self.interception.lock();
        let removed = self.registry.unregister_app(app_id);
        if removed > 0 {
            info!(app_id = %app_id, removed, "Removed application neighbour handlers");
        }
        interception.sync(
            !self.registry.is_empty(),
            self.packet_service.as_ref(),
            &self.app_id,
        );
        removed
    }

    /// Snapshot of all registrations, grouped by connect point.
    pub fn handler_registrations(&self) -> HashMap<ConnectPoint, Vec<HandlerRegistration>> {
        self.registry
            .snapshot()
            .iter()
            .map(|(point, registrations)| (point.clone(), registrations.iter().cloned().collect()))
            .collect()
    }

    /// Frame classes currently requested from the transport.
    pub fn requested_selectors(&self) -> Vec<TrafficSelector> {
        let interception = self.interception.lock();
        let mut selectors = Vec::new();
        if interception.arp {
            selectors.push(TrafficSelector::Arp);
        }
        if interception.ndp {
            selectors.extend(TrafficSelector::NDP);
        }
        selectors
    }

    /// Packet processor entry point.
    ///
    /// Packets already handled by an earlier processor are skipped. Neighbour
    /// messages are dispatched and the packet is blocked; anything else is
    /// left for later processors.
    pub fn process(&self, context: &mut PacketContext) {
        if context.is_handled() {
            return;
        }

        let inbound = context.inbound();
        let disposition = self.handle_frame(inbound.data(), inbound.received_from());
        if disposition == PacketDisposition::Blocked {
            context.block();
        }
    }

    /// Classifies and dispatches one inbound frame.
    pub fn handle_frame(&self, frame: &[u8], in_port: &ConnectPoint) -> PacketDisposition {
        DispatchCounters::incr(&self.counters.frames_received);

        match classifier::classify(frame, in_port) {
            Some(context) => {
                self.dispatch(context);
                PacketDisposition::Blocked
            }
            None => {
                DispatchCounters::incr(&self.counters.frames_ignored);
                PacketDisposition::Ignored
            }
        }
    }

    /// Invokes every matching handler registered for the message's ingress
    /// point. Returns the number of handlers invoked.
    pub fn dispatch(&self, context: NeighbourMessageContext) -> usize {
        DispatchCounters::incr(&self.counters.messages_dispatched);

        let snapshot = self.registry.snapshot();
        let Some(registrations) = snapshot.get(context.in_port()) else {
            debug!(neighbour = %context, "No neighbour handlers for ingress point");
            return 0;
        };

        debug!(neighbour = %context, "Dispatching neighbour message");

        let actions = NeighbourMessageActions::new(context.clone(), self.emitter.clone());
        let mut invoked = 0;
        for registration in registrations.iter().filter(|r| r.accepts(&context)) {
            invoked += 1;
            self.invoke(registration, &context, &actions);
        }

        if self.warn_on_duplicate_replies.load(Ordering::Relaxed) && actions.emissions() > 1 {
            warn!(
                neighbour = %context,
                emissions = actions.emissions(),
                "Several handlers emitted for one neighbour message"
            );
        }

        invoked
    }

    /// Cancels all interception and drops every registration.
    pub fn shutdown(&self) {
        let mut interception = self.interception.lock();
        let priority = interception.config.priority();
        for selector in TrafficSelector::ALL {
            self.packet_service
                .cancel_packets(selector, priority, &self.app_id);
        }
        interception.arp = false;
        interception.ndp = false;

        let registrations = self.registry.clear();
        info!(registrations, "Neighbour resolution shut down");
    }

    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }

    fn register(&self, point: ConnectPoint, registration: HandlerRegistration) {
        let mut interception = self.interception.lock();
        debug!(
            point = %point,
            handler = registration.handler().name(),
            app_id = %registration.app_id(),
            "Registering neighbour handler"
        );
        self.registry.register(point, registration);
        interception.sync(true, self.packet_service.as_ref(), &self.app_id);
    }

    fn unregister(&self, point: &ConnectPoint, registration: &HandlerRegistration) {
        let mut interception = self.interception.lock();
        if self.registry.unregister(point, registration) {
            debug!(
                point = %point,
                handler = registration.handler().name(),
                app_id = %registration.app_id(),
                "Unregistered neighbour handler"
            );
        }
        interception.sync(
            !self.registry.is_empty(),
            self.packet_service.as_ref(),
            &self.app_id,
        );
    }

    fn invoke(
        &self,
        registration: &HandlerRegistration,
        context: &NeighbourMessageContext,
        actions: &NeighbourMessageActions,
    ) {
        DispatchCounters::incr(&self.counters.handlers_invoked);

        let handler = registration.handler();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle_message(context, actions)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                DispatchCounters::incr(&self.counters.handler_faults);
                error!(
                    handler = handler.name(),
                    app_id = %registration.app_id(),
                    error = %e,
                    "Neighbour handler failed"
                );
            }
            Err(_) => {
                DispatchCounters::incr(&self.counters.handler_faults);
                error!(
                    handler = handler.name(),
                    app_id = %registration.app_id(),
                    "Neighbour handler panicked"
                );
            }
        }
    }
}
