//! Handler registry.
//!
//! Maps each ingress connect point to the set of handler registrations for
//! it. Writers copy-on-write the whole map under a lock; the packet path
//! takes an `Arc` snapshot and iterates it without holding any lock, so a
//! handler may register or unregister from inside its own invocation.

use crate::context::NeighbourMessageContext;
use crate::handler::NeighbourMessageHandler;
use crate::interface::Interface;
use neighbour_types::{ApplicationId, ConnectPoint};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Registrations keyed by ingress connect point.
pub type RegistrationMap = HashMap<ConnectPoint, HashSet<HandlerRegistration>>;

/// A handler bound to a connect point, optionally constrained to one
/// interface, on behalf of an application.
#[derive(Clone)]
pub struct HandlerRegistration {
    handler: Arc<dyn NeighbourMessageHandler>,
    intf: Option<Interface>,
    app_id: ApplicationId,
}

impl HandlerRegistration {
    pub fn new(
        handler: Arc<dyn NeighbourMessageHandler>,
        intf: Option<Interface>,
        app_id: ApplicationId,
    ) -> Self {
        Self {
            handler,
            intf,
            app_id,
        }
    }

    pub fn handler(&self) -> &Arc<dyn NeighbourMessageHandler> {
        &self.handler
    }

    pub fn intf(&self) -> Option<&Interface> {
        self.intf.as_ref()
    }

    pub fn app_id(&self) -> &ApplicationId {
        &self.app_id
    }

    /// Whether the handler should see `context`: always for unconstrained
    /// registrations, otherwise when the interface matches.
    pub fn accepts(&self, context: &NeighbourMessageContext) -> bool {
        self.intf.as_ref().map_or(true, |intf| intf.matches(context))
    }

    fn handler_addr(&self) -> usize {
        Arc::as_ptr(&self.handler) as *const () as usize
    }
}

impl PartialEq for HandlerRegistration {
    fn eq(&self, other: &Self) -> bool {
        self.handler_addr() == other.handler_addr()
            && self.intf == other.intf
            && self.app_id == other.app_id
    }
}

impl Eq for HandlerRegistration {}

impl Hash for HandlerRegistration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handler_addr().hash(state);
        self.intf.hash(state);
        self.app_id.hash(state);
    }
}

impl fmt::Debug for HandlerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistration")
            .field("handler", &self.handler.name())
            .field("intf", &self.intf)
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Copy-on-write map of handler registrations.
#[derive(Default)]
pub struct HandlerRegistry {
    map: RwLock<Arc<RegistrationMap>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a registration. Returns `false` if it was already present.
    pub fn register(&self, point: ConnectPoint, registration: HandlerRegistration) -> bool {
        let mut map = self.map.write();
        Arc::make_mut(&mut *map)
            .entry(point)
            .or_default()
            .insert(registration)
    }

    /// Removes a registration. Returns `false` if it was not present.
    pub fn unregister(&self, point: &ConnectPoint, registration: &HandlerRegistration) -> bool {
        let mut map = self.map.write();
        let present = map
            .get(point)
            .is_some_and(|registrations| registrations.contains(registration));
        if !present {
            return false;
        }

        let map = Arc::make_mut(&mut *map);
        if let Some(registrations) = map.get_mut(point) {
            registrations.remove(registration);
            if registrations.is_empty() {
                map.remove(point);
            }
        }
        true
    }

    /// Removes every registration owned by `app_id`, returning how many
    /// were removed.
    pub fn unregister_app(&self, app_id: &ApplicationId) -> usize {
        let mut map = self.map.write();
        let owned = map
            .values()
            .flatten()
            .filter(|registration| registration.app_id() == app_id)
            .count();
        if owned == 0 {
            return 0;
        }

        let map = Arc::make_mut(&mut *map);
        for registrations in map.values_mut() {
            registrations.retain(|registration| registration.app_id() != app_id);
        }
        map.retain(|_, registrations| !registrations.is_empty());
        owned
    }

    /// Removes every registration, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut map = self.map.write();
        let removed = map.values().map(HashSet::len).sum();
        *map = Arc::default();
        removed
    }

    /// Current registrations. The snapshot never changes once taken.
    pub fn snapshot(&self) -> Arc<RegistrationMap> {
        self.map.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Total number of registrations across all connect points.
    pub fn len(&self) -> usize {
        self.map.read().values().map(HashSet::len).sum()
    }
}
