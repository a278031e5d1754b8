//! Neighbour message handler trait.

use crate::actions::NeighbourMessageActions;
use crate::context::NeighbourMessageContext;

/// Application logic invoked for neighbour messages received on the
/// connect point (and optionally interface) it was registered for.
///
/// Handlers run synchronously on the packet thread and may be invoked
/// concurrently for different messages. A returned error or a panic is
/// logged and contained; it never affects other handlers.
///
/// Handler identity is the `Arc` it was registered with: registering the
/// same `Arc` twice for the same point is a no-op, and unregistering
/// requires that same `Arc`.
pub trait NeighbourMessageHandler: Send + Sync {
    fn handle_message(
        &self,
        context: &NeighbourMessageContext,
        actions: &NeighbourMessageActions,
    ) -> anyhow::Result<()>;

    /// Name used in logs and registration listings
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> NeighbourMessageHandler for F
where
    F: Fn(&NeighbourMessageContext, &NeighbourMessageActions) -> anyhow::Result<()> + Send + Sync,
{
    fn handle_message(
        &self,
        context: &NeighbourMessageContext,
        actions: &NeighbourMessageActions,
    ) -> anyhow::Result<()> {
        self(context, actions)
    }
}
