//! Neighbour resolution dispatch for SONiC switches.
//!
//! Intercepts ARP and IPv6 neighbour discovery frames arriving at edge
//! ports and hands them to application handlers registered per connect
//! point, optionally narrowed to one logical interface. Handlers answer
//! through [`NeighbourMessageActions`]: reply on behalf of the target,
//! forward, flood to other edge ports, or drop.
//!
//! # Architecture
//!
//! ```text
//! PacketService ──► classifier ──► NeighbourMessageContext
//!                                        │
//!                       HandlerRegistry snapshot (per ingress point)
//!                                        │
//!                          interface match ──► handler(s)
//!                                        │
//!                     NeighbourMessageActions ──► edge guard ──► PacketService::emit
//! ```
//!
//! Packet interception follows the registry: nothing is requested from the
//! transport while no handlers are registered.

mod actions;
mod classifier;
pub mod config;
mod context;
pub mod error;
pub mod frame;
mod handler;
mod interface;
mod manager;
pub mod packet;
mod registry;
mod reply;
mod services;
mod stats;

#[cfg(test)]
mod test_frames;

pub use actions::{NeighbourAction, NeighbourMessageActions};
pub use classifier::classify;
pub use config::NeighbourConfig;
pub use context::{
    ArpMessage, NdpMessage, NeighbourMessage, NeighbourMessageContext, NeighbourMessageType,
    NeighbourProtocol,
};
pub use error::{NeighbourError, Result};
pub use handler::NeighbourMessageHandler;
pub use interface::Interface;
pub use manager::NeighbourResolutionManager;
pub use packet::{
    InboundPacket, OutboundPacket, PacketContext, PacketDisposition, PacketPriority,
    TrafficSelector,
};
pub use registry::{HandlerRegistration, HandlerRegistry, RegistrationMap};
pub use reply::build_reply;
pub use services::{EdgePortService, PacketService};
pub use stats::DispatchStats;

pub use neighbour_types::{ApplicationId, ConnectPoint, DeviceId, MacAddress, PortNumber, VlanId};
