//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the governance engine and the outside world.
//!
//! - **Driving Port (Inbound)**: `GovernanceApi`, the action table
//! - **Driven Port (Outbound)**: `ChainHost`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
