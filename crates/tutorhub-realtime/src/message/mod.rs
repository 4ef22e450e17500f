//! Control message types and inbound routing.

pub mod router;
pub mod types;
