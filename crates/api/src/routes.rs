/// Liveness and version endpoints
pub mod health;
/// Proposal endpoints
pub mod proposal;
/// Slot endpoints
pub mod slot;
