/// Proposal lifecycle and calendar endpoints
pub mod proposal;
/// Slot claiming, availability and history endpoints
pub mod slot;
