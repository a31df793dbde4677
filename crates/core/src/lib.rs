//! # Huddle Core
//!
//! Domain types and rules for group scheduling: proposals with a date range
//! and a number of slots, invitees claiming slots with per-day availability,
//! and the aggregated calendar a creator looks at.
//!
//! - [`lifecycle`]: creating, updating, cancelling and listing proposals
//! - [`registry`]: claiming slots and replacing availability, transactionally
//! - [`calendar`]: per-day counts, tiers and rankings
//! - [`store`]: the storage traits the operations run against

pub mod calendar;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod registry;
pub mod store;
