pub mod calendar;
pub mod identity;
pub mod proposal;
pub mod slot;
