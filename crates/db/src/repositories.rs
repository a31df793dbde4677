pub mod account;
pub mod availability;
pub mod history;
pub mod proposal;
pub mod slot;
