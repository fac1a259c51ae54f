pub mod dispatches;
pub mod reports;
