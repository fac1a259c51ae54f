//! Domain logic for the citizen crime-reporting platform.
//!
//! Everything in this crate is pure: the geometry primitive, the jurisdiction
//! index, the station assignment engine, the dispatch status enumeration with
//! its transition guards, and SLA timing math. Persistence and transport live
//! in `bantay-db` and `bantay-api`.

pub mod assignment;
pub mod error;
pub mod geometry;
pub mod jurisdiction;
pub mod report_status;
pub mod roles;
pub mod sla;
pub mod status;
pub mod types;
