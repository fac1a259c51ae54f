//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the write operations the entity supports

pub mod barangay;
pub mod dispatch;
pub mod report;
pub mod station;
pub mod user;
