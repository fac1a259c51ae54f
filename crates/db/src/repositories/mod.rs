//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod barangay_repo;
pub mod dispatch_repo;
pub mod report_repo;
pub mod station_repo;
pub mod user_repo;

pub use barangay_repo::BarangayRepo;
pub use dispatch_repo::DispatchRepo;
pub use report_repo::ReportRepo;
pub use station_repo::StationRepo;
pub use user_repo::UserRepo;
