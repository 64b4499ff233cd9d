pub mod maintenance;
pub mod ride;

pub use maintenance::{MaintenanceRecord, MaintenanceSummary, NewMaintenance};
pub use ride::{NewRide, RideRecord, RideSummary};
