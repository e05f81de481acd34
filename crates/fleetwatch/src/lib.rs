//! `fleetwatch` - vessel readiness tracking
//!
//! This library computes traffic-light status for fleet vessels, resolves
//! user overrides of arrival, berthing and departure estimates, and runs the
//! filter, sort and pagination pipeline behind the vessel list.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod backend;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dates;
pub mod defect;
pub mod error;
pub mod filter;
pub mod flags;
pub mod logging;
pub mod overrides;
pub mod session;
pub mod status;
pub mod storage;
pub mod table;
pub mod vessel;
pub mod view;

pub use backend::{FlagStore, OverrideStore, SqliteBackend, VesselSource};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use defect::DefectReport;
pub use error::{Error, Result};
pub use flags::{FlagColor, FlagSet};
pub use logging::init_logging;
pub use session::FleetSession;
pub use status::{compute_status, CompositeStatus, Severity};
pub use storage::{Storage, StorageStats};
pub use vessel::{Vessel, VesselRecord};
