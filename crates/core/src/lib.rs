//! Fire Telemetry Map Engine
//!
//! Places live fire-sensor telemetry (device readings, active-fire alerts,
//! a response-team position) on an interactive map. The engine owns the
//! hard parts of that view:
//!
//! - normalizing inconsistent coordinate fields from heterogeneous upstream
//!   records, including transposed-axis repair
//! - reconciling the set of map layers (markers, connector line, distance
//!   label) against each fresh snapshot without leaking or duplicating
//!   map resources
//! - derived geospatial quantities (haversine distance, camera framing)
//! - deterministic view-centering and popup-opening from selection state
//!
//! Rendering and tile plumbing stay behind the [`backend::MapBackend`]
//! trait; data fetching stays with the caller, which polls and hands each
//! snapshot to [`dashboard::DashboardState`].

// Core types and utilities
pub mod core_types;

pub mod backend;
pub mod dashboard;
pub mod error;
pub mod icon;
pub mod layers;
pub mod normalize;
pub mod session;

// Re-export core types
pub use core_types::{Entity, EntityKind, LatLng, Metrics, Selection};

// Re-export the engine surface
pub use backend::{HeadlessBackend, LayerId, MapBackend, SelectTarget};
pub use dashboard::{map_feed_records, DashboardState, REFRESH_INTERVAL_SECS};
pub use error::{MapError, Result};
pub use icon::{build_icon, Icon, IconCache, IconKind, IconSpec};
pub use layers::{LayerSet, PassSummary, ReconcileInput, Reconciler, FOCUS_ZOOM};
pub use normalize::normalize_record;
pub use session::{ControlPosition, MapConfig, MapSession};
