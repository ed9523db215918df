//! Page-level controller state: entity snapshots, selection, team position.
//!
//! The HTTP fetch itself lives outside this crate; callers poll their feed
//! on [`REFRESH_INTERVAL_SECS`] and hand each snapshot to
//! [`DashboardState::ingest_snapshot`]. Snapshots replace, never append, so
//! an overlapping refresh is harmless.

use crate::core_types::{Entity, EntityKind, LatLng, Metrics, Selection};
use crate::layers::ReconcileInput;
use crate::normalize::normalize_record;
use serde_json::Value;

/// Polling period for the feed collaborator, in seconds.
pub const REFRESH_INTERVAL_SECS: u64 = 30;

/// Offset applied to the first device position to seed the response-team
/// marker when no real team telemetry exists.
const TEAM_SEED_OFFSET_DEG: f64 = 0.01;

/// Map one snapshot of raw feed records into device entities.
///
/// Tolerates missing optional fields; coordinates go through the normalizer
/// and unresolvable ones leave `position` as `None` (the entity still shows
/// up in lists, it just cannot be placed on the map).
pub fn map_feed_records(records: &[Value]) -> Vec<Entity> {
    records.iter().map(map_feed_record).collect()
}

fn map_feed_record(raw: &Value) -> Entity {
    let field_str = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| raw.get(k))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let field_num = |keys: &[&str]| keys.iter().find_map(|k| raw.get(k)).and_then(Value::as_f64);

    let label = field_str(&["deviceId"]);
    let id = field_str(&["_id", "id"])
        .or_else(|| label.clone())
        .unwrap_or_default();

    Entity {
        id,
        kind: EntityKind::Device,
        label,
        position: normalize_record(raw),
        alarm_active: raw
            .get("isfire")
            .or_else(|| raw.get("isFire"))
            .and_then(Value::as_bool)
            .unwrap_or(false),
        metrics: Metrics {
            temperature: field_num(&["temp", "temperature"]),
            humidity: field_num(&["humidity"]),
            smoke_ppm: field_num(&["smoke"]),
        },
        observed_at: field_str(&["lastUpdate", "timestamp", "createdAt"]),
    }
}

/// Canonical entity lists and selection state held by the page controller.
#[derive(Debug, Default)]
pub struct DashboardState {
    alerts: Vec<Entity>,
    devices: Vec<Entity>,
    selection: Selection,
    team_position: Option<LatLng>,
}

impl DashboardState {
    pub fn new() -> Self {
        DashboardState::default()
    }

    /// Replace both entity lists from a fresh snapshot.
    ///
    /// Alarm-active devices are additionally projected into the alert list.
    /// The response-team position is seeded once, from the first device that
    /// has a position, and never recomputed on later snapshots.
    pub fn ingest_snapshot(&mut self, entities: Vec<Entity>) {
        self.alerts = entities
            .iter()
            .filter(|e| e.alarm_active)
            .cloned()
            .map(|mut e| {
                e.kind = EntityKind::Alert;
                e
            })
            .collect();
        self.devices = entities;

        if self.team_position.is_none() {
            self.team_position = self
                .devices
                .iter()
                .find_map(|d| d.position)
                .map(|p| LatLng::new(p.lat + TEAM_SEED_OFFSET_DEG, p.lng + TEAM_SEED_OFFSET_DEG));
        }

        tracing::debug!(
            alerts = self.alerts.len(),
            devices = self.devices.len(),
            "snapshot ingested"
        );
    }

    /// Ingest a raw JSON snapshot straight from the feed.
    pub fn ingest_raw_snapshot(&mut self, records: &[Value]) {
        self.ingest_snapshot(map_feed_records(records));
    }

    pub fn alerts(&self) -> &[Entity] {
        &self.alerts
    }

    pub fn devices(&self) -> &[Entity] {
        &self.devices
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn team_position(&self) -> Option<LatLng> {
        self.team_position
    }

    /// Select an alert, clearing any device selection. Unknown ids clear the
    /// selection entirely.
    pub fn select_alert(&mut self, id: &str) {
        self.selection = if self.alerts.iter().any(|a| a.id == id) {
            Selection::Alert(id.to_string())
        } else {
            Selection::None
        };
    }

    /// Select a device, clearing any alert selection. Unknown ids clear the
    /// selection entirely.
    pub fn select_device(&mut self, id: &str) {
        self.selection = if self.devices.iter().any(|d| d.id == id) {
            Selection::Device(id.to_string())
        } else {
            Selection::None
        };
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Outward selection callback target: called when the operator activates
    /// an interactive marker.
    pub fn activate_marker(&mut self, target: &crate::backend::SelectTarget) {
        match target.kind {
            EntityKind::Alert => self.select_alert(&target.id),
            EntityKind::Device => self.select_device(&target.id),
        }
    }

    /// Currently selected alert entity, if any.
    pub fn selected_alert(&self) -> Option<&Entity> {
        match &self.selection {
            Selection::Alert(id) => self.alerts.iter().find(|a| &a.id == id),
            _ => None,
        }
    }

    /// Currently selected device entity, if any.
    pub fn selected_device(&self) -> Option<&Entity> {
        match &self.selection {
            Selection::Device(id) => self.devices.iter().find(|d| &d.id == id),
            _ => None,
        }
    }

    /// Borrow the state as reconciler input.
    pub fn reconcile_input(&self) -> ReconcileInput<'_> {
        ReconcileInput {
            alerts: &self.alerts,
            devices: &self.devices,
            selection: &self.selection,
            team_position: self.team_position,
        }
    }
}
