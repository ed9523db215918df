//! Entity records and selection state.

use crate::core_types::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Discriminates the two entity flavors that share one record shape.
///
/// The upstream feed only carries device rows; rows with an active alarm are
/// additionally projected into the alert list. A tagged variant replaces the
/// original field-name sniffing between `isFire` and `isfire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Alert,
    Device,
}

/// Optional sensor readings attached to an entity. Presence varies by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Ambient temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Particulate (smoke) level in ppm.
    pub smoke_ppm: Option<f64>,
}

/// A device or fire-alert record with a normalized position.
///
/// `position` is `None` when the raw coordinates were unresolvable; such
/// entities contribute no layers and are excluded from distance computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier, unique within one fetch snapshot.
    pub id: String,
    pub kind: EntityKind,
    /// Human-readable device label, when the feed provides one.
    pub label: Option<String>,
    /// Canonical coordinates, already run through the normalizer.
    pub position: Option<LatLng>,
    /// True when the entity represents an active fire condition.
    pub alarm_active: bool,
    pub metrics: Metrics,
    /// Last-update timestamp, display only; never used for ordering.
    pub observed_at: Option<String>,
}

impl Entity {
    /// Display label, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Mutually exclusive selection state.
///
/// At most one alert or one device is selected; encoding the exclusion in
/// the enum makes the "never both" invariant unrepresentable to violate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Alert(String),
    Device(String),
}

impl Selection {
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }

    /// True when the alert with this id is the current selection.
    pub fn is_alert(&self, id: &str) -> bool {
        matches!(self, Selection::Alert(sel) if sel == id)
    }

    /// True when the device with this id is the current selection.
    pub fn is_device(&self, id: &str) -> bool {
        matches!(self, Selection::Device(sel) if sel == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_discriminates_kind() {
        let sel = Selection::Alert("a1".to_string());
        assert!(sel.is_alert("a1"));
        assert!(!sel.is_alert("a2"));
        // Same id selected as an alert is not a device selection
        assert!(!sel.is_device("a1"));
    }

    #[test]
    fn test_display_label_falls_back_to_id() {
        let entity = Entity {
            id: "66f0a1".to_string(),
            kind: EntityKind::Device,
            label: None,
            position: None,
            alarm_active: false,
            metrics: Metrics::default(),
            observed_at: None,
        };
        assert_eq!(entity.display_label(), "66f0a1");
    }
}
