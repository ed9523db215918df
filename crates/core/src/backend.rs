//! Seam between the engine and the mapping substrate.
//!
//! The reconciler never talks to a concrete map library; it hands layer
//! specs to a [`MapBackend`] and gets opaque [`LayerId`] handles back. Popup
//! sequencing after a camera move goes through `schedule_popup_open` so that
//! a real substrate can hook its camera-move-end event (or fall back to a
//! short fixed delay) while tests and the demo stay fully synchronous.

use crate::core_types::{EntityKind, LatLng};
use crate::error::{MapError, Result};
use crate::icon::Icon;
use crate::session::MapConfig;
use rustc_hash::FxHashMap;

/// Opaque handle to one visual object owned by the current render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// Identifies the entity behind an interactive marker, handed back to the
/// page controller when the operator activates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectTarget {
    pub kind: EntityKind,
    pub id: String,
}

/// Marker layer spec.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub icon: Icon,
    pub popup_html: String,
    /// Present on markers that drive the outward selection callback.
    pub select_target: Option<SelectTarget>,
}

/// Polyline layer spec (the selection connector).
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    pub points: Vec<LatLng>,
    pub color: String,
    pub weight: u32,
    /// SVG-style dash pattern, `None` for a solid line.
    pub dash_array: Option<String>,
}

/// Persistent (non-auto-dismissing) label pinned to a coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub position: LatLng,
    pub html: String,
}

/// Capability contract of the mapping substrate.
///
/// `remove_layer` must be idempotent: removing an id twice, or an id the
/// substrate already dropped, is a no-op.
pub trait MapBackend {
    /// Create the interactive surface. Called exactly once per session.
    fn init_surface(&mut self, config: &MapConfig) -> Result<()>;

    /// Dispose the surface and everything on it. Called exactly once.
    fn dispose_surface(&mut self);

    fn add_marker(&mut self, spec: MarkerSpec) -> LayerId;
    fn add_polyline(&mut self, spec: PolylineSpec) -> LayerId;
    fn add_label(&mut self, spec: LabelSpec) -> LayerId;
    fn remove_layer(&mut self, id: LayerId);

    /// Move the camera to `center` at `zoom`.
    fn set_view(&mut self, center: LatLng, zoom: f64);

    /// Ask for a marker popup to open once the camera move has visually
    /// settled. Purely a sequencing hint; never a correctness mechanism.
    fn schedule_popup_open(&mut self, id: LayerId);

    /// Drop every pending popup-open callback. Invoked on session teardown
    /// so nothing fires against a disposed surface.
    fn cancel_scheduled_popups(&mut self);

    /// Number of live layers on the surface (excluding the base tile layer).
    fn layer_count(&self) -> usize;
}

/// One recorded layer on the headless surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerRecord {
    Marker(MarkerSpec),
    Polyline(PolylineSpec),
    Label(LabelSpec),
}

/// In-memory [`MapBackend`] that records every call.
///
/// Used by the test suite and the headless demo; doubles as the reference
/// for what a real substrate adapter has to implement.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    layers: FxHashMap<LayerId, LayerRecord>,
    next_id: u64,
    view: Option<(LatLng, f64)>,
    scheduled_popups: Vec<LayerId>,
    initialized: bool,
    disposed: bool,
    /// When set, `init_surface` fails; simulates an unavailable substrate.
    fail_surface: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        HeadlessBackend::default()
    }

    /// A backend whose surface creation always fails.
    pub fn unavailable() -> Self {
        HeadlessBackend {
            fail_surface: true,
            ..HeadlessBackend::default()
        }
    }

    /// Current camera center/zoom, if a view was ever set.
    pub fn view(&self) -> Option<(LatLng, f64)> {
        self.view
    }

    /// Popup opens scheduled and not yet cancelled.
    pub fn scheduled_popups(&self) -> &[LayerId] {
        &self.scheduled_popups
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Look up a live layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&LayerRecord> {
        self.layers.get(&id)
    }

    /// All live markers, in no particular order.
    pub fn markers(&self) -> Vec<&MarkerSpec> {
        self.layers
            .values()
            .filter_map(|l| match l {
                LayerRecord::Marker(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// All live polylines.
    pub fn polylines(&self) -> Vec<&PolylineSpec> {
        self.layers
            .values()
            .filter_map(|l| match l {
                LayerRecord::Polyline(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// All live labels.
    pub fn labels(&self) -> Vec<&LabelSpec> {
        self.layers
            .values()
            .filter_map(|l| match l {
                LayerRecord::Label(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    fn insert(&mut self, record: LayerRecord) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, record);
        id
    }
}

impl MapBackend for HeadlessBackend {
    fn init_surface(&mut self, config: &MapConfig) -> Result<()> {
        if self.fail_surface {
            return Err(MapError::SessionCreation(
                "headless surface configured as unavailable".to_string(),
            ));
        }
        // A disposed handle stays dead; no re-creation on the same surface
        if self.disposed {
            return Err(MapError::SessionCreation(
                "surface already disposed".to_string(),
            ));
        }
        self.initialized = true;
        self.view = Some((config.center, config.zoom));
        Ok(())
    }

    fn dispose_surface(&mut self) {
        self.layers.clear();
        self.scheduled_popups.clear();
        self.disposed = true;
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> LayerId {
        self.insert(LayerRecord::Marker(spec))
    }

    fn add_polyline(&mut self, spec: PolylineSpec) -> LayerId {
        self.insert(LayerRecord::Polyline(spec))
    }

    fn add_label(&mut self, spec: LabelSpec) -> LayerId {
        self.insert(LayerRecord::Label(spec))
    }

    fn remove_layer(&mut self, id: LayerId) {
        // Idempotent by contract
        self.layers.remove(&id);
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.view = Some((center, zoom));
    }

    fn schedule_popup_open(&mut self, id: LayerId) {
        // Synchronous stand-in for "shortly after the camera settles"
        if self.layers.contains_key(&id) {
            self.scheduled_popups.push(id);
        }
    }

    fn cancel_scheduled_popups(&mut self) {
        self.scheduled_popups.clear();
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_layer_is_idempotent() {
        let mut backend = HeadlessBackend::new();
        let id = backend.add_label(LabelSpec {
            position: LatLng::new(0.0, 0.0),
            html: "x".to_string(),
        });
        assert_eq!(backend.layer_count(), 1);

        backend.remove_layer(id);
        backend.remove_layer(id);
        assert_eq!(backend.layer_count(), 0);
    }

    #[test]
    fn test_popup_on_removed_layer_not_scheduled() {
        let mut backend = HeadlessBackend::new();
        let id = backend.add_label(LabelSpec {
            position: LatLng::new(0.0, 0.0),
            html: "x".to_string(),
        });
        backend.remove_layer(id);
        backend.schedule_popup_open(id);
        assert!(backend.scheduled_popups().is_empty());
    }
}
