//! One-time lifecycle of the interactive map surface.

use crate::backend::MapBackend;
use crate::core_types::LatLng;
use crate::error::{MapError, Result};
use crate::layers::LayerSet;

/// Default view: country-level framing of the deployment region.
pub const DEFAULT_CENTER: LatLng = LatLng { lat: 20.0, lng: 78.0 };
/// Default zoom for the initial country-level view.
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Base-surface configuration handed to the substrate once at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub max_zoom: f64,
    pub tile_url: String,
    pub attribution: String,
    /// Corner for the zoom control widget.
    pub zoom_control_position: ControlPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            max_zoom: 19.0,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            zoom_control_position: ControlPosition::BottomRight,
        }
    }
}

/// Owns the mapping substrate for the life of one view.
///
/// Created once, torn down once. After [`MapSession::teardown`] every
/// operation fails with [`MapError::SessionClosed`]; the guard also makes a
/// second teardown a no-op and prevents re-creation on the same handle.
#[derive(Debug)]
pub struct MapSession<B: MapBackend> {
    backend: B,
    layers: LayerSet,
    open: bool,
}

impl<B: MapBackend> MapSession<B> {
    /// Create the surface. A substrate failure is fatal for the
    /// visualization and surfaces as [`MapError::SessionCreation`].
    pub fn create(mut backend: B, config: &MapConfig) -> Result<Self> {
        backend.init_surface(config)?;
        tracing::debug!(center = %config.center, zoom = config.zoom, "map session created");
        Ok(MapSession {
            backend,
            layers: LayerSet::default(),
            open: true,
        })
    }

    /// Whether the surface is live; false after teardown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Mutable substrate access, guarded by the lifecycle state.
    pub fn backend_mut(&mut self) -> Result<&mut B> {
        if self.open {
            Ok(&mut self.backend)
        } else {
            Err(MapError::SessionClosed)
        }
    }

    /// Read-only substrate access, guarded by the lifecycle state.
    pub fn backend(&self) -> Result<&B> {
        if self.open {
            Ok(&self.backend)
        } else {
            Err(MapError::SessionClosed)
        }
    }

    /// Number of layers in the currently installed set.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Remove every layer of the installed set from the surface, leaving the
    /// immutable base map. Start of each reconciliation pass.
    pub fn clear_layers(&mut self) -> Result<()> {
        if !self.open {
            return Err(MapError::SessionClosed);
        }
        for id in self.layers.drain() {
            self.backend.remove_layer(id);
        }
        Ok(())
    }

    /// Install the layer set built by the current pass, replacing the (now
    /// empty) previous one.
    pub fn install_layers(&mut self, layers: LayerSet) -> Result<()> {
        if !self.open {
            return Err(MapError::SessionClosed);
        }
        self.layers = layers;
        Ok(())
    }

    /// Consume the session and hand the substrate handle back, e.g. to
    /// inspect a recording backend after teardown.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Dispose the surface. Idempotent; discards pending popup-open
    /// callbacks so none fire against a dead surface.
    pub fn teardown(&mut self) {
        if !self.open {
            return;
        }
        self.backend.cancel_scheduled_popups();
        self.layers.clear();
        self.backend.dispose_surface();
        self.open = false;
        tracing::debug!("map session torn down");
    }
}
