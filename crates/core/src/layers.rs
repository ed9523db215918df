//! Layer reconciliation: teardown-and-rebuild of the marker/line/label set.
//!
//! Every trigger (entity snapshot change, selection change, response-team
//! move) runs one synchronous pass: the previous layer set is fully removed,
//! a fresh set is built from the current input, then camera and popup focus
//! rules are applied. No layer survives two input versions, which is what
//! keeps repeated refreshes from leaking map resources.

use crate::backend::{LabelSpec, MapBackend, MarkerSpec, PolylineSpec, SelectTarget};
use crate::core_types::{directions_url, haversine_km, midpoint, Entity, EntityKind, LatLng, Selection};
use crate::error::Result;
use crate::icon::{IconCache, IconKind, IconSpec};
use crate::session::MapSession;

/// Zoom level used when centering on a selected entity.
pub const FOCUS_ZOOM: f64 = 12.0;

/// Connector line styling between the response team and the selection.
const CONNECTOR_COLOR: &str = "#4285f4";
const CONNECTOR_WEIGHT: u32 = 3;
const CONNECTOR_DASH: &str = "5, 10";

/// The layers owned by one reconciliation pass.
///
/// Built fresh each pass and exchanged with the session through an explicit
/// replace, so teardown-before-rebuild is a visible, testable step rather
/// than a hidden mutable collection.
#[derive(Debug, Default)]
pub struct LayerSet {
    ids: Vec<crate::backend::LayerId>,
}

impl LayerSet {
    pub fn push(&mut self, id: crate::backend::LayerId) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, crate::backend::LayerId> {
        self.ids.drain(..)
    }
}

/// Everything one pass consumes. Borrowed from the page controller.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub alerts: &'a [Entity],
    pub devices: &'a [Entity],
    pub selection: &'a Selection,
    pub team_position: Option<LatLng>,
}

impl ReconcileInput<'_> {
    /// Position of the selected entity, if one is selected and resolvable.
    fn selected_position(&self) -> Option<LatLng> {
        match self.selection {
            Selection::None => None,
            Selection::Alert(id) => self
                .alerts
                .iter()
                .find(|a| &a.id == id)
                .and_then(|a| a.position),
            Selection::Device(id) => self
                .devices
                .iter()
                .find(|d| &d.id == id)
                .and_then(|d| d.position),
        }
    }
}

/// Counters reported by one pass, for logging and assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassSummary {
    pub markers: usize,
    pub polylines: usize,
    pub labels: usize,
    /// Entities skipped because their coordinates never resolved.
    pub skipped_unresolvable: usize,
    /// Where the camera was recentered, when a selection had a position.
    pub focused: Option<LatLng>,
}

/// Stateful reconciler; owns the icon cache across passes.
#[derive(Debug, Default)]
pub struct Reconciler {
    icons: IconCache,
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler::default()
    }

    /// Run one full reconciliation pass against the session.
    ///
    /// Synchronous and run-to-completion: when this returns, the previous
    /// layer set is gone and the new one is installed.
    pub fn reconcile<B: MapBackend>(
        &mut self,
        session: &mut MapSession<B>,
        input: &ReconcileInput<'_>,
    ) -> Result<PassSummary> {
        session.clear_layers()?;

        let mut set = LayerSet::default();
        let mut summary = PassSummary::default();
        let mut focus = None;

        // Active-fire alerts
        for alert in input.alerts.iter().filter(|a| a.alarm_active) {
            let Some(pos) = alert.position else {
                summary.skipped_unresolvable += 1;
                continue;
            };
            let selected = input.selection.is_alert(&alert.id);
            let icon = self
                .icons
                .get(IconSpec {
                    kind: IconKind::FireAlert,
                    selected,
                    alarm_active: true,
                })
                .clone();
            let id = session.backend_mut()?.add_marker(MarkerSpec {
                position: pos,
                icon,
                popup_html: alert_popup_html(alert, pos),
                select_target: Some(SelectTarget {
                    kind: EntityKind::Alert,
                    id: alert.id.clone(),
                }),
            });
            set.push(id);
            summary.markers += 1;
            if selected {
                focus = Some((pos, id));
            }
        }

        // Devices
        for device in input.devices {
            let Some(pos) = device.position else {
                summary.skipped_unresolvable += 1;
                continue;
            };
            let selected = input.selection.is_device(&device.id);
            let icon = self
                .icons
                .get(IconSpec {
                    kind: IconKind::Device,
                    selected,
                    alarm_active: device.alarm_active,
                })
                .clone();
            let id = session.backend_mut()?.add_marker(MarkerSpec {
                position: pos,
                icon,
                popup_html: device_popup_html(device, pos),
                select_target: Some(SelectTarget {
                    kind: EntityKind::Device,
                    id: device.id.clone(),
                }),
            });
            set.push(id);
            summary.markers += 1;
            if selected {
                focus = Some((pos, id));
            }
        }

        // Camera focus and popup sequencing. Selection is mutually exclusive,
        // so at most one marker can have requested focus.
        if let Some((pos, marker)) = focus {
            let backend = session.backend_mut()?;
            backend.set_view(pos, FOCUS_ZOOM);
            backend.schedule_popup_open(marker);
            summary.focused = Some(pos);
        }

        // Response team marker, connector line and distance label
        if let Some(team) = input.team_position {
            let icon = self
                .icons
                .get(IconSpec {
                    kind: IconKind::ResponseTeam,
                    selected: false,
                    alarm_active: false,
                })
                .clone();
            let id = session.backend_mut()?.add_marker(MarkerSpec {
                position: team,
                icon,
                popup_html: team_popup_html(team),
                select_target: None,
            });
            set.push(id);
            summary.markers += 1;

            if let Some(target) = input.selected_position() {
                let backend = session.backend_mut()?;
                let line = backend.add_polyline(PolylineSpec {
                    points: vec![team, target],
                    color: CONNECTOR_COLOR.to_string(),
                    weight: CONNECTOR_WEIGHT,
                    dash_array: Some(CONNECTOR_DASH.to_string()),
                });
                set.push(line);
                summary.polylines += 1;

                let distance = haversine_km(team, target);
                let label = backend.add_label(LabelSpec {
                    position: midpoint(team, target),
                    html: format!("<div class=\"distance-popup\">Distance: {distance:.2} km</div>"),
                });
                set.push(label);
                summary.labels += 1;
            }
        }

        session.install_layers(set)?;
        tracing::debug!(
            markers = summary.markers,
            polylines = summary.polylines,
            labels = summary.labels,
            skipped = summary.skipped_unresolvable,
            "reconciliation pass complete"
        );
        Ok(summary)
    }
}

fn alert_popup_html(alert: &Entity, pos: LatLng) -> String {
    let detected = alert.observed_at.as_deref().unwrap_or("unknown");
    let humidity = alert
        .metrics
        .humidity
        .map(|h| format!("<div><strong>Humidity:</strong> {h}%</div>"))
        .unwrap_or_default();
    format!(
        "<div class=\"popup\"><h3>Fire Alert</h3>\
         <div><strong>Detected:</strong> {detected}</div>\
         <div><strong>Location:</strong> {pos}</div>\
         {humidity}\
         <div><strong>Status:</strong> Active Fire</div>\
         <a href=\"{url}\">Get Directions</a></div>",
        url = directions_url(pos)
    )
}

fn device_popup_html(device: &Entity, pos: LatLng) -> String {
    let updated = device.observed_at.as_deref().unwrap_or("unknown");
    let fmt_metric = |v: Option<f64>, unit: &str| {
        v.map_or_else(|| "n/a".to_string(), |v| format!("{v}{unit}"))
    };
    format!(
        "<div class=\"popup\"><h3>Device: {label}</h3>\
         <div><strong>Last Update:</strong> {updated}</div>\
         <div><strong>Location:</strong> {pos}</div>\
         <div><strong>Temperature:</strong> {temp}</div>\
         <div><strong>Humidity:</strong> {hum}</div>\
         <div><strong>Smoke:</strong> {smoke}</div>\
         <div><strong>Fire Detected:</strong> {fire}</div>\
         <a href=\"{url}\">Get Directions</a></div>",
        label = device.display_label(),
        temp = fmt_metric(device.metrics.temperature, "°C"),
        hum = fmt_metric(device.metrics.humidity, "%"),
        smoke = fmt_metric(device.metrics.smoke_ppm, " ppm"),
        fire = if device.alarm_active { "Yes" } else { "No" },
        url = directions_url(pos)
    )
}

fn team_popup_html(pos: LatLng) -> String {
    format!("<div class=\"popup\"><h3>Response Team</h3><div>Location: {pos}</div></div>")
}
