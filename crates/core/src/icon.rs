//! Marker icon factory.
//!
//! Pure mapping from `(kind, selected, alarm)` to a renderable glyph: an SVG
//! built from a fixed template, base64-encoded into a data URL so the same
//! logical state always yields byte-identical output. Callers cache the
//! result through [`IconCache`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rustc_hash::FxHashMap;

/// Glyph family for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
    FireAlert,
    Device,
    ResponseTeam,
}

/// Full logical state of a marker glyph; the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconSpec {
    pub kind: IconKind,
    pub selected: bool,
    pub alarm_active: bool,
}

/// A renderable marker asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// `data:image/svg+xml;base64,...` URL.
    pub data_url: String,
    /// Rendered width/height in pixels.
    pub size_px: (u32, u32),
    /// Anchor within the image; bottom-center for pin-style glyphs.
    pub anchor_px: (u32, u32),
    /// Popup offset relative to the anchor.
    pub popup_anchor_px: (i32, i32),
}

const SIZE_SELECTED: u32 = 30;
const SIZE_DEFAULT: u32 = 20;

const FIRE_SELECTED_FILL: &str = "#ff0000";
const FIRE_FILL: &str = "#ff6b6b";
const DEVICE_FILL: &str = "#4a90e2";
const TEAM_FILL: &str = "#4a90e2";

// Fixed glyph path data, shared by every size/color variant.
const FLAME_PATH: &str = "M17.66 11.2C17.43 10.9 17.15 10.64 16.89 10.38C16.22 9.78 15.46 9.35 14.82 8.72C13.33 7.26 13 4.85 13.95 3C13 3.23 12.17 3.75 11.46 4.32C8.87 6.4 7.85 10.07 9.07 13.22C9.11 13.32 9.15 13.42 9.15 13.55C9.15 13.77 9 13.97 8.8 14.05C8.57 14.15 8.33 14.09 8.14 13.93C8.08 13.88 8.04 13.83 8 13.76C6.87 12.33 6.69 10.28 7.45 8.64C5.78 10 4.87 12.3 5 14.47C5.06 14.97 5.12 15.47 5.29 15.97C5.43 16.57 5.7 17.17 6 17.7C7.08 19.43 8.95 20.67 10.96 20.92C13.1 21.19 15.39 20.8 17.03 19.32C18.86 17.66 19.5 15 18.56 12.72L18.43 12.46C18.22 12 17.66 11.2 17.66 11.2Z";
const FLAME_CORE_PATH: &str = "M13.5 14.5C13.5 15.3284 12.8284 16 12 16C11.1716 16 10.5 15.3284 10.5 14.5C10.5 13.6716 11.1716 13 12 13C12.8284 13 13.5 13.6716 13.5 14.5Z";
const PERSON_HEAD_PATH: &str = "M12 12C14.2091 12 16 10.2091 16 8C16 5.79086 14.2091 4 12 4C9.79086 4 8 5.79086 8 8C8 10.2091 9.79086 12 12 12Z";
const PERSON_BODY_PATH: &str = "M12 14C9.33 14 4 15.34 4 18V19C4 19.55 4.45 20 5 20H19C19.55 20 20 19.55 20 19V18C20 15.34 14.67 14 12 14Z";

/// Build the glyph for a logical marker state. Pure and deterministic.
pub fn build_icon(spec: IconSpec) -> Icon {
    let size = if spec.selected { SIZE_SELECTED } else { SIZE_DEFAULT };
    let svg = match spec.kind {
        IconKind::FireAlert => {
            let fill = if spec.selected { FIRE_SELECTED_FILL } else { FIRE_FILL };
            format!(
                "<svg width=\"{size}\" height=\"{size}\" viewBox=\"0 0 24 24\" fill=\"none\" xmlns=\"http://www.w3.org/2000/svg\"><path d=\"{FLAME_PATH}\" fill=\"{fill}\"/><path d=\"{FLAME_CORE_PATH}\" fill=\"white\"/></svg>"
            )
        }
        IconKind::Device => {
            let fill = if spec.alarm_active { FIRE_FILL } else { DEVICE_FILL };
            format!(
                "<svg width=\"{size}\" height=\"{size}\" viewBox=\"0 0 24 24\" fill=\"none\" xmlns=\"http://www.w3.org/2000/svg\"><rect x=\"5\" y=\"2\" width=\"14\" height=\"20\" rx=\"2\" stroke=\"{fill}\" stroke-width=\"2\"/><circle cx=\"12\" cy=\"17\" r=\"1\" fill=\"{fill}\"/><rect x=\"9\" y=\"6\" width=\"6\" height=\"8\" rx=\"1\" fill=\"{fill}\" fill-opacity=\"0.3\"/></svg>"
            )
        }
        IconKind::ResponseTeam => format!(
            "<svg width=\"{size}\" height=\"{size}\" viewBox=\"0 0 24 24\" fill=\"none\" xmlns=\"http://www.w3.org/2000/svg\"><path d=\"{PERSON_HEAD_PATH}\" fill=\"{TEAM_FILL}\"/><path d=\"{PERSON_BODY_PATH}\" fill=\"{TEAM_FILL}\"/></svg>"
        ),
    };

    // The fire glyph keeps a fixed popup offset regardless of size; the
    // other glyphs hang the popup just above their own height.
    let popup_anchor_px = match spec.kind {
        IconKind::FireAlert => (0, -(SIZE_SELECTED as i32)),
        IconKind::Device | IconKind::ResponseTeam => (0, -(size as i32)),
    };

    Icon {
        data_url: format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)),
        size_px: (size, size),
        anchor_px: (size / 2, size),
        popup_anchor_px,
    }
}

/// Memoizing wrapper around [`build_icon`].
///
/// The data URL is content-addressable by its [`IconSpec`], so one build per
/// logical state is enough for the life of the reconciler.
#[derive(Debug, Default)]
pub struct IconCache {
    cache: FxHashMap<IconSpec, Icon>,
}

impl IconCache {
    pub fn new() -> Self {
        IconCache::default()
    }

    /// Fetch (building on first use) the icon for a logical state.
    pub fn get(&mut self, spec: IconSpec) -> &Icon {
        self.cache.entry(spec).or_insert_with(|| build_icon(spec))
    }

    /// Number of distinct glyphs built so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
