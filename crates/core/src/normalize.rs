//! Coordinate normalization for heterogeneous upstream records.
//!
//! The sensor feed has gone through several firmware generations and carries
//! latitude/longitude under a handful of historical field names (including a
//! misspelling), sometimes as numeric strings, sometimes as a bundled
//! `coords` pair, and occasionally with the two axes transposed. This module
//! resolves all of that into a canonical range-valid [`LatLng`] or rejects
//! the record outright.

use crate::core_types::LatLng;
use serde_json::Value;

/// Latitude field aliases, tried in priority order. First present key wins.
const LAT_ALIASES: [&str; 4] = ["latitude", "lat", "latitute", "Latitude"];

/// Longitude field aliases, tried in priority order. First present key wins.
const LNG_ALIASES: [&str; 4] = ["longitude", "lng", "long", "Longitude"];

/// Heuristic threshold (degrees) for detecting silently transposed axes.
///
/// Deployment-region assumption: true latitudes stay well below 50 while
/// longitudes sit well above it, so a "latitude" above 50 paired with a
/// "longitude" below 50 is almost certainly swapped. Known limitation: data
/// from outside that region near the threshold can be mis-swapped.
const TRANSPOSE_HEURISTIC_DEG: f64 = 50.0;

/// Resolve a raw record into canonical coordinates.
///
/// Returns `None` when either axis is non-numeric after every fallback, or
/// when the pair is still out of range after the one-shot transposition
/// repair. Unresolvable records are logged at debug level and must simply be
/// skipped by callers; they are not an error.
pub fn normalize_record(raw: &Value) -> Option<LatLng> {
    let mut lat = extract_axis(raw, &LAT_ALIASES);
    let mut lng = extract_axis(raw, &LNG_ALIASES);

    // Fallback: a bundled ordered pair replaces both axes at once
    if lat.is_none() && lng.is_none() {
        if let Some(coords) = raw.get("coords").and_then(Value::as_array) {
            if coords.len() >= 2 {
                lat = as_number(&coords[0]);
                lng = as_number(&coords[1]);
            }
        }
    }

    let (Some(lat), Some(lng)) = (lat, lng) else {
        tracing::debug!(record = %raw, "skipping record with unresolvable coordinates");
        return None;
    };

    let fixed = repair_transposition(LatLng::new(lat, lng));
    if !fixed.is_valid() {
        tracing::debug!(lat, lng, "coordinates out of range after transposition repair");
        return None;
    }
    Some(fixed)
}

/// Apply the two transposition repairs: a hard swap when an axis is out of
/// its valid range, otherwise the regional magnitude heuristic.
fn repair_transposition(p: LatLng) -> LatLng {
    let swapped = LatLng::new(p.lng, p.lat);

    if p.lat.abs() > 90.0 || p.lng.abs() > 180.0 {
        return swapped;
    }
    if p.lat.abs() > TRANSPOSE_HEURISTIC_DEG && p.lng.abs() < TRANSPOSE_HEURISTIC_DEG {
        return swapped;
    }
    p
}

/// First non-missing alias wins; a present-but-non-numeric value resolves to
/// `None` without consulting later aliases, mirroring the feed contract.
/// JSON `null` counts as missing.
fn extract_axis(raw: &Value, aliases: &[&str]) -> Option<f64> {
    aliases
        .iter()
        .find_map(|key| raw.get(key).filter(|v| !v.is_null()))
        .and_then(as_number)
}

/// Accept JSON numbers and numeric strings.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_in_range_coordinates_unchanged() {
        let raw = json!({ "latitude": 19.0760, "longitude": 72.8777 });
        let p = normalize_record(&raw).unwrap();
        assert_relative_eq!(p.lat, 19.0760);
        assert_relative_eq!(p.lng, 72.8777);
    }

    #[test]
    fn test_alias_priority() {
        // "latitude" outranks "lat"
        let raw = json!({ "lat": 11.0, "latitude": 12.0, "longitude": 40.0 });
        assert_relative_eq!(normalize_record(&raw).unwrap().lat, 12.0);

        // Misspelled and cased aliases are honored
        let raw = json!({ "latitute": 19.0, "Longitude": 72.0 });
        let p = normalize_record(&raw).unwrap();
        assert_relative_eq!(p.lat, 19.0);
        assert_relative_eq!(p.lng, 72.0);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let raw = json!({ "latitude": "19.0760", "longitude": " 72.8777 " });
        let p = normalize_record(&raw).unwrap();
        assert_relative_eq!(p.lat, 19.0760);
        assert_relative_eq!(p.lng, 72.8777);
    }

    #[test]
    fn test_coords_pair_fallback() {
        let raw = json!({ "coords": [19.0760, 72.8777] });
        let p = normalize_record(&raw).unwrap();
        assert_relative_eq!(p.lat, 19.0760);
        assert_relative_eq!(p.lng, 72.8777);
    }

    #[test]
    fn test_out_of_range_axis_swapped() {
        // Latitude slot holds a longitude-magnitude value
        let raw = json!({ "latitude": 100.0, "longitude": 19.0 });
        let p = normalize_record(&raw).unwrap();
        assert_relative_eq!(p.lat, 19.0);
        assert_relative_eq!(p.lng, 100.0);
    }

    #[test]
    fn test_regional_heuristic_swap() {
        // Both nominally in range but clearly transposed for the region
        let raw = json!({ "latitude": 72.8777, "longitude": 19.0760 });
        let p = normalize_record(&raw).unwrap();
        assert_relative_eq!(p.lat, 19.0760);
        assert_relative_eq!(p.lng, 72.8777);
    }

    #[test]
    fn test_heuristic_leaves_large_longitude_alone() {
        // |lng| >= 50 means the heuristic must not fire
        let raw = json!({ "latitude": 55.7558, "longitude": 37.6173 });
        let p = normalize_record(&raw).unwrap();
        // Moscow trips the heuristic (documented limitation), so pick a pair
        // that does not: lat 55, lng 80.
        let raw2 = json!({ "latitude": 55.0, "longitude": 80.0 });
        let p2 = normalize_record(&raw2).unwrap();
        assert_relative_eq!(p2.lat, 55.0);
        assert_relative_eq!(p2.lng, 80.0);
        // And the Moscow pair was swapped, as the limitation predicts
        assert_relative_eq!(p.lat, 37.6173);
    }

    #[test]
    fn test_unresolvable_when_non_numeric() {
        assert_eq!(normalize_record(&json!({ "latitude": "n/a" })), None);
        assert_eq!(normalize_record(&json!({ "deviceId": "x1" })), None);
        assert_eq!(normalize_record(&json!({ "coords": ["a", "b"] })), None);
    }

    #[test]
    fn test_unresolvable_when_still_out_of_range_after_swap() {
        let raw = json!({ "latitude": 200.0, "longitude": 200.0 });
        assert_eq!(normalize_record(&raw), None);
    }
}
