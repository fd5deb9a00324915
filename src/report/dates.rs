// src/report/dates.rs

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// Layouts observed in upstream payloads, tried in order.
/// Offset-aware forms keep their wall-clock fields: month/year bucketing
/// follows what the upstream wrote, not a normalized UTC instant.
const LENIENT_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f%z", // 2025-08-13T16:52:14.298714-06:00
    "%Y-%m-%dT%H:%M:%S%z",    // 2025-08-13T16:52:14-06:00
    "%Y-%m-%dT%H:%M:%S%.fZ",  // 2025-08-13T16:52:14.298714Z
    "%Y-%m-%dT%H:%M:%SZ",     // 2025-08-13T16:52:14Z
    "%Y-%m-%dT%H:%M:%S%.f",   // 2025-08-13T16:52:14.298714
    "%Y-%m-%dT%H:%M:%S",      // 2025-08-13T16:52:14
];

/// The single layout `creado_el` is expected to carry. Filtering and
/// enrichment use only this one; aggregation uses the lenient list above.
pub const CREADO_EL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Lenient parser for the aggregation path. Never errors: anything
/// unparsable comes back as `None` and the record is simply unbucketable.
pub fn parse_flexible(text: Option<&str>) -> Option<NaiveDateTime> {
    let text = text?;
    if text.is_empty() {
        return None;
    }

    for fmt in LENIENT_FORMATS {
        if fmt.contains("%z") {
            if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
                return Some(dt.naive_local());
            }
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }

    // Generic ISO-8601 fallback, treating a trailing Z as UTC offset.
    let iso = if let Some(stripped) = text.strip_suffix('Z') {
        format!("{stripped}+00:00")
    } else {
        text.to_string()
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&iso) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = iso.parse::<NaiveDateTime>() {
        return Some(dt);
    }

    tracing::debug!("fecha no parseable: {text}");
    None
}

/// Strict parser for `creado_el` on the filter/enrichment path.
pub fn parse_creado_el(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, CREADO_EL_FORMAT).ok()
}

/// Timestamp field an appointment is bucketed by: `fecha` when the key is
/// present (even if null), otherwise `creado_el`.
pub fn event_timestamp(cita: &Value) -> Option<&str> {
    let value = match cita.get("fecha") {
        Some(v) => v,
        None => cita.get("creado_el")?,
    };
    value.as_str()
}
