//! Mapping of API-shaped reservation records into engine value types.
//!
//! Records arrive with every field optional, exactly as the GraphQL API returns
//! them. Nothing past this module sees a nullable timestamp: records that can't
//! be turned into a valid [`TimeRange`] are dropped here with a debug log.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constraint::IntervalConstraint;
use crate::range::{BufferedInterval, Buffers, TimeRange};
use crate::reservation_type::ReservationType;
use crate::types::ReservationStartInterval;

/// A reservation as returned by the API.
///
/// Buffer times are in seconds; timestamps are RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pk: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begins_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,

    /// Raw type string; unknown values are treated as a normal reservation.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub reservation_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_time_before: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_time_after: Option<i64>,
}

impl ReservationRecord {
    /// The parsed reservation type, falling back to [`ReservationType::Normal`].
    pub fn reservation_type(&self) -> ReservationType {
        match self.reservation_type.as_deref().map(str::parse::<ReservationType>) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                debug!(pk = ?self.pk, error = %e, "treating unknown reservation type as normal");
                ReservationType::Normal
            }
            None => ReservationType::Normal,
        }
    }
}

/// The raw query result for a unit: its own reservations plus those on other
/// units configured to affect it (shared spaces and resources).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectingReservations {
    #[serde(default)]
    pub reservations: Vec<ReservationRecord>,

    #[serde(default)]
    pub affecting_reservations: Vec<ReservationRecord>,
}

/// The scheduling configuration of a reservation unit, as returned by the API.
///
/// Durations and buffers are in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReservationUnitConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_reservation_duration: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_reservation_duration: Option<i64>,

    pub reservation_start_interval: ReservationStartInterval,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_time_before: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_time_after: Option<i64>,
}

impl ReservationUnitConfig {
    /// Duration bounds and start granularity for new reservations.
    ///
    /// Values too large for a `Duration` saturate.
    pub fn constraint(&self) -> IntervalConstraint {
        IntervalConstraint {
            min_duration: saturating_seconds(self.min_reservation_duration.unwrap_or(0).max(0)),
            max_duration: self
                .max_reservation_duration
                .filter(|&s| s > 0)
                .map(saturating_seconds),
            start_granularity: self.reservation_start_interval.duration(),
        }
    }

    /// Buffers the unit applies around each new reservation.
    pub fn buffers(&self) -> Buffers {
        Buffers::new(
            saturating_seconds(self.buffer_time_before.unwrap_or(0)),
            saturating_seconds(self.buffer_time_after.unwrap_or(0)),
        )
    }
}

fn saturating_seconds(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(if secs < 0 { Duration::MIN } else { Duration::MAX })
}

/// An existing reservation mapped for collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationInterval {
    pub pk: Option<i64>,
    pub reservation_type: ReservationType,
    pub interval: BufferedInterval,
}

/// Merges a unit's own reservations with the ones affecting it.
///
/// Records are de-duplicated by `pk`: the last record seen for a pk wins but
/// keeps the position of the first. Records without a pk are kept as they are.
pub fn combine_affecting_reservations(raw: &AffectingReservations) -> Vec<ReservationRecord> {
    let mut combined: Vec<ReservationRecord> =
        Vec::with_capacity(raw.reservations.len() + raw.affecting_reservations.len());
    let mut index_by_pk: HashMap<i64, usize> = HashMap::new();

    for record in raw.reservations.iter().chain(&raw.affecting_reservations) {
        if let Some(pk) = record.pk {
            if let Some(&i) = index_by_pk.get(&pk) {
                combined[i] = record.clone();
                continue;
            }
            index_by_pk.insert(pk, combined.len());
        }
        combined.push(record.clone());
    }

    combined
}

/// Maps a record to an interval for collision checks.
///
/// The record's stored buffers are applied unless either the candidate or the
/// record is [`ReservationType::Blocked`]. Returns `None` for records with a
/// missing or unparseable start or end, or an empty or inverted range.
pub fn reservation_to_interval(
    record: &ReservationRecord,
    candidate_type: ReservationType,
) -> Option<ReservationInterval> {
    let Some(start) = record.begins_at.as_deref().and_then(parse_timestamp) else {
        debug!(pk = ?record.pk, begins_at = ?record.begins_at, "skipping reservation without a valid start");
        return None;
    };
    let Some(end) = record.ends_at.as_deref().and_then(parse_timestamp) else {
        debug!(pk = ?record.pk, ends_at = ?record.ends_at, "skipping reservation without a valid end");
        return None;
    };
    let range = match TimeRange::new(start, end) {
        Ok(range) => range,
        Err(e) => {
            debug!(pk = ?record.pk, error = %e, "skipping reservation with an invalid range");
            return None;
        }
    };

    let reservation_type = record.reservation_type();
    let buffers = if candidate_type.is_blocked() || reservation_type.is_blocked() {
        Buffers::ZERO
    } else if let Some(buffers) =
        Buffers::from_seconds(record.buffer_time_before, record.buffer_time_after)
    {
        buffers
    } else {
        debug!(
            pk = ?record.pk,
            before = ?record.buffer_time_before,
            after = ?record.buffer_time_after,
            "skipping reservation with out-of-range buffers"
        );
        return None;
    };

    Some(ReservationInterval {
        pk: record.pk,
        reservation_type,
        interval: BufferedInterval::new(range, buffers),
    })
}

/// Maps every well-formed record, dropping the rest.
pub fn reservations_to_intervals(
    records: &[ReservationRecord],
    candidate_type: ReservationType,
) -> Vec<ReservationInterval> {
    records
        .iter()
        .filter_map(|r| reservation_to_interval(r, candidate_type))
        .collect()
}

/// The candidate's own interval: the unit's buffers, or none for a blocked candidate.
pub fn candidate_interval(
    range: TimeRange,
    unit: &ReservationUnitConfig,
    candidate_type: ReservationType,
) -> BufferedInterval {
    if candidate_type.is_blocked() {
        BufferedInterval::from(range)
    } else {
        BufferedInterval::new(range, unit.buffers())
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn record(pk: i64, begins: &str, ends: &str) -> ReservationRecord {
        ReservationRecord {
            pk: Some(pk),
            begins_at: Some(begins.to_string()),
            ends_at: Some(ends.to_string()),
            ..ReservationRecord::default()
        }
    }

    #[test]
    fn record_deserializes_from_api_json() {
        let json = r#"{
            "pk": 42,
            "beginsAt": "2024-06-03T11:00:00+00:00",
            "endsAt": "2024-06-03T12:00:00+00:00",
            "type": "BLOCKED",
            "bufferTimeBefore": 900,
            "bufferTimeAfter": null
        }"#;
        let parsed: ReservationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.pk, Some(42));
        assert_eq!(parsed.reservation_type(), ReservationType::Blocked);
        assert_eq!(parsed.buffer_time_before, Some(900));
        assert_eq!(parsed.buffer_time_after, None);
    }

    #[test]
    fn unknown_type_falls_back_to_normal() {
        let mut r = record(1, "2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z");
        r.reservation_type = Some("MYSTERY".to_string());
        assert_eq!(r.reservation_type(), ReservationType::Normal);
    }

    #[test]
    fn maps_record_with_buffers() {
        let mut r = record(5, "2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z");
        r.buffer_time_before = Some(600);
        r.buffer_time_after = Some(1800);

        let mapped = reservation_to_interval(&r, ReservationType::Normal).unwrap();
        assert_eq!(mapped.pk, Some(5));
        assert_eq!(mapped.interval.range.start(), at(10, 0));
        assert_eq!(mapped.interval.range.end(), at(11, 0));
        assert_eq!(mapped.interval.buffers.before(), Duration::minutes(10));
        assert_eq!(mapped.interval.buffers.after(), Duration::minutes(30));
    }

    #[test]
    fn blocked_record_has_no_buffers() {
        let mut r = record(5, "2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z");
        r.reservation_type = Some("BLOCKED".to_string());
        r.buffer_time_after = Some(1800);

        let mapped = reservation_to_interval(&r, ReservationType::Normal).unwrap();
        assert!(mapped.interval.buffers.is_zero());
    }

    #[test]
    fn blocked_candidate_zeroes_existing_buffers() {
        let mut r = record(5, "2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z");
        r.buffer_time_after = Some(1800);

        let mapped = reservation_to_interval(&r, ReservationType::Blocked).unwrap();
        assert!(mapped.interval.buffers.is_zero());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let r = record(1, "2024-06-03T13:00:00+03:00", "2024-06-03T14:00:00+03:00");
        let mapped = reservation_to_interval(&r, ReservationType::Normal).unwrap();
        assert_eq!(mapped.interval.range.start(), at(10, 0));
    }

    #[test]
    fn malformed_records_map_to_none() {
        let missing_end = ReservationRecord {
            pk: Some(1),
            begins_at: Some("2024-06-03T10:00:00Z".to_string()),
            ..ReservationRecord::default()
        };
        assert!(reservation_to_interval(&missing_end, ReservationType::Normal).is_none());

        let garbage = record(2, "yesterday", "2024-06-03T11:00:00Z");
        assert!(reservation_to_interval(&garbage, ReservationType::Normal).is_none());

        let inverted = record(3, "2024-06-03T12:00:00Z", "2024-06-03T11:00:00Z");
        assert!(reservation_to_interval(&inverted, ReservationType::Normal).is_none());

        let empty = record(4, "2024-06-03T12:00:00Z", "2024-06-03T12:00:00Z");
        assert!(reservation_to_interval(&empty, ReservationType::Normal).is_none());
    }

    #[test]
    fn out_of_range_buffers_map_to_none() {
        let r: ReservationRecord = serde_json::from_str(
            r#"{
                "pk": 8,
                "beginsAt": "2024-06-03T10:00:00Z",
                "endsAt": "2024-06-03T11:00:00Z",
                "bufferTimeAfter": 9223372036854775807
            }"#,
        )
        .unwrap();
        assert!(reservation_to_interval(&r, ReservationType::Normal).is_none());

        // Blocked records never read their buffers.
        let blocked = ReservationRecord {
            reservation_type: Some("BLOCKED".to_string()),
            ..r
        };
        assert!(reservation_to_interval(&blocked, ReservationType::Normal).is_some());
    }

    #[test]
    fn record_without_pk_still_maps() {
        let mut r = record(0, "2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z");
        r.pk = None;
        let mapped = reservation_to_interval(&r, ReservationType::Normal).unwrap();
        assert_eq!(mapped.pk, None);
    }

    #[test]
    fn combine_deduplicates_by_pk() {
        let raw = AffectingReservations {
            reservations: vec![
                record(1, "2024-06-03T09:00:00Z", "2024-06-03T10:00:00Z"),
                record(2, "2024-06-03T10:00:00Z", "2024-06-03T11:00:00Z"),
            ],
            affecting_reservations: vec![
                record(2, "2024-06-03T10:00:00Z", "2024-06-03T11:30:00Z"),
                record(3, "2024-06-03T12:00:00Z", "2024-06-03T13:00:00Z"),
            ],
        };

        let combined = combine_affecting_reservations(&raw);
        let pks: Vec<_> = combined.iter().map(|r| r.pk).collect();
        assert_eq!(pks, vec![Some(1), Some(2), Some(3)]);
        // Last seen wins
        assert_eq!(
            combined[1].ends_at.as_deref(),
            Some("2024-06-03T11:30:00Z")
        );
    }

    #[test]
    fn combine_keeps_records_without_pk() {
        let mut anonymous = record(0, "2024-06-03T09:00:00Z", "2024-06-03T10:00:00Z");
        anonymous.pk = None;
        let raw = AffectingReservations {
            reservations: vec![anonymous.clone()],
            affecting_reservations: vec![anonymous],
        };
        assert_eq!(combine_affecting_reservations(&raw).len(), 2);
    }

    #[test]
    fn affecting_reservations_deserialize_with_missing_lists() {
        let raw: AffectingReservations =
            serde_json::from_str(r#"{"reservations":[{"pk":1}]}"#).unwrap();
        assert_eq!(raw.reservations.len(), 1);
        assert!(raw.affecting_reservations.is_empty());

        // A pk-only record has no range and is dropped during mapping.
        let combined = combine_affecting_reservations(&raw);
        assert!(reservations_to_intervals(&combined, ReservationType::Normal).is_empty());
    }

    #[test]
    fn unit_config_constraint_and_buffers() {
        let unit: ReservationUnitConfig = serde_json::from_str(
            r#"{
                "minReservationDuration": 3600,
                "maxReservationDuration": 10800,
                "reservationStartInterval": "INTERVAL_30_MINS",
                "bufferTimeBefore": 900
            }"#,
        )
        .unwrap();

        let constraint = unit.constraint();
        assert_eq!(constraint.min_duration, Duration::hours(1));
        assert_eq!(constraint.max_duration, Some(Duration::hours(3)));
        assert_eq!(constraint.start_granularity, Duration::minutes(30));

        let buffers = unit.buffers();
        assert_eq!(buffers.before(), Duration::minutes(15));
        assert_eq!(buffers.after(), Duration::zero());
    }

    #[test]
    fn unit_config_saturates_huge_values() {
        let unit = ReservationUnitConfig {
            min_reservation_duration: Some(i64::MAX),
            max_reservation_duration: Some(i64::MAX),
            buffer_time_before: Some(i64::MIN),
            buffer_time_after: Some(i64::MAX),
            ..ReservationUnitConfig::default()
        };

        let constraint = unit.constraint();
        assert_eq!(constraint.min_duration, Duration::MAX);
        assert_eq!(constraint.max_duration, Some(Duration::MAX));
        assert!(constraint.min_reservation(at(10, 0)).is_none());

        let buffers = unit.buffers();
        assert_eq!(buffers.before(), Duration::zero());
        assert_eq!(buffers.after(), Duration::MAX);
    }

    #[test]
    fn unit_config_defaults() {
        let unit = ReservationUnitConfig::default();
        let constraint = unit.constraint();
        assert_eq!(constraint.min_duration, Duration::zero());
        assert_eq!(constraint.max_duration, None);
        assert_eq!(constraint.start_granularity, Duration::minutes(15));
    }

    #[test]
    fn candidate_interval_uses_unit_buffers_unless_blocked() {
        let unit = ReservationUnitConfig {
            buffer_time_after: Some(900),
            ..ReservationUnitConfig::default()
        };
        let range = TimeRange::new(at(10, 0), at(11, 0)).unwrap();

        let normal = candidate_interval(range, &unit, ReservationType::Normal);
        assert_eq!(normal.buffers.after(), Duration::minutes(15));

        let blocked = candidate_interval(range, &unit, ReservationType::Blocked);
        assert!(blocked.buffers.is_zero());
    }
}
