use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    error::{CodecError, RestoreError, ValidationError},
    session_record::{SessionExtra, SessionKind, SessionMetrics, SessionRecord, SessionSpec},
};

/// Storage shape of one session. The kind tag is what lets restore pick the variant,
/// id and derived values are written for readers of the blob and ignored on restore.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    kind: SessionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(with = "lat_lng")]
    location: Point,
    distance_km: f64,
    duration_min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence_spm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pace_min_per_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elevation_gain_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    speed_kmh: Option<f64>,
}

impl From<&SessionRecord> for StoredSession {
    fn from(record: &SessionRecord) -> Self {
        let mut stored = StoredSession {
            kind: record.kind(),
            id: Some(record.id.clone()),
            created_at: record.created_at,
            location: record.location,
            distance_km: record.distance_km,
            duration_min: record.duration_min,
            description: Some(record.description.clone()),
            cadence_spm: None,
            pace_min_per_km: None,
            elevation_gain_m: None,
            speed_kmh: None,
        };

        match record.metrics {
            SessionMetrics::Run { cadence_spm, pace_min_per_km } => {
                stored.cadence_spm = Some(cadence_spm);
                stored.pace_min_per_km = Some(pace_min_per_km);
            }
            SessionMetrics::Ride { elevation_gain_m, speed_kmh } => {
                stored.elevation_gain_m = Some(elevation_gain_m);
                stored.speed_kmh = Some(speed_kmh);
            }
        }

        stored
    }
}

#[derive(Debug, Error)]
enum EntryError {
    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{kind} session is missing {field}")]
    MissingField { kind: SessionKind, field: &'static str },
    #[error("{0}")]
    Invalid(#[from] ValidationError),
}

impl StoredSession {
    fn into_record(self) -> Result<SessionRecord, EntryError> {
        let extra = match self.kind {
            SessionKind::Running => SessionExtra::Run {
                cadence_spm: self.cadence_spm.ok_or(EntryError::MissingField { kind: self.kind, field: "cadenceSpm" })?,
            },
            SessionKind::Cycling => SessionExtra::Ride {
                elevation_gain_m: self.elevation_gain_m.ok_or(EntryError::MissingField { kind: self.kind, field: "elevationGainM" })?,
            },
        };

        let spec = SessionSpec {
            location: self.location,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            extra,
        };
        spec.validate()?;

        // Same path as a fresh session, so id and derived values are recomputed
        Ok(SessionRecord::new(self.created_at, spec))
    }
}

pub fn serialize(records: &[SessionRecord]) -> Result<Vec<u8>, CodecError> {
    let stored: Vec<StoredSession> = records.iter().map(StoredSession::from).collect();
    Ok(serde_json::to_vec(&stored)?)
}

/// Fails only when the blob is not a list at all. Single entries that cannot be restored are
/// skipped and logged.
pub fn deserialize(blob: &[u8]) -> Result<Vec<SessionRecord>, RestoreError> {
    let entries: Vec<Value> = serde_json::from_slice(blob)?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let restored = serde_json::from_value::<StoredSession>(entry)
            .map_err(EntryError::from)
            .and_then(StoredSession::into_record);

        match restored {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!("Skipping stored session #{}: {}", index, err),
        }
    }

    Ok(records)
}

mod lat_lng {
    use geo_types::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(point: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        [point.y(), point.x()].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let [latitude, longitude] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Point::new(longitude, latitude))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap()
    }

    fn sample() -> Vec<SessionRecord> {
        vec![
            SessionRecord::new(at(1_712_312_345_678), SessionSpec::run(40.0, -3.0, 5.0, 25.0, 170.0)),
            SessionRecord::new(at(1_712_312_999_000), SessionSpec::ride(40.1, -3.1, 20.0, 60.0, 150.0)),
        ]
    }

    #[test]
    fn round_trip_keeps_order_and_values() {
        let records = sample();
        let blob = serialize(&records).unwrap();
        assert_eq!(deserialize(&blob).unwrap(), records);
    }

    #[test]
    fn blob_carries_kind_tag_and_lat_lng() {
        let blob = serialize(&sample()).unwrap();
        let value: Value = serde_json::from_slice(&blob).unwrap();

        assert_eq!(value[0]["kind"], "running");
        assert_eq!(value[0]["location"], json!([40.0, -3.0]));
        assert_eq!(value[0]["cadenceSpm"], 170.0);
        assert_eq!(value[1]["kind"], "cycling");
        assert_eq!(value[1]["elevationGainM"], 150.0);
        assert!(value[1].get("cadenceSpm").is_none());
    }

    #[test]
    fn stored_derived_values_are_recomputed() {
        let blob = json!([{
            "kind": "running",
            "id": "bogus",
            "createdAt": "2024-04-05T10:30:00Z",
            "location": [40.0, -3.0],
            "distanceKm": 5.0,
            "durationMin": 25.0,
            "description": "Walking on Mars",
            "cadenceSpm": 170.0,
            "paceMinPerKm": 99.0
        }]);

        let records = deserialize(blob.to_string().as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pace_min_per_km(), Some(5.0));
        assert_eq!(records[0].description, "Running on April 5");
        assert_eq!(records[0].id, "2313000000");
    }

    #[test]
    fn short_kind_names_are_accepted() {
        let blob = json!([{
            "kind": "ride",
            "createdAt": "2024-04-05T10:30:00Z",
            "location": [40.0, -3.0],
            "distanceKm": 30.0,
            "durationMin": 90.0,
            "elevationGainM": 0.0
        }]);

        let records = deserialize(blob.to_string().as_bytes()).unwrap();
        assert_eq!(records[0].kind(), SessionKind::Cycling);
        assert_eq!(records[0].speed_kmh(), Some(20.0));
    }

    #[test]
    fn broken_entries_are_skipped() {
        let blob = json!([
            { "kind": "swimming", "createdAt": "2024-04-05T10:30:00Z", "location": [1.0, 1.0], "distanceKm": 1.0, "durationMin": 1.0 },
            { "kind": "running", "createdAt": "2024-04-05T10:30:00Z", "location": [1.0, 1.0], "distanceKm": 1.0, "durationMin": 1.0 },
            { "kind": "running", "createdAt": "2024-04-05T10:30:00Z", "location": [1.0, 1.0], "distanceKm": 0.0, "durationMin": 1.0, "cadenceSpm": 150.0 },
            { "kind": "running", "createdAt": "2024-04-05T10:31:00Z", "location": [1.0, 1.0], "distanceKm": 2.0, "durationMin": 10.0, "cadenceSpm": 150.0 }
        ]);

        let records = deserialize(blob.to_string().as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].distance_km, 2.0);
    }

    #[test]
    fn malformed_blob_is_an_error() {
        assert!(deserialize(b"not json").is_err());
        assert!(deserialize(b"{\"kind\":\"running\"}").is_err());
        assert!(deserialize(b"").is_err());
    }

    #[test]
    fn empty_list_restores_nothing() {
        assert!(deserialize(b"[]").unwrap().is_empty());
        assert_eq!(serialize(&[]).unwrap(), b"[]");
    }

    fn spec_strategy() -> impl Strategy<Value = SessionSpec> {
        let base = (-90.0..=90.0f64, -180.0..=180.0f64, 0.1..500.0f64, 1.0..1000.0f64);
        prop_oneof![
            (base.clone(), 1.0..250.0f64).prop_map(|((lat, lng, dist, dur), cadence)| SessionSpec::run(lat, lng, dist, dur, cadence)),
            (base, 0.0..5000.0f64).prop_map(|((lat, lng, dist, dur), elevation)| SessionSpec::ride(lat, lng, dist, dur, elevation)),
        ]
    }

    proptest! {
        #[test]
        fn round_trip_recomputes_identical_derived_values(
            specs in prop::collection::vec(spec_strategy(), 0..20),
            start in 1_600_000_000_000i64..1_800_000_000_000i64,
        ) {
            let records: Vec<SessionRecord> = specs.into_iter()
                .enumerate()
                .map(|(i, spec)| SessionRecord::new(at(start + i as i64 * 1000), spec))
                .collect();

            let restored = deserialize(&serialize(&records).unwrap()).unwrap();
            prop_assert_eq!(restored, records);
        }
    }
}
