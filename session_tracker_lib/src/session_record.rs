use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::error::{SessionField, ValidationError, ValidationReason};

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const ID_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[serde(alias = "run")]
    Running,
    #[serde(alias = "ride")]
    Cycling,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Running => "running",
            SessionKind::Cycling => "cycling",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Running => "Running",
            SessionKind::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SessionKind::Running => "🏃‍♂️",
            SessionKind::Cycling => "🚴‍♀️",
        }
    }

    /// Style tag handed to the map when placing a marker popup.
    pub fn popup_style(&self) -> &'static str {
        match self {
            SessionKind::Running => "running-popup",
            SessionKind::Cycling => "cycling-popup",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The variant specific input of a new session. Also decides the kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionExtra {
    Run { cadence_spm: f64 },
    Ride { elevation_gain_m: f64 },
}

impl SessionExtra {
    pub fn kind(&self) -> SessionKind {
        match self {
            SessionExtra::Run { .. } => SessionKind::Running,
            SessionExtra::Ride { .. } => SessionKind::Cycling,
        }
    }
}

/// Already parsed user input for a new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSpec {
    pub location: Point,
    pub distance_km: f64,
    pub duration_min: f64,
    pub extra: SessionExtra,
}

impl SessionSpec {
    pub fn run(latitude: f64, longitude: f64, distance_km: f64, duration_min: f64, cadence_spm: f64) -> Self {
        Self {
            location: Point::new(longitude, latitude),
            distance_km,
            duration_min,
            extra: SessionExtra::Run { cadence_spm },
        }
    }

    pub fn ride(latitude: f64, longitude: f64, distance_km: f64, duration_min: f64, elevation_gain_m: f64) -> Self {
        Self {
            location: Point::new(longitude, latitude),
            distance_km,
            duration_min,
            extra: SessionExtra::Ride { elevation_gain_m },
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.extra.kind()
    }

    /// Numbers must be finite. Distance, duration and cadence must be strictly positive,
    /// elevation gain may be zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(SessionField::Latitude, self.location.y(), -90.0, 90.0)?;
        check_range(SessionField::Longitude, self.location.x(), -180.0, 180.0)?;
        check_positive(SessionField::Distance, self.distance_km)?;
        check_positive(SessionField::Duration, self.duration_min)?;

        match self.extra {
            SessionExtra::Run { cadence_spm } => check_positive(SessionField::Cadence, cadence_spm),
            SessionExtra::Ride { elevation_gain_m } => {
                check_finite(SessionField::ElevationGain, elevation_gain_m)?;
                if elevation_gain_m < 0.0 {
                    return Err(ValidationError::new(SessionField::ElevationGain, ValidationReason::Negative));
                }
                Ok(())
            }
        }
    }
}

fn check_finite(field: SessionField, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(field, ValidationReason::NotFinite))
    }
}

fn check_positive(field: SessionField, value: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, ValidationReason::NotPositive))
    }
}

fn check_range(field: SessionField, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(field, ValidationReason::OutOfRange))
    }
}

/// Variant data of a session, including the values derived from it at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionMetrics {
    Run { cadence_spm: f64, pace_min_per_km: f64 },
    Ride { elevation_gain_m: f64, speed_kmh: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub location: Point,
    pub distance_km: f64,
    pub duration_min: f64,
    pub description: String,
    pub metrics: SessionMetrics,
}

impl SessionRecord {
    /// Builds the record and its derived fields. Does not validate, see [`SessionSpec::validate`].
    /// The description names the UTC calendar date of `created_at`, whatever the local zone.
    pub fn new(created_at: DateTime<Utc>, spec: SessionSpec) -> Self {
        let metrics = match spec.extra {
            SessionExtra::Run { cadence_spm } => SessionMetrics::Run {
                cadence_spm,
                pace_min_per_km: spec.duration_min / spec.distance_km,
            },
            SessionExtra::Ride { elevation_gain_m } => SessionMetrics::Ride {
                elevation_gain_m,
                speed_kmh: spec.distance_km / (spec.duration_min / 60.0),
            },
        };

        Self {
            id: session_id(created_at),
            created_at,
            location: spec.location,
            distance_km: spec.distance_km,
            duration_min: spec.duration_min,
            description: describe(spec.kind(), created_at),
            metrics,
        }
    }

    pub fn kind(&self) -> SessionKind {
        match self.metrics {
            SessionMetrics::Run { .. } => SessionKind::Running,
            SessionMetrics::Ride { .. } => SessionKind::Cycling,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.metrics {
            SessionMetrics::Run { pace_min_per_km, .. } => Some(pace_min_per_km),
            SessionMetrics::Ride { .. } => None,
        }
    }

    pub fn speed_kmh(&self) -> Option<f64> {
        match self.metrics {
            SessionMetrics::Ride { speed_kmh, .. } => Some(speed_kmh),
            SessionMetrics::Run { .. } => None,
        }
    }

    /// The input this record was built from.
    pub fn spec(&self) -> SessionSpec {
        let extra = match self.metrics {
            SessionMetrics::Run { cadence_spm, .. } => SessionExtra::Run { cadence_spm },
            SessionMetrics::Ride { elevation_gain_m, .. } => SessionExtra::Ride { elevation_gain_m },
        };

        SessionSpec {
            location: self.location,
            distance_km: self.distance_km,
            duration_min: self.duration_min,
            extra,
        }
    }

    pub fn popup_text(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }

    /// One line for the session list.
    pub fn summary(&self) -> String {
        let details = match self.metrics {
            SessionMetrics::Run { cadence_spm, pace_min_per_km } => format!("⚡️ {:.1} min/km, 🦶🏼 {} spm", pace_min_per_km, cadence_spm),
            SessionMetrics::Ride { elevation_gain_m, speed_kmh } => format!("⚡️ {:.1} km/h, ⛰ {} m", speed_kmh, elevation_gain_m),
        };

        format!("{} {} km, ⏱ {} min, {}", self.kind().icon(), self.distance_km, self.duration_min, details)
    }
}

pub fn session_id(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(ID_DIGITS);
    millis[start..].to_string()
}

fn describe(kind: SessionKind, created_at: DateTime<Utc>) -> String {
    format!("{} on {} {}", kind.label(), MONTHS[created_at.month0() as usize], created_at.day())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().unwrap()
    }

    #[test]
    fn run_derives_pace_and_description() {
        let created = Utc.with_ymd_and_hms(2024, 4, 5, 10, 30, 0).unwrap();
        let record = SessionRecord::new(created, SessionSpec::run(40.0, -3.0, 5.0, 25.0, 170.0));

        assert_eq!(record.kind(), SessionKind::Running);
        assert_eq!(record.pace_min_per_km(), Some(5.0));
        assert_eq!(record.speed_kmh(), None);
        assert_eq!(record.description, "Running on April 5");
        assert_eq!(record.latitude(), 40.0);
        assert_eq!(record.longitude(), -3.0);
    }

    #[test]
    fn ride_derives_speed_and_description() {
        let created = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let record = SessionRecord::new(created, SessionSpec::ride(40.1, -3.1, 20.0, 60.0, 150.0));

        assert_eq!(record.kind(), SessionKind::Cycling);
        assert_eq!(record.speed_kmh(), Some(20.0));
        assert_eq!(record.description, "Cycling on December 31");
        assert_eq!(record.popup_text(), "🚴‍♀️ Cycling on December 31");
    }

    #[test]
    fn id_is_last_ten_digits_of_millis() {
        assert_eq!(session_id(at(1_712_312_345_678)), "2312345678");
        assert_eq!(session_id(at(12_345)), "12345");
        assert_eq!(session_id(at(1_700_000_000_000)), "0000000000");
    }

    #[test]
    fn spec_round_trips_through_record() {
        let spec = SessionSpec::ride(55.0, 9.0, 12.5, 40.0, 0.0);
        let record = SessionRecord::new(at(1_700_000_000_000), spec);
        assert_eq!(record.spec(), spec);
    }

    #[test]
    fn summary_formats_derived_value_to_one_decimal() {
        let record = SessionRecord::new(at(1_700_000_000_000), SessionSpec::run(1.0, 1.0, 3.0, 20.0, 160.0));
        assert_eq!(record.summary(), "🏃‍♂️ 3 km, ⏱ 20 min, ⚡️ 6.7 min/km, 🦶🏼 160 spm");
    }

    #[rstest]
    #[case(SessionSpec::run(40.0, -3.0, 0.0, 25.0, 170.0), SessionField::Distance, ValidationReason::NotPositive)]
    #[case(SessionSpec::run(40.0, -3.0, 5.0, -1.0, 170.0), SessionField::Duration, ValidationReason::NotPositive)]
    #[case(SessionSpec::run(40.0, -3.0, 5.0, 25.0, 0.0), SessionField::Cadence, ValidationReason::NotPositive)]
    #[case(SessionSpec::run(40.0, -3.0, f64::NAN, 25.0, 170.0), SessionField::Distance, ValidationReason::NotFinite)]
    #[case(SessionSpec::ride(40.0, -3.0, 5.0, f64::INFINITY, 10.0), SessionField::Duration, ValidationReason::NotFinite)]
    #[case(SessionSpec::ride(40.0, -3.0, 5.0, 25.0, -1.0), SessionField::ElevationGain, ValidationReason::Negative)]
    #[case(SessionSpec::ride(40.0, -3.0, 5.0, 25.0, f64::NAN), SessionField::ElevationGain, ValidationReason::NotFinite)]
    #[case(SessionSpec::ride(91.0, -3.0, 5.0, 25.0, 10.0), SessionField::Latitude, ValidationReason::OutOfRange)]
    #[case(SessionSpec::ride(40.0, 181.0, 5.0, 25.0, 10.0), SessionField::Longitude, ValidationReason::OutOfRange)]
    fn rejects_invalid_input(#[case] spec: SessionSpec, #[case] field: SessionField, #[case] reason: ValidationReason) {
        assert_eq!(spec.validate(), Err(ValidationError::new(field, reason)));
    }

    #[test]
    fn zero_elevation_gain_is_valid() {
        assert_eq!(SessionSpec::ride(40.0, -3.0, 5.0, 25.0, 0.0).validate(), Ok(()));
    }
}
