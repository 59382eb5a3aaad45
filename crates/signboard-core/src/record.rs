use crate::config::Config;
use crate::error::Result;
use crate::types::{days_between, Reason};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// IncidentRecord
// ---------------------------------------------------------------------------

/// The single record behind the sign. Stored as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(default)]
    pub days_since: i64,
    #[serde(default)]
    pub prior_count: i64,
    #[serde(default)]
    pub incident_number: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "lenient_date"
    )]
    pub incident_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "lenient_date"
    )]
    pub prior_incident_date: Option<NaiveDate>,
    #[serde(default)]
    pub reason: Reason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reset: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_counted: Option<NaiveDate>,
}

/// Values submitted through the update form or `signboard update`.
#[derive(Debug, Clone)]
pub struct IncidentUpdate {
    pub incident_number: String,
    pub incident_date: NaiveDate,
    pub reason: Reason,
}

impl IncidentRecord {
    /// The record a fresh install starts from.
    pub fn initial(now: NaiveDateTime) -> Self {
        Self {
            days_since: 1,
            prior_count: 2,
            incident_number: "540".to_string(),
            incident_date: NaiveDate::from_ymd_opt(2025, 10, 3),
            prior_incident_date: NaiveDate::from_ymd_opt(2025, 10, 1),
            reason: Reason::Deploy,
            last_reset: Some(now),
            last_counted: None,
        }
    }

    /// Recompute the derived counters from the stored dates. Counters without
    /// a backing date keep their stored value.
    pub fn refresh(&mut self, today: NaiveDate) {
        if let Some(incident) = self.incident_date {
            self.days_since = days_between(incident, today);
        }
        if let (Some(prior), Some(incident)) = (self.prior_incident_date, self.incident_date) {
            self.prior_count = days_between(prior, incident);
        }
    }

    /// Copy of the record with counters refreshed for `today`.
    pub fn refreshed(&self, today: NaiveDate) -> Self {
        let mut r = self.clone();
        r.refresh(today);
        r
    }

    /// Record a new incident. The previous incident date becomes the prior
    /// one, so `prior_count` is the gap between the last two incidents.
    pub fn apply_update(&mut self, update: IncidentUpdate, now: NaiveDateTime) {
        if let Some(previous) = self.incident_date {
            self.prior_incident_date = Some(previous);
        }
        self.incident_number = update.incident_number;
        self.incident_date = Some(update.incident_date);
        self.reason = update.reason;
        self.last_reset = Some(now);
        self.refresh(now.date());
    }

    /// Advance a date-less counter by the whole days elapsed since it was last
    /// counted. Returns true when the record changed.
    pub fn advance_manual_counter(&mut self, today: NaiveDate) -> bool {
        if self.incident_date.is_some() {
            return false;
        }
        match self.last_counted {
            None => {
                self.last_counted = Some(today);
                true
            }
            Some(last) => {
                let elapsed = days_between(last, today);
                if elapsed <= 0 {
                    return false;
                }
                self.days_since += elapsed;
                self.last_counted = Some(today);
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// JSON file holding the [`IncidentRecord`]. There is no locking; the web
/// handlers and the refresh loop both read-modify-write the same file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_root(root: &Path, config: &Config) -> Self {
        Self::new(config.data_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the record, or the initial record when the file does not exist.
    pub fn load(&self) -> Result<IncidentRecord> {
        if !self.path.exists() {
            return Ok(IncidentRecord::initial(Local::now().naive_local()));
        }
        let data = std::fs::read_to_string(&self.path)?;
        let record: IncidentRecord = serde_json::from_str(&data)?;
        Ok(record)
    }

    pub fn save(&self, record: &IncidentRecord) -> Result<()> {
        let data = serde_json::to_string_pretty(record)?;
        crate::io::atomic_write(&self.path, data.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "saved incident record");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// serde helpers
// ---------------------------------------------------------------------------

/// Dates are written as `YYYY-MM-DD` but read leniently, since hand-edited
/// files sometimes carry a full ISO datetime.
mod lenient_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => crate::types::parse_date(s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(d: NaiveDate) -> NaiveDateTime {
        d.and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn missing_file_loads_initial_record() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        let record = store.load().unwrap();
        assert_eq!(record.incident_number, "540");
        assert_eq!(record.reason, Reason::Deploy);
        assert_eq!(record.incident_date, Some(date(2025, 10, 3)));
        assert!(!store.exists());
    }

    #[test]
    fn save_writes_flat_json() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        let record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        store.save(&record).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["incident_date"], "2025-10-03");
        assert_eq!(raw["reason"], "Deploy");
        assert_eq!(raw["days_since"], 1);
        assert!(raw.get("last_counted").is_none());

        assert_eq!(store.load().unwrap(), record);
    }

    #[test]
    fn loads_file_with_datetime_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{
  "days_since": 4,
  "prior_count": 9,
  "incident_number": "611",
  "incident_date": "2025-11-02T08:15:00",
  "reason": "Missed",
  "last_reset": "2025-11-02T08:16:41.512331"
}"#,
        )
        .unwrap();

        let record = Store::new(&path).load().unwrap();
        assert_eq!(record.incident_date, Some(date(2025, 11, 2)));
        assert_eq!(record.prior_incident_date, None);
        assert_eq!(record.reason, Reason::Missed);
        assert_eq!(record.prior_count, 9);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Store::new(&path).load().is_err());
    }

    #[test]
    fn refresh_derives_counters_from_dates() {
        let mut record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        record.refresh(date(2025, 10, 20));
        assert_eq!(record.days_since, 17);
        assert_eq!(record.prior_count, 2);
    }

    #[test]
    fn refresh_keeps_stored_counters_without_dates() {
        let mut record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        record.incident_date = None;
        record.days_since = 12;
        record.prior_count = 30;
        record.refresh(date(2026, 1, 1));
        assert_eq!(record.days_since, 12);
        assert_eq!(record.prior_count, 30);
    }

    #[test]
    fn apply_update_shifts_incident_date_to_prior() {
        let mut record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        let now = noon(date(2025, 10, 18));
        record.apply_update(
            IncidentUpdate {
                incident_number: "577".to_string(),
                incident_date: date(2025, 10, 15),
                reason: Reason::Change,
            },
            now,
        );

        assert_eq!(record.prior_incident_date, Some(date(2025, 10, 3)));
        assert_eq!(record.incident_date, Some(date(2025, 10, 15)));
        assert_eq!(record.incident_number, "577");
        assert_eq!(record.reason, Reason::Change);
        assert_eq!(record.days_since, 3);
        assert_eq!(record.prior_count, 12);
        assert_eq!(record.last_reset, Some(now));
    }

    #[test]
    fn first_update_without_prior_keeps_prior_count() {
        let mut record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        record.incident_date = None;
        record.prior_incident_date = None;
        record.prior_count = 7;
        record.apply_update(
            IncidentUpdate {
                incident_number: "1".to_string(),
                incident_date: date(2025, 10, 18),
                reason: Reason::Missed,
            },
            noon(date(2025, 10, 18)),
        );
        assert_eq!(record.prior_incident_date, None);
        assert_eq!(record.prior_count, 7);
        assert_eq!(record.days_since, 0);
    }

    #[test]
    fn manual_counter_advances_by_elapsed_days() {
        let mut record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        record.incident_date = None;
        record.days_since = 5;

        assert!(record.advance_manual_counter(date(2025, 10, 10)));
        assert_eq!(record.days_since, 5);
        assert!(!record.advance_manual_counter(date(2025, 10, 10)));
        assert!(record.advance_manual_counter(date(2025, 10, 13)));
        assert_eq!(record.days_since, 8);
        assert_eq!(record.last_counted, Some(date(2025, 10, 13)));
    }

    #[test]
    fn manual_counter_ignored_when_dated() {
        let mut record = IncidentRecord::initial(noon(date(2025, 10, 3)));
        assert!(!record.advance_manual_counter(date(2025, 10, 10)));
        assert_eq!(record.last_counted, None);
    }
}
