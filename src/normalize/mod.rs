pub mod fields;

pub use fields::{CanonicalField, FieldRule, FIELD_RULES};

use crate::constants::DEFAULT_EMPLOYMENT_TYPE;
use crate::types::{JobSource, NormalizedRecord, RawRecord};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("Failed to compile NON_ALNUM_RE"));

/// Epoch values above this are taken to be milliseconds
const EPOCH_MILLIS_THRESHOLD: u64 = 100_000_000_000;

/// Shorter integers (years, counters) are not treated as epochs
const EPOCH_SECONDS_FLOOR: u64 = 100_000_000;

/// Render a timestamp the way downstream consumers expect: millisecond precision, `Z` suffix
pub fn to_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse the date shapes job boards commonly emit.
/// Anything outside years 0..=9999 is rejected so the result always renders as RFC 3339.
pub fn parse_posted_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_date_shapes(raw.trim()).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_epoch(epoch: i64) -> Option<DateTime<Utc>> {
    let magnitude = epoch.unsigned_abs();
    if magnitude < EPOCH_SECONDS_FLOOR {
        None
    } else if magnitude >= EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch).single()
    } else {
        Utc.timestamp_opt(epoch, 0).single()
    }
}

fn parse_date_shapes(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(epoch) = raw.parse::<i64>() {
        return parse_epoch(epoch);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_DATETIME_FORMATS: [&str; 3] =
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y"];
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
    })
}

/// Deterministic id derived from a title. Identical titles yield identical ids.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_ALNUM_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if !slug.is_empty() {
        return slug.to_string();
    }
    let digest = hex::encode(Sha256::digest(title.as_bytes()));
    format!("job-{}", &digest[..12])
}

/// Maps source-shaped records onto the canonical schema. Holds no state between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct JobNormalizer;

impl JobNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a batch; every record shares the same `processed_at`.
    /// Records without a usable title are dropped.
    pub fn normalize_batch(
        &self,
        raw_records: Vec<RawRecord>,
        source: JobSource,
        processed_at: &DateTime<Utc>,
    ) -> Vec<NormalizedRecord> {
        let processed_at_iso = to_iso(processed_at);
        let input_count = raw_records.len();

        let normalized: Vec<NormalizedRecord> = raw_records
            .into_iter()
            .filter_map(|raw| self.normalize_record(raw, source, &processed_at_iso))
            .collect();

        let dropped = input_count - normalized.len();
        if dropped > 0 {
            debug!("Dropped {} of {} records without a title", dropped, input_count);
        }
        normalized
    }

    /// Normalize one record against an already-rendered batch timestamp
    pub fn normalize_record(
        &self,
        raw: RawRecord,
        source: JobSource,
        processed_at_iso: &str,
    ) -> Option<NormalizedRecord> {
        let Some(title) = fields::resolve(&raw, CanonicalField::Title) else {
            debug!("Skipping record with no resolvable title");
            return None;
        };

        let text = |field| fields::resolve(&raw, field).unwrap_or_default();

        let id = fields::resolve(&raw, CanonicalField::Id).unwrap_or_else(|| slugify(&title));
        let employment_type = fields::resolve(&raw, CanonicalField::EmploymentType)
            .unwrap_or_else(|| DEFAULT_EMPLOYMENT_TYPE.to_string());
        let posted_date = fields::resolve(&raw, CanonicalField::PostedDate)
            .and_then(|d| parse_posted_date(&d))
            .map(|d| to_iso(&d))
            .unwrap_or_else(|| processed_at_iso.to_string());

        Some(NormalizedRecord {
            id,
            department: text(CanonicalField::Department),
            location: text(CanonicalField::Location),
            employment_type,
            description: text(CanonicalField::Description),
            posted_date,
            apply_url: text(CanonicalField::ApplyUrl),
            title,
            source,
            raw_data: raw,
            processed_at: processed_at_iso.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_titleless_records_are_dropped() {
        let raw = vec![
            json!({"title": "Senior Engineer", "id": "j1"}),
            json!({"position_title": "  ", "id": "j2"}),
            json!({"name": "PM", "job_id": "j3"}),
        ];
        let jobs = JobNormalizer::new().normalize_batch(raw, JobSource::Manual, &batch_time());

        assert_eq!(jobs.len(), 2);
        assert_eq!((jobs[0].id.as_str(), jobs[0].title.as_str()), ("j1", "Senior Engineer"));
        assert_eq!((jobs[1].id.as_str(), jobs[1].title.as_str()), ("j3", "PM"));
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let jobs = JobNormalizer::new().normalize_batch(
            vec![json!({"title": "Courier"})],
            JobSource::Scheduled,
            &batch_time(),
        );
        let job = &jobs[0];
        assert_eq!(job.id, "courier");
        assert_eq!(job.department, "");
        assert_eq!(job.location, "");
        assert_eq!(job.description, "");
        assert_eq!(job.apply_url, "");
        assert_eq!(job.employment_type, "Full-time");
        assert_eq!(job.posted_date, "2025-06-01T12:00:00.000Z");
        assert_eq!(job.posted_date, job.processed_at);
        assert_eq!(job.source, JobSource::Scheduled);
        assert_eq!(job.raw_data, json!({"title": "Courier"}));
    }

    #[test]
    fn test_posted_date_precedence_and_parsing() {
        let raw = json!({
            "title": "Nurse",
            "created_at": "2024-02-03T04:05:06+02:00",
            "date_posted": "2023-01-01"
        });
        let job = JobNormalizer::new()
            .normalize_record(raw, JobSource::Webhook, "2025-06-01T12:00:00.000Z")
            .unwrap();
        assert_eq!(job.posted_date, "2024-02-03T02:05:06.000Z");
    }

    #[test]
    fn test_unparseable_date_falls_back_to_batch_time() {
        let raw = json!({"title": "Nurse", "posted_date": "sometime last week"});
        let job = JobNormalizer::new()
            .normalize_record(raw, JobSource::Webhook, "2025-06-01T12:00:00.000Z")
            .unwrap();
        assert_eq!(job.posted_date, "2025-06-01T12:00:00.000Z");
    }

    #[test]
    fn test_parse_posted_date_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_posted_date("2024-03-15"), Some(expected));
        assert_eq!(parse_posted_date("03/15/2024"), Some(expected));
        assert_eq!(parse_posted_date("March 15, 2024"), Some(expected));
        assert_eq!(parse_posted_date("2024-03-15 00:00:00"), Some(expected));
        assert_eq!(parse_posted_date("1710460800"), Some(expected));
        assert_eq!(parse_posted_date("1710460800000"), Some(expected));
        assert_eq!(parse_posted_date("Fri, 15 Mar 2024 00:00:00 +0000"), Some(expected));
        assert_eq!(parse_posted_date(""), None);
        assert_eq!(parse_posted_date("2024-13-45"), None);
    }

    #[test]
    fn test_parse_posted_date_rejects_out_of_range_epochs() {
        assert_eq!(parse_posted_date("-9223372036854775808"), None);
        assert_eq!(parse_posted_date("9223372036854775807"), None);
        assert_eq!(parse_posted_date("300000000000000"), None);
        assert_eq!(parse_posted_date("-99999999999"), None);
        assert_eq!(parse_posted_date("2024"), None);
        assert_eq!(parse_posted_date("42"), None);
    }

    #[test]
    fn test_extreme_posted_dates_fall_back_to_batch_time() {
        let raw = vec![
            json!({"title": "Min", "posted_date": i64::MIN}),
            json!({"title": "Far future", "posted_date": 300_000_000_000_000_i64}),
            json!({"title": "Far past", "posted_date": -99_999_999_999_i64}),
            json!({"title": "Year only", "posted_date": "2024"}),
        ];
        let jobs = JobNormalizer::new().normalize_batch(raw, JobSource::Manual, &batch_time());

        assert_eq!(jobs.len(), 4);
        for job in &jobs {
            assert_eq!(job.posted_date, "2025-06-01T12:00:00.000Z", "{}", job.title);
            assert!(DateTime::parse_from_rfc3339(&job.posted_date).is_ok());
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Senior Software Engineer (Rust)"), "senior-software-engineer-rust");
        assert_eq!(slugify("  Café Manager  "), "café-manager");
        assert!(slugify("***").starts_with("job-"));
        assert_eq!(slugify("***"), slugify("***"));
        assert_ne!(slugify("***"), slugify("!!!"));
    }

    #[test]
    fn test_identical_titles_collide() {
        let jobs = JobNormalizer::new().normalize_batch(
            vec![json!({"title": "Barista"}), json!({"title": "barista "})],
            JobSource::Manual,
            &batch_time(),
        );
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, jobs[1].id);
    }

    #[test]
    fn test_serializes_camel_case() {
        let job = JobNormalizer::new()
            .normalize_record(json!({"title": "Chef"}), JobSource::Manual, "2025-06-01T12:00:00.000Z")
            .unwrap();
        let value = serde_json::to_value(&job).unwrap();
        for key in ["employmentType", "postedDate", "applyUrl", "rawData", "processedAt"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["source"], "manual");
    }
}
