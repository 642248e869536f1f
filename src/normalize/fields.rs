//! Field precedence table.
//!
//! Each canonical field has an ordered list of accessors into the raw record. The
//! first accessor that yields non-empty text wins. Accessors are dotted paths:
//! `location.name` walks into an object, `offices.0.name` indexes an array.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Title,
    Id,
    Department,
    Location,
    EmploymentType,
    Description,
    PostedDate,
    ApplyUrl,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub accessors: &'static [&'static str],
}

pub const FIELD_RULES: [FieldRule; 8] = [
    FieldRule {
        field: CanonicalField::Title,
        accessors: &["title", "position_title", "name", "job_title"],
    },
    FieldRule {
        field: CanonicalField::Id,
        accessors: &["id", "job_id", "posting_id"],
    },
    FieldRule {
        field: CanonicalField::Department,
        accessors: &[
            "department",
            "department_name",
            "team",
            "categories.team",
            "departments.0.name",
        ],
    },
    FieldRule {
        field: CanonicalField::Location,
        accessors: &[
            "location",
            "location_name",
            "location.name",
            "city",
            "categories.location",
            "offices.0.name",
        ],
    },
    FieldRule {
        field: CanonicalField::EmploymentType,
        accessors: &[
            "employment_type",
            "employmentType",
            "job_type",
            "type",
            "categories.commitment",
        ],
    },
    FieldRule {
        field: CanonicalField::Description,
        accessors: &[
            "description",
            "content",
            "description_plain",
            "descriptionPlain",
            "summary",
        ],
    },
    FieldRule {
        field: CanonicalField::PostedDate,
        accessors: &[
            "posted_date",
            "created_at",
            "date_posted",
            "datePosted",
            "published_at",
        ],
    },
    FieldRule {
        field: CanonicalField::ApplyUrl,
        accessors: &[
            "apply_url",
            "application_url",
            "absolute_url",
            "hostedUrl",
            "url",
        ],
    },
];

/// Ordered accessors for a canonical field
pub fn accessors(field: CanonicalField) -> &'static [&'static str] {
    FIELD_RULES
        .iter()
        .find(|rule| rule.field == field)
        .map(|rule| rule.accessors)
        .unwrap_or(&[])
}

/// First non-empty candidate wins
pub fn resolve(raw: &Value, field: CanonicalField) -> Option<String> {
    accessors(field)
        .iter()
        .find_map(|path| lookup_path(raw, path).and_then(scalar_text))
}

fn lookup_path<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    // Flat keys containing dots are tried verbatim first
    if let Some(v) = raw.as_object().and_then(|map| map.get(path)) {
        return Some(v);
    }
    if !path.contains('.') {
        return None;
    }
    path.split('.').try_fold(raw, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_field_has_a_rule() {
        for field in [
            CanonicalField::Title,
            CanonicalField::Id,
            CanonicalField::Department,
            CanonicalField::Location,
            CanonicalField::EmploymentType,
            CanonicalField::Description,
            CanonicalField::PostedDate,
            CanonicalField::ApplyUrl,
        ] {
            assert!(!accessors(field).is_empty(), "{field:?} has no accessors");
        }
    }

    #[test]
    fn test_documented_leading_orders() {
        assert_eq!(
            &accessors(CanonicalField::Title)[..3],
            &["title", "position_title", "name"]
        );
        assert_eq!(&accessors(CanonicalField::Id)[..2], &["id", "job_id"]);
        assert_eq!(
            &accessors(CanonicalField::PostedDate)[..3],
            &["posted_date", "created_at", "date_posted"]
        );
    }

    #[test]
    fn test_blank_candidate_falls_through() {
        let raw = json!({"title": "   ", "position_title": "Analyst", "name": "Ignored"});
        assert_eq!(resolve(&raw, CanonicalField::Title).as_deref(), Some("Analyst"));
    }

    #[test]
    fn test_numeric_ids_and_nested_paths() {
        let raw = json!({
            "job_id": 4021,
            "location": {"name": "Lisbon"},
            "departments": [{"name": "Finance"}],
            "categories": {"commitment": "Part-time"}
        });
        assert_eq!(resolve(&raw, CanonicalField::Id).as_deref(), Some("4021"));
        assert_eq!(resolve(&raw, CanonicalField::Location).as_deref(), Some("Lisbon"));
        assert_eq!(resolve(&raw, CanonicalField::Department).as_deref(), Some("Finance"));
        assert_eq!(
            resolve(&raw, CanonicalField::EmploymentType).as_deref(),
            Some("Part-time")
        );
    }

    #[test]
    fn test_non_object_record_has_no_fields() {
        assert_eq!(resolve(&json!("just a string"), CanonicalField::Title), None);
        assert_eq!(resolve(&json!(null), CanonicalField::Id), None);
    }
}
