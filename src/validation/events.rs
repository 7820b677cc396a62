use chrono::NaiveDate;
use serde_json::Value;

use super::*;

const FIELDS: &[&str] = &[
    "name",
    "description",
    "industry",
    "location",
    "startDate",
    "endDate",
];

#[derive(Debug, Clone)]
pub struct EventInsert {
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Partial update; `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub fn validate_insert_event(body: &Value) -> Result<EventInsert, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, FIELDS, &mut errors);

    let name = required_string(map, "name", &mut errors);
    let description = optional_string(map, "description", &mut errors);
    let industry = optional_string(map, "industry", &mut errors);
    let location = optional_string(map, "location", &mut errors);
    let start_date = optional_date(map, "startDate", &mut errors);
    let end_date = optional_date(map, "endDate", &mut errors);

    check_date_order(start_date, end_date, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(EventInsert {
        name: name.unwrap(),
        description,
        industry,
        location,
        start_date,
        end_date,
    })
}

pub fn validate_update_event(body: &Value) -> Result<EventPatch, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, FIELDS, &mut errors);

    let patch = EventPatch {
        name: match map.get("name") {
            Some(_) => required_string(map, "name", &mut errors),
            None => None,
        },
        description: optional_string(map, "description", &mut errors),
        industry: optional_string(map, "industry", &mut errors),
        location: optional_string(map, "location", &mut errors),
        start_date: optional_date(map, "startDate", &mut errors),
        end_date: optional_date(map, "endDate", &mut errors),
    };

    // Both ends supplied in the same payload can be checked right away; the
    // merged check against the stored row happens in the service.
    check_date_order(patch.start_date, patch.end_date, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}

/// `endDate >= startDate` whenever both are known.
pub fn check_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    errors: &mut ValidationErrors,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.format("endDate", "endDate must not be before startDate");
        }
    }
}
