use serde_json::Value;

use super::*;

const FIELDS: &[&str] = &["name", "description", "color"];

pub const DEFAULT_GROUP_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone)]
pub struct LeadGroupInsert {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, Default)]
pub struct LeadGroupPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub fn validate_insert_lead_group(body: &Value) -> Result<LeadGroupInsert, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, FIELDS, &mut errors);

    let name = required_string(map, "name", &mut errors);
    let description = optional_string(map, "description", &mut errors);
    let color = optional_color(map, "color", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(LeadGroupInsert {
        name: name.unwrap(),
        description,
        color: color.unwrap_or_else(|| DEFAULT_GROUP_COLOR.to_string()),
    })
}

pub fn validate_update_lead_group(body: &Value) -> Result<LeadGroupPatch, ValidationErrors> {
    let map = object_body(body)?;
    let mut errors = ValidationErrors::new();
    check_unknown_fields(map, FIELDS, &mut errors);

    let patch = LeadGroupPatch {
        name: match map.get("name") {
            Some(_) => required_string(map, "name", &mut errors),
            None => None,
        },
        description: optional_string(map, "description", &mut errors),
        color: optional_color(map, "color", &mut errors),
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}
