//! Import payload handling
//!
//! A payload is either a `SettingsExport` envelope or a bare `SiteSettings`
//! object. Top-level category keys must match the schema exactly: unknown
//! categories and missing categories both reject the import.

use crate::contract::{
    SettingsCategory, SettingsError, SiteSettings, ValidationResult, EXPORT_VERSION,
};
use serde_json::Value;

/// Parse raw text into JSON; malformed input is a `Parse` error
pub fn parse_import_json(raw: &str) -> Result<Value, SettingsError> {
    serde_json::from_str(raw).map_err(|e| SettingsError::Parse {
        details: e.to_string(),
    })
}

fn major_version(version: &str) -> Option<&str> {
    version.split('.').next().filter(|major| !major.is_empty())
}

/// Whether an envelope version can be imported by this build
pub fn is_supported_version(version: &str) -> bool {
    major_version(version).is_some() && major_version(version) == major_version(EXPORT_VERSION)
}

fn is_envelope(map: &serde_json::Map<String, Value>) -> bool {
    map.contains_key("settings") && map.contains_key("version")
}

/// Extract a schema-conformant `SiteSettings` from a parsed payload
///
/// Shape problems come back as a failed `ValidationResult` so that callers
/// can surface them alongside ordinary validation errors.
pub fn extract_settings(payload: Value) -> Result<SiteSettings, ValidationResult> {
    let mut result = ValidationResult::new();

    let Value::Object(mut root) = payload else {
        result.add_error("", "Import payload must be a JSON object");
        return Err(result);
    };

    let settings = if is_envelope(&root) {
        match root.get("version").and_then(Value::as_str) {
            Some(version) if is_supported_version(version) => {}
            Some(version) => result.add_error(
                "version",
                format!(
                    "Unsupported export version '{}' (expected {}.x)",
                    version,
                    major_version(EXPORT_VERSION).unwrap_or(EXPORT_VERSION)
                ),
            ),
            None => result.add_error("version", "Export version must be a string"),
        }
        root.remove("settings").unwrap_or(Value::Null)
    } else {
        Value::Object(root)
    };

    let Value::Object(categories) = &settings else {
        result.add_error("settings", "Settings must be a JSON object");
        return Err(result);
    };

    for key in categories.keys() {
        if key.parse::<SettingsCategory>().is_err() {
            result.add_error(key.clone(), format!("Unknown settings category '{}'", key));
        }
    }
    for category in SettingsCategory::ALL {
        if !categories.contains_key(category.key()) {
            result.add_error(
                category.key(),
                format!("Missing settings category '{}'", category),
            );
        }
    }
    if !result.is_valid {
        return Err(result);
    }

    serde_json::from_value(settings).map_err(|e| {
        result.add_error(
            "settings",
            format!("Settings do not match the current schema: {}", e),
        );
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ExportMetadata, SettingsExport};
    use crate::domain::defaults::default_site_settings;
    use serde_json::json;

    fn envelope(version: &str) -> Value {
        serde_json::to_value(SettingsExport {
            version: version.to_string(),
            timestamp: chrono::Utc::now(),
            settings: default_site_settings(),
            metadata: ExportMetadata {
                site_name: "My CMS Site".to_string(),
                exported_by: "admin".to_string(),
            },
        })
        .unwrap()
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            parse_import_json("{not valid"),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_accepts_envelope() {
        let settings = extract_settings(envelope(EXPORT_VERSION)).unwrap();
        assert_eq!(settings, default_site_settings());
    }

    #[test]
    fn test_accepts_bare_settings() {
        let bare = serde_json::to_value(default_site_settings()).unwrap();
        assert_eq!(extract_settings(bare).unwrap(), default_site_settings());
    }

    #[test]
    fn test_rejects_other_major_version() {
        let result = extract_settings(envelope("2.0.0")).unwrap_err();
        assert!(result.has_error("version"));
        assert!(extract_settings(envelope("1.4.2")).is_ok());
    }

    #[test]
    fn test_rejects_unknown_category() {
        let mut bare = serde_json::to_value(default_site_settings()).unwrap();
        bare["themes"] = json!({ "active": "twentytwenty" });
        let result = extract_settings(bare).unwrap_err();
        assert!(result.has_error("themes"));
    }

    #[test]
    fn test_rejects_missing_category() {
        let mut bare = serde_json::to_value(default_site_settings()).unwrap();
        bare.as_object_mut().unwrap().remove("securityPrivacy");
        let result = extract_settings(bare).unwrap_err();
        assert!(result.has_error("securityPrivacy"));
    }

    #[test]
    fn test_rejects_shape_mismatch_inside_category() {
        let mut bare = serde_json::to_value(default_site_settings()).unwrap();
        bare["general"]["content"]["postsPerPage"] = json!("ten");
        let result = extract_settings(bare).unwrap_err();
        assert!(result.has_error("settings"));
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(extract_settings(json!([1, 2, 3])).is_err());
        assert!(extract_settings(json!({ "version": "1.0.0", "settings": 5 })).is_err());
    }
}
