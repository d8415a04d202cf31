//! Section-structured settings record and its merge rules.
//!
//! The persisted form is a single JSON object with at least a `branding` and
//! a `profile` section. Any other top-level key, and any unknown key inside a
//! known section, is carried through reads and writes untouched.
//!
//! Every read is a merge of the stored object onto [`SettingsRecord::default`],
//! so a record written by an older build (missing fields or sections) still
//! comes back structurally complete.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Branding shown in the dashboard chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    pub company_name: String,
    pub logo_url: String,
    pub primary_color: String,
    pub accent_color: String,
    pub favicon_url: String,
    /// Keys this build does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "My Store".to_string(),
            logo_url: String::new(),
            primary_color: "#2563eb".to_string(),
            accent_color: "#f59e0b".to_string(),
            favicon_url: String::new(),
            extra: Map::new(),
        }
    }
}

/// Administrator profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar_url: String,
    pub phone: String,
    /// Keys this build does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: "Administrator".to_string(),
            avatar_url: String::new(),
            phone: String::new(),
            extra: Map::new(),
        }
    }
}

/// The complete settings record. `Default` is the template every read merges onto.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecord {
    pub branding: Branding,
    pub profile: Profile,
    /// Top-level sections this build does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors from decoding or merging settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The stored text is not JSON.
    #[error("stored settings are not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    /// The stored JSON is not an object.
    #[error("stored settings must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    /// The merged object does not fit the record schema (e.g. a number where a string belongs).
    #[error("settings do not match the record schema: {0}")]
    Schema(#[source] serde_json::Error),
}

impl SettingsRecord {
    /// Decodes a stored record and merges it onto the default template.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if `raw` is not a JSON object or if the merged
    /// object does not fit the record schema.
    pub fn from_stored(raw: &str) -> Result<Self, SettingsError> {
        let stored: Value = serde_json::from_str(raw).map_err(SettingsError::Corrupt)?;
        if !stored.is_object() {
            return Err(SettingsError::NotAnObject {
                found: json_kind(&stored),
            });
        }
        let mut merged = template_value();
        deep_merge(&mut merged, stored);
        serde_json::from_value(merged).map_err(SettingsError::Schema)
    }

    /// Encodes the record for storage.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Schema`] if serialization fails.
    pub fn to_stored(&self) -> Result<String, SettingsError> {
        serde_json::to_string(self).map_err(SettingsError::Schema)
    }

    /// Returns a new record with `patch` deep-merged into this one.
    ///
    /// `self` is left untouched when the merge fails.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Schema`] if the patch puts a value of the wrong
    /// type into a known field.
    pub fn merged(&self, patch: &SettingsPatch) -> Result<Self, SettingsError> {
        let mut current = serde_json::to_value(self).map_err(SettingsError::Schema)?;
        deep_merge(&mut current, patch.to_value());
        serde_json::from_value(current).map_err(SettingsError::Schema)
    }
}

/// A partial write. Each present section is merged key by key into the stored one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Map<String, Value>>,
    /// Any other top-level section.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SettingsPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one `branding` key.
    #[must_use]
    pub fn branding(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.branding
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Sets one `profile` key.
    #[must_use]
    pub fn profile(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.profile
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Sets a whole top-level section other than `branding` and `profile`.
    #[must_use]
    pub fn section(mut self, name: &str, value: impl Into<Value>) -> Self {
        match name {
            "branding" | "profile" => {
                if let Value::Object(map) = value.into() {
                    let slot = if name == "branding" {
                        &mut self.branding
                    } else {
                        &mut self.profile
                    };
                    slot.get_or_insert_with(Map::new).extend(map);
                }
            }
            _ => {
                self.extra.insert(name.to_string(), value.into());
            }
        }
        self
    }

    /// Returns `true` if the patch carries no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branding.is_none() && self.profile.is_none() && self.extra.is_empty()
    }

    /// The patch as a JSON object, ready for [`deep_merge`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut root = self.extra.clone();
        if let Some(branding) = &self.branding {
            root.insert("branding".to_string(), Value::Object(branding.clone()));
        }
        if let Some(profile) = &self.profile {
            root.insert("profile".to_string(), Value::Object(profile.clone()));
        }
        Value::Object(root)
    }
}

/// Recursively merges `patch` into `target`.
///
/// Objects merge key by key; any other value (including arrays and `null`)
/// replaces the target verbatim.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

fn template_value() -> Value {
    // Serializing plain strings and maps cannot fail.
    serde_json::to_value(SettingsRecord::default()).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_keeps_untouched_sections() {
        let record = SettingsRecord::default()
            .merged(&SettingsPatch::new().profile("name", "Ann"))
            .unwrap();
        let record = record
            .merged(&SettingsPatch::new().branding("logoUrl", "x.png"))
            .unwrap();

        assert_eq!(record.profile.name, "Ann");
        assert_eq!(record.branding.logo_url, "x.png");
        assert_eq!(record.branding.company_name, Branding::default().company_name);
        assert_eq!(record.profile.email, Profile::default().email);
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let patch = SettingsPatch::new()
            .branding("tagline", "fresh daily")
            .section("notifications", json!({ "email": true, "digest": "weekly" }));
        let record = SettingsRecord::default().merged(&patch).unwrap();

        let stored = record.to_stored().unwrap();
        let reread = SettingsRecord::from_stored(&stored).unwrap();

        assert_eq!(reread, record);
        assert_eq!(reread.branding.extra["tagline"], "fresh daily");
        assert_eq!(reread.extra["notifications"]["digest"], "weekly");
    }

    #[test]
    fn from_stored_fills_missing_fields_from_template() {
        let record = SettingsRecord::from_stored(r#"{"profile":{"name":"Bo"}}"#).unwrap();
        assert_eq!(record.profile.name, "Bo");
        assert_eq!(record.profile.role, Profile::default().role);
        assert_eq!(record.branding, Branding::default());
    }

    #[test]
    fn from_stored_rejects_garbage() {
        assert!(matches!(
            SettingsRecord::from_stored("{not json"),
            Err(SettingsError::Corrupt(_))
        ));
        assert!(matches!(
            SettingsRecord::from_stored("[1,2,3]"),
            Err(SettingsError::NotAnObject { found: "an array" })
        ));
    }

    #[test]
    fn wrong_type_in_known_field_is_schema_error() {
        let patch = SettingsPatch::new().branding("logoUrl", 42);
        let err = SettingsRecord::default().merged(&patch).unwrap_err();
        assert!(matches!(err, SettingsError::Schema(_)));
    }

    #[test]
    fn numbers_in_unknown_keys_are_copied_verbatim() {
        let patch = SettingsPatch::new().profile("loginCount", 7).branding("ratio", 1.5);
        let record = SettingsRecord::default().merged(&patch).unwrap();
        assert_eq!(record.profile.extra["loginCount"], json!(7));
        assert_eq!(record.branding.extra["ratio"], json!(1.5));
    }

    #[test]
    fn deep_merge_replaces_arrays_and_scalars() {
        let mut target = json!({ "a": [1, 2], "b": { "c": 1, "d": 2 } });
        deep_merge(&mut target, json!({ "a": [3], "b": { "d": 5 } }));
        assert_eq!(target, json!({ "a": [3], "b": { "c": 1, "d": 5 } }));
    }

    #[test]
    fn section_helper_routes_known_sections() {
        let patch = SettingsPatch::new().section("branding", json!({ "companyName": "Acme" }));
        assert_eq!(patch.branding.unwrap()["companyName"], "Acme");
    }

    fn section_entries() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-e]{1,2}", "[a-z0-9]{0,6}"), 0..6)
    }

    fn to_map(entries: &[(String, String)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (format!("x{k}"), Value::String(v.clone())))
            .collect()
    }

    proptest! {
        #[test]
        fn disjoint_section_writes_commute(
            branding in section_entries(),
            profile in section_entries(),
        ) {
            let a = SettingsPatch { branding: Some(to_map(&branding)), ..SettingsPatch::default() };
            let b = SettingsPatch { profile: Some(to_map(&profile)), ..SettingsPatch::default() };
            let both = SettingsPatch {
                branding: Some(to_map(&branding)),
                profile: Some(to_map(&profile)),
                ..SettingsPatch::default()
            };

            let base = SettingsRecord::default();
            let ab = base.merged(&a).unwrap().merged(&b).unwrap();
            let ba = base.merged(&b).unwrap().merged(&a).unwrap();
            let once = base.merged(&both).unwrap();

            prop_assert_eq!(&ab, &ba);
            prop_assert_eq!(&ab, &once);
        }

        #[test]
        fn repeated_writes_are_left_to_right(
            first in section_entries(),
            second in section_entries(),
        ) {
            let a = SettingsPatch { branding: Some(to_map(&first)), ..SettingsPatch::default() };
            let b = SettingsPatch { branding: Some(to_map(&second)), ..SettingsPatch::default() };

            let mut combined = to_map(&first);
            combined.extend(to_map(&second));
            let once = SettingsPatch { branding: Some(combined), ..SettingsPatch::default() };

            let base = SettingsRecord::default();
            let sequential = base.merged(&a).unwrap().merged(&b).unwrap();
            prop_assert_eq!(sequential, base.merged(&once).unwrap());
        }
    }
}
