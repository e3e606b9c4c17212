//! The persisted application-state document.
//!
//! The store keeps the document as free-form JSON so keys written by other
//! front ends survive; [`PersistedAppState`] is the typed view the core
//! reads. Writes go through [`AppStatePatch`], a partial document that is
//! deep-merged into the stored one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::error::StoreError;
use crate::task::TaskView;

/// The `pomodoro` sub-document.
///
/// Configuration fields are optional: absent means "use the default".
/// A field holding `null` or a value of the wrong shape decodes as its
/// default too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PomodoroState {
    #[serde(deserialize_with = "lenient")]
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub work_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub break_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub long_break_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub cycles_before_long_break: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub cycles_completed_today: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub active: bool,
    #[serde(deserialize_with = "lenient")]
    pub on_break: bool,
    #[serde(deserialize_with = "lenient")]
    pub current_minutes: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub current_seconds: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub visible: Option<bool>,
}

/// Typed view over the stored document.
///
/// Decoding never fails on a single bad field; see [`PomodoroState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedAppState {
    #[serde(deserialize_with = "lenient")]
    pub current_view: TaskView,
    #[serde(deserialize_with = "lenient")]
    pub selected_task_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub focus_mode: bool,
    #[serde(deserialize_with = "lenient")]
    pub pomodoro: PomodoroState,
}

impl PersistedAppState {
    /// Decode from a raw document, ignoring keys the core does not use.
    pub fn from_document(doc: &Value) -> Result<Self, StoreError> {
        Ok(Self::deserialize(doc)?)
    }
}

/// Decode a field, falling back to its default when the stored value is
/// `null` or does not fit the type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// The document a store starts from when it has none.
pub fn default_document() -> Value {
    json!({
        "current_view": "active",
        "selected_task_id": null,
        "focus_mode": false,
        "pomodoro": {
            "enabled": true,
            "work_minutes": 25,
            "break_minutes": 5,
            "active": false,
            "on_break": false,
            "visible": true
        },
        "settings": {
            "theme": "default"
        }
    })
}

/// Deep-merge `patch` into `base`.
///
/// Objects merge key by key at every depth; any other value (including
/// `null`) replaces what was there.
pub fn merge_documents(base: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *base = patch.clone();
        return;
    };
    if !base.is_object() {
        *base = Value::Object(Map::new());
    }
    let Value::Object(base_map) = base else {
        return;
    };
    for (key, value) in patch_map {
        if value.is_object() {
            let slot = base_map
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            merge_documents(slot, value);
        } else {
            base_map.insert(key.clone(), value.clone());
        }
    }
}

/// Fields of the `pomodoro` sub-document a writer wants to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles_before_long_break: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycles_completed_today: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_break: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_seconds: Option<u32>,
}

/// A partial document to merge into the stored app state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppStatePatch {
    fields: Map<String, Value>,
}

impl AppStatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pomodoro(mut self, patch: PomodoroPatch) -> Self {
        // Every field is a plain Option, so this cannot fail.
        let value = serde_json::to_value(patch).unwrap_or_else(|_| Value::Object(Map::new()));
        self.fields.insert("pomodoro".into(), value);
        self
    }

    pub fn focus_mode(mut self, on: bool) -> Self {
        self.fields.insert("focus_mode".into(), Value::Bool(on));
        self
    }

    /// Set the selected task, or clear it with `None`.
    pub fn selected_task(mut self, id: Option<&str>) -> Self {
        let value = id.map_or(Value::Null, |id| Value::String(id.to_string()));
        self.fields.insert("selected_task_id".into(), value);
        self
    }

    pub fn current_view(mut self, view: TaskView) -> Self {
        self.fields
            .insert("current_view".into(), Value::String(view.as_str().into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Read/merge access to the persisted app-state document.
pub trait AppStateStore: Send + Sync {
    /// # Errors
    /// Fails on transport or decoding errors. A missing document is not an
    /// error; it reads as [`default_document`].
    fn read(&self) -> Result<PersistedAppState, StoreError>;

    /// Deep-merge `patch` into the stored document and return the result.
    fn merge(&self, patch: &AppStatePatch) -> Result<PersistedAppState, StoreError>;
}
