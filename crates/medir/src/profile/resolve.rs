//! Profile loading, single-level inheritance, and override resolution.
//!
//! Resolution order: built-in defaults, then the custom profile file (after
//! resolving its `inherits` base), then command-line field overrides. Every
//! validation failure is fatal and must stop the run before any browser
//! interaction occurs.

use super::defaults::default_profiles;
use super::types::ProfileSet;
use crate::result::{MedirError, MedirResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Which direction the chat test exercises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// The run sends messages
    #[default]
    Send,
    /// The run receives messages
    Receive,
}

impl ChatMode {
    /// The profile key this mode selects.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
        }
    }
}

/// Raw command-line field overrides, one map per profile kind.
///
/// Keys are profile field names (camelCase, as they appear in profile files);
/// values are the raw override strings. JSON parsing is attempted per value,
/// falling back to the raw string.
#[derive(Clone, Debug, Default)]
pub struct ProfileOverrides {
    /// `--video.<key>=<value>` entries
    pub video: BTreeMap<String, String>,
    /// `--audio.<key>=<value>` entries
    pub audio: BTreeMap<String, String>,
    /// `--chat.<key>=<value>` entries
    pub chat: BTreeMap<String, String>,
}

impl ProfileOverrides {
    /// An empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty() && self.chat.is_empty()
    }
}

const KINDS: [(&str, &str); 3] = [
    ("video", "videoProfile"),
    ("audio", "audioProfile"),
    ("chat", "chatProfile"),
];

/// Load and resolve the profiles for a run.
///
/// `profile_file` is resolved relative to `root`, as is any `inherits` path
/// it declares. Returns the fully merged, validated `ProfileSet`.
pub fn resolve_profiles(
    root: &Path,
    profile_file: Option<&Path>,
    overrides: &ProfileOverrides,
    chat_mode: ChatMode,
) -> MedirResult<ProfileSet> {
    let defaults = serde_json::to_value(default_profiles())?;
    let mut resolved = defaults.clone();

    if let Some(file) = profile_file {
        let doc = load_value(&root.join(file))?;
        for (kind, key) in KINDS {
            let Some(sub) = doc.get(key) else { continue };
            let merged = resolve_inheritance(root, key, sub)?;
            validate_keys(kind, &merged, &defaults[key])?;
            if let Some(slot) = resolved.get_mut(key) {
                deep_merge(slot, &merged);
            }
        }
    }

    if !overrides.is_empty() {
        apply_overrides("video", &mut resolved, &overrides.video)?;
        apply_overrides("audio", &mut resolved, &overrides.audio)?;
        for key in overrides.chat.keys() {
            if key != chat_mode.as_str() {
                return Err(MedirError::ChatModeMismatch {
                    key: key.clone(),
                    mode: chat_mode.as_str().to_string(),
                });
            }
        }
        apply_overrides("chat", &mut resolved, &overrides.chat)?;
    }

    Ok(serde_json::from_value(resolved)?)
}

/// Merge a sub-profile onto its declared base profile, override winning.
fn resolve_inheritance(root: &Path, key: &str, sub: &Value) -> MedirResult<Value> {
    let Some(Value::String(base_rel)) = sub.get("inherits") else {
        return Ok(sub.clone());
    };
    let base_doc = load_value(&root.join(base_rel))?;
    let mut merged = base_doc.get(key).cloned().unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    deep_merge(&mut merged, sub);
    Ok(merged)
}

/// Every key of the custom profile must exist on the default profile.
fn validate_keys(kind: &str, custom: &Value, default: &Value) -> MedirResult<()> {
    let (Some(custom_obj), Some(default_obj)) = (custom.as_object(), default.as_object()) else {
        return Ok(());
    };
    let invalid: Vec<String> = custom_obj
        .keys()
        .filter(|k| !default_obj.contains_key(k.as_str()))
        .cloned()
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(MedirError::InvalidProfileKeys {
            kind: kind.to_string(),
            keys: invalid,
        })
    }
}

/// Apply raw CLI overrides onto one resolved sub-profile.
fn apply_overrides(
    kind: &str,
    resolved: &mut Value,
    entries: &BTreeMap<String, String>,
) -> MedirResult<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let key = KINDS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, key)| *key)
        .unwrap_or(kind);
    let Some(obj) = resolved.get_mut(key).and_then(Value::as_object_mut) else {
        return Ok(());
    };
    for (field, raw) in entries {
        let Some(existing) = obj.get_mut(field) else {
            return Err(MedirError::InvalidOverrideKey {
                kind: kind.to_string(),
                key: field.clone(),
                valid: obj.keys().cloned().collect(),
            });
        };
        let parsed =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        // Arrays merge element-by-index, objects merge per key, scalars replace.
        deep_merge(existing, &parsed);
    }
    Ok(())
}

/// Recursive merge: objects per key, arrays element-by-index with append,
/// everything else replaced by the overlay.
pub(crate) fn deep_merge(base: &mut Value, overlay: &Value) {
    if let (Some(base_obj), Some(overlay_obj)) = (base.as_object_mut(), overlay.as_object()) {
        for (k, v) in overlay_obj {
            match base_obj.get_mut(k) {
                Some(slot) => deep_merge(slot, v),
                None => {
                    base_obj.insert(k.clone(), v.clone());
                }
            }
        }
        return;
    }
    if let (Some(base_arr), Some(overlay_arr)) = (base.as_array_mut(), overlay.as_array()) {
        for (i, v) in overlay_arr.iter().enumerate() {
            if i < base_arr.len() {
                deep_merge(&mut base_arr[i], v);
            } else {
                base_arr.push(v.clone());
            }
        }
        return;
    }
    *base = overlay.clone();
}

fn load_value(path: &Path) -> MedirResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| MedirError::ProfileLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| MedirError::ProfileLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
