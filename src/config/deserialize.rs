// ABOUTME: Custom serde deserializers for config fields.
// ABOUTME: Normalizes key path segments and rejects values that would break the key layout.

use serde::Deserialize;

/// Path segments reserved by the key layout under the app path.
const RESERVED_SEGMENTS: [&str; 3] = ["revisions", "CURRENT_REVISION", "SHAS"];

pub(crate) fn normalize_key_path(value: &str) -> Result<String, String> {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err("path cannot be empty".to_string());
    }
    if trimmed.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
        return Err(format!("invalid path segment in '{}'", value));
    }
    Ok(trimmed.to_string())
}

pub fn deserialize_app_path<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    normalize_key_path(&s).map_err(|e| serde::de::Error::custom(format!("app_path: {e}")))
}

pub fn deserialize_app_path_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    opt.map(|s| normalize_key_path(&s))
        .transpose()
        .map_err(|e| serde::de::Error::custom(format!("app_path: {e}")))
}

pub fn deserialize_current_path<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let path = normalize_key_path(&s)
        .map_err(|e| serde::de::Error::custom(format!("current_path: {e}")))?;

    let first = path.split('/').next().unwrap_or_default();
    if RESERVED_SEGMENTS.contains(&first) {
        return Err(serde::de::Error::custom(format!(
            "current_path cannot start with reserved name '{first}'"
        )));
    }
    Ok(path)
}

pub fn deserialize_concurrency<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = usize::deserialize(deserializer)?;
    if value == 0 {
        return Err(serde::de::Error::custom("concurrency must be at least 1"));
    }
    Ok(value)
}
