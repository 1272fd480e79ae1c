use crate::error::{Result, SetupError};

/// Validate a device base URL and strip trailing slashes so paths can be appended.
pub fn normalize_base_url(base: &str) -> Result<String> {
    let trimmed = base.trim().trim_end_matches('/');
    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let has_host = trimmed
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.is_empty());
    if !has_scheme || !has_host {
        return Err(SetupError::BaseUrl(base.to_string()));
    }
    Ok(trimmed.to_string())
}
