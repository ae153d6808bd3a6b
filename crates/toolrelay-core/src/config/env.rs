//! `.env` file loading
//!
//! Lines are `KEY=VALUE`, optionally quoted. Variables already present in
//! the process environment are never overridden.

use std::fs;
use std::path::Path;

use super::error::ConfigResult;

/// Outcome of loading a `.env` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFileReport {
    /// Names that were set from the file
    pub loaded: Vec<String>,
    /// Names skipped because they were already set
    pub skipped: Vec<String>,
}

/// Load `path` into the process environment.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_env_file(path: impl AsRef<Path>) -> ConfigResult<Option<EnvFileReport>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let mut report = EnvFileReport::default();

    for (key, value) in parse_env(&content) {
        if std::env::var_os(&key).is_some() {
            report.skipped.push(key);
        } else {
            std::env::set_var(&key, value);
            report.loaded.push(key);
        }
    }

    Ok(Some(report))
}

/// Parse `.env` content into key/value pairs, in file order
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_env_line)
        .collect()
}

fn parse_env_line(line: &str) -> Option<(String, String)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}
