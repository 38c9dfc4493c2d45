use anyhow::Context;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::config::RequiredEnvVar;
use crate::error::{ScaffoldError, ScaffoldResult};

/// Line-anchored `NAME=` matcher for one variable
fn key_pattern(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?m)^{}=", regex::escape(name)))
}

/// Append `NAME=default` for every required variable missing from `existing`
///
/// Existing lines are kept verbatim and in order, including values for
/// required names. Returns the merged content and the names that were added.
///
/// # Errors
///
/// Fails if a variable name cannot be turned into a matcher.
pub fn reconcile_env_content(
    existing: &str,
    required: &[RequiredEnvVar],
) -> anyhow::Result<(String, Vec<String>)> {
    let mut content = existing.to_string();
    let mut added = Vec::new();

    for var in required {
        let pattern = key_pattern(&var.name)
            .with_context(|| format!("invalid variable name {:?}", var.name))?;
        if pattern.is_match(&content) {
            continue;
        }
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&format!("{}={}\n", var.name, var.default_value));
        added.push(var.name.clone());
    }

    Ok((content, added))
}

/// Reconcile the environment file at `path`
///
/// A missing file is treated as empty and created. The file is only written
/// back when something was added.
///
/// # Errors
///
/// Returns [`ScaffoldError::EnvReconcile`] if the file cannot be read,
/// matched or written.
pub fn reconcile_env_file(path: &Path, required: &[RequiredEnvVar]) -> ScaffoldResult<Vec<String>> {
    let env_err = |source: anyhow::Error| ScaffoldError::EnvReconcile {
        path: path.to_path_buf(),
        source,
    };

    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(env_err(anyhow::Error::new(e).context("read failed"))),
    };

    let (merged, added) = reconcile_env_content(&existing, required).map_err(env_err)?;
    if added.is_empty() {
        debug!("{} already has every required variable", path.display());
        return Ok(added);
    }

    fs::write(path, merged).context("write failed").map_err(env_err)?;
    info!("Updated {}: added {}", path.display(), added.join(", "));
    Ok(added)
}
