//! Compiler path aliases for the generated `src/` layout.
//!
//! `update` rewrites an existing `tsconfig.json`; `generate` also creates one
//! when absent. Either way `compilerOptions.baseUrl` becomes `src` and
//! `compilerOptions.paths` is replaced with the configured aliases. Every
//! other key is kept in its original position.

use anyhow::Context;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::PathAlias;
use crate::error::{ScaffoldError, ScaffoldResult};

/// Whether a missing `tsconfig.json` is an error or a blank starting point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsconfigMode {
    /// The file must exist
    Update,
    /// Start from `{}` when the file is absent
    Generate,
}

/// Set `baseUrl` and `paths` on a parsed tsconfig document
///
/// # Errors
///
/// Fails if the document or its `compilerOptions` is not a JSON object.
pub fn apply_aliases(doc: &mut Value, aliases: &[PathAlias]) -> anyhow::Result<()> {
    let root = doc
        .as_object_mut()
        .context("tsconfig root is not a JSON object")?;

    let options = root
        .entry("compilerOptions")
        .or_insert_with(|| Value::Object(Map::new()));
    if options.is_null() {
        *options = Value::Object(Map::new());
    }
    let options = options
        .as_object_mut()
        .context("compilerOptions is not a JSON object")?;

    options.insert("baseUrl".to_string(), Value::String("src".to_string()));

    let paths: Map<String, Value> = aliases
        .iter()
        .map(|alias| {
            let targets = alias.targets.iter().cloned().map(Value::String).collect();
            (alias.alias.clone(), Value::Array(targets))
        })
        .collect();
    options.insert("paths".to_string(), Value::Object(paths));
    Ok(())
}

/// Rewrite the aliases in the tsconfig at `path`
///
/// # Errors
///
/// Returns [`ScaffoldError::Tsconfig`] if the file is missing in
/// [`TsconfigMode::Update`], unreadable, malformed, or cannot be written.
pub fn write_aliases(path: &Path, aliases: &[PathAlias], mode: TsconfigMode) -> ScaffoldResult<()> {
    let to_err = |source: anyhow::Error| ScaffoldError::Tsconfig {
        path: path.to_path_buf(),
        source,
    };

    let mut doc = if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map_err(to_err)?;
        serde_json::from_str::<Value>(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))
            .map_err(to_err)?
    } else if mode == TsconfigMode::Generate {
        Value::Object(Map::new())
    } else {
        return Err(to_err(anyhow::anyhow!("file not found")));
    };

    apply_aliases(&mut doc, aliases).map_err(to_err)?;

    let mut rendered = serde_json::to_string_pretty(&doc)
        .context("Failed to serialise tsconfig")
        .map_err(to_err)?;
    rendered.push('\n');
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write {}", path.display()))
        .map_err(to_err)?;

    info!("Updated {} successfully.", path.display());
    Ok(())
}
