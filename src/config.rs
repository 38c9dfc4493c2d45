//! # Configuration Module
//!
//! Run configuration for the scaffolder, loaded from an optional
//! `api-scaffold.toml` in the project root and overridden by environment
//! variables and CLI flags.
//!
//! ## Lookup order
//!
//! 1. `--config <FILE>` if given (must exist)
//! 2. `api-scaffold.toml` in the project root, if present
//! 3. Built-in defaults
//!
//! A missing file is not an error; a malformed one is.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL` - connection string for schema introspection
//! - `SCAFFOLD_NPM_BIN` - package manager used to install missing packages
//!   (default `npm`)
//!
//! Required env var defaults also consult the process environment: if
//! `PORT=8080` is exported when the generator runs, `.env` gets `PORT=8080`
//! rather than the configured default.
//!
//! ## Example
//!
//! ```toml
//! db_schema = "public"
//! api_prefix = "/api"
//! full_app = true
//! required_packages = ["dotenv", "class-transformer", "class-validator"]
//!
//! [[required_env]]
//! name = "PORT"
//! default_value = "3000"
//!
//! [[tsconfig_aliases]]
//! alias = "@dtos/*"
//! targets = ["dtos/*"]
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::generator::RenderContext;

/// Config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = "api-scaffold.toml";

/// Dependency manifest read by the dependency reconciler
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Compiler configuration rewritten by the tsconfig commands
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Directories created by `setup` and populated by `generate`, under `src/`
pub const SOURCE_DIRS: [&str; 8] = [
    "config",
    "controllers",
    "dtos",
    "exceptions",
    "http",
    "interfaces",
    "middlewares",
    "routes",
];

/// An environment variable the generated project needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequiredEnvVar {
    pub name: String,
    #[serde(default)]
    pub default_value: String,
}

impl RequiredEnvVar {
    pub fn new(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
        }
    }

    /// Same variable with its default replaced by the process environment's
    /// value, when one is set
    pub fn resolved_from_process(&self) -> Self {
        Self {
            name: self.name.clone(),
            default_value: env::var(&self.name).unwrap_or_else(|_| self.default_value.clone()),
        }
    }
}

/// A compiler path alias, e.g. `@dtos/*` → `["dtos/*"]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathAlias {
    pub alias: String,
    pub targets: Vec<String>,
}

impl PathAlias {
    pub fn new(alias: &str, target: &str) -> Self {
        Self {
            alias: alias.to_string(),
            targets: vec![target.to_string()],
        }
    }
}

/// Scaffolder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Project root all paths are relative to (set by the caller, not the file)
    #[serde(skip)]
    pub project_root: PathBuf,
    /// Connection string; `DATABASE_URL` overrides
    pub database_url: Option<String>,
    /// Schema searched for base tables
    pub db_schema: String,
    /// Prefix generated routers are mounted under
    pub api_prefix: String,
    /// Base URL used in sample request files
    pub base_url: String,
    /// Also generate `src/app.ts` and `src/server.ts`
    pub full_app: bool,
    /// Log a warning for each table name that cannot become a model
    pub warn_on_skipped_models: bool,
    /// Environment file, relative to the project root
    pub env_file: PathBuf,
    pub required_env: Vec<RequiredEnvVar>,
    /// Packages the generated code always needs
    pub required_packages: Vec<String>,
    /// Extra packages needed in full-application mode
    pub app_packages: Vec<String>,
    /// Packages that must already be declared before generation starts
    pub prerequisite_packages: Vec<String>,
    pub tsconfig_aliases: Vec<PathAlias>,
    /// Package manager binary; `SCAFFOLD_NPM_BIN` overrides
    pub installer: String,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            database_url: None,
            db_schema: "public".to_string(),
            api_prefix: "/api".to_string(),
            base_url: "http://localhost:3000".to_string(),
            full_app: false,
            warn_on_skipped_models: false,
            env_file: PathBuf::from(".env"),
            required_env: default_required_env(),
            required_packages: vec![
                "dotenv".to_string(),
                "class-transformer".to_string(),
                "class-validator".to_string(),
            ],
            app_packages: vec![
                "express".to_string(),
                "cors".to_string(),
                "helmet".to_string(),
                "compression".to_string(),
                "cookie-parser".to_string(),
            ],
            prerequisite_packages: vec!["prisma".to_string(), "@prisma/client".to_string()],
            tsconfig_aliases: default_tsconfig_aliases(),
            installer: "npm".to_string(),
        }
    }
}

/// The six variables every generated project reads
pub fn default_required_env() -> Vec<RequiredEnvVar> {
    vec![
        RequiredEnvVar::new("NODE_ENV", "development"),
        RequiredEnvVar::new("PORT", "3000"),
        RequiredEnvVar::new("SECRET_KEY", ""),
        RequiredEnvVar::new("LOG_FORMAT", "dev"),
        RequiredEnvVar::new("LOG_DIR", "../logs"),
        RequiredEnvVar::new("ORIGIN", ""),
    ]
}

/// Aliases matching the generated `src/` layout
pub fn default_tsconfig_aliases() -> Vec<PathAlias> {
    vec![
        PathAlias::new("@/*", "*"),
        PathAlias::new("@config", "config"),
        PathAlias::new("@controllers/*", "controllers/*"),
        PathAlias::new("@dtos/*", "dtos/*"),
        PathAlias::new("@exceptions/*", "exceptions/*"),
        PathAlias::new("@interfaces/*", "interfaces/*"),
        PathAlias::new("@middlewares/*", "middlewares/*"),
        PathAlias::new("@routes/*", "routes/*"),
        PathAlias::new("@services/*", "services/*"),
        PathAlias::new("@utils/*", "utils/*"),
    ]
}

/// Load a config file
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it exists but
/// cannot be read or parsed.
pub fn load_config_file(config_path: &Path) -> anyhow::Result<Option<ScaffoldConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: ScaffoldConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Resolve which config file to use
///
/// Priority:
/// 1. Explicitly provided path (via CLI)
/// 2. `api-scaffold.toml` in the project root
/// 3. None (defaults)
pub fn resolve_config_path(explicit_path: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    let detected = project_root.join(CONFIG_FILE_NAME);
    detected.exists().then_some(detected)
}

impl ScaffoldConfig {
    /// Load configuration for `project_root`, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::Config`] if an explicit config file is missing
    /// or any config file fails to parse.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> ScaffoldResult<Self> {
        let mut config = match resolve_config_path(explicit_path, project_root) {
            Some(path) => {
                if !path.exists() {
                    return Err(ScaffoldError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                load_config_file(&path)
                    .map_err(|e| ScaffoldError::Config(format!("{e:#}")))?
                    .unwrap_or_default()
            }
            None => ScaffoldConfig::default(),
        };
        config.project_root = project_root.to_path_buf();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `DATABASE_URL` and `SCAFFOLD_NPM_BIN`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                self.database_url = Some(url);
            }
        }
        if let Ok(bin) = env::var("SCAFFOLD_NPM_BIN") {
            if !bin.trim().is_empty() {
                self.installer = bin;
            }
        }
    }

    /// Database URL, or a configuration error naming the missing setting
    pub fn require_database_url(&self) -> ScaffoldResult<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            ScaffoldError::Config(
                "no database URL: set DATABASE_URL or database_url in api-scaffold.toml"
                    .to_string(),
            )
        })
    }

    /// Packages to reconcile this run, in order, without duplicates
    pub fn packages_for_run(&self) -> Vec<String> {
        let mut packages: Vec<String> = Vec::new();
        let extra = if self.full_app {
            self.app_packages.as_slice()
        } else {
            &[]
        };
        for pkg in self.required_packages.iter().chain(extra) {
            if !packages.contains(pkg) {
                packages.push(pkg.clone());
            }
        }
        packages
    }

    /// Required env vars with defaults taken from the process environment
    pub fn resolved_env(&self) -> Vec<RequiredEnvVar> {
        self.required_env
            .iter()
            .map(RequiredEnvVar::resolved_from_process)
            .collect()
    }

    /// Names re-exported by the generated environment loader
    pub fn env_names(&self) -> Vec<String> {
        self.required_env.iter().map(|v| v.name.clone()).collect()
    }

    /// Template settings for this run
    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            base_url: self.base_url.clone(),
            api_prefix: self.api_prefix.clone(),
            env_names: self.env_names(),
        }
    }

    pub fn src_dir(&self) -> PathBuf {
        self.project_root.join("src")
    }

    pub fn env_path(&self) -> PathBuf {
        self.project_root.join(&self.env_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_FILE_NAME)
    }

    pub fn tsconfig_path(&self) -> PathBuf {
        self.project_root.join(TSCONFIG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = ScaffoldConfig::default();
        assert_eq!(config.required_env.len(), 6);
        assert_eq!(config.db_schema, "public");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(
            config.packages_for_run(),
            vec!["dotenv", "class-transformer", "class-validator"]
        );
        assert_eq!(config.tsconfig_aliases.len(), 10);
    }

    #[test]
    fn test_full_app_adds_app_packages_once() {
        let config = ScaffoldConfig {
            full_app: true,
            required_packages: vec!["dotenv".into(), "express".into()],
            app_packages: vec!["express".into(), "cors".into()],
            ..Default::default()
        };
        assert_eq!(config.packages_for_run(), vec!["dotenv", "express", "cors"]);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_file(&dir.path().join(CONFIG_FILE_NAME))
            .unwrap()
            .is_none());
        assert!(resolve_config_path(None, dir.path()).is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
api_prefix = "/v1"
full_app = true
required_packages = ["dotenv"]

[[required_env]]
name = "PORT"
default_value = "8080"
"#,
        )
        .unwrap();
        let config = load_config_file(&path).unwrap().unwrap();
        assert_eq!(config.api_prefix, "/v1");
        assert!(config.full_app);
        assert_eq!(config.required_env, vec![RequiredEnvVar::new("PORT", "8080")]);
        assert_eq!(config.db_schema, "public");
        assert_eq!(config.installer, "npm");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "full_app = \"yes please\"").unwrap();
        assert!(load_config_file(&path).is_err());
        let err = ScaffoldConfig::load(None, dir.path()).unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ScaffoldConfig::load(Some(&missing), dir.path()).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_paths_are_rooted() {
        let config = ScaffoldConfig {
            project_root: PathBuf::from("/srv/app"),
            ..Default::default()
        };
        assert_eq!(config.env_path(), PathBuf::from("/srv/app/.env"));
        assert_eq!(config.manifest_path(), PathBuf::from("/srv/app/package.json"));
        assert_eq!(config.src_dir(), PathBuf::from("/srv/app/src"));
    }
}
