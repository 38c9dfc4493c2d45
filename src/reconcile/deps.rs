use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::{ScaffoldError, ScaffoldResult};

/// The parts of `package.json` the reconciler reads
///
/// Only key presence matters; version strings are never interpreted.
#[derive(Debug, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
    /// Read and parse a manifest
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Declared in either dependency group
    pub fn declares(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }
}

/// External command that installs a single package
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install `package` into the project and wait for completion
    async fn install(&self, package: &str) -> anyhow::Result<()>;
}

/// Runs `<bin> install <package>` in the project root
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    bin: String,
    project_root: PathBuf,
}

impl CommandInstaller {
    pub fn new(bin: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            project_root: project_root.into(),
        }
    }
}

#[async_trait]
impl PackageInstaller for CommandInstaller {
    async fn install(&self, package: &str) -> anyhow::Result<()> {
        let status = Command::new(&self.bin)
            .arg("install")
            .arg(package)
            .current_dir(&self.project_root)
            .status()
            .await
            .with_context(|| format!("failed to spawn {}", self.bin))?;
        if !status.success() {
            anyhow::bail!("{} install {} exited with {}", self.bin, package, status);
        }
        Ok(())
    }
}

/// What happened to one required package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyPresent,
    Installed,
}

/// Install `package` unless the manifest at `manifest_path` already declares it
///
/// The manifest is re-read on every call so packages installed earlier in the
/// same run are seen.
///
/// # Errors
///
/// Returns [`ScaffoldError::DependencyInstall`] naming the package if the
/// manifest cannot be read or the install command fails.
pub async fn ensure_installed<I: PackageInstaller + ?Sized>(
    installer: &I,
    manifest_path: &Path,
    package: &str,
) -> ScaffoldResult<InstallOutcome> {
    let manifest =
        PackageManifest::load(manifest_path).map_err(|source| ScaffoldError::DependencyInstall {
            package: package.to_string(),
            source,
        })?;

    if manifest.declares(package) {
        debug!("{package} already declared");
        return Ok(InstallOutcome::AlreadyPresent);
    }

    info!("Installing {package}...");
    installer
        .install(package)
        .await
        .map_err(|source| ScaffoldError::DependencyInstall {
            package: package.to_string(),
            source,
        })?;
    info!("{package} installed successfully.");
    Ok(InstallOutcome::Installed)
}

/// Reconcile every package in order, one at a time
///
/// A failed package is logged and reported; later packages are still
/// attempted and earlier installs are kept. Duplicates in `packages` are
/// attempted once.
pub async fn ensure_all<I: PackageInstaller + ?Sized>(
    installer: &I,
    manifest_path: &Path,
    packages: &[String],
) -> (Vec<String>, Vec<ScaffoldError>) {
    let mut installed = Vec::new();
    let mut failures = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for package in packages {
        if seen.contains(&package.as_str()) {
            continue;
        }
        seen.push(package.as_str());

        match ensure_installed(installer, manifest_path, package).await {
            Ok(InstallOutcome::Installed) => installed.push(package.clone()),
            Ok(InstallOutcome::AlreadyPresent) => {}
            Err(e) => {
                error!("{e}");
                failures.push(e);
            }
        }
    }

    (installed, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInstaller {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl PackageInstaller for RecordingInstaller {
        async fn install(&self, package: &str) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(package.to_string());
            if self.fail_on == Some(package) {
                anyhow::bail!("registry unreachable");
            }
            Ok(())
        }
    }

    fn manifest(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("package.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_declared_in_either_group_is_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest(
            dir.path(),
            r#"{"dependencies":{"dotenv":"^16.0.0"},"devDependencies":{"class-validator":"^0.14.0"}}"#,
        );
        let installer = RecordingInstaller::default();
        let packages: Vec<String> = ["dotenv", "class-validator", "class-transformer"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (installed, failures) = ensure_all(&installer, &path, &packages).await;
        assert!(failures.is_empty());
        assert_eq!(installed, vec!["class-transformer"]);
        assert_eq!(*installer.calls.lock().unwrap(), vec!["class-transformer"]);
    }

    #[tokio::test]
    async fn test_duplicates_install_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest(dir.path(), "{}");
        let installer = RecordingInstaller::default();
        let packages = vec!["cors".to_string(), "cors".to_string()];

        ensure_all(&installer, &path, &packages).await;
        assert_eq!(*installer.calls.lock().unwrap(), vec!["cors"]);
    }

    #[tokio::test]
    async fn test_failure_is_per_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest(dir.path(), r#"{"name":"app"}"#);
        let installer = RecordingInstaller {
            fail_on: Some("helmet"),
            ..Default::default()
        };
        let packages = vec!["helmet".to_string(), "compression".to_string()];

        let (installed, failures) = ensure_all(&installer, &path, &packages).await;
        assert_eq!(installed, vec!["compression"]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].to_string().contains("helmet"));
    }

    #[tokio::test]
    async fn test_missing_manifest_names_package() {
        let dir = tempfile::tempdir().unwrap();
        let installer = RecordingInstaller::default();
        let err = ensure_installed(&installer, &dir.path().join("package.json"), "dotenv")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::DependencyInstall { ref package, .. } if package == "dotenv"
        ));
        assert!(installer.calls.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_installer_reports_exit_status() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("npm");
        fs::write(
            &stub,
            "#!/bin/sh\nif [ \"$2\" = \"broken\" ]; then\n    exit 1\nfi\nexit 0\n",
        )
        .unwrap();
        let mut perms = fs::metadata(&stub).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&stub, perms).unwrap();

        let installer = CommandInstaller::new(stub.to_string_lossy(), dir.path());
        assert!(installer.install("dotenv").await.is_ok());
        let err = installer.install("broken").await.unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
