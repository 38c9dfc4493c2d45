//! # Reconcile Module
//!
//! Merges the generator's requirements into files the project already owns,
//! adding what is missing and leaving everything else alone.
//!
//! - [`env`] - appends missing `NAME=value` lines to the environment file
//! - [`deps`] - installs required packages absent from `package.json`
//!
//! Both are safe to run repeatedly: a second run finds nothing to add.

pub mod deps;
pub mod env;

pub use deps::{
    ensure_all, ensure_installed, CommandInstaller, InstallOutcome, PackageInstaller,
    PackageManifest,
};
pub use env::{reconcile_env_content, reconcile_env_file};
