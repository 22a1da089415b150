use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use modbump_core::{
    compare_module_versions, GoModFile, ManifestError, ModuleVersion, Requirement,
};
use modbump_registry::{LatestVersionSource, RegistryError};
use thiserror::Error;

use crate::upgrade::{DependencyUpgrader, UpgradeCommandError};

#[derive(Debug, Error)]
pub(crate) enum UpgradeError {
    #[error("manifest could not be read")]
    ManifestRead(#[source] ManifestError),
    #[error("failed to look up the latest version of module {module}")]
    Registry {
        module: String,
        #[source]
        source: RegistryError,
    },
    #[error("failed to upgrade module {module}")]
    UpgradeCommand {
        module: String,
        #[source]
        source: UpgradeCommandError,
    },
    #[error(
        "go version mismatch: the required go version has been updated from {baseline} to {updated}; \
         this change is due to an update in the module: {module}"
    )]
    ToolchainVersionMismatch {
        baseline: String,
        updated: String,
        module: String,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum RunMode {
    Upgrade,
    CheckOnly,
}

/// A dependency whose registry release sorts above the version in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewVersionNotice {
    pub(crate) module: String,
    pub(crate) declared: ModuleVersion,
    pub(crate) latest: String,
}

impl fmt::Display for NewVersionNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module {} has new version: {}", self.module, self.declared)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpgradeReport {
    pub(crate) mode: RunMode,
    pub(crate) go_version: String,
    pub(crate) processed: Vec<String>,
    pub(crate) notices: Vec<NewVersionNotice>,
}

/// Walks the manifest's requirements in order: look up, upgrade, re-read,
/// verify the `go` directive. Stops at the first failure and leaves any
/// upgrades already applied in place.
pub(crate) fn run_upgrades<R, U, F>(
    manifest_path: &Path,
    mode: RunMode,
    registry: &R,
    upgrader: &mut U,
    mut on_notice: F,
) -> Result<UpgradeReport, UpgradeError>
where
    R: LatestVersionSource + ?Sized,
    U: DependencyUpgrader + ?Sized,
    F: FnMut(&NewVersionNotice),
{
    let manifest = GoModFile::read(manifest_path).map_err(UpgradeError::ManifestRead)?;
    let baseline = manifest.go_version.clone();
    tracing::info!(
        manifest = %manifest_path.display(),
        go_version = %baseline,
        requirements = manifest.requires.len(),
        ?mode,
        "starting dependency run"
    );

    let mut report = UpgradeReport {
        mode,
        go_version: baseline.clone(),
        processed: Vec::with_capacity(manifest.requires.len()),
        notices: Vec::new(),
    };

    for requirement in &manifest.requires {
        if let Some(notice) = check_requirement(registry, requirement)? {
            on_notice(&notice);
            report.notices.push(notice);
        }

        if mode == RunMode::CheckOnly {
            report.processed.push(requirement.path.clone());
            continue;
        }

        upgrader
            .upgrade(&requirement.path)
            .map_err(|source| UpgradeError::UpgradeCommand {
                module: requirement.path.clone(),
                source,
            })?;

        let updated = GoModFile::read(manifest_path).map_err(UpgradeError::ManifestRead)?;
        if updated.go_version != baseline {
            return Err(UpgradeError::ToolchainVersionMismatch {
                baseline,
                updated: updated.go_version,
                module: requirement.path.clone(),
            });
        }
        report.processed.push(requirement.path.clone());
    }

    tracing::info!(processed = report.processed.len(), "dependency run finished");
    Ok(report)
}

fn check_requirement<R>(
    registry: &R,
    requirement: &Requirement,
) -> Result<Option<NewVersionNotice>, UpgradeError>
where
    R: LatestVersionSource + ?Sized,
{
    let latest = registry
        .latest_version(&requirement.path)
        .map_err(|source| UpgradeError::Registry {
            module: requirement.path.clone(),
            source,
        })?;

    if let Err(err) = ModuleVersion::parse(&latest.version) {
        tracing::warn!(module = %requirement.path, %err, "registry reported a non-semver version");
    }

    let ordering = compare_module_versions(&latest.version, requirement.version.as_str());
    if ordering == Ordering::Greater {
        return Ok(Some(NewVersionNotice {
            module: requirement.path.clone(),
            declared: requirement.version.clone(),
            latest: latest.version,
        }));
    }
    tracing::debug!(module = %requirement.path, version = %requirement.version, "already at latest");
    Ok(None)
}
