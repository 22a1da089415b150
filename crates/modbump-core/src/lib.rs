mod manifest;
mod version;

pub use manifest::{GoModFile, ManifestError, Requirement};
pub use version::{compare_module_versions, ModuleVersion, VersionError};
