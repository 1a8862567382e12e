//! Info.plist manifest reading, merging, and writing

use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};
use thiserror::Error;

use crate::domain::identity::MANIFEST_FILE;

pub const KEY_IDENTIFIER: &str = "CFBundleIdentifier";
pub const KEY_NAME: &str = "CFBundleName";
pub const KEY_EXECUTABLE: &str = "CFBundleExecutable";
pub const KEY_PACKAGE_TYPE: &str = "CFBundlePackageType";
pub const KEY_VERSION: &str = "CFBundleVersion";
pub const KEY_SHORT_VERSION: &str = "CFBundleShortVersionString";
pub const KEY_MINIMUM_SYSTEM: &str = "LSMinimumSystemVersion";
/// Configured identifier the container was built for; a template may
/// still override `CFBundleIdentifier`
pub const KEY_CONFIGURED_IDENTIFIER: &str = "NTConfiguredIdentifier";

/// Directory name that marks the top of the user area
const USERS_DIR: &str = "Users";

/// Manifest errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Manifest {0} is not a dictionary")]
    NotADictionary(PathBuf),

    #[error("Failed to write manifest {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Values the container manifest must always carry
#[derive(Debug, Clone)]
pub struct ManifestDefaults<'a> {
    pub identifier: &'a str,
    pub name: &'a str,
    pub executable: &'a str,
}

impl ManifestDefaults<'_> {
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.insert(KEY_IDENTIFIER.to_string(), Value::from(self.identifier));
        dict.insert(KEY_NAME.to_string(), Value::from(self.name));
        dict.insert(KEY_EXECUTABLE.to_string(), Value::from(self.executable));
        dict.insert(KEY_PACKAGE_TYPE.to_string(), Value::from("APPL"));
        dict.insert(KEY_VERSION.to_string(), Value::from("1"));
        dict.insert(KEY_SHORT_VERSION.to_string(), Value::from("1.0"));
        dict.insert(KEY_MINIMUM_SYSTEM.to_string(), Value::from("11.0"));
        dict
    }
}

/// Search for a manifest template next to the executable, then upwards.
///
/// Stops at the filesystem root, at a directory named `Users`, or at the
/// parent of `home`.
pub fn find_template(executable_dir: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let boundary = home.and_then(Path::parent);

    for dir in executable_dir.ancestors() {
        if dir.parent().is_none() {
            break;
        }
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if Some(dir) == boundary || dir.file_name().is_some_and(|name| name == USERS_DIR) {
            break;
        }
    }

    None
}

/// Read a manifest dictionary (XML or binary plist)
pub fn read(path: &Path) -> Result<Dictionary, ManifestError> {
    let value = Value::from_file(path).map_err(|e| ManifestError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    value
        .into_dictionary()
        .ok_or_else(|| ManifestError::NotADictionary(path.to_path_buf()))
}

/// Layer a discovered template over the required defaults.
///
/// Template values win; identifier and executable are injected only when
/// the template lacks them.
pub fn merge(template: Option<Dictionary>, defaults: Dictionary) -> Dictionary {
    let mut merged = defaults;
    if let Some(template) = template {
        for (key, value) in template {
            merged.insert(key, value);
        }
    }
    merged
}

/// Configured identifier recorded at build time, if any
pub fn configured_identifier(manifest: &Dictionary) -> Option<&str> {
    manifest
        .get(KEY_CONFIGURED_IDENTIFIER)
        .and_then(Value::as_string)
}

/// Write a manifest as XML plist, readable by everyone
pub fn write(path: &Path, manifest: &Dictionary) -> Result<(), ManifestError> {
    let write_error = |message: String| ManifestError::Write {
        path: path.to_path_buf(),
        message,
    };

    Value::Dictionary(manifest.clone())
        .to_file_xml(path)
        .map_err(|e| write_error(e.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
            .map_err(|e| write_error(e.to_string()))?;
    }

    Ok(())
}

/// Declared bundle identifier, if any
pub fn identifier(manifest: &Dictionary) -> Option<String> {
    manifest
        .get(KEY_IDENTIFIER)
        .and_then(Value::as_string)
        .map(str::to_string)
}
