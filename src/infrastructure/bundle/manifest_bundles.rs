//! Filesystem-backed identity introspection
//!
//! Answers identity queries the way the OS container loader does: a
//! container is identified by the manifest in its `Contents/` directory,
//! and a bare executable has no identifier.

use std::path::{Path, PathBuf};

use crate::application::ports::{BundleIntrospection, BundleRef};
use crate::domain::identity::ContainerLayout;

use crate::infrastructure::manifest;

pub struct ManifestBundles {
    executable: PathBuf,
}

impl ManifestBundles {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn main_container(&self) -> Option<PathBuf> {
        ContainerLayout::enclosing(&self.executable)
    }

    fn read_identifier(container: &Path) -> Option<String> {
        let path = ContainerLayout::new(container).manifest_path();
        manifest::read(&path)
            .ok()
            .and_then(|dict| manifest::identifier(&dict))
    }
}

impl BundleIntrospection for ManifestBundles {
    fn container_path(&self, bundle: &BundleRef) -> Option<PathBuf> {
        match bundle {
            BundleRef::Main => self
                .main_container()
                .or_else(|| self.executable.parent().map(Path::to_path_buf)),
            BundleRef::At(path) => path.is_dir().then(|| path.clone()),
        }
    }

    fn identifier(&self, bundle: &BundleRef) -> Option<String> {
        match bundle {
            BundleRef::Main => self
                .main_container()
                .and_then(|container| Self::read_identifier(&container)),
            BundleRef::At(path) => Self::read_identifier(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::manifest::ManifestDefaults;
    use tempfile::TempDir;

    fn make_container(root: &Path, identifier: &str) -> PathBuf {
        let container = root.join("Sample.app");
        let layout = ContainerLayout::new(&container);
        std::fs::create_dir_all(layout.executables_dir()).unwrap();
        let dict = ManifestDefaults {
            identifier,
            name: "Sample",
            executable: "sample",
        }
        .to_dictionary();
        manifest::write(&layout.manifest_path(), &dict).unwrap();
        container
    }

    #[test]
    fn bare_executable_has_no_identifier() {
        let bundles = ManifestBundles::new("/usr/local/bin/notifytool");
        assert_eq!(bundles.identifier(&BundleRef::Main), None);
        assert_eq!(
            bundles.container_path(&BundleRef::Main),
            Some(PathBuf::from("/usr/local/bin"))
        );
    }

    #[test]
    fn container_at_path_reports_manifest_identifier() {
        let dir = TempDir::new().unwrap();
        let container = make_container(dir.path(), "com.example.sample");
        let bundles = ManifestBundles::new("/usr/local/bin/notifytool");

        assert_eq!(
            bundles.identifier(&BundleRef::At(container.clone())),
            Some("com.example.sample".to_string())
        );
        assert_eq!(
            bundles.container_path(&BundleRef::At(container.clone())),
            Some(container)
        );
    }

    #[test]
    fn executable_inside_container_is_main() {
        let dir = TempDir::new().unwrap();
        let container = make_container(dir.path(), "com.example.sample");
        let exe = ContainerLayout::new(&container).executable_path("sample");
        let bundles = ManifestBundles::new(exe);

        assert_eq!(bundles.container_path(&BundleRef::Main), Some(container));
        assert_eq!(
            bundles.identifier(&BundleRef::Main),
            Some("com.example.sample".to_string())
        );
    }

    #[test]
    fn missing_container_is_none() {
        let bundles = ManifestBundles::new("/usr/local/bin/notifytool");
        let at = BundleRef::At(PathBuf::from("/nonexistent/Missing.app"));
        assert_eq!(bundles.container_path(&at), None);
        assert_eq!(bundles.identifier(&at), None);
    }
}
