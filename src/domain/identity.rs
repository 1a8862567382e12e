//! Synthetic application identity value object

use std::fmt;
use std::path::{Path, PathBuf};

/// Directory extension the OS treats as an application container
pub const APP_EXTENSION: &str = "app";

/// Name of the manifest file inside `Contents/`
pub const MANIFEST_FILE: &str = "Info.plist";

/// The identity this process presents to the notification service.
///
/// Computed fresh on every start from the running executable. Only its
/// effects (the container directory and its manifest) persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDescriptor {
    /// Root of the application container (`<Name>.app`)
    pub container_path: PathBuf,
    /// Reverse-domain identifier declared by the container's manifest
    pub identifier: String,
    /// Executable name as the OS sees it inside `Contents/MacOS`
    pub executable_name: String,
    /// Byte size of the executable, used as the staleness signal
    pub fingerprint: u64,
}

impl IdentityDescriptor {
    /// `<container>/Contents/Info.plist`
    pub fn manifest_path(&self) -> PathBuf {
        ContainerLayout::new(&self.container_path).manifest_path()
    }

    /// `<container>/Contents/MacOS/<executable>`
    pub fn executable_path(&self) -> PathBuf {
        ContainerLayout::new(&self.container_path).executable_path(&self.executable_name)
    }
}

impl fmt::Display for IdentityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier, self.container_path.display())
    }
}

/// Paths inside an application container
#[derive(Debug, Clone, Copy)]
pub struct ContainerLayout<'a> {
    root: &'a Path,
}

impl<'a> ContainerLayout<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    pub fn contents_dir(&self) -> PathBuf {
        self.root.join("Contents")
    }

    pub fn executables_dir(&self) -> PathBuf {
        self.contents_dir().join("MacOS")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.contents_dir().join(MANIFEST_FILE)
    }

    pub fn executable_path(&self, executable_name: &str) -> PathBuf {
        self.executables_dir().join(executable_name)
    }

    /// Find the container an executable already lives in.
    ///
    /// Matches `<X>.app/Contents/MacOS/<exe>` and returns `<X>.app`.
    pub fn enclosing(executable: &Path) -> Option<PathBuf> {
        let macos_dir = executable.parent()?;
        if macos_dir.file_name()? != "MacOS" {
            return None;
        }
        let contents_dir = macos_dir.parent()?;
        if contents_dir.file_name()? != "Contents" {
            return None;
        }
        let container = contents_dir.parent()?;
        if container.extension()? != APP_EXTENSION {
            return None;
        }
        Some(container.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosing_detects_app_layout() {
        let exe = Path::new("/Applications/Foo.app/Contents/MacOS/foo");
        assert_eq!(
            ContainerLayout::enclosing(exe),
            Some(PathBuf::from("/Applications/Foo.app"))
        );
    }

    #[test]
    fn enclosing_rejects_bare_binary() {
        assert!(ContainerLayout::enclosing(Path::new("/usr/local/bin/notifytool")).is_none());
    }

    #[test]
    fn enclosing_requires_app_extension() {
        let exe = Path::new("/opt/Foo.bundle/Contents/MacOS/foo");
        assert!(ContainerLayout::enclosing(exe).is_none());
    }

    #[test]
    fn enclosing_requires_contents_dir() {
        let exe = Path::new("/opt/Foo.app/Stuff/MacOS/foo");
        assert!(ContainerLayout::enclosing(exe).is_none());
    }

    #[test]
    fn descriptor_paths() {
        let descriptor = IdentityDescriptor {
            container_path: PathBuf::from("/tmp/NotifyTool.app"),
            identifier: "com.example.notifytool".to_string(),
            executable_name: "notifytool".to_string(),
            fingerprint: 42,
        };
        assert_eq!(
            descriptor.manifest_path(),
            PathBuf::from("/tmp/NotifyTool.app/Contents/Info.plist")
        );
        assert_eq!(
            descriptor.executable_path(),
            PathBuf::from("/tmp/NotifyTool.app/Contents/MacOS/notifytool")
        );
    }
}
