use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use crate::prelude::*;

/// Where the totals are written to or read from.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StorageLocation {
    /// Mounted removable media, e.g. a USB stick.
    RemovableMedia(PathBuf),

    /// The module's own directory, used when no media is available.
    LocalFallback(PathBuf),
}

impl StorageLocation {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RemovableMedia(path) | Self::LocalFallback(path) => path,
        }
    }
}

impl Display for StorageLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemovableMedia(path) => write!(f, "removable media `{}`", path.display()),
            Self::LocalFallback(path) => write!(f, "local fallback `{}`", path.display()),
        }
    }
}

/// Two-tier location selection.
///
/// Nothing is cached: the media may be plugged in or pulled out between any two calls.
#[must_use]
#[derive(Clone, Debug)]
pub struct LocationPolicy {
    media_path: PathBuf,
    local_dir: PathBuf,
    require_mount_point: bool,
}

impl LocationPolicy {
    pub fn new(
        media_path: impl Into<PathBuf>,
        local_dir: impl Into<PathBuf>,
        require_mount_point: bool,
    ) -> Self {
        Self { media_path: media_path.into(), local_dir: local_dir.into(), require_mount_point }
    }

    /// Pick the location to save to right now.
    pub fn resolve(&self) -> StorageLocation {
        if self.is_media_available() {
            StorageLocation::RemovableMedia(self.media_path.clone())
        } else {
            StorageLocation::LocalFallback(self.local_dir.clone())
        }
    }

    /// All locations that may hold saved totals right now, media first.
    #[must_use]
    pub fn candidates(&self) -> Vec<StorageLocation> {
        let mut candidates = Vec::with_capacity(2);
        if self.is_media_available() {
            candidates.push(StorageLocation::RemovableMedia(self.media_path.clone()));
        }
        candidates.push(StorageLocation::LocalFallback(self.local_dir.clone()));
        candidates
    }

    fn is_media_available(&self) -> bool {
        if !self.media_path.is_dir() {
            debug!(path = %self.media_path.display(), "removable media is absent");
            return false;
        }
        if !self.require_mount_point {
            return true;
        }
        match is_mount_point(&self.media_path) {
            Ok(is_mounted) => {
                if !is_mounted {
                    debug!(path = %self.media_path.display(), "removable media is not mounted");
                }
                is_mounted
            }
            Err(error) => {
                warn!(path = %self.media_path.display(), "failed to probe the mount point: {error:#}");
                false
            }
        }
    }
}

/// A mount point lives on a different device than its parent directory.
#[cfg(unix)]
fn is_mount_point(path: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let device = std::fs::metadata(path)?.dev();
    let parent = path.join("..");
    let parent_device = std::fs::metadata(&parent)
        .with_context(|| format!("failed to stat `{}`", parent.display()))?
        .dev();
    Ok(device != parent_device)
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn is_mount_point(_path: &Path) -> Result<bool> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_media_when_present() -> Result {
        let root = tempfile::tempdir()?;
        let media = root.path().join("media");
        let local = root.path().join("local");
        std::fs::create_dir(&local)?;
        let policy = LocationPolicy::new(&media, &local, false);

        assert_eq!(policy.resolve(), StorageLocation::LocalFallback(local.clone()));
        assert_eq!(policy.candidates(), vec![StorageLocation::LocalFallback(local.clone())]);

        std::fs::create_dir(&media)?;
        assert_eq!(policy.resolve(), StorageLocation::RemovableMedia(media.clone()));
        assert_eq!(
            policy.candidates(),
            vec![StorageLocation::RemovableMedia(media.clone()), StorageLocation::LocalFallback(local)],
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn plain_directory_is_not_a_mount_point() -> Result {
        let root = tempfile::tempdir()?;
        let media = root.path().join("media");
        std::fs::create_dir(&media)?;
        let policy = LocationPolicy::new(&media, root.path(), true);
        assert_eq!(policy.resolve(), StorageLocation::LocalFallback(root.path().to_path_buf()));
        Ok(())
    }
}
