//! Output file value object

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Prefix of every generated recording file name
const FILE_PREFIX: &str = "recording";

/// Location of a recording's output file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputTarget {
    path: PathBuf,
}

impl OutputTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build a timestamp-based target inside `dir`.
    ///
    /// The name has millisecond resolution (`recording_20240131_235959_123.m4a`).
    /// When `exists` reports a clash, a numeric suffix is appended until the
    /// name is free.
    pub fn timestamped(
        dir: &Path,
        extension: &str,
        now: DateTime<Local>,
        exists: impl Fn(&Path) -> bool,
    ) -> Self {
        let stem = format!("{}_{}", FILE_PREFIX, now.format("%Y%m%d_%H%M%S_%3f"));
        let mut path = dir.join(format!("{}.{}", stem, extension));
        let mut suffix = 1u32;
        while exists(&path) {
            path = dir.join(format!("{}-{}.{}", stem, suffix, extension));
            suffix += 1;
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }

    /// Absolute path as a string, as handed to event consumers
    pub fn to_path_string(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 1, 31, 23, 59, 58)
            .single()
            .unwrap()
    }

    #[test]
    fn timestamped_name() {
        let target = OutputTarget::timestamped(Path::new("/rec"), "m4a", fixed_time(), |_| false);
        assert_eq!(
            target.path(),
            Path::new("/rec/recording_20240131_235958_000.m4a")
        );
    }

    #[test]
    fn timestamped_avoids_existing_files() {
        let taken = PathBuf::from("/rec/recording_20240131_235958_000.m4a");
        let target = OutputTarget::timestamped(Path::new("/rec"), "m4a", fixed_time(), |p| p == taken);
        assert_eq!(
            target.path(),
            Path::new("/rec/recording_20240131_235958_000-1.m4a")
        );
    }

    #[test]
    fn path_string() {
        let target = OutputTarget::new("/rec/a.m4a");
        assert_eq!(target.to_path_string(), "/rec/a.m4a");
        assert_eq!(target.to_string(), "/rec/a.m4a");
    }
}
