use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::Path,
    time::SystemTime,
};

use crate::prelude::*;

pub const CHARGED_FILE_NAME: &str = "index_charged";
pub const DISCHARGED_FILE_NAME: &str = "index_discharged";

/// Single persisted total: one decimal number in a plain text file.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Record {
    pub value: f64,
    pub modified_at: SystemTime,
}

impl Record {
    /// Read the record, `None` if the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(error).with_context(|| format!("failed to read `{}`", path.display()));
            }
        };
        let value = parse(&contents)
            .with_context(|| format!("malformed record `{}`", path.display()))?;
        let modified_at = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .with_context(|| format!("failed to get the modification time of `{}`", path.display()))?;
        Ok(Some(Self { value, modified_at }))
    }

    /// Replace the record so that a crash leaves either the old or the new value, never a torn one.
    pub fn write(path: &Path, value: f64) -> Result {
        let temporary_path = path.with_extension("tmp");
        let mut file = File::create(&temporary_path)
            .with_context(|| format!("failed to create `{}`", temporary_path.display()))?;
        write!(file, "{value:?}")
            .and_then(|()| file.sync_all())
            .with_context(|| format!("failed to write `{}`", temporary_path.display()))?;
        drop(file);
        fs::rename(&temporary_path, path).with_context(|| {
            format!("failed to move `{}` to `{}`", temporary_path.display(), path.display())
        })
    }
}

fn parse(contents: &str) -> Result<f64> {
    let value: f64 = contents.trim().parse()?;
    ensure!(value.is_finite() && value >= 0.0, "`{value}` is not a valid energy total");
    Ok(value)
}

/// Persist the directory entries after the renames.
#[cfg(unix)]
pub fn sync_directory(path: &Path) -> Result {
    File::open(path)
        .and_then(|directory| directory.sync_all())
        .with_context(|| format!("failed to sync `{}`", path.display()))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn sync_directory(_path: &Path) -> Result {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() -> Result {
        assert_eq!(parse("48.0")?, 48.0);
        assert_eq!(parse("  12.5\n")?, 12.5);
        assert_eq!(parse("1e+300")?, 1e300);
        assert_eq!(parse("0")?, 0.0);
        Ok(())
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("twelve").is_err());
        assert!(parse("-1.0").is_err());
        assert!(parse("NaN").is_err());
        assert!(parse("inf").is_err());
    }

    #[test]
    fn missing_record_is_none() -> Result {
        let directory = tempfile::tempdir()?;
        assert!(Record::read(&directory.path().join(CHARGED_FILE_NAME))?.is_none());
        Ok(())
    }

    #[test]
    fn write_leaves_no_temporary_file() -> Result {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join(CHARGED_FILE_NAME);
        Record::write(&path, 1.5)?;
        Record::write(&path, 2.5)?;
        assert_eq!(fs::read_to_string(&path)?, "2.5");
        assert!(!path.with_extension("tmp").exists());
        Ok(())
    }
}
