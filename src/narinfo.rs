//! Read-only access to `<hash>.narinfo` descriptor files.
//!
//! Only two facts are taken from a descriptor: the `StorePath:` on its first
//! line and its filesystem modification time.
use crate::error::EnrichError;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const NARINFO_EXTENSION: &str = "narinfo";
pub const STORE_PATH_PREFIX: &str = "StorePath: ";

const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Return `base_dir/<hash>.narinfo`.
pub fn narinfo_path(base_dir: &Path, hash: &str) -> PathBuf {
    base_dir.join(format!("{hash}.{NARINFO_EXTENSION}"))
}

/// Read the canonical store path from the descriptor's first line.
pub fn read_store_path(path: &Path) -> Result<String, EnrichError> {
    let file = File::open(path).map_err(|source| EnrichError::DescriptorNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut first_line = String::new();
    let read = reader
        .read_line(&mut first_line)
        .map_err(|source| match source.kind() {
            ErrorKind::InvalidData => {
                malformed(path, format!("first line is not UTF-8: {source}"))
            }
            _ => EnrichError::DescriptorNotFound {
                path: path.to_path_buf(),
                source,
            },
        })?;
    if read == 0 {
        return Err(malformed(path, "file is empty".to_string()));
    }
    parse_store_path_line(&first_line).ok_or_else(|| {
        malformed(
            path,
            format!(
                "first line {:?} does not start with {STORE_PATH_PREFIX:?}",
                first_line.trim_end()
            ),
        )
    })
}

/// Strip trailing whitespace and the `StorePath: ` prefix from a line.
pub fn parse_store_path_line(line: &str) -> Option<String> {
    line.trim_end()
        .strip_prefix(STORE_PATH_PREFIX)
        .map(str::to_string)
}

/// Descriptor modification time in whole seconds since the epoch.
pub fn registration_time(path: &Path) -> Result<i64, EnrichError> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| EnrichError::DescriptorNotFound {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(round_to_seconds(epoch_nanos(modified)))
}

fn epoch_nanos(time: SystemTime) -> i128 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i128::try_from(after.as_nanos()).unwrap_or(i128::MAX),
        Err(before) => -i128::try_from(before.duration().as_nanos()).unwrap_or(i128::MAX),
    }
}

/// Round nanoseconds to the nearest second, ties to even.
pub fn round_to_seconds(nanos: i128) -> i64 {
    let mut secs = nanos.div_euclid(NANOS_PER_SEC);
    let rem = nanos.rem_euclid(NANOS_PER_SEC);
    let half = NANOS_PER_SEC / 2;
    if rem > half || (rem == half && secs % 2 != 0) {
        secs += 1;
    }
    i64::try_from(secs).unwrap_or(if secs < 0 { i64::MIN } else { i64::MAX })
}

fn malformed(path: &Path, reason: String) -> EnrichError {
    EnrichError::MalformedDescriptor {
        path: path.to_path_buf(),
        reason,
    }
}
