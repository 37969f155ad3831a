//! Deletion planning over enriched path info.
//!
//! Entries registered within the retention window are roots. Everything
//! reachable from a root through `references` is kept; the remaining
//! descriptors and the NAR files only they use are planned for deletion.
use crate::hash::HASH_LEN;
use crate::narinfo::NARINFO_EXTENSION;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_RETENTION_DAYS: i64 = 90;
pub const STORE_DIR_PREFIX: &str = "/nix/store/";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathInfo {
    pub path: String,
    #[serde(default)]
    pub references: BTreeSet<String>,
    pub registration_time: i64,
    pub download_size: u64,
    pub url: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PrunePlan {
    /// Store paths whose descriptors should be removed.
    pub paths: BTreeSet<String>,
    /// NAR urls to remove, with their download sizes.
    pub nars: BTreeMap<String, u64>,
    pub total_paths: usize,
    pub total_nars: usize,
}

impl PrunePlan {
    pub fn nar_bytes(&self) -> u64 {
        self.nars.values().sum()
    }

    /// One descriptor file name per deleted path, then one line per NAR url.
    pub fn render_lines(&self) -> String {
        let mut out = String::new();
        for path in &self.paths {
            out.push_str(&narinfo_file_name(path));
            out.push('\n');
        }
        for url in self.nars.keys() {
            out.push_str(url);
            out.push('\n');
        }
        out
    }
}

/// Clamp a requested retention to a positive number of days.
pub fn retention_days(requested: Option<i64>) -> i64 {
    match requested {
        Some(days) if days > 0 => days,
        Some(days) => {
            tracing::warn!(
                days,
                default = DEFAULT_RETENTION_DAYS,
                "retention must be positive, using default"
            );
            DEFAULT_RETENTION_DAYS
        }
        None => DEFAULT_RETENTION_DAYS,
    }
}

pub fn cutoff_timestamp(now_epoch_secs: i64, days: i64) -> i64 {
    now_epoch_secs.saturating_sub(days.saturating_mul(SECONDS_PER_DAY))
}

/// Plan deletions for everything not reachable from an entry registered
/// after `cutoff`.
pub fn plan(infos: &[PathInfo], cutoff: i64) -> PrunePlan {
    let by_path: BTreeMap<&str, &PathInfo> =
        infos.iter().map(|info| (info.path.as_str(), info)).collect();
    let roots = infos
        .iter()
        .filter(|info| info.registration_time > cutoff)
        .map(|info| info.path.as_str());
    let kept = reachable(&by_path, roots);

    let mut nars: BTreeMap<String, u64> = by_path
        .values()
        .map(|info| (info.url.clone(), info.download_size))
        .collect();
    let total_nars = nars.len();
    for path in &kept {
        if let Some(info) = by_path.get(path) {
            nars.remove(&info.url);
        }
    }

    let paths = by_path
        .keys()
        .filter(|path| !kept.contains(*path))
        .map(|path| path.to_string())
        .collect();

    PrunePlan {
        paths,
        nars,
        total_paths: by_path.len(),
        total_nars,
    }
}

fn reachable<'a, I>(by_path: &BTreeMap<&'a str, &'a PathInfo>, roots: I) -> BTreeSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut kept = BTreeSet::new();
    let mut stack: Vec<&'a str> = roots.into_iter().collect();
    while let Some(path) = stack.pop() {
        let Some(&info) = by_path.get(path) else {
            tracing::warn!(path, "reference to unknown path");
            continue;
        };
        if !kept.insert(info.path.as_str()) {
            continue;
        }
        for reference in &info.references {
            if !kept.contains(reference.as_str()) {
                stack.push(reference.as_str());
            }
        }
    }
    kept
}

/// `/nix/store/<hash>-name` becomes `<hash>.narinfo`.
pub fn narinfo_file_name(path: &str) -> String {
    let name = path.strip_prefix(STORE_DIR_PREFIX).unwrap_or(path);
    let hash: String = name.chars().take(HASH_LEN).collect();
    format!("{hash}.{NARINFO_EXTENSION}")
}
