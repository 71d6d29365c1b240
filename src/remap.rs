//! Identity remapping: merge one track identifier into another.
//!
//! A remap rewrites the detection table and nothing else. Any reconstruction,
//! summary, metric or rendered video derived from the old table is stale after
//! a batch that changed at least one row, since a merge can move gaps and
//! velocity samples between two identities at once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::table::DetectionTable;
use crate::{Error, Result};

/// One operator edit: every detection of `old_id` becomes `new_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapRequest {
    pub old_id: i64,
    pub new_id: i64,
}

impl RemapRequest {
    pub fn new(old_id: i64, new_id: i64) -> Self {
        Self { old_id, new_id }
    }
}

impl fmt::Display for RemapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.old_id, self.new_id)
    }
}

/// Parses `old:new` or `old=new`.
impl FromStr for RemapRequest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (old, new) = s
            .split_once([':', '='])
            .ok_or_else(|| Error::InvalidRemap(format!("expected `old:new`, got `{}`", s)))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|e| Error::InvalidRemap(format!("`{}` in `{}`: {}", part.trim(), s, e)))
        };

        Ok(Self::new(parse(old)?, parse(new)?))
    }
}

/// Result of applying a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemapReport {
    pub request: RemapRequest,
    pub rows_changed: usize,
}

impl RemapReport {
    /// True when the request left every row as it was.
    pub fn is_noop(&self) -> bool {
        self.rows_changed == 0
    }
}

/// A rewritten table together with how many rows changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RemapOutcome {
    pub table: DetectionTable,
    pub rows_changed: usize,
}

impl RemapOutcome {
    pub fn is_noop(&self) -> bool {
        self.rows_changed == 0
    }
}

/// Rewrite every row whose track id is `old_id` to `new_id`.
///
/// All other fields and rows are untouched and row order is preserved. An
/// `old_id` that matches nothing, or equals `new_id`, returns an identical
/// table with `rows_changed == 0`.
pub fn remap(table: &DetectionTable, old_id: i64, new_id: i64) -> RemapOutcome {
    let mut table = table.clone();
    let rows_changed = remap_in_place(&mut table, old_id, new_id);
    RemapOutcome {
        table,
        rows_changed,
    }
}

fn remap_in_place(table: &mut DetectionTable, old_id: i64, new_id: i64) -> usize {
    if old_id == new_id {
        debug!(old_id, "Remap onto the same id ignored");
        return 0;
    }

    let mut changed = 0;
    for det in table.rows_mut() {
        if det.track_id == old_id {
            det.track_id = new_id;
            changed += 1;
        }
    }

    if changed == 0 {
        warn!(old_id, new_id, "Remap matched no detections");
    } else {
        debug!(old_id, new_id, rows = changed, "Remapped track id");
    }
    changed
}

/// A batch of remaps applied to a copy of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub table: DetectionTable,
    pub reports: Vec<RemapReport>,
}

impl BatchOutcome {
    /// True when at least one row changed, so derived data must be rebuilt.
    pub fn changed(&self) -> bool {
        self.reports.iter().any(|report| !report.is_noop())
    }

    pub fn rows_changed(&self) -> usize {
        self.reports.iter().map(|report| report.rows_changed).sum()
    }

    /// Requests whose `old_id` was absent when they were applied.
    pub fn noops(&self) -> impl Iterator<Item = &RemapRequest> {
        self.reports
            .iter()
            .filter(|report| report.is_noop())
            .map(|report| &report.request)
    }
}

/// Apply requests in submission order, each one seeing the effect of the ones
/// before it, so `a -> b` followed by `b -> c` sends `a` to `c`.
///
/// The input table is never modified.
pub fn apply_batch(table: &DetectionTable, requests: &[RemapRequest]) -> BatchOutcome {
    let mut working = table.clone();
    let reports: Vec<RemapReport> = requests
        .iter()
        .map(|&request| RemapReport {
            request,
            rows_changed: remap_in_place(&mut working, request.old_id, request.new_id),
        })
        .collect();

    let outcome = BatchOutcome {
        table: working,
        reports,
    };
    info!(
        requests = requests.len(),
        rows_changed = outcome.rows_changed(),
        "Remap batch applied"
    );
    outcome
}
