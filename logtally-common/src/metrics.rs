//! Cumulative transfer metrics

use crate::parse::LogRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status codes tracked individually. Responses with any other code still
/// contribute to the byte total but are never counted per code.
pub const TRACKED_STATUS_CODES: [u16; 8] = [200, 301, 400, 401, 403, 404, 405, 500];

/// Running totals accumulated over the life of the process.
///
/// `total_bytes` only ever grows; it is never reset during a run. The
/// per-code map holds exactly the codes in [`TRACKED_STATUS_CODES`], each
/// seeded to zero at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    /// Total bytes transferred across all parsed lines
    pub total_bytes: u64,

    /// Request counts per tracked status code
    status_counts: BTreeMap<u16, u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_bytes: 0,
            status_counts: TRACKED_STATUS_CODES.iter().map(|&c| (c, 0)).collect(),
        }
    }

    /// Fold one parsed record into the totals.
    ///
    /// The byte count is added unconditionally; the status counter only
    /// moves when the code is one of the tracked eight.
    pub fn record(&mut self, record: LogRecord) {
        self.total_bytes += record.bytes;
        if let Some(count) = self.status_counts.get_mut(&record.status) {
            *count += 1;
        }
    }

    /// Number of requests seen with the given status code.
    ///
    /// Always zero for codes outside the tracked set.
    pub fn count(&self, status: u16) -> u64 {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    /// Render a full snapshot of the cumulative state.
    ///
    /// First line is the byte total, then one line per status code with a
    /// nonzero count, in ascending code order. Zero counts are omitted.
    /// Rendering does not mutate state; repeated calls with no intervening
    /// updates produce identical output.
    pub fn render_snapshot(&self) -> String {
        let mut out = format!("File size: {}\n", self.total_bytes);
        for (code, count) in &self.status_counts {
            if *count > 0 {
                out.push_str(&format!("{}: {}\n", code, count));
            }
        }
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
