//! Line-oriented statistics report (part of C7).
//!
//! A minimal named-entry writer, not a full metrics subsystem: one run
//! produces one report, written once at the end.

use std::io::Write;
use std::time::Duration;

use crate::error::{MinerError, Result};

/// Run-level counters accumulated by the miner and written out verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Statistics {
    pub total_time: Duration,
    pub pattern_number: u64,
}

impl Statistics {
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "total time: {:.6}", self.total_time.as_secs_f64())
            .and_then(|_| writeln!(writer, "pattern number: {}", self.pattern_number))
            .map_err(|e| MinerError::Allocation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_contains_total_time_and_pattern_number() {
        let stats = Statistics { total_time: Duration::from_millis(1500), pattern_number: 42 };
        let mut buf = Vec::new();
        stats.write(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("total time"));
        assert!(text.contains("pattern number: 42"));
    }
}
