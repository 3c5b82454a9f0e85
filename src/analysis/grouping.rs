//! Per-week organisation of a flat record list.

use std::collections::BTreeMap;

use crate::model::FlareRecord;

/// One line of a per-week summary.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub week: u32,
    pub sources: usize,
    /// Highest `sigma` seen that week, if any row reported one.
    pub max_sigma: Option<f64>,
}

/// Groups records by their `week` field. Rows without a week are skipped.
pub fn group_by_week(records: &[FlareRecord]) -> BTreeMap<u32, Vec<&FlareRecord>> {
    let mut groups: BTreeMap<u32, Vec<&FlareRecord>> = BTreeMap::new();
    for record in records {
        if let Some(week) = record.week {
            groups.entry(week).or_default().push(record);
        }
    }
    groups
}

pub fn summarize_weeks(records: &[FlareRecord]) -> Vec<WeekSummary> {
    group_by_week(records)
        .into_iter()
        .map(|(week, rows)| WeekSummary {
            week,
            sources: rows.len(),
            max_sigma: rows.iter().filter_map(|r| r.sigma).reduce(f64::max),
        })
        .collect()
}
