use crate::report::{PerformanceStats, TradeAnalysis};
use crate::stats::{PnlView, aggregate};
use std::collections::{BTreeMap, BTreeSet};

/// Raw stats per ticker, keyed by symbol (or ticker id when no symbol is embedded).
pub fn breakdown_by_ticker(analyses: &[TradeAnalysis]) -> BTreeMap<String, PerformanceStats> {
    group_stats(analyses, |analysis| vec![analysis.metrics.ticker.clone()])
}

/// Raw stats per tag id. A trade with several tags counts towards each of them;
/// untagged trades are left out.
pub fn breakdown_by_tag(analyses: &[TradeAnalysis]) -> BTreeMap<String, PerformanceStats> {
    group_stats(analyses, |analysis| analysis.metrics.tags.clone())
}

fn group_stats<F>(analyses: &[TradeAnalysis], keys: F) -> BTreeMap<String, PerformanceStats>
where
    F: Fn(&TradeAnalysis) -> Vec<String>,
{
    let mut groups: BTreeMap<String, Vec<TradeAnalysis>> = BTreeMap::new();
    for analysis in analyses {
        let unique: BTreeSet<String> = keys(analysis).into_iter().collect();
        for key in unique {
            groups.entry(key).or_default().push(analysis.clone());
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| (key, aggregate(&members, PnlView::Raw)))
        .collect()
}
