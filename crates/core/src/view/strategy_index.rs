use crate::domain::analysis::AnalysisRow;
use std::collections::HashSet;

/// Distinct strategy names across a batch, in first-seen order.
///
/// Rows are scanned in order and each row's strategies in their own order; the result drives
/// the left-to-right order of the strategy tabs.
pub fn build_strategy_index(rows: &[AnalysisRow]) -> Vec<String> {
    let mut seen = HashSet::<&str>::new();
    let mut out = Vec::new();
    for row in rows {
        for strategy in &row.strategies {
            if seen.insert(strategy.name.as_str()) {
                out.push(strategy.name.clone());
            }
        }
    }
    out
}
