use crate::domain::analysis::{AnalysisRow, Confidences, SplitRecommendation, StrategyOpinion};
use crate::ingest::types::{RawField, RawRecord};
use serde_json::Value;

const REASON_SEPARATOR: &str = " - ";

/// Convert one backend record into its canonical form. Never fails.
pub fn normalize(raw: &RawRecord) -> AnalysisRow {
    AnalysisRow {
        ticker: raw.ticker.clone().unwrap_or_default(),
        date: raw.date.clone(),
        short_term: split_recommendation(raw.short_term.as_deref()),
        long_term: split_recommendation(raw.long_term.as_deref()),
        overall: split_recommendation(raw.overall.as_deref()),
        confidences: Confidences {
            short: raw.short_confidence,
            long: raw.long_confidence,
            overall: raw.overall_confidence,
        },
        strategies: decode_strategies(&raw.strategies),
        sources: decode_sources(&raw.sources),
    }
}

pub fn normalize_batch(raw: &[RawRecord]) -> Vec<AnalysisRow> {
    raw.iter().map(normalize).collect()
}

/// Split on the first " - ". Without a separator the whole text is the recommendation.
pub fn split_recommendation(field: Option<&str>) -> SplitRecommendation {
    match field {
        None | Some("") => SplitRecommendation::default(),
        Some(text) => match text.split_once(REASON_SEPARATOR) {
            Some((recommendation, reason)) => SplitRecommendation {
                recommendation: recommendation.to_string(),
                reason: reason.to_string(),
            },
            None => SplitRecommendation {
                recommendation: text.to_string(),
                reason: String::new(),
            },
        },
    }
}

/// Decode the strategies field into a list. Malformed JSON is logged and yields an empty list.
pub fn decode_strategies(field: &RawField) -> Vec<StrategyOpinion> {
    let items = match field {
        RawField::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            Ok(_) => return Vec::new(),
            Err(err) => {
                tracing::error!(error = %err, "strategies field is not valid JSON");
                return Vec::new();
            }
        },
        RawField::List(items) => items.clone(),
        RawField::Missing | RawField::Other(_) => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<StrategyOpinion>(item) {
            Ok(opinion) => Some(opinion),
            Err(err) => {
                tracing::debug!(error = %err, "skipping malformed strategy entry");
                None
            }
        })
        .collect()
}

/// Decode the sources field into a list of URLs. Failures yield an empty list silently.
pub fn decode_sources(field: &RawField) -> Vec<String> {
    let items = match field {
        RawField::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        RawField::List(items) => items.clone(),
        RawField::Missing | RawField::Other(_) => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url),
            _ => None,
        })
        .collect()
}

/// Sources shown for a batch are those of its first row.
pub fn batch_sources(rows: &[AnalysisRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.sources.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn split_without_separator_keeps_whole_text() {
        let s = split_recommendation(Some("HOLD"));
        assert_eq!(s.recommendation, "HOLD");
        assert_eq!(s.reason, "");

        // A bare hyphen is not the separator.
        let s = split_recommendation(Some("NEUTRAL-ish"));
        assert_eq!(s.recommendation, "NEUTRAL-ish");
        assert_eq!(s.reason, "");
    }

    #[test]
    fn split_uses_first_separator() {
        let s = split_recommendation(Some("A - B - C"));
        assert_eq!(s.recommendation, "A");
        assert_eq!(s.reason, "B - C");
    }

    #[test]
    fn split_empty_or_absent_is_blank() {
        assert_eq!(split_recommendation(None), SplitRecommendation::default());
        assert_eq!(split_recommendation(Some("")), SplitRecommendation::default());
    }

    #[test]
    fn split_keeps_empty_halves_around_separator() {
        let s = split_recommendation(Some(" - reason only"));
        assert_eq!(s.recommendation, "");
        assert_eq!(s.reason, "reason only");
    }

    #[test]
    fn double_encoded_strategies_are_parsed() {
        let row = normalize(&raw(json!({
            "ticker": "VCI",
            "strategies": "[{\"name\":\"X\",\"stance\":\"y\",\"note\":\"z\"}]",
        })));
        assert_eq!(
            row.strategies,
            vec![StrategyOpinion {
                name: "X".to_string(),
                stance: "y".to_string(),
                note: "z".to_string(),
            }]
        );
    }

    #[test]
    fn unparsable_strategies_become_empty() {
        let row = normalize(&raw(json!({"ticker": "VCI", "strategies": "[{not json"})));
        assert!(row.strategies.is_empty());
    }

    #[test]
    fn non_list_strategies_become_empty() {
        for strategies in [json!("{\"name\":\"X\"}"), json!({"name": "X"}), json!(5), Value::Null] {
            let row = normalize(&raw(json!({"ticker": "VCI", "strategies": strategies})));
            assert!(row.strategies.is_empty());
        }
    }

    #[test]
    fn parsed_strategies_pass_through_in_order() {
        let row = normalize(&raw(json!({
            "ticker": "VCI",
            "strategies": [
                {"name": "Momentum", "stance": "bullish", "note": "n"},
                {"name": "Value"},
            ],
        })));
        let names: Vec<_> = row.strategies.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Momentum", "Value"]);
        assert_eq!(row.strategies[1].stance, "");
    }

    #[test]
    fn strategy_fields_with_null_or_scalar_values_are_kept() {
        let row = normalize(&raw(json!({
            "ticker": "VCI",
            "strategies": "[{\"name\":\"Momentum\",\"stance\":\"bullish\",\"note\":null},\
                            {\"name\":\"Value\",\"stance\":3,\"note\":true},\
                            {\"name\":\"Growth\",\"stance\":{\"x\":1}}]",
        })));
        assert_eq!(
            row.strategies,
            vec![
                StrategyOpinion {
                    name: "Momentum".to_string(),
                    stance: "bullish".to_string(),
                    note: String::new(),
                },
                StrategyOpinion {
                    name: "Value".to_string(),
                    stance: "3".to_string(),
                    note: "true".to_string(),
                },
                StrategyOpinion {
                    name: "Growth".to_string(),
                    stance: String::new(),
                    note: String::new(),
                },
            ]
        );
        assert_eq!(
            crate::view::strategy_index::build_strategy_index(&[row]),
            vec!["Momentum", "Value", "Growth"]
        );
    }

    #[test]
    fn sources_tolerate_encoding_independently() {
        let row = normalize(&raw(json!({
            "ticker": "VCI",
            "strategies": "broken",
            "sources": "[\"https://a.example\",\"https://b.example\"]",
        })));
        assert!(row.strategies.is_empty());
        assert_eq!(row.sources, vec!["https://a.example", "https://b.example"]);

        let row = normalize(&raw(json!({
            "ticker": "VCI",
            "strategies": [{"name": "X"}],
            "sources": "not json",
        })));
        assert_eq!(row.strategies.len(), 1);
        assert!(row.sources.is_empty());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let row = normalize(&RawRecord::default());
        assert_eq!(row.ticker, "");
        assert_eq!(row.short_term, SplitRecommendation::default());
        assert_eq!(row.overall, SplitRecommendation::default());
        assert!(row.strategies.is_empty());
        assert!(row.sources.is_empty());
        assert_eq!(row.confidences, Confidences::default());
    }

    #[test]
    fn confidences_pass_through() {
        let row = normalize(&raw(json!({
            "ticker": "VCI",
            "short_term": "ACCUMULATE - strong fundamentals",
            "short_confidence": 80,
            "overall_confidence": 65.5,
        })));
        assert_eq!(row.short_term.recommendation, "ACCUMULATE");
        assert_eq!(row.short_term.reason, "strong fundamentals");
        assert_eq!(row.confidences.short, Some(80.0));
        assert_eq!(row.confidences.long, None);
        assert_eq!(row.confidences.overall, Some(65.5));
    }

    #[test]
    fn normalize_does_not_mutate_input() {
        let input = raw(json!({"ticker": "VCI", "short_term": "HOLD - wait", "strategies": "[]"}));
        let before = input.clone();
        let _ = normalize(&input);
        assert_eq!(input, before);
    }

    #[test]
    fn batch_sources_come_from_first_row() {
        let rows = normalize_batch(&[
            raw(json!({"ticker": "A", "sources": ["https://a.example"]})),
            raw(json!({"ticker": "B", "sources": ["https://b.example"]})),
        ]);
        assert_eq!(batch_sources(&rows), vec!["https://a.example"]);
        assert!(batch_sources(&[]).is_empty());
    }

    #[test]
    fn duplicate_tickers_are_preserved() {
        let rows = normalize_batch(&[raw(json!({"ticker": "VCI"})), raw(json!({"ticker": "VCI"}))]);
        assert_eq!(rows.len(), 2);
    }
}
