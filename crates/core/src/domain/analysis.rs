use crate::ingest::types::lenient_string;
use serde::{Deserialize, Serialize};

/// A canonical, post-normalization analysis row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub ticker: String,
    pub date: Option<String>,
    pub short_term: SplitRecommendation,
    pub long_term: SplitRecommendation,
    pub overall: SplitRecommendation,
    pub confidences: Confidences,
    pub strategies: Vec<StrategyOpinion>,
    pub sources: Vec<String>,
}

/// A "RECOMMENDATION - reason" field split into its two halves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecommendation {
    pub recommendation: String,
    pub reason: String,
}

/// Confidence percentages, passed through from the backend when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Confidences {
    pub short: Option<f64>,
    pub long: Option<f64>,
    pub overall: Option<f64>,
}

/// One strategy's opinion on a ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOpinion {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stance: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationTone {
    Positive,
    Negative,
    Neutral,
}

impl RecommendationTone {
    pub fn of(recommendation: &str) -> Self {
        if recommendation.starts_with("ACCUMULATE") {
            Self::Positive
        } else if recommendation.starts_with("AVOID") {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}
