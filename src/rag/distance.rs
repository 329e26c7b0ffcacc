use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::RagError;

/// Distance used to rank stored segments against a query vector.
/// Lower is closer for every metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Negative inner product, the pgvector `<#>` operator.
    InnerProduct,
    /// `1 - cosine_similarity`, the pgvector `<=>` operator.
    Cosine,
}

impl DistanceMetric {
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::InnerProduct => -dot(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }

    /// pgvector operator implementing this metric.
    pub fn pg_operator(self) -> &'static str {
        match self {
            DistanceMetric::InnerProduct => "<#>",
            DistanceMetric::Cosine => "<=>",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::InnerProduct => write!(f, "inner_product"),
            DistanceMetric::Cosine => write!(f, "cosine"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = RagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inner_product" | "ip" | "dot" => Ok(DistanceMetric::InnerProduct),
            "cosine" | "cos" => Ok(DistanceMetric::Cosine),
            other => Err(RagError::Configuration(format!(
                "unknown distance metric: {}",
                other
            ))),
        }
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        (dot(a, b) / denom).clamp(-1.0, 1.0)
    }
}

/// Ascending by distance; NaN sorts last.
pub fn compare_distance(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}
