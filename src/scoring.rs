//! Composite warehouse score
//!
//! `score = w_p * avg_processing_time + w_d * delay_rate - w_f * fulfillment_rate`
//!
//! Lower is better. The score is an absolute linear combination of hours and percentages,
//! so it is only comparable within one computation run.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::metrics::WarehouseSummary;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub processing_time: f64,
    pub delay_rate: f64,
    /// Subtracted from the score
    pub fulfillment_rate: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            processing_time: 0.4,
            delay_rate: 0.4,
            fulfillment_rate: 0.2,
        }
    }
}

pub fn performance_score(
    avg_processing_time: f64,
    delay_rate: f64,
    fulfillment_rate: f64,
    weights: &ScoreWeights,
) -> f64 {
    avg_processing_time * weights.processing_time + delay_rate * weights.delay_rate
        - fulfillment_rate * weights.fulfillment_rate
}

/// New summary rows with `performance_score` filled in
pub fn score_warehouses(summary: &[WarehouseSummary], weights: &ScoreWeights) -> Vec<WarehouseSummary> {
    summary
        .iter()
        .map(|w| WarehouseSummary {
            performance_score: performance_score(
                w.avg_processing_time,
                w.delay_rate,
                w.fulfillment_rate,
                weights,
            ),
            ..w.clone()
        })
        .collect()
}

/// The `n` warehouses with the highest average processing time, slowest first
pub fn slowest_warehouses(summary: &[WarehouseSummary], n: usize) -> Vec<WarehouseSummary> {
    let mut sorted = summary.to_vec();
    sorted.sort_by(|a, b| {
        b.avg_processing_time
            .partial_cmp(&a.avg_processing_time)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// Best (lowest score) first
pub fn rank_by_score(summary: &[WarehouseSummary]) -> Vec<WarehouseSummary> {
    let mut sorted = summary.to_vec();
    sorted.sort_by(|a, b| {
        a.performance_score
            .partial_cmp(&b.performance_score)
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, processing: f64, delay: f64, fulfillment: f64) -> WarehouseSummary {
        WarehouseSummary {
            warehouse_id: id.to_string(),
            warehouse_name: format!("Warehouse #{}", id),
            warehouse_location: "Houston".to_string(),
            avg_processing_time: processing,
            delay_rate: delay,
            fulfillment_rate: fulfillment,
            order_count: 10,
            performance_score: 0.0,
        }
    }

    #[test]
    fn test_score_formula() {
        let score = performance_score(10.0, 20.0, 90.0, &ScoreWeights::default());
        assert!((score - -6.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_warehouses_fills_every_row() {
        let input = vec![summary("1", 10.0, 20.0, 90.0), summary("2", 30.0, 0.0, 50.0)];
        let scored = score_warehouses(&input, &ScoreWeights::default());
        assert!((scored[0].performance_score + 6.0).abs() < 1e-9);
        assert!((scored[1].performance_score - 2.0).abs() < 1e-9);
        assert_eq!(input[0].performance_score, 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoreWeights {
            processing_time: 1.0,
            delay_rate: 0.0,
            fulfillment_rate: 0.0,
        };
        assert_eq!(performance_score(7.5, 50.0, 50.0, &weights), 7.5);
    }

    #[test]
    fn test_slowest_and_ranking() {
        let input = score_warehouses(
            &[
                summary("1", 5.0, 10.0, 95.0),
                summary("2", 40.0, 30.0, 70.0),
                summary("3", 12.0, 0.0, 100.0),
                summary("4", 20.0, 10.0, 90.0),
            ],
            &ScoreWeights::default(),
        );

        let slowest = slowest_warehouses(&input, 3);
        let ids: Vec<&str> = slowest.iter().map(|w| w.warehouse_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "3"]);

        let ranked = rank_by_score(&input);
        // 3: 4.8 + 0 - 20 = -15.2, 1: 2 + 4 - 19 = -13
        assert_eq!(ranked[0].warehouse_id, "3");
        assert_eq!(ranked[1].warehouse_id, "1");
        assert_eq!(ranked.last().unwrap().warehouse_id, "2");

        assert!(slowest_warehouses(&[], 3).is_empty());
    }
}
