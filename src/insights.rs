//! Threshold warnings and team recommendations

use serde::{Deserialize, Serialize};

use crate::filter::TeamPreset;
use crate::metrics::Kpis;

/// Business-rule thresholds. Comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Warn when the delay percentage is above this
    pub max_delay_percentage: f64,
    /// Warn when the average handling time (hours) is above this
    pub max_handling_hours: f64,
    /// Warn when the fulfillment rate is below this
    pub min_fulfillment_rate: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            max_delay_percentage: 20.0,
            max_handling_hours: 24.0,
            min_fulfillment_rate: 85.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvisoryKind {
    Warning,
    Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: AdvisoryKind::Warning,
            message: message.into(),
        }
    }

    fn recommendation(message: &str) -> Self {
        Self {
            kind: AdvisoryKind::Recommendation,
            message: message.to_string(),
        }
    }
}

fn preset_recommendations(preset: TeamPreset) -> [&'static str; 2] {
    match preset {
        TeamPreset::BrandTeam => [
            "Focus on reducing delays for premium brands which currently have a higher than average delay rate.",
            "Consider priority processing for top-tier brand products to maintain brand reputation.",
        ],
        TeamPreset::PerformanceTeam => [
            "Warehouse #3 shows significant bottlenecks in the packaging stage. Consider process optimization.",
            "Implement cross-training to balance workload during peak hours.",
        ],
        TeamPreset::SocialMediaTeam => [
            "Products featured in recent campaigns show increased processing times. Consider pre-stocking before campaigns.",
            "Track social media metrics alongside delivery performance to predict demand surges.",
        ],
        TeamPreset::AllTeams => [
            "Optimize warehouse layouts based on the heatmap to reduce bottlenecks.",
            "Consider adjusting staffing levels during peak processing hours identified in the time analysis.",
        ],
    }
}

/// Warnings (delay, handling time, fulfillment, in that order) followed by
/// exactly two static recommendations for the preset.
pub fn generate_insights(
    kpis: &Kpis,
    preset: TeamPreset,
    thresholds: &InsightThresholds,
) -> Vec<Advisory> {
    let mut advisories = Vec::with_capacity(5);

    if kpis.delay_percentage > thresholds.max_delay_percentage {
        advisories.push(Advisory::warning(
            "High delay percentage detected. Consider reviewing delivery processes.",
        ));
    }
    if kpis.avg_handling_time > thresholds.max_handling_hours {
        advisories.push(Advisory::warning(format!(
            "Handling time exceeds {} hours. Investigate warehouse efficiency.",
            thresholds.max_handling_hours
        )));
    }
    if kpis.fulfillment_rate < thresholds.min_fulfillment_rate {
        advisories.push(Advisory::warning(
            "Fulfillment rate is below target. Analyze order completion workflow.",
        ));
    }

    advisories.extend(
        preset_recommendations(preset)
            .iter()
            .map(|m| Advisory::recommendation(m)),
    );
    advisories
}

pub fn recommendations(
    kpis: &Kpis,
    preset: TeamPreset,
    thresholds: &InsightThresholds,
) -> Vec<String> {
    generate_insights(kpis, preset, thresholds)
        .into_iter()
        .map(|a| a.message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpis(handling: f64, delay: f64, fulfillment: f64) -> Kpis {
        Kpis {
            avg_handling_time: handling,
            delay_percentage: delay,
            fulfillment_rate: fulfillment,
            order_count: 100,
        }
    }

    #[test]
    fn test_handling_and_fulfillment_warnings_for_all_teams() {
        let out = recommendations(&kpis(30.0, 10.0, 80.0), TeamPreset::AllTeams, &InsightThresholds::default());
        assert_eq!(out.len(), 4);
        assert!(out[0].contains("Handling time exceeds 24 hours"));
        assert!(out[1].contains("Fulfillment rate is below target"));
        assert!(!out.iter().any(|m| m.contains("High delay percentage")));
        assert_eq!(out[2], "Optimize warehouse layouts based on the heatmap to reduce bottlenecks.");
        assert!(out[3].starts_with("Consider adjusting staffing levels"));
    }

    #[test]
    fn test_thresholds_are_strict() {
        let out = generate_insights(&kpis(24.0, 20.0, 85.0), TeamPreset::BrandTeam, &InsightThresholds::default());
        assert!(out.iter().all(|a| a.kind == AdvisoryKind::Recommendation));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_warning_order() {
        let out = generate_insights(&kpis(25.0, 21.0, 10.0), TeamPreset::PerformanceTeam, &InsightThresholds::default());
        let kinds: Vec<AdvisoryKind> = out.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AdvisoryKind::Warning,
                AdvisoryKind::Warning,
                AdvisoryKind::Warning,
                AdvisoryKind::Recommendation,
                AdvisoryKind::Recommendation,
            ]
        );
        assert!(out[0].message.contains("delay"));
        assert!(out[1].message.contains("Handling"));
        assert!(out[2].message.contains("Fulfillment"));
        assert!(out[3].message.starts_with("Warehouse #3"));
    }

    #[test]
    fn test_every_preset_has_two_recommendations() {
        for preset in TeamPreset::ALL {
            let out = generate_insights(&kpis(1.0, 0.0, 100.0), preset, &InsightThresholds::default());
            assert_eq!(out.len(), 2, "{}", preset);
        }
        let social = recommendations(&kpis(1.0, 0.0, 100.0), TeamPreset::SocialMediaTeam, &InsightThresholds::default());
        assert!(social[1].starts_with("Track social media metrics"));
    }

    #[test]
    fn test_overridden_thresholds() {
        let strict = InsightThresholds {
            max_delay_percentage: 15.0,
            max_handling_hours: 12.0,
            min_fulfillment_rate: 90.0,
        };
        let out = generate_insights(&kpis(13.0, 16.0, 88.0), TeamPreset::AllTeams, &strict);
        assert_eq!(out.iter().filter(|a| a.kind == AdvisoryKind::Warning).count(), 3);
        assert!(out[1].message.contains("exceeds 12 hours"));
    }
}
