//! Team presets and their row-inclusion rules

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::derive::EnrichedRow;
use crate::models::OrderRow;

/// Named row-inclusion rule selecting one team's slice of the orders.
/// Serializes as its display name, the same string `From<&str>` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TeamPreset {
    #[default]
    #[serde(rename = "All Teams")]
    AllTeams,
    #[serde(rename = "Brand Team")]
    BrandTeam,
    #[serde(rename = "Performance Team")]
    PerformanceTeam,
    #[serde(rename = "Social Media Team")]
    SocialMediaTeam,
}

impl From<&str> for TeamPreset {
    fn from(s: &str) -> Self {
        match s {
            "All Teams" => TeamPreset::AllTeams,
            "Brand Team" => TeamPreset::BrandTeam,
            "Performance Team" => TeamPreset::PerformanceTeam,
            "Social Media Team" => TeamPreset::SocialMediaTeam,
            _ => TeamPreset::AllTeams, // unknown names never filter
        }
    }
}

impl fmt::Display for TeamPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TeamPreset {
    pub const ALL: [TeamPreset; 4] = [
        TeamPreset::AllTeams,
        TeamPreset::BrandTeam,
        TeamPreset::PerformanceTeam,
        TeamPreset::SocialMediaTeam,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TeamPreset::AllTeams => "All Teams",
            TeamPreset::BrandTeam => "Brand Team",
            TeamPreset::PerformanceTeam => "Performance Team",
            TeamPreset::SocialMediaTeam => "Social Media Team",
        }
    }

    /// Keywords matched (case-insensitively, as substrings) against the team assignment
    fn team_keywords(&self) -> &'static [&'static str] {
        match self {
            TeamPreset::AllTeams => &[],
            TeamPreset::BrandTeam => &["brand"],
            TeamPreset::PerformanceTeam => &["performance", "operations"],
            TeamPreset::SocialMediaTeam => &["social", "marketing"],
        }
    }

    /// Keywords matched against the product category
    fn category_keywords(&self) -> &'static [&'static str] {
        match self {
            TeamPreset::AllTeams | TeamPreset::PerformanceTeam => &[],
            TeamPreset::BrandTeam => &["premium", "luxury"],
            TeamPreset::SocialMediaTeam => &["featured", "campaign"],
        }
    }

    pub fn matches<T: TeamScoped + ?Sized>(&self, row: &T) -> bool {
        if *self == TeamPreset::AllTeams {
            return true;
        }
        contains_any(row.team_assignment(), self.team_keywords())
            || contains_any(row.product_category(), self.category_keywords())
    }
}

fn contains_any(value: Option<&str>, keywords: &[&str]) -> bool {
    let Some(value) = value else {
        return false;
    };
    let value = value.to_lowercase();
    keywords.iter().any(|k| value.contains(k))
}

/// Rows that carry the columns team presets look at
pub trait TeamScoped {
    fn team_assignment(&self) -> Option<&str>;
    fn product_category(&self) -> Option<&str>;
}

impl TeamScoped for OrderRow {
    fn team_assignment(&self) -> Option<&str> {
        self.team_assignment.as_deref()
    }

    fn product_category(&self) -> Option<&str> {
        self.product_category.as_deref()
    }
}

impl TeamScoped for EnrichedRow {
    fn team_assignment(&self) -> Option<&str> {
        self.row.team_assignment.as_deref()
    }

    fn product_category(&self) -> Option<&str> {
        self.row.product_category.as_deref()
    }
}

/// Returns a new dataset with the rows the preset keeps. "All Teams" keeps everything.
pub fn filter_by_team<T: TeamScoped + Clone>(rows: &[T], preset: TeamPreset) -> Vec<T> {
    if preset == TeamPreset::AllTeams {
        return rows.to_vec();
    }
    rows.iter().filter(|r| preset.matches(*r)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::normalize::normalize_record;

    fn row(team: Option<&str>, category: Option<&str>) -> OrderRow {
        let mut row = normalize_record(&RawRecord::default());
        row.team_assignment = team.map(String::from);
        row.product_category = category.map(String::from);
        row
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(TeamPreset::from("Brand Team"), TeamPreset::BrandTeam);
        assert_eq!(TeamPreset::from("Social Media Team"), TeamPreset::SocialMediaTeam);
        assert_eq!(TeamPreset::from("brand team"), TeamPreset::AllTeams);
        assert_eq!(TeamPreset::from("Finance Team"), TeamPreset::AllTeams);
        for preset in TeamPreset::ALL {
            assert_eq!(TeamPreset::from(preset.name()), preset);
        }
    }

    #[test]
    fn test_serialized_name_parses_back() {
        for preset in TeamPreset::ALL {
            let json = serde_json::to_value(preset).unwrap();
            assert_eq!(json, preset.name());
            assert_eq!(TeamPreset::from(json.as_str().unwrap()), preset);
            assert_eq!(serde_json::from_value::<TeamPreset>(json).unwrap(), preset);
        }
        assert_eq!(serde_json::to_value(TeamPreset::BrandTeam).unwrap(), "Brand Team");
    }

    #[test]
    fn test_all_teams_is_identity() {
        let rows = vec![row(None, None), row(Some("Brand Team"), Some("Books"))];
        assert_eq!(filter_by_team(&rows, TeamPreset::AllTeams), rows);
    }

    #[test]
    fn test_brand_excludes_performance_electronics() {
        let rows = vec![
            row(Some("Performance Team"), Some("Electronics")),
            row(Some("Brand Team"), Some("Books")),
            row(Some("Operations"), Some("premium goods")),
            row(None, Some("LUXURY watches")),
        ];
        let kept = filter_by_team(&rows, TeamPreset::BrandTeam);
        assert_eq!(kept.len(), 3);
        assert!(kept
            .iter()
            .all(|r| r.team_assignment.as_deref() != Some("Performance Team")));
    }

    #[test]
    fn test_performance_only_looks_at_team() {
        let rows = vec![
            row(Some("Warehouse Operations"), None),
            row(Some("performance team"), Some("Books")),
            row(Some("Brand Team"), Some("Premium")),
        ];
        assert_eq!(filter_by_team(&rows, TeamPreset::PerformanceTeam).len(), 2);
    }

    #[test]
    fn test_social_media() {
        let rows = vec![
            row(Some("Social Media Team"), None),
            row(Some("Marketing"), None),
            row(Some("Brand Team"), Some("Featured Items")),
            row(None, Some("Spring Campaign")),
            row(Some("Performance Team"), Some("Food")),
        ];
        assert_eq!(filter_by_team(&rows, TeamPreset::SocialMediaTeam).len(), 4);
    }

    #[test]
    fn test_missing_values_never_match() {
        let rows = vec![row(None, None)];
        assert!(filter_by_team(&rows, TeamPreset::BrandTeam).is_empty());
        assert!(filter_by_team(&rows, TeamPreset::PerformanceTeam).is_empty());
        assert!(filter_by_team(&rows, TeamPreset::SocialMediaTeam).is_empty());
    }
}
