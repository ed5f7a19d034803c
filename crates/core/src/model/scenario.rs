use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grouping used to filter conversation scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioCategory {
    Daily,
    Travel,
    Work,
    Social,
    Emergency,
    Other,
}

impl ScenarioCategory {
    pub const ALL: [ScenarioCategory; 6] = [
        ScenarioCategory::Daily,
        ScenarioCategory::Travel,
        ScenarioCategory::Work,
        ScenarioCategory::Social,
        ScenarioCategory::Emergency,
        ScenarioCategory::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioCategory::Daily => "daily",
            ScenarioCategory::Travel => "travel",
            ScenarioCategory::Work => "work",
            ScenarioCategory::Social => "social",
            ScenarioCategory::Emergency => "emergency",
            ScenarioCategory::Other => "other",
        }
    }
}

impl fmt::Display for ScenarioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown scenario category: {s}"))
    }
}

/// A role-play setting for conversation practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub id: &'static str,
    pub title: &'static str,
    pub category: ScenarioCategory,
}

const fn scenario(id: &'static str, title: &'static str, category: ScenarioCategory) -> Scenario {
    Scenario {
        id,
        title,
        category,
    }
}

use ScenarioCategory::{Daily, Emergency, Other, Social, Travel, Work};

static SCENARIOS: [Scenario; 27] = [
    scenario("cafe", "Cafe", Daily),
    scenario("restaurant", "Restaurant", Daily),
    scenario("shopping", "Shopping mall", Daily),
    scenario("hospital", "Hospital", Daily),
    scenario("post-office", "Post office", Daily),
    scenario("bank", "Bank", Daily),
    scenario("gym", "Gym", Daily),
    scenario("salon", "Hair salon", Daily),
    scenario("airport", "Airport", Travel),
    scenario("hotel", "Hotel", Travel),
    scenario("tourist", "Tourist spot", Travel),
    scenario("car-rental", "Car rental", Travel),
    scenario("train", "Train station", Travel),
    scenario("interview", "Job interview", Work),
    scenario("meeting", "Meeting", Work),
    scenario("class", "Class", Work),
    scenario("library", "Library", Work),
    scenario("presentation", "Presentation", Work),
    scenario("party", "Party", Social),
    scenario("date", "Date", Social),
    scenario("networking", "Networking", Social),
    scenario("phone", "Phone call", Social),
    scenario("police", "Police", Emergency),
    scenario("emergency", "Emergency room", Emergency),
    scenario("real-estate", "Real estate", Other),
    scenario("car-repair", "Car repair", Other),
    scenario("pet-hospital", "Pet hospital", Other),
];

/// Every built-in scenario, in display order.
#[must_use]
pub fn scenarios() -> &'static [Scenario] {
    &SCENARIOS
}

/// Scenarios of one category, in display order.
pub fn scenarios_in(category: ScenarioCategory) -> impl Iterator<Item = &'static Scenario> {
    SCENARIOS.iter().filter(move |s| s.category == category)
}

#[must_use]
pub fn find_scenario(id: &str) -> Option<&'static Scenario> {
    let id = id.trim();
    SCENARIOS.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = scenarios().iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), scenarios().len());
    }

    #[test]
    fn filters_by_category() {
        assert_eq!(scenarios_in(ScenarioCategory::Daily).count(), 8);
        assert_eq!(scenarios_in(ScenarioCategory::Emergency).count(), 2);
        assert_eq!(find_scenario(" cafe ").map(|s| s.title), Some("Cafe"));
        assert!(find_scenario("moon-base").is_none());
    }
}
