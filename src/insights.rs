// 💡 Insights - Price drivers and recommended actions
//
// Narrative panel shown under "Explanation & Recommended Actions".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionLevel {
    /// Positive recommendation (green)
    Success,

    /// Something to keep an eye on (amber)
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub level: ActionLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Insights {
    /// Why is the price changing?
    pub price_drivers: Vec<String>,

    pub actions: Vec<RecommendedAction>,
}

impl Insights {
    pub fn reference() -> Self {
        Insights {
            price_drivers: vec![
                "Rising production and energy costs".to_string(),
                "Increasing water scarcity risk".to_string(),
                "Higher market demand".to_string(),
            ],
            actions: vec![
                RecommendedAction {
                    level: ActionLevel::Success,
                    message: "Increase inventory before Month +3".to_string(),
                },
                RecommendedAction {
                    level: ActionLevel::Warning,
                    message: "Monitor water risk and supplier prices".to_string(),
                },
            ],
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RecommendedAction> {
        self.actions.iter().filter(|a| a.level == ActionLevel::Warning)
    }
}
