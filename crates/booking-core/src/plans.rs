//! Plan catalog shown on the plan selection view.

use serde::Serialize;
use ts_rs::TS;

/// A subscription tier offered to establishments without an active plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub code: String,
    pub title: String,
    /// Monthly price in whole currency units; 0 is free.
    pub monthly_price: u32,
    pub features: Vec<String>,
}

/// The plans on offer, cheapest first.
pub fn plan_catalog() -> Vec<Plan> {
    vec![
        Plan {
            code: "basic".to_string(),
            title: "Basic".to_string(),
            monthly_price: 0,
            features: vec![
                "1 employee".to_string(),
                "50 appointments per month".to_string(),
                "Public booking page".to_string(),
            ],
        },
        Plan {
            code: "professional".to_string(),
            title: "Professional".to_string(),
            monthly_price: 49,
            features: vec![
                "Unlimited appointments".to_string(),
                "Unlimited employees".to_string(),
                "Advanced features".to_string(),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_sorted_by_price() {
        let plans = plan_catalog();
        assert_eq!(plans.len(), 2);
        assert!(plans.windows(2).all(|w| w[0].monthly_price <= w[1].monthly_price));
        assert_eq!(plans[0].monthly_price, 0);
    }
}
