//! Procurement schedule arithmetic
//!
//! Pure date calculations shared by the procurement log, the dashboard and
//! the `calc` command. Every function takes optional inputs and returns an
//! "empty" answer (`None` or [`RiskTier::Unknown`]) when an input is missing,
//! so callers never have to pre-validate partially filled rows.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days between order and required-on-site date at which risk is "medium"
pub const RISK_THRESHOLD_DAYS: i64 = 30;

/// Delivery status of a procurement item relative to its drop-dead date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Ordered after the drop-dead date
    Delayed,
    /// Ordered exactly on the drop-dead date
    #[serde(rename = "On Time")]
    OnTime,
    /// Ordered before the drop-dead date
    Early,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Delayed => write!(f, "Delayed"),
            DeliveryStatus::OnTime => write!(f, "On Time"),
            DeliveryStatus::Early => write!(f, "Early"),
        }
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], " ").trim() {
            "delayed" => Ok(DeliveryStatus::Delayed),
            "on time" | "ontime" => Ok(DeliveryStatus::OnTime),
            "early" => Ok(DeliveryStatus::Early),
            _ => Err(format!(
                "Invalid delivery status: {}. Use delayed, on-time, or early",
                s
            )),
        }
    }
}

/// Schedule risk of an item, based on the slack between order and need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Unknown,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
            RiskTier::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim() {
            "low" => Ok(RiskTier::Low),
            "medium" | "med" => Ok(RiskTier::Medium),
            "high" => Ok(RiskTier::High),
            "unknown" => Ok(RiskTier::Unknown),
            _ => Err(format!(
                "Invalid risk tier: {}. Use low, medium, high, or unknown",
                s
            )),
        }
    }
}

/// Latest order date that still meets `required` given the lead time.
///
/// Returns `None` when either input is missing, or when the subtraction
/// falls outside the representable calendar.
pub fn drop_dead_date(required: Option<NaiveDate>, lead_time_weeks: Option<u32>) -> Option<NaiveDate> {
    let required = required?;
    let weeks = lead_time_weeks?;
    required.checked_sub_days(Days::new(u64::from(weeks) * 7))
}

/// Compare the order date against the drop-dead date, in whole calendar days.
pub fn delivery_status(
    order_date: Option<NaiveDate>,
    drop_dead: Option<NaiveDate>,
) -> Option<DeliveryStatus> {
    let order = order_date?;
    let dead = drop_dead?;
    let diff = (order - dead).num_days();

    Some(match diff {
        d if d > 0 => DeliveryStatus::Delayed,
        0 => DeliveryStatus::OnTime,
        _ => DeliveryStatus::Early,
    })
}

/// Classify slack between order and required-on-site dates.
///
/// More than [`RISK_THRESHOLD_DAYS`] of slack is low risk, exactly the
/// threshold is medium, anything shorter (including negative slack) is high.
pub fn risk_tier(required: Option<NaiveDate>, order_date: Option<NaiveDate>) -> RiskTier {
    let (Some(required), Some(order)) = (required, order_date) else {
        return RiskTier::Unknown;
    };

    let days_until_required = (required - order).num_days();
    match days_until_required.cmp(&RISK_THRESHOLD_DAYS) {
        std::cmp::Ordering::Greater => RiskTier::Low,
        std::cmp::Ordering::Equal => RiskTier::Medium,
        std::cmp::Ordering::Less => RiskTier::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_drop_dead_date_subtracts_weeks() {
        assert_eq!(
            drop_dead_date(Some(date("2025-06-30")), Some(2)),
            Some(date("2025-06-16"))
        );
        assert_eq!(
            drop_dead_date(Some(date("2025-03-05")), Some(1)),
            Some(date("2025-02-26"))
        );
    }

    #[test]
    fn test_drop_dead_date_zero_lead_time_is_required_date() {
        assert_eq!(
            drop_dead_date(Some(date("2025-06-30")), Some(0)),
            Some(date("2025-06-30"))
        );
    }

    #[test]
    fn test_drop_dead_date_missing_inputs() {
        assert_eq!(drop_dead_date(None, Some(2)), None);
        assert_eq!(drop_dead_date(Some(date("2025-06-30")), None), None);
        assert_eq!(drop_dead_date(None, None), None);
    }

    #[test]
    fn test_drop_dead_date_underflow_is_none() {
        assert_eq!(drop_dead_date(Some(NaiveDate::MIN), Some(1)), None);
    }

    #[test]
    fn test_delivery_status_example() {
        let dead = drop_dead_date(Some(date("2025-06-30")), Some(2));
        assert_eq!(
            delivery_status(Some(date("2025-06-20")), dead),
            Some(DeliveryStatus::Delayed)
        );
        assert_eq!(
            delivery_status(Some(date("2025-06-16")), dead),
            Some(DeliveryStatus::OnTime)
        );
        assert_eq!(
            delivery_status(Some(date("2025-06-01")), dead),
            Some(DeliveryStatus::Early)
        );
    }

    #[test]
    fn test_delivery_status_missing_inputs() {
        assert_eq!(delivery_status(None, Some(date("2025-06-16"))), None);
        assert_eq!(delivery_status(Some(date("2025-06-16")), None), None);
    }

    #[test]
    fn test_risk_tier_threshold() {
        let required = Some(date("2025-07-31"));
        assert_eq!(risk_tier(required, Some(date("2025-06-30"))), RiskTier::Low);
        assert_eq!(risk_tier(required, Some(date("2025-07-01"))), RiskTier::Medium);
        assert_eq!(risk_tier(required, Some(date("2025-07-02"))), RiskTier::High);
        assert_eq!(risk_tier(required, Some(date("2025-08-15"))), RiskTier::High);
    }

    #[test]
    fn test_risk_tier_unknown() {
        assert_eq!(risk_tier(None, Some(date("2025-07-01"))), RiskTier::Unknown);
        assert_eq!(risk_tier(Some(date("2025-07-01")), None), RiskTier::Unknown);
    }

    #[test]
    fn test_delivery_status_display_and_parse() {
        assert_eq!(DeliveryStatus::OnTime.to_string(), "On Time");
        assert_eq!("on-time".parse::<DeliveryStatus>().unwrap(), DeliveryStatus::OnTime);
        assert_eq!("On Time".parse::<DeliveryStatus>().unwrap(), DeliveryStatus::OnTime);
        assert_eq!("DELAYED".parse::<DeliveryStatus>().unwrap(), DeliveryStatus::Delayed);
        assert!("late".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn test_risk_tier_parse() {
        assert_eq!("HIGH".parse::<RiskTier>().unwrap(), RiskTier::High);
        assert_eq!("med".parse::<RiskTier>().unwrap(), RiskTier::Medium);
        assert!("severe".parse::<RiskTier>().is_err());
    }

    #[test]
    fn test_delivery_status_serde_names() {
        let json = serde_json::to_string(&DeliveryStatus::OnTime).unwrap();
        assert_eq!(json, "\"On Time\"");
        let parsed: DeliveryStatus = serde_json::from_str("\"Early\"").unwrap();
        assert_eq!(parsed, DeliveryStatus::Early);
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        // 1970-01-01 .. roughly 2100
        (0i64..47_000).prop_map(|d| {
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(d)
        })
    }

    proptest! {
        #[test]
        fn prop_drop_dead_is_seven_days_per_week(required in any_date(), weeks in 0u32..520) {
            let dead = drop_dead_date(Some(required), Some(weeks)).unwrap();
            prop_assert_eq!((required - dead).num_days(), i64::from(weeks) * 7);
        }

        #[test]
        fn prop_status_matches_ordering(order in any_date(), dead in any_date()) {
            let status = delivery_status(Some(order), Some(dead)).unwrap();
            let expected = match order.cmp(&dead) {
                std::cmp::Ordering::Greater => DeliveryStatus::Delayed,
                std::cmp::Ordering::Equal => DeliveryStatus::OnTime,
                std::cmp::Ordering::Less => DeliveryStatus::Early,
            };
            prop_assert_eq!(status, expected);
        }
    }
}
