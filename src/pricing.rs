use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing unit chosen by the customer at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalType {
    Daily,
    Weekly,
    Monthly,
}

impl RentalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalType::Daily => "daily",
            RentalType::Weekly => "weekly",
            RentalType::Monthly => "monthly",
        }
    }
}

/// Per-unit rates for one car, parsed out of its stored price strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePlan {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
}

/// Total price for `days` under the selected unit policy. Units are whole:
/// a 1-day weekly booking bills a full week, a 31-day monthly booking bills
/// two months. Zero or negative day counts price at zero.
pub fn rental_price(days: i64, rental_type: RentalType, rates: &RatePlan) -> Decimal {
    if days <= 0 {
        return Decimal::ZERO;
    }
    match rental_type {
        RentalType::Daily => Decimal::from(days) * rates.daily,
        RentalType::Weekly => Decimal::from((days + 6) / 7) * rates.weekly,
        RentalType::Monthly => Decimal::from((days + 29) / 30) * rates.monthly,
    }
}

/// Lenient parse for display prices: keeps ASCII digits and dots, drops
/// everything else, so "AED 12,500" reads as 12500. Values that still fail
/// to parse contribute zero instead of aborting the caller's sum.
pub fn parse_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rates() -> RatePlan {
        RatePlan {
            daily: dec!(500),
            weekly: dec!(2800),
            monthly: dec!(9000),
        }
    }

    #[test]
    fn daily_price_is_linear() {
        for days in 0..30 {
            assert_eq!(
                rental_price(days, RentalType::Daily, &rates()),
                Decimal::from(days) * dec!(500)
            );
        }
    }

    #[test]
    fn weekly_price_rounds_up_to_whole_weeks() {
        // No proration: one day still bills a full week
        assert_eq!(rental_price(1, RentalType::Weekly, &rates()), dec!(2800));
        assert_eq!(rental_price(7, RentalType::Weekly, &rates()), dec!(2800));
        assert_eq!(rental_price(8, RentalType::Weekly, &rates()), dec!(5600));
        assert_eq!(rental_price(14, RentalType::Weekly, &rates()), dec!(5600));
        assert_eq!(rental_price(15, RentalType::Weekly, &rates()), dec!(8400));
    }

    #[test]
    fn monthly_price_rounds_up_to_whole_months() {
        assert_eq!(rental_price(1, RentalType::Monthly, &rates()), dec!(9000));
        assert_eq!(rental_price(30, RentalType::Monthly, &rates()), dec!(9000));
        assert_eq!(rental_price(31, RentalType::Monthly, &rates()), dec!(18000));
    }

    #[test]
    fn non_positive_day_counts_price_at_zero() {
        assert_eq!(rental_price(0, RentalType::Daily, &rates()), Decimal::ZERO);
        assert_eq!(rental_price(-3, RentalType::Weekly, &rates()), Decimal::ZERO);
    }

    #[test]
    fn parse_price_strips_currency_decorations() {
        assert_eq!(parse_price("AED 12,500"), dec!(12500));
        assert_eq!(parse_price("$800"), dec!(800));
        assert_eq!(parse_price("1,200.50"), dec!(1200.50));
        assert_eq!(parse_price("4500"), dec!(4500));
    }

    #[test]
    fn parse_price_falls_back_to_zero() {
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("call us"), Decimal::ZERO);
        assert_eq!(parse_price("1.2.3"), Decimal::ZERO);
    }
}
