//! Money arithmetic for order totals
//!
//! Everything is `Decimal`; prices carry at most two decimal places, so
//! sums and products are exact and never need rounding.

use super::LineItem;
use rust_decimal::prelude::*;

/// Decimal places for monetary values
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum menu price (inclusive)
pub const MAX_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Maximum quantity of a single line item
pub const MAX_QUANTITY: u32 = 999;

/// price × quantity for one line
pub fn line_total(item: &LineItem) -> Decimal {
    item.price * Decimal::from(item.quantity)
}

/// Σ price × quantity across all lines
pub fn order_total(items: &[LineItem]) -> Decimal {
    items.iter().map(line_total).sum()
}

/// Round half away from zero to two places (display / external values only)
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: Decimal, quantity: u32) -> LineItem {
        LineItem {
            menu_item_id: 1,
            name: "x".into(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_total_is_exact() {
        // 3 × 0.10 + 7 × 0.20 == 1.70 exactly
        let items = vec![line(Decimal::new(10, 2), 3), line(Decimal::new(20, 2), 7)];
        assert_eq!(order_total(&items), Decimal::new(170, 2));
    }

    #[test]
    fn test_margherita_example() {
        let items = vec![line(Decimal::new(1099, 2), 2)];
        assert_eq!(order_total(&items), Decimal::new(2198, 2));
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
    }

    #[test]
    fn test_max_price_constant() {
        assert_eq!(MAX_PRICE, Decimal::from(10_000));
    }
}
