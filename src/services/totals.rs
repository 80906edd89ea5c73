use rust_decimal::Decimal;

use crate::entities::purchase_line;

/// Derives a purchase's monetary total from its line items. Pure function,
/// exact decimal arithmetic; the caller filters to non-deleted lines.
pub fn purchase_total(lines: &[purchase_line::Model]) -> Decimal {
    lines
        .iter()
        .map(|line| line.unit_price * line.quantity)
        .sum()
}

/// Total over raw `(unit_price, quantity)` pairs; shared by tests and any
/// caller that has not materialized entity rows.
pub fn line_total(pairs: &[(Decimal, Decimal)]) -> Decimal {
    pairs.iter().map(|(price, qty)| *price * *qty).sum()
}
