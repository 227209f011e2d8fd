use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::menu::{MenuItem, QuantityTier};

/// A line in a customer's cart.
///
/// The item name and unit price are a snapshot taken when the line was added;
/// later catalog edits never retroactively change a line. `total_price` is
/// derived but stored, so per-line price adjustments survive quantity changes
/// within the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: u64,
    pub item_id: u32,
    pub item_name: String,
    pub unit_price: Decimal,
    pub tier: QuantityTier,
    /// Only meaningful for [`QuantityTier::Unidade`]; stored as 1 otherwise.
    pub unit_count: u32,
    pub quantity: u32,
    pub total_price: Decimal,
}

impl CartLine {
    pub fn new(
        line_id: u64,
        item: &MenuItem,
        tier: QuantityTier,
        unit_count: u32,
        tier_price: Decimal,
    ) -> Self {
        Self {
            line_id,
            item_id: item.id,
            item_name: item.name.clone(),
            unit_price: item.unit_price,
            tier,
            unit_count: if tier == QuantityTier::Unidade { unit_count } else { 1 },
            quantity: 1,
            total_price: tier_price,
        }
    }

    /// Two lines collapse into one iff they reference the same item at the
    /// same tier and unit count.
    pub fn merges_with(&self, item_id: u32, tier: QuantityTier, unit_count: u32) -> bool {
        let unit_count = if tier == QuantityTier::Unidade { unit_count } else { 1 };
        self.item_id == item_id && self.tier == tier && self.unit_count == unit_count
    }
}

/// Totals for the current cart contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub item_count: u32,
}

impl CartSummary {
    pub fn compute(lines: &[CartLine], delivery_fee: Decimal) -> Self {
        let subtotal: Decimal = lines.iter().map(|l| l.total_price).sum();
        Self {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            item_count: lines.iter().map(|l| l.quantity).sum(),
        }
    }
}
