//! Stock transaction types and the product-quantity arithmetic

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason codes for manual stock movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Purchase,
    Sale,
    Return,
    Adjustment,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Purchase,
        TransactionType::Sale,
        TransactionType::Return,
        TransactionType::Adjustment,
        TransactionType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "Purchase",
            TransactionType::Sale => "Sale",
            TransactionType::Return => "Return",
            TransactionType::Adjustment => "Adjustment",
            TransactionType::Transfer => "Transfer",
        }
    }

    pub fn parse(value: &str) -> Option<TransactionType> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| super::ParseEnumError {
            kind: "transaction type",
            value: s.to_string(),
        })
    }
}

/// Effect of a transaction on a product's stock quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Add to the current quantity
    Add(i32),
    /// Subtract from the current quantity
    Subtract(i32),
    /// Overwrite the quantity absolutely
    Set(i32),
    /// Leave the quantity untouched
    None,
}

impl StockEffect {
    pub fn apply(self, current: i32) -> i32 {
        match self {
            StockEffect::Add(q) => current + q,
            StockEffect::Subtract(q) => current - q,
            StockEffect::Set(q) => q,
            StockEffect::None => current,
        }
    }
}

/// Effect of recording a transaction. Purchase and Return add, Sale
/// subtracts. Adjustment overwrites the quantity absolutely rather than
/// applying a delta; Transfer is record-only.
pub fn record_effect(kind: TransactionType, quantity: i32) -> StockEffect {
    match kind {
        TransactionType::Purchase | TransactionType::Return => StockEffect::Add(quantity),
        TransactionType::Sale => StockEffect::Subtract(quantity),
        TransactionType::Adjustment => StockEffect::Set(quantity),
        TransactionType::Transfer => StockEffect::None,
    }
}

/// Effect of deleting a previously recorded transaction. Purchase and
/// Return are subtracted back, a Sale is added back. Adjustment has no
/// defined reversal (the pre-adjustment quantity is not recorded) and
/// Transfer never moved stock, so both leave the quantity untouched.
pub fn delete_effect(kind: TransactionType, quantity: i32) -> StockEffect {
    match kind {
        TransactionType::Purchase | TransactionType::Return => StockEffect::Subtract(quantity),
        TransactionType::Sale => StockEffect::Add(quantity),
        TransactionType::Adjustment | TransactionType::Transfer => StockEffect::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_delete_is_identity_for_delta_types() {
        for kind in [
            TransactionType::Purchase,
            TransactionType::Sale,
            TransactionType::Return,
        ] {
            let after = record_effect(kind, 7).apply(50);
            assert_eq!(delete_effect(kind, 7).apply(after), 50);
        }
    }

    #[test]
    fn adjustment_overwrites_absolutely() {
        assert_eq!(record_effect(TransactionType::Adjustment, 12).apply(999), 12);
        assert_eq!(delete_effect(TransactionType::Adjustment, 12).apply(12), 12);
    }

    #[test]
    fn transfer_is_record_only() {
        assert_eq!(record_effect(TransactionType::Transfer, 5).apply(40), 40);
        assert_eq!(delete_effect(TransactionType::Transfer, 5).apply(40), 40);
    }
}
