//! Order lifecycle types and the stock side-effect rule

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order lifecycle states. No transition graph is enforced; any state
/// may be assigned from any other. "Completed" is the state that carries
/// stock side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| super::ParseEnumError {
            kind: "order status",
            value: s.to_string(),
        })
    }
}

/// Payment states tracked on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(value: &str) -> Option<PaymentStatus> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = super::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| super::ParseEnumError {
            kind: "payment status",
            value: s.to_string(),
        })
    }
}

/// What a status change means for the stock of the order's line items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    /// No stock movement
    Unchanged,
    /// Subtract each line's quantity from its product
    Deduct,
    /// Add each line's quantity back to its product
    Restore,
}

/// The one non-trivial rule of the order workflow: stock is deducted
/// when an order transitions into Completed and restored when it
/// transitions out of it. Re-assigning the same status is a no-op.
pub fn stock_adjustment(old: OrderStatus, new: OrderStatus) -> StockAdjustment {
    match (old == OrderStatus::Completed, new == OrderStatus::Completed) {
        (false, true) => StockAdjustment::Deduct,
        (true, false) => StockAdjustment::Restore,
        _ => StockAdjustment::Unchanged,
    }
}

/// Line total: quantity x unit price, less a percentage discount.
pub fn line_total(quantity: i32, unit_price: Decimal, discount_percent: Option<Decimal>) -> Decimal {
    let gross = Decimal::from(quantity) * unit_price;
    match discount_percent {
        Some(d) if d > Decimal::ZERO => {
            gross * (Decimal::ONE_HUNDRED - d) / Decimal::ONE_HUNDRED
        }
        _ => gross,
    }
}

/// Generate a human-readable order number, e.g. `ORD-20260807-1A2B3C4D`.
pub fn generate_order_number() -> String {
    let token = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d"), token)
}

/// Generate the shared reference number for a bulk purchase batch.
pub fn generate_bulk_reference() -> String {
    format!("BULK-{}", Utc::now().format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn completed_transitions_move_stock() {
        assert_eq!(
            stock_adjustment(OrderStatus::Pending, OrderStatus::Completed),
            StockAdjustment::Deduct
        );
        assert_eq!(
            stock_adjustment(OrderStatus::Completed, OrderStatus::Refunded),
            StockAdjustment::Restore
        );
        assert_eq!(
            stock_adjustment(OrderStatus::Completed, OrderStatus::Completed),
            StockAdjustment::Unchanged
        );
        assert_eq!(
            stock_adjustment(OrderStatus::Pending, OrderStatus::Cancelled),
            StockAdjustment::Unchanged
        );
    }

    #[test]
    fn line_total_applies_percentage_discount() {
        let price = Decimal::from_str("10.00").unwrap();
        assert_eq!(line_total(2, price, None), Decimal::from_str("20.00").unwrap());
        assert_eq!(
            line_total(2, price, Some(Decimal::from(25))),
            Decimal::from_str("15.00").unwrap()
        );
    }

    #[test]
    fn order_number_has_expected_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD-"));
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 8);
    }
}
