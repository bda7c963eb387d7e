//! Order workflow tests
//!
//! Covers the status-driven stock rule, line totals, order number
//! format, and the customer statistics maintained on create/delete.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::models::{
    generate_order_number, line_total, stock_adjustment, OrderStatus, StockAdjustment,
};
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_into_completed_deducts() {
        for from in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            assert_eq!(
                stock_adjustment(from, OrderStatus::Completed),
                StockAdjustment::Deduct
            );
        }
    }

    #[test]
    fn test_out_of_completed_restores() {
        for to in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ] {
            assert_eq!(
                stock_adjustment(OrderStatus::Completed, to),
                StockAdjustment::Restore
            );
        }
    }

    #[test]
    fn test_unchanged_status_is_noop() {
        for status in OrderStatus::ALL {
            assert_eq!(
                stock_adjustment(status, status),
                StockAdjustment::Unchanged
            );
        }
    }

    #[test]
    fn test_non_completed_transitions_are_noops() {
        assert_eq!(
            stock_adjustment(OrderStatus::Pending, OrderStatus::Processing),
            StockAdjustment::Unchanged
        );
        assert_eq!(
            stock_adjustment(OrderStatus::Processing, OrderStatus::Cancelled),
            StockAdjustment::Unchanged
        );
    }

    #[test]
    fn test_line_total_without_discount() {
        assert_eq!(line_total(3, dec("12.50"), None), dec("37.50"));
    }

    #[test]
    fn test_line_total_with_discount() {
        // quantity x unit price x (1 - discount/100)
        assert_eq!(line_total(4, dec("25.00"), Some(dec("10"))), dec("90.00"));
    }

    #[test]
    fn test_zero_discount_same_as_none() {
        assert_eq!(
            line_total(7, dec("9.99"), Some(Decimal::ZERO)),
            line_total(7, dec("9.99"), None)
        );
    }

    #[test]
    fn test_order_number_format() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD-"));
        assert_eq!(n.len(), "ORD-".len() + 8 + 1 + 8);
    }

    #[test]
    fn test_order_numbers_are_unique() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert_ne!(a, b);
    }

    #[test]
    fn test_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::parse("Delivered"), None);
    }
}

// ============================================================================
// Workflow Simulation
// ============================================================================

#[cfg(test)]
mod workflow_simulation {
    use super::*;
    use std::collections::HashMap;

    /// In-memory model of the order workflow's side effects, driven by
    /// the same shared rules the services use.
    struct Store {
        stock: HashMap<&'static str, i32>,
        customer_total_orders: i32,
        customer_total_spent: Decimal,
    }

    struct SimOrder {
        status: OrderStatus,
        items: Vec<(&'static str, i32)>,
        total_amount: Decimal,
    }

    impl Store {
        fn new(stock: &[(&'static str, i32)]) -> Self {
            Store {
                stock: stock.iter().copied().collect(),
                customer_total_orders: 0,
                customer_total_spent: Decimal::ZERO,
            }
        }

        fn apply(&mut self, items: &[(&'static str, i32)], adjustment: StockAdjustment) {
            let sign = match adjustment {
                StockAdjustment::Unchanged => return,
                StockAdjustment::Deduct => -1,
                StockAdjustment::Restore => 1,
            };
            for (product, qty) in items {
                *self.stock.get_mut(product).unwrap() += sign * qty;
            }
        }

        fn create_order(
            &mut self,
            status: OrderStatus,
            items: Vec<(&'static str, i32)>,
            total_amount: Decimal,
        ) -> SimOrder {
            if status == OrderStatus::Completed {
                self.apply(&items, StockAdjustment::Deduct);
            }
            self.customer_total_orders += 1;
            self.customer_total_spent += total_amount;
            SimOrder {
                status,
                items,
                total_amount,
            }
        }

        fn edit_status(&mut self, order: &mut SimOrder, new_status: OrderStatus) {
            self.apply(&order.items, stock_adjustment(order.status, new_status));
            order.status = new_status;
            // The edit path never touches customer statistics.
        }

        fn delete_order(&mut self, order: SimOrder) {
            if order.status == OrderStatus::Completed {
                self.apply(&order.items, StockAdjustment::Restore);
            }
            self.customer_total_orders -= 1;
            self.customer_total_spent -= order.total_amount;
        }
    }

    /// The end-to-end scenario: pending order for 2xA@10 + 1xB@5,
    /// caller-supplied total, then completed.
    #[test]
    fn test_end_to_end_scenario() {
        let mut store = Store::new(&[("product_a", 50), ("product_b", 20)]);

        // Total left at the caller-supplied value, not recomputed
        let caller_total = dec("25.00");
        let mut order = store.create_order(
            OrderStatus::Pending,
            vec![("product_a", 2), ("product_b", 1)],
            caller_total,
        );

        assert_eq!(store.stock["product_a"], 50);
        assert_eq!(store.stock["product_b"], 20);
        assert_eq!(store.customer_total_orders, 1);
        assert_eq!(store.customer_total_spent, caller_total);

        store.edit_status(&mut order, OrderStatus::Completed);

        assert_eq!(store.stock["product_a"], 48);
        assert_eq!(store.stock["product_b"], 19);
        // Counters were incremented once at creation, not again at edit
        assert_eq!(store.customer_total_orders, 1);
        assert_eq!(store.customer_total_spent, caller_total);
    }

    #[test]
    fn test_toggle_completed_twice_is_stock_noop() {
        let mut store = Store::new(&[("widget", 30)]);
        let mut order =
            store.create_order(OrderStatus::Pending, vec![("widget", 5)], dec("50.00"));

        store.edit_status(&mut order, OrderStatus::Completed);
        assert_eq!(store.stock["widget"], 25);

        store.edit_status(&mut order, OrderStatus::Refunded);
        assert_eq!(store.stock["widget"], 30);

        store.edit_status(&mut order, OrderStatus::Completed);
        store.edit_status(&mut order, OrderStatus::Pending);
        assert_eq!(store.stock["widget"], 30);
    }

    #[test]
    fn test_create_completed_deducts_immediately() {
        let mut store = Store::new(&[("widget", 10)]);
        let order = store.create_order(OrderStatus::Completed, vec![("widget", 4)], dec("40"));

        assert_eq!(store.stock["widget"], 6);

        // Deleting a completed order restores stock and rolls the
        // customer statistics back.
        store.delete_order(order);
        assert_eq!(store.stock["widget"], 10);
        assert_eq!(store.customer_total_orders, 0);
        assert_eq!(store.customer_total_spent, Decimal::ZERO);
    }

    #[test]
    fn test_delete_pending_order_leaves_stock() {
        let mut store = Store::new(&[("widget", 10)]);
        let order = store.create_order(OrderStatus::Pending, vec![("widget", 4)], dec("40"));

        store.delete_order(order);
        assert_eq!(store.stock["widget"], 10);
        assert_eq!(store.customer_total_orders, 0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::Pending),
            Just(OrderStatus::Processing),
            Just(OrderStatus::Shipped),
            Just(OrderStatus::Completed),
            Just(OrderStatus::Cancelled),
            Just(OrderStatus::Refunded),
        ]
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A transition and its reverse cancel out on stock.
        #[test]
        fn prop_transition_and_back_is_noop(
            from in status_strategy(),
            to in status_strategy()
        ) {
            let forward = stock_adjustment(from, to);
            let back = stock_adjustment(to, from);

            let net: i32 = [forward, back]
                .iter()
                .map(|a| match a {
                    StockAdjustment::Deduct => -1,
                    StockAdjustment::Restore => 1,
                    StockAdjustment::Unchanged => 0,
                })
                .sum();

            prop_assert_eq!(net, 0);
        }

        /// Only transitions crossing the Completed boundary move stock.
        #[test]
        fn prop_only_completed_boundary_moves_stock(
            from in status_strategy(),
            to in status_strategy()
        ) {
            let adjustment = stock_adjustment(from, to);
            let crosses = (from == OrderStatus::Completed) != (to == OrderStatus::Completed);
            prop_assert_eq!(adjustment != StockAdjustment::Unchanged, crosses);
        }

        /// Line total with a 0-100 discount never exceeds the gross and
        /// never goes negative.
        #[test]
        fn prop_line_total_bounded(
            quantity in 1i32..=1000,
            unit_price in price_strategy(),
            discount in 0i64..=100
        ) {
            let gross = Decimal::from(quantity) * unit_price;
            let total = line_total(quantity, unit_price, Some(Decimal::from(discount)));

            prop_assert!(total >= Decimal::ZERO);
            prop_assert!(total <= gross);
        }

        /// A full discount zeroes the line; no discount keeps the gross.
        #[test]
        fn prop_line_total_extremes(
            quantity in 1i32..=1000,
            unit_price in price_strategy()
        ) {
            let gross = Decimal::from(quantity) * unit_price;
            prop_assert_eq!(
                line_total(quantity, unit_price, Some(Decimal::from(100))),
                Decimal::ZERO
            );
            prop_assert_eq!(line_total(quantity, unit_price, None), gross);
        }
    }
}
