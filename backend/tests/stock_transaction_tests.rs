//! Stock transaction arithmetic tests
//!
//! Covers the recording and reversal effects on product stock:
//! Purchase/Return add, Sale subtracts, Adjustment overwrites
//! absolutely, Transfer is record-only, and deleting a transaction
//! reverses exactly what recording it did (where a reversal is defined).

use proptest::prelude::*;
use shared::models::{delete_effect, record_effect, StockEffect, TransactionType};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_purchase_sale_return_sequence() {
        // initial + q1 - q2 + q3
        let mut stock = 100;
        stock = record_effect(TransactionType::Purchase, 40).apply(stock);
        stock = record_effect(TransactionType::Sale, 25).apply(stock);
        stock = record_effect(TransactionType::Return, 5).apply(stock);
        assert_eq!(stock, 100 + 40 - 25 + 5);
    }

    #[test]
    fn test_adjustment_is_absolute_not_relative() {
        let stock = record_effect(TransactionType::Adjustment, 12).apply(500);
        assert_eq!(stock, 12);

        // Applying the same adjustment twice lands on the same value
        let again = record_effect(TransactionType::Adjustment, 12).apply(stock);
        assert_eq!(again, 12);
    }

    #[test]
    fn test_transfer_moves_nothing() {
        assert_eq!(record_effect(TransactionType::Transfer, 30).apply(80), 80);
    }

    #[test]
    fn test_delete_reverses_purchase() {
        let after = record_effect(TransactionType::Purchase, 15).apply(60);
        assert_eq!(delete_effect(TransactionType::Purchase, 15).apply(after), 60);
    }

    #[test]
    fn test_delete_reverses_sale() {
        let after = record_effect(TransactionType::Sale, 22).apply(60);
        assert_eq!(delete_effect(TransactionType::Sale, 22).apply(after), 60);
    }

    #[test]
    fn test_delete_reverses_return() {
        let after = record_effect(TransactionType::Return, 3).apply(60);
        assert_eq!(delete_effect(TransactionType::Return, 3).apply(after), 60);
    }

    #[test]
    fn test_adjustment_delete_has_no_reversal() {
        // The pre-adjustment quantity is not recorded, so deletion
        // leaves stock where the adjustment put it.
        let after = record_effect(TransactionType::Adjustment, 7).apply(100);
        assert_eq!(delete_effect(TransactionType::Adjustment, 7).apply(after), 7);
    }

    #[test]
    fn test_transaction_type_round_trip() {
        for kind in TransactionType::ALL {
            assert_eq!(TransactionType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionType::parse("Restock"), None);
    }

    #[test]
    fn test_effect_shapes() {
        assert_eq!(record_effect(TransactionType::Purchase, 4), StockEffect::Add(4));
        assert_eq!(record_effect(TransactionType::Sale, 4), StockEffect::Subtract(4));
        assert_eq!(record_effect(TransactionType::Adjustment, 4), StockEffect::Set(4));
        assert_eq!(record_effect(TransactionType::Transfer, 4), StockEffect::None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        1i32..=10_000
    }

    fn delta_type_strategy() -> impl Strategy<Value = TransactionType> {
        prop_oneof![
            Just(TransactionType::Purchase),
            Just(TransactionType::Sale),
            Just(TransactionType::Return),
        ]
    }

    fn any_type_strategy() -> impl Strategy<Value = TransactionType> {
        prop_oneof![
            Just(TransactionType::Purchase),
            Just(TransactionType::Sale),
            Just(TransactionType::Return),
            Just(TransactionType::Adjustment),
            Just(TransactionType::Transfer),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Recording then deleting any delta-type transaction restores
        /// the starting stock exactly.
        #[test]
        fn prop_record_then_delete_is_identity(
            initial in 0i32..=100_000,
            kind in delta_type_strategy(),
            quantity in quantity_strategy()
        ) {
            let after = record_effect(kind, quantity).apply(initial);
            let restored = delete_effect(kind, quantity).apply(after);
            prop_assert_eq!(restored, initial);
        }

        /// A sequence of Purchase/Sale/Return transactions nets out to
        /// initial + purchases + returns - sales.
        #[test]
        fn prop_sequence_nets_out(
            initial in 0i32..=100_000,
            transactions in prop::collection::vec(
                (delta_type_strategy(), quantity_strategy()),
                1..20
            )
        ) {
            let mut stock = initial;
            let mut expected = initial as i64;

            for (kind, qty) in &transactions {
                stock = record_effect(*kind, *qty).apply(stock);
                expected += match kind {
                    TransactionType::Purchase | TransactionType::Return => *qty as i64,
                    TransactionType::Sale => -(*qty as i64),
                    _ => 0,
                };
            }

            prop_assert_eq!(stock as i64, expected);
        }

        /// After an Adjustment the stock equals the adjustment quantity
        /// regardless of everything that came before.
        #[test]
        fn prop_adjustment_discards_history(
            initial in 0i32..=100_000,
            history in prop::collection::vec(
                (any_type_strategy(), quantity_strategy()),
                0..10
            ),
            target in 0i32..=10_000
        ) {
            let mut stock = initial;
            for (kind, qty) in &history {
                stock = record_effect(*kind, *qty).apply(stock);
            }
            stock = record_effect(TransactionType::Adjustment, target).apply(stock);
            prop_assert_eq!(stock, target);
        }

        /// Deleting an Adjustment or Transfer never moves stock.
        #[test]
        fn prop_no_reversal_types_leave_stock(
            stock in 0i32..=100_000,
            quantity in quantity_strategy()
        ) {
            prop_assert_eq!(
                delete_effect(TransactionType::Adjustment, quantity).apply(stock),
                stock
            );
            prop_assert_eq!(
                delete_effect(TransactionType::Transfer, quantity).apply(stock),
                stock
            );
        }
    }
}
