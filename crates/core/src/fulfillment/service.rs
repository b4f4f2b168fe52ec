//! Order confirmation rules.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::FulfillmentError;
use tally_shared::types::ProductId;

use super::types::{NewOrderLine, OrderStatus, StockCheck, StockShortfall};

/// Stateless fulfillment service.
pub struct FulfillmentService;

impl FulfillmentService {
    /// Validate requested order lines.
    ///
    /// # Errors
    ///
    /// Returns `NoLines`, `InvalidQuantity` or `InvalidPrice`.
    pub fn validate_lines(lines: &[NewOrderLine]) -> Result<(), FulfillmentError> {
        if lines.is_empty() {
            return Err(FulfillmentError::NoLines);
        }
        for (index, line) in lines.iter().enumerate() {
            if line.quantity <= 0 {
                return Err(FulfillmentError::InvalidQuantity { index });
            }
            if line.unit_price.is_some_and(|price| price < Decimal::ZERO) {
                return Err(FulfillmentError::InvalidPrice { index });
            }
        }
        Ok(())
    }

    /// Validate that an order can be confirmed.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` unless the order is DRAFT.
    pub fn validate_can_confirm(status: OrderStatus) -> Result<(), FulfillmentError> {
        Self::require_draft(status, "confirmed")
    }

    /// Validate that an order can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns `NotDraft` unless the order is DRAFT.
    pub fn validate_can_cancel(status: OrderStatus) -> Result<(), FulfillmentError> {
        Self::require_draft(status, "cancelled")
    }

    fn require_draft(status: OrderStatus, action: &'static str) -> Result<(), FulfillmentError> {
        if status != OrderStatus::Draft {
            return Err(FulfillmentError::NotDraft {
                status: status.as_str(),
                action,
            });
        }
        Ok(())
    }

    /// Check every line against stock on hand.
    ///
    /// Quantities for the same product on several lines are added up before
    /// comparing. All offending products are reported, not just the first.
    /// Returns the units to deduct per product, ordered by product id.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` listing every short product.
    pub fn check_stock(lines: &[StockCheck]) -> Result<Vec<(ProductId, i32)>, FulfillmentError> {
        // Summed in i64: many i32 lines for one product can exceed i32::MAX.
        let mut totals: Vec<(&StockCheck, i64)> = Vec::with_capacity(lines.len());
        for line in lines {
            match totals.iter_mut().find(|(t, _)| t.product_id == line.product_id) {
                Some((_, requested)) => *requested += i64::from(line.requested),
                None => totals.push((line, i64::from(line.requested))),
            }
        }

        let mut deductions = Vec::with_capacity(totals.len());
        let mut shortfalls = Vec::new();
        for (line, requested) in totals {
            match i32::try_from(requested) {
                Ok(quantity) if quantity <= line.available => {
                    deductions.push((line.product_id, quantity));
                }
                _ => shortfalls.push(StockShortfall {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    requested,
                    available: line.available,
                }),
            }
        }

        if shortfalls.is_empty() {
            deductions.sort_unstable_by_key(|(product_id, _)| *product_id);
            Ok(deductions)
        } else {
            Err(FulfillmentError::InsufficientStock { shortfalls })
        }
    }

    /// Apply a stock change.
    ///
    /// # Errors
    ///
    /// Returns `NegativeStock` if the result would be below zero.
    pub fn adjust_stock(product_id: Uuid, on_hand: i32, delta: i32) -> Result<i32, FulfillmentError> {
        match on_hand.checked_add(delta) {
            Some(next) if next >= 0 => Ok(next),
            _ => Err(FulfillmentError::NegativeStock {
                product_id,
                on_hand,
                delta,
            }),
        }
    }

    /// `quantity * unit_price`.
    #[must_use]
    pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Sum of line totals.
    #[must_use]
    pub fn order_total<I>(lines: I) -> Decimal
    where
        I: IntoIterator<Item = (i32, Decimal)>,
    {
        lines
            .into_iter()
            .map(|(quantity, unit_price)| Self::line_total(quantity, unit_price))
            .sum()
    }

    /// Due date for the generated invoice.
    #[must_use]
    pub fn due_date(date: NaiveDate, payment_terms_days: u32) -> NaiveDate {
        date.checked_add_days(Days::new(u64::from(payment_terms_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn check(product_id: ProductId, requested: i32, available: i32) -> StockCheck {
        StockCheck {
            product_id,
            product_name: "Widget".to_string(),
            requested,
            available,
        }
    }

    #[test]
    fn test_validate_lines() {
        let line = |quantity, unit_price| NewOrderLine {
            product_id: ProductId::new(),
            quantity,
            unit_price,
        };
        assert!(FulfillmentService::validate_lines(&[line(1, None)]).is_ok());
        assert!(matches!(
            FulfillmentService::validate_lines(&[]),
            Err(FulfillmentError::NoLines)
        ));
        assert!(matches!(
            FulfillmentService::validate_lines(&[line(1, None), line(0, None)]),
            Err(FulfillmentError::InvalidQuantity { index: 1 })
        ));
        assert!(matches!(
            FulfillmentService::validate_lines(&[line(2, Some(dec!(-1)))]),
            Err(FulfillmentError::InvalidPrice { index: 0 })
        ));
    }

    #[test]
    fn test_exact_stock_passes() {
        let product = ProductId::new();
        assert_eq!(
            FulfillmentService::check_stock(&[check(product, 5, 5)]).unwrap(),
            vec![(product, 5)]
        );
    }

    #[test]
    fn test_deductions_are_summed_per_product() {
        let (a, b) = (ProductId::new(), ProductId::new());
        let mut expected = vec![(a, 7), (b, 1)];
        expected.sort_unstable_by_key(|(id, _)| *id);

        let deductions = FulfillmentService::check_stock(&[
            check(a, 3, 10),
            check(b, 1, 10),
            check(a, 4, 10),
        ])
        .unwrap();
        assert_eq!(deductions, expected);
    }

    #[test]
    fn test_lines_summing_past_i32_max_are_short() {
        let product = ProductId::new();
        let err = FulfillmentService::check_stock(&[
            check(product, 1_500_000_000, 10),
            check(product, 1_500_000_000, 10),
        ])
        .unwrap_err();

        let FulfillmentError::InsufficientStock { shortfalls } = &err else {
            panic!("expected InsufficientStock, got {err:?}");
        };
        assert_eq!(shortfalls[0].requested, 3_000_000_000);
        assert_eq!(shortfalls[0].available, 10);
    }

    #[test]
    fn test_combined_lines_within_stock_but_past_i32_max_are_short() {
        let product = ProductId::new();
        let result = FulfillmentService::check_stock(&[
            check(product, i32::MAX, i32::MAX),
            check(product, 1, i32::MAX),
        ]);
        assert!(matches!(result, Err(FulfillmentError::InsufficientStock { .. })));
    }

    #[test]
    fn test_shortfall_lists_every_product() {
        let err = FulfillmentService::check_stock(&[
            check(ProductId::new(), 6, 5),
            check(ProductId::new(), 1, 10),
            check(ProductId::new(), 3, 0),
        ])
        .unwrap_err();

        let FulfillmentError::InsufficientStock { shortfalls } = &err else {
            panic!("expected InsufficientStock, got {err:?}");
        };
        assert_eq!(shortfalls.len(), 2);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Widget (Requested: 6, Available: 5); \
             Insufficient stock for Widget (Requested: 3, Available: 0)"
        );
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_repeated_product_is_summed() {
        let product = ProductId::new();
        let result = FulfillmentService::check_stock(&[check(product, 3, 5), check(product, 3, 5)]);
        assert!(matches!(
            result,
            Err(FulfillmentError::InsufficientStock { ref shortfalls }) if shortfalls[0].requested == 6
        ));
    }

    #[test]
    fn test_confirm_and_cancel_only_from_draft() {
        assert!(FulfillmentService::validate_can_confirm(OrderStatus::Draft).is_ok());
        assert!(FulfillmentService::validate_can_cancel(OrderStatus::Draft).is_ok());
        for status in [OrderStatus::Confirmed, OrderStatus::Cancelled] {
            assert!(matches!(
                FulfillmentService::validate_can_confirm(status),
                Err(FulfillmentError::NotDraft { action: "confirmed", .. })
            ));
            assert!(FulfillmentService::validate_can_cancel(status).is_err());
        }
    }

    #[test]
    fn test_adjust_stock() {
        let id = Uuid::new_v4();
        assert_eq!(FulfillmentService::adjust_stock(id, 5, -5).unwrap(), 0);
        assert_eq!(FulfillmentService::adjust_stock(id, 5, 10).unwrap(), 15);
        assert!(matches!(
            FulfillmentService::adjust_stock(id, 5, -6),
            Err(FulfillmentError::NegativeStock { .. })
        ));
        assert!(FulfillmentService::adjust_stock(id, i32::MAX, 1).is_err());
    }

    #[test]
    fn test_totals_and_due_date() {
        assert_eq!(FulfillmentService::line_total(5, dec!(19.99)), dec!(99.95));
        assert_eq!(
            FulfillmentService::order_total([(5, dec!(19.99)), (2, dec!(0.50))]),
            dec!(100.95)
        );
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            FulfillmentService::due_date(date, 30),
            NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        );
    }
}
