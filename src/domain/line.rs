use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, MoneyError, ProductId, QuoteId, line_total, sum_priced};

pub type LineItemId = Uuid;

/// A (quote, product) pairing. The unit price is a snapshot taken when the
/// line was written and does not follow later changes to the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub quote_id: QuoteId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_cents: Option<Cents>,
    pub currency: String,
    pub line_total_cents: Option<Cents>,
    pub created_at: DateTime<Utc>,
}

impl LineItem {
    pub fn new(
        quote_id: QuoteId,
        product_id: ProductId,
        quantity: u32,
        unit_price_cents: Option<Cents>,
        currency: String,
    ) -> Result<Self, MoneyError> {
        Ok(Self {
            id: Uuid::new_v4(),
            quote_id,
            product_id,
            quantity,
            unit_price_cents,
            currency,
            line_total_cents: line_total(quantity, unit_price_cents)?,
            created_at: Utc::now(),
        })
    }

    /// Overwrite quantity, price and currency in place, keeping the line's
    /// identity, and re-derive the line total.
    pub fn reprice(
        &mut self,
        quantity: u32,
        unit_price_cents: Option<Cents>,
        currency: String,
    ) -> Result<(), MoneyError> {
        self.line_total_cents = line_total(quantity, unit_price_cents)?;
        self.quantity = quantity;
        self.unit_price_cents = unit_price_cents;
        self.currency = currency;
        Ok(())
    }

    pub fn is_priced(&self) -> bool {
        self.line_total_cents.is_some()
    }
}

/// The cached total a quote must carry for the given lines: the sum of the
/// priced line totals, or `None` if no line is priced. Fails when the sum
/// does not fit in [`Cents`].
pub fn quote_total(lines: &[LineItem]) -> Result<Option<Cents>, MoneyError> {
    sum_priced(lines.iter().map(|line| line.line_total_cents))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, price: Option<Cents>) -> LineItem {
        LineItem::new(Uuid::new_v4(), Uuid::new_v4(), quantity, price, "EUR".into()).unwrap()
    }

    #[test]
    fn test_line_total_is_derived() {
        assert_eq!(line(3, Some(1000)).line_total_cents, Some(3000));
        assert_eq!(line(3, None).line_total_cents, None);
    }

    #[test]
    fn test_reprice_keeps_identity() {
        let mut item = line(3, Some(1000));
        let id = item.id;

        item.reprice(5, Some(200), "USD".into()).unwrap();

        assert_eq!(item.id, id);
        assert_eq!(item.quantity, 5);
        assert_eq!(item.line_total_cents, Some(1000));
        assert_eq!(item.currency, "USD");
    }

    #[test]
    fn test_reprice_overflow_leaves_line_untouched() {
        let mut item = line(3, Some(1000));
        assert!(item.reprice(u32::MAX, Some(i64::MAX), "EUR".into()).is_err());
        assert_eq!(item.quantity, 3);
        assert_eq!(item.line_total_cents, Some(3000));
    }

    #[test]
    fn test_quote_total() {
        assert_eq!(quote_total(&[]), Ok(None));
        assert_eq!(quote_total(&[line(2, None)]), Ok(None));
        assert_eq!(quote_total(&[line(3, Some(1000)), line(2, Some(500))]), Ok(Some(4000)));
        assert_eq!(quote_total(&[line(3, Some(1000)), line(1, None)]), Ok(Some(3000)));
        assert_eq!(quote_total(&[line(4, Some(0))]), Ok(Some(0)));
    }

    #[test]
    fn test_quote_total_overflow() {
        let half = i64::MAX / 2 + 1;
        assert_eq!(
            quote_total(&[line(1, Some(half)), line(1, Some(half))]),
            Err(MoneyError::Overflow)
        );
    }
}
