use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CampaignId, Cents, CompanyId, ContactId, Quote, QuoteId, UserId};

pub type SaleId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Open,
    Won,
    Lost,
    Canceled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 4] = [
        SaleStatus::Open,
        SaleStatus::Won,
        SaleStatus::Lost,
        SaleStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Open => "open",
            SaleStatus::Won => "won",
            SaleStatus::Lost => "lost",
            SaleStatus::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(SaleStatus::Open),
            "won" => Some(SaleStatus::Won),
            "lost" => Some(SaleStatus::Lost),
            "canceled" | "cancelled" => Some(SaleStatus::Canceled),
            _ => None,
        }
    }

    /// Anything but `open` ends the sale.
    pub fn is_closed(&self) -> bool {
        !matches!(self, SaleStatus::Open)
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const MAX_PROBABILITY: u8 = 100;

pub fn is_valid_probability(probability: u8) -> bool {
    probability <= MAX_PROBABILITY
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub quote_id: QuoteId,
    pub owner_id: UserId,
    pub company_id: CompanyId,
    pub contact_id: Option<ContactId>,
    pub campaign_id: Option<CampaignId>,
    pub reference: Option<String>,
    pub amount_cents: Option<Cents>,
    pub currency: String,
    pub status: SaleStatus,
    pub probability: Option<u8>,
    pub expected_close_date: Option<NaiveDate>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Derive a sale from a quote. Amount and currency are copied from the
    /// quote as it is now; owner and company default from the quote unless the
    /// draft overrides them.
    pub fn from_quote(quote: &Quote, draft: SaleDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            quote_id: quote.id,
            owner_id: draft.owner_id.unwrap_or(quote.owner_id),
            company_id: draft.company_id.unwrap_or(quote.company_id),
            contact_id: draft.contact_id,
            campaign_id: draft.campaign_id,
            reference: draft.reference,
            amount_cents: quote.total_cents,
            currency: quote.currency.clone(),
            status: draft.status,
            probability: draft.probability,
            expected_close_date: draft.expected_close_date,
            closed_at: draft.status.is_closed().then_some(now),
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Caller-supplied fields for a sale created from a quote.
#[derive(Debug, Clone)]
pub struct SaleDraft {
    pub owner_id: Option<UserId>,
    pub company_id: Option<CompanyId>,
    pub contact_id: Option<ContactId>,
    pub campaign_id: Option<CampaignId>,
    pub reference: Option<String>,
    pub status: SaleStatus,
    pub probability: Option<u8>,
    pub expected_close_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self {
            owner_id: None,
            company_id: None,
            contact_id: None,
            campaign_id: None,
            reference: None,
            status: SaleStatus::Open,
            probability: None,
            expected_close_date: None,
            notes: None,
        }
    }
}

/// Partial update of a sale. The amount is independent of the quote once the
/// sale exists and may be changed here.
#[derive(Debug, Clone, Default)]
pub struct SaleUpdate {
    pub status: Option<SaleStatus>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<NaiveDate>,
    pub closed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub amount_cents: Option<Cents>,
}

impl SaleUpdate {
    pub fn apply(self, sale: &mut Sale) {
        let now = Utc::now();
        if let Some(status) = self.status {
            sale.status = status;
            if status.is_closed() && self.closed_at.is_none() && sale.closed_at.is_none() {
                sale.closed_at = Some(now);
            }
        }
        if let Some(probability) = self.probability {
            sale.probability = Some(probability);
        }
        if let Some(date) = self.expected_close_date {
            sale.expected_close_date = Some(date);
        }
        if let Some(closed_at) = self.closed_at {
            sale.closed_at = Some(closed_at);
        }
        if let Some(notes) = self.notes {
            sale.notes = Some(notes);
        }
        if let Some(amount) = self.amount_cents {
            sale.amount_cents = Some(amount);
        }
        sale.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewQuote;

    fn priced_quote(total: Option<Cents>) -> Quote {
        let mut quote = NewQuote::new("DEV-2026-0001", Uuid::new_v4(), Uuid::new_v4()).into_quote();
        quote.total_cents = total;
        quote
    }

    #[test]
    fn test_sale_status_roundtrip() {
        for status in SaleStatus::ALL {
            assert_eq!(SaleStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(SaleStatus::from_str("cancelled"), Some(SaleStatus::Canceled));
    }

    #[test]
    fn test_probability_bounds() {
        assert!(is_valid_probability(0));
        assert!(is_valid_probability(100));
        assert!(!is_valid_probability(101));
    }

    #[test]
    fn test_from_quote_copies_total_and_parties() {
        let quote = priced_quote(Some(4000));
        let sale = Sale::from_quote(&quote, SaleDraft::default());

        assert_eq!(sale.quote_id, quote.id);
        assert_eq!(sale.amount_cents, Some(4000));
        assert_eq!(sale.currency, "EUR");
        assert_eq!(sale.owner_id, quote.owner_id);
        assert_eq!(sale.company_id, quote.company_id);
        assert_eq!(sale.status, SaleStatus::Open);
        assert!(sale.closed_at.is_none());
    }

    #[test]
    fn test_from_quote_keeps_draft_overrides() {
        let quote = priced_quote(None);
        let owner = Uuid::new_v4();
        let sale = Sale::from_quote(
            &quote,
            SaleDraft {
                owner_id: Some(owner),
                status: SaleStatus::Won,
                probability: Some(90),
                ..Default::default()
            },
        );

        assert_eq!(sale.owner_id, owner);
        assert_eq!(sale.amount_cents, None);
        assert!(sale.closed_at.is_some());
    }

    #[test]
    fn test_closing_stamps_closed_at_once() {
        let mut sale = Sale::from_quote(&priced_quote(Some(100)), SaleDraft::default());

        SaleUpdate {
            status: Some(SaleStatus::Lost),
            ..Default::default()
        }
        .apply(&mut sale);
        let first = sale.closed_at;
        assert!(first.is_some());

        SaleUpdate {
            status: Some(SaleStatus::Canceled),
            ..Default::default()
        }
        .apply(&mut sale);
        assert_eq!(sale.closed_at, first);
    }
}
