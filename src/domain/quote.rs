use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, CampaignId, CompanyId, ContactId, DEFAULT_CURRENCY, UserId};

pub type QuoteId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(QuoteStatus::Draft),
            "sent" => Some(QuoteStatus::Sent),
            "accepted" => Some(QuoteStatus::Accepted),
            "rejected" => Some(QuoteStatus::Rejected),
            "expired" => Some(QuoteStatus::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A priced proposal. `total_cents` is a cache over the quote's lines and is
/// only ever written by the ledger's recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub code: String,
    pub title: Option<String>,
    pub owner_id: UserId,
    pub company_id: CompanyId,
    pub contact_id: Option<ContactId>,
    pub campaign_id: Option<CampaignId>,
    pub status: QuoteStatus,
    pub issue_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total_cents: Option<Cents>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(code: String, owner_id: UserId, company_id: CompanyId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            title: None,
            owner_id,
            company_id,
            contact_id: None,
            campaign_id: None,
            status: QuoteStatus::Draft,
            issue_date: None,
            valid_until: None,
            notes: None,
            total_cents: None,
            currency: DEFAULT_CURRENCY.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.total_cents.is_some()
    }
}

/// Fields accepted when creating a quote.
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub code: String,
    pub owner_id: UserId,
    pub company_id: CompanyId,
    pub contact_id: Option<ContactId>,
    pub campaign_id: Option<CampaignId>,
    pub title: Option<String>,
    pub status: QuoteStatus,
    pub currency: String,
    pub issue_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewQuote {
    pub fn new(code: impl Into<String>, owner_id: UserId, company_id: CompanyId) -> Self {
        Self {
            code: code.into(),
            owner_id,
            company_id,
            contact_id: None,
            campaign_id: None,
            title: None,
            status: QuoteStatus::Draft,
            currency: DEFAULT_CURRENCY.to_string(),
            issue_date: None,
            valid_until: None,
            notes: None,
        }
    }

    /// Build the stored record. A fresh quote has no lines, hence no total.
    pub fn into_quote(self) -> Quote {
        let mut quote = Quote::new(self.code, self.owner_id, self.company_id);
        quote.contact_id = self.contact_id;
        quote.campaign_id = self.campaign_id;
        quote.title = self.title;
        quote.status = self.status;
        quote.currency = self.currency;
        quote.issue_date = self.issue_date;
        quote.valid_until = self.valid_until;
        quote.notes = self.notes;
        quote
    }
}

/// Partial update of a quote. `None` leaves the field as it is. The cached
/// total is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct QuoteUpdate {
    pub title: Option<String>,
    pub status: Option<QuoteStatus>,
    pub notes: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub contact_id: Option<ContactId>,
    pub campaign_id: Option<CampaignId>,
}

impl QuoteUpdate {
    pub fn apply(self, quote: &mut Quote) {
        if let Some(title) = self.title {
            quote.title = Some(title);
        }
        if let Some(status) = self.status {
            quote.status = status;
        }
        if let Some(notes) = self.notes {
            quote.notes = Some(notes);
        }
        if let Some(date) = self.issue_date {
            quote.issue_date = Some(date);
        }
        if let Some(date) = self.valid_until {
            quote.valid_until = Some(date);
        }
        if let Some(contact_id) = self.contact_id {
            quote.contact_id = Some(contact_id);
        }
        if let Some(campaign_id) = self.campaign_id {
            quote.campaign_id = Some(campaign_id);
        }
        quote.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_status_roundtrip() {
        for status in QuoteStatus::ALL {
            assert_eq!(QuoteStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(QuoteStatus::from_str("SENT"), Some(QuoteStatus::Sent));
        assert_eq!(QuoteStatus::from_str("won"), None);
    }

    #[test]
    fn test_new_quote_is_unpriced_draft() {
        let quote = Quote::new("DEV-2026-0001".into(), Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.currency, "EUR");
        assert!(!quote.is_priced());
    }

    #[test]
    fn test_update_only_touches_supplied_fields() {
        let mut quote = NewQuote {
            title: Some("Licences".into()),
            notes: Some("first draft".into()),
            ..NewQuote::new("DEV-2026-0002", Uuid::new_v4(), Uuid::new_v4())
        }
        .into_quote();

        QuoteUpdate {
            status: Some(QuoteStatus::Sent),
            ..Default::default()
        }
        .apply(&mut quote);

        assert_eq!(quote.status, QuoteStatus::Sent);
        assert_eq!(quote.title.as_deref(), Some("Licences"));
        assert_eq!(quote.notes.as_deref(), Some("first draft"));
    }
}
