use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, MoneyError, QuoteId, QuoteStatus, SaleStatus};
use crate::storage::{CountedTable, StatusAggregate};

use super::{AppError, CrmService};

/// The aggregate views a dashboard polls for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    pub products: i64,
    pub quotes: i64,
    pub sales: i64,
    pub quotes_by_status: Vec<StatusSummary<QuoteStatus>>,
    pub sales_by_status: Vec<StatusSummary<SaleStatus>>,
    pub top_quotes: Vec<QuoteSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSummary<S> {
    pub status: S,
    pub count: i64,
    pub amount: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub id: QuoteId,
    pub code: String,
    pub status: QuoteStatus,
    pub total: Cents,
    pub currency: String,
}

impl PipelineReport {
    /// Amount of the sales already won.
    pub fn won_amount(&self) -> Result<Cents, MoneyError> {
        self.sales_by_status
            .iter()
            .filter(|s| s.status == SaleStatus::Won)
            .try_fold(0, |acc: Cents, s| acc.checked_add(s.amount).ok_or(MoneyError::Overflow))
    }
}

impl CrmService {
    /// Build the pipeline report with the `top` highest priced quotes.
    pub async fn pipeline_report(&self, top: u32) -> Result<PipelineReport, AppError> {
        let repo = self.repository();

        let quotes_by_status = summarize(repo.quote_status_counts().await?, QuoteStatus::from_str)?;
        let sales_by_status = summarize(repo.sale_status_totals().await?, SaleStatus::from_str)?;

        let top_quotes = repo
            .top_quotes_by_total(top)
            .await?
            .into_iter()
            .filter_map(|quote| {
                quote.total_cents.map(|total| QuoteSummary {
                    id: quote.id,
                    code: quote.code,
                    status: quote.status,
                    total,
                    currency: quote.currency,
                })
            })
            .collect();

        Ok(PipelineReport {
            generated_at: Utc::now(),
            products: repo.count_rows(CountedTable::Products).await?,
            quotes: repo.count_rows(CountedTable::Quotes).await?,
            sales: repo.count_rows(CountedTable::Sales).await?,
            quotes_by_status,
            sales_by_status,
            top_quotes,
        })
    }
}

fn summarize<S>(
    rows: Vec<StatusAggregate>,
    parse: fn(&str) -> Option<S>,
) -> Result<Vec<StatusSummary<S>>, AppError> {
    rows.into_iter()
        .map(|row| {
            let status = parse(&row.status).ok_or(AppError::InvalidStatus(row.status))?;
            Ok(StatusSummary {
                status,
                count: row.count,
                amount: row.amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(sales: Vec<(SaleStatus, Cents)>) -> PipelineReport {
        PipelineReport {
            generated_at: Utc::now(),
            products: 0,
            quotes: 0,
            sales: sales.len() as i64,
            quotes_by_status: Vec::new(),
            sales_by_status: sales
                .into_iter()
                .map(|(status, amount)| StatusSummary {
                    status,
                    count: 1,
                    amount,
                })
                .collect(),
            top_quotes: Vec::new(),
        }
    }

    #[test]
    fn test_won_amount_counts_only_won() {
        let report = report(vec![(SaleStatus::Open, 700), (SaleStatus::Won, 1200)]);
        assert_eq!(report.won_amount(), Ok(1200));
    }

    #[test]
    fn test_won_amount_overflow() {
        let half = i64::MAX / 2 + 1;
        let report = report(vec![(SaleStatus::Won, half), (SaleStatus::Won, half)]);
        assert_eq!(report.won_amount(), Err(MoneyError::Overflow));
    }
}
