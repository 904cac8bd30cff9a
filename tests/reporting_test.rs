mod common;

use anyhow::Result;
use common::{Crm, product, test_service};
use devis::domain::{QuoteStatus, QuoteUpdate, SaleDraft, SaleStatus};

#[tokio::test]
async fn test_empty_report() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let report = service.pipeline_report(5).await?;
    assert_eq!(report.products, 0);
    assert_eq!(report.quotes, 0);
    assert_eq!(report.sales, 0);
    assert!(report.quotes_by_status.is_empty());
    assert!(report.top_quotes.is_empty());
    assert_eq!(report.won_amount()?, 0);

    Ok(())
}

#[tokio::test]
async fn test_report_groups_and_ranks() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let p1 = product(&service, "SKU-001", Some(1000)).await?;

    let small = crm.quote(&service, "DEV-2026-0001").await?;
    service.upsert_line(small.id, p1.id, 1, None, None).await?;

    let large = crm.quote(&service, "DEV-2026-0002").await?;
    service.upsert_line(large.id, p1.id, 5, None, None).await?;
    service
        .update_quote(
            large.id,
            QuoteUpdate {
                status: Some(QuoteStatus::Accepted),
                ..Default::default()
            },
        )
        .await?;

    // Unpriced quotes are counted but never ranked.
    crm.quote(&service, "DEV-2026-0003").await?;

    service
        .create_sale_from_quote(
            large.id,
            SaleDraft {
                status: SaleStatus::Won,
                ..Default::default()
            },
        )
        .await?;

    let report = service.pipeline_report(10).await?;
    assert_eq!(report.products, 1);
    assert_eq!(report.quotes, 3);
    assert_eq!(report.sales, 1);

    let drafts = report
        .quotes_by_status
        .iter()
        .find(|s| s.status == QuoteStatus::Draft)
        .unwrap();
    assert_eq!(drafts.count, 2);
    assert_eq!(drafts.amount, 1000);

    let codes: Vec<_> = report.top_quotes.iter().map(|q| q.code.as_str()).collect();
    assert_eq!(codes, ["DEV-2026-0002", "DEV-2026-0001"]);
    assert_eq!(report.top_quotes[0].total, 5000);

    assert_eq!(report.won_amount()?, 5000);

    let limited = service.pipeline_report(1).await?;
    assert_eq!(limited.top_quotes.len(), 1);

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["quotes_by_status"][0]["status"], "accepted");

    Ok(())
}
