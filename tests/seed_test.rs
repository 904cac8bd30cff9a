mod common;

use anyhow::Result;
use common::test_service;
use devis::application::{CrmService, SeedOptions, SeedSummary, seed_crm_data};
use devis::domain::{QuoteStatus, quote_total};

fn small() -> SeedOptions {
    SeedOptions {
        users: 3,
        companies: 12,
        seed: 42,
    }
}

async fn seeded(options: &SeedOptions) -> Result<(CrmService, tempfile::TempDir, SeedSummary)> {
    let (service, temp) = test_service().await?;
    let summary = seed_crm_data(&service, options).await?;
    Ok((service, temp, summary))
}

#[tokio::test]
async fn test_seed_creates_expected_shape() -> Result<()> {
    let (service, _temp, summary) = seeded(&small()).await?;

    assert!(!summary.skipped);
    assert_eq!(summary.users, 3);
    assert_eq!(summary.campaigns, 6);
    assert_eq!(summary.products, 6);
    assert_eq!(summary.companies, 12);
    assert!(summary.contacts >= 12 && summary.contacts <= 36);
    assert_eq!(summary.quotes, 6);
    assert!(summary.lines >= summary.quotes && summary.lines <= summary.quotes * 4);

    let products = service.list_products(50, 0).await?;
    assert_eq!(products.len(), 6);
    for product in &products {
        let price = product.unit_price_cents.unwrap();
        assert!([4_900, 9_900, 19_900, 29_900, 49_900].contains(&price));
    }

    Ok(())
}

#[tokio::test]
async fn test_seeded_totals_match_lines() -> Result<()> {
    let (service, _temp, _summary) = seeded(&small()).await?;

    let quotes = service.list_quotes(100, 0).await?;
    assert!(!quotes.is_empty());
    for quote in quotes {
        let lines = service.list_lines(quote.id).await?;
        assert!((1..=4).contains(&lines.len()));
        assert!(lines.iter().all(|l| (1..=10).contains(&l.quantity)));
        assert_eq!(quote.total_cents, quote_total(&lines)?);
        assert!(quote.total_cents.is_some());
    }

    Ok(())
}

#[tokio::test]
async fn test_seeded_sales_come_from_accepted_quotes() -> Result<()> {
    let (service, _temp, summary) = seeded(&SeedOptions {
        users: 2,
        companies: 40,
        seed: 7,
    })
    .await?;

    let sales = service.list_sales(100, 0).await?;
    assert_eq!(sales.len(), summary.sales);
    for sale in sales {
        let quote = service.get_quote(sale.quote_id).await?;
        assert_eq!(quote.status, QuoteStatus::Accepted);
        assert_eq!(sale.amount_cents, quote.total_cents);
        assert!([30, 50, 70, 90].contains(&sale.probability.unwrap()));
    }

    Ok(())
}

#[tokio::test]
async fn test_seed_is_deterministic() -> Result<()> {
    let (first, _t1, a) = seeded(&small()).await?;
    let (second, _t2, b) = seeded(&small()).await?;
    assert_eq!(a, b);

    let mut left: Vec<_> = first
        .list_quotes(100, 0)
        .await?
        .into_iter()
        .map(|q| (q.code, q.status, q.total_cents))
        .collect();
    let mut right: Vec<_> = second
        .list_quotes(100, 0)
        .await?
        .into_iter()
        .map(|q| (q.code, q.status, q.total_cents))
        .collect();
    left.sort_by(|x, y| x.0.cmp(&y.0));
    right.sort_by(|x, y| x.0.cmp(&y.0));
    assert_eq!(left, right);

    Ok(())
}

#[tokio::test]
async fn test_seed_skips_populated_database() -> Result<()> {
    let (service, _temp, first) = seeded(&small()).await?;
    assert!(!first.skipped);

    let second = seed_crm_data(&service, &small()).await?;
    assert!(second.skipped);
    assert_eq!(second.quotes, 0);
    assert_eq!(service.list_products(50, 0).await?.len(), 6);

    Ok(())
}
