mod common;

use anyhow::Result;
use common::{Crm, product, test_service};
use devis::application::AppError;
use devis::domain::{Sale, SaleDraft, SaleStatus, SaleUpdate};
use devis::storage::Repository;
use uuid::Uuid;

#[tokio::test]
async fn test_sale_from_quote_is_idempotent_and_frozen() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let p1 = product(&service, "SKU-001", Some(1000)).await?;
    let p2 = product(&service, "SKU-002", Some(500)).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;
    service.upsert_line(quote.id, p1.id, 3, None, None).await?;
    service.upsert_line(quote.id, p2.id, 2, None, None).await?;

    let sale = service
        .create_sale_from_quote(quote.id, SaleDraft::default())
        .await?;
    assert_eq!(sale.amount_cents, Some(4000));
    assert_eq!(sale.currency, "EUR");
    assert_eq!(sale.owner_id, crm.owner.id);
    assert_eq!(sale.company_id, crm.company.id);
    assert_eq!(sale.status, SaleStatus::Open);

    // The quote moves on; the sale does not.
    service.remove_line(quote.id, p1.id).await?;
    assert_eq!(service.get_quote(quote.id).await?.total_cents, Some(1000));

    let again = service
        .create_sale_from_quote(
            quote.id,
            SaleDraft {
                status: SaleStatus::Won,
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(again.id, sale.id);
    assert_eq!(again.amount_cents, Some(4000));
    assert_eq!(again.status, SaleStatus::Open);

    let stored = service.get_sale_for_quote(quote.id).await?;
    assert_eq!(stored.map(|s| s.id), Some(sale.id));
    assert_eq!(service.list_sales(50, 0).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_sale_from_unpriced_quote_has_no_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;

    let sale = service
        .create_sale_from_quote(quote.id, SaleDraft::default())
        .await?;
    assert_eq!(sale.amount_cents, None);

    Ok(())
}

#[tokio::test]
async fn test_sale_for_missing_quote_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .create_sale_from_quote(Uuid::new_v4(), SaleDraft::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::QuoteNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_probability_is_bounded() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;

    let err = service
        .create_sale_from_quote(
            quote.id,
            SaleDraft {
                probability: Some(101),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidProbability(101)));
    assert!(service.get_sale_for_quote(quote.id).await?.is_none());

    let sale = service
        .create_sale_from_quote(
            quote.id,
            SaleDraft {
                probability: Some(70),
                ..Default::default()
            },
        )
        .await?;

    let err = service
        .update_sale(
            sale.id,
            SaleUpdate {
                probability: Some(150),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidProbability(150)));
    assert_eq!(service.get_sale(sale.id).await?.probability, Some(70));

    Ok(())
}

#[tokio::test]
async fn test_closing_sale_stamps_closed_at() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let p1 = product(&service, "SKU-001", Some(1000)).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;
    service.upsert_line(quote.id, p1.id, 1, None, None).await?;

    let sale = service
        .create_sale_from_quote(quote.id, SaleDraft::default())
        .await?;
    assert!(sale.closed_at.is_none());

    let updated = service
        .update_sale(
            sale.id,
            SaleUpdate {
                status: Some(SaleStatus::Won),
                amount_cents: Some(1200),
                notes: Some("signed".into()),
                ..Default::default()
            },
        )
        .await?;
    assert!(updated.closed_at.is_some());

    let stored = service.get_sale(sale.id).await?;
    assert_eq!(stored.status, SaleStatus::Won);
    assert_eq!(stored.amount_cents, Some(1200));
    assert_eq!(stored.notes.as_deref(), Some("signed"));
    assert!(stored.closed_at.is_some());

    // Changing the sale amount leaves the quote alone.
    assert_eq!(service.get_quote(quote.id).await?.total_cents, Some(1000));

    Ok(())
}

#[tokio::test]
async fn test_quote_with_sale_cannot_be_deleted() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;
    let sale = service
        .create_sale_from_quote(quote.id, SaleDraft::default())
        .await?;

    let err = service.delete_quote(quote.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    assert!(service.get_quote(quote.id).await.is_ok());

    assert!(service.delete_sale(sale.id).await?);
    assert!(service.delete_quote(quote.id).await?);

    Ok(())
}

#[tokio::test]
async fn test_missing_sale_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_sale(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());

    let err = service
        .update_sale(Uuid::new_v4(), SaleUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SaleNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_second_sale_insert_is_constraint_violation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;
    let sale = service
        .create_sale_from_quote(quote.id, SaleDraft::default())
        .await?;

    let mut tx = service.repository().begin().await?;
    let duplicate = Sale::from_quote(&quote, SaleDraft::default());
    let err: AppError = Repository::insert_sale(&mut *tx, &duplicate)
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    drop(tx);

    assert_eq!(service.list_sales(50, 0).await?.len(), 1);
    assert_eq!(
        service.get_sale_for_quote(quote.id).await?.map(|s| s.id),
        Some(sale.id)
    );

    Ok(())
}

#[tokio::test]
async fn test_sale_overrides_must_exist() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let crm = Crm::create(&service).await?;
    let quote = crm.quote(&service, "DEV-2026-0001").await?;

    let ghost_owner = Uuid::new_v4();
    let err = service
        .create_sale_from_quote(
            quote.id,
            SaleDraft {
                owner_id: Some(ghost_owner),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserNotFound(id) if id == ghost_owner));

    let ghost_company = Uuid::new_v4();
    let err = service
        .create_sale_from_quote(
            quote.id,
            SaleDraft {
                company_id: Some(ghost_company),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CompanyNotFound(id) if id == ghost_company));
    assert!(service.get_sale_for_quote(quote.id).await?.is_none());

    // Overrides pointing at real rows are taken as given.
    let sale = service
        .create_sale_from_quote(
            quote.id,
            SaleDraft {
                owner_id: Some(crm.owner.id),
                company_id: Some(crm.company.id),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(sale.owner_id, crm.owner.id);
    assert_eq!(sale.company_id, crm.company.id);

    Ok(())
}
