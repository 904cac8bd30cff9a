// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use devis::application::CrmService;
use devis::domain::{Cents, Company, NewQuote, Product, Quote, User};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(CrmService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = CrmService::init(db_path(&temp_dir).to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}

/// A second pool on the test database, for edits made behind the service's back.
pub async fn raw_pool(temp_dir: &TempDir) -> Result<SqlitePool> {
    let url = format!("sqlite:{}", db_path(temp_dir).display());
    Ok(SqlitePool::connect(&url).await?)
}

/// Test fixture: one owner and one company to hang quotes on
pub struct Crm {
    pub owner: User,
    pub company: Company,
}

impl Crm {
    pub async fn create(service: &CrmService) -> Result<Self> {
        let owner = service
            .add_user(User::new("owner@crm.local".into(), "Owner".into()))
            .await?;
        let company = service
            .add_company(Company::new("123456789".into(), "Acme".into()))
            .await?;
        Ok(Self { owner, company })
    }

    pub async fn quote(&self, service: &CrmService, code: &str) -> Result<Quote> {
        Ok(service
            .create_quote(NewQuote::new(code, self.owner.id, self.company.id))
            .await?)
    }
}

pub async fn product(service: &CrmService, sku: &str, price: Option<Cents>) -> Result<Product> {
    Ok(service
        .create_product(sku.into(), format!("Product {sku}"), price, "EUR", None)
        .await?)
}

pub async fn total_of(service: &CrmService, quote: &Quote) -> Result<Option<Cents>> {
    Ok(service.get_quote(quote.id).await?.total_cents)
}
