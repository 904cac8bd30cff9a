use anyhow::Context;
use tracing::{debug, info};

use crate::domain::{
    Campaign, Cents, Company, Contact, LineItem, NewQuote, Product, ProductId, ProductUpdate,
    Quote, QuoteId, QuoteUpdate, Sale, SaleDraft, SaleId, SaleUpdate, User, is_valid_probability,
    is_valid_siren, normalize_currency,
};
use crate::storage::Repository;

use super::AppError;

/// Application service over the CRM store.
/// This is the primary interface for any client (CLI, seeder, HTTP layer...).
///
/// The quote ledger operations (`upsert_line`, `remove_line`,
/// `recompute_quote_total`, `create_sale_from_quote`) each run in a single
/// transaction, so no reader ever sees a line change without the matching
/// quote total.
pub struct CrmService {
    repo: Repository,
}

impl CrmService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Reference rows
    // ========================

    pub async fn add_user(&self, user: User) -> Result<User, AppError> {
        self.repo.save_user(&user).await?;
        Ok(user)
    }

    pub async fn add_company(&self, company: Company) -> Result<Company, AppError> {
        if !is_valid_siren(&company.siren) {
            return Err(AppError::InvalidSiren(company.siren));
        }
        self.repo.save_company(&company).await?;
        Ok(company)
    }

    pub async fn add_contact(&self, contact: Contact) -> Result<Contact, AppError> {
        if !self.repo.company_exists(contact.company_id).await? {
            return Err(AppError::CompanyNotFound(contact.company_id));
        }
        self.repo.save_contact(&contact).await?;
        Ok(contact)
    }

    pub async fn add_campaign(&self, campaign: Campaign) -> Result<Campaign, AppError> {
        self.repo.save_campaign(&campaign).await?;
        Ok(campaign)
    }

    // ========================
    // Product operations
    // ========================

    /// Create a new product. The price, when given, is the template copied
    /// onto lines that do not name their own.
    pub async fn create_product(
        &self,
        sku: String,
        name: String,
        unit_price_cents: Option<Cents>,
        currency: &str,
        description: Option<String>,
    ) -> Result<Product, AppError> {
        if self.repo.get_product_by_sku(&sku).await?.is_some() {
            return Err(AppError::ProductAlreadyExists(sku));
        }
        let currency = currency_code(currency)?;

        let mut product = Product::new(sku, name).with_currency(currency);
        if let Some(price) = unit_price_cents {
            product = product.with_price(price);
        }
        if let Some(desc) = description {
            product = product.with_description(desc);
        }

        self.repo.save_product(&product).await?;
        info!(product_id = %product.id, sku = %product.sku, "created product");
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, AppError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::product_not_found(id))
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Product, AppError> {
        self.repo
            .get_product_by_sku(sku)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(sku.to_string()))
    }

    pub async fn list_products(&self, limit: u32, offset: u32) -> Result<Vec<Product>, AppError> {
        Ok(self.repo.list_products(limit, offset).await?)
    }

    /// Update a product. Lines already on quotes keep the price they captured.
    pub async fn update_product(
        &self,
        id: ProductId,
        mut update: ProductUpdate,
    ) -> Result<Product, AppError> {
        let mut product = self.get_product(id).await?;
        if let Some(currency) = update.currency.take() {
            update.currency = Some(currency_code(&currency)?);
        }
        update.apply(&mut product);
        self.repo.update_product(&product).await?;
        Ok(product)
    }

    /// Delete a product. Fails with a constraint violation while any quote
    /// line still references it.
    pub async fn delete_product(&self, id: ProductId) -> Result<bool, AppError> {
        Ok(self.repo.delete_product(id).await?)
    }

    // ========================
    // Quote operations
    // ========================

    pub async fn create_quote(&self, new_quote: NewQuote) -> Result<Quote, AppError> {
        if self.repo.get_quote_by_code(&new_quote.code).await?.is_some() {
            return Err(AppError::QuoteAlreadyExists(new_quote.code));
        }
        if !self.repo.user_exists(new_quote.owner_id).await? {
            return Err(AppError::UserNotFound(new_quote.owner_id));
        }
        if !self.repo.company_exists(new_quote.company_id).await? {
            return Err(AppError::CompanyNotFound(new_quote.company_id));
        }

        let mut quote = new_quote.into_quote();
        quote.currency = currency_code(&quote.currency)?;

        self.repo.save_quote(&quote).await?;
        info!(quote_id = %quote.id, code = %quote.code, "created quote");
        Ok(quote)
    }

    pub async fn get_quote(&self, id: QuoteId) -> Result<Quote, AppError> {
        self.repo
            .get_quote(id)
            .await?
            .ok_or_else(|| AppError::quote_not_found(id))
    }

    pub async fn get_quote_by_code(&self, code: &str) -> Result<Quote, AppError> {
        self.repo
            .get_quote_by_code(code)
            .await?
            .ok_or_else(|| AppError::QuoteNotFound(code.to_string()))
    }

    pub async fn list_quotes(&self, limit: u32, offset: u32) -> Result<Vec<Quote>, AppError> {
        Ok(self.repo.list_quotes(limit, offset).await?)
    }

    /// Update the editable fields of a quote. The cached total is not one of
    /// them.
    pub async fn update_quote(&self, id: QuoteId, update: QuoteUpdate) -> Result<Quote, AppError> {
        let mut quote = self.get_quote(id).await?;
        update.apply(&mut quote);
        self.repo.update_quote_details(&quote).await?;
        Ok(quote)
    }

    /// Delete a quote and its lines. Fails with a constraint violation when a
    /// sale was derived from it.
    pub async fn delete_quote(&self, id: QuoteId) -> Result<bool, AppError> {
        let deleted = self.repo.delete_quote(id).await?;
        if deleted {
            info!(quote_id = %id, "deleted quote");
        }
        Ok(deleted)
    }

    // ========================
    // Quote ledger
    // ========================

    /// Add a product to a quote, or overwrite the existing line for that
    /// product. Without an explicit price the product's current template price
    /// is captured; without either the line stays unpriced. The quote total is
    /// recomputed before the transaction commits.
    pub async fn upsert_line(
        &self,
        quote_id: QuoteId,
        product_id: ProductId,
        quantity: u32,
        unit_price_cents: Option<Cents>,
        currency: Option<&str>,
    ) -> Result<LineItem, AppError> {
        if quantity == 0 {
            return Err(AppError::InvalidQuantity(quantity));
        }

        let mut tx = self.repo.begin().await?;

        let quote = Repository::fetch_quote(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::quote_not_found(quote_id))?;
        let product = Repository::fetch_product(&mut *tx, product_id)
            .await?
            .ok_or_else(|| AppError::product_not_found(product_id))?;

        let currency = match currency {
            Some(code) => currency_code(code)?,
            None => quote.currency.clone(),
        };
        let unit_price_cents = unit_price_cents.or(product.unit_price_cents);

        let line = match Repository::find_line(&mut *tx, quote_id, product_id).await? {
            Some(mut line) => {
                line.reprice(quantity, unit_price_cents, currency)?;
                Repository::update_line(&mut *tx, &line).await?;
                line
            }
            None => {
                let line =
                    LineItem::new(quote_id, product_id, quantity, unit_price_cents, currency)?;
                Repository::insert_line(&mut *tx, &line).await?;
                line
            }
        };

        let total = Repository::recompute_quote_total(&mut *tx, quote_id).await?;
        tx.commit().await.context("Failed to commit line upsert")?;

        info!(
            quote_id = %quote_id,
            product_id = %product_id,
            quantity,
            line_total = ?line.line_total_cents,
            quote_total = ?total,
            "upserted quote line"
        );
        Ok(line)
    }

    /// Remove the line for `product_id` from the quote. Returns `false`, and
    /// changes nothing, when there is no such line.
    pub async fn remove_line(
        &self,
        quote_id: QuoteId,
        product_id: ProductId,
    ) -> Result<bool, AppError> {
        let mut tx = self.repo.begin().await?;

        let Some(line) = Repository::find_line(&mut *tx, quote_id, product_id).await? else {
            debug!(quote_id = %quote_id, product_id = %product_id, "no line to remove");
            return Ok(false);
        };

        Repository::delete_line(&mut *tx, &line).await?;
        let total = Repository::recompute_quote_total(&mut *tx, quote_id).await?;
        tx.commit().await.context("Failed to commit line removal")?;

        info!(
            quote_id = %quote_id,
            product_id = %product_id,
            quote_total = ?total,
            "removed quote line"
        );
        Ok(true)
    }

    /// Re-sum the quote's lines into its cached total and return the new
    /// value. Line mutations already do this; calling it directly repairs a
    /// total after the lines were edited outside the service.
    pub async fn recompute_quote_total(&self, quote_id: QuoteId) -> Result<Option<Cents>, AppError> {
        let mut tx = self.repo.begin().await?;

        if Repository::fetch_quote(&mut *tx, quote_id).await?.is_none() {
            return Err(AppError::quote_not_found(quote_id));
        }

        let total = Repository::recompute_quote_total(&mut *tx, quote_id).await?;
        tx.commit().await.context("Failed to commit quote total")?;
        Ok(total)
    }

    pub async fn list_lines(&self, quote_id: QuoteId) -> Result<Vec<LineItem>, AppError> {
        self.get_quote(quote_id).await?;
        Ok(self.repo.list_lines(quote_id).await?)
    }

    /// Derive the sale for a quote. A quote has at most one sale: if it
    /// already exists it is returned unchanged. A new sale takes its amount
    /// and currency from the quote's cached total as it is now; later changes
    /// to the quote do not flow into it.
    pub async fn create_sale_from_quote(
        &self,
        quote_id: QuoteId,
        draft: SaleDraft,
    ) -> Result<Sale, AppError> {
        if let Some(probability) = draft.probability {
            if !is_valid_probability(probability) {
                return Err(AppError::InvalidProbability(probability));
            }
        }
        if let Some(owner_id) = draft.owner_id {
            if !self.repo.user_exists(owner_id).await? {
                return Err(AppError::UserNotFound(owner_id));
            }
        }
        if let Some(company_id) = draft.company_id {
            if !self.repo.company_exists(company_id).await? {
                return Err(AppError::CompanyNotFound(company_id));
            }
        }

        let mut tx = self.repo.begin().await?;

        let quote = Repository::fetch_quote(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::quote_not_found(quote_id))?;

        if let Some(existing) = Repository::fetch_sale_for_quote(&mut *tx, quote_id).await? {
            debug!(quote_id = %quote_id, sale_id = %existing.id, "quote already has a sale");
            return Ok(existing);
        }

        let sale = Sale::from_quote(&quote, draft);
        Repository::insert_sale(&mut *tx, &sale).await?;
        tx.commit().await.context("Failed to commit sale")?;

        info!(
            quote_id = %quote_id,
            sale_id = %sale.id,
            amount = ?sale.amount_cents,
            "created sale from quote"
        );
        Ok(sale)
    }

    // ========================
    // Sale operations
    // ========================

    pub async fn get_sale(&self, id: SaleId) -> Result<Sale, AppError> {
        self.repo
            .get_sale(id)
            .await?
            .ok_or_else(|| AppError::sale_not_found(id))
    }

    pub async fn get_sale_for_quote(&self, quote_id: QuoteId) -> Result<Option<Sale>, AppError> {
        Ok(self.repo.get_sale_for_quote(quote_id).await?)
    }

    pub async fn list_sales(&self, limit: u32, offset: u32) -> Result<Vec<Sale>, AppError> {
        Ok(self.repo.list_sales(limit, offset).await?)
    }

    pub async fn update_sale(&self, id: SaleId, update: SaleUpdate) -> Result<Sale, AppError> {
        if let Some(probability) = update.probability {
            if !is_valid_probability(probability) {
                return Err(AppError::InvalidProbability(probability));
            }
        }

        let mut sale = self.get_sale(id).await?;
        update.apply(&mut sale);
        self.repo.update_sale(&sale).await?;
        info!(sale_id = %id, status = %sale.status, "updated sale");
        Ok(sale)
    }

    pub async fn delete_sale(&self, id: SaleId) -> Result<bool, AppError> {
        Ok(self.repo.delete_sale(id).await?)
    }
}

fn currency_code(code: &str) -> Result<String, AppError> {
    normalize_currency(code).ok_or_else(|| AppError::InvalidCurrency(code.to_string()))
}
