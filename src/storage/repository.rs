use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Campaign, Cents, Company, CompanyId, Contact, LineItem, Product, ProductId, Quote, QuoteId,
    QuoteStatus, Sale, SaleId, SaleStatus, User, UserId, quote_total,
};

use super::MIGRATION_001_INITIAL;

const QUOTE_COLUMNS: &str = "id, code, title, owner_id, company_id, contact_id, campaign_id, status, issue_date, valid_until, notes, total_cents, currency, created_at, updated_at";

const LINE_COLUMNS: &str =
    "id, quote_id, product_id, quantity, unit_price_cents, currency, line_total_cents, created_at";

const PRODUCT_COLUMNS: &str =
    "id, sku, name, description, unit_price_cents, currency, is_active, created_at, updated_at";

const SALE_COLUMNS: &str = "id, quote_id, owner_id, company_id, contact_id, campaign_id, reference, amount_cents, currency, status, probability, expected_close_date, closed_at, notes, created_at, updated_at";

/// Row counts per status, used by the pipeline report.
#[derive(Debug, Clone)]
pub struct StatusAggregate {
    pub status: String,
    pub count: i64,
    pub amount: Cents,
}

/// Repository for persisting and querying the CRM tables.
///
/// Methods on `&self` run against the pool, one statement each. The
/// associated functions taking a `&mut SqliteConnection` (or any executor)
/// are the pieces of a unit of work: the caller opens a transaction with
/// [`Repository::begin`] and passes it to each step, so a line mutation and
/// the recomputation of its quote's total commit together.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Open a transaction; every ledger operation runs inside exactly one.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    // ========================
    // Reference rows
    // ========================

    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, phone, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.is_active)
        .bind(timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save user")?;
        Ok(())
    }

    pub async fn save_company(&self, company: &Company) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (id, siren, name, employee_count, postcode, city, country, sector, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(company.id.to_string())
        .bind(&company.siren)
        .bind(&company.name)
        .bind(company.employee_count.map(i64::from))
        .bind(&company.postcode)
        .bind(&company.city)
        .bind(&company.country)
        .bind(&company.sector)
        .bind(timestamp(company.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save company")?;
        Ok(())
    }

    pub async fn save_contact(&self, contact: &Contact) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, company_id, first_name, last_name, role, email, is_primary, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contact.id.to_string())
        .bind(contact.company_id.to_string())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.role)
        .bind(&contact.email)
        .bind(contact.is_primary)
        .bind(timestamp(contact.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save contact")?;
        Ok(())
    }

    pub async fn save_campaign(&self, campaign: &Campaign) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (id, code, name, kind, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(campaign.id.to_string())
        .bind(&campaign.code)
        .bind(&campaign.name)
        .bind(&campaign.kind)
        .bind(campaign.is_active)
        .bind(timestamp(campaign.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save campaign")?;
        Ok(())
    }

    pub async fn user_exists(&self, id: UserId) -> Result<bool> {
        self.row_exists("SELECT 1 FROM users WHERE id = ?", id).await
    }

    pub async fn company_exists(&self, id: CompanyId) -> Result<bool> {
        self.row_exists("SELECT 1 FROM companies WHERE id = ?", id).await
    }

    async fn row_exists(&self, query: &str, id: Uuid) -> Result<bool> {
        let row = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check row existence")?;
        Ok(row.is_some())
    }

    /// Count rows of one of the known tables.
    pub async fn count_rows(&self, table: CountedTable) -> Result<i64> {
        let query = format!("SELECT COUNT(*) AS count FROM {}", table.as_str());
        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {}", table.as_str()))?;
        Ok(row.get("count"))
    }

    // ========================
    // Product operations
    // ========================

    pub async fn save_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, description, unit_price_cents, currency, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.id.to_string())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(&product.currency)
        .bind(product.is_active)
        .bind(timestamp(product.created_at))
        .bind(timestamp(product.updated_at))
        .execute(&self.pool)
        .await
        .context("Failed to save product")?;
        Ok(())
    }

    pub async fn update_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, description = ?, unit_price_cents = ?, currency = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(&product.currency)
        .bind(product.is_active)
        .bind(timestamp(product.updated_at))
        .bind(product.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update product")?;
        Ok(())
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Self::fetch_product(&self.pool, id).await
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?");
        let row = sqlx::query(&query)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch product by SKU")?;
        row.as_ref().map(Self::row_to_product).transpose()
    }

    /// List products, newest first.
    pub async fn list_products(&self, limit: u32, offset: u32) -> Result<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list products")?;
        rows.iter().map(Self::row_to_product).collect()
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn fetch_product<'e, E>(executor: E, id: ProductId) -> Result<Option<Product>>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .context("Failed to fetch product")?;
        row.as_ref().map(Self::row_to_product).transpose()
    }

    fn row_to_product(row: &SqliteRow) -> Result<Product> {
        Ok(Product {
            id: parse_id(row, "id")?,
            sku: row.get("sku"),
            name: row.get("name"),
            description: row.get("description"),
            unit_price_cents: row.get("unit_price_cents"),
            currency: row.get("currency"),
            is_active: row.get::<i32, _>("is_active") != 0,
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        })
    }

    // ========================
    // Quote operations
    // ========================

    pub async fn save_quote(&self, quote: &Quote) -> Result<()> {
        let query = format!(
            "INSERT INTO quotes ({QUOTE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&query)
            .bind(quote.id.to_string())
            .bind(&quote.code)
            .bind(&quote.title)
            .bind(quote.owner_id.to_string())
            .bind(quote.company_id.to_string())
            .bind(quote.contact_id.map(|id| id.to_string()))
            .bind(quote.campaign_id.map(|id| id.to_string()))
            .bind(quote.status.as_str())
            .bind(quote.issue_date.map(date))
            .bind(quote.valid_until.map(date))
            .bind(&quote.notes)
            .bind(quote.total_cents)
            .bind(&quote.currency)
            .bind(timestamp(quote.created_at))
            .bind(timestamp(quote.updated_at))
            .execute(&self.pool)
            .await
            .context("Failed to save quote")?;
        Ok(())
    }

    /// Persist the editable fields of a quote. The cached total is owned by
    /// [`Repository::recompute_quote_total`] and never written here.
    pub async fn update_quote_details(&self, quote: &Quote) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quotes
            SET title = ?, status = ?, notes = ?, issue_date = ?, valid_until = ?,
                contact_id = ?, campaign_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&quote.title)
        .bind(quote.status.as_str())
        .bind(&quote.notes)
        .bind(quote.issue_date.map(date))
        .bind(quote.valid_until.map(date))
        .bind(quote.contact_id.map(|id| id.to_string()))
        .bind(quote.campaign_id.map(|id| id.to_string()))
        .bind(timestamp(quote.updated_at))
        .bind(quote.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update quote")?;
        Ok(())
    }

    pub async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>> {
        Self::fetch_quote(&self.pool, id).await
    }

    pub async fn get_quote_by_code(&self, code: &str) -> Result<Option<Quote>> {
        let query = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE code = ?");
        let row = sqlx::query(&query)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch quote by code")?;
        row.as_ref().map(Self::row_to_quote).transpose()
    }

    /// List quotes, newest first.
    pub async fn list_quotes(&self, limit: u32, offset: u32) -> Result<Vec<Quote>> {
        let query = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY created_at DESC, id LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list quotes")?;
        rows.iter().map(Self::row_to_quote).collect()
    }

    /// The highest priced quotes; quotes without a total are left out.
    pub async fn top_quotes_by_total(&self, limit: u32) -> Result<Vec<Quote>> {
        let query = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes WHERE total_cents IS NOT NULL ORDER BY total_cents DESC, code LIMIT ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list top quotes")?;
        rows.iter().map(Self::row_to_quote).collect()
    }

    /// Delete a quote; its lines go with it.
    pub async fn delete_quote(&self, id: QuoteId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete quote")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn quote_status_counts(&self) -> Result<Vec<StatusAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(total_cents), 0) AS amount
            FROM quotes
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate quotes by status")?;
        Ok(rows.iter().map(row_to_aggregate).collect())
    }

    pub async fn fetch_quote<'e, E>(executor: E, id: QuoteId) -> Result<Option<Quote>>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .context("Failed to fetch quote")?;
        row.as_ref().map(Self::row_to_quote).transpose()
    }

    /// Re-sum every line of the quote and store the result as its cached
    /// total: the sum of the priced lines, or NULL when none is priced.
    /// Always a full pass, so totals patched out of band are repaired too.
    pub async fn recompute_quote_total(
        conn: &mut SqliteConnection,
        quote_id: QuoteId,
    ) -> Result<Option<Cents>> {
        let lines = Self::fetch_lines(&mut *conn, quote_id).await?;
        let total = quote_total(&lines).context("Failed to total quote lines")?;

        sqlx::query("UPDATE quotes SET total_cents = ?, updated_at = ? WHERE id = ?")
            .bind(total)
            .bind(timestamp(Utc::now()))
            .bind(quote_id.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to store quote total")?;

        debug!(quote_id = %quote_id, lines = lines.len(), total = ?total, "recomputed quote total");
        Ok(total)
    }

    fn row_to_quote(row: &SqliteRow) -> Result<Quote> {
        let status_str: String = row.get("status");

        Ok(Quote {
            id: parse_id(row, "id")?,
            code: row.get("code"),
            title: row.get("title"),
            owner_id: parse_id(row, "owner_id")?,
            company_id: parse_id(row, "company_id")?,
            contact_id: parse_optional_id(row, "contact_id")?,
            campaign_id: parse_optional_id(row, "campaign_id")?,
            status: QuoteStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid quote status: {}", status_str))?,
            issue_date: parse_optional_date(row, "issue_date")?,
            valid_until: parse_optional_date(row, "valid_until")?,
            notes: row.get("notes"),
            total_cents: row.get("total_cents"),
            currency: row.get("currency"),
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        })
    }

    // ========================
    // Line operations
    // ========================

    pub async fn list_lines(&self, quote_id: QuoteId) -> Result<Vec<LineItem>> {
        Self::fetch_lines(&self.pool, quote_id).await
    }

    pub async fn fetch_lines<'e, E>(executor: E, quote_id: QuoteId) -> Result<Vec<LineItem>>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!(
            "SELECT {LINE_COLUMNS} FROM quote_lines WHERE quote_id = ? ORDER BY created_at, id"
        );
        let rows = sqlx::query(&query)
            .bind(quote_id.to_string())
            .fetch_all(executor)
            .await
            .context("Failed to list quote lines")?;
        rows.iter().map(Self::row_to_line).collect()
    }

    /// Look a line up by its (quote, product) key.
    pub async fn find_line<'e, E>(
        executor: E,
        quote_id: QuoteId,
        product_id: ProductId,
    ) -> Result<Option<LineItem>>
    where
        E: SqliteExecutor<'e>,
    {
        let query =
            format!("SELECT {LINE_COLUMNS} FROM quote_lines WHERE quote_id = ? AND product_id = ?");
        let row = sqlx::query(&query)
            .bind(quote_id.to_string())
            .bind(product_id.to_string())
            .fetch_optional(executor)
            .await
            .context("Failed to fetch quote line")?;
        row.as_ref().map(Self::row_to_line).transpose()
    }

    pub async fn insert_line(conn: &mut SqliteConnection, line: &LineItem) -> Result<()> {
        let query = format!("INSERT INTO quote_lines ({LINE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)");
        sqlx::query(&query)
            .bind(line.id.to_string())
            .bind(line.quote_id.to_string())
            .bind(line.product_id.to_string())
            .bind(i64::from(line.quantity))
            .bind(line.unit_price_cents)
            .bind(&line.currency)
            .bind(line.line_total_cents)
            .bind(timestamp(line.created_at))
            .execute(&mut *conn)
            .await
            .context("Failed to insert quote line")?;
        Ok(())
    }

    pub async fn update_line(conn: &mut SqliteConnection, line: &LineItem) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE quote_lines
            SET quantity = ?, unit_price_cents = ?, currency = ?, line_total_cents = ?
            WHERE id = ?
            "#,
        )
        .bind(i64::from(line.quantity))
        .bind(line.unit_price_cents)
        .bind(&line.currency)
        .bind(line.line_total_cents)
        .bind(line.id.to_string())
        .execute(&mut *conn)
        .await
        .context("Failed to update quote line")?;
        Ok(())
    }

    pub async fn delete_line(conn: &mut SqliteConnection, line: &LineItem) -> Result<()> {
        sqlx::query("DELETE FROM quote_lines WHERE id = ?")
            .bind(line.id.to_string())
            .execute(&mut *conn)
            .await
            .context("Failed to delete quote line")?;
        Ok(())
    }

    fn row_to_line(row: &SqliteRow) -> Result<LineItem> {
        let quantity: i64 = row.get("quantity");

        Ok(LineItem {
            id: parse_id(row, "id")?,
            quote_id: parse_id(row, "quote_id")?,
            product_id: parse_id(row, "product_id")?,
            quantity: u32::try_from(quantity)
                .with_context(|| format!("Invalid line quantity: {}", quantity))?,
            unit_price_cents: row.get("unit_price_cents"),
            currency: row.get("currency"),
            line_total_cents: row.get("line_total_cents"),
            created_at: parse_timestamp(row, "created_at")?,
        })
    }

    // ========================
    // Sale operations
    // ========================

    pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> Result<()> {
        let query = format!(
            "INSERT INTO sales ({SALE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&query)
            .bind(sale.id.to_string())
            .bind(sale.quote_id.to_string())
            .bind(sale.owner_id.to_string())
            .bind(sale.company_id.to_string())
            .bind(sale.contact_id.map(|id| id.to_string()))
            .bind(sale.campaign_id.map(|id| id.to_string()))
            .bind(&sale.reference)
            .bind(sale.amount_cents)
            .bind(&sale.currency)
            .bind(sale.status.as_str())
            .bind(sale.probability.map(i64::from))
            .bind(sale.expected_close_date.map(date))
            .bind(sale.closed_at.map(timestamp))
            .bind(&sale.notes)
            .bind(timestamp(sale.created_at))
            .bind(timestamp(sale.updated_at))
            .execute(&mut *conn)
            .await
            .context("Failed to insert sale")?;
        Ok(())
    }

    pub async fn update_sale(&self, sale: &Sale) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sales
            SET status = ?, probability = ?, expected_close_date = ?, closed_at = ?,
                notes = ?, amount_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(sale.status.as_str())
        .bind(sale.probability.map(i64::from))
        .bind(sale.expected_close_date.map(date))
        .bind(sale.closed_at.map(timestamp))
        .bind(&sale.notes)
        .bind(sale.amount_cents)
        .bind(timestamp(sale.updated_at))
        .bind(sale.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update sale")?;
        Ok(())
    }

    pub async fn get_sale(&self, id: SaleId) -> Result<Option<Sale>> {
        let query = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch sale")?;
        row.as_ref().map(Self::row_to_sale).transpose()
    }

    pub async fn get_sale_for_quote(&self, quote_id: QuoteId) -> Result<Option<Sale>> {
        Self::fetch_sale_for_quote(&self.pool, quote_id).await
    }

    /// Look the sale up by its unique quote reference.
    pub async fn fetch_sale_for_quote<'e, E>(executor: E, quote_id: QuoteId) -> Result<Option<Sale>>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {SALE_COLUMNS} FROM sales WHERE quote_id = ?");
        let row = sqlx::query(&query)
            .bind(quote_id.to_string())
            .fetch_optional(executor)
            .await
            .context("Failed to fetch sale for quote")?;
        row.as_ref().map(Self::row_to_sale).transpose()
    }

    /// List sales, newest first.
    pub async fn list_sales(&self, limit: u32, offset: u32) -> Result<Vec<Sale>> {
        let query = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC, id LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&query)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list sales")?;
        rows.iter().map(Self::row_to_sale).collect()
    }

    pub async fn delete_sale(&self, id: SaleId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete sale")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn sale_status_totals(&self) -> Result<Vec<StatusAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(amount_cents), 0) AS amount
            FROM sales
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to aggregate sales by status")?;
        Ok(rows.iter().map(row_to_aggregate).collect())
    }

    fn row_to_sale(row: &SqliteRow) -> Result<Sale> {
        let status_str: String = row.get("status");
        let probability: Option<i64> = row.get("probability");
        let closed_at: Option<String> = row.get("closed_at");

        Ok(Sale {
            id: parse_id(row, "id")?,
            quote_id: parse_id(row, "quote_id")?,
            owner_id: parse_id(row, "owner_id")?,
            company_id: parse_id(row, "company_id")?,
            contact_id: parse_optional_id(row, "contact_id")?,
            campaign_id: parse_optional_id(row, "campaign_id")?,
            reference: row.get("reference"),
            amount_cents: row.get("amount_cents"),
            currency: row.get("currency"),
            status: SaleStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid sale status: {}", status_str))?,
            probability: probability
                .map(u8::try_from)
                .transpose()
                .context("Invalid probability")?,
            expected_close_date: parse_optional_date(row, "expected_close_date")?,
            closed_at: closed_at
                .map(|s| DateTime::parse_from_rfc3339(&s))
                .transpose()
                .context("Invalid closed_at timestamp")?
                .map(|dt| dt.with_timezone(&Utc)),
            notes: row.get("notes"),
            created_at: parse_timestamp(row, "created_at")?,
            updated_at: parse_timestamp(row, "updated_at")?,
        })
    }
}

/// Tables [`Repository::count_rows`] knows how to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedTable {
    Users,
    Products,
    Quotes,
    Sales,
}

impl CountedTable {
    fn as_str(&self) -> &'static str {
        match self {
            CountedTable::Users => "users",
            CountedTable::Products => "products",
            CountedTable::Quotes => "quotes",
            CountedTable::Sales => "sales",
        }
    }
}

fn row_to_aggregate(row: &SqliteRow) -> StatusAggregate {
    StatusAggregate {
        status: row.get("status"),
        count: row.get("count"),
        amount: row.get("amount"),
    }
}

// Fixed-width UTC timestamps so that ORDER BY on the text columns is chronological.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn parse_id(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let value: String = row.get(column);
    Uuid::parse_str(&value).with_context(|| format!("Invalid {}: {}", column, value))
}

fn parse_optional_id(row: &SqliteRow, column: &str) -> Result<Option<Uuid>> {
    let value: Option<String> = row.get(column);
    value
        .map(|s| Uuid::parse_str(&s))
        .transpose()
        .with_context(|| format!("Invalid {}", column))
}

fn parse_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let value: String = row.get(column);
    Ok(DateTime::parse_from_rfc3339(&value)
        .with_context(|| format!("Invalid {} timestamp", column))?
        .with_timezone(&Utc))
}

fn parse_optional_date(row: &SqliteRow, column: &str) -> Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(column);
    value
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
        .transpose()
        .with_context(|| format!("Invalid {} date", column))
}
