use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{CrmService, PipelineReport, SeedOptions, seed_crm_data};
use crate::domain::{
    DEFAULT_CURRENCY, LineItem, NewQuote, Product, ProductUpdate, Quote, QuoteStatus, QuoteUpdate,
    Sale, SaleDraft, SaleStatus, SaleUpdate, format_cents, format_optional_cents, parse_cents,
};

/// Devis - quote ledger for a small CRM
#[derive(Parser)]
#[command(name = "devis")]
#[command(about = "Quotes, line items and sales with totals kept consistent on every change")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "DEVIS_DATABASE", default_value = "devis.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Fill an empty database with demo data
    Seed {
        /// Number of users to create
        #[arg(long, default_value = "10")]
        users: usize,

        /// Number of companies to create
        #[arg(long, default_value = "100")]
        companies: usize,

        /// Random seed; the same seed gives the same data
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Product catalog commands
    #[command(subcommand)]
    Product(ProductCommands),

    /// Quote management commands
    #[command(subcommand)]
    Quote(QuoteCommands),

    /// Quote line commands
    #[command(subcommand)]
    Line(LineCommands),

    /// Sale management commands
    #[command(subcommand)]
    Sale(SaleCommands),

    /// Show the pipeline report
    Report {
        /// Number of top quotes to list
        #[arg(long, default_value = "10")]
        top: u32,

        /// Output format: table, json, csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Create a new product
    Create {
        /// Stock keeping unit (must be unique)
        sku: String,

        /// Product name
        name: String,

        /// Template unit price (e.g., "49.00")
        #[arg(short, long)]
        price: Option<String>,

        /// Currency code
        #[arg(short, long, default_value = DEFAULT_CURRENCY)]
        currency: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List products
    List {
        #[arg(short, long, default_value = "50")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show a product (by SKU or ID)
    Show { product: String },

    /// Update a product. Existing quote lines keep their price.
    Update {
        /// Product SKU or ID
        product: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        price: Option<String>,

        #[arg(short, long)]
        currency: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Mark the product active or inactive
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a product that no quote line references
    Delete { product: String },
}

#[derive(Subcommand)]
pub enum QuoteCommands {
    /// Create a new quote
    Create {
        /// Quote code (must be unique, e.g., "DEV-2026-0001")
        code: String,

        /// Owning user ID
        #[arg(long)]
        owner: Uuid,

        /// Company ID
        #[arg(long)]
        company: Uuid,

        #[arg(short, long)]
        title: Option<String>,

        /// Contact ID
        #[arg(long)]
        contact: Option<Uuid>,

        /// Campaign ID
        #[arg(long)]
        campaign: Option<Uuid>,

        #[arg(short, long, default_value = DEFAULT_CURRENCY)]
        currency: String,

        /// Issue date (YYYY-MM-DD)
        #[arg(long)]
        issue_date: Option<String>,

        /// Validity end date (YYYY-MM-DD)
        #[arg(long)]
        valid_until: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List quotes
    List {
        #[arg(short, long, default_value = "50")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show a quote with its lines (by code or ID)
    Show { quote: String },

    /// Change a quote's status
    Status {
        quote: String,

        /// New status: draft, sent, accepted, rejected, expired
        status: String,
    },

    /// Recompute a quote's cached total from its lines
    Recompute { quote: String },

    /// Delete a quote and its lines
    Delete { quote: String },
}

#[derive(Subcommand)]
pub enum LineCommands {
    /// Add a product to a quote, or overwrite its existing line
    Add {
        /// Quote code or ID
        quote: String,

        /// Product SKU or ID
        product: String,

        /// Quantity (positive integer)
        #[arg(short, long, default_value = "1")]
        quantity: u32,

        /// Unit price; the product's template price is used when omitted
        #[arg(short, long)]
        price: Option<String>,

        /// Currency; the quote's currency is used when omitted
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Remove a product's line from a quote
    Remove { quote: String, product: String },

    /// List a quote's lines
    List { quote: String },
}

#[derive(Subcommand)]
pub enum SaleCommands {
    /// Create the sale for a quote (returns the existing one if any)
    FromQuote {
        /// Quote code or ID
        quote: String,

        /// Status: open, won, lost, canceled
        #[arg(short, long, default_value = "open")]
        status: String,

        /// Win probability in percent
        #[arg(short, long)]
        probability: Option<u8>,

        #[arg(short, long)]
        reference: Option<String>,

        /// Expected close date (YYYY-MM-DD)
        #[arg(long)]
        expected_close: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List sales
    List {
        #[arg(short, long, default_value = "50")]
        limit: u32,

        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show a sale
    Show { id: Uuid },

    /// Update a sale
    Update {
        id: Uuid,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(short, long)]
        probability: Option<u8>,

        /// Override the amount copied from the quote
        #[arg(short, long)]
        amount: Option<String>,

        /// Expected close date (YYYY-MM-DD)
        #[arg(long)]
        expected_close: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                CrmService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Seed {
                users,
                companies,
                seed,
            } => {
                let service = CrmService::connect(&self.database).await?;
                let options = SeedOptions {
                    users,
                    companies,
                    seed,
                };
                let summary = seed_crm_data(&service, &options).await?;
                if summary.skipped {
                    println!("Database already contains users; nothing seeded.");
                } else {
                    println!(
                        "Seeded {} users, {} campaigns, {} products, {} companies ({} contacts)",
                        summary.users,
                        summary.campaigns,
                        summary.products,
                        summary.companies,
                        summary.contacts
                    );
                    println!(
                        "       {} quotes with {} lines, {} sales",
                        summary.quotes, summary.lines, summary.sales
                    );
                }
            }

            Commands::Product(product_cmd) => {
                let service = CrmService::connect(&self.database).await?;
                run_product_command(&service, product_cmd).await?;
            }

            Commands::Quote(quote_cmd) => {
                let service = CrmService::connect(&self.database).await?;
                run_quote_command(&service, quote_cmd).await?;
            }

            Commands::Line(line_cmd) => {
                let service = CrmService::connect(&self.database).await?;
                run_line_command(&service, line_cmd).await?;
            }

            Commands::Sale(sale_cmd) => {
                let service = CrmService::connect(&self.database).await?;
                run_sale_command(&service, sale_cmd).await?;
            }

            Commands::Report { top, format } => {
                let service = CrmService::connect(&self.database).await?;
                let report = service.pipeline_report(top).await?;
                print_report(&report, &format)?;
            }
        }
        Ok(())
    }
}

async fn run_product_command(service: &CrmService, cmd: ProductCommands) -> Result<()> {
    match cmd {
        ProductCommands::Create {
            sku,
            name,
            price,
            currency,
            description,
        } => {
            let price = parse_amount(price)?;
            let product = service
                .create_product(sku, name, price, &currency, description)
                .await?;
            println!(
                "Created product: {} {} ({})",
                product.sku,
                format_optional_cents(product.unit_price_cents),
                product.id
            );
        }

        ProductCommands::List { limit, offset } => {
            let products = service.list_products(limit, offset).await?;
            if products.is_empty() {
                println!("No products found.");
            } else {
                println!(
                    "{:<12} {:<30} {:>12} {:<8} {:<6}",
                    "SKU", "NAME", "PRICE", "CURRENCY", "ACTIVE"
                );
                println!("{}", "-".repeat(72));
                for product in products {
                    println!(
                        "{:<12} {:<30} {:>12} {:<8} {:<6}",
                        truncate(&product.sku, 12),
                        truncate(&product.name, 30),
                        format_optional_cents(product.unit_price_cents),
                        product.currency,
                        if product.is_active { "yes" } else { "no" }
                    );
                }
            }
        }

        ProductCommands::Show { product } => {
            let product = resolve_product(service, &product).await?;
            print_product(&product);
        }

        ProductCommands::Update {
            product,
            name,
            price,
            currency,
            description,
            active,
        } => {
            let product = resolve_product(service, &product).await?;
            let update = ProductUpdate {
                name,
                unit_price_cents: parse_amount(price)?,
                currency,
                description,
                is_active: active,
            };
            let product = service.update_product(product.id, update).await?;
            println!("Updated product: {}", product.sku);
        }

        ProductCommands::Delete { product } => {
            let product = resolve_product(service, &product).await?;
            service.delete_product(product.id).await?;
            println!("Deleted product: {}", product.sku);
        }
    }
    Ok(())
}

async fn run_quote_command(service: &CrmService, cmd: QuoteCommands) -> Result<()> {
    match cmd {
        QuoteCommands::Create {
            code,
            owner,
            company,
            title,
            contact,
            campaign,
            currency,
            issue_date,
            valid_until,
            notes,
        } => {
            let mut new_quote = NewQuote::new(code, owner, company);
            new_quote.title = title;
            new_quote.contact_id = contact;
            new_quote.campaign_id = campaign;
            new_quote.currency = currency;
            new_quote.issue_date = parse_optional_date(issue_date)?;
            new_quote.valid_until = parse_optional_date(valid_until)?;
            new_quote.notes = notes;

            let quote = service.create_quote(new_quote).await?;
            println!("Created quote: {} ({})", quote.code, quote.id);
        }

        QuoteCommands::List { limit, offset } => {
            let quotes = service.list_quotes(limit, offset).await?;
            if quotes.is_empty() {
                println!("No quotes found.");
            } else {
                println!(
                    "{:<16} {:<10} {:>12} {:<8} {:<30}",
                    "CODE", "STATUS", "TOTAL", "CURRENCY", "TITLE"
                );
                println!("{}", "-".repeat(80));
                for quote in quotes {
                    println!(
                        "{:<16} {:<10} {:>12} {:<8} {:<30}",
                        truncate(&quote.code, 16),
                        quote.status,
                        format_optional_cents(quote.total_cents),
                        quote.currency,
                        truncate(quote.title.as_deref().unwrap_or("-"), 30)
                    );
                }
            }
        }

        QuoteCommands::Show { quote } => {
            let quote = resolve_quote(service, &quote).await?;
            let lines = service.list_lines(quote.id).await?;
            print_quote(&quote);
            println!();
            print_lines(service, &lines).await?;
            if let Some(sale) = service.get_sale_for_quote(quote.id).await? {
                println!();
                println!("  Sale:           {} ({})", sale.id, sale.status);
            }
        }

        QuoteCommands::Status { quote, status } => {
            let quote = resolve_quote(service, &quote).await?;
            let status = QuoteStatus::from_str(&status).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid status '{}'. Valid: draft, sent, accepted, rejected, expired",
                    status
                )
            })?;
            let update = QuoteUpdate {
                status: Some(status),
                ..Default::default()
            };
            let quote = service.update_quote(quote.id, update).await?;
            println!("Quote {} is now {}", quote.code, quote.status);
        }

        QuoteCommands::Recompute { quote } => {
            let quote = resolve_quote(service, &quote).await?;
            let total = service.recompute_quote_total(quote.id).await?;
            println!(
                "Quote {} total: {} {}",
                quote.code,
                format_optional_cents(total),
                quote.currency
            );
        }

        QuoteCommands::Delete { quote } => {
            let quote = resolve_quote(service, &quote).await?;
            service.delete_quote(quote.id).await?;
            println!("Deleted quote: {}", quote.code);
        }
    }
    Ok(())
}

async fn run_line_command(service: &CrmService, cmd: LineCommands) -> Result<()> {
    match cmd {
        LineCommands::Add {
            quote,
            product,
            quantity,
            price,
            currency,
        } => {
            let quote = resolve_quote(service, &quote).await?;
            let product = resolve_product(service, &product).await?;
            let price = parse_amount(price)?;

            let line = service
                .upsert_line(quote.id, product.id, quantity, price, currency.as_deref())
                .await?;
            let quote = service.get_quote(quote.id).await?;
            println!(
                "Line {} x {} @ {} = {}",
                product.sku,
                line.quantity,
                format_optional_cents(line.unit_price_cents),
                format_optional_cents(line.line_total_cents)
            );
            println!(
                "Quote {} total: {} {}",
                quote.code,
                format_optional_cents(quote.total_cents),
                quote.currency
            );
        }

        LineCommands::Remove { quote, product } => {
            let quote = resolve_quote(service, &quote).await?;
            let product = resolve_product(service, &product).await?;
            if service.remove_line(quote.id, product.id).await? {
                let quote = service.get_quote(quote.id).await?;
                println!("Removed {} from {}", product.sku, quote.code);
                println!(
                    "Quote {} total: {} {}",
                    quote.code,
                    format_optional_cents(quote.total_cents),
                    quote.currency
                );
            } else {
                println!("Quote {} has no line for {}", quote.code, product.sku);
            }
        }

        LineCommands::List { quote } => {
            let quote = resolve_quote(service, &quote).await?;
            let lines = service.list_lines(quote.id).await?;
            print_lines(service, &lines).await?;
        }
    }
    Ok(())
}

async fn run_sale_command(service: &CrmService, cmd: SaleCommands) -> Result<()> {
    match cmd {
        SaleCommands::FromQuote {
            quote,
            status,
            probability,
            reference,
            expected_close,
            notes,
        } => {
            let quote = resolve_quote(service, &quote).await?;
            let draft = SaleDraft {
                contact_id: quote.contact_id,
                campaign_id: quote.campaign_id,
                reference,
                status: parse_sale_status(&status)?,
                probability,
                expected_close_date: parse_optional_date(expected_close)?,
                notes,
                ..Default::default()
            };
            let sale = service.create_sale_from_quote(quote.id, draft).await?;
            println!(
                "Sale {} for quote {}: {} {}",
                sale.id,
                quote.code,
                format_optional_cents(sale.amount_cents),
                sale.currency
            );
        }

        SaleCommands::List { limit, offset } => {
            let sales = service.list_sales(limit, offset).await?;
            if sales.is_empty() {
                println!("No sales found.");
            } else {
                println!(
                    "{:<36} {:<16} {:<9} {:>12} {:>5}",
                    "ID", "REFERENCE", "STATUS", "AMOUNT", "PROB"
                );
                println!("{}", "-".repeat(82));
                for sale in sales {
                    println!(
                        "{:<36} {:<16} {:<9} {:>12} {:>5}",
                        sale.id,
                        truncate(sale.reference.as_deref().unwrap_or("-"), 16),
                        sale.status,
                        format_optional_cents(sale.amount_cents),
                        sale.probability
                            .map(|p| format!("{}%", p))
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }

        SaleCommands::Show { id } => {
            let sale = service.get_sale(id).await?;
            print_sale(&sale);
        }

        SaleCommands::Update {
            id,
            status,
            probability,
            amount,
            expected_close,
            notes,
        } => {
            let update = SaleUpdate {
                status: status.as_deref().map(parse_sale_status).transpose()?,
                probability,
                expected_close_date: parse_optional_date(expected_close)?,
                closed_at: None,
                notes,
                amount_cents: parse_amount(amount)?,
            };
            let sale = service.update_sale(id, update).await?;
            println!("Updated sale {} ({})", sale.id, sale.status);
        }
    }
    Ok(())
}

fn print_report(report: &PipelineReport, format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["section", "key", "count", "amount"])?;
            for row in &report.quotes_by_status {
                writer.write_record([
                    "quotes",
                    row.status.as_str(),
                    row.count.to_string().as_str(),
                    format_cents(row.amount).as_str(),
                ])?;
            }
            for row in &report.sales_by_status {
                writer.write_record([
                    "sales",
                    row.status.as_str(),
                    row.count.to_string().as_str(),
                    format_cents(row.amount).as_str(),
                ])?;
            }
            for quote in &report.top_quotes {
                writer.write_record([
                    "top_quote",
                    quote.code.as_str(),
                    "1",
                    format_cents(quote.total).as_str(),
                ])?;
            }
            writer.flush()?;
        }
        _ => {
            println!("Pipeline Report");
            println!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S"));
            println!();
            println!(
                "Products: {}   Quotes: {}   Sales: {}",
                report.products, report.quotes, report.sales
            );
            println!();
            println!("{:<12} {:>8} {:>15}", "QUOTES", "COUNT", "TOTAL");
            println!("{}", "-".repeat(37));
            for row in &report.quotes_by_status {
                println!(
                    "{:<12} {:>8} {:>15}",
                    row.status,
                    row.count,
                    format_cents(row.amount)
                );
            }
            println!();
            println!("{:<12} {:>8} {:>15}", "SALES", "COUNT", "AMOUNT");
            println!("{}", "-".repeat(37));
            for row in &report.sales_by_status {
                println!(
                    "{:<12} {:>8} {:>15}",
                    row.status,
                    row.count,
                    format_cents(row.amount)
                );
            }
            println!("{:<12} {:>8} {:>15}", "WON", "", format_cents(report.won_amount()?));

            if !report.top_quotes.is_empty() {
                println!();
                println!("Top Quotes:");
                for (i, quote) in report.top_quotes.iter().enumerate() {
                    println!(
                        "  {:>2}. {:<16} {:<10} {:>12} {}",
                        i + 1,
                        truncate(&quote.code, 16),
                        quote.status,
                        format_cents(quote.total),
                        quote.currency
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_product(product: &Product) {
    println!("Product: {}", product.sku);
    println!("  ID:             {}", product.id);
    println!("  Name:           {}", product.name);
    println!(
        "  Price:          {} {}",
        format_optional_cents(product.unit_price_cents),
        product.currency
    );
    println!(
        "  Active:         {}",
        if product.is_active { "yes" } else { "no" }
    );
    if let Some(desc) = &product.description {
        println!("  Description:    {}", desc);
    }
    println!(
        "  Updated:        {}",
        product.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_quote(quote: &Quote) {
    println!("Quote: {}", quote.code);
    println!("  ID:             {}", quote.id);
    if let Some(title) = &quote.title {
        println!("  Title:          {}", title);
    }
    println!("  Status:         {}", quote.status);
    println!("  Owner:          {}", quote.owner_id);
    println!("  Company:        {}", quote.company_id);
    if let Some(date) = quote.issue_date {
        println!("  Issued:         {}", date);
    }
    if let Some(date) = quote.valid_until {
        println!("  Valid until:    {}", date);
    }
    println!(
        "  Total:          {} {}",
        format_optional_cents(quote.total_cents),
        quote.currency
    );
}

async fn print_lines(service: &CrmService, lines: &[LineItem]) -> Result<()> {
    if lines.is_empty() {
        println!("No lines.");
        return Ok(());
    }
    println!(
        "{:<12} {:>8} {:>12} {:>12} {:<8}",
        "SKU", "QTY", "UNIT", "TOTAL", "CURRENCY"
    );
    println!("{}", "-".repeat(56));
    for line in lines {
        let sku = service.get_product(line.product_id).await?.sku;
        println!(
            "{:<12} {:>8} {:>12} {:>12} {:<8}",
            truncate(&sku, 12),
            line.quantity,
            format_optional_cents(line.unit_price_cents),
            format_optional_cents(line.line_total_cents),
            line.currency
        );
    }
    Ok(())
}

fn print_sale(sale: &Sale) {
    println!("Sale: {}", sale.id);
    println!("  Quote:          {}", sale.quote_id);
    if let Some(reference) = &sale.reference {
        println!("  Reference:      {}", reference);
    }
    println!("  Status:         {}", sale.status);
    println!(
        "  Amount:         {} {}",
        format_optional_cents(sale.amount_cents),
        sale.currency
    );
    if let Some(probability) = sale.probability {
        println!("  Probability:    {}%", probability);
    }
    if let Some(date) = sale.expected_close_date {
        println!("  Expected close: {}", date);
    }
    if let Some(closed) = sale.closed_at {
        println!("  Closed:         {}", closed.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(notes) = &sale.notes {
        println!("  Notes:          {}", notes);
    }
}

/// Look a product up by ID, falling back to its SKU.
async fn resolve_product(service: &CrmService, key: &str) -> Result<Product> {
    let product = match Uuid::parse_str(key) {
        Ok(id) => service.get_product(id).await?,
        Err(_) => service.get_product_by_sku(key).await?,
    };
    Ok(product)
}

/// Look a quote up by ID, falling back to its code.
async fn resolve_quote(service: &CrmService, key: &str) -> Result<Quote> {
    let quote = match Uuid::parse_str(key) {
        Ok(id) => service.get_quote(id).await?,
        Err(_) => service.get_quote_by_code(key).await?,
    };
    Ok(quote)
}

fn parse_amount(amount: Option<String>) -> Result<Option<i64>> {
    amount
        .map(|a| parse_cents(&a))
        .transpose()
        .context("Invalid amount format. Use '49.00' or '49'")
}

fn parse_sale_status(status: &str) -> Result<SaleStatus> {
    SaleStatus::from_str(status).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid status '{}'. Valid: open, won, lost, canceled",
            status
        )
    })
}

fn parse_optional_date(date: Option<String>) -> Result<Option<NaiveDate>> {
    date.map(|d| {
        NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", d))
    })
    .transpose()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_line_add() {
        let cli = Cli::try_parse_from([
            "devis", "--database", "x.db", "line", "add", "DEV-1", "SKU-001", "-q", "3", "-p",
            "10.00",
        ])
        .unwrap();
        match cli.command {
            Commands::Line(LineCommands::Add {
                quote,
                product,
                quantity,
                price,
                currency,
            }) => {
                assert_eq!(quote, "DEV-1");
                assert_eq!(product, "SKU-001");
                assert_eq!(quantity, 3);
                assert_eq!(price.as_deref(), Some("10.00"));
                assert!(currency.is_none());
            }
            _ => panic!("expected line add"),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("Intégration API", 30), "Intégration API");
        assert_eq!(truncate("Intégration API", 8), "Intég...");
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(Some("49.90".into())).unwrap(), Some(4990));
        assert!(parse_amount(Some("4,99".into())).is_err());
        assert_eq!(parse_amount(None).unwrap(), None);
    }
}
