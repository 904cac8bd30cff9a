//! Demo data for a fresh database.
//!
//! Everything goes through [`CrmService`], so seeded quotes get their lines
//! and totals the same way a client would create them. The generator is
//! seeded: the same options always produce the same shape of data.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::domain::{
    Campaign, Company, CompanyId, Contact, DEFAULT_CURRENCY, NewQuote, Product, QuoteStatus,
    SaleDraft, SaleStatus, User,
};
use crate::storage::CountedTable;

use super::{AppError, CrmService};

const CAMPAIGN_COUNT: usize = 6;
const CAMPAIGN_KINDS: [&str; 5] = ["email", "call", "linkedin", "webinar", "ads"];

const PRODUCT_NAMES: [&str; 6] = [
    "Licence CRM - Basic",
    "Licence CRM - Pro",
    "Module Reporting",
    "Module Automatisation",
    "Intégration API",
    "Support Premium",
];
const PRODUCT_PRICES: [i64; 5] = [4_900, 9_900, 19_900, 29_900, 49_900];

const SECTORS: [&str; 7] = [
    "Retail",
    "Services",
    "Finance",
    "Industrie",
    "Tech",
    "Santé",
    "Éducation",
];
const CITIES: [&str; 7] = [
    "Paris",
    "Lyon",
    "Marseille",
    "Nantes",
    "Lille",
    "Bordeaux",
    "Toulouse",
];

const LAST_NAMES: [&str; 8] = [
    "Martin", "Bernard", "Thomas", "Petit", "Robert", "Richard", "Durand", "Dubois",
];
const FIRST_NAMES: [&str; 8] = [
    "Alice", "Bob", "Chloé", "David", "Emma", "Fares", "Inès", "Jules",
];
const ROLES: [&str; 6] = [
    "CEO",
    "DAF",
    "DSI",
    "Directeur Achats",
    "Directeur Commercial",
    "RH",
];

const QUOTE_STATUSES: [QuoteStatus; 4] = [
    QuoteStatus::Draft,
    QuoteStatus::Sent,
    QuoteStatus::Accepted,
    QuoteStatus::Rejected,
];
const SALE_STATUSES: [SaleStatus; 2] = [SaleStatus::Open, SaleStatus::Won];
const SALE_PROBABILITIES: [u8; 4] = [30, 50, 70, 90];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub users: usize,
    pub companies: usize,
    pub seed: u64,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            users: 10,
            companies: 100,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Set when the database already had users and nothing was written.
    pub skipped: bool,
    pub users: usize,
    pub campaigns: usize,
    pub products: usize,
    pub companies: usize,
    pub contacts: usize,
    pub quotes: usize,
    pub lines: usize,
    pub sales: usize,
}

/// Fill an empty database with users, campaigns, products, companies and
/// their contacts, then quotes with lines and the sales of accepted quotes.
pub async fn seed_crm_data(
    service: &CrmService,
    options: &SeedOptions,
) -> Result<SeedSummary, AppError> {
    if service.repository().count_rows(CountedTable::Users).await? > 0 {
        info!("database already has users, skipping seed");
        return Ok(SeedSummary {
            skipped: true,
            ..Default::default()
        });
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut summary = SeedSummary::default();
    let today = Utc::now().date_naive();

    let mut users = Vec::with_capacity(options.users);
    for i in 1..=options.users {
        let mut user = User::new(format!("user{i}@crm.local"), format!("User {i}"));
        user.phone = Some(random_phone(&mut rng));
        users.push(service.add_user(user).await?);
    }
    summary.users = users.len();

    let mut campaigns = Vec::with_capacity(CAMPAIGN_COUNT);
    for i in 1..=CAMPAIGN_COUNT {
        let campaign = Campaign::new(
            format!("CAMP-2026-{i:03}"),
            format!("Campagne {i}"),
            pick(&mut rng, &CAMPAIGN_KINDS).to_string(),
        );
        campaigns.push(service.add_campaign(campaign).await?);
    }
    summary.campaigns = campaigns.len();

    let mut products: Vec<Product> = Vec::with_capacity(PRODUCT_NAMES.len());
    for (i, name) in PRODUCT_NAMES.iter().enumerate() {
        let product = service
            .create_product(
                format!("SKU-{:03}", i + 1),
                name.to_string(),
                Some(*pick(&mut rng, &PRODUCT_PRICES)),
                DEFAULT_CURRENCY,
                Some(format!("Produit: {name}")),
            )
            .await?;
        products.push(product);
    }
    summary.products = products.len();

    let mut sirens = HashSet::new();
    let mut companies = Vec::with_capacity(options.companies);
    let mut contacts_by_company: HashMap<CompanyId, Vec<Contact>> = HashMap::new();
    for i in 1..=options.companies {
        let mut company = Company::new(
            unique_siren(&mut rng, &mut sirens),
            format!("Entreprise {i} {:06X}", rng.gen_range(0..0x100_0000u32)),
        );
        company.employee_count = Some(rng.gen_range(1..=5000));
        company.postcode = Some(format!("{:05}", rng.gen_range(1000..=95999)));
        company.city = Some(pick(&mut rng, &CITIES).to_string());
        company.country = Some("France".to_string());
        company.sector = Some(pick(&mut rng, &SECTORS).to_string());
        let company = service.add_company(company).await?;

        let domain = company.name.replace(' ', "").to_lowercase();
        let mut contacts = Vec::new();
        for j in 0..rng.gen_range(1..=3) {
            let mut contact = Contact::new(company.id, pick(&mut rng, &LAST_NAMES).to_string());
            contact.first_name = Some(pick(&mut rng, &FIRST_NAMES).to_string());
            contact.role = Some(pick(&mut rng, &ROLES).to_string());
            contact.email = Some(format!("{:08x}@{domain}.local", rng.gen_range(0..u32::MAX)));
            contact.is_primary = j == 0;
            contacts.push(service.add_contact(contact).await?);
        }
        summary.contacts += contacts.len();
        contacts_by_company.insert(company.id, contacts);
        companies.push(company);
    }
    summary.companies = companies.len();

    // One quote for every other company.
    for (idx, company) in companies.iter().enumerate().step_by(2) {
        let Some(owner) = users.choose(&mut rng) else {
            break;
        };
        let contact = contacts_by_company
            .get(&company.id)
            .and_then(|contacts| contacts.choose(&mut rng));
        let campaign = if rng.gen_bool(0.7) {
            campaigns.choose(&mut rng)
        } else {
            None
        };

        let code = format!("DEV-2026-{:04}", idx + 1);
        let mut new_quote = NewQuote::new(code, owner.id, company.id);
        new_quote.contact_id = contact.map(|c| c.id);
        new_quote.campaign_id = campaign.map(|c| c.id);
        new_quote.title = Some(format!("Devis - {}", company.name));
        new_quote.status = *pick(&mut rng, &QUOTE_STATUSES);
        new_quote.issue_date = Some(today - Duration::days(rng.gen_range(0..=60)));
        new_quote.valid_until = Some(today + Duration::days(rng.gen_range(10..=90)));
        new_quote.notes = Some("Seeded quote".to_string());
        let quote = service.create_quote(new_quote).await?;
        summary.quotes += 1;

        let line_count = rng.gen_range(1..=4);
        for product in products.choose_multiple(&mut rng, line_count) {
            let quantity = rng.gen_range(1..=10);
            service
                .upsert_line(quote.id, product.id, quantity, None, None)
                .await?;
            summary.lines += 1;
        }

        if quote.status == QuoteStatus::Accepted && rng.gen_bool(0.9) {
            let draft = SaleDraft {
                contact_id: quote.contact_id,
                campaign_id: quote.campaign_id,
                reference: Some(format!("SALE-2026-{:05}", idx + 1)),
                status: *pick(&mut rng, &SALE_STATUSES),
                probability: Some(*pick(&mut rng, &SALE_PROBABILITIES)),
                expected_close_date: Some(today + Duration::days(rng.gen_range(5..=45))),
                notes: Some("Seeded sale from accepted quote".to_string()),
                ..Default::default()
            };
            service.create_sale_from_quote(quote.id, draft).await?;
            summary.sales += 1;
        }
    }

    info!(
        users = summary.users,
        companies = summary.companies,
        quotes = summary.quotes,
        lines = summary.lines,
        sales = summary.sales,
        "seeded CRM data"
    );
    Ok(summary)
}

/// Uniform pick from a non-empty constant table.
fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn random_phone(rng: &mut StdRng) -> String {
    let digits: String = (0..9)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    format!("0{digits}")
}

fn unique_siren(rng: &mut StdRng, existing: &mut HashSet<String>) -> String {
    loop {
        let siren = format!("{:09}", rng.gen_range(0..1_000_000_000u32));
        if existing.insert(siren.clone()) {
            return siren;
        }
    }
}
