//! Reference rows a quote points at. These only carry what the ledger and
//! the seeder need; managing them is left to the surrounding CRM.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type CompanyId = Uuid;
pub type ContactId = Uuid;
pub type CampaignId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, full_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            full_name,
            phone: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    /// Nine-digit SIREN, unique per company.
    pub siren: String,
    pub name: String,
    pub employee_count: Option<u32>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub sector: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(siren: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            siren,
            name,
            employee_count: None,
            postcode: None,
            city: None,
            country: None,
            sector: None,
            created_at: Utc::now(),
        }
    }
}

pub fn is_valid_siren(siren: &str) -> bool {
    siren.len() == 9 && siren.chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub company_id: CompanyId,
    pub first_name: Option<String>,
    pub last_name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(company_id: CompanyId, last_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            first_name: None,
            last_name,
            role: None,
            email: None,
            is_primary: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub code: String,
    pub name: String,
    /// Channel: email, call, linkedin, webinar, ads...
    pub kind: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(code: String, name: String, kind: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            kind,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
