use thiserror::Error;

use crate::domain::{CompanyId, MoneyError, ProductId, QuoteId, SaleId, UserId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    #[error("Product already exists: {0}")]
    ProductAlreadyExists(String),

    #[error("Quote already exists: {0}")]
    QuoteAlreadyExists(String),

    /// The store rejected a write on a unique or foreign key constraint.
    /// For a line upsert this means a concurrent insert won; retrying the
    /// upsert turns it into an update.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Quantity must be a positive integer, got {0}")]
    InvalidQuantity(u32),

    #[error("Probability must be between 0 and 100, got {0}")]
    InvalidProbability(u8),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("SIREN must be nine digits, got '{0}'")]
    InvalidSiren(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Database error: {0}")]
    Database(anyhow::Error),
}

impl AppError {
    pub fn quote_not_found(id: QuoteId) -> Self {
        AppError::QuoteNotFound(id.to_string())
    }

    pub fn product_not_found(id: ProductId) -> Self {
        AppError::ProductNotFound(id.to_string())
    }

    pub fn sale_not_found(id: SaleId) -> Self {
        AppError::SaleNotFound(id.to_string())
    }

    /// True for every "referenced record does not exist" kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::QuoteNotFound(_)
                | AppError::ProductNotFound(_)
                | AppError::SaleNotFound(_)
                | AppError::UserNotFound(_)
                | AppError::CompanyNotFound(_)
        )
    }
}

/// Storage errors arrive as `anyhow::Error` with context attached. Constraint
/// rejections and money overflows are pulled out into their own kinds;
/// anything else (connectivity, malformed rows) is passed through untouched.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(money) = err.chain().find_map(|cause| cause.downcast_ref::<MoneyError>()) {
            return AppError::InvalidAmount(money.clone());
        }
        match constraint_violation(&err) {
            Some(message) => AppError::ConstraintViolation(message),
            None => AppError::Database(err),
        }
    }
}

fn constraint_violation(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .and_then(|sqlx_err| match sqlx_err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                Some(db_err.message().to_string())
            }
            _ => None,
        })
}
