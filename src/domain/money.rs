use thiserror::Error;

/// Money is represented as integer cents, which gives the two-decimal
/// precision every amount in the CRM is stored with.
/// €49.00 = 4900 cents.
pub type Cents = i64;

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("invalid money format: {0}")]
    InvalidFormat(String),

    #[error("more than two decimal places in {0}")]
    TooPrecise(String),

    #[error("amount out of range")]
    Overflow,
}

/// Format cents as a decimal string.
/// Example: 4900 -> "49.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Format an optional amount, rendering `None` as a dash.
pub fn format_optional_cents(cents: Option<Cents>) -> String {
    cents.map(format_cents).unwrap_or_else(|| "-".to_string())
}

/// Parse a decimal string into cents.
/// Example: "49.00" -> 4900, "12.5" -> 1250, "100" -> 10000
///
/// Amounts with more than two decimal places are rejected rather than
/// rounded, so a price never silently changes on the way in.
pub fn parse_cents(input: &str) -> Result<Cents, MoneyError> {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let invalid = || MoneyError::InvalidFormat(input.to_string());

    let (units_str, fraction_str) = digits.split_once('.').unwrap_or((digits, ""));
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(invalid());
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !fraction_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    if fraction_str.len() > 2 {
        return Err(MoneyError::TooPrecise(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| invalid())?
    };
    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => fraction_str.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction_str.parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or(MoneyError::Overflow)?;
    Ok(if negative { -cents } else { cents })
}

/// Total of a single line: quantity × unit price, or `None` when the line
/// carries no price.
pub fn line_total(quantity: u32, unit_price: Option<Cents>) -> Result<Option<Cents>, MoneyError> {
    match unit_price {
        Some(price) => price
            .checked_mul(i64::from(quantity))
            .map(Some)
            .ok_or(MoneyError::Overflow),
        None => Ok(None),
    }
}

/// Sum the priced entries. Returns `None` when no entry has a price, so an
/// unpriced set and a set summing to zero stay distinguishable.
pub fn sum_priced<I>(totals: I) -> Result<Option<Cents>, MoneyError>
where
    I: IntoIterator<Item = Option<Cents>>,
{
    totals
        .into_iter()
        .flatten()
        .try_fold(None, |acc: Option<Cents>, total| {
            acc.unwrap_or(0)
                .checked_add(total)
                .map(Some)
                .ok_or(MoneyError::Overflow)
        })
}

/// Normalize a currency code to upper case, accepting only three ASCII letters.
pub fn normalize_currency(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}
