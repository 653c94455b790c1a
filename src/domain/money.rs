use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Currency label used when none is configured.
pub const DEFAULT_CURRENCY: &str = "DT";

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format cents followed by a currency label, e.g. "1200.00DT".
pub fn format_amount(cents: Cents, currency: &str) -> String {
    format!("{}{}", format_cents(cents), currency)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, decimal_str) = match unsigned.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (unsigned, ""),
    };
    if decimal_str.contains('.') || (units_str.is_empty() && decimal_str.is_empty()) {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        parse_digits(units_str, input)?
    };

    // Every fractional digit must be valid, even the truncated ones
    if !decimal_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }

    // Pad or truncate the fractional part to 2 digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => parse_digits(decimal_str, input)? * 10,
        _ => parse_digits(&decimal_str[..2], input)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or_else(|| ParseCentsError::OutOfRange(input.to_string()))?;
    Ok(if negative { -cents } else { cents })
}

fn parse_digits(digits: &str, input: &str) -> Result<i64, ParseCentsError> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }
    digits
        .parse()
        .map_err(|_| ParseCentsError::OutOfRange(input.to_string()))
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    #[error("invalid money format: '{0}'")]
    InvalidFormat(String),

    #[error("amount out of range: '{0}'")]
    OutOfRange(String),
}
