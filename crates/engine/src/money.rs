use std::{fmt, str::FromStr};

use crate::EngineError;

/// Amount in integer cents.
///
/// Balances and ledger amounts are stored as plain `i64` minor units; this
/// type wraps them for percentage shares, parsing of user input and log
/// formatting.
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!(MoneyCents::new(12_34).to_string(), "12.34€");
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

const BPS_SCALE: i128 = 10_000;

impl MoneyCents {
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Share of this amount in basis points (`2000` = 20%), rounded half-up
    /// (away from zero) to the nearest cent.
    ///
    /// ```rust
    /// use engine::MoneyCents;
    ///
    /// assert_eq!(MoneyCents::new(10_000).share_bps(2_000), MoneyCents::new(2_000));
    /// assert_eq!(MoneyCents::new(13).share_bps(2_000), MoneyCents::new(3));
    /// ```
    #[must_use]
    pub fn share_bps(self, bps: u32) -> MoneyCents {
        let scaled = i128::from(self.0) * i128::from(bps);
        let magnitude = (scaled.abs() + BPS_SCALE / 2) / BPS_SCALE;
        let rounded = if scaled < 0 { -magnitude } else { magnitude };
        // |rounded| <= |self| since bps is validated to be <= 10_000.
        MoneyCents(i64::try_from(rounded).unwrap_or(self.0))
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}€", abs / 100, abs % 100)
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

fn digits(value: &str) -> Option<i64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parse `10`, `10.5`, `10,50`, `-0.01` into cents. At most two decimals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| EngineError::InvalidAmount(format!("{why}: {s:?}"));

        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed[1..].trim_start()),
            Some(b'+') => (false, trimmed[1..].trim_start()),
            Some(_) => (false, trimmed),
            None => return Err(invalid("empty amount")),
        };

        let normalized = unsigned.replace(',', ".");
        let (whole, fraction) = normalized
            .split_once('.')
            .unwrap_or((normalized.as_str(), ""));
        let whole = digits(whole).ok_or_else(|| invalid("invalid amount"))?;
        let fraction = match fraction.len() {
            0 => 0,
            1 => digits(fraction).ok_or_else(|| invalid("invalid amount"))? * 10,
            2 => digits(fraction).ok_or_else(|| invalid("invalid amount"))?,
            _ => return Err(invalid("too many decimals")),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(|| invalid("amount too large"))?;
        Ok(MoneyCents(if negative { -cents } else { cents }))
    }
}
