use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency carried by every account. Funds never change currency while
/// moving between accounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
}

impl Currency {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
        }
    }

    /// Fail unless both sides of a leg share the same currency.
    pub(crate) fn ensure_same(self, other: Currency) -> Result<(), EngineError> {
        if self != other {
            return Err(EngineError::CurrencyMismatch(format!(
                "expected {}, got {}",
                self.code(),
                other.code()
            )));
        }
        Ok(())
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            other => Err(EngineError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
