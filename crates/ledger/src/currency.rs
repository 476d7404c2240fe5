use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO-like 3-letter currency code.
///
/// The ledger is genuinely multi-currency: every workspace has a base
/// currency and every operation may be recorded in any other code, with a
/// conversion rate resolved at write time. Codes are not validated against a
/// registry; any 3 ASCII letters are accepted and stored uppercased.
///
/// ## Minor units
///
/// Monetary values are stored as an `i64` number of **minor units** (see
/// [`Money`](crate::Money)). All supported codes are treated as having 2
/// fraction digits, so `10.50 USD` ⇄ `1050`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        // Construction guarantees ASCII uppercase letters.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(LedgerError::CurrencyMismatch(format!(
                "invalid currency code: {trimmed}"
            )));
        }
        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Currency(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_uppercases() {
        let usd = Currency::try_from("usd").unwrap();
        assert_eq!(usd.code(), "USD");
        assert_eq!(usd, Currency::try_from(" USD ").unwrap());
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(Currency::try_from("EU").is_err());
        assert!(Currency::try_from("EURO").is_err());
        assert!(Currency::try_from("E1R").is_err());
        assert!(Currency::try_from("").is_err());
    }
}
