use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Upper-cased instrument ticker.
///
/// Besides plain equities this covers index tickers (`^GSPC`) and
/// futures/FX tickers (`GC=F`, `EURUSD=X`), which is also what the CSV
/// adapter expects as file stems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        let mut chars = ticker.chars().enumerate();

        match chars.next() {
            None => return Err(ValidationError::EmptySymbol),
            Some((_, ch)) if !(ch.is_ascii_alphabetic() || ch == '^') => {
                return Err(ValidationError::SymbolInvalidStart { ch })
            }
            Some(_) => {}
        }
        if let Some((index, ch)) = chars.find(|(_, ch)| !is_ticker_char(*ch)) {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        let len = ticker.len();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        Ok(Self(ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_ticker_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '=' | '^')
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
