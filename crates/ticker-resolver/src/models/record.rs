use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ResolverError;
use crate::resolver::normalize;

use super::types::Identifier;

/// Identifier prefixes listed on the Shanghai exchange. Every other
/// domestic identifier is treated as Shenzhen.
const SHANGHAI_PREFIXES: [&str; 3] = ["60", "68", "51"];

/// Width of a domestic identifier after zero padding.
const DOMESTIC_CODE_WIDTH: usize = 6;

/// Listing universe an instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Mainland A-shares (Shanghai, Shenzhen).
    #[serde(rename = "A")]
    Domestic,
    /// Hong Kong main board.
    #[serde(rename = "HK")]
    Offshore,
}

impl Market {
    /// Every universe, in refresh order.
    pub const ALL: [Market; 2] = [Market::Domestic, Market::Offshore];

    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Domestic => "A-share",
            Self::Offshore => "HK",
        }
    }

    /// Trading currency (ISO 4217).
    pub fn currency(&self) -> &'static str {
        match self {
            Self::Domestic => "CNY",
            Self::Offshore => "HKD",
        }
    }

    /// Turns a raw provider code into the identifier stored in the index.
    ///
    /// Domestic codes are zero-padded to six digits ("1" -> "000001");
    /// offshore codes get the `.HK` market tag.
    pub fn canonical_identifier(&self, raw_code: &str) -> Identifier {
        let code = raw_code.trim();
        match self {
            Self::Domestic => format!("{:0>width$}", code, width = DOMESTIC_CODE_WIDTH),
            Self::Offshore => format!("{}.HK", code),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Exchange an instrument trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    #[serde(rename = "SH")]
    Shanghai,
    #[serde(rename = "SZ")]
    Shenzhen,
    #[serde(rename = "HK")]
    HongKong,
}

impl Venue {
    /// Derives the venue from the market and identifier.
    ///
    /// Domestic venues follow the code prefix rules; offshore instruments
    /// are always Hong Kong.
    pub fn for_identifier(market: Market, identifier: &str) -> Self {
        match market {
            Market::Domestic => {
                if SHANGHAI_PREFIXES.iter().any(|p| identifier.starts_with(p)) {
                    Self::Shanghai
                } else {
                    Self::Shenzhen
                }
            }
            Market::Offshore => Self::HongKong,
        }
    }

    /// Yahoo Finance exchange suffix for this venue.
    pub fn yahoo_suffix(&self) -> &'static str {
        match self {
            Self::Shanghai => ".SS",
            Self::Shenzhen => ".SZ",
            Self::HongKong => ".HK",
        }
    }
}

/// One listed instrument.
///
/// Serialized with the field names of the on-disk cache format
/// (`code`, `name`, `clean_name`, `market`, `exchange`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    #[serde(rename = "code")]
    pub identifier: Identifier,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "clean_name")]
    pub canonical_name: String,
    pub market: Market,
    #[serde(rename = "exchange")]
    pub venue: Venue,
}

impl InstrumentRecord {
    /// Builds a record from an already-canonical identifier and the display
    /// name published by the source.
    ///
    /// Empty identifiers or names are rejected. If normalization strips the
    /// whole name (a bare status marker), the trimmed display name is kept
    /// as the canonical name so the record stays matchable.
    pub fn from_listing(
        market: Market,
        identifier: &str,
        display_name: &str,
    ) -> Result<Self, ResolverError> {
        let identifier = identifier.trim();
        let display_name = display_name.trim();

        if identifier.is_empty() {
            return Err(ResolverError::InvalidRecord(format!(
                "empty identifier for '{}'",
                display_name
            )));
        }
        if display_name.is_empty() {
            return Err(ResolverError::InvalidRecord(format!(
                "empty name for {}",
                identifier
            )));
        }

        let mut canonical_name = normalize(display_name);
        if canonical_name.is_empty() {
            canonical_name = display_name.to_string();
        }

        Ok(Self {
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
            canonical_name,
            market,
            venue: Venue::for_identifier(market, identifier),
        })
    }

    /// Symbol understood by Yahoo-style quote services.
    ///
    /// Domestic codes get the venue suffix ("600000.SS"); offshore
    /// identifiers already carry theirs.
    pub fn yahoo_symbol(&self) -> String {
        match self.market {
            Market::Domestic => format!("{}{}", self.identifier, self.venue.yahoo_suffix()),
            Market::Offshore => self.identifier.clone(),
        }
    }
}
