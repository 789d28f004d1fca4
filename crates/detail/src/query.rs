// ABOUTME: PropertyQuery identifies one parcel by county/ward/section/block/lot and renders the detail-page URL.
// ABOUTME: Field widths are fixed; values are zero-padded when written into query parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScrapeError;

/// Search type discriminator sent as the `search_type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchType {
    /// Lookup by account (parcel) identifier.
    #[default]
    Account,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Account => "ACCT",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const COUNTY_WIDTH: usize = 2;
const WARD_WIDTH: usize = 2;
const SECTION_WIDTH: usize = 2;
const BLOCK_WIDTH: usize = 4;
const LOT_WIDTH: usize = 3;

/// Parcel identifier for a single SDAT detail page.
///
/// Deserialization goes through [`PropertyQuery::new`], so field widths hold
/// however a query is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQuery")]
pub struct PropertyQuery {
    search_type: SearchType,
    county: u32,
    ward: u32,
    section: u32,
    block: u32,
    lot: u32,
}

#[derive(Deserialize)]
struct RawQuery {
    #[serde(default)]
    search_type: SearchType,
    county: u32,
    ward: u32,
    section: u32,
    block: u32,
    lot: u32,
}

impl TryFrom<RawQuery> for PropertyQuery {
    type Error = ScrapeError;

    fn try_from(raw: RawQuery) -> Result<Self, Self::Error> {
        let query = PropertyQuery::new(raw.county, raw.ward, raw.section, raw.block, raw.lot)?;
        Ok(Self {
            search_type: raw.search_type,
            ..query
        })
    }
}

impl PropertyQuery {
    /// Build a query, rejecting values that do not fit their fixed field width.
    pub fn new(
        county: u32,
        ward: u32,
        section: u32,
        block: u32,
        lot: u32,
    ) -> Result<Self, ScrapeError> {
        check_width("county", county, COUNTY_WIDTH)?;
        check_width("ward", ward, WARD_WIDTH)?;
        check_width("section", section, SECTION_WIDTH)?;
        check_width("block", block, BLOCK_WIDTH)?;
        check_width("lot", lot, LOT_WIDTH)?;

        Ok(Self {
            search_type: SearchType::Account,
            county,
            ward,
            section,
            block,
            lot,
        })
    }

    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    pub fn county(&self) -> u32 {
        self.county
    }

    pub fn ward(&self) -> u32 {
        self.ward
    }

    pub fn section(&self) -> u32 {
        self.section
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    pub fn lot(&self) -> u32 {
        self.lot
    }

    /// Query parameters in the order the site expects them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search_type", self.search_type.as_str().to_string()),
            ("county", pad(self.county, COUNTY_WIDTH)),
            ("ward", pad(self.ward, WARD_WIDTH)),
            ("section", pad(self.section, SECTION_WIDTH)),
            ("block", pad(self.block, BLOCK_WIDTH)),
            ("lot", pad(self.lot, LOT_WIDTH)),
        ]
    }

    /// Append this query's parameters to `base_url`.
    ///
    /// Any query string already present on `base_url` is replaced.
    pub fn to_url(&self, base_url: &str) -> Result<Url, ScrapeError> {
        let mut url = Url::parse(base_url).map_err(|e| {
            ScrapeError::invalid_query(
                base_url,
                "BuildUrl",
                Some(anyhow::anyhow!("invalid base URL: {}", e)),
            )
        })?;

        url.query_pairs_mut()
            .clear()
            .extend_pairs(self.query_pairs());
        Ok(url)
    }
}

fn pad(value: u32, width: usize) -> String {
    format!("{:0width$}", value, width = width)
}

fn check_width(field: &str, value: u32, width: usize) -> Result<(), ScrapeError> {
    let max = 10u32.pow(width as u32) - 1;
    if value > max {
        return Err(ScrapeError::invalid_query(
            "",
            "PropertyQuery",
            Some(anyhow::anyhow!(
                "{} {} exceeds {} digits",
                field,
                value,
                width
            )),
        ));
    }
    Ok(())
}

/// Canonical parcel string, e.g. `03-16-10-0097-054`.
impl fmt::Display for PropertyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            pad(self.county, COUNTY_WIDTH),
            pad(self.ward, WARD_WIDTH),
            pad(self.section, SECTION_WIDTH),
            pad(self.block, BLOCK_WIDTH),
            pad(self.lot, LOT_WIDTH)
        )
    }
}

/// Parses `county-ward-section-block-lot`; `-`, `/` and whitespace all separate fields.
impl FromStr for PropertyQuery {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c == '-' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() != 5 {
            return Err(ScrapeError::invalid_query(
                "",
                "PropertyQuery",
                Some(anyhow::anyhow!(
                    "expected 5 parcel fields in {:?}, found {}",
                    s,
                    parts.len()
                )),
            ));
        }

        let mut values = [0u32; 5];
        for (slot, part) in values.iter_mut().zip(&parts) {
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ScrapeError::invalid_query(
                    "",
                    "PropertyQuery",
                    Some(anyhow::anyhow!("parcel field {:?} is not all digits", part)),
                ));
            }
            *slot = part.parse().map_err(|e| {
                ScrapeError::invalid_query(
                    "",
                    "PropertyQuery",
                    Some(anyhow::anyhow!("invalid parcel field {:?}: {}", part, e)),
                )
            })?;
        }

        let [county, ward, section, block, lot] = values;
        PropertyQuery::new(county, ward, section, block, lot)
    }
}
