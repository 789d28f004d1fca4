// ABOUTME: Main library entry point for the SDAT property detail scraper.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, PropertyQuery, PropertyDetails, the extractors and error types.

//! sdat-detail - owner and transfer extraction for SDAT property detail pages.
//!
//! This crate fetches a single real-property detail page from the Maryland
//! State Department of Assessments and Taxation site and reads two sections
//! out of its table layout: the owner's mailing address and the transfer
//! history.
//!
//! # Example
//!
//! ```no_run
//! use sdat_detail::{Client, PropertyQuery, ScrapeError};
//!
//! fn main() -> Result<(), ScrapeError> {
//!     let client = Client::builder().build();
//!     let query = PropertyQuery::new(3, 16, 10, 97, 54)?;
//!     let details = client.scrape(&query)?;
//!     print!("{}", details.format_text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dom;
pub mod error;
pub mod extract;
pub mod options;
pub mod query;
pub mod resource;
pub mod result;

pub use crate::client::Client;
pub use crate::error::{ErrorCode, ExtractError, ScrapeError};
pub use crate::extract::{
    extract_owner_info, extract_transfer_info, locate_table, DetailPageExtractor,
    DETAIL_TABLE_ID,
};
pub use crate::options::{ClientBuilder, Options, DEFAULT_BASE_URL};
pub use crate::query::{PropertyQuery, SearchType};
pub use crate::result::{OwnerInfo, PropertyDetails, TransferLabel, TransferRecord};
