// ABOUTME: The Client struct that runs a scrape: build the URL, fetch, parse, extract.
// ABOUTME: Provides scrape(), scrape_url() and parse_html() returning PropertyDetails or a ScrapeError.

use scraper::Html;
use tracing::{info, info_span};

use crate::error::ScrapeError;
use crate::extract::DetailPageExtractor;
use crate::options::{ClientBuilder, Options};
use crate::query::PropertyQuery;
use crate::resource::fetch_html;
use crate::result::PropertyDetails;

/// Blocking client for SDAT property detail pages.
///
/// Holds no per-request state; one client can serve any number of scrapes,
/// including from several threads at once.
pub struct Client {
    opts: Options,
    http_client: reqwest::blocking::Client,
    extractor: DetailPageExtractor,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::blocking::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let extractor = DetailPageExtractor::new(opts.table_id.clone());

        Self {
            opts,
            http_client,
            extractor,
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Build the detail page URL for a parcel against the configured base URL.
    pub fn detail_url(&self, query: &PropertyQuery) -> Result<String, ScrapeError> {
        Ok(query.to_url(&self.opts.base_url)?.to_string())
    }

    /// Fetch and extract the detail page for one parcel.
    pub fn scrape(&self, query: &PropertyQuery) -> Result<PropertyDetails, ScrapeError> {
        let span = info_span!("scrape", parcel = %query);
        let _guard = span.enter();

        let url = self.detail_url(query)?;
        self.scrape_url(&url)
    }

    /// Fetch `url` and extract it. The URL must already carry its query parameters.
    pub fn scrape_url(&self, url: &str) -> Result<PropertyDetails, ScrapeError> {
        let html = fetch_html(&self.http_client, url, &self.opts.headers)?;

        self.parse_html(&html, url)
    }

    /// Extract owner and transfer information from already-fetched markup.
    ///
    /// `url` is only recorded in the result and in errors.
    pub fn parse_html(&self, html: &str, url: &str) -> Result<PropertyDetails, ScrapeError> {
        let doc = Html::parse_document(html);

        let (owner, transfers) = self
            .extractor
            .extract(&doc)
            .map_err(|e| ScrapeError::extract(url, "Extract", e))?;

        info!(
            url,
            owner_lines = owner.len(),
            transfers = transfers.len(),
            "extracted detail page"
        );

        Ok(PropertyDetails {
            url: url.to_string(),
            owner,
            transfers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body>
        <table id="detailSearch">
          <tr><th>Owner Information</th></tr>
          <tr><td>Owner Name:</td><td>DOE JOHN</td></tr>
          <tr><td>Mailing Address:</td><td>1 MAIN ST<br>BALTIMORE MD 21201</td></tr>
          <tr><th>Transfer Information</th></tr>
          <tr><td><table>
            <tr><td>Seller:<br>SMITH MARY</td><td>Date:<br>01/02/2003</td></tr>
          </table></td></tr>
        </table>
    </body></html>"#;

    #[test]
    fn parse_html_returns_details() {
        let client = Client::builder().build();
        let details = client
            .parse_html(PAGE, "https://example.com/detail")
            .expect("parse_html should succeed");

        assert_eq!(details.url, "https://example.com/detail");
        assert_eq!(
            details.owner.lines(),
            &["DOE JOHN", "1 MAIN ST", "BALTIMORE MD 21201"]
        );
        assert_eq!(details.transfers.len(), 2);
    }

    #[test]
    fn parse_html_missing_table_is_not_found() {
        let client = Client::builder().build();
        let err = client
            .parse_html("<html><body>error</body></html>", "https://example.com/x")
            .expect_err("should fail without the detail table");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.url, "https://example.com/x");
    }

    #[test]
    fn scrape_requests_padded_parameters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/RealProperty/Pages/viewdetails.aspx")
                .query_param("search_type", "ACCT")
                .query_param("county", "03")
                .query_param("ward", "16")
                .query_param("section", "10")
                .query_param("block", "0097")
                .query_param("lot", "054");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(PAGE);
        });

        let client = Client::builder()
            .base_url(server.url("/RealProperty/Pages/viewdetails.aspx"))
            .build();
        let query = PropertyQuery::new(3, 16, 10, 97, 54).unwrap();

        let details = client.scrape(&query).expect("scrape should succeed");
        mock.assert();
        assert_eq!(details.owner.len(), 3);
    }

    #[test]
    fn scrape_with_bad_base_url_is_invalid_query() {
        let client = Client::builder().base_url("::nope::").build();
        let query = PropertyQuery::new(1, 1, 1, 1, 1).unwrap();
        let err = client.scrape(&query).unwrap_err();
        assert!(err.is_invalid_query());
    }
}
