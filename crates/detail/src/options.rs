// ABOUTME: Configuration options for the SDAT client including base URL, detail table id and HTTP settings.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::Client;
use crate::extract::DETAIL_TABLE_ID;

/// Property detail page of the Maryland SDAT real property search.
pub const DEFAULT_BASE_URL: &str = "https://sdat.dat.maryland.gov/RealProperty/Pages/viewdetails.aspx";

/// Configuration options for the SDAT client.
#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    pub table_id: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub http_client: Option<reqwest::blocking::Client>,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            table_id: DETAIL_TABLE_ID.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("sdat-detail/", env!("CARGO_PKG_VERSION")).to_string(),
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the detail page URL that query parameters are appended to.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = base_url.into();
        self
    }

    /// Set the id of the table holding the owner and transfer sections.
    pub fn table_id(mut self, table_id: impl Into<String>) -> Self {
        self.opts.table_id = table_id.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Use a custom HTTP client. Timeout and user agent are then the caller's concern.
    pub fn http_client(mut self, client: reqwest::blocking::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
