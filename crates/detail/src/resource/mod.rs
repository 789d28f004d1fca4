// ABOUTME: Fetches the detail page over HTTP and decodes it to text.
// ABOUTME: One blocking GET; the body is read through a hard size cap and decoded by its declared or detected charset.

use std::collections::HashMap;
use std::io::{self, Read};
use std::time::Instant;

use encoding_rs::Encoding;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;

/// Largest body accepted from the site (10 MiB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

const OP: &str = "Fetch";

/// GET `url` with the extra `headers` and return the page as text.
///
/// Anything but `200 OK` is a fetch error and the body is not read.
pub fn fetch_html(
    client: &HttpClient,
    url: &str,
    headers: &HashMap<String, String>,
) -> Result<String, ScrapeError> {
    let target = page_url(url)?;

    let request = headers
        .iter()
        .fold(client.get(target), |req, (name, value)| req.header(name, value));

    debug!(url, "sending request");
    let started = Instant::now();
    let response = request.send().map_err(|e| request_error(url, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ScrapeError::fetch(
            url,
            OP,
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    if response
        .content_length()
        .is_some_and(|len| len > MAX_CONTENT_LENGTH as u64)
    {
        return Err(too_large(url));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let body = match read_capped(response, MAX_CONTENT_LENGTH) {
        Ok(Some(body)) => body,
        Ok(None) => return Err(too_large(url)),
        Err(e) => return Err(body_error(url, e)),
    };

    info!(
        url,
        bytes = body.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetched detail page"
    );

    Ok(decode_body(&body, content_type.as_deref()))
}

fn page_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url).map_err(|e| {
        ScrapeError::invalid_query(url, OP, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScrapeError::invalid_query(
            url,
            OP,
            Some(anyhow::anyhow!("unsupported scheme {:?}", other)),
        )),
    }
}

/// Read at most `limit` bytes. `Ok(None)` means the reader had more than that.
fn read_capped(reader: impl Read, limit: usize) -> io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut body)?;
    if body.len() > limit {
        return Ok(None);
    }
    Ok(Some(body))
}

fn too_large(url: &str) -> ScrapeError {
    ScrapeError::fetch(
        url,
        OP,
        Some(anyhow::anyhow!("body exceeds {} bytes", MAX_CONTENT_LENGTH)),
    )
}

fn request_error(url: &str, err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::timeout(url, OP, Some(anyhow::anyhow!("request timed out: {}", err)))
    } else {
        ScrapeError::fetch(url, OP, Some(anyhow::anyhow!("request failed: {}", err)))
    }
}

fn body_error(url: &str, err: io::Error) -> ScrapeError {
    let timed_out = err.kind() == io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout);

    if timed_out {
        ScrapeError::timeout(url, OP, Some(anyhow::anyhow!("body read timed out: {}", err)))
    } else {
        ScrapeError::fetch(url, OP, Some(anyhow::anyhow!("failed to read body: {}", err)))
    }
}

/// Decode with the Content-Type charset when it names a known encoding, else sniff.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or_else(|| {
            let mut detector = chardetng::EncodingDetector::new();
            detector.feed(body, true);
            detector.guess(None, true)
        });

    encoding.decode(body).0.into_owned()
}

fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\''))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn http_client() -> HttpClient {
        HttpClient::builder().user_agent("test-agent").build().unwrap()
    }

    fn no_headers() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn fetches_and_decodes_utf8_page() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/detail");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>hello</p>");
        });

        let html = fetch_html(&http_client(), &server.url("/detail"), &no_headers())
            .expect("fetch should succeed");
        mock.assert();
        assert_eq!(html, "<p>hello</p>");
    }

    #[test]
    fn sends_configured_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/h").header("x-trace", "abc");
            then.status(200).body("ok");
        });

        let mut headers = no_headers();
        headers.insert("x-trace".to_string(), "abc".to_string());

        assert!(fetch_html(&http_client(), &server.url("/h"), &headers).is_ok());
        mock.assert();
    }

    #[test]
    fn non_ok_status_is_fetch_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let err = fetch_html(&http_client(), &server.url("/missing"), &no_headers())
            .expect_err("404 should fail");
        assert!(err.is_fetch());
        assert!(err.to_string().contains("HTTP status 404"));
    }

    #[test]
    fn slow_response_is_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500)).body("late");
        });

        let client = HttpClient::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = fetch_html(&client, &server.url("/slow"), &no_headers())
            .expect_err("should time out");
        assert!(err.is_timeout());
    }

    #[test]
    fn refused_connection_is_fetch_error() {
        let err = fetch_html(&http_client(), "http://127.0.0.1:9/unreachable", &no_headers())
            .expect_err("nothing listens on the discard port");
        assert!(err.is_fetch() || err.is_timeout());
    }

    #[test]
    fn rejects_unusable_urls() {
        let client = http_client();
        let headers = no_headers();
        assert!(fetch_html(&client, "", &headers).unwrap_err().is_invalid_query());
        assert!(fetch_html(&client, "not a url", &headers).unwrap_err().is_invalid_query());
        assert!(fetch_html(&client, "ftp://example.com/x", &headers)
            .unwrap_err()
            .is_invalid_query());
    }

    #[test]
    fn capped_read_stops_on_unbounded_stream() {
        // io::repeat never ends, like a chunked body with no Content-Length.
        let result = read_capped(io::repeat(b'a'), 1024).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn capped_read_accepts_body_at_limit() {
        let body = vec![b'a'; 1024];
        let result = read_capped(&body[..], 1024).unwrap();
        assert_eq!(result.map(|b| b.len()), Some(1024));
    }

    #[test]
    fn declared_charset_wins() {
        let decoded = decode_body(&[0x63, 0x61, 0x66, 0xe9], Some("text/html; charset=ISO-8859-1"));
        assert_eq!(decoded, "café");
    }

    #[test]
    fn charset_param_handles_quotes_and_case() {
        assert_eq!(charset_param("text/html; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_param("text/html; Charset=\"windows-1252\""), Some("windows-1252"));
        assert_eq!(charset_param("text/html"), None);
    }
}
