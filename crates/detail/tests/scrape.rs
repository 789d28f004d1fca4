// ABOUTME: Integration tests for scraping a detail page end to end against a mock server.
// ABOUTME: Covers extraction from a full page fixture, error categories and repeatability.

use std::fs;

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use sdat_detail::{Client, ErrorCode, ExtractError, PropertyQuery, TransferLabel};

const DETAIL_PATH: &str = "/RealProperty/Pages/viewdetails.aspx";

fn load_html_fixture(name: &str) -> String {
    let path = format!(
        "{}/tests/fixtures/{}.html",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path, e))
}

fn sample_query() -> PropertyQuery {
    PropertyQuery::new(3, 16, 10, 97, 54).unwrap()
}

fn client_for(server: &MockServer) -> Client {
    Client::builder().base_url(server.url(DETAIL_PATH)).build()
}

#[test]
fn scrape_full_detail_page() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(DETAIL_PATH)
            .query_param("search_type", "ACCT")
            .query_param("county", "03")
            .query_param("block", "0097")
            .query_param("lot", "054");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(load_html_fixture("detail"));
    });

    let details = client_for(&server)
        .scrape(&sample_query())
        .expect("scrape should succeed");
    mock.assert();

    assert_eq!(
        details.owner.lines(),
        &["DOE JOHN Q", "DOE JANE R", "1234 SAMPLE AVE", "BALTIMORE MD 21230-"]
    );

    let segments: Vec<Vec<String>> = details
        .transfers
        .iter()
        .map(|r| r.segments().to_vec())
        .collect();
    assert_eq!(
        segments,
        vec![
            vec!["Seller:", "SMITH MARY A"],
            vec!["Date:", "06/15/2004"],
            vec!["Price:", "$250,000"],
            vec!["Type:", "ARMS LENGTH IMPROVED"],
            vec!["Deed1:", "/05432/ 00123"],
            vec!["Seller:", "JONES ROBERT"],
            vec!["Date:", "03/01/1998"],
            vec!["Price:", "$0"],
            vec!["Type:", "NON-ARMS LENGTH OTHER"],
            vec!["Deed1:", "/01234/ 00456"],
        ]
    );

    let prices: Vec<u64> = details
        .transfers
        .iter()
        .filter(|r| r.label() == TransferLabel::Price)
        .filter_map(|r| r.price())
        .collect();
    assert_eq!(prices, vec![250_000, 0]);
}

#[test]
fn scrape_is_repeatable() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(DETAIL_PATH);
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(load_html_fixture("detail"));
    });

    let client = client_for(&server);
    let first = client.scrape(&sample_query()).unwrap();
    let second = client.scrape(&sample_query()).unwrap();
    mock.assert_calls(2);

    assert_eq!(first, second);
}

#[test]
fn scrape_error_page_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(DETAIL_PATH);
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><body><span class='error'>No records found.</span></body></html>");
    });

    let err = client_for(&server).scrape(&sample_query()).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(
        err.extract_error(),
        Some(&ExtractError::table_not_found("detailSearch"))
    );
}

#[test]
fn scrape_server_error_is_fetch_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(DETAIL_PATH);
        then.status(500).body("boom");
    });

    let err = client_for(&server).scrape(&sample_query()).unwrap_err();
    mock.assert_calls(1);
    assert!(err.is_fetch());
}

#[test]
fn scrape_truncated_owner_section_is_malformed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(DETAIL_PATH);
        then.status(200).body(
            r#"<table id="detailSearch">
                 <tr><th>Owner Information</th></tr>
                 <tr><td>Owner Name:</td><td>DOE JOHN</td></tr>
               </table>"#,
        );
    });

    let err = client_for(&server).scrape(&sample_query()).unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn scrape_decodes_declared_charset() {
    let server = MockServer::start();
    let mut body = br#"<table id="detailSearch">
        <tr><th>Owner Information</th></tr>
        <tr><td></td><td>PE"#
        .to_vec();
    body.push(0xd1); // N with tilde in ISO-8859-1
    body.extend_from_slice(
        br#"A MARIA</td></tr>
        <tr><td></td><td>1 MAIN ST</td></tr>
        <tr><th>Transfer Information</th></tr>
        <tr><td><table><tr><td>Seller:<br>X</td></tr></table></td></tr>
      </table>"#,
    );

    server.mock(|when, then| {
        when.method(GET).path(DETAIL_PATH);
        then.status(200)
            .header("content-type", "text/html; charset=ISO-8859-1")
            .body(body.clone());
    });

    let details = client_for(&server).scrape(&sample_query()).unwrap();
    assert_eq!(details.owner.lines(), &["PEÑA MARIA", "1 MAIN ST"]);
}
