// ABOUTME: Section extractors for the SDAT detail page: locate the detail table, then read owner and transfer sections.
// ABOUTME: Sections are found by header-cell marker text and read positionally, with bounds checks on every row and cell.

//! Extraction of the owner and transfer sections.
//!
//! The detail page lays everything out in one table (`id="detailSearch"`)
//! holding further nested tables. Sections are introduced by a row whose
//! `<th>` carries a marker such as `Owner Information`; the data lives in the
//! rows immediately after it.
//!
//! Key behaviors:
//! - Rows are every `<tr>` below the table in document order, nested tables included.
//! - Header text is whitespace-normalised before comparing with a marker.
//! - Positional lookups that fall off the end fail with `ExtractError::MalformedRow`.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::dom::{normalize_whitespace, text_segments};
use crate::error::ExtractError;
use crate::result::{OwnerInfo, TransferRecord};

/// Id of the table that holds every section of the detail page.
pub const DETAIL_TABLE_ID: &str = "detailSearch";

pub const OWNER_MARKER: &str = "Owner Information";
pub const TRANSFER_MARKER: &str = "Transfer Information";

/// Number of rows after the owner marker that carry the mailing address.
const OWNER_ROWS: usize = 2;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

/// Finds the first `<table>` whose `id` attribute equals `table_id`.
pub fn locate_table<'a>(doc: &'a Html, table_id: &str) -> Result<ElementRef<'a>, ExtractError> {
    doc.select(&TABLE)
        .find(|table| table.value().id() == Some(table_id))
        .ok_or_else(|| ExtractError::table_not_found(table_id))
}

/// Index of the first row holding a header cell whose normalised text equals `marker`.
fn find_marker_row(rows: &[ElementRef<'_>], marker: &str) -> Option<usize> {
    rows.iter().position(|row| {
        row.select(&TH)
            .any(|th| normalize_whitespace(&th.text().collect::<String>()) == marker)
    })
}

fn section_rows<'a>(table: ElementRef<'a>, marker: &str) -> Result<(Vec<ElementRef<'a>>, usize), ExtractError> {
    let rows: Vec<ElementRef<'a>> = table.select(&TR).collect();
    let idx = find_marker_row(&rows, marker).ok_or_else(|| ExtractError::section_not_found(marker))?;
    debug!(marker, row = idx, total_rows = rows.len(), "located section marker");
    Ok((rows, idx))
}

/// Reads the owner mailing address.
///
/// Takes the two rows after the `Owner Information` marker and, from each,
/// the second cell's text segments, concatenated in order.
pub fn extract_owner_info(table: ElementRef<'_>) -> Result<OwnerInfo, ExtractError> {
    let (rows, idx) = section_rows(table, OWNER_MARKER)?;

    let data_rows = &rows[idx + 1..];
    if data_rows.len() < OWNER_ROWS {
        return Err(ExtractError::malformed(
            OWNER_MARKER,
            format!(
                "expected {} rows after the marker, found {}",
                OWNER_ROWS,
                data_rows.len()
            ),
        ));
    }

    let mut lines = Vec::new();
    for (offset, row) in data_rows[..OWNER_ROWS].iter().enumerate() {
        let cell = row.select(&TD).nth(1).ok_or_else(|| {
            ExtractError::malformed(
                OWNER_MARKER,
                format!("row {} after the marker has no second cell", offset + 1),
            )
        })?;
        lines.extend(text_segments(cell));
    }

    debug!(lines = lines.len(), "extracted owner information");
    Ok(OwnerInfo(lines))
}

/// Reads the transfer history.
///
/// The row after the `Transfer Information` marker holds, in its first cell,
/// an inner table. Every cell of that inner table whose segments start with a
/// known transfer label and carry a value becomes one record; other cells are
/// skipped.
pub fn extract_transfer_info(table: ElementRef<'_>) -> Result<Vec<TransferRecord>, ExtractError> {
    let (rows, idx) = section_rows(table, TRANSFER_MARKER)?;

    let row = rows.get(idx + 1).ok_or_else(|| {
        ExtractError::malformed(TRANSFER_MARKER, "no row follows the marker")
    })?;
    let cell = row.select(&TD).next().ok_or_else(|| {
        ExtractError::malformed(TRANSFER_MARKER, "row after the marker has no cell")
    })?;
    let inner = cell.select(&TABLE).next().ok_or_else(|| {
        ExtractError::malformed(TRANSFER_MARKER, "first cell holds no inner table")
    })?;

    let records: Vec<TransferRecord> = inner
        .select(&TR)
        .flat_map(|tr| tr.select(&TD))
        .filter_map(|td| TransferRecord::from_segments(text_segments(td)))
        .collect();

    debug!(records = records.len(), "extracted transfer information");
    Ok(records)
}

/// Runs the full document walk against one configured table id.
#[derive(Debug, Clone)]
pub struct DetailPageExtractor {
    table_id: String,
}

impl DetailPageExtractor {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Locates the detail table, then reads owner information and transfer history in that order.
    pub fn extract(&self, doc: &Html) -> Result<(OwnerInfo, Vec<TransferRecord>), ExtractError> {
        let table = locate_table(doc, &self.table_id)?;
        let owner = extract_owner_info(table)?;
        let transfers = extract_transfer_info(table)?;
        Ok((owner, transfers))
    }

    /// Parses `html` and extracts from it.
    pub fn extract_html(&self, html: &str) -> Result<(OwnerInfo, Vec<TransferRecord>), ExtractError> {
        let doc = Html::parse_document(html);
        self.extract(&doc)
    }
}

impl Default for DetailPageExtractor {
    fn default() -> Self {
        Self::new(DETAIL_TABLE_ID)
    }
}
