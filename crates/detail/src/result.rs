// ABOUTME: Result types extracted from a detail page: OwnerInfo, TransferRecord and the PropertyDetails bundle.
// ABOUTME: Includes the closed TransferLabel set and a plain-text rendering for terminal output.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Owner mailing address, one entry per rendered line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerInfo(pub Vec<String>);

impl OwnerInfo {
    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<String>> for OwnerInfo {
    fn from(lines: Vec<String>) -> Self {
        OwnerInfo(lines)
    }
}

/// The labels a transfer cell may start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferLabel {
    Seller,
    Date,
    Price,
    Type,
    Deed1,
    Deed2,
}

impl TransferLabel {
    pub const ALL: [TransferLabel; 6] = [
        TransferLabel::Seller,
        TransferLabel::Date,
        TransferLabel::Price,
        TransferLabel::Type,
        TransferLabel::Deed1,
        TransferLabel::Deed2,
    ];

    /// The exact text the site renders, colon included.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferLabel::Seller => "Seller:",
            TransferLabel::Date => "Date:",
            TransferLabel::Price => "Price:",
            TransferLabel::Type => "Type:",
            TransferLabel::Deed1 => "Deed1:",
            TransferLabel::Deed2 => "Deed2:",
        }
    }
}

impl fmt::Display for TransferLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match against the rendered label text.
impl FromStr for TransferLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransferLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or(())
    }
}

/// One labelled cell from the transfer history table.
///
/// `segments[0]` is always a recognised label and there is at least one value
/// segment. Extra segments are kept in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TransferRecord {
    label: TransferLabel,
    segments: Vec<String>,
}

impl TransferRecord {
    /// Accepts a cell's segments if they form a labelled pair.
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.len() < 2 {
            return None;
        }
        let label = segments[0].parse::<TransferLabel>().ok()?;
        Some(Self { label, segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<String> {
        self.segments
    }

    pub fn label(&self) -> TransferLabel {
        self.label
    }

    /// Value segments joined with single spaces.
    pub fn value(&self) -> String {
        self.segments[1..].join(" ")
    }

    /// Transfer date for `Date:` records, parsed from `MM/DD/YYYY`.
    pub fn date(&self) -> Option<NaiveDate> {
        if self.label() != TransferLabel::Date {
            return None;
        }
        NaiveDate::parse_from_str(self.segments[1].trim(), "%m/%d/%Y").ok()
    }

    /// Whole-dollar amount for `Price:` records, e.g. `$1,250,000` → 1250000.
    pub fn price(&self) -> Option<u64> {
        if self.label() != TransferLabel::Price {
            return None;
        }
        let raw = self.segments[1].trim();
        let raw = raw.strip_prefix('$').unwrap_or(raw);
        let whole = raw.split('.').next().unwrap_or(raw);
        let digits: String = whole.chars().filter(|c| *c != ',').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl TryFrom<Vec<String>> for TransferRecord {
    type Error = String;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        TransferRecord::from_segments(segments)
            .ok_or_else(|| "expected a transfer label followed by a value".to_string())
    }
}

impl From<TransferRecord> for Vec<String> {
    fn from(record: TransferRecord) -> Self {
        record.segments
    }
}

/// Everything extracted from one detail page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub url: String,
    pub owner: OwnerInfo,
    pub transfers: Vec<TransferRecord>,
}

impl PropertyDetails {
    /// Format the result as plain text: address lines, then one line per transfer cell.
    pub fn format_text(&self) -> String {
        let mut out = String::new();

        out.push_str("Owner Information\n");
        for line in self.owner.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }

        out.push_str("Transfer Information\n");
        if self.transfers.is_empty() {
            out.push_str("  (none)\n");
        }
        for record in &self.transfers {
            out.push_str(&format!("  {} {}\n", record.label(), record.value()));
        }

        out
    }
}
