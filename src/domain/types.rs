//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (non-empty identifiers, numeric
//! bill numbers, well-formed dates) so that once a value reaches the domain
//! layer it can be treated as trusted.
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Bill number did not start with a digit.
    #[error("invalid bill number")]
    InvalidBillNumber,
    /// Date was not in `dd/MM/yyyy` or `yyyy-MM-dd` form.
    #[error("invalid date")]
    InvalidDate,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Client-generated bill identifier.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct BillId(String);

impl BillId {
    /// Wraps a trimmed, non-empty identifier.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(value))
    }

    /// Derives a fresh identifier from the creation instant: milliseconds since
    /// the epoch plus a random offset below 1000.
    pub fn generate(now: NaiveDateTime) -> Self {
        let millis = now.and_utc().timestamp_millis();
        let jitter = i64::from(rand::random::<u16>() % 1000);
        Self((millis + jitter).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for BillId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BillId {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for BillId {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BillId> for String {
    fn from(value: BillId) -> Self {
        value.0
    }
}

/// Minimum width of a generated bill number.
const BILL_NUMBER_WIDTH: usize = 3;

/// Sequential bill number such as `"007"`.
///
/// Stored numbers are decoded as-is, since other clients may have written
/// values such as `"NaN"`; [`BillNumber::new`] validates user input.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub struct BillNumber(String);

impl BillNumber {
    /// Accepts any trimmed value that starts with a digit.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        if !value.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(TypeConstraintError::InvalidBillNumber);
        }
        Ok(Self(value))
    }

    /// Number used when no bill exists yet.
    pub fn first() -> Self {
        Self::from_sequence(1)
    }

    fn from_sequence(value: u64) -> Self {
        Self(format!("{value:0width$}", width = BILL_NUMBER_WIDTH))
    }

    /// Numeric value of the leading digits.
    pub fn sequence(&self) -> u64 {
        self.0
            .chars()
            .take_while(char::is_ascii_digit)
            .fold(0u64, |acc, c| {
                acc.saturating_mul(10)
                    .saturating_add(u64::from(c as u8 - b'0'))
            })
    }

    /// The number following this one, zero-padded to three digits.
    pub fn next(&self) -> Self {
        Self::from_sequence(self.sequence().saturating_add(1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BillNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BillNumber {
    fn from(value: String) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<BillNumber> for String {
    fn from(value: BillNumber) -> Self {
        value.0
    }
}

/// Display format of bill dates.
const DISPLAY_FORMAT: &str = "%d/%m/%Y";
/// Format produced by HTML date inputs.
const INPUT_FORMAT: &str = "%Y-%m-%d";

/// Calendar date of a bill, displayed as `dd/MM/yyyy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BillDate(NaiveDate);

impl BillDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses either the display form or the HTML input form.
    pub fn parse(value: &str) -> Result<Self, TypeConstraintError> {
        let value = value.trim();
        NaiveDate::parse_from_str(value, DISPLAY_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(value, INPUT_FORMAT))
            .map(Self)
            .map_err(|_| TypeConstraintError::InvalidDate)
    }

    /// Value suitable for an `<input type="date">`.
    pub fn to_input_value(&self) -> String {
        self.0.format(INPUT_FORMAT).to_string()
    }
}

impl Display for BillDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl FromStr for BillDate {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BillDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Attributes the bill list can be filtered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    #[default]
    Name,
    Date,
    BillNo,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Name, SearchField::Date, SearchField::BillNo];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::Date => "date",
            SearchField::BillNo => "bill_no",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchField::Name => "Name",
            SearchField::Date => "Date",
            SearchField::BillNo => "Bill No",
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SearchField::Name),
            "date" => Ok(SearchField::Date),
            "bill_no" => Ok(SearchField::BillNo),
            other => Err(TypeConstraintError::InvalidValue(other.to_string())),
        }
    }
}

/// Allowed page sizes of the bill list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "usize")]
pub enum PerPage {
    #[default]
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl PerPage {
    pub const ALL: [PerPage; 4] = [PerPage::Ten, PerPage::Twenty, PerPage::Fifty, PerPage::Hundred];

    pub const fn get(self) -> usize {
        match self {
            PerPage::Ten => 10,
            PerPage::Twenty => 20,
            PerPage::Fifty => 50,
            PerPage::Hundred => 100,
        }
    }

    /// Maps a requested size onto the allowed set, falling back to the default.
    pub fn from_requested(value: Option<usize>) -> Self {
        value
            .and_then(|value| Self::try_from(value).ok())
            .unwrap_or_default()
    }
}

impl TryFrom<usize> for PerPage {
    type Error = TypeConstraintError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|per_page| per_page.get() == value)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("per page {value}")))
    }
}

impl From<PerPage> for usize {
    fn from(value: PerPage) -> Self {
        value.get()
    }
}

/// Non-empty, trimmed and sanitized free text.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Strips markup and whitespace, rejecting blank results.
    ///
    /// The stored text is plain: entities the sanitizer emits are decoded so
    /// templates escape it exactly once.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let sanitized = strip_markup(&value.into());
        let trimmed = sanitized.trim();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn strip_markup(value: &str) -> String {
    let cleaned = ammonia::Builder::default()
        .tags(HashSet::new())
        .clean(value)
        .to_string();
    cleaned
        .replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_number_increments_with_padding() {
        let number = BillNumber::new("007").unwrap();
        assert_eq!(number.next().as_str(), "008");
        assert_eq!(BillNumber::new("099").unwrap().next().as_str(), "100");
        assert_eq!(BillNumber::new("999").unwrap().next().as_str(), "1000");
        assert_eq!(BillNumber::first().as_str(), "001");
    }

    #[test]
    fn stored_bill_numbers_decode_without_validation() {
        let number: BillNumber = serde_json::from_str(r#"" NaN ""#).unwrap();
        assert_eq!(number.as_str(), "NaN");
        assert_eq!(number.next().as_str(), "001");
        assert!(BillNumber::new("NaN").is_err());
    }

    #[test]
    fn bill_number_requires_leading_digit() {
        assert_eq!(
            BillNumber::new("A12"),
            Err(TypeConstraintError::InvalidBillNumber)
        );
        assert_eq!(BillNumber::new("  "), Err(TypeConstraintError::EmptyString));
        assert_eq!(BillNumber::new("12/A").unwrap().next().as_str(), "013");
    }

    #[test]
    fn bill_date_accepts_both_formats() {
        let display = BillDate::parse("05/03/2024").unwrap();
        let input = BillDate::parse("2024-03-05").unwrap();
        assert_eq!(display, input);
        assert_eq!(display.to_string(), "05/03/2024");
        assert_eq!(display.to_input_value(), "2024-03-05");
        assert_eq!(BillDate::parse("31/02/2024"), Err(TypeConstraintError::InvalidDate));
    }

    #[test]
    fn bill_date_serializes_in_display_form() {
        let date = BillDate::parse("2024-12-01").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"01/12/2024\"");
        let parsed: BillDate = serde_json::from_str("\"01/12/2024\"").unwrap();
        assert_eq!(parsed, date);
    }

    #[test]
    fn generated_bill_id_is_timestamp_derived() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let millis = now.and_utc().timestamp_millis();
        let id: i64 = BillId::generate(now).as_str().parse().unwrap();
        assert!((millis..millis + 1000).contains(&id));
    }

    #[test]
    fn per_page_falls_back_to_default() {
        assert_eq!(PerPage::from_requested(Some(50)), PerPage::Fifty);
        assert_eq!(PerPage::from_requested(Some(7)), PerPage::Ten);
        assert_eq!(PerPage::from_requested(None).get(), 10);
    }

    #[test]
    fn non_empty_string_strips_markup_only() {
        assert_eq!(
            NonEmptyString::new(" Shah & Sons ").unwrap().as_str(),
            "Shah & Sons"
        );
        assert_eq!(NonEmptyString::new("<b>Ravi</b>").unwrap().as_str(), "Ravi");
        assert_eq!(NonEmptyString::new("a < b").unwrap().as_str(), "a < b");
        assert_eq!(
            NonEmptyString::new("<script>alert(1)</script>"),
            Err(TypeConstraintError::EmptyString)
        );
    }

    #[test]
    fn search_field_round_trips_through_text() {
        for field in SearchField::ALL {
            assert_eq!(field.as_str().parse::<SearchField>().unwrap(), field);
        }
        assert!("total".parse::<SearchField>().is_err());
    }
}
