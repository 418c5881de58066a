//! Line items of a bill and the derivation of their amounts and total.
//!
//! Quantities and rates are kept as the text the user typed so that partially
//! filled rows survive a round trip through the editor. Amounts are always
//! derived from that text with integer semantics: a row that cannot be parsed
//! contributes `0` instead of failing.

use serde::{Deserialize, Serialize};

/// Default text of a freshly added quantity or rate.
const ZERO: &str = "0";

/// One row of a bill.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineItem {
    /// Position id, unique within one editing session.
    pub id: u32,
    #[serde(default)]
    pub particular: String,
    pub qty: String,
    pub rate: String,
    #[serde(
        alias = "ammount",
        default,
        deserialize_with = "crate::domain::lenient::number_or_zero"
    )]
    pub amount: i64,
}

impl LineItem {
    /// Empty row as produced by the "add item" action.
    pub fn blank(id: u32) -> Self {
        Self {
            id,
            particular: String::new(),
            qty: ZERO.to_string(),
            rate: ZERO.to_string(),
            amount: 0,
        }
    }

    /// Rebuilds a row from submitted text, deriving its amount.
    pub fn restore(id: u32, particular: String, qty: &str, rate: String) -> Self {
        let item = Self {
            id,
            particular,
            qty: ZERO.to_string(),
            rate,
            amount: 0,
        };
        recompute_amount(&item, LineItemField::Qty, qty)
    }

    /// `qty × rate` with integer semantics.
    pub fn derived_amount(&self) -> i64 {
        parse_operand(&self.qty).saturating_mul(parse_operand(&self.rate))
    }

    /// The same row with its amount rederived, ignoring the stored one.
    pub fn rederived(self) -> Self {
        Self {
            amount: self.derived_amount(),
            ..self
        }
    }
}

/// Editable columns of a [`LineItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineItemField {
    Particular,
    Qty,
    Rate,
}

/// Integer value of the leading digits of `text`, or `0`.
///
/// Leading whitespace and a single sign are accepted; everything after the
/// first non-digit is ignored, so `"12kg"` is `12` and `"2.5"` is `2`.
pub fn parse_operand(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });

    if negative { -value } else { value }
}

/// Returns `item` with `field` set to `value` and its amount rederived.
///
/// Only quantity and rate changes touch the amount.
pub fn recompute_amount(item: &LineItem, field: LineItemField, value: &str) -> LineItem {
    let mut updated = item.clone();
    match field {
        LineItemField::Particular => {
            updated.particular = value.to_string();
        }
        LineItemField::Qty => {
            updated.amount = parse_operand(value).saturating_mul(parse_operand(&item.rate));
            updated.qty = value.to_string();
        }
        LineItemField::Rate => {
            updated.amount = parse_operand(&item.qty).saturating_mul(parse_operand(value));
            updated.rate = value.to_string();
        }
    }
    updated
}

/// Sum of the amounts of `items`.
pub fn recompute_total(items: &[LineItem]) -> i64 {
    items
        .iter()
        .fold(0i64, |total, item| total.saturating_add(item.amount))
}

/// Id following the largest one in `items`, saturating at `u32::MAX`.
fn first_free_id(items: &[LineItem]) -> u32 {
    items
        .iter()
        .map(|item| item.id.saturating_add(1))
        .max()
        .unwrap_or(0)
}

/// Ordered line items of one editing session together with their total.
///
/// Every mutation ends by recomputing the total, so [`LineItemSet::total`]
/// always equals the sum of the item amounts. Ids are handed out below
/// `u32::MAX`; once the counter reaches it no more rows can be added.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct LineItemSet {
    items: Vec<LineItem>,
    next_id: u32,
    total: i64,
}

impl LineItemSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts stored items, rederiving their amounts. New ids continue after
    /// the largest stored one.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let items: Vec<LineItem> = items.into_iter().map(LineItem::rederived).collect();
        let next_id = first_free_id(&items);
        Self::restore(items, next_id)
    }

    /// Adopts items posted back by the editor together with its id counter.
    pub fn restore(items: Vec<LineItem>, next_id: u32) -> Self {
        let floor = first_free_id(&items);
        let mut set = Self {
            items,
            next_id: next_id.max(floor),
            total: 0,
        };
        set.recompute_total();
        set
    }

    /// Appends a blank row and returns its id, or `None` when the id counter
    /// is exhausted.
    pub fn add_item(&mut self) -> Option<u32> {
        if self.next_id == u32::MAX {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(LineItem::blank(id));
        self.recompute_total();
        Some(id)
    }

    /// Drops the row with `id`. Returns whether a row was removed.
    pub fn remove_item(&mut self, id: u32) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.recompute_total();
        self.items.len() != before
    }

    /// Applies a single field edit to the row with `id`.
    pub fn edit(&mut self, id: u32, field: LineItemField, value: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        *item = recompute_amount(item, field, value);
        self.recompute_total();
        true
    }

    fn recompute_total(&mut self) {
        self.total = recompute_total(&self.items);
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(set: &mut LineItemSet, qty: &str, rate: &str) -> u32 {
        let id = set.add_item().unwrap();
        set.edit(id, LineItemField::Qty, qty);
        set.edit(id, LineItemField::Rate, rate);
        id
    }

    #[test]
    fn parse_operand_uses_integer_prefix() {
        assert_eq!(parse_operand("42"), 42);
        assert_eq!(parse_operand("  7"), 7);
        assert_eq!(parse_operand("12kg"), 12);
        assert_eq!(parse_operand("2.9"), 2);
        assert_eq!(parse_operand("-3"), -3);
        assert_eq!(parse_operand(""), 0);
        assert_eq!(parse_operand("abc"), 0);
        assert_eq!(parse_operand("-"), 0);
    }

    #[test]
    fn qty_change_uses_current_rate() {
        let item = LineItem {
            rate: "50".into(),
            ..LineItem::blank(0)
        };
        let updated = recompute_amount(&item, LineItemField::Qty, "2");
        assert_eq!(updated.qty, "2");
        assert_eq!(updated.amount, 100);
    }

    #[test]
    fn rate_change_uses_current_qty() {
        let item = LineItem {
            qty: "3".into(),
            ..LineItem::blank(0)
        };
        assert_eq!(recompute_amount(&item, LineItemField::Rate, "10").amount, 30);
    }

    #[test]
    fn non_numeric_operand_yields_zero_amount() {
        let item = LineItem {
            qty: "4".into(),
            rate: "25".into(),
            amount: 100,
            ..LineItem::blank(0)
        };
        assert_eq!(recompute_amount(&item, LineItemField::Qty, "four").amount, 0);
        assert_eq!(recompute_amount(&item, LineItemField::Rate, "").amount, 0);
    }

    #[test]
    fn particular_change_keeps_amount() {
        let item = LineItem {
            qty: "2".into(),
            rate: "20".into(),
            amount: 40,
            ..LineItem::blank(0)
        };
        let updated = recompute_amount(&item, LineItemField::Particular, "20L jar");
        assert_eq!(updated.particular, "20L jar");
        assert_eq!(updated.amount, 40);
    }

    #[test]
    fn totals_follow_add_edit_and_remove() {
        let mut set = LineItemSet::new();
        filled(&mut set, "2", "50");
        let second = filled(&mut set, "1", "100");
        filled(&mut set, "3", "10");
        assert_eq!(set.total(), 230);

        assert!(set.remove_item(second));
        assert_eq!(set.total(), 130);
        assert_eq!(set.total(), recompute_total(set.items()));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut set = LineItemSet::new();
        let first = set.add_item().unwrap();
        let second = set.add_item().unwrap();
        set.remove_item(second);
        let third = set.add_item().unwrap();

        assert_eq!(first, 0);
        assert_eq!(third, 2);
        let ids: Vec<u32> = set.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn new_item_has_zero_defaults() {
        let mut set = LineItemSet::new();
        set.add_item();
        let item = &set.items()[0];
        assert_eq!(item.particular, "");
        assert_eq!(item.qty, "0");
        assert_eq!(item.rate, "0");
        assert_eq!(item.amount, 0);
    }

    #[test]
    fn loaded_items_continue_id_sequence() {
        let items = vec![
            LineItem::restore(0, "Jar".into(), "2", "30".into()),
            LineItem::restore(4, "Bottle".into(), "5", "10".into()),
        ];
        let mut set = LineItemSet::from_items(items);
        assert_eq!(set.total(), 110);
        assert_eq!(set.add_item(), Some(5));
    }

    #[test]
    fn loaded_amounts_are_rederived() {
        let stored = LineItem {
            qty: "3".into(),
            rate: "20".into(),
            amount: 999,
            ..LineItem::blank(2)
        };
        let set = LineItemSet::from_items(vec![stored]);
        assert_eq!(set.items()[0].amount, 60);
        assert_eq!(set.total(), 60);
    }

    #[test]
    fn id_counter_stops_before_overflow() {
        let mut set = LineItemSet::restore(vec![], u32::MAX - 1);
        assert_eq!(set.add_item(), Some(u32::MAX - 1));
        assert_eq!(set.add_item(), None);
        assert_eq!(set.items().len(), 1);

        let mut set = LineItemSet::from_items(vec![LineItem::blank(u32::MAX)]);
        assert_eq!(set.next_id(), u32::MAX);
        assert_eq!(set.add_item(), None);
        assert_eq!(set.items().len(), 1);
    }

    #[test]
    fn edits_on_unknown_rows_are_ignored() {
        let mut set = LineItemSet::new();
        filled(&mut set, "1", "5");
        assert!(!set.edit(99, LineItemField::Qty, "10"));
        assert!(!set.remove_item(99));
        assert_eq!(set.total(), 5);
    }

    #[test]
    fn legacy_amount_key_is_accepted() {
        let item: LineItem = serde_json::from_str(
            r#"{"id":1,"particular":"Jar","qty":"2","rate":"20","ammount":40}"#,
        )
        .unwrap();
        assert_eq!(item.amount, 40);

        let item: LineItem =
            serde_json::from_str(r#"{"id":2,"particular":"Jar","qty":"2","rate":"","ammount":null}"#)
                .unwrap();
        assert_eq!(item.amount, 0);
    }

    #[test]
    fn overflowing_rows_saturate() {
        let item = LineItem {
            rate: i64::MAX.to_string(),
            ..LineItem::blank(0)
        };
        assert_eq!(recompute_amount(&item, LineItemField::Qty, "2").amount, i64::MAX);
    }
}
