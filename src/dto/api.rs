//! Wire shapes of the bill store REST API.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::bill::Bill;

/// One page of the bill collection.
///
/// Paged response envelope of `GET /bills`; the bill desk only
/// relies on `data` and `pages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BillPage {
    #[serde(default)]
    pub first: usize,
    #[serde(default)]
    pub prev: Option<usize>,
    #[serde(default)]
    pub next: Option<usize>,
    #[serde(default)]
    pub last: usize,
    #[serde(default)]
    pub pages: usize,
    /// Number of bills matching the query across all pages.
    #[serde(default)]
    pub items: usize,
    /// Rows that do not decode as a [`Bill`] are logged and skipped.
    #[serde(deserialize_with = "decode_rows")]
    pub data: Vec<Bill>,
}

fn decode_rows<'de, D>(deserializer: D) -> Result<Vec<Bill>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Bill>(row) {
            Ok(bill) => Some(bill),
            Err(e) => {
                log::warn!("Skipping unreadable bill record: {e}");
                None
            }
        })
        .collect())
}

impl BillPage {
    pub fn new(data: Vec<Bill>, total_items: usize, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let pages = total_items.div_ceil(per_page.max(1));

        Self {
            first: 1,
            prev: (page > 1).then(|| page - 1),
            next: (page < pages).then(|| page + 1),
            last: pages.max(1),
            pages,
            items: total_items,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_links_follow_totals() {
        let page = BillPage::new(vec![], 45, 2, 10);
        assert_eq!(page.pages, 5);
        assert_eq!(page.prev, Some(1));
        assert_eq!(page.next, Some(3));
        assert_eq!(page.last, 5);

        let empty = BillPage::new(vec![], 0, 1, 10);
        assert_eq!(empty.pages, 0);
        assert_eq!(empty.next, None);
        assert_eq!(empty.prev, None);
    }

    #[test]
    fn decodes_minimal_response() {
        let page: BillPage = serde_json::from_str(r#"{"data": [], "pages": 3}"#).unwrap();
        assert_eq!(page.pages, 3);
        assert!(page.data.is_empty());
    }

    #[test]
    fn unreadable_rows_do_not_fail_the_page() {
        let page: BillPage = serde_json::from_str(
            r#"{
                "pages": 1,
                "items": 3,
                "data": [
                    {
                        "id": "1717000000123",
                        "bill_no": "001",
                        "name": "Patel Traders",
                        "date": "29/05/2024",
                        "bill_data": [{"id": 0, "particular": "Jar", "qty": "2", "rate": "20", "ammount": null}],
                        "total": null,
                        "created_at": "1717000000123",
                        "updated_at": "1717000000123"
                    },
                    {
                        "id": "1717000000999",
                        "bill_no": "NaN",
                        "name": "",
                        "date": "",
                        "bill_data": [],
                        "total": 0,
                        "created_at": 1717000000999,
                        "updated_at": 1717000000999
                    },
                    {"bill_no": "003", "name": "No id"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(page.items, 3);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].name, "Patel Traders");
        assert_eq!(page.data[0].total, 0);
        assert_eq!(page.data[0].bill_data[0].amount, 0);
        assert_eq!(page.data[1].bill_no.as_str(), "NaN");
        assert_eq!(page.data[1].date, None);
    }
}
