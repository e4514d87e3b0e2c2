// List normalization.
//
// The backend answers list endpoints in three different shapes:
//
//   { data: [..], page, totalPages, totalDrivers }
//   { data: { rides: [..], pagination: { current, pages, total } } }
//   { data: { items: [..] } }
//
// and a few (notifications) put the list at the top level. Everything is
// folded into `Page<T>` here so nothing above this crate ever branches on
// the wire shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number this slice belongs to.
    pub page: u32,
    pub total_pages: u32,
    /// Total number of records across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// A single page holding every item.
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            page: 1,
            total_pages: 1,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            total_pages: 1,
            total: 0,
        }
    }
}

// ── Pagination metadata ──────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy)]
struct PageMeta {
    page: Option<u32>,
    pages: Option<u32>,
    total: Option<u64>,
}

impl PageMeta {
    /// Read pagination from an object, preferring a nested `pagination`
    /// block over flat `page` / `totalPages` / `total*` fields.
    fn read(obj: &Value) -> Self {
        if let Some(p) = obj.get("pagination") {
            return Self {
                page: as_u32(p.get("current").or_else(|| p.get("page"))),
                pages: as_u32(p.get("pages").or_else(|| p.get("totalPages"))),
                total: p.get("total").and_then(Value::as_u64),
            };
        }

        let total = obj.get("total").and_then(Value::as_u64).or_else(|| {
            // e.g. `totalDrivers`, `totalUsers`
            obj.as_object().and_then(|map| {
                map.iter()
                    .filter(|(k, _)| k.starts_with("total") && k.as_str() != "totalPages")
                    .find_map(|(_, v)| v.as_u64())
            })
        });

        Self {
            page: as_u32(obj.get("page").or_else(|| obj.get("currentPage"))),
            pages: as_u32(obj.get("totalPages")),
            total,
        }
    }

    fn or(self, other: Self) -> Self {
        Self {
            page: self.page.or(other.page),
            pages: self.pages.or(other.pages),
            total: self.total.or(other.total),
        }
    }
}

fn as_u32(v: Option<&Value>) -> Option<u32> {
    v.and_then(Value::as_u64).and_then(|n| u32::try_from(n).ok())
}

fn take_array(obj: &mut Value, field: &str) -> Option<Vec<Value>> {
    match obj.get_mut(field).map(Value::take) {
        Some(Value::Array(list)) => Some(list),
        _ => None,
    }
}

// ── Normalization ────────────────────────────────────────────────────

/// Fold any of the server's list shapes into a [`Page`].
///
/// `items_field` is the name of the list inside `data` (or at the top
/// level) for the wrapped shapes; `items` is always tried as a fallback.
/// Missing metadata defaults to the requested page, a single page, and the
/// number of items received.
pub(crate) fn normalize_page<T: DeserializeOwned>(
    mut body: Value,
    items_field: &str,
    requested_page: u32,
) -> Result<Page<T>, Error> {
    let top = PageMeta::read(&body);

    let (items, nested) = match body.get_mut("data").map(Value::take) {
        Some(Value::Array(list)) => (Some(list), PageMeta::default()),
        Some(mut data @ Value::Object(_)) => {
            let meta = PageMeta::read(&data);
            let list = take_array(&mut data, items_field).or_else(|| take_array(&mut data, "items"));
            (list, meta)
        }
        _ => (
            take_array(&mut body, items_field).or_else(|| take_array(&mut body, "items")),
            PageMeta::default(),
        ),
    };

    let Some(items) = items else {
        return Err(Error::Deserialization {
            message: format!("list response has no `{items_field}` array"),
            body: body.to_string(),
        });
    };

    let meta = nested.or(top);
    let received = items.len() as u64;
    let items: Vec<T> =
        serde_json::from_value(Value::Array(items)).map_err(|e| Error::Deserialization {
            message: format!("invalid `{items_field}` item: {e}"),
            body: String::new(),
        })?;

    Ok(Page {
        items,
        page: meta.page.unwrap_or(requested_page),
        total_pages: meta.pages.unwrap_or(1),
        total: meta.total.unwrap_or(received),
    })
}
