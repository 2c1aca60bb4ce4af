//! Paging and sorting parameters, and the `Link` header that describes page neighbours.
//!
//! The backend pages collections with `page` (zero-based), `size` and repeated
//! `sort=property,direction` query parameters, and answers with `X-Total-Count` and a
//! `Link` header of the form:
//!
//! ```text
//! </api/states?page=1&size=20>; rel="next",</api/states?page=4&size=20>; rel="last",
//! </api/states?page=0&size=20>; rel="first"
//! ```

use super::Persisted;
use crate::{AdminError, AdminResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// One `sort` parameter, e.g. `id,desc`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (property, direction) = match s.split_once(',') {
            Some((property, direction)) => (property.trim(), direction.trim()),
            None => (s.trim(), "asc"),
        };
        if property.is_empty() {
            return Err(AdminError::InvalidInput(format!("invalid sort: {s}")));
        }
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" | "" => Direction::Asc,
            "desc" => Direction::Desc,
            other => {
                return Err(AdminError::InvalidInput(format!(
                    "invalid sort direction: {other}"
                )))
            }
        };
        Ok(Self {
            property: property.to_string(),
            direction,
        })
    }
}

/// Paging request for a collection query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pageable {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortOrder>,
}

impl Pageable {
    /// First page of `size` items, sorted by ascending id.
    pub fn first(size: u32) -> Self {
        Self {
            page: 0,
            size,
            sort: vec![SortOrder::asc("id")],
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        query.extend(self.sort.iter().map(|s| ("sort".to_string(), s.to_string())));
        query
    }

    /// Read paging parameters from decoded query pairs.
    ///
    /// Returns `Ok(None)` when neither `page` nor `size` is present; unknown keys are
    /// ignored.
    pub fn from_query(pairs: &[(String, String)], default_size: u32) -> AdminResult<Option<Self>> {
        let mut page = None;
        let mut size = None;
        let mut sort = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => page = Some(parse_number("page", value)?),
                "size" => size = Some(parse_number("size", value)?),
                "sort" => sort.push(value.parse()?),
                _ => {}
            }
        }

        if page.is_none() && size.is_none() {
            return Ok(None);
        }

        Ok(Some(Self {
            page: page.unwrap_or(0),
            size: size.filter(|s| *s > 0).unwrap_or(default_size),
            sort,
        }))
    }
}

fn parse_number(name: &str, value: &str) -> AdminResult<u32> {
    value.trim().parse().map_err(|_| AdminError::InvalidParam {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// Page numbers keyed by link relation (`first`, `prev`, `next`, `last`).
pub type Links = BTreeMap<String, u32>;

/// One page of a collection query.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<E> {
    pub items: Vec<Persisted<E>>,
    pub total_count: Option<u64>,
    pub links: Links,
}

impl<E> Default for Page<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: None,
            links: Links::new(),
        }
    }
}

/// Parse a `Link` header into page numbers.
pub fn parse_links(header: &str) -> AdminResult<Links> {
    let invalid = || AdminError::InvalidLinkHeader(header.to_string());

    if header.trim().is_empty() {
        return Err(invalid());
    }

    let mut links = Links::new();
    for part in header.split(',') {
        let (url, rel) = part.split_once(';').ok_or_else(invalid)?;
        let url = url
            .trim()
            .strip_prefix('<')
            .and_then(|u| u.strip_suffix('>'))
            .ok_or_else(invalid)?;
        let rel = rel
            .trim()
            .strip_prefix("rel=")
            .map(|r| r.trim_matches('"'))
            .ok_or_else(invalid)?;

        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        let page = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "page")
            .and_then(|(_, v)| v.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        links.insert(rel.to_string(), page);
    }
    Ok(links)
}

/// Build the `Link` header for `page` of a collection at `base_url`.
pub fn pagination_link_header(base_url: &str, page: u32, size: u32, total: u64) -> String {
    let size_u64 = u64::from(size.max(1));
    let total_pages = total.div_ceil(size_u64);
    let last_page = total_pages.saturating_sub(1);
    let page_u64 = u64::from(page);

    let link = |p: u64, rel: &str| format!("<{base_url}?page={p}&size={size}>; rel=\"{rel}\"");

    let mut parts = Vec::new();
    if page_u64 + 1 < total_pages {
        parts.push(link(page_u64 + 1, "next"));
    }
    if page_u64 > 0 {
        parts.push(link(page_u64 - 1, "prev"));
    }
    parts.push(link(last_page, "last"));
    parts.push(link(0, "first"));
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parses_and_formats() {
        let sort: SortOrder = "id,desc".parse().unwrap();
        assert_eq!(sort, SortOrder::desc("id"));
        assert_eq!(sort.to_string(), "id,desc");

        let sort: SortOrder = "name".parse().unwrap();
        assert_eq!(sort, SortOrder::asc("name"));

        assert!("id,sideways".parse::<SortOrder>().is_err());
        assert!(",asc".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_pageable_query_round_trip() {
        let pageable = Pageable {
            page: 2,
            size: 10,
            sort: vec![SortOrder::desc("date"), SortOrder::asc("id")],
        };
        let query = pageable.to_query();
        assert_eq!(query[0], ("page".to_string(), "2".to_string()));
        assert_eq!(query[3], ("sort".to_string(), "id,asc".to_string()));

        let parsed = Pageable::from_query(&query, 20).unwrap();
        assert_eq!(parsed, Some(pageable));
    }

    #[test]
    fn test_pageable_absent_without_page_or_size() {
        let query = vec![("sort".to_string(), "id,desc".to_string())];
        assert_eq!(Pageable::from_query(&query, 20).unwrap(), None);

        let query = vec![("page".to_string(), "x".to_string())];
        assert!(Pageable::from_query(&query, 20).is_err());
    }

    #[test]
    fn test_link_header_round_trip() {
        let header = pagination_link_header("/api/states", 1, 20, 95);
        let links = parse_links(&header).unwrap();

        assert_eq!(links.get("next"), Some(&2));
        assert_eq!(links.get("prev"), Some(&0));
        assert_eq!(links.get("last"), Some(&4));
        assert_eq!(links.get("first"), Some(&0));
    }

    #[test]
    fn test_link_header_single_page() {
        let links = parse_links(&pagination_link_header("/api/states", 0, 20, 3)).unwrap();
        assert!(!links.contains_key("next"));
        assert!(!links.contains_key("prev"));
        assert_eq!(links.get("last"), Some(&0));

        let links = parse_links(&pagination_link_header("/api/states", 0, 20, 0)).unwrap();
        assert_eq!(links.get("last"), Some(&0));
    }

    #[test]
    fn test_parse_links_rejects_malformed_header() {
        assert!(parse_links("").is_err());
        assert!(parse_links("/api/states?page=1; rel=\"next\"").is_err());
        assert!(parse_links("</api/states?size=1>; rel=\"next\"").is_err());
    }
}
