//! Query strings and `Link` header pagination.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use reqwest::header::{HeaderMap, LINK};

use crate::error::{Error, Result};

/// Ordered query parameters.
///
/// Keys keep their insertion order so generated URLs are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `key` to `value`, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder form of [`QueryParams::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Look up the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `?k1=v1&k2=v2`, percent-encoding keys and values.
    ///
    /// Returns an empty string when there are no parameters.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let pairs: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();

        format!("?{}", pairs.join("&"))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Relation types GitHub advertises in the `Link` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRelation {
    /// The immediate next page.
    Next,
    /// The immediate previous page.
    Prev,
    /// The first page.
    First,
    /// The last page.
    Last,
}

impl LinkRelation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Prev => "prev",
            Self::First => "first",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkRelation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(Error::InvalidArgument(format!(
                "unknown link relation: {other}"
            ))),
        }
    }
}

/// A single entry of a `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target URL, without the surrounding angle brackets.
    pub url: String,
    /// Values of the `rel` parameter (space separated in the header).
    pub relations: Vec<String>,
}

/// Parse a `Link` header value such as
/// `<https://api.github.com/x?page=2>; rel="next", <...?page=5>; rel="last"`.
///
/// Commas and semicolons inside `<...>` belong to the target URL. Malformed
/// entries are skipped.
#[must_use]
pub fn parse_link_header(value: &str) -> Vec<Link> {
    split_entries(value)
        .into_iter()
        .filter_map(|entry| {
            let (url, params) = entry.trim().strip_prefix('<')?.split_once('>')?;

            let relations = params
                .split(';')
                .filter_map(|param| {
                    let (name, value) = param.split_once('=')?;
                    name.trim()
                        .eq_ignore_ascii_case("rel")
                        .then(|| value.trim().trim_matches('"').to_string())
                })
                .flat_map(|rels| {
                    rels.split_whitespace()
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .collect();

            Some(Link {
                url: url.to_string(),
                relations,
            })
        })
        .collect()
}

/// Split a header value on the commas separating its entries.
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_target = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            '<' => in_target = true,
            '>' => in_target = false,
            ',' if !in_target => {
                entries.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);

    entries
}

/// Find the link for `relation` across every `Link` header in `headers`.
#[must_use]
pub fn find_link(headers: &HeaderMap, relation: LinkRelation) -> Option<Link> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_link_header)
        .find(|link| link.relations.iter().any(|r| r == relation.as_str()))
}

/// The `page` query parameter of the link for `relation`, if any.
///
/// A missing `Link` header and a header without `relation` both yield `None`.
#[must_use]
pub fn page_from_headers(headers: &HeaderMap, relation: LinkRelation) -> Option<String> {
    let link = find_link(headers, relation)?;

    let url = match Url::parse(&link.url) {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(url = %link.url, %relation, error = %err, "ignoring malformed link target");
            return None;
        }
    };

    url.query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.into_owned())
}
