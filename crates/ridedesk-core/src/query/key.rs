// ── Cache keys and filters ──

use std::fmt;

/// Composite cache key: a resource tag plus named parameters.
///
/// Renders as `tag` or `tag:name=value,name=value`. Parameters are kept
/// sorted by name so two keys built in different orders compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    tag: String,
    params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            params: Vec::new(),
        }
    }

    /// Add or replace a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        let name = name.into();
        let value = value.to_string();
        match self.params.binary_search_by(|(n, _)| n.as_str().cmp(&name)) {
            Ok(i) => self.params[i].1 = value,
            Err(i) => self.params.insert(i, (name, value)),
        }
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { ':' } else { ',' };
            write!(f, "{sep}{name}={value}")?;
        }
        Ok(())
    }
}

/// Selects cache entries for invalidate / cancel / remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyFilter {
    /// Every entry.
    All,
    /// Every entry with this tag, whatever its parameters.
    Resource(String),
    /// Exactly one key.
    Exact(QueryKey),
}

impl KeyFilter {
    pub fn resource(tag: impl Into<String>) -> Self {
        Self::Resource(tag.into())
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        match self {
            Self::All => true,
            Self::Resource(tag) => key.tag == *tag,
            Self::Exact(k) => k == key,
        }
    }
}

impl From<QueryKey> for KeyFilter {
    fn from(key: QueryKey) -> Self {
        Self::Exact(key)
    }
}

impl From<&QueryKey> for KeyFilter {
    fn from(key: &QueryKey) -> Self {
        Self::Exact(key.clone())
    }
}

impl fmt::Display for KeyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Resource(tag) => write!(f, "{tag}:*"),
            Self::Exact(key) => key.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tag_and_params() {
        assert_eq!(QueryKey::new("dashboardStats").to_string(), "dashboardStats");
        assert_eq!(
            QueryKey::new("drivers").with("page", 2).to_string(),
            "drivers:page=2"
        );
        assert_eq!(
            QueryKey::new("x").with("b", 1).with("a", 2).to_string(),
            "x:a=2,b=1"
        );
    }

    #[test]
    fn param_order_does_not_matter() {
        let a = QueryKey::new("x").with("a", 1).with("b", 2);
        let b = QueryKey::new("x").with("b", 2).with("a", 1);
        assert_eq!(a, b);
        assert_eq!(a.param("b"), Some("2"));
    }

    #[test]
    fn with_replaces_existing_param() {
        let key = QueryKey::new("drivers").with("page", 1).with("page", 3);
        assert_eq!(key.param("page"), Some("3"));
        assert_eq!(key.params().count(), 1);
    }

    #[test]
    fn resource_filter_matches_every_page() {
        let filter = KeyFilter::resource("drivers");
        assert!(filter.matches(&QueryKey::new("drivers").with("page", 1)));
        assert!(filter.matches(&QueryKey::new("drivers").with("page", 9)));
        assert!(!filter.matches(&QueryKey::new("driver").with("id", "d1")));
        assert!(KeyFilter::All.matches(&QueryKey::new("anything")));
    }

    #[test]
    fn exact_filter_matches_one_key() {
        let key = QueryKey::new("drivers").with("page", 1);
        let filter = KeyFilter::from(&key);
        assert!(filter.matches(&key));
        assert!(!filter.matches(&QueryKey::new("drivers").with("page", 2)));
    }
}
