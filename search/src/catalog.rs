//! In-memory search service over a fixed option list.

use async_trait::async_trait;
use onboard_types::{SearchService, SelectOption};

/// Answers queries from a fixed list: the empty query returns everything,
/// otherwise options whose label contains the query, ignoring case.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    options: Vec<SelectOption>,
}

impl StaticCatalog {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self { options }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn lookup(&self, query: &str) -> Vec<SelectOption> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.options.clone();
        }
        self.options
            .iter()
            .filter(|o| o.label.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

impl FromIterator<SelectOption> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = SelectOption>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl SearchService for StaticCatalog {
    async fn search(&self, query: &str) -> Vec<SelectOption> {
        self.lookup(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StaticCatalog {
        [
            ("greenwood", "Greenwood Residency"),
            ("lakeview", "Lakeview Apartments"),
            ("palm", "Palm Grove Society"),
        ]
        .into_iter()
        .map(|(v, l)| SelectOption::new(v, l))
        .collect()
    }

    #[test]
    fn empty_query_returns_all_in_order() {
        let values: Vec<String> = catalog().lookup("  ").into_iter().map(|o| o.value).collect();
        assert_eq!(values, vec!["greenwood", "lakeview", "palm"]);
    }

    #[test]
    fn match_ignores_case() {
        let found = catalog().lookup("GROVE");
        assert_eq!(found, vec![SelectOption::new("palm", "Palm Grove Society")]);
    }

    #[tokio::test]
    async fn search_service_matches_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.search("view").await, catalog.lookup("view"));
        assert!(catalog.search("nowhere").await.is_empty());
    }
}
