//! Fixed in-memory listing provider.
//!
//! Serves a table supplied up front: offline runs, fixtures, or seeding a
//! universe no upstream covers.

use async_trait::async_trait;

use crate::errors::ResolverError;
use crate::models::Market;
use crate::provider::{ListingProvider, ListingTable};

pub struct StaticListingProvider {
    id: &'static str,
    universe: Market,
    priority: u8,
    table: ListingTable,
}

impl StaticListingProvider {
    pub fn new(id: &'static str, universe: Market, table: ListingTable) -> Self {
        Self {
            id,
            universe,
            priority: 10,
            table,
        }
    }

    /// Convenience constructor from `(code, name)` pairs under
    /// `symbol`/`name` columns.
    pub fn from_pairs(id: &'static str, universe: Market, pairs: &[(&str, &str)]) -> Self {
        let mut table = ListingTable::new(vec!["symbol".to_string(), "name".to_string()]);
        table.rows = pairs
            .iter()
            .map(|(code, name)| vec![code.to_string(), name.to_string()])
            .collect();
        Self::new(id, universe, table)
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl ListingProvider for StaticListingProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn universe(&self) -> Market {
        self.universe
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn fetch_table(&self) -> Result<ListingTable, ResolverError> {
        Ok(self.table.clone())
    }
}
