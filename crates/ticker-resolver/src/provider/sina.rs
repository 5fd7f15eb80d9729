//! Sina Finance Hong Kong listing provider.
//!
//! Fallback source for the offshore universe. The market-center endpoint
//! returns a JSON array of objects (`symbol`, `name`, `engname`, prices...)
//! per page, and the literal `null` or `[]` past the last page.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::ResolverError;
use crate::models::Market;
use crate::provider::headers::sina_headers;
use crate::provider::paging::{effective_page_size, is_last_page};
use crate::provider::{ListingProvider, ListingTable};

const HK_STOCKS_URL: &str = "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php/Market_Center.getHKStockData";

const PROVIDER_ID: &str = "SINA_HK";

/// Guard against an upstream that never reports the end of the list.
const MAX_PAGES: usize = 500;

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse one page body. `null` and empty bodies are an empty page.
pub(crate) fn parse_hk_page(body: &str) -> Result<Vec<Map<String, Value>>, ResolverError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Option<Vec<Map<String, Value>>> = serde_json::from_str(trimmed)?;
    Ok(rows.unwrap_or_default())
}

/// Sina market-center provider for Hong Kong listings.
pub struct SinaHkListingProvider {
    client: Client,
    page_size: usize,
}

impl SinaHkListingProvider {
    pub fn new(page_size: usize) -> Self {
        let client = Client::builder()
            .default_headers(sina_headers())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            page_size: effective_page_size(page_size),
        }
    }

    async fn fetch_page(&self, page: usize) -> Result<Vec<Map<String, Value>>, ResolverError> {
        let page_param = page.to_string();
        let size_param = self.page_size.to_string();
        let response = self
            .client
            .get(HK_STOCKS_URL)
            .query(&[
                ("page", page_param.as_str()),
                ("num", size_param.as_str()),
                ("sort", "symbol"),
                ("asc", "1"),
                ("node", "qbgg_hk"),
                ("_s_r_a", "page"),
            ])
            .send()
            .await
            .map_err(|e| ResolverError::unavailable(PROVIDER_ID, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolverError::unavailable(
                PROVIDER_ID,
                format!("HTTP error: {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolverError::unavailable(PROVIDER_ID, e.to_string()))?;

        parse_hk_page(&body).map_err(|e| {
            ResolverError::unavailable(PROVIDER_ID, format!("bad page {}: {}", page, e))
        })
    }
}

#[async_trait]
impl ListingProvider for SinaHkListingProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn universe(&self) -> Market {
        Market::Offshore
    }

    fn priority(&self) -> u8 {
        2
    }

    async fn fetch_table(&self) -> Result<ListingTable, ResolverError> {
        let mut table = ListingTable::default();

        for page in 1..=MAX_PAGES {
            let rows = self.fetch_page(page).await?;
            let page_len = rows.len();
            table.extend_from_json_objects(&rows);
            debug!("{} page {}: {} rows", PROVIDER_ID, page, page_len);

            if is_last_page(page_len, self.page_size, table.len(), None) {
                break;
            }
        }

        Ok(table)
    }
}
