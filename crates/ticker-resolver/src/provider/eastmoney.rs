//! Eastmoney listing provider.
//!
//! Pages through the quote-center `clist` endpoint, which lists every
//! instrument on a board. Only the code (`f12`) and name (`f14`) fields
//! are requested.
//!
//! # Response Format
//!
//! ```text
//! {"rc":0,"data":{"total":5321,"diff":[{"f12":"000001","f14":"平安银行"}, ...]}}
//! ```
//!
//! `data` is `null` once the requested page is past the end.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::ResolverError;
use crate::models::Market;
use crate::provider::headers::eastmoney_headers;
use crate::provider::paging::{effective_page_size, is_last_page};
use crate::provider::{ListingProvider, ListingTable};

const A_SHARE_URL: &str = "https://82.push2.eastmoney.com/api/qt/clist/get";
const HK_URL: &str = "https://72.push2.eastmoney.com/api/qt/clist/get";

/// Public token the quote-center web pages send with every request.
const UT_TOKEN: &str = "bd1d9ddb04089700cf9c27f6f7426281";

/// Shanghai main + STAR, Shenzhen main + ChiNext, Beijing.
const A_SHARE_FILTER: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";

/// Hong Kong main board and GEM.
const HK_FILTER: &str = "m:128 t:3,m:128 t:4,m:128 t:1,m:128 t:2";

/// Guard against an upstream that never reports the end of the list.
const MAX_PAGES: usize = 500;

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which board a provider instance lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EastmoneyBoard {
    AShares,
    HongKong,
}

impl EastmoneyBoard {
    fn url(&self) -> &'static str {
        match self {
            Self::AShares => A_SHARE_URL,
            Self::HongKong => HK_URL,
        }
    }

    fn filter(&self) -> &'static str {
        match self {
            Self::AShares => A_SHARE_FILTER,
            Self::HongKong => HK_FILTER,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClistResponse {
    #[serde(default)]
    data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
struct ClistData {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    diff: Vec<Map<String, Value>>,
}

/// One parsed page of a `clist` response.
#[derive(Debug, Default)]
pub(crate) struct ClistPage {
    pub total: usize,
    pub rows: Vec<Map<String, Value>>,
}

/// Parse a `clist` response body.
pub(crate) fn parse_clist_page(body: &str) -> Result<ClistPage, ResolverError> {
    let response: ClistResponse = serde_json::from_str(body)?;
    Ok(response
        .data
        .map(|data| ClistPage {
            total: data.total,
            rows: data.diff,
        })
        .unwrap_or_default())
}

/// Eastmoney quote-center listing provider.
///
/// # Example
///
/// ```ignore
/// let provider = EastmoneyListingProvider::new(EastmoneyBoard::AShares, 100);
/// let table = provider.fetch_table().await?;
/// ```
pub struct EastmoneyListingProvider {
    client: Client,
    board: EastmoneyBoard,
    page_size: usize,
}

impl EastmoneyListingProvider {
    pub fn new(board: EastmoneyBoard, page_size: usize) -> Self {
        let client = Client::builder()
            .default_headers(eastmoney_headers())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            board,
            page_size: effective_page_size(page_size),
        }
    }

    async fn fetch_page(&self, page: usize) -> Result<ClistPage, ResolverError> {
        let page_param = page.to_string();
        let size_param = self.page_size.to_string();
        let response = self
            .client
            .get(self.board.url())
            .query(&[
                ("pn", page_param.as_str()),
                ("pz", size_param.as_str()),
                ("po", "1"),
                ("np", "1"),
                ("ut", UT_TOKEN),
                ("fltt", "2"),
                ("invt", "2"),
                ("fid", "f12"),
                ("fs", self.board.filter()),
                ("fields", "f12,f14"),
            ])
            .send()
            .await
            .map_err(|e| ResolverError::unavailable(self.id(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolverError::unavailable(
                self.id(),
                format!("HTTP error: {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolverError::unavailable(self.id(), e.to_string()))?;

        parse_clist_page(&body)
            .map_err(|e| ResolverError::unavailable(self.id(), format!("bad page {}: {}", page, e)))
    }
}

#[async_trait]
impl ListingProvider for EastmoneyListingProvider {
    fn id(&self) -> &'static str {
        match self.board {
            EastmoneyBoard::AShares => "EASTMONEY_A",
            EastmoneyBoard::HongKong => "EASTMONEY_HK",
        }
    }

    fn universe(&self) -> Market {
        match self.board {
            EastmoneyBoard::AShares => Market::Domestic,
            EastmoneyBoard::HongKong => Market::Offshore,
        }
    }

    fn priority(&self) -> u8 {
        1
    }

    async fn fetch_table(&self) -> Result<ListingTable, ResolverError> {
        let mut table = ListingTable::default();

        for page in 1..=MAX_PAGES {
            let ClistPage { total, rows } = self.fetch_page(page).await?;
            let page_len = rows.len();
            table.extend_from_json_objects(&rows);

            debug!(
                "{} page {}: {} rows ({} of {})",
                self.id(),
                page,
                page_len,
                table.len(),
                total
            );

            if is_last_page(page_len, self.page_size, table.len(), Some(total)) {
                return Ok(table);
            }
        }

        warn!(
            "{} stopped after {} pages with {} rows",
            self.id(),
            MAX_PAGES,
            table.len()
        );
        Ok(table)
    }
}
