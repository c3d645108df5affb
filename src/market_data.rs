use crate::base::QuoteTable;
use crate::error::Result;

pub mod api_parser;
pub mod reader;

pub use api_parser::parse_markets;
pub use reader::{MarketDataLive, MarketDataSimJson};

pub const COINGECKO_MARKETS_ADDRESS: &str = "https://api.coingecko.com/api/v3/coins/markets";
pub const DEFAULT_PER_PAGE: u32 = 50;
/// Largest page the markets endpoint will serve.
pub const MAX_PER_PAGE: u32 = 250;

/// Anything that can produce one snapshot of quotes per call.
pub trait QuoteSource {
    fn fetch(&mut self) -> Result<QuoteTable>;
}

impl<S: QuoteSource + ?Sized> QuoteSource for Box<S> {
    fn fetch(&mut self) -> Result<QuoteTable> {
        (**self).fetch()
    }
}

/// Query for the provider's markets listing
#[derive(Clone, Debug, PartialEq)]
pub struct MarketsRequest {
    pub endpoint: String,
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
}

impl Default for MarketsRequest {
    fn default() -> Self {
        MarketsRequest {
            endpoint: COINGECKO_MARKETS_ADDRESS.to_owned(),
            vs_currency: "usd".to_owned(),
            order: "market_cap_desc".to_owned(),
            per_page: DEFAULT_PER_PAGE,
            page: 1,
            sparkline: false,
        }
    }
}

impl MarketsRequest {
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_owned();
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", self.vs_currency.clone()),
            ("order", self.order.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", self.sparkline.to_string()),
        ]
    }
}
