use serde_json::Value;

use crate::base::{AssetQuote, QuoteTable};
use crate::error::{ParseErrorKind, Result, TrackerError};

type JsonMap = serde_json::map::Map<String, Value>;

fn get_field<'a>(map: &'a JsonMap, field: &str) -> Result<&'a Value> {
    map.get(field).ok_or_else(|| TrackerError::field_unavailable(field))
}

fn get_f64_or_null(map: &JsonMap, field: &str) -> Result<Option<f64>> {
    let value = get_field(map, field)?;
    if value.is_null() {
        return Ok(None);
    }
    value.as_f64()
        .map(Some)
        .ok_or_else(|| TrackerError::field_format(field))
}

fn get_str<'a>(map: &'a JsonMap, field: &str) -> Result<&'a str> {
    get_field(map, field)?.as_str()
        .ok_or_else(|| TrackerError::field_format(field))
}

fn get_string(map: &JsonMap, field: &str) -> Result<String> {
    Ok(get_str(map, field)?.to_owned())
}

fn get_quote(market: &JsonMap) -> Result<AssetQuote> {
    Ok(AssetQuote {
        name: get_string(market, "name")?,
        symbol: get_string(market, "symbol")?,
        current_price: get_f64_or_null(market, "current_price")?,
        market_cap: get_f64_or_null(market, "market_cap")?,
        total_volume: get_f64_or_null(market, "total_volume")?,
        price_change_percentage_24h: get_f64_or_null(market, "price_change_percentage_24h")?,
    })
}

/// Parses a `coins/markets` response body. Order of the payload is kept.
pub fn parse_markets(body: &str) -> Result<QuoteTable> {
    let all_markets = serde_json::from_str::<Value>(body)
        .map_err(|err| TrackerError::Parse(ParseErrorKind::InvalidJson(err.to_string())))?;
    let all_markets = all_markets.as_array()
        .ok_or(TrackerError::Parse(ParseErrorKind::NotAnArray))?;

    let mut quotes = Vec::with_capacity(all_markets.len());
    for market in all_markets {
        let market_map = market.as_object()
            .ok_or_else(|| TrackerError::field_format("markets[] entry"))?;
        quotes.push(get_quote(market_map)?);
    }
    Ok(quotes)
}
