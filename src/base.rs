use std::fmt;

/// One market asset at one point in time.
///
/// Numeric fields are optional because the provider sends `null` for assets
/// it has no market cap, volume or 24h change for.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetQuote {
    pub name: String,
    pub symbol: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

impl AssetQuote {
    pub fn new(name: &str, symbol: &str, current_price: f64, market_cap: f64,
               total_volume: f64, price_change_percentage_24h: f64) -> Self {
        AssetQuote {
            name: name.to_owned(),
            symbol: symbol.to_owned(),
            current_price: Some(current_price),
            market_cap: Some(market_cap),
            total_volume: Some(total_volume),
            price_change_percentage_24h: Some(price_change_percentage_24h),
        }
    }
}

impl fmt::Display for AssetQuote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol.to_uppercase())?;
        if let Some(price) = self.current_price {
            write!(f, " ${:.2}", price)?;
        }
        Ok(())
    }
}

/// Quotes in provider order, i.e. descending market cap. Never re-sorted locally.
pub type QuoteTable = Vec<AssetQuote>;

const ROUNDING_SCALE: f64 = 100.0;

/// Rounds to 2 decimal places, exact halves to even.
///
/// The value is scaled by 100 first, so a price stored as 50000.00499..
/// scales to exactly 5000000.5 and lands on 50000.0. Values too large to
/// carry a fractional cent are returned unchanged, as are NaN and infinities.
pub fn round_cents(val: f64) -> f64 {
    let scaled = val * ROUNDING_SCALE;
    if !scaled.is_finite() || scaled.abs() >= (1u64 << f64::MANTISSA_DIGITS) as f64 {
        return val;
    }
    scaled.round_ties_even() / ROUNDING_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_cents(1.125), 1.12);
        assert_eq!(round_cents(1.375), 1.38);
        assert_eq!(round_cents(50000.125), 50000.12);
        assert_eq!(round_cents(-2.125), -2.12);
        assert_eq!(round_cents(0.004), 0.0);
        assert_eq!(round_cents(-0.375), -0.38);
        assert_eq!(round_cents(2.6789), 2.68);
    }

    #[test]
    fn test_round_applies_to_scaled_value() {
        assert_eq!(round_cents(50000.005), 50000.0);
        assert_eq!(round_cents(50000.0051), 50000.01);
    }

    #[test]
    fn test_round_keeps_two_places() {
        for val in [0.0, 1.0, 3.14159, 64123.456789, -12.3456, 0.000012, 1.5e12] {
            let rounded = round_cents(val);
            let cents = rounded * ROUNDING_SCALE;
            assert!((cents - cents.round()).abs() < 1e-6, "{} -> {}", val, rounded);
            assert!((rounded - val).abs() <= 0.005 + 1e-9);
        }
    }

    #[test]
    fn test_round_extreme_magnitudes() {
        assert_eq!(round_cents(1e300), 1e300);
        assert_eq!(round_cents(f64::MAX), f64::MAX);
        assert!(round_cents(f64::NAN).is_nan());
        assert_eq!(round_cents(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_display() {
        let quote = AssetQuote::new("Bitcoin", "btc", 64000.5, 1.2e12, 3.4e10, 1.5);
        assert_eq!(quote.to_string(), "Bitcoin (BTC) $64000.50");
    }
}
