use serde::Serialize;
use std::fmt;

/// Trade direction as it appeared in the source export.
///
/// Unknown values are kept verbatim so the engine can accrue the fee
/// before rejecting the trade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
    Other(String),
}

impl Side {
    /// Exact, case-sensitive match on `BUY` / `SELL`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            other => Side::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
            Side::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for Side {
    fn from(raw: &str) -> Self {
        Side::parse(raw)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single trade record (the accounting atom).
///
/// quantity is in asset units and expected > 0.
/// price is the unit price in quote currency; it is not validated.
/// fee is added to the fee total unconditionally.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trade {
    pub trade_id: u64,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub fee: f64,
}

impl Trade {
    pub fn new<S: Into<Side>>(trade_id: u64, side: S, quantity: f64, price: f64, fee: f64) -> Self {
        Self {
            trade_id,
            side: side.into(),
            quantity,
            price,
            fee,
        }
    }

    pub fn buy(trade_id: u64, quantity: f64, price: f64, fee: f64) -> Self {
        Self::new(trade_id, Side::Buy, quantity, price, fee)
    }

    pub fn sell(trade_id: u64, quantity: f64, price: f64, fee: f64) -> Self {
        Self::new(trade_id, Side::Sell, quantity, price, fee)
    }
}

/// An open BUY lot. `unit_price` is fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Lot {
    pub remaining_quantity: f64,
    pub unit_price: f64,
}

impl Lot {
    pub fn new(quantity: f64, unit_price: f64) -> Self {
        debug_assert!(quantity > 0.0, "Lot quantity must be > 0");
        Self {
            remaining_quantity: quantity,
            unit_price,
        }
    }
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.remaining_quantity, self.unit_price)
    }
}

/// Running accumulators of a trade stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
    pub gain: f64,
    pub fees: f64,
}

impl Totals {
    /// Round both figures for display. The accumulators themselves are never rounded.
    pub fn rounded(&self, decimals: u32) -> Totals {
        let scale = 10f64.powi(decimals as i32);
        Totals {
            gain: (self.gain * scale).round() / scale,
            fees: (self.fees * scale).round() / scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parse_is_exact() {
        assert_eq!(Side::parse("BUY"), Side::Buy);
        assert_eq!(Side::parse("SELL"), Side::Sell);
        assert_eq!(Side::parse("buy"), Side::Other("buy".to_string()));
        assert_eq!(Side::parse("HOLD"), Side::Other("HOLD".to_string()));
    }

    #[test]
    fn other_side_displays_verbatim() {
        assert_eq!(Side::parse("HOLD").to_string(), "HOLD");
    }

    #[test]
    fn totals_rounding_is_presentation_only() {
        let t = Totals {
            gain: 219.996,
            fees: 1.234,
        };
        let r = t.rounded(2);
        assert_eq!(r.gain, 220.0);
        assert_eq!(r.fees, 1.23);
        assert_eq!(t.gain, 219.996);
    }
}
