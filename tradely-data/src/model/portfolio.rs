use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// A single position as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub shares: f64,
    #[serde(alias = "avg_cost")]
    pub avg_price: f64,
    /// Last price the backend knows for this symbol
    pub market_price: f64,
}

impl Holding {
    pub fn market_value(&self) -> f64 {
        self.shares * self.market_price
    }

    /// Unrealised profit and loss against the average cost.
    pub fn unrealized_pnl(&self) -> f64 {
        (self.market_price - self.avg_price) * self.shares
    }
}

/// Holdings, cash and totals. Replaced wholesale by the hub on every payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub holdings: FnvHashMap<Symbol, Holding>,
    pub cash: f64,
    pub total_value: f64,
    /// Market value of holdings only (excludes cash)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_value: Option<f64>,
}

impl PortfolioSnapshot {
    /// Holdings ordered by market value, largest first.
    pub fn holdings_by_value(&self) -> Vec<(&Symbol, &Holding)> {
        let mut holdings = self.holdings.iter().collect::<Vec<_>>();
        holdings.sort_by(|(a_symbol, a), (b_symbol, b)| {
            b.market_value()
                .total_cmp(&a.market_value())
                .then_with(|| a_symbol.cmp(b_symbol))
        });
        holdings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portfolio_deserializes_backend_shape() {
        let json = r#"{
            "cash": 5000.0,
            "holdings": {
                "AAPL": {"shares": 10, "avg_price": 190.0, "market_price": 210.0},
                "MSFT": {"shares": 2, "avg_price": 400.0, "market_price": 450.0}
            },
            "portfolio_value": 3000.0,
            "total_value": 8000.0
        }"#;

        let portfolio: PortfolioSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(portfolio.holdings.len(), 2);
        assert_eq!(portfolio.portfolio_value, Some(3000.0));

        let aapl = portfolio.holdings.get("AAPL").unwrap();
        assert_eq!(aapl.market_value(), 2100.0);
        assert_eq!(aapl.unrealized_pnl(), 200.0);

        let ordered = portfolio.holdings_by_value();
        assert_eq!(ordered[0].0, "AAPL");
        assert_eq!(ordered[1].0, "MSFT");
    }
}
