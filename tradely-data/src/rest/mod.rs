//! REST client for the backend's `/api` surface: history, generated briefings and analysis,
//! news sentiment, portfolio reports, trade submission and price alerts.
//!
//! Every user-supplied input is validated locally before a request is built.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info};
use url::Url;

use crate::{
    chart::{AnalysisProvider, HistoryProvider},
    error::DataError,
    model::{Bar, NewsItem, PerformanceSummary, Transaction, ValuePoint},
};

/// Generated-text endpoints can take a while to answer.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Direction a price alert triggers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    #[display("above")]
    Above,
    #[display("below")]
    Below,
}

/// `{success, message}` acknowledgement returned by trade and alert endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl Ack {
    /// Treat a rejected request as [`DataError::Api`].
    pub fn into_result(self) -> Result<String, DataError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(DataError::Api(self.message))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoricalResponse {
    Bars(Vec<Bar>),
    Error { error: String },
}

#[derive(Debug, Serialize)]
struct TradeRequest<'a> {
    ticker: &'a str,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct ChartAnalysisRequest<'a> {
    ticker: &'a str,
    prices: &'a [Bar],
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct PriceAlertRequest<'a> {
    ticker: &'a str,
    target_price: f64,
    condition: AlertCondition,
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    analysis: String,
}

#[derive(Debug, Deserialize)]
struct BriefingResponse {
    briefing: String,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    answer: String,
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(api_url: &str) -> Result<Self, DataError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(api_url, http)
    }

    pub fn with_client(api_url: &str, http: Client) -> Result<Self, DataError> {
        let base = Url::parse(api_url)?;
        if base.cannot_be_a_base() {
            return Err(DataError::Config(format!("{api_url}: not a base URL")));
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, DataError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post_json<B, T>(&self, segments: &[&str], body: Option<&B>) -> Result<T, DataError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        debug!(%url, "POST");
        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Historical bars for `symbol`, in the order the backend sent them.
    pub async fn historical(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let symbol = validate_symbol(symbol)?;
        match self.get_json(&["historical", symbol]).await? {
            HistoricalResponse::Bars(bars) => {
                debug!(%symbol, bars = bars.len(), "historical bars received");
                Ok(bars)
            }
            HistoricalResponse::Error { error } => Err(DataError::Api(error)),
        }
    }

    pub async fn chart_analysis(&self, symbol: &str, bars: &[Bar]) -> Result<String, DataError> {
        let ticker = validate_symbol(symbol)?;
        let body = ChartAnalysisRequest { ticker, prices: bars };
        let response: AnalysisResponse = self
            .post_json(&["genai", "chart-analysis"], Some(&body))
            .await?;
        Ok(response.analysis)
    }

    pub async fn portfolio_briefing(&self) -> Result<String, DataError> {
        let response: BriefingResponse = self
            .post_json::<(), _>(&["genai", "portfolio-briefing"], None)
            .await?;
        Ok(response.briefing)
    }

    /// Free-form question about the portfolio or market.
    pub async fn ask(&self, query: &str) -> Result<String, DataError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DataError::Validation("query must not be empty".to_string()));
        }
        let response: AnswerResponse = self
            .post_json(&["genai", "query"], Some(&QueryRequest { query }))
            .await?;
        Ok(response.answer)
    }

    /// Most recent headlines for `symbol` with their sentiment.
    pub async fn news(&self, symbol: &str) -> Result<Vec<NewsItem>, DataError> {
        let symbol = validate_symbol(symbol)?;
        let news: Vec<NewsItem> = self.get_json(&["news", symbol]).await?;
        debug!(%symbol, headlines = news.len(), "news received");
        Ok(news)
    }

    /// Total portfolio value over time, oldest first.
    pub async fn portfolio_history(&self) -> Result<Vec<ValuePoint>, DataError> {
        self.get_json(&["portfolio", "history"]).await
    }

    /// Executed trades, newest first.
    pub async fn transactions(&self) -> Result<Vec<Transaction>, DataError> {
        self.get_json(&["portfolio", "transactions"]).await
    }

    pub async fn performance_summary(&self) -> Result<PerformanceSummary, DataError> {
        self.get_json(&["reports", "performance-summary"]).await
    }

    pub async fn buy(&self, symbol: &str, quantity: u32) -> Result<Ack, DataError> {
        self.trade("buy", symbol, quantity).await
    }

    pub async fn sell(&self, symbol: &str, quantity: u32) -> Result<Ack, DataError> {
        self.trade("sell", symbol, quantity).await
    }

    async fn trade(&self, side: &str, symbol: &str, quantity: u32) -> Result<Ack, DataError> {
        let ticker = validate_symbol(symbol)?;
        if quantity < 1 {
            return Err(DataError::Validation("quantity must be at least 1".to_string()));
        }
        let ack: Ack = self
            .post_json(&[side], Some(&TradeRequest { ticker, quantity }))
            .await?;
        info!(side, %ticker, quantity, success = ack.success, message = %ack.message, "trade submitted");
        Ok(ack)
    }

    pub async fn set_price_alert(
        &self,
        symbol: &str,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<Ack, DataError> {
        let ticker = validate_symbol(symbol)?;
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(DataError::Validation(format!(
                "target price must be a positive number, got {target_price}"
            )));
        }
        let body = PriceAlertRequest {
            ticker,
            target_price,
            condition,
        };
        let ack: Ack = self
            .post_json(&["alerts", "set-price-alert"], Some(&body))
            .await?;
        info!(%ticker, target_price, %condition, success = ack.success, "price alert submitted");
        Ok(ack)
    }
}

#[async_trait]
impl HistoryProvider for ApiClient {
    async fn historical(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        ApiClient::historical(self, symbol).await
    }
}

#[async_trait]
impl AnalysisProvider for ApiClient {
    async fn chart_analysis(&self, symbol: &str, bars: &[Bar]) -> Result<String, DataError> {
        ApiClient::chart_analysis(self, symbol, bars).await
    }
}

fn validate_symbol(symbol: &str) -> Result<&str, DataError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        Err(DataError::Validation("symbol must not be empty".to_string()))
    } else {
        Ok(symbol)
    }
}
