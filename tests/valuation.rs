//! Valuation engine integration tests against in-process mock oracles:
//! report assembly, per-symbol degradation, timeouts, news markers.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use stockfolio::error::{OracleError, ValuationError};
use stockfolio::oracle::{NewsAggregator, PriceOracle};
use stockfolio::persistence::{buy, create_pool_and_migrate};
use stockfolio::types::valuation::{Headline, NewsDigest, PriceQuote};
use stockfolio::valuation::ValuationEngine;

async fn fresh_store() -> (SqlitePool, TempDir) {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let pool = create_pool_and_migrate(&url).await.unwrap();
    (pool, dir)
}

/// Quotes from a fixed table; symbols not in the table fail.
struct StaticPrices(HashMap<String, f64>);

impl StaticPrices {
    fn of(quotes: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self(
            quotes.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
        ))
    }
}

#[async_trait]
impl PriceOracle for StaticPrices {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, OracleError> {
        match self.0.get(symbol) {
            Some(price) => Ok(PriceQuote {
                price: *price,
                currency: "USD".to_string(),
            }),
            None => Err(OracleError::PriceUnavailable {
                symbol: symbol.to_string(),
                reason: "no quote".to_string(),
            }),
        }
    }
}

/// Hangs on one symbol, answers instantly for the rest.
struct SlowForSymbol {
    slow: String,
    delay: Duration,
    price: f64,
}

#[async_trait]
impl PriceOracle for SlowForSymbol {
    async fn get_price(&self, symbol: &str) -> Result<PriceQuote, OracleError> {
        if symbol == self.slow {
            tokio::time::sleep(self.delay).await;
        }
        Ok(PriceQuote {
            price: self.price,
            currency: "USD".to_string(),
        })
    }
}

/// Canned headlines per symbol; `failing` symbols error out.
struct StaticNews {
    items: HashMap<String, Vec<Headline>>,
    failing: HashSet<String>,
}

impl StaticNews {
    fn empty() -> Arc<Self> {
        Arc::new(Self {
            items: HashMap::new(),
            failing: HashSet::new(),
        })
    }
}

#[async_trait]
impl NewsAggregator for StaticNews {
    async fn get_headlines(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Headline>, OracleError> {
        if self.failing.contains(symbol) {
            return Err(OracleError::FeedUnavailable {
                symbol: symbol.to_string(),
                reason: "feed down".to_string(),
            });
        }
        let mut items = self.items.get(symbol).cloned().unwrap_or_default();
        items.truncate(limit);
        Ok(items)
    }
}

fn headline(title: &str) -> Headline {
    Headline {
        title: title.to_string(),
        link: format!("https://example.com/{title}"),
        published: None,
    }
}

fn engine(
    pool: SqlitePool,
    prices: Arc<dyn PriceOracle>,
    news: Arc<dyn NewsAggregator>,
) -> ValuationEngine {
    ValuationEngine::new(pool, prices, news, Duration::from_secs(1))
}

#[tokio::test]
async fn valuate_empty_portfolio_errors() {
    let (pool, _dir) = fresh_store().await;
    let engine = engine(pool, StaticPrices::of(&[]), StaticNews::empty());

    let err = engine.valuate(1).await.unwrap_err();
    assert!(matches!(err, ValuationError::EmptyPortfolio));
}

#[tokio::test]
async fn valuate_sums_lines_in_snapshot_order() {
    let (pool, _dir) = fresh_store().await;
    buy(&pool, 1, "MSFT", 2.0).await.unwrap();
    buy(&pool, 1, "AAPL", 10.0).await.unwrap();

    let prices = StaticPrices::of(&[("AAPL", 100.5), ("MSFT", 3.0)]);
    let engine = engine(pool, prices, StaticNews::empty());

    let report = engine.valuate(1).await.unwrap();
    assert_eq!(report.lines.len(), 2);
    assert_eq!(report.lines[0].symbol, "AAPL");
    assert_eq!(report.lines[0].unit_price, Some(100.5));
    assert_eq!(report.lines[0].line_value, Some(1005.0));
    assert_eq!(report.lines[1].symbol, "MSFT");
    assert_eq!(report.lines[1].line_value, Some(6.0));
    assert_eq!(report.total_value, 1011.0);
}

#[tokio::test]
async fn failed_price_degrades_one_line_not_the_report() {
    let (pool, _dir) = fresh_store().await;
    buy(&pool, 1, "AAPL", 10.0).await.unwrap();
    buy(&pool, 1, "ZZZZ", 4.0).await.unwrap();

    let prices = StaticPrices::of(&[("AAPL", 100.5)]);
    let engine = engine(pool, prices, StaticNews::empty());

    let report = engine.valuate(1).await.unwrap();
    assert_eq!(report.lines.len(), 2);
    assert_eq!(report.lines[0].line_value, Some(1005.0));
    assert_eq!(report.lines[1].symbol, "ZZZZ");
    assert_eq!(report.lines[1].shares, 4.0);
    assert_eq!(report.lines[1].unit_price, None);
    assert_eq!(report.lines[1].line_value, None);
    assert_eq!(report.total_value, 1005.0);
}

#[tokio::test]
async fn slow_price_times_out_without_blocking_siblings() {
    let (pool, _dir) = fresh_store().await;
    buy(&pool, 1, "AAPL", 1.0).await.unwrap();
    buy(&pool, 1, "MSFT", 1.0).await.unwrap();

    let prices = Arc::new(SlowForSymbol {
        slow: "AAPL".to_string(),
        delay: Duration::from_millis(500),
        price: 10.0,
    });
    let engine = ValuationEngine::new(
        pool,
        prices,
        StaticNews::empty(),
        Duration::from_millis(50),
    );

    let report = engine.valuate(1).await.unwrap();
    assert_eq!(report.lines[0].symbol, "AAPL");
    assert_eq!(report.lines[0].line_value, None);
    assert_eq!(report.lines[1].symbol, "MSFT");
    assert_eq!(report.lines[1].line_value, Some(10.0));
    assert_eq!(report.total_value, 10.0);
}

#[tokio::test]
async fn collect_news_marks_failed_and_empty_feeds() {
    let (pool, _dir) = fresh_store().await;

    let news = Arc::new(StaticNews {
        items: HashMap::from([
            ("AAPL".to_string(), vec![headline("a"), headline("b")]),
            ("MSFT".to_string(), vec![]),
        ]),
        failing: HashSet::from(["TSLA".to_string()]),
    });
    let engine = engine(pool, StaticPrices::of(&[]), news);

    let symbols = ["AAPL", "MSFT", "TSLA"].map(String::from);
    let digests = engine.collect_news(&symbols, 3).await;

    assert_eq!(digests.len(), 3);
    match &digests["AAPL"] {
        NewsDigest::Available(items) => assert_eq!(items.len(), 2),
        NewsDigest::Unavailable => panic!("expected headlines for AAPL"),
    }
    assert_eq!(digests["MSFT"], NewsDigest::Unavailable);
    assert_eq!(digests["TSLA"], NewsDigest::Unavailable);
}

#[tokio::test]
async fn collect_news_respects_limit() {
    let (pool, _dir) = fresh_store().await;

    let news = Arc::new(StaticNews {
        items: HashMap::from([(
            "AAPL".to_string(),
            vec![headline("a"), headline("b"), headline("c")],
        )]),
        failing: HashSet::new(),
    });
    let engine = engine(pool, StaticPrices::of(&[]), news);

    let digests = engine.collect_news(&["AAPL".to_string()], 2).await;
    match &digests["AAPL"] {
        NewsDigest::Available(items) => assert_eq!(items.len(), 2),
        NewsDigest::Unavailable => panic!("expected headlines"),
    }
}

#[tokio::test]
async fn portfolio_news_requires_holdings() {
    let (pool, _dir) = fresh_store().await;
    let engine = engine(pool, StaticPrices::of(&[]), StaticNews::empty());

    let err = engine.portfolio_news(1, 3).await.unwrap_err();
    assert!(matches!(err, ValuationError::EmptyPortfolio));
}

#[tokio::test]
async fn portfolio_news_covers_every_held_symbol() {
    let (pool, _dir) = fresh_store().await;
    buy(&pool, 1, "AAPL", 1.0).await.unwrap();
    buy(&pool, 1, "MSFT", 1.0).await.unwrap();

    let news = Arc::new(StaticNews {
        items: HashMap::from([("AAPL".to_string(), vec![headline("a")])]),
        failing: HashSet::new(),
    });
    let engine = engine(pool, StaticPrices::of(&[]), news);

    let digests = engine.portfolio_news(1, 3).await.unwrap();
    assert_eq!(digests.len(), 2);
    assert!(matches!(digests["AAPL"], NewsDigest::Available(_)));
    assert_eq!(digests["MSFT"], NewsDigest::Unavailable);
}
