//! External data oracles: price quotes and news headlines. Both are
//! stateless, fallible, and reached over HTTP with bounded timeouts.

pub mod news;
pub mod price;

pub use news::{GoogleNewsFeed, NewsAggregator};
pub use price::{PriceOracle, YahooPriceOracle};
