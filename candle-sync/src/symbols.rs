//! Pairs and timeframes to track

use crate::data::{SeriesKey, Timeframe};
use async_trait::async_trait;
use tracing::warn;

/// Provider of the tracked pairs and timeframes
#[async_trait]
pub trait SymbolSource: Send + Sync {
    async fn pairs(&self) -> anyhow::Result<Vec<String>>;

    /// Interval codes; unknown codes are skipped by the engine
    async fn timeframes(&self) -> anyhow::Result<Vec<String>>;
}

/// Fixed lists, e.g. from environment variables
#[derive(Debug, Clone, Default)]
pub struct StaticSymbols {
    pairs: Vec<String>,
    timeframes: Vec<String>,
}

impl StaticSymbols {
    pub fn new(pairs: Vec<String>, timeframes: Vec<String>) -> Self {
        Self { pairs, timeframes }
    }

    /// Build from comma separated lists ("tBTCUSD,tETHUSD", "1m,1h")
    pub fn from_lists(pairs: &str, timeframes: &str) -> Self {
        Self::new(parse_list(pairs), parse_list(timeframes))
    }
}

/// Split a comma separated list, dropping blank entries
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl SymbolSource for StaticSymbols {
    async fn pairs(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.pairs.clone())
    }

    async fn timeframes(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.timeframes.clone())
    }
}

/// Cartesian product of pairs and timeframes, pair-major
///
/// Unknown timeframe codes and repeated entries are dropped with a warning.
pub fn series_keys(pairs: &[String], timeframes: &[String]) -> Vec<SeriesKey> {
    let mut parsed: Vec<Timeframe> = Vec::with_capacity(timeframes.len());
    for code in timeframes {
        match code.parse::<Timeframe>() {
            Ok(tf) if parsed.contains(&tf) => warn!("Duplicate timeframe {} ignored", tf),
            Ok(tf) => parsed.push(tf),
            Err(e) => warn!("Skipping {}", e),
        }
    }

    let mut seen_pairs: Vec<&str> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let pair = pair.trim();
        if pair.is_empty() || seen_pairs.contains(&pair) {
            continue;
        }
        seen_pairs.push(pair);
    }

    seen_pairs
        .iter()
        .flat_map(|pair| parsed.iter().map(move |tf| SeriesKey::new(*pair, *tf)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_series_keys_product() {
        let keys = series_keys(
            &strings(&["tBTCUSD", "tIOTUSD", "tLTCBTC"]),
            &strings(&["1m", "15m", "1h"]),
        );
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], SeriesKey::new("tBTCUSD", Timeframe::OneMinute));
        assert_eq!(keys[2], SeriesKey::new("tBTCUSD", Timeframe::OneHour));
        assert_eq!(keys[3], SeriesKey::new("tIOTUSD", Timeframe::OneMinute));
    }

    #[test]
    fn test_series_keys_skips_unknown_and_duplicates() {
        let keys = series_keys(
            &strings(&["tBTCUSD", "tBTCUSD", " "]),
            &strings(&["1h", "2h", "1h"]),
        );
        assert_eq!(keys, vec![SeriesKey::new("tBTCUSD", Timeframe::OneHour)]);
    }

    #[tokio::test]
    async fn test_static_symbols_from_lists() {
        let symbols = StaticSymbols::from_lists("tBTCUSD, tETHUSD,", "1m,1D");
        assert_eq!(symbols.pairs().await.unwrap(), strings(&["tBTCUSD", "tETHUSD"]));
        assert_eq!(symbols.timeframes().await.unwrap(), strings(&["1m", "1D"]));
    }
}
