//! Series identity: trading pair plus timeframe

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Candle intervals served by the history endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timeframe {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    OneWeek,
    TwoWeeks,
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 12] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::ThreeHours,
        Timeframe::SixHours,
        Timeframe::TwelveHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::TwoWeeks,
        Timeframe::OneMonth,
    ];

    /// Interval code as used in the endpoint path and the `timeframe` tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::ThreeHours => "3h",
            Timeframe::SixHours => "6h",
            Timeframe::TwelveHours => "12h",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "7D",
            Timeframe::TwoWeeks => "14D",
            Timeframe::OneMonth => "1M",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported timeframe '{0}'")]
pub struct UnknownTimeframe(pub String);

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    // Codes are case sensitive: "1m" is a minute, "1M" a month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == code)
            .ok_or_else(|| UnknownTimeframe(s.to_string()))
    }
}

/// Identity of one logical time series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// Exchange symbol (e.g., "tBTCUSD")
    pub pair: String,
    /// Candle interval
    pub timeframe: Timeframe,
}

impl SeriesKey {
    pub fn new(pair: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            pair: pair.into(),
            timeframe,
        }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.pair, self.timeframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_codes_round_trip() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>(), Ok(tf));
        }
    }

    #[test]
    fn test_timeframe_is_case_sensitive() {
        assert_eq!("1m".parse::<Timeframe>(), Ok(Timeframe::OneMinute));
        assert_eq!("1M".parse::<Timeframe>(), Ok(Timeframe::OneMonth));
        assert_eq!("1d".parse::<Timeframe>(), Err(UnknownTimeframe("1d".to_string())));
    }

    #[test]
    fn test_series_key_display() {
        let key = SeriesKey::new("tBTCUSD", Timeframe::TwoWeeks);
        assert_eq!(key.to_string(), "tBTCUSD - 14D");
    }
}
