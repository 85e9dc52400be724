use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default traded size attached to a tick when the source carries none.
pub const DEFAULT_EVENT_SIZE: f64 = 1.0;

/// One price observation for one symbol at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
    #[serde(default = "default_size")]
    pub size: f64,
}

fn default_size() -> f64 {
    DEFAULT_EVENT_SIZE
}

impl MarketEvent {
    pub fn new(timestamp: DateTime<Utc>, symbol: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            price,
            size: DEFAULT_EVENT_SIZE,
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Replay ordering: timestamp first, then symbol name.
    pub fn replay_cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.symbol.cmp(&other.symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_event_has_unit_size() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        let ev = MarketEvent::new(ts, "AAA", 101.5);
        assert_eq!(ev.size, 1.0);
        assert_eq!(ev.with_size(25.0).size, 25.0);
    }

    #[test]
    fn replay_cmp_breaks_ties_by_symbol() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        let a = MarketEvent::new(ts, "AAA", 1.0);
        let b = MarketEvent::new(ts, "BBB", 1.0);
        let later = MarketEvent::new(ts + chrono::Duration::minutes(1), "AAA", 1.0);
        assert_eq!(a.replay_cmp(&b), Ordering::Less);
        assert_eq!(b.replay_cmp(&later), Ordering::Less);
    }

    #[test]
    fn missing_size_deserializes_to_default() {
        let json = r#"{"timestamp":"2024-01-02T09:30:00Z","symbol":"AAA","price":10.0}"#;
        let ev: MarketEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.size, DEFAULT_EVENT_SIZE);
    }
}
