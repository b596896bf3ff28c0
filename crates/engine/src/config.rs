/// Table stakes and limits, snapshotted into every hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub max_seats: usize,
    pub turn_timeout_secs: u64,
    pub token: String,
    pub premium: bool,
}

impl TableConfig {
    /// Validates a creator-supplied configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.small_blind == 0 || self.big_blind < self.small_blind {
            return Err("blinds must satisfy 0 < small <= big".to_string());
        }
        if self.min_buy_in < self.big_blind || self.max_buy_in < self.min_buy_in {
            return Err("buy-in range must cover at least one big blind".to_string());
        }
        if !(MIN_SEATS..=MAX_SEATS).contains(&self.max_seats) {
            return Err(format!("seats must be {}..={}", MIN_SEATS, MAX_SEATS));
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 10,
            big_blind: 20,
            min_buy_in: 400,
            max_buy_in: 4000,
            max_seats: DEFAULT_SEATS,
            turn_timeout_secs: TURN_TIMEOUT_SECS,
            token: "SOL".to_string(),
            premium: false,
        }
    }
}

use gf_core::Chips;
use gf_core::DEFAULT_SEATS;
use gf_core::MAX_SEATS;
use gf_core::MIN_SEATS;
use gf_core::TURN_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        assert!(TableConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_blinds_rejected() {
        let config = TableConfig {
            small_blind: 20,
            big_blind: 10,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn seat_bounds_rejected() {
        let config = TableConfig {
            max_seats: 10,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
