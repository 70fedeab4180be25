//! Connectivity snapshot reported to subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Estimated link class, named after the Network Information API values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    SlowTwoG,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl EffectiveType {
    /// Classify a measured round-trip time.
    pub fn from_rtt(rtt: Duration) -> Self {
        match rtt.as_millis() {
            ms if ms >= 2000 => EffectiveType::SlowTwoG,
            ms if ms >= 1400 => EffectiveType::TwoG,
            ms if ms >= 270 => EffectiveType::ThreeG,
            _ => EffectiveType::FourG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EffectiveType::SlowTwoG => "slow-2g",
            EffectiveType::TwoG => "2g",
            EffectiveType::ThreeG => "3g",
            EffectiveType::FourG => "4g",
            EffectiveType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityState {
    pub online: bool,
    pub effective_type: EffectiveType,
    pub downlink_mbps: Option<f64>,
    pub rtt_ms: Option<u64>,
    pub last_checked: DateTime<Utc>,
}

impl ConnectivityState {
    pub fn new(online: bool) -> Self {
        Self {
            online,
            effective_type: EffectiveType::Unknown,
            downlink_mbps: None,
            rtt_ms: None,
            last_checked: Utc::now(),
        }
    }

    /// Equal in everything subscribers care about (ignores `last_checked`).
    pub(crate) fn same_signal(&self, other: &Self) -> bool {
        self.online == other.online
            && self.effective_type == other.effective_type
            && self.downlink_mbps == other.downlink_mbps
            && self.rtt_ms == other.rtt_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_type_thresholds() {
        assert_eq!(EffectiveType::from_rtt(Duration::from_millis(50)), EffectiveType::FourG);
        assert_eq!(EffectiveType::from_rtt(Duration::from_millis(270)), EffectiveType::ThreeG);
        assert_eq!(EffectiveType::from_rtt(Duration::from_millis(1400)), EffectiveType::TwoG);
        assert_eq!(EffectiveType::from_rtt(Duration::from_secs(3)), EffectiveType::SlowTwoG);
    }

    #[test]
    fn same_signal_ignores_last_checked() {
        let a = ConnectivityState::new(true);
        let mut b = a.clone();
        b.last_checked = a.last_checked + chrono::Duration::seconds(30);
        assert!(a.same_signal(&b));
        b.rtt_ms = Some(10);
        assert!(!a.same_signal(&b));
    }
}
