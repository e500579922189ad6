// ABOUTME: Backoff schedule for object storage requests.
// ABOUTME: Each delay is one retry; the default waits 1s, 3s, then 8s.

use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_delays", deserialize_with = "deserialize_delays")]
    pub delays: Vec<Duration>,
}

pub(crate) fn default_delays() -> Vec<Duration> {
    vec![
        Duration::from_secs(1),
        Duration::from_secs(3),
        Duration::from_secs(8),
    ]
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            delays: default_delays(),
        }
    }
}

fn deserialize_delays<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<humantime_serde::Serde<Duration>> = Vec::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.into_inner()).collect())
}
