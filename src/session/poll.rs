//! Poll scheduling for agent replies

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How often and for how long to poll a session for the agent's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Delay before each poll
    #[serde(with = "millis")]
    pub interval: Duration,

    /// Give up once this much time has passed since the message was sent
    #[serde(with = "millis")]
    pub max_wait: Duration,

    /// After this many polls, switch to `slow_interval`
    pub slow_after: Option<u32>,

    /// Interval used once `slow_after` polls have been made
    #[serde(with = "opt_millis")]
    pub slow_interval: Option<Duration>,
}

impl Default for PollPolicy {
    /// 1s polls, slowing to 2s after 30 attempts, for up to two minutes
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(120),
            slow_after: Some(30),
            slow_interval: Some(Duration::from_secs(2)),
        }
    }
}

impl PollPolicy {
    /// Fixed-interval polling with no slowdown
    pub fn fixed(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval,
            max_wait,
            slow_after: None,
            slow_interval: None,
        }
    }

    /// Sleep once for `delay`, then read the session a single time
    pub fn fixed_delay(delay: Duration) -> Self {
        Self::fixed(delay, delay)
    }

    /// Replace the overall deadline
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Delay before poll number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match (self.slow_after, self.slow_interval) {
            (Some(after), Some(slow)) if attempt >= after => slow,
            _ => self.interval,
        }
    }

    /// Upper bound on poll calls within `max_wait`
    pub fn max_polls(&self) -> u32 {
        let interval = self.interval.as_millis().max(1);
        let wait = self.max_wait.as_millis();
        wait.div_ceil(interval).min(u32::MAX as u128) as u32
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_slows_down() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(29), Duration::from_secs(1));
        assert_eq!(policy.delay_for(30), Duration::from_secs(2));
    }

    #[test]
    fn test_max_polls_rounds_up() {
        let policy = PollPolicy::fixed(Duration::from_millis(300), Duration::from_secs(1));
        assert_eq!(policy.max_polls(), 4);

        let policy = PollPolicy::fixed_delay(Duration::from_secs(20));
        assert_eq!(policy.max_polls(), 1);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let policy = PollPolicy {
            interval: Duration::from_millis(1500),
            ..Default::default()
        };
        let text = toml::to_string(&policy).unwrap();
        assert!(text.contains("interval = 1500"));
        let back: PollPolicy = toml::from_str(&text).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let policy: PollPolicy = toml::from_str("max_wait = 5000").unwrap();
        assert_eq!(policy.max_wait, Duration::from_secs(5));
        assert_eq!(policy.interval, Duration::from_secs(1));
        assert_eq!(policy.slow_after, Some(30));
        assert_eq!(policy.slow_interval, Some(Duration::from_secs(2)));
    }
}
