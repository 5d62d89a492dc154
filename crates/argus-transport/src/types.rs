use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything needed to open one transport connection. The URL scheme
/// picks the implementation (`ws://` / `wss://` today).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectParams {
    /// Endpoint URL, e.g. `ws://127.0.0.1:9222/devtools/browser/<id>`.
    pub url: String,

    /// Bound on the initial connection attempt. Milliseconds on the wire.
    #[serde(with = "serde_duration_ms", default = "default_connect_timeout")]
    pub connection_timeout: Duration,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(20)
}

pub(crate) mod serde_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_timeout_defaults_when_absent() {
        let params: ConnectParams =
            serde_json::from_str(r#"{"url": "ws://127.0.0.1:9222/devtools"}"#).unwrap();
        assert_eq!(params.connection_timeout, Duration::from_secs(20));

        let params: ConnectParams = serde_json::from_str(
            r#"{"url": "ws://127.0.0.1:9222/devtools", "connection_timeout": 1500}"#,
        )
        .unwrap();
        assert_eq!(params.connection_timeout, Duration::from_millis(1500));
    }
}
