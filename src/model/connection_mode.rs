use std::time::Duration;

/// How a page stays in sync with the server after it is first fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    #[default]
    Disconnected,
    Poll(u32),
    Stream,
}

impl ConnectionMode {
    /// `stream: true` wins over a poll interval. A zero interval means no polling.
    pub fn new(stream: Option<bool>, poll_seconds: Option<u32>) -> Self {
        if stream == Some(true) {
            return ConnectionMode::Stream;
        }
        match poll_seconds {
            Some(secs) if secs > 0 => ConnectionMode::Poll(secs),
            _ => ConnectionMode::Disconnected,
        }
    }

    pub fn poll_seconds(&self) -> Option<u32> {
        match self {
            ConnectionMode::Poll(secs) => Some(*secs),
            _ => None,
        }
    }

    pub fn stream(&self) -> Option<bool> {
        match self {
            ConnectionMode::Stream => Some(true),
            _ => None,
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_seconds().map(|s| Duration::from_secs(s as u64))
    }
}
