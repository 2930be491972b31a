//! # Network Monitor
//!
//! Tracks online/offline status and reports the transitions that should
//! trigger a drain.
//!
//! ## Features
//!
//! - **Connectivity Detection**: an HTTP probe against the ingest host
//! - **Transition Reporting**: only offline → online is a drain trigger
//! - **Real-time Updates**: status published on a watch channel

use reqwest::{Client, Url};
use tokio::sync::watch;

/// Network connectivity status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Online,
    Offline,
}

impl Connectivity {
    pub fn is_online(self) -> bool {
        self == Connectivity::Online
    }

    pub fn label(self) -> &'static str {
        match self {
            Connectivity::Online => "Online",
            Connectivity::Offline => "Offline",
        }
    }
}

impl From<bool> for Connectivity {
    fn from(online: bool) -> Self {
        if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }
}

/// Shared connectivity flag
#[derive(Debug)]
pub struct NetworkMonitor {
    status: watch::Sender<Connectivity>,
}

impl NetworkMonitor {
    /// Start with a known status
    pub fn new(initial: Connectivity) -> Self {
        let (status, _) = watch::channel(initial);
        Self { status }
    }

    pub fn status(&self) -> Connectivity {
        *self.status.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.status().is_online()
    }

    /// Record the current status. Returns `true` only for an offline → online
    /// transition.
    pub fn set_online(&self, online: bool) -> bool {
        let next = Connectivity::from(online);
        let previous = self.status.send_replace(next);
        if previous != next {
            tracing::info!(from = previous.label(), to = next.label(), "Connectivity changed");
        }
        previous == Connectivity::Offline && next == Connectivity::Online
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.status.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(Connectivity::Offline)
    }
}

/// Probe connectivity with a HEAD request. Any HTTP response, whatever its
/// status, means the network path works.
pub async fn probe(client: &Client, url: &Url) -> Connectivity {
    match client.head(url.clone()).send().await {
        Ok(_) => Connectivity::Online,
        Err(e) => {
            tracing::debug!(url = %url, "Connectivity probe failed: {}", e);
            Connectivity::Offline
        }
    }
}
