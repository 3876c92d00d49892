//! Session management.

use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-connection bookkeeping. Owned by the connection task, never shared.
#[derive(Debug)]
pub struct Session {
    /// Unique session ID.
    pub id: String,

    /// Remote address.
    pub remote_addr: SocketAddr,

    /// Client id from the most recent request header.
    client_id: Option<String>,

    request_count: u64,
    created_at: Instant,
    last_activity: Instant,
}

impl Session {
    /// Creates a new session.
    pub fn new(remote_addr: SocketAddr) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4().to_string(),
            remote_addr,
            client_id: None,
            request_count: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn set_client_id(&mut self, client_id: Option<String>) {
        if client_id.is_some() {
            self.client_id = client_id;
        }
    }

    /// Records a handled request and refreshes the activity timestamp.
    pub fn record_request(&mut self) {
        self.request_count += 1;
        self.touch();
    }

    /// Refreshes the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Time since the last read or handled request.
    pub fn idle_duration(&self) -> Duration {
        self.last_activity.elapsed()
    }
}
