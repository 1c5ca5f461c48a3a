//! Connected WebSocket clients

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::{
    net::SocketAddr,
    sync::atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

/// Identifier handed to a client in `connection_response`
pub type ClientId = Uuid;

/// Media stream a client has started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
}

/// Per-client session data
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub addr: Option<SocketAddr>,
    pub connected_at: DateTime<Utc>,
    pub stream: Option<StreamKind>,
}

/// Registration failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Connection limit of {max} clients reached")]
    Full { max: usize },
}

/// Registry of connected clients
#[derive(Debug)]
pub struct ClientRegistry {
    sessions: DashMap<ClientId, ClientSession>,
    reserved: AtomicUsize,
    max_connections: usize,
}

impl ClientRegistry {
    pub fn new(max_connections: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            reserved: AtomicUsize::new(0),
            max_connections,
        }
    }

    /// Register a new client, failing when the registry is full
    pub fn register(&self, addr: Option<SocketAddr>) -> Result<ClientId, RegistryError> {
        let max = self.max_connections;
        self.reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < max).then_some(count + 1)
            })
            .map_err(|_| RegistryError::Full { max })?;

        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            ClientSession {
                addr,
                connected_at: Utc::now(),
                stream: None,
            },
        );
        Ok(id)
    }

    /// Remove a client; returns its session if it was registered
    pub fn remove(&self, id: &ClientId) -> Option<ClientSession> {
        let (_, session) = self.sessions.remove(id)?;
        self.reserved.fetch_sub(1, Ordering::AcqRel);
        Some(session)
    }

    /// Record the stream a client started; false for unknown clients
    pub fn set_stream(&self, id: &ClientId, stream: StreamKind) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.stream = Some(stream);
                true
            }
            None => false,
        }
    }

    pub fn session(&self, id: &ClientId) -> Option<ClientSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.reserved.load(Ordering::Acquire) >= self.max_connections
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Number of clients currently streaming `kind`
    pub fn streaming(&self, kind: StreamKind) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.stream == Some(kind))
            .count()
    }
}
