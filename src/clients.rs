//! Page client registry
//!
//! Tracks the page clients a worker instance knows about. A client starts
//! uncontrolled; a successful activation claims every registered client so
//! caching takes effect from the first launch.

use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Control state of one page client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uncontrolled,
    Controlled,
}

/// Registry of known page clients
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<Uuid, ClientState>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, uncontrolled client
    pub async fn register(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.clients
            .write()
            .await
            .insert(id, ClientState::Uncontrolled);
        id
    }

    /// Take control of every registered client. Returns how many are now
    /// controlled.
    pub async fn claim_all(&self) -> usize {
        let mut clients = self.clients.write().await;
        for state in clients.values_mut() {
            *state = ClientState::Controlled;
        }
        clients.len()
    }

    /// How many registered clients are controlled
    pub async fn controlled_count(&self) -> usize {
        self.clients
            .read()
            .await
            .values()
            .filter(|state| **state == ClientState::Controlled)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
