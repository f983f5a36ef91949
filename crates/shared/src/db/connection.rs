use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Opens the underlying backend handle. Called at most once per attempt.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Clone + Send + Sync + 'static;
    async fn connect(&self) -> anyhow::Result<Self::Conn>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Connecting,
    Connected,
    Failed,
}

pub type ConnectError = Arc<anyhow::Error>;
type Attempt<T> = Shared<BoxFuture<'static, Result<T, ConnectError>>>;

enum Slot<T> {
    Uninitialized,
    Connecting { id: u64, attempt: Attempt<T> },
    Connected(T),
    Failed,
}

/// Lazily opens one shared backend handle per process.
///
/// Concurrent callers of [`get_connection`](Self::get_connection) await the
/// same in-flight attempt. A failed attempt moves to `Failed` and the next
/// caller starts over.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    slot: Mutex<Slot<C::Conn>>,
    next_attempt: AtomicU64,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self { connector: Arc::new(connector), slot: Mutex::new(Slot::Uninitialized), next_attempt: AtomicU64::new(0) }
    }

    pub fn state(&self) -> ConnectionState {
        match &*self.lock() {
            Slot::Uninitialized => ConnectionState::Uninitialized,
            Slot::Connecting { .. } => ConnectionState::Connecting,
            Slot::Connected(_) => ConnectionState::Connected,
            Slot::Failed => ConnectionState::Failed,
        }
    }

    pub async fn get_connection(&self) -> Result<C::Conn, ConnectError> {
        let (id, attempt) = {
            let mut slot = self.lock();
            let in_flight = match &*slot {
                Slot::Connected(conn) => return Ok(conn.clone()),
                Slot::Connecting { id, attempt } => Some((*id, attempt.clone())),
                Slot::Uninitialized | Slot::Failed => None,
            };
            match in_flight {
                Some(pending) => pending,
                None => {
                    let id = self.next_attempt.fetch_add(1, Ordering::Relaxed);
                    let connector = Arc::clone(&self.connector);
                    let attempt = async move { connector.connect().await.map_err(Arc::new) }
                        .boxed()
                        .shared();
                    tracing::info!(attempt = id, "connecting to persistence backend");
                    *slot = Slot::Connecting { id, attempt: attempt.clone() };
                    (id, attempt)
                }
            }
        };

        let result = attempt.await;

        let mut slot = self.lock();
        if matches!(&*slot, Slot::Connecting { id: current, .. } if *current == id) {
            *slot = match &result {
                Ok(conn) => {
                    tracing::info!(attempt = id, "persistence backend connected");
                    Slot::Connected(conn.clone())
                }
                Err(e) => {
                    tracing::warn!(attempt = id, error = %e, "connection attempt failed");
                    Slot::Failed
                }
            };
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, Slot<C::Conn>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
