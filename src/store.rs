// File: ./src/store.rs
// One CRUD + notify surface over the remote table and the local file.
use crate::client::RemoteClient;
use crate::config::RemoteCredentials;
use crate::error::{StoreError, StoreResult};
use crate::model::{Backend, Child, ConnectionMode, StarEvent};
use crate::storage::LocalStorage;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Change callback. May fire redundantly (polling does not diff), so it must
/// be idempotent. Must not call `on_change` from inside the callback.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// A store result tagged with the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub value: T,
    pub backend: Backend,
}

impl<T> Served<T> {
    fn remote(value: T) -> Self {
        Self {
            value,
            backend: Backend::Remote,
        }
    }

    fn local(value: T) -> Self {
        Self {
            value,
            backend: Backend::Local,
        }
    }
}

pub struct EventStore {
    credentials: Option<RemoteCredentials>,
    remote: OnceLock<RemoteClient>,
    local: LocalStorage,
    mode: Mutex<ConnectionMode>,
    last_backend: Mutex<Option<Backend>>,
    listeners: Mutex<Vec<Listener>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    poll_interval: Duration,
}

impl EventStore {
    pub fn new(credentials: Option<RemoteCredentials>, local: LocalStorage) -> Arc<Self> {
        Self::with_poll_interval(credentials, local, POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        credentials: Option<RemoteCredentials>,
        local: LocalStorage,
        poll_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            credentials,
            remote: OnceLock::new(),
            local,
            mode: Mutex::new(ConnectionMode::Initializing),
            last_backend: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            poller: Mutex::new(None),
            poll_interval,
        })
    }

    /// Picks the backend once. Later calls return the mode already chosen.
    ///
    /// Must run inside a tokio runtime: remote mode spawns the poller.
    pub async fn initialize(self: &Arc<Self>) -> ConnectionMode {
        let current = self.mode();
        if current != ConnectionMode::Initializing {
            return current;
        }

        let mode = match self.connect_remote().await {
            Ok(client) => {
                let _ = self.remote.set(client);
                info!("event=store_init mode=remote status=ok");
                ConnectionMode::Remote
            }
            Err(StoreError::ConfigMissing) => {
                info!("event=store_init mode=local reason=not_configured");
                ConnectionMode::Local
            }
            Err(e) => {
                warn!("event=store_init mode=local reason=remote_failed error={e}");
                ConnectionMode::Local
            }
        };

        self.set_mode(mode);
        if mode == ConnectionMode::Remote {
            self.start_polling();
        }
        mode
    }

    async fn connect_remote(&self) -> StoreResult<RemoteClient> {
        let credentials = self.credentials.as_ref().ok_or(StoreError::ConfigMissing)?;
        let client = RemoteClient::new(credentials)?;
        match client.probe().await {
            Ok(()) => Ok(client),
            Err(StoreError::SchemaNotProvisioned(detail)) => {
                info!("event=store_probe status=not_provisioned detail={detail}");
                Ok(client)
            }
            Err(e) => Err(e),
        }
    }

    pub fn mode(&self) -> ConnectionMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_mode(&self, mode: ConnectionMode) {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner()) = mode;
    }

    /// Backend that served the most recent operation, if any.
    pub fn last_backend(&self) -> Option<Backend> {
        *self.last_backend.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn local(&self) -> &LocalStorage {
        &self.local
    }

    fn active_remote(&self) -> Option<&RemoteClient> {
        if self.mode() == ConnectionMode::Remote {
            self.remote.get()
        } else {
            None
        }
    }

    fn record<T>(&self, served: Served<T>) -> Served<T> {
        *self.last_backend.lock().unwrap_or_else(|e| e.into_inner()) = Some(served.backend);
        served
    }

    // --- CHANGE NOTIFICATION ---

    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    pub fn notify_listeners(&self) {
        // Snapshot so callbacks run without the lock held.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for listener in listeners {
            listener();
        }
    }

    fn start_polling(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(store) = weak.upgrade() else { break };
                debug!("event=store_poll");
                store.notify_listeners();
            }
        });

        let mut poller = self.poller.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = poller.replace(handle) {
            old.abort();
        }
    }

    pub fn stop_polling(&self) {
        if let Some(handle) = self.poller.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    // --- CRUD (remote first, local on failure) ---

    /// Reads never notify listeners.
    pub async fn get_events(&self) -> StoreResult<Served<Vec<StarEvent>>> {
        if let Some(remote) = self.active_remote() {
            match remote.list().await {
                Ok(events) => return Ok(self.record(Served::remote(events))),
                Err(e) => warn!("event=remote_fetch status=error fallback=local error={e}"),
            }
        }
        Ok(self.record(Served::local(self.local.load())))
    }

    pub async fn add_event(
        &self,
        child: Child,
        local_date: NaiveDate,
    ) -> StoreResult<Served<StarEvent>> {
        if let Some(remote) = self.active_remote() {
            match remote.insert(child, local_date).await {
                Ok(event) => return Ok(self.mutated(Served::remote(event))),
                Err(e) => warn!("event=remote_insert status=error fallback=local error={e}"),
            }
        }
        let event = self.local.add(child, local_date)?;
        Ok(self.mutated(Served::local(event)))
    }

    pub async fn remove_event(&self, id: i64) -> StoreResult<Served<()>> {
        if let Some(remote) = self.active_remote() {
            match remote.delete(id).await {
                Ok(()) => return Ok(self.mutated(Served::remote(()))),
                Err(e) => warn!("event=remote_delete status=error fallback=local id={id} error={e}"),
            }
        }
        self.local.remove(id)?;
        Ok(self.mutated(Served::local(())))
    }

    pub async fn reset_all(&self) -> StoreResult<Served<()>> {
        if let Some(remote) = self.active_remote() {
            match remote.delete_all().await {
                Ok(()) => return Ok(self.mutated(Served::remote(()))),
                Err(e) => warn!("event=remote_reset status=error fallback=local error={e}"),
            }
        }
        self.local.reset()?;
        Ok(self.mutated(Served::local(())))
    }

    fn mutated<T>(&self, served: Served<T>) -> Served<T> {
        let served = self.record(served);
        debug!("event=store_mutation backend={}", served.backend);
        self.notify_listeners();
        served
    }
}

impl Drop for EventStore {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
