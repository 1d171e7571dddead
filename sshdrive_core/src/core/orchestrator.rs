use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{watch, Mutex, RwLock};

use super::connection_registry::ConnectionRegistry;
use super::drive_pool::DriveLetterPool;
use super::errors::{InvariantViolation, Operation, SyncError, SyncResult};
use super::key_guard::{KeyedGuard, OperationKey};
use super::mount_registry::MountRegistry;
use super::projector::{project, ConnectionView};
use super::signals::{ErrorChannel, LoadingFlag};
use crate::model::{ConnectionProfile, DriveLetter, MountStatus, PrerequisiteState};
use crate::service::MountService;

/// Everything cached from the service.
#[derive(Debug, Default)]
struct SyncState {
    prerequisites: Option<PrerequisiteState>,
    connections: ConnectionRegistry,
    mounts: MountRegistry,
    pool: DriveLetterPool,
}

impl SyncState {
    fn views(&self) -> Vec<ConnectionView> {
        project(self.connections.profiles(), self.mounts.mounts())
    }
}

struct Inner<S> {
    service: S,
    state: Mutex<SyncState>,
    // mutations hold it shared from their remote call to their commit,
    // refresh holds it exclusively
    barrier: RwLock<()>,
    pending: KeyedGuard,
    errors: ErrorChannel,
    loading: LoadingFlag,
    views: watch::Sender<Vec<ConnectionView>>,
}

/// Keeps the local cache of connections, mounts and free drive letters in
/// step with a [`MountService`].
///
/// Every mutation is confirm-then-commit: the service is called first and
/// the cache changes only once it has agreed. Failures land in the
/// [`ErrorChannel`] and are also returned to the caller.
///
/// Cloning is cheap; all clones share one cache. Mutations on the same
/// drive letter or connection are serialized, unrelated ones overlap. A
/// refresh waits for in-flight mutations and holds new ones back until it
/// has committed.
pub struct SyncOrchestrator<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for SyncOrchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: MountService> SyncOrchestrator<S> {
    /// Starts with an empty cache; call [`refresh`](Self::refresh) to fill it.
    pub fn new(service: S) -> Self {
        let (views, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                service,
                state: Mutex::new(SyncState::default()),
                barrier: RwLock::new(()),
                pending: KeyedGuard::new(),
                errors: ErrorChannel::new(),
                loading: LoadingFlag::new(),
                views,
            }),
        }
    }

    pub fn service(&self) -> &S {
        &self.inner.service
    }

    pub fn errors(&self) -> &ErrorChannel {
        &self.inner.errors
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.inner.loading
    }

    /// Receives a fresh projection after every commit that touches
    /// connections or mounts.
    pub fn subscribe_views(&self) -> watch::Receiver<Vec<ConnectionView>> {
        self.inner.views.subscribe()
    }

    /// Re-reads prerequisites, connections, mounts and free letters from the
    /// service, all at once. Either all four are replaced or none is.
    pub async fn refresh(&self) -> SyncResult<()> {
        let _loading = self.inner.loading.begin();
        let _barrier = self.inner.barrier.write().await;
        let service = &self.inner.service;

        let fetched = tokio::try_join!(
            service.check_prerequisites(),
            service.get_connections(),
            service.get_mounted_drives(),
            service.get_available_drive_letters(),
        );
        let (prerequisites, profiles, statuses, letters) = match fetched {
            Ok(fetched) => fetched,
            Err(cause) => return self.fail(SyncError::SyncFailed { cause }),
        };
        debug!(
            "Fetched {} connections, {} mounts, {} free letters",
            profiles.len(),
            statuses.len(),
            letters.len()
        );

        // stage everything so a bad snapshot leaves the cache alone
        let mut connections = ConnectionRegistry::new();
        let mut mounts = MountRegistry::new();
        if let Err(violation) = connections
            .load(profiles)
            .and_then(|_| mounts.load(statuses))
        {
            return self.fail(violation.into());
        }
        let mut pool = DriveLetterPool::new();
        pool.load(letters);
        for letter in mounts.connected_letters() {
            if pool.reserve(letter) {
                warn!("Service lists mounted drive {}: as available", letter);
            }
        }

        let mut state = self.inner.state.lock().await;
        *state = SyncState {
            prerequisites: Some(prerequisites),
            connections,
            mounts,
            pool,
        };
        self.publish_views(&state);
        info!(
            "Refreshed: {} connections, {} mounts",
            state.connections.len(),
            state.mounts.len()
        );
        Ok(())
    }

    /// Saves a new or edited profile and caches the service's canonical copy
    /// (which carries the assigned id for new profiles).
    pub async fn save_connection(
        &self,
        connection: ConnectionProfile,
        password: Option<String>,
    ) -> SyncResult<ConnectionProfile> {
        if let Err(e) = connection.validate() {
            return self.fail(e.into());
        }
        let keys = if connection.is_new() {
            Vec::new()
        } else {
            vec![OperationKey::Connection(connection.id.clone())]
        };
        let _barrier = self.inner.barrier.read().await;
        let _lease = self.inner.pending.acquire(keys).await;

        debug!("Saving connection '{}'", connection.name);
        let saved = match self.inner.service.save_connection(connection, password).await {
            Ok(saved) => saved,
            Err(cause) => return self.fail(SyncError::remote(Operation::SaveConnection, cause)),
        };

        let mut state = self.inner.state.lock().await;
        let inserted = match state.connections.upsert(saved.clone()) {
            Ok(inserted) => inserted,
            Err(violation) => return self.fail(violation.into()),
        };
        self.publish_views(&state);
        info!(
            "{} connection '{}' ({})",
            if inserted { "Added" } else { "Updated" },
            saved.name,
            saved.id
        );
        Ok(saved)
    }

    /// Deletes a profile. An active mount of that profile is left alone; the
    /// service decides what happens to it.
    pub async fn delete_connection(&self, id: &str) -> SyncResult<()> {
        let _barrier = self.inner.barrier.read().await;
        let _lease = self
            .inner
            .pending
            .acquire(vec![OperationKey::Connection(id.to_string())])
            .await;

        debug!("Deleting connection {}", id);
        if let Err(cause) = self.inner.service.delete_connection(id).await {
            return self.fail(SyncError::remote(Operation::DeleteConnection, cause));
        }

        let mut state = self.inner.state.lock().await;
        if state.connections.remove(id).is_some() {
            self.publish_views(&state);
        }
        info!("Deleted connection {}", id);
        Ok(())
    }

    /// Mounts `connection_id` on `drive_letter` and takes the letter out of
    /// the pool.
    ///
    /// Fails without calling the service when the cache already shows the
    /// letter in use or the connection mounted. A failed or disconnected
    /// entry on the letter does not count as in use; it is replaced.
    pub async fn mount_drive(
        &self,
        connection_id: &str,
        drive_letter: DriveLetter,
    ) -> SyncResult<MountStatus> {
        let _barrier = self.inner.barrier.read().await;
        let _lease = self
            .inner
            .pending
            .acquire(vec![
                OperationKey::Letter(drive_letter),
                OperationKey::Connection(connection_id.to_string()),
            ])
            .await;

        {
            let state = self.inner.state.lock().await;
            if state.mounts.get(drive_letter).is_some_and(MountStatus::is_connected) {
                return self.fail(InvariantViolation::LetterInUse(drive_letter).into());
            }
            if state.mounts.connected_for(connection_id).is_some() {
                return self.fail(
                    InvariantViolation::ConnectionAlreadyMounted(connection_id.to_string()).into(),
                );
            }
        }

        debug!("Mounting {} on {}:", connection_id, drive_letter);
        let status = match self
            .inner
            .service
            .mount_drive(connection_id, drive_letter)
            .await
        {
            Ok(status) => status,
            Err(cause) => return self.fail(SyncError::remote(Operation::MountDrive, cause)),
        };

        let mut state = self.inner.state.lock().await;
        if let Some(stale) = state.mounts.remove_stale(status.drive_letter) {
            debug!("Replacing {:?} entry on {}:", stale.state, stale.drive_letter);
        }
        if let Err(violation) = state.mounts.add(status.clone()) {
            return self.fail(violation.into());
        }
        state.pool.reserve(status.drive_letter);
        self.publish_views(&state);
        info!("Mounted {} on {}:", status.connection_id, status.drive_letter);
        Ok(status)
    }

    /// Unmounts `drive_letter` and returns it to the pool.
    pub async fn unmount_drive(&self, drive_letter: DriveLetter) -> SyncResult<()> {
        let _barrier = self.inner.barrier.read().await;
        let _lease = self
            .inner
            .pending
            .acquire(vec![OperationKey::Letter(drive_letter)])
            .await;

        debug!("Unmounting {}:", drive_letter);
        if let Err(cause) = self.inner.service.unmount_drive(drive_letter).await {
            return self.fail(SyncError::remote(Operation::UnmountDrive, cause));
        }

        let mut state = self.inner.state.lock().await;
        let removed = state.mounts.remove(drive_letter);
        self.publish_views(&state);
        match removed {
            Some(status) if status.is_connected() => {
                if let Err(violation) = state.pool.release(drive_letter) {
                    return self.fail(violation.into());
                }
            }
            // a failed or unknown entry never held the letter out of the pool
            other => {
                if other.is_none() {
                    warn!("Unmounted {}: which was not in the cache", drive_letter);
                }
                state.pool.restore(drive_letter);
            }
        }
        info!("Unmounted {}:", drive_letter);
        Ok(())
    }

    /// Asks the service whether `connection` can be reached and
    /// authenticated. Changes nothing locally.
    pub async fn test_connection(
        &self,
        connection: &ConnectionProfile,
        password: Option<&str>,
    ) -> SyncResult<bool> {
        debug!("Testing connection to {}", connection.endpoint());
        match self.inner.service.test_connection(connection, password).await {
            Ok(reachable) => Ok(reachable),
            Err(cause) => self.fail(SyncError::remote(Operation::TestConnection, cause)),
        }
    }

    /// A fresh join of the cached connections and mounts.
    pub async fn views(&self) -> Vec<ConnectionView> {
        self.inner.state.lock().await.views()
    }

    pub async fn connections(&self) -> Vec<ConnectionProfile> {
        self.inner.state.lock().await.connections.profiles().to_vec()
    }

    pub async fn connection(&self, id: &str) -> Option<ConnectionProfile> {
        self.inner.state.lock().await.connections.get(id).cloned()
    }

    pub async fn mounts(&self) -> Vec<MountStatus> {
        self.inner.state.lock().await.mounts.mounts().to_vec()
    }

    /// Free drive letters in ascending order.
    pub async fn available_letters(&self) -> Vec<DriveLetter> {
        self.inner.state.lock().await.pool.letters()
    }

    /// `None` until the first successful refresh.
    pub async fn prerequisites(&self) -> Option<PrerequisiteState> {
        self.inner.state.lock().await.prerequisites.clone()
    }

    fn publish_views(&self, state: &SyncState) {
        self.inner.views.send_replace(state.views());
    }

    fn fail<T>(&self, err: SyncError) -> SyncResult<T> {
        match &err {
            SyncError::InvariantViolation(_) => error!("{}", err),
            _ => warn!("{}", err),
        }
        self.inner.errors.publish(&err);
        Err(err)
    }
}
