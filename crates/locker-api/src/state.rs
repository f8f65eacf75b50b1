use std::sync::Arc;
use std::time::Duration;

use locker_db::{Database, DeviceIndex, MemoryIndex, OwnershipIndex, Persistence};
use locker_identity::{IdentityGenerator, RandomIdentity};
use tracing::error;

use crate::error::LockerError;
use crate::flows::DEFAULT_SEND_DELAY;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub ids: Arc<dyn IdentityGenerator>,
    /// Origin the share/owner links are built on, without trailing `/`.
    pub public_url: String,
    pub send_delay: Duration,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, public_url: impl Into<String>) -> Self {
        Self {
            db,
            ids: Arc::new(RandomIdentity),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            send_delay: DEFAULT_SEND_DELAY,
        }
    }

    pub fn with_send_delay(mut self, send_delay: Duration) -> Self {
        self.send_delay = send_delay;
        self
    }

    /// Storage as seen by one client. Without a device id the ownership
    /// index is a detached, empty one.
    pub fn persistence(&self, device_id: Option<&str>) -> Persistence {
        let index: Arc<dyn OwnershipIndex> = match device_id {
            Some(id) => Arc::new(DeviceIndex::new(self.db.clone(), id)),
            None => Arc::new(MemoryIndex::new()),
        };
        Persistence::new(self.db.clone(), index)
    }
}

/// Run blocking storage work off the async runtime.
pub async fn blocking<F, T>(f: F) -> Result<T, LockerError>
where
    F: FnOnce() -> Result<T, LockerError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        LockerError::StorageUnavailable(anyhow::anyhow!("storage task failed: {}", e))
    })?
}
