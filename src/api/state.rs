use crate::api::error::ApiError;
use crate::db::store::Store;
use crate::services::error::ServiceError;
use std::sync::{Arc, Mutex};

/// One store handle shared by every request; requests take turns on it.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Box<dyn Store>>>,
}

impl AppState {
    pub fn new(store: Box<dyn Store>) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` against the store on the blocking pool.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Store) -> Result<T, ServiceError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|_| ApiError::Internal("store mutex poisoned".to_string()))?;
            f(&mut **guard).map_err(ApiError::from)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {}", e)))?
    }
}
