use std::sync::Arc;

use crate::database::Database;
use crate::errors::ApiError;

/// State shared by every request handler.
pub struct App {
    pub db: Database,
}

pub type AppState = Arc<App>;

impl App {
    /// Constructs a new instance of [`App`].
    pub fn new(db: Database) -> AppState {
        Arc::new(App { db })
    }

    /// Run blocking storage work off the async executor.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || work(&db)).await?
    }
}
