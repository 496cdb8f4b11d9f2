// src/state.rs
use std::sync::Arc;

use crate::config::CopyMode;
use crate::services::notifier::Notifier;
use crate::store::Repository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub notifier: Arc<dyn Notifier>,
    pub jwt_secret: Arc<str>,
    pub copy_mode: CopyMode,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        notifier: Arc<dyn Notifier>,
        jwt_secret: impl Into<Arc<str>>,
        copy_mode: CopyMode,
    ) -> Self {
        Self {
            repo,
            notifier,
            jwt_secret: jwt_secret.into(),
            copy_mode,
        }
    }
}
