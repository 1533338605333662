use std::sync::Arc;
use std::time::Instant;

use crate::auth::{AuthorizationGuard, IdentityVerifier};
use crate::config::Settings;
use crate::directory::TargetDirectory;
use crate::notification::{NotificationFactory, NotificationService, TargetResolver, VariantRegistry};
use crate::store::NotificationStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub notifications: Arc<NotificationService>,
    pub start_time: Instant,
}

impl AppState {
    /// Wire the notification service from its three collaborators.
    pub fn new(
        settings: Settings,
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn TargetDirectory>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let guard = AuthorizationGuard::new(verifier);
        let resolver = TargetResolver::new(directory, settings.directory.strict);
        let factory = NotificationFactory::new(Arc::new(VariantRegistry::builtin()), resolver);
        let notifications = Arc::new(NotificationService::new(guard, factory, store));

        Self {
            settings: Arc::new(settings),
            notifications,
            start_time: Instant::now(),
        }
    }

    pub fn store(&self) -> &Arc<dyn NotificationStore> {
        self.notifications.store()
    }
}
