use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::application::eventbus::SharedEventBus;
use crate::application::prompt::SharedConfirm;
use crate::application::service::GroupService;
use crate::domain::error::DomainError;
use crate::domain::model::AccountProfile;
use crate::domain::repository::{GroupStore, ProfileRegistry};
use crate::infrastructure::storage::StorageBackend;

/// Group service over whichever backend the config selected
pub type DynGroupService = GroupService<dyn GroupStore>;

pub struct AppState {
    group_service: Mutex<DynGroupService>,
    pub profiles: Option<Arc<dyn ProfileRegistry>>,
    pub event_bus: SharedEventBus,
}

impl AppState {
    pub fn new(
        storage: StorageBackend,
        confirm: SharedConfirm,
        event_bus: SharedEventBus,
        account: AccountProfile,
    ) -> Self {
        let service = GroupService::new(
            storage.store,
            storage.directory,
            confirm,
            event_bus.clone(),
            account,
        );

        Self {
            group_service: Mutex::new(service),
            profiles: storage.profiles,
            event_bus,
        }
    }

    /// Claim the service for one operation.
    ///
    /// Fails with [`DomainError::Busy`] while another operation holds it.
    pub fn group_service(&self) -> Result<MutexGuard<'_, DynGroupService>, DomainError> {
        self.group_service.try_lock().map_err(|_| DomainError::Busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::eventbus::create_event_bus;
    use crate::application::prompt::FixedAnswer;
    use crate::infrastructure::persistence::memory::MemoryStore;

    fn state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        let storage = StorageBackend {
            store: store.clone(),
            directory: store.clone(),
            profiles: Some(store),
        };
        AppState::new(
            storage,
            Arc::new(FixedAnswer(true)),
            create_event_bus(),
            AccountProfile::new("me", "me@x.com", None),
        )
    }

    #[test]
    fn test_second_operation_is_rejected_while_busy() {
        let state = state();

        let first = state.group_service().unwrap();
        assert!(matches!(state.group_service(), Err(DomainError::Busy)));

        drop(first);
        assert!(state.group_service().is_ok());
    }

    #[tokio::test]
    async fn test_service_acts_for_configured_account() {
        let state = state();
        let mut service = state.group_service().unwrap();
        assert_eq!(service.account().email, "me@x.com");
        assert!(service.refresh_groups().await);
        assert!(service.session().groups().is_empty());
    }
}
