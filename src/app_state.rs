use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::config::Config;
use crate::gateway::GatePassGateway;
use crate::models::Stage;
use crate::session::Session;
use crate::workflow::{ApprovalDesk, ReturnDesk, ReturnRole};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn GatePassGateway>,
    pub profiles: Arc<ProfileCache>,
    pub session: Session,
}

impl AppState {
    pub fn new(gateway: Arc<dyn GatePassGateway>, session: Session) -> Self {
        let profiles = Arc::new(ProfileCache::new(gateway.clone()));
        Self {
            gateway,
            profiles,
            session,
        }
    }

    /// Approval desk for a stage, paged per the global config.
    pub fn desk(&self, stage: Stage) -> ApprovalDesk {
        ApprovalDesk::new(
            stage,
            self.session.profile.clone(),
            self.gateway.clone(),
            self.profiles.clone(),
            Config::get().page_size,
        )
    }

    pub fn return_desk(&self, role: ReturnRole) -> ReturnDesk {
        ReturnDesk::new(role, self.gateway.clone(), self.profiles.clone())
    }
}
