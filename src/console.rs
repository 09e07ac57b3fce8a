//! The navigation shell: owns the configuration, both service clients and
//! the session, and hands out loaded views.

use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::lookup::Lookups;
use crate::remote::{ProjectClient, ProjectService, SupportClient, SupportService};
use crate::session::SessionContext;
use crate::types::Version;
use crate::views::{ProjectBoard, TicketBoard, VersionPicker};

pub struct Console {
    config: Config,
    support: Arc<dyn SupportService>,
    projects: Arc<dyn ProjectService>,
    session: SessionContext,
}

impl Console {
    /// Console for the working directory: `.psa/config.yaml` plus
    /// environment overrides, and `.psa/session.json`.
    pub fn open() -> Result<Self> {
        let config = Config::load()?;
        let support = SupportClient::from_config(&config)?;
        let projects = ProjectClient::from_config(&config)?;
        debug!(
            support = support.base_url(),
            projects = projects.base_url(),
            "console ready"
        );
        let session = SessionContext::open(SessionContext::default_path())?;
        Ok(Self::with_services(
            config,
            Arc::new(support),
            Arc::new(projects),
            session,
        ))
    }

    pub fn with_services(
        config: Config,
        support: Arc<dyn SupportService>,
        projects: Arc<dyn ProjectService>,
        session: SessionContext,
    ) -> Self {
        Self {
            config,
            support,
            projects,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn support(&self) -> Arc<dyn SupportService> {
        Arc::clone(&self.support)
    }

    pub fn projects(&self) -> Arc<dyn ProjectService> {
        Arc::clone(&self.projects)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Entering the support module starts over with version selection.
    pub fn enter_support(&self) -> Result<()> {
        self.session.clear()
    }

    pub fn require_version(&self) -> Result<Version> {
        self.session.require_version()
    }

    pub async fn version_picker(&self) -> Result<VersionPicker> {
        let mut picker = VersionPicker::new();
        picker.load(self.support()).await?;
        Ok(picker)
    }

    /// Tickets of the selected version, with reference data resolved.
    pub async fn ticket_board(&self) -> Result<TicketBoard> {
        let version = self.require_version()?;
        let lookups = Lookups::load(self.support.as_ref(), Some(version.id)).await;
        let mut board = TicketBoard::new(lookups);
        board.set_version(version);
        board.load(self.support()).await?;
        Ok(board)
    }

    pub async fn project_board(&self) -> Result<ProjectBoard> {
        let mut board = ProjectBoard::new();
        board.load(self.projects()).await?;
        Ok(board)
    }
}
