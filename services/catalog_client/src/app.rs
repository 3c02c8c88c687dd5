//! services/catalog_client/src/app.rs
//!
//! The composition root: picks the resource client for the configured mode and wires
//! the session resolver, reporter, and auth state manager around it.

use book_catalog_core::ports::{IdentityProvider, ResourceClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::adapters::{HttpResourceClient, MockIdentityProvider, MockResourceClient};
use crate::auth::AuthStateManager;
use crate::config::{CatalogMode, Config, ConfigError};
use crate::error::ClientError;
use crate::reporter::{NotificationSink, Reporter};
use crate::session::SessionResolver;

/// Installs the global tracing subscriber at the configured level.
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &Config) -> bool {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Everything the UI layer talks to.
pub struct CatalogClient {
    pub config: Arc<Config>,
    pub auth: AuthStateManager,
    pub resources: Arc<dyn ResourceClient>,
    pub reporter: Reporter,
}

impl CatalogClient {
    /// Builds the client for `config.mode`.
    pub fn build(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        sink: Option<Arc<dyn NotificationSink>>,
    ) -> Result<Self, ClientError> {
        let resources: Arc<dyn ResourceClient> = match config.mode {
            CatalogMode::Live => {
                let base_url = config
                    .api_base_url
                    .clone()
                    .ok_or_else(|| ConfigError::MissingVar("API_BASE_URL".to_string()))?;
                info!("Using live catalog at {}", base_url);
                let session = SessionResolver::new(identity.clone());
                Arc::new(HttpResourceClient::new(base_url, session)?)
            }
            CatalogMode::Mock => {
                info!("Using in-memory mock catalog");
                Arc::new(MockResourceClient::seeded().with_identity(identity.clone()))
            }
        };

        Ok(Self {
            auth: AuthStateManager::new(identity, config.logout_policy),
            config: Arc::new(config),
            resources,
            reporter: Reporter::new(sink),
        })
    }

    /// A fully in-memory client: a seeded catalog acting for `identity`'s current user.
    pub fn mock(identity: Arc<MockIdentityProvider>) -> Self {
        let config = Config::mock();
        let resources = MockResourceClient::seeded().with_identity(identity.clone());
        Self {
            auth: AuthStateManager::new(identity, config.logout_policy),
            config: Arc::new(config),
            resources: Arc::new(resources),
            reporter: Reporter::log_only(),
        }
    }
}
