pub mod adapters;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod reporter;
pub mod session;

pub use app::{init_tracing, CatalogClient};
pub use auth::{AuthState, AuthStateManager, AuthStatus};
pub use config::{CatalogMode, Config, ConfigError, LogoutPolicy};
pub use error::ClientError;
pub use reporter::{Failure, NotificationLevel, NotificationSink, Reporter, SinkError};
pub use session::SessionResolver;
