//! services/catalog_client/src/reporter.rs
//!
//! Turns failures and confirmations into user-visible notifications.
//! Reporting never fails: if the sink is missing or refuses a message, the
//! message still reaches the log.

use book_catalog_core::ports::{IdentityError, PortError};
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::ConfigError;
use crate::error::ClientError;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Error,
    Success,
}

#[derive(Debug, thiserror::Error)]
#[error("Notification sink unavailable: {0}")]
pub struct SinkError(pub String);

/// Where notifications are displayed (a toast area, a status bar, ...).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str) -> Result<(), SinkError>;
}

/// Anything a caller might hand to `report_error`.
#[derive(Debug)]
pub enum Failure<'a> {
    /// A structured error; its message is displayed.
    Error(&'a (dyn Error + 'a)),
    /// Text that is already display-ready.
    Text(&'a str),
    /// Something with no usable message.
    Unknown,
}

impl Failure<'_> {
    pub fn display_message(&self) -> String {
        match self {
            Failure::Error(e) => e.to_string(),
            Failure::Text(text) => text.to_string(),
            Failure::Unknown => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

macro_rules! failure_from_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Failure<'a> {
                fn from(e: &'a $ty) -> Self {
                    Failure::Error(e)
                }
            }
        )*
    };
}

failure_from_error!(PortError, IdentityError, ConfigError, ClientError, SinkError);

impl<'a> From<&'a (dyn Error + 'static)> for Failure<'a> {
    fn from(e: &'a (dyn Error + 'static)) -> Self {
        Failure::Error(e)
    }
}

impl<'a> From<&'a (dyn Error + Send + Sync + 'static)> for Failure<'a> {
    fn from(e: &'a (dyn Error + Send + Sync + 'static)) -> Self {
        Failure::Error(e)
    }
}

impl<'a> From<&'a str> for Failure<'a> {
    fn from(text: &'a str) -> Self {
        Failure::Text(text)
    }
}

impl<'a> From<&'a String> for Failure<'a> {
    fn from(text: &'a String) -> Self {
        Failure::Text(text.as_str())
    }
}

/// Reports errors and successes to an optional sink and to the log.
#[derive(Clone, Default)]
pub struct Reporter {
    sink: Option<Arc<dyn NotificationSink>>,
}

impl Reporter {
    pub fn new(sink: Option<Arc<dyn NotificationSink>>) -> Self {
        Self { sink }
    }

    /// A reporter that only logs.
    pub fn log_only() -> Self {
        Self::default()
    }

    pub fn report_error<'a>(&self, failure: impl Into<Failure<'a>>) {
        let failure = failure.into();
        let message = failure.display_message();
        self.emit(NotificationLevel::Error, &message);
        error!("API Error: {:?}", failure);
    }

    pub fn report_success(&self, message: &str) {
        self.emit(NotificationLevel::Success, message);
        info!("Success: {}", message);
    }

    fn emit(&self, level: NotificationLevel, message: &str) {
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.notify(level, message) {
                warn!("{}; message was: {}", e, message);
            }
        }
    }
}
