//! Mock settings gateway.
//!
//! Returns a fixed set of backend settings for `SettingsFilter::BbbOptions`
//! and the configured access codes for named lookups. Every query is
//! recorded so tests can check how often settings were resolved.

use async_trait::async_trait;
use room_service::errors::RoomError;
use room_service::models::VIEWER_ACCESS_CODE_SETTING;
use room_service::services::settings::{RoomSettings, SettingsFilter, SettingsGateway, SettingsQuery};
use std::sync::Mutex;

/// A recorded settings query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    /// Provider the lookup was scoped to.
    pub provider: String,
    /// Whether an acting user was supplied.
    pub has_user: bool,
    /// Requested filter.
    pub filter: SettingsFilter,
}

/// Mock settings gateway.
#[derive(Debug, Default)]
pub struct MockSettingsGateway {
    bbb_options: RoomSettings,
    named: RoomSettings,
    failure: Option<String>,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl MockSettingsGateway {
    /// Create a MockSettingsGateway builder.
    #[must_use]
    pub fn builder() -> MockSettingsGatewayBuilder {
        MockSettingsGatewayBuilder::default()
    }

    /// Gateway with no settings and no access code.
    #[must_use]
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Gateway whose lookups all fail.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::builder().fail_with(message).build()
    }

    /// Recorded queries, in call order.
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Number of lookups made.
    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SettingsGateway for MockSettingsGateway {
    async fn resolve(&self, query: SettingsQuery<'_>) -> Result<RoomSettings, RoomError> {
        self.queries.lock().unwrap().push(RecordedQuery {
            provider: query.provider.to_string(),
            has_user: query.current_user.is_some(),
            filter: query.filter.clone(),
        });

        if let Some(message) = &self.failure {
            return Err(RoomError::Settings(message.clone()));
        }

        match query.filter {
            SettingsFilter::BbbOptions => Ok(self.bbb_options.clone()),
            SettingsFilter::Named { names, .. } => Ok(self
                .named
                .iter()
                .filter(|(name, _)| names.contains(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()),
        }
    }
}

/// Builder for MockSettingsGateway configuration.
#[derive(Debug, Default)]
pub struct MockSettingsGatewayBuilder {
    bbb_options: RoomSettings,
    named: RoomSettings,
    failure: Option<String>,
}

impl MockSettingsGatewayBuilder {
    /// Add a backend setting.
    #[must_use]
    pub fn setting(mut self, name: &str, value: &str) -> Self {
        self.bbb_options.insert(name.to_string(), value.to_string());
        self
    }

    /// Request a server tag.
    #[must_use]
    pub fn server_tag(self, tag: &str, required: bool) -> Self {
        self.setting("serverTag", tag)
            .setting("serverTagRequired", if required { "true" } else { "false" })
    }

    /// Set the viewer access code.
    #[must_use]
    pub fn access_code(mut self, code: &str) -> Self {
        self.named
            .insert(VIEWER_ACCESS_CODE_SETTING.to_string(), code.to_string());
        self
    }

    /// Make every lookup fail.
    #[must_use]
    pub fn fail_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Build the MockSettingsGateway.
    #[must_use]
    pub fn build(self) -> MockSettingsGateway {
        MockSettingsGateway {
            bbb_options: self.bbb_options,
            named: self.named,
            failure: self.failure,
            queries: Mutex::new(Vec::new()),
        }
    }
}
