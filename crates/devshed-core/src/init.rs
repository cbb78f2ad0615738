//! First-run configuration assembly.
//!
//! The interactive prompt loop lives in the CLI layer; it collects raw
//! answers into a [`SetupForm`] and the core validates them and assembles
//! the configuration to persist.

use reqwest::Url;
use thiserror::Error;

use crate::config::{Config, ContextPersistence, Preferences, TaskView};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InitError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Raw first-run answers, prior to validation.
#[derive(Debug, Clone, Default)]
pub struct SetupForm {
    pub api_url: String,
    pub api_key: String,
    pub user_id: String,
    pub default_organization_id: String,
    /// Optional starting project; an empty answer means none.
    pub current_project_id: Option<String>,
}

impl SetupForm {
    /// Check the answers without consuming the form, so a prompt loop can
    /// re-ask the offending field.
    pub fn validate(&self) -> Result<(), InitError> {
        if self.api_url.trim().is_empty() {
            return Err(InitError::Missing("API URL"));
        }
        Url::parse(&self.api_url).map_err(|err| InitError::InvalidUrl(err.to_string()))?;
        if self.api_key.is_empty() {
            return Err(InitError::Missing("API key"));
        }
        if self.user_id.is_empty() {
            return Err(InitError::Missing("user ID"));
        }
        if self.default_organization_id.is_empty() {
            return Err(InitError::Missing("default organization ID"));
        }
        Ok(())
    }

    /// Turn validated answers into a configuration carrying the default
    /// preferences.
    pub fn into_config(self) -> Result<Config, InitError> {
        self.validate()?;
        Ok(Config {
            api_url: self.api_url,
            api_key: self.api_key,
            user_id: self.user_id,
            default_organization_id: self.default_organization_id,
            current_project_id: self.current_project_id.filter(|id| !id.is_empty()),
            current_task_id: None,
            preferences: Some(default_preferences()),
        })
    }
}

/// Preferences applied to a freshly initialized configuration.
pub fn default_preferences() -> Preferences {
    Preferences {
        auto_save_context: Some(true),
        show_context_in_prompt: Some(true),
        context_persistence: Some(ContextPersistence::SessionAndConfig),
        default_task_view: Some(TaskView::Compact),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> SetupForm {
        SetupForm {
            api_url: "https://api.devshed.dev".to_string(),
            api_key: "k".to_string(),
            user_id: "u".to_string(),
            default_organization_id: "o".to_string(),
            current_project_id: None,
        }
    }

    #[test]
    fn valid_form_becomes_a_config_with_default_preferences() {
        let config = valid_form().into_config().unwrap();
        assert_eq!(config.api_url, "https://api.devshed.dev");
        assert_eq!(config.current_task_id, None);

        let preferences = config.preferences.unwrap();
        assert_eq!(preferences.auto_save_context, Some(true));
        assert_eq!(
            preferences.context_persistence,
            Some(ContextPersistence::SessionAndConfig)
        );
        assert_eq!(preferences.default_task_view, Some(TaskView::Compact));
    }

    #[test]
    fn empty_required_fields_are_rejected_by_name() {
        let mut form = valid_form();
        form.api_key = String::new();
        assert_eq!(form.validate(), Err(InitError::Missing("API key")));

        let mut form = valid_form();
        form.default_organization_id = String::new();
        assert_eq!(
            form.validate(),
            Err(InitError::Missing("default organization ID"))
        );
    }

    #[test]
    fn unparsable_url_is_rejected() {
        let mut form = valid_form();
        form.api_url = "not a url".to_string();
        assert!(matches!(form.validate(), Err(InitError::InvalidUrl(_))));
    }

    #[test]
    fn empty_starting_project_means_none() {
        let mut form = valid_form();
        form.current_project_id = Some(String::new());
        assert_eq!(form.into_config().unwrap().current_project_id, None);

        let mut form = valid_form();
        form.current_project_id = Some("p1".to_string());
        assert_eq!(
            form.into_config().unwrap().current_project_id.as_deref(),
            Some("p1")
        );
    }
}
