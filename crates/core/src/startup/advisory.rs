//! One-time advisory about task-terminating utilities.

use std::sync::Arc;

use liftoff_domain::constants::{
    PERMISSION_RESTART_PACKAGES, PREF_TASK_KILLER_NOTICE_DISMISSED, SYSTEM_PACKAGE_PREFIX,
};
use liftoff_domain::{InstalledApplication, PromptResponse, Result};
use tracing::{debug, info};

use super::ports::{AdvisoryPrompt, ApplicationCatalog};
use crate::preferences::ports::PreferenceStore;

/// First non-system application that can kill other applications.
pub fn find_task_killer(apps: &[InstalledApplication]) -> Option<&InstalledApplication> {
    apps.iter()
        .filter(|app| !app.package_name.starts_with(SYSTEM_PACKAGE_PREFIX))
        .find(|app| app.requests(PERMISSION_RESTART_PACKAGES))
}

/// Result of one advisory check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryOutcome {
    /// The notice was shown on an earlier startup.
    AlreadyDismissed,
    NothingFound,
    Shown { label: String, response: PromptResponse },
}

/// Scans for task killers and shows the notice at most once.
pub struct TaskKillerAdvisor {
    catalog: Arc<dyn ApplicationCatalog>,
    prompt: Arc<dyn AdvisoryPrompt>,
    preferences: Arc<dyn PreferenceStore>,
}

impl TaskKillerAdvisor {
    pub fn new(
        catalog: Arc<dyn ApplicationCatalog>,
        prompt: Arc<dyn AdvisoryPrompt>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self { catalog, prompt, preferences }
    }

    pub async fn check(&self) -> Result<AdvisoryOutcome> {
        if self.preferences.get_bool(PREF_TASK_KILLER_NOTICE_DISMISSED, false).await? {
            debug!("startup.advisory.already_dismissed");
            return Ok(AdvisoryOutcome::AlreadyDismissed);
        }

        let apps = self.catalog.installed_applications(true).await?;
        let Some(killer) = find_task_killer(&apps) else {
            debug!(scanned = apps.len(), "startup.advisory.nothing_found");
            return Ok(AdvisoryOutcome::NothingFound);
        };

        let response = self.prompt.show_task_killer_notice(&killer.label).await?;
        // Any answer counts as seen.
        self.preferences.set_bool(PREF_TASK_KILLER_NOTICE_DISMISSED, true).await?;

        info!(app = %killer.package_name, ?response, "startup.advisory.notice_shown");
        Ok(AdvisoryOutcome::Shown { label: killer.label.clone(), response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(package: &str, permissions: Option<&[&str]>) -> InstalledApplication {
        InstalledApplication {
            package_name: package.into(),
            label: package.rsplit('.').next().unwrap_or(package).into(),
            requested_permissions: permissions
                .map(|perms| perms.iter().map(|p| (*p).to_string()).collect()),
        }
    }

    #[test]
    fn finds_first_matching_application() {
        let apps = vec![
            app("org.calendar", Some(&["internet"])),
            app("org.killer", Some(&["internet", PERMISSION_RESTART_PACKAGES])),
            app("org.other_killer", Some(&[PERMISSION_RESTART_PACKAGES])),
        ];

        let found = find_task_killer(&apps).expect("killer found");
        assert_eq!(found.package_name, "org.killer");
    }

    #[test]
    fn skips_system_packages_and_missing_permissions() {
        let apps = vec![
            app("com.android.settings", Some(&[PERMISSION_RESTART_PACKAGES])),
            app("org.unknown", None),
        ];

        assert!(find_task_killer(&apps).is_none());
    }
}
