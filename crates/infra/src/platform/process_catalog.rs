//! Running-process catalog
//!
//! Desktop platforms have no install-time permission manifest, so each
//! distinct running process is reported as an application and processes
//! whose name matches a configured task-killer name are reported as
//! requesting [`PERMISSION_RESTART_PACKAGES`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use liftoff_core::ApplicationCatalog;
use liftoff_domain::constants::PERMISSION_RESTART_PACKAGES;
use liftoff_domain::{InstalledApplication, Result};
use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

use crate::errors::conversions::to_domain;

pub struct ProcessCatalog {
    task_killer_names: Vec<String>,
}

impl ProcessCatalog {
    pub fn new<I, S>(task_killer_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            task_killer_names: task_killer_names
                .into_iter()
                .map(|name| normalize(name.as_ref()))
                .collect(),
        }
    }

    fn describe(&self, name: &str, with_permissions: bool) -> InstalledApplication {
        let requested_permissions = with_permissions.then(|| {
            if self.task_killer_names.iter().any(|killer| *killer == normalize(name)) {
                vec![PERMISSION_RESTART_PACKAGES.to_string()]
            } else {
                Vec::new()
            }
        });
        InstalledApplication {
            package_name: name.to_string(),
            label: name.to_string(),
            requested_permissions,
        }
    }
}

#[async_trait]
impl ApplicationCatalog for ProcessCatalog {
    async fn installed_applications(
        &self,
        with_permissions: bool,
    ) -> Result<Vec<InstalledApplication>> {
        let names = tokio::task::spawn_blocking(running_process_names).await.map_err(to_domain)?;
        debug!(processes = names.len(), "process_catalog.scanned");

        Ok(names.iter().map(|name| self.describe(name, with_permissions)).collect())
    }
}

/// Distinct process names, sorted.
fn running_process_names() -> Vec<String> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let mut names = BTreeMap::new();
    for process in system.processes().values() {
        let name = process.name().to_string_lossy().into_owned();
        if !name.is_empty() {
            names.insert(name, ());
        }
    }
    names.into_keys().collect()
}

fn normalize(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    lower.strip_suffix(".exe").map(str::to_string).unwrap_or(lower)
}
