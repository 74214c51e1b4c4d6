use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A list of packages a CI job wants fetched, loaded from JSON.
///
/// Replaces the URL/destination pairs that used to be hardcoded in the
/// individual helper scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchPlan {
    pub packages: Vec<PlanEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    pub url: String,
    pub destination: PathBuf,
    /// Unpack the payload as a zip archive; when false the payload is
    /// saved to `destination` as-is.
    #[serde(default = "default_unpack")]
    pub unpack: bool,
}

fn default_unpack() -> bool {
    true
}

impl FetchPlan {
    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading fetch plan from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fetch plan {}", path.display()))?;
        Self::parse(&text)
    }

    pub fn from_url(url: &str) -> Result<Self> {
        log::info!("Fetching plan from: {}", url);
        let response = reqwest::blocking::get(url).context("Failed to fetch plan from URL")?;

        if !response.status().is_success() {
            anyhow::bail!("Plan fetch failed with status: {}", response.status());
        }

        let text = response.text().context("Failed to read plan response")?;
        Self::parse(&text)
    }

    fn parse(text: &str) -> Result<Self> {
        let plan: FetchPlan = serde_json::from_str(text).context("Failed to parse fetch plan JSON")?;
        plan.validate()?;
        log::info!("Fetch plan validated: {} packages", plan.packages.len());
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        if self.packages.is_empty() {
            anyhow::bail!("Fetch plan has no packages");
        }

        for entry in &self.packages {
            if entry.url.is_empty() {
                anyhow::bail!("Plan entry has an empty url");
            }
            if entry.destination.as_os_str().is_empty() {
                anyhow::bail!("Plan entry for {} has an empty destination", entry.url);
            }
        }

        Ok(())
    }
}
