use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::fetcher::{FetchRequest, Fetcher};
use crate::plan::FetchPlan;

#[derive(Debug, Parser)]
#[command(
    name = "pkgfetch",
    version,
    about = "Fetches build-time packages over HTTP and unpacks them"
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a zip archive and unpack it into a directory.
    Fetch {
        url: String,
        destination: PathBuf,
    },
    /// Download a file as-is, without unpacking.
    Download {
        url: String,
        output: PathBuf,
    },
    /// Execute every entry of a JSON fetch plan (local path or http(s) URL).
    Run {
        plan: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Fetch { url, destination } => {
                let fetcher = Fetcher::new()?;
                fetcher.fetch(&FetchRequest::new(url, destination))?;
            }
            Command::Download { url, output } => {
                let fetcher = Fetcher::new()?;
                fetcher.download(&url, &output)?;
            }
            Command::Run { plan } => run_plan(&plan)?,
        }
        Ok(())
    }
}

fn run_plan(source: &str) -> Result<()> {
    let plan = if source.starts_with("http://") || source.starts_with("https://") {
        FetchPlan::from_url(source)?
    } else {
        FetchPlan::from_path(Path::new(source))?
    };

    let fetcher = Fetcher::new()?;
    for entry in &plan.packages {
        if entry.unpack {
            fetcher.fetch(&FetchRequest::new(entry.url.clone(), entry.destination.clone()))?;
        } else {
            fetcher.download(&entry.url, &entry.destination)?;
        }
    }

    log::info!("Fetch plan completed: {} packages", plan.packages.len());
    Ok(())
}
