use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "bc-console")]
#[command(version, about = "Browse and follow a build platform from the terminal")]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page of an entity list as JSON lines
    List {
        #[arg(value_enum)]
        entity: EntityKind,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Page size (configured default when omitted)
        #[arg(short, long)]
        size: Option<u32>,

        /// RSQL filter, e.g. 'status==BUILDING'
        #[arg(short, long)]
        query: Option<String>,

        /// Sort, e.g. '=desc=submitTime'; remembered per entity
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show the latest builds and apply status changes read from stdin
    Follow {
        #[arg(short, long)]
        size: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Products,
    ProductVersions,
    Projects,
    BuildConfigurations,
    GroupConfigurations,
    Builds,
    GroupBuilds,
    Artifacts,
}

impl EntityKind {
    /// Name used for the remembered sort
    pub fn list_name(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::ProductVersions => "product-versions",
            Self::Projects => "projects",
            Self::BuildConfigurations => "build-configurations",
            Self::GroupConfigurations => "group-configurations",
            Self::Builds => "builds",
            Self::GroupBuilds => "group-builds",
            Self::Artifacts => "artifacts",
        }
    }
}
