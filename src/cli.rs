use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "bibfacet",
    about = "A faceted search CLI for library catalog spreadsheets"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Catalog configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Filter the catalog and list matching documents
    Search(SearchArgs),
    /// List the values available for each filter
    Facets(FacetsArgs),
    /// Manage registered catalog sources
    Source {
        #[command(subcommand)]
        action: SourceAction,
    },
    /// Inspect or create the catalog configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Case-insensitive text matched against every field
    pub query: Option<String>,

    /// Keep documents of this type (repeatable, any of)
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,

    /// Keep documents in this language (repeatable, any of)
    #[arg(short = 'l', long = "language")]
    pub languages: Vec<String>,

    /// Keep documents tagged with this keyword (repeatable, all of)
    #[arg(short = 'k', long = "keyword")]
    pub keywords: Vec<String>,

    /// Registered source name or catalog file path
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Output results as JSON
    #[arg(long, conflicts_with = "links")]
    pub json: bool,

    /// Output only document links (one per line)
    #[arg(long)]
    pub links: bool,

    /// Print at most this many documents
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

// -- Facets --

#[derive(Debug, Parser)]
pub struct FacetsArgs {
    /// Registered source name or catalog file path
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Source subcommands --

#[derive(Debug, Subcommand)]
pub enum SourceAction {
    /// Register a catalog file under a name
    Add {
        /// Path to the CSV or JSON export
        path: PathBuf,
        /// Name used with --source
        #[arg(long)]
        name: String,
        /// Also make it the default source
        #[arg(long)]
        default: bool,
    },
    /// Forget a registered source
    Remove {
        /// Name of the source to remove
        name: String,
    },
    /// List registered sources
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the source used when --source is omitted
    Default {
        /// Name of a registered source
        name: String,
    },
}

// -- Config subcommands --

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration to the data directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "bibfacet",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_filters() {
        let cli = Cli::parse_from([
            "bibfacet", "search", "économie", "-t", "Livre", "-t", "Rapport",
            "-k", "Finance", "--language", "Français", "--json",
        ]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query.as_deref(), Some("économie"));
                assert_eq!(args.types, ["Livre", "Rapport"]);
                assert_eq!(args.languages, ["Français"]);
                assert_eq!(args.keywords, ["Finance"]);
                assert!(args.json);
                assert!(!args.links);
                assert_eq!(args.limit, None);
                assert_eq!(args.source, None);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn search_without_query_or_filters() {
        let cli = Cli::parse_from(["bibfacet", "search"]);
        match cli.command {
            Command::Search(args) => {
                assert!(args.query.is_none());
                assert!(args.types.is_empty());
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn json_and_links_conflict() {
        let result =
            Cli::try_parse_from(["bibfacet", "search", "--json", "--links"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "bibfacet", "source", "list", "--data-dir", "/tmp/bf", "-vv",
        ]);
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/bf")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Source {
                action: SourceAction::List { json: false }
            }
        ));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
