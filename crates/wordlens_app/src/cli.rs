use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use wordlens_core::SortOrder;

use crate::logging::LogDestination;

/// Upload documents to the analysis service and browse the extracted terms.
#[derive(Parser, Debug)]
#[command(name = "wordlens", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// RON config file (defaults to ./wordlens.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the analysis service
    #[arg(long, env = "WORDLENS_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Terms per page
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Hide terms shorter than this many characters
    #[arg(long, global = true)]
    pub min_length: Option<usize>,

    /// Where log output goes
    #[arg(long, value_enum, global = true)]
    pub log: Option<LogDestination>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a .pdf or .docx file and browse its terms interactively
    Analyze {
        /// Document to analyse
        file: PathBuf,

        /// Initial search text
        #[arg(long, default_value = "")]
        query: String,

        /// count_desc, count_asc or alpha
        #[arg(long, default_value_t = SortOrder::CountDesc)]
        sort: SortOrder,
    },
    /// Manage the shared dictionary
    Dict {
        #[command(subcommand)]
        action: DictAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum DictAction {
    /// List dictionary words
    List,
    /// Add a word
    Add { word: String },
    /// Remove a word (asks for confirmation)
    Remove {
        word: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Save the dictionary file to PATH
    Download { path: PathBuf },
    /// Replace the dictionary with the file at PATH
    Upload { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_parses_query_and_sort() {
        let cli = Cli::try_parse_from([
            "wordlens", "analyze", "doc.pdf", "--query", "船", "--sort", "alpha", "--page-size",
            "20",
        ])
        .unwrap();
        assert_eq!(cli.global.page_size, Some(20));
        match cli.command {
            Command::Analyze { file, query, sort } => {
                assert_eq!(file, PathBuf::from("doc.pdf"));
                assert_eq!(query, "船");
                assert_eq!(sort, SortOrder::Alpha);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_sort_is_rejected() {
        assert!(Cli::try_parse_from(["wordlens", "analyze", "doc.pdf", "--sort", "random"]).is_err());
    }

    #[test]
    fn dict_remove_takes_yes_flag() {
        let cli = Cli::try_parse_from(["wordlens", "dict", "remove", "猫", "--yes"]).unwrap();
        match cli.command {
            Command::Dict { action } => assert_eq!(
                action,
                DictAction::Remove {
                    word: "猫".to_string(),
                    yes: true,
                }
            ),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
