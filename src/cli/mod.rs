pub mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::document::DocumentType;

#[derive(Parser)]
#[command(name = "dumbifier")]
#[command(author = "Dumbifier Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn Terms of Service, privacy policies and EULAs into plain language", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long, default_value = "false")]
        force: bool,
    },

    /// Configure API keys and the remote account
    #[command(long_about = "Configure API keys and the remote account.\n\n\
        Services: openai (simplification), dictionary (API Ninjas word lookups),\n\
        remote (optional server that keeps saved documents and words).\n\n\
        Keys can also come from OPENAI_API_KEY, API_NINJAS_KEY and DUMBIFIER_TOKEN.\n\n\
        Set base_url in ~/.config/dumbifier/config.toml to use an OpenAI-compatible gateway.")]
    Auth {
        /// Service to configure (openai, dictionary, remote)
        #[arg(short, long)]
        service: Option<Service>,

        /// Set the key or token directly (alternative to interactive prompt)
        #[arg(short, long)]
        key: Option<String>,

        /// Server URL, only used with --service remote
        #[arg(long)]
        url: Option<String>,

        /// List configured services and their status
        #[arg(long, default_value = "false")]
        list: bool,
    },

    /// Simplify a document file (.txt, .pdf, .doc, .docx)
    Analyze {
        /// Path to the document
        #[arg(required = true)]
        path: PathBuf,

        /// Save the result to history (and the remote account when signed in)
        #[arg(short, long, default_value = "false")]
        save: bool,

        /// Print the raw result as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Model name, e.g. gpt-4o-mini or gpt-4o
        #[arg(short, long, env = "DUMBIFIER_MODEL")]
        model: Option<String>,
    },

    /// Simplify pasted text (reads stdin when --text is not given)
    Paste {
        /// Text to simplify
        #[arg(long)]
        text: Option<String>,

        /// Document type; 'auto' guesses it from the content
        #[arg(short = 't', long = "type", default_value = "tos")]
        doc_type: DocumentTypeArg,

        /// Save the result to history (and the remote account when signed in)
        #[arg(short, long, default_value = "false")]
        save: bool,

        /// Print the raw result as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Model name, e.g. gpt-4o-mini or gpt-4o
        #[arg(short, long, env = "DUMBIFIER_MODEL")]
        model: Option<String>,
    },

    /// Browse and manage saved analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Look up a word in the dictionary
    Define {
        /// Word to define
        word: String,

        /// Add the word to your saved words
        #[arg(short, long, default_value = "false")]
        save: bool,
    },

    /// Manage saved words on the remote account
    Words {
        #[command(subcommand)]
        action: WordsAction,
    },

    /// Check system health and diagnose common problems
    Doctor,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List saved analyses, newest first
    List,

    /// Show one saved analysis
    Show {
        /// Entry id (see 'history list')
        id: String,
    },

    /// Remove one saved analysis
    Remove {
        /// Entry id (see 'history list')
        id: String,
    },

    /// Remove all saved analyses
    Clear,

    /// Export the history to a file
    Export {
        /// Export format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum WordsAction {
    /// List saved words
    List,

    /// Save a word
    Add { word: String },

    /// Remove a saved word
    Remove { word: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Service {
    #[value(name = "openai")]
    OpenAI,
    Dictionary,
    Remote,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::OpenAI => write!(f, "openai"),
            Service::Dictionary => write!(f, "dictionary"),
            Service::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum DocumentTypeArg {
    #[default]
    Tos,
    PrivacyPolicy,
    Eula,
    Other,
    Auto,
}

impl DocumentTypeArg {
    /// The fixed type, or `None` when it should be guessed
    pub fn fixed(self) -> Option<DocumentType> {
        match self {
            DocumentTypeArg::Tos => Some(DocumentType::Tos),
            DocumentTypeArg::PrivacyPolicy => Some(DocumentType::PrivacyPolicy),
            DocumentTypeArg::Eula => Some(DocumentType::Eula),
            DocumentTypeArg::Other => Some(DocumentType::Other),
            DocumentTypeArg::Auto => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}
