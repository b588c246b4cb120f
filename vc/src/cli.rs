//! CLI command definitions and subcommands

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::output::OutputFormat;
use crate::search::SearchDefaults;

/// Vantage - command line client for the Vantage vector search platform
#[derive(Debug, Parser)]
#[command(name = "vantage", about = "Command line client for the Vantage vector search platform", version)]
pub struct Cli {
    /// Path to config file
    #[arg(short = 'c', long = "config-file", global = true, help = "Path to config file")]
    pub config_file: Option<PathBuf>,

    /// Account ID
    #[arg(short = 'a', long, global = true, env = "VANTAGE_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Vantage API key
    #[arg(short = 'k', long, global = true, env = "VANTAGE_API_KEY", hide_env_values = true)]
    pub vantage_api_key: Option<String>,

    /// JWT token
    #[arg(short = 't', long, global = true, env = "VANTAGE_API_JWT_TOKEN", hide_env_values = true)]
    pub jwt_token: Option<String>,

    /// Client ID
    #[arg(short = 'i', long, global = true, env = "VANTAGE_API_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(short = 's', long, global = true, env = "VANTAGE_API_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Output format (json, csv)
    #[arg(short = 'o', long = "output-type", global = true, help = "Output format (json, csv)")]
    pub output_type: Option<OutputFormat>,

    /// API host
    #[arg(long, global = true, env = "VANTAGE_API_HOST")]
    pub api_host: Option<String>,

    /// Authentication host
    #[arg(long, global = true, env = "VANTAGE_AUTH_HOST")]
    pub auth_host: Option<String>,

    /// Debug mode: verbose logging and full error reports
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows account details
    GetAccount,

    /// Updates account name
    UpdateAccount {
        /// New name for the account
        new_account_name: String,
    },

    /// Lists Vantage API keys
    GetVantageApiKeys,

    /// Shows a specific Vantage API key
    GetVantageApiKey {
        /// Vantage API key ID
        vantage_api_key_id: String,
    },

    /// Creates a new external API key
    CreateExternalApiKey {
        /// LLM provider (OpenAI, HuggingFace)
        #[arg(long)]
        llm_provider: String,

        /// Secret for the LLM provider
        #[arg(long)]
        llm_secret: String,

        /// Provider URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Lists external API keys
    GetExternalApiKeys,

    /// Shows a specific external API key
    GetExternalApiKey {
        /// External API key ID
        external_key_id: String,
    },

    /// Updates an external API key
    UpdateExternalApiKey {
        /// External API key ID
        external_key_id: String,

        /// New LLM provider
        #[arg(long)]
        llm_provider: Option<String>,

        /// New secret
        #[arg(long)]
        llm_secret: Option<String>,

        /// New provider URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Deletes an external API key
    DeleteExternalApiKey {
        /// External API key ID
        external_key_id: String,
    },

    /// Lists collections
    ListCollections,

    /// Shows a specific collection
    GetCollection {
        /// Collection ID
        collection_id: String,
    },

    /// Updates collection data
    UpdateCollection {
        /// Collection ID
        collection_id: String,

        /// New name for the collection
        #[arg(long)]
        collection_name: Option<String>,

        /// New external key ID used by the collection
        #[arg(long)]
        external_key_id: Option<String>,

        /// New URL pattern for previewing items
        #[arg(long)]
        collection_preview_url_pattern: Option<String>,
    },

    /// Deletes a collection
    DeleteCollection {
        /// Collection ID
        collection_id: String,
    },

    /// Creates a collection embedded by OpenAI
    CreateCollectionOpenai {
        /// ID for the new collection
        #[arg(long)]
        collection_id: String,

        /// Name for the new collection
        #[arg(long)]
        collection_name: String,

        /// OpenAI secret
        #[arg(long)]
        llm_secret: String,

        /// Embeddings model
        #[arg(long, default_value = "text-embedding-ada-002")]
        llm_model_name: String,

        /// OpenAI account key ID from the Vantage console
        #[arg(long)]
        external_account_id: String,

        /// Additional OpenAI account key IDs (repeatable)
        #[arg(long)]
        secondary_external_account_id: Vec<String>,

        /// URL pattern for previewing items
        #[arg(long)]
        collection_preview_url_pattern: Option<String>,

        /// Dimension of the stored embeddings
        #[arg(long, default_value_t = 1536)]
        embeddings_dimension: u32,
    },

    /// Creates a collection embedded by HuggingFace
    CreateCollectionHf {
        /// ID for the new collection
        #[arg(long)]
        collection_id: String,

        /// Name for the new collection
        #[arg(long)]
        collection_name: String,

        /// HuggingFace secret
        #[arg(long)]
        llm_secret: Option<String>,

        /// HuggingFace account key ID from the Vantage console
        #[arg(long)]
        external_account_id: Option<String>,

        /// HuggingFace endpoint URL
        #[arg(long)]
        external_url: Option<String>,

        /// URL pattern for previewing items
        #[arg(long)]
        collection_preview_url_pattern: Option<String>,

        /// Dimension of the stored embeddings
        #[arg(long, default_value_t = 1536)]
        embeddings_dimension: u32,
    },

    /// Creates a collection with user provided embeddings
    CreateCollectionUpe {
        /// ID for the new collection
        #[arg(long)]
        collection_id: String,

        /// Name for the new collection
        #[arg(long)]
        collection_name: String,

        /// Dimension of the stored embeddings
        #[arg(long)]
        embeddings_dimension: u32,

        /// URL pattern for previewing items
        #[arg(long)]
        collection_preview_url_pattern: Option<String>,
    },

    /// Upserts documents from a JSONL file, or stdin
    #[command(alias = "upload-documents-from-jsonl")]
    UpsertDocumentsFromJsonl {
        /// Target collection ID
        #[arg(long)]
        collection_id: String,

        /// Batch identifier (defaults to the file name)
        #[arg(long)]
        batch_identifier: Option<String>,

        /// JSONL file; omit or pass '-' to read stdin
        #[arg(value_name = "FILE")]
        documents_file: Option<PathBuf>,
    },

    /// Upserts documents from a Parquet file
    #[command(alias = "upload-documents-from-parquet")]
    UpsertDocumentsFromParquet {
        /// Target collection ID
        #[arg(long)]
        collection_id: String,

        /// Batch identifier (defaults to the file name)
        #[arg(long)]
        batch_identifier: Option<String>,

        /// Parquet file
        #[arg(value_name = "FILE")]
        parquet_file: PathBuf,
    },

    /// Deletes documents from a collection
    DeleteDocuments {
        /// Collection ID
        collection_id: String,

        /// Comma separated document IDs
        #[arg(long)]
        document_ids: String,
    },

    /// Searches using a provided embedding
    EmbeddingSearch {
        /// Embedding as "0.1,0.2,..." or a JSON array
        #[arg(long)]
        embedding: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Searches using text
    SemanticSearch {
        /// Query text
        #[arg(long)]
        text: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Finds documents similar to one document
    MoreLikeThisSearch {
        /// Document ID
        #[arg(long)]
        document_id: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Finds documents similar to several weighted texts
    MoreLikeTheseSearch {
        /// JSON list like '[{"text": "...", "weight": 1.0}]'
        #[arg(long)]
        these: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Validates a JSONL file before upload
    ValidateJsonl {
        #[command(flatten)]
        validate: ValidateArgs,

        /// JSONL file
        #[arg(value_name = "FILE")]
        jsonl_file: PathBuf,
    },

    /// Validates a Parquet file before upload
    ValidateParquet {
        #[command(flatten)]
        validate: ValidateArgs,

        /// Parquet file
        #[arg(value_name = "FILE")]
        parquet_file: PathBuf,
    },

    /// Writes account and credentials to the config file
    Configure,
}

impl Command {
    /// Commands that never talk to the platform
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Command::ValidateJsonl { .. } | Command::ValidateParquet { .. } | Command::Configure
        )
    }
}

/// Options shared by the search subcommands
#[derive(Debug, Clone, Default, Args)]
pub struct SearchArgs {
    /// Collection to search
    #[arg(long)]
    pub collection_id: Option<String>,

    /// Search accuracy
    #[arg(long)]
    pub accuracy: Option<f32>,

    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page
    #[arg(long)]
    pub page_count: Option<u32>,

    /// Page threshold
    #[arg(long)]
    pub page_threshold: Option<u32>,

    /// Boolean filter expression
    #[arg(long)]
    pub boolean_filter: Option<String>,

    /// Field to sort by
    #[arg(long)]
    pub sort_field: Option<String>,

    /// Sort order (asc, desc)
    #[arg(long)]
    pub sort_order: Option<String>,

    /// Sort mode (semantic, field, compound)
    #[arg(long)]
    pub sort_mode: Option<String>,

    /// Field value weighting mode
    #[arg(long)]
    pub weight_mode: Option<String>,

    /// Maximum overall weight
    #[arg(long)]
    pub weight_max: Option<f32>,

    /// FIELD:VALUE:WEIGHT (repeatable)
    #[arg(long = "weighted-field-value", value_name = "FIELD:VALUE:WEIGHT")]
    pub weighted_field_values: Vec<String>,
}

impl SearchArgs {
    /// Options given on the command line, as the topmost layer
    pub fn to_defaults(&self) -> SearchDefaults {
        debug!("SearchArgs::to_defaults: called");
        SearchDefaults {
            collection_id: self.collection_id.clone(),
            accuracy: self.accuracy,
            page: self.page,
            page_count: self.page_count,
            page_threshold: self.page_threshold,
            boolean_filter: self.boolean_filter.clone(),
            sort_field: self.sort_field.clone(),
            sort_order: self.sort_order.clone(),
            sort_mode: self.sort_mode.clone(),
            weight_mode: self.weight_mode.clone(),
            weight_max: self.weight_max,
            weighted_field_values: self.weighted_field_values.clone(),
        }
    }
}

/// Options shared by the validate subcommands
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Collection type (UPE, OpenAI, HuggingFace)
    #[arg(long)]
    pub collection_type: String,

    /// Embeddings model name
    #[arg(long)]
    pub model_name: Option<String>,

    /// Embeddings dimension
    #[arg(long)]
    pub embeddings_dimension: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["vantage"]);
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["vantage", "get-collection", "c1", "-o", "csv", "-a", "acct1", "-d"]);
        assert_eq!(cli.output_type, Some(OutputFormat::Csv));
        assert_eq!(cli.account_id.as_deref(), Some("acct1"));
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Command::GetCollection { ref collection_id }) if collection_id == "c1"));
    }

    #[test]
    fn test_cli_parse_upload_alias() {
        let cli = Cli::parse_from(["vantage", "upload-documents-from-jsonl", "--collection-id", "c1", "docs.jsonl"]);
        match cli.command {
            Some(Command::UpsertDocumentsFromJsonl {
                collection_id,
                batch_identifier,
                documents_file,
            }) => {
                assert_eq!(collection_id, "c1");
                assert!(batch_identifier.is_none());
                assert_eq!(documents_file, Some(PathBuf::from("docs.jsonl")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_create_collection_openai_defaults() {
        let cli = Cli::parse_from([
            "vantage",
            "create-collection-openai",
            "--collection-id",
            "c1",
            "--collection-name",
            "Docs",
            "--llm-secret",
            "sk",
            "--external-account-id",
            "ext1",
        ]);
        match cli.command {
            Some(Command::CreateCollectionOpenai {
                llm_model_name,
                embeddings_dimension,
                secondary_external_account_id,
                ..
            }) => {
                assert_eq!(llm_model_name, "text-embedding-ada-002");
                assert_eq!(embeddings_dimension, 1536);
                assert!(secondary_external_account_id.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_search_args() {
        let cli = Cli::parse_from([
            "vantage",
            "semantic-search",
            "--text",
            "shoes",
            "--collection-id",
            "c1",
            "--weighted-field-value",
            "color:red:0.5",
            "--weighted-field-value",
            "size:42:0.1",
        ]);
        match cli.command.unwrap() {
            Command::SemanticSearch { text, search } => {
                assert_eq!(text, "shoes");
                let defaults = search.to_defaults();
                assert_eq!(defaults.collection_id.as_deref(), Some("c1"));
                assert_eq!(defaults.weighted_field_values.len(), 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_local_commands() {
        let cli = Cli::parse_from(["vantage", "validate-jsonl", "--collection-type", "upe", "docs.jsonl"]);
        assert!(cli.command.unwrap().is_local());

        let cli = Cli::parse_from(["vantage", "list-collections"]);
        assert!(!cli.command.unwrap().is_local());
    }

    #[test]
    fn test_invalid_output_type() {
        assert!(Cli::try_parse_from(["vantage", "-o", "xml", "list-collections"]).is_err());
    }

    #[test]
    fn test_output_type_limited_to_json_and_csv() {
        for format in ["text", "plaintext"] {
            assert!(Cli::try_parse_from(["vantage", "-o", format, "get-account"]).is_err());
        }
        let cli = Cli::parse_from(["vantage", "-o", "JSON", "get-account"]);
        assert_eq!(cli.output_type, Some(OutputFormat::Json));
    }
}
