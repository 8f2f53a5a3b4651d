use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "fvclient",
    version,
    about = "Call the KBaseFeatureValues JSON-RPC service",
    after_help = "Examples:\n  fvclient --url https://kbase.us/services/feature_values/jsonrpc status\n  fvclient descriptor my_ws/expr_matrix\n  fvclient call get_matrix_stat '{\"input_data\":\"my_ws/expr_matrix\"}'"
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Service endpoint
    #[arg(
        long,
        env = "FEATURE_VALUES_URL",
        default_value = "https://kbase.us/services/feature_values/jsonrpc"
    )]
    pub url: String,

    /// Auth token; validated against the auth service unless --skip-token-validation
    #[arg(long, env = "KB_AUTH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Auth service base URL used to validate --token
    #[arg(long, default_value = jsonrpc::auth::DEFAULT_AUTH_URL)]
    pub auth_url: String,

    /// Use --token as-is without asking the auth service
    #[arg(long)]
    pub skip_token_validation: bool,

    /// Pin calls to this service version
    #[arg(long)]
    pub service_version: Option<String>,

    /// Read timeout in milliseconds (0 waits indefinitely)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Allow the token to be sent over plain http
    #[arg(long)]
    pub insecure: bool,

    /// Accept any TLS certificate
    #[arg(long)]
    pub trust_all_certs: bool,

    /// Stream request bodies instead of buffering them
    #[arg(long)]
    pub streaming: bool,

    /// Also write the raw response body to this file
    #[arg(long, value_name = "FILE")]
    pub capture: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show service status (no token needed)
    Status,

    /// Describe an expression matrix
    Descriptor {
        /// Workspace reference, e.g. `my_ws/expr_matrix`
        matrix: String,
    },

    /// Call any method with JSON positional arguments
    Call {
        /// Method name; bare names are prefixed with the service name
        method: String,

        /// One JSON value per positional argument
        params: Vec<String>,
    },
}
