//! `fvclient`: command-line front end for the `KBaseFeatureValues` service.
//!
//! Composition root. Responsibilities:
//!
//! 1. **Parse arguments** with `clap`, layering flags over
//!    [`ClientConfig::from_env`].
//! 2. **Wire logging**: `tracing-subscriber` on stderr, human-readable or JSON,
//!    filtered by `RUST_LOG` (default `warn`).
//! 3. **Build the client** anonymously or from a token, then run one command
//!    and print its result as pretty JSON on stdout.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use feature_values::FeatureValuesClient;
use jsonrpc::{
    AuthPolicy, AuthToken, ClientConfig, ContextEntry, HttpAuthenticator, RpcContext,
};
use model::{GetMatrixDescriptorParams, ObjectRef};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConnectionArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = connect(&cli.connection).await?;
    let context = RpcContext::new_run();

    let output = match cli.command {
        Command::Status => {
            let context = context.with_entry(ContextEntry::method_call("status", None));
            Value::Object(client.status(Some(&context)).await?)
        }
        Command::Descriptor { matrix } => {
            let input_data = ObjectRef::new(matrix).context("matrix reference must not be empty")?;
            let descriptor = client
                .get_matrix_descriptor(GetMatrixDescriptorParams { input_data }, Some(&context))
                .await?;
            serde_json::to_value(descriptor)?
        }
        Command::Call { method, params } => {
            let params = params
                .iter()
                .map(|raw| {
                    serde_json::from_str(raw).with_context(|| format!("argument is not JSON: {raw}"))
                })
                .collect::<Result<Vec<Value>>>()?;
            // The server decides whether this method needs the token.
            let results = client
                .call_raw(&method, params, AuthPolicy::Optional, Some(&context))
                .await?;
            Value::Array(results)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn connect(args: &ConnectionArgs) -> Result<FeatureValuesClient> {
    let mut config = ClientConfig::from_env().context("invalid environment configuration")?;
    if let Some(ms) = args.timeout_ms {
        config = config.with_read_timeout(Some(Duration::from_millis(ms)));
    }
    if args.service_version.is_some() {
        config = config.with_service_version(args.service_version.clone());
    }
    config.insecure_http_allowed |= args.insecure;
    config.trust_all_certificates |= args.trust_all_certs;
    config.streaming_mode |= args.streaming;

    let client = match &args.token {
        None => FeatureValuesClient::new(&args.url)?,
        Some(token) if args.skip_token_validation => {
            FeatureValuesClient::with_validated_token(&args.url, AuthToken::new(token.as_str(), ""))?
        }
        Some(token) => {
            let auth = HttpAuthenticator::with_urls(&args.auth_url, jsonrpc::auth::DEFAULT_LOGIN_URL)?;
            FeatureValuesClient::with_token_and_authenticator(&args.url, token, &auth)
                .await
                .context("token validation failed")?
        }
    };
    debug!(?config, "applying client configuration");
    client.set_config(config);

    if let Some(path) = &args.capture {
        info!(path = %path.display(), "capturing next response");
        client.set_file_for_next_rpc_response(path);
    }
    Ok(client)
}
