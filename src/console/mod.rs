//! Command-line interface
//!
//! ```text
//! jsonapi [--config <path>] generate-authorizer <name> [--resource] [--server <name>] [--force]
//! jsonapi [--config <path>] serve [--addr <addr>]
//! ```

use crate::config::JsonApiConfig;
use crate::generator::{AuthorizerGenerator, GenerateOptions};
use crate::server::ServerBuilder;
use crate::storage::InMemoryResourceStore;
use clap::{Args, Parser, Subcommand};
use std::path::Path;

/// Process exit status of a successful command
pub const EXIT_SUCCESS: u8 = 0;

/// Process exit status of a failed command
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "jsonapi", version, about = "JSON:API server toolkit")]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "jsonapi.yaml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an authorizer that allows every operation
    GenerateAuthorizer(GenerateAuthorizerArgs),

    /// Serve the configured JSON:API servers
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateAuthorizerArgs {
    /// Authorizer name, or resource type with --resource
    pub name: String,

    /// Generate a resource-scoped authorizer
    #[arg(short, long)]
    pub resource: bool,

    /// Server of a resource-scoped authorizer
    #[arg(short, long)]
    pub server: Option<String>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl From<&GenerateAuthorizerArgs> for GenerateOptions {
    fn from(args: &GenerateAuthorizerArgs) -> Self {
        GenerateOptions {
            resource: args.resource,
            server: args.server.clone(),
            force: args.force,
        }
    }
}

/// Load the configuration file, falling back to defaults when it is absent
pub fn load_config(path: &str) -> anyhow::Result<JsonApiConfig> {
    if !Path::new(path).exists() {
        tracing::debug!(path, "configuration file not found, using defaults");
        return Ok(JsonApiConfig::default());
    }
    JsonApiConfig::from_yaml_file(path)
}

/// Run the `generate-authorizer` command
///
/// Reports the created file on stdout and any failure on stderr.
pub fn generate_authorizer(args: &GenerateAuthorizerArgs, config: &JsonApiConfig) -> u8 {
    let generator = match AuthorizerGenerator::from_config(config) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };

    match generator.generate(&args.name, &GenerateOptions::from(args)) {
        Ok(artifact) => {
            println!(
                "Authorizer {} created at {}",
                artifact.class_name,
                artifact.path.display()
            );
            EXIT_SUCCESS
        }
        Err(e) => {
            tracing::debug!(name = %args.name, code = e.error_code(), "authorizer generation failed");
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

/// Run the `serve` command until shutdown
///
/// Resources are held in memory for the lifetime of the process.
pub async fn serve(addr: &str, config: JsonApiConfig) -> u8 {
    let result = ServerBuilder::new()
        .with_repository(InMemoryResourceStore::new())
        .with_config(config)
        .serve(addr)
        .await;

    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> u8 {
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };

    match cli.command {
        Command::GenerateAuthorizer(args) => generate_authorizer(&args, &config),
        Command::Serve { addr } => serve(&addr, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_authorizer() {
        let cli = Cli::try_parse_from([
            "jsonapi",
            "generate-authorizer",
            "posts",
            "--resource",
            "--server",
            "v2",
            "--force",
        ])
        .unwrap();

        assert_eq!(cli.config, "jsonapi.yaml");
        match cli.command {
            Command::GenerateAuthorizer(args) => {
                assert_eq!(args.name, "posts");
                assert!(args.resource);
                assert_eq!(args.server.as_deref(), Some("v2"));
                assert!(args.force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["jsonapi", "serve", "--config", "other.yaml"]).unwrap();

        assert_eq!(cli.config, "other.yaml");
        assert!(matches!(cli.command, Command::Serve { ref addr } if addr == "127.0.0.1:3000"));
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");

        let config = load_config(path.to_str().unwrap()).unwrap();
        assert!(config.servers.is_empty());
    }
}
