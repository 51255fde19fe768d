//! Command-line interface.
//!
//! Without a subcommand the binary starts the server. Subcommands:
//! - `hash-password <PASSWORD>` - print an Argon2 hash for seeding users by hand
//! - `config check` - validate the configuration file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::auth::password::{Argon2Hasher, CredentialHasher};
use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "saj")]
#[command(author, version, about = "Scheduling backend for law offices", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "saj.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Secret used to sign session tokens (overrides the config file)
    #[arg(long, env = "SAJ_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the Argon2 hash of a password
    HashPassword {
        password: String,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Check,
}

pub fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::HashPassword { password }) => cmd_hash_password(password),
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        // No subcommand means start the server, handled in main.rs
        None => Ok(()),
    }
}

fn cmd_hash_password(password: &str) -> Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    let hash = Argon2Hasher::default()
        .hash(password)
        .context("Failed to hash password")?;
    println!("{}", hash);
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!("[!!] Configuration file not found: {}", config_path.display());
        println!();
        println!("A default configuration will be used when starting the server.");
        println!("To create a custom configuration, copy saj.example.toml to saj.toml");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("Server:");
            println!("  Listen:       {}:{}", config.server.host, config.server.port);
            println!("  CORS origins: {}", config.server.cors_origins.join(", "));
            println!();
            println!("Database:");
            println!("  URL:          {}", config.database.url);
            println!("  Connections:  {}", config.database.max_connections);
            println!();
            println!("Auth:");
            println!(
                "  Token life:   {}s",
                config.auth.cookie_max_age_secs()
            );
            println!(
                "  Secure cookie: {}",
                if config.auth.cookie_secure { "Yes" } else { "No" }
            );
            println!();

            let mut warnings = Vec::new();
            if config.auth.jwt_secret.is_empty() && cli.jwt_secret.is_none() {
                warnings.push(
                    "No JWT secret configured - a random one is generated and sessions end on restart",
                );
            }
            if !config.auth.cookie_secure {
                warnings.push("Session cookie is not marked Secure - use only over plain-HTTP development setups");
            }

            if !warnings.is_empty() {
                println!("Warnings:");
                for warning in warnings {
                    println!("  [!] {}", warning);
                }
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            anyhow::bail!("Invalid configuration file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_defaults() {
        let cli = Cli::try_parse_from(["saj"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("saj.toml"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["saj", "hash-password", "s3cret"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::HashPassword { ref password }) if password == "s3cret"
        ));

        let cli = Cli::try_parse_from(["saj", "-c", "other.toml", "config", "check"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(
            cli.command,
            Some(Commands::Config(ConfigCommands::Check))
        ));
    }

    #[test]
    fn test_config_check_missing_file_is_ok() {
        let cli = Cli::try_parse_from(["saj", "-c", "/nonexistent/saj.toml", "config", "check"])
            .unwrap();
        assert!(run_command(&cli).is_ok());
    }
}
