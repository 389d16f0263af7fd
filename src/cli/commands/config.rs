use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::output::{info, success};
use crate::core::config::{default_config, load_config, save_config};
use crate::TaxbridgeError;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with every default filled in
    Init {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Configuration file (defaults apply when omitted)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                return Err(TaxbridgeError::Configuration(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ))
                .into());
            }
            save_config(&path, &default_config())?;
            success(&format!("Wrote default configuration to {}", path.display()));
        }
        ConfigCommands::Show { config } => {
            let config = match &config {
                Some(path) => load_config(path)?,
                None => {
                    info("No configuration file given; showing defaults");
                    default_config()
                }
            };
            config.validate()?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| TaxbridgeError::Serialization(e.to_string()))?;
            println!("{}", rendered);
        }
    }
    Ok(())
}
