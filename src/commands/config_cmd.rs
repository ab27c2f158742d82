use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::{Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        print_value("api_url", &config.api_url, |v| v.clone());
                        print_value("data_dir", &config.data_dir, |v| {
                            v.display().to_string()
                        });
                        print_value("timeout_secs", &config.timeout_secs, |v| v.to_string());
                        print_value("default_address", &config.default_address, |v| {
                            v.clone().unwrap_or_else(|| "(not set)".to_string())
                        });
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Path => {
                let path = config
                    .config_file
                    .clone()
                    .unwrap_or_else(Config::default_config_path);
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

fn print_value<T>(key: &str, value: &ConfigValue<T>, render: impl Fn(&T) -> String) {
    println!("{}: {}", key, render(&value.value));
    println!("  source: {}", value.source);
    println!();
}
