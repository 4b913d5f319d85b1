//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            let path = match path {
                Some(path) => path.to_path_buf(),
                None => Config::default_path()?,
            };
            if path.exists() && !force {
                println!(
                    "{}",
                    formatter.warning(&format!(
                        "{} already exists; use --force to overwrite",
                        path.display()
                    ))
                );
                return Ok(());
            }
            Config::default().save(&path)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
    }
    Ok(())
}
