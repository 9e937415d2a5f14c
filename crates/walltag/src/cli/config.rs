//! The `walltag config` command: inspect and scaffold the config file.

use std::path::Path;

use clap::{Args, Subcommand};
use walltag_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the resolved configuration as TOML
    Show,

    /// Print the config file location
    Path,

    /// Write a starter config file with the default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show(),
        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
            Ok(())
        }
        ConfigCommand::Init { force } => init(&Config::default_path(), force),
    }
}

/// Print where the config came from, then the resolved values.
fn show() -> anyhow::Result<()> {
    let path = Config::default_path();
    if path.exists() {
        println!("# loaded from {}", path.display());
    } else {
        println!("# built-in defaults ({} not present)", path.display());
    }

    let config = Config::load()?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Write the starter config to `path`, refusing to clobber without `force`.
fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, starter_config()?)?;

    println!("Configuration initialized at: {}", path.display());
    Ok(())
}

/// Default config rendered with a short orientation header.
fn starter_config() -> anyhow::Result<String> {
    let rendered = Config::default().to_toml()?;
    Ok(format!(
        "# walltag configuration\n\
         #\n\
         # [labels] categories is the tag vocabulary scored against every image;\n\
         # [tagging] top_k is how many of them land in each filename. After\n\
         # changing [model] variant, run `walltag models download` again.\n\n\
         {rendered}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_config_parses_back_as_valid_toml() {
        let rendered = starter_config().unwrap();
        let parsed: toml::Value = toml::from_str(&rendered).unwrap();

        assert!(parsed.get("labels").is_some());
        assert!(parsed.get("model").is_some());
        assert!(parsed.get("tagging").is_some());
    }

    #[test]
    fn starter_config_leads_with_the_header() {
        let rendered = starter_config().unwrap();
        assert!(rendered.starts_with("# walltag configuration"));
    }

    #[test]
    fn init_refuses_to_clobber_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging]\ntop_k = 3\n").unwrap();

        let err = init(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[tagging]\ntop_k = 3\n"
        );
    }

    #[test]
    fn init_force_overwrites_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging]\ntop_k = 3\n").unwrap();

        init(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("top_k = 1"));
    }

    #[test]
    fn init_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init(&path, false).unwrap();
        assert!(path.exists());
    }
}
