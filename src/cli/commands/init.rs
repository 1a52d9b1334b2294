//! Init command - Write a starter configuration file

use colored::Colorize;
use std::fs;

use super::InitArgs;
use crate::cli::exit_codes;
use crate::config::Config;
use crate::error::{CensusError, ConfigError};

const HEADER: &str = "\
# langcensus configuration
#
# Credentials are read from the environment variables named in [credentials].
# Every value can be overridden on the command line, see `langcensus scan --help`.

";

pub async fn execute(args: InitArgs) -> Result<i32, CensusError> {
    let config_path = args.path.as_path();

    if config_path.exists() && !args.force {
        eprintln!(
            "{} {} already exists. Use --force to overwrite.",
            "Error:".red().bold(),
            config_path.display()
        );
        return Ok(exit_codes::ERROR);
    }

    let content = format!("{}{}", HEADER, Config::template().to_toml()?);
    fs::write(config_path, content).map_err(|e| ConfigError::FileWrite {
        path: config_path.display().to_string(),
        source: e,
    })?;

    println!(
        "{} Created {}",
        "Success:".green().bold(),
        config_path.display().to_string().cyan()
    );

    println!("\nNext steps:");
    println!("  1. Set workspace and project_keys in {}", config_path.display().to_string().cyan());
    println!("  2. Export BB_USER and BB_APP_PASSWORD");
    println!("  3. Run {}", "langcensus scan".cyan());

    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".langcensus.toml");

        let code = execute(InitArgs {
            force: false,
            path: path.clone(),
        })
        .await
        .unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.workspace, "example");
        assert_eq!(config.project_keys, vec!["ABC", "XYZ"]);
        assert!(fs::read_to_string(&path).unwrap().starts_with("# langcensus"));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".langcensus.toml");
        fs::write(&path, "workspace = \"mine\"\n").unwrap();

        let code = execute(InitArgs {
            force: false,
            path: path.clone(),
        })
        .await
        .unwrap();

        assert_eq!(code, exit_codes::ERROR);
        assert_eq!(fs::read_to_string(&path).unwrap(), "workspace = \"mine\"\n");
    }

    #[tokio::test]
    async fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".langcensus.toml");
        fs::write(&path, "workspace = \"mine\"\n").unwrap();

        let code = execute(InitArgs {
            force: true,
            path: path.clone(),
        })
        .await
        .unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        assert_eq!(Config::load_from_file(&path).unwrap().workspace, "example");
    }
}
