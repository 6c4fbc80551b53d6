//! Init command implementation

use std::fs;
use std::path::Path;

use clap::Args;
use tracing::info;
use trellis_core::{TrellisError, DEFAULT_GRAPHQL_PATH, DEFAULT_PLAYGROUND_VERSION};

/// Init command arguments
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Service name
    #[arg(default_value = "my-graph")]
    pub name: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: String,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self) -> Result<(), TrellisError> {
        info!("Initializing new Trellis service: {}", self.name);

        let output_dir = Path::new(&self.output);
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let config_path = output_dir.join("trellis.yaml");
        if config_path.exists() && !self.force {
            return Err(TrellisError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            )));
        }
        fs::write(&config_path, self.generate_config())?;
        info!("Created: {}", config_path.display());

        let env_path = output_dir.join(".env.example");
        fs::write(&env_path, self.generate_env_example())?;
        info!("Created: {}", env_path.display());

        println!("\nTrellis service initialized!");
        println!("\nNext steps:");
        println!("  1. Copy .env.example to .env and adjust PORT if needed");
        println!("  2. Edit trellis.yaml to tune CORS, body limits and uploads");
        println!("  3. Run: trellis run -f {}", config_path.display());

        Ok(())
    }

    /// Generate configuration file content
    fn generate_config(&self) -> String {
        format!(
            r#"# Trellis configuration

name: {name}

server:
  host: 0.0.0.0
  port: {{{{ env.PORT | 4000 }}}}
  timeout_secs: 30

graphql:
  path: {path}

# true (defaults), false, or a policy object
cors: true

body_parser:
  json_limit: 1048576
  form_limit: 57344

health_check:
  enabled: true

playground:
  version: {version}

uploads:
  max_field_size: 1000000
  max_files: 10
"#,
            name = self.name,
            path = DEFAULT_GRAPHQL_PATH,
            version = DEFAULT_PLAYGROUND_VERSION,
        )
    }

    /// Generate .env.example content
    fn generate_env_example(&self) -> String {
        r#"# Port the server listens on
PORT=4000

# Set to "production" to disable the playground and debug output
TRELLIS_ENV=development
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::Toggle;

    fn command(output: &str) -> InitCommand {
        InitCommand {
            name: "shop-graph".to_string(),
            output: output.to_string(),
            force: false,
        }
    }

    #[test]
    fn test_generated_config_parses() {
        let config = trellis_parser::parse_string(&command(".").generate_config()).unwrap();
        assert_eq!(config.name, "shop-graph");
        assert_eq!(config.graphql.path, "/graphql");
        assert_eq!(config.cors, Toggle::Default);
        assert_eq!(config.playground.version, DEFAULT_PLAYGROUND_VERSION);
        match config.uploads {
            Toggle::Custom(uploads) => assert_eq!(uploads.max_files, Some(10)),
            other => panic!("unexpected uploads config: {:?}", other),
        }
    }

    #[test]
    fn test_execute_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("svc");
        let cmd = command(output.to_str().unwrap());

        cmd.execute().unwrap();
        assert!(output.join("trellis.yaml").exists());
        assert!(output.join(".env.example").exists());

        // A second run must not clobber the file
        assert!(cmd.execute().is_err());
        let forced = InitCommand { force: true, ..cmd };
        assert!(forced.execute().is_ok());
    }
}
