//! Spec command

use clap::Parser;
use color_eyre::eyre::Result;

use crate::{config::Config, file::spec_to_toml};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct SpecCmd {
    /// Print JSON instead of TOML
    #[clap(long)]
    pub json: bool,
}

impl SpecCmd {
    /// Render the validated network parameters of `config`.
    pub fn run(&self, config: &Config) -> Result<String> {
        config.das.validate()?;

        if self.json {
            Ok(serde_json::to_string_pretty(&config.das)?)
        } else {
            Ok(spec_to_toml(&config.das)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use peerdas_types::DasSpec;

    use super::*;

    #[test]
    fn test_renders_effective_spec() {
        let mut config = Config::default();
        config.das.samples_per_slot = 16;

        let toml_out = SpecCmd::default().run(&config).unwrap();
        assert!(toml_out.contains("samples_per_slot = 16"));

        let json_out = SpecCmd { json: true }.run(&config).unwrap();
        let parsed: DasSpec = serde_json::from_str(&json_out).unwrap();
        assert_eq!(parsed, config.das);
    }

    #[test]
    fn test_invalid_spec_is_an_error() {
        let mut config = Config::default();
        config.das.number_of_custody_groups = 0;
        assert!(SpecCmd::default().run(&config).is_err());
    }
}
