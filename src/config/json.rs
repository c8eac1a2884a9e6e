use std::{fs, path::Path};

use super::Config;
use crate::Result;

impl Config {
    /// Parses and validates a `Config` from a JSON string.
    ///
    /// # Errors
    /// Returns `AdapterErr::Json` if the document is malformed or names an
    /// unknown architecture, and `AdapterErr::InvalidConfig` if it fails
    /// validation.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a `Config` from a JSON file.
    ///
    /// # Errors
    /// Returns `AdapterErr::Io` if the file cannot be read, otherwise the same
    /// errors as `from_json_str`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Architecture, AdapterErr};

    const MLP: &str = r#"{
        "model": { "input_size": 4, "hidden_sizes": [16, 8], "output_size": 3 },
        "training": { "model_architecture": "mlp", "lr": 0.001, "scheduler_patience": 5 }
    }"#;

    #[test]
    fn parses_a_minimal_document_with_defaults() {
        let config = Config::from_json_str(MLP).unwrap();

        assert_eq!(config.training.model_architecture, Architecture::Mlp);
        assert_eq!(config.model.hidden_sizes, [16, 8]);
        assert_eq!(config.model.output_size, 3);
        assert_eq!(config.model.kernel_size, 3);
        assert_eq!(config.training.scheduler_patience, 5);
        assert_eq!(config.training.seed, None);
        assert_eq!(config.training.batch_size, 32);
    }

    #[test]
    fn every_selector_deserializes() {
        for (name, arch) in [
            ("mlp", Architecture::Mlp),
            ("cnn1d", Architecture::Cnn1d),
            ("cnn2d", Architecture::Cnn2d),
        ] {
            let parsed: Architecture = serde_json::from_str(&format!("\"{name}\"")).unwrap();
            assert_eq!(parsed, arch);
            assert_eq!(arch.as_str(), name);
        }
    }

    #[test]
    fn unknown_selector_is_a_parse_error() {
        let doc = MLP.replace("\"mlp\"", "\"transformer\"");
        assert!(matches!(
            Config::from_json_str(&doc),
            Err(AdapterErr::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            Config::load("/definitely/not/here.json"),
            Err(AdapterErr::Io(_))
        ));
    }
}
