use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Settings of the demo run. Every field has a default, so a JSON file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seeds dataset synthesis and weight initialization.
    pub seed: u64,
    pub input_dim: usize,
    pub units: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub batch_size: usize,
    pub test_batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub epsilon: f64,
    /// Attach the per-batch loss logger during training.
    pub with_batch_logger: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            seed: 43,
            input_dim: 32,
            units: 1,
            train_samples: 1000,
            test_samples: 10_000,
            batch_size: 256,
            test_batch_size: 512,
            epochs: 3,
            learning_rate: 0.01,
            momentum: 0.0,
            epsilon: 1e-7,
            with_batch_logger: false,
        }
    }
}

impl RunConfig {
    /// Deserializes a `RunConfig` from a JSON file.
    pub fn load_json(path: &str) -> Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: RunConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("input_dim", self.input_dim),
            ("units", self.units),
            ("train_samples", self.train_samples),
            ("test_samples", self.test_samples),
            ("batch_size", self.batch_size),
            ("test_batch_size", self.test_batch_size),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(Error::InvalidConfig(format!("{name} must be at least 1")));
        }
        // Synthetic labels have a single column.
        if self.units != 1 {
            return Err(Error::InvalidConfig(format!(
                "units must be 1 to match the label width, got {}",
                self.units
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: RunConfig =
            serde_json::from_str(r#"{ "epochs": 5, "with_batch_logger": true }"#).unwrap();
        assert_eq!(config.epochs, 5);
        assert!(config.with_batch_logger);
        assert_eq!(config.seed, 43);
        assert_eq!(config.batch_size, 256);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let config = RunConfig { batch_size: 0, ..RunConfig::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn units_must_match_label_width() {
        let config = RunConfig { units: 2, ..RunConfig::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(matches!(crate::driver::run(&config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_json_reads_a_file() {
        let path = std::env::temp_dir().join(format!("tapeloop-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "seed": 7, "learning_rate": 0.1 }"#).unwrap();
        let config = RunConfig::load_json(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.learning_rate, 0.1);

        assert!(matches!(
            RunConfig::load_json("/nonexistent/tapeloop.json"),
            Err(Error::Io(_))
        ));
    }
}
