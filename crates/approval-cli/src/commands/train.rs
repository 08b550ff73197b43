//! Train command - fit the approval model on synthetic data.

use std::path::PathBuf;

use approval::scoring::{train, TrainingConfig};
use approval::PortalConfig;
use colored::Colorize;

pub fn run(
    config: &PortalConfig,
    output: Option<PathBuf>,
    samples: usize,
    seed: u64,
    epochs: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let training = TrainingConfig {
        samples,
        seed,
        epochs,
        ..TrainingConfig::default()
    };

    println!(
        "{} on {} synthetic requests (seed {})",
        "Training approval model".cyan().bold(),
        samples.to_string().white().bold(),
        seed
    );

    let outcome = train(&training)?;

    println!();
    println!("{}", outcome.report);
    println!();

    let output = output.unwrap_or_else(|| config.model_path.clone());
    outcome.model.save(&output)?;

    println!(
        "{} Model trained on {} requests and saved to {}",
        "Done:".green().bold(),
        outcome.train_size,
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval::ApprovalModel;
    use tempfile::TempDir;

    #[test]
    fn test_saves_loadable_model() {
        let dir = TempDir::new().unwrap();
        let config = PortalConfig {
            model_path: dir.path().join("models").join("approval.json"),
            ..PortalConfig::default()
        };

        run(&config, None, 200, 7, 20).unwrap();

        let model = ApprovalModel::load(&config.model_path).unwrap();
        assert!(model.fingerprint.is_some());
    }

    #[test]
    fn test_output_overrides_model_path() {
        let dir = TempDir::new().unwrap();
        let config = PortalConfig {
            model_path: dir.path().join("default.json"),
            ..PortalConfig::default()
        };
        let output = dir.path().join("custom.json");

        run(&config, Some(output.clone()), 200, 7, 20).unwrap();

        assert!(output.exists());
        assert!(!config.model_path.exists());
    }

    #[test]
    fn test_too_few_samples_fails() {
        let dir = TempDir::new().unwrap();
        let config = PortalConfig {
            model_path: dir.path().join("approval.json"),
            ..PortalConfig::default()
        };

        assert!(run(&config, None, 3, 7, 20).is_err());
        assert!(!config.model_path.exists());
    }
}
