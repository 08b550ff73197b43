//! Generate command - write a timestamped file of synthetic requests.

use std::path::PathBuf;

use approval::request::{write_requests, IdScheme};
use approval::RequestGenerator;
use chrono::Local;
use colored::Colorize;

pub fn run(
    count: usize,
    output_dir: PathBuf,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let generator = match seed {
        Some(seed) => RequestGenerator::with_seed(seed),
        None => RequestGenerator::new(),
    };
    let requests = generator
        .with_id_scheme(IdScheme::sequential())
        .generate(count)?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("requests_{}.csv", stamp));
    write_requests(&path, &requests)?;

    println!(
        "{} {} requests in {}",
        "Created".green().bold(),
        requests.len(),
        path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval::request::read_requests;
    use tempfile::TempDir;

    #[test]
    fn test_writes_numbered_requests() {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().join("pending");

        run(5, output_dir.clone(), Some(3)).unwrap();

        let files: Vec<PathBuf> = std::fs::read_dir(&output_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("requests_") && name.ends_with(".csv"));

        let requests = read_requests(&files[0]).unwrap();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[0].id, "REQ-1000");
        assert_eq!(requests[4].id, "REQ-1004");
    }

    #[test]
    fn test_zero_requests_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(run(0, dir.path().to_path_buf(), Some(3)).is_err());
    }
}
