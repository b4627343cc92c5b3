use anyhow::Result;
use dotenvy::dotenv;

fn default_dataset_path() -> String {
    "vehicles_us.csv".to_string()
}

fn default_max_preview_rows() -> usize {
    100
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_path: String,
    pub max_preview_rows: usize,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let dataset_path = std::env::var("DATASET_PATH")
            .unwrap_or_else(|_| default_dataset_path());

        let max_preview_rows = match std::env::var("MAX_PREVIEW_ROWS") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid MAX_PREVIEW_ROWS: {}", e))?,
            Err(_) => default_max_preview_rows(),
        };

        Ok(Config {
            dataset_path,
            max_preview_rows,
        })
    }
}
