use std::path::PathBuf;

use async_trait::async_trait;
use mockall::mock;
use ndfd::forecasts::{Error, FetchXml};
use slog::{o, Discard, Logger};

mock! {
    pub Fetcher {}
    #[async_trait]
    impl FetchXml for Fetcher {
        async fn fetch_xml(&self, url: &str) -> Result<String, Error>;
    }
}

pub fn test_logger() -> Logger {
    Logger::root(Discard, o!())
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}
