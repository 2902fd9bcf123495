use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use anyhow::Result;

use usage_ingest::dispatch::BillingBackend;
use usage_ingest::error::DispatchError;
use usage_ingest::models::{CallRecord, InternetRecord, TextRecord};

pub const ACCOUNTS_JSON: &str = r#"[
    {"phone": "1234567890", "account_id": "ACC-1"},
    {"phone": "(555) 000-1111", "account_id": "ACC-2"}
]"#;

pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Temp directory holding `accounts.json`.
#[allow(dead_code)]
pub fn setup_test_environment() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    create_test_file(temp_dir.path(), "accounts.json", ACCOUNTS_JSON)?;
    Ok(temp_dir)
}

/// Billing backend that remembers what it was given and can be told to
/// refuse calls.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingBackend {
    pub texts: Vec<TextRecord>,
    pub calls: Vec<CallRecord>,
    pub internet: Vec<InternetRecord>,
    pub refuse_calls: bool,
}

#[allow(dead_code)]
impl RecordingBackend {
    pub fn total(&self) -> usize {
        self.texts.len() + self.calls.len() + self.internet.len()
    }
}

impl BillingBackend for RecordingBackend {
    fn submit_text_usage(&mut self, record: &TextRecord) -> Result<(), DispatchError> {
        self.texts.push(record.clone());
        Ok(())
    }

    fn submit_call_usage(&mut self, record: &CallRecord) -> Result<(), DispatchError> {
        if self.refuse_calls {
            return Err(DispatchError::Rejected("call billing offline".into()));
        }
        self.calls.push(record.clone());
        Ok(())
    }

    fn submit_internet_usage(&mut self, record: &InternetRecord) -> Result<(), DispatchError> {
        self.internet.push(record.clone());
        Ok(())
    }
}
