//! Export delivery

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Destination for exported settings documents
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Deliver `contents` under `file_name`, returning where it ended up
    async fn deliver(&self, file_name: &str, contents: &str) -> anyhow::Result<PathBuf>;
}

/// `site-settings-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("site-settings-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "site-settings-2026-03-07.json");
    }
}
