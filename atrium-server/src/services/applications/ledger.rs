use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::JobApplication;

const HEADER: &str = "submittedAt,name,email,phone,role,message\n";

/// Append-only spreadsheet of submitted applications.
///
/// One CSV row per application, written at submission time. The file is
/// the hand-off to the hiring folks, who open it directly; documents in
/// the applications collection exist for the admin API on top of it.
#[derive(Clone)]
pub struct ApplicationsLedger {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ApplicationsLedger {
    /// Open the ledger, creating the file with a header row on first use.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating ledger dir {}", parent.display()))?;
        }

        if !tokio::fs::try_exists(&path).await? {
            tokio::fs::write(&path, HEADER)
                .await
                .with_context(|| format!("writing ledger header {}", path.display()))?;
        }

        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row. Rows from concurrent submissions are serialized by
    /// the lock so they never interleave mid-line.
    pub async fn append(&self, application: &JobApplication) -> Result<()> {
        let row = format!(
            "{},{},{},{},{},{}\n",
            csv_field(&application.submitted_at.to_rfc3339()),
            csv_field(&application.name),
            csv_field(&application.email),
            csv_field(application.phone.as_deref().unwrap_or("")),
            csv_field(application.role.as_deref().unwrap_or("")),
            csv_field(&application.message),
        );

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening ledger {}", self.path.display()))?;
        file.write_all(row.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

/// RFC 4180 quoting: wrap fields containing separators or quotes, double
/// any embedded quotes.
fn csv_field(raw: &str) -> String {
    let needs_quoting = raw
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\n' | '\r'));

    if needs_quoting {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn application(name: &str, message: &str) -> JobApplication {
        JobApplication {
            id: "application:test".into(),
            name: name.into(),
            email: "a@example.com".into(),
            phone: None,
            role: Some("Backend Engineer".into()),
            message: message.into(),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn fields_with_separators_get_quoted() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn appends_land_after_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.csv");

        let ledger = ApplicationsLedger::open(&path).await.unwrap();
        ledger.append(&application("Ada", "hello")).await.unwrap();
        ledger
            .append(&application("Grace", "a, quoted message"))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "submittedAt,name,email,phone,role,message");
        assert!(lines[1].contains("Ada"));
        assert!(lines[2].ends_with("\"a, quoted message\""));
    }

    #[tokio::test]
    async fn reopening_does_not_rewrite_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.csv");

        {
            let ledger = ApplicationsLedger::open(&path).await.unwrap();
            ledger.append(&application("Ada", "hello")).await.unwrap();
        }
        let _ledger = ApplicationsLedger::open(&path).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("submittedAt").count(), 1);
        assert!(contents.contains("Ada"));
    }
}
