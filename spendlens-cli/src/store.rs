//! JSON-lines ledger: one `TransactionRecord` per line, appended in entry order.

use rust_decimal::Decimal;
use spendlens_core::{DateRange, OwnerId, StoreError, TransactionRecord, TransactionStore};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record in the file, all owners. A missing file is an empty ledger.
    async fn load(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|e| StoreError::Malformed {
                line: i + 1,
                reason: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    pub async fn append(&self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let buf = encode_lines(records)?;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        f.write_all(buf.as_bytes()).await?;
        f.flush().await?;
        Ok(())
    }

    /// Remove the owner's record with `id`, rewriting the file in place.
    pub async fn delete(&self, owner: &OwnerId, id: &str) -> Result<TransactionRecord, StoreError> {
        let mut records = self.load().await?;
        let pos = records
            .iter()
            .position(|r| r.id == id && r.belongs_to(owner))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = records.remove(pos);

        let buf = encode_lines(&records)?;
        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, buf).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(removed)
    }
}

fn encode_lines(records: &[TransactionRecord]) -> Result<String, StoreError> {
    let mut buf = String::new();
    for record in records {
        buf.push_str(&serde_json::to_string(record).map_err(std::io::Error::from)?);
        buf.push('\n');
    }
    Ok(buf)
}

impl TransactionStore for JsonlStore {
    async fn find(&self, owner: &OwnerId, range: DateRange) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|r| r.belongs_to(owner) && range.contains(r.occurred_at))
            .collect())
    }

    async fn sum(&self, owner: &OwnerId) -> Result<Decimal, StoreError> {
        Ok(self
            .load()
            .await?
            .iter()
            .filter(|r| r.belongs_to(owner))
            .map(|r| r.amount)
            .sum())
    }
}
