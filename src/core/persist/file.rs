//! Disk-backed retry queue
//!
//! Each tenant gets a directory named after the digest of its instrumentation key.
//! Every queued batch is one JSON file whose name starts with a zero-padded
//! millisecond timestamp and a per-process sequence number, so sorting names
//! gives FIFO order, including across restarts.
//!
//! Records are written to a `.tmp` sibling, fsynced, then renamed into place.
//! A crash mid-write leaves only a `.tmp` file, which is never read back.

use super::traits::{PersistentQueue, QueueStats};
use crate::config::{EvictionPolicy, StorageConfig};
use crate::domain::{Batch, CourierError, InstrumentationKey, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const RECORD_SUFFIX: &str = ".ai.json";
const TEMP_SUFFIX: &str = ".tmp";

/// A queued record on disk
#[derive(Debug, Clone)]
struct RecordFile {
    path: PathBuf,
    bytes: u64,
    created_ms: i64,
}

/// File-system implementation of [`PersistentQueue`]
///
/// # Example
///
/// ```no_run
/// use courier::config::StorageConfig;
/// use courier::core::persist::{FileSystemQueue, PersistentQueue};
/// use courier::domain::{Batch, Envelope, InstrumentationKey};
///
/// # async fn example() -> courier::domain::Result<()> {
/// let key = InstrumentationKey::new("ikey-123").unwrap();
/// let queue = FileSystemQueue::new(&StorageConfig::default(), &key);
///
/// assert!(queue.push(&Batch::new(vec![Envelope::new("evt")])).await);
/// let oldest = queue.shift().await?;
/// # Ok(())
/// # }
/// ```
pub struct FileSystemQueue {
    directory: PathBuf,
    max_bytes_on_disk: u64,
    retention: Duration,
    eviction: EvictionPolicy,
    sequence: AtomicU64,
    /// Serializes pushes and shifts so budget accounting stays consistent
    lock: Mutex<()>,
}

impl FileSystemQueue {
    /// Create a queue for one tenant
    pub fn new(config: &StorageConfig, key: &InstrumentationKey) -> Self {
        Self {
            directory: config.path.join(key.storage_digest()),
            max_bytes_on_disk: config.max_bytes_on_disk,
            retention: Duration::from_secs(config.retention_seconds),
            eviction: config.eviction,
            sequence: AtomicU64::new(0),
            lock: Mutex::new(()),
        }
    }

    /// Directory holding this tenant's records
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Delete records older than the retention period
    ///
    /// Returns the number of records removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let _guard = self.lock.lock().await;
        self.purge_expired_locked().await
    }

    async fn purge_expired_locked(&self) -> Result<usize> {
        // A retention too long to subtract from now never expires anything
        let Some(cutoff) = i64::try_from(self.retention.as_millis())
            .ok()
            .and_then(|retention_ms| Utc::now().timestamp_millis().checked_sub(retention_ms))
        else {
            return Ok(0);
        };
        let mut removed = 0;

        for record in self.list_records().await? {
            if record.created_ms >= cutoff {
                break;
            }
            remove_if_present(&record.path).await?;
            removed += 1;
        }

        if removed > 0 {
            info!(
                directory = %self.directory.display(),
                removed = removed,
                "Purged expired retry records"
            );
        }
        Ok(removed)
    }

    async fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.directory).await.map_err(|e| {
            CourierError::Storage(format!(
                "Failed to create retry directory {}: {e}",
                self.directory.display()
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.directory, std::fs::Permissions::from_mode(0o700)).await?;
        }

        Ok(())
    }

    /// Queued records, oldest first
    async fn list_records(&self) -> Result<Vec<RecordFile>> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(RECORD_SUFFIX) {
                continue;
            }
            let Some(created_ms) = parse_created_millis(&name) else {
                debug!(file = %name, "Ignoring unrecognised file in retry directory");
                continue;
            };
            let bytes = entry.metadata().await?.len();
            records.push(RecordFile {
                path: entry.path(),
                bytes,
                created_ms,
            });
        }

        records.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(records)
    }

    fn next_record_name(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!(
            "{:016}-{:010}-{}{}",
            Utc::now().timestamp_millis(),
            sequence,
            uuid::Uuid::new_v4().simple(),
            RECORD_SUFFIX
        )
    }

    /// Make room for `incoming` bytes according to the eviction policy
    async fn reserve(&self, incoming: u64) -> Result<()> {
        if incoming > self.max_bytes_on_disk {
            return Err(CourierError::Storage(format!(
                "batch of {incoming} bytes exceeds the disk budget of {} bytes",
                self.max_bytes_on_disk
            )));
        }

        let records = self.list_records().await?;
        let mut used: u64 = records.iter().map(|r| r.bytes).sum();
        if used + incoming <= self.max_bytes_on_disk {
            return Ok(());
        }

        match self.eviction {
            EvictionPolicy::RejectNew => Err(CourierError::Storage(format!(
                "disk budget exhausted: {used} of {} bytes in use",
                self.max_bytes_on_disk
            ))),
            EvictionPolicy::EvictOldest => {
                for record in records {
                    if used + incoming <= self.max_bytes_on_disk {
                        break;
                    }
                    remove_if_present(&record.path).await?;
                    used = used.saturating_sub(record.bytes);
                    warn!(
                        file = %record.path.display(),
                        bytes = record.bytes,
                        "Evicted oldest retry record to make room"
                    );
                }
                Ok(())
            }
        }
    }

    async fn write_record(&self, batch: &Batch) -> Result<PathBuf> {
        self.ensure_directory().await?;

        let payload = serde_json::to_vec(batch)?;
        self.reserve(payload.len() as u64).await?;

        let final_path = self.directory.join(self.next_record_name());
        let mut temp_name = final_path.as_os_str().to_owned();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&payload).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &final_path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CourierError::Storage(format!(
                "Failed to write retry record {}: {e}",
                final_path.display()
            )));
        }

        Ok(final_path)
    }
}

#[async_trait]
impl PersistentQueue for FileSystemQueue {
    async fn push(&self, batch: &Batch) -> bool {
        let _guard = self.lock.lock().await;

        match self.write_record(batch).await {
            Ok(path) => {
                debug!(
                    file = %path.display(),
                    envelope_count = batch.len(),
                    "Persisted batch for retry"
                );
                true
            }
            Err(e) => {
                warn!(
                    directory = %self.directory.display(),
                    envelope_count = batch.len(),
                    error = %e,
                    "Failed to persist batch"
                );
                false
            }
        }
    }

    async fn shift(&self) -> Result<Option<Batch>> {
        let _guard = self.lock.lock().await;

        self.purge_expired_locked().await?;

        let Some(oldest) = self.list_records().await?.into_iter().next() else {
            return Ok(None);
        };

        let contents = fs::read(&oldest.path).await?;
        remove_if_present(&oldest.path).await?;

        let batch: Batch = serde_json::from_slice(&contents).map_err(|e| {
            CourierError::Serialization(format!(
                "Discarded unreadable retry record {}: {e}",
                oldest.path.display()
            ))
        })?;

        Ok(Some(batch))
    }

    async fn stats(&self) -> Result<QueueStats> {
        let records = self.list_records().await?;
        Ok(QueueStats {
            records: records.len(),
            bytes: records.iter().map(|r| r.bytes).sum(),
        })
    }
}

/// Extracts the creation timestamp from a record file name
fn parse_created_millis(name: &str) -> Option<i64> {
    name.split('-').next()?.parse().ok()
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
