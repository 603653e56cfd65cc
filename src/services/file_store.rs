//! Session persistence on the local filesystem.
//!
//! Each session gets its own directory named after its id:
//!
//! ```text
//! <root>/<session-id>/session.json   parameters, palette, timestamps
//! <root>/<session-id>/original.png   source photo
//! <root>/<session-id>/indices.png    8-bit grayscale, value = palette index
//! ```
//!
//! History is not persisted. The source photo is only rewritten when a new
//! one was loaded since the last save.

use std::collections::HashMap;
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;
use tokio::sync::RwLock;

use crate::chart::IndexBuffer;
use crate::error::StoreError;
use crate::models::{SessionId, SessionRecord};
use crate::rendering::{decode_index_png, encode_index_png};
use crate::services::{Session, SessionStore};

const RECORD_FILE: &str = "session.json";
const SOURCE_FILE: &str = "original.png";
const INDICES_FILE: &str = "indices.png";

pub struct FileSessionStore {
    root: PathBuf,
    /// Source revision last written per session
    written_sources: RwLock<HashMap<SessionId, u64>>,
}

impl FileSessionStore {
    /// Open (and create if needed) a store rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!(root = %root.display(), "Session store opened");
        Ok(Self {
            root,
            written_sources: RwLock::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_dir(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.as_str())
    }

    async fn source_is_current(&self, id: &SessionId, revision: u64, path: &Path) -> bool {
        let written = self.written_sources.read().await.get(id).copied();
        written == Some(revision) && tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn write_source(&self, session: &Session, dir: &Path) -> Result<(), StoreError> {
        let path = dir.join(SOURCE_FILE);
        let Some(source) = session.shared_source() else {
            remove_if_exists(&path).await?;
            self.written_sources.write().await.remove(session.id());
            return Ok(());
        };

        let revision = session.source_revision();
        if self.source_is_current(session.id(), revision, &path).await {
            return Ok(());
        }

        let bytes = tokio::task::spawn_blocking(move || encode_source(&source))
            .await
            .map_err(|e| StoreError::Image(format!("Encode task failed: {e}")))??;
        write_atomic(&path, &bytes).await?;
        self.written_sources
            .write()
            .await
            .insert(session.id().clone(), revision);
        tracing::debug!(session_id = %session.id(), revision, size_bytes = bytes.len(), "Source image written");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let dir = self.session_dir(session.id());
        tokio::fs::create_dir_all(&dir).await?;

        self.write_source(session, &dir).await?;

        let indices_path = dir.join(INDICES_FILE);
        match session.chart.buffer.clone() {
            Some(buffer) => {
                let bytes = tokio::task::spawn_blocking(move || encode_index_png(&buffer))
                    .await
                    .map_err(|e| StoreError::Image(format!("Encode task failed: {e}")))?
                    .map_err(|e| StoreError::Image(e.to_string()))?;
                write_atomic(&indices_path, &bytes).await?;
            }
            None => remove_if_exists(&indices_path).await?,
        }

        // the record goes last so a reader never sees it ahead of its files
        let json = serde_json::to_vec_pretty(&session.to_record())?;
        write_atomic(&dir.join(RECORD_FILE), &json).await?;

        tracing::debug!(session_id = %session.id(), dir = %dir.display(), "Session saved");
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let dir = self.session_dir(id);
        let json = match tokio::fs::read(dir.join(RECORD_FILE)).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: SessionRecord = serde_json::from_slice(&json)?;
        if &record.id != id {
            return Err(StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("record belongs to {}", record.id),
            });
        }

        let source = if record.has_source {
            let bytes = read_optional(&dir.join(SOURCE_FILE)).await?;
            match bytes {
                Some(bytes) => Some(
                    tokio::task::spawn_blocking(move || decode_source(&bytes))
                        .await
                        .map_err(|e| StoreError::Image(format!("Decode task failed: {e}")))??,
                ),
                None => None,
            }
        } else {
            None
        };

        let buffer = if record.chart_size.is_some() {
            match read_optional(&dir.join(INDICES_FILE)).await? {
                Some(bytes) => Some(decode_indices(&bytes)?),
                None => None,
            }
        } else {
            None
        };

        let revision = record.source_revision;
        let has_source = source.is_some();
        let session = Session::from_record(record, source, buffer)?;
        if has_source {
            self.written_sources
                .write()
                .await
                .insert(id.clone(), revision);
        }
        tracing::info!(session_id = %id, "Session loaded from disk");
        Ok(Some(session))
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.written_sources.write().await.remove(id);
        match tokio::fs::remove_dir_all(self.session_dir(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode_source(image: &Arc<RgbImage>) -> Result<Vec<u8>, StoreError> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| StoreError::Image(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn decode_source(bytes: &[u8]) -> Result<RgbImage, StoreError> {
    image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map(|img| img.to_rgb8())
        .map_err(|e| StoreError::Image(e.to_string()))
}

fn decode_indices(bytes: &[u8]) -> Result<IndexBuffer, StoreError> {
    decode_index_png(bytes).map_err(|e| StoreError::Image(e.to_string()))
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Write to a sibling temp file, then rename over the target
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
