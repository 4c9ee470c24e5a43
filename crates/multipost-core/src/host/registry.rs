//! In-memory host: pending files, uploader registrations and event subscribers.

use super::{Host, UploadEvent, UploadOutcome, Uploader, UploaderId};
use crate::file::UploadFile;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

/// Shared host state. Wrap in an `Arc` to hand it to uploaders.
#[derive(Default)]
pub struct UploadCore {
    files: RwLock<Vec<UploadFile>>,
    uploaders: RwLock<Vec<(UploaderId, Arc<dyn Uploader>)>>,
    next_id: AtomicU64,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<UploadEvent>>>,
}

impl UploadCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file. A file with the same id replaces the earlier one in place.
    pub fn add_file(&self, file: UploadFile) {
        let mut files = self.files.write().unwrap();
        match files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => *existing = file,
            None => files.push(file),
        }
    }

    pub fn remove_file(&self, id: &str) -> Option<UploadFile> {
        let mut files = self.files.write().unwrap();
        let pos = files.iter().position(|f| f.id == id)?;
        Some(files.remove(pos))
    }

    /// Registration tokens in registration order.
    pub fn uploader_ids(&self) -> Vec<UploaderId> {
        self.uploaders.read().unwrap().iter().map(|(id, _)| *id).collect()
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<UploadEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Runs every registered uploader in registration order. Files an
    /// uploader sends successfully leave the pending set before the next
    /// uploader runs, so later uploaders only see what earlier ones failed.
    pub async fn run(self: &Arc<Self>) -> Vec<UploadOutcome> {
        let uploaders: Vec<Arc<dyn Uploader>> = self
            .uploaders
            .read()
            .unwrap()
            .iter()
            .map(|(_, u)| Arc::clone(u))
            .collect();
        if uploaders.is_empty() {
            tracing::warn!("no uploader registered; {} file(s) left pending", self.pending_count());
            return Vec::new();
        }

        let mut outcomes = Vec::new();
        for uploader in uploaders {
            if self.pending_count() == 0 {
                break;
            }
            let host: Arc<dyn Host> = Arc::clone(self) as Arc<dyn Host>;
            let settled = uploader.handle_upload(host).await;
            for outcome in settled.iter().filter(|o| o.is_success()) {
                self.remove_file(&outcome.file_id);
            }
            outcomes.extend(settled);
        }
        outcomes
    }

    pub fn pending_count(&self) -> usize {
        self.files.read().unwrap().len()
    }
}

impl Host for UploadCore {
    fn add_uploader(&self, uploader: Arc<dyn Uploader>) -> UploaderId {
        let id = UploaderId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.uploaders.write().unwrap().push((id, uploader));
        tracing::debug!(%id, "uploader registered");
        id
    }

    fn remove_uploader(&self, id: UploaderId) -> bool {
        let mut uploaders = self.uploaders.write().unwrap();
        let before = uploaders.len();
        uploaders.retain(|(registered, _)| *registered != id);
        let removed = uploaders.len() != before;
        if removed {
            tracing::debug!(%id, "uploader removed");
        }
        removed
    }

    fn pending_files(&self) -> Vec<UploadFile> {
        self.files.read().unwrap().clone()
    }

    fn log(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn emit(&self, event: UploadEvent) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}
