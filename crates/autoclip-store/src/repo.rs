//! The `VideoStore` interface and its implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use metrics::counter;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use autoclip_models::{
    Clip, ClipId, NewClip, NewVideo, TranscriptSegment, Video, VideoId, VideoStatus,
};

use crate::error::{StoreError, StoreResult};
use crate::state::StoreState;

/// Durable CRUD store for videos and their clips.
///
/// Every write is an independent point update keyed by id; there is no
/// transactional grouping across calls.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn create_video(&self, video: NewVideo) -> StoreResult<Video>;

    async fn update_video_status(&self, id: &VideoId, status: VideoStatus) -> StoreResult<Video>;

    /// Move the status from `from` to `to`, failing with
    /// [`StoreError::StatusConflict`] if it is no longer `from`.
    async fn transition_video_status(
        &self,
        id: &VideoId,
        from: VideoStatus,
        to: VideoStatus,
    ) -> StoreResult<Video>;

    async fn update_video_transcript(
        &self,
        id: &VideoId,
        transcript: Vec<TranscriptSegment>,
    ) -> StoreResult<Video>;

    async fn update_video_score(&self, id: &VideoId, score: Option<f64>) -> StoreResult<Video>;

    async fn create_clip(&self, clip: NewClip) -> StoreResult<Clip>;

    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>>;

    /// All videos ordered by creation time.
    async fn get_videos(&self) -> StoreResult<Vec<Video>>;

    async fn get_clips(&self, video_id: &VideoId) -> StoreResult<Vec<Clip>>;

    /// Delete a clip row. Deleting a missing clip is not an error.
    async fn delete_clip(&self, clip_id: &ClipId) -> StoreResult<()>;
}

fn record_write(op: &'static str) {
    counter!("autoclip_store_writes_total", "op" => op).increment(1);
}

/// Volatile store for tests and single-process runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn create_video(&self, video: NewVideo) -> StoreResult<Video> {
        record_write("create_video");
        Ok(self.state.write().await.create_video(video))
    }

    async fn update_video_status(&self, id: &VideoId, status: VideoStatus) -> StoreResult<Video> {
        record_write("update_video_status");
        self.state.write().await.update_status(id, status)
    }

    async fn transition_video_status(
        &self,
        id: &VideoId,
        from: VideoStatus,
        to: VideoStatus,
    ) -> StoreResult<Video> {
        record_write("transition_video_status");
        self.state.write().await.transition_status(id, from, to)
    }

    async fn update_video_transcript(
        &self,
        id: &VideoId,
        transcript: Vec<TranscriptSegment>,
    ) -> StoreResult<Video> {
        record_write("update_video_transcript");
        self.state.write().await.update_transcript(id, transcript)
    }

    async fn update_video_score(&self, id: &VideoId, score: Option<f64>) -> StoreResult<Video> {
        record_write("update_video_score");
        self.state.write().await.update_score(id, score)
    }

    async fn create_clip(&self, clip: NewClip) -> StoreResult<Clip> {
        record_write("create_clip");
        self.state.write().await.create_clip(clip)
    }

    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        Ok(self.state.read().await.get_video(id))
    }

    async fn get_videos(&self) -> StoreResult<Vec<Video>> {
        Ok(self.state.read().await.videos())
    }

    async fn get_clips(&self, video_id: &VideoId) -> StoreResult<Vec<Clip>> {
        Ok(self.state.read().await.clips_for(video_id))
    }

    async fn delete_clip(&self, clip_id: &ClipId) -> StoreResult<()> {
        record_write("delete_clip");
        if !self.state.write().await.delete_clip(clip_id) {
            debug!("Clip {} already deleted", clip_id);
        }
        Ok(())
    }
}

/// Store persisted as a single JSON snapshot, rewritten after every write.
///
/// Snapshots are written to a sibling temp file and renamed into place so a
/// crash never leaves a truncated file behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => StoreState::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(e) => return Err(e.into()),
        };

        info!("Opened JSON store at {}", path.display());
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &StoreState) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Apply `op` to the state and persist the result while holding the lock.
    async fn mutate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut StoreState) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        record_write(op);
        let mut state = self.state.lock().await;
        let result = f(&mut state)?;
        self.persist(&state).await?;
        Ok(result)
    }
}

#[async_trait]
impl VideoStore for JsonFileStore {
    async fn create_video(&self, video: NewVideo) -> StoreResult<Video> {
        self.mutate("create_video", |s| Ok(s.create_video(video)))
            .await
    }

    async fn update_video_status(&self, id: &VideoId, status: VideoStatus) -> StoreResult<Video> {
        self.mutate("update_video_status", |s| s.update_status(id, status))
            .await
    }

    async fn transition_video_status(
        &self,
        id: &VideoId,
        from: VideoStatus,
        to: VideoStatus,
    ) -> StoreResult<Video> {
        self.mutate("transition_video_status", |s| {
            s.transition_status(id, from, to)
        })
        .await
    }

    async fn update_video_transcript(
        &self,
        id: &VideoId,
        transcript: Vec<TranscriptSegment>,
    ) -> StoreResult<Video> {
        self.mutate("update_video_transcript", |s| {
            s.update_transcript(id, transcript)
        })
        .await
    }

    async fn update_video_score(&self, id: &VideoId, score: Option<f64>) -> StoreResult<Video> {
        self.mutate("update_video_score", |s| s.update_score(id, score))
            .await
    }

    async fn create_clip(&self, clip: NewClip) -> StoreResult<Clip> {
        self.mutate("create_clip", |s| s.create_clip(clip)).await
    }

    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        Ok(self.state.lock().await.get_video(id))
    }

    async fn get_videos(&self) -> StoreResult<Vec<Video>> {
        Ok(self.state.lock().await.videos())
    }

    async fn get_clips(&self, video_id: &VideoId) -> StoreResult<Vec<Clip>> {
        Ok(self.state.lock().await.clips_for(video_id))
    }

    async fn delete_clip(&self, clip_id: &ClipId) -> StoreResult<()> {
        self.mutate("delete_clip", |s| {
            s.delete_clip(clip_id);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn new_video(name: &str) -> NewVideo {
        NewVideo {
            original_name: name.to_string(),
            source_location: format!("uploads/{}", name),
        }
    }

    fn new_clip(video_id: &VideoId, start: f64) -> NewClip {
        NewClip {
            video_id: video_id.clone(),
            start_time: start,
            end_time: start + 30.0,
            summary: "moment".to_string(),
            virality_score: 70.0,
            output_location: format!("/clips/clip-{}-0.mp4", video_id),
        }
    }

    #[tokio::test]
    async fn test_memory_store_crud() {
        let store = MemoryStore::new();
        let video = store.create_video(new_video("a.mp4")).await.unwrap();
        assert_eq!(video.status, VideoStatus::Uploaded);

        store
            .update_video_status(&video.id, VideoStatus::Transcribing)
            .await
            .unwrap();
        store
            .update_video_transcript(&video.id, vec![TranscriptSegment::new(0.0, 4.0, "hi")])
            .await
            .unwrap();
        store.update_video_score(&video.id, Some(71.0)).await.unwrap();

        let stored = store.get_video(&video.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VideoStatus::Transcribing);
        assert_eq!(stored.transcript.as_ref().map(Vec::len), Some(1));
        assert_eq!(stored.virality_score, Some(71.0));

        let clip = store.create_clip(new_clip(&video.id, 0.0)).await.unwrap();
        assert_eq!(store.get_clips(&video.id).await.unwrap().len(), 1);

        assert_ok!(store.delete_clip(&clip.id).await);
        assert_ok!(store.delete_clip(&clip.id).await);
        assert!(store.get_clips(&video.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_video_is_not_found() {
        let store = MemoryStore::new();
        let missing = VideoId::from_string("missing");

        let err = store
            .update_video_status(&missing, VideoStatus::Error)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_err!(store.create_clip(new_clip(&missing, 0.0)).await);
        assert!(store.get_video(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transition_rejects_stale_status() {
        let store = MemoryStore::new();
        let video = store.create_video(new_video("a.mp4")).await.unwrap();

        let moved = store
            .transition_video_status(&video.id, VideoStatus::Uploaded, VideoStatus::Transcribing)
            .await
            .unwrap();
        assert_eq!(moved.status, VideoStatus::Transcribing);

        store
            .update_video_status(&video.id, VideoStatus::Error)
            .await
            .unwrap();
        let err = store
            .transition_video_status(&video.id, VideoStatus::Transcribing, VideoStatus::Analyzing)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(
            err,
            StoreError::StatusConflict { actual: VideoStatus::Error, .. }
        ));

        let stored = store.get_video(&video.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VideoStatus::Error);
    }

    #[tokio::test]
    async fn test_json_store_transition_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        let video = store.create_video(new_video("a.mp4")).await.unwrap();

        assert_ok!(
            store
                .transition_video_status(&video.id, VideoStatus::Uploaded, VideoStatus::Transcribing)
                .await
        );
        assert_err!(
            store
                .transition_video_status(&video.id, VideoStatus::Uploaded, VideoStatus::Transcribing)
                .await
        );

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let stored = reopened.get_video(&video.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VideoStatus::Transcribing);
    }

    #[tokio::test]
    async fn test_videos_listed_oldest_first() {
        let store = MemoryStore::new();
        let first = store.create_video(new_video("1.mp4")).await.unwrap();
        let second = store.create_video(new_video("2.mp4")).await.unwrap();

        let ids: Vec<_> = store
            .get_videos()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_clips_scoped_to_video() {
        let store = MemoryStore::new();
        let a = store.create_video(new_video("a.mp4")).await.unwrap();
        let b = store.create_video(new_video("b.mp4")).await.unwrap();
        store.create_clip(new_clip(&a.id, 0.0)).await.unwrap();
        store.create_clip(new_clip(&b.id, 10.0)).await.unwrap();
        store.create_clip(new_clip(&a.id, 40.0)).await.unwrap();

        let clips = store.get_clips(&a.id).await.unwrap();
        assert_eq!(clips.len(), 2);
        assert!(clips.iter().all(|c| c.video_id == a.id));
    }

    #[tokio::test]
    async fn test_json_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data/store.json");

        let video_id = {
            let store = JsonFileStore::open(&path).await.unwrap();
            let video = store.create_video(new_video("a.mp4")).await.unwrap();
            store
                .update_video_status(&video.id, VideoStatus::Complete)
                .await
                .unwrap();
            store.create_clip(new_clip(&video.id, 5.0)).await.unwrap();
            video.id
        };

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let video = reopened.get_video(&video_id).await.unwrap().unwrap();
        assert_eq!(video.status, VideoStatus::Complete);
        assert_eq!(reopened.get_clips(&video_id).await.unwrap().len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_json_store_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
