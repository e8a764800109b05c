//! In-process record set shared by the store implementations.

use serde::{Deserialize, Serialize};

use autoclip_models::{
    Clip, ClipId, NewClip, NewVideo, TranscriptSegment, Video, VideoId, VideoStatus,
};

use crate::error::{StoreError, StoreResult};

/// Videos in creation order plus all clips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    videos: Vec<Video>,
    #[serde(default)]
    clips: Vec<Clip>,
}

impl StoreState {
    fn video_mut(&mut self, id: &VideoId) -> StoreResult<&mut Video> {
        self.videos
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| StoreError::not_found(format!("video {}", id)))
    }

    pub fn create_video(&mut self, new: NewVideo) -> Video {
        let video = Video::new(new.original_name, new.source_location);
        self.videos.push(video.clone());
        video
    }

    pub fn update_status(&mut self, id: &VideoId, status: VideoStatus) -> StoreResult<Video> {
        let video = self.video_mut(id)?;
        video.status = status;
        Ok(video.clone())
    }

    /// Compare-and-set on the status.
    pub fn transition_status(
        &mut self,
        id: &VideoId,
        from: VideoStatus,
        to: VideoStatus,
    ) -> StoreResult<Video> {
        let video = self.video_mut(id)?;
        if video.status != from {
            return Err(StoreError::StatusConflict {
                id: id.to_string(),
                expected: from,
                actual: video.status,
            });
        }
        video.status = to;
        Ok(video.clone())
    }

    pub fn update_transcript(
        &mut self,
        id: &VideoId,
        transcript: Vec<TranscriptSegment>,
    ) -> StoreResult<Video> {
        let video = self.video_mut(id)?;
        video.transcript = Some(transcript);
        Ok(video.clone())
    }

    pub fn update_score(&mut self, id: &VideoId, score: Option<f64>) -> StoreResult<Video> {
        let video = self.video_mut(id)?;
        video.virality_score = score;
        Ok(video.clone())
    }

    pub fn create_clip(&mut self, new: NewClip) -> StoreResult<Clip> {
        if !self.videos.iter().any(|v| v.id == new.video_id) {
            return Err(StoreError::not_found(format!("video {}", new.video_id)));
        }
        let clip = new.into_clip();
        self.clips.push(clip.clone());
        Ok(clip)
    }

    pub fn get_video(&self, id: &VideoId) -> Option<Video> {
        self.videos.iter().find(|v| &v.id == id).cloned()
    }

    /// All videos, oldest first.
    pub fn videos(&self) -> Vec<Video> {
        let mut videos = self.videos.clone();
        videos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        videos
    }

    /// Clips of one video in creation order.
    pub fn clips_for(&self, video_id: &VideoId) -> Vec<Clip> {
        self.clips
            .iter()
            .filter(|c| &c.video_id == video_id)
            .cloned()
            .collect()
    }

    /// Returns whether a clip was removed.
    pub fn delete_clip(&mut self, clip_id: &ClipId) -> bool {
        let before = self.clips.len();
        self.clips.retain(|c| &c.id != clip_id);
        self.clips.len() != before
    }
}
