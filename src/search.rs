//! Multi-channel video aggregation.
//!
//! Walks every configured channel, pages through its recent uploads inside
//! the time window, and merges everything into a single chronologically
//! sorted list. A single misbehaving channel degrades the result set
//! instead of failing the run.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::config::ChannelConfig;
use crate::window::TimeWindow;
use crate::youtube::{MAX_PAGE_SIZE, SearchHit, VideoPlatform};

/// Longest description we keep per video. Longer ones are cut and marked
/// with an ellipsis; this is a display cap, not a correctness rule.
const DESCRIPTION_CAP: usize = 100;
const ELLIPSIS: &str = "...";

/// One aggregated video, ready for playlist insertion and reporting.
///
/// `source_channel` is the logical name from the channel registry, not the
/// title the platform reports for the channel; reports and logs key off the
/// configured name so renames on the platform side don't change output.
#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub channel_title: String,
    pub description: String,
    pub source_channel: String,
}

/// Aggregates videos from the configured channels through a platform handle.
pub struct VideoSearcher<'a> {
    platform: &'a dyn VideoPlatform,
}

impl<'a> VideoSearcher<'a> {
    pub fn new(platform: &'a dyn VideoPlatform) -> Self {
        Self { platform }
    }

    /// Searches every channel in `channels` within `window` and returns the
    /// union, stable-sorted ascending by publish time. An empty result is a
    /// valid outcome meaning "nothing published in the window".
    pub fn search_channels(
        &self,
        channels: &[ChannelConfig],
        window: &TimeWindow,
        max_per_channel: u32,
    ) -> Result<Vec<VideoRecord>> {
        let mut all_videos = Vec::new();

        for channel in channels {
            let channel_id = match self.resolve_channel_id(channel) {
                Some(id) => id,
                None => continue,
            };

            match self.search_one_channel(&channel_id, window, max_per_channel) {
                Ok(hits) => {
                    log::info!("found {} videos for channel {}", hits.len(), channel.name);
                    all_videos.extend(
                        hits.into_iter()
                            .map(|hit| into_record(hit, &channel.name)),
                    );
                }
                Err(err) => {
                    log::warn!(
                        "skipping channel {} after search error: {err:#}",
                        channel.name
                    );
                }
            }
        }

        // Stable sort: ties keep channel iteration order, then the order
        // the platform returned within a channel.
        all_videos.sort_by_key(|video| video.published_at);

        log::info!("total videos found across all channels: {}", all_videos.len());
        Ok(all_videos)
    }

    /// Returns the channel id, resolving the handle when the registry does
    /// not pin one. A failed resolution skips the channel, never the run.
    fn resolve_channel_id(&self, channel: &ChannelConfig) -> Option<String> {
        if let Some(id) = &channel.channel_id {
            return Some(id.clone());
        }

        let handle = match &channel.handle {
            Some(handle) => handle,
            None => {
                log::warn!("channel {} has no channel_id or handle", channel.name);
                return None;
            }
        };

        match self.platform.find_channel_id(handle) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                log::warn!("no channel found for handle {handle} ({})", channel.name);
                None
            }
            Err(err) => {
                log::warn!("error resolving handle {handle} ({}): {err:#}", channel.name);
                None
            }
        }
    }

    /// Pages through one channel's results until `max_results` items or the
    /// platform stops handing out page tokens.
    fn search_one_channel(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        max_results: u32,
    ) -> Result<Vec<SearchHit>> {
        let mut hits: Vec<SearchHit> = Vec::new();
        let mut page_token: Option<String> = None;

        while (hits.len() as u32) < max_results {
            let remaining = max_results - hits.len() as u32;
            let page = self.platform.search_videos(
                channel_id,
                window,
                remaining.min(MAX_PAGE_SIZE),
                page_token.as_deref(),
            )?;

            hits.extend(page.hits);

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        hits.truncate(max_results as usize);
        Ok(hits)
    }
}

fn into_record(hit: SearchHit, source_channel: &str) -> VideoRecord {
    VideoRecord {
        video_id: hit.video_id,
        title: hit.title,
        published_at: hit.published_at,
        channel_title: hit.channel_title,
        description: truncate_description(&hit.description),
        source_channel: source_channel.to_string(),
    }
}

/// Caps a description at [`DESCRIPTION_CAP`] characters, appending an
/// ellipsis when anything was cut.
fn truncate_description(description: &str) -> String {
    if description.chars().count() <= DESCRIPTION_CAP {
        return description.to_string();
    }
    let mut truncated: String = description.chars().take(DESCRIPTION_CAP).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
