//! YouTube Data API v3 boundary.
//!
//! Everything that touches the network lives behind [`VideoPlatform`], a
//! deliberately narrow trait covering exactly the six calls the tool makes.
//! Binaries use the blocking [`DataApiClient`]; unit tests swap in the
//! in-memory fake from [`testing`] and never open a socket.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::window::TimeWindow;

const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The platform's per-page maximum for list endpoints.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Playlist visibility, serialized in the lowercase form the API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Private,
    Unlisted,
}

impl PrivacyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Private => "private",
            PrivacyStatus::Unlisted => "unlisted",
        }
    }
}

/// One raw video search result, before any local tagging or truncation.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub channel_title: String,
    pub description: String,
}

/// One page of video search results plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct VideoSearchPage {
    pub hits: Vec<SearchHit>,
    pub next_page_token: Option<String>,
}

/// One page of playlist membership plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct MembershipPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Minimal view of one of the principal's own playlists.
#[derive(Debug, Clone)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
}

/// The capability surface the aggregation and sync logic needs from the
/// platform. One authenticated principal per instance; all calls are
/// blocking request/response.
pub trait VideoPlatform {
    /// Resolves an `@handle` to a channel id via the generic search
    /// endpoint. `Ok(None)` means the platform returned no match, which
    /// callers treat as a per-channel miss rather than an error.
    fn find_channel_id(&self, handle: &str) -> Result<Option<String>>;

    /// Fetches one page of videos for a channel inside the window, newest
    /// pages first as the platform orders them, up to `max_results` items.
    fn search_videos(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<VideoSearchPage>;

    /// Lists the principal's own playlists. Single page of up to
    /// [`MAX_PAGE_SIZE`] entries; accounts with more playlists than that
    /// may miss matches (a documented cap, not a paging loop).
    fn list_my_playlists(&self) -> Result<Vec<PlaylistSummary>>;

    /// Creates a playlist and returns its id.
    fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: PrivacyStatus,
    ) -> Result<String>;

    /// Fetches one page of a playlist's membership.
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<MembershipPage>;

    /// Appends one video to the end of a playlist.
    fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Wire types. Only the fields we read are declared; everything else in the
// API payloads is ignored. Optional fields stay optional because search
// results for deleted or restricted videos can omit them.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    id: SearchResultId,
    snippet: SearchSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: DateTime<Utc>,
    channel_id: Option<String>,
    channel_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistListResponse {
    #[serde(default)]
    items: Vec<PlaylistResource>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    id: String,
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
struct PlaylistSnippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistInsertResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItemResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemResource {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

// ---------------------------------------------------------------------------
// Blocking client
// ---------------------------------------------------------------------------

/// Blocking Data API client. Credentials are opaque: an API key for read
/// quota attribution and a bearer token for the authenticated principal.
/// Acquisition and refresh of either happen outside this tool.
pub struct DataApiClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    access_token: String,
}

impl DataApiClient {
    pub fn new(api_key: String, access_token: String) -> Self {
        Self::with_base_url(API_BASE_URL.to_string(), api_key, access_token)
    }

    /// Used by tests to point the client at a local stub server.
    pub fn with_base_url(base_url: String, api_key: String, access_token: String) -> Self {
        Self {
            agent: ureq::Agent::new(),
            base_url,
            api_key,
            access_token,
        }
    }

    fn get(&self, endpoint: &str) -> ureq::Request {
        self.agent
            .get(&format!("{}/{endpoint}", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.access_token))
            .query("key", &self.api_key)
    }

    fn post(&self, endpoint: &str) -> ureq::Request {
        self.agent
            .post(&format!("{}/{endpoint}", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.access_token))
            .query("key", &self.api_key)
    }
}

impl VideoPlatform for DataApiClient {
    fn find_channel_id(&self, handle: &str) -> Result<Option<String>> {
        let clean_handle = handle.trim_start_matches('@');

        let response: SearchListResponse = self
            .get("search")
            .query("part", "snippet")
            .query("type", "channel")
            .query("q", clean_handle)
            .query("maxResults", "1")
            .call()
            .with_context(|| format!("searching for channel handle {handle}"))?
            .into_json()
            .context("decoding channel search response")?;

        Ok(response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.snippet.channel_id))
    }

    fn search_videos(
        &self,
        channel_id: &str,
        window: &TimeWindow,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<VideoSearchPage> {
        let mut request = self
            .get("search")
            .query("part", "snippet")
            .query("channelId", channel_id)
            .query("type", "video")
            .query("publishedAfter", &window.published_after())
            .query("publishedBefore", &window.published_before())
            .query("order", "date")
            .query("maxResults", &max_results.min(MAX_PAGE_SIZE).to_string());
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }

        let response: SearchListResponse = request
            .call()
            .with_context(|| format!("searching videos for channel {channel_id}"))?
            .into_json()
            .context("decoding video search response")?;

        let hits = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(SearchHit {
                    video_id,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                    channel_title: item.snippet.channel_title.unwrap_or_default(),
                    description: item.snippet.description,
                })
            })
            .collect();

        Ok(VideoSearchPage {
            hits,
            next_page_token: response.next_page_token,
        })
    }

    fn list_my_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let response: PlaylistListResponse = self
            .get("playlists")
            .query("part", "snippet")
            .query("mine", "true")
            .query("maxResults", &MAX_PAGE_SIZE.to_string())
            .call()
            .context("listing own playlists")?
            .into_json()
            .context("decoding playlist list response")?;

        Ok(response
            .items
            .into_iter()
            .map(|item| PlaylistSummary {
                id: item.id,
                title: item.snippet.title,
            })
            .collect())
    }

    fn create_playlist(
        &self,
        title: &str,
        description: &str,
        privacy: PrivacyStatus,
    ) -> Result<String> {
        let response: PlaylistInsertResponse = self
            .post("playlists")
            .query("part", "snippet,status")
            .send_json(json!({
                "snippet": {
                    "title": title,
                    "description": description,
                },
                "status": {
                    "privacyStatus": privacy.as_str(),
                },
            }))
            .with_context(|| format!("creating playlist '{title}'"))?
            .into_json()
            .context("decoding playlist create response")?;

        Ok(response.id)
    }

    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<MembershipPage> {
        let mut request = self
            .get("playlistItems")
            .query("part", "contentDetails")
            .query("playlistId", playlist_id)
            .query("maxResults", &MAX_PAGE_SIZE.to_string());
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }

        let response: PlaylistItemListResponse = request
            .call()
            .with_context(|| format!("listing items of playlist {playlist_id}"))?
            .into_json()
            .context("decoding playlist items response")?;

        Ok(MembershipPage {
            video_ids: response
                .items
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<()> {
        self.post("playlistItems")
            .query("part", "snippet")
            .send_json(json!({
                "snippet": {
                    "playlistId": playlist_id,
                    "resourceId": {
                        "kind": "youtube#video",
                        "videoId": video_id,
                    },
                },
            }))
            .with_context(|| format!("adding video {video_id} to playlist {playlist_id}"))?;
        Ok(())
    }
}
