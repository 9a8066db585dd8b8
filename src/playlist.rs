//! Playlist resolution and duplicate-safe membership sync.
//!
//! The platform has no "insert many, skip existing" primitive, so the sync
//! enumerates current membership up front and appends only the delta, one
//! insert at a time, in input order. Reruns are idempotent: everything
//! already present is skipped.

use anyhow::{Context, Result};
use std::collections::HashSet;

use crate::search::VideoRecord;
use crate::youtube::{PrivacyStatus, VideoPlatform};

const PLAYLIST_URL_BASE: &str = "https://www.youtube.com/playlist?list=";

/// Per-run counters for one membership sync. The three fields always sum to
/// the number of input videos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub added: usize,
    pub failed: usize,
    pub skipped_duplicate: usize,
}

/// A resolved target playlist.
#[derive(Debug, Clone)]
pub struct ResolvedPlaylist {
    pub id: String,
    pub url: String,
    /// True when the playlist already existed and was reused.
    pub existed: bool,
}

/// Resolves and mutates the principal's playlists through a platform handle.
pub struct PlaylistManager<'a> {
    platform: &'a dyn VideoPlatform,
}

impl<'a> PlaylistManager<'a> {
    pub fn new(platform: &'a dyn VideoPlatform) -> Self {
        Self { platform }
    }

    fn playlist_url(playlist_id: &str) -> String {
        format!("{PLAYLIST_URL_BASE}{playlist_id}")
    }

    /// Scans one page (up to 50) of the principal's own playlists for an
    /// exact, case-sensitive title match. First match wins; accounts with
    /// duplicate titles or more than 50 playlists resolve arbitrarily, a
    /// known cap of the lookup.
    fn find_existing_playlist(&self, title: &str) -> Result<Option<String>> {
        let playlists = self
            .platform
            .list_my_playlists()
            .context("searching for existing playlist")?;

        Ok(playlists
            .into_iter()
            .find(|playlist| playlist.title == title)
            .map(|playlist| playlist.id))
    }

    /// Returns the playlist with the given title, creating it when absent.
    /// A lookup or create failure is fatal: without a target playlist there
    /// is nothing to synchronize into.
    pub fn get_or_create(
        &self,
        title: &str,
        description: &str,
        privacy: PrivacyStatus,
    ) -> Result<ResolvedPlaylist> {
        if let Some(id) = self.find_existing_playlist(title)? {
            log::info!("found existing playlist '{title}' (id {id})");
            return Ok(ResolvedPlaylist {
                url: Self::playlist_url(&id),
                id,
                existed: true,
            });
        }

        let id = self
            .platform
            .create_playlist(title, description, privacy)
            .with_context(|| format!("creating playlist '{title}'"))?;
        log::info!("created playlist '{title}' (id {id})");

        Ok(ResolvedPlaylist {
            url: Self::playlist_url(&id),
            id,
            existed: false,
        })
    }

    /// Full membership scan. Unavoidable: the platform offers no point
    /// lookup cheaper than listing, so dedup needs the whole set.
    fn current_membership(&self, playlist_id: &str) -> Result<HashSet<String>> {
        let mut video_ids = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .platform
                .list_playlist_items(playlist_id, page_token.as_deref())?;
            video_ids.extend(page.video_ids);

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        log::debug!("playlist {playlist_id} currently holds {} videos", video_ids.len());
        Ok(video_ids)
    }

    /// Appends `videos` to the playlist in input order, skipping ids that
    /// are already members when `skip_duplicates` is set. One video's
    /// insert failure never blocks the rest; it is counted and the loop
    /// moves on.
    pub fn sync_membership(
        &self,
        playlist_id: &str,
        videos: &[VideoRecord],
        skip_duplicates: bool,
    ) -> SyncOutcome {
        let existing = if skip_duplicates {
            match self.current_membership(playlist_id) {
                Ok(ids) => ids,
                Err(err) => {
                    // Degrade to "nothing known": inserts still run, and any
                    // true duplicate surfaces as a per-video failure.
                    log::warn!("could not list playlist {playlist_id} members: {err:#}");
                    HashSet::new()
                }
            }
        } else {
            HashSet::new()
        };

        let mut outcome = SyncOutcome::default();

        for video in videos {
            if skip_duplicates && existing.contains(&video.video_id) {
                outcome.skipped_duplicate += 1;
                log::debug!("skipped duplicate: {}", video.title);
                continue;
            }

            match self
                .platform
                .insert_playlist_item(playlist_id, &video.video_id)
            {
                Ok(()) => {
                    outcome.added += 1;
                    log::info!("added: {} ({})", video.title, video.source_channel);
                }
                Err(err) => {
                    outcome.failed += 1;
                    log::warn!("failed to add {}: {err:#}", video.title);
                }
            }
        }

        log::info!(
            "playlist update complete: {} added, {} failed, {} duplicates skipped",
            outcome.added,
            outcome.failed,
            outcome.skipped_duplicate
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::testing::{FakePlatform, FakePlaylist};
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 18, h, 0, 0).unwrap()
    }

    fn video(id: &str, h: u32) -> VideoRecord {
        VideoRecord {
            video_id: id.to_string(),
            title: format!("title of {id}"),
            published_at: ts(h),
            channel_title: "CNBC Television".to_string(),
            description: String::new(),
            source_channel: "CNBC".to_string(),
        }
    }

    #[test]
    fn creates_playlist_when_absent() {
        let fake = FakePlatform::new();
        let manager = PlaylistManager::new(&fake);

        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        assert!(!playlist.existed);
        assert_eq!(
            playlist.url,
            format!("https://www.youtube.com/playlist?list={}", playlist.id)
        );
        assert_eq!(fake.playlists.borrow().len(), 1);
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let fake = FakePlatform::new();
        let manager = PlaylistManager::new(&fake);

        let first = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();
        let second = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(!first.existed);
        assert!(second.existed);
        assert_eq!(fake.playlists.borrow().len(), 1);
    }

    #[test]
    fn title_match_is_case_sensitive_exact() {
        let fake = FakePlatform::new();
        fake.playlists.borrow_mut().push(FakePlaylist {
            id: "PL-other".to_string(),
            title: "News_20240518".to_string(),
            description: String::new(),
            privacy: PrivacyStatus::Unlisted,
            items: Vec::new(),
        });

        let manager = PlaylistManager::new(&fake);
        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        assert!(!playlist.existed);
        assert_ne!(playlist.id, "PL-other");
    }

    #[test]
    fn fresh_playlist_gets_all_videos_in_order() {
        let fake = FakePlatform::new();
        let manager = PlaylistManager::new(&fake);
        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        let videos = [video("t1", 8), video("t2", 10), video("t3", 12)];
        let outcome = manager.sync_membership(&playlist.id, &videos, true);

        assert_eq!(
            outcome,
            SyncOutcome {
                added: 3,
                failed: 0,
                skipped_duplicate: 0
            }
        );
        assert_eq!(fake.playlist_items(&playlist.id), ["t1", "t2", "t3"]);
    }

    #[test]
    fn rerun_skips_everything() {
        let fake = FakePlatform::new();
        let manager = PlaylistManager::new(&fake);
        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        let videos = [video("t1", 8), video("t2", 10), video("t3", 12)];
        manager.sync_membership(&playlist.id, &videos, true);

        let resolved = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();
        assert!(resolved.existed);

        let outcome = manager.sync_membership(&resolved.id, &videos, true);
        assert_eq!(
            outcome,
            SyncOutcome {
                added: 0,
                failed: 0,
                skipped_duplicate: 3
            }
        );
        assert_eq!(fake.playlist_items(&playlist.id), ["t1", "t2", "t3"]);
    }

    #[test]
    fn insert_failure_counts_but_does_not_abort() {
        let mut fake = FakePlatform::new();
        fake.failing_inserts.insert("bad".to_string());
        let manager = PlaylistManager::new(&fake);
        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        let videos = [video("t1", 8), video("bad", 9), video("t3", 10)];
        let outcome = manager.sync_membership(&playlist.id, &videos, true);

        assert_eq!(
            outcome,
            SyncOutcome {
                added: 2,
                failed: 1,
                skipped_duplicate: 0
            }
        );
        assert_eq!(fake.playlist_items(&playlist.id), ["t1", "t3"]);
        assert_eq!(outcome.added + outcome.failed + outcome.skipped_duplicate, videos.len());
    }

    #[test]
    fn membership_scan_pages_through_large_playlists() {
        let fake = {
            let mut fake = FakePlatform::new();
            fake.membership_page_size = 2;
            fake
        };
        let manager = PlaylistManager::new(&fake);
        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        let first_batch: Vec<VideoRecord> = (0..5u32).map(|i| video(&format!("v{i}"), i)).collect();
        manager.sync_membership(&playlist.id, &first_batch, true);

        // All five already present across three membership pages.
        let outcome = manager.sync_membership(&playlist.id, &first_batch, true);
        assert_eq!(outcome.skipped_duplicate, 5);
        assert_eq!(outcome.added, 0);
    }

    #[test]
    fn delta_runs_append_only_new_videos() {
        let fake = FakePlatform::new();
        let manager = PlaylistManager::new(&fake);
        let playlist = manager
            .get_or_create("news_20240518", "desc", PrivacyStatus::Unlisted)
            .unwrap();

        manager.sync_membership(&playlist.id, &[video("t1", 8)], true);
        let outcome =
            manager.sync_membership(&playlist.id, &[video("t1", 8), video("t2", 10)], true);

        assert_eq!(
            outcome,
            SyncOutcome {
                added: 1,
                failed: 0,
                skipped_duplicate: 1
            }
        );
        assert_eq!(fake.playlist_items(&playlist.id), ["t1", "t2"]);
    }
}
