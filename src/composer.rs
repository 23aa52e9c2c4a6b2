//! Post composer
//!
//! The form buffer used to schedule a new post. The buffer only yields a post
//! once every required field is filled in and at least one platform is picked.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Platform, Post, PostStatus};
use crate::seed;

/// Accepted shapes of a local date-time input
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostComposer {
    client_id: String,
    /// Set when opened from inside a brand's scope
    client_locked: bool,
    title: String,
    content: String,
    date: String,
    platforms: Vec<Platform>,
}

/// A validated composer submission, ready to become a [`Post`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub client_id: String,
    pub title: String,
    pub content: String,
    /// Normalized UTC timestamp
    pub scheduled_date: String,
    pub platforms: Vec<Platform>,
}

impl PostComposer {
    /// Opens an empty composer, pre-filled and locked to `client_id` when given
    pub fn open(client_id: Option<&str>) -> Self {
        match client_id {
            Some(id) => Self {
                client_id: id.to_string(),
                client_locked: true,
                ..Self::default()
            },
            None => Self::default(),
        }
    }

    /// Picks the target brand. Returns `false` if the composer is locked to one.
    pub fn set_client(&mut self, client_id: String) -> bool {
        if self.client_locked {
            return false;
        }
        self.client_id = client_id;
        true
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
    }

    pub fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub fn set_date(&mut self, date: String) {
        self.date = date;
    }

    /// Adds the platform, or removes it if it is already selected
    pub fn toggle_platform(&mut self, platform: Platform) {
        if let Some(pos) = self.platforms.iter().position(|p| *p == platform) {
            self.platforms.remove(pos);
        } else {
            self.platforms.push(platform);
        }
    }

    /// Replaces the selection, keeping the first occurrence of each platform
    pub fn set_platforms(&mut self, platforms: Vec<Platform>) {
        self.platforms.clear();
        for platform in platforms {
            if !self.platforms.contains(&platform) {
                self.platforms.push(platform);
            }
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_client_locked(&self) -> bool {
        self.client_locked
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Whether all required fields are filled and a platform is selected
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty()
            && !self.title.is_empty()
            && !self.content.is_empty()
            && !self.date.is_empty()
            && !self.platforms.is_empty()
    }

    /// Validates the buffer. `None` means the submission must be ignored.
    pub fn draft(&self) -> Option<PostDraft> {
        if !self.is_complete() {
            return None;
        }
        let scheduled_date = normalize_schedule(&self.date)?;

        Some(PostDraft {
            client_id: self.client_id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            scheduled_date,
            platforms: self.platforms.clone(),
        })
    }
}

impl PostDraft {
    /// Turns the draft into a scheduled post with a placeholder image
    pub fn into_post(self, id: String, media_seed: &str) -> Post {
        Post {
            id,
            client_id: self.client_id,
            title: self.title,
            content: self.content,
            scheduled_date: self.scheduled_date,
            platforms: self.platforms,
            status: PostStatus::Scheduled,
            media_url: Some(seed::media_url(media_seed)),
        }
    }
}

/// Converts a local date-time (or an RFC 3339 timestamp) to a UTC ISO-8601
/// string with millisecond precision, e.g. `2024-06-01T08:00:00.000Z`.
///
/// Returns `None` for input that is not a date-time, or a local time that does
/// not exist (skipped by a DST transition).
pub fn normalize_schedule(input: &str) -> Option<String> {
    let input = input.trim();

    let utc: DateTime<Utc> = match DateTime::parse_from_rfc3339(input) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => {
            let naive = LOCAL_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())?;
            Local
                .from_local_datetime(&naive)
                .earliest()?
                .with_timezone(&Utc)
        }
    };

    Some(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> PostComposer {
        let mut composer = PostComposer::open(None);
        composer.set_client("2".to_string());
        composer.set_title("Promo".to_string());
        composer.set_content("text".to_string());
        composer.set_date("2024-06-01T10:00".to_string());
        composer.toggle_platform(Platform::Instagram);
        composer
    }

    #[test]
    fn test_toggle_platform_membership() {
        let mut composer = PostComposer::open(None);
        composer.toggle_platform(Platform::Tiktok);
        composer.toggle_platform(Platform::Facebook);
        assert_eq!(composer.platforms(), &[Platform::Tiktok, Platform::Facebook]);

        composer.toggle_platform(Platform::Tiktok);
        assert_eq!(composer.platforms(), &[Platform::Facebook]);
    }

    #[test]
    fn test_set_platforms_replaces_selection() {
        let mut composer = filled();
        composer.set_platforms(vec![Platform::Linkedin, Platform::Facebook, Platform::Linkedin]);
        assert_eq!(composer.platforms(), &[Platform::Linkedin, Platform::Facebook]);

        composer.set_platforms(Vec::new());
        assert!(!composer.is_complete());
    }

    #[test]
    fn test_locked_client_cannot_change() {
        let mut composer = PostComposer::open(Some("1"));
        assert!(composer.is_client_locked());
        assert!(!composer.set_client("3".to_string()));
        assert_eq!(composer.client_id(), "1");
    }

    #[test]
    fn test_missing_fields_produce_no_draft() {
        assert!(filled().draft().is_some());

        let mut c = filled();
        c.set_client(String::new());
        assert!(c.draft().is_none());

        let mut c = filled();
        c.set_title(String::new());
        assert!(c.draft().is_none());

        let mut c = filled();
        c.set_content(String::new());
        assert!(c.draft().is_none());

        let mut c = filled();
        c.set_date(String::new());
        assert!(c.draft().is_none());

        let mut c = filled();
        c.toggle_platform(Platform::Instagram);
        assert!(c.draft().is_none());
    }

    #[test]
    fn test_unparseable_date_produces_no_draft() {
        let mut c = filled();
        c.set_date("next tuesday".to_string());
        assert!(c.draft().is_none());
    }

    #[test]
    fn test_normalize_schedule() {
        assert_eq!(
            normalize_schedule("2024-06-01T10:00:00+02:00").as_deref(),
            Some("2024-06-01T08:00:00.000Z")
        );

        let naive =
            NaiveDateTime::parse_from_str("2024-06-01T10:00", "%Y-%m-%dT%H:%M").unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        assert_eq!(normalize_schedule("2024-06-01T10:00"), Some(expected));
    }

    #[test]
    fn test_draft_into_post() {
        let post = filled()
            .draft()
            .unwrap()
            .into_post("abc".to_string(), "0.5");
        assert_eq!(post.id, "abc");
        assert_eq!(post.client_id, "2");
        assert_eq!(post.status, PostStatus::Scheduled);
        assert!(post.scheduled_date.ends_with('Z'));
        assert_eq!(
            post.media_url.as_deref(),
            Some("https://picsum.photos/seed/0.5/800/400")
        );
    }
}
