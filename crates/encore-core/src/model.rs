use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl Artist {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            genre: None,
            link: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub release_date: DateTime<Utc>,
    /// Owning artist, by id.
    pub artist_id: i64,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub track_count: u32,
}

impl Album {
    pub fn new(id: i64, name: impl Into<String>, artist_id: i64, release_date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            release_date,
            artist_id,
            artwork_url: None,
            track_count: 0,
        }
    }

    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }
}

/// Newest first; ties keep their incoming order.
pub fn sort_by_release_desc(albums: &mut [Album]) {
    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub album_id: i64,
    pub track_number: u32,
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl Track {
    /// `m:ss`
    pub fn duration_label(&self) -> String {
        let secs = self.duration_ms / 1000;
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LikeRequest {
    pub artist_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub limit: usize,
}

impl SearchRequest {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
