//! Data ports. The HTTP client and the local store live outside this crate;
//! [`memory`] has stand-ins for tests and the demo.

use crate::error::UseCaseError;
use crate::model::{Album, Artist, Track};

pub trait CatalogRepository: Send + Sync {
    fn search_artists(&self, term: &str, limit: usize) -> Result<Vec<Artist>, UseCaseError>;
    fn artist(&self, artist_id: i64) -> Result<Option<Artist>, UseCaseError>;
    fn lookup_albums(&self, artist_id: i64) -> Result<Vec<Album>, UseCaseError>;
    fn lookup_tracks(&self, album_id: i64) -> Result<Vec<Track>, UseCaseError>;
}

pub trait LikedRepository: Send + Sync {
    fn liked_artists(&self) -> Result<Vec<Artist>, UseCaseError>;
    /// Liking twice is a no-op.
    fn like(&self, artist: Artist) -> Result<(), UseCaseError>;
    /// Unliking an artist that is not liked is a no-op.
    fn unlike(&self, artist_id: i64) -> Result<(), UseCaseError>;
    fn is_liked(&self, artist_id: i64) -> Result<bool, UseCaseError>;
}

pub mod memory {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use parking_lot::{Mutex, RwLock};

    use super::*;

    #[derive(Default)]
    struct Tables {
        artists: Vec<Artist>,
        albums: Vec<Album>,
        tracks: Vec<Track>,
    }

    /// Catalog held in memory. Can pretend to be offline or slow.
    #[derive(Default)]
    pub struct MemoryCatalog {
        tables: RwLock<Tables>,
        offline: AtomicBool,
        latency: Mutex<Option<Duration>>,
    }

    impl MemoryCatalog {
        pub fn add_artist(&self, artist: Artist) {
            self.tables.write().artists.push(artist);
        }

        pub fn add_album(&self, album: Album) {
            self.tables.write().albums.push(album);
        }

        pub fn add_track(&self, track: Track) {
            self.tables.write().tracks.push(track);
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn is_offline(&self) -> bool {
            self.offline.load(Ordering::SeqCst)
        }

        pub fn set_latency(&self, latency: Option<Duration>) {
            *self.latency.lock() = latency;
        }

        fn round_trip(&self) -> Result<(), UseCaseError> {
            let latency = *self.latency.lock();
            if let Some(d) = latency {
                std::thread::sleep(d);
            }
            if self.is_offline() {
                return Err(UseCaseError::Unreachable("catalog host".into()));
            }
            Ok(())
        }
    }

    impl CatalogRepository for MemoryCatalog {
        fn search_artists(&self, term: &str, limit: usize) -> Result<Vec<Artist>, UseCaseError> {
            self.round_trip()?;
            let needle = term.to_lowercase();
            Ok(self
                .tables
                .read()
                .artists
                .iter()
                .filter(|a| a.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .collect())
        }

        fn artist(&self, artist_id: i64) -> Result<Option<Artist>, UseCaseError> {
            self.round_trip()?;
            Ok(self
                .tables
                .read()
                .artists
                .iter()
                .find(|a| a.id == artist_id)
                .cloned())
        }

        fn lookup_albums(&self, artist_id: i64) -> Result<Vec<Album>, UseCaseError> {
            self.round_trip()?;
            Ok(self
                .tables
                .read()
                .albums
                .iter()
                .filter(|a| a.artist_id == artist_id)
                .cloned()
                .collect())
        }

        fn lookup_tracks(&self, album_id: i64) -> Result<Vec<Track>, UseCaseError> {
            self.round_trip()?;
            Ok(self
                .tables
                .read()
                .tracks
                .iter()
                .filter(|t| t.album_id == album_id)
                .cloned()
                .collect())
        }
    }

    /// Liked set in insertion order.
    #[derive(Default)]
    pub struct MemoryLiked {
        artists: Mutex<Vec<Artist>>,
    }

    impl LikedRepository for MemoryLiked {
        fn liked_artists(&self) -> Result<Vec<Artist>, UseCaseError> {
            Ok(self.artists.lock().clone())
        }

        fn like(&self, artist: Artist) -> Result<(), UseCaseError> {
            let mut artists = self.artists.lock();
            if !artists.iter().any(|a| a.id == artist.id) {
                artists.push(artist);
            }
            Ok(())
        }

        fn unlike(&self, artist_id: i64) -> Result<(), UseCaseError> {
            self.artists.lock().retain(|a| a.id != artist_id);
            Ok(())
        }

        fn is_liked(&self, artist_id: i64) -> Result<bool, UseCaseError> {
            Ok(self.artists.lock().iter().any(|a| a.id == artist_id))
        }
    }

}
