//! View-models bind use cases to result channels. They hold no UI state of
//! their own; screens observe the channels.

use std::cell::RefCell;
use std::sync::Arc;

use encore_core::*;

/// Every use case the screens invoke.
#[derive(Clone)]
pub struct UseCases {
    pub search_artists: Arc<SearchArtists>,
    pub lookup_albums: Arc<LookupAlbums>,
    pub lookup_tracks: Arc<LookupTracks>,
    pub get_liked_artists: Arc<GetLikedArtists>,
    pub like_artist: Arc<LikeArtist>,
    pub unlike_artist: Arc<UnlikeArtist>,
}

impl UseCases {
    pub fn new(catalog: Arc<dyn CatalogRepository>, liked: Arc<dyn LikedRepository>) -> Self {
        Self {
            search_artists: Arc::new(SearchArtists::new(catalog.clone())),
            lookup_albums: Arc::new(LookupAlbums::new(catalog.clone())),
            lookup_tracks: Arc::new(LookupTracks::new(catalog.clone())),
            get_liked_artists: Arc::new(GetLikedArtists::new(liked.clone())),
            like_artist: Arc::new(LikeArtist::new(catalog, liked.clone())),
            unlike_artist: Arc::new(UnlikeArtist::new(liked)),
        }
    }
}

pub struct SearchViewModel {
    search_artists: Arc<SearchArtists>,
    like_artist: Arc<LikeArtist>,
    last_term: RefCell<Option<String>>,
    pub artists: ResultChannel<Vec<Artist>>,
    pub like: CompletableChannel,
}

impl SearchViewModel {
    pub fn new(use_cases: &UseCases, executor: Arc<dyn Executor>) -> Self {
        Self {
            search_artists: use_cases.search_artists.clone(),
            like_artist: use_cases.like_artist.clone(),
            last_term: RefCell::new(None),
            artists: ResultChannel::new("search", executor.clone()),
            like: ResultChannel::new("like", executor),
        }
    }

    pub fn search(&self, term: &str) -> u64 {
        *self.last_term.borrow_mut() = Some(term.to_owned());
        self.artists
            .invoke(self.search_artists.clone(), SearchRequest::new(term))
    }

    /// Repeats the last search; `None` if nothing was searched yet.
    pub fn research(&self) -> Option<u64> {
        let term = self.last_term.borrow().clone()?;
        Some(self.search(&term))
    }

    pub fn last_term(&self) -> Option<String> {
        self.last_term.borrow().clone()
    }

    pub fn like_artist(&self, artist_id: i64) -> u64 {
        self.like
            .invoke(self.like_artist.clone(), LikeRequest { artist_id })
    }
}

pub struct ArtistViewModel {
    lookup_albums: Arc<LookupAlbums>,
    pub albums: ResultChannel<Vec<Album>>,
}

impl ArtistViewModel {
    pub fn new(use_cases: &UseCases, executor: Arc<dyn Executor>) -> Self {
        Self {
            lookup_albums: use_cases.lookup_albums.clone(),
            albums: ResultChannel::new("albums", executor),
        }
    }

    pub fn lookup_albums(&self, artist_id: i64) -> u64 {
        self.albums.invoke(self.lookup_albums.clone(), artist_id)
    }
}

pub struct AlbumViewModel {
    lookup_tracks: Arc<LookupTracks>,
    pub tracks: ResultChannel<Vec<Track>>,
}

impl AlbumViewModel {
    pub fn new(use_cases: &UseCases, executor: Arc<dyn Executor>) -> Self {
        Self {
            lookup_tracks: use_cases.lookup_tracks.clone(),
            tracks: ResultChannel::new("tracks", executor),
        }
    }

    pub fn lookup_tracks(&self, album_id: i64) -> u64 {
        self.tracks.invoke(self.lookup_tracks.clone(), album_id)
    }
}

pub struct FavoritesViewModel {
    get_liked_artists: Arc<GetLikedArtists>,
    unlike_artist: Arc<UnlikeArtist>,
    pub liked: ResultChannel<Vec<Artist>>,
    pub like: CompletableChannel,
}

impl FavoritesViewModel {
    pub fn new(use_cases: &UseCases, executor: Arc<dyn Executor>) -> Self {
        Self {
            get_liked_artists: use_cases.get_liked_artists.clone(),
            unlike_artist: use_cases.unlike_artist.clone(),
            liked: ResultChannel::new("liked", executor.clone()),
            like: ResultChannel::new("unlike", executor),
        }
    }

    pub fn get_liked_artists(&self) -> u64 {
        self.liked.invoke(self.get_liked_artists.clone(), ())
    }

    pub fn unlike_artist(&self, artist_id: i64) -> u64 {
        self.like
            .invoke(self.unlike_artist.clone(), LikeRequest { artist_id })
    }
}
