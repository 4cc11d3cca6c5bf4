//! Application operations. Each one is a thin pass-through to a repository;
//! what they add is a uniform shape the result channel can invoke.

use std::sync::Arc;

use crate::error::UseCaseError;
use crate::model::{Album, Artist, LikeRequest, SearchRequest, Track};
use crate::repository::{CatalogRepository, LikedRepository};

/// One application operation. Runs on a worker thread and may block.
pub trait UseCase: Send + Sync + 'static {
    type Params: Send + 'static;
    type Output: Send + 'static;

    fn execute(&self, params: Self::Params) -> Result<Self::Output, UseCaseError>;
}

pub struct SearchArtists {
    catalog: Arc<dyn CatalogRepository>,
}

impl SearchArtists {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

impl UseCase for SearchArtists {
    type Params = SearchRequest;
    type Output = Vec<Artist>;

    fn execute(&self, params: SearchRequest) -> Result<Vec<Artist>, UseCaseError> {
        let term = params.term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.catalog.search_artists(term, params.limit)
    }
}

pub struct LookupAlbums {
    catalog: Arc<dyn CatalogRepository>,
}

impl LookupAlbums {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

impl UseCase for LookupAlbums {
    type Params = i64;
    type Output = Vec<Album>;

    fn execute(&self, artist_id: i64) -> Result<Vec<Album>, UseCaseError> {
        self.catalog.lookup_albums(artist_id)
    }
}

pub struct LookupTracks {
    catalog: Arc<dyn CatalogRepository>,
}

impl LookupTracks {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }
}

impl UseCase for LookupTracks {
    type Params = i64;
    type Output = Vec<Track>;

    fn execute(&self, album_id: i64) -> Result<Vec<Track>, UseCaseError> {
        self.catalog.lookup_tracks(album_id)
    }
}

pub struct GetLikedArtists {
    liked: Arc<dyn LikedRepository>,
}

impl GetLikedArtists {
    pub fn new(liked: Arc<dyn LikedRepository>) -> Self {
        Self { liked }
    }
}

impl UseCase for GetLikedArtists {
    type Params = ();
    type Output = Vec<Artist>;

    fn execute(&self, _: ()) -> Result<Vec<Artist>, UseCaseError> {
        self.liked.liked_artists()
    }
}

pub struct LikeArtist {
    catalog: Arc<dyn CatalogRepository>,
    liked: Arc<dyn LikedRepository>,
}

impl LikeArtist {
    pub fn new(catalog: Arc<dyn CatalogRepository>, liked: Arc<dyn LikedRepository>) -> Self {
        Self { catalog, liked }
    }
}

impl UseCase for LikeArtist {
    type Params = LikeRequest;
    type Output = ();

    fn execute(&self, req: LikeRequest) -> Result<(), UseCaseError> {
        let artist = self
            .catalog
            .artist(req.artist_id)?
            .ok_or(UseCaseError::NotFound {
                what: "artist",
                id: req.artist_id,
            })?;
        self.liked.like(artist)
    }
}

pub struct UnlikeArtist {
    liked: Arc<dyn LikedRepository>,
}

impl UnlikeArtist {
    pub fn new(liked: Arc<dyn LikedRepository>) -> Self {
        Self { liked }
    }
}

impl UseCase for UnlikeArtist {
    type Params = LikeRequest;
    type Output = ();

    fn execute(&self, req: LikeRequest) -> Result<(), UseCaseError> {
        self.liked.unlike(req.artist_id)
    }
}
