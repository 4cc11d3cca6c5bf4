//! One controller per destination. Screens are built inside their
//! navigation entry's scope, so popping the entry drops their observers.

mod album;
mod artist;
mod favorites;
mod search;

use std::rc::Rc;
use std::sync::Arc;

use encore_core::Executor;
use encore_navigation::{EntryScope, Navigate, Route};

use crate::ports::ImageLoader;
use crate::screen::Feedback;
use crate::surface::SurfaceState;
use crate::viewmodel::UseCases;

pub use album::{AlbumScreen, TrackManager};
pub use artist::{AlbumManager, ArtistScreen};
pub use favorites::{FavoriteManager, FavoritesScreen};
pub use search::{ArtistManager, SearchScreen};

/// Everything a screen needs apart from its navigator.
#[derive(Clone)]
pub struct ScreenEnv {
    pub executor: Arc<dyn Executor>,
    pub use_cases: UseCases,
    pub images: Rc<dyn ImageLoader>,
    pub feedback: Feedback,
}

pub enum Screen {
    Search(SearchScreen),
    Artist(ArtistScreen),
    Album(AlbumScreen),
    Favorites(FavoritesScreen),
}

impl Screen {
    /// Builds the screen for `entry`; must run inside the entry's scope.
    pub fn build(entry: &EntryScope<Route>, env: &ScreenEnv) -> Screen {
        let nav: Rc<dyn Navigate<Route>> = Rc::new(entry.navigator());
        let scope = entry.scope();
        match entry.key() {
            Route::Search => Screen::Search(SearchScreen::new(env, nav, scope)),
            Route::Artist { artist_id, .. } => {
                Screen::Artist(ArtistScreen::new(*artist_id, env, nav, scope))
            }
            Route::Album { album_id, .. } => {
                Screen::Album(AlbumScreen::new(*album_id, env, scope))
            }
            Route::Favorites => Screen::Favorites(FavoritesScreen::new(env, nav, scope)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Search(_) => "search",
            Screen::Artist(_) => "artist",
            Screen::Album(_) => "album",
            Screen::Favorites(_) => "favorites",
        }
    }

    pub fn surface(&self) -> SurfaceState {
        match self {
            Screen::Search(s) => s.surface(),
            Screen::Artist(s) => s.surface(),
            Screen::Album(s) => s.surface(),
            Screen::Favorites(s) => s.surface(),
        }
    }

    /// Pull-to-refresh.
    pub fn refresh(&self) {
        match self {
            Screen::Search(s) => s.refresh(),
            Screen::Artist(s) => s.refresh(),
            Screen::Album(s) => s.refresh(),
            Screen::Favorites(s) => s.refresh(),
        }
    }

    pub fn click(&self, position: usize) -> bool {
        match self {
            Screen::Search(s) => s.click(position),
            Screen::Artist(s) => s.click(position),
            Screen::Album(s) => s.click(position),
            Screen::Favorites(s) => s.click(position),
        }
    }

    /// Row titles in display order.
    pub fn titles(&self) -> Vec<String> {
        match self {
            Screen::Search(s) => s.rows().into_iter().map(|a| a.name).collect(),
            Screen::Artist(s) => s.rows().into_iter().map(|a| a.name).collect(),
            Screen::Album(s) => s
                .rows()
                .into_iter()
                .map(|t| format!("{}. {} ({})", t.track_number, t.name, t.duration_label()))
                .collect(),
            Screen::Favorites(s) => s.rows().into_iter().map(|a| a.name).collect(),
        }
    }
}
