use serde::{Deserialize, Serialize};

/// Destinations of the catalog app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Search,
    Artist { artist_id: i64, artist_name: String },
    Album { album_id: i64, album_name: String },
    Favorites,
}

impl Route {
    pub fn title(&self) -> &str {
        match self {
            Route::Search => "Search",
            Route::Artist { artist_name, .. } => artist_name,
            Route::Album { album_name, .. } => album_name,
            Route::Favorites => "Favorites",
        }
    }
}
