use std::rc::Rc;

use encore_core::{Album, Scope, sort_by_release_desc};
use encore_navigation::{Navigate, Route};

use super::ScreenEnv;
use crate::ports::ImageLoader;
use crate::reconciler::{ItemDelegate, ListReconciler};
use crate::screen::{ScreenController, ScreenState};
use crate::surface::SurfaceState;
use crate::viewmodel::ArtistViewModel;

/// Albums of one artist, newest first.
pub struct ArtistScreen {
    artist_id: i64,
    view_model: ArtistViewModel,
    controller: Rc<ScreenController<Album>>,
}

impl ArtistScreen {
    pub fn new(artist_id: i64, env: &ScreenEnv, nav: Rc<dyn Navigate<Route>>, scope: &Scope) -> Self {
        let manager = Rc::new(AlbumManager {
            navigator: nav,
            images: env.images.clone(),
        });
        let controller = Rc::new(
            ScreenController::new(ListReconciler::new(manager), env.feedback.clone())
                .arrange_with(|albums: &mut Vec<Album>| sort_by_release_desc(albums)),
        );
        let view_model = ArtistViewModel::new(&env.use_cases, env.executor.clone());

        let c = controller.clone();
        view_model.albums.observe_in(scope, move |result| c.render(result));
        view_model.lookup_albums(artist_id);

        Self {
            artist_id,
            view_model,
            controller,
        }
    }

    pub fn refresh(&self) {
        self.view_model.lookup_albums(self.artist_id);
    }

    pub fn click(&self, position: usize) -> bool {
        self.controller.reconciler().click(position)
    }

    pub fn rows(&self) -> Vec<Album> {
        self.controller.reconciler().items()
    }

    pub fn state(&self) -> ScreenState<Vec<Album>> {
        self.controller.state()
    }

    pub fn surface(&self) -> SurfaceState {
        self.controller.surface()
    }

    pub fn controller(&self) -> &ScreenController<Album> {
        &self.controller
    }
}

/// Opens the tapped album and resolves album artwork.
pub struct AlbumManager {
    navigator: Rc<dyn Navigate<Route>>,
    images: Rc<dyn ImageLoader>,
}

impl ItemDelegate<Album> for AlbumManager {
    fn on_item_clicked(&self, item: &Album, _position: usize) {
        self.navigator.navigate(Route::Album {
            album_id: item.id,
            album_name: item.name.clone(),
        });
    }

    fn image_loader(&self) -> Rc<dyn ImageLoader> {
        self.images.clone()
    }
}
