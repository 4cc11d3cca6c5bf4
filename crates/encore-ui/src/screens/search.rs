use std::rc::Rc;

use encore_core::{Artist, Scope};
use encore_navigation::{Navigate, Route};

use super::ScreenEnv;
use crate::ports::{ImageLoader, Message};
use crate::reconciler::{ItemDelegate, ListReconciler};
use crate::screen::{ScreenController, ScreenState};
use crate::surface::SurfaceState;
use crate::viewmodel::SearchViewModel;

/// Artist search. Stays `Idle` until the first query.
pub struct SearchScreen {
    view_model: SearchViewModel,
    controller: Rc<ScreenController<Artist>>,
    nav: Rc<dyn Navigate<Route>>,
}

impl SearchScreen {
    pub fn new(env: &ScreenEnv, nav: Rc<dyn Navigate<Route>>, scope: &Scope) -> Self {
        let manager = Rc::new(ArtistManager {
            navigator: nav.clone(),
            images: env.images.clone(),
        });
        let controller = Rc::new(ScreenController::new(
            ListReconciler::new(manager),
            env.feedback.clone(),
        ));
        let view_model = SearchViewModel::new(&env.use_cases, env.executor.clone());

        let c = controller.clone();
        view_model.artists.observe_in(scope, move |result| c.render(result));
        let c = controller.clone();
        view_model.like.observe_in(scope, move |result| {
            c.render_command(result, Message::Liked);
        });

        Self {
            view_model,
            controller,
            nav,
        }
    }

    pub fn search(&self, term: &str) {
        self.view_model.search(term);
    }

    pub fn refresh(&self) {
        if self.view_model.research().is_none() {
            log::debug!("refresh before any search; nothing to do");
        }
    }

    pub fn click(&self, position: usize) -> bool {
        self.controller.reconciler().click(position)
    }

    /// Like button on the row at `position`.
    pub fn like(&self, position: usize) -> bool {
        match self.controller.reconciler().item_at(position) {
            Some(artist) => {
                self.view_model.like_artist(artist.id);
                true
            }
            None => false,
        }
    }

    pub fn open_favorites(&self) {
        self.nav.navigate(Route::Favorites);
    }

    pub fn rows(&self) -> Vec<Artist> {
        self.controller.reconciler().items()
    }

    pub fn state(&self) -> ScreenState<Vec<Artist>> {
        self.controller.state()
    }

    pub fn surface(&self) -> SurfaceState {
        self.controller.surface()
    }
}

/// Opens the tapped artist.
pub struct ArtistManager {
    navigator: Rc<dyn Navigate<Route>>,
    images: Rc<dyn ImageLoader>,
}

impl ItemDelegate<Artist> for ArtistManager {
    fn on_item_clicked(&self, item: &Artist, _position: usize) {
        self.navigator.navigate(Route::Artist {
            artist_id: item.id,
            artist_name: item.name.clone(),
        });
    }

    fn image_loader(&self) -> Rc<dyn ImageLoader> {
        self.images.clone()
    }
}
