use std::rc::Rc;

use encore_core::{Artist, Scope};
use encore_navigation::{Navigate, Route};

use super::ScreenEnv;
use crate::ports::{ImageLoader, Message};
use crate::reconciler::{ItemDelegate, ListReconciler};
use crate::screen::{ScreenController, ScreenState};
use crate::surface::SurfaceState;
use crate::viewmodel::FavoritesViewModel;

/// Liked artists. Unliking reloads the list once the command succeeds.
pub struct FavoritesScreen {
    view_model: Rc<FavoritesViewModel>,
    controller: Rc<ScreenController<Artist>>,
}

impl FavoritesScreen {
    pub fn new(env: &ScreenEnv, nav: Rc<dyn Navigate<Route>>, scope: &Scope) -> Self {
        let manager = Rc::new(FavoriteManager {
            navigator: nav,
            images: env.images.clone(),
        });
        let controller = Rc::new(ScreenController::new(
            ListReconciler::new(manager),
            env.feedback.clone(),
        ));
        let view_model = Rc::new(FavoritesViewModel::new(
            &env.use_cases,
            env.executor.clone(),
        ));

        let c = controller.clone();
        view_model.liked.observe_in(scope, move |result| c.render(result));

        let c = controller.clone();
        let vm = Rc::downgrade(&view_model);
        view_model.like.observe_in(scope, move |result| {
            if c.render_command(result, Message::Unliked)
                && let Some(vm) = vm.upgrade()
            {
                vm.get_liked_artists();
            }
        });

        view_model.get_liked_artists();

        Self {
            view_model,
            controller,
        }
    }

    pub fn refresh(&self) {
        self.view_model.get_liked_artists();
    }

    pub fn click(&self, position: usize) -> bool {
        self.controller.reconciler().click(position)
    }

    /// Swipe-to-remove on the row at `position`.
    pub fn unlike(&self, position: usize) -> bool {
        match self.controller.reconciler().item_at(position) {
            Some(artist) => {
                self.view_model.unlike_artist(artist.id);
                true
            }
            None => false,
        }
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

pub struct FavoriteManager {
    navigator: Rc<dyn Navigate<Route>>,
    images: Rc<dyn ImageLoader>,
}

impl ItemDelegate<Artist> for FavoriteManager {
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
