use std::rc::Rc;

use encore_core::{Scope, Signal, Track, signal};

use super::ScreenEnv;
use crate::ports::ImageLoader;
use crate::reconciler::{ItemDelegate, ListReconciler};
use crate::screen::{ScreenController, ScreenState};
use crate::surface::SurfaceState;
use crate::viewmodel::AlbumViewModel;

/// Tracks of one album in track order. Tapping a track selects it for
/// preview playback.
pub struct AlbumScreen {
    album_id: i64,
    view_model: AlbumViewModel,
    controller: Rc<ScreenController<Track>>,
    selected: Signal<Option<Track>>,
}

impl AlbumScreen {
    pub fn new(album_id: i64, env: &ScreenEnv, scope: &Scope) -> Self {
        let selected = signal(None);
        let manager = Rc::new(TrackManager {
            selected: selected.clone(),
            images: env.images.clone(),
        });
        let controller = Rc::new(
            ScreenController::new(ListReconciler::new(manager), env.feedback.clone())
                .arrange_with(|tracks: &mut Vec<Track>| tracks.sort_by_key(|t| t.track_number)),
        );
        let view_model = AlbumViewModel::new(&env.use_cases, env.executor.clone());

        let c = controller.clone();
        view_model.tracks.observe_in(scope, move |result| c.render(result));
        view_model.lookup_tracks(album_id);

        Self {
            album_id,
            view_model,
            controller,
            selected,
        }
    }

    pub fn refresh(&self) {
        self.view_model.lookup_tracks(self.album_id);
    }

    pub fn click(&self, position: usize) -> bool {
        self.controller.reconciler().click(position)
    }

    pub fn rows(&self) -> Vec<Track> {
        self.controller.reconciler().items()
    }

    pub fn selected(&self) -> Option<Track> {
        self.selected.get()
    }

    pub fn state(&self) -> ScreenState<Vec<Track>> {
        self.controller.state()
    }

    pub fn surface(&self) -> SurfaceState {
        self.controller.surface()
    }
}

pub struct TrackManager {
    selected: Signal<Option<Track>>,
    images: Rc<dyn ImageLoader>,
}

impl ItemDelegate<Track> for TrackManager {
    fn on_item_clicked(&self, item: &Track, position: usize) {
        match &item.preview_url {
            Some(url) => log::info!("preview track {position}: {url}"),
            None => log::info!("track {position} has no preview"),
        }
        self.selected.set(Some(item.clone()));
    }

    fn image_loader(&self) -> Rc<dyn ImageLoader> {
        self.images.clone()
    }
}
