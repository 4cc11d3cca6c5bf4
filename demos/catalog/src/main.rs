//! Headless run of the catalog screens against an in-memory catalog.
//!
//! Drives a scripted session (search, browse, like, unlike, go offline) and
//! prints what each screen would show.

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use encore_core::memory::{MemoryCatalog, MemoryLiked};
use encore_core::*;
use encore_navigation::{EntryScope, NavBackStack, NavHost, Route, back, install_back_handler};
use encore_ui::ports::{ImageRequests, SharedConnectivity, ToastLog};
use encore_ui::{Feedback, ImageTarget, Screen, ScreenEnv, UseCases};
use serde::Deserialize;

const SEED: &str = include_str!("../catalog.json");

#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(about = "Browse a seeded music catalog without a display")]
struct Args {
    /// Catalog and runtime settings; the bundled seed is used when omitted
    #[arg(short, long, env = "ENCORE_CATALOG")]
    config: Option<PathBuf>,

    /// Start with the network down
    #[arg(long)]
    offline: bool,

    /// Search term for the first screen
    #[arg(short, long, default_value = "broad")]
    term: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogConfig {
    runtime: RuntimeConfig,
    /// Simulated round trip per repository call
    latency_ms: u64,
    liked: Vec<i64>,
    artists: Vec<Artist>,
    albums: Vec<Album>,
    tracks: Vec<Track>,
}

impl CatalogConfig {
    fn load(path: Option<&PathBuf>) -> Result<Self> {
        let text = match path {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("reading {}", p.display()))?,
            None => SEED.to_owned(),
        };
        let cfg: Self = serde_json::from_str(&text).context("parsing catalog config")?;
        cfg.runtime.validate()?;
        Ok(cfg)
    }

    fn seed(&self) -> Result<(Arc<MemoryCatalog>, Arc<MemoryLiked>)> {
        let catalog = Arc::new(MemoryCatalog::default());
        for a in &self.artists {
            catalog.add_artist(a.clone());
        }
        for a in &self.albums {
            catalog.add_album(a.clone());
        }
        for t in &self.tracks {
            catalog.add_track(t.clone());
        }
        if self.latency_ms > 0 {
            catalog.set_latency(Some(Duration::from_millis(self.latency_ms)));
        }

        let liked = Arc::new(MemoryLiked::default());
        for id in &self.liked {
            let artist = self
                .artists
                .iter()
                .find(|a| a.id == *id)
                .with_context(|| format!("liked artist {id} is not in the catalog"))?;
            liked.like(artist.clone())?;
        }
        Ok((catalog, liked))
    }
}

struct Session {
    host: NavHost<Route, Screen>,
    stack: NavBackStack<Route>,
    timeout: Duration,
}

impl Session {
    fn screen(&self) -> Result<Rc<Screen>> {
        self.host.current().context("navigation stack is empty")
    }

    /// Pumps until the top screen stops refreshing and no more results arrive.
    fn settle(&self) -> Result<()> {
        for _ in 0..50 {
            let handled = looper::run_until_idle(self.timeout);
            if handled == 0 && !self.screen()?.surface().refreshing {
                return Ok(());
            }
        }
        log::warn!("gave up waiting for {}", self.screen()?.name());
        Ok(())
    }

    fn show(&self) -> Result<()> {
        let screen = self.screen()?;
        let route = self.stack.keys().last().map(|r| r.title().to_owned());
        let surface = screen.surface();
        println!(
            "[{}] {} rows={} empty={} refreshing={}",
            screen.name(),
            route.unwrap_or_default(),
            surface.rows,
            surface.empty_visible,
            surface.refreshing
        );
        for (i, title) in screen.titles().iter().enumerate() {
            println!("  {i:>2}  {title}");
        }
        Ok(())
    }

    fn click(&self, position: usize) -> Result<()> {
        if !self.screen()?.click(position) {
            log::warn!("nothing at row {position}");
        }
        self.settle()?;
        self.show()
    }

    fn back(&self) -> Result<()> {
        if !back::handle() {
            log::info!("already at the root");
        }
        self.show()
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let cfg = CatalogConfig::load(args.config.as_ref())?;
    let (catalog, liked) = cfg.seed()?;
    log::info!(
        "seeded {} artists, {} albums, {} tracks",
        cfg.artists.len(),
        cfg.albums.len(),
        cfg.tracks.len()
    );

    let pool = Arc::new(ThreadPool::new(&cfg.runtime)?);
    let net = SharedConnectivity::new(!args.offline);
    catalog.set_offline(args.offline);
    let toasts = Rc::new(ToastLog::default());
    let images = Rc::new(ImageRequests::default());
    let env = ScreenEnv {
        executor: pool.clone(),
        use_cases: UseCases::new(catalog.clone(), liked.clone()),
        images: images.clone(),
        feedback: Feedback {
            connectivity: Rc::new(net.clone()),
            toaster: toasts.clone(),
        },
    };

    let stack = NavBackStack::new(Route::Search);
    let host = NavHost::new(
        stack.clone(),
        Rc::new(move |entry: &EntryScope<Route>| Screen::build(entry, &env)),
    );
    // the handler lives as long as the app scope
    let app = Scope::new();
    let _ = app.run(|| install_back_handler(stack.clone()));
    let session = Session {
        host,
        stack,
        timeout: cfg.runtime.pump_timeout(),
    };

    let screen = session.screen()?;
    if let Screen::Search(search) = &*screen {
        search.search(&args.term);
    }
    session.settle()?;
    session.show()?;

    // artist, then its newest album
    session.click(0)?;
    if let Screen::Artist(artist) = &*session.screen()? {
        artist.controller().reconciler().bind(0, ImageTarget(1));
    }
    session.click(0)?;
    session.screen()?.click(0);
    session.back()?;
    session
        .host
        .navigator()
        .pop_to(|r| *r == Route::Search, false);
    session.show()?;

    if let Screen::Search(search) = &*session.screen()? {
        search.like(1);
        session.settle()?;
        search.open_favorites();
    }
    session.settle()?;
    session.show()?;

    if let Screen::Favorites(favorites) = &*session.screen()? {
        favorites.unlike(0);
        session.settle()?;
        session.show()?;
    }
    session.back()?;

    log::info!("network going down");
    catalog.set_offline(true);
    net.set_online(false);
    session.screen()?.refresh();
    session.settle()?;
    session.show()?;

    println!("toasts:");
    for m in toasts.messages() {
        println!("  {}", m.text());
    }
    println!("images requested: {}", images.requests().len());

    app.dispose();
    pool.shutdown();
    Ok(())
}
