mod catalog;
mod config;
mod desktop;
mod icons;
mod model;
mod opener;
mod scanner;
mod state;
mod ui;

use anyhow::Result;
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use clap::Parser;
use smithay_client_toolkit::{
    shell::wlr_layer::{Anchor, KeyboardInteractivity, Layer},
    shell::WaylandSurface,
};
use std::path::PathBuf;
use std::thread;
use wayland_client::{Connection, globals::registry_queue_init};

use crate::catalog::build_catalog;
use crate::config::load_config;
use crate::icons::IconResolver;
use crate::state::AppState;
use crate::ui::cache::IconCache;
use crate::ui::render::Renderer;
use crate::ui::wayland::WaylandApp;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Additional application directories to scan
    #[arg(short, long)]
    root: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let mut config = load_config(args.config.as_deref())?;
    config.paths.application_dirs.extend(args.root);

    // 2. Setup Wayland Connection & Event Loop
    let mut event_loop: EventLoop<WaylandApp> = EventLoop::try_new()?;
    let conn = Connection::connect_to_env()?;
    let (globals, event_queue) = registry_queue_init::<WaylandApp>(&conn)?;
    let qh = event_queue.handle();

    // 3. Init State & UI
    let (tx_icons, rx_icons) = calloop::channel::channel::<(String, Option<tiny_skia::Pixmap>)>();
    let resolver = IconResolver::new(&config.paths);
    let icon_cache = IconCache::new(resolver, config.theme.icon_size, tx_icons);
    let renderer = Renderer::new(icon_cache);

    let app_state = AppState::new(config.clone());
    let mut app = WaylandApp::new(&conn, &globals, &qh, app_state, renderer);

    // 4. Create Layer Surface
    let surface = app.compositor_state.create_surface(&qh);
    let layer_surface = app.layer_shell_state.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("deskview"),
        None,
    );

    layer_surface.set_anchor(Anchor::empty());
    layer_surface.set_size(config.theme.width, config.theme.height);
    layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
    layer_surface.commit();
    app.layer_surface = Some(layer_surface);

    // 5. One-shot catalog build, off the UI thread. The complete grouped
    // result is sent exactly once and assigned whole on arrival.
    let (tx_groups, rx_groups) = calloop::channel::channel();
    let paths = config.paths.clone();

    thread::spawn(move || {
        let _ = tx_groups.send(build_catalog(&paths));
    });

    let conn_clone = conn.clone();
    let qh_clone = qh.clone();

    // Icon results handler
    let conn_c1 = conn_clone.clone();
    let qh_c1 = qh_clone.clone();
    event_loop.handle().insert_source(rx_icons, move |event, _, app: &mut WaylandApp| {
        if let calloop::channel::Event::Msg((name, pixmap)) = event {
            app.renderer.insert_icon(name, pixmap);
            app.draw(&conn_c1, &qh_c1);
        }
    }).unwrap();

    // Catalog result handler
    let conn_c2 = conn_clone.clone();
    let qh_c2 = qh_clone.clone();
    event_loop.handle().insert_source(rx_groups, move |event, _, app: &mut WaylandApp| {
        if let calloop::channel::Event::Msg(groups) = event {
            app.state.set_groups(groups);
            app.draw(&conn_c2, &qh_c2);
        }
    }).unwrap();

    event_loop.handle().insert_source(
        WaylandSource::new(conn.clone(), event_queue),
        |_, queue, app| {
            queue.dispatch_pending(app)
        }
    ).unwrap();

    // 6. Run Loop
    loop {
        if app.should_exit {
            break;
        }
        event_loop.dispatch(None, &mut app)?;
    }

    Ok(())
}
