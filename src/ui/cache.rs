use crate::icons::IconResolver;
use image::ImageReader;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::mpsc::{Sender, channel};
use std::thread;
use tiny_skia::{Pixmap, Transform};

/// Icon pixmaps keyed by icon reference.
///
/// Lookups never block the UI: a miss queues the reference for the loader
/// thread and reports "not yet", the decoded pixmap arrives later on the
/// calloop channel. A reference that resolves or decodes to nothing is
/// cached as `None` so the renderer falls back to the placeholder without
/// retrying forever.
pub struct IconCache {
    cache: HashMap<String, Option<Pixmap>>,
    pending: HashSet<String>,
    request_tx: Sender<String>,
}

impl IconCache {
    pub fn new(
        resolver: IconResolver,
        icon_size: u32,
        response_tx: calloop::channel::Sender<(String, Option<Pixmap>)>,
    ) -> Self {
        let (request_tx, request_rx) = channel::<String>();

        thread::spawn(move || {
            while let Ok(icon_ref) = request_rx.recv() {
                let pixmap = load_icon(&resolver, &icon_ref, icon_size);
                let _ = response_tx.send((icon_ref, pixmap));
            }
        });

        Self {
            cache: HashMap::new(),
            pending: HashSet::new(),
            request_tx,
        }
    }

    pub fn get(&mut self, icon_ref: &str) -> Option<Pixmap> {
        if let Some(cached) = self.cache.get(icon_ref) {
            return cached.clone();
        }

        if !self.pending.contains(icon_ref) {
            self.pending.insert(icon_ref.to_string());
            let _ = self.request_tx.send(icon_ref.to_string());
        }

        None
    }

    pub fn insert(&mut self, icon_ref: String, pixmap: Option<Pixmap>) {
        self.pending.remove(&icon_ref);
        self.cache.insert(icon_ref, pixmap);
    }
}

fn load_icon(resolver: &IconResolver, icon_ref: &str, size: u32) -> Option<Pixmap> {
    let path = resolver.resolve(icon_ref)?;
    let loaded = match path.extension().and_then(|ext| ext.to_str()) {
        Some("svg") => load_svg(&path, size),
        _ => load_raster(&path, size),
    };
    if loaded.is_none() {
        debug!("could not decode {}", path.display());
    }
    loaded
}

fn load_raster(path: &Path, size: u32) -> Option<Pixmap> {
    let img = ImageReader::open(path).ok()?.decode().ok()?;
    let img = img.resize(size, size, image::imageops::FilterType::Lanczos3);
    let mut rgba = img.into_rgba8();

    for pixel in rgba.chunks_exact_mut(4) {
        let a = pixel[3] as f32 / 255.0;
        pixel[0] = (pixel[0] as f32 * a) as u8;
        pixel[1] = (pixel[1] as f32 * a) as u8;
        pixel[2] = (pixel[2] as f32 * a) as u8;
    }

    let width = rgba.width();
    let height = rgba.height();

    Pixmap::from_vec(rgba.into_vec(), tiny_skia::IntSize::from_wh(width, height)?)
}

fn load_svg(path: &Path, size: u32) -> Option<Pixmap> {
    let opt = resvg::usvg::Options::default();
    let svg_data = fs::read(path).ok()?;
    let tree = resvg::usvg::Tree::from_data(&svg_data, &opt).ok()?;

    let mut pixmap = Pixmap::new(size, size)?;
    let transform = Transform::from_scale(
        size as f32 / tree.size().width(),
        size as f32 / tree.size().height(),
    );

    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Some(pixmap)
}
