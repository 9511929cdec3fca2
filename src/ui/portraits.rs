use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{bail, Context};
use eframe::egui;
use log::{debug, warn};

enum PortraitState {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

/// Suspect portraits, fetched off the UI thread and kept as textures.
pub struct PortraitCache {
    entries: HashMap<String, PortraitState>,
    tx: Sender<(String, anyhow::Result<egui::ColorImage>)>,
    rx: Receiver<(String, anyhow::Result<egui::ColorImage>)>,
}

impl PortraitCache {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entries: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Forget every portrait; a new case has new faces.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Turn finished downloads into textures.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((url, result)) = self.rx.try_recv() {
            // Late arrival for a cleared case
            if !self.entries.contains_key(&url) {
                continue;
            }

            let state = match result {
                Ok(image) => PortraitState::Ready(ctx.load_texture(
                    url.clone(),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    warn!("portrait {} unavailable: {:#}", url, e);
                    PortraitState::Failed
                }
            };
            self.entries.insert(url, state);
        }
    }

    /// Texture for `url`, starting a download on first sight.
    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> Option<&egui::TextureHandle> {
        if !self.entries.contains_key(url) {
            self.entries.insert(url.to_string(), PortraitState::Loading);
            self.spawn_fetch(ctx, url);
        }

        match self.entries.get(url) {
            Some(PortraitState::Ready(texture)) => Some(texture),
            _ => None,
        }
    }

    pub fn is_loading(&self, url: &str) -> bool {
        matches!(self.entries.get(url), Some(PortraitState::Loading))
    }

    fn spawn_fetch(&self, ctx: &egui::Context, url: &str) {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let url = url.to_string();

        thread::spawn(move || {
            debug!("fetching portrait {}", url);
            let result = fetch_portrait(&url);
            let _ = tx.send((url, result));
            ctx.request_repaint();
        });
    }
}

fn fetch_portrait(url: &str) -> anyhow::Result<egui::ColorImage> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("not an http url");
    }

    let bytes = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.bytes())
        .context("downloading")?;

    let image = image::load_from_memory(&bytes).context("decoding")?.to_rgba8();
    let size = [image.width() as usize, image.height() as usize];

    Ok(egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

/// Up to two capital letters for the fallback badge.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}
