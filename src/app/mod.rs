//! `RootlensApp` — the top-level egui application state.
//!
//! The struct and its lifecycle live here; the panels are drawn by the
//! sibling modules:
//!
//! - `session` — phase machine and progress model
//! - `view`    — upload / processing / result panels

pub mod session;
pub mod view;

use std::path::PathBuf;
use std::sync::mpsc;

use eframe::egui;
use log::warn;

use crate::net::upload::{send_photo, UploadError};
use crate::server::routes::AnalyzeResponse;
use session::Session;

/// Worker-thread → UI messages for one upload.
pub enum UploadEvent {
    Sent { sent: u64, total: u64 },
    Done(Result<AnalyzeResponse, UploadError>),
}

pub struct PickedPhoto {
    pub path: PathBuf,
    pub name: String,
    pub size_label: String,
}

pub struct RootlensApp {
    /// Base URL of the API service.
    endpoint: String,
    pub session: Session,
    pub picked: Option<PickedPhoto>,
    pub user_name: String,
    pending_preview: Option<egui::ColorImage>,
    pub preview: Option<egui::TextureHandle>,
    pub outcome: Option<AnalyzeResponse>,
    pub carousel: usize,
    upload_rx: Option<mpsc::Receiver<UploadEvent>>,
}

impl RootlensApp {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            session: Session::new(),
            picked: None,
            user_name: String::new(),
            pending_preview: None,
            preview: None,
            outcome: None,
            carousel: 0,
            upload_rx: None,
        }
    }

    /// Register a chosen photo and decode a preview thumbnail.
    pub fn pick_photo(&mut self, path: PathBuf) {
        if self.session.is_uploading() {
            return;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let size_label = std::fs::metadata(&path)
            .map(|m| format!("{:.2} MB", m.len() as f64 / 1024.0 / 1024.0))
            .unwrap_or_default();

        self.pending_preview = match image::open(&path) {
            Ok(img) => {
                let thumb = img.thumbnail(512, 512).to_rgba8();
                let (w, h) = thumb.dimensions();
                Some(egui::ColorImage::from_rgba_unmultiplied(
                    [w as usize, h as usize],
                    &thumb,
                ))
            }
            Err(e) => {
                warn!("preview decode failed for {name}: {e}");
                None
            }
        };
        self.preview = None;
        self.picked = Some(PickedPhoto {
            path,
            name,
            size_label,
        });
    }

    /// Kick off the upload worker. No-op while a request is in flight.
    pub fn start_analysis(&mut self, ctx: &egui::Context) {
        let Some(picked) = &self.picked else { return };
        if !self.session.begin_processing() {
            return;
        }
        self.outcome = None;

        let (tx, rx) = mpsc::channel();
        self.upload_rx = Some(rx);

        let endpoint = format!("{}/api/analyze-face", self.endpoint.trim_end_matches('/'));
        let path = picked.path.clone();
        let total = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            let progress_tx = tx.clone();
            let result = send_photo(&endpoint, &path, move |sent| {
                let _ = progress_tx.send(UploadEvent::Sent { sent, total });
            });
            let _ = tx.send(UploadEvent::Done(result));
            ctx.request_repaint();
        });
    }

    /// Drain worker events and update the session.
    fn poll_upload(&mut self) {
        let Some(rx) = &self.upload_rx else { return };
        let mut done = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                UploadEvent::Sent { sent, total } => {
                    self.session.upload_progress(sent, total);
                }
                UploadEvent::Done(Ok(response)) => {
                    self.outcome = Some(response);
                    self.carousel = 0;
                    self.session.complete();
                    done = true;
                }
                UploadEvent::Done(Err(e)) => {
                    warn!("analysis request failed: {e}");
                    self.session.fail();
                    done = true;
                }
            }
        }
        if done {
            self.upload_rx = None;
        }
    }

    pub fn new_reading(&mut self) {
        self.session.reset();
        self.picked = None;
        self.pending_preview = None;
        self.preview = None;
        self.outcome = None;
        self.carousel = 0;
        self.upload_rx = None;
    }
}

impl eframe::App for RootlensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_upload();
        self.session.poll();

        if let Some(img) = self.pending_preview.take() {
            self.preview = Some(ctx.load_texture("photo-preview", img, Default::default()));
        }

        match self.session.phase() {
            session::Phase::Upload => view::upload_panel(self, ctx),
            session::Phase::Processing => {
                view::processing_panel(self, ctx);
                // Keep frames coming for the synthetic progress band.
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
            }
            session::Phase::Result => view::result_panel(self, ctx),
        }
    }
}
