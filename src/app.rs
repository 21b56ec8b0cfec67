//! An async-friendly studio facade backed by a dedicated worker thread.
//!
//! The worker thread owns the blocking fetcher, the rasterizer and the flow
//! controller, and executes commands sent from async tasks so callers can
//! use an async interface without requiring any of those to be `Send`
//! across await points. Exactly one command is processed at a time, which
//! makes every state transition atomic with respect to other callers.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::flow::{Effect, Event, FlowController, Notice, SessionState};
use crate::metadata::{GithubFetcher, MetadataFetcher};
use crate::rendering::{self, CaptureOptions, Rasterizer};
use crate::theme::ThemeId;
use crate::StudioConfig;

enum Command {
    Submit(String, oneshot::Sender<Result<SessionState>>),
    ChangeTheme(ThemeId, oneshot::Sender<Result<SessionState>>),
    Export(oneshot::Sender<Result<ExportReceipt>>),
    Reset(oneshot::Sender<Result<SessionState>>),
    State(oneshot::Sender<SessionState>),
    Close(oneshot::Sender<()>),
}

/// Proof of a delivered artifact: where it was written and how large it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Handle to one running session (spawns a background worker that owns the
/// pipeline).
pub struct ArtifactStudio {
    cmd_tx: Sender<Command>,
}

impl ArtifactStudio {
    /// Launches the studio worker and waits for it to initialize.
    pub async fn launch(config: StudioConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            // Initialize the pipeline on the worker thread; the blocking
            // HTTP clients must never be built on a runtime thread.
            let mut worker = match Worker::new(config) {
                Ok(w) => w,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };

            let _ = init_tx.send(Ok(()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    Command::Submit(raw, resp) => {
                        let _ = resp.send(worker.submit(raw));
                    }
                    Command::ChangeTheme(id, resp) => {
                        let _ = resp.send(worker.change_theme(id));
                    }
                    Command::Export(resp) => {
                        let _ = resp.send(worker.export());
                    }
                    Command::Reset(resp) => {
                        let _ = resp.send(worker.reset());
                    }
                    Command::State(resp) => {
                        let _ = resp.send(worker.controller.state().clone());
                    }
                    Command::Close(resp) => {
                        let _ = resp.send(());
                        break;
                    }
                }
            }
        });

        init_rx
            .await
            .map_err(|e| Error::StudioClosed(format!("worker init canceled: {e}")))??;

        Ok(Self { cmd_tx })
    }

    /// Submits a repository reference; resolves to the post-lookup state.
    pub async fn submit(&self, reference: &str) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Submit(reference.to_string(), tx));
        rx.await
            .map_err(|e| Error::StudioClosed(format!("submit canceled: {e}")))?
    }

    /// Replaces the active theme (valid in any state).
    pub async fn change_theme(&self, theme: ThemeId) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::ChangeTheme(theme, tx));
        rx.await
            .map_err(|e| Error::StudioClosed(format!("change_theme canceled: {e}")))?
    }

    /// Captures the previewed card and writes `<name>-artifact.png`.
    pub async fn export(&self) -> Result<ExportReceipt> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Export(tx));
        rx.await
            .map_err(|e| Error::StudioClosed(format!("export canceled: {e}")))?
    }

    /// Discards the preview and returns to the input screen.
    pub async fn reset(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Reset(tx));
        rx.await
            .map_err(|e| Error::StudioClosed(format!("reset canceled: {e}")))?
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::State(tx));
        rx.await
            .map_err(|e| Error::StudioClosed(format!("state canceled: {e}")))
    }

    /// Shuts down the background worker.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::StudioClosed(format!("close canceled: {e}")))
    }
}

// Everything the worker thread owns.
struct Worker {
    controller: FlowController,
    fetcher: GithubFetcher,
    rasterizer: Rasterizer,
    output_dir: PathBuf,
}

// What a batch of effects amounted to.
#[derive(Default)]
struct EffectOutcome {
    notices: Vec<Notice>,
    delivered: Option<ExportReceipt>,
    io_error: Option<std::io::Error>,
}

impl Worker {
    fn new(config: StudioConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            fetcher: GithubFetcher::new(&config)?,
            rasterizer: Rasterizer::new(&config)?,
            controller: FlowController::new(CaptureOptions {
                pixel_density: config.pixel_density,
            }),
            output_dir: config.output_dir.clone(),
        })
    }

    fn submit(&mut self, raw: String) -> Result<SessionState> {
        let effects = self.controller.handle(Event::Submit(raw));
        let outcome = self.run_effects(effects);
        if let Some(notice) = outcome.notices.into_iter().next() {
            return Err(notice_to_error(notice));
        }
        Ok(self.controller.state().clone())
    }

    fn change_theme(&mut self, id: ThemeId) -> Result<SessionState> {
        let effects = self.controller.handle(Event::ThemeSelected(id));
        self.run_effects(effects);
        Ok(self.controller.state().clone())
    }

    fn export(&mut self) -> Result<ExportReceipt> {
        let effects = self.controller.handle(Event::ExportRequested);
        if effects.is_empty() {
            return Err(Error::InvalidState(
                "nothing to export: no preview active".to_string(),
            ));
        }
        let outcome = self.run_effects(effects);
        if let Some(err) = outcome.io_error {
            return Err(err.into());
        }
        if let Some(notice) = outcome.notices.into_iter().next() {
            return Err(notice_to_error(notice));
        }
        outcome
            .delivered
            .ok_or_else(|| Error::StudioClosed("capture produced no artifact".to_string()))
    }

    fn reset(&mut self) -> Result<SessionState> {
        let effects = self.controller.handle(Event::Reset);
        self.run_effects(effects);
        Ok(self.controller.state().clone())
    }

    // Executes effects in order. Completions feed straight back into the
    // controller within this same turn, so no other command can observe a
    // half-applied transition.
    fn run_effects(&mut self, effects: Vec<Effect>) -> EffectOutcome {
        let mut outcome = EffectOutcome::default();
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Resolve {
                    request_id,
                    reference,
                } => {
                    let result = self.fetcher.resolve(&reference);
                    queue.extend(
                        self.controller
                            .handle(Event::LookupCompleted { request_id, result }),
                    );
                }
                Effect::Capture {
                    request_id,
                    view_model,
                    options,
                } => {
                    let surface = rendering::compose(&view_model);
                    let result = self.rasterizer.capture(&surface, &options);
                    queue.extend(
                        self.controller
                            .handle(Event::CaptureCompleted { request_id, result }),
                    );
                }
                Effect::Notify(notice) => {
                    log::info!("notice: {}", notice.user_message());
                    outcome.notices.push(notice);
                }
                Effect::Deliver { filename, bitmap } => {
                    let path = self.output_dir.join(&filename);
                    match std::fs::write(&path, &bitmap.png_data) {
                        Ok(()) => {
                            log::info!("wrote {} ({} bytes)", path.display(), bitmap.png_data.len());
                            outcome.delivered = Some(ExportReceipt {
                                path,
                                bytes: bitmap.png_data.len(),
                            });
                        }
                        Err(err) => outcome.io_error = Some(err),
                    }
                }
            }
        }

        outcome
    }
}

fn notice_to_error(notice: Notice) -> Error {
    match notice {
        Notice::MalformedReference => Error::Lookup(crate::LookupError::MalformedReference),
        Notice::LookupFailed(e) => Error::Lookup(e),
        Notice::ExportFailed(e) => Error::Raster(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Screen;
    use crate::LookupError;

    fn offline_config() -> StudioConfig {
        StudioConfig {
            // Unroutable base: tests below never reach the network.
            api_base: "http://127.0.0.1:1".to_string(),
            output_dir: std::env::temp_dir(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn malformed_submit_surfaces_without_touching_the_network() {
        let studio = ArtifactStudio::launch(offline_config()).await.unwrap();
        let err = studio.submit("not-a-reference").await.unwrap_err();
        assert!(matches!(err, Error::Lookup(LookupError::MalformedReference)));
        let state = studio.state().await.unwrap();
        assert_eq!(state.screen, Screen::Input);
        assert!(state.metadata.is_none());
        studio.close().await.unwrap();
    }

    #[tokio::test]
    async fn export_without_preview_is_rejected() {
        let studio = ArtifactStudio::launch(offline_config()).await.unwrap();
        let err = studio.export().await.unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        studio.close().await.unwrap();
    }

    #[tokio::test]
    async fn theme_changes_apply_in_any_state() {
        let studio = ArtifactStudio::launch(offline_config()).await.unwrap();
        let state = studio.change_theme(ThemeId::Solar).await.unwrap();
        assert_eq!(state.active_theme, ThemeId::Solar);
        studio.close().await.unwrap();
    }
}
