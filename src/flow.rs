//! The input → preview → export state machine.
//!
//! The controller is a reducer: it consumes [`Event`]s, mutates the single
//! [`SessionState`] it owns, and returns [`Effect`]s describing the side
//! effects the caller must run (lookups, captures, user notices, file
//! delivery). It performs no I/O itself, which keeps every transition unit
//! testable without a fetcher or a rendering surface.
//!
//! Async completions re-enter as events carrying the request id they were
//! issued with. Ids are monotonically increasing per session; a completion
//! whose id no longer matches the most recent request is stale (the user
//! resubmitted or navigated away) and is disregarded.

use crate::artifact::ArtifactViewModel;
use crate::error::{LookupError, RasterError};
use crate::metadata::{RepoRef, RepositoryMetadata};
use crate::rendering::{Bitmap, CaptureOptions};
use crate::theme::{self, Theme, ThemeId};

/// Which screen the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Input,
    Preview,
}

/// A user-visible signal. Every surfaced failure produces exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MalformedReference,
    LookupFailed(LookupError),
    ExportFailed(RasterError),
}

impl Notice {
    /// The wording shown to the user. Rate-limit and transient lookups read
    /// the same here; the distinction lives in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Notice::MalformedReference => "Repository link unrecognized.",
            Notice::LookupFailed(LookupError::NotFound) => "Repository not found.",
            Notice::LookupFailed(_) => "Repository lookup failed. Try again shortly.",
            Notice::ExportFailed(_) => "Export failed. Try again.",
        }
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone)]
pub enum Event {
    Submit(String),
    ThemeSelected(ThemeId),
    ExportRequested,
    Reset,
    LookupCompleted {
        request_id: u64,
        result: std::result::Result<RepositoryMetadata, LookupError>,
    },
    CaptureCompleted {
        request_id: u64,
        result: std::result::Result<Bitmap, RasterError>,
    },
}

/// Side effects the caller must execute after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Resolve {
        request_id: u64,
        reference: RepoRef,
    },
    Capture {
        request_id: u64,
        view_model: ArtifactViewModel,
        options: CaptureOptions,
    },
    Notify(Notice),
    Deliver {
        filename: String,
        bitmap: Bitmap,
    },
}

/// The single mutable session record. Mutated only by
/// [`FlowController::handle`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub screen: Screen,
    pub active_theme: ThemeId,
    pub raw_input: String,
    pub metadata: Option<RepositoryMetadata>,
    pub view_model: Option<ArtifactViewModel>,
    pub exporting: bool,
}

/// The finite-state machine driving one input → preview → export session.
pub struct FlowController {
    state: SessionState,
    capture_options: CaptureOptions,
    next_request: u64,
    pending_lookup: Option<u64>,
    pending_capture: Option<u64>,
}

impl FlowController {
    pub fn new(capture_options: CaptureOptions) -> Self {
        Self {
            state: SessionState {
                screen: Screen::Input,
                active_theme: theme::default_theme().id,
                raw_input: String::new(),
                metadata: None,
                view_model: None,
                exporting: false,
            },
            capture_options,
            next_request: 0,
            pending_lookup: None,
            pending_capture: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies one event and returns the effects to run.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Submit(raw) => self.on_submit(raw),
            Event::ThemeSelected(id) => self.on_theme_selected(id),
            Event::ExportRequested => self.on_export_requested(),
            Event::Reset => self.on_reset(),
            Event::LookupCompleted { request_id, result } => {
                self.on_lookup_completed(request_id, result)
            }
            Event::CaptureCompleted { request_id, result } => {
                self.on_capture_completed(request_id, result)
            }
        }
    }

    fn on_submit(&mut self, raw: String) -> Vec<Effect> {
        if self.state.screen != Screen::Input {
            log::debug!("submit ignored outside the input screen");
            return vec![];
        }
        self.state.raw_input = raw;

        let reference = match RepoRef::parse(&self.state.raw_input) {
            Ok(reference) => reference,
            Err(LookupError::MalformedReference) => {
                return vec![Effect::Notify(Notice::MalformedReference)];
            }
            Err(other) => return vec![Effect::Notify(Notice::LookupFailed(other))],
        };

        let request_id = self.next_request_id();
        self.pending_lookup = Some(request_id);
        log::info!("resolving {} (request {})", reference.slug(), request_id);
        vec![Effect::Resolve {
            request_id,
            reference,
        }]
    }

    fn on_lookup_completed(
        &mut self,
        request_id: u64,
        result: std::result::Result<RepositoryMetadata, LookupError>,
    ) -> Vec<Effect> {
        if self.pending_lookup != Some(request_id) || self.state.screen != Screen::Input {
            log::debug!("disregarding stale lookup completion (request {})", request_id);
            return vec![];
        }
        self.pending_lookup = None;

        match result {
            Ok(metadata) => {
                self.state.metadata = Some(metadata);
                self.rebuild_view_model();
                self.state.screen = Screen::Preview;
                vec![]
            }
            Err(error) => {
                match &error {
                    LookupError::RateLimited => log::warn!("lookup rate limited"),
                    LookupError::Transient(detail) => log::warn!("transient lookup failure: {detail}"),
                    _ => log::info!("lookup failed: {error}"),
                }
                vec![Effect::Notify(Notice::LookupFailed(error))]
            }
        }
    }

    fn on_theme_selected(&mut self, id: ThemeId) -> Vec<Effect> {
        self.state.active_theme = id;
        // Cheap, synchronous recompute; metadata is untouched.
        self.rebuild_view_model();
        vec![]
    }

    fn on_export_requested(&mut self) -> Vec<Effect> {
        if self.state.screen != Screen::Preview || self.state.exporting {
            // Idempotent guard: at most one capture in flight per session.
            log::debug!("export ignored (screen {:?}, exporting {})",
                self.state.screen, self.state.exporting);
            return vec![];
        }
        let view_model = match &self.state.view_model {
            Some(vm) => vm.clone(),
            None => return vec![],
        };

        let request_id = self.next_request_id();
        self.state.exporting = true;
        self.pending_capture = Some(request_id);
        vec![Effect::Capture {
            request_id,
            view_model,
            options: self.capture_options,
        }]
    }

    fn on_capture_completed(
        &mut self,
        request_id: u64,
        result: std::result::Result<Bitmap, RasterError>,
    ) -> Vec<Effect> {
        if self.pending_capture != Some(request_id) {
            log::debug!("disregarding stale capture completion (request {})", request_id);
            return vec![];
        }
        self.pending_capture = None;
        self.state.exporting = false;

        match result {
            Ok(bitmap) => {
                let filename = match &self.state.view_model {
                    Some(vm) => vm.artifact_filename(),
                    None => return vec![],
                };
                vec![Effect::Deliver { filename, bitmap }]
            }
            Err(error) => {
                log::warn!("capture failed: {error}");
                vec![Effect::Notify(Notice::ExportFailed(error))]
            }
        }
    }

    fn on_reset(&mut self) -> Vec<Effect> {
        if self.state.screen != Screen::Preview {
            return vec![];
        }
        // Theme and raw input survive the reset; the preview session does not.
        self.state.screen = Screen::Input;
        self.state.metadata = None;
        self.state.view_model = None;
        self.state.exporting = false;
        self.pending_lookup = None;
        self.pending_capture = None;
        vec![]
    }

    fn rebuild_view_model(&mut self) {
        self.state.view_model = self
            .state
            .metadata
            .as_ref()
            .map(|m| ArtifactViewModel::build(m, Theme::by_id(self.state.active_theme)));
    }

    fn next_request_id(&mut self) -> u64 {
        self.next_request += 1;
        self.next_request
    }
}
