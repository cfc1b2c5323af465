//! Machinery shared by the page controllers.

use log::{debug, error};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{ApiClient, Transport};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{PortalError, Result};
use crate::record::Record;
use crate::render::Renderer;
use crate::target::RenderTarget;
use crate::toast::{ToastKind, ToastService};

pub const TOAST_REGION: &str = "toastContainer";

/// Where a collection is in its fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// In-memory copy of one server-owned collection
///
/// Replaced wholesale by every successful fetch. A failed fetch records the
/// error but keeps whatever was loaded before.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<Record>,
    state: LoadState,
    loaded: bool,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Local projection for optimistic updates.
    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        &mut self.records
    }

    /// Whether a fetch has ever succeeded since the last `clear`.
    pub fn has_data(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id().as_deref() == Some(id))
    }

    /// Enter `Loading`. Returns true when nothing is displayed yet, i.e. the
    /// region should show the loading fragment.
    pub fn begin(&mut self) -> bool {
        self.state = LoadState::Loading;
        !self.loaded
    }

    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
        self.loaded = true;
        self.state = LoadState::Loaded;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = LoadState::Error(message.into());
    }

    /// Forget everything (course switch).
    pub fn clear(&mut self) {
        *self = Snapshot::default();
    }
}

/// Everything a controller talks to: the API, the page, the toasts
pub struct PageContext<T, R> {
    pub api: ApiClient<T>,
    pub target: R,
    pub toasts: ToastService,
    pub clock: Arc<dyn Clock>,
    pub renderer: Renderer,
    pending: HashSet<&'static str>,
}

impl<T: Transport, R: RenderTarget> PageContext<T, R> {
    pub fn new(api: ApiClient<T>, target: R, clock: Arc<dyn Clock>, config: &Config) -> Result<Self> {
        Ok(PageContext {
            toasts: ToastService::new(clock.clone(), config.toast_duration(), config.toast_capacity),
            renderer: Renderer::new()?,
            api,
            target,
            clock,
            pending: HashSet::new(),
        })
    }

    /// Write a rendered fragment; a template failure becomes an error toast.
    pub fn paint(&mut self, region: &str, html: Result<String>) {
        match html {
            Ok(html) => self.target.replace(region, &html),
            Err(e) => self.report(&format!("render {}", region), &e),
        }
    }

    pub fn notify(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.toasts.show(kind, message);
        self.repaint_toasts();
    }

    pub fn notify_titled(&mut self, kind: ToastKind, title: &str, message: impl Into<String>) {
        self.toasts.show_titled(kind, title, message);
        self.repaint_toasts();
    }

    /// Log a failure and surface it as a single error toast.
    pub fn report(&mut self, context: &str, err: &PortalError) {
        error!("{}: {}", context, err);
        self.notify(ToastKind::Error, err.to_string());
    }

    /// Drop expired toasts, repainting only when something went.
    pub fn expire_toasts(&mut self) {
        if self.toasts.expire() > 0 {
            self.repaint_toasts();
        }
    }

    pub fn dismiss_toast(&mut self, id: &str) {
        match Uuid::parse_str(id) {
            Ok(id) if self.toasts.dismiss(id) => self.repaint_toasts(),
            _ => debug!("toast {} already gone", id),
        }
    }

    fn repaint_toasts(&mut self) {
        match self.renderer.toasts(self.toasts.visible()) {
            Ok(html) => self.target.replace(TOAST_REGION, &html),
            Err(e) => error!("render toasts: {}", e),
        }
    }

    /// Mark `control` busy for an in-flight mutation. False when it already is.
    pub fn begin_mutation(&mut self, control: &'static str) -> bool {
        if !self.pending.insert(control) {
            debug!("{} still busy, ignoring", control);
            return false;
        }
        self.target.set_busy(control, true);
        true
    }

    pub fn end_mutation(&mut self, control: &'static str) {
        self.pending.remove(control);
        self.target.set_busy(control, false);
    }
}
