//! Admin dashboard: statistics, stage progress, submissions, group status.

use log::{debug, error, info};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::api::{HttpMethod, Transport};
use crate::bindings::{Bindings, UiEvent};
use crate::clock::RefreshTimer;
use crate::controller::{LoadState, PageContext, Snapshot};
use crate::modal::{CloseReason, Modal};
use crate::listing::ViewState;
use crate::record::Record;
use crate::render::{self, submission_count_label};
use crate::target::RenderTarget;
use crate::toast::ToastKind;

pub const STATISTICS_PATH: &str = "/api/admin/statistics";
pub const GROUP_STATUS_PATH: &str = "/api/admin/groups/submission-status";
pub const SUBMISSIONS_PATH: &str = "/api/admin/submissions";

pub const STAGES_REGION: &str = "stagesContainer";
pub const SUBMISSIONS_REGION: &str = "submissionsTableBody";
pub const SUBMISSIONS_COUNT: &str = "submissionsCount";
pub const GROUP_STATUS_REGION: &str = "groupsStatusTableBody";
pub const STAT_CARDS: [&str; 3] = ["totalGroupsCard", "totalSubmissionsCard", "avgSubmissionsCard"];
pub const DELETE_MODAL: &str = "deleteGroupModal";
const DELETE_NAME_REGION: &str = "deleteGroupName";
const CONFIRM_DELETE: &str = "confirmDeleteGroupBtn";
const CANCEL_DELETE: &str = "cancelDeleteGroupBtn";

/// Stage the submissions table starts filtered to.
const INITIAL_STAGE: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardAction {
    Refresh,
    FilterStage(Option<u32>),
    ResetFilter,
    SortSubmissions(String),
    RequestDelete {
        id: String,
        name: String,
        invoker: Option<String>,
    },
    ConfirmDelete,
    CloseDelete(CloseReason),
    Key(String),
    Visibility(bool),
    DismissToast(String),
}

fn stage_value(event: &UiEvent) -> Option<u32> {
    event.value().trim().parse().ok()
}

/// Submissions sometimes carry the group fields nested under `groups`.
fn flatten_submission(record: Record) -> Record {
    let nested = record.object("groups");
    let mut fields = match record.into_value() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Some(group) = nested {
        for field in ["group_name", "project_title"] {
            let present = matches!(fields.get(field), Some(Value::String(s)) if !s.is_empty());
            if !present {
                if let Some(value) = group.str(field) {
                    fields.insert(field.to_string(), Value::String(value.to_string()));
                }
            }
        }
    }
    Record::new(fields)
}

/// Reconciliation controller for the admin dashboard
pub struct DashboardController<T, R> {
    ctx: PageContext<T, R>,
    statistics: Snapshot,
    group_status: Snapshot,
    submissions: Snapshot,
    submissions_view: ViewState,
    stage_filter: Option<u32>,
    timer: RefreshTimer,
    delete_modal: Modal,
    pending_delete: Option<(String, String)>,
}

impl<T: Transport, R: RenderTarget> DashboardController<T, R> {
    pub fn new(ctx: PageContext<T, R>, refresh_interval: Duration) -> Self {
        DashboardController {
            ctx,
            statistics: Snapshot::new(),
            group_status: Snapshot::new(),
            submissions: Snapshot::new(),
            submissions_view: ViewState::new(),
            stage_filter: None,
            timer: RefreshTimer::new(refresh_interval),
            delete_modal: Modal::new(DELETE_MODAL),
            pending_delete: None,
        }
    }

    pub fn bindings() -> Bindings<DashboardAction> {
        Bindings::new()
            .bind("refresh", |_| Some(DashboardAction::Refresh))
            .bind("apply-filter", |e| Some(DashboardAction::FilterStage(stage_value(e))))
            .bind("stage-filter-change", |e| {
                Some(DashboardAction::FilterStage(stage_value(e)))
            })
            .bind("reset-filter", |_| Some(DashboardAction::ResetFilter))
            .bind("sort-submissions", |e| {
                e.get("column")
                    .map(|c| DashboardAction::SortSubmissions(c.to_string()))
            })
            .bind("delete-group", |e| {
                Some(DashboardAction::RequestDelete {
                    id: e.get("group-id")?.to_string(),
                    name: e.get("group-name").unwrap_or("").to_string(),
                    invoker: e.get("invoker").map(str::to_string),
                })
            })
            .bind("confirm-delete-group", |_| Some(DashboardAction::ConfirmDelete))
            .bind("cancel-delete-group", |_| {
                Some(DashboardAction::CloseDelete(CloseReason::CloseButton))
            })
            .bind("delete-modal-overlay", |_| {
                Some(DashboardAction::CloseDelete(CloseReason::Overlay))
            })
            .bind("keydown", |e| e.get("key").map(|k| DashboardAction::Key(k.to_string())))
            .bind("visibility", |e| match e.get("state")? {
                "visible" => Some(DashboardAction::Visibility(true)),
                "hidden" => Some(DashboardAction::Visibility(false)),
                _ => None,
            })
            .bind("dismiss-toast", |e| {
                e.get("toast-id")
                    .map(|id| DashboardAction::DismissToast(id.to_string()))
            })
    }

    pub async fn handle(&mut self, event: &UiEvent) {
        match Self::bindings().resolve(event) {
            Some(action) => self.apply(action).await,
            None => debug!("dashboard ignores {}", event.name),
        }
    }

    pub async fn apply(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Refresh => self.refresh().await,
            DashboardAction::FilterStage(stage) => self.fetch_submissions(stage).await,
            DashboardAction::ResetFilter => self.fetch_submissions(None).await,
            DashboardAction::SortSubmissions(column) => self.sort_submissions(&column),
            DashboardAction::RequestDelete { id, name, invoker } => {
                self.request_delete(&id, &name, invoker.as_deref())
            }
            DashboardAction::ConfirmDelete => self.confirm_delete().await,
            DashboardAction::CloseDelete(reason) => self.close_delete(reason),
            DashboardAction::Key(key) => {
                if key == "Escape" {
                    self.close_delete(CloseReason::Escape);
                }
            }
            DashboardAction::Visibility(visible) => self.set_visible(visible).await,
            DashboardAction::DismissToast(id) => self.ctx.dismiss_toast(&id),
        }
    }

    /// First load: statistics, group status, stage-1 submissions, then the timer.
    pub async fn init(&mut self) {
        info!("initializing admin dashboard");
        self.refresh().await;
        self.load_group_status().await;
        self.fetch_submissions(Some(INITIAL_STAGE)).await;
        self.timer.start(self.ctx.clock.now());
    }

    /// Statistics, stage bars and the submissions table
    ///
    /// With a stage filter in place the filtered list is fetched again;
    /// without one the table shows the statistics' recent submissions.
    pub async fn refresh(&mut self) {
        let first = self.statistics.begin();
        if first {
            let loading = self.ctx.renderer.loading("Loading stage data...");
            self.ctx.paint(STAGES_REGION, loading);
        }

        for card in STAT_CARDS {
            self.ctx.target.set_busy(card, true);
        }
        let fetched = self.ctx.api.fetch_record(STATISTICS_PATH, &[]).await;
        for card in STAT_CARDS {
            self.ctx.target.set_busy(card, false);
        }

        let stats = match fetched {
            Ok(stats) => stats,
            Err(e) => {
                self.statistics.fail(e.to_string());
                if first {
                    let html = self
                        .ctx
                        .renderer
                        .error_state("Failed to load dashboard data", &e.to_string());
                    self.ctx.paint(STAGES_REGION, html);
                }
                error!("dashboard refresh: {}", e);
                self.ctx.notify(
                    ToastKind::Error,
                    format!("Failed to load dashboard data: {}", e),
                );
                return;
            }
        };

        match self.ctx.renderer.stat_cards(&stats) {
            Ok(cards) => {
                for card in cards {
                    self.ctx.target.replace(card.region, &card.html);
                }
            }
            Err(e) => self.ctx.report("render statistics", &e),
        }
        let stages = self.ctx.renderer.stages(&stats.records("stages"));
        self.ctx.paint(STAGES_REGION, stages);

        let recent = stats.records("recent_submissions");
        self.statistics.replace(vec![stats]);

        match self.stage_filter {
            Some(stage) => self.fetch_submissions(Some(stage)).await,
            None => {
                self.submissions
                    .replace(recent.into_iter().map(flatten_submission).collect());
                self.paint_submissions();
            }
        }
        debug!("dashboard data refreshed");
    }

    pub async fn load_group_status(&mut self) {
        let first = self.group_status.begin();
        match self.ctx.api.fetch_collection(GROUP_STATUS_PATH, &[]).await {
            Ok(groups) => {
                info!("loaded submission status for {} groups", groups.len());
                self.group_status.replace(groups);
                let html = self.ctx.renderer.group_status(self.group_status.records());
                self.ctx.paint(GROUP_STATUS_REGION, html);
            }
            Err(e) => {
                self.group_status.fail(e.to_string());
                if first {
                    let html = self
                        .ctx
                        .renderer
                        .error_state("Error loading groups. Please try again.", "")
                        .map(|alert| format!("<tr><td colspan=\"9\">{}</td></tr>", alert));
                    self.ctx.paint(GROUP_STATUS_REGION, html);
                }
                self.ctx.notify(
                    ToastKind::Error,
                    format!("Failed to load groups submission status: {}", e),
                );
                error!("group status: {}", e);
            }
        }
    }

    /// Re-fetch the submissions table, optionally for one stage.
    pub async fn fetch_submissions(&mut self, stage: Option<u32>) {
        let mut params = vec![("sort", "submitted_at".to_string())];
        if let Some(stage) = stage {
            params.push(("stage_number", stage.to_string()));
        }

        self.submissions.begin();
        match self.ctx.api.fetch_collection(SUBMISSIONS_PATH, &params).await {
            Ok(records) => {
                self.stage_filter = stage;
                self.submissions
                    .replace(records.into_iter().map(flatten_submission).collect());
                self.paint_submissions();
            }
            Err(e) => {
                // the rows on screen still belong to the previous filter
                self.submissions.fail(e.to_string());
                error!("submissions: {}", e);
                self.ctx
                    .notify(ToastKind::Error, format!("Failed to load submissions: {}", e));
            }
        }
    }

    pub fn sort_submissions(&mut self, column: &str) {
        self.submissions_view.sort_by(column);
        self.paint_submissions();
    }

    fn paint_submissions(&mut self) {
        let rows = self
            .ctx
            .renderer
            .submissions(self.submissions.records(), &self.submissions_view);
        self.ctx.paint(SUBMISSIONS_REGION, rows);
        let label = submission_count_label(self.submissions.records().len());
        self.ctx.target.replace(SUBMISSIONS_COUNT, &label);
    }

    pub fn request_delete(&mut self, id: &str, name: &str, invoker: Option<&str>) {
        self.pending_delete = Some((id.to_string(), name.to_string()));
        self.ctx.target.replace(DELETE_NAME_REGION, &render::text(name));
        self.delete_modal
            .open(&mut self.ctx.target, invoker, &[CONFIRM_DELETE, CANCEL_DELETE]);
    }

    pub fn close_delete(&mut self, reason: CloseReason) {
        if self.delete_modal.close(&mut self.ctx.target, reason) {
            self.pending_delete = None;
        }
    }

    /// Delete the group awaiting confirmation, then reload what it affects.
    pub async fn confirm_delete(&mut self) {
        let Some((id, name)) = self.pending_delete.clone() else {
            return;
        };
        if !self.ctx.begin_mutation(CONFIRM_DELETE) {
            return;
        }

        let path = format!("/api/groups/{}", urlencoding::encode(&id));
        let outcome = self.ctx.api.mutate(HttpMethod::Delete, &path, None).await;
        self.ctx.end_mutation(CONFIRM_DELETE);
        self.close_delete(CloseReason::Completed);

        match outcome {
            Ok(_) => {
                info!("deleted group {}", id);
                self.ctx.notify(
                    ToastKind::Success,
                    format!("Group \"{}\" deleted successfully", name),
                );
                self.load_group_status().await;
                self.refresh().await;
            }
            Err(e) => {
                error!("delete group {}: {}", id, e);
                self.ctx
                    .notify(ToastKind::Error, format!("Failed to delete group: {}", e));
            }
        }
    }

    /// Hidden pages stop polling; a page coming back fetches at once.
    pub async fn set_visible(&mut self, visible: bool) {
        if visible {
            self.refresh().await;
            self.timer.start(self.ctx.clock.now());
        } else {
            self.timer.cancel();
        }
    }

    /// Drive timers: expire toasts, refresh when the interval is up.
    pub async fn tick(&mut self) {
        self.ctx.expire_toasts();
        if self.timer.fire_if_due(self.ctx.clock.now()) {
            info!("auto-refreshing dashboard data");
            self.refresh().await;
        }
    }

    pub fn teardown(&mut self) {
        self.timer.cancel();
    }

    pub fn context(&self) -> &PageContext<T, R> {
        &self.ctx
    }

    pub fn target(&self) -> &R {
        &self.ctx.target
    }

    pub fn submissions(&self) -> &[Record] {
        self.submissions.records()
    }

    pub fn statistics_state(&self) -> &LoadState {
        self.statistics.state()
    }

    pub fn stage_filter(&self) -> Option<u32> {
        self.stage_filter
    }

    pub fn is_polling(&self) -> bool {
        self.timer.is_running()
    }
}
