//! Course resource manager: CRUD plus drag-and-drop ordering.

use lazy_static::lazy_static;
use log::{debug, error, info};
use regex::Regex;
use serde_json::{Value, json};

use crate::api::{HttpMethod, Transport};
use crate::bindings::{Bindings, UiEvent};
use crate::controller::{PageContext, Snapshot};
use crate::error::{PortalError, Result};
use crate::modal::{CloseReason, Modal};
use crate::record::Record;
use crate::render::{self, resource_count_label};
use crate::target::RenderTarget;
use crate::toast::ToastKind;

pub const RESOURCES_PATH: &str = "/api/admin/resources";
pub const REORDER_PATH: &str = "/api/admin/resources/reorder";

pub const LIST_REGION: &str = "resourcesList";
pub const COUNT_REGION: &str = "resourceCount";
pub const RESOURCE_MODAL: &str = "resourceModal";
pub const DELETE_MODAL: &str = "deleteModal";
const MODAL_TITLE: &str = "modalTitle";
const DELETE_TITLE: &str = "deleteResourceTitle";
const RESOURCE_FORM: &str = "resourceForm";
const TITLE_FIELD: &str = "resourceTitle";
const SAVE_BUTTON: &str = "saveBtn";
const CONFIRM_DELETE: &str = "confirmDeleteBtn";
const CANCEL_DELETE: &str = "cancelDeleteBtn";

lazy_static! {
    static ref BARE_VIDEO_ID: Regex = Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap();
    static ref VIDEO_URL: Regex = Regex::new(
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([a-zA-Z0-9_-]{11})"
    )
    .unwrap();
}

/// Video id from a bare id or any of the usual YouTube URL shapes.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if BARE_VIDEO_ID.is_match(url) {
        return Some(url.to_string());
    }
    VIDEO_URL
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The add/edit form's values
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceForm {
    pub resource_type: String,
    pub title: String,
    pub description: String,
    pub youtube_url: String,
    pub external_url: String,
    pub is_active: bool,
}

impl Default for ResourceForm {
    fn default() -> Self {
        ResourceForm {
            resource_type: "youtube".to_string(),
            title: String::new(),
            description: String::new(),
            youtube_url: String::new(),
            external_url: String::new(),
            is_active: true,
        }
    }
}

impl ResourceForm {
    /// Form state for editing an existing resource.
    pub fn from_record(resource: &Record) -> Self {
        let resource_type = resource.text_or("resource_type", "youtube");
        let youtube_url = match resource.str("youtube_video_id") {
            Some(id) if resource_type == "youtube" => {
                format!("https://www.youtube.com/watch?v={}", id)
            }
            _ => String::new(),
        };
        ResourceForm {
            title: resource.text_or("title", ""),
            description: resource.text_or("description", ""),
            external_url: resource.text_or("external_url", ""),
            is_active: resource.bool("is_active").unwrap_or(true),
            youtube_url,
            resource_type,
        }
    }

    fn from_event(event: &UiEvent) -> Self {
        ResourceForm {
            resource_type: event.get("resource_type").unwrap_or("youtube").to_string(),
            title: event.get("title").unwrap_or("").to_string(),
            description: event.get("description").unwrap_or("").to_string(),
            youtube_url: event.get("youtube_url").unwrap_or("").to_string(),
            external_url: event.get("external_url").unwrap_or("").to_string(),
            is_active: event.get("is_active") != Some("false"),
        }
    }

    /// Request body for a create or update, or why there is none.
    pub fn payload(&self, course_id: &str) -> Result<Value> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(PortalError::Validation("Title is required".to_string()));
        }

        let mut body = json!({
            "course_id": course_id,
            "title": title,
            "description": self.description.trim(),
            "resource_type": self.resource_type,
            "is_active": self.is_active,
        });

        if self.resource_type == "youtube" {
            let video_id = extract_video_id(&self.youtube_url).ok_or_else(|| {
                PortalError::Validation("Please enter a valid YouTube URL".to_string())
            })?;
            body["youtube_video_id"] = Value::String(video_id);
        } else {
            let url = self.external_url.trim();
            if url.is_empty() {
                return Err(PortalError::Validation("Please enter a URL".to_string()));
            }
            body["external_url"] = Value::String(url.to_string());
        }
        Ok(body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAction {
    SelectCourse(String),
    OpenAdd { invoker: Option<String> },
    OpenEdit { id: String, invoker: Option<String> },
    CloseModal(CloseReason),
    Submit(ResourceForm),
    RequestDelete {
        id: String,
        title: String,
        invoker: Option<String>,
    },
    ConfirmDelete,
    CloseDelete(CloseReason),
    Drop { dragged: String, target: String },
    Key(String),
    DismissToast(String),
}

/// Reconciliation controller for one course's resources
pub struct ResourcesController<T, R> {
    ctx: PageContext<T, R>,
    course_id: Option<String>,
    resources: Snapshot,
    form: ResourceForm,
    editing: Option<String>,
    resource_modal: Modal,
    delete_modal: Modal,
    deleting: Option<String>,
}

impl<T: Transport, R: RenderTarget> ResourcesController<T, R> {
    pub fn new(ctx: PageContext<T, R>) -> Self {
        ResourcesController {
            ctx,
            course_id: None,
            resources: Snapshot::new(),
            form: ResourceForm::default(),
            editing: None,
            resource_modal: Modal::new(RESOURCE_MODAL),
            delete_modal: Modal::new(DELETE_MODAL),
            deleting: None,
        }
    }

    pub fn bindings() -> Bindings<ResourceAction> {
        Bindings::new()
            .bind("select-course", |e| {
                Some(ResourceAction::SelectCourse(e.value().to_string()))
            })
            .bind("add-resource", |e| {
                Some(ResourceAction::OpenAdd {
                    invoker: e.get("invoker").map(str::to_string),
                })
            })
            .bind("edit-resource", |e| {
                Some(ResourceAction::OpenEdit {
                    id: e.get("id")?.to_string(),
                    invoker: e.get("invoker").map(str::to_string),
                })
            })
            .bind("close-modal", |_| {
                Some(ResourceAction::CloseModal(CloseReason::CloseButton))
            })
            .bind("cancel-modal", |_| {
                Some(ResourceAction::CloseModal(CloseReason::CloseButton))
            })
            .bind("modal-overlay", |_| Some(ResourceAction::CloseModal(CloseReason::Overlay)))
            .bind("submit-resource", |e| {
                Some(ResourceAction::Submit(ResourceForm::from_event(e)))
            })
            .bind("delete-resource", |e| {
                Some(ResourceAction::RequestDelete {
                    id: e.get("id")?.to_string(),
                    title: e.get("title").unwrap_or("").to_string(),
                    invoker: e.get("invoker").map(str::to_string),
                })
            })
            .bind("confirm-delete", |_| Some(ResourceAction::ConfirmDelete))
            .bind("cancel-delete", |_| {
                Some(ResourceAction::CloseDelete(CloseReason::CloseButton))
            })
            .bind("delete-modal-overlay", |_| {
                Some(ResourceAction::CloseDelete(CloseReason::Overlay))
            })
            .bind("drop", |e| {
                Some(ResourceAction::Drop {
                    dragged: e.get("dragged-id")?.to_string(),
                    target: e.get("target-id")?.to_string(),
                })
            })
            .bind("keydown", |e| e.get("key").map(|k| ResourceAction::Key(k.to_string())))
            .bind("dismiss-toast", |e| {
                e.get("toast-id")
                    .map(|id| ResourceAction::DismissToast(id.to_string()))
            })
    }

    pub async fn handle(&mut self, event: &UiEvent) {
        match Self::bindings().resolve(event) {
            Some(action) => self.apply(action).await,
            None => debug!("resources ignores {}", event.name),
        }
    }

    pub async fn apply(&mut self, action: ResourceAction) {
        match action {
            ResourceAction::SelectCourse(course) => self.select_course(&course).await,
            ResourceAction::OpenAdd { invoker } => self.open_add(invoker.as_deref()),
            ResourceAction::OpenEdit { id, invoker } => self.open_edit(&id, invoker.as_deref()),
            ResourceAction::CloseModal(reason) => self.close_modal(reason),
            ResourceAction::Submit(form) => self.submit(form).await,
            ResourceAction::RequestDelete { id, title, invoker } => {
                self.request_delete(&id, &title, invoker.as_deref())
            }
            ResourceAction::ConfirmDelete => self.confirm_delete().await,
            ResourceAction::CloseDelete(reason) => self.close_delete(reason),
            ResourceAction::Drop { dragged, target } => self.reorder(&dragged, &target).await,
            ResourceAction::Key(key) => self.handle_key(&key),
            ResourceAction::DismissToast(id) => self.ctx.dismiss_toast(&id),
        }
    }

    /// Switch course: the old snapshot is discarded before the new fetch.
    pub async fn select_course(&mut self, course_id: &str) {
        let course_id = course_id.trim();
        if course_id.is_empty() {
            return;
        }
        self.course_id = Some(course_id.to_string());
        self.resources.clear();
        self.load().await;
    }

    pub async fn load(&mut self) {
        let Some(course_id) = self.course_id.clone() else {
            return;
        };
        if self.resources.begin() {
            let loading = self.ctx.renderer.loading("Loading resources...");
            self.ctx.paint(LIST_REGION, loading);
        }

        let params = [("course_id", course_id.clone())];
        match self.ctx.api.fetch_collection(RESOURCES_PATH, &params).await {
            Ok(resources) => {
                debug!("course {}: {} resources", course_id, resources.len());
                self.resources.replace(resources);
                self.paint();
            }
            Err(e) => {
                let first = !self.resources.has_data();
                self.resources.fail(e.to_string());
                if first {
                    let html = self.ctx.renderer.empty_state(
                        "&#9888;",
                        "Error loading resources",
                        &e.to_string(),
                    );
                    self.ctx.paint(LIST_REGION, html);
                }
                error!("loading resources for course {}: {}", course_id, e);
                self.ctx
                    .notify(ToastKind::Error, format!("Failed to load resources: {}", e));
            }
        }
    }

    fn paint(&mut self) {
        let html = self.ctx.renderer.resources(self.resources.records());
        self.ctx.paint(LIST_REGION, html);
        let label = resource_count_label(self.resources.records().len());
        self.ctx.target.replace(COUNT_REGION, &label);
    }

    pub fn open_add(&mut self, invoker: Option<&str>) {
        self.editing = None;
        self.form = ResourceForm::default();
        self.ctx.target.reset(RESOURCE_FORM);
        self.ctx.target.replace(MODAL_TITLE, "Add Resource");
        self.resource_modal
            .open(&mut self.ctx.target, invoker, &[TITLE_FIELD, SAVE_BUTTON]);
    }

    pub fn open_edit(&mut self, id: &str, invoker: Option<&str>) {
        let Some(resource) = self.resources.find(id) else {
            debug!("edit of unknown resource {}", id);
            return;
        };
        self.form = ResourceForm::from_record(resource);
        self.editing = Some(id.to_string());
        self.ctx.target.replace(MODAL_TITLE, "Edit Resource");
        self.resource_modal
            .open(&mut self.ctx.target, invoker, &[TITLE_FIELD, SAVE_BUTTON]);
    }

    pub fn close_modal(&mut self, reason: CloseReason) {
        if self.resource_modal.close(&mut self.ctx.target, reason) {
            self.editing = None;
        }
    }

    /// Validate, then create or update; success reloads the list.
    pub async fn submit(&mut self, form: ResourceForm) {
        let Some(course_id) = self.course_id.clone() else {
            return;
        };
        self.form = form;
        let body = match self.form.payload(&course_id) {
            Ok(body) => body,
            Err(e) => {
                self.ctx.notify(ToastKind::Error, e.to_string());
                self.ctx.target.focus(TITLE_FIELD);
                return;
            }
        };
        if !self.ctx.begin_mutation(SAVE_BUTTON) {
            return;
        }

        let outcome = match &self.editing {
            Some(id) => {
                let path = format!("{}/{}", RESOURCES_PATH, urlencoding::encode(id));
                self.ctx.api.mutate(HttpMethod::Put, &path, Some(body)).await
            }
            None => {
                self.ctx
                    .api
                    .mutate(HttpMethod::Post, RESOURCES_PATH, Some(body))
                    .await
            }
        };
        self.ctx.end_mutation(SAVE_BUTTON);

        match outcome {
            Ok(_) => {
                let message = if self.editing.is_some() {
                    "Resource updated"
                } else {
                    "Resource added"
                };
                info!("{} in course {}", message, course_id);
                self.ctx.notify(ToastKind::Success, message);
                self.close_modal(CloseReason::Completed);
                self.load().await;
            }
            Err(e) => self.ctx.report("saving resource", &e),
        }
    }

    pub fn request_delete(&mut self, id: &str, title: &str, invoker: Option<&str>) {
        self.deleting = Some(id.to_string());
        self.ctx.target.replace(DELETE_TITLE, &render::text(title));
        self.delete_modal
            .open(&mut self.ctx.target, invoker, &[CONFIRM_DELETE, CANCEL_DELETE]);
    }

    pub fn close_delete(&mut self, reason: CloseReason) {
        if self.delete_modal.close(&mut self.ctx.target, reason) {
            self.deleting = None;
        }
    }

    pub async fn confirm_delete(&mut self) {
        let Some(id) = self.deleting.clone() else {
            return;
        };
        if !self.ctx.begin_mutation(CONFIRM_DELETE) {
            return;
        }
        let path = format!("{}/{}", RESOURCES_PATH, urlencoding::encode(&id));
        let outcome = self.ctx.api.mutate(HttpMethod::Delete, &path, None).await;
        self.ctx.end_mutation(CONFIRM_DELETE);

        match outcome {
            Ok(_) => {
                info!("deleted resource {}", id);
                self.ctx.notify(ToastKind::Success, "Resource deleted");
                self.close_delete(CloseReason::Completed);
                self.load().await;
            }
            Err(e) => self.ctx.report("deleting resource", &e),
        }
    }

    /// Drop `dragged` onto `target`
    ///
    /// The move is shown at once; the new order is then saved in one request.
    /// If saving fails the local order is thrown away and the list re-fetched.
    pub async fn reorder(&mut self, dragged: &str, target: &str) {
        let Some(course_id) = self.course_id.clone() else {
            return;
        };
        let confirmed = self.resources.records().to_vec();
        let records = self.resources.records_mut();
        let position = |id: &str| records.iter().position(|r| r.id().as_deref() == Some(id));
        let (Some(from), Some(to)) = (position(dragged), position(target)) else {
            return;
        };
        if from == to {
            return;
        }

        // After the target when moving down, before it when moving up.
        let moved = records.remove(from);
        records.insert(to, moved);
        let ordered_ids: Vec<Value> = records
            .iter()
            .filter_map(|r| r.get("id").cloned())
            .collect();
        self.paint();

        let body = json!({ "course_id": course_id, "ordered_ids": ordered_ids });
        match self.ctx.api.mutate(HttpMethod::Put, REORDER_PATH, Some(body)).await {
            Ok(_) => self.ctx.notify(ToastKind::Success, "Order saved"),
            Err(e) => {
                error!("saving order for course {}: {}; reloading", course_id, e);
                self.ctx.notify(ToastKind::Error, "Failed to save order");
                // drop the unsaved order even if the reload fails too
                self.resources.replace(confirmed);
                self.paint();
                self.load().await;
            }
        }
    }

    /// Escape closes the resource modal first, then the delete modal.
    pub fn handle_key(&mut self, key: &str) {
        if key != "Escape" {
            return;
        }
        if self.resource_modal.is_open() {
            self.close_modal(CloseReason::Escape);
        } else if self.delete_modal.is_open() {
            self.close_delete(CloseReason::Escape);
        }
    }

    pub fn tick(&mut self) {
        self.ctx.expire_toasts();
    }

    pub fn context(&self) -> &PageContext<T, R> {
        &self.ctx
    }

    pub fn target(&self) -> &R {
        &self.ctx.target
    }

    pub fn resources(&self) -> &[Record] {
        self.resources.records()
    }

    pub fn form(&self) -> &ResourceForm {
        &self.form
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::target::MemoryTarget;
    use crate::testing::ScriptedTransport;

    type Manager<'a> = ResourcesController<&'a ScriptedTransport, MemoryTarget>;

    fn three_resources() -> String {
        json!([
            {"id": 1, "title": "Intro", "resource_type": "youtube", "youtube_video_id": "dQw4w9WgXcQ", "is_active": true},
            {"id": 2, "title": "Syllabus", "resource_type": "pdf", "external_url": "https://x/s.pdf", "is_active": true},
            {"id": 3, "title": "Reading", "resource_type": "link", "external_url": "https://x/r", "is_active": false}
        ])
        .to_string()
    }

    fn manager(transport: &ScriptedTransport) -> Manager<'_> {
        let ctx = PageContext::new(
            ApiClient::new(transport),
            MemoryTarget::new(),
            ManualClock::new(),
            &Config::default(),
        )
        .unwrap();
        ResourcesController::new(ctx)
    }

    fn order(page: &Manager<'_>) -> Vec<String> {
        page.resources().iter().filter_map(Record::id).collect()
    }

    fn displayed(page: &Manager<'_>) -> Vec<usize> {
        let html = page.target().html(LIST_REGION);
        let mut found: Vec<(usize, usize)> = (1..=3)
            .filter_map(|id| html.find(&format!("data-id=\"{}\" data-index", id)).map(|at| (at, id)))
            .collect();
        found.sort();
        found.into_iter().map(|(_, id)| id).collect()
    }

    #[test]
    fn video_ids_from_every_url_shape() {
        for url in [
            "dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1s",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert_eq!(extract_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{}", url);
        }
        assert_eq!(extract_video_id("https://vimeo.com/123"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn payload_validation() {
        let mut form = ResourceForm::default();
        assert_eq!(
            form.payload("c1"),
            Err(PortalError::Validation("Title is required".into()))
        );
        form.title = "Intro".into();
        form.youtube_url = "not a video".into();
        assert_eq!(
            form.payload("c1"),
            Err(PortalError::Validation("Please enter a valid YouTube URL".into()))
        );
        form.youtube_url = "https://youtu.be/dQw4w9WgXcQ".into();
        let body = form.payload("c1").unwrap();
        assert_eq!(body["youtube_video_id"], "dQw4w9WgXcQ");
        assert_eq!(body["course_id"], "c1");

        form.resource_type = "pdf".into();
        assert!(form.payload("c1").unwrap_err().is_validation());
        form.external_url = "https://x/s.pdf".into();
        assert_eq!(form.payload("c1").unwrap()["external_url"], "https://x/s.pdf");
    }

    #[tokio::test]
    async fn course_switch_shows_count_and_cards() {
        let transport = ScriptedTransport::routed();
        transport.on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources());
        let mut page = manager(&transport);

        page.handle(&UiEvent::new("select-course").with("value", "cmsc178")).await;
        assert_eq!(page.target().html(COUNT_REGION), "3 resources");
        assert_eq!(displayed(&page), vec![1, 2, 3]);
        assert_eq!(
            transport.requests()[0].path_and_query(),
            "/api/admin/resources?course_id=cmsc178"
        );
    }

    #[tokio::test]
    async fn failed_save_rolls_back_by_reload() {
        let transport = ScriptedTransport::routed();
        transport
            .on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources())
            .on(HttpMethod::Put, REORDER_PATH, 500, r#"{"error": "db down"}"#);
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;

        let drop = UiEvent::new("drop")
            .with("dragged-id", "3")
            .with("target-id", "1");
        page.handle(&drop).await;

        let put = transport
            .requests()
            .into_iter()
            .find(|r| r.path == REORDER_PATH)
            .unwrap();
        assert_eq!(put.body.unwrap()["ordered_ids"], json!([3, 1, 2]));

        assert_eq!(transport.count(HttpMethod::Get, RESOURCES_PATH), 2);
        assert_eq!(order(&page), vec!["1", "2", "3"]);
        assert_eq!(displayed(&page), vec![1, 2, 3]);
        assert_eq!(
            page.context().toasts.last().unwrap().message,
            "Failed to save order"
        );
    }

    #[tokio::test]
    async fn failed_save_and_failed_reload_restore_the_saved_order() {
        let transport = ScriptedTransport::routed();
        transport
            .on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources())
            .on(HttpMethod::Get, RESOURCES_PATH, 500, r#"{"error": "db down"}"#)
            .on(HttpMethod::Put, REORDER_PATH, 500, r#"{"error": "db down"}"#);
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;

        page.reorder("3", "1").await;

        assert_eq!(transport.count(HttpMethod::Get, RESOURCES_PATH), 2);
        assert_eq!(order(&page), vec!["1", "2", "3"]);
        assert_eq!(displayed(&page), vec![1, 2, 3]);
        let messages: Vec<&str> = page
            .context()
            .toasts
            .visible()
            .map(|t| t.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec!["Failed to save order", "Failed to load resources: db down"]
        );
    }

    #[tokio::test]
    async fn successful_drop_keeps_the_new_order() {
        let transport = ScriptedTransport::routed();
        transport
            .on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources())
            .on(HttpMethod::Put, REORDER_PATH, 200, r#"{"success": true}"#);
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;

        page.reorder("1", "3").await;
        assert_eq!(order(&page), vec!["2", "3", "1"]);
        assert_eq!(displayed(&page), vec![2, 3, 1]);
        assert_eq!(page.context().toasts.last().unwrap().message, "Order saved");
        assert_eq!(transport.count(HttpMethod::Get, RESOURCES_PATH), 1);

        page.reorder("2", "2").await;
        assert_eq!(transport.count(HttpMethod::Put, REORDER_PATH), 1);
    }

    #[tokio::test]
    async fn edit_prefills_and_puts() {
        let transport = ScriptedTransport::routed();
        transport
            .on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources())
            .on(HttpMethod::Put, "/api/admin/resources/1", 200, r#"{"id": 1}"#);
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;

        page.handle(&UiEvent::new("edit-resource").with("id", "1").with("invoker", "edit-1"))
            .await;
        assert_eq!(page.editing(), Some("1"));
        assert_eq!(page.form().youtube_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(page.target().html(MODAL_TITLE), "Edit Resource");
        assert_eq!(page.target().focused(), Some(TITLE_FIELD));

        let mut form = page.form().clone();
        form.title = "Intro (updated)".into();
        page.submit(form).await;

        assert_eq!(transport.count(HttpMethod::Put, "/api/admin/resources/1"), 1);
        assert_eq!(page.context().toasts.last().unwrap().message, "Resource updated");
        assert!(!page.target().is_visible(RESOURCE_MODAL));
        assert_eq!(page.target().focused(), Some("edit-1"));
        assert_eq!(transport.count(HttpMethod::Get, RESOURCES_PATH), 2);
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let transport = ScriptedTransport::routed();
        transport.on(HttpMethod::Get, RESOURCES_PATH, 200, "[]");
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;
        assert!(page.target().html(LIST_REGION).contains("No resources yet"));
        assert_eq!(page.target().html(COUNT_REGION), "");

        page.open_add(Some("addResourceBtn"));
        page.handle(&UiEvent::new("submit-resource").with("title", "Intro").with("youtube_url", "nope"))
            .await;

        assert_eq!(transport.count(HttpMethod::Post, RESOURCES_PATH), 0);
        assert_eq!(
            page.context().toasts.last().unwrap().message,
            "Please enter a valid YouTube URL"
        );
        assert!(page.target().is_visible(RESOURCE_MODAL));
    }

    #[tokio::test]
    async fn delete_after_confirmation() {
        let transport = ScriptedTransport::routed();
        transport
            .on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources())
            .on(HttpMethod::Delete, "/api/admin/resources/2", 204, "");
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;

        page.request_delete("2", "<Syllabus>", Some("delete-2"));
        assert_eq!(page.target().html(DELETE_TITLE), "&lt;Syllabus&gt;");
        page.handle_key("Escape");
        assert!(!page.target().is_visible(DELETE_MODAL));
        page.confirm_delete().await;
        assert_eq!(transport.count(HttpMethod::Delete, "/api/admin/resources/2"), 0);

        page.request_delete("2", "Syllabus", Some("delete-2"));
        page.handle(&UiEvent::new("confirm-delete")).await;
        assert_eq!(transport.count(HttpMethod::Delete, "/api/admin/resources/2"), 1);
        assert_eq!(page.context().toasts.last().unwrap().message, "Resource deleted");
        assert!(!page.target().is_busy(CONFIRM_DELETE));
    }

    #[tokio::test]
    async fn failed_reload_keeps_cards_on_screen() {
        let transport = ScriptedTransport::routed();
        transport
            .on(HttpMethod::Get, RESOURCES_PATH, 200, three_resources())
            .on(HttpMethod::Get, RESOURCES_PATH, 500, r#"{"error": "db down"}"#);
        let mut page = manager(&transport);
        page.select_course("cmsc178").await;
        let before = page.target().html(LIST_REGION).to_string();

        page.load().await;
        assert_eq!(page.target().html(LIST_REGION), before);
        assert!(page.context().toasts.last().unwrap().message.contains("db down"));
    }
}
