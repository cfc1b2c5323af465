//! Group portal: browse groups, build a team from the roster, create it.

use log::{debug, error, info};
use serde::Serialize;
use serde_json::json;

use crate::api::{HttpMethod, Transport};
use crate::bindings::{Bindings, UiEvent};
use crate::controller::{PageContext, Snapshot};
use crate::error::{PortalError, Result};
use crate::listing::{ViewMode, ViewState};
use crate::modal::{CloseReason, Modal};
use crate::record::Record;
use crate::render::{self, class_alert_text, student_name};
use crate::target::RenderTarget;
use crate::toast::ToastKind;

pub const GROUPS_PATH: &str = "/api/groups";
pub const UNGROUPED_PATH: &str = "/api/students/ungrouped/all";

pub const GROUPS_REGION: &str = "groupsList";
pub const STUDENTS_REGION: &str = "studentsList";
pub const MEMBERS_REGION: &str = "selectedMembers";
pub const CLASS_ALERT: &str = "classAlert";
pub const CLASS_ALERT_TEXT: &str = "classAlertText";
pub const CREATE_SECTION: &str = "createGroupSection";
pub const DETAILS_MODAL: &str = "groupDetailsModal";
pub const DETAILS_TITLE: &str = "modalGroupName";
pub const DETAILS_BODY: &str = "modalContent";
const CREATE_FORM: &str = "createGroupForm";
const CREATE_BUTTON: &str = "createGroupBtn";
const DETAILS_CLOSE: &str = "modalClose";
const NAME_FIELD: &str = "groupName";
const USERNAME_FIELD: &str = "groupUsername";
const PASSWORD_FIELD: &str = "groupPassword";

pub const MIN_PASSWORD_LEN: usize = 6;

/// A student picked for the group being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedMember {
    pub student_id: String,
    pub name: String,
    pub campus_id: Option<String>,
}

/// The create-group form's values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupForm {
    pub group_name: String,
    pub project_title: String,
    pub username: String,
    pub password: String,
}

impl GroupForm {
    fn from_event(event: &UiEvent) -> Self {
        GroupForm {
            group_name: event.get("group_name").unwrap_or("").to_string(),
            project_title: event.get("project_title").unwrap_or("").to_string(),
            username: event.get("username").unwrap_or("").to_string(),
            password: event.get("password").unwrap_or("").to_string(),
        }
    }

    /// Preconditions in the order the form reports them: name, username,
    /// password length. Returns the field to focus with the error.
    pub fn validate(&self) -> std::result::Result<(), (&'static str, PortalError)> {
        if self.group_name.trim().is_empty() {
            return Err((NAME_FIELD, PortalError::Validation("Group Name is required".into())));
        }
        if self.username.trim().is_empty() {
            return Err((USERNAME_FIELD, PortalError::Validation("Username is required".into())));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err((
                PASSWORD_FIELD,
                PortalError::Validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LEN
                )),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortalAction {
    SetView(ViewMode),
    SearchGroups(String),
    SortGroups(String),
    ToggleCreateForm,
    SearchStudents(String),
    AddMember(String),
    RemoveMember(String),
    CloseDropdown,
    Submit(GroupForm),
    ViewDetails { id: String, invoker: Option<String> },
    CloseDetails(CloseReason),
    Key(String),
    DismissToast(String),
}

/// Reconciliation controller for the group portal
pub struct GroupPortalController<T, R> {
    ctx: PageContext<T, R>,
    groups: Snapshot,
    roster: Snapshot,
    view: ViewState,
    selected: Vec<SelectedMember>,
    student_term: String,
    dropdown_open: bool,
    form_visible: bool,
    details_modal: Modal,
}

impl<T: Transport, R: RenderTarget> GroupPortalController<T, R> {
    pub fn new(ctx: PageContext<T, R>) -> Self {
        GroupPortalController {
            ctx,
            groups: Snapshot::new(),
            roster: Snapshot::new(),
            view: ViewState::new(),
            selected: Vec::new(),
            student_term: String::new(),
            dropdown_open: false,
            form_visible: false,
            details_modal: Modal::new(DETAILS_MODAL),
        }
    }

    pub fn bindings() -> Bindings<PortalAction> {
        Bindings::new()
            .bind("view-cards", |_| Some(PortalAction::SetView(ViewMode::Cards)))
            .bind("view-table", |_| Some(PortalAction::SetView(ViewMode::Table)))
            .bind("group-search", |e| {
                Some(PortalAction::SearchGroups(e.value().to_string()))
            })
            .bind("sort-groups", |e| {
                e.get("column").map(|c| PortalAction::SortGroups(c.to_string()))
            })
            .bind("toggle-create-form", |_| Some(PortalAction::ToggleCreateForm))
            .bind("student-search", |e| {
                Some(PortalAction::SearchStudents(e.value().to_string()))
            })
            .bind("select-student", |e| {
                e.get("student-id")
                    .map(|id| PortalAction::AddMember(id.to_string()))
            })
            .bind("remove-member", |e| {
                e.get("student-id")
                    .map(|id| PortalAction::RemoveMember(id.to_string()))
            })
            .bind("outside-click", |_| Some(PortalAction::CloseDropdown))
            .bind("create-group", |e| Some(PortalAction::Submit(GroupForm::from_event(e))))
            .bind("view-details", |e| {
                Some(PortalAction::ViewDetails {
                    id: e.get("group-id")?.to_string(),
                    invoker: e.get("invoker").map(str::to_string),
                })
            })
            .bind("close-details", |_| {
                Some(PortalAction::CloseDetails(CloseReason::CloseButton))
            })
            .bind("details-overlay", |_| {
                Some(PortalAction::CloseDetails(CloseReason::Overlay))
            })
            .bind("keydown", |e| e.get("key").map(|k| PortalAction::Key(k.to_string())))
            .bind("dismiss-toast", |e| {
                e.get("toast-id")
                    .map(|id| PortalAction::DismissToast(id.to_string()))
            })
    }

    pub async fn handle(&mut self, event: &UiEvent) {
        match Self::bindings().resolve(event) {
            Some(action) => self.apply(action).await,
            None => debug!("group portal ignores {}", event.name),
        }
    }

    pub async fn apply(&mut self, action: PortalAction) {
        match action {
            PortalAction::SetView(mode) => self.set_view(mode),
            PortalAction::SearchGroups(term) => self.search_groups(&term),
            PortalAction::SortGroups(column) => self.sort_groups(&column),
            PortalAction::ToggleCreateForm => self.toggle_create_form(),
            PortalAction::SearchStudents(term) => self.search_students(&term),
            PortalAction::AddMember(id) => self.add_member(&id),
            PortalAction::RemoveMember(id) => self.remove_member(&id),
            PortalAction::CloseDropdown => self.close_dropdown(),
            PortalAction::Submit(form) => self.create_group(form).await,
            PortalAction::ViewDetails { id, invoker } => {
                self.show_details(&id, invoker.as_deref()).await
            }
            PortalAction::CloseDetails(reason) => {
                self.details_modal.close(&mut self.ctx.target, reason);
            }
            PortalAction::Key(key) => self.handle_key(&key),
            PortalAction::DismissToast(id) => self.ctx.dismiss_toast(&id),
        }
    }

    pub async fn init(&mut self) {
        info!("initializing group portal");
        self.load_groups().await;
        self.load_students().await;
        let members = self.ctx.renderer.selected_members(&self.selected);
        self.ctx.paint(MEMBERS_REGION, members);
    }

    pub async fn load_groups(&mut self) {
        if self.groups.begin() {
            let loading = self.ctx.renderer.loading("Loading groups...");
            self.ctx.paint(GROUPS_REGION, loading);
        }
        match self.ctx.api.fetch_collection(GROUPS_PATH, &[]).await {
            Ok(groups) => {
                debug!("{} groups", groups.len());
                self.groups.replace(groups);
                self.paint_groups();
            }
            Err(e) => {
                let first = !self.groups.has_data();
                self.groups.fail(e.to_string());
                if first {
                    let html = self
                        .ctx
                        .renderer
                        .error_state("Failed to load groups", &e.to_string());
                    self.ctx.paint(GROUPS_REGION, html);
                }
                error!("loading groups: {}", e);
                self.ctx
                    .notify(ToastKind::Error, format!("Failed to load groups: {}", e));
            }
        }
    }

    pub async fn load_students(&mut self) {
        self.roster.begin();
        match self.ctx.api.fetch_collection(UNGROUPED_PATH, &[]).await {
            Ok(students) => {
                let text = class_alert_text(students.len());
                self.roster.replace(students);
                self.ctx.target.replace(CLASS_ALERT_TEXT, &text);
                self.ctx.target.set_visible(CLASS_ALERT, true);
            }
            Err(e) => {
                self.roster.fail(e.to_string());
                error!("loading ungrouped students: {}", e);
                self.ctx.notify(ToastKind::Error, "Failed to load students");
            }
        }
    }

    fn paint_groups(&mut self) {
        let html = self.ctx.renderer.groups(self.groups.records(), &self.view);
        self.ctx.paint(GROUPS_REGION, html);
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        if self.view.view_mode == mode {
            return;
        }
        self.view.view_mode = mode;
        self.paint_groups();
    }

    pub fn search_groups(&mut self, term: &str) {
        self.view.set_filter(term);
        self.paint_groups();
    }

    pub fn sort_groups(&mut self, column: &str) {
        self.view.sort_by(column);
        self.paint_groups();
    }

    pub fn toggle_create_form(&mut self) {
        self.form_visible = !self.form_visible;
        self.ctx.target.set_visible(CREATE_SECTION, self.form_visible);
        if self.form_visible {
            self.ctx.target.focus(NAME_FIELD);
        }
    }

    /// Filter the in-memory roster; no request per keystroke.
    pub fn search_students(&mut self, term: &str) {
        self.student_term = term.to_string();
        let html = self
            .ctx
            .renderer
            .student_dropdown(self.roster.records(), term, &self.selected);
        self.ctx.paint(STUDENTS_REGION, html);
        self.dropdown_open = true;
        self.ctx.target.set_visible(STUDENTS_REGION, true);
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
        self.ctx.target.set_visible(STUDENTS_REGION, false);
    }

    pub fn add_member(&mut self, student_id: &str) {
        let Some(student) = self.roster.find(student_id) else {
            debug!("unknown student {}", student_id);
            return;
        };
        let name = student_name(student);
        if self.selected.iter().any(|m| m.student_id == student_id) {
            self.ctx
                .notify(ToastKind::Warning, format!("{} is already in the group", name));
            return;
        }

        self.selected.push(SelectedMember {
            student_id: student_id.to_string(),
            campus_id: student.str("campus_id").map(str::to_string),
            name: name.clone(),
        });
        self.paint_members();
        self.student_term.clear();
        self.close_dropdown();
        self.ctx
            .notify(ToastKind::Success, format!("{} added to group", name));
    }

    pub fn remove_member(&mut self, student_id: &str) {
        let Some(index) = self.selected.iter().position(|m| m.student_id == student_id) else {
            return;
        };
        let member = self.selected.remove(index);
        self.paint_members();
        self.ctx
            .notify(ToastKind::Info, format!("{} removed", member.name));
    }

    fn paint_members(&mut self) {
        let html = self.ctx.renderer.selected_members(&self.selected);
        self.ctx.paint(MEMBERS_REGION, html);
    }

    /// Validate locally, then create the group with its members in one request.
    pub async fn create_group(&mut self, form: GroupForm) {
        if let Err((field, e)) = form.validate() {
            debug!("create group rejected: {}", e);
            self.ctx.notify(ToastKind::Error, e.to_string());
            self.ctx.target.focus(field);
            return;
        }
        if !self.ctx.begin_mutation(CREATE_BUTTON) {
            return;
        }

        let body = json!({
            "group_name": form.group_name.trim(),
            "project_title": form.project_title.trim(),
            "username": form.username.trim(),
            "password": form.password,
            "members": self.selected.iter().map(|m| m.student_id.as_str()).collect::<Vec<_>>(),
        });
        let outcome: Result<_> = self.ctx.api.mutate(HttpMethod::Post, GROUPS_PATH, Some(body)).await;
        self.ctx.end_mutation(CREATE_BUTTON);

        match outcome {
            Ok(_) => {
                info!("created group {}", form.group_name.trim());
                self.ctx
                    .notify(ToastKind::Success, "Group created successfully!");
                self.ctx.target.reset(CREATE_FORM);
                self.selected.clear();
                self.student_term.clear();
                self.paint_members();
                self.load_groups().await;
                self.load_students().await;
                self.form_visible = false;
                self.ctx.target.set_visible(CREATE_SECTION, false);
            }
            Err(e) => {
                error!("creating group: {}", e);
                self.ctx.notify_titled(ToastKind::Error, "Error", e.to_string());
            }
        }
    }

    /// Open the details modal and fill it from `/api/groups/:id`.
    pub async fn show_details(&mut self, id: &str, invoker: Option<&str>) {
        self.details_modal
            .open(&mut self.ctx.target, invoker, &[DETAILS_CLOSE]);
        let loading = self.ctx.renderer.loading("Loading group details...");
        self.ctx.paint(DETAILS_BODY, loading);

        let path = format!("{}/{}", GROUPS_PATH, urlencoding::encode(id));
        match self.ctx.api.fetch_record(&path, &[]).await {
            Ok(group) => {
                let title = render::text(&group.text_or("group_name", ""));
                self.ctx.target.replace(DETAILS_TITLE, &title);
                let body = self.ctx.renderer.group_detail(&group);
                self.ctx.paint(DETAILS_BODY, body);
            }
            Err(e) => {
                let html = self
                    .ctx
                    .renderer
                    .error_state("Failed to load group details", &e.to_string());
                self.ctx.paint(DETAILS_BODY, html);
                self.ctx.report("loading group details", &e);
            }
        }
    }

    /// Escape closes the details modal, else the student dropdown.
    pub fn handle_key(&mut self, key: &str) {
        if key != "Escape" {
            return;
        }
        if self.details_modal.is_open() {
            self.details_modal.close(&mut self.ctx.target, CloseReason::Escape);
        } else if self.dropdown_open {
            self.close_dropdown();
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

    pub fn groups(&self) -> &[Record] {
        self.groups.records()
    }

    pub fn selected(&self) -> &[SelectedMember] {
        &self.selected
    }

    pub fn is_form_visible(&self) -> bool {
        self.form_visible
    }
}
