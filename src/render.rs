//! List renderer
//!
//! Every page region is produced here from a snapshot plus view state. The
//! functions are pure: identical inputs give identical markup. Templates are
//! compiled once into a `Renderer`; handlebars escapes every `{{field}}`, so
//! record text can be passed through untouched. The only `{{{raw}}}` slots
//! carry markup built in this module (icons, the escaped summary body).

use handlebars::Handlebars;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::group_portal::SelectedMember;
use crate::listing::{self, FilterField, ViewMode, ViewState};
use crate::record::{Record, format_date};
use crate::toast::{Toast, ToastKind};

/// Group search: name, project title and every member name.
pub const GROUP_FIELDS: &[FilterField] = &[
    FilterField::Text("group_name"),
    FilterField::Text("project_title"),
    FilterField::Nested {
        array: "group_members",
        field: "member_name",
    },
];

/// Student search: full name or campus id.
pub const STUDENT_FIELDS: &[FilterField] = &[
    FilterField::Joined(&["first_name", "last_name"]),
    FilterField::Text("campus_id"),
];

pub const SUBMISSION_FIELDS: &[FilterField] = &[
    FilterField::Text("group_name"),
    FilterField::Text("project_title"),
];

/// Most candidates the student dropdown lists at once.
pub const MAX_STUDENT_CANDIDATES: usize = 20;

const STAGE_COUNT: usize = 6;

const TEMPLATES: &[(&str, &str)] = &[
    ("loading", include_str!("./templates/loading.hbs")),
    ("empty_state", include_str!("./templates/empty_state.hbs")),
    ("error_state", include_str!("./templates/error_state.hbs")),
    ("group_cards", include_str!("./templates/group_cards.hbs")),
    ("group_table", include_str!("./templates/group_table.hbs")),
    ("resource_cards", include_str!("./templates/resource_cards.hbs")),
    ("stat_card", include_str!("./templates/stat_card.hbs")),
    ("stages", include_str!("./templates/stages.hbs")),
    ("submission_rows", include_str!("./templates/submission_rows.hbs")),
    ("group_status_rows", include_str!("./templates/group_status_rows.hbs")),
    ("student_dropdown", include_str!("./templates/student_dropdown.hbs")),
    ("selected_members", include_str!("./templates/selected_members.hbs")),
    ("group_detail", include_str!("./templates/group_detail.hbs")),
    ("toasts", include_str!("./templates/toasts.hbs")),
];

lazy_static! {
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
}

/// Group table columns: (sort key, header). An empty key is not sortable.
const GROUP_COLUMNS: &[(&str, &str)] = &[
    ("group_name", "Group Name"),
    ("project_title", "Project Title"),
    ("created_at", "Created"),
    ("", "Actions"),
];

#[derive(Serialize)]
struct GroupView {
    id: String,
    name: String,
    project: String,
    project_table: String,
    member_count: usize,
    has_members: bool,
    team: String,
    last_names: String,
    created: String,
}

impl GroupView {
    fn from_record(group: &Record) -> Self {
        let members = group.records("group_members");
        let first_names: Vec<String> = members
            .iter()
            .filter_map(|m| m.str("member_name"))
            .filter_map(|name| name.split(' ').next())
            .filter(|first| !first.is_empty())
            .map(str::to_string)
            .collect();
        let team = if first_names.is_empty() {
            "No members".to_string()
        } else {
            first_names.join(", ")
        };

        GroupView {
            id: group.id().unwrap_or_default(),
            name: group.text_or("group_name", ""),
            project: group.text_or("project_title", "N/A"),
            project_table: group.text_or("project_title", "Not specified"),
            member_count: members.len(),
            has_members: !members.is_empty(),
            team,
            last_names: members
                .iter()
                .filter_map(last_name)
                .collect::<Vec<_>>()
                .join(", "),
            created: format_date(group.str("created_at")),
        }
    }
}

/// `last_name` when the backend has it, else the last word of `member_name`.
fn last_name(member: &Record) -> Option<String> {
    if let Some(last) = member.str("last_name") {
        return Some(last.to_string());
    }
    let name = member.str("member_name")?.trim();
    name.split_whitespace()
        .last()
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

#[derive(Serialize)]
struct ColumnView {
    key: &'static str,
    label: &'static str,
    sort_class: &'static str,
}

#[derive(Serialize)]
struct ResourceView {
    id: String,
    title: String,
    description: String,
    kind: String,
    badge: &'static str,
    active: bool,
    video_id: Option<String>,
    placeholder: &'static str,
}

impl ResourceView {
    fn from_record(resource: &Record) -> Self {
        let kind = resource.text_or("resource_type", "");
        let video_id = if kind == "youtube" {
            resource.str("youtube_video_id").map(str::to_string)
        } else {
            None
        };
        ResourceView {
            id: resource.id().unwrap_or_default(),
            title: resource.text_or("title", ""),
            description: resource.text_or("description", "No description"),
            badge: match kind.as_str() {
                "youtube" => "YouTube",
                "link" => "Link",
                "pdf" => "PDF",
                _ => "",
            },
            placeholder: if kind == "pdf" { "&#128196;" } else { "&#128279;" },
            active: resource.bool("is_active").unwrap_or(true),
            video_id,
            kind,
        }
    }
}

#[derive(Serialize)]
struct StageView {
    number: String,
    name: String,
    percent: u32,
    show_label: bool,
    completed: String,
    total: String,
}

#[derive(Serialize)]
struct SubmissionView {
    group_id: String,
    group_name: String,
    project_title: String,
    stage_number: String,
    submitted: String,
}

#[derive(Serialize)]
struct StatusView {
    id: String,
    name: String,
    project: String,
    stages: Vec<bool>,
}

#[derive(Serialize)]
struct StudentView {
    id: String,
    name: String,
    campus_id: String,
    program: String,
    selected: bool,
}

#[derive(Serialize)]
struct MemberView<'a> {
    student_id: &'a str,
    name: &'a str,
    campus_label: &'a str,
}

#[derive(Serialize)]
struct ToastView<'a> {
    id: String,
    kind: ToastKind,
    icon: &'static str,
    title: Option<&'a str>,
    message: &'a str,
    repeats: u32,
    repeated: bool,
}

fn toast_icon(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "&#10003;",
        ToastKind::Error => "&#10007;",
        ToastKind::Warning => "&#9888;",
        ToastKind::Info => "&#8505;",
    }
}

/// One of the three statistics cards on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub region: &'static str,
    pub html: String,
}

/// Whole numbers without a decimal point, anything else as-is.
fn count_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Escape plain text for a text-only region.
pub fn text(raw: &str) -> String {
    handlebars::html_escape(raw)
}

/// Display name of a student record, `Unnamed` when both parts are blank.
pub fn student_name(student: &Record) -> String {
    let full = format!(
        "{} {}",
        student.str("first_name").unwrap_or(""),
        student.str("last_name").unwrap_or("")
    );
    let full = full.trim();
    if full.is_empty() {
        "Unnamed".to_string()
    } else {
        full.to_string()
    }
}

/// Escape, then `**bold**` to `<strong>` and newlines to `<br>`.
pub fn summary_to_html(markdown: &str) -> String {
    let escaped = handlebars::html_escape(markdown);
    let bolded = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    bolded.replace("\r\n", "\n").replace('\n', "<br>")
}

/// The submission with the highest stage number; the first one wins ties.
pub fn latest_submission(submissions: &[Record]) -> Option<&Record> {
    let mut latest: Option<(&Record, f64)> = None;
    for submission in submissions {
        let stage = submission.f64("stage_number").unwrap_or(0.0);
        match latest {
            Some((_, best)) if best >= stage => {}
            _ => latest = Some((submission, stage)),
        }
    }
    latest.map(|(record, _)| record)
}

pub fn resource_count_label(count: usize) -> String {
    match count {
        0 => String::new(),
        1 => "1 resource".to_string(),
        n => format!("{} resources", n),
    }
}

pub fn submission_count_label(count: usize) -> String {
    if count == 0 {
        "No submissions".to_string()
    } else {
        format!("{} submission(s)", count)
    }
}

pub fn class_alert_text(ungrouped: usize) -> String {
    if ungrouped == 0 {
        "No ungrouped students available".to_string()
    } else {
        format!("{} ungrouped students available", ungrouped)
    }
}

/// Compiled fragment templates
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, source)?;
        }
        Ok(Renderer { registry })
    }

    fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        Ok(self.registry.render(name, data)?)
    }

    /// Spinner shown while the first fetch of a region is in flight.
    pub fn loading(&self, message: &str) -> Result<String> {
        self.render("loading", &json!({ "message": message }))
    }

    /// `icon` is trusted markup (an HTML entity); the texts are escaped.
    pub fn empty_state(&self, icon: &str, title: &str, subtext: &str) -> Result<String> {
        self.render(
            "empty_state",
            &json!({ "icon": icon, "title": title, "subtext": subtext }),
        )
    }

    pub fn error_state(&self, title: &str, detail: &str) -> Result<String> {
        self.render("error_state", &json!({ "title": title, "detail": detail }))
    }

    /// Group list region
    ///
    /// An empty snapshot renders the empty state; a filter with no hits
    /// renders a "no matches" state; otherwise cards or a table over the same
    /// filtered, sorted order.
    pub fn groups(&self, groups: &[Record], view: &ViewState) -> Result<String> {
        if groups.is_empty() {
            return self.empty_state(
                "&#128203;",
                "No groups yet",
                "Create the first group to get started!",
            );
        }

        let visible = listing::arrange(groups, view, GROUP_FIELDS);
        if visible.is_empty() {
            return self.empty_state(
                "&#128269;",
                "No matching groups",
                "Try a different search term.",
            );
        }

        let rows: Vec<GroupView> = visible.into_iter().map(GroupView::from_record).collect();
        match view.view_mode {
            ViewMode::Cards => self.render("group_cards", &json!({ "groups": rows })),
            ViewMode::Table => {
                let columns: Vec<ColumnView> = GROUP_COLUMNS
                    .iter()
                    .map(|&(key, label)| ColumnView {
                        key,
                        label,
                        sort_class: view.direction_of(key).map(|d| d.class()).unwrap_or(""),
                    })
                    .collect();
                self.render("group_table", &json!({ "columns": columns, "groups": rows }))
            }
        }
    }

    /// Resource card grid, in snapshot order (the order is the curated one).
    pub fn resources(&self, resources: &[Record]) -> Result<String> {
        if resources.is_empty() {
            return self.empty_state(
                "&#128218;",
                "No resources yet",
                "Click \"Add Resource\" to add YouTube videos or other resources",
            );
        }
        let cards: Vec<ResourceView> = resources.iter().map(ResourceView::from_record).collect();
        self.render("resource_cards", &json!({ "resources": cards }))
    }

    /// Total groups, total submissions and the per-group average.
    pub fn stat_cards(&self, stats: &Record) -> Result<Vec<StatCard>> {
        let groups = stats.f64("total_groups").unwrap_or(0.0);
        let submissions = stats.f64("total_submissions").unwrap_or(0.0);
        let average = if groups > 0.0 {
            format!("{:.1}", submissions / groups)
        } else {
            "0".to_string()
        };

        let cards = [
            ("totalGroupsCard", "&#128202;", "Total Groups", count_text(groups), "Active groups"),
            (
                "totalSubmissionsCard",
                "&#128221;",
                "Total Submissions",
                count_text(submissions),
                "All stages combined",
            ),
            (
                "avgSubmissionsCard",
                "&#128200;",
                "Avg Submissions per Group",
                average,
                "Average across all groups",
            ),
        ];

        cards
            .into_iter()
            .map(|(region, icon, label, value, subtext)| {
                let html = self.render(
                    "stat_card",
                    &json!({ "icon": icon, "label": label, "value": value, "subtext": subtext }),
                )?;
                Ok(StatCard { region, html })
            })
            .collect()
    }

    /// Stage completion bars.
    pub fn stages(&self, stages: &[Record]) -> Result<String> {
        if stages.is_empty() {
            return self.empty_state("&#128237;", "No stage data available", "");
        }
        let views: Vec<StageView> = stages
            .iter()
            .map(|stage| {
                let completed = stage.f64("completed_submissions").unwrap_or(0.0);
                let total = stage.f64("total_submissions").unwrap_or(0.0);
                let percent = if total > 0.0 {
                    (completed / total * 100.0).round() as u32
                } else {
                    0
                };
                StageView {
                    number: stage.text_or("stage_number", ""),
                    name: stage.text_or("stage_name", ""),
                    percent,
                    show_label: percent > 10,
                    completed: count_text(completed),
                    total: count_text(total),
                }
            })
            .collect();
        self.render("stages", &json!({ "stages": views }))
    }

    /// Rows of the submissions table, filtered and sorted by `view`.
    pub fn submissions(&self, submissions: &[Record], view: &ViewState) -> Result<String> {
        let rows: Vec<SubmissionView> = listing::arrange(submissions, view, SUBMISSION_FIELDS)
            .into_iter()
            .map(|s| SubmissionView {
                group_id: s.text_or("group_id", ""),
                group_name: s.text_or("group_name", "Unknown"),
                project_title: s.text_or("project_title", "N/A"),
                stage_number: s.text_or("stage_number", ""),
                submitted: format_date(s.str("submitted_at")),
            })
            .collect();
        self.render("submission_rows", &json!({ "rows": rows }))
    }

    /// Per-group stage status rows with a delete action.
    pub fn group_status(&self, groups: &[Record]) -> Result<String> {
        let rows: Vec<StatusView> = groups
            .iter()
            .map(|g| {
                let stages = g.object("stages").unwrap_or_default();
                StatusView {
                    id: g.id().unwrap_or_default(),
                    name: g.text_or("group_name", ""),
                    project: g.text_or("project_title", ""),
                    stages: (1..=STAGE_COUNT)
                        .map(|i| stages.bool(&format!("stage_{}", i)).unwrap_or(false))
                        .collect(),
                }
            })
            .collect();
        self.render("group_status_rows", &json!({ "groups": rows }))
    }

    /// Candidates for the member search, capped; already-selected ones dimmed.
    pub fn student_dropdown(
        &self,
        roster: &[Record],
        term: &str,
        selected: &[SelectedMember],
    ) -> Result<String> {
        let students: Vec<StudentView> = listing::filter_records(roster, Some(term), STUDENT_FIELDS)
            .into_iter()
            .take(MAX_STUDENT_CANDIDATES)
            .map(|s| {
                let id = s.id().unwrap_or_default();
                StudentView {
                    selected: selected.iter().any(|m| m.student_id == id),
                    name: student_name(s),
                    campus_id: s.text_or("campus_id", "No ID"),
                    program: s.text_or("program", "N/A"),
                    id,
                }
            })
            .collect();
        self.render("student_dropdown", &json!({ "students": students }))
    }

    pub fn selected_members(&self, members: &[SelectedMember]) -> Result<String> {
        let members: Vec<MemberView> = members
            .iter()
            .map(|m| MemberView {
                student_id: &m.student_id,
                name: &m.name,
                campus_label: m.campus_id.as_deref().unwrap_or("No ID"),
            })
            .collect();
        self.render("selected_members", &json!({ "members": members }))
    }

    /// Body of the group details modal.
    pub fn group_detail(&self, group: &Record) -> Result<String> {
        let submissions = group.records("submissions");
        let latest = latest_submission(&submissions);
        let summary_html = latest
            .and_then(|s| s.str("summary_markdown"))
            .map(summary_to_html);
        let link = latest
            .and_then(|s| s.str("presentation_link"))
            .filter(|l| l.starts_with("http://") || l.starts_with("https://"));

        self.render(
            "group_detail",
            &json!({
                "project": group.text_or("project_title", "N/A"),
                "summary_html": summary_html,
                "stage": latest.map(|s| s.text_or("stage_number", "")),
                "presentation_link": link,
            }),
        )
    }

    pub fn toasts<'a>(&self, toasts: impl Iterator<Item = &'a Toast>) -> Result<String> {
        let views: Vec<ToastView> = toasts
            .map(|t| ToastView {
                id: t.id.to_string(),
                kind: t.kind,
                icon: toast_icon(t.kind),
                title: t.title.as_deref(),
                message: &t.message,
                repeats: t.repeats,
                repeated: t.repeats > 1,
            })
            .collect();
        self.render("toasts", &json!({ "toasts": views }))
    }
}
