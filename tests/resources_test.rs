mod support;

use serde_json::{Value, json};

use course_portal::resources::{LIST_REGION, ResourceForm, ResourcesController};
use support::Backend;

fn course_resources() -> Backend {
    let mut backend = Backend::default();
    backend.resources = vec![
        json!({"id": 1, "course_id": "cmsc178", "title": "Intro lecture", "resource_type": "youtube", "youtube_video_id": "dQw4w9WgXcQ", "is_active": true}),
        json!({"id": 2, "course_id": "cmsc178", "title": "Syllabus", "resource_type": "pdf", "external_url": "https://files.example/syllabus.pdf", "is_active": true}),
        json!({"id": 3, "course_id": "cmsc178", "title": "Lab guide", "resource_type": "link", "external_url": "https://lab.example", "is_active": false}),
        json!({"id": 4, "course_id": "cmsc198", "title": "Other course", "resource_type": "link", "external_url": "https://other.example", "is_active": true}),
    ];
    backend
}

fn titles<T: course_portal::api::Transport, R: course_portal::target::RenderTarget>(
    page: &ResourcesController<T, R>,
) -> Vec<String> {
    page.resources()
        .iter()
        .map(|r| r.text_or("title", ""))
        .collect()
}

fn server_order(backend: &Backend, course: &str) -> Vec<Value> {
    backend
        .resources
        .iter()
        .filter(|r| r["course_id"] == course)
        .map(|r| r["id"].clone())
        .collect()
}

#[tokio::test]
async fn failed_reorder_falls_back_to_the_server_order() {
    let server = support::spawn(course_resources()).await;
    server.with(|b| b.reorder_fails = true);
    let mut page = ResourcesController::new(server.context());
    page.select_course("cmsc178").await;
    assert_eq!(titles(&page), ["Intro lecture", "Syllabus", "Lab guide"]);

    page.reorder("3", "1").await;

    assert_eq!(titles(&page), ["Intro lecture", "Syllabus", "Lab guide"]);
    let cards = page.target().html(LIST_REGION);
    assert!(cards.find("Intro lecture").unwrap() < cards.find("Lab guide").unwrap());
    assert_eq!(
        page.context().toasts.last().unwrap().message,
        "Failed to save order"
    );
    assert_eq!(server.read(|b| server_order(b, "cmsc178")), [json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn saved_reorder_survives_a_reload() {
    let server = support::spawn(course_resources()).await;
    let mut page = ResourcesController::new(server.context());
    page.select_course("cmsc178").await;

    page.reorder("1", "3").await;
    assert_eq!(titles(&page), ["Syllabus", "Lab guide", "Intro lecture"]);
    assert_eq!(page.context().toasts.last().unwrap().message, "Order saved");

    page.load().await;
    assert_eq!(titles(&page), ["Syllabus", "Lab guide", "Intro lecture"]);
}

#[tokio::test]
async fn added_resource_is_listed_for_its_course_only() {
    let server = support::spawn(course_resources()).await;
    let mut page = ResourcesController::new(server.context());
    page.select_course("cmsc178").await;
    assert!(!page.target().html(LIST_REGION).contains("Other course"));

    page.open_add(Some("addResourceBtn"));
    page.submit(ResourceForm {
        title: "Recursion walkthrough".into(),
        youtube_url: "https://youtu.be/abcdefghijk".into(),
        ..ResourceForm::default()
    })
    .await;

    assert_eq!(page.context().toasts.last().unwrap().message, "Resource added");
    assert_eq!(page.resources().len(), 4);
    let cards = page.target().html(LIST_REGION);
    assert!(cards.contains("Recursion walkthrough"));
    assert!(cards.contains("abcdefghijk"));

    page.select_course("cmsc198").await;
    assert_eq!(titles(&page), ["Other course"]);
}
