mod common;

use common::{day, loaded_store, task, FakeApi};
use focusboard::kanban::CompletionData;
use focusboard::models::TaskStatus;
use focusboard::tui::app::App;

#[tokio::test]
async fn status_bar_shows_every_pending_notification() {
    let api = FakeApi::with_tasks(vec![task("1", "Ship login", TaskStatus::InProgress, day(2025, 3, 10))]);
    let mut store = loaded_store(&api, day(2025, 3, 10)).await;
    store.take_notifications();

    let data = CompletionData { time_taken: 40, ..Default::default() };
    store.complete_task("1", &data).await.unwrap();

    let mut app = App::new(&mut store, 30);
    app.pull_notifications();

    let status = app.status.as_ref().unwrap();
    assert!(!status.is_error);
    let completed = status.text.find("Task completed").unwrap();
    let added = status.text.find("Accomplishment added").unwrap();
    assert!(completed < added);
    assert!(app.store.take_notifications().is_empty());
}

#[tokio::test]
async fn status_bar_keeps_last_message_without_notifications() {
    let api = FakeApi::new();
    let mut store = loaded_store(&api, day(2025, 3, 10)).await;
    store.take_notifications();

    let mut app = App::new(&mut store, 30);
    app.show_message("Nothing to do", false);
    app.pull_notifications();

    assert_eq!(app.status.as_ref().unwrap().text, "Nothing to do");
}
