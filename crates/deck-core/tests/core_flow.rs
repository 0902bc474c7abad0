use deck_core::kvstore::FileKvStore;
use deck_core::store::TaskStore;
use deck_core::task::{Priority, Status, TaskDraft, TaskPatch};
use deck_core::views;
use tempfile::tempdir;

fn draft(title: &str, date: &str, category: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        date: date.to_string(),
        category: category.to_string(),
        ..TaskDraft::default()
    }
}

#[test]
fn mutations_survive_reopen() {
    let temp = tempdir().expect("tempdir");

    let first_id;
    {
        let kv = FileKvStore::open(temp.path()).expect("open kv store");
        let mut store = TaskStore::open(Box::new(kv)).expect("open store");
        assert!(store.persistence_available());

        first_id = store
            .create(draft("Write weekly report", "2026-08-03", "default"))
            .expect("create")
            .id;
        store
            .create(draft("Book dentist", "2026-08-10", "health"))
            .expect("create");

        store.set_percent(first_id, 40).expect("set percent");
        store
            .update(
                first_id,
                TaskPatch {
                    priority: Some(Priority::High),
                    ..TaskPatch::default()
                },
            )
            .expect("update");
    }

    let kv = FileKvStore::open(temp.path()).expect("open kv store");
    let mut store = TaskStore::open(Box::new(kv)).expect("reopen store");

    let task = store.find_by_id(first_id).expect("task survived");
    assert_eq!(task.title, "Write weekly report");
    assert_eq!(task.status, Status::InProgress);
    assert_eq!(task.percent, Some(40));
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.category, "uncategorized");

    let counts = views::counts_by_status(store.list());
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.in_progress, 1);
    assert_eq!(views::completion_percentage(store.list()), 0);

    store.toggle_status(first_id).expect("toggle");
    assert_eq!(views::completion_percentage(store.list()), 50);

    let grouped: Vec<&str> = views::group_by_date(store.list()).keys().copied().collect();
    assert_eq!(grouped, vec!["2026-08-03", "2026-08-10"]);
}

#[test]
fn account_survives_reopen() {
    let temp = tempdir().expect("tempdir");

    {
        let mut kv = FileKvStore::open(temp.path()).expect("open kv store");
        deck_core::auth::signup(&mut kv, None, "ada", "ada@example.com", "hunter2")
            .expect("signup");
    }

    let mut kv = FileKvStore::open(temp.path()).expect("open kv store");
    let user = deck_core::auth::login(&mut kv, "ada@example.com", "hunter2").expect("login");
    assert_eq!(user.username, "ada");
    assert!(deck_core::auth::is_logged_in(&kv));
}
