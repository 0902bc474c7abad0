use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::kvstore::{KvStore, TASKS_KEY};
use crate::sync::RemoteSync;
use crate::task::{Task, TaskDraft, TaskPatch, canonicalize_category, clamp_percent};

pub struct TaskStore {
    tasks: Vec<Task>,
    kv: Box<dyn KvStore>,
    remote: Option<Box<dyn RemoteSync>>,
    persistence_available: bool,
}

impl TaskStore {
    #[instrument(skip(kv))]
    pub fn open(kv: Box<dyn KvStore>) -> anyhow::Result<Self> {
        let mut store = Self {
            tasks: Vec::new(),
            kv,
            remote: None,
            persistence_available: true,
        };

        match store.kv.get(TASKS_KEY) {
            Ok(Some(blob)) => {
                store.tasks = serde_json::from_str(&blob)
                    .map_err(|err| anyhow::anyhow!("failed parsing task blob: {err}"))?;
                info!(count = store.tasks.len(), "loaded tasks");
            }
            Ok(None) => {
                debug!("no task blob yet; starting empty");
            }
            Err(err) => {
                warn!(error = %err, "kv store unreadable; running in memory only");
                store.persistence_available = false;
            }
        }

        Ok(store)
    }

    pub fn with_remote(mut self, remote: Box<dyn RemoteSync>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn persistence_available(&self) -> bool {
        self.persistence_available
    }

    // Theme and user-record state live in the same backing store.
    pub fn kv(&self) -> &dyn KvStore {
        self.kv.as_ref()
    }

    pub fn kv_mut(&mut self) -> &mut dyn KvStore {
        self.kv.as_mut()
    }

    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_by_id(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn next_id(&self) -> u64 {
        self.tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1
    }

    #[instrument(skip(self, draft), fields(title_len = draft.title.len()))]
    pub fn create(&mut self, draft: TaskDraft) -> Result<&Task> {
        validate_required("title", &draft.title)?;
        validate_required("date", &draft.date)?;

        let id = self.next_id();
        let task = Task::new_pending(id, draft);
        self.tasks.push(task);
        self.persist();

        debug!(id, count = self.tasks.len(), "task created");
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    #[instrument(skip(self, patch))]
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Result<&Task> {
        if let Some(title) = patch.title.as_deref() {
            validate_required("title", title)?;
        }
        if let Some(date) = patch.date.as_deref() {
            validate_required("date", date)?;
        }

        let idx = self.index_of(id)?;
        let task = &mut self.tasks[idx];
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(date) = patch.date {
            task.date = date;
        }
        if let Some(time) = patch.time {
            task.time = time;
        }
        if let Some(category) = patch.category {
            task.category = canonicalize_category(&category);
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        self.persist();

        debug!(id, "task updated");
        Ok(&self.tasks[idx])
    }

    #[instrument(skip(self))]
    pub fn toggle_status(&mut self, id: u64) -> Result<&Task> {
        let idx = self.index_of(id)?;
        self.tasks[idx].toggle();
        self.persist();

        debug!(id, status = ?self.tasks[idx].status, "task toggled");
        Ok(&self.tasks[idx])
    }

    #[instrument(skip(self))]
    pub fn set_percent(&mut self, id: u64, raw: i64) -> Result<&Task> {
        let idx = self.index_of(id)?;
        self.tasks[idx].apply_percent(clamp_percent(raw));
        self.persist();

        debug!(id, percent = self.tasks[idx].effective_percent(), "task percent set");
        Ok(&self.tasks[idx])
    }

    // Deleting an unknown id is a no-op, not an error.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() < before;

        if removed {
            self.persist();
            debug!(id, count = self.tasks.len(), "task deleted");
        } else {
            debug!(id, "delete of unknown id ignored");
        }
        removed
    }

    fn index_of(&self, id: u64) -> Result<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(Error::NotFound { id })
    }

    // In-memory state is already updated; a failed write degrades to
    // memory-only instead of failing the mutation.
    #[instrument(skip(self))]
    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.tasks) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "task blob not serializable; skipping persist");
                return;
            }
        };

        if let Err(err) = self.kv.set(TASKS_KEY, &payload) {
            let err = Error::PersistenceUnavailable(err.to_string());
            warn!(error = %err, "continuing in memory only");
            self.persistence_available = false;
        }

        if let Some(remote) = self.remote.as_ref() {
            remote.publish(TASKS_KEY, &payload);
        }
    }
}

fn validate_required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvstore::MemoryKvStore;
    use crate::task::{Priority, Status};

    fn open_memory_store() -> TaskStore {
        TaskStore::open(Box::new(MemoryKvStore::new())).expect("open store")
    }

    fn draft(title: &str, date: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            date: date.to_string(),
            category: "default".to_string(),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn create_assigns_monotonic_ids() {
        let mut store = open_memory_store();
        let first = store.create(draft("one", "2026-08-03")).expect("create").id;
        let second = store.create(draft("two", "2026-08-04")).expect("create").id;
        assert_eq!(first, 1);
        assert_eq!(second, 2);

        store.delete(second);
        let third = store.create(draft("three", "2026-08-05")).expect("create").id;
        assert_eq!(third, 2);
    }

    #[test]
    fn create_rejects_blank_required_fields() {
        let mut store = open_memory_store();
        let err = store.create(draft("", "2026-08-03")).expect_err("blank title");
        assert!(matches!(err, Error::Validation { field: "title" }));

        let err = store.create(draft("one", "  ")).expect_err("blank date");
        assert!(matches!(err, Error::Validation { field: "date" }));
        assert!(store.list().is_empty());
    }

    #[test]
    fn create_canonicalizes_sentinel_category() {
        let mut store = open_memory_store();
        let task = store.create(draft("one", "2026-08-03")).expect("create");
        assert_eq!(task.category, "uncategorized");
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.percent, Some(0));
    }

    #[test]
    fn update_merges_partial_fields() {
        let mut store = open_memory_store();
        let id = store.create(draft("one", "2026-08-03")).expect("create").id;

        let task = store
            .update(
                id,
                TaskPatch {
                    title: Some("renamed".to_string()),
                    priority: Some(Priority::High),
                    category: Some("Study".to_string()),
                    ..TaskPatch::default()
                },
            )
            .expect("update");

        assert_eq!(task.title, "renamed");
        assert_eq!(task.date, "2026-08-03");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, "study");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = open_memory_store();
        let err = store.update(99, TaskPatch::default()).expect_err("missing");
        assert!(matches!(err, Error::NotFound { id: 99 }));
    }

    #[test]
    fn set_percent_clamps_and_derives_status() {
        let mut store = open_memory_store();
        let id = store.create(draft("one", "2026-08-03")).expect("create").id;

        let task = store.set_percent(id, 150).expect("set percent");
        assert_eq!(task.percent, Some(100));
        assert_eq!(task.status, Status::Completed);

        let task = store.set_percent(id, -5).expect("set percent");
        assert_eq!(task.percent, Some(0));
        assert_eq!(task.status, Status::Pending);

        let task = store.set_percent(id, 42).expect("set percent");
        assert_eq!(task.percent, Some(42));
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = open_memory_store();
        let id = store.create(draft("one", "2026-08-03")).expect("create").id;

        assert!(store.delete(id));
        assert!(!store.delete(id));
        assert!(store.list().is_empty());
    }

    #[test]
    fn mutations_keep_percent_and_status_consistent() {
        let mut store = open_memory_store();
        let id = store.create(draft("one", "2026-08-03")).expect("create").id;
        store.set_percent(id, 70).expect("set percent");
        store.toggle_status(id).expect("toggle");

        for task in store.list() {
            match task.effective_percent() {
                100 => assert_eq!(task.status, Status::Completed),
                0 => assert_eq!(task.status, Status::Pending),
                _ => assert_eq!(task.status, Status::InProgress),
            }
        }
    }

    #[test]
    fn persisted_blob_round_trips() {
        let mut store = open_memory_store();
        store.create(draft("one", "2026-08-03")).expect("create");
        store.set_percent(1, 42).expect("set percent");

        let blob = serde_json::to_string(store.list()).expect("serialize");
        let parsed: Vec<Task> = serde_json::from_str(&blob).expect("parse");
        assert_eq!(parsed, store.list());
    }

    #[test]
    fn remote_channel_sees_each_mutation() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Recorder(Rc<RefCell<Vec<String>>>);

        impl crate::sync::RemoteSync for Recorder {
            fn publish(&self, _key: &str, payload: &str) {
                self.0.borrow_mut().push(payload.to_string());
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = open_memory_store().with_remote(Box::new(Recorder(Rc::clone(&seen))));

        let id = store.create(draft("one", "2026-08-03")).expect("create").id;
        store.toggle_status(id).expect("toggle");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].contains("\"completed\""));
    }

    struct FailingKv;

    impl crate::kvstore::KvStore for FailingKv {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("disk on fire"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }

        fn remove(&mut self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }
    }

    #[test]
    fn unavailable_backend_degrades_to_memory() {
        let mut store = TaskStore::open(Box::new(FailingKv)).expect("open degraded");
        assert!(!store.persistence_available());

        let task = store.create(draft("one", "2026-08-03")).expect("create still works");
        assert_eq!(task.id, 1);
        assert_eq!(store.list().len(), 1);
    }
}
