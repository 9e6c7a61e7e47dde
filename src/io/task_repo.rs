use std::collections::HashSet;

use log::info;

use crate::io::storage::{KeyValueStore, StorageError, TASKS_KEY, read_collection, write_collection};
use crate::model::Task;
use crate::ops::tree::collect_subtree_ids;

/// Persistence contract for tasks
pub trait TaskRepository {
    /// Every stored task, all projects
    fn get_all(&self) -> Result<Vec<Task>, StorageError>;
    /// Tasks of one project in storage order
    fn get_by_project(&self, project_id: &str) -> Result<Vec<Task>, StorageError>;
    /// Persist a new task as given
    fn create(&self, task: Task) -> Result<Task, StorageError>;
    /// Persist several new tasks in a single write
    fn create_many(&self, tasks: Vec<Task>) -> Result<Vec<Task>, StorageError>;
    /// Replace a stored task, refreshing `updatedAt`.
    /// Returns the stored record, or `None` (nothing written) if the id is unknown.
    fn update(&self, task: &Task) -> Result<Option<Task>, StorageError>;
    /// `update` for several tasks in a single write; unknown ids are skipped.
    fn update_many(&self, tasks: &[Task]) -> Result<Vec<Task>, StorageError>;
    /// Remove a task and its entire descendant subtree. Returns removed ids.
    fn delete(&self, id: &str) -> Result<Vec<String>, StorageError>;
}

/// `TaskRepository` over a key-value store
#[derive(Debug, Clone)]
pub struct LocalTaskRepository<S> {
    store: S,
}

impl<S: KeyValueStore> LocalTaskRepository<S> {
    pub fn new(store: S) -> Self {
        LocalTaskRepository { store }
    }

    fn load(&self) -> Result<Vec<Task>, StorageError> {
        read_collection(&self.store, TASKS_KEY)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        write_collection(&self.store, TASKS_KEY, tasks)
    }
}

impl<S: KeyValueStore> TaskRepository for LocalTaskRepository<S> {
    fn get_all(&self) -> Result<Vec<Task>, StorageError> {
        self.load()
    }

    fn get_by_project(&self, project_id: &str) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.load()?;
        tasks.retain(|t| t.project_id == project_id);
        Ok(tasks)
    }

    fn create(&self, task: Task) -> Result<Task, StorageError> {
        let mut tasks = self.load()?;
        tasks.push(task.clone());
        self.save(&tasks)?;
        Ok(task)
    }

    fn create_many(&self, new_tasks: Vec<Task>) -> Result<Vec<Task>, StorageError> {
        if new_tasks.is_empty() {
            return Ok(new_tasks);
        }
        let mut tasks = self.load()?;
        tasks.extend(new_tasks.iter().cloned());
        self.save(&tasks)?;
        Ok(new_tasks)
    }

    fn update(&self, task: &Task) -> Result<Option<Task>, StorageError> {
        Ok(self.update_many(std::slice::from_ref(task))?.pop())
    }

    fn update_many(&self, updates: &[Task]) -> Result<Vec<Task>, StorageError> {
        let mut tasks = self.load()?;
        let mut stored = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(slot) = tasks.iter_mut().find(|t| t.id == update.id) {
                let mut record = update.clone();
                record.touch();
                *slot = record.clone();
                stored.push(record);
            }
        }
        if !stored.is_empty() {
            self.save(&tasks)?;
        }
        Ok(stored)
    }

    fn delete(&self, id: &str) -> Result<Vec<String>, StorageError> {
        let mut tasks = self.load()?;
        if !tasks.iter().any(|t| t.id == id) {
            return Ok(Vec::new());
        }
        let doomed = collect_subtree_ids(&tasks, id);
        let doomed_set: HashSet<&str> = doomed.iter().map(String::as_str).collect();
        tasks.retain(|t| !doomed_set.contains(t.id.as_str()));
        self.save(&tasks)?;
        info!(
            "event=task_delete module=storage status=ok removed={}",
            doomed.len()
        );
        Ok(doomed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStore;

    fn chain(project: &str) -> Vec<Task> {
        // a → b → c, plus a sibling root d
        let a = Task::new(project, None, "a", 0);
        let b = Task::new(project, Some(a.id.clone()), "b", 0);
        let c = Task::new(project, Some(b.id.clone()), "c", 0);
        let d = Task::new(project, None, "d", 1);
        vec![a, b, c, d]
    }

    #[test]
    fn get_by_project_filters() {
        let store = MemoryStore::new();
        let repo = LocalTaskRepository::new(&store);
        repo.create_many(chain("p1")).unwrap();
        repo.create(Task::new("p2", None, "other", 0)).unwrap();
        assert_eq!(repo.get_by_project("p1").unwrap().len(), 4);
        assert_eq!(repo.get_by_project("p2").unwrap().len(), 1);
        assert_eq!(repo.get_all().unwrap().len(), 5);
    }

    #[test]
    fn delete_removes_descendants_at_any_depth() {
        let store = MemoryStore::new();
        let repo = LocalTaskRepository::new(&store);
        let tasks = repo.create_many(chain("p1")).unwrap();

        let removed = repo.delete(&tasks[0].id).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0], tasks[0].id);

        let left = repo.get_all().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "d");
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let store = MemoryStore::new();
        let repo = LocalTaskRepository::new(&store);
        repo.create_many(chain("p1")).unwrap();
        assert!(repo.delete("nope").unwrap().is_empty());
        assert_eq!(repo.get_all().unwrap().len(), 4);
    }

    #[test]
    fn update_replaces_record_and_refreshes_timestamp() {
        let store = MemoryStore::new();
        let repo = LocalTaskRepository::new(&store);
        let task = repo.create(Task::new("p1", None, "draft", 0)).unwrap();

        let mut edited = task.clone();
        edited.title = "final".into();
        edited.is_completed = true;
        let stored = repo.update(&edited).unwrap().unwrap();
        assert!(stored.updated_at >= task.updated_at);

        let reloaded = repo.get_all().unwrap();
        assert_eq!(reloaded[0].title, "final");
        assert!(reloaded[0].is_completed);
        assert_eq!(reloaded[0].created_at, task.created_at);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let store = MemoryStore::new();
        let repo = LocalTaskRepository::new(&store);
        let ghost = Task::new("p1", None, "ghost", 0);
        assert!(repo.update(&ghost).unwrap().is_none());
        assert!(repo.get_all().unwrap().is_empty());
    }
}
