use log::info;

use crate::io::storage::{
    KeyValueStore, PROJECTS_KEY, StorageError, TASKS_KEY, read_collection, write_collection,
};
use crate::model::{Project, Task};

/// Persistence contract for projects
pub trait ProjectRepository {
    /// All projects in storage order
    fn get_all(&self) -> Result<Vec<Project>, StorageError>;
    /// Create and persist a new project
    fn create(&self, title: &str) -> Result<Project, StorageError>;
    /// Retitle a project. Returns `None` (and writes nothing) if `id` is unknown.
    fn update(&self, id: &str, title: &str) -> Result<Option<Project>, StorageError>;
    /// Remove a project and purge every task whose `projectId` matches.
    /// Returns whether a project record was removed.
    fn delete(&self, id: &str) -> Result<bool, StorageError>;
}

/// `ProjectRepository` over a key-value store
#[derive(Debug, Clone)]
pub struct LocalProjectRepository<S> {
    store: S,
}

impl<S: KeyValueStore> LocalProjectRepository<S> {
    pub fn new(store: S) -> Self {
        LocalProjectRepository { store }
    }

    fn load(&self) -> Result<Vec<Project>, StorageError> {
        read_collection(&self.store, PROJECTS_KEY)
    }

    fn save(&self, projects: &[Project]) -> Result<(), StorageError> {
        write_collection(&self.store, PROJECTS_KEY, projects)
    }
}

impl<S: KeyValueStore> ProjectRepository for LocalProjectRepository<S> {
    fn get_all(&self) -> Result<Vec<Project>, StorageError> {
        self.load()
    }

    fn create(&self, title: &str) -> Result<Project, StorageError> {
        let mut projects = self.load()?;
        let project = Project::new(title);
        projects.push(project.clone());
        self.save(&projects)?;
        Ok(project)
    }

    fn update(&self, id: &str, title: &str) -> Result<Option<Project>, StorageError> {
        let mut projects = self.load()?;
        let Some(project) = projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.title = title.to_string();
        project.touch();
        let updated = project.clone();
        self.save(&projects)?;
        Ok(Some(updated))
    }

    fn delete(&self, id: &str) -> Result<bool, StorageError> {
        // Both collections parse before either is written.
        let mut projects = self.load()?;
        let mut tasks: Vec<Task> = read_collection(&self.store, TASKS_KEY)?;

        let before = projects.len();
        projects.retain(|p| p.id != id);
        let removed = projects.len() != before;
        let tasks_before = tasks.len();
        tasks.retain(|t| t.project_id != id);
        let purged = tasks_before - tasks.len();

        self.save(&projects)?;
        if purged > 0 {
            write_collection(&self.store, TASKS_KEY, &tasks)?;
        }

        info!(
            "event=project_delete module=storage status=ok removed={} tasks_purged={}",
            removed, purged
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStore;

    #[test]
    fn create_appends_in_order() {
        let store = MemoryStore::new();
        let repo = LocalProjectRepository::new(&store);
        let a = repo.create("Alpha").unwrap();
        let b = repo.create("Beta").unwrap();
        let all = repo.get_all().unwrap();
        assert_eq!(all, vec![a, b]);
    }

    #[test]
    fn update_unknown_id_writes_nothing() {
        let store = MemoryStore::new();
        let repo = LocalProjectRepository::new(&store);
        assert!(repo.update("missing", "x").unwrap().is_none());
        assert!(store.get(PROJECTS_KEY).unwrap().is_none());
    }

    #[test]
    fn update_refreshes_timestamp() {
        let store = MemoryStore::new();
        let repo = LocalProjectRepository::new(&store);
        let p = repo.create("Old").unwrap();
        let updated = repo.update(&p.id, "New").unwrap().unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.created_at, p.created_at);
        assert!(updated.updated_at >= p.updated_at);
        assert_eq!(repo.get_all().unwrap()[0].title, "New");
    }

    #[test]
    fn delete_purges_project_tasks_only() {
        let store = MemoryStore::new();
        let repo = LocalProjectRepository::new(&store);
        let keep = repo.create("Keep").unwrap();
        let drop = repo.create("Drop").unwrap();
        let tasks = vec![
            Task::new(&keep.id, None, "stays", 0),
            Task::new(&drop.id, None, "goes", 0),
            Task::new(&drop.id, None, "goes too", 1),
        ];
        write_collection(&store, TASKS_KEY, &tasks).unwrap();

        assert!(repo.delete(&drop.id).unwrap());

        let projects = repo.get_all().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, keep.id);
        let left: Vec<Task> = read_collection(&store, TASKS_KEY).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "stays");
    }

    #[test]
    fn delete_with_malformed_tasks_keeps_the_project() {
        let store = MemoryStore::new();
        let repo = LocalProjectRepository::new(&store);
        let project = repo.create("Stuck").unwrap();
        store.set(TASKS_KEY, "{broken").unwrap();

        let err = repo.delete(&project.id).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }), "{err:?}");
        assert_eq!(repo.get_all().unwrap(), vec![project]);
        assert_eq!(store.get(TASKS_KEY).unwrap().as_deref(), Some("{broken"));
    }

    #[test]
    fn delete_unknown_project_is_noop() {
        let store = MemoryStore::new();
        let repo = LocalProjectRepository::new(&store);
        repo.create("Only").unwrap();
        assert!(!repo.delete("nope").unwrap());
        assert_eq!(repo.get_all().unwrap().len(), 1);
    }
}
