//! Application store: in-memory projects and tasks, written through to
//! storage on every mutation.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, info};

use crate::io::project_repo::{LocalProjectRepository, ProjectRepository};
use crate::io::storage::{KeyValueStore, StorageError};
use crate::io::task_repo::{LocalTaskRepository, TaskRepository};
use crate::model::{BoardConfig, ChecklistItem, Position, Project, Task, new_id};
use crate::ops::graph::creates_cycle;
use crate::ops::tree::{children_of, next_order};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("cannot move {task} under {parent}: {parent} is {task} or one of its descendants")]
    Cycle { task: String, parent: String },
    #[error("cannot move {task} under {parent}: they belong to different projects")]
    CrossProject { task: String, parent: String },
}

/// Holds the loaded projects and the tasks of the active project.
pub struct AppStore<S> {
    projects: Vec<Project>,
    /// Tasks of the active project, storage order
    tasks: IndexMap<String, Task>,
    active_project: Option<String>,
    project_repo: LocalProjectRepository<S>,
    task_repo: LocalTaskRepository<S>,
    board: BoardConfig,
}

impl<S: KeyValueStore + Clone> AppStore<S> {
    pub fn new(store: S, board: BoardConfig) -> Self {
        AppStore {
            projects: Vec::new(),
            tasks: IndexMap::new(),
            active_project: None,
            project_repo: LocalProjectRepository::new(store.clone()),
            task_repo: LocalTaskRepository::new(store),
            board,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn active_project(&self) -> Option<&str> {
        self.active_project.as_deref()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Tasks of the active project in storage order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Owned copy of the active project's tasks, for the tree and graph helpers
    pub fn task_list(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    /// Every stored task, all projects. Used for reference resolution.
    pub fn all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.task_repo.get_all()?)
    }

    /// Number of stored tasks per project id
    pub fn task_counts(&self) -> Result<HashMap<String, usize>, StoreError> {
        let mut counts = HashMap::new();
        for task in self.task_repo.get_all()? {
            *counts.entry(task.project_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    pub fn load_projects(&mut self) -> Result<&[Project], StoreError> {
        self.projects = self.project_repo.get_all()?;
        debug!(
            "event=projects_load module=store status=ok count={}",
            self.projects.len()
        );
        Ok(&self.projects)
    }

    /// Load one project's tasks and make it the active project.
    pub fn load_tasks(&mut self, project_id: &str) -> Result<(), StoreError> {
        let tasks = self.task_repo.get_by_project(project_id)?;
        self.tasks = tasks.into_iter().map(|t| (t.id.clone(), t)).collect();
        self.active_project = Some(project_id.to_string());
        debug!(
            "event=tasks_load module=store status=ok project={} count={}",
            project_id,
            self.tasks.len()
        );
        Ok(())
    }

    /// Reload projects and, when one is active, its tasks.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.load_projects()?;
        match self.active_project.clone() {
            Some(id) if self.project(&id).is_some() => self.load_tasks(&id),
            Some(_) => {
                self.close_project();
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Forget the active project's tasks
    pub fn close_project(&mut self) {
        self.active_project = None;
        self.tasks.clear();
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn add_project(&mut self, title: &str) -> Result<Project, StoreError> {
        let project = self.project_repo.create(title)?;
        self.projects.push(project.clone());
        info!("event=project_add module=store status=ok");
        Ok(project)
    }

    pub fn rename_project(&mut self, id: &str, title: &str) -> Result<Option<Project>, StoreError> {
        let Some(updated) = self.project_repo.update(id, title)? else {
            return Ok(None);
        };
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == id) {
            *slot = updated.clone();
        }
        info!("event=project_rename module=store status=ok");
        Ok(Some(updated))
    }

    /// Delete a project and all of its tasks.
    pub fn delete_project(&mut self, id: &str) -> Result<bool, StoreError> {
        let removed = self.project_repo.delete(id)?;
        self.projects.retain(|p| p.id != id);
        if self.active_project.as_deref() == Some(id) {
            self.close_project();
        }
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Add a task at the end of its sibling list. Switches the active
    /// project when `project_id` is not the one loaded.
    pub fn add_task(
        &mut self,
        project_id: &str,
        parent_id: Option<&str>,
        title: &str,
    ) -> Result<Task, StoreError> {
        if self.project(project_id).is_none() {
            return Err(StoreError::ProjectNotFound(project_id.to_string()));
        }
        if self.active_project.as_deref() != Some(project_id) {
            self.load_tasks(project_id)?;
        }
        if let Some(parent) = parent_id {
            if !self.tasks.contains_key(parent) {
                return Err(StoreError::TaskNotFound(parent.to_string()));
            }
        }

        let order = next_order(self.tasks.values(), project_id, parent_id);
        let task = Task::new(project_id, parent_id.map(String::from), title, order);
        let task = self.task_repo.create(task)?;
        self.tasks.insert(task.id.clone(), task.clone());
        info!(
            "event=task_add module=store status=ok root={} order={}",
            parent_id.is_none(),
            order
        );
        Ok(task)
    }

    /// Persist a full task record and refresh it in memory.
    pub fn update_task(&mut self, task: &Task) -> Result<Option<Task>, StoreError> {
        let Some(stored) = self.task_repo.update(task)? else {
            return Ok(None);
        };
        if self.active_project.as_deref() == Some(stored.project_id.as_str()) {
            self.tasks.insert(stored.id.clone(), stored.clone());
        }
        Ok(Some(stored))
    }

    /// Apply `edit` to a copy of the task and persist it. `edit` returns
    /// false to abandon the change.
    fn modify(
        &mut self,
        id: &str,
        edit: impl FnOnce(&mut Task) -> bool,
    ) -> Result<Option<Task>, StoreError> {
        let Some(current) = self.tasks.get(id) else {
            return Ok(None);
        };
        let mut next = current.clone();
        if !edit(&mut next) {
            return Ok(None);
        }
        self.update_task(&next)
    }

    pub fn rename_task(&mut self, id: &str, title: &str) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| {
            t.title = title.to_string();
            true
        })
    }

    pub fn toggle_completed(&mut self, id: &str) -> Result<Option<Task>, StoreError> {
        let updated = self.modify(id, |t| {
            t.is_completed = !t.is_completed;
            true
        })?;
        if let Some(task) = &updated {
            info!(
                "event=task_toggle module=store status=ok completed={}",
                task.is_completed
            );
        }
        Ok(updated)
    }

    pub fn toggle_expanded(&mut self, id: &str) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| {
            t.is_expanded = !t.is_expanded;
            true
        })
    }

    /// Expand or collapse a task. Writes nothing when already in that state.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| {
            let changed = t.is_expanded != expanded;
            t.is_expanded = expanded;
            changed
        })
    }

    pub fn add_checklist_item(&mut self, id: &str, title: &str) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| {
            t.checklist
                .get_or_insert_with(Vec::new)
                .push(ChecklistItem::new(title));
            true
        })
    }

    pub fn toggle_checklist_item(
        &mut self,
        id: &str,
        item_id: &str,
    ) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| match checklist_item_mut(t, item_id) {
            Some(item) => {
                item.is_completed = !item.is_completed;
                true
            }
            None => false,
        })
    }

    pub fn rename_checklist_item(
        &mut self,
        id: &str,
        item_id: &str,
        title: &str,
    ) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| match checklist_item_mut(t, item_id) {
            Some(item) => {
                item.title = title.to_string();
                true
            }
            None => false,
        })
    }

    pub fn remove_checklist_item(
        &mut self,
        id: &str,
        item_id: &str,
    ) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| {
            let Some(items) = t.checklist.as_mut() else {
                return false;
            };
            let before = items.len();
            items.retain(|i| i.id != item_id);
            items.len() != before
        })
    }

    /// Pin a task to a board position, or clear the pin with `None`.
    pub fn update_task_position(
        &mut self,
        id: &str,
        position: Option<Position>,
    ) -> Result<Option<Task>, StoreError> {
        self.modify(id, |t| {
            t.position = position;
            true
        })
    }

    /// Reparent a task. `None` makes it a root.
    pub fn move_task(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        new_order: i64,
    ) -> Result<Option<Task>, StoreError> {
        if !self.tasks.contains_key(id) {
            return Ok(None);
        }
        if let Some(parent) = new_parent {
            if !self.tasks.contains_key(parent) {
                let elsewhere = self.task_repo.get_all()?.into_iter().any(|t| t.id == parent);
                return Err(if elsewhere {
                    StoreError::CrossProject {
                        task: id.to_string(),
                        parent: parent.to_string(),
                    }
                } else {
                    StoreError::TaskNotFound(parent.to_string())
                });
            }
            if creates_cycle(&self.task_list(), id, parent) {
                return Err(StoreError::Cycle {
                    task: id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        let moved = self.modify(id, |t| {
            t.parent_id = new_parent.map(String::from);
            t.order = new_order;
            true
        })?;
        info!(
            "event=task_move module=store status=ok root={} order={}",
            new_parent.is_none(),
            new_order
        );
        Ok(moved)
    }

    /// Delete a task and its subtree. Returns the removed ids.
    pub fn delete_task(&mut self, id: &str) -> Result<Vec<String>, StoreError> {
        if !self.tasks.contains_key(id) {
            return Ok(Vec::new());
        }
        let removed = self.task_repo.delete(id)?;
        for gone in &removed {
            self.tasks.shift_remove(gone);
        }
        Ok(removed)
    }

    /// Deep-copy a task and its subtree with fresh ids. The copy lands
    /// after its siblings; a positioned source yields an offset copy.
    pub fn duplicate_task(&mut self, id: &str) -> Result<Option<Task>, StoreError> {
        let Some(source) = self.tasks.get(id) else {
            return Ok(None);
        };
        let order = next_order(
            self.tasks.values(),
            &source.project_id,
            source.parent_id.as_deref(),
        );
        let mut root = copy_task(source, source.parent_id.clone(), order);
        let offset = self.board.duplicate_offset;
        root.position = source.position.map(|p| p.offset(offset, offset));

        let list = self.task_list();
        let root_id = root.id.clone();
        let mut copies = vec![root];
        let mut seen = HashSet::from([id.to_string()]);
        copy_descendants(&list, id, &root_id, &mut copies, &mut seen);

        let created = self.task_repo.create_many(copies)?;
        info!(
            "event=task_duplicate module=store status=ok copied={}",
            created.len()
        );
        let root = created.first().cloned();
        for task in created {
            self.tasks.insert(task.id.clone(), task);
        }
        Ok(root)
    }

    /// Persist the given records (typically renumbered siblings).
    pub fn reorder_tasks(&mut self, tasks: &[Task]) -> Result<Vec<Task>, StoreError> {
        let stored = self.task_repo.update_many(tasks)?;
        for task in &stored {
            if self.tasks.contains_key(&task.id) {
                self.tasks.insert(task.id.clone(), task.clone());
            }
        }
        Ok(stored)
    }

    /// Swap a task with its previous (`delta < 0`) or next sibling and
    /// renumber the sibling list 0..n. Returns false when nothing moved.
    pub fn move_sibling(&mut self, id: &str, delta: i64) -> Result<bool, StoreError> {
        let Some(task) = self.tasks.get(id) else {
            return Ok(false);
        };
        let list = self.task_list();
        let mut siblings: Vec<Task> = children_of(&list, task.parent_id.as_deref())
            .into_iter()
            .cloned()
            .collect();
        let Some(pos) = siblings.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let target = pos as i64 + delta;
        if target < 0 || target >= siblings.len() as i64 {
            return Ok(false);
        }
        siblings.swap(pos, target as usize);
        for (i, sibling) in siblings.iter_mut().enumerate() {
            sibling.order = i as i64;
        }
        self.reorder_tasks(&siblings)?;
        Ok(true)
    }
}

fn checklist_item_mut<'a>(task: &'a mut Task, item_id: &str) -> Option<&'a mut ChecklistItem> {
    task.checklist
        .as_mut()?
        .iter_mut()
        .find(|i| i.id == item_id)
}

/// Fresh copy of `source` under `parent_id`: new ids, no position.
fn copy_task(source: &Task, parent_id: Option<String>, order: i64) -> Task {
    let mut copy = Task::new(&source.project_id, parent_id, &source.title, order);
    copy.is_completed = source.is_completed;
    copy.is_expanded = source.is_expanded;
    copy.checklist = source.checklist.as_ref().map(|items| {
        items
            .iter()
            .map(|item| ChecklistItem {
                id: new_id(),
                title: item.title.clone(),
                is_completed: item.is_completed,
            })
            .collect()
    });
    copy
}

fn copy_descendants(
    tasks: &[Task],
    source_id: &str,
    copy_id: &str,
    out: &mut Vec<Task>,
    seen: &mut HashSet<String>,
) {
    for child in children_of(tasks, Some(source_id)) {
        if !seen.insert(child.id.clone()) {
            continue;
        }
        let copy = copy_task(child, Some(copy_id.to_string()), child.order);
        let next_parent = copy.id.clone();
        out.push(copy);
        copy_descendants(tasks, &child.id, &next_parent, out, seen);
    }
}
