//! Store-level properties exercised through the public API: subtree
//! deletion, project cascade, tree ordering, duplication and persistence.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use tasktree::io::storage::{FileStore, MemoryStore, TASKS_KEY, read_collection};
use tasktree::model::{BoardConfig, Position, Task};
use tasktree::ops::store::AppStore;
use tasktree::ops::tree::{build_tree, collect_subtree_ids};

fn store(backing: &MemoryStore) -> AppStore<&MemoryStore> {
    let mut store = AppStore::new(backing, BoardConfig::default());
    store.load_projects().unwrap();
    store
}

/// Project with a three-level tree: a → (b → (c, d), e), f
fn seeded(store: &mut AppStore<&MemoryStore>) -> (String, Vec<String>) {
    let pid = store.add_project("P").unwrap().id;
    let a = store.add_task(&pid, None, "a").unwrap().id;
    let b = store.add_task(&pid, Some(&a), "b").unwrap().id;
    let c = store.add_task(&pid, Some(&b), "c").unwrap().id;
    let d = store.add_task(&pid, Some(&b), "d").unwrap().id;
    let e = store.add_task(&pid, Some(&a), "e").unwrap().id;
    let f = store.add_task(&pid, None, "f").unwrap().id;
    (pid, vec![a, b, c, d, e, f])
}

fn stored(backing: &MemoryStore) -> Vec<Task> {
    read_collection(backing, TASKS_KEY).unwrap()
}

#[test]
fn deleting_a_task_removes_all_descendants() {
    let backing = MemoryStore::new();
    let mut store = store(&backing);
    let (_, ids) = seeded(&mut store);

    let removed: HashSet<String> = store.delete_task(&ids[1]).unwrap().into_iter().collect();
    let expected: HashSet<String> = [&ids[1], &ids[2], &ids[3]].into_iter().cloned().collect();
    assert_eq!(removed, expected);

    let left: Vec<String> = stored(&backing).into_iter().map(|t| t.title).collect();
    assert_eq!(left, vec!["a", "e", "f"]);
}

#[test]
fn deleting_a_project_cascades_to_its_tasks_only() {
    let backing = MemoryStore::new();
    let mut store = store(&backing);
    let (pid, _) = seeded(&mut store);
    let other = store.add_project("Q").unwrap().id;
    store.add_task(&other, None, "keep").unwrap();

    assert!(store.delete_project(&pid).unwrap());
    let tasks = stored(&backing);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].project_id, other);
    assert!(store.project(&pid).is_none());
}

#[test]
fn tree_children_sorted_and_orphans_are_roots() {
    let mut tasks = vec![
        Task::new("p", None, "root", 0),
        Task::new("p", None, "orphan", 5),
    ];
    let root = tasks[0].id.clone();
    tasks[1].parent_id = Some("missing".into());
    for (title, order) in [("third", 9), ("first", -3), ("second", 2)] {
        tasks.push(Task::new("p", Some(root.clone()), title, order));
    }

    let forest = build_tree(&tasks);
    let roots: Vec<&str> = forest.iter().map(|n| n.task.title.as_str()).collect();
    assert_eq!(roots, vec!["root", "orphan"]);
    let kids: Vec<&str> = forest[0]
        .children
        .iter()
        .map(|n| n.task.title.as_str())
        .collect();
    assert_eq!(kids, vec!["first", "second", "third"]);
}

#[test]
fn duplicate_is_isomorphic_with_fresh_ids() {
    let backing = MemoryStore::new();
    let mut store = store(&backing);
    let (_, ids) = seeded(&mut store);
    store.add_checklist_item(&ids[2], "sub item").unwrap();
    let item = store.task(&ids[2]).unwrap().checklist_items()[0].id.clone();
    store.toggle_checklist_item(&ids[2], &item).unwrap();

    let copy = store.duplicate_task(&ids[1]).unwrap().unwrap();
    let tasks = store.task_list();
    let original = collect_subtree_ids(&tasks, &ids[1]);
    let copied = collect_subtree_ids(&tasks, &copy.id);
    assert_eq!(original.len(), copied.len());

    let shape = |root: &str| -> Vec<(String, Option<String>, Vec<(String, bool)>)> {
        let subtree: HashSet<String> = collect_subtree_ids(&tasks, root).into_iter().collect();
        let forest = build_tree(&tasks);
        let mut out = Vec::new();
        let mut stack: Vec<_> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            if subtree.contains(&node.task.id) {
                let parent_title = node
                    .task
                    .parent_id
                    .as_deref()
                    .filter(|_| node.task.id != root)
                    .and_then(|p| store.task(p))
                    .map(|p| p.title.clone());
                let items = node
                    .task
                    .checklist_items()
                    .iter()
                    .map(|i| (i.title.clone(), i.is_completed))
                    .collect();
                out.push((node.task.title.clone(), parent_title, items));
            }
            stack.extend(node.children.iter());
        }
        out.sort();
        out
    };
    assert_eq!(shape(&ids[1]), shape(&copy.id));

    let original_ids: HashSet<&String> = original.iter().collect();
    assert!(copied.iter().all(|id| !original_ids.contains(id)));
    let item_ids = |id: &str| -> Vec<String> {
        store
            .task(id)
            .unwrap()
            .checklist_items()
            .iter()
            .map(|i| i.id.clone())
            .collect()
    };
    let copied_c = tasks
        .iter()
        .find(|t| copied.contains(&t.id) && t.title == "c")
        .unwrap();
    assert_ne!(item_ids(&ids[2]), item_ids(&copied_c.id));
}

#[test]
fn records_survive_a_reload_from_disk() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut first = AppStore::new(FileStore::new(tmp.path()), BoardConfig::default());
    first.load_projects().unwrap();
    let pid = first.add_project("Trip").unwrap().id;
    let task = first.add_task(&pid, None, "Book").unwrap();
    first.update_task_position(&task.id, Some(Position::new(12.0, -4.5))).unwrap();
    first.add_checklist_item(&task.id, "flights").unwrap();
    first.toggle_expanded(&task.id).unwrap();
    let saved_project = first.project(&pid).unwrap().clone();
    let saved_task = first.task(&task.id).unwrap().clone();

    let mut second = AppStore::new(FileStore::new(tmp.path()), BoardConfig::default());
    second.load_projects().unwrap();
    second.load_tasks(&pid).unwrap();
    assert_eq!(second.project(&pid), Some(&saved_project));
    assert_eq!(second.task(&task.id), Some(&saved_task));
}
