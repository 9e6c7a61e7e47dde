//! Id-or-prefix references on the command line.

use crate::model::{ChecklistItem, Project, Task};

/// Shortest prefix accepted in place of a full id
pub const MIN_PREFIX_LEN: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RefError {
    #[error("{kind} not found: {reference}")]
    NotFound { kind: &'static str, reference: String },
    #[error("{kind} reference '{reference}' is ambiguous ({count} matches)")]
    Ambiguous {
        kind: &'static str,
        reference: String,
        count: usize,
    },
    #[error("{kind} prefix '{reference}' is too short (at least {MIN_PREFIX_LEN} characters)")]
    TooShort { kind: &'static str, reference: String },
}

/// Index of the id matching `reference`: an exact id, or a unique prefix
/// of at least `MIN_PREFIX_LEN` characters.
fn resolve_index<'a>(
    ids: impl Iterator<Item = &'a str> + Clone,
    reference: &str,
    kind: &'static str,
) -> Result<usize, RefError> {
    if let Some(i) = ids.clone().position(|id| id == reference) {
        return Ok(i);
    }
    if reference.chars().count() < MIN_PREFIX_LEN {
        return Err(RefError::TooShort {
            kind,
            reference: reference.to_string(),
        });
    }
    let matches: Vec<usize> = ids
        .enumerate()
        .filter(|(_, id)| id.starts_with(reference))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(RefError::NotFound {
            kind,
            reference: reference.to_string(),
        }),
        many => Err(RefError::Ambiguous {
            kind,
            reference: reference.to_string(),
            count: many.len(),
        }),
    }
}

pub fn resolve_project<'a>(projects: &'a [Project], reference: &str) -> Result<&'a Project, RefError> {
    let i = resolve_index(projects.iter().map(|p| p.id.as_str()), reference, "project")?;
    Ok(&projects[i])
}

pub fn resolve_task<'a>(tasks: &'a [Task], reference: &str) -> Result<&'a Task, RefError> {
    let i = resolve_index(tasks.iter().map(|t| t.id.as_str()), reference, "task")?;
    Ok(&tasks[i])
}

/// A checklist item by id, id prefix, or 1-based position
pub fn resolve_item<'a>(
    items: &'a [ChecklistItem],
    reference: &str,
) -> Result<&'a ChecklistItem, RefError> {
    if let Ok(n) = reference.parse::<usize>()
        && (1..=items.len()).contains(&n)
    {
        return Ok(&items[n - 1]);
    }
    let i = resolve_index(items.iter().map(|i| i.id.as_str()), reference, "checklist item")?;
    Ok(&items[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tasks(ids: &[&str]) -> Vec<Task> {
        ids.iter()
            .map(|id| {
                let mut t = Task::new("p", None, *id, 0);
                t.id = id.to_string();
                t
            })
            .collect()
    }

    #[test]
    fn exact_and_prefix_matches() {
        let list = tasks(&["abcd1234", "abce5678", "ff"]);
        assert_eq!(resolve_task(&list, "abcd").unwrap().id, "abcd1234");
        assert_eq!(resolve_task(&list, "ff").unwrap().id, "ff");
        assert_eq!(resolve_task(&list, "abce5678").unwrap().id, "abce5678");
    }

    #[test]
    fn failures() {
        let list = tasks(&["abcd1234", "abcd5678"]);
        assert!(matches!(
            resolve_task(&list, "abcd"),
            Err(RefError::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(
            resolve_task(&list, "abc"),
            Err(RefError::TooShort { .. })
        ));
        assert!(matches!(
            resolve_task(&list, "zzzz"),
            Err(RefError::NotFound { .. })
        ));
    }

    #[test]
    fn checklist_items_by_position() {
        let items = vec![ChecklistItem::new("one"), ChecklistItem::new("two")];
        assert_eq!(resolve_item(&items, "2").unwrap().title, "two");
        let prefix: String = items[0].id.chars().take(8).collect();
        assert_eq!(resolve_item(&items, &prefix).unwrap().title, "one");
        assert!(resolve_item(&items, "3").is_err());
    }
}
