use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::model::Task;
use crate::ops::tree::{build_tree, flatten};

/// Which part of a task matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Title,
    /// A checklist item title
    Checklist,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub task_id: String,
    /// Title of the task the hit belongs to
    pub title: String,
    pub field: MatchField,
    /// The text that matched (task title or checklist item title)
    pub text: String,
}

/// Compile a case-insensitive search pattern. A pattern that is not a
/// valid regex is matched literally.
pub fn build_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
}

/// Search task titles and checklist item titles. Hits come back in tree
/// order (collapsed subtrees included), title before checklist.
pub fn search_tasks(tasks: &[Task], pattern: &str) -> Result<Vec<SearchHit>, regex::Error> {
    let re = build_regex(pattern)?;
    let forest = build_tree(tasks);
    let mut hits = Vec::new();

    for node in flatten(&forest, false) {
        let task = node.task;
        if re.is_match(&task.title) {
            hits.push(hit(task, MatchField::Title, &task.title));
        }
        for item in task.checklist_items() {
            if re.is_match(&item.title) {
                hits.push(hit(task, MatchField::Checklist, &item.title));
            }
        }
    }
    Ok(hits)
}

fn hit(task: &Task, field: MatchField, text: &str) -> SearchHit {
    SearchHit {
        task_id: task.id.clone(),
        title: task.title.clone(),
        field,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChecklistItem;
    use pretty_assertions::assert_eq;

    fn task(id: &str, parent: Option<&str>, order: i64, title: &str) -> Task {
        let mut t = Task::new("p", parent.map(String::from), title, order);
        t.id = id.to_string();
        t
    }

    fn sample() -> Vec<Task> {
        let mut deploy = task("d", Some("r"), 1, "Deploy staging");
        deploy.is_expanded = false;
        let mut review = task("v", Some("r"), 0, "Review PR");
        review.checklist = Some(vec![ChecklistItem::new("run deploy script")]);
        vec![
            task("r", None, 0, "Release 1.2"),
            deploy,
            task("x", Some("d"), 0, "Deploy prod"),
            review,
        ]
    }

    #[test]
    fn case_insensitive_in_tree_order() {
        let hits = search_tasks(&sample(), "DEPLOY").unwrap();
        let got: Vec<(&str, MatchField)> =
            hits.iter().map(|h| (h.task_id.as_str(), h.field)).collect();
        assert_eq!(
            got,
            vec![
                ("v", MatchField::Checklist),
                ("d", MatchField::Title),
                ("x", MatchField::Title),
            ]
        );
        assert_eq!(hits[0].text, "run deploy script");
        assert_eq!(hits[0].title, "Review PR");
    }

    #[test]
    fn regex_patterns() {
        let hits = search_tasks(&sample(), r"^deploy (staging|prod)$").unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn invalid_regex_matches_literally() {
        let mut tasks = sample();
        tasks.push(task("z", None, 1, "fix (parser"));
        let hits = search_tasks(&tasks, "(parser").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].task_id, "z");
    }

    #[test]
    fn no_hits() {
        assert!(search_tasks(&sample(), "nothing here").unwrap().is_empty());
    }
}
