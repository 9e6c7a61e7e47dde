use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::Direction;
use crate::ops::graph::{Gesture, apply_gesture};

use crate::tui::app::{App, ConfirmAction, EditTarget, Mode};

use super::search;

/// Cells scrolled per Shift+arrow
const PAN_X: i32 = 8;
const PAN_Y: i32 = 3;

/// A step through the tree relative to the selected node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Parent,
    Child,
    PrevSibling,
    NextSibling,
}

pub(super) fn handle_board(app: &mut App, key: KeyEvent) {
    if navigate(app, key) {
        return;
    }
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) | (KeyModifiers::NONE, KeyCode::Char('q')) => app.close_board(),
        (_, KeyCode::Char('?')) => app.show_help = true,

        // Nudge (pins the node)
        (_, KeyCode::Char('H')) => nudge(app, -1.0, 0.0),
        (_, KeyCode::Char('L')) => nudge(app, 1.0, 0.0),
        (_, KeyCode::Char('K')) => nudge(app, 0.0, -1.0),
        (_, KeyCode::Char('J')) => nudge(app, 0.0, 1.0),
        (KeyModifiers::NONE, KeyCode::Char('u')) => {
            if let Some(id) = app.selected_id() {
                app.mutate(|s| s.update_task_position(&id, None));
                app.scroll_to_selected();
            }
        }

        (KeyModifiers::NONE, KeyCode::Char('a')) => {
            let parent = app.selected_id();
            app.begin_edit(EditTarget::NewTask { parent }, "");
        }
        (_, KeyCode::Char('A')) => app.begin_edit(EditTarget::NewTask { parent: None }, ""),
        (KeyModifiers::NONE, KeyCode::Char('e')) | (_, KeyCode::F(2)) => {
            if let Some(node) = app.selected_node() {
                let (id, title) = (node.id.clone(), node.title.clone());
                app.begin_edit(EditTarget::RenameTask { id }, &title);
            }
        }
        (KeyModifiers::NONE, KeyCode::Char(' ')) => {
            if let Some(id) = app.selected_id() {
                app.mutate(|s| s.toggle_completed(&id));
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('z')) => {
            if let Some(id) = app.selected_id() {
                app.mutate(|s| s.toggle_expanded(&id));
            }
        }
        (_, KeyCode::Char('D')) => {
            if let Some(id) = app.selected_id()
                && let Some(Some(copy)) = app.mutate(|s| s.duplicate_task(&id))
            {
                app.select(&copy.id);
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('x')) | (_, KeyCode::Delete) => {
            if let Some(id) = app.selected_id() {
                app.begin_confirm(ConfirmAction::DeleteTask { id });
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('m')) => {
            if let Some(id) = app.selected_id() {
                app.move_source = Some(id);
                app.mode = Mode::Move;
            }
        }
        (_, KeyCode::Char('[')) => shift_sibling(app, -1),
        (_, KeyCode::Char(']')) => shift_sibling(app, 1),
        (KeyModifiers::NONE, KeyCode::Char('c')) => {
            if app.selected_id().is_some() {
                app.checklist_cursor = 0;
                app.mode = Mode::Checklist;
            }
        }
        (_, KeyCode::Char('/')) => {
            app.search_input.clear();
            app.mode = Mode::Search;
        }
        (KeyModifiers::NONE, KeyCode::Char('n')) => search::next_hit(app),
        _ => {}
    }
}

/// Keys shared by the board and move mode: walking the tree, panning and
/// recentering. Returns true when the key was consumed.
pub(super) fn navigate(app: &mut App, key: KeyEvent) -> bool {
    let lr = app.config.layout.direction == Direction::LeftRight;
    let step = match (key.modifiers, key.code) {
        (KeyModifiers::SHIFT, KeyCode::Left) => {
            app.pan(-PAN_X, 0);
            return true;
        }
        (KeyModifiers::SHIFT, KeyCode::Right) => {
            app.pan(PAN_X, 0);
            return true;
        }
        (KeyModifiers::SHIFT, KeyCode::Up) => {
            app.pan(0, -PAN_Y);
            return true;
        }
        (KeyModifiers::SHIFT, KeyCode::Down) => {
            app.pan(0, PAN_Y);
            return true;
        }
        (KeyModifiers::NONE, KeyCode::Char('.')) => {
            app.center_on_selected();
            return true;
        }
        (KeyModifiers::NONE, KeyCode::Char('h') | KeyCode::Left) => {
            if lr { Step::Parent } else { Step::PrevSibling }
        }
        (KeyModifiers::NONE, KeyCode::Char('l') | KeyCode::Right) => {
            if lr { Step::Child } else { Step::NextSibling }
        }
        (KeyModifiers::NONE, KeyCode::Char('k') | KeyCode::Up) => {
            if lr { Step::PrevSibling } else { Step::Parent }
        }
        (KeyModifiers::NONE, KeyCode::Char('j') | KeyCode::Down) => {
            if lr { Step::NextSibling } else { Step::Child }
        }
        _ => return false,
    };
    walk(app, step);
    true
}

fn walk(app: &mut App, step: Step) {
    let Some(id) = app.selected_id() else {
        // Empty selection on a non-empty board: start at the first node
        let first = app.graph.nodes().next().map(|n| n.id.clone());
        if let Some(first) = first {
            app.select(&first);
        }
        return;
    };

    if step == Step::Child
        && app.selected_node().is_some_and(|n| n.hidden > 0)
    {
        app.mutate(|s| s.set_expanded(&id, true));
    }

    let target = match step {
        Step::Parent => app.graph.parent(&id).map(|n| n.id.clone()),
        Step::Child => app.graph.children(&id).first().map(|n| n.id.clone()),
        Step::PrevSibling | Step::NextSibling => {
            let siblings = app.graph.siblings(&id);
            let pos = siblings.iter().position(|n| n.id == id);
            let next = match (step, pos) {
                (Step::PrevSibling, Some(i)) => i.checked_sub(1),
                (_, Some(i)) => Some(i + 1),
                (_, None) => None,
            };
            next.and_then(|i| siblings.get(i)).map(|n| n.id.clone())
        }
    };
    if let Some(target) = target {
        app.select(&target);
    }
}

/// Move the selected node by one nudge step per axis unit and pin it.
fn nudge(app: &mut App, dx: f64, dy: f64) {
    let step = app.config.board.nudge_step;
    let Some(node) = app.selected_node() else {
        return;
    };
    let gesture = Gesture::DragEnd {
        id: node.id.clone(),
        position: node.position.offset(dx * step, dy * step),
    };
    app.mutate(|s| apply_gesture(s, gesture));
    app.scroll_to_selected();
}

fn shift_sibling(app: &mut App, delta: i64) {
    let Some(id) = app.selected_id() else {
        return;
    };
    if app.mutate(|s| s.move_sibling(&id, delta)) == Some(false) {
        app.status = Some(if delta < 0 {
            "already the first sibling".into()
        } else {
            "already the last sibling".into()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::press;
    use super::*;
    use crate::model::Position;
    use crate::tui::app::View;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    fn selected_title(app: &App) -> String {
        app.selected_node().map(|n| n.title.clone()).unwrap_or_default()
    }

    fn tree() -> (tempfile::TempDir, App) {
        board_app(&[
            ("Root", None),
            ("A", Some(0)),
            ("B", Some(0)),
            ("A1", Some(1)),
            ("Other", None),
        ])
    }

    #[test]
    fn walks_the_tree_left_to_right() {
        let (_tmp, mut app) = tree();
        assert_eq!(selected_title(&app), "Root");
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(selected_title(&app), "A");
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(selected_title(&app), "B");
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(selected_title(&app), "B");
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Right);
        assert_eq!(selected_title(&app), "A1");
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(selected_title(&app), "Root");
        press(&mut app, KeyCode::Down);
        assert_eq!(selected_title(&app), "Other");
    }

    #[test]
    fn walk_without_selection_starts_at_first_node() {
        let (_tmp, mut app) = tree();
        app.board.selected = None;
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(selected_title(&app), "Root");
    }

    #[test]
    fn top_bottom_swaps_axes() {
        let (_tmp, mut app) = tree();
        app.config.layout.direction = Direction::TopBottom;
        app.refresh_graph();
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(selected_title(&app), "A");
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(selected_title(&app), "B");
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(selected_title(&app), "Root");
    }

    #[test]
    fn stepping_into_collapsed_node_expands_it() {
        let (_tmp, mut app) = tree();
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(node_titles(&app), vec!["Root", "Other"]);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(selected_title(&app), "A");
        assert_eq!(node_titles(&app), vec!["Root", "A", "A1", "B", "Other"]);
    }

    #[test]
    fn nudge_pins_and_unpin_clears() {
        let (_tmp, mut app) = tree();
        let before = app.selected_node().unwrap().position;
        let step = app.config.board.nudge_step;
        press(&mut app, KeyCode::Char('L'));
        press(&mut app, KeyCode::Char('J'));
        let node = app.selected_node().unwrap();
        assert!(node.pinned);
        assert_eq!(node.position, Position::new(before.x + step, before.y + step));

        press(&mut app, KeyCode::Char('u'));
        let node = app.selected_node().unwrap();
        assert!(!node.pinned);
        assert_eq!(node.position, before);
    }

    #[test]
    fn toggle_duplicate_and_reorder() {
        let (_tmp, mut app) = tree();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.selected_node().unwrap().is_completed);

        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('D'));
        assert_eq!(selected_title(&app), "A");
        assert_eq!(
            node_titles(&app),
            vec!["Root", "A", "A1", "B", "A", "A1", "Other"]
        );

        press(&mut app, KeyCode::Char('['));
        let kids: Vec<String> = app
            .graph
            .children(&app.graph.nodes().next().unwrap().id)
            .iter()
            .map(|n| n.title.clone())
            .collect();
        assert_eq!(kids, vec!["A", "A", "B"]);

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.status.as_deref(), Some("already the first sibling"));
    }

    #[test]
    fn add_root_and_subtask() {
        let (_tmp, mut app) = board_app(&[]);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.edit_target, Some(EditTarget::NewTask { parent: None }));
        for c in "Plan".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('a'));
        for c in "Step".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(node_titles(&app), vec!["Plan", "Step"]);
        assert_eq!(selected_title(&app), "Step");
    }

    #[test]
    fn pan_and_escape() {
        let (_tmp, mut app) = tree();
        let x = app.board.offset_x;
        super::super::handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT),
        );
        assert_eq!(app.board.offset_x, x + PAN_X as f64 * crate::tui::app::CELL_W);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view, View::Projects);
    }
}
