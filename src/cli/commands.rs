use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tt", about = concat!("tasktree v", env!("CARGO_PKG_VERSION"), " - nested tasks on a board"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory (default: $TASKTREE_DATA_DIR, then the XDG data dir)
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects
    Projects,
    /// Add, rename or remove a project
    #[command(subcommand)]
    Project(ProjectCmd),
    /// Show a project's task tree
    Tree(TreeArgs),
    /// Add a task
    Add(AddArgs),
    /// Change a task's title
    Title(TitleArgs),
    /// Toggle a task's completion
    Done(TaskRef),
    /// Toggle whether a task's children are shown on the board
    Fold(TaskRef),
    /// Reparent a task
    Mv(MvArgs),
    /// Delete a task and its subtasks
    Rm(TaskRef),
    /// Duplicate a task and its subtasks
    Dup(TaskRef),
    /// Pin a task to a board position, or clear the pin
    Pos(PosArgs),
    /// Move a task up or down among its siblings
    Reorder(ReorderArgs),
    /// Edit a task's checklist
    #[command(subcommand)]
    Check(CheckCmd),
    /// Show the computed board layout
    Layout(ProjectRef),
    /// Search task and checklist titles by regex
    Search(SearchArgs),
    /// Read or change config.toml
    #[command(subcommand)]
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ProjectCmd {
    /// Create a project
    Add {
        title: String,
    },
    /// Rename a project
    Rename {
        /// Project id or id prefix
        project: String,
        title: String,
    },
    /// Delete a project and all of its tasks
    Rm {
        /// Project id or id prefix
        project: String,
    },
}

#[derive(Args)]
pub struct ProjectRef {
    /// Project id or id prefix
    pub project: String,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Project id or id prefix
    pub project: String,
    /// Also list children of collapsed tasks
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskRef {
    /// Task id or id prefix
    pub task: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Project id or id prefix
    pub project: String,
    pub title: String,
    /// Parent task (default: a new root task)
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Task id or id prefix
    pub task: String,
    pub title: String,
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["parent", "root"])))]
pub struct MvArgs {
    /// Task id or id prefix
    pub task: String,
    /// New parent task
    #[arg(long)]
    pub parent: Option<String>,
    /// Make the task a root
    #[arg(long)]
    pub root: bool,
    /// Sibling order under the new parent (default: after the last sibling)
    #[arg(long, allow_negative_numbers = true)]
    pub order: Option<i64>,
}

#[derive(Args)]
pub struct PosArgs {
    /// Task id or id prefix
    pub task: String,
    #[arg(allow_negative_numbers = true, required_unless_present = "clear")]
    pub x: Option<f64>,
    #[arg(allow_negative_numbers = true, required_unless_present = "clear")]
    pub y: Option<f64>,
    /// Return the task to automatic layout
    #[arg(long, conflicts_with_all = ["x", "y"])]
    pub clear: bool,
}

#[derive(Args)]
#[command(group(ArgGroup::new("direction").required(true).args(["up", "down"])))]
pub struct ReorderArgs {
    /// Task id or id prefix
    pub task: String,
    #[arg(long)]
    pub up: bool,
    #[arg(long)]
    pub down: bool,
}

#[derive(Subcommand)]
pub enum CheckCmd {
    /// Append a checklist item
    Add {
        /// Task id or id prefix
        task: String,
        title: String,
    },
    /// Toggle a checklist item
    Toggle {
        /// Task id or id prefix
        task: String,
        /// Item id, id prefix, or 1-based position
        item: String,
    },
    /// Remove a checklist item
    Rm {
        /// Task id or id prefix
        task: String,
        /// Item id, id prefix, or 1-based position
        item: String,
    },
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex (case-insensitive; matched literally if invalid)
    pub pattern: String,
    /// Limit to one project
    #[arg(long)]
    pub project: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print a value, e.g. `layout.direction`
    Get { key: String },
    /// Set a value, e.g. `layout.direction TB`
    Set { key: String, value: String },
}
