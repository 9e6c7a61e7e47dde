mod resolve;
pub use resolve::{MIN_PREFIX_LEN, RefError, resolve_item, resolve_project, resolve_task};

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::paths::resolve_data_dir;
use crate::io::storage::FileStore;
use crate::model::{Config, Position, Project, Task};
use crate::ops::graph::GraphView;
use crate::ops::search::search_tasks;
use crate::ops::store::AppStore;
use crate::ops::tree::{build_tree, next_order};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs: the resolved data directory, the effective
/// config and a store with the project list loaded.
struct Ctx {
    data_dir: PathBuf,
    config: Config,
    store: AppStore<FileStore>,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let Some(command) = cli.command else {
        return Err("no command given (run `tt` without arguments for the board)".into());
    };
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let config = config_io::load_config(&data_dir)?;
    let mut store = AppStore::new(FileStore::new(&data_dir), config.board.clone());
    store.load_projects()?;
    let mut ctx = Ctx {
        data_dir,
        config,
        store,
        json: cli.json,
    };

    match command {
        // Read commands
        Commands::Projects => cmd_projects(&ctx),
        Commands::Tree(args) => cmd_tree(&mut ctx, args),
        Commands::Layout(args) => cmd_layout(&mut ctx, args),
        Commands::Search(args) => cmd_search(&ctx, args),

        // Write commands
        Commands::Project(cmd) => cmd_project(&mut ctx, cmd),
        Commands::Add(args) => cmd_add(&mut ctx, args),
        Commands::Title(args) => cmd_title(&mut ctx, args),
        Commands::Done(args) => cmd_done(&mut ctx, args),
        Commands::Fold(args) => cmd_fold(&mut ctx, args),
        Commands::Mv(args) => cmd_mv(&mut ctx, args),
        Commands::Rm(args) => cmd_rm(&mut ctx, args),
        Commands::Dup(args) => cmd_dup(&mut ctx, args),
        Commands::Pos(args) => cmd_pos(&mut ctx, args),
        Commands::Reorder(args) => cmd_reorder(&mut ctx, args),
        Commands::Check(cmd) => cmd_check(&mut ctx, cmd),
        Commands::Config(cmd) => cmd_config(&ctx, cmd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn find_project(ctx: &Ctx, reference: &str) -> Result<Project, RefError> {
    resolve_project(ctx.store.projects(), reference).cloned()
}

/// Resolve a task across all projects and load its project.
fn open_task(ctx: &mut Ctx, reference: &str) -> Result<Task, Box<dyn std::error::Error>> {
    let all = ctx.store.all_tasks()?;
    let task = resolve_task(&all, reference)?.clone();
    ctx.store.load_tasks(&task.project_id)?;
    Ok(task)
}

/// Print a task that a write command produced: JSON with `--json`,
/// otherwise nothing.
fn report_task(ctx: &Ctx, task: Option<&Task>) -> CmdResult {
    if ctx.json
        && let Some(task) = task
    {
        print_json(task)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_projects(ctx: &Ctx) -> CmdResult {
    let counts = ctx.store.task_counts()?;
    let count = |p: &Project| counts.get(&p.id).copied().unwrap_or(0);

    if ctx.json {
        let out: Vec<ProjectJson> = ctx
            .store
            .projects()
            .iter()
            .map(|project| ProjectJson {
                project,
                task_count: count(project),
            })
            .collect();
        return print_json(&out);
    }

    for project in ctx.store.projects() {
        println!("{}", format_project_line(project, count(project)));
    }
    Ok(())
}

fn cmd_tree(ctx: &mut Ctx, args: TreeArgs) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    ctx.store.load_tasks(&project.id)?;
    let tasks = ctx.store.task_list();
    let forest = build_tree(&tasks);

    if ctx.json {
        let out: Vec<TreeJson> = forest.iter().map(|n| tree_to_json(n, args.all)).collect();
        return print_json(&out);
    }
    for line in format_tree(&forest, args.all) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_layout(ctx: &mut Ctx, args: ProjectRef) -> CmdResult {
    let project = find_project(ctx, &args.project)?;
    ctx.store.load_tasks(&project.id)?;
    let view = GraphView::build(&ctx.store.task_list(), &ctx.config.layout);

    if ctx.json {
        return print_json(&layout_to_json(&view));
    }
    for line in format_layout(&view) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_search(ctx: &Ctx, args: SearchArgs) -> CmdResult {
    let projects: Vec<Project> = match &args.project {
        Some(reference) => vec![find_project(ctx, reference)?],
        None => ctx.store.projects().to_vec(),
    };
    let all = ctx.store.all_tasks()?;

    let mut results = Vec::new();
    for project in &projects {
        let tasks: Vec<Task> = all
            .iter()
            .filter(|t| t.project_id == project.id)
            .cloned()
            .collect();
        let hits = search_tasks(&tasks, &args.pattern)?;
        if !hits.is_empty() {
            results.push((project, hits));
        }
    }

    if ctx.json {
        let out: Vec<SearchHitJson> = results
            .iter()
            .flat_map(|(project, hits)| {
                hits.iter().map(|hit| SearchHitJson {
                    project_id: &project.id,
                    hit,
                })
            })
            .collect();
        return print_json(&out);
    }
    for (project, hits) in &results {
        for hit in hits {
            println!("{}", format_search_hit(&project.title, hit));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project(ctx: &mut Ctx, cmd: ProjectCmd) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    match cmd {
        ProjectCmd::Add { title } => {
            let project = ctx.store.add_project(&title)?;
            if ctx.json {
                return print_json(&project);
            }
            println!("{}", project.id);
        }
        ProjectCmd::Rename { project, title } => {
            let project = find_project(ctx, &project)?;
            let renamed = ctx.store.rename_project(&project.id, &title)?;
            if ctx.json
                && let Some(renamed) = renamed
            {
                print_json(&renamed)?;
            }
        }
        ProjectCmd::Rm { project } => {
            let project = find_project(ctx, &project)?;
            ctx.store.delete_project(&project.id)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Ctx, args: AddArgs) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let project = find_project(ctx, &args.project)?;
    let parent = match &args.parent {
        Some(reference) => {
            let parent = open_task(ctx, reference)?;
            if parent.project_id != project.id {
                return Err(format!(
                    "parent {} belongs to another project",
                    short_id(&parent.id)
                )
                .into());
            }
            Some(parent.id)
        }
        None => None,
    };
    let task = ctx.store.add_task(&project.id, parent.as_deref(), &args.title)?;
    if ctx.json {
        return print_json(&task);
    }
    println!("{}", task.id);
    Ok(())
}

fn cmd_title(ctx: &mut Ctx, args: TitleArgs) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let updated = ctx.store.rename_task(&task.id, &args.title)?;
    report_task(ctx, updated.as_ref())
}

fn cmd_done(ctx: &mut Ctx, args: TaskRef) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let updated = ctx.store.toggle_completed(&task.id)?;
    report_task(ctx, updated.as_ref())
}

fn cmd_fold(ctx: &mut Ctx, args: TaskRef) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let updated = ctx.store.toggle_expanded(&task.id)?;
    report_task(ctx, updated.as_ref())
}

fn cmd_mv(ctx: &mut Ctx, args: MvArgs) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let parent = match &args.parent {
        Some(reference) => {
            let all = ctx.store.all_tasks()?;
            Some(resolve_task(&all, reference)?.id.clone())
        }
        None => None,
    };
    let task = open_task(ctx, &args.task)?;
    let order = args.order.unwrap_or_else(|| {
        next_order(ctx.store.tasks(), &task.project_id, parent.as_deref())
    });
    let moved = ctx.store.move_task(&task.id, parent.as_deref(), order)?;
    report_task(ctx, moved.as_ref())
}

fn cmd_rm(ctx: &mut Ctx, args: TaskRef) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let removed = ctx.store.delete_task(&task.id)?;
    if ctx.json {
        return print_json(&removed);
    }
    Ok(())
}

fn cmd_dup(ctx: &mut Ctx, args: TaskRef) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let Some(copy) = ctx.store.duplicate_task(&task.id)? else {
        return Err(format!("task not found: {}", args.task).into());
    };
    if ctx.json {
        return print_json(&copy);
    }
    println!("{}", copy.id);
    Ok(())
}

fn cmd_pos(ctx: &mut Ctx, args: PosArgs) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let position = match (args.clear, args.x, args.y) {
        (true, _, _) => None,
        (false, Some(x), Some(y)) => Some(Position::new(x, y)),
        _ => return Err("pos needs both <x> and <y>, or --clear".into()),
    };
    let updated = ctx.store.update_task_position(&task.id, position)?;
    report_task(ctx, updated.as_ref())
}

fn cmd_reorder(ctx: &mut Ctx, args: ReorderArgs) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    let task = open_task(ctx, &args.task)?;
    let delta = if args.up { -1 } else { 1 };
    if !ctx.store.move_sibling(&task.id, delta)? {
        let edge = if args.up { "first" } else { "last" };
        eprintln!("{} is already the {} sibling", short_id(&task.id), edge);
    }
    report_task(ctx, ctx.store.task(&task.id))
}

fn cmd_check(ctx: &mut Ctx, cmd: CheckCmd) -> CmdResult {
    let _lock = FileLock::acquire_default(&ctx.data_dir)?;
    match cmd {
        CheckCmd::Add { task, title } => {
            let task = open_task(ctx, &task)?;
            let updated = ctx.store.add_checklist_item(&task.id, &title)?;
            if ctx.json {
                return report_task(ctx, updated.as_ref());
            }
            if let Some(item) = updated.as_ref().and_then(|t| t.checklist_items().last()) {
                println!("{}", item.id);
            }
        }
        CheckCmd::Toggle { task, item } => {
            let task = open_task(ctx, &task)?;
            let item = resolve_item(task.checklist_items(), &item)?.id.clone();
            let updated = ctx.store.toggle_checklist_item(&task.id, &item)?;
            report_task(ctx, updated.as_ref())?;
        }
        CheckCmd::Rm { task, item } => {
            let task = open_task(ctx, &task)?;
            let item = resolve_item(task.checklist_items(), &item)?.id.clone();
            let updated = ctx.store.remove_checklist_item(&task.id, &item)?;
            report_task(ctx, updated.as_ref())?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(ctx: &Ctx, cmd: ConfigCmd) -> CmdResult {
    match cmd {
        ConfigCmd::Get { key } => {
            let value = config_io::get_value(&ctx.config, &key)?;
            if ctx.json {
                return print_json(&serde_json::json!({ "key": key, "value": value }));
            }
            println!("{}", value);
        }
        ConfigCmd::Set { key, value } => {
            let _lock = FileLock::acquire_default(&ctx.data_dir)?;
            let (_, mut doc) = config_io::read_config(&ctx.data_dir)?;
            config_io::set_value(&mut doc, &key, &value)?;
            config_io::write_config(&ctx.data_dir, &doc)?;
            log::info!("event=config_set module=cli status=ok key={}", key);
        }
    }
    Ok(())
}
