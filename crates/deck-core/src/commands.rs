use anyhow::anyhow;
use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use crate::auth;
use crate::cli::DeckCommand;
use crate::kvstore::THEME_KEY;
use crate::render::Renderer;
use crate::store::TaskStore;
use crate::sync::RemoteSync;
use crate::task::{Priority, TaskDraft, TaskPatch};
use crate::views;

#[instrument(skip_all)]
pub fn dispatch(
    store: &mut TaskStore,
    remote: Option<&dyn RemoteSync>,
    renderer: &mut Renderer,
    command: DeckCommand,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();

    match command {
        DeckCommand::Add {
            title,
            date,
            description,
            time,
            category,
            priority,
        } => cmd_add(store, title, date, description, time, category, priority),
        DeckCommand::Edit {
            id,
            title,
            description,
            date,
            time,
            category,
            priority,
        } => cmd_edit(store, id, title, description, date, time, category, priority),
        DeckCommand::Show { id } => cmd_show(store, renderer, id),
        DeckCommand::Done { id } => cmd_done(store, id),
        DeckCommand::Percent { id, value } => cmd_percent(store, id, &value),
        DeckCommand::Delete { id } => cmd_delete(store, id),
        DeckCommand::List => cmd_list(store, renderer, today),
        DeckCommand::Summary => cmd_summary(store, renderer, today),
        DeckCommand::Breakdown => cmd_breakdown(store, renderer),
        DeckCommand::Week => cmd_week(store, renderer),
        DeckCommand::Calendar => cmd_calendar(store, renderer),
        DeckCommand::Export => cmd_export(store),
        DeckCommand::Theme { value } => cmd_theme(store, value.as_deref()),
        DeckCommand::Signup {
            username,
            email,
            password,
        } => cmd_signup(store, remote, &username, &email, &password),
        DeckCommand::Login { email, password } => cmd_login(store, &email, &password),
        DeckCommand::Logout => cmd_logout(store),
        DeckCommand::Whoami => cmd_whoami(store),
    }
}

#[instrument(skip_all, fields(title_len = title.len()))]
fn cmd_add(
    store: &mut TaskStore,
    title: String,
    date: String,
    description: String,
    time: String,
    category: String,
    priority: Priority,
) -> anyhow::Result<()> {
    info!("command add");

    let task = store.create(TaskDraft {
        title,
        description,
        date,
        time,
        category,
        priority,
    })?;

    println!("Created task {}.", task.id);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip(store, title, description, date, time, category, priority))]
fn cmd_edit(
    store: &mut TaskStore,
    id: u64,
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    time: Option<String>,
    category: Option<String>,
    priority: Option<Priority>,
) -> anyhow::Result<()> {
    info!("command edit");

    let task = store.update(
        id,
        TaskPatch {
            title,
            description,
            date,
            time,
            category,
            priority,
        },
    )?;

    println!("Modified task {}.", task.id);
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_show(store: &TaskStore, renderer: &mut Renderer, id: u64) -> anyhow::Result<()> {
    info!("command show");

    let task = store
        .find_by_id(id)
        .ok_or_else(|| anyhow!("no task with id {id}"))?;
    renderer.print_task_detail(task)?;
    Ok(())
}

#[instrument(skip(store))]
fn cmd_done(store: &mut TaskStore, id: u64) -> anyhow::Result<()> {
    info!("command done");

    let task = store.toggle_status(id)?;
    println!("Task {} is now {}.", task.id, task.status.label().to_lowercase());
    Ok(())
}

#[instrument(skip(store, value))]
fn cmd_percent(store: &mut TaskStore, id: u64, value: &str) -> anyhow::Result<()> {
    info!("command percent");

    // Non-numeric input counts as 0.
    let raw = value.trim().parse::<i64>().unwrap_or(0);
    let task = store.set_percent(id, raw)?;
    println!("Task {} at {}%.", task.id, task.effective_percent());
    Ok(())
}

#[instrument(skip(store))]
fn cmd_delete(store: &mut TaskStore, id: u64) -> anyhow::Result<()> {
    info!("command delete");

    if store.delete(id) {
        println!("Deleted task {id}.");
    } else {
        println!("No task {id}; nothing deleted.");
    }
    Ok(())
}

#[instrument(skip(store, renderer, today))]
fn cmd_list(store: &TaskStore, renderer: &mut Renderer, today: NaiveDate) -> anyhow::Result<()> {
    info!("command list");

    renderer.print_task_table(store.list(), today)?;
    Ok(())
}

#[instrument(skip(store, renderer, today))]
fn cmd_summary(store: &TaskStore, renderer: &mut Renderer, today: NaiveDate) -> anyhow::Result<()> {
    info!("command summary");

    let tasks = store.list();
    let counts = views::counts_by_status(tasks);
    let due_today = views::due_today_count(tasks, today);
    let completion = views::completion_percentage(tasks);

    renderer.print_summary(&counts, due_today, completion)?;
    if !store.persistence_available() {
        eprintln!("warning: changes are not being saved (storage unavailable)");
    }
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_breakdown(store: &TaskStore, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command breakdown");

    let tasks = store.list();
    renderer.print_breakdown(
        &views::counts_by_category(tasks),
        &views::counts_by_priority(tasks),
        &views::counts_by_status(tasks),
    )?;
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_week(store: &TaskStore, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command week");

    let histogram = views::weekly_distribution(store.list());
    renderer.print_week(&histogram)?;
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_calendar(store: &TaskStore, renderer: &mut Renderer) -> anyhow::Result<()> {
    info!("command calendar");

    let grouped: Vec<_> = views::group_by_date(store.list()).into_iter().collect();
    renderer.print_calendar(&grouped)?;
    Ok(())
}

#[instrument(skip(store))]
fn cmd_export(store: &TaskStore) -> anyhow::Result<()> {
    info!("command export");

    println!("{}", serde_json::to_string_pretty(store.list())?);
    Ok(())
}

#[instrument(skip(store, value))]
fn cmd_theme(store: &mut TaskStore, value: Option<&str>) -> anyhow::Result<()> {
    info!("command theme");

    match value {
        None => {
            let theme = store
                .kv()
                .get(THEME_KEY)?
                .unwrap_or_else(|| "light".to_string());
            println!("{theme}");
        }
        Some(theme @ ("dark" | "light")) => {
            store.kv_mut().set(THEME_KEY, theme)?;
            println!("Theme set to {theme}.");
        }
        Some(other) => return Err(anyhow!("invalid theme: {other} (expected dark or light)")),
    }
    Ok(())
}

#[instrument(skip_all)]
fn cmd_signup(
    store: &mut TaskStore,
    remote: Option<&dyn RemoteSync>,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    info!("command signup");

    auth::signup(store.kv_mut(), remote, username, email, password)?;
    println!("Signup successful! Please login.");
    Ok(())
}

#[instrument(skip_all)]
fn cmd_login(store: &mut TaskStore, email: &str, password: &str) -> anyhow::Result<()> {
    info!("command login");

    let user = auth::login(store.kv_mut(), email, password)?;
    println!("Logged in as {}.", user.username);
    Ok(())
}

#[instrument(skip_all)]
fn cmd_logout(store: &mut TaskStore) -> anyhow::Result<()> {
    info!("command logout");

    auth::logout(store.kv_mut());
    println!("Logged out.");
    Ok(())
}

#[instrument(skip_all)]
fn cmd_whoami(store: &TaskStore) -> anyhow::Result<()> {
    info!("command whoami");

    match auth::current_user(store.kv()) {
        Some(user) => {
            println!("{} <{}>", user.username, user.email);
            if auth::is_logged_in(store.kv()) {
                println!("logged in");
            } else {
                println!("not logged in");
            }
        }
        None => println!("No account stored."),
    }
    Ok(())
}
