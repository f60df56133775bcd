use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use std::sync::Arc;
use task_cli::cli::{
    Cli, Command, overrides_from_args, parse_group_assignment, reject_session_flags,
};
use task_cli::render;
use task_core::api::ApiClient;
use task_core::cache::TaskCache;
use task_core::config::{Palette, load_config_with_fallback, merge_overrides};
use task_core::error::AppError;
use task_core::logging::init_logging;
use task_core::model::{Task, TaskPriority, TaskStatus};
use task_core::notify::{Notifier, notifier_for_mode};
use task_core::shell::{Screen, Shell};
use task_core::view::SortKey;
use tokio::runtime::Runtime;

struct Session {
    shell: Shell,
    palette: Palette,
    interactive: bool,
}

fn build_session(
    api_url: Option<&str>,
    config_override: &[String],
    interactive: bool,
) -> Result<Session, AppError> {
    let load = load_config_with_fallback();
    let overrides = overrides_from_args(config_override).map_err(AppError::invalid_input)?;
    let mut config = merge_overrides(&load.config, &overrides);
    if let Some(url) = api_url {
        config.api_url = Some(url.to_string());
    }

    init_logging(config.log_level());
    if let Some(err) = load.error {
        tracing::warn!(error = %err, "config file ignored, using defaults");
    }

    let notifier: Arc<dyn Notifier> = Arc::from(notifier_for_mode(config.notifications));
    let api = ApiClient::new(config.api_url())?;
    tracing::debug!(api_url = api.base_url(), "session ready");
    let cache = Arc::new(TaskCache::new(api, notifier));

    Ok(Session {
        shell: Shell::new(cache),
        palette: config.palette(),
        interactive,
    })
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", render::task_json(task)?);
    Ok(())
}

fn print_screen(session: &mut Session, json: bool) -> Result<(), AppError> {
    let screen = session.shell.screen();
    if json {
        println!("{}", render::screen_json(&screen)?);
    } else {
        println!("{}", render::render_screen(&screen, &session.palette)?);
    }
    Ok(())
}

async fn load_and_print(session: &mut Session, json: bool) -> Result<(), AppError> {
    session.shell.load().await;
    print_screen(session, json)
}

async fn require_loaded(session: &mut Session) -> Result<(), AppError> {
    match session.shell.load().await {
        Screen::LoadFailed(message) => Err(AppError::load_failed(message)),
        _ => Ok(()),
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn fill_form(
    session: &mut Session,
    title: Option<String>,
    description: Option<String>,
    priority: Option<TaskPriority>,
    status: Option<TaskStatus>,
) -> Result<(), AppError> {
    let input = session
        .shell
        .form_input_mut()
        .ok_or_else(|| AppError::invalid_input("no form is open"))?;
    if let Some(title) = title {
        input.title = title;
    }
    if let Some(description) = description {
        input.description = description;
    }
    if let Some(priority) = priority {
        input.priority = priority;
    }
    if let Some(status) = status {
        input.status = status;
    }
    Ok(())
}

async fn run_command(
    command: Command,
    json: bool,
    session: &mut Session,
) -> Result<(), AppError> {
    match command {
        Command::List { search, sort, page } => {
            if let Some(query) = search {
                session.shell.set_search(query);
            }
            for raw in &sort {
                let (status, key) =
                    parse_group_assignment::<SortKey>(raw).map_err(AppError::invalid_input)?;
                session.shell.set_sort(status, key);
            }
            for raw in &page {
                let (status, number) =
                    parse_group_assignment::<usize>(raw).map_err(AppError::invalid_input)?;
                session.shell.set_page(status, number);
            }
            load_and_print(session, json).await?;
        }
        Command::Show { id } => {
            require_loaded(session).await?;
            let task = session
                .shell
                .cache()
                .find_task(id.trim())
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            if json {
                print_task_json(&task)?;
            } else {
                println!("{}", render::render_task_detail(&task));
            }
        }
        Command::Add {
            title,
            description,
            priority,
            status,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            session.shell.open_create_form();
            fill_form(session, Some(title), description, priority, status)?;
            let task = session.shell.submit_form().await?;
            if json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
            if session.interactive {
                load_and_print(session, json).await?;
            }
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            status,
        } => {
            if title.is_none() && description.is_none() && priority.is_none() && status.is_none()
            {
                return Err(AppError::invalid_input(
                    "nothing to change (use --title, --description, --priority or --status)",
                ));
            }

            require_loaded(session).await?;
            session.shell.open_edit_form(&id)?;
            fill_form(session, title, description, priority, status)?;
            let result = session.shell.submit_form().await;
            // A failed submit leaves the form open; a command line cannot reuse it.
            session.shell.close_form();
            let task = result?;
            if json {
                print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.title, task.id);
            }
            if session.interactive {
                load_and_print(session, json).await?;
            }
        }
        Command::Delete { id } => {
            session.shell.load().await;
            let pending = session.shell.request_delete(&id)?.clone();
            let name = pending.title.as_deref().unwrap_or(pending.id.as_str());
            if session.interactive {
                println!(
                    "Delete \"{}\" ({})? Type 'confirm' or 'cancel'.",
                    name, pending.id
                );
                return Ok(());
            }

            session.shell.confirm_delete().await?;
            if json {
                println!("{}", serde_json::json!({ "id": pending.id, "deleted": true }));
            } else {
                println!("Deleted task: {} ({})", name, pending.id);
            }
        }
        Command::Confirm => {
            let deleted = session.shell.confirm_delete().await?;
            let name = deleted.title.as_deref().unwrap_or(deleted.id.as_str());
            if json {
                println!("{}", serde_json::json!({ "id": deleted.id, "deleted": true }));
            } else {
                println!("Deleted task: {} ({})", name, deleted.id);
            }
            load_and_print(session, json).await?;
        }
        Command::Cancel => {
            let pending = session.shell.pending_delete().map(|pending| pending.id.clone());
            session.shell.cancel_delete();
            if json {
                println!("{}", serde_json::json!({ "id": pending, "deleted": false }));
            } else {
                println!("Delete cancelled.");
            }
        }
        Command::Health => {
            let health = session.shell.cache().api().health().await?;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "status": health.status, "time": health.time })
                );
            } else {
                println!("API is {} ({})", health.status, health.time);
            }
        }
        Command::Search { query } => {
            session.shell.set_search(query.join(" "));
            load_and_print(session, json).await?;
        }
        Command::Sort { status, key } => {
            session.shell.set_sort(status, key);
            load_and_print(session, json).await?;
        }
        Command::Page { status, page } => {
            session.shell.set_page(status, page);
            load_and_print(session, json).await?;
        }
        Command::Next { status } => {
            session.shell.next_page(status);
            load_and_print(session, json).await?;
        }
        Command::Prev { status } => {
            session.shell.prev_page(status);
            load_and_print(session, json).await?;
        }
        Command::Refresh => {
            session.shell.refresh().await;
            print_screen(session, json)?;
        }
    }

    Ok(())
}

fn run_interactive(runtime: &Runtime, startup: &Cli) -> Result<(), AppError> {
    let mut session = build_session(startup.api_url.as_deref(), &startup.config_override, true)?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdeck".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(message) = reject_session_flags(&cli) {
            eprintln!("ERROR: {}", AppError::invalid_input(message));
            continue;
        }

        let Some(command) = cli.command else {
            eprintln!("ERROR: {}", AppError::invalid_input("a command is required"));
            continue;
        };

        if let Err(err) = runtime.block_on(run_command(command, cli.json, &mut session)) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run_once(runtime: &Runtime, command: Command, startup: &Cli) -> Result<(), AppError> {
    let mut session =
        build_session(startup.api_url.as_deref(), &startup.config_override, false)?;
    runtime.block_on(run_command(command, startup.json, &mut session))
}

fn main() {
    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: {}", AppError::io(err.to_string()));
            std::process::exit(1);
        }
    };

    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let result = match cli.command.take() {
        Some(command) => run_once(&runtime, command, &cli),
        None => run_interactive(&runtime, &cli),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
