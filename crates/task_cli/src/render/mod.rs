use tabled::settings::Style;
use tabled::{Table, Tabled};
use task_core::config::Palette;
use task_core::error::AppError;
use task_core::model::Task;
use task_core::shell::Screen;
use task_core::view::{GroupView, TaskListView};
use time::OffsetDateTime;
use time::macros::format_description;

pub const EMPTY_MESSAGE: &str = "No tasks found. Create one to get started!";
const NO_DESCRIPTION: &str = "No description";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority.to_string(),
            updated: format_date(task.updated_at),
            description: description_or_placeholder(task).to_string(),
        }
    }
}

fn description_or_placeholder(task: &Task) -> &str {
    if task.description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        &task.description
    }
}

pub fn format_date(value: OffsetDateTime) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| "-".to_string())
}

/// Plain-text rendering of a screen. A failed load is returned as an error.
pub fn render_screen(screen: &Screen, palette: &Palette) -> Result<String, AppError> {
    match screen {
        Screen::Loading => Ok("Loading tasks...".to_string()),
        Screen::LoadFailed(message) => Err(AppError::load_failed(message.clone())),
        Screen::Empty => Ok(EMPTY_MESSAGE.to_string()),
        Screen::Tasks(view) => Ok(render_view(view, palette)),
    }
}

pub fn render_view(view: &TaskListView, palette: &Palette) -> String {
    view.groups
        .iter()
        .filter(|group| group.count() > 0)
        .map(|group| render_group(group, palette))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_group(group: &GroupView, palette: &Palette) -> String {
    let heading = format!("{} ({})", group.status.label(), group.count());
    let mut lines = vec![format!(
        "{} {}",
        palette.accentize(&heading),
        palette.mutedize(&format!("[{}]", group.sort.label()))
    )];

    let mut table = Table::new(group.items().iter().map(TaskRow::from_task));
    table.with(Style::rounded());
    lines.push(table.to_string());

    if group.total_pages > 1 {
        lines.push(palette.mutedize(&format!(
            "Page {} of {}",
            group.page, group.total_pages
        )));
    }

    lines.join("\n")
}

pub fn render_task_detail(task: &Task) -> String {
    let mut lines = vec![
        format!("ID:          {}", task.id),
        format!("Title:       {}", task.title),
        format!("Status:      {}", task.status),
        format!("Priority:    {}", task.priority),
        format!("Description: {}", description_or_placeholder(task)),
    ];
    if let Some(created_at) = task.created_at {
        lines.push(format!("Created:     {}", format_date(created_at)));
    }
    lines.push(format!("Updated:     {}", format_date(task.updated_at)));
    lines.join("\n")
}

pub fn task_json(task: &Task) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn screen_json(screen: &Screen) -> Result<serde_json::Value, AppError> {
    match screen {
        Screen::Loading | Screen::Empty => Ok(serde_json::json!({
            "total": 0,
            "groups": [],
        })),
        Screen::LoadFailed(message) => Err(AppError::load_failed(message.clone())),
        Screen::Tasks(view) => view_json(view),
    }
}

pub fn view_json(view: &TaskListView) -> Result<serde_json::Value, AppError> {
    let mut groups = Vec::with_capacity(view.groups.len());
    for group in &view.groups {
        let tasks = group
            .items()
            .iter()
            .map(task_json)
            .collect::<Result<Vec<_>, _>>()?;
        groups.push(serde_json::json!({
            "status": group.status,
            "label": group.status.label(),
            "sort": group.sort,
            "page": group.page,
            "total_pages": group.total_pages,
            "count": group.count(),
            "tasks": tasks,
        }));
    }

    Ok(serde_json::json!({
        "total": view.total,
        "groups": groups,
    }))
}
