use clap::{Parser, Subcommand};
use std::str::FromStr;
use task_core::config::{ConfigOverrides, NotificationMode};
use task_core::model::{TaskPriority, TaskStatus};
use task_core::view::SortKey;

#[derive(Parser, Debug)]
#[command(author, version, about = "Task manager for a task REST API", long_about = None)]
pub struct Cli {
    /// Without a command, starts the interactive session
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Base URL of the task API (e.g. http://localhost:8080/api)
    #[arg(long, value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks grouped by status
    ///
    /// Example: taskdeck list
    /// Example: taskdeck list --search report --sort todo=priority-high --page done=2
    List {
        /// Only tasks whose title or description contains this text
        #[arg(long)]
        search: Option<String>,
        /// Sort order of a group (STATUS=KEY, repeatable)
        #[arg(long, value_name = "STATUS=KEY")]
        sort: Vec<String>,
        /// Page of a group (STATUS=N, repeatable)
        #[arg(long, value_name = "STATUS=N")]
        page: Vec<String>,
    },
    /// Show details of a task
    ///
    /// Example: taskdeck show 1
    Show { id: String },
    /// Add a new task
    ///
    /// Example: taskdeck add "Buy milk" -p high
    Add {
        title: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
        #[arg(short = 'p', long)]
        priority: Option<TaskPriority>,
        #[arg(short = 's', long)]
        status: Option<TaskStatus>,
    },
    /// Edit a task
    ///
    /// Example: taskdeck edit 1 --title "Buy organic milk" -s in-progress
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short = 'd', long)]
        description: Option<String>,
        #[arg(short = 'p', long)]
        priority: Option<TaskPriority>,
        #[arg(short = 's', long)]
        status: Option<TaskStatus>,
    },
    /// Delete a task (asks for confirmation in the interactive session)
    ///
    /// Example: taskdeck delete 1
    Delete { id: String },
    /// Check that the task API is reachable
    Health,
    /// Set the search text; no text clears it
    ///
    /// Example: search report
    Search { query: Vec<String> },
    /// Change the sort order of a group
    ///
    /// Example: sort todo name-asc
    Sort { status: TaskStatus, key: SortKey },
    /// Jump to a page of a group
    ///
    /// Example: page done 2
    Page { status: TaskStatus, page: usize },
    /// Next page of a group
    Next { status: TaskStatus },
    /// Previous page of a group
    Prev { status: TaskStatus },
    /// Confirm the pending delete
    Confirm,
    /// Cancel the pending delete
    Cancel,
    /// Reload tasks from the API
    Refresh,
}

/// Parse `STATUS=VALUE`, e.g. `todo=name-asc` or `done=2`.
pub fn parse_group_assignment<T>(raw: &str) -> Result<(TaskStatus, T), String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let (status_raw, value_raw) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{raw}' must be in STATUS=VALUE format"))?;
    let status = status_raw.parse::<TaskStatus>()?;
    let value = value_raw
        .trim()
        .parse::<T>()
        .map_err(|err| format!("invalid value for {status}: {err}"))?;
    Ok((status, value))
}

/// Lines typed into a running session cannot change its API or config.
pub fn reject_session_flags(cli: &Cli) -> Result<(), String> {
    if cli.api_url.is_some() || !cli.config_override.is_empty() {
        return Err(
            "--api-url and --config-override only apply when the session starts".to_string(),
        );
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    ApiUrl,
    Theme,
    Notifications,
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "api_url" | "url" => ConfigOverrideTarget::ApiUrl,
        "theme" => ConfigOverrideTarget::Theme,
        "notifications" | "notify" => ConfigOverrideTarget::Notifications,
        "log_level" | "log" => ConfigOverrideTarget::LogLevel,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

pub fn overrides_from_args(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::ApiUrl => overrides.api_url = Some(parsed.value),
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Notifications => {
                overrides.notifications = Some(parsed.value.parse::<NotificationMode>()?)
            }
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Cli, Command, ConfigOverrideTarget, overrides_from_args, parse_config_override,
        parse_group_assignment, reject_session_flags,
    };
    use clap::Parser;
    use task_core::config::NotificationMode;
    use task_core::model::{TaskPriority, TaskStatus};
    use task_core::view::SortKey;

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" API-URL = http://localhost:9000/api ").unwrap();

        assert_eq!(parsed.target, ConfigOverrideTarget::ApiUrl);
        assert_eq!(parsed.value, "http://localhost:9000/api");
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        let err = parse_config_override("unknown.field=value").unwrap_err();
        assert!(err.contains("unknown config field"));
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("theme").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_empty_value() {
        let err = parse_config_override("theme=  ").unwrap_err();
        assert!(err.contains("needs a value"));
    }

    #[test]
    fn overrides_from_args_collects_every_field() {
        let raw = vec![
            "theme=noir".to_string(),
            "notifications=off".to_string(),
            "log_level=debug".to_string(),
            "url=http://example.test/api".to_string(),
        ];

        let overrides = overrides_from_args(&raw).unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("noir"));
        assert_eq!(overrides.notifications, Some(NotificationMode::Off));
        assert_eq!(overrides.log_level.as_deref(), Some("debug"));
        assert_eq!(overrides.api_url.as_deref(), Some("http://example.test/api"));
    }

    #[test]
    fn overrides_from_args_rejects_bad_notification_mode() {
        let err = overrides_from_args(&["notifications=loud".to_string()]).unwrap_err();
        assert!(err.contains("unknown notification mode"));
    }

    #[test]
    fn group_assignment_parses_sort_and_page() {
        assert_eq!(
            parse_group_assignment::<SortKey>("in-progress=name-desc"),
            Ok((TaskStatus::InProgress, SortKey::NameDesc))
        );
        assert_eq!(
            parse_group_assignment::<usize>("done= 3"),
            Ok((TaskStatus::Done, 3))
        );
        assert!(parse_group_assignment::<usize>("done").is_err());
        assert!(parse_group_assignment::<usize>("later=2").is_err());
        assert!(parse_group_assignment::<usize>("todo=two").is_err());
    }

    #[test]
    fn add_command_parses_typed_flags() {
        let cli =
            Cli::try_parse_from(["taskdeck", "add", "Buy milk", "-p", "high", "-s", "in-progress"])
                .unwrap();

        match cli.command {
            Some(Command::Add {
                title,
                priority,
                status,
                description,
            }) => {
                assert_eq!(title.as_deref(), Some("Buy milk"));
                assert_eq!(priority, Some(TaskPriority::High));
                assert_eq!(status, Some(TaskStatus::InProgress));
                assert_eq!(description, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_without_command_start_a_session() {
        let cli = Cli::try_parse_from([
            "taskdeck",
            "--api-url",
            "http://example.test/api",
            "--config-override",
            "theme=noir",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test/api"));
        assert_eq!(cli.config_override, vec!["theme=noir".to_string()]);
    }

    #[test]
    fn session_lines_reject_startup_flags() {
        let line = Cli::try_parse_from(["taskdeck", "list", "--api-url", "http://x.test/api"])
            .unwrap();
        assert!(reject_session_flags(&line).unwrap_err().contains("--api-url"));

        let line = Cli::try_parse_from(["taskdeck", "list", "--config-override", "theme=noir"])
            .unwrap();
        assert!(reject_session_flags(&line).is_err());

        let line = Cli::try_parse_from(["taskdeck", "list", "--json"]).unwrap();
        assert!(reject_session_flags(&line).is_ok());
    }

    #[test]
    fn sort_command_rejects_unknown_key() {
        assert!(Cli::try_parse_from(["taskdeck", "sort", "todo", "sideways"]).is_err());
    }
}
