use crate::model::Task;

/// Case-insensitive substring match on title or description. A blank query
/// keeps every task in its original order.
pub fn filter_tasks(tasks: &[Task], query: &str) -> Vec<Task> {
    let query = query.trim();
    if query.is_empty() {
        return tasks.to_vec();
    }

    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
