use crate::model::Task;
use crate::view::{TaskListView, ViewState, derive_view, filter_tasks};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    version: u64,
    query: String,
    state: ViewState,
}

/// Remembers the last derived view and returns it again while the
/// collection version, search query and view state are unchanged.
#[derive(Debug, Default)]
pub struct ViewMemo {
    last: Option<(MemoKey, Arc<TaskListView>)>,
    derivations: u64,
}

impl ViewMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(
        &mut self,
        version: u64,
        tasks: &[Task],
        query: &str,
        state: &ViewState,
    ) -> Arc<TaskListView> {
        let key = MemoKey {
            version,
            query: query.trim().to_string(),
            state: *state,
        };

        if let Some((last_key, view)) = &self.last
            && *last_key == key
        {
            return Arc::clone(view);
        }

        let filtered = filter_tasks(tasks, &key.query);
        let view = Arc::new(derive_view(&filtered, state));
        self.derivations += 1;

        // Keyed on the effective pages, which is what callers sync back.
        let mut effective = *state;
        effective.sync_pages(&view);
        self.last = Some((
            MemoKey {
                state: effective,
                ..key
            },
            Arc::clone(&view),
        ));
        view
    }

    /// Number of times a view was actually computed.
    pub fn derivations(&self) -> u64 {
        self.derivations
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
