//! Grouped, sorted and paginated task list.
//!
//! [`derive_view`] is a pure function of the (already search-filtered)
//! collection and the per-group [`ViewState`]. Each status group is
//! filtered, stably sorted by its own [`SortKey`] and sliced into pages of
//! [`PAGE_SIZE`]. Requested pages are clamped into `1..=total_pages`, and the
//! effective page is reported back in [`GroupView::page`].

mod memo;
mod search;
mod sort;

pub use memo::ViewMemo;
pub use search::filter_tasks;
pub use sort::{SortKey, compare_titles};

use crate::model::{Task, TaskStatus};
use std::ops::Range;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupState {
    pub sort: SortKey,
    pub page: usize,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            sort: SortKey::default(),
            page: 1,
        }
    }
}

/// Sort key and page for every status group, indexed by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewState {
    groups: [GroupState; 3],
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(&self, status: TaskStatus) -> GroupState {
        self.groups[status.index()]
    }

    /// Changing the sort order starts the group again from its first page.
    pub fn set_sort(&mut self, status: TaskStatus, sort: SortKey) {
        self.groups[status.index()] = GroupState { sort, page: 1 };
    }

    pub fn set_page(&mut self, status: TaskStatus, page: usize) {
        self.groups[status.index()].page = page.max(1);
    }

    pub fn next_page(&mut self, status: TaskStatus) {
        let group = &mut self.groups[status.index()];
        group.page = group.page.saturating_add(1);
    }

    pub fn prev_page(&mut self, status: TaskStatus) {
        let group = &mut self.groups[status.index()];
        group.page = group.page.saturating_sub(1).max(1);
    }

    /// Writes the effective (clamped) pages of a derived view back.
    pub fn sync_pages(&mut self, view: &TaskListView) {
        for group in &view.groups {
            self.groups[group.status.index()].page = group.page;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub status: TaskStatus,
    pub sort: SortKey,
    /// Effective page after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Every task of the group in sorted order.
    pub sorted: Vec<Task>,
    range: Range<usize>,
}

impl GroupView {
    pub fn count(&self) -> usize {
        self.sorted.len()
    }

    /// The tasks on the current page.
    pub fn items(&self) -> &[Task] {
        &self.sorted[self.range.clone()]
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListView {
    /// Number of tasks the view was derived from.
    pub total: usize,
    pub groups: [GroupView; 3],
}

impl TaskListView {
    pub fn group(&self, status: TaskStatus) -> &GroupView {
        &self.groups[status.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Index range of `page` (1-based) in a list of `count` items. Pages past
/// the end yield an empty range.
pub fn page_range(count: usize, page: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE).min(count);
    let end = start.saturating_add(PAGE_SIZE).min(count);
    start..end
}

pub fn derive_group(tasks: &[Task], status: TaskStatus, state: GroupState) -> GroupView {
    let mut sorted: Vec<Task> = tasks
        .iter()
        .filter(|task| task.status == status)
        .cloned()
        .collect();
    state.sort.sort(&mut sorted);

    let total_pages = total_pages(sorted.len());
    let page = state.page.clamp(1, total_pages);
    let range = page_range(sorted.len(), page);

    GroupView {
        status,
        sort: state.sort,
        page,
        total_pages,
        sorted,
        range,
    }
}

pub fn derive_view(tasks: &[Task], state: &ViewState) -> TaskListView {
    TaskListView {
        total: tasks.len(),
        groups: TaskStatus::ALL.map(|status| derive_group(tasks, status, state.group(status))),
    }
}
