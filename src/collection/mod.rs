//! Filterable, sortable, paginated collections with one-at-a-time selection.
//!
//! Every table in the console is a [`CollectionView`]: the full list fetched
//! from a service (`all`), an optional scope predicate (e.g. "tickets of the
//! selected version"), a search term, a sort column and a page. `visible` is
//! always `sort(filter(scope(all)))` and is recomputed whenever any input
//! changes, so it can never drift from `all`.

pub mod filter;
pub mod page;
pub mod selection;
pub mod sort;

use std::sync::Arc;

use tracing::debug;

pub use filter::{MatchRule, SearchFields, SearchSpec, filter_items, normalize_term};
pub use page::{PageInfo, paginate};
pub use selection::{ActionModal, ModalPhase, Selection};
pub use sort::{SortDirection, SortKey, SortState, sort_items};

use crate::error::{PsaError, Result};
use crate::types::{EntityId, Record};

/// Restricts a view to a subset of its loaded records.
pub type Scope<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Comparator key for a column of `T`.
pub type SortKeyFn<T, C> = Arc<dyn Fn(&T, C) -> SortKey + Send + Sync>;

pub struct CollectionView<T, C, A = ()> {
    all: Vec<T>,
    visible: Vec<T>,
    scope: Option<Scope<T>>,
    search: SearchSpec<T>,
    term: String,
    sort: Option<SortState<C>>,
    sort_key: SortKeyFn<T, C>,
    page: usize,
    page_size: Option<usize>,
    selection: Selection<A>,
    error: Option<String>,
    /// Loads begun and not yet finished.
    loading: usize,
}

impl<T, C, A> CollectionView<T, C, A>
where
    T: Record,
    C: Copy + PartialEq,
    A: Clone,
{
    pub fn new(search: SearchSpec<T>, sort_key: SortKeyFn<T, C>, page_size: Option<usize>) -> Self {
        Self {
            all: Vec::new(),
            visible: Vec::new(),
            scope: None,
            search,
            term: String::new(),
            sort: None,
            sort_key,
            page: 1,
            page_size,
            selection: Selection::None,
            error: None,
            loading: 0,
        }
    }

    fn refresh(&mut self) {
        let scoped: Vec<T> = match &self.scope {
            Some(scope) => self.all.iter().filter(|item| scope(item)).cloned().collect(),
            None => self.all.clone(),
        };
        let mut visible = filter_items(&scoped, &self.term, &self.search);
        if let Some(state) = self.sort {
            let key = &self.sort_key;
            sort_items(&mut visible, state, |item, column| key(item, column));
        }
        self.visible = visible;

        let last = self.page_info().page_count();
        if self.page > last {
            self.page = last;
        }
    }

    pub fn all(&self) -> &[T] {
        &self.all
    }

    /// Scoped, filtered and sorted rows across every page.
    pub fn visible(&self) -> &[T] {
        &self.visible
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.all.iter().find(|item| item.id() == id)
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.to_string();
        self.page = 1;
        self.refresh();
    }

    pub fn set_scope(&mut self, scope: Option<Scope<T>>) {
        self.scope = scope;
        self.page = 1;
        self.refresh();
    }

    /// Replace the comparator table (e.g. once name lookups are loaded).
    pub fn set_sort_key(&mut self, sort_key: SortKeyFn<T, C>) {
        self.sort_key = sort_key;
        self.refresh();
    }

    pub fn sort_state(&self) -> Option<SortState<C>> {
        self.sort
    }

    /// Toggle sorting on `column`.
    pub fn sort_by(&mut self, column: C) -> SortState<C> {
        let state = SortState::toggle(self.sort, column);
        self.sort = Some(state);
        self.refresh();
        state
    }

    pub fn set_sort(&mut self, state: Option<SortState<C>>) {
        self.sort = state;
        self.refresh();
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.page, self.page_size, self.visible.len())
    }

    pub fn page_rows(&self) -> &[T] {
        paginate(&self.visible, self.page, self.page_size)
    }

    /// Jump to a 1-based page, clamped to the available range.
    pub fn go_to_page(&mut self, number: usize) {
        let last = self.page_info().page_count();
        self.page = number.clamp(1, last);
    }

    pub fn next_page(&mut self) -> bool {
        if self.page_info().has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page_info().has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn selection(&self) -> &Selection<A> {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection<A> {
        &mut self.selection
    }

    /// Select a row that is currently visible.
    pub fn select(&mut self, id: EntityId) -> Result<&T> {
        if !self.visible.iter().any(|item| item.id() == id) {
            return Err(PsaError::NotFound(format!("row {id}")));
        }
        self.selection.select(id)?;
        self.selected()
            .ok_or_else(|| PsaError::NotFound(format!("row {id}")))
    }

    pub fn selected(&self) -> Option<&T> {
        self.selection.id().and_then(|id| self.get(id))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    /// Mark a fetch in flight. Pair every call with [`Self::finish_load`].
    pub fn begin_load(&mut self) {
        self.loading += 1;
    }

    /// Apply the outcome of a fetch.
    ///
    /// Superseded loads are dropped without touching rows; the view stays
    /// loading only while a newer fetch is still in flight. Failures keep
    /// the previous rows and record the message for display.
    pub fn finish_load(&mut self, outcome: Result<Vec<T>>) -> Result<()> {
        self.loading = self.loading.saturating_sub(1);
        match outcome {
            Ok(items) => {
                self.error = None;
                self.replace_all(items);
                Ok(())
            }
            Err(PsaError::Cancelled(key)) => {
                debug!(%key, "dropping superseded load");
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.all = items;
        if let Some(id) = self.selection.id()
            && self.get(id).is_none()
        {
            self.selection.clear();
        }
        self.refresh();
    }

    /// Replace the record with the same id. Returns false if it is not loaded.
    pub fn merge(&mut self, entity: T) -> bool {
        let Some(slot) = self.all.iter_mut().find(|item| item.id() == entity.id()) else {
            return false;
        };
        *slot = entity;
        self.refresh();
        true
    }

    /// Add a newly created record; an existing id is replaced instead.
    pub fn insert(&mut self, entity: T) {
        if !self.merge(entity.clone()) {
            self.all.push(entity);
            self.refresh();
        }
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.all.len();
        self.all.retain(|item| item.id() != id);
        let removed = self.all.len() != before;
        if removed {
            if self.selection.id() == Some(id) {
                self.selection.clear();
            }
            self.refresh();
        }
        removed
    }
}
