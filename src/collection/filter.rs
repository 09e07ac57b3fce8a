//! Search-term filtering over an in-memory collection.

/// How a search term is compared against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchRule {
    #[default]
    Contains,
    Prefix,
}

impl MatchRule {
    /// `needle` must already be trimmed and lower-cased.
    pub fn matches(&self, field: &str, needle: &str) -> bool {
        let field = field.to_lowercase();
        match self {
            MatchRule::Contains => field.contains(needle),
            MatchRule::Prefix => field.starts_with(needle),
        }
    }
}

/// Fields a view searches for a given record.
pub type SearchFields<T> = for<'a> fn(&'a T) -> Vec<&'a str>;

/// Which fields are searched and how.
pub struct SearchSpec<T> {
    pub rule: MatchRule,
    pub fields: SearchFields<T>,
}

// Manual impls: a derive would demand `T: Copy`.
impl<T> Clone for SearchSpec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SearchSpec<T> {}

impl<T> SearchSpec<T> {
    pub fn new(rule: MatchRule, fields: SearchFields<T>) -> Self {
        Self { rule, fields }
    }

    pub fn accepts(&self, item: &T, needle: &str) -> bool {
        (self.fields)(item)
            .into_iter()
            .any(|field| self.rule.matches(field, needle))
    }
}

/// Normalized form of a user-entered term; `None` means "no filter".
pub fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Items whose searched fields match `term`, in their original order.
///
/// A blank or whitespace-only term returns every item.
pub fn filter_items<T: Clone>(items: &[T], term: &str, spec: &SearchSpec<T>) -> Vec<T> {
    match normalize_term(term) {
        None => items.to_vec(),
        Some(needle) => items
            .iter()
            .filter(|item| spec.accepts(item, &needle))
            .cloned()
            .collect(),
    }
}
