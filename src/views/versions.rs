//! Version picker: the entry point of the support module.

use std::sync::Arc;

use crate::collection::{CollectionView, MatchRule, SearchSpec, SortKey, SortKeyFn};
use crate::error::{PsaError, Result};
use crate::loader::Loader;
use crate::remote::SupportService;
use crate::session::SessionContext;
use crate::types::{EntityId, Version};

pub const VERSION_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionColumn {
    Id,
    Product,
    Name,
}

enum_display_fromstr!(
    VersionColumn,
    PsaError::invalid_sort_column,
    {
        Id => "id",
        Product => "product",
        Name => "name",
    }
);

fn version_fields(version: &Version) -> Vec<&str> {
    vec![version.product.name.as_str(), version.name.as_str()]
}

fn version_key() -> SortKeyFn<Version, VersionColumn> {
    Arc::new(|version: &Version, column: VersionColumn| match column {
        VersionColumn::Id => SortKey::Number(version.id as f64),
        VersionColumn::Product => SortKey::text(&version.product.name),
        VersionColumn::Name => SortKey::text(&version.name),
    })
}

pub struct VersionPicker {
    view: CollectionView<Version, VersionColumn>,
    loader: Loader<&'static str>,
}

impl Default for VersionPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionPicker {
    pub fn new() -> Self {
        Self {
            view: CollectionView::new(
                SearchSpec::new(MatchRule::Contains, version_fields),
                version_key(),
                Some(VERSION_PAGE_SIZE),
            ),
            loader: Loader::new(),
        }
    }

    pub fn view(&self) -> &CollectionView<Version, VersionColumn> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CollectionView<Version, VersionColumn> {
        &mut self.view
    }

    pub async fn load(&mut self, service: Arc<dyn SupportService>) -> Result<()> {
        self.view.begin_load();
        let pending = self
            .loader
            .spawn("versions", async move { service.versions().await });
        self.view.finish_load(pending.finish().await)
    }

    /// Pick a loaded version and record it in the session.
    pub fn choose(&mut self, id: EntityId, session: &SessionContext) -> Result<Version> {
        let version = self
            .view
            .get(id)
            .cloned()
            .ok_or_else(|| PsaError::NotFound(format!("version {id}")))?;
        session.select(version.clone())?;
        self.view.selection_mut().clear();
        Ok(version)
    }
}
