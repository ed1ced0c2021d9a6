use thiserror::Error;

use crate::api::Backend;
use crate::error::Result;
use crate::models::Repository;

/// Most repositories one analysis may cover.
pub const MAX_SELECTED_REPOS: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Please select at least one repo to start analysis!")]
    Empty,

    #[error("You can select up to {max} repos for analysis!")]
    TooMany { count: usize, max: usize },
}

/// Repositories picked for analysis, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoSelection {
    selected: Vec<u64>,
}

impl RepoSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the id if absent, removes it otherwise.
    pub fn toggle(&mut self, id: u64) {
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
    }

    /// Adds the id unless it is already selected.
    pub fn select(&mut self, id: u64) {
        if !self.contains(id) {
            self.selected.push(id);
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    pub fn ids(&self) -> &[u64] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Splits the account listing into `(available, selected)`, keeping the
    /// listing order in both halves.
    pub fn partition<'a>(&self, repos: &'a [Repository]) -> (Vec<&'a Repository>, Vec<&'a Repository>) {
        let (selected, available): (Vec<&Repository>, Vec<&Repository>) =
            repos.iter().partition(|r| self.contains(r.id));
        (available, selected)
    }

    pub fn validate(&self) -> std::result::Result<&[u64], SelectionError> {
        match self.selected.len() {
            0 => Err(SelectionError::Empty),
            n if n > MAX_SELECTED_REPOS => Err(SelectionError::TooMany {
                count: n,
                max: MAX_SELECTED_REPOS,
            }),
            _ => Ok(&self.selected),
        }
    }

    /// Validates, then submits. Nothing is sent when validation fails.
    pub async fn confirm(&self, backend: &dyn Backend) -> Result<()> {
        let ids = self.validate()?;
        backend.set_repositories(ids).await
    }
}
