// Static genre and mood option lists.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

const DEFAULT_CATALOG: &str = include_str!("../catalog.toml");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub name: String,
    pub moods: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    genres: Vec<Genre>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(DEFAULT_CATALOG)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.genres.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for genre in &self.genres {
            if genre.name.trim().is_empty() {
                return Err(CatalogError::EmptyGenre);
            }
            if !seen.insert(genre.name.as_str()) {
                return Err(CatalogError::DuplicateGenre(genre.name.clone()));
            }
            if genre.moods.is_empty() {
                return Err(CatalogError::NoMoods(genre.name.clone()));
            }
            if genre.moods.iter().any(|m| m.trim().is_empty()) {
                return Err(CatalogError::EmptyMood(genre.name.clone()));
            }
        }
        Ok(())
    }

    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(|g| g.name.as_str())
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }

    pub fn genre_at(&self, index: usize) -> Option<&str> {
        self.genres.get(index).map(|g| g.name.as_str())
    }

    /// Moods offered for `genre`, empty for an unset or unknown genre.
    pub fn moods_for(&self, genre: &str) -> &[String] {
        self.genres
            .iter()
            .find(|g| g.name == genre)
            .map(|g| g.moods.as_slice())
            .unwrap_or(&[])
    }
}
