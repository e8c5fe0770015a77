// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Dataset locators of the form `<store-path>::<dataset-name>`.

use crate::refs::{validate_dataset_name, RefError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const SEPARATOR: &str = "::";

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("dataset locator {0:?} must look like <store-path>::<dataset-name>")]
    MissingSeparator(String),

    #[error("dataset locator {0:?} has an empty store path")]
    EmptyStorePath(String),

    #[error(transparent)]
    InvalidDataset(#[from] RefError),
}

/// Identifies a store directory and a dataset inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLocator {
    pub store_path: PathBuf,
    pub dataset: String,
}

impl DatasetLocator {
    pub fn new(store_path: impl Into<PathBuf>, dataset: &str) -> Result<Self, LocatorError> {
        validate_dataset_name(dataset)?;
        Ok(Self {
            store_path: store_path.into(),
            dataset: dataset.to_string(),
        })
    }

    /// Parse `<store-path>::<dataset-name>`. The last `::` separates the two
    /// parts, so store paths may themselves contain `::`.
    pub fn parse(s: &str) -> Result<Self, LocatorError> {
        let (path, dataset) = s
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| LocatorError::MissingSeparator(s.to_string()))?;
        if path.is_empty() {
            return Err(LocatorError::EmptyStorePath(s.to_string()));
        }
        Self::new(path, dataset)
    }
}

impl FromStr for DatasetLocator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DatasetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.store_path.display(), SEPARATOR, self.dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_path_and_dataset() {
        let locator: DatasetLocator = "/var/lib/blobs::daily".parse().unwrap();
        assert_eq!(locator.store_path, PathBuf::from("/var/lib/blobs"));
        assert_eq!(locator.dataset, "daily");
        assert_eq!(locator.to_string(), "/var/lib/blobs::daily");
    }

    #[test]
    fn test_last_separator_wins() {
        let locator = DatasetLocator::parse("odd::dir::ds").unwrap();
        assert_eq!(locator.store_path, PathBuf::from("odd::dir"));
        assert_eq!(locator.dataset, "ds");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!(
            DatasetLocator::parse("/tmp/store"),
            Err(LocatorError::MissingSeparator(_))
        ));
        assert!(matches!(
            DatasetLocator::parse("::ds"),
            Err(LocatorError::EmptyStorePath(_))
        ));
        assert!(matches!(
            DatasetLocator::parse("/tmp/store::"),
            Err(LocatorError::InvalidDataset(_))
        ));
        assert!(DatasetLocator::parse("/tmp/store::bad name").is_err());
    }
}
