//! Wildfire image dataset.
//!
//! A dataset is a metadata table with one row per image (`imgFile` names the
//! file inside the frames directory) plus the columns used as targets. Items
//! are `(image, targets)` pairs, with the dataset's transform applied.

use crate::config::{DEFAULT_TARGET_COLUMN, IMAGE_COLUMN};
use crate::error::{CoreError, CoreResult};
use crate::table::Table;
use crate::transforms::ImageTransform;

use image::DynamicImage;

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct WildfireDataset {
    metadata: Table,
    frames_dir: PathBuf,
    image_col: usize,
    target_names: Vec<String>,
    target_cols: Vec<usize>,
    transform: Option<Arc<dyn ImageTransform>>,
}

impl WildfireDataset {
    /// Opens a dataset from a metadata CSV.
    ///
    /// Fails with `InvalidPath` if the CSV does not exist.
    pub fn from_path(metadata: &Path, frames_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        Self::from_table(Table::from_path(metadata)?, frames_dir)
    }

    /// Opens a dataset over an in-memory metadata table, targeting `fire`.
    pub fn from_table(metadata: Table, frames_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let image_col = metadata.column_index(IMAGE_COLUMN)?;
        let target_cols = vec![metadata.column_index(DEFAULT_TARGET_COLUMN)?];

        Ok(Self {
            metadata,
            frames_dir: frames_dir.into(),
            image_col,
            target_names: vec![DEFAULT_TARGET_COLUMN.to_string()],
            target_cols,
            transform: None,
        })
    }

    /// Replaces the target columns, in the order given.
    pub fn with_target_names<I, S>(mut self, names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(CoreError::Configuration(
                "At least one target column is required".to_string(),
            ));
        }
        self.target_cols = names
            .iter()
            .map(|name| self.metadata.column_index(name))
            .collect::<CoreResult<_>>()?;
        self.target_names = names;
        Ok(self)
    }

    pub fn with_transform(mut self, transform: Option<Arc<dyn ImageTransform>>) -> Self {
        self.transform = transform;
        self
    }

    /// Points the dataset at another copy of its images.
    pub fn with_frames_dir(mut self, frames_dir: impl Into<PathBuf>) -> Self {
        self.frames_dir = frames_dir.into();
        self
    }

    pub fn transform(&self) -> Option<&Arc<dyn ImageTransform>> {
        self.transform.as_ref()
    }

    pub fn metadata(&self) -> &Table {
        &self.metadata
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    fn check_index(&self, index: usize) -> CoreResult<()> {
        if index >= self.len() {
            return Err(CoreError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    pub fn image_file(&self, index: usize) -> CoreResult<&str> {
        self.check_index(index)?;
        Ok(self.metadata.cell(index, self.image_col))
    }

    pub fn image_path(&self, index: usize) -> CoreResult<PathBuf> {
        Ok(self.frames_dir.join(self.image_file(index)?))
    }

    /// Target values of one item, in `target_names` order.
    pub fn targets(&self, index: usize) -> CoreResult<Vec<f32>> {
        self.check_index(index)?;
        self.target_cols
            .iter()
            .zip(&self.target_names)
            .map(|(&col, name)| {
                let cell = self.metadata.cell(index, col);
                cell.trim().parse::<f32>().map_err(|_| CoreError::InvalidRecord {
                    row: index,
                    reason: format!("target {} '{}' is not numeric", name, cell),
                })
            })
            .collect()
    }

    /// Loads one item: the decoded image (transformed) and its targets.
    pub fn get(&self, index: usize) -> CoreResult<(DynamicImage, Vec<f32>)> {
        let targets = self.targets(index)?;
        let image = image::open(self.image_path(index)?)?;
        let image = match &self.transform {
            Some(transform) => transform.apply(image),
            None => image,
        };
        Ok((image, targets))
    }

    /// A view over some rows, sharing frames directory, targets and transform.
    pub fn subset(&self, rows: &[usize]) -> Self {
        Self {
            metadata: self.metadata.select_rows(rows),
            ..self.clone()
        }
    }
}
