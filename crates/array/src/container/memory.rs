// crate modules
use crate::container::{ContainerRead, ContainerWrite};
use crate::error::{Error, Result};
use crate::slice::Hyperslab;
use crate::Array;

/// Container of named arrays held in memory
///
/// Datasets keep their insertion order, so "first dataset" means the first
/// one inserted. Useful for tests and for embedding gridkit where the data
/// never touches disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    datasets: Vec<(String, Array)>,
}

impl MemoryContainer {
    /// Empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset
    pub fn insert<S: Into<String>>(&mut self, name: S, array: Array) {
        let name = name.into();
        match self.datasets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = array,
            None => self.datasets.push((name, array)),
        }
    }

    /// Borrow a dataset by name
    pub fn get(&self, name: &str) -> Option<&Array> {
        self.datasets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Number of datasets held
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// True if no datasets are held
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    fn dataset(&self, name: &str) -> Result<&Array> {
        self.get(name)
            .ok_or_else(|| Error::DatasetOpenFailed(name.to_string()))
    }
}

impl ContainerRead for MemoryContainer {
    fn dataset_names(&mut self) -> Result<Vec<String>> {
        Ok(self.datasets.iter().map(|(n, _)| n.clone()).collect())
    }

    fn shape(&mut self, name: &str) -> Result<Vec<usize>> {
        Ok(self.dataset(name)?.dims().to_vec())
    }

    fn read_hyperslab(&mut self, name: &str, slab: &Hyperslab) -> Result<Vec<f64>> {
        let array = self.dataset(name)?;
        slab.gather(array.dims(), array.data())
    }
}

impl ContainerWrite for MemoryContainer {
    fn delete_dataset(&mut self, name: &str) -> Result<bool> {
        let before = self.datasets.len();
        self.datasets.retain(|(n, _)| n != name);
        Ok(self.datasets.len() != before)
    }

    fn write_dataset(&mut self, name: &str, dims: &[usize], data: &[f64]) -> Result<()> {
        let array = Array::from_vec(dims.to_vec(), data.to_vec())
            .map_err(|e| Error::WriteFailed(e.to_string()))?;
        self.insert(name, array);
        Ok(())
    }
}
