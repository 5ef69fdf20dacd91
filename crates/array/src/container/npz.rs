// standard library
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

// crate modules
use crate::array::{allocate, Samples};
use crate::container::header::{self, ElementKind, NpyHeader, PREAMBLE_V1, PREAMBLE_V2};
use crate::container::{ContainerRead, ContainerWrite};
use crate::error::{Error, Result};
use crate::slice::Hyperslab;

// gridkit modules
use gridkit_utils::f;

// external crates
use log::{debug, warn};
use ndarray::{ArrayD, ArrayViewD, IxDyn, Slice};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Numpy `.npz` archive used as an array container
///
/// An `.npz` file is a zip archive of `.npy` members, one per dataset. The
/// dataset name is the member name without the `.npy` extension, and archive
/// order defines the "first" dataset.
///
/// Single and double precision members are read, and always normalised to
/// doubles. Datasets are always written as little endian doubles.
///
/// Writes are staged in memory and only reach the disk on
/// [flush()](ContainerWrite::flush), which rewrites the whole archive with
/// untouched members copied across verbatim.
///
/// ```rust, no_run
/// # use gridkit_array::{ContainerRead, NpzFile};
/// let mut file = NpzFile::open("fields.npz").unwrap();
/// for name in file.dataset_names().unwrap() {
///     println!("{name}: {:?}", file.shape(&name).unwrap());
/// }
/// ```
pub struct NpzFile {
    path: PathBuf,
    archive: Option<ZipArchive<File>>,
    staged: Vec<(String, ArrayD<f64>)>,
    deleted: HashSet<String>,
}

impl NpzFile {
    /// Open an existing archive for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let archive = Self::open_archive(&path)?;

        Ok(Self {
            path,
            archive: Some(archive),
            staged: Vec::new(),
            deleted: HashSet::new(),
        })
    }

    /// Prepare an archive for writing
    ///
    /// When appending to an existing file its datasets are kept, otherwise
    /// the archive starts empty and any existing file is replaced on flush.
    pub fn create<P: AsRef<Path>>(path: P, append: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let archive = if append && path.exists() {
            Some(Self::open_archive(&path)?)
        } else {
            None
        };

        Ok(Self {
            path,
            archive,
            staged: Vec::new(),
            deleted: HashSet::new(),
        })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
        let file = File::open(path).map_err(|_| Error::OpenFailed(path.to_path_buf()))?;
        ZipArchive::new(file).map_err(|_| Error::OpenFailed(path.to_path_buf()))
    }

    /// Dataset names already on disk, minus anything deleted since
    ///
    /// Members that are not `.npy` files are skipped here but kept on flush.
    fn stored_names(&mut self) -> Result<Vec<String>> {
        let Some(archive) = self.archive.as_mut() else {
            return Ok(Vec::new());
        };

        let mut names = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| Error::ReadFailed(e.to_string()))?;
            match dataset_name(entry.name()) {
                Some(name) if !self.deleted.contains(name) => names.push(name.to_string()),
                _ => {}
            }
        }
        Ok(names)
    }

    fn staged(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.staged
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, a)| a)
    }

    /// Open a stored member for streaming
    fn member(&mut self, name: &str) -> Result<zip::read::ZipFile<'_>> {
        if self.deleted.contains(name) {
            return Err(Error::DatasetOpenFailed(name.to_string()));
        }
        let archive = self
            .archive
            .as_mut()
            .ok_or_else(|| Error::DatasetOpenFailed(name.to_string()))?;
        archive
            .by_name(&member_name(name))
            .map_err(|_| Error::DatasetOpenFailed(name.to_string()))
    }

    /// Read only the header of a stored member
    fn read_header(&mut self, name: &str) -> Result<NpyHeader> {
        let mut member = self.member(name)?;

        let mut preamble = [0u8; PREAMBLE_V2];
        member
            .read_exact(&mut preamble)
            .map_err(|e| Error::ReadFailed(e.to_string()))?;

        let (_, (major, len)) = header::preamble(&preamble)
            .map_err(|_| Error::ReadFailed(f!("{name} is not an npy member")))?;

        // the first bytes of the dictionary were already consumed
        let (mut text, remaining) = match major {
            1 => (preamble[PREAMBLE_V1..].to_vec(), len.saturating_sub(2)),
            _ => (Vec::new(), len),
        };
        member
            .take(remaining as u64)
            .read_to_end(&mut text)
            .map_err(|e| Error::ReadFailed(e.to_string()))?;

        let text = String::from_utf8_lossy(&text);
        header::parse_header(&text)
    }

    /// Read a whole stored member as tagged samples in logical order
    fn read_member(&mut self, name: &str, slab: &Hyperslab) -> Result<Samples> {
        let header = self.read_header(name)?;
        let kind = header
            .element_kind()
            .ok_or_else(|| Error::ReadFailed(f!("{name} is not floating point")))?;
        debug!(
            "\"{name}\" is {kind:?} in {} order",
            if header.fortran_order { "column-major" } else { "row-major" }
        );

        let dims = header.shape;
        let failure = |e: String| {
            if slab.is_full(&dims) {
                Error::ReadFailed(e)
            } else {
                Error::SliceReadFailed(e)
            }
        };

        let member = self.member(name)?;
        let samples = match kind {
            ElementKind::Float64 => {
                let array = ArrayD::<f64>::read_npy(member).map_err(|e| failure(e.to_string()))?;
                Samples::F64(select(array.view(), slab).map_err(|e| failure(e.to_string()))?)
            }
            ElementKind::Float32 => {
                let array = ArrayD::<f32>::read_npy(member).map_err(|e| failure(e.to_string()))?;
                Samples::F32(select(array.view(), slab).map_err(|e| failure(e.to_string()))?)
            }
        };

        Ok(samples)
    }
}

impl ContainerRead for NpzFile {
    fn dataset_names(&mut self) -> Result<Vec<String>> {
        let mut names = self.stored_names()?;
        for (name, _) in &self.staged {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    fn shape(&mut self, name: &str) -> Result<Vec<usize>> {
        if let Some(array) = self.staged(name) {
            return Ok(array.shape().to_vec());
        }
        Ok(self.read_header(name)?.shape)
    }

    fn read_hyperslab(&mut self, name: &str, slab: &Hyperslab) -> Result<Vec<f64>> {
        if let Some(array) = self.staged(name) {
            return select(array.view(), slab);
        }
        debug!("Reading {} elements of \"{name}\"", slab.len());
        self.read_member(name, slab)?.into_f64()
    }
}

impl ContainerWrite for NpzFile {
    fn delete_dataset(&mut self, name: &str) -> Result<bool> {
        let before = self.staged.len();
        self.staged.retain(|(n, _)| n != name);
        let unstaged = self.staged.len() != before;

        let stored = self.stored_names()?.iter().any(|n| n == name);
        if stored {
            self.deleted.insert(name.to_string());
        }

        Ok(stored || unstaged)
    }

    fn write_dataset(&mut self, name: &str, dims: &[usize], data: &[f64]) -> Result<()> {
        let mut buffer = allocate(data.len())?;
        buffer.extend_from_slice(data);

        let array = ArrayD::from_shape_vec(IxDyn(dims), buffer)
            .map_err(|e| Error::WriteFailed(e.to_string()))?;

        self.delete_dataset(name)?;
        self.staged.push((name.to_string(), array));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.staged.is_empty() && self.deleted.is_empty() && self.archive.is_some() {
            return Ok(());
        }

        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        // carry over everything on disk that has not been removed or replaced
        if let Some(archive) = self.archive.as_mut() {
            for i in 0..archive.len() {
                let entry = archive
                    .by_index_raw(i)
                    .map_err(|e| Error::WriteFailed(e.to_string()))?;
                let removed = dataset_name(entry.name())
                    .map(|name| self.deleted.contains(name))
                    .unwrap_or(false);
                if removed {
                    continue;
                }
                zip.raw_copy_file(entry)
                    .map_err(|e| Error::WriteFailed(e.to_string()))?;
            }
        }

        for (name, array) in &self.staged {
            zip.start_file(member_name(name), options)
                .map_err(|e| Error::WriteFailed(e.to_string()))?;
            array
                .write_npy(&mut zip)
                .map_err(|e| Error::WriteFailed(e.to_string()))?;
        }

        let bytes = zip
            .finish()
            .map_err(|e| Error::WriteFailed(e.to_string()))?
            .into_inner();

        // release the read handle before replacing the file underneath it
        self.archive = None;
        fs::write(&self.path, bytes).map_err(|e| Error::WriteFailed(e.to_string()))?;
        debug!(
            "Wrote {} dataset(s) to {}",
            self.staged.len(),
            self.path.display()
        );

        self.staged.clear();
        self.deleted.clear();
        self.archive = Some(Self::open_archive(&self.path)?);
        Ok(())
    }
}

impl Drop for NpzFile {
    fn drop(&mut self) {
        if !self.staged.is_empty() || !self.deleted.is_empty() {
            warn!(
                "Warning: Unflushed changes to {} were discarded",
                self.path.display()
            );
        }
    }
}

/// Copy the elements selected by a hyperslab out of an ndarray view
fn select<T: Copy>(view: ArrayViewD<'_, T>, slab: &Hyperslab) -> Result<Vec<T>> {
    if view.ndim() != slab.start.len() {
        return Err(Error::NotConformant {
            expected: view.shape().to_vec(),
            found: slab.count.clone(),
        });
    }

    if slab
        .start
        .iter()
        .zip(&slab.count)
        .zip(view.shape())
        .any(|((s, c), d)| s + c > *d)
    {
        return Err(Error::NotConformant {
            expected: view.shape().to_vec(),
            found: slab.count.clone(),
        });
    }

    let selected = view.slice_each_axis(|axis| {
        let k = axis.axis.index();
        Slice::from(slab.start[k]..slab.start[k] + slab.count[k])
    });

    let mut data = Vec::new();
    data.try_reserve_exact(selected.len())
        .map_err(|_| Error::OutOfMemory)?;
    data.extend(selected.iter().copied());
    Ok(data)
}

/// Dataset name of an archive member, `None` for anything but `.npy` files
fn dataset_name(member: &str) -> Option<&str> {
    member.strip_suffix(".npy")
}

fn member_name(dataset: &str) -> String {
    f!("{dataset}.npy")
}

#[cfg(test)]
mod npz_tests {
    use super::*;

    #[test]
    fn member_names() {
        assert_eq!(dataset_name("density.npy"), Some("density"));
        assert_eq!(dataset_name("notes.txt"), None);
        assert_eq!(member_name("density"), "density.npy");
    }

    #[test]
    fn select_from_view() {
        let array = ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0_f32, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap();
        let slab = Hyperslab {
            start: vec![0, 2],
            count: vec![2, 1],
            output_dims: vec![2],
        };
        assert_eq!(select(array.view(), &slab).unwrap(), vec![2.0_f32, 5.0]);
    }

    #[test]
    fn select_out_of_bounds() {
        let array = ArrayD::<f64>::zeros(IxDyn(&[2, 3]));
        let slab = Hyperslab {
            start: vec![2, 0],
            count: vec![1, 3],
            output_dims: vec![3],
        };
        assert!(select(array.view(), &slab).is_err());
    }
}
