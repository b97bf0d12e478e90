//! Exact flat index with cosine ranking and two-file persistence

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use askdocs_core::{ChunkMeta, Error, Result};

/// On-disk layout of the binary vector artifact.
///
/// `vectors` holds the normalized rows back to back in insertion order, so the
/// entry count is `vectors.len() / dim`.
#[derive(Serialize, Deserialize)]
struct VectorArtifact {
    dim: u64,
    vectors: Vec<f32>,
}

/// Flat inner-product index over unit-normalized vectors.
///
/// Row `i` of the vector table pairs with `metas[i]`; the two sequences grow
/// in lockstep and appending is the only mutation. Mutators take `&mut self`,
/// so shared deployments wrap the index in `Arc<RwLock<_>>`: queries run
/// concurrently against a stable snapshot while an `add` holds the writer
/// side.
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<f32>,
    metas: Vec<ChunkMeta>,
}

fn normalized(vector: &[f32], dim: usize) -> Result<Vec<f32>> {
    if vector.len() != dim {
        return Err(Error::InvalidInput(format!(
            "vector has dimension {} but the index expects {}",
            vector.len(),
            dim
        )));
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(Error::InvalidInput(
            "vector has zero or non-finite norm".to_string(),
        ));
    }
    Ok(vector.iter().map(|x| x / norm).collect())
}

impl FlatIndex {
    /// Create an empty index. The dimension is fixed for the life of the
    /// instance.
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Configuration(
                "index dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dim,
            vectors: Vec::new(),
            metas: Vec::new(),
        })
    }

    /// The dimension every stored and queried vector must have
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of entries in the index
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }

    /// Append a batch of vectors with their metadata records.
    ///
    /// Every vector is L2-normalized on insertion so that the inner product
    /// at query time is cosine similarity. The whole batch is validated and
    /// normalized before the index is touched; a failed `add` leaves the
    /// index exactly as it was.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, metas: Vec<ChunkMeta>) -> Result<()> {
        if vectors.len() != metas.len() {
            return Err(Error::InvalidInput(format!(
                "got {} vectors but {} metadata records",
                vectors.len(),
                metas.len()
            )));
        }
        let mut staged = Vec::with_capacity(vectors.len() * self.dim);
        for vector in &vectors {
            staged.extend(normalized(vector, self.dim)?);
        }
        self.vectors.extend(staged);
        self.metas.extend(metas);
        Ok(())
    }

    /// Return the `k` entries most similar to `vector`, best first.
    ///
    /// Scores are cosine similarities; ties rank the earlier-inserted row
    /// first. Returns fewer than `k` entries when the index holds fewer.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<(f32, ChunkMeta)>> {
        let probe = normalized(vector, self.dim)?;
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dim)
            .map(|row| row.iter().zip(&probe).map(|(a, b)| a * b).sum::<f32>())
            .enumerate()
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(scored
            .into_iter()
            .filter(|(row, _)| *row < self.metas.len())
            .take(k)
            .map(|(row, score)| (score, self.metas[row].clone()))
            .collect())
    }

    /// Persist the index as two companion artifacts: a bincode vector file
    /// and a JSON metadata file. Both are required to load again.
    pub fn save(&self, index_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> Result<()> {
        let artifact = VectorArtifact {
            dim: self.dim as u64,
            vectors: self.vectors.clone(),
        };
        let mut index_file = BufWriter::new(File::create(index_path.as_ref())?);
        bincode::serialize_into(&mut index_file, &artifact)
            .map_err(|e| Error::Serialization(format!("failed to write vector artifact: {e}")))?;
        index_file.flush()?;

        let mut meta_file = BufWriter::new(File::create(meta_path.as_ref())?);
        serde_json::to_writer_pretty(&mut meta_file, &self.metas)
            .map_err(|e| Error::Serialization(format!("failed to write metadata artifact: {e}")))?;
        meta_file.flush()?;
        Ok(())
    }

    /// Reconstruct an index from its two artifacts.
    ///
    /// The dimension comes from the vector artifact, never from the caller.
    /// Artifacts that cannot be decoded, or that disagree on the entry
    /// count, fail with `Error::CorruptIndex`.
    pub fn load(index_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> Result<Self> {
        let index_file = BufReader::new(File::open(index_path.as_ref())?);
        let artifact: VectorArtifact = bincode::deserialize_from(index_file)
            .map_err(|e| Error::CorruptIndex(format!("failed to decode vector artifact: {e}")))?;

        let dim = artifact.dim as usize;
        if dim == 0 {
            return Err(Error::CorruptIndex(
                "vector artifact declares dimension 0".to_string(),
            ));
        }
        if artifact.vectors.len() % dim != 0 {
            return Err(Error::CorruptIndex(format!(
                "vector payload of {} floats is not a multiple of dimension {}",
                artifact.vectors.len(),
                dim
            )));
        }

        let meta_file = BufReader::new(File::open(meta_path.as_ref())?);
        let metas: Vec<ChunkMeta> = serde_json::from_reader(meta_file)
            .map_err(|e| Error::CorruptIndex(format!("failed to decode metadata artifact: {e}")))?;

        let rows = artifact.vectors.len() / dim;
        if rows != metas.len() {
            return Err(Error::CorruptIndex(format!(
                "vector artifact has {} rows but metadata artifact has {}",
                rows,
                metas.len()
            )));
        }

        debug!("loaded index: dim={}, entries={}", dim, rows);
        Ok(Self {
            dim,
            vectors: artifact.vectors,
            metas,
        })
    }
}
