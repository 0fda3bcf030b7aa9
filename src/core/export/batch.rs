//! Batch partitioning
//!
//! Splits the fetched result set into contiguous, fixed-size groups. Items are
//! moved into their batch, so dropping a processed [`Batch`] releases its
//! articles.

use crate::domain::{ArchiverError, FetchedArticle, Result};

/// One contiguous group of fetched articles
#[derive(Debug, Clone)]
pub struct Batch {
    /// Zero-based position among all batches
    pub index: usize,
    /// Number of batches in this invocation
    pub total: usize,
    /// Articles in original order
    pub articles: Vec<FetchedArticle>,
}

impl Batch {
    /// One-based batch number, as shown to users
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Number of articles in this batch
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Whether the batch holds no articles
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Whether this is the final batch
    pub fn is_last(&self) -> bool {
        self.number() == self.total
    }
}

/// Partitions articles into batches of a fixed maximum size
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    /// Create a batcher
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when `batch_size` is zero
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ArchiverError::InvalidConfiguration(
                "batch size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { batch_size })
    }

    /// Configured maximum batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `len` items produce
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Split fetched articles into numbered batches
    pub fn split(&self, articles: Vec<FetchedArticle>) -> Vec<Batch> {
        let chunks = chunk(articles, self.batch_size);
        let total = chunks.len();
        chunks
            .into_iter()
            .enumerate()
            .map(|(index, articles)| Batch {
                index,
                total,
                articles,
            })
            .collect()
    }
}

/// Partition `items` into groups of at most `batch_size`, preserving order
///
/// # Errors
///
/// Returns `InvalidConfiguration` when `batch_size` is zero
pub fn partition<T>(items: Vec<T>, batch_size: usize) -> Result<Vec<Vec<T>>> {
    let batcher = Batcher::new(batch_size)?;
    Ok(chunk(items, batcher.batch_size))
}

fn chunk<T>(items: Vec<T>, batch_size: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut iter = items.into_iter();
    loop {
        let group: Vec<T> = iter.by_ref().take(batch_size).collect();
        if group.is_empty() {
            break;
        }
        batches.push(group);
    }
    batches
}
