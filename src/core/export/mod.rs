//! Export orchestration and batch processing
//!
//! This module provides the core export logic, including:
//! - Partitioning fetched articles into fixed-size batches
//! - Packing each batch into its own archive container
//! - Deterministic entry and artifact naming
//! - Progress tracking and the summary of each run

pub mod archive;
pub mod batch;
pub mod coordinator;
pub mod naming;
pub mod progress;
pub mod summary;

pub use archive::{ArchiveBuilder, Artifact, Container, ContainerFolder};
pub use batch::{partition, Batch, Batcher};
pub use coordinator::ExportPipeline;
pub use progress::{PipelineState, ProgressSnapshot, ProgressTracker};
pub use summary::{ArtifactReport, ExportSummary};
