#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use thiserror::Error;

pub mod annotations;
pub mod ontology;
pub mod parser;
pub mod refgen;
pub mod stats;
pub mod store;
pub mod term;

pub use annotations::{Gene, GeneId, Genes, Locus};
pub use ontology::Ontology;
pub use refgen::{CachedRefGen, MemoryRefGen, RefGen};
pub use stats::{EnrichmentOptions, EnrichmentTable, TermEnrichment};
pub use store::TermStore;
pub use term::Term;

/// Default window (in bp) around a locus when searching flanking genes
pub const DEFAULT_WINDOW_SIZE: u64 = 100_000;
/// Default maximum number of flanking genes per locus
pub const DEFAULT_GENE_LIMIT: usize = 4;

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OntologyError {
    /// A file to import could not be opened
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Invalid options or data provided by the caller
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A filter pattern is not a valid regular expression
    #[error("invalid filter pattern")]
    InvalidPattern(#[from] regex::Error),
    /// The underlying database failed or is unavailable
    #[error("storage error")]
    Storage(#[from] rusqlite::Error),
    /// Reading an input stream failed
    #[error("unable to read input")]
    Io(#[from] std::io::Error),
}

/// Shortcut for `Result<T, OntologyError>`
pub type OntologyResult<T> = Result<T, OntologyError>;
