//! The reference genome that resolves gene identifiers and genomic windows
//!
//! An [`Ontology`](crate::Ontology) only stores gene identifiers and SNP positions.
//! Everything that requires coordinates is delegated to a [`RefGen`]:
//! - turning stored [`GeneId`]s into full [`Gene`]s
//! - finding the genes flanking a [`Locus`]
//! - drawing random flanking genes for bootstrapping
//!
//! This crate ships [`MemoryRefGen`], a simple in-memory reference genome,
//! and [`CachedRefGen`], a wrapper that memoizes flanking-gene queries of
//! any other [`RefGen`].

use smallvec::SmallVec;

use crate::annotations::{Gene, GeneId, Locus};
use crate::DEFAULT_GENE_LIMIT;

mod cache;
mod memory;

pub use cache::CachedRefGen;
pub use memory::MemoryRefGen;

/// The genes returned for a single locus
///
/// Most queries are capped at a handful of genes, so they are kept inline.
pub type GeneList = SmallVec<[Gene; DEFAULT_GENE_LIMIT]>;

/// The interface of a reference genome
pub trait RefGen {
    /// The name of the reference genome, stored with the ontology
    fn name(&self) -> &str;

    /// Returns the [`Gene`]s for the given IDs
    ///
    /// IDs that are not part of the reference genome are skipped.
    fn from_ids(&self, ids: &[GeneId]) -> Vec<Gene>;

    /// Returns up to `gene_limit` genes within `window_size` bp of `locus`,
    /// closest genes first
    fn flanking_genes(&self, locus: &Locus, gene_limit: usize, window_size: u64) -> GeneList;

    /// Returns random flanking genes with the same `gene_limit` and `window_size`
    ///
    /// The result is used to build a null distribution, so it must not
    /// depend on the genes flanking `locus` itself.
    fn bootstrap_flanking_genes(
        &self,
        locus: &Locus,
        gene_limit: usize,
        window_size: u64,
    ) -> GeneList;
}

impl<R: RefGen + ?Sized> RefGen for &R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn from_ids(&self, ids: &[GeneId]) -> Vec<Gene> {
        (**self).from_ids(ids)
    }

    fn flanking_genes(&self, locus: &Locus, gene_limit: usize, window_size: u64) -> GeneList {
        (**self).flanking_genes(locus, gene_limit, window_size)
    }

    fn bootstrap_flanking_genes(
        &self,
        locus: &Locus,
        gene_limit: usize,
        window_size: u64,
    ) -> GeneList {
        (**self).bootstrap_flanking_genes(locus, gene_limit, window_size)
    }
}
