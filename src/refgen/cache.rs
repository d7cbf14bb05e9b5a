use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::annotations::{Gene, GeneId, Locus};
use crate::refgen::{GeneList, RefGen};

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FlankKey {
    locus: Locus,
    gene_limit: usize,
    window_size: u64,
}

/// Memoizes the flanking-gene queries of another [`RefGen`]
///
/// Flanking genes are requested for the same loci over and over again,
/// e.g. once per term and co-expression network. `CachedRefGen` stores the
/// result of [`RefGen::flanking_genes`] per `(locus, gene_limit, window_size)`.
///
/// Bootstrapped flanking genes are random and are never cached.
///
/// # Examples
///
/// ```
/// use ontogene::{CachedRefGen, Gene, Locus, MemoryRefGen, RefGen};
///
/// let mut refgen = MemoryRefGen::new("Zm5b");
/// refgen.add_gene(Gene::new("G1", "1", 1_000, 2_000));
///
/// let cached = CachedRefGen::new(refgen);
/// let locus = Locus::new("1", 2_500);
///
/// assert_eq!(cached.flanking_genes(&locus, 4, 10_000).len(), 1);
/// assert_eq!(cached.len(), 1);
///
/// cached.invalidate();
/// assert!(cached.is_empty());
/// ```
#[derive(Debug)]
pub struct CachedRefGen<R> {
    inner: R,
    cache: RefCell<HashMap<FlankKey, GeneList>>,
}

impl<R: RefGen> CachedRefGen<R> {
    /// Wraps `inner` with an empty cache
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Removes all cached results
    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }

    /// The number of cached queries
    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Returns `true` if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// Returns the wrapped reference genome
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns the wrapped reference genome and drops the cache
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RefGen> RefGen for CachedRefGen<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn from_ids(&self, ids: &[GeneId]) -> Vec<Gene> {
        self.inner.from_ids(ids)
    }

    fn flanking_genes(&self, locus: &Locus, gene_limit: usize, window_size: u64) -> GeneList {
        let key = FlankKey {
            locus: locus.clone(),
            gene_limit,
            window_size,
        };
        if let Some(genes) = self.cache.borrow().get(&key) {
            trace!("Cache hit for {}", locus);
            return genes.clone();
        }
        let genes = self.inner.flanking_genes(locus, gene_limit, window_size);
        self.cache.borrow_mut().insert(key, genes.clone());
        genes
    }

    fn bootstrap_flanking_genes(
        &self,
        locus: &Locus,
        gene_limit: usize,
        window_size: u64,
    ) -> GeneList {
        self.inner
            .bootstrap_flanking_genes(locus, gene_limit, window_size)
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;

    struct CountingRefGen {
        calls: Cell<usize>,
    }

    impl RefGen for CountingRefGen {
        fn name(&self) -> &str {
            "counting"
        }

        fn from_ids(&self, _ids: &[GeneId]) -> Vec<Gene> {
            Vec::new()
        }

        fn flanking_genes(&self, locus: &Locus, _: usize, _: u64) -> GeneList {
            self.calls.set(self.calls.get() + 1);
            let mut genes = GeneList::new();
            genes.push(Gene::new("G1", locus.chrom(), locus.pos(), locus.pos() + 10));
            genes
        }

        fn bootstrap_flanking_genes(&self, locus: &Locus, limit: usize, window: u64) -> GeneList {
            self.flanking_genes(locus, limit, window)
        }
    }

    #[test]
    fn same_arguments_are_cached() {
        let cached = CachedRefGen::new(CountingRefGen {
            calls: Cell::new(0),
        });
        let locus = Locus::new("1", 100);
        cached.flanking_genes(&locus, 4, 1_000);
        cached.flanking_genes(&locus, 4, 1_000);
        assert_eq!(cached.inner().calls.get(), 1);

        cached.flanking_genes(&locus, 4, 2_000);
        cached.flanking_genes(&locus, 2, 1_000);
        cached.flanking_genes(&Locus::new("2", 100), 4, 1_000);
        assert_eq!(cached.inner().calls.get(), 4);
        assert_eq!(cached.len(), 4);
    }

    #[test]
    fn invalidate_forces_new_query() {
        let cached = CachedRefGen::new(CountingRefGen {
            calls: Cell::new(0),
        });
        let locus = Locus::new("1", 100);
        cached.flanking_genes(&locus, 4, 1_000);
        cached.invalidate();
        assert!(cached.is_empty());
        cached.flanking_genes(&locus, 4, 1_000);
        assert_eq!(cached.inner().calls.get(), 2);
    }

    #[test]
    fn bootstrap_is_not_cached() {
        let cached = CachedRefGen::new(CountingRefGen {
            calls: Cell::new(0),
        });
        let locus = Locus::new("1", 100);
        cached.bootstrap_flanking_genes(&locus, 4, 1_000);
        cached.bootstrap_flanking_genes(&locus, 4, 1_000);
        assert_eq!(cached.inner().calls.get(), 2);
        assert!(cached.is_empty());
    }
}
