use std::collections::HashMap;

use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::annotations::{Gene, GeneId, Locus};
use crate::refgen::{GeneList, RefGen};

/// An in-memory reference genome
///
/// Genes are kept in insertion order and indexed by ID and by chromosome.
///
/// # Examples
///
/// ```
/// use ontogene::{Gene, GeneId, Locus, MemoryRefGen, RefGen};
///
/// let mut refgen = MemoryRefGen::new("Zm5b");
/// refgen.add_gene(Gene::new("G1", "1", 1_000, 2_000));
/// refgen.add_gene(Gene::new("G2", "1", 5_000, 6_000));
/// refgen.add_gene(Gene::new("G3", "2", 1_000, 2_000));
///
/// let flanks = refgen.flanking_genes(&Locus::new("1", 2_500), 4, 10_000);
/// assert_eq!(flanks.len(), 2);
/// assert_eq!(flanks[0].id(), &GeneId::from("G1"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryRefGen {
    name: String,
    genes: Vec<Gene>,
    ids: HashMap<GeneId, usize>,
    chroms: HashMap<String, Vec<usize>>,
}

impl MemoryRefGen {
    /// Constructs an empty reference genome
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a gene to the reference genome
    ///
    /// Returns `false` if a gene with the same ID is already present.
    /// In this case the existing gene is kept.
    pub fn add_gene(&mut self, gene: Gene) -> bool {
        if self.ids.contains_key(gene.id()) {
            return false;
        }
        let idx = self.genes.len();
        self.ids.insert(gene.id().clone(), idx);

        let chrom = self.chroms.entry(gene.chrom().to_string()).or_default();
        let genes = &self.genes;
        let pos = chrom.partition_point(|other| genes[*other].start() <= gene.start());
        chrom.insert(pos, idx);

        self.genes.push(gene);
        true
    }

    /// Returns the gene with the given ID
    pub fn gene(&self, id: &GeneId) -> Option<&Gene> {
        self.ids.get(id).map(|idx| &self.genes[*idx])
    }

    /// The number of genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the reference genome contains no genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Iterates all genes in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Gene> {
        self.genes.iter()
    }
}

impl RefGen for MemoryRefGen {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_ids(&self, ids: &[GeneId]) -> Vec<Gene> {
        ids.iter()
            .filter_map(|id| {
                let gene = self.gene(id);
                if gene.is_none() {
                    debug!("Gene {} is not part of {}", id, self.name);
                }
                gene.cloned()
            })
            .collect()
    }

    fn flanking_genes(&self, locus: &Locus, gene_limit: usize, window_size: u64) -> GeneList {
        let Some(chrom) = self.chroms.get(locus.chrom()) else {
            trace!("No genes on chromosome {}", locus.chrom());
            return GeneList::new();
        };
        let mut candidates: Vec<(u64, &Gene)> = chrom
            .iter()
            .map(|idx| &self.genes[*idx])
            .filter_map(|gene| {
                locus
                    .distance(gene)
                    .filter(|distance| *distance <= window_size)
                    .map(|distance| (distance, gene))
            })
            .collect();
        // stable: equally distant genes stay ordered by start
        candidates.sort_by_key(|(distance, _)| *distance);
        candidates
            .into_iter()
            .take(gene_limit)
            .map(|(_, gene)| gene.clone())
            .collect()
    }

    fn bootstrap_flanking_genes(
        &self,
        locus: &Locus,
        gene_limit: usize,
        window_size: u64,
    ) -> GeneList {
        let mut rng = rand::thread_rng();
        let Some(anchor) = self.genes.choose(&mut rng) else {
            return GeneList::new();
        };
        let random_locus = Locus::new(anchor.chrom(), anchor.midpoint());
        trace!("Bootstrapping {} with {}", locus, random_locus);
        self.flanking_genes(&random_locus, gene_limit, window_size)
    }
}
