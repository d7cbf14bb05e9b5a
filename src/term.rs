//! A [`Term`] is a single ontology category with its gene and locus members
//!
//! Terms are plain values. They are created by the caller and stored with
//! [`Ontology::add_term`](crate::Ontology::add_term), or reconstructed from
//! storage with [`Ontology::term`](crate::Ontology::term).

use std::fmt::Display;

use crate::annotations::{Gene, GeneIds, Genes, Loci, Locus};
use crate::refgen::{GeneList, RefGen};

/// The flanking genes of a single locus of a [`Term`]
#[derive(Debug, Clone)]
pub struct FlankingGenes {
    locus: Locus,
    genes: GeneList,
}

impl FlankingGenes {
    /// The locus (SNP) of the term
    pub fn locus(&self) -> &Locus {
        &self.locus
    }

    /// The genes flanking the locus, closest first
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }
}

/// A single ontology term, e.g. a GO category or a MapMan bin
///
/// The genes and loci of a term are sets, so adding the same
/// gene or locus twice has no effect.
///
/// # Examples
///
/// ```
/// use ontogene::{Gene, Locus, Term};
///
/// let mut term = Term::new("GO:0008150", "biological_process", "biological_process", "");
/// assert!(term.add_gene(Gene::new("G1", "1", 100, 200)));
/// assert!(!term.add_gene(Gene::new("G1", "1", 100, 200)));
/// term.add_snp(Locus::new("1", 150));
///
/// // The length of a term is the number of genes, loci are not counted
/// assert_eq!(term.len(), 1);
/// assert_eq!(term.snps().len(), 1);
/// assert_eq!(term.to_string(), "Term: GO:0008150, 1 genes, 1 SNPs");
/// ```
#[derive(Debug, Default, Clone)]
pub struct Term {
    id: String,
    name: String,
    term_type: String,
    desc: String,
    genes: Genes,
    snps: Loci,
}

impl Term {
    /// Constructs a new [`Term`] without genes or loci
    pub fn new(id: &str, name: &str, term_type: &str, desc: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            term_type: term_type.to_string(),
            desc: desc.to_string(),
            ..Default::default()
        }
    }

    /// Constructs a new [`Term`] with genes and loci
    ///
    /// Duplicated genes or loci are collapsed.
    pub fn with_members<G, L>(
        id: &str,
        name: &str,
        term_type: &str,
        desc: &str,
        genes: G,
        snps: L,
    ) -> Self
    where
        G: IntoIterator<Item = Gene>,
        L: IntoIterator<Item = Locus>,
    {
        let mut term = Term::new(id, name, term_type, desc);
        term.genes.extend(genes);
        term.snps.extend(snps);
        term
    }

    /// The unique ID of the term, e.g. `GO:0008150` or `1.1.2`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name of the term
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category or namespace, e.g. `biological_process`
    pub fn term_type(&self) -> &str {
        &self.term_type
    }

    /// The free-text description
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// The genes of the term
    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    /// The IDs of all genes of the term
    pub fn gene_ids(&self) -> GeneIds {
        self.genes.iter().map(|gene| gene.id().clone()).collect()
    }

    /// The loci (SNPs) of the term
    pub fn snps(&self) -> &Loci {
        &self.snps
    }

    /// The number of genes in the term
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the term has no genes
    ///
    /// Loci are not considered
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Adds a gene to the term
    ///
    /// Returns `false` if the gene was already present
    pub fn add_gene(&mut self, gene: Gene) -> bool {
        self.genes.insert(gene)
    }

    /// Adds a locus to the term
    ///
    /// Returns `false` if the locus was already present
    pub fn add_snp(&mut self, snp: Locus) -> bool {
        self.snps.insert(snp)
    }

    /// Returns all genes flanking any locus of the term
    ///
    /// For every locus, up to `gene_limit` genes within `window_size` bp
    /// are collected from `refgen`. Genes flanking several loci are returned
    /// only once.
    pub fn flanking_genes<R: RefGen>(
        &self,
        refgen: &R,
        window_size: u64,
        gene_limit: usize,
    ) -> Genes {
        self.snps
            .iter()
            .flat_map(|snp| refgen.flanking_genes(snp, gene_limit, window_size))
            .collect()
    }

    /// Returns the flanking genes of each locus of the term, ordered by locus
    ///
    /// Unlike [`Term::flanking_genes`], the mapping from locus to genes is kept.
    pub fn flanking_genes_per_locus<R: RefGen>(
        &self,
        refgen: &R,
        window_size: u64,
        gene_limit: usize,
    ) -> Vec<FlankingGenes> {
        self.sorted_snps()
            .into_iter()
            .map(|snp| FlankingGenes {
                genes: refgen.flanking_genes(snp, gene_limit, window_size),
                locus: snp.clone(),
            })
            .collect()
    }

    /// Returns random flanking genes with the same number of loci,
    /// `window_size` and `gene_limit` as [`Term::flanking_genes`]
    pub fn bootstrap_flanking_genes<R: RefGen>(
        &self,
        refgen: &R,
        window_size: u64,
        gene_limit: usize,
    ) -> Genes {
        self.snps
            .iter()
            .flat_map(|snp| refgen.bootstrap_flanking_genes(snp, gene_limit, window_size))
            .collect()
    }

    /// Returns random flanking genes for each locus of the term, ordered by locus
    pub fn bootstrap_flanking_genes_per_locus<R: RefGen>(
        &self,
        refgen: &R,
        window_size: u64,
        gene_limit: usize,
    ) -> Vec<FlankingGenes> {
        self.sorted_snps()
            .into_iter()
            .map(|snp| FlankingGenes {
                genes: refgen.bootstrap_flanking_genes(snp, gene_limit, window_size),
                locus: snp.clone(),
            })
            .collect()
    }

    /// Returns the loci of the term that are within `window_size` bp of `gene`
    pub fn flanking_snps(&self, gene: &Gene, window_size: u64) -> Vec<&Locus> {
        let mut snps: Vec<&Locus> = self
            .snps
            .iter()
            .filter(|snp| {
                snp.distance(gene)
                    .is_some_and(|distance| distance <= window_size)
            })
            .collect();
        snps.sort();
        snps
    }

    /// Returns a multi-line overview of the term
    pub fn summary(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\nNum SNPs: {}\nNum Genes: {}",
            self.id,
            self.name,
            self.term_type,
            self.desc,
            self.snps.len(),
            self.genes.len()
        )
    }

    fn sorted_snps(&self) -> Vec<&Locus> {
        let mut snps: Vec<&Locus> = self.snps.iter().collect();
        snps.sort();
        snps
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Term: {}, {} genes, {} SNPs",
            self.id,
            self.genes.len(),
            self.snps.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryRefGen;

    fn refgen() -> MemoryRefGen {
        let mut refgen = MemoryRefGen::new("test");
        refgen.add_gene(Gene::new("G1", "1", 10_000, 11_000));
        refgen.add_gene(Gene::new("G2", "1", 20_000, 21_000));
        refgen.add_gene(Gene::new("G3", "1", 30_000, 31_000));
        refgen.add_gene(Gene::new("G4", "2", 10_000, 11_000));
        refgen
    }

    fn term() -> Term {
        let mut term = Term::new("T1", "Term 1", "test", "");
        term.add_snp(Locus::new("1", 15_000));
        term.add_snp(Locus::new("1", 25_000));
        term.add_snp(Locus::new("3", 25_000));
        term
    }

    #[test]
    fn len_counts_genes_only() {
        let mut term = term();
        assert_eq!(term.len(), 0);
        assert!(term.is_empty());
        term.add_gene(Gene::new("G1", "1", 10_000, 11_000));
        term.add_gene(Gene::new("G1", "1", 10_000, 11_000));
        assert_eq!(term.len(), 1);
        assert_eq!(term.snps().len(), 3);
    }

    #[test]
    fn with_members_collapses_duplicates() {
        let term = Term::with_members(
            "T1",
            "",
            "",
            "",
            vec![Gene::new("G1", "1", 1, 2), Gene::new("G1", "1", 1, 2)],
            vec![Locus::new("1", 1), Locus::new("1", 1)],
        );
        assert_eq!(term.len(), 1);
        assert_eq!(term.snps().len(), 1);
    }

    #[test]
    fn chained_flanking_genes_are_unique() {
        let refgen = refgen();
        let genes = term().flanking_genes(&refgen, 100_000, 4);
        // G1, G2, G3 flank both loci on chromosome 1
        assert_eq!(genes.len(), 3);
        assert!(!genes.contains(&Gene::new("G4", "2", 10_000, 11_000)));
    }

    #[test]
    fn flanking_genes_per_locus() {
        let refgen = refgen();
        let flanks = term().flanking_genes_per_locus(&refgen, 6_000, 4);
        assert_eq!(flanks.len(), 3);
        assert_eq!(flanks[0].locus(), &Locus::new("1", 15_000));
        assert_eq!(flanks[0].genes().len(), 2);
        assert_eq!(flanks[1].locus(), &Locus::new("1", 25_000));
        assert_eq!(flanks[1].genes().len(), 2);
        assert_eq!(flanks[2].locus(), &Locus::new("3", 25_000));
        assert!(flanks[2].genes().is_empty());
    }

    #[test]
    fn empty_refgen_yields_empty_sets() {
        let refgen = MemoryRefGen::new("empty");
        assert!(term().flanking_genes(&refgen, 100_000, 4).is_empty());
        assert!(term().bootstrap_flanking_genes(&refgen, 100_000, 4).is_empty());
        assert!(term()
            .bootstrap_flanking_genes_per_locus(&refgen, 100_000, 4)
            .iter()
            .all(|flank| flank.genes().is_empty()));
    }

    #[test]
    fn bootstrap_respects_gene_limit() {
        let refgen = refgen();
        let flanks = term().bootstrap_flanking_genes_per_locus(&refgen, 100_000, 1);
        assert_eq!(flanks.len(), 3);
        for flank in flanks {
            assert_eq!(flank.genes().len(), 1);
        }
    }

    #[test]
    fn flanking_snps() {
        let term = term();
        let gene = Gene::new("G2", "1", 20_000, 21_000);
        assert_eq!(term.flanking_snps(&gene, 1_000).len(), 0);
        let snps = term.flanking_snps(&gene, 5_000);
        assert_eq!(snps, vec![&Locus::new("1", 15_000), &Locus::new("1", 25_000)]);
    }

    #[test]
    fn summary() {
        let mut term = Term::new("T1", "Name", "Type", "Desc");
        term.add_gene(Gene::new("G1", "1", 1, 2));
        assert_eq!(term.summary(), "T1\nName\nType\nDesc\nNum SNPs: 0\nNum Genes: 1");
    }
}
