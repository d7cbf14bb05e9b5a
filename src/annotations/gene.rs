use core::fmt::Debug;
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// A set of genes
///
/// Genes are compared by their [`GeneId`] only, so each gene
/// appears only once.
pub type Genes = HashSet<Gene>;

/// A set of gene identifiers
pub type GeneIds = HashSet<GeneId>;

/// A unique identifier for a [`Gene`]
///
/// Gene IDs are free-text identifiers as used by the reference genome,
/// e.g. `GRMZM2G000014` or `AT1G01010`.
#[derive(Clone, Default, Hash, PartialEq, PartialOrd, Eq, Ord)]
pub struct GeneId {
    inner: String,
}

impl GeneId {
    /// Returns the identifier as `&str`
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for GeneId {
    fn from(value: &str) -> Self {
        GeneId {
            inner: value.to_string(),
        }
    }
}

impl From<String> for GeneId {
    fn from(inner: String) -> Self {
        GeneId { inner }
    }
}

impl AsRef<str> for GeneId {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Debug for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GeneId({})", self.inner)
    }
}

impl Display for GeneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for GeneId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

/// A single gene of the reference genome
///
/// A gene has a unique [`GeneId`] and is located on a chromosome
/// between `start` and `end` (inclusive, 1-based).
#[derive(Default, Debug, Clone)]
pub struct Gene {
    id: GeneId,
    chrom: String,
    start: u64,
    end: u64,
}

impl Gene {
    /// Initializes a new Gene
    ///
    /// `start` and `end` are swapped if given in reverse order
    pub fn new<I: Into<GeneId>>(id: I, chrom: &str, start: u64, end: u64) -> Gene {
        Gene {
            id: id.into(),
            chrom: chrom.to_string(),
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// The unique [`GeneId`] of the gene
    pub fn id(&self) -> &GeneId {
        &self.id
    }

    /// The chromosome the gene is located on
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// The first base of the gene
    pub fn start(&self) -> u64 {
        self.start
    }

    /// The last base of the gene
    pub fn end(&self) -> u64 {
        self.end
    }

    /// The position between start and end, used to order genes by proximity
    pub fn midpoint(&self) -> u64 {
        self.start + (self.end - self.start) / 2
    }
}

impl PartialEq for Gene {
    fn eq(&self, other: &Gene) -> bool {
        self.id == other.id
    }
}
impl Eq for Gene {}

impl Hash for Gene {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}:{}-{})", self.id, self.chrom, self.start, self.end)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn genes_are_unique_by_id() {
        let mut genes = Genes::new();
        assert!(genes.insert(Gene::new("G1", "1", 100, 200)));
        assert!(!genes.insert(Gene::new("G1", "2", 5, 10)));
        assert!(genes.insert(Gene::new("G2", "1", 100, 200)));
        assert_eq!(genes.len(), 2);
    }

    #[test]
    fn reversed_coordinates() {
        let gene = Gene::new("G1", "1", 200, 100);
        assert_eq!(gene.start(), 100);
        assert_eq!(gene.end(), 200);
        assert_eq!(gene.midpoint(), 150);
    }

    #[test]
    fn gene_id_display() {
        let id = GeneId::from("GRMZM2G000014");
        assert_eq!(id.to_string(), "GRMZM2G000014");
        assert_eq!(&id, "GRMZM2G000014");
    }
}
