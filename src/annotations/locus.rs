use std::collections::HashSet;
use std::fmt::Display;

use crate::annotations::Gene;

/// A set of loci
pub type Loci = HashSet<Locus>;

/// A genomic locus, most commonly a SNP
///
/// A locus is identified only by its chromosome and position.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Locus {
    chrom: String,
    pos: u64,
}

impl Locus {
    /// Constructs a new [`Locus`]
    pub fn new(chrom: &str, pos: u64) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
        }
    }

    /// The chromosome of the locus
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// The position on the chromosome
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Returns the distance in bp between the locus and a [`Gene`]
    ///
    /// The distance is `0` if the locus lies within the gene and
    /// `None` if the gene is on a different chromosome.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontogene::{Gene, Locus};
    ///
    /// let gene = Gene::new("G1", "1", 1_000, 2_000);
    ///
    /// assert_eq!(Locus::new("1", 1_500).distance(&gene), Some(0));
    /// assert_eq!(Locus::new("1", 500).distance(&gene), Some(500));
    /// assert_eq!(Locus::new("1", 2_100).distance(&gene), Some(100));
    /// assert_eq!(Locus::new("2", 1_500).distance(&gene), None);
    /// ```
    pub fn distance(&self, gene: &Gene) -> Option<u64> {
        if self.chrom != gene.chrom() {
            return None;
        }
        if self.pos < gene.start() {
            Some(gene.start() - self.pos)
        } else if self.pos > gene.end() {
            Some(self.pos - gene.end())
        } else {
            Some(0)
        }
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.chrom, self.pos)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn loci_are_unique_by_position() {
        let mut loci = Loci::new();
        loci.insert(Locus::new("1", 100));
        loci.insert(Locus::new("1", 100));
        loci.insert(Locus::new("2", 100));
        assert_eq!(loci.len(), 2);
    }

    #[test]
    fn distance_at_gene_borders() {
        let gene = Gene::new("G1", "chr3", 1_000, 2_000);
        assert_eq!(Locus::new("chr3", 1_000).distance(&gene), Some(0));
        assert_eq!(Locus::new("chr3", 2_000).distance(&gene), Some(0));
        assert_eq!(Locus::new("chr3", 999).distance(&gene), Some(1));
        assert_eq!(Locus::new("chr3", 2_001).distance(&gene), Some(1));
    }
}
