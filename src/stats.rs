//! Statistical over-representation of ontology terms in gene lists
//!
//! Given a list of candidate genes, e.g. the genes near GWAS hits or the
//! members of a co-expression cluster, [`hypergeom::term_enrichment`]
//! tests every term that contains at least one candidate gene for enrichment
//! using the hypergeometric survival function. The usual entry point is
//! [`Ontology::enrichment`](crate::Ontology::enrichment).
//!
//! The result is an [`EnrichmentTable`] with one [`TermEnrichment`] row
//! per term, sorted by p-value.

use std::io::Write;

use crate::annotations::{GeneId, GeneIds};

pub mod hypergeom;

/// Default p-value cutoff of an enrichment
pub const DEFAULT_PVAL_CUTOFF: f64 = 0.05;

/// The column names of an [`EnrichmentTable`], without `Label`
pub const COLUMNS: [&str; 10] = [
    "TermID",
    "Name",
    "pval",
    "LenTerm",
    "LenOverlap",
    "LenList",
    "LenTotal",
    "Type",
    "TermGenes",
    "Desc",
];

/// Settings of an enrichment analysis
///
/// # Examples
///
/// ```
/// use ontogene::EnrichmentOptions;
///
/// let options = EnrichmentOptions::default()
///     .pval_cutoff(0.01)
///     .gene_filter(["G1", "G2", "G3"])
///     .label("cluster 1");
///
/// assert!((options.cutoff() - 0.01).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    pval_cutoff: f64,
    gene_filter: Option<GeneIds>,
    label: Option<String>,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            pval_cutoff: DEFAULT_PVAL_CUTOFF,
            gene_filter: None,
            label: None,
        }
    }
}

impl EnrichmentOptions {
    /// Only terms with a p-value less than or equal to `cutoff` are reported
    #[must_use]
    pub fn pval_cutoff(mut self, cutoff: f64) -> Self {
        self.pval_cutoff = cutoff;
        self
    }

    /// Restricts the genes of every term to the given genes, e.g. the
    /// genes present on an expression platform
    ///
    /// The background population is not restricted.
    #[must_use]
    pub fn gene_filter<I, G>(mut self, genes: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GeneId>,
    {
        self.gene_filter = Some(genes.into_iter().map(Into::into).collect());
        self
    }

    /// Attaches a label to every row of the result
    #[must_use]
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// The p-value cutoff
    pub fn cutoff(&self) -> f64 {
        self.pval_cutoff
    }

    /// The gene filter, if any
    pub fn filter(&self) -> Option<&GeneIds> {
        self.gene_filter.as_ref()
    }

    /// The label, if any
    pub fn get_label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// The enrichment statistics of a single term
#[derive(Debug, Clone, PartialEq)]
pub struct TermEnrichment {
    term_id: String,
    name: String,
    pvalue: f64,
    len_term: u64,
    len_overlap: u64,
    len_list: u64,
    len_total: u64,
    term_type: String,
    term_genes: Vec<GeneId>,
    desc: String,
    label: Option<String>,
}

impl TermEnrichment {
    /// The ID of the term
    pub fn term_id(&self) -> &str {
        &self.term_id
    }

    /// The name of the term
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the p-value of the enrichment
    ///
    /// The p-value is the probability to observe at least
    /// [`TermEnrichment::len_overlap`] term genes in the gene list by chance
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// The number of (filtered) genes of the term
    pub fn len_term(&self) -> u64 {
        self.len_term
    }

    /// The number of term genes in the gene list
    pub fn len_overlap(&self) -> u64 {
        self.len_overlap
    }

    /// The number of genes in the gene list
    pub fn len_list(&self) -> u64 {
        self.len_list
    }

    /// The number of genes associated to any term
    pub fn len_total(&self) -> u64 {
        self.len_total
    }

    /// The type of the term
    pub fn term_type(&self) -> &str {
        &self.term_type
    }

    /// The genes of the gene list that belong to the term, sorted
    pub fn term_genes(&self) -> &[GeneId] {
        &self.term_genes
    }

    /// The description of the term
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// The label of the enrichment run
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the fold enrichment over the background population
    ///
    /// `(LenOverlap / LenList) / (LenTerm / LenTotal)`
    #[allow(clippy::cast_precision_loss)]
    pub fn fold_enrichment(&self) -> f64 {
        (self.len_overlap as f64 / self.len_list as f64)
            / (self.len_term as f64 / self.len_total as f64)
    }

    fn write_tsv<W: Write>(&self, mut writer: W, with_label: bool) -> std::io::Result<()> {
        let genes: Vec<&str> = self.term_genes.iter().map(GeneId::as_str).collect();
        write!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.term_id,
            self.name,
            self.pvalue,
            self.len_term,
            self.len_overlap,
            self.len_list,
            self.len_total,
            self.term_type,
            genes.join(","),
            self.desc
        )?;
        if with_label {
            write!(writer, "\t{}", self.label.as_deref().unwrap_or_default())?;
        }
        writeln!(writer)
    }
}

/// The result of an enrichment analysis, sorted by ascending p-value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentTable {
    rows: Vec<TermEnrichment>,
}

impl EnrichmentTable {
    /// Joins several tables, e.g. of differently labelled runs, into one
    ///
    /// The rows are sorted by p-value again.
    pub fn concat<I: IntoIterator<Item = EnrichmentTable>>(tables: I) -> Self {
        let mut rows: Vec<TermEnrichment> =
            tables.into_iter().flat_map(|table| table.rows).collect();
        rows.sort_by(|a, b| a.pvalue.total_cmp(&b.pvalue));
        Self { rows }
    }

    /// The number of enriched terms
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no term is enriched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates all rows
    pub fn iter(&self) -> std::slice::Iter<'_, TermEnrichment> {
        self.rows.iter()
    }

    /// Returns the first row of a term
    pub fn get(&self, term_id: &str) -> Option<&TermEnrichment> {
        self.rows.iter().find(|row| row.term_id == term_id)
    }

    /// Writes the table as tab-separated values with a header line
    ///
    /// The `Label` column is only written if any row has a label.
    ///
    /// # Errors
    ///
    /// Returns the errors of the underlying writer
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        let with_label = self.rows.iter().any(|row| row.label.is_some());
        write!(writer, "{}", COLUMNS.join("\t"))?;
        if with_label {
            write!(writer, "\tLabel")?;
        }
        writeln!(writer)?;
        for row in &self.rows {
            row.write_tsv(&mut writer, with_label)?;
        }
        Ok(())
    }
}

impl IntoIterator for EnrichmentTable {
    type Item = TermEnrichment;
    type IntoIter = std::vec::IntoIter<TermEnrichment>;
    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a EnrichmentTable {
    type Item = &'a TermEnrichment;
    type IntoIter = std::slice::Iter<'a, TermEnrichment>;
    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
