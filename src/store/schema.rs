//! SQL statements of the term store

/// Database settings applied when the tables are created
pub(crate) const PRAGMAS: &str = "
    PRAGMA page_size = 1024;
    PRAGMA cache_size = 100000;
";

/// Term IDs are unique but not a primary key, so that a term
/// can be replaced by ID with `INSERT OR REPLACE`
pub(crate) const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS globals (
        key TEXT UNIQUE,
        val TEXT
    );
    CREATE TABLE IF NOT EXISTS terms (
        id TEXT UNIQUE,
        name TEXT,
        type TEXT,
        desc TEXT
    );
    CREATE TABLE IF NOT EXISTS relationships (
        term TEXT,
        is_a TEXT
    );
    CREATE TABLE IF NOT EXISTS gene_terms (
        gene TEXT,
        term TEXT
    );
    CREATE TABLE IF NOT EXISTS snp_terms (
        chrom TEXT,
        pos INTEGER,
        term TEXT
    );
";

pub(crate) const CREATE_INDICES: &str = "
    CREATE INDEX IF NOT EXISTS termid ON terms (id);
    CREATE INDEX IF NOT EXISTS termtype ON terms (type);
    CREATE INDEX IF NOT EXISTS relsource ON relationships (term);
    CREATE INDEX IF NOT EXISTS reltarget ON relationships (is_a);
    CREATE INDEX IF NOT EXISTS gene_terms_gene ON gene_terms (gene);
    CREATE INDEX IF NOT EXISTS gene_terms_term ON gene_terms (term);
";

/// Names of all indices created by [`CREATE_INDICES`]
pub(crate) const INDEX_NAMES: [&str; 6] = [
    "termid",
    "termtype",
    "relsource",
    "reltarget",
    "gene_terms_gene",
    "gene_terms_term",
];

pub(crate) const SET_GLOBAL: &str = "INSERT OR REPLACE INTO globals (key, val) VALUES (?1, ?2)";
pub(crate) const GET_GLOBAL: &str = "SELECT val FROM globals WHERE key = ?1";

pub(crate) const INSERT_TERM: &str = "INSERT INTO terms (id, name, type, desc) VALUES (?1, ?2, ?3, ?4)";
pub(crate) const REPLACE_TERM: &str =
    "INSERT OR REPLACE INTO terms (id, name, type, desc) VALUES (?1, ?2, ?3, ?4)";
pub(crate) const INSERT_RELATIONSHIP: &str = "INSERT INTO relationships (term, is_a) VALUES (?1, ?2)";
pub(crate) const INSERT_GENE_TERM: &str = "INSERT INTO gene_terms (gene, term) VALUES (?1, ?2)";
pub(crate) const INSERT_SNP_TERM: &str = "INSERT INTO snp_terms (chrom, pos, term) VALUES (?1, ?2, ?3)";

pub(crate) const DELETE_TERM: &str = "DELETE FROM terms WHERE id = ?1";
pub(crate) const DELETE_GENE_TERMS: &str = "DELETE FROM gene_terms WHERE term = ?1";
pub(crate) const DELETE_SNP_TERMS: &str = "DELETE FROM snp_terms WHERE term = ?1";

pub(crate) const SELECT_TERM: &str = "SELECT id, name, type, desc FROM terms WHERE id = ?1";
pub(crate) const SELECT_TERM_IDS: &str = "SELECT id FROM terms ORDER BY rowid";
pub(crate) const SELECT_TERM_IDS_LIKE: &str = "SELECT id FROM terms WHERE id LIKE ?1 ORDER BY rowid";
pub(crate) const SELECT_TERM_NAMES_LIKE: &str =
    "SELECT id FROM terms WHERE name LIKE ?1 ORDER BY rowid";
pub(crate) const SELECT_TERM_IDS_BY_TYPE: &str = "SELECT id FROM terms WHERE type = ?1 ORDER BY rowid";
pub(crate) const SELECT_TERM_GENES: &str = "SELECT gene FROM gene_terms WHERE term = ?1 ORDER BY rowid";
pub(crate) const SELECT_TERM_SNPS: &str =
    "SELECT chrom, pos FROM snp_terms WHERE term = ?1 ORDER BY rowid";
pub(crate) const SELECT_GENE_TERMS: &str = "SELECT term FROM gene_terms WHERE gene = ?1 ORDER BY rowid";
pub(crate) const SELECT_PARENTS: &str = "SELECT is_a FROM relationships WHERE term = ?1 ORDER BY rowid";
pub(crate) const SELECT_CHILDREN: &str = "SELECT term FROM relationships WHERE is_a = ?1 ORDER BY rowid";

pub(crate) const COUNT_TERMS: &str = "SELECT COUNT(*) FROM terms";
pub(crate) const COUNT_RELATIONSHIPS: &str = "SELECT COUNT(*) FROM relationships";
pub(crate) const COUNT_GENE_TERMS: &str = "SELECT COUNT(*) FROM gene_terms";
pub(crate) const COUNT_SNP_TERMS: &str = "SELECT COUNT(*) FROM snp_terms";
pub(crate) const COUNT_DISTINCT_GENES: &str = "SELECT COUNT(DISTINCT gene) FROM gene_terms";
pub(crate) const COUNT_INDEX: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1";
