//! Graph configuration: representation tag and the options builder.

use crate::error::{GraphError, GraphResult};

/// Which physical storage representation backs a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphType {
    /// Separate node/edge tables plus src/dst secondary indices (§4.2).
    Std,
    /// Node table plus packed in-/out-adjacency side tables (§4.3).
    Adj,
    /// Single `(src, dst)`-keyed table with a sentinel node row (§4.4).
    EKey,
}

impl GraphType {
    /// Parses a representation tag, failing with a configuration error on
    /// anything unrecognized.
    pub fn parse(tag: &str) -> GraphResult<Self> {
        match tag {
            "std" | "Std" | "standard" => Ok(Self::Std),
            "adj" | "Adj" | "adjacency" => Ok(Self::Adj),
            "ekey" | "EKey" | "edgekey" => Ok(Self::EKey),
            other => Err(GraphError::Configuration(format!(
                "unknown graph representation: {other}"
            ))),
        }
    }
}

/// Immutable, validated configuration for a graph instance.
///
/// Constructed via [`GraphOptsBuilder`], mirroring the builder pattern used
/// by `ColumnFamilyDatabaseBuilder` in `manifold::column_family::builder`.
#[derive(Debug, Clone)]
pub struct GraphOpts {
    /// If true, an empty graph is (re)created at `db_dir/db_name`; if
    /// false, an existing graph is restored and its metadata is checked
    /// for compatibility with the other options here.
    pub create_new: bool,
    /// Cache `(in_degree, out_degree)` in node records.
    pub read_optimize: bool,
    /// If false, every edge insert/delete mirrors the reverse direction.
    pub is_directed: bool,
    /// If false, weight storage is elided and `get_edge_weight` fails.
    pub is_weighted: bool,
    /// Defer secondary-index construction until `create_indices()`.
    pub optimize_create: bool,
    /// The active storage representation.
    pub repr: GraphType,
    /// Directory the graph's files live under.
    pub db_dir: String,
    /// Graph name; the on-disk file is `db_dir/db_name`.
    pub db_name: String,
    /// Maximum pooled file handles, forwarded to
    /// `ColumnFamilyDatabaseBuilder::pool_size`. `0` disables the WAL.
    pub pool_size: usize,
}

impl GraphOpts {
    /// Starts building a new set of options for `db_name`.
    pub fn builder(db_name: impl Into<String>) -> GraphOptsBuilder {
        GraphOptsBuilder::new(db_name)
    }

    /// The full on-disk path `db_dir/db_name`.
    pub fn path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.db_dir).join(&self.db_name)
    }

    fn validate(&self) -> GraphResult<()> {
        if self.db_name.trim().is_empty() {
            return Err(GraphError::Configuration(
                "db_name must not be empty".to_string(),
            ));
        }
        if self.db_dir.trim().is_empty() {
            return Err(GraphError::Configuration(
                "db_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`GraphOpts`].
pub struct GraphOptsBuilder {
    create_new: bool,
    read_optimize: bool,
    is_directed: bool,
    is_weighted: bool,
    optimize_create: bool,
    repr: GraphType,
    db_dir: String,
    db_name: String,
    pool_size: usize,
}

impl GraphOptsBuilder {
    fn new(db_name: impl Into<String>) -> Self {
        Self {
            create_new: true,
            read_optimize: true,
            is_directed: true,
            is_weighted: false,
            optimize_create: false,
            repr: GraphType::Std,
            db_dir: ".".to_string(),
            db_name: db_name.into(),
            pool_size: 64,
        }
    }

    /// Sets whether a fresh graph is created (`true`) or an existing one
    /// restored (`false`). Default: `true`.
    #[must_use]
    pub fn create_new(mut self, value: bool) -> Self {
        self.create_new = value;
        self
    }

    /// Enables or disables cached degree counters. Default: `true`.
    #[must_use]
    pub fn read_optimize(mut self, value: bool) -> Self {
        self.read_optimize = value;
        self
    }

    /// Sets directedness. Default: `true`.
    #[must_use]
    pub fn is_directed(mut self, value: bool) -> Self {
        self.is_directed = value;
        self
    }

    /// Enables or disables weight storage. Default: `false`.
    #[must_use]
    pub fn is_weighted(mut self, value: bool) -> Self {
        self.is_weighted = value;
        self
    }

    /// Defers secondary-index creation to an explicit `create_indices()`
    /// call. Default: `false`.
    #[must_use]
    pub fn optimize_create(mut self, value: bool) -> Self {
        self.optimize_create = value;
        self
    }

    /// Selects the physical representation. Default: [`GraphType::Std`].
    #[must_use]
    pub fn repr(mut self, repr: GraphType) -> Self {
        self.repr = repr;
        self
    }

    /// Sets the directory the graph's file lives under. Default: `"."`.
    #[must_use]
    pub fn db_dir(mut self, dir: impl Into<String>) -> Self {
        self.db_dir = dir.into();
        self
    }

    /// Sets the pooled file-handle count; `0` disables the WAL, matching
    /// `ColumnFamilyDatabaseBuilder::without_wal`. Default: `64`.
    #[must_use]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Validates and finalizes the options.
    pub fn build(self) -> GraphResult<GraphOpts> {
        let opts = GraphOpts {
            create_new: self.create_new,
            read_optimize: self.read_optimize,
            is_directed: self.is_directed,
            is_weighted: self.is_weighted,
            optimize_create: self.optimize_create,
            repr: self.repr,
            db_dir: self.db_dir,
            db_name: self.db_name,
            pool_size: self.pool_size,
        };
        opts.validate()?;
        Ok(opts)
    }
}
