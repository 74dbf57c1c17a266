//! Thin adapter over the Manifold column-family KVS: connection lifecycle,
//! table-name conventions, and the metadata table.
//!
//! This module intentionally stays a thin pass-through — the KVS itself is
//! an external collaborator (§1 Out of scope). Representations open their
//! own tables directly against the transactions handed back here.

use std::sync::Arc;

use manifold::column_family::{ColumnFamily, ColumnFamilyDatabase};
use manifold::TableDefinition;

use crate::error::{GraphError, GraphResult};
use crate::options::{GraphOpts, GraphType};

/// Owns the shared KVS connection for one graph: the on-disk database plus
/// the single column family that graph's tables live in.
///
/// `ColumnFamily` is itself a cheap, `Arc`-backed, `Clone + Send + Sync`
/// handle (§5 "shared read-mostly across workers"), but it keeps raw
/// references into the owning `ColumnFamilyDatabase`'s header backend that
/// are only released correctly through that database's own `Drop`. So the
/// two are kept together here, behind one `Arc`, and handed to every
/// per-worker graph handle the engine creates.
#[derive(Clone)]
pub struct Connection {
    db: Arc<ColumnFamilyDatabase>,
    cf: ColumnFamily,
}

impl Connection {
    /// The column family this graph's tables are stored in.
    pub fn cf(&self) -> &ColumnFamily {
        &self.cf
    }

    /// Forces a WAL checkpoint, flushing any buffered writes to the base
    /// file. A no-op when the WAL is disabled (`pool_size == 0`).
    pub fn checkpoint(&self) -> GraphResult<()> {
        self.db
            .checkpoint()
            .map_err(|e| GraphError::Storage(manifold::StorageError::Io(std::io::Error::other(e))))
    }
}

/// Table and index name conventions, matching the source engine's
/// persisted-state layout (§6).
pub mod tables {
    /// Node table: `id -> (in_degree, out_degree)`.
    pub const NODE: &str = "node";
    /// Edge table. Keyed differently per representation (§4.2-§4.4).
    pub const EDGE: &str = "edge";
    /// Adj-only: per-vertex incoming neighbor lists.
    pub const ADJLIST_IN: &str = "adjlistin";
    /// Adj-only: per-vertex outgoing neighbor lists.
    pub const ADJLIST_OUT: &str = "adjlistout";
    /// Small string-keyed metadata table.
    pub const METADATA: &str = "metadata";
    /// Secondary index over the edge table's `src` column.
    pub const IX_EDGE_SRC: &str = "ix_edge_src";
    /// Secondary index over the edge table's `dst` column.
    pub const IX_EDGE_DST: &str = "ix_edge_dst";
    /// Std-only: single-entry counter handing out monotonic edge ids.
    pub const EDGE_COUNTER: &str = "edge_counter";
}

/// Allocates the next monotonically increasing edge id (Std representation
/// only; §4.2 "allocate fresh edge_id").
pub fn next_edge_id(txn: &manifold::WriteTransaction) -> GraphResult<crate::model::NodeId> {
    let def: TableDefinition<&str, u32> = TableDefinition::new(tables::EDGE_COUNTER);
    let mut table = txn.open_table(def)?;
    let next = table.get("next")?.map(|guard| guard.value()).unwrap_or(0) + 1;
    table.insert("next", next)?;
    Ok(next)
}

/// Opens (or creates) the on-disk database and the single column family a
/// graph instance lives in.
///
/// One `ColumnFamilyDatabase` connection is opened per graph, matching
/// §4.6's "one KVS connection per graph". When `create_new` is set, any
/// prior column family of the same name is dropped first so the graph
/// starts from empty tables.
pub fn open_connection(opts: &GraphOpts) -> GraphResult<Connection> {
    if opts.create_new {
        std::fs::create_dir_all(&opts.db_dir)
            .map_err(|e| GraphError::Storage(manifold::StorageError::Io(e)))?;
    }
    let db = ColumnFamilyDatabase::builder()
        .pool_size(opts.pool_size)
        .open(opts.path())
        .map_err(|e| GraphError::Storage(manifold::StorageError::Io(std::io::Error::other(e))))?;

    if opts.create_new && db.list_column_families().contains(&opts.db_name) {
        #[cfg(feature = "logging")]
        log::debug!("dropping existing column family '{}' (create_new)", opts.db_name);
        db.delete_column_family(&opts.db_name)
            .map_err(|e| GraphError::Storage(manifold::StorageError::Io(std::io::Error::other(e))))?;
    }

    let cf = db
        .column_family_or_create(&opts.db_name)
        .map_err(|e| GraphError::Storage(manifold::StorageError::Io(std::io::Error::other(e))))?;

    #[cfg(feature = "logging")]
    log::info!(
        "opened graph '{}' at {:?} (repr={:?})",
        opts.db_name,
        opts.path(),
        opts.repr
    );

    Ok(Connection {
        db: Arc::new(db),
        cf,
    })
}

fn repr_tag(repr: GraphType) -> &'static str {
    match repr {
        GraphType::Std => "std",
        GraphType::Adj => "adj",
        GraphType::EKey => "ekey",
    }
}

fn bool_tag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Metadata as replayed from an existing graph on restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMetadata {
    /// Graph name as it was created with.
    pub db_name: String,
    /// Directory as it was created with.
    pub db_dir: String,
    pub is_directed: bool,
    pub is_weighted: bool,
    pub read_optimize: bool,
    pub repr: GraphType,
}

/// Writes the metadata table for a freshly created graph.
pub fn write_metadata(txn: &manifold::WriteTransaction, opts: &GraphOpts) -> GraphResult<()> {
    let def: TableDefinition<&str, &str> = TableDefinition::new(tables::METADATA);
    let mut table = txn.open_table(def)?;
    table.insert("db_name", opts.db_name.as_str())?;
    table.insert("db_dir", opts.db_dir.as_str())?;
    table.insert("is_directed", bool_tag(opts.is_directed))?;
    table.insert("is_weighted", bool_tag(opts.is_weighted))?;
    table.insert("read_optimize", bool_tag(opts.read_optimize))?;
    table.insert("repr", repr_tag(opts.repr))?;
    Ok(())
}

/// Reads the metadata table left behind by a prior run.
pub fn read_metadata(txn: &manifold::ReadTransaction) -> GraphResult<StoredMetadata> {
    let def: TableDefinition<&str, &str> = TableDefinition::new(tables::METADATA);
    let table = txn.open_table(def)?;

    let get = |key: &str| -> GraphResult<String> {
        table
            .get(key)?
            .map(|guard| guard.value().to_string())
            .ok_or_else(|| GraphError::Configuration(format!("metadata key '{key}' missing")))
    };

    let db_name = get("db_name")?;
    let db_dir = get("db_dir")?;
    let is_directed = get("is_directed")? == "true";
    let is_weighted = get("is_weighted")? == "true";
    let read_optimize = get("read_optimize")? == "true";
    let repr = GraphType::parse(&get("repr")?)?;

    Ok(StoredMetadata {
        db_name,
        db_dir,
        is_directed,
        is_weighted,
        read_optimize,
        repr,
    })
}

/// Rejects a restore whose requested options contradict the persisted
/// metadata (§3 Metadata table; §7 Configuration error).
pub fn check_compatible(stored: &StoredMetadata, opts: &GraphOpts) -> GraphResult<()> {
    if stored.repr != opts.repr {
        return Err(GraphError::Configuration(format!(
            "graph '{}' was created as {:?} but restore requested {:?}",
            opts.db_name, stored.repr, opts.repr
        )));
    }
    if stored.is_directed != opts.is_directed {
        return Err(GraphError::Configuration(
            "is_directed does not match the graph's persisted metadata".to_string(),
        ));
    }
    if stored.is_weighted != opts.is_weighted {
        return Err(GraphError::Configuration(
            "is_weighted does not match the graph's persisted metadata".to_string(),
        ));
    }
    if stored.read_optimize != opts.read_optimize {
        return Err(GraphError::Configuration(
            "read_optimize does not match the graph's persisted metadata".to_string(),
        ));
    }
    Ok(())
}
