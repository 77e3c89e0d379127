//! Rack/server placement strategies.
//!
//! Each strategy assigns every block id a `(rack, server_index)` pair.
//! Ported from the original `Placement::strategyN_generate` family: every
//! strategy shares a per-rack round-robin `server_index` counter
//! (`rack_next_srv`) and differs only in how it maps `(row, col)` to a
//! rack. Strategy numbering and names match the original 1-7 exactly so a
//! reader who knows one recognizes the other.

use std::collections::HashMap;

use crate::error::{GridError, GridResult};
use crate::grid::CodeParams;

/// Placement of one block: its grid coordinates plus target rack/server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementEntry {
    pub block_id: usize,
    pub row: usize,
    pub col: usize,
    pub rack: usize,
    pub server_index: usize,
}

/// The seven deterministic placement strategies, numbered as in the
/// original driver so operators can cross-reference runbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 1: every block on its own rack (`rack = block_id`), server 0.
    DistinctRack,
    /// 2: one rack per grid column, server round-robin within the rack.
    ColumnGroup,
    /// 3: one rack per grid row, server round-robin within the rack.
    RowGroup,
    /// 4: columns grouped in bands of `m1`, one rack per band.
    ColumnStripM1,
    /// 5: rows grouped in bands of `m2`, one rack per band.
    RowStripM2,
    /// 6: `(m2+1) x (m1+1)` tiles each get a rack; tile corners
    /// (`row % (m2+1) == 0 && col % (m1+1) == 0`) all land on one shared
    /// "aggregator" rack instead.
    TilePlusAggregator,
    /// 7: `rack = (row + col) % rack_count`.
    Diagonal,
}

/// Rack/server topology a placement strategy is generated against.
#[derive(Debug, Clone, Copy)]
pub struct Topology {
    pub rack_count: usize,
    pub servers_per_rack: usize,
    pub base_port: u16,
}

/// Full block_id -> PlacementEntry table for one code/strategy/topology
/// combination.
#[derive(Debug, Clone)]
pub struct PlacementMap {
    params: CodeParams,
    topology: Topology,
    entries: HashMap<usize, PlacementEntry>,
}

impl PlacementMap {
    pub fn get(&self, block_id: usize) -> GridResult<&PlacementEntry> {
        self.entries
            .get(&block_id)
            .ok_or(GridError::UnknownBlock(block_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn params(&self) -> CodeParams {
        self.params
    }

    /// The TCP port a block's assigned server listens on.
    pub fn port_for(&self, entry: &PlacementEntry) -> u16 {
        self.topology.base_port + entry.server_index as u16
    }

    pub fn entries(&self) -> impl Iterator<Item = &PlacementEntry> {
        self.entries.values()
    }
}

/// Generate the full placement table for `strategy` over `params` and
/// `topology`. Returns `GridError::InvalidArgument` if the topology doesn't
/// have enough racks for the strategy (column/row/tile strategies need at
/// least one rack per group).
pub fn generate_mapping(
    params: CodeParams,
    strategy: Strategy,
    topology: Topology,
) -> GridResult<PlacementMap> {
    let rows = params.rows();
    let cols = params.cols();
    let mut rack_next_srv = vec![0usize; topology.rack_count];
    let mut entries = HashMap::with_capacity(params.total_blocks());

    let mut assign_rack = |params: &CodeParams, id: usize| -> GridResult<usize> {
        let (row, col) = params.rc(id);
        match strategy {
            Strategy::DistinctRack => {
                if topology.rack_count < params.total_blocks() {
                    return Err(GridError::InvalidArgument(
                        "distinct_rack strategy needs at least one rack per block",
                    ));
                }
                Ok(id)
            }
            Strategy::ColumnGroup => {
                if topology.rack_count < cols {
                    return Err(GridError::InvalidArgument(
                        "column_group strategy needs at least one rack per column",
                    ));
                }
                Ok(col)
            }
            Strategy::RowGroup => {
                if topology.rack_count < rows {
                    return Err(GridError::InvalidArgument(
                        "row_group strategy needs at least one rack per row",
                    ));
                }
                Ok(row)
            }
            Strategy::ColumnStripM1 => {
                if params.m1 == 0 {
                    return Err(GridError::InvalidArgument(
                        "column_strip_m1 strategy requires m1 > 0",
                    ));
                }
                let group = col / params.m1;
                Ok(group % topology.rack_count)
            }
            Strategy::RowStripM2 => {
                if params.m2 == 0 {
                    return Err(GridError::InvalidArgument(
                        "row_strip_m2 strategy requires m2 > 0",
                    ));
                }
                let group = row / params.m2;
                Ok(group % topology.rack_count)
            }
            Strategy::TilePlusAggregator => {
                let h = params.m2 + 1;
                let w = params.m1 + 1;
                let group_cols = (cols + w - 1) / w;
                let group_rows = (rows + h - 1) / h;
                let normal_group_count = group_rows * group_cols;
                if topology.rack_count < normal_group_count + 1 {
                    return Err(GridError::InvalidArgument(
                        "tile_plus_aggregator strategy needs one rack per tile plus an aggregator rack",
                    ));
                }
                let is_special = row % h == 0 && col % w == 0;
                if is_special {
                    Ok(normal_group_count)
                } else {
                    Ok((row / h) * group_cols + (col / w))
                }
            }
            Strategy::Diagonal => Ok((row + col) % topology.rack_count),
        }
    };

    for id in 0..params.total_blocks() {
        let (row, col) = params.rc(id);
        let rack = assign_rack(&params, id)?;
        let server_index = rack_next_srv[rack] % topology.servers_per_rack;
        rack_next_srv[rack] += 1;
        entries.insert(
            id,
            PlacementEntry { block_id: id, row, col, rack, server_index },
        );
    }

    Ok(PlacementMap { params, topology, entries })
}

/// Maps rack index to a server IP, the way `Placement::fill_default_rack_ips`
/// seeds every rack with `"127.0.0.1"` for single-VM testing. A real
/// deployment would populate one distinct IP per rack instead.
#[derive(Debug, Clone)]
pub struct RackDirectory {
    ips: Vec<String>,
}

impl RackDirectory {
    /// All racks share `ip` (single-VM testing topology).
    pub fn single_vm(rack_count: usize, ip: impl Into<String>) -> Self {
        let ip = ip.into();
        RackDirectory { ips: vec![ip; rack_count] }
    }

    pub fn new(ips: Vec<String>) -> Self {
        RackDirectory { ips }
    }

    pub fn ip_for(&self, rack: usize) -> GridResult<&str> {
        self.ips
            .get(rack)
            .map(String::as_str)
            .ok_or(GridError::InvalidArgument("rack index out of range for RackDirectory"))
    }
}

/// Outcome of a bulk block write, distinguishing a store-level failure from
/// a block with no entry in the placement table at all (the original
/// driver logged and silently skipped these; we report them so callers can
/// decide whether a missing mapping is fatal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    MissingPlacement,
    StoreFailed(String),
}

/// Write every block in `encoded_map` (block id -> bytes) to its placement
/// entry through `store`/`racks`. A missing placement entry for a supplied
/// id is counted as [`WriteOutcome::MissingPlacement`] rather than aborting
/// the whole batch, matching the original driver's behavior of logging and
/// skipping rather than failing outright. Returns the count of blocks
/// actually written.
pub async fn write_all_blocks(
    encoded_map: &[(usize, Vec<u8>)],
    placement: &PlacementMap,
    racks: &RackDirectory,
    store: &dyn crate::store::BlockStore,
) -> usize {
    let mut written = 0usize;
    for (id, bytes) in encoded_map {
        let outcome = match placement.get(*id) {
            Err(_) => WriteOutcome::MissingPlacement,
            Ok(entry) => match racks.ip_for(entry.rack) {
                Err(e) => WriteOutcome::StoreFailed(e.to_string()),
                Ok(ip) => {
                    let port = placement.port_for(entry);
                    let key = crate::store::protocol::block_key(*id);
                    match store.set(ip, port, &key, bytes).await {
                        Ok(()) => WriteOutcome::Written,
                        Err(e) => WriteOutcome::StoreFailed(e.to_string()),
                    }
                }
            },
        };
        if outcome == WriteOutcome::Written {
            written += 1;
        }
    }
    written
}
