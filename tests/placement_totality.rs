//! Placement totality: every strategy, given a topology satisfying its
//! precondition, maps every block id and round-robins server indices
//! monotonically per rack (spec §8 property 4).

use gridcode::grid::CodeParams;
use gridcode::placement::{generate_mapping, Strategy, Topology};

fn params() -> CodeParams {
    CodeParams::new(4, 2, 3, 2).unwrap()
}

fn assert_total_and_round_robin(params: CodeParams, strategy: Strategy, topology: Topology) {
    let map = generate_mapping(params, strategy, topology).unwrap();
    assert_eq!(map.len(), params.total_blocks());

    for id in 0..params.total_blocks() {
        assert!(map.get(id).is_ok(), "missing entry for block {id}");
    }

    // Per rack, server indices assigned in block-id order must be exactly
    // 0, 1, 2, ... mod servers_per_rack with no gaps or repeats out of order.
    let mut per_rack: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();
    for id in 0..params.total_blocks() {
        let e = map.get(id).unwrap();
        per_rack.entry(e.rack).or_default().push(e.server_index);
    }
    for (_rack, indices) in per_rack {
        for (i, &server_index) in indices.iter().enumerate() {
            assert_eq!(server_index, i % topology.servers_per_rack);
        }
    }
}

#[test]
fn distinct_rack_is_total() {
    let p = params();
    assert_total_and_round_robin(
        p,
        Strategy::DistinctRack,
        Topology { rack_count: p.total_blocks(), servers_per_rack: 3, base_port: 11211 },
    );
}

#[test]
fn column_group_is_total() {
    let p = params();
    assert_total_and_round_robin(
        p,
        Strategy::ColumnGroup,
        Topology { rack_count: p.cols(), servers_per_rack: 2, base_port: 11211 },
    );
}

#[test]
fn row_group_is_total() {
    let p = params();
    assert_total_and_round_robin(
        p,
        Strategy::RowGroup,
        Topology { rack_count: p.rows(), servers_per_rack: 2, base_port: 11211 },
    );
}

#[test]
fn column_strip_m1_is_total() {
    let p = params();
    let groups = (p.cols() + p.m1 - 1) / p.m1;
    assert_total_and_round_robin(
        p,
        Strategy::ColumnStripM1,
        Topology { rack_count: groups, servers_per_rack: 2, base_port: 11211 },
    );
}

#[test]
fn row_strip_m2_is_total() {
    let p = params();
    let groups = (p.rows() + p.m2 - 1) / p.m2;
    assert_total_and_round_robin(
        p,
        Strategy::RowStripM2,
        Topology { rack_count: groups, servers_per_rack: 2, base_port: 11211 },
    );
}

#[test]
fn tile_plus_aggregator_is_total() {
    let p = params();
    let h = p.m2 + 1;
    let w = p.m1 + 1;
    let group_cols = (p.cols() + w - 1) / w;
    let group_rows = (p.rows() + h - 1) / h;
    let normal = group_rows * group_cols;
    assert_total_and_round_robin(
        p,
        Strategy::TilePlusAggregator,
        Topology { rack_count: normal + 1, servers_per_rack: 2, base_port: 11211 },
    );
}

#[test]
fn diagonal_is_total() {
    let p = params();
    assert_total_and_round_robin(
        p,
        Strategy::Diagonal,
        Topology { rack_count: 5, servers_per_rack: 2, base_port: 11211 },
    );
}
