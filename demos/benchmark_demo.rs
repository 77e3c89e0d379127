//! Runs the failure-combination benchmark driver over a fixed grid and
//! prints a summary, the Rust analog of the original driver's "enumerate
//! single/pair/triple failures and report average repair time" tail end.
//!
//! Run:
//!   cargo run --release --example benchmark_demo

use gridcode::bench::{enumerate_failure_combinations, run_benchmark, BenchConfig};
use gridcode::encoder::encode;
use gridcode::grid::CodeParams;
use gridcode::placement::{generate_mapping, write_all_blocks, RackDirectory, Strategy, Topology};
use gridcode::store::InMemoryBlockStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let params = CodeParams::new(4, 2, 3, 2).unwrap();
    let block_size = 4096;
    let data: Vec<Vec<u8>> = (0..params.k1 * params.k2).map(|i| vec![i as u8; block_size]).collect();
    let grid = encode(params, &data, block_size).unwrap();

    let topology = Topology { rack_count: params.total_blocks(), servers_per_rack: 4, base_port: 11211 };
    let placement = generate_mapping(params, Strategy::DistinctRack, topology).unwrap();
    let racks = RackDirectory::single_vm(params.total_blocks(), "127.0.0.1");
    let store = InMemoryBlockStore::new();

    let encoded_map = grid.into_map();
    write_all_blocks(&encoded_map, &placement, &racks, &store).await;

    let cfg = BenchConfig { max_pairs: 200, max_triples: 300 };
    let combos = enumerate_failure_combinations(params.k1 * params.k2, &cfg);
    let summary = run_benchmark(&params, &placement, &racks, &store, &combos).await.unwrap();

    println!("===== Summary =====");
    println!("Tested combinations: {}", summary.tested);
    println!("Successful repairs: {}", summary.successful);
    if summary.successful > 0 {
        println!("Avg repair time (ms): {:.3}", summary.avg_repair_ms);
    }
}
