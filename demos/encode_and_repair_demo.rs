//! End-to-end demo: encode random data, place it across racks, break a few
//! blocks, and repair them. Mirrors the original driver's interactive
//! prompt but takes its parameters from the command line instead.
//!
//! Run:
//!   cargo run --example encode_and_repair_demo -- 4 2 3 2 4096 1 30 4

use gridcode::encoder::encode;
use gridcode::grid::CodeParams;
use gridcode::placement::{generate_mapping, write_all_blocks, RackDirectory, Strategy, Topology};
use gridcode::repair::repair_and_set;
use gridcode::store::InMemoryBlockStore;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn strategy_from_index(n: u8) -> Strategy {
    match n {
        1 => Strategy::DistinctRack,
        2 => Strategy::ColumnGroup,
        3 => Strategy::RowGroup,
        4 => Strategy::ColumnStripM1,
        5 => Strategy::RowStripM2,
        6 => Strategy::TilePlusAggregator,
        7 => Strategy::Diagonal,
        _ => {
            eprintln!("unknown strategy {n}, defaulting to distinct-rack");
            Strategy::DistinctRack
        }
    }
}

fn usage_and_exit() -> ! {
    eprintln!("usage: encode_and_repair_demo k1 m1 k2 m2 block_size strategy(1-7) rack_count servers_per_rack");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (k1, m1, k2, m2, block_size, strategy_n, rack_count, servers_per_rack) = if args.len() == 8 {
        let parsed: Vec<usize> = args.iter().filter_map(|s| s.parse().ok()).collect();
        if parsed.len() != 8 {
            usage_and_exit();
        }
        (parsed[0], parsed[1], parsed[2], parsed[3], parsed[4], parsed[5] as u8, parsed[6], parsed[7])
    } else {
        // strategy 1 (distinct-rack) requires rack_count >= total_blocks = (k2+m2)*(k1+m1) = 30.
        (4, 2, 3, 2, 4096, 1u8, 30, 4)
    };

    let params = match CodeParams::new(k1, m1, k2, m2) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("invalid grid parameters: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "data_blocks={} total_blocks={}",
        params.k1 * params.k2,
        params.total_blocks()
    );

    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<Vec<u8>> = (0..params.k1 * params.k2)
        .map(|_| (0..block_size).map(|_| rng.gen::<u8>()).collect())
        .collect();

    let grid = encode(params, &data, block_size).expect("encode");
    println!("encoding done, {} blocks", grid.iter().count());

    let strategy = strategy_from_index(strategy_n);
    let topology = Topology { rack_count, servers_per_rack, base_port: 11211 };
    let placement = match generate_mapping(params, strategy, topology) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("placement failed: {e}");
            std::process::exit(1);
        }
    };
    let racks = RackDirectory::single_vm(rack_count, "127.0.0.1");
    let store = InMemoryBlockStore::new();

    let encoded_map = grid.into_map();
    let written = write_all_blocks(&encoded_map, &placement, &racks, &store).await;
    println!("placement done, wrote {written} blocks");

    let failed = vec![params.block_id(0, 0), params.block_id(1, 2)];
    println!("simulating failure of blocks {failed:?}");
    match repair_and_set(&failed, &params, &placement, &racks, &store).await {
        Ok(elapsed) => println!("repair succeeded in {:.3}ms", elapsed.as_secs_f64() * 1000.0),
        Err(e) => eprintln!("repair failed: {e}"),
    }
}
