use std::hash::BuildHasher;
use std::hash::Hasher;
use std::hash::RandomState;

use clap::Parser;
use clap::ValueEnum;
use robin_block::HashMap;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyPattern {
    /// Consecutive integers hashed with a random-keyed hasher.
    Sequential,
    /// Keys whose hashes have the low six bits cleared, so only one bucket in
    /// 64 is ever ideal.
    Clustered,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 100_000)]
    entries: usize,

    #[arg(short = 'c', long = "target_capacity", default_value_t = 0)]
    target_capacity: usize,

    #[arg(short = 'p', long = "pattern", value_enum, default_value_t = KeyPattern::Sequential)]
    pattern: KeyPattern,
}

/// Hashes through a random-keyed hasher, then keeps only the bits selected by
/// `mask`.
#[derive(Clone)]
struct MaskedState {
    inner: RandomState,
    mask: u64,
}

struct MaskedHasher {
    inner: std::hash::DefaultHasher,
    mask: u64,
}

impl Hasher for MaskedHasher {
    fn finish(&self) -> u64 {
        self.inner.finish() & self.mask
    }

    fn write(&mut self, bytes: &[u8]) {
        self.inner.write(bytes);
    }
}

impl BuildHasher for MaskedState {
    type Hasher = MaskedHasher;

    fn build_hasher(&self) -> MaskedHasher {
        MaskedHasher {
            inner: self.inner.build_hasher(),
            mask: self.mask,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mask = match args.pattern {
        KeyPattern::Sequential => u64::MAX,
        KeyPattern::Clustered => !0x3f,
    };
    let state = MaskedState {
        inner: RandomState::new(),
        mask,
    };

    println!(
        "Creating HashMap with target capacity {} ({:?} keys)",
        args.target_capacity, args.pattern
    );
    let mut map: HashMap<u64, u64, _> =
        HashMap::with_capacity_and_hasher(args.target_capacity, state);
    println!("Actual capacity: {}", map.capacity());

    println!("Inserting {} entries...", args.entries);
    for i in 0..args.entries as u64 {
        if !map.insert(i, i * 2) {
            panic!("Key already exists in map: {}", i);
        }
    }

    println!("Inserted {} entries into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );
    println!("Block size: {}", map.block_size());

    map.probe_histogram().print();
    map.debug_stats().print();
}
