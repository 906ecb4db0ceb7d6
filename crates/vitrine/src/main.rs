use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use vitrine_core::{default_registry, layouts, Address, Snapshot, SnapshotValue, TypeInfo, Value, ViewConfig};
use vitrine_utils::{info, init_logging};

/// Debugger-side container introspection for libc++ layouts.
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(version)]
#[command(about = "Debugger-side container introspection for libc++ layouts", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Decode the containers in a built-in demonstration image
    Demo
    {
        /// Maximum number of elements to print per container
        #[arg(long, default_value_t = 16)]
        limit: usize,
    },
}

fn main()
{
    // Initialize logging (reads RUST_LOG / VITRINE_LOG_* env vars)
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { limit } => run_demo(limit),
    }
}

fn run_demo(limit: usize)
{
    info!("Building demonstration snapshot");
    let (snapshot, roots) = build_demo_image();
    let snapshot = Arc::new(snapshot);

    for (label, addr, ty) in roots {
        let value = SnapshotValue::at(snapshot.clone(), label, Address::new(addr), ty);
        let Some(mut view) = default_registry().attach(value, ViewConfig::default()) else {
            eprintln!("{label}: no view registered for this type");
            continue;
        };

        println!("{label}: {}", view.summary());
        let count = view.child_count().min(limit);
        for index in 0..count {
            match view.child_at(index) {
                Some(child) => println!("  {} = {}", child.name(), render(&child)),
                None => println!("  [{index}] = <unknown>"),
            }
        }
    }
}

/// Render an element: key/value braces for pair payloads, a plain unsigned
/// value for everything else.
fn render(child: &SnapshotValue) -> String
{
    match (child.field("first"), child.field("second")) {
        (Some(key), Some(value)) => {
            format!("{{{}, {}}}", key.value_as_unsigned(0), value.value_as_unsigned(0))
        }
        _ => child.value_as_unsigned(0).to_string(),
    }
}

fn words(values: &[u64]) -> Vec<u8>
{
    values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// Hand-assemble a snapshot holding one container of each supported kind,
/// laid out exactly the way libc++ lays them out in a debuggee.
fn build_demo_image() -> (Snapshot, Vec<(&'static str, u64, TypeInfo)>)
{
    let mut snapshot = Snapshot::new();
    let mut roots = Vec::new();

    let u32_ty = layouts::unsigned_type(4);
    let u64_ty = layouts::unsigned_type(8);

    // vector<unsigned int> {7, 8, 9}
    let vec_addr = 0x100;
    let vec_data = 0x1000;
    snapshot.map(Address::new(vec_addr), words(&[vec_data, vec_data + 12, vec_data + 16]));
    snapshot.map(
        Address::new(vec_data),
        [7u32, 8, 9].iter().flat_map(|v| v.to_le_bytes()).collect(),
    );
    roots.push(("vector", vec_addr, layouts::sequence_of(&u32_ty)));

    // list<unsigned long> {10, 20, 30}: three nodes rung through the
    // sentinel embedded at the head of the list object.
    let list_addr = 0x140;
    let (n1, n2, n3) = (0x1100, 0x1140, 0x1180);
    snapshot.map(Address::new(list_addr), words(&[n3, n1, 0]));
    snapshot.map(Address::new(n1), words(&[list_addr, n2, 10]));
    snapshot.map(Address::new(n2), words(&[n1, n3, 20]));
    snapshot.map(Address::new(n3), words(&[n2, list_addr, 30]));
    roots.push(("list", list_addr, layouts::list_of(&u64_ty).container));

    // map<unsigned long, unsigned long> {1: 100, 2: 200, 3: 300}: root 2
    // with children 1 and 3; the begin node is 1.
    let map_addr = 0x180;
    let end_node = map_addr + 8;
    let (m1, m2, m3) = (0x1200, 0x1240, 0x1280);
    snapshot.map(Address::new(map_addr), words(&[m1, m2, 3]));
    snapshot.map(Address::new(m1), words(&[0, 0, m2, 1, 100]));
    snapshot.map(Address::new(m2), words(&[m1, m3, end_node, 2, 200]));
    snapshot.map(Address::new(m3), words(&[0, 0, m2, 3, 300]));
    roots.push(("map", map_addr, layouts::map_of(&u64_ty, &u64_ty).container));

    // A short string, stored inline.
    let short_addr = 0x1c0;
    let mut short = vec![0u8; 24];
    let text = b"vitrine";
    short[0] = (text.len() as u8) << 1;
    short[1..=text.len()].copy_from_slice(text);
    snapshot.map(Address::new(short_addr), short);
    roots.push(("short string", short_addr, layouts::string_type()));

    // A long string, stored through a heap pointer.
    let long_addr = 0x1e0;
    let heap = 0x1300;
    let payload = b"the quick brown fox jumps over the lazy dog\0";
    snapshot.map(
        Address::new(long_addr),
        words(&[(payload.len() as u64) | 1, payload.len() as u64 - 1, heap]),
    );
    snapshot.map(Address::new(heap), payload.to_vec());
    roots.push(("long string", long_addr, layouts::string_type()));

    (snapshot, roots)
}
