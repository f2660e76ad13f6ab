//! Sample order sheet generator
//!
//! Writes a CSV with the same column labels as the production spreadsheet,
//! with per-base and per-courier delivery performance drawn around a target
//! rate so every tier shows up in the reports.
//!
//! Usage:
//!   cargo run --release --bin generate_sample -- [OPTIONS]
//!
//! Options:
//!   --orders <N>             Number of orders (default: 5000)
//!   --bases <N>              Number of bases (default: 6)
//!   --couriers-per-base <N>  Couriers per base (default: 5)
//!   --delivered-rate <F>     Mean delivered probability (default: 0.96)
//!   --at-base-rate <F>       Share of undelivered orders held at base (default: 0.4)
//!   --missing-courier-rate <F> Share of orders without a courier (default: 0.02)
//!   --seed <N>               Random seed for reproducibility (optional)
//!   --output <PATH>          Output CSV path (default: data/sample_orders.csv)

use anyhow::{ensure, Result};
use clap::Parser;
use csv::WriterBuilder;
use delivery_rates::models::CsvRecord;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
#[command(about = "Generate a sample delivery order sheet")]
struct Args {
    #[arg(long, default_value = "5000")]
    orders: usize,

    #[arg(long, default_value = "6")]
    bases: usize,

    #[arg(long, default_value = "5")]
    couriers_per_base: usize,

    /// Mean probability that an order is delivered (0.0 - 1.0)
    #[arg(long, default_value = "0.96")]
    delivered_rate: f64,

    /// Share of undelivered orders that sit at the base (0.0 - 1.0)
    #[arg(long, default_value = "0.4")]
    at_base_rate: f64,

    /// Share of orders with no courier assigned (0.0 - 1.0)
    #[arg(long, default_value = "0.02")]
    missing_courier_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "data/sample_orders.csv")]
    output: PathBuf,
}

const BASE_NAMES: &[&str] = &[
    "Base Recife", "Base Olinda", "Base Jaboatão", "Base Caruaru", "Base Petrolina",
    "Base Paulista", "Base Garanhuns", "Base Cabo", "Base Vitória", "Base Igarassu",
];

const CITIES: &[&str] = &[
    "Recife", "Olinda", "Jaboatão dos Guararapes", "Caruaru", "Petrolina",
    "Paulista", "Garanhuns", "Cabo de Santo Agostinho", "Camaragibe", "Abreu e Lima",
];

const FIRST_NAMES: &[&str] = &[
    "Ana", "Bruno", "Carla", "Diego", "Elaine", "Fábio", "Gabriela", "Henrique",
    "Isabela", "João", "Karina", "Lucas", "Mariana", "Nelson", "Otávio", "Paula",
];

const SURNAMES: &[&str] = &["Silva", "Souza", "Oliveira", "Lima", "Costa", "Pereira", "Almeida", "Ferreira"];

const OTHER_RECEIPTS: &[&str] = &["Cliente ausente", "Endereço não localizado", "Recusado", "Avaria"];

struct Courier {
    name: String,
    delivered_p: f64,
}

struct BasePlan {
    name: String,
    couriers: Vec<Courier>,
}

fn courier_name(rng: &mut impl Rng) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ana");
    let last = SURNAMES.choose(rng).copied().unwrap_or("Silva");
    format!("{} {}", first, last)
}

/// Base performance spreads around the target; couriers spread around their base.
fn plan_bases(args: &Args, rng: &mut impl Rng) -> Vec<BasePlan> {
    (0..args.bases)
        .map(|i| {
            let name = match BASE_NAMES.get(i) {
                Some(n) => n.to_string(),
                None => format!("Base {:02}", i + 1),
            };
            let base_p = (args.delivered_rate + rng.gen_range(-0.05..=0.03)).clamp(0.0, 1.0);
            let couriers = (0..args.couriers_per_base)
                .map(|_| Courier {
                    name: courier_name(rng),
                    delivered_p: (base_p + rng.gen_range(-0.04..=0.03)).clamp(0.0, 1.0),
                })
                .collect();
            BasePlan { name, couriers }
        })
        .collect()
}

fn receipt(courier: &Courier, base: &str, at_base_rate: f64, rng: &mut impl Rng) -> Option<String> {
    if rng.gen_bool(courier.delivered_p) {
        let who = FIRST_NAMES.choose(rng).copied().unwrap_or("Cliente");
        return Some(format!("Assinatura normal - {}", who));
    }
    if rng.gen_bool(at_base_rate) {
        return Some(format!("Na base {}", base.trim_start_matches("Base ")));
    }
    match rng.gen_range(0..4) {
        0 => None,
        1 => Some("Não entregue".to_string()),
        _ => OTHER_RECEIPTS.choose(rng).map(|s| s.to_string()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    ensure!(args.bases > 0, "--bases must be at least 1");
    ensure!(args.couriers_per_base > 0, "--couriers-per-base must be at least 1");
    for (flag, value) in [
        ("--delivered-rate", args.delivered_rate),
        ("--at-base-rate", args.at_base_rate),
        ("--missing-courier-rate", args.missing_courier_rate),
    ] {
        ensure!((0.0..=1.0).contains(&value), "{} must be within 0.0 - 1.0", flag);
    }

    println!("Sample Order Sheet Generator");
    println!("{}", "-".repeat(60));
    println!("Output:           {}", args.output.display());
    println!("Orders:           {}", args.orders);
    println!("Bases:            {}", args.bases);
    println!("Couriers/base:    {}", args.couriers_per_base);
    println!("Delivered rate:   {:.1}%", args.delivered_rate * 100.0);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let plan = plan_bases(&args, &mut rng);

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().has_headers(true).from_path(&args.output)?;

    for i in 0..args.orders {
        let base = &plan[rng.gen_range(0..plan.len())];
        let courier = &base.couriers[rng.gen_range(0..base.couriers.len())];
        let city = CITIES.choose(&mut rng).copied().unwrap_or("Recife");

        let record = CsvRecord {
            order_id: format!("{:08}", i + 1),
            base: base.name.clone(),
            city: city.to_string(),
            courier: if rng.gen_bool(args.missing_courier_rate) {
                None
            } else {
                Some(courier.name.clone())
            },
            receipt: receipt(courier, &base.name, args.at_base_rate, &mut rng),
        };
        writer.serialize(&record)?;

        if (i + 1) % 10000 == 0 {
            println!("   Written {}/{} orders...", i + 1, args.orders);
        }
    }

    writer.flush()?;
    println!("Generation complete: {} orders", args.orders);

    Ok(())
}
