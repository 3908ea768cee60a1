//! # Seed Data Generator
//!
//! Populates the database with a small salon for development: a staff
//! directory, two weeks of sales rung through the cart, and the matching
//! hours ledger.
//!
//! ## Usage
//! ```bash
//! # Seed ./salon_dev.db with 14 days of data (default)
//! cargo run -p salon-db --bin seed
//!
//! # Custom database, history length and business config
//! cargo run -p salon-db --bin seed -- --db ./data/salon.db --days 30 --config salon.toml
//!
//! # More detail
//! RUST_LOG=debug cargo run -p salon-db --bin seed
//! ```
//!
//! Data is generated deterministically from the day and slot index, so two
//! runs against empty databases produce the same sales.

use std::env;
use std::fs;

use chrono::{Duration, NaiveTime, Utc};
use salon_core::config::{DiscountConfig, SalonConfig};
use salon_core::range::{DateRange, RangePreset};
use salon_core::{
    Cart, CartItem, CoreResult, CustomerRef, EmploymentType, Money, PaymentMethod,
    TherapistProfile,
};
use salon_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// (id, name, role, employment, hourly rate in pence)
const THERAPISTS: &[(&str, &str, &str, EmploymentType, i64)] = &[
    ("t-bea", "Bea Hart", "Senior Stylist", EmploymentType::Employed, 1250),
    ("t-cleo", "Cleo Marsh", "Beauty Therapist", EmploymentType::Employed, 1100),
    ("t-dev", "Dev Patel", "Barber", EmploymentType::SelfEmployed, 1000),
    ("t-ines", "Ines Rocha", "Nail Technician", EmploymentType::SelfEmployed, 1000),
];

/// (id, name, category, price in pence)
const SERVICES: &[(&str, &str, &str, i64)] = &[
    ("svc-cut", "Cut & Finish", "Hair", 4500),
    ("svc-colour", "Full Colour", "Hair", 8500),
    ("svc-blow", "Blow Dry", "Hair", 2800),
    ("svc-fade", "Skin Fade", "Barbering", 2200),
    ("svc-beard", "Beard Trim", "Barbering", 1200),
    ("svc-facial", "Signature Facial", "Skin", 6000),
    ("svc-brow", "Brow Shape", "Skin", 1500),
    ("svc-gel", "Gel Manicure", "Nails", 3000),
    ("svc-pedi", "Spa Pedicure", "Nails", 3800),
];

const CUSTOMERS: &[&str] = &[
    "Ada Lovelace",
    "Grace Hopper",
    "Mary Seacole",
    "Rosalind Franklin",
    "Dorothy Hodgkin",
    "Florence Nightingale",
];

/// Sales per therapist per working day.
const SALES_PER_DAY: usize = 3;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,salon_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut days: u32 = 14;
    let mut db_path = String::from("./salon_dev.db");
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(14);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Salon Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>       Days of history to generate (default: 14)");
                println!("  -d, --db <PATH>      Database file path (default: ./salon_dev.db)");
                println!("  -c, --config <PATH>  salon.toml with rates and presets");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => SalonConfig::from_toml_str(&fs::read_to_string(path)?)?,
        None => SalonConfig::default(),
    };
    config.apply_env_overrides(|key| env::var(key).ok())?;

    println!("🌱 Salon Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.therapists().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} therapists", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Staff directory
    let mut staff = Vec::with_capacity(THERAPISTS.len());
    for (id, name, role, employment_type, rate) in THERAPISTS {
        let profile = TherapistProfile {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            employment_type: *employment_type,
            hourly_rate: Money::from_cents(*rate),
        };
        db.therapists().upsert(&profile).await?;
        staff.push(profile);
    }
    println!("✓ {} therapists", staff.len());

    let customers: Vec<CustomerRef> = CUSTOMERS
        .iter()
        .map(|name| CustomerRef::new(Uuid::new_v4().to_string(), *name))
        .collect();

    // Sales and hours
    let reports = db.reports(config.clone());
    let today = Utc::now().date_naive();
    let opening = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut sales = 0usize;
    let mut cart = Cart::new();

    for day_offset in 0..days {
        let date = today - Duration::days(i64::from(day_offset));
        let seq = day_offset as usize;

        for (t_idx, therapist) in staff.iter().enumerate() {
            // Everyone has one day off in four, staggered
            if (seq + t_idx) % 4 == 3 {
                continue;
            }

            let shift = [7.5, 8.0, 6.0, 8.5][(seq + t_idx) % 4];
            reports.record_hours(&therapist.id, date, shift).await?;

            for slot in 0..SALES_PER_DAY {
                let pick = seq * 7 + t_idx * 3 + slot;
                let (svc_id, svc_name, category, price) = SERVICES[pick % SERVICES.len()];

                cart.add_item(CartItem {
                    id: svc_id.to_string(),
                    name: svc_name.to_string(),
                    unit_price: Money::from_cents(price),
                    quantity: 1,
                    category: category.to_string(),
                })?;
                if pick % 5 == 0 {
                    let (extra_id, extra_name, extra_category, extra_price) =
                        SERVICES[(pick + 4) % SERVICES.len()];
                    cart.add_item(CartItem {
                        id: extra_id.to_string(),
                        name: extra_name.to_string(),
                        unit_price: Money::from_cents(extra_price),
                        quantity: 1,
                        category: extra_category.to_string(),
                    })?;
                }

                apply_sample_discount(&mut cart, pick, &config.discounts)?;

                cart.select_customer(customers[pick % customers.len()].clone());
                cart.select_therapist(therapist.to_ref());

                let payment = match pick % 3 {
                    0 => PaymentMethod::Cash,
                    1 => PaymentMethod::Card,
                    _ => PaymentMethod::Other,
                };
                let when = (date.and_time(opening)
                    + Duration::minutes((slot as i64) * 90 + (t_idx as i64) * 15))
                .and_utc();

                let record = cart.checkout(payment, when)?;
                db.transactions().insert(&record).await?;
                sales += 1;
            }
        }
    }
    println!("✓ {} sales over {} days", sales, days);

    // Summary over the seeded window
    let window = DateRange::preset(RangePreset::LastDays(days.max(1)), today, config.week_start)?;
    println!();
    println!("Payroll for the seeded period:");
    for result in reports.payroll_summary(&window).await? {
        println!(
            "  {:<12} revenue {:>10}  therapist {:>10}  salon {:>10}",
            result.therapist_name,
            result.revenue.format_with(&config.currency_symbol),
            result.therapist_share.format_with(&config.currency_symbol),
            result.salon_share.format_with(&config.currency_symbol),
        );
    }

    info!(sales, days, "Seed complete");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Every sixth sale gets the first configured percentage, every sixth
/// (offset by three) a £5 voucher.
fn apply_sample_discount(
    cart: &mut Cart,
    pick: usize,
    discounts: &DiscountConfig,
) -> CoreResult<()> {
    match pick % 6 {
        0 => match discounts.percentage_presets.first() {
            Some(&pct) => cart.apply_percentage(pct, discounts),
            None => Ok(()),
        },
        3 => cart.apply_voucher(Money::from_major(5), Some(format!("GIFT{pick:04}"))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salon_core::Discount;

    fn cart_with_colour() -> Cart {
        let (id, name, category, price) = SERVICES[1];
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            id: id.to_string(),
            name: name.to_string(),
            unit_price: Money::from_cents(price),
            quantity: 1,
            category: category.to_string(),
        })
        .unwrap();
        cart
    }

    #[test]
    fn test_sample_discount_uses_configured_presets() {
        let discounts = DiscountConfig {
            percentage_presets: vec![15, 25],
        };
        let mut cart = cart_with_colour();

        apply_sample_discount(&mut cart, 12, &discounts).unwrap();
        assert_eq!(cart.discount(), &Discount::Percentage { pct: 15 });

        apply_sample_discount(&mut cart, 9, &discounts).unwrap();
        assert!(matches!(cart.discount(), Discount::Voucher { .. }));
    }
}
