use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;

/// Write a deterministic set of synthetic CSV files for the dashboard.
#[derive(Debug, Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory.
    #[arg(default_value = "data")]
    dir: PathBuf,

    /// Seed for the generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as u64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.range(0, items.len() as u64 - 1) as usize]
    }
}

/// `1234567` → `$1,234,567`
fn dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

fn writer(dir: &Path, name: &str) -> Result<csv::Writer<fs::File>> {
    let path = dir.join(name);
    csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const CAMPAIGNS: &[&str] = &[
    "GA4",
    "GPT V3-CAPI",
    "Loom",
    "Klaviyo flows enrich",
    "Ask Polar Lite",
    "GPT V4 (GPT-4o)",
    "Incrementality",
    "Creative Studio",
    "Meta CAPI",
    "Black Friday",
];

fn write_outbound(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut w = writer(dir, "outbound.csv")?;
    w.write_record([
        "CAMPAIGN_GROUP",
        "CAMPAIGN_START_DATE",
        "CAMPAIGN_LAST_DATE",
        "NB_EMAILS",
        "NB_CONTACTS_TOUCHED",
        "NB_COMPANIES_TOUCHED",
        "TOTAL_NB_CLICKS",
        "NB_COMPANIES_TOUCHED_ICP",
        "NB_COMPANIES_CLICKED_ICP",
        "NB_COMPANIES_REPLIED_ICP",
        "NB_COMPANIES_REPLIED_POSITIVE_ICP",
        "PIPELINE_OPP_AMOUNT_FROM_OB_ALL_TIME",
        "NEW_ARR_FROM_OB_ALL_TIME",
    ])?;

    let base = NaiveDate::from_ymd_opt(2023, 1, 2).context("invalid base date")?;
    for (i, campaign) in CAMPAIGNS.iter().enumerate() {
        let start = base + Duration::days(i as i64 * 30 + rng.range(0, 20) as i64);
        let end = start + Duration::days(rng.range(14, 90) as i64);
        let contacts = rng.range(500, 5000);
        let companies = contacts / rng.range(2, 4);
        let icp = companies / rng.range(3, 8);
        let clicked = icp / rng.range(3, 10);
        let replied = clicked / rng.range(2, 5);
        let positive = replied / rng.range(2, 4);
        let arr = rng.range(0, 60) * 1_000;
        w.write_record([
            campaign.to_string(),
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
            (contacts * rng.range(2, 4)).to_string(),
            contacts.to_string(),
            companies.to_string(),
            (clicked * rng.range(1, 3)).to_string(),
            icp.to_string(),
            clicked.to_string(),
            replied.to_string(),
            positive.to_string(),
            dollars(arr * rng.range(3, 6)),
            dollars(arr),
        ])?;
    }
    w.flush()?;
    Ok(CAMPAIGNS.len())
}

/// Market file: a four-line preamble above the header and one fully
/// empty trailing column.
fn write_market(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let path = dir.join("market.csv");
    let mut file = fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "Market sizing export")?;
    writeln!(file, "Source: merchant census")?;
    writeln!(file, "Currency: USD")?;
    writeln!(file)?;

    let mut w = csv::Writer::from_writer(file);
    w.write_record(["PLATFORM", "GMV_CATEGORY", "COUNTRY", "TOTAL_GMV", "POLAR ARR ($)", ""])?;

    let platforms = ["Shopify", "Shopify", "WooCommerce", "Magento"];
    let categories = ["a) < $1M", "b) $1M - $5M", "c) $5M - $20M", "d) > $20M"];
    let countries = ["United States", "United Kingdom", "Canada", "Germany", "Australia", "France"];

    let mut rows = 0;
    for _ in 0..120 {
        let category_idx = rng.range(0, categories.len() as u64 - 1) as usize;
        let gmv = rng.range(1, 50) * 100_000 * (category_idx as u64 + 1);
        let arr = if rng.next_f64() < 0.1 { 0 } else { rng.range(1, 40) * 500 };
        w.write_record([
            rng.pick(&platforms).to_string(),
            categories[category_idx].to_string(),
            rng.pick(&countries).to_string(),
            dollars(gmv),
            dollars(arr),
            String::new(),
        ])?;
        rows += 1;
    }
    w.flush()?;
    Ok(rows)
}

fn write_tenants(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut w = writer(dir, "tenants.csv")?;
    w.write_record(["TENANT_ID", "DATASOURCE_ID", "DATASOURCE_TYPE", "CREATED_AT"])?;
    let kinds = ["shopify", "facebook", "google", "klaviyo", "tiktok"];
    let base = NaiveDate::from_ymd_opt(2022, 6, 1).context("invalid base date")?;

    let mut rows = 0;
    for tenant in 1..=25u64 {
        for _ in 0..rng.range(1, 6) {
            let created = base + Duration::days(rng.range(0, 500) as i64);
            w.write_record([
                tenant.to_string(),
                rng.range(1000, 9999).to_string(),
                rng.pick(&kinds).to_string(),
                created.format("%Y-%m-%d").to_string(),
            ])?;
            rows += 1;
        }
    }
    w.flush()?;
    Ok(rows)
}

const MONTHS: &[&str] = &["2023-01", "2023-02", "2023-03", "2023-04", "2023-05", "2023-06"];
const SOURCES: &[&str] = &["direct", "referral", "google", "attentive", "facebook"];

fn write_orders_month_store(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut w = writer(dir, "orders_month_store.csv")?;
    w.write_record(["MONTH", "STORE", "ORDER_COUNT"])?;
    let stores = ["US store", "EU store", "UK store"];
    for month in MONTHS {
        for store in &stores {
            w.write_record([month.to_string(), store.to_string(), rng.range(200, 2500).to_string()])?;
        }
    }
    w.flush()?;
    Ok(MONTHS.len() * stores.len())
}

fn write_attribution_model(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut w = writer(dir, "attribution_model_90.csv")?;
    w.write_record(["MONTH", "ATTRIBUTION_SOURCE", "PAGEREFERRER", "ATTRIBUTED_ORDERS", "ATTRIBUTED_REVENUE"])?;
    let referrers = ["google.com", "facebook.com", "instagram.com", "(none)", "newsletter"];

    let mut rows = 0;
    for month in MONTHS {
        for source in SOURCES {
            let orders = rng.range(10, 400);
            let revenue = orders as f64 * (40.0 + rng.next_f64() * 60.0);
            w.write_record([
                month.to_string(),
                source.to_string(),
                rng.pick(&referrers).to_string(),
                orders.to_string(),
                format!("{revenue:.2}"),
            ])?;
            rows += 1;
        }
    }
    w.flush()?;
    Ok(rows)
}

fn write_attribution_cjm(dir: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let mut w = writer(dir, "attribution_cjm.csv")?;
    w.write_record(["SHOPIFYORDERID", "TOUCHPOINT_STEP", "ATTRIBUTION_SOURCE"])?;

    let mut rows = 0;
    for order in 0..300u64 {
        let id = 5_000_000_000 + order;
        for step in 1..=rng.range(1, 12) {
            w.write_record([id.to_string(), step.to_string(), rng.pick(SOURCES).to_string()])?;
            rows += 1;
        }
    }
    w.flush()?;
    Ok(rows)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    fs::create_dir_all(&args.dir).with_context(|| format!("creating {}", args.dir.display()))?;

    let mut rng = SimpleRng::new(args.seed);
    let tables: [(&str, fn(&Path, &mut SimpleRng) -> Result<usize>); 6] = [
        ("outbound", write_outbound),
        ("market", write_market),
        ("tenants", write_tenants),
        ("orders_month_store", write_orders_month_store),
        ("attribution_model_90", write_attribution_model),
        ("attribution_cjm", write_attribution_cjm),
    ];

    for (name, write) in tables {
        let rows = write(&args.dir, &mut rng)?;
        log::info!("Wrote {rows} rows to {name}.csv");
        println!("{name}: {rows} rows");
    }
    println!("Sample data written to {}", args.dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_groups_thousands() {
        assert_eq!(dollars(0), "$0");
        assert_eq!(dollars(999), "$999");
        assert_eq!(dollars(1000), "$1,000");
        assert_eq!(dollars(1234567), "$1,234,567");
    }

    #[test]
    fn rng_is_deterministic_and_in_range() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        for _ in 0..100 {
            let x = a.range(3, 9);
            assert_eq!(x, b.range(3, 9));
            assert!((3..=9).contains(&x));
        }
    }
}
