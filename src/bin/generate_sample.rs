use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;

const PEOPLE: [&str; 12] = [
    "Jehu Rudeforth",
    "Van Tuxwell",
    "Gigi Bohling",
    "Jan Morforth",
    "Oby Sorrel",
    "Gunar Cockshoot",
    "Brien Boise",
    "Rafaelita Blaksland",
    "Barr Faughny",
    "Mallorie Waber",
    "Karlen McCaffrey",
    "Marney O'Breen",
];

const COUNTRIES: [&str; 6] = ["UK", "India", "Australia", "New Zealand", "USA", "Canada"];

const PRODUCTS: [&str; 8] = [
    "Mint Chip Choco",
    "85% Dark Bars",
    "Peanut Butter Cubes",
    "Smooth Sliky Salty",
    "99% Dark & Pure",
    "After Nines",
    "Milk Bars",
    "Orange Choco",
];

/// Write a synthetic sales file for trying out the dashboard.
#[derive(Parser, Debug)]
struct Args {
    /// Output path; `.parquet` is appended as well when `--parquet` is set.
    #[arg(long, default_value = "Chocolate_Sales.csv")]
    output: PathBuf,

    /// Number of sales to generate.
    #[arg(long, default_value_t = 1094)]
    rows: usize,

    /// PRNG seed; the same seed always produces the same file.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Also write the same rows as Parquet next to the CSV.
    #[arg(long)]
    parquet: bool,
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

struct Sale {
    date: NaiveDate,
    person: &'static str,
    country: &'static str,
    product: &'static str,
    amount: f64,
    boxes: i64,
}

fn generate(rows: usize, seed: u64) -> Result<Vec<Sale>> {
    let mut rng = SimpleRng::new(seed);
    let first_day = NaiveDate::from_ymd_opt(2022, 1, 3).context("invalid start date")?;

    Ok((0..rows)
        .map(|_| Sale {
            // Eight months of trading days.
            date: first_day + Duration::days(rng.below(240) as i64),
            person: rng.pick(&PEOPLE),
            country: rng.pick(&COUNTRIES),
            product: rng.pick(&PRODUCTS),
            amount: (rng.below(2_200_000) as f64 / 100.0).round(),
            boxes: 1 + rng.below(700) as i64,
        })
        .collect())
}

fn write_csv(path: &Path, sales: &[Sale]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record([
        "Sales Person",
        "Country",
        "Product",
        "Date",
        "Amount",
        "Boxes Shipped",
    ])?;
    for s in sales {
        writer.write_record([
            s.person.to_string(),
            s.country.to_string(),
            s.product.to_string(),
            s.date.format("%d/%m/%Y").to_string(),
            // Currency text, the way the public dataset ships it.
            format!("${}", group_thousands(s.amount as u64)),
            s.boxes.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, sales: &[Sale]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Sales Person", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("Product", DataType::Utf8, false),
        Field::new("Date", DataType::Utf8, false),
        Field::new("Amount", DataType::Float64, false),
        Field::new("Boxes Shipped", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(sales.iter().map(|s| s.person))),
            Arc::new(StringArray::from_iter_values(sales.iter().map(|s| s.country))),
            Arc::new(StringArray::from_iter_values(sales.iter().map(|s| s.product))),
            Arc::new(StringArray::from_iter_values(
                sales.iter().map(|s| s.date.format("%d/%m/%Y").to_string()),
            )),
            Arc::new(Float64Array::from_iter_values(sales.iter().map(|s| s.amount))),
            Arc::new(Int64Array::from_iter_values(sales.iter().map(|s| s.boxes))),
        ],
    )?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();

    let sales = generate(args.rows, args.seed)?;
    write_csv(&args.output, &sales)?;
    println!("Wrote {} sales to {}", sales.len(), args.output.display());

    if args.parquet {
        let path = args.output.with_extension("parquet");
        write_parquet(&path, &sales)?;
        println!("Wrote {} sales to {}", sales.len(), path.display());
    }
    Ok(())
}
