//! Writes `sample_data.csv` and `sample_data.xlsx`: a small orders table
//! with a few repeated rows and gaps in the numeric columns, for trying the
//! cleaning actions by hand.

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

const HEADER: [&str; 7] = [
    "order_id",
    "region",
    "product",
    "quantity",
    "unit_price",
    "discount",
    "shipped",
];

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

#[derive(Clone)]
struct Order {
    id: i64,
    region: &'static str,
    product: &'static str,
    quantity: Option<i64>,
    unit_price: Option<f64>,
    discount: Option<f64>,
    shipped: bool,
}

fn generate_orders(rng: &mut SimpleRng, count: i64) -> Vec<Order> {
    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo", "Doohickey"];

    let mut orders = Vec::new();
    for id in 1..=count {
        let order = Order {
            id,
            region: rng.pick(&regions),
            product: rng.pick(&products),
            quantity: (!rng.chance(0.1)).then(|| 1 + (rng.next_u64() % 20) as i64),
            unit_price: (!rng.chance(0.1))
                .then(|| ((5.0 + rng.next_f64() * 95.0) * 100.0).round() / 100.0),
            discount: (!rng.chance(0.3)).then(|| (rng.next_f64() * 0.25 * 100.0).round() / 100.0),
            shipped: rng.chance(0.7),
        };
        // Roughly one order in eight is entered twice.
        if rng.chance(0.125) {
            orders.push(order.clone());
        }
        orders.push(order);
    }
    orders
}

fn write_csv(path: &str, orders: &[Order]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(HEADER)?;
    for o in orders {
        writer.write_record([
            o.id.to_string(),
            o.region.to_string(),
            o.product.to_string(),
            o.quantity.map(|q| q.to_string()).unwrap_or_default(),
            o.unit_price.map(|p| p.to_string()).unwrap_or_default(),
            o.discount.map(|d| d.to_string()).unwrap_or_default(),
            (if o.shipped { "True" } else { "False" }).to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_xlsx(path: &str, orders: &[Order]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (idx, o) in orders.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, o.id as f64)?;
        sheet.write_string(row, 1, o.region)?;
        sheet.write_string(row, 2, o.product)?;
        if let Some(q) = o.quantity {
            sheet.write_number(row, 3, q as f64)?;
        }
        if let Some(p) = o.unit_price {
            sheet.write_number(row, 4, p)?;
        }
        if let Some(d) = o.discount {
            sheet.write_number(row, 5, d)?;
        }
        sheet.write_boolean(row, 6, o.shipped)?;
    }
    workbook.save(path).context("saving XLSX file")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let orders = generate_orders(&mut rng, 60);

    write_csv("sample_data.csv", &orders)?;
    write_xlsx("sample_data.xlsx", &orders)?;

    println!(
        "Wrote {} orders to sample_data.csv and sample_data.xlsx",
        orders.len()
    );
    Ok(())
}
