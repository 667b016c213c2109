//! Writes a deterministic sample dataset (`sample_data.csv` and
//! `sample_data.xlsx`) with plausible 400m-hurdles touchdown splits.

use rust_xlsxwriter::Workbook;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    name: &'static str,
    competition: &'static str,
    year: i32,
    total: f64,
    splits: Vec<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// One run: approach to H1, nine inter-hurdle intervals with rising fatigue,
/// then the run-in to the finish line.
fn generate_run(base_rhythm: f64, form: f64, rng: &mut SimpleRng) -> Vec<f64> {
    let mut splits = Vec::with_capacity(11);
    splits.push(round2(rng.gauss(6.0 * base_rhythm / 4.0, 0.08) * form));
    for hurdle in 1..10 {
        let fatigue = 1.0 + 0.018 * hurdle as f64;
        splits.push(round2(rng.gauss(base_rhythm * fatigue, 0.07) * form));
    }
    splits.push(round2(rng.gauss(5.2, 0.1) * form));
    splits
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (athlete, base inter-hurdle rhythm in seconds)
    let athletes = [
        ("Anna Keller", 4.05),
        ("Berit Hoffmann", 4.12),
        ("Carla Winter", 4.20),
        ("Dana Schulz", 4.28),
    ];
    let competitions = ["DM Berlin", "EM Qualifikation", "Läufermeeting Jena"];
    let years = [2022, 2023, 2024];

    let mut header: Vec<String> = ["Name", "Wettkampf", "Jahr", "Zeit"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend((1..=10).map(|i| format!("H{i}")));
    header.push("Ziel".to_string());

    let mut rows: Vec<Row> = Vec::new();
    for (name, rhythm) in athletes {
        for competition in competitions {
            for year in years {
                // Day-to-day form varies a little per start.
                let form = rng.gauss(1.0, 0.012);
                let splits = generate_run(rhythm, form, &mut rng);
                let total = round2(splits.iter().sum());
                rows.push(Row {
                    name,
                    competition,
                    year,
                    total,
                    splits,
                });
            }
        }
    }

    // ---- CSV ----
    let csv_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("creating sample CSV");
    writer.write_record(&header).expect("writing CSV header");
    for row in &rows {
        let mut cells = vec![
            row.name.to_string(),
            row.competition.to_string(),
            row.year.to_string(),
            row.total.to_string(),
        ];
        cells.extend(row.splits.iter().map(|v| v.to_string()));
        writer.write_record(&cells).expect("writing CSV row");
    }
    writer.flush().expect("flushing CSV");

    // ---- XLSX ----
    let xlsx_path = "sample_data.xlsx";
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1").expect("naming sheet");
    for (col, title) in header.iter().enumerate() {
        sheet
            .write_string(0, col as u16, title)
            .expect("writing XLSX header");
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, row.name).expect("cell");
        sheet.write_string(r, 1, row.competition).expect("cell");
        sheet.write_number(r, 2, row.year as f64).expect("cell");
        sheet.write_number(r, 3, row.total).expect("cell");
        for (c, &split) in row.splits.iter().enumerate() {
            sheet.write_number(r, (c + 4) as u16, split).expect("cell");
        }
    }
    workbook.save(xlsx_path).expect("saving sample XLSX");

    println!(
        "Wrote {} runs ({} segment columns) to {csv_path} and {xlsx_path}",
        rows.len(),
        header.len() - 4
    );
}
