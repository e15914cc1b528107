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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}

fn generate_trading_csv(path: &str, rng: &mut SimpleRng) {
    let mut writer = csv::Writer::from_path(path).expect("creating trading csv");
    writer
        .write_record([
            "Open time",
            "Open",
            "High",
            "Low",
            "Close",
            "Quote asset volume",
            "Number of trades",
            "Taker buy base asset volume",
            "Taker buy quote asset volume",
            "Ignore",
        ])
        .expect("writing trading header");

    let mut price = 42_000.0;
    for minute in 0..1_000u64 {
        let open = price;
        let close = open + rng.range(-80.0, 80.0);
        let high = open.max(close) + rng.range(0.0, 40.0);
        let low = open.min(close) - rng.range(0.0, 40.0);
        let volume = rng.range(5.0, 120.0);
        let trades = (rng.range(20.0, 900.0)) as u64;

        writer
            .write_record([
                (1_700_000_000_000 + minute * 60_000).to_string(),
                format!("{open:.2}"),
                format!("{high:.2}"),
                format!("{low:.2}"),
                format!("{close:.2}"),
                format!("{volume:.4}"),
                trades.to_string(),
                format!("{:.4}", volume * 0.4),
                format!("{:.4}", volume * 0.4 * open),
                "0".to_string(),
            ])
            .expect("writing trading row");
        price = close;
    }
    writer.flush().expect("flushing trading csv");
}

fn generate_sales_csv(path: &str, rng: &mut SimpleRng) {
    let games = [
        ("Galaxy Racer", "Racing", "Nintenco"),
        ("Shadow Keep", "RPG", "Squaresoft"),
        ("Goal Fever", "Sports", "EA Games"),
        ("Puzzle Loop", "Puzzle", "Indievision"),
    ];
    let platforms = ["PC", "PS4", "XBOX", "Switch"];

    let mut writer = csv::Writer::from_path(path).expect("creating sales csv");
    writer
        .write_record([
            "Rank", "Name", "Platform", "Year", "Genre", "Publisher", "NA_Sales", "EU_Sales",
            "JP_Sales", "Other_Sales", "Global_Sales",
        ])
        .expect("writing sales header");

    let mut rank = 1u32;
    for (name, genre, publisher) in games {
        for platform in platforms {
            for year in 2000..2006 {
                let na = rng.range(0.0, 4.0);
                let eu = rng.range(0.0, 3.0);
                let jp = rng.range(0.0, 2.0);
                let other = rng.range(0.0, 1.0);
                writer
                    .write_record([
                        rank.to_string(),
                        name.to_string(),
                        platform.to_string(),
                        year.to_string(),
                        genre.to_string(),
                        publisher.to_string(),
                        format!("{na:.2}"),
                        format!("{eu:.2}"),
                        format!("{jp:.2}"),
                        format!("{other:.2}"),
                        format!("{:.2}", na + eu + jp + other),
                    ])
                    .expect("writing sales row");
                rank += 1;
            }
        }
    }
    writer.flush().expect("flushing sales csv");
}

fn generate_robot_xlsx(path: &str, rng: &mut SimpleRng) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in ["Date", "Price", "Volume", "Position", "PnL"].iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .expect("writing robot header");
    }

    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("base date");
    let mut price = 100.0;
    let mut pnl = 0.0;
    for day in 0..365u32 {
        let row = day + 1;
        let date = format!("{} 10:30:00", base + chrono::Days::new(day as u64));

        price += rng.range(-2.0, 2.2);
        let volume = rng.range(100.0, 5_000.0);
        let position = if rng.next_f64() > 0.5 { 1.0 } else { -1.0 };
        pnl += position * rng.range(-1.0, 1.2);

        sheet.write_string(row, 0, &date).expect("writing date");
        sheet.write_number(row, 1, price).expect("writing price");
        sheet.write_number(row, 2, volume).expect("writing volume");
        sheet.write_number(row, 3, position).expect("writing position");
        sheet.write_number(row, 4, pnl).expect("writing pnl");
    }

    workbook.save(path).expect("saving robot xlsx");
}

fn main() {
    std::fs::create_dir_all("data").expect("creating data directory");
    let mut rng = SimpleRng::new(42);

    generate_trading_csv("data/btcusd_1m.csv", &mut rng);
    generate_sales_csv("data/vgsales.csv", &mut rng);
    generate_robot_xlsx("data/robot_log.xlsx", &mut rng);

    println!("Wrote data/btcusd_1m.csv, data/vgsales.csv, data/robot_log.xlsx");
}
