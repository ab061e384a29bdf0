//! rfv-runner: headless runner for the RFV segmentation pipeline.
//!
//! Usage:
//!   rfv-runner --input purchases.csv --output segmented.csv
//!   rfv-runner --input purchases.csv --reference-date 2024-06-30 \
//!              --actions actions.json --summary-json summary.json
//!   rfv-runner --generate 5000 --seed 42 --out purchases.csv
//!
//! Everything the core treats as a collaborator lives here: CSV ingestion
//! (with date parsing), reference-date defaulting, action-table loading,
//! result export, and a deterministic sample-log generator.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rfv_core::{
    config::ActionTable,
    grading::Grade,
    pipeline::segment_with_boundaries,
    quartiles::QuartileBoundaries,
    score::SegmentedCustomer,
    types::{Measure, Transaction},
};
use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--generate") {
        let count = parse_arg(&args, "--generate", 1000usize);
        let seed = parse_arg(&args, "--seed", 42u64);
        let days = parse_arg(&args, "--days", 365u32);
        let out = str_arg(&args, "--out").unwrap_or("purchases.csv");
        return generate_sample_log(count, seed, days, out);
    }

    let Some(input) = str_arg(&args, "--input") else {
        bail!("missing --input <purchases.csv> (or --generate N to make one)");
    };

    let mut transactions = read_transactions(input)?;
    if let Some(limit) = opt_arg::<usize>(&args, "--limit") {
        transactions.truncate(limit);
    }

    // The core requires an explicit reference date; defaulting to the
    // log's own maximum purchase date is this runner's choice.
    let reference_date = match str_arg(&args, "--reference-date") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --reference-date '{raw}'"))?,
        None => transactions
            .iter()
            .map(|t| t.purchase_date)
            .max()
            .context("empty input log: cannot default the reference date")?,
    };

    let actions = match str_arg(&args, "--actions") {
        Some(path) => ActionTable::load(path)?,
        None => ActionTable::builtin(),
    };

    println!("rfv-runner");
    println!("  input:          {input}");
    println!("  transactions:   {}", transactions.len());
    println!("  reference date: {reference_date}");
    println!("  action table:   {} mapped scores", actions.len());
    println!();

    let (segmented, boundaries) = segment_with_boundaries(&transactions, reference_date, &actions)?;

    if let Some(output) = str_arg(&args, "--output") {
        export(&segmented, output)?;
        println!("wrote {} rows to {output}", segmented.len());
    }

    if let Some(path) = str_arg(&args, "--summary-json") {
        let summary = RunSummary::build(&segmented, &boundaries, &actions, reference_date);
        let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;
        println!("wrote summary to {path}");
    }

    print_summary(&segmented, &boundaries, &actions);
    Ok(())
}

// ── CSV ingestion ────────────────────────────────────────────────────────────

/// Read a purchase log: a header line, then
/// `customer_id,purchase_date,purchase_id,amount` rows with ISO dates.
/// Malformed rows are skipped with a warning, never fatal.
fn read_transactions(path: &str) -> Result<Vec<Transaction>> {
    let file = File::open(path).with_context(|| format!("cannot open {path}"))?;
    let reader = BufReader::new(file);

    let mut transactions = Vec::new();
    let mut skipped = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 || line.trim().is_empty() {
            continue; // header
        }
        match parse_row(&line) {
            Some(txn) => transactions.push(txn),
            None => {
                skipped += 1;
                log::warn!("{path}:{}: skipping malformed row: {line}", idx + 1);
            }
        }
    }
    if skipped > 0 {
        log::warn!("{path}: skipped {skipped} malformed rows");
    }
    log::info!("read {} transactions from {path}", transactions.len());
    Ok(transactions)
}

fn parse_row(line: &str) -> Option<Transaction> {
    let mut fields = line.split(',');
    let customer_id = fields.next()?.trim();
    let purchase_date = NaiveDate::parse_from_str(fields.next()?.trim(), "%Y-%m-%d").ok()?;
    let purchase_id = fields.next()?.trim();
    let amount: f64 = fields.next()?.trim().parse().ok()?;
    if customer_id.is_empty() || purchase_id.is_empty() || fields.next().is_some() {
        return None;
    }
    Some(Transaction {
        customer_id: customer_id.to_string(),
        purchase_date,
        purchase_id: purchase_id.to_string(),
        amount,
    })
}

// ── Export ───────────────────────────────────────────────────────────────────

/// Write the segmented table as CSV or JSON, chosen by file extension.
fn export(segmented: &[SegmentedCustomer], path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    let mut out = BufWriter::new(file);

    if path.ends_with(".json") {
        serde_json::to_writer_pretty(&mut out, segmented)?;
        writeln!(out)?;
        return Ok(());
    }
    if !path.ends_with(".csv") {
        bail!("unsupported output extension for {path}: use .csv or .json");
    }

    writeln!(
        out,
        "customer_id,recency_days,frequency,value,grade_recency,grade_frequency,grade_value,score,action"
    )?;
    for row in segmented {
        writeln!(
            out,
            "{},{},{},{:.2},{},{},{},{},\"{}\"",
            row.customer_id,
            row.recency_days,
            row.frequency,
            row.value,
            row.grade_recency.as_char(),
            row.grade_frequency.as_char(),
            row.grade_value.as_char(),
            row.score,
            row.action.replace('"', "\"\""),
        )?;
    }
    Ok(())
}

// ── Run summary ──────────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct MeasureSummary {
    q25: f64,
    q50: f64,
    q75: f64,
    grade_counts: BTreeMap<char, usize>,
}

#[derive(serde::Serialize)]
struct RunSummary {
    reference_date: NaiveDate,
    customers: usize,
    mapped_actions: usize,
    unmapped_actions: usize,
    measures: BTreeMap<String, MeasureSummary>,
    score_counts: BTreeMap<String, usize>,
}

impl RunSummary {
    fn build(
        segmented: &[SegmentedCustomer],
        boundaries: &QuartileBoundaries,
        actions: &ActionTable,
        reference_date: NaiveDate,
    ) -> Self {
        let mut measures = BTreeMap::new();
        for measure in Measure::ALL {
            let Ok(bands) = boundaries.bands_for(measure) else {
                continue;
            };
            let mut grade_counts: BTreeMap<char, usize> =
                [('A', 0), ('B', 0), ('C', 0), ('D', 0)].into();
            for row in segmented {
                *grade_counts
                    .entry(grade_of(row, measure).as_char())
                    .or_default() += 1;
            }
            measures.insert(
                measure.name().to_string(),
                MeasureSummary {
                    q25: bands.q25,
                    q50: bands.q50,
                    q75: bands.q75,
                    grade_counts,
                },
            );
        }

        let mut score_counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in segmented {
            *score_counts.entry(row.score.clone()).or_default() += 1;
        }

        let unmapped = segmented
            .iter()
            .filter(|r| r.action == actions.fallback())
            .count();

        Self {
            reference_date,
            customers: segmented.len(),
            mapped_actions: segmented.len() - unmapped,
            unmapped_actions: unmapped,
            measures,
            score_counts,
        }
    }
}

fn grade_of(row: &SegmentedCustomer, measure: Measure) -> Grade {
    match measure {
        Measure::Recency => row.grade_recency,
        Measure::Frequency => row.grade_frequency,
        Measure::Value => row.grade_value,
    }
}

fn print_summary(
    segmented: &[SegmentedCustomer],
    boundaries: &QuartileBoundaries,
    actions: &ActionTable,
) {
    println!("=== SEGMENTATION SUMMARY ===");
    println!("  customers: {}", segmented.len());

    for measure in Measure::ALL {
        if let Ok(bands) = boundaries.bands_for(measure) {
            println!(
                "  {:<9} | q25: {:.2} | q50: {:.2} | q75: {:.2}",
                measure.name(),
                bands.q25,
                bands.q50,
                bands.q75
            );
        }
    }

    let mut score_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in segmented {
        *score_counts.entry(row.score.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<_> = score_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!();
    println!("=== TOP SCORES ===");
    for (score, count) in ranked.iter().take(8) {
        println!(
            "  {score} | {count:>6} customers | {}",
            actions.action_for(score)
        );
    }

    let unmapped = segmented
        .iter()
        .filter(|r| r.action == actions.fallback())
        .count();
    println!();
    println!(
        "  mapped actions: {} | unmapped (sentinel): {unmapped}",
        segmented.len() - unmapped
    );
}

// ── Sample-log generator ─────────────────────────────────────────────────────

/// Deterministic RNG for the sample generator: a single seeded PCG
/// stream, with the Pareto sampler used for purchase amounts.
struct SampleRng {
    inner: rand_pcg::Pcg64Mcg,
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            inner: rand_pcg::Pcg64Mcg::seed_from_u64(seed),
        }
    }

    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Simplified Pareto sample. x_min: minimum value, alpha: shape
    /// parameter (higher = less skewed).
    fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Write a synthetic purchase log: `customers` customers over `days`
/// days ending today, with Pareto-distributed amounts and a skewed
/// purchase count so the quartile grades spread across all four buckets.
fn generate_sample_log(customers: usize, seed: u64, days: u32, out: &str) -> Result<()> {
    use uuid::Uuid;

    let end = chrono::Local::now().date_naive();
    let mut rng = SampleRng::new(seed);

    let file = File::create(out).with_context(|| format!("cannot create {out}"))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "customer_id,purchase_date,purchase_id,amount")?;

    let mut rows = 0usize;
    for i in 0..customers {
        let customer_id = format!("c-{i:06}");
        // 1..=12 purchases, skewed toward the low end
        let purchases = 1 + (rng.pareto(1.0, 1.8) as u64).min(11);
        for _ in 0..purchases {
            let offset = rng.next_u64_below(u64::from(days)) as i64;
            let purchase_date = end - chrono::Duration::days(offset);
            let amount = (rng.pareto(10.0, 1.4).min(2000.0) * 100.0).round() / 100.0;
            writeln!(
                writer,
                "{customer_id},{purchase_date},{},{amount:.2}",
                Uuid::new_v4()
            )?;
            rows += 1;
        }
    }

    println!("generated {rows} transactions for {customers} customers in {out} (seed {seed})");
    Ok(())
}

// ── Flag parsing ─────────────────────────────────────────────────────────────

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    opt_arg(args, flag).unwrap_or(default)
}

fn opt_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_row() {
        let txn = parse_row("c-000001,2024-03-15,ord-9,42.50").unwrap();
        assert_eq!(txn.customer_id, "c-000001");
        assert_eq!(
            txn.purchase_date,
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(txn.purchase_id, "ord-9");
        assert_eq!(txn.amount, 42.50);
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(parse_row("c-1,not-a-date,ord-1,10.0").is_none());
        assert!(parse_row("c-1,2024-03-15,ord-1,ten").is_none());
        assert!(parse_row("c-1,2024-03-15,ord-1").is_none());
        assert!(parse_row("c-1,2024-03-15,ord-1,10.0,extra").is_none());
        assert!(parse_row(",2024-03-15,ord-1,10.0").is_none());
    }

    #[test]
    fn generator_is_deterministic_for_a_fixed_seed() {
        let mut a = SampleRng::new(7);
        let mut b = SampleRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }
}
