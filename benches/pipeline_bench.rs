//! Benchmarks for the county join pipeline
//!
//! Run with: cargo bench

use countyscope::export::{self, ExportFormat, ExportKind, ExportTable};
use countyscope::map::{choropleth, feature_collection};
use countyscope::pipeline::*;
use countyscope::selection::{DashboardSelection, Selection};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use geo::{polygon, MultiPolygon};

const PREAMBLE: &str = "Title\nSource\nNotes\n\n";

fn county_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("County{:03}", i)).collect()
}

fn income_csv(names: &[String]) -> String {
    let mut csv = format!("{}County,Value (Dollars)\n", PREAMBLE);
    for (i, name) in names.iter().enumerate() {
        csv.push_str(&format!("{} County,\"{},{:03}\"\n", name, 50 + i % 40, i % 1000));
    }
    csv
}

fn unemployment_csv(names: &[String]) -> String {
    let mut csv = format!("{}County,Value (Percent)\n", PREAMBLE);
    for (i, name) in names.iter().enumerate() {
        csv.push_str(&format!(" {},{}.{}\n", name, 2 + i % 5, i % 10));
    }
    csv
}

fn boundaries(names: &[String]) -> BoundarySet {
    let rows = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let x = -97.0 + (i % 10) as f64 * 0.5;
            let y = 43.5 + (i / 10) as f64 * 0.5;
            BoundaryRow {
                state_fips: "27".to_string(),
                name: name.clone(),
                county: name.clone(),
                geoid: Some(format!("27{:03}", i)),
                geometry: MultiPolygon(vec![polygon![
                    (x: x, y: y),
                    (x: x + 0.5, y: y),
                    (x: x + 0.5, y: y + 0.5),
                    (x: x, y: y + 0.5),
                    (x: x, y: y),
                ]]),
            }
        })
        .collect::<Vec<_>>();

    BoundarySet {
        total: rows.len(),
        rows,
        crs: Crs::Nad83,
        rejected: Vec::new(),
    }
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    group.bench_function("canonical_key", |b| {
        b.iter(|| canonical_county_key(black_box("  Lac qui Parle County ")))
    });

    group.bench_function("coerce_income", |b| {
        b.iter(|| coerce_income(black_box("74,621")))
    });

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let names = county_names(87);
    let csv = income_csv(&names);

    group.throughput(Throughput::Elements(names.len() as u64));
    group.bench_function("income_table_87", |b| {
        let reader = StatTableReader::new(Metric::MedianIncome);
        b.iter(|| reader.read_str(black_box(&csv)).unwrap())
    });

    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("join");

    for size in [87, 1000] {
        let names = county_names(size);
        let income = StatTableReader::new(Metric::MedianIncome)
            .read_str(&income_csv(&names))
            .unwrap();
        let unemployment = StatTableReader::new(Metric::UnemploymentRate)
            .read_str(&unemployment_csv(&names))
            .unwrap();
        let set = boundaries(&names);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("statistics_{}", size), |b| {
            b.iter(|| {
                let mut report = JoinReport::default();
                join_statistics(black_box(&income), black_box(&unemployment), &mut report)
            })
        });

        group.bench_function(format!("assemble_{}", size), |b| {
            b.iter(|| assemble(&income, &unemployment, black_box(set.clone())))
        });
    }

    group.finish();
}

fn bench_outputs(c: &mut Criterion) {
    let mut group = c.benchmark_group("outputs");
    let names = county_names(87);
    let income = StatTableReader::new(Metric::MedianIncome)
        .read_str(&income_csv(&names))
        .unwrap();
    let unemployment = StatTableReader::new(Metric::UnemploymentRate)
        .read_str(&unemployment_csv(&names))
        .unwrap();
    let dataset = assemble(&income, &unemployment, boundaries(&names));
    let options = dataset.counties();
    let everything = Selection::all(&options);

    group.bench_function("choropleth", |b| {
        b.iter(|| choropleth(&dataset, Metric::MedianIncome, black_box(&everything)))
    });

    group.bench_function("feature_collection", |b| {
        b.iter(|| feature_collection(black_box(&dataset)))
    });

    let selection = DashboardSelection::initial(&options);
    group.bench_function("export_csv", |b| {
        b.iter(|| {
            let table = ExportTable::build(&dataset, ExportKind::Both, black_box(&selection));
            export::render(&table, ExportFormat::Csv, "bench", "Sheet1").unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_read, bench_join, bench_outputs);
criterion_main!(benches);
