use criterion::{black_box, criterion_group, criterion_main, Criterion};

use assessment_core::spreadsheet::{parse_row, CellValue};
use chrono::NaiveDate;

fn bench_parse_row(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_row");
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    let native = vec![
        CellValue::Text("Zhang San".into()),
        CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        CellValue::Number(4.0),
        CellValue::Number(87.5),
        CellValue::Number(7.0),
        CellValue::Number(8.0),
    ];

    let textual = vec![
        CellValue::Text("  Li Si ".into()),
        CellValue::Text("2024-01-02".into()),
        CellValue::Text("4".into()),
        CellValue::Text("87.5".into()),
        CellValue::Text("7".into()),
        CellValue::Text("8".into()),
    ];

    let mixed = vec![
        CellValue::Number(1001.0),
        CellValue::Number(45293.0),
        CellValue::Formula {
            expression: "=2+2".into(),
            cached: Some(4.0),
        },
        CellValue::Text("n/a".into()),
        CellValue::Bool(true),
        CellValue::Empty,
    ];

    group.bench_function("native", |b| {
        b.iter(|| parse_row(black_box(&native), today))
    });

    group.bench_function("textual", |b| {
        b.iter(|| parse_row(black_box(&textual), today))
    });

    group.bench_function("mixed", |b| {
        b.iter(|| parse_row(black_box(&mixed), today))
    });

    group.finish();
}

criterion_group!(benches, bench_parse_row);
criterion_main!(benches);
