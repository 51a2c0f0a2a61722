use bazi_time::{
    SolarTerm, SolarTermSource, apparent_solar_longitude, correct_to_true_solar,
    generate_term_table, solar_term_jd,
};
use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn solar_time_bench(c: &mut Criterion) {
    let civil = NaiveDate::from_ymd_opt(1990, 5, 15)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();

    let mut group = c.benchmark_group("solar_time");
    group.bench_function("correct_to_true_solar", |b| {
        b.iter(|| correct_to_true_solar(black_box(civil), black_box(116.4), 120.0))
    });
    group.finish();
}

fn solar_term_bench(c: &mut Criterion) {
    let table = generate_term_table(1900..=2100).unwrap();
    let sample = NaiveDate::from_ymd_opt(1990, 5, 15)
        .unwrap()
        .and_hms_opt(6, 30, 0)
        .unwrap();

    let mut group = c.benchmark_group("solar_terms");
    group.bench_function("apparent_solar_longitude", |b| {
        b.iter(|| apparent_solar_longitude(black_box(2_451_545.0)))
    });
    group.bench_function("solar_term_jd", |b| {
        b.iter(|| solar_term_jd(black_box(2024), SolarTerm::Lichun))
    });
    group.bench_function("sectional_before", |b| {
        b.iter(|| table.sectional_before(black_box(sample)))
    });
    group.finish();
}

criterion_group!(benches, solar_time_bench, solar_term_bench);
criterion_main!(benches);
