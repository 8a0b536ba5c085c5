//! Benchmarks for timeout planning, title sanitization and email extraction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use placescout::export::{sanitize_sheet_name, DEFAULT_MAX_TITLE_LENGTH};
use placescout::search::{find_email_in_html, TimeoutPlanner};

fn planning_benchmark(c: &mut Criterion) {
    let planner = TimeoutPlanner::default();

    c.bench_function("plan_timeout", |b| {
        b.iter(|| {
            for n in 0..=100 {
                black_box(planner.plan(black_box(n)));
            }
        })
    });
}

fn sanitize_benchmark(c: &mut Criterion) {
    let short = "Bakeries: SF/Oakland [2024]";
    let long = "Coffee shops near downtown ".repeat(8);

    c.bench_function("sanitize_short", |b| {
        b.iter(|| sanitize_sheet_name(black_box(short), DEFAULT_MAX_TITLE_LENGTH))
    });
    c.bench_function("sanitize_long", |b| {
        b.iter(|| sanitize_sheet_name(black_box(&long), DEFAULT_MAX_TITLE_LENGTH))
    });
}

fn email_benchmark(c: &mut Criterion) {
    let filler = "<div><span>Fresh bread daily</span><a href=\"/menu\">Menu</a></div>".repeat(200);
    let page = format!("<html><body>{filler}<p>Orders: orders@example.com</p></body></html>");

    c.bench_function("find_email_in_html", |b| {
        b.iter(|| find_email_in_html(black_box(&page)))
    });
}

criterion_group!(benches, planning_benchmark, sanitize_benchmark, email_benchmark);
criterion_main!(benches);
