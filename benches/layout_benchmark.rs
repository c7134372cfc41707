//! Benchmarks for table layout and document rendering.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docxtext::render::{layout_table, to_markdown, to_text, wrap, RenderOptions};
use docxtext::{Cell, Document, Paragraph, Row, Table};

/// A table with a merged title row and `rows` rows of mixed CJK and Latin text.
fn create_table(rows: usize, cols: usize) -> Table {
    let mut table = Table::new();
    table.add_row(Row::header(vec![
        Cell::header("季度销售报告 Quarterly report").spanning_columns(cols as u32)
    ]));
    for r in 0..rows {
        let cells = (0..cols)
            .map(|c| Cell::with_text(format!("第{}行 row {} column {} 数据内容", r, r, c)))
            .collect();
        table.add_row(Row::new(cells));
    }
    table
}

/// A document alternating paragraphs and tables.
fn create_document(block_count: usize) -> Document {
    let mut doc = Document::new();
    for i in 0..block_count {
        if i % 4 == 3 {
            doc.add_table(create_table(5, 3));
        } else {
            doc.add_paragraph(Paragraph::with_text(
                "Lorem ipsum dolor sit amet, 中文排版需要按照显示宽度换行 consectetur adipiscing elit.",
            ));
        }
    }
    doc
}

fn bench_table_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_layout");
    let options = RenderOptions::default();

    for rows in [5, 50, 500].iter() {
        let table = create_table(*rows, 4);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &table, |b, table| {
            b.iter(|| {
                let _ = layout_table(black_box(table), 100, 1, &options);
            });
        });
    }

    group.finish();
}

fn bench_nested_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_layout");
    let options = RenderOptions::default();

    for depth in [2, 4, 8].iter() {
        let mut table = create_table(2, 2);
        for _ in 1..*depth {
            table = Table::from_rows(vec![Row::new(vec![
                Cell::with_table(table),
                Cell::with_text("外层"),
            ])]);
        }
        group.bench_with_input(BenchmarkId::new("depth", depth), &table, |b, table| {
            b.iter(|| {
                let _ = layout_table(black_box(table), 200, 1, &options);
            });
        });
    }

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    let options = RenderOptions::default();

    for blocks in [10, 100, 500].iter() {
        let doc = create_document(*blocks);
        group.bench_with_input(BenchmarkId::new("text", blocks), &doc, |b, doc| {
            b.iter(|| {
                let _ = to_text(black_box(doc), &options);
            });
        });
        group.bench_with_input(BenchmarkId::new("markdown", blocks), &doc, |b, doc| {
            b.iter(|| {
                let _ = to_markdown(black_box(doc), &options);
            });
        });
    }

    group.finish();
}

fn bench_wrap(c: &mut Criterion) {
    let text = "表格布局引擎 wraps mixed 中文 and English text by display width. ".repeat(50);
    c.bench_function("wrap_mixed_text", |b| {
        b.iter(|| wrap(black_box(&text), 40));
    });
}

criterion_group!(
    benches,
    bench_table_layout,
    bench_nested_layout,
    bench_rendering,
    bench_wrap,
);
criterion_main!(benches);
