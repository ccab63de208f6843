use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use keel_parse::{ParseOptions, parse_text};

fn benchmark_parser(c: &mut Criterion) {
    let options = ParseOptions::default();
    let inputs = [
        (
            "Simple",
            r#"
            class Program
            {
                static int Main() { return 42; }
            }
            "#,
        ),
        (
            "Medium",
            r#"
            namespace Shapes
            {
                public sealed class Circle : Shape
                {
                    private double radius;

                    public Circle(double radius) : base("circle") { this.radius = radius; }

                    public override double Area => 3.14 * radius * radius;

                    public int Sum(int[] values)
                    {
                        int total = 0;
                        for (int i = 0; i < values.Length; i++) { total += values[i]; }
                        foreach (var value in values) { if (value > 0) total++; else total--; }
                        return total;
                    }
                }
            }
            "#,
        ),
        (
            "Broken",
            r#"
            public class : {
                public public int P { protected }
                void M() { int s = true ? x++, y++ : y++; foreach (int in xs) { }
                int[] i = new int[5];;
            "#,
        ),
    ];

    let mut group = c.benchmark_group("Parser Benchmark");

    for (name, code) in inputs {
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_code", name), &code, |b, &code| {
            b.iter(|| {
                let parse = parse_text(code, &options);
                black_box(parse);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
