use std::hint::black_box;

use codspeed_criterion_compat::{Criterion, Throughput, criterion_group, criterion_main};

static SOURCE: &str = "
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
public sealed class Foo<T> : IBar where T : class { int x = 0x1F; string s = @\"a\"\"b\"; }
a += b ?? c; d = e >> 2 >= f ? g++ : --h; i => j; k?.l[m] != n && o || p;
a += b ?? c; d = e >> 2 >= f ? g++ : --h; i => j; k?.l[m] != n && o || p;
a += b ?? c; d = e >> 2 >= f ? g++ : --h; i => j; k?.l[m] != n && o || p;
a += b ?? c; d = e >> 2 >= f ? g++ : --h; i => j; k?.l[m] != n && o || p;
";

static COMMENTS: &str = "
// It was the year when they finally immanentized the Eschaton
/* It was the year when they finally immanentized the Eschaton */
#region It was the year when they finally immanentized the Eschaton
// It was the year when they finally immanentized the Eschaton
/* It was the year when they finally immanentized the Eschaton */
#endregion
";

static CANDIDATES: [(&str, &str); 2] =
    [("declarations_and_operators", SOURCE), ("comments_and_directives", COMMENTS)];

fn iterate(s: &str) {
    use keel_tokenizer::{SyntaxKind, Tokenizer};

    let mut tokenizer = Tokenizer::new(s);

    loop {
        let token = tokenizer.next_token();
        if token.kind == SyntaxKind::EOF {
            break;
        }

        black_box(token);
    }
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for (name, source) in CANDIDATES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(name, &source, |b, &s| b.iter(|| iterate(s)));
    }
}

criterion_group!(benches, bench_iterate);
criterion_main!(benches);
