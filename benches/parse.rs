//! Benchmarks for NZB parsing
//!
//! Measures the full pipeline (XML tree, extraction, aggregation) and the
//! subject filename heuristic on generated documents.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Generate an NZB with `files` files of `segments` segments each
fn generate_nzb(files: usize, segments: usize) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<nzb xmlns=\"http://www.newzbin.com/DTD/2003/nzb\">\n\
         <head><meta type=\"title\">Benchmark</meta></head>\n",
    );

    for f in 0..files {
        xml.push_str(&format!(
            "<file poster=\"bench@example.com\" date=\"1706440708\" subject=\"[{}/{}] - &quot;archive.part{:03}.rar&quot; yEnc (1/{})\">\n\
             <groups><group>alt.binaries.test</group><group>alt.binaries.misc</group></groups>\n<segments>\n",
            f + 1,
            files,
            f + 1,
            segments
        ));
        for s in (1..=segments).rev() {
            xml.push_str(&format!(
                "<segment bytes=\"739610\" number=\"{}\">part{}of{}.{}@example.com</segment>\n",
                s, s, segments, f
            ));
        }
        xml.push_str("</segments>\n</file>\n");
    }

    xml.push_str("</nzb>\n");
    xml
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("nzb_parse");

    for (files, segments) in [(1, 10), (10, 100), (50, 500)] {
        let xml = generate_nzb(files, segments);
        group.throughput(Throughput::Bytes(xml.len() as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", files, segments)),
            &xml,
            |b, xml| {
                b.iter(|| nzb_rs::parse(black_box(xml)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_derive_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_name");

    let subjects = [
        ("quoted", r#"[1/5] - "Big Buck Bunny - S01E01.mkv" yEnc (1/24) 16981056"#),
        ("bare", "Here's your file!  abc-mr2a.r01 (1/2)"),
        ("none", "no filename to be found here (1/1)"),
    ];

    for (label, subject) in subjects {
        group.bench_with_input(BenchmarkId::from_parameter(label), subject, |b, s| {
            b.iter(|| nzb_rs::derive_name(black_box(s)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_derive_name);
criterion_main!(benches);
