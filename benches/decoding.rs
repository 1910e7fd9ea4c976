use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spidyani::lzss::{compress, decompress};
use spidyani::palette::Palette;
use spidyani::rle::{decode_pixels, encode_indices};
use spidyani::{decode_frames, Algorithm, AnimationWriter, Header};
use std::hint::black_box;
use std::time::Duration;

fn generate_indices(cells: usize, pattern: &str, frame: usize) -> Vec<u8> {
    match pattern {
        // Horizontal bands, as in title cards
        "flat" => (0..cells).map(|i| (i / 320 / 8) as u8).collect(),
        // Gradient shifting every frame, as in animated backgrounds
        "gradient" => (0..cells).map(|i| ((i + frame * 3) % 64) as u8).collect(),
        "noise" => (0..cells)
            .map(|i| {
                let x = (i + frame * cells) as u32;
                (x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223) >> 24) as u8
            })
            .collect(),
        _ => panic!("Unknown pattern: {}", pattern),
    }
}

fn generate_container(width: u16, height: u16, frames: usize, pattern: &str) -> Vec<u8> {
    let header = Header::new(width, height, frames as u16, Algorithm::Type2, true);
    let mut writer = AnimationWriter::new(Vec::new(), header).expect("Header failed");
    let cells = width as usize * height as usize;
    for frame in 0..frames {
        writer
            .write_frame(&generate_indices(cells, pattern, frame))
            .expect("Frame failed");
    }
    writer.finish().expect("Finish failed")
}

fn lzss_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzss_decompress");
    group.measurement_time(Duration::from_secs(5));

    for pattern in ["flat", "gradient", "noise"].iter() {
        let stream = encode_indices(&generate_indices(64_000, pattern, 0), None, Algorithm::Type2);
        let packed = compress(&stream);

        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::new(*pattern, stream.len()), &packed, |b, packed| {
            b.iter(|| black_box(decompress(black_box(packed), stream.len())))
        });
    }

    group.finish();
}

fn pixel_run_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel_runs");
    let palette = Palette::default();

    for algorithm in [Algorithm::Type1, Algorithm::Type2].iter() {
        for pattern in ["flat", "gradient", "noise"].iter() {
            let indices = generate_indices(64_000, pattern, 0);
            let stream = encode_indices(&indices, None, *algorithm);
            let mut frame = vec![0u32; indices.len()];

            group.throughput(Throughput::Elements(indices.len() as u64));
            group.bench_function(format!("{:?}/{}", algorithm, pattern), |b| {
                b.iter(|| {
                    decode_pixels(black_box(&stream), &mut frame, *algorithm, &palette)
                        .expect("Decode failed")
                })
            });
        }
    }

    group.finish();
}

fn container_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("container_decode");
    group.sample_size(20);

    // 320x200 fits one Data chunk per frame; 640x480 is split into bands
    for (width, height) in [(320u16, 200u16), (640, 480)].iter() {
        for pattern in ["flat", "gradient"].iter() {
            let data = generate_container(*width, *height, 8, pattern);
            let cells = *width as u64 * *height as u64 * 8;

            group.throughput(Throughput::Elements(cells));
            group.bench_with_input(
                BenchmarkId::new(format!("{}x{}", width, height), pattern),
                &data,
                |b, data| b.iter(|| decode_frames(black_box(data)).expect("Decode failed")),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    lzss_throughput,
    pixel_run_throughput,
    container_throughput
);
criterion_main!(benches);
