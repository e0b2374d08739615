use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ocula_image::{Image, ImageSize};
use ocula_imgproc::threshold::{threshold_binary, threshold_kmeans, KMeansOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_test_image(width: usize, height: usize) -> Image<u8, 1> {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..(width * height)).map(|_| rng.random()).collect();
    let size = ImageSize { width, height };
    Image::new(size, data).unwrap()
}

fn bench_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("Threshold");

    for (w, h) in [(640, 480), (1920, 1080)] {
        let src = create_test_image(w, h);
        let parameter_string = format!("{}x{}", w, h);

        group.bench_with_input(
            BenchmarkId::new("binary", &parameter_string),
            &src,
            |b, src| {
                // Allocate outside to measure only algorithm performance
                let mut dst = Image::from_size_val(src.size(), 0).unwrap();
                b.iter(|| {
                    threshold_binary(src, &mut dst, 127, 255).unwrap();
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("kmeans", &parameter_string),
            &src,
            |b, src| {
                let options = KMeansOptions {
                    seed: Some(42),
                    ..Default::default()
                };
                b.iter(|| std::hint::black_box(threshold_kmeans(src, &options).unwrap()))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_threshold);
criterion_main!(benches);
