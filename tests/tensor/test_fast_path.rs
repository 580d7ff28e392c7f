// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Vectorized and parallel packing must match the scalar kernel bit for bit

use fabstir_vision_tensor::tensor::{
    pack_with, NormalizationParams, OffsetStrategy, PackOptions, PixelBuffer, TensorBuffer,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once)
fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

fn random_batch(rng: &mut StdRng, batch: usize, width: usize, height: usize) -> Vec<PixelBuffer> {
    (0..batch)
        .map(|_| {
            let data = (0..width * height * 3).map(|_| rng.gen::<u8>()).collect();
            PixelBuffer::new(width, height, data).unwrap()
        })
        .collect()
}

fn bits(tensor: &TensorBuffer) -> Vec<u32> {
    tensor.as_slice().iter().map(|v| v.to_bits()).collect()
}

fn all_options() -> Vec<PackOptions> {
    let mut options = Vec::new();
    for strategy in [OffsetStrategy::Scalar, OffsetStrategy::Vectorized] {
        for parallel in [false, true] {
            options.push(PackOptions { strategy, parallel });
        }
    }
    options
}

#[test]
fn test_all_paths_bit_identical() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(42);
    let params = NormalizationParams::imagenet();

    // Widths on, below and off the eight-lane boundary
    for &(width, height) in &[(1, 1), (7, 3), (8, 2), (9, 5), (16, 16), (31, 4), (224, 3)] {
        let batch = rng.gen_range(1..=4);
        let images = random_batch(&mut rng, batch, width, height);
        let shape = [batch, 3, height, width];

        let reference = pack_with(
            &images,
            &params,
            &shape,
            PackOptions {
                strategy: OffsetStrategy::Scalar,
                parallel: false,
            },
        )
        .unwrap();

        for options in all_options() {
            let tensor = pack_with(&images, &params, &shape, options).unwrap();
            assert_eq!(tensor.shape(), reference.shape());
            assert_eq!(
                bits(&tensor),
                bits(&reference),
                "{}x{} batch {} with {:?}",
                width,
                height,
                batch,
                options
            );
        }
    }
}

#[test]
fn test_random_normalization_bit_identical() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..20 {
        let mean: Vec<f32> = (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let stddev: Vec<f32> = (0..3).map(|_| rng.gen_range(0.01..2.0)).collect();
        let params = NormalizationParams::new(mean, stddev).unwrap();

        let width = rng.gen_range(1..=40);
        let height = rng.gen_range(1..=6);
        let batch = rng.gen_range(1..=3);
        let images = random_batch(&mut rng, batch, width, height);
        let shape = [batch, 3, height, width];

        let outputs: Vec<Vec<u32>> = all_options()
            .into_iter()
            .map(|options| bits(&pack_with(&images, &params, &shape, options).unwrap()))
            .collect();
        assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
    }
}

#[test]
fn test_parallel_preserves_batch_order() {
    init_tracing();
    let images: Vec<PixelBuffer> = (0..16u8)
        .map(|i| PixelBuffer::filled(10, 3, [i, i, i]))
        .collect();
    let tensor = pack_with(
        &images,
        &NormalizationParams::identity(3),
        &[16, 3, 3, 10],
        PackOptions {
            strategy: OffsetStrategy::Vectorized,
            parallel: true,
        },
    )
    .unwrap();

    for i in 0..16 {
        let expected = i as f32 / 255.0;
        assert!(tensor.image(i).unwrap().iter().all(|&v| v == expected));
    }
}

#[test]
fn test_fast_path_rejects_like_scalar() {
    init_tracing();
    let images = vec![
        PixelBuffer::filled(8, 8, [0, 0, 0]),
        PixelBuffer::filled(9, 8, [0, 0, 0]),
    ];
    for options in all_options() {
        let err = pack_with(&images, &NormalizationParams::imagenet(), &[2, 3, 8, 8], options)
            .unwrap_err();
        assert_eq!(err.error_code(), "IMAGE_SIZE_MISMATCH");
    }
}
