// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Stride and offset properties over many shapes

use fabstir_vision_tensor::tensor::{
    compute_strides, element_count, resolve_offset, unravel_offset, StrideOrder, TensorError,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

fn random_shape(rng: &mut StdRng) -> Vec<usize> {
    let rank = rng.gen_range(1..=5);
    (0..rank).map(|_| rng.gen_range(1..=6)).collect()
}

/// Every coordinate of `shape` in row-major order
fn all_coordinates(shape: &[usize]) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new()];
    for &dim in shape {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                (0..dim).map(move |i| {
                    let mut next = prefix.clone();
                    next.push(i);
                    next
                })
            })
            .collect();
    }
    out
}

#[test]
fn test_zero_and_last_coordinate() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let shape = random_shape(&mut rng);
        let count = element_count(&shape).unwrap();
        let last: Vec<usize> = shape.iter().map(|d| d - 1).collect();
        let zero = vec![0; shape.len()];

        for order in [StrideOrder::RowMajor, StrideOrder::ColumnMajor] {
            let strides = compute_strides(&shape, order).unwrap();
            assert_eq!(resolve_offset(&strides, &zero, 0).unwrap(), 0);
            assert_eq!(
                resolve_offset(&strides, &last, 0).unwrap(),
                count - 1,
                "shape {:?} order {:?}",
                shape,
                order
            );
        }
    }
}

#[test]
fn test_offsets_are_a_bijection() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let shape = random_shape(&mut rng);
        let count = element_count(&shape).unwrap();
        let coordinates = all_coordinates(&shape);
        assert_eq!(coordinates.len(), count);

        for order in [StrideOrder::RowMajor, StrideOrder::ColumnMajor] {
            let strides = compute_strides(&shape, order).unwrap();
            let offsets: HashSet<usize> = coordinates
                .iter()
                .map(|c| resolve_offset(&strides, c, 0).unwrap())
                .collect();
            assert_eq!(offsets.len(), count);
            assert!(offsets.iter().all(|&o| o < count));
        }
    }
}

#[test]
fn test_row_major_enumerates_in_order() {
    let shape = [2, 3, 4, 5];
    let strides = compute_strides(&shape, StrideOrder::RowMajor).unwrap();
    for (expected, coordinate) in all_coordinates(&shape).iter().enumerate() {
        assert_eq!(resolve_offset(&strides, coordinate, 0).unwrap(), expected);
        assert_eq!(
            &unravel_offset(expected, &shape, StrideOrder::RowMajor).unwrap(),
            coordinate
        );
    }
}

#[test]
fn test_orders_differ_for_nontrivial_shapes() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let mut shape = random_shape(&mut rng);
        if shape.len() < 2 {
            shape.push(2);
        }
        if shape.iter().all(|&d| d == 1) {
            shape[0] = 2;
        }
        let row = compute_strides(&shape, StrideOrder::RowMajor).unwrap();
        let column = compute_strides(&shape, StrideOrder::ColumnMajor).unwrap();
        assert_ne!(row, column, "shape {:?}", shape);
    }
}

#[test]
fn test_start_dimension_skips_leading_axes() {
    let shape = [4, 3, 8, 8];
    let strides = compute_strides(&shape, StrideOrder::RowMajor).unwrap();
    for batch in 0..4 {
        let full = resolve_offset(&strides, &[batch, 2, 5, 7], 0).unwrap();
        let inner = resolve_offset(&strides, &[batch, 2, 5, 7], 1).unwrap();
        assert_eq!(full, batch * strides[0] + inner);
    }
    assert_eq!(resolve_offset(&strides, &[3, 2, 5, 7], 4).unwrap(), 0);
}

#[test]
fn test_precondition_errors() {
    assert_eq!(
        compute_strides(&[0, 3], StrideOrder::ColumnMajor).unwrap_err(),
        TensorError::InvalidDimension { axis: 0, size: 0 }
    );
    assert!(matches!(
        resolve_offset(&[3, 1], &[1, 1, 1], 0),
        Err(TensorError::RankMismatch { .. })
    ));
    assert!(matches!(
        resolve_offset(&[3, 1], &[1, 1], 5),
        Err(TensorError::StartDimensionOutOfRange { start: 5, rank: 2 })
    ));
}
