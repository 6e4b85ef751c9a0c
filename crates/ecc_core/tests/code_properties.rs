use ecc_core::families::{hamming_code, random_code, rep_code, ring_code};
use ecc_core::{
    CodeError, CodeParameters, DistanceEstimator, EstimatorConfig, SearchOutcome, SparseBinMatrix,
    compute_code_dimension, compute_code_parameters, compute_code_parameters_with,
    construct_generator_matrix, estimate_min_distance, row_reduce,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn generator_matrix_is_annihilated_by_parity_checks() {
    for i in 3..10 {
        let h = hamming_code(i);
        let g = construct_generator_matrix(&h);
        assert_eq!(g.rows(), h.cols() - h.rows());
        assert!(h.mul_transpose(&g).unwrap().is_zero(), "hamming({i})");
    }
}

#[test]
fn witness_of_random_code_is_a_codeword() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    for _ in 0..10 {
        let h = random_code(20, 30, 4, &mut rng);
        let est = estimate_min_distance(&h, 0.025).unwrap();
        assert!(h.is_codeword(&est.codeword).unwrap());
        assert_eq!(est.codeword.weight(), est.distance);
        assert!(est.distance > 0);
    }
}

#[test]
fn hamming_distance_is_at_least_three() {
    for i in 3..11 {
        let h = hamming_code(i);
        let est = estimate_min_distance(&h, 0.025).unwrap();
        assert!(h.is_codeword(&est.codeword).unwrap());
        assert!(est.distance >= 3, "hamming({i}) gave {}", est.distance);
    }
}

#[test]
fn ring_distance_equals_length() {
    for i in 3..25 {
        let h = ring_code(i);
        let est = estimate_min_distance(&h, 0.025).unwrap();
        assert!(h.is_codeword(&est.codeword).unwrap());
        assert_eq!(est.distance, i);
    }
}

#[test]
fn dimensions_of_known_families() {
    for i in 3..12 {
        let h = hamming_code(i);
        assert_eq!(compute_code_dimension(&h), h.cols() - h.rows());
        assert_eq!(compute_code_dimension(&rep_code(i)), 1);
        assert_eq!(compute_code_dimension(&ring_code(i)), 1);
    }
}

#[test]
fn dimension_is_columns_minus_rank() {
    let h = SparseBinMatrix::from_dense(&[
        vec![1, 1, 0, 1, 0, 0],
        vec![0, 1, 1, 0, 1, 0],
        vec![1, 0, 1, 1, 1, 0],
    ])
    .unwrap();
    // Row 2 = row 0 + row 1.
    assert_eq!(row_reduce(&h).rank(), 2);
    assert_eq!(compute_code_dimension(&h), 4);
}

#[test]
fn parameters_of_hamming_codes() {
    for i in 3..10 {
        let h = hamming_code(i);
        let CodeParameters { n, k, d } = compute_code_parameters(&h).unwrap();
        assert_eq!(n, h.cols());
        assert_eq!(k, h.cols() - h.rows());
        assert!(d >= 3);
    }
}

#[test]
fn seeded_parameters_are_idempotent() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let h = random_code(30, 70, 6, &mut rng);
    let config = EstimatorConfig::default().with_seed(31).with_workers(2);
    let first = compute_code_parameters_with(&h, &config).unwrap();
    for _ in 0..3 {
        assert_eq!(compute_code_parameters_with(&h, &config).unwrap(), first);
    }
}

#[test]
fn full_column_rank_is_degenerate() {
    let h = SparseBinMatrix::from_dense(&[
        vec![1, 0, 0],
        vec![1, 1, 0],
        vec![0, 1, 1],
        vec![1, 1, 1],
    ])
    .unwrap();
    assert_eq!(compute_code_dimension(&h), 0);
    let g = construct_generator_matrix(&h);
    assert_eq!((g.rows(), g.cols()), (0, 3));
    assert_eq!(
        estimate_min_distance(&h, 0.025).unwrap_err(),
        CodeError::DegenerateCode { cols: 3 }
    );
}

#[test]
fn hamming_7_4_end_to_end() {
    let h = SparseBinMatrix::from_dense(&[
        vec![0, 0, 0, 1, 1, 1, 1],
        vec![0, 1, 1, 0, 0, 1, 1],
        vec![1, 0, 1, 0, 1, 0, 1],
    ])
    .unwrap();
    assert_eq!((h.cols(), h.rows()), (7, 3));
    assert_eq!(compute_code_dimension(&h), 4);

    let est = estimate_min_distance(&h, 0.025).unwrap();
    assert_eq!(est.distance, 3);
    assert_eq!(est.codeword.weight(), 3);
    assert!(h.mul_vec(&est.codeword).unwrap().is_zero());

    // The randomized path must agree with enumeration.
    let config = EstimatorConfig::default()
        .with_seed(1)
        .with_exhaustive_max_dim(0);
    let est = DistanceEstimator::new(config).estimate(&h).unwrap();
    assert_eq!(est.outcome, SearchOutcome::ConfidenceReached);
    assert_eq!(est.distance, 3);
}
