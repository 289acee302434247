//! Matrix-vector kernels on raw amplitude slices
//!
//! Qubit `q` is bit `q` of an amplitude index. A k-qubit matrix acting on
//! `qubits` uses `qubits[0]` as the most significant bit of its local index.

use num_complex::Complex64;

/// Apply a 2×2 matrix to one qubit in place
///
/// Amplitudes are processed in pairs (i, j) that differ only in the target
/// bit; O(2^n).
pub fn apply_single_qubit(state: &mut [Complex64], matrix: &[Complex64], qubit: usize) {
    let qubit_mask = 1 << qubit;

    let m00 = matrix[0];
    let m01 = matrix[1];
    let m10 = matrix[2];
    let m11 = matrix[3];

    for i in 0..state.len() {
        if i & qubit_mask != 0 {
            continue;
        }
        let j = i | qubit_mask;

        let amp0 = state[i];
        let amp1 = state[j];

        state[i] = m00 * amp0 + m01 * amp1;
        state[j] = m10 * amp0 + m11 * amp1;
    }
}

/// Apply a 2^k × 2^k row-major matrix to `qubits` in place
///
/// Callers validate that `qubits` are distinct, in range, and that the matrix
/// has the right size.
pub fn apply_matrix(state: &mut [Complex64], matrix: &[Complex64], qubits: &[usize]) {
    if qubits.len() == 1 {
        apply_single_qubit(state, matrix, qubits[0]);
        return;
    }

    let k = qubits.len();
    let dim = 1usize << k;
    let mask = qubits.iter().fold(0usize, |m, &q| m | (1 << q));

    // offsets[local] = global bits selected by the local index
    let offsets: Vec<usize> = (0..dim)
        .map(|local| {
            qubits
                .iter()
                .enumerate()
                .filter(|(j, _)| (local >> (k - 1 - j)) & 1 == 1)
                .fold(0usize, |acc, (_, &q)| acc | (1 << q))
        })
        .collect();

    let mut gathered = vec![Complex64::new(0.0, 0.0); dim];
    for base in 0..state.len() {
        if base & mask != 0 {
            continue;
        }
        for (local, slot) in gathered.iter_mut().enumerate() {
            *slot = state[base | offsets[local]];
        }
        for (row, &offset) in offsets.iter().enumerate() {
            let row_entries = &matrix[row * dim..(row + 1) * dim];
            state[base | offset] = row_entries
                .iter()
                .zip(&gathered)
                .map(|(m, a)| m * a)
                .sum();
        }
    }
}

/// Σ |a_i|²
pub fn squared_norm(state: &[Complex64]) -> f64 {
    state.iter().map(|a| a.norm_sqr()).sum()
}
