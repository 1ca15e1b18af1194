//! 2D statement embedding from votes
//!
//! Each statement is a vector over participants (+1 agree, -1 disagree,
//! 0 pass or unseen). Vectors are centred per participant and projected onto
//! the two leading principal axes, found by power iteration with deflation.

use std::f64::consts::PI;

use crate::dataset::VoteMatrix;

const EPSILON: f64 = 1e-9;

/// Project statements (matrix columns) to 2D
///
/// Falls back to a unit-circle layout when the votes carry no variance, so
/// every statement always gets a coordinate.
pub fn project_statements(votes: &VoteMatrix, max_iterations: usize) -> Vec<[f64; 2]> {
    let statements = votes.cols();
    let participants = votes.rows();
    if statements == 0 {
        return Vec::new();
    }

    let data = centred_rows(votes);

    let first = principal_axis(&data, participants, &[], max_iterations);
    let Some(first) = first else {
        tracing::debug!(statements, "No vote variance, using circle layout");
        return circle_layout(statements);
    };
    let second = principal_axis(&data, participants, &[first.clone()], max_iterations);

    let xs = project(&data, &first);
    let ys = second
        .map(|axis| project(&data, &axis))
        .unwrap_or_else(|| vec![0.0; statements]);

    xs.into_iter().zip(ys).map(|(x, y)| [x, y]).collect()
}

/// Statement rows over participants, centred per participant
fn centred_rows(votes: &VoteMatrix) -> Vec<Vec<f64>> {
    let statements = votes.cols();
    let participants = votes.rows();

    let mut rows: Vec<Vec<f64>> = (0..statements)
        .map(|s| {
            (0..participants)
                .map(|p| votes.get(p, s).map(f64::from).unwrap_or(0.0))
                .collect()
        })
        .collect();

    for p in 0..participants {
        let mean = rows.iter().map(|r| r[p]).sum::<f64>() / statements as f64;
        for row in rows.iter_mut() {
            row[p] -= mean;
        }
    }
    rows
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normalize(v: &mut [f64]) -> f64 {
    let norm = dot(v, v).sqrt();
    if norm > EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    norm
}

fn project(data: &[Vec<f64>], axis: &[f64]) -> Vec<f64> {
    data.iter().map(|row| dot(row, axis)).collect()
}

/// Leading eigenvector of `data^T data` orthogonal to `exclude`
fn principal_axis(
    data: &[Vec<f64>],
    dims: usize,
    exclude: &[Vec<f64>],
    max_iterations: usize,
) -> Option<Vec<f64>> {
    if dims == 0 {
        return None;
    }

    // Deterministic, non-symmetric start so ties do not cancel out
    let mut axis: Vec<f64> = (0..dims)
        .map(|j| 1.0 + (j as f64 + 1.0).sqrt() * if j % 2 == 0 { 0.1 } else { -0.1 })
        .collect();
    orthogonalize(&mut axis, exclude);
    if normalize(&mut axis) <= EPSILON {
        return None;
    }

    for _ in 0..max_iterations.max(1) {
        let scores = project(data, &axis);
        let mut next = vec![0.0; dims];
        for (row, score) in data.iter().zip(&scores) {
            for (n, x) in next.iter_mut().zip(row) {
                *n += x * score;
            }
        }
        orthogonalize(&mut next, exclude);
        if normalize(&mut next) <= EPSILON {
            return None;
        }

        let converged = dot(&next, &axis).abs() > 1.0 - 1e-10;
        axis = next;
        if converged {
            break;
        }
    }

    canonical_sign(&mut axis);
    Some(axis)
}

fn orthogonalize(v: &mut [f64], exclude: &[Vec<f64>]) {
    for basis in exclude {
        let overlap = dot(v, basis);
        for (x, b) in v.iter_mut().zip(basis) {
            *x -= overlap * b;
        }
    }
}

/// Flip so the largest-magnitude component is positive
fn canonical_sign(axis: &mut [f64]) {
    let pivot = axis
        .iter()
        .copied()
        .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
    if pivot < 0.0 {
        axis.iter_mut().for_each(|x| *x = -*x);
    }
}

fn circle_layout(n: usize) -> Vec<[f64; 2]> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            [angle.cos(), angle.sin()]
        })
        .collect()
}
