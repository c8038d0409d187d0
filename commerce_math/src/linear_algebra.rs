//! Penalised least squares
//!
//! Solves `(XᵀX + diag(λ)) β = Xᵀy` with a Cholesky factorisation. A
//! Gaussian prior of scale `s` on coefficient `j` corresponds to
//! `λ_j = σ² / s²`, so the solution is the maximum a-posteriori estimate of an
//! additive model with independent Gaussian priors.

use crate::{MathError, Result};

/// Dense row-major design matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DesignMatrix {
    /// Build a design matrix from equally sized rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(MathError::InvalidInput(
                "Design matrix needs at least one row and one column".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MathError::InvalidInput(format!(
                    "Row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of observations
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of regressors
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Borrow one row
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Multiply the matrix by a coefficient vector
    pub fn multiply(&self, beta: &[f64]) -> Result<Vec<f64>> {
        if beta.len() != self.cols {
            return Err(MathError::InvalidInput(format!(
                "Coefficient vector has {} entries, expected {}",
                beta.len(),
                self.cols
            )));
        }

        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(beta).map(|(x, b)| x * b).sum())
            .collect())
    }
}

/// Solve a ridge-penalised least squares problem
///
/// `penalties[j]` is added to the j-th diagonal entry of the normal
/// equations. All penalties must be non-negative and the penalised system
/// must be positive definite.
pub fn solve_penalized_least_squares(
    design: &DesignMatrix,
    targets: &[f64],
    penalties: &[f64],
) -> Result<Vec<f64>> {
    let p = design.cols();
    if targets.len() != design.rows() {
        return Err(MathError::InvalidInput(format!(
            "Target vector has {} entries, design matrix has {} rows",
            targets.len(),
            design.rows()
        )));
    }
    if penalties.len() != p {
        return Err(MathError::InvalidInput(format!(
            "Expected {} penalties, got {}",
            p,
            penalties.len()
        )));
    }
    if penalties.iter().any(|&l| l < 0.0 || !l.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    // Normal equations
    let mut gram = vec![0.0; p * p];
    let mut rhs = vec![0.0; p];
    for i in 0..design.rows() {
        let row = design.row(i);
        for a in 0..p {
            rhs[a] += row[a] * targets[i];
            for b in a..p {
                gram[a * p + b] += row[a] * row[b];
            }
        }
    }
    for a in 0..p {
        gram[a * p + a] += penalties[a];
        for b in 0..a {
            gram[a * p + b] = gram[b * p + a];
        }
    }

    let lower = cholesky(&gram, p)?;

    // Forward substitution: L z = rhs
    let mut z = vec![0.0; p];
    for i in 0..p {
        let mut sum = rhs[i];
        for k in 0..i {
            sum -= lower[i * p + k] * z[k];
        }
        z[i] = sum / lower[i * p + i];
    }

    // Back substitution: Lᵀ β = z
    let mut beta = vec![0.0; p];
    for i in (0..p).rev() {
        let mut sum = z[i];
        for k in (i + 1)..p {
            sum -= lower[k * p + i] * beta[k];
        }
        beta[i] = sum / lower[i * p + i];
    }

    Ok(beta)
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix
fn cholesky(matrix: &[f64], n: usize) -> Result<Vec<f64>> {
    let mut lower = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[i * n + j];
            for k in 0..j {
                sum -= lower[i * n + k] * lower[j * n + k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(MathError::CalculationError(format!(
                        "Normal equations are not positive definite (pivot {} = {})",
                        i, sum
                    )));
                }
                lower[i * n + i] = sum.sqrt();
            } else {
                lower[i * n + j] = sum / lower[j * n + j];
            }
        }
    }
    Ok(lower)
}
