//! Correlation-matrix algebra.
//!
//! A target rank-correlation matrix supplied by a caller need not be
//! positive semi-definite. [`CorrelationMatrix::nearest_psd`] projects it
//! onto the PSD cone by eigenvalue clipping (Jacobi eigendecomposition,
//! negative eigenvalues floored, diagonal renormalised back to one) and
//! reports the Frobenius norm of the adjustment so callers can surface fit
//! quality. The Cholesky factor of the repaired matrix drives the Gaussian
//! copula:
//!
//! ```text
//! W = L * Z,   C = L * L^T
//! ```

/// Eigenvalue floor applied during PSD repair; keeps the repaired matrix
/// strictly positive definite so the Cholesky factorisation succeeds.
const EIGEN_FLOOR: f64 = 1e-10;

/// Convergence threshold for the Jacobi off-diagonal norm.
const JACOBI_TOL: f64 = 1e-12;

/// Maximum Jacobi sweeps; correlation blocks are small so this is generous.
const JACOBI_MAX_SWEEPS: usize = 100;

/// Symmetric correlation matrix in row-major storage.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    data: Vec<f64>,
    dim: usize,
}

impl CorrelationMatrix {
    /// Wraps row-major data of dimension `dim`.
    ///
    /// Shape and symmetry are the caller's contract (configuration
    /// validation enforces both); only the element count is checked here.
    pub fn from_row_major(data: Vec<f64>, dim: usize) -> Self {
        assert_eq!(data.len(), dim * dim, "matrix data must be dim x dim");
        Self { data, dim }
    }

    /// Identity correlation matrix.
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        Self { data, dim }
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Element accessor.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// Frobenius norm of the element-wise difference.
    pub fn frobenius_distance(&self, other: &Self) -> f64 {
        debug_assert_eq!(self.dim, other.dim);
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Projects onto the nearest positive semi-definite correlation matrix.
    ///
    /// Eigenvalues below [`EIGEN_FLOOR`] are clipped, the matrix is
    /// reconstructed, and the diagonal is renormalised to one. Returns the
    /// repaired matrix and the Frobenius norm of the adjustment (zero when
    /// the input was already PSD).
    pub fn nearest_psd(&self) -> (Self, f64) {
        let n = self.dim;
        let (eigvals, eigvecs) = jacobi_eigen(&self.data, n);

        if eigvals.iter().all(|&l| l >= EIGEN_FLOOR) {
            return (self.clone(), 0.0);
        }

        // B = V * clip(Lambda) * V^T
        let clipped: Vec<f64> = eigvals.iter().map(|&l| l.max(EIGEN_FLOOR)).collect();
        let mut b = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += eigvecs[i * n + k] * clipped[k] * eigvecs[j * n + k];
                }
                b[i * n + j] = sum;
            }
        }

        // Renormalise back to unit diagonal; preserves positive definiteness.
        let scale: Vec<f64> = (0..n).map(|i| b[i * n + i].sqrt()).collect();
        let mut repaired = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                repaired[i * n + j] = (b[i * n + j] / (scale[i] * scale[j])).clamp(-1.0, 1.0);
            }
            repaired[i * n + i] = 1.0;
        }

        let repaired = Self {
            data: repaired,
            dim: n,
        };
        let distance = self.frobenius_distance(&repaired);
        (repaired, distance)
    }

    /// Lower-triangular Cholesky factor, row-major.
    ///
    /// Returns `None` if the matrix is not positive definite.
    pub fn cholesky(&self) -> Option<Vec<f64>> {
        let n = self.dim;
        let mut l = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let mut sum = self.get(i, j);
                for k in 0..j {
                    sum -= l[i * n + k] * l[j * n + k];
                }
                if i == j {
                    if sum <= 0.0 {
                        return None;
                    }
                    l[i * n + j] = sum.sqrt();
                } else {
                    l[i * n + j] = sum / l[j * n + j];
                }
            }
        }
        Some(l)
    }

    /// Cholesky factor with escalating diagonal jitter.
    ///
    /// Repaired matrices sit on the PSD boundary when eigenvalues were
    /// clipped; a ridge of at most 1e-6 on the diagonal restores strict
    /// positive definiteness without visibly distorting the correlation.
    pub fn robust_cholesky(&self) -> Vec<f64> {
        if let Some(l) = self.cholesky() {
            return l;
        }
        let mut jitter = 1e-10;
        while jitter <= 1e-6 {
            let mut bumped = self.clone();
            for i in 0..self.dim {
                bumped.data[i * self.dim + i] += jitter;
            }
            if let Some(l) = bumped.cholesky() {
                return l;
            }
            jitter *= 10.0;
        }
        // Fully degenerate input; fall back to independence.
        let mut l = vec![0.0; self.dim * self.dim];
        for i in 0..self.dim {
            l[i * self.dim + i] = 1.0;
        }
        l
    }
}

/// Cyclic Jacobi eigendecomposition for a symmetric matrix.
///
/// Returns eigenvalues and the eigenvector matrix with eigenvectors stored as
/// columns (`eigvecs[i * n + k]` is component `i` of eigenvector `k`).
fn jacobi_eigen(matrix: &[f64], n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut a = matrix.to_vec();
    let mut v = vec![0.0; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| a[i * n + j] * a[i * n + j])
            .sum();
        if off.sqrt() < JACOBI_TOL {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() < JACOBI_TOL {
                    continue;
                }
                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let theta = (aqq - app) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k * n + p];
                    let akq = a[k * n + q];
                    a[k * n + p] = c * akp - s * akq;
                    a[k * n + q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p * n + k];
                    let aqk = a[q * n + k];
                    a[p * n + k] = c * apk - s * aqk;
                    a[q * n + k] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[k * n + p];
                    let vkq = v[k * n + q];
                    v[k * n + p] = c * vkp - s * vkq;
                    v[k * n + q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigvals: Vec<f64> = (0..n).map(|i| a[i * n + i]).collect();
    (eigvals, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cholesky_of_known_matrix() {
        let m = CorrelationMatrix::from_row_major(vec![1.0, 0.5, 0.5, 1.0], 2);
        let l = m.cholesky().expect("positive definite");
        assert_relative_eq!(l[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(l[2], 0.5, epsilon = 1e-12);
        assert_relative_eq!(l[3], 0.75f64.sqrt(), epsilon = 1e-12);
        // L * L^T reproduces the matrix.
        let recon = l[2] * l[0];
        assert_relative_eq!(recon, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn psd_input_needs_no_repair() {
        let m = CorrelationMatrix::from_row_major(vec![1.0, 0.8, 0.8, 1.0], 2);
        let (repaired, distance) = m.nearest_psd();
        assert_eq!(repaired, m);
        assert_eq!(distance, 0.0);
    }

    #[test]
    fn non_psd_input_is_repaired() {
        // rho(x,y) = rho(y,z) = 0.9 with rho(x,z) = -0.9 is infeasible.
        let m = CorrelationMatrix::from_row_major(
            vec![1.0, 0.9, -0.9, 0.9, 1.0, 0.9, -0.9, 0.9, 1.0],
            3,
        );
        let (repaired, distance) = m.nearest_psd();
        assert!(distance > 0.0, "repair must be reported");
        for i in 0..3 {
            assert_relative_eq!(repaired.get(i, i), 1.0, epsilon = 1e-9);
            for j in 0..3 {
                assert_relative_eq!(repaired.get(i, j), repaired.get(j, i), epsilon = 1e-9);
                assert!(repaired.get(i, j).abs() <= 1.0 + 1e-12);
            }
        }
        // The repaired matrix must factor.
        let _ = repaired.robust_cholesky();
    }

    #[test]
    fn jacobi_recovers_known_eigenvalues() {
        // Eigenvalues of [[2, 1], [1, 2]] are 1 and 3.
        let (mut eig, _) = jacobi_eigen(&[2.0, 1.0, 1.0, 2.0], 2);
        eig.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(eig[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(eig[1], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn identity_factorises_to_identity() {
        let m = CorrelationMatrix::identity(4);
        let l = m.robust_cholesky();
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(l[i * 4 + j], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn perfect_correlation_survives_repair_path() {
        let m = CorrelationMatrix::from_row_major(vec![1.0, 1.0, 1.0, 1.0], 2);
        let (repaired, _) = m.nearest_psd();
        let l = repaired.robust_cholesky();
        // First column close to [1, 1]: the two latents move together.
        assert_relative_eq!(l[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(l[2], 1.0, epsilon = 1e-3);
    }
}
