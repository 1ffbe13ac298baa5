//! Small fixed-size linear algebra for 3-channel color statistics.

use image::Rgb;

/// Sweeps are cheap for a 3x3 matrix; convergence normally takes 4-6.
const MAX_JACOBI_SWEEPS: usize = 32;
/// Off-diagonal energy, relative to the diagonal, below which we stop.
const JACOBI_EPS: f64 = 1e-30;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    /// Channel values scaled from `0..=255` into `[0, 1]`.
    pub fn from_rgb(p: &Rgb<u8>) -> Self {
        Self {
            x: p[0] as f64 / 255.0,
            y: p[1] as f64 / 255.0,
            z: p[2] as f64 / 255.0,
        }
    }

    pub fn to_arr(self) -> [f64; 3] { [self.x, self.y, self.z] }
    pub fn add(self, o: Self) -> Self { Self { x: self.x + o.x, y: self.y + o.y, z: self.z + o.z } }
    pub fn sub(self, o: Self) -> Self { Self { x: self.x - o.x, y: self.y - o.y, z: self.z - o.z } }
    pub fn scale(self, s: f64) -> Self { Self { x: self.x * s, y: self.y * s, z: self.z * s } }
    pub fn dot(self, o: Self) -> f64 { self.x * o.x + self.y * o.y + self.z * o.z }
    pub fn norm(self) -> f64 { self.dot(self).sqrt() }
}

/// Row-major 3x3 matrix. Covariances built here are symmetric.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat3 {
    pub m: [[f64; 3]; 3],
}

impl Mat3 {
    pub fn zero() -> Self { Self::default() }

    pub fn identity() -> Self {
        Self { m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] }
    }

    /// `v * v^T`
    pub fn outer(v: Vec3) -> Self {
        let a = v.to_arr();
        let mut m = [[0.0; 3]; 3];
        for (r, row) in m.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = a[r] * a[c];
            }
        }
        Self { m }
    }

    pub fn add(self, o: Self) -> Self { self.zip(o, |a, b| a + b) }
    pub fn sub(self, o: Self) -> Self { self.zip(o, |a, b| a - b) }

    pub fn scale(self, s: f64) -> Self {
        let mut m = self.m;
        m.iter_mut().flatten().for_each(|v| *v *= s);
        Self { m }
    }

    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let row = |r: usize| Vec3::new(self.m[r][0], self.m[r][1], self.m[r][2]).dot(v);
        Vec3::new(row(0), row(1), row(2))
    }

    fn zip(self, o: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut m = [[0.0; 3]; 3];
        for r in 0..3 {
            for c in 0..3 {
                m[r][c] = f(self.m[r][c], o.m[r][c]);
            }
        }
        Self { m }
    }

    fn off_diagonal_sq(&self) -> f64 {
        self.m[0][1] * self.m[0][1] + self.m[0][2] * self.m[0][2] + self.m[1][2] * self.m[1][2]
    }

    /// Cyclic Jacobi eigen decomposition. Only meaningful for symmetric input.
    pub fn symmetric_eigen(&self) -> SymmetricEigen {
        let mut a = self.m;
        let mut v = Mat3::identity().m;

        for _ in 0..MAX_JACOBI_SWEEPS {
            let diag = a[0][0] * a[0][0] + a[1][1] * a[1][1] + a[2][2] * a[2][2];
            if (Mat3 { m: a }).off_diagonal_sq() <= JACOBI_EPS * diag {
                break;
            }
            for (p, q) in [(0usize, 1usize), (0, 2), (1, 2)] {
                let apq = a[p][q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..3 {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..3 {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }

        let column = |i: usize| Vec3::new(v[0][i], v[1][i], v[2][i]);
        SymmetricEigen {
            values: [a[0][0], a[1][1], a[2][2]],
            vectors: [column(0), column(1), column(2)],
        }
    }
}

/// Eigenpairs of a symmetric 3x3 matrix. `vectors[i]` is unit length and
/// belongs to `values[i]`; no particular order is guaranteed.
#[derive(Clone, Copy, Debug)]
pub struct SymmetricEigen {
    pub values: [f64; 3],
    pub vectors: [Vec3; 3],
}

impl SymmetricEigen {
    /// Largest eigenvalue with its eigenvector. The lowest index wins ties.
    pub fn principal(&self) -> (f64, Vec3) {
        let mut best = 0;
        for i in 1..3 {
            if self.values[i] > self.values[best] {
                best = i;
            }
        }
        (self.values[best], self.vectors[best])
    }

    pub fn max_value(&self) -> f64 { self.principal().0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn zero_matrix_has_zero_eigenvalues_and_unit_axes() {
        let eig = Mat3::zero().symmetric_eigen();
        assert_eq!(eig.values, [0.0, 0.0, 0.0]);
        let (value, axis) = eig.principal();
        assert_eq!(value, 0.0);
        assert_eq!(axis, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn diagonal_matrix_picks_largest_entry() {
        let m = Mat3 { m: [[0.5, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 1.0]] };
        let (value, axis) = m.symmetric_eigen().principal();
        assert!(approx(value, 3.0));
        assert!(approx(axis.y.abs(), 1.0));
    }

    #[test]
    fn gray_axis_dominates_correlated_channels() {
        // Outer product of (1,1,1): rank one, eigenvalue 3 along the gray diagonal.
        let m = Mat3::outer(Vec3::new(1.0, 1.0, 1.0));
        let (value, axis) = m.symmetric_eigen().principal();
        assert!(approx(value, 3.0));
        let inv = 1.0 / 3f64.sqrt();
        assert!(approx(axis.x.abs(), inv));
        assert!(approx(axis.y.abs(), inv));
        assert!(approx(axis.z.abs(), inv));
    }

    #[test]
    fn eigenpairs_satisfy_definition() {
        let m = Mat3 { m: [[4.0, 1.0, 0.5], [1.0, 3.0, 0.25], [0.5, 0.25, 2.0]] };
        let eig = m.symmetric_eigen();
        for i in 0..3 {
            let v = eig.vectors[i];
            let mv = m.mul_vec(v);
            let lv = v.scale(eig.values[i]);
            assert!(mv.sub(lv).norm() < 1e-9, "pair {i} off by {:?}", mv.sub(lv));
            assert!(approx(v.norm(), 1.0));
        }
        let trace: f64 = eig.values.iter().sum();
        assert!(approx(trace, 9.0));
    }
}
