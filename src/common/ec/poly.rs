use super::galois::{gexp, glog};
use crate::common::error::QRResult;

// Polynomial over GF(2^8)
//------------------------------------------------------------------------------

// Coefficients are stored highest degree first and never carry leading zeros. An all
// zero input collapses to the empty polynomial.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct Poly(Vec<u8>);

impl Poly {
    // Strips leading zeros and multiplies by x^shift
    pub fn new(coeffs: &[u8], shift: usize) -> Self {
        let start = coeffs.iter().position(|&c| c != 0).unwrap_or(coeffs.len());
        let mut res = Vec::with_capacity(coeffs.len() - start + shift);
        res.extend_from_slice(&coeffs[start..]);
        res.resize(res.len() + shift, 0);
        Self(res)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn coeffs(&self) -> &[u8] {
        &self.0
    }

    pub fn multiply(&self, other: &Poly) -> QRResult<Poly> {
        if self.0.is_empty() || other.0.is_empty() {
            return Ok(Poly(Vec::new()));
        }

        let mut res = vec![0u8; self.len() + other.len() - 1];
        for (i, &a) in self.0.iter().enumerate() {
            if a == 0 {
                continue;
            }
            let log_a = glog(a)?;
            for (j, &b) in other.0.iter().enumerate() {
                if b == 0 {
                    continue;
                }
                res[i + j] ^= gexp(log_a + glog(b)?);
            }
        }
        Ok(Poly::new(&res, 0))
    }

    // Long division remainder
    pub fn rem(&self, divisor: &Poly) -> QRResult<Poly> {
        let mut rem = self.clone();
        while !divisor.0.is_empty() && rem.len() >= divisor.len() {
            let ratio = glog(rem.0[0])? - glog(divisor.0[0])?;
            for (r, &d) in rem.0.iter_mut().zip(divisor.0.iter()) {
                if d != 0 {
                    *r ^= gexp(glog(d)? + ratio);
                }
            }
            rem = Poly::new(&rem.0, 0);
        }
        Ok(rem)
    }
}

// Product of (x - 2^i) for i in [0, ec_len)
pub(crate) fn generator_poly(ec_len: usize) -> QRResult<Poly> {
    (0..ec_len as i32)
        .try_fold(Poly::new(&[1], 0), |acc, i| acc.multiply(&Poly::new(&[1, gexp(i)], 0)))
}
