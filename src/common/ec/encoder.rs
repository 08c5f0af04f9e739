use super::poly::{generator_poly, Poly};
use super::Block;
use crate::common::error::QRResult;

// Error correction codewords
//------------------------------------------------------------------------------

impl Block {
    // Parity is the remainder of data * x^ec_len divided by the generator polynomial,
    // left padded with zeros when the remainder has fewer terms than ec_len
    pub(super) fn compute_ecc(&mut self) -> QRResult<()> {
        let ec_len = self.ec_len();
        let gen = generator_poly(ec_len)?;
        let rem = Poly::new(self.data(), ec_len).rem(&gen)?;
        let rem = rem.coeffs();

        let dlen = self.dlen;
        for (i, e) in self.data[dlen..dlen + ec_len].iter_mut().enumerate() {
            *e = rem.len().checked_sub(ec_len - i).map_or(0, |k| rem[k]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod ecc_tests {
    use super::Block;

    #[test]
    fn test_ecc_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let block = Block::new(msg, 26).unwrap();
        assert_eq!(block.ecc(), b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17");
    }

    #[test]
    fn test_ecc_zero_data() {
        let block = Block::new(&[0; 5], 9).unwrap();
        assert_eq!(block.ecc(), &[0; 4]);
    }

    #[test]
    fn test_ecc_leaves_data_untouched() {
        let msg = b"\x40\x14\x10\xec\x11\xec\x11\xec\x11\xec\x11\xec\x11\xec\x11\xec\x11\xec\x11";
        let block = Block::new(msg, 26).unwrap();
        assert_eq!(block.data(), msg);
        assert_eq!(block.ecc().len(), 7);
    }
}
