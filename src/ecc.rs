//! Systematic Reed-Solomon encoding over any [GaloisField].

use std::sync::OnceLock;

use crate::error::InternalError;
use crate::gf::GaloisField;

/// Highest PDF417 error correction level.
pub const MAX_LEVEL: u8 = 8;

/// Number of error correction codewords a PDF417 symbol carries at `level`.
pub const fn ecc_count(level: u8) -> usize {
    assert!(level <= MAX_LEVEL, "ECC level must be between 0 and 8 inclusive");
    1 << (level as usize + 1)
}

#[derive(Debug, Clone)]
pub struct ReedSolomon<'f> {
    field: &'f GaloisField,
    /// Monic generator polynomial, lowest degree first.
    generator: Vec<u16>,
    first_root: u32,
}

impl<'f> ReedSolomon<'f> {
    /// Coder producing `ec_count` codewords with the generator
    /// `(x - α^b)(x - α^(b+1))...(x - α^(b+ec_count-1))`, `b = first_root`.
    pub fn new(field: &'f GaloisField, ec_count: usize, first_root: u32) -> Self {
        let mut generator = vec![1u16];
        for i in 0..ec_count as u32 {
            let root = field.exp(first_root + i);
            let mut next = vec![0u16; generator.len() + 1];
            for (j, &c) in generator.iter().enumerate() {
                next[j] = field.sub(next[j], field.mul(c, root));
                next[j + 1] = field.add(next[j + 1], c);
            }
            generator = next;
        }

        Self { field, generator, first_root }
    }

    #[inline]
    pub fn field(&self) -> &'f GaloisField {
        self.field
    }

    #[inline]
    pub fn ec_count(&self) -> usize {
        self.generator.len() - 1
    }

    /// Generator coefficients, lowest degree first, including the leading 1.
    pub fn generator(&self) -> &[u16] {
        &self.generator
    }

    /// Roots of the generator polynomial.
    pub fn roots(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.ec_count() as u32).map(move |i| self.field.exp(self.first_root + i))
    }

    /// Computes the error correction codewords for `data`: the negated
    /// remainder of `data(x)·x^k` divided by the generator, highest degree
    /// first, so that `data ++ ecc` is a multiple of the generator.
    pub fn encode(&self, data: &[u16]) -> Result<Vec<u16>, InternalError> {
        let gf = self.field;
        let k = self.ec_count();
        let g = &self.generator;
        let mut rem = vec![0u16; k];
        if k == 0 {
            return Ok(rem);
        }

        for &cw in data {
            if !gf.contains(cw) {
                return Err(InternalError::CodewordOutOfRange { value: cw as u32, size: gf.size() });
            }
            let t = gf.add(cw, rem[0]);
            for j in 0..k - 1 {
                rem[j] = gf.sub(rem[j + 1], gf.mul(t, g[k - 1 - j]));
            }
            rem[k - 1] = gf.neg(gf.mul(t, g[0]));
        }

        for e in rem.iter_mut() {
            *e = gf.neg(*e);
        }
        Ok(rem)
    }

    /// Returns whether `codewords` (data followed by error correction)
    /// vanishes at every generator root.
    pub fn verify(&self, codewords: &[u16]) -> bool {
        self.roots().all(|root| self.field.eval(codewords, root) == 0)
    }
}

static PDF417_FIELD: OnceLock<Result<GaloisField, InternalError>> = OnceLock::new();
static PDF417_CODERS: OnceLock<Result<Vec<ReedSolomon<'static>>, InternalError>> = OnceLock::new();

/// GF(929) with primitive element 3.
pub fn pdf417_field() -> Result<&'static GaloisField, InternalError> {
    PDF417_FIELD
        .get_or_init(|| GaloisField::prime(929, 3))
        .as_ref()
        .map_err(Clone::clone)
}

/// Coder for a PDF417 error correction level, generator roots `3^1..=3^k`.
pub fn pdf417_coder(level: u8) -> Result<&'static ReedSolomon<'static>, InternalError> {
    let coders = PDF417_CODERS
        .get_or_init(|| {
            let field = pdf417_field()?;
            Ok((0..=MAX_LEVEL).map(|level| ReedSolomon::new(field, ecc_count(level), 1)).collect())
        })
        .as_ref()
        .map_err(Clone::clone)?;

    coders
        .get(level as usize)
        .ok_or(InternalError::InvalidField("error correction level has no generator"))
}

/// Appends the PDF417 error correction codewords for `level` to `codewords`.
pub fn generate_ecc(codewords: &mut Vec<u16>, level: u8) -> Result<(), InternalError> {
    let ecc = pdf417_coder(level)?.encode(codewords)?;
    codewords.extend_from_slice(&ecc);
    Ok(())
}
