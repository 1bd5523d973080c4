//! Finite field arithmetic backed by exponent/logarithm tables.
//!
//! Two families are supported behind the same type: prime fields GF(p) (PDF417
//! works in GF(929)) and binary extension fields GF(2^m) built from a primitive
//! polynomial (the 8-bit and 9-bit fields of the byte-oriented matrix codes).

use crate::error::InternalError;

/// Largest binary extension degree accepted, keeps every element in a `u16`.
pub const MAX_BINARY_BITS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integers modulo a prime.
    Prime,
    /// Polynomials over GF(2) modulo a primitive polynomial.
    Binary,
}

#[derive(Debug, Clone)]
pub struct GaloisField {
    kind: FieldKind,
    size: u32,
    modulus: u32,
    generator: u16,
    /// `exp[i] = α^i`, stored twice over so products never need a modulo.
    exp: Vec<u16>,
    log: Vec<u16>,
}

impl GaloisField {
    /// Builds GF(`modulus`) for a prime modulus, `generator` must be a
    /// primitive element.
    pub fn prime(modulus: u32, generator: u32) -> Result<Self, InternalError> {
        if !(3..=u16::MAX as u32 + 1).contains(&modulus) {
            return Err(InternalError::InvalidField("prime modulus out of range"));
        }
        if generator < 2 || generator >= modulus {
            return Err(InternalError::InvalidField("generator outside the field"));
        }
        Self::build(FieldKind::Prime, modulus, modulus, generator as u16, |x| (x * generator) % modulus)
    }

    /// Builds GF(2^`bits`) reduced by `polynomial`, whose degree must be `bits`.
    /// The generator is `x` (the element `2`).
    pub fn binary(bits: u32, polynomial: u32) -> Result<Self, InternalError> {
        if !(2..=MAX_BINARY_BITS).contains(&bits) {
            return Err(InternalError::InvalidField("binary field degree out of range"));
        }
        if polynomial >> bits != 1 {
            return Err(InternalError::InvalidField("polynomial degree does not match the field"));
        }
        let size = 1u32 << bits;
        Self::build(FieldKind::Binary, size, polynomial, 2, |x| {
            let x = x << 1;
            if x & size != 0 { x ^ polynomial } else { x }
        })
    }

    fn build(
        kind: FieldKind,
        size: u32,
        modulus: u32,
        generator: u16,
        next: impl Fn(u32) -> u32,
    ) -> Result<Self, InternalError> {
        let order = (size - 1) as usize;
        let mut exp = vec![0u16; order * 2];
        let mut log = vec![0u16; size as usize];
        let mut seen = vec![false; size as usize];

        let mut x = 1u32;
        for i in 0..order {
            if seen[x as usize] {
                return Err(InternalError::InvalidField("generator is not primitive"));
            }
            seen[x as usize] = true;
            exp[i] = x as u16;
            log[x as usize] = i as u16;
            x = next(x);
        }
        if x != 1 {
            return Err(InternalError::InvalidField("generator is not primitive"));
        }

        let (low, high) = exp.split_at_mut(order);
        high.copy_from_slice(low);

        Ok(Self { kind, size, modulus, generator, exp, log })
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Number of elements in the field.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Prime modulus or primitive polynomial the field was built from.
    #[inline]
    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    /// Primitive element α.
    #[inline]
    pub fn generator(&self) -> u16 {
        self.generator
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        (value as u32) < self.size
    }

    #[inline]
    pub fn add(&self, a: u16, b: u16) -> u16 {
        match self.kind {
            FieldKind::Prime => ((a as u32 + b as u32) % self.size) as u16,
            FieldKind::Binary => a ^ b,
        }
    }

    #[inline]
    pub fn neg(&self, a: u16) -> u16 {
        match self.kind {
            FieldKind::Prime if a != 0 => (self.size - a as u32) as u16,
            _ => a,
        }
    }

    #[inline]
    pub fn sub(&self, a: u16, b: u16) -> u16 {
        self.add(a, self.neg(b))
    }

    #[inline]
    pub fn mul(&self, a: u16, b: u16) -> u16 {
        if a == 0 || b == 0 {
            0
        } else {
            self.exp[self.log[a as usize] as usize + self.log[b as usize] as usize]
        }
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inv(&self, a: u16) -> Option<u16> {
        if a == 0 {
            None
        } else {
            let order = self.size as usize - 1;
            Some(self.exp[(order - self.log[a as usize] as usize) % order])
        }
    }

    /// `a / b`, `None` when dividing by zero.
    pub fn div(&self, a: u16, b: u16) -> Option<u16> {
        self.inv(b).map(|inv| self.mul(a, inv))
    }

    /// `α^power`.
    #[inline]
    pub fn exp(&self, power: u32) -> u16 {
        self.exp[(power % (self.size - 1)) as usize]
    }

    /// Discrete logarithm of a non-zero element.
    pub fn log(&self, a: u16) -> Option<u32> {
        if a == 0 { None } else { Some(self.log[a as usize] as u32) }
    }

    /// Evaluates `poly` (highest degree first) at `x` with Horner's rule.
    pub fn eval(&self, poly: &[u16], x: u16) -> u16 {
        poly.iter().fold(0, |acc, &c| self.add(self.mul(acc, x), c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_field_929() {
        let gf = GaloisField::prime(929, 3).unwrap();
        assert_eq!(gf.size(), 929);
        assert_eq!(gf.exp(1), 3);
        assert_eq!(gf.exp(2), 9);
        assert_eq!(gf.exp(928), 1);
        assert_eq!(gf.mul(500, 2), 71);
        assert_eq!(gf.add(900, 100), 71);
        assert_eq!(gf.sub(5, 10), 924);
        assert_eq!(gf.neg(0), 0);
        for a in 1..929u16 {
            assert_eq!(gf.mul(a, gf.inv(a).unwrap()), 1);
        }
    }

    #[test]
    fn test_binary_fields() {
        // QR code field, x^8 + x^4 + x^3 + x^2 + 1
        let gf256 = GaloisField::binary(8, 0x11D).unwrap();
        assert_eq!(gf256.exp(8), 0x1D);
        assert_eq!(gf256.mul(0x80, 2), 0x1D);
        assert_eq!(gf256.add(0x53, 0xCA), 0x99);
        assert_eq!(gf256.div(gf256.mul(7, 93), 93), Some(7));

        // 9-bit field, x^9 + x^4 + 1
        let gf512 = GaloisField::binary(9, 0x211).unwrap();
        assert_eq!(gf512.size(), 512);
        for a in 1..512u16 {
            assert_eq!(gf512.mul(a, gf512.inv(a).unwrap()), 1);
        }
    }

    #[test]
    fn test_rejects_bad_parameters() {
        // 2 has order 3 modulo 7
        assert!(GaloisField::prime(7, 2).is_err());
        // not prime
        assert!(GaloisField::prime(9, 2).is_err());
        // x^8 + 1 is reducible
        assert!(GaloisField::binary(8, 0x101).is_err());
        assert!(GaloisField::binary(8, 0x3D).is_err());
        assert!(GaloisField::binary(13, 0x201B).is_err());
    }

    #[test]
    fn test_division_by_zero() {
        let gf = GaloisField::prime(929, 3).unwrap();
        assert_eq!(gf.div(5, 0), None);
        assert_eq!(gf.inv(0), None);
        assert_eq!(gf.log(0), None);
    }

    #[test]
    fn test_eval_horner() {
        let gf = GaloisField::prime(929, 3).unwrap();
        // x^2 + 2x + 3 at x = 10
        assert_eq!(gf.eval(&[1, 2, 3], 10), 123);
    }
}
