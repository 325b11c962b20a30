use crate::gf256;
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::Zeroizing;

/// One Shamir share: a 1-based evaluation index and one byte per secret
/// byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub index: u8,
    pub data: Vec<u8>,
}

/// Error thrown by the Shamir split/combine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShamirError {
    #[error("threshold must satisfy 0 < k <= n, got k={k}, n={n}")]
    BadThreshold { k: u8, n: u8 },
    #[error("at least one share is required")]
    NoShares,
    #[error("share indices must be distinct and nonzero")]
    BadIndices,
    #[error("shares must all have the same length")]
    LengthMismatch,
}

/// Splits `secret` byte-wise into `n` shares with reconstruction
/// threshold `k`.
///
/// For every secret byte an independent random polynomial of degree
/// `k - 1` is drawn with the secret byte as its constant term; share `i`
/// carries the polynomial evaluated at `x = i` (1-based).
pub fn split(secret: &[u8], n: u8, k: u8) -> Result<Vec<Share>, ShamirError> {
    if k == 0 || k > n {
        return Err(ShamirError::BadThreshold { k, n });
    }

    let mut shares: Vec<Share> =
        (1..=n).map(|index| Share { index, data: Vec::with_capacity(secret.len()) }).collect();

    let mut coefficients = Zeroizing::new(vec![0u8; k as usize]);
    for &secret_byte in secret {
        coefficients[0] = secret_byte;
        OsRng.fill_bytes(&mut coefficients[1..]);

        for share in shares.iter_mut() {
            share.data.push(eval(&coefficients, share.index));
        }
    }
    Ok(shares)
}

// Horner evaluation of the polynomial at x.
fn eval(coefficients: &[u8], x: u8) -> u8 {
    let mut value = 0u8;
    for &coefficient in coefficients.iter().rev() {
        value = gf256::add(gf256::mul(value, x), coefficient);
    }
    value
}

/// Reconstructs the secret from any `k` (or more) distinct shares via
/// Lagrange interpolation at zero. Fewer than `k` shares reconstruct
/// garbage, which is indistinguishable from success here; the caller
/// enforces the threshold.
pub fn combine(shares: &[Share]) -> Result<Zeroizing<Vec<u8>>, ShamirError> {
    let first = shares.first().ok_or(ShamirError::NoShares)?;
    if shares.iter().any(|s| s.data.len() != first.data.len()) {
        return Err(ShamirError::LengthMismatch);
    }
    for (i, share) in shares.iter().enumerate() {
        if share.index == 0 || shares[..i].iter().any(|other| other.index == share.index) {
            return Err(ShamirError::BadIndices);
        }
    }

    let mut secret = Zeroizing::new(vec![0u8; first.data.len()]);
    for (position, byte) in secret.iter_mut().enumerate() {
        let mut value = 0u8;
        for share in shares {
            let mut basis = 1u8;
            for other in shares {
                if other.index != share.index {
                    basis = gf256::mul(
                        basis,
                        gf256::div(other.index, gf256::add(other.index, share.index)),
                    );
                }
            }
            value = gf256::add(value, gf256::mul(share.data[position], basis));
        }
        *byte = value;
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_two_of_four_recover() {
        let shares = split(b"abc", 4, 2).unwrap();
        assert_eq!(shares.len(), 4);
        assert_eq!(shares.iter().map(|s| s.index).collect::<Vec<_>>(), [1, 2, 3, 4]);

        for i in 0..4 {
            for j in 0..4 {
                if i == j {
                    continue;
                }
                let subset = [shares[i].clone(), shares[j].clone()];
                assert_eq!(combine(&subset).unwrap().as_slice(), b"abc");
            }
        }
    }

    #[test]
    fn all_shares_also_recover() {
        let secret: Vec<u8> = (0..=255u8).collect();
        let shares = split(&secret, 6, 4).unwrap();
        assert_eq!(combine(&shares).unwrap().as_slice(), &secret[..]);
    }

    #[test]
    fn below_threshold_does_not_recover() {
        let shares = split(b"abc", 4, 2).unwrap();
        let one = [shares[0].clone()];
        // a single share of a k=2 split interpolates to itself, not the
        // secret, except with probability 2^-24 for this length
        assert_ne!(combine(&one).unwrap().as_slice(), b"abc");
    }

    #[test]
    fn empty_secret_round_trips() {
        let shares = split(b"", 3, 2).unwrap();
        assert_eq!(combine(&shares[..2]).unwrap().len(), 0);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(matches!(split(b"s", 2, 3), Err(ShamirError::BadThreshold { .. })));
        assert!(matches!(split(b"s", 2, 0), Err(ShamirError::BadThreshold { .. })));
        assert!(matches!(combine(&[]), Err(ShamirError::NoShares)));

        let duplicate = [
            Share { index: 1, data: vec![1] },
            Share { index: 1, data: vec![2] },
        ];
        assert!(matches!(combine(&duplicate), Err(ShamirError::BadIndices)));

        let ragged = [
            Share { index: 1, data: vec![1] },
            Share { index: 2, data: vec![2, 3] },
        ];
        assert!(matches!(combine(&ragged), Err(ShamirError::LengthMismatch)));
    }
}
