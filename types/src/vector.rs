//! Elementwise arithmetic over fixed-length unit vectors.
//!
//! Every function here is pure. Both operands must have the same length;
//! a mismatch is reported as [`LengthMismatch`] instead of silently
//! truncating to the shorter side the way a bare `zip` would. Sums and
//! differences are exact: leaving the `i64` range is an error, never a clamp.

use thiserror::Error;

/// Integer count of resource units.
///
/// Signed so that a derived Need row can go negative while a caller is
/// mid-edit (Allocation temporarily above Max). Stored Available, Max and
/// Allocation entries are kept non-negative by [`crate::AllocationState`].
pub type Units = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("vector length mismatch: {left} vs {right}")]
pub struct LengthMismatch {
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VectorError {
    #[error(transparent)]
    Length(#[from] LengthMismatch),
    #[error("unit count out of range at position {index}")]
    Overflow { index: usize },
}

fn ensure_same_len(a: &[Units], b: &[Units]) -> Result<(), LengthMismatch> {
    if a.len() == b.len() {
        Ok(())
    } else {
        Err(LengthMismatch {
            left: a.len(),
            right: b.len(),
        })
    }
}

/// `true` iff `a[k] <= b[k]` for every index `k`.
///
/// Two empty vectors compare as `true`.
pub fn less_or_equal(a: &[Units], b: &[Units]) -> Result<bool, LengthMismatch> {
    ensure_same_len(a, b)?;
    Ok(a.iter().zip(b).all(|(x, y)| x <= y))
}

pub fn add(a: &[Units], b: &[Units]) -> Result<Vec<Units>, VectorError> {
    combine(a, b, Units::checked_add)
}

/// Elementwise `a - b`.
///
/// Does not clamp at zero. Callers prove `b <= a` with [`less_or_equal`]
/// before storing the result as an Available or Allocation row.
pub fn subtract(a: &[Units], b: &[Units]) -> Result<Vec<Units>, VectorError> {
    combine(a, b, Units::checked_sub)
}

/// In-place `target += delta`. `target` is unchanged on error.
pub fn add_assign(target: &mut [Units], delta: &[Units]) -> Result<(), VectorError> {
    let sum = add(target, delta)?;
    target.copy_from_slice(&sum);
    Ok(())
}

/// In-place `target -= delta`. Same no-clamp contract as [`subtract`].
pub fn sub_assign(target: &mut [Units], delta: &[Units]) -> Result<(), VectorError> {
    let difference = subtract(target, delta)?;
    target.copy_from_slice(&difference);
    Ok(())
}

fn combine(
    a: &[Units],
    b: &[Units],
    op: fn(Units, Units) -> Option<Units>,
) -> Result<Vec<Units>, VectorError> {
    ensure_same_len(a, b)?;
    a.iter()
        .zip(b)
        .enumerate()
        .map(|(index, (x, y))| op(*x, *y).ok_or(VectorError::Overflow { index }))
        .collect()
}

/// Index of the first negative entry, if any.
#[must_use]
pub fn first_negative(v: &[Units]) -> Option<(usize, Units)> {
    v.iter().copied().enumerate().find(|&(_, value)| value < 0)
}

#[cfg(test)]
mod tests {
    use super::{
        LengthMismatch, Units, VectorError, add, add_assign, first_negative, less_or_equal,
        sub_assign, subtract,
    };

    #[test]
    fn less_or_equal_requires_every_component() {
        assert!(less_or_equal(&[1, 2, 2], &[3, 3, 2]).unwrap());
        assert!(!less_or_equal(&[1, 4, 2], &[3, 3, 2]).unwrap());
        assert!(less_or_equal(&[], &[]).unwrap());
    }

    #[test]
    fn less_or_equal_rejects_length_mismatch() {
        let err = less_or_equal(&[1, 2], &[1, 2, 3]).unwrap_err();
        assert_eq!(err, LengthMismatch { left: 2, right: 3 });
    }

    #[test]
    fn subtract_does_not_clamp() {
        assert_eq!(subtract(&[1, 5], &[3, 2]).unwrap(), vec![-2, 3]);
    }

    #[test]
    fn add_and_subtract_are_elementwise() {
        assert_eq!(add(&[3, 3, 2], &[2, 0, 0]).unwrap(), vec![5, 3, 2]);
        assert_eq!(subtract(&[5, 3, 2], &[2, 0, 0]).unwrap(), vec![3, 3, 2]);
        assert!(add(&[1], &[]).is_err());
    }

    #[test]
    fn in_place_variants_match_pure_ones() {
        let mut v = vec![3, 3, 2];
        add_assign(&mut v, &[1, 0, 2]).unwrap();
        assert_eq!(v, vec![4, 3, 4]);
        sub_assign(&mut v, &[1, 0, 2]).unwrap();
        assert_eq!(v, vec![3, 3, 2]);
        assert!(sub_assign(&mut v, &[1]).is_err());
        assert_eq!(v, vec![3, 3, 2]);
    }

    #[test]
    fn overflow_is_an_error_not_a_clamp() {
        assert_eq!(
            add(&[1, Units::MAX], &[0, 1]).unwrap_err(),
            VectorError::Overflow { index: 1 }
        );
        assert_eq!(
            subtract(&[Units::MIN], &[1]).unwrap_err(),
            VectorError::Overflow { index: 0 }
        );

        let mut v = vec![5, Units::MAX];
        assert!(add_assign(&mut v, &[1, 1]).is_err());
        assert_eq!(v, vec![5, Units::MAX]);
    }

    #[test]
    fn first_negative_reports_position() {
        assert_eq!(first_negative(&[0, 4, -1, -7]), Some((2, -1)));
        assert_eq!(first_negative(&[0, 4]), None);
    }
}
