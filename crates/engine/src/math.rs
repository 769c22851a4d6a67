use std::fmt;

/// Decimal places used for every emitted vegetation value.
pub const VEGETATION_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum ScaleError {
    NonFinite(f64),
    ScaleTooLarge(u32),
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite(v) => write!(f, "cannot scale non-finite value {v}"),
            Self::ScaleTooLarge(s) => write!(f, "scale {s} exceeds supported precision"),
        }
    }
}

impl std::error::Error for ScaleError {}

const MAX_SCALE: u32 = 18;

/// Rounds `input` to `places` decimals, half-up (away from zero on ties).
///
/// Rounding works on the shortest decimal representation of the value rather
/// than on its binary expansion, so `0.125` becomes `0.13` and `2.675`
/// becomes `2.68`.
pub fn scale(input: f64, places: u32) -> Result<f64, ScaleError> {
    if !input.is_finite() {
        return Err(ScaleError::NonFinite(input));
    }
    if places > MAX_SCALE {
        return Err(ScaleError::ScaleTooLarge(places));
    }

    let repr = format!("{}", input.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= places as usize {
        return Ok(input);
    }

    let kept = &frac_part[..places as usize];
    let round_up = frac_part.as_bytes()[places as usize] >= b'5';

    // Values with a fractional part are below 2^53, so the digits fit easily.
    let mut mantissa: u128 = 0;
    for b in int_part.bytes().chain(kept.bytes()) {
        mantissa = mantissa * 10 + u128::from(b - b'0');
    }
    if round_up {
        mantissa += 1;
    }

    let magnitude = mantissa as f64 / 10f64.powi(places as i32);
    Ok(if input.is_sign_negative() { -magnitude } else { magnitude })
}

/// Arithmetic mean of `values`, scaled to `places`. Empty input averages to 0.
pub fn scaled_mean<I>(values: I, places: u32) -> Result<f64, ScaleError>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return Ok(0.0);
    }
    scale(sum / count as f64, places)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(scale(0.125, 2).unwrap(), 0.13);
        assert_eq!(scale(0.124, 2).unwrap(), 0.12);
        assert_eq!(scale(2.675, 2).unwrap(), 2.68);
        assert_eq!(scale(-0.125, 2).unwrap(), -0.13);
    }

    #[test]
    fn short_values_untouched() {
        assert_eq!(scale(0.5, 2).unwrap(), 0.5);
        assert_eq!(scale(42.0, 2).unwrap(), 42.0);
        assert_eq!(scale(0.0, 2).unwrap(), 0.0);
    }

    #[test]
    fn float_noise_is_removed() {
        let avg = (0.32 + 0.34) / 2.0;
        assert_eq!(scale(avg, 2).unwrap(), 0.33);
        assert_eq!(scale(1.63 / 3.0, 2).unwrap(), 0.54);
    }

    #[test]
    fn carry_into_integer_part() {
        assert_eq!(scale(0.999, 2).unwrap(), 1.0);
        assert_eq!(scale(9.995, 2).unwrap(), 10.0);
    }

    #[test]
    fn non_finite_rejected() {
        assert!(matches!(scale(f64::NAN, 2), Err(ScaleError::NonFinite(_))));
        assert!(matches!(scale(f64::INFINITY, 2), Err(ScaleError::NonFinite(_))));
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(scaled_mean([0.32, 0.34], 2).unwrap(), 0.33);
        assert_eq!(scaled_mean([0.71], 2).unwrap(), 0.71);
        assert_eq!(scaled_mean(std::iter::empty(), 2).unwrap(), 0.0);
    }
}
