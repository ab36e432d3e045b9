use ndarray::Array1;

/// Maximum allowed distance between the sum of a distribution and 1.0.
pub(crate) const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

/// Index of the largest value; ties go to the lowest index.
/// Returns `None` for an empty slice or when any value is NaN.
pub(crate) fn argmax(values: &[f32]) -> Option<usize> {
    if values.iter().any(|v| v.is_nan()) {
        return None;
    }
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let logits = Array1::from_iter(logits.iter().copied());
    let max = logits.fold(f32::NEG_INFINITY, |acc, &x| acc.max(x));
    let exp = logits.mapv(|x| (x - max).exp());
    let sum = exp.sum();
    if sum > 0.0 {
        (exp / sum).to_vec()
    } else {
        exp.to_vec()
    }
}

/// Describes why `values` is not a probability distribution, if it isn't.
pub(crate) fn distribution_violation(values: &[f32]) -> Option<String> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Some(format!("non-finite value {} at index {}", values[pos], pos));
    }
    if let Some(pos) = values.iter().position(|&v| !(0.0..=1.0).contains(&v)) {
        return Some(format!("value {} at index {} is outside [0, 1]", values[pos], pos));
    }
    let sum: f32 = values.iter().sum();
    if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
        return Some(format!("values sum to {} instead of 1.0", sum));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.1, 0.4, 0.4, 0.1]), Some(1));
        assert_eq!(argmax(&[0.9]), Some(0));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.2, f32::NAN]), None);
    }

    #[test]
    fn test_softmax_is_stable() {
        let probs = softmax(&[1000.0, 1000.0, 0.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
        assert!(probs[2] < 1e-6);
        assert!(distribution_violation(&probs).is_none());
    }

    #[test]
    fn test_distribution_violation() {
        assert!(distribution_violation(&[0.25, 0.25, 0.5]).is_none());
        assert!(distribution_violation(&[0.2, 0.2]).is_some());
        assert!(distribution_violation(&[1.5, -0.5]).is_some());
        assert!(distribution_violation(&[f32::INFINITY]).is_some());
    }
}
