/// Population mean and standard deviation of the defined values.
/// Returns `None` when nothing is defined.
pub fn mean_std(v: &[Option<f64>]) -> Option<(f64, f64)> {
    let defined: Vec<f64> = v.iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    let n = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / n;
    let variance = defined.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    Some((mean, variance.sqrt()))
}

/// Standardized scores of one view
pub struct ZScores {
    pub mean: f64,
    pub std_dev: f64,
    pub scores: Vec<f64>,
}

impl ZScores {
    /// `(x - mean) / std_dev` over the defined values, with undefined
    /// entries set to 0. A view without spread is all zeros.
    pub fn new(values: &[Option<f64>]) -> Self {
        let (mean, std_dev) = match mean_std(values) {
            Some(ms) => ms,
            None => {
                warn!("z_score cannot be computed, no defined values");
                return Self::zeros(values.len(), f64::NAN, f64::NAN);
            }
        };
        if std_dev == 0.0 || !std_dev.is_finite() {
            warn!("z_score cannot be computed, standard deviation is {}", std_dev);
            return Self::zeros(values.len(), mean, std_dev);
        }
        let scores = values
            .iter()
            .map(|v| match v {
                Some(x) => (x - mean) / std_dev,
                None => 0.0,
            })
            .collect();
        ZScores {
            mean,
            std_dev,
            scores,
        }
    }

    fn zeros(n: usize, mean: f64, std_dev: f64) -> Self {
        ZScores {
            mean,
            std_dev,
            scores: vec![0.0; n],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    fn population_not_sample() {
        let (mean, sd) = mean_std(&[Some(2.0), Some(4.0), None, Some(4.0), Some(4.0), Some(5.0), Some(5.0), Some(7.0), Some(9.0)]).unwrap();
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((sd - 2.0).abs() < 1e-12);
    }

    #[rstest]
    fn standardized_view() {
        let z = ZScores::new(&[Some(1.0), Some(3.0), None, Some(8.0), Some(-2.0)]);
        assert_eq!(z.scores[2], 0.0);
        let defined: Vec<f64> = vec![z.scores[0], z.scores[1], z.scores[3], z.scores[4]];
        let n = defined.len() as f64;
        let mean = defined.iter().sum::<f64>() / n;
        let var = defined.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-12);
        assert!((var.sqrt() - 1.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(vec![Some(3.0), Some(3.0), None])]
    #[case(vec![None, None])]
    #[case(vec![])]
    fn degenerate_views_are_zero(#[case] values: Vec<Option<f64>>) {
        let z = ZScores::new(&values);
        assert_eq!(z.scores.len(), values.len());
        assert!(z.scores.iter().all(|s| *s == 0.0));
    }
}
