use crate::domain::QSource;
use crate::error::AppError;

/// Ascending, strictly positive scattering vector values (Å⁻¹).
#[derive(Debug, Clone, PartialEq)]
pub struct QGrid {
    values: Vec<f64>,
}

impl QGrid {
    /// `n` evenly spaced values from `qmin` to `qmax`, both inclusive.
    pub fn uniform(qmin: f64, qmax: f64, n: usize) -> Result<Self, AppError> {
        if n == 0 {
            return Err(AppError::new(2, "Number of q points must be > 0."));
        }
        if n > 1 && qmax <= qmin {
            return Err(AppError::new(
                2,
                format!("qmax ({qmax}) must be larger than qmin ({qmin})."),
            ));
        }
        let values = if n == 1 {
            vec![qmin]
        } else {
            let step = (qmax - qmin) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { qmax } else { qmin + step * i as f64 })
                .collect()
        };
        Self::user_sampled(values)
    }

    /// Caller-supplied q values.
    pub fn user_sampled(values: Vec<f64>) -> Result<Self, AppError> {
        if values.is_empty() {
            return Err(AppError::new(2, "q grid is empty."));
        }
        if let Some(bad) = values.iter().find(|q| !(q.is_finite() && **q > 0.0)) {
            return Err(AppError::new(
                2,
                format!("q values must be finite and > 0, got {bad}."),
            ));
        }
        if let Some(w) = values.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AppError::new(
                2,
                format!("q values must be strictly ascending ({} then {}).", w[0], w[1]),
            ));
        }
        Ok(Self { values })
    }

    pub fn from_source(source: &QSource) -> Result<Self, AppError> {
        match source {
            QSource::Uniform { qmin, qmax, n } => Self::uniform(*qmin, *qmax, *n),
            QSource::Sampled(values) => Self::user_sampled(values.clone()),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
