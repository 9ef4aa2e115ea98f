//! Binary logistic regression classifier.
//!
//! Minimizes `0.5·‖w‖² + C·Σ sᵢ·BCE(yᵢ, σ(w·xᵢ + b))` with full-batch
//! accelerated gradient descent. The intercept is not penalized. With
//! [`ClassWeight::Balanced`], `sᵢ = n / (2·n_class(yᵢ))`.

use std::fmt;
use std::time::Instant;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::corpus::Label;
use crate::error::{PhishError, Result};
use crate::ml::features::FeatureVector;

/// Per-class weighting of the loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    /// Scale each class inversely to its frequency.
    Balanced,
    /// Every sample counts once.
    Uniform,
}

/// Configuration for [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inverse regularization strength.
    pub c: f64,
    /// Iteration budget.
    pub max_iter: usize,
    /// Convergence threshold on the largest gradient component.
    pub tol: f64,
    pub class_weight: ClassWeight,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            class_weight: ClassWeight::Balanced,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(PhishError::config(format!("C must be positive, got {}", self.c)));
        }
        if self.max_iter == 0 {
            return Err(PhishError::config("max_iter must be positive"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(PhishError::config(format!("tol must be positive, got {}", self.tol)));
        }
        Ok(())
    }
}

/// Training ran out of iterations before the gradient fell below `tol`.
///
/// Not an error: the parameters reached so far are still used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    pub iterations: usize,
    pub gradient_norm: f64,
    pub tol: f64,
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "logistic regression did not converge after {} iterations \
             (max gradient {:.3e} > tol {:.1e})",
            self.iterations, self.gradient_norm, self.tol
        )
    }
}

/// Training statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Number of iterations completed.
    pub iterations: usize,
    pub converged: bool,
    /// Objective value at the final parameters.
    pub final_loss: f64,
    /// Objective value per iteration.
    pub loss_history: Vec<f64>,
    /// Training time in milliseconds.
    pub training_time_ms: u64,
    /// Samples per class, indexed by [`Label::as_index`].
    pub class_counts: [usize; 2],
    /// Loss weight per class, indexed by [`Label::as_index`].
    pub class_weights: [f64; 2],
    pub warning: Option<ConvergenceWarning>,
}

/// Weight vector and intercept of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Serializable state of a fitted [`LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierState {
    pub config: ClassifierConfig,
    pub parameters: ModelParameters,
    pub stats: Option<TrainingStats>,
}

/// Outcome of classifying one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability of the predicted class, always in `[0.5, 1.0]`.
    pub confidence: f64,
    /// Estimated probability of phishing.
    pub phishing_probability: f64,
}

impl Prediction {
    /// Apply the decision rule to a phishing probability.
    pub fn from_probability(phishing_probability: f64) -> Self {
        if phishing_probability >= 0.5 {
            Prediction {
                label: Label::Phishing,
                confidence: phishing_probability,
                phishing_probability,
            }
        } else {
            Prediction {
                label: Label::Safe,
                confidence: 1.0 - phishing_probability,
                phishing_probability,
            }
        }
    }

    pub fn is_phishing(&self) -> bool {
        self.label.is_phishing()
    }
}

/// L2-regularized logistic regression.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    config: ClassifierConfig,
    parameters: Option<ModelParameters>,
    stats: Option<TrainingStats>,
}

impl LogisticRegression {
    /// Create an untrained model.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parameters: None,
            stats: None,
        })
    }

    /// Fit the model; returns the training statistics.
    ///
    /// Fails with `InsufficientData` unless both classes are present.
    /// Running out of iterations is reported through
    /// [`TrainingStats::warning`], not as an error.
    pub fn fit(&mut self, features: &[FeatureVector], labels: &[Label]) -> Result<TrainingStats> {
        if features.len() != labels.len() {
            return Err(PhishError::invalid_input(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(PhishError::insufficient_data("no training examples"));
        }
        let dim = features[0].dim();
        if let Some(v) = features.iter().find(|v| v.dim() != dim) {
            return Err(PhishError::invalid_input(format!(
                "feature dimension {} differs from {dim}",
                v.dim()
            )));
        }

        let mut class_counts = [0usize; 2];
        for label in labels {
            class_counts[label.as_index()] += 1;
        }
        if class_counts.contains(&0) {
            return Err(PhishError::insufficient_data(format!(
                "both classes are required (safe={}, phishing={})",
                class_counts[0], class_counts[1]
            )));
        }

        let n = labels.len() as f64;
        let class_weights = match self.config.class_weight {
            ClassWeight::Balanced => [
                n / (2.0 * class_counts[0] as f64),
                n / (2.0 * class_counts[1] as f64),
            ],
            ClassWeight::Uniform => [1.0, 1.0],
        };

        let start = Instant::now();
        let problem = Problem {
            features,
            targets: labels.iter().map(|l| l.as_target()).collect(),
            sample_weights: labels
                .iter()
                .map(|l| self.config.c * class_weights[l.as_index()])
                .collect(),
            dim,
        };
        let outcome = problem.minimize(self.config.max_iter, self.config.tol);

        let warning = (!outcome.converged).then(|| ConvergenceWarning {
            iterations: outcome.iterations,
            gradient_norm: outcome.gradient_norm,
            tol: self.config.tol,
        });
        if let Some(warning) = &warning {
            warn!("{warning}");
        } else {
            debug!(
                "logistic regression converged in {} iterations (loss {:.6})",
                outcome.iterations, outcome.final_loss
            );
        }

        let stats = TrainingStats {
            iterations: outcome.iterations,
            converged: outcome.converged,
            final_loss: outcome.final_loss,
            loss_history: outcome.loss_history,
            training_time_ms: start.elapsed().as_millis() as u64,
            class_counts,
            class_weights,
            warning,
        };
        self.parameters = Some(outcome.parameters);
        self.stats = Some(stats.clone());
        Ok(stats)
    }

    /// Raw linear score `w·v + b`.
    pub fn decision_function(&self, v: &FeatureVector) -> Result<f64> {
        let parameters = self.trained_parameters()?;
        if v.dim() != parameters.weights.len() {
            return Err(PhishError::invalid_input(format!(
                "feature vector has dimension {} but the model expects {}",
                v.dim(),
                parameters.weights.len()
            )));
        }
        Ok(v.dot(&parameters.weights) + parameters.bias)
    }

    /// `[P(safe), P(phishing)]`.
    pub fn predict_proba(&self, v: &FeatureVector) -> Result<[f64; 2]> {
        let p = sigmoid(self.decision_function(v)?);
        Ok([1.0 - p, p])
    }

    /// Label plus the probability of that label.
    pub fn predict(&self, v: &FeatureVector) -> Result<Prediction> {
        let [_, phishing] = self.predict_proba(v)?;
        Ok(Prediction::from_probability(phishing))
    }

    pub fn is_trained(&self) -> bool {
        self.parameters.is_some()
    }

    /// Number of features the model was trained on (0 when untrained).
    pub fn n_features(&self) -> usize {
        self.parameters.as_ref().map_or(0, |p| p.weights.len())
    }

    pub fn parameters(&self) -> Option<&ModelParameters> {
        self.parameters.as_ref()
    }

    pub fn training_stats(&self) -> Option<&TrainingStats> {
        self.stats.as_ref()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Snapshot the fitted state for persistence.
    pub fn to_state(&self) -> Result<ClassifierState> {
        Ok(ClassifierState {
            config: self.config.clone(),
            parameters: self.trained_parameters()?.clone(),
            stats: self.stats.clone(),
        })
    }

    /// Rebuild a model from persisted state.
    pub fn from_state(state: ClassifierState) -> Result<Self> {
        let finite = state.parameters.bias.is_finite()
            && state.parameters.weights.iter().all(|w| w.is_finite());
        if !finite {
            return Err(PhishError::other("model parameters contain non-finite values"));
        }
        let mut model = Self::new(state.config)?;
        model.parameters = Some(state.parameters);
        model.stats = state.stats;
        Ok(model)
    }

    fn trained_parameters(&self) -> Result<&ModelParameters> {
        self.parameters
            .as_ref()
            .ok_or_else(|| PhishError::other("classifier is not trained"))
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

struct Problem<'a> {
    features: &'a [FeatureVector],
    targets: Vec<f64>,
    /// `C` times the class weight of each sample.
    sample_weights: Vec<f64>,
    dim: usize,
}

struct Outcome {
    parameters: ModelParameters,
    iterations: usize,
    converged: bool,
    gradient_norm: f64,
    final_loss: f64,
    loss_history: Vec<f64>,
}

impl Problem<'_> {
    /// Objective and gradient at `(w, b)`; the gradient is written into
    /// `grad_w` and returned alongside the loss as `(loss, grad_b)`.
    fn evaluate(&self, w: &[f64], b: f64, grad_w: &mut [f64]) -> (f64, f64) {
        grad_w.copy_from_slice(w);
        let mut loss = 0.5 * w.iter().map(|x| x * x).sum::<f64>();
        let mut grad_b = 0.0;

        for ((x, &y), &s) in self
            .features
            .iter()
            .zip(&self.targets)
            .zip(&self.sample_weights)
        {
            let z = x.dot(w) + b;
            loss += s * (softplus(z) - y * z);
            let residual = s * (sigmoid(z) - y);
            grad_b += residual;
            for (index, value) in x.iter() {
                grad_w[index] += residual * value;
            }
        }

        (loss, grad_b)
    }

    /// Upper bound on the curvature of the objective.
    fn lipschitz(&self) -> f64 {
        let data: f64 = self
            .features
            .iter()
            .zip(&self.sample_weights)
            .map(|(x, s)| s * (x.norm().powi(2) + 1.0))
            .sum();
        1.0 + 0.25 * data
    }

    /// Nesterov-accelerated gradient descent with gradient-based restart.
    fn minimize(&self, max_iter: usize, tol: f64) -> Outcome {
        let step = 1.0 / self.lipschitz();

        let mut w = vec![0.0; self.dim];
        let mut b = 0.0;
        let mut w_prev = w.clone();
        let mut b_prev = b;
        let mut momentum_t: f64 = 1.0;

        let mut y_w = w.clone();
        let mut grad_w = vec![0.0; self.dim];
        let mut loss_history = Vec::new();
        let mut gradient_norm = f64::INFINITY;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iter {
            let t_next = 0.5 * (1.0 + (1.0 + 4.0 * momentum_t * momentum_t).sqrt());
            let beta = (momentum_t - 1.0) / t_next;
            for i in 0..self.dim {
                y_w[i] = w[i] + beta * (w[i] - w_prev[i]);
            }
            let y_b = b + beta * (b - b_prev);

            let (loss, grad_b) = self.evaluate(&y_w, y_b, &mut grad_w);
            loss_history.push(loss);
            iterations += 1;

            gradient_norm = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if gradient_norm <= tol {
                w.copy_from_slice(&y_w);
                b = y_b;
                converged = true;
                break;
            }

            w_prev.copy_from_slice(&w);
            b_prev = b;
            let mut progress = 0.0;
            for i in 0..self.dim {
                w[i] = y_w[i] - step * grad_w[i];
                progress += grad_w[i] * (w[i] - w_prev[i]);
            }
            b = y_b - step * grad_b;
            progress += grad_b * (b - b_prev);

            // Restart momentum when it points uphill.
            momentum_t = if progress > 0.0 { 1.0 } else { t_next };
        }

        let final_loss = self.evaluate(&w, b, &mut grad_w).0;
        Outcome {
            parameters: ModelParameters { weights: w, bias: b },
            iterations,
            converged,
            gradient_norm,
            final_loss,
            loss_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(dim: usize, pairs: &[(usize, f64)]) -> FeatureVector {
        FeatureVector::from_pairs(dim, pairs.to_vec())
            .unwrap()
            .l2_normalized()
    }

    fn separable() -> (Vec<FeatureVector>, Vec<Label>) {
        let features = vec![
            vector(3, &[(0, 1.0)]),
            vector(3, &[(0, 1.0), (2, 0.2)]),
            vector(3, &[(0, 0.8), (2, 0.1)]),
            vector(3, &[(1, 1.0)]),
            vector(3, &[(1, 1.0), (2, 0.2)]),
            vector(3, &[(1, 0.9), (2, 0.1)]),
        ];
        let labels = vec![
            Label::Phishing,
            Label::Phishing,
            Label::Phishing,
            Label::Safe,
            Label::Safe,
            Label::Safe,
        ];
        (features, labels)
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(40.0) > 0.999);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_separable() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        let stats = model.fit(&features, &labels).unwrap();

        assert!(stats.converged);
        assert!(stats.warning.is_none());
        assert_eq!(stats.class_counts, [3, 3]);
        for (v, label) in features.iter().zip(&labels) {
            assert_eq!(model.predict(v).unwrap().label, *label);
        }
        assert_eq!(model.n_features(), 3);
    }

    #[test]
    fn test_loss_decreases() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        let stats = model.fit(&features, &labels).unwrap();
        let first = stats.loss_history[0];
        assert!(stats.final_loss < first);
    }

    #[test]
    fn test_confidence_is_probability_of_predicted_class() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        model.fit(&features, &labels).unwrap();

        for v in &features {
            let prediction = model.predict(v).unwrap();
            let [safe, phishing] = model.predict_proba(v).unwrap();
            assert!((safe + phishing - 1.0).abs() < 1e-12);
            assert!(prediction.confidence >= 0.5 && prediction.confidence <= 1.0);
            let expected = if prediction.is_phishing() { phishing } else { safe };
            assert_eq!(prediction.confidence, expected);
        }
    }

    #[test]
    fn test_balanced_weights_offset_imbalance() {
        // Identical inputs: the optimum puts P(phishing) at the weighted class ratio.
        let features: Vec<FeatureVector> = (0..10).map(|_| vector(1, &[(0, 1.0)])).collect();
        let mut labels = vec![Label::Safe; 9];
        labels.push(Label::Phishing);

        let mut balanced = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        let stats = balanced.fit(&features, &labels).unwrap();
        assert!(stats.converged);
        assert!((stats.class_weights[1] - 5.0).abs() < 1e-12);
        let p = balanced.predict_proba(&features[0]).unwrap()[1];
        assert!((p - 0.5).abs() < 1e-3, "balanced p = {p}");

        let mut uniform = LogisticRegression::new(ClassifierConfig {
            class_weight: ClassWeight::Uniform,
            ..Default::default()
        })
        .unwrap();
        uniform.fit(&features, &labels).unwrap();
        let p = uniform.predict_proba(&features[0]).unwrap()[1];
        assert!((p - 0.1).abs() < 1e-3, "uniform p = {p}");
    }

    #[test]
    fn test_single_class_is_insufficient() {
        let features = vec![vector(2, &[(0, 1.0)]), vector(2, &[(1, 1.0)])];
        let labels = vec![Label::Safe, Label::Safe];
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        assert!(matches!(
            model.fit(&features, &labels),
            Err(PhishError::InsufficientData(_))
        ));
        assert!(matches!(
            model.fit(&[], &[]),
            Err(PhishError::InsufficientData(_))
        ));
        assert!(!model.is_trained());
    }

    #[test]
    fn test_convergence_warning_keeps_parameters() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig {
            max_iter: 2,
            ..Default::default()
        })
        .unwrap();
        let stats = model.fit(&features, &labels).unwrap();

        assert!(!stats.converged);
        let warning = stats.warning.unwrap();
        assert_eq!(warning.iterations, 2);
        assert!(warning.to_string().contains("did not converge"));
        assert!(model.is_trained());
        assert!(model.predict(&features[0]).is_ok());
    }

    #[test]
    fn test_zero_vector_uses_bias() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        model.fit(&features, &labels).unwrap();
        let bias = model.parameters().unwrap().bias;
        let p = model.predict_proba(&FeatureVector::zeros(3)).unwrap()[1];
        assert!((p - sigmoid(bias)).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        model.fit(&features, &labels).unwrap();
        assert!(matches!(
            model.predict(&FeatureVector::zeros(4)),
            Err(PhishError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_untrained_predict_fails() {
        let model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        assert!(model.predict(&FeatureVector::zeros(1)).is_err());
        assert!(model.to_state().is_err());
    }

    #[test]
    fn test_state_round_trip() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new(ClassifierConfig::default()).unwrap();
        model.fit(&features, &labels).unwrap();
        let restored = LogisticRegression::from_state(model.to_state().unwrap()).unwrap();
        assert_eq!(
            model.predict(&features[2]).unwrap(),
            restored.predict(&features[2]).unwrap()
        );
    }

    #[test]
    fn test_prediction_threshold() {
        assert_eq!(Prediction::from_probability(0.5).label, Label::Phishing);
        let safe = Prediction::from_probability(0.2);
        assert_eq!(safe.label, Label::Safe);
        assert!((safe.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config() {
        assert!(LogisticRegression::new(ClassifierConfig {
            c: 0.0,
            ..Default::default()
        })
        .is_err());
    }
}
