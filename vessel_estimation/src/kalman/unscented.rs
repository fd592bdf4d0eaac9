use nalgebra::{SMatrix, SVector};

use crate::estimator::{EstimationError, Filter, Predictor};
use crate::kalman::{correct, symmetrize};
use crate::model::{MeasurementModel, TransitionModel};
use crate::state::GaussianState;

/// # Explanation
/// Symmetric sigma points of a gaussian state together with their mean and covariance weights.
#[derive(Debug, Clone)]
pub struct SigmaPoints<const D: usize> {
    pub points: Vec<SVector<f64, D>>,
    pub weights_mean: Vec<f64>,
    pub weights_covariance: Vec<f64>,
}

/// # Explanation
/// The unscented Kalman filter propagates 2n + 1 sigma points through the exact nonlinear
/// transition model instead of linearising it. Angle entries are averaged as residuals about the
/// central sigma point, so a cloud straddling the +-pi seam keeps its mean.
///
/// # Parameters
/// alpha controls the spread of the sigma points, beta encodes prior knowledge about the
/// distribution (2 is optimal for gaussians) and kappa is a secondary scaling parameter.
pub struct UnscentedKalmanFilter<const MD: usize, const SD: usize, TModel, MModel> {
    transition_model: TModel,
    measurement_model: MModel,
    alpha: f64,
    beta: f64,
    kappa: f64,
}

impl<const MD: usize, const SD: usize, TModel, MModel> UnscentedKalmanFilter<MD, SD, TModel, MModel>
where
    TModel: TransitionModel<SD>,
    MModel: MeasurementModel<MD, SD>,
{
    /// # Errors
    /// Configuration if alpha is not positive or the scaling leaves n + lambda non-positive.
    pub fn new(
        transition_model: TModel,
        measurement_model: MModel,
        alpha: f64,
        beta: f64,
        kappa: f64,
    ) -> Result<Self, EstimationError> {
        let filter = Self {
            transition_model,
            measurement_model,
            alpha,
            beta,
            kappa,
        };
        if !(alpha.is_finite() && alpha > 0.0) || !(filter.spread() > 0.0) || !beta.is_finite() {
            return Err(EstimationError::Configuration {
                description: format!(
                    "invalid sigma point scaling alpha={} beta={} kappa={}",
                    alpha, beta, kappa
                ),
            });
        }
        Ok(filter)
    }

    fn lambda(&self) -> f64 {
        let n = SD as f64;
        self.alpha.powi(2) * (n + self.kappa) - n
    }

    /// n + lambda
    fn spread(&self) -> f64 {
        SD as f64 + self.lambda()
    }

    pub fn sigma_points(
        &self,
        state: &GaussianState<SD>,
    ) -> Result<SigmaPoints<SD>, EstimationError> {
        let spread = self.spread();
        let square_root = state
            .error
            .cholesky()
            .ok_or_else(|| EstimationError::NotPositiveDefinite {
                context: "sigma point covariance".to_string(),
            })?
            .l()
            * spread.sqrt();

        let mut points = Vec::with_capacity(2 * SD + 1);
        points.push(state.estimate);
        for column in square_root.column_iter() {
            points.push(state.estimate + column);
        }
        for column in square_root.column_iter() {
            points.push(state.estimate - column);
        }

        let mut weights_mean = vec![0.5 / spread; 2 * SD + 1];
        weights_mean[0] = self.lambda() / spread;
        let mut weights_covariance = weights_mean.clone();
        weights_covariance[0] += 1.0 - self.alpha.powi(2) + self.beta;

        Ok(SigmaPoints {
            points,
            weights_mean,
            weights_covariance,
        })
    }
}

impl<const MD: usize, const SD: usize, TModel, MModel> Predictor<SD>
    for UnscentedKalmanFilter<MD, SD, TModel, MModel>
where
    TModel: TransitionModel<SD>,
    MModel: MeasurementModel<MD, SD>,
{
    fn predict(
        &self,
        prior: &GaussianState<SD>,
        dt: f64,
    ) -> Result<GaussianState<SD>, EstimationError> {
        let sigma = self.sigma_points(prior)?;
        let propagated: Vec<SVector<f64, SD>> = sigma
            .points
            .iter()
            .map(|point| self.transition_model.transition(point, dt))
            .collect();

        let centre = propagated[0];
        let offset = propagated
            .iter()
            .zip(&sigma.weights_mean)
            .fold(SVector::<f64, SD>::zeros(), |acc, (point, weight)| {
                acc + self.transition_model.state_residual(point, &centre) * *weight
            });
        let mean = self.transition_model.normalize(centre + offset);

        let covariance = propagated.iter().zip(&sigma.weights_covariance).fold(
            self.transition_model.transition_error(dt),
            |acc: SMatrix<f64, SD, SD>, (point, weight)| {
                let residual = self.transition_model.state_residual(point, &mean);
                acc + residual * residual.transpose() * *weight
            },
        );

        Ok(GaussianState::new(mean, symmetrize(covariance)))
    }
}

impl<const MD: usize, const SD: usize, TModel, MModel> Filter<MD, SD>
    for UnscentedKalmanFilter<MD, SD, TModel, MModel>
where
    TModel: TransitionModel<SD>,
    MModel: MeasurementModel<MD, SD>,
{
    /// The measurement model is linear, so the correction is the exact Kalman update.
    fn filter(
        &self,
        prediction: &GaussianState<SD>,
        measurement: &SVector<f64, MD>,
    ) -> Result<GaussianState<SD>, EstimationError> {
        let innovation = self
            .measurement_model
            .measurement_residual(measurement, &self.measurement_model.measure(&prediction.estimate));
        let corrected = correct(
            prediction,
            &innovation,
            &self.measurement_model.measurement_matrix(),
            &self.measurement_model.measurement_error(),
        )?;

        Ok(GaussianState::new(
            self.transition_model.normalize(corrected.estimate),
            corrected.error,
        ))
    }
}
