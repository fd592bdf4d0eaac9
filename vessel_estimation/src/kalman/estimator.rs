use nalgebra::SVector;

use crate::estimator::{EstimationError, Filter, Predictor};
use crate::kalman::correct;
use crate::model::{DifferentiableTransitionModel, MeasurementModel};
use crate::state::GaussianState;

/// # Explanation
/// The extended Kalman filter propagates the estimate through the nonlinear transition model and
/// the covariance through its jacobian, which is re-evaluated at the current estimate on every
/// step.
pub struct ExtendedKalmanFilter<const MD: usize, const SD: usize, TModel, MModel> {
    transition_model: TModel,
    measurement_model: MModel,
}

impl<const MD: usize, const SD: usize, TModel, MModel> ExtendedKalmanFilter<MD, SD, TModel, MModel>
where
    TModel: DifferentiableTransitionModel<SD>,
    MModel: MeasurementModel<MD, SD>,
{
    pub fn new(transition_model: TModel, measurement_model: MModel) -> Self {
        Self {
            transition_model,
            measurement_model,
        }
    }
}

impl<const MD: usize, const SD: usize, TModel, MModel> Predictor<SD>
    for ExtendedKalmanFilter<MD, SD, TModel, MModel>
where
    TModel: DifferentiableTransitionModel<SD>,
    MModel: MeasurementModel<MD, SD>,
{
    fn predict(
        &self,
        prior: &GaussianState<SD>,
        dt: f64,
    ) -> Result<GaussianState<SD>, EstimationError> {
        let transition_matrix = self.transition_model.transition_jacobian(&prior.estimate, dt);
        let transition_error = self.transition_model.transition_error(dt);
        let estimate = self
            .transition_model
            .normalize(self.transition_model.transition(&prior.estimate, dt));

        Ok(GaussianState::new(
            estimate,
            transition_matrix * prior.error * transition_matrix.transpose() + transition_error,
        ))
    }
}

impl<const MD: usize, const SD: usize, TModel, MModel> Filter<MD, SD>
    for ExtendedKalmanFilter<MD, SD, TModel, MModel>
where
    TModel: DifferentiableTransitionModel<SD>,
    MModel: MeasurementModel<MD, SD>,
{
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
