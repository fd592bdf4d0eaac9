pub mod angle;
pub mod blending;
pub mod config;
pub mod estimator;
pub mod evaluation;
pub mod kalman;
pub mod kinematic;
pub mod model;
pub mod polynomial;
pub mod state;
pub mod track;
pub mod velocity_blending;
