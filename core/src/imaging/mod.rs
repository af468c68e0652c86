pub mod angulation;
pub mod codec;
pub mod orientation;
pub mod principal_axis;
pub mod quality;

pub use angulation::{clamp_angle, estimate, estimate_batch, AngulationResult, BatchAngulation};
pub use codec::{EncodeFormat, ImageCodec, ImageRsCodec};
pub use orientation::{normalize, OrientationResult};
pub use quality::HeuristicQualityAssessor;
