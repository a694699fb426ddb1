//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{AxisSpec, IntensityWindow, LitsScan, Scan, Sign, Voxel, VoxelBuffer};

pub use crate::backend::{Accelerated, Backend, ExecutionPath, GenericToolkit};
pub use crate::median::KernelSize;
pub use crate::plan::OrientationPlan;
pub use crate::processor::{Processor, ProcessorConfig};

pub use crate::consts::gray::{LITS_BACKGROUND, LITS_LIVER, LITS_TUMOR};
pub use crate::error::{ConfigError, PreconditionError, ScanError};
