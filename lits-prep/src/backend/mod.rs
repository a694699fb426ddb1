//! 执行路径.
//!
//! 同一组数值契约有两种实现:
//!
//! 1. [`GenericToolkit`]: 基于 `ndarray` 视图与组合操作 (轴重排、轴反转、`mapv` 等),
//!   相当于通用图像处理库的 filter graph. 轴重排与翻转作为两个相继的阶段执行;
//! 2. [`Accelerated`]: 直接在连续内存上执行逐体素内核, 启用 `rayon` feature 时以
//!   parallel-for 方式分解到所有核心. 轴重排与翻转合并为一次复合索引映射.
//!
//! 两条路径对相同输入给出相同的输出尺寸与体素值.
//! 所有参数校验都在进入后端之前完成, 后端本身不会失败.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::data::{IntensityWindow, Voxel, VoxelBuffer};
use crate::error::ConfigError;
use crate::median::KernelSize;
use crate::plan::OrientationPlan;

mod accelerated;
mod generic;

pub use accelerated::Accelerated;
pub use generic::GenericToolkit;

/// 执行后端的能力接口.
pub trait Backend {
    /// 后端名称, 用于日志.
    fn name(&self) -> &'static str;

    /// 按 `window` 就地映射强度.
    fn normalize(&self, volume: &mut VoxelBuffer<f32>, window: &IntensityWindow);

    /// 按 `plan` 对缓冲区进行轴重排和翻转, 返回新缓冲区.
    fn reorient<T: Voxel>(&self, buffer: &VoxelBuffer<T>, plan: &OrientationPlan)
        -> VoxelBuffer<T>;

    /// 逐水平切片就地中值滤波.
    fn median(&self, volume: &mut VoxelBuffer<f32>, k: KernelSize);
}

/// 构建时选定的执行路径.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionPath {
    /// 通用工具路径.
    #[default]
    GenericToolkit,

    /// 加速路径.
    Accelerated,
}

impl FromStr for ExecutionPath {
    type Err = ConfigError;

    /// 接受 `"itk"` / `"generic"` 与 `"cuda"` / `"accelerated"` (大小写不敏感).
    /// 其他任何值都是配置错误, 不会静默回退.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "itk" | "generic" | "generic_toolkit" => Ok(Self::GenericToolkit),
            "cuda" | "accelerated" => Ok(Self::Accelerated),
            _ => Err(ConfigError::UnknownExecutionPath(s.to_owned())),
        }
    }
}

impl Display for ExecutionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Backend for ExecutionPath {
    #[inline]
    fn name(&self) -> &'static str {
        match self {
            Self::GenericToolkit => GenericToolkit.name(),
            Self::Accelerated => Accelerated.name(),
        }
    }

    #[inline]
    fn normalize(&self, volume: &mut VoxelBuffer<f32>, window: &IntensityWindow) {
        match self {
            Self::GenericToolkit => GenericToolkit.normalize(volume, window),
            Self::Accelerated => Accelerated.normalize(volume, window),
        }
    }

    #[inline]
    fn reorient<T: Voxel>(
        &self,
        buffer: &VoxelBuffer<T>,
        plan: &OrientationPlan,
    ) -> VoxelBuffer<T> {
        match self {
            Self::GenericToolkit => GenericToolkit.reorient(buffer, plan),
            Self::Accelerated => Accelerated.reorient(buffer, plan),
        }
    }

    #[inline]
    fn median(&self, volume: &mut VoxelBuffer<f32>, k: KernelSize) {
        match self {
            Self::GenericToolkit => GenericToolkit.median(volume, k),
            Self::Accelerated => Accelerated.median(volume, k),
        }
    }
}
