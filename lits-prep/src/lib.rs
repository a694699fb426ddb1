#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! LiTS 格式 3D CT 扫描的预处理库: 强度归一化与方向重排.
//!
//! 不同来源的扫描以不同的物理轴顺序和方向存储, 强度也是原始 HU 值.
//! 分割网络需要统一的标准轴布局 (左右, 前后, 上下) 和有界的强度范围,
//! 本 crate 在网络入口之前完成这两件事, 同时保证扫描体和分割标注的几何一致.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 左右方向 (标准轴 0) 的符号从不被信任, 因此从不翻转.
//! 2. 配置错误与前置条件错误一律以 `Err` 报告, 不会静默修正, 也不会 panic.
//! 3. 两条执行路径 ([`GenericToolkit`] 与 [`Accelerated`]) 的输出逐位一致.
//!
//! # 开发计划
//!
//! ### 轴描述与重排计划 ✅
//!
//! 实现位于 `lits-prep/src/data/axis.rs` 与 `lits-prep/src/plan.rs`.
//!
//! ### CT 强度窗口 ✅
//!
//! 将 CT HU 值线性映射到有界输出范围 (默认 `[0, 255]`).
//!
//! 实现位于 `lits-prep/src/data/window.rs`.
//!
//! ### nifti header 方向推断 ✅
//!
//! 优先 sform, 其次 qform.
//!
//! 实现位于 `lits-prep/src/data/header.rs`.
//!
//! ### 切片内中值滤波 ✅
//!
//! 实现位于 `lits-prep/src/median.rs`.
//!
//! ### 执行路径 ✅
//!
//! 1. 基于 `ndarray` 组合操作的通用路径. ✅
//! 2. 基于 `rayon` 逐体素并行内核的加速路径. ✅
//! 3. 真正的 GPU 后端 (wgpu). ⌛️
//!
//! 实现位于 `lits-prep/src/backend/*`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 体素缓冲区, 轴描述, 强度窗口与扫描.
pub mod data;

pub use data::{AxisSpec, IntensityWindow, LitsScan, Scan, Sign, Voxel, VoxelBuffer};

pub mod backend;
pub mod consts;
pub mod error;
pub mod median;
pub mod plan;
pub mod prelude;
pub mod processor;

pub use backend::{Accelerated, Backend, ExecutionPath, GenericToolkit};
pub use error::{ConfigError, PreconditionError, ScanError};
pub use median::KernelSize;
pub use plan::OrientationPlan;
pub use processor::{Processor, ProcessorConfig};
