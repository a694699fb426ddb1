//! 错误类型.
//!
//! 本 crate 不存在可重试的瞬时错误: 所有计算都作用于已经在内存中的数据.
//! 错误分为两类:
//!
//! 1. [`ConfigError`]: 配置非法 (退化的强度窗口、非法的中值滤波核、非法的轴描述等),
//!   在设置或使用配置时立即报告, 绝不静默修正;
//! 2. [`PreconditionError`]: 调用方违反前置条件 (缓冲区尺寸与声明不符、缺少分割标注等),
//!   代表调用方的 bug, 不应重试.
//!
//! 另外 [`ScanError`] 汇总了扫描文件读写时的错误.

use thiserror::Error;

use crate::Idx3d;

/// 配置错误.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// 强度窗口上下限相等, 映射时会出现除零.
    #[error("强度窗口退化: 上下限均为 {0}")]
    DegenerateWindow(f32),

    /// 强度窗口下限大于上限.
    #[error("强度窗口颠倒: 下限 {lower} > 上限 {upper}")]
    InvertedWindow {
        /// 窗口下限.
        lower: f32,
        /// 窗口上限.
        upper: f32,
    },

    /// 输出范围的最小值大于最大值.
    #[error("输出范围颠倒: 最小值 {min} > 最大值 {max}")]
    InvertedRange {
        /// 输出最小值.
        min: f32,
        /// 输出最大值.
        max: f32,
    },

    /// 窗口或输出范围中存在 inf/NaN, 或窗宽无法用 `f32` 表示.
    #[error("强度窗口或输出范围包含非有限值")]
    NonFinite,

    /// 中值滤波核大小必须为正奇数.
    #[error("中值滤波核大小 {0} 非法, 必须为正奇数")]
    InvalidKernel(usize),

    /// 轴顺序不是 {0, 1, 2} 的排列.
    #[error("轴顺序 {0:?} 不是 {{0, 1, 2}} 的排列")]
    NotPermutation([usize; 3]),

    /// 轴方向只能是 +1 或 -1.
    #[error("轴方向 {0} 非法, 只能是 +1 或 -1")]
    InvalidSign(i16),

    /// 未知的执行路径名称.
    #[error("未知的执行路径 `{0}`")]
    UnknownExecutionPath(String),
}

/// 前置条件错误. 出现即意味着调用方存在 bug.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// 缓冲区长度与声明的 (宽, 高, 深) 不一致.
    #[error("缓冲区长度 {len} 与尺寸 {dims:?} 不符")]
    ShapeMismatch {
        /// 声明的 (宽, 高, 深).
        dims: Idx3d,
        /// 实际缓冲区长度.
        len: usize,
    },

    /// 操作需要分割标注, 但扫描中不存在.
    #[error("扫描中不存在分割标注")]
    MissingSegment,

    /// 扫描体与分割标注的尺寸不一致.
    #[error("扫描尺寸 {volume:?} 与标注尺寸 {segment:?} 不一致")]
    DimsMismatch {
        /// 扫描体的 (宽, 高, 深).
        volume: Idx3d,
        /// 分割标注的 (宽, 高, 深).
        segment: Idx3d,
    },
}

/// 读写 LiTS 扫描文件时的错误.
#[derive(Debug, Error)]
pub enum ScanError {
    /// 底层 nifti 读取错误.
    #[error("nifti 读取失败: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 文件不是 3D 数据. 参数为 header 中声明的维数.
    #[error("期望 3D 数据, 实际维数为 {0}")]
    NotVolume(u16),

    /// header 中的方向矩阵无法归结为轴的排列 (例如斜切扫描).
    #[error("无法从 header 方向矩阵推断轴顺序")]
    AmbiguousOrientation,

    /// 数据违反前置条件.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// 写出 npy 文件失败.
    #[error("npy 写入失败: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),
}
