//! 逐切片二维中值滤波的公共部分.
//!
//! 每个体素被替换为其所在水平切片内 `k × k` 邻域的中值, 不跨切片取值.
//! 邻域越界时采用 clamp-to-edge (复制边缘) 策略, 对整个体数据一致.
//! 读取永远来自滤波前的原始值.

use ordered_float::OrderedFloat;

use crate::error::ConfigError;

/// 中值滤波核大小. 一定是正奇数.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KernelSize(usize);

impl KernelSize {
    /// 构建核大小.
    ///
    /// `k` 为偶数或 0, 或邻域采样数 `k * k` 无法分配 (溢出) 时,
    /// 返回 `Err(ConfigError::InvalidKernel)`.
    #[inline]
    pub fn new(k: usize) -> Result<Self, ConfigError> {
        let area_ok = k
            .checked_mul(k)
            .is_some_and(|a| a <= isize::MAX as usize / std::mem::size_of::<f32>());
        if k % 2 == 1 && area_ok {
            Ok(Self(k))
        } else {
            Err(ConfigError::InvalidKernel(k))
        }
    }

    /// 边长 `k`.
    #[inline]
    pub fn get(&self) -> usize {
        self.0
    }

    /// 半径 `(k - 1) / 2`.
    #[inline]
    pub fn radius(&self) -> usize {
        self.0 / 2
    }

    /// 邻域内的采样数 `k * k`.
    #[inline]
    pub fn area(&self) -> usize {
        self.0 * self.0
    }

    /// `k == 1` 时滤波不改变数据.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        self.0 == 1
    }
}

impl TryFrom<usize> for KernelSize {
    type Error = ConfigError;

    #[inline]
    fn try_from(k: usize) -> Result<Self, Self::Error> {
        Self::new(k)
    }
}

/// 求 `center + offset - radius` 并截断到 `[0, len)`.
#[inline]
pub(crate) fn clamp_to_edge(center: usize, offset: usize, radius: usize, len: usize) -> usize {
    (center + offset).saturating_sub(radius).min(len - 1)
}

/// 就地求中值. `window` 长度必须为奇数.
///
/// 使用全序比较, NaN 被视为最大值.
#[inline]
pub(crate) fn median_of(window: &mut [f32]) -> f32 {
    debug_assert_eq!(window.len() % 2, 1);
    let mid = window.len() / 2;
    let (_, m, _) = window.select_nth_unstable_by_key(mid, |v| OrderedFloat(*v));
    *m
}
