//! CT 强度窗口.
//!
//! 输入窗口外的值被截断到窗口边界, 窗口两端精确映射到输出范围两端.

use crate::consts::window::*;
use crate::error::ConfigError;

/// 强度窗口, 将 CT HU 值的输入窗口 `[lower, upper]` 线性映射到输出范围 `[out_min, out_max]`.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该通过 `with_*` 方法创建新的实例.
/// 所有构建方法都会校验参数, 因此一个 `IntensityWindow` 实例必然满足
/// `lower < upper`, `out_min <= out_max`, 且四个值都是有限值.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawWindow", into = "RawWindow"))]
pub struct IntensityWindow {
    lower: f32,
    upper: f32,
    out_min: f32,
    out_max: f32,
}

impl Default for IntensityWindow {
    #[inline]
    fn default() -> Self {
        Self::from_liver_visual()
    }
}

impl IntensityWindow {
    /// 构建强度窗口.
    ///
    /// # 返回值
    ///
    /// - 任一参数不是有限值, 或窗宽 `upper - lower` 溢出时, 返回 `Err(ConfigError::NonFinite)`;
    /// - `lower == upper` 时返回 `Err(ConfigError::DegenerateWindow)`;
    /// - `lower > upper` 时返回 `Err(ConfigError::InvertedWindow)`;
    /// - `out_min > out_max` 时返回 `Err(ConfigError::InvertedRange)`;
    /// - 其他情况下成功.
    pub fn new(lower: f32, upper: f32, out_min: f32, out_max: f32) -> Result<Self, ConfigError> {
        if ![lower, upper, out_min, out_max, upper - lower, out_max - out_min]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::NonFinite);
        }
        if lower == upper {
            return Err(ConfigError::DegenerateWindow(lower));
        }
        if lower > upper {
            return Err(ConfigError::InvertedWindow { lower, upper });
        }
        if out_min > out_max {
            return Err(ConfigError::InvertedRange {
                min: out_min,
                max: out_max,
            });
        }
        Ok(Self {
            lower,
            upper,
            out_min,
            out_max,
        })
    }

    /// 以窗位 `level` 和窗宽 `width` 构建强度窗口. 校验规则同 [`IntensityWindow::new`].
    #[inline]
    pub fn from_level_width(
        level: f32,
        width: f32,
        out_min: f32,
        out_max: f32,
    ) -> Result<Self, ConfigError> {
        Self::new(level - width / 2.0, level + width / 2.0, out_min, out_max)
    }

    /// 构建一个便于展示扫描图像肝脏结构的强度窗口. 该窗口的窗位为
    /// 60, 窗宽为 200, 输出范围为 `[0, 255]`.
    #[inline]
    pub const fn from_liver_visual() -> Self {
        Self {
            lower: LIVER_LOWER,
            upper: LIVER_UPPER,
            out_min: OUTPUT_MIN,
            out_max: OUTPUT_MAX,
        }
    }

    /// 替换输入窗口下限.
    #[inline]
    pub fn with_lower(&self, lower: f32) -> Result<Self, ConfigError> {
        Self::new(lower, self.upper, self.out_min, self.out_max)
    }

    /// 替换输入窗口上限.
    #[inline]
    pub fn with_upper(&self, upper: f32) -> Result<Self, ConfigError> {
        Self::new(self.lower, upper, self.out_min, self.out_max)
    }

    /// 同时替换输入窗口上下限.
    #[inline]
    pub fn with_thresholds(&self, lower: f32, upper: f32) -> Result<Self, ConfigError> {
        Self::new(lower, upper, self.out_min, self.out_max)
    }

    /// 替换输出范围.
    #[inline]
    pub fn with_output_range(&self, out_min: f32, out_max: f32) -> Result<Self, ConfigError> {
        Self::new(self.lower, self.upper, out_min, out_max)
    }

    /// 输入窗口下限.
    #[inline]
    pub fn lower(&self) -> f32 {
        self.lower
    }

    /// 输入窗口上限.
    #[inline]
    pub fn upper(&self) -> f32 {
        self.upper
    }

    /// 输出最小值.
    #[inline]
    pub fn out_min(&self) -> f32 {
        self.out_min
    }

    /// 输出最大值.
    #[inline]
    pub fn out_max(&self) -> f32 {
        self.out_max
    }

    /// 窗位.
    #[inline]
    pub fn level(&self) -> f32 {
        (self.lower + self.upper) / 2.0
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// 映射单个体素值.
    ///
    /// 窗口下限及以下映射为 `out_min`, 上限及以上映射为 `out_max`,
    /// 窗口内部线性缩放后截断到输出范围以吸收浮点误差.
    /// NaN 被映射为 `out_min`.
    ///
    /// 两条执行路径都调用本函数, 因此结果逐位相同.
    #[inline]
    pub fn map(&self, v: f32) -> f32 {
        if v.is_nan() || v <= self.lower {
            return self.out_min;
        }
        if v >= self.upper {
            return self.out_max;
        }
        let out = self.out_min
            + (v - self.lower) * (self.out_max - self.out_min) / (self.upper - self.lower);
        out.clamp(self.out_min, self.out_max)
    }
}

/// `serde` 中转结构, 反序列化时经过校验.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawWindow {
    lower: f32,
    upper: f32,
    out_min: f32,
    out_max: f32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawWindow> for IntensityWindow {
    type Error = ConfigError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        IntensityWindow::new(raw.lower, raw.upper, raw.out_min, raw.out_max)
    }
}

#[cfg(feature = "serde")]
impl From<IntensityWindow> for RawWindow {
    fn from(w: IntensityWindow) -> Self {
        RawWindow {
            lower: w.lower,
            upper: w.upper,
            out_min: w.out_min,
            out_max: w.out_max,
        }
    }
}
