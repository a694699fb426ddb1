//! 轴顺序与轴方向.
//!
//! 一个 3D 缓冲区有三个物理轴: 0 = 宽 (x, 内存中变化最快), 1 = 高 (y), 2 = 深 (z, 切片索引).
//! 标准轴 (canonical axis) 则是解剖学意义上的三个方向: 0 = 左右, 1 = 前后, 2 = 上下.
//!
//! [`AxisSpec`] 描述标准轴 `i` 存储在哪个物理轴上 (`order[i]`),
//! 以及沿该物理轴遍历时是否与标准方向一致 (`sign[i]`).

use crate::error::ConfigError;

/// 轴方向.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    /// +1, 与标准方向一致.
    Pos,

    /// -1, 与标准方向相反.
    Neg,
}

impl Sign {
    /// 从 `+1` / `-1` 构建. 其他值返回 `None`.
    #[inline]
    pub const fn from_unit(v: i16) -> Option<Sign> {
        match v {
            1 => Some(Sign::Pos),
            -1 => Some(Sign::Neg),
            _ => None,
        }
    }

    /// 转换为 `+1` / `-1`.
    #[inline]
    pub const fn as_unit(self) -> i16 {
        match self {
            Sign::Pos => 1,
            Sign::Neg => -1,
        }
    }

    /// 相反方向.
    #[inline]
    pub const fn flipped(self) -> Sign {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }
}

/// 经过校验的轴描述: `order` 一定是 {0, 1, 2} 的排列, `sign` 一定是 ±1.
///
/// 该结构是只读的值类型. 若要修改, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawAxisSpec", into = "RawAxisSpec"))]
pub struct AxisSpec {
    order: [usize; 3],
    sign: [Sign; 3],
}

impl Default for AxisSpec {
    #[inline]
    fn default() -> Self {
        Self::HOME
    }
}

impl AxisSpec {
    /// 标准方向: 顺序为 `[0, 1, 2]`, 方向为 `[+1, +1, +1]`.
    pub const HOME: AxisSpec = AxisSpec {
        order: [0, 1, 2],
        sign: [Sign::Pos; 3],
    };

    /// 构建轴描述.
    ///
    /// 如果 `order` 不是 {0, 1, 2} 的排列, 返回 `Err(ConfigError::NotPermutation)`.
    pub fn new(order: [usize; 3], sign: [Sign; 3]) -> Result<Self, ConfigError> {
        let mut seen = [false; 3];
        for &axis in order.iter() {
            match seen.get_mut(axis) {
                Some(s) if !*s => *s = true,
                _ => return Err(ConfigError::NotPermutation(order)),
            }
        }
        Ok(Self { order, sign })
    }

    /// 从裸数组构建轴描述, 方向以 `+1` / `-1` 给出.
    ///
    /// 除 [`AxisSpec::new`] 的校验外, 任一方向不是 ±1 时返回
    /// `Err(ConfigError::InvalidSign)`.
    pub fn from_raw(order: [usize; 3], sign: [i16; 3]) -> Result<Self, ConfigError> {
        let mut s = [Sign::Pos; 3];
        for (dst, &v) in s.iter_mut().zip(sign.iter()) {
            *dst = Sign::from_unit(v).ok_or(ConfigError::InvalidSign(v))?;
        }
        Self::new(order, s)
    }

    /// 标准轴到物理轴的映射.
    #[inline]
    pub fn order(&self) -> [usize; 3] {
        self.order
    }

    /// 各标准轴的方向.
    #[inline]
    pub fn sign(&self) -> [Sign; 3] {
        self.sign
    }

    /// 以 `+1` / `-1` 表示的各标准轴方向.
    #[inline]
    pub fn sign_units(&self) -> [i16; 3] {
        self.sign.map(Sign::as_unit)
    }

    /// 标准轴 `canonical` 所在的物理轴. `canonical >= 3` 时 panic.
    #[inline]
    pub fn axis_of(&self, canonical: usize) -> usize {
        self.order[canonical]
    }

    /// 标准轴 `canonical` 的方向. `canonical >= 3` 时 panic.
    #[inline]
    pub fn sign_of(&self, canonical: usize) -> Sign {
        self.sign[canonical]
    }

    /// 物理轴 `physical` 上存放的标准轴, 即 `order` 的逆映射.
    #[inline]
    pub fn canonical_of(&self, physical: usize) -> usize {
        // order 是排列, 一定能找到.
        self.order.iter().position(|&a| a == physical).unwrap_or(physical)
    }

    /// 返回将标准轴 `canonical` 的方向替换为 `sign` 后的新描述.
    #[inline]
    pub fn with_sign(mut self, canonical: usize, sign: Sign) -> Self {
        self.sign[canonical] = sign;
        self
    }

    /// 是否是标准方向?
    #[inline]
    pub fn is_home(&self) -> bool {
        *self == Self::HOME
    }
}

/// `serde` 中转结构, 反序列化时经过校验.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawAxisSpec {
    order: [usize; 3],
    sign: [i16; 3],
}

#[cfg(feature = "serde")]
impl TryFrom<RawAxisSpec> for AxisSpec {
    type Error = ConfigError;

    fn try_from(raw: RawAxisSpec) -> Result<Self, Self::Error> {
        AxisSpec::from_raw(raw.order, raw.sign)
    }
}

#[cfg(feature = "serde")]
impl From<AxisSpec> for RawAxisSpec {
    fn from(spec: AxisSpec) -> Self {
        RawAxisSpec {
            order: spec.order,
            sign: spec.sign_units(),
        }
    }
}

/// 枚举所有合法的轴描述 (6 种排列 × 8 种方向). 测试用.
#[cfg(test)]
pub(crate) fn all_specs() -> Vec<AxisSpec> {
    use itertools::iproduct;

    const PERMS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    iproduct!(PERMS, [1, -1], [1, -1], [1, -1])
        .map(|(order, s0, s1, s2)| AxisSpec::from_raw(order, [s0, s1, s2]).unwrap())
        .collect()
}
