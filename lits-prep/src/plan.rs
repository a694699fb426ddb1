//! 方向规划: 比较当前与期望的 [`AxisSpec`], 得出需要的轴排列与翻转.
//!
//! # 策略
//!
//! 三个轴的 **顺序** 都是可信的, 但只有后两个标准轴 (前后, 上下) 的 **方向** 可信.
//! 左右轴的方向标记存在放射科与神经科两种阅片习惯, 不可靠, 因此在翻转判断中永远视为一致.
//!
//! # 复合索引映射
//!
//! 规划的结果可以直接表达为一次性的索引映射: 输出物理轴 `j` 读取输入物理轴 `source[j]`,
//! 若 `flip[j]` 为真则反向遍历. 即
//!
//! ```text
//! out_dim[j]       = in_dim[source[j]]
//! in_idx[source[j]] = if flip[j] { out_dim[j] - 1 - out_idx[j] } else { out_idx[j] }
//! ```

use crate::consts::axis::{LEFT_RIGHT, TRUSTED_SIGN_AXES};
use crate::data::AxisSpec;
use crate::Idx3d;

/// 方向规划结果. 临时对象, 不持久化.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OrientationPlan {
    current: AxisSpec,
    desired: AxisSpec,
    needs_permute: bool,
    needs_flip: bool,
    /// 输出物理轴 -> 输入物理轴.
    source: [usize; 3],
    /// 输出物理轴是否需要反向遍历.
    flip: [bool; 3],
}

impl OrientationPlan {
    /// 比较 `current` 与 `desired` 并生成规划. 纯函数, 对所有合法输入都有定义.
    pub fn new(current: &AxisSpec, desired: &AxisSpec) -> Self {
        let needs_permute = current.order() != desired.order();
        let needs_flip = TRUSTED_SIGN_AXES
            .iter()
            .any(|&i| current.sign_of(i) != desired.sign_of(i));

        let mut source = [0; 3];
        let mut flip = [false; 3];
        for canonical in 0..3 {
            let j = desired.axis_of(canonical);
            source[j] = current.axis_of(canonical);
            flip[j] =
                canonical != LEFT_RIGHT && current.sign_of(canonical) != desired.sign_of(canonical);
        }

        Self {
            current: *current,
            desired: *desired,
            needs_permute,
            needs_flip,
            source,
            flip,
        }
    }

    /// 是否需要重排轴?
    #[inline]
    pub fn needs_permute(&self) -> bool {
        self.needs_permute
    }

    /// 是否需要翻转 (不考虑左右轴)?
    #[inline]
    pub fn needs_flip(&self) -> bool {
        self.needs_flip
    }

    /// 是否什么都不用做?
    #[inline]
    pub fn is_identity(&self) -> bool {
        !self.needs_permute && !self.needs_flip
    }

    /// 源轴描述.
    #[inline]
    pub fn current(&self) -> &AxisSpec {
        &self.current
    }

    /// 目标轴描述.
    #[inline]
    pub fn desired(&self) -> &AxisSpec {
        &self.desired
    }

    /// 输出物理轴 `j` 读取的输入物理轴.
    #[inline]
    pub fn source(&self) -> [usize; 3] {
        self.source
    }

    /// 输出物理轴 `j` 是否反向遍历.
    #[inline]
    pub fn flip(&self) -> [bool; 3] {
        self.flip
    }

    /// 反向变换的规划. 依次应用 `self` 和 `self.inverse()` 得到原数据.
    #[inline]
    pub fn inverse(&self) -> Self {
        Self::new(&self.desired, &self.current)
    }

    /// 根据输入尺寸 (宽, 高, 深) 求输出尺寸.
    #[inline]
    pub fn output_dims(&self, (w, h, d): Idx3d) -> Idx3d {
        let dims = [w, h, d];
        let [a, b, c] = self.source;
        (dims[a], dims[b], dims[c])
    }

    /// 复合索引映射: 已知输出尺寸 `out_dims`, 求输出体素 `out` 对应的输入体素坐标.
    #[inline]
    pub fn source_index(&self, out: Idx3d, out_dims: Idx3d) -> Idx3d {
        let out = [out.0, out.1, out.2];
        let out_dims = [out_dims.0, out_dims.1, out_dims.2];
        let mut src = [0; 3];
        for j in 0..3 {
            src[self.source[j]] = if self.flip[j] {
                out_dims[j] - 1 - out[j]
            } else {
                out[j]
            };
        }
        (src[0], src[1], src[2])
    }
}
