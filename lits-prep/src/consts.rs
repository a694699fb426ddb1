//! 通用常量.

/// 单通道标签值.
pub mod gray {
    /// 原 LiTS 数据集中, 背景的体素值.
    pub const LITS_BACKGROUND: u8 = 0;

    /// 原 LiTS 数据集中, 肝脏的体素值.
    pub const LITS_LIVER: u8 = 1;

    /// 原 LiTS 数据集中, 肿瘤的体素值.
    pub const LITS_TUMOR: u8 = 2;

    /// 体素是否是肝脏或肿瘤?
    #[inline]
    pub const fn is_liver_or_tumor(p: u8) -> bool {
        matches!(p, LITS_LIVER | LITS_TUMOR)
    }
}

/// 轴相关常量.
pub mod axis {
    /// 左右方向的标准轴索引.
    ///
    /// 放射科与神经科的阅片习惯相反, 该轴在 header 中记录的方向不可信,
    /// 因此从不根据它翻转.
    pub const LEFT_RIGHT: usize = 0;

    /// 方向可信的标准轴 (高, 深).
    pub const TRUSTED_SIGN_AXES: [usize; 2] = [1, 2];
}

/// 强度窗口默认值.
pub mod window {
    /// 默认输出最小值.
    pub const OUTPUT_MIN: f32 = 0.0;

    /// 默认输出最大值.
    pub const OUTPUT_MAX: f32 = 255.0;

    /// 肝脏可视化窗口窗位.
    pub const LIVER_LEVEL: f32 = 60.0;

    /// 肝脏可视化窗口窗宽.
    pub const LIVER_WIDTH: f32 = 200.0;

    /// 肝脏可视化窗口下限.
    pub const LIVER_LOWER: f32 = LIVER_LEVEL - LIVER_WIDTH / 2.0;

    /// 肝脏可视化窗口上限.
    pub const LIVER_UPPER: f32 = LIVER_LEVEL + LIVER_WIDTH / 2.0;
}
