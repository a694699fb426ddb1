//! 从 nifti header 推断轴描述.
//!
//! nifti 的世界坐标系为 RAS+: 标准轴 0 由左指向右, 1 由后指向前, 2 由下指向上.
//! 方向矩阵的第 `j` 列描述了物理轴 `j` 在世界坐标系中的指向,
//! 取其绝对值最大的分量即可确定该物理轴承载的标准轴与方向.

use nifti::NiftiHeader;

use super::axis::{AxisSpec, Sign};
use crate::error::ScanError;

type Mat3 = [[f64; 3]; 3];

/// 获取 header 的 3×3 方向矩阵 (未归一化, 只关心符号与相对大小).
///
/// 优先使用 sform, 其次是 qform 四元数, 都不存在时按 nifti "method 0" 视为单位阵.
fn direction_matrix(header: &NiftiHeader) -> Mat3 {
    if header.sform_code > 0 {
        let row = |r: &[f32; 4]| [r[0] as f64, r[1] as f64, r[2] as f64];
        [
            row(&header.srow_x),
            row(&header.srow_y),
            row(&header.srow_z),
        ]
    } else if header.qform_code > 0 {
        quatern_to_mat(
            header.quatern_b as f64,
            header.quatern_c as f64,
            header.quatern_d as f64,
            header.pixdim[0] as f64,
        )
    } else {
        [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
    }
}

/// nifti 四元数 `(b, c, d)` 与 `qfac` 转换为旋转矩阵.
fn quatern_to_mat(b: f64, c: f64, d: f64, qfac: f64) -> Mat3 {
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
    // qfac 只能是 ±1, 0 视为 1.
    let q = if qfac < 0.0 { -1.0 } else { 1.0 };
    [
        [
            a * a + b * b - c * c - d * d,
            2.0 * (b * c - a * d),
            q * 2.0 * (b * d + a * c),
        ],
        [
            2.0 * (b * c + a * d),
            a * a + c * c - b * b - d * d,
            q * 2.0 * (c * d - a * b),
        ],
        [
            2.0 * (b * d - a * c),
            2.0 * (c * d + a * b),
            q * (a * a + d * d - c * c - b * b),
        ],
    ]
}

/// 由方向矩阵推断轴描述.
fn axes_from_matrix(m: &Mat3) -> Result<AxisSpec, ScanError> {
    let mut order = [usize::MAX; 3];
    let mut sign = [Sign::Pos; 3];
    for j in 0..3 {
        let (canonical, v) = (0..3)
            .map(|i| (i, m[i][j]))
            .fold((0, 0.0f64), |best, cur| {
                if cur.1.abs() > best.1.abs() {
                    cur
                } else {
                    best
                }
            });
        if v == 0.0 || order[canonical] != usize::MAX {
            return Err(ScanError::AmbiguousOrientation);
        }
        order[canonical] = j;
        sign[canonical] = if v > 0.0 { Sign::Pos } else { Sign::Neg };
    }
    AxisSpec::new(order, sign).map_err(|_| ScanError::AmbiguousOrientation)
}

/// 从 nifti header 推断物理轴的轴描述.
///
/// # 返回值
///
/// 方向矩阵存在零列, 或两个物理轴指向同一个标准轴 (例如 45° 斜切)
/// 时返回 `Err(ScanError::AmbiguousOrientation)`.
pub(crate) fn axes_from_header(header: &NiftiHeader) -> Result<AxisSpec, ScanError> {
    axes_from_matrix(&direction_matrix(header))
}
