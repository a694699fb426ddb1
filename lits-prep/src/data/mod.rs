use std::ops::{Index, IndexMut};

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};
use num::Zero;

use crate::error::PreconditionError;
use crate::Idx3d;

pub mod axis;
pub mod scan;
pub mod window;

mod header;

pub use axis::{AxisSpec, Sign};
pub use scan::{LitsScan, Scan};
pub use window::IntensityWindow;

/// 体素元素类型. 目前为 `f32` (CT HU 值) 和 `u8` (分割标签).
///
/// 几何变换只依赖元素宽度, 对两种类型完全相同.
pub trait Voxel: Copy + Zero + PartialEq + Send + Sync + std::fmt::Debug + 'static {}

impl Voxel for f32 {}

impl Voxel for u8 {}

/// 稠密的 3D 体素缓冲区, 带有显式的 (宽, 高, 深) 尺寸.
///
/// 内部以形状为 `(深, 高, 宽)` 的标准布局 [`Array3`] 存储,
/// 因此宽方向在内存中变化最快. 对外的索引一律为 `(x, y, z)`,
/// 即 (宽, 高, 深) 方向上的坐标.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelBuffer<T> {
    data: Array3<T>,
}

impl<T: Voxel> VoxelBuffer<T> {
    /// 从宽方向变化最快的裸数据创建缓冲区. `dims` 为 (宽, 高, 深).
    ///
    /// 若 `data.len()` 与 `dims` 不符, 返回 `Err(PreconditionError::ShapeMismatch)`.
    pub fn new(dims: Idx3d, data: Vec<T>) -> Result<Self, PreconditionError> {
        let (w, h, d) = dims;
        let len = data.len();
        if w.checked_mul(h).and_then(|p| p.checked_mul(d)) != Some(len) {
            return Err(PreconditionError::ShapeMismatch { dims, len });
        }
        let data = Array3::from_shape_vec((d, h, w), data)
            .map_err(|_| PreconditionError::ShapeMismatch { dims, len })?;
        Ok(Self { data })
    }

    /// 创建全零缓冲区.
    #[inline]
    pub fn zeros((w, h, d): Idx3d) -> Self {
        Self {
            data: Array3::zeros((d, h, w)),
        }
    }

    /// 以 `f((x, y, z))` 的值填充创建缓冲区.
    pub fn from_fn<F: FnMut(Idx3d) -> T>((w, h, d): Idx3d, mut f: F) -> Self {
        Self {
            data: Array3::from_shape_fn((d, h, w), |(z, y, x)| f((x, y, z))),
        }
    }

    /// 从形状为 `(深, 高, 宽)` 的数组创建. 非标准布局的数组会被复制成标准布局.
    ///
    /// 底层存储大于数组本身时 (例如 `slice_move` 之后), 多余的元素会被丢弃,
    /// 保证缓冲区的存储恰好是数组的全部体素.
    pub fn from_array(data: Array3<T>) -> Self {
        if !data.is_standard_layout() {
            return Self {
                data: data.as_standard_layout().into_owned(),
            };
        }
        let dim = data.raw_dim();
        let (len, start) = (data.len(), data.as_ptr() as usize);
        let mut raw = data.into_raw_vec();
        if raw.len() != len {
            let offset = start.saturating_sub(raw.as_ptr() as usize) / std::mem::size_of::<T>();
            raw.drain(..offset.min(raw.len()));
            raw.truncate(len);
        }
        let data = Array3::from_shape_vec(dim, raw).expect("标准布局数组的元素个数与形状不符");
        Self { data }
    }

    /// 尺寸 (宽, 高, 深).
    #[inline]
    pub fn dims(&self) -> Idx3d {
        let (d, h, w) = self.data.dim();
        (w, h, d)
    }

    /// 宽.
    #[inline]
    pub fn width(&self) -> usize {
        self.dims().0
    }

    /// 高.
    #[inline]
    pub fn height(&self) -> usize {
        self.dims().1
    }

    /// 深, 即水平切片个数.
    #[inline]
    pub fn depth(&self) -> usize {
        self.dims().2
    }

    /// 体素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 缓冲区是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获取 `(x, y, z)` 处的体素. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, (x, y, z): Idx3d) -> Option<&T> {
        self.data.get((z, y, x))
    }

    /// 宽方向变化最快的连续内存.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // 构造时保证了标准布局, 不会失败.
        self.data.as_slice().unwrap_or_default()
    }

    /// 宽方向变化最快的可变连续内存.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        // 构造时保证了标准布局, 不会失败.
        self.data.as_slice_mut().unwrap_or_default()
    }

    /// 形状为 `(深, 高, 宽)` 的不可变视图.
    #[inline]
    pub fn view(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    /// 形状为 `(深, 高, 宽)` 的可变视图.
    #[inline]
    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, T> {
        self.data.view_mut()
    }

    /// 第 `z` 层水平切片, 形状为 `(高, 宽)`. 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z: usize) -> ArrayView2<'_, T> {
        self.data.index_axis(Axis(0), z)
    }

    /// 第 `z` 层可变水平切片, 形状为 `(高, 宽)`. 越界时 panic.
    #[inline]
    pub fn slice_at_mut(&mut self, z: usize) -> ArrayViewMut2<'_, T> {
        self.data.index_axis_mut(Axis(0), z)
    }

    /// 取出底层数组, 形状为 `(深, 高, 宽)`.
    #[inline]
    pub fn into_array(self) -> Array3<T> {
        self.data
    }

    /// 取出宽方向变化最快的裸数据.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data.into_raw_vec()
    }
}

impl<T: Voxel> Index<Idx3d> for VoxelBuffer<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, z): Idx3d) -> &Self::Output {
        &self.data[(z, y, x)]
    }
}

impl<T: Voxel> IndexMut<Idx3d> for VoxelBuffer<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): Idx3d) -> &mut Self::Output {
        &mut self.data[(z, y, x)]
    }
}

#[cfg(test)]
mod tests {
    use super::VoxelBuffer;
    use crate::error::PreconditionError;

    #[test]
    fn test_buffer_shape_mismatch() {
        let e = VoxelBuffer::<u8>::new((2, 3, 4), vec![0; 23]).unwrap_err();
        assert_eq!(
            e,
            PreconditionError::ShapeMismatch {
                dims: (2, 3, 4),
                len: 23
            }
        );
        assert!(VoxelBuffer::<f32>::new((usize::MAX, 2, 1), vec![]).is_err());
    }

    #[test]
    fn test_buffer_layout() {
        // x 变化最快.
        let b = VoxelBuffer::new((3, 2, 2), (0..12).map(|v| v as f32).collect()).unwrap();
        assert_eq!(b.dims(), (3, 2, 2));
        assert_eq!(b[(0, 0, 0)], 0.0);
        assert_eq!(b[(1, 0, 0)], 1.0);
        assert_eq!(b[(0, 1, 0)], 3.0);
        assert_eq!(b[(0, 0, 1)], 6.0);
        assert_eq!(b[(2, 1, 1)], 11.0);
        assert_eq!(b.get((3, 0, 0)), None);
        assert_eq!(b.slice_at(1)[(1, 2)], 11.0);
        assert_eq!(b.as_slice().len(), 12);
    }

    #[test]
    fn test_buffer_from_fn() {
        let b = VoxelBuffer::<u8>::from_fn((4, 3, 2), |(x, y, z)| (x + 10 * y + 100 * z) as u8);
        assert_eq!(b[(3, 2, 1)], 123);
        let v = b.clone().into_vec();
        assert_eq!(v[3 + 4 * (2 + 3 * 1)], 123);
        assert_eq!(VoxelBuffer::new((4, 3, 2), v).unwrap(), b);
    }

    #[test]
    fn test_buffer_from_non_standard_array() {
        let a = ndarray::Array3::<u8>::from_shape_fn((2, 3, 4), |(z, y, x)| (x + y + z) as u8);
        let t = a.clone().reversed_axes();
        let b = VoxelBuffer::from_array(t);
        assert_eq!(b.dims(), (2, 3, 4));
        assert!(b.view().is_standard_layout());
        assert_eq!(b[(1, 2, 3)], a[(1, 2, 3)]);
    }

    /// 切片后的数组: 存储中切片以外的元素不能泄漏到裸数据中.
    #[test]
    fn test_buffer_from_sliced_array() {
        use ndarray::s;

        let a = ndarray::Array3::<u8>::from_shape_fn((4, 3, 5), |(z, y, x)| {
            (x + 5 * y + 15 * z) as u8
        });
        let sliced = a.slice_move(s![1..3, .., ..]);
        assert!(sliced.is_standard_layout());
        let b = VoxelBuffer::from_array(sliced);
        assert_eq!(b.dims(), (5, 3, 2));
        assert_eq!(b.as_slice(), (15..45).collect::<Vec<u8>>().as_slice());
        assert_eq!(b.clone().into_vec(), (15..45).collect::<Vec<u8>>());

        let last = ndarray::Array3::<f32>::zeros((3, 2, 2)).slice_move(s![2.., .., ..]);
        assert_eq!(VoxelBuffer::from_array(last).into_vec().len(), 4);

        let empty = ndarray::Array3::<u8>::zeros((3, 2, 2)).slice_move(s![1..1, .., ..]);
        assert!(VoxelBuffer::from_array(empty).into_vec().is_empty());
    }
}
