//! 扫描: 预处理器的数据来源与去处.

use std::path::Path;

use log::debug;
use ndarray::ArrayD;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use super::header::axes_from_header;
use super::{AxisSpec, Voxel, VoxelBuffer};
use crate::error::{PreconditionError, ScanError};

/// 预处理器操作的扫描.
///
/// 缓冲区由扫描拥有, 预处理器在一次调用期间借用它们,
/// 并在形状改变时通过 `set_*` 方法整体替换.
pub trait Scan {
    /// CT 扫描体 (HU 值).
    fn volume(&self) -> &VoxelBuffer<f32>;

    /// 可变的 CT 扫描体.
    fn volume_mut(&mut self) -> &mut VoxelBuffer<f32>;

    /// 扫描体当前的轴描述.
    fn volume_axes(&self) -> AxisSpec;

    /// 以变换后的扫描体及其轴描述替换原数据.
    fn set_volume(&mut self, volume: VoxelBuffer<f32>, axes: AxisSpec);

    /// 分割标注. 不存在时返回 `None`.
    fn segment(&self) -> Option<&VoxelBuffer<u8>>;

    /// 分割标注当前的轴描述. 不存在标注时返回 `None`.
    fn segment_axes(&self) -> Option<AxisSpec>;

    /// 以变换后的分割标注及其轴描述替换原数据.
    fn set_segment(&mut self, segment: VoxelBuffer<u8>, axes: AxisSpec);
}

/// LiTS 格式的 3D CT 扫描, 以及可选的分割标注.
///
/// 训练集扫描带有标注 (`segmentation-*.nii`), 测试集扫描没有.
#[derive(Debug, Clone)]
pub struct LitsScan {
    volume: VoxelBuffer<f32>,
    volume_axes: AxisSpec,
    segment: Option<(VoxelBuffer<u8>, AxisSpec)>,
}

/// 将 nifti 的 `[W, H, D]` 数组转换为缓冲区.
fn into_buffer<T: Voxel>(data: ArrayD<T>, ndim: u16) -> Result<VoxelBuffer<T>, ScanError> {
    if data.ndim() != 3 {
        return Err(ScanError::NotVolume(ndim));
    }
    // [W, H, D] -> [D, H, W]
    let data = data.permuted_axes([2, 1, 0].as_slice());
    let (d, h, w) = (data.shape()[0], data.shape()[1], data.shape()[2]);

    // The nature of nifti data field layout: 通常已是标准布局, 可以避免一次复制.
    let raw = if data.is_standard_layout() {
        data.into_raw_vec()
    } else {
        data.iter().copied().collect()
    };
    Ok(VoxelBuffer::new((w, h, d), raw)?)
}

/// 读取 nifti 扫描体.
fn read_volume(path: &Path) -> Result<(VoxelBuffer<f32>, AxisSpec), ScanError> {
    let obj = ReaderOptions::new().read_file(path)?;
    let axes = axes_from_header(obj.header())?;
    let ndim = obj.header().dim[0];
    let data = obj.into_volume().into_ndarray::<f32>()?;
    Ok((into_buffer(data, ndim)?, axes))
}

/// 读取 nifti 分割标注.
fn read_segment(path: &Path) -> Result<(VoxelBuffer<u8>, AxisSpec), ScanError> {
    let obj = ReaderOptions::new().read_file(path)?;
    let axes = axes_from_header(obj.header())?;
    let ndim = obj.header().dim[0];
    let data = obj.into_volume().into_ndarray::<u8>()?;
    Ok((into_buffer(data, ndim)?, axes))
}

impl LitsScan {
    /// 打开 nii 文件格式的 3D CT 扫描 (不含标注), 轴描述从 header 推断.
    pub fn open<P: AsRef<Path>>(volume_path: P) -> Result<Self, ScanError> {
        let (volume, volume_axes) = read_volume(volume_path.as_ref())?;
        debug!(
            "打开扫描 {:?}: dims = {:?}, axes = {:?}",
            volume_path.as_ref(),
            volume.dims(),
            volume_axes
        );
        Ok(Self {
            volume,
            volume_axes,
            segment: None,
        })
    }

    /// 分别打开 nii 文件格式的 3D CT 扫描和对应标注.
    ///
    /// 任一文件打开失败时返回 `Err`; 两者尺寸不一致时返回
    /// `Err(ScanError::Precondition(PreconditionError::DimsMismatch))`.
    pub fn open_with_segment<P: AsRef<Path>, Q: AsRef<Path>>(
        volume_path: P,
        segment_path: Q,
    ) -> Result<Self, ScanError> {
        let (volume, volume_axes) = read_volume(volume_path.as_ref())?;
        let segment = read_segment(segment_path.as_ref())?;
        debug!(
            "打开扫描 {:?} 与标注 {:?}: dims = {:?}, axes = {:?} / {:?}",
            volume_path.as_ref(),
            segment_path.as_ref(),
            volume.dims(),
            volume_axes,
            segment.1
        );
        Ok(Self::from_buffers(volume, volume_axes, Some(segment))?)
    }

    /// 根据内存中的缓冲区直接创建扫描.
    ///
    /// 标注与扫描尺寸不一致时返回 `Err(PreconditionError::DimsMismatch)`.
    pub fn from_buffers(
        volume: VoxelBuffer<f32>,
        volume_axes: AxisSpec,
        segment: Option<(VoxelBuffer<u8>, AxisSpec)>,
    ) -> Result<Self, PreconditionError> {
        if let Some((s, _)) = &segment {
            if s.dims() != volume.dims() {
                return Err(PreconditionError::DimsMismatch {
                    volume: volume.dims(),
                    segment: s.dims(),
                });
            }
        }
        Ok(Self {
            volume,
            volume_axes,
            segment,
        })
    }

    /// 是否带有分割标注?
    #[inline]
    pub fn has_segment(&self) -> bool {
        self.segment.is_some()
    }

    /// 获取标注的基本统计信息.
    ///
    /// 统计信息格式为: \[背景体素数, 肝脏体素数, 肿瘤体素数\].
    /// 该操作不会统计任何其他体素值. 不存在标注时返回全 0.
    pub fn label_statistics(&self) -> [usize; 3] {
        let mut ans = [0; 3];
        if let Some((s, _)) = &self.segment {
            for &pixel in s.as_slice().iter().filter(|p| **p <= 2) {
                ans[pixel as usize] += 1;
            }
        }
        ans
    }

    /// 将扫描体以 `(深, 高, 宽)` 形状写出为 npy 文件.
    pub fn write_volume_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), ScanError> {
        ndarray_npy::write_npy(path, &self.volume.view())?;
        Ok(())
    }

    /// 将标注以 `(深, 高, 宽)` 形状写出为 npy 文件.
    ///
    /// 不存在标注时返回 `Err(ScanError::Precondition(PreconditionError::MissingSegment))`.
    pub fn write_segment_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), ScanError> {
        let (s, _) = self
            .segment
            .as_ref()
            .ok_or(PreconditionError::MissingSegment)?;
        ndarray_npy::write_npy(path, &s.view())?;
        Ok(())
    }
}

impl Scan for LitsScan {
    #[inline]
    fn volume(&self) -> &VoxelBuffer<f32> {
        &self.volume
    }

    #[inline]
    fn volume_mut(&mut self) -> &mut VoxelBuffer<f32> {
        &mut self.volume
    }

    #[inline]
    fn volume_axes(&self) -> AxisSpec {
        self.volume_axes
    }

    #[inline]
    fn set_volume(&mut self, volume: VoxelBuffer<f32>, axes: AxisSpec) {
        self.volume = volume;
        self.volume_axes = axes;
    }

    #[inline]
    fn segment(&self) -> Option<&VoxelBuffer<u8>> {
        self.segment.as_ref().map(|(s, _)| s)
    }

    #[inline]
    fn segment_axes(&self) -> Option<AxisSpec> {
        self.segment.as_ref().map(|(_, a)| *a)
    }

    #[inline]
    fn set_segment(&mut self, segment: VoxelBuffer<u8>, axes: AxisSpec) {
        self.segment = Some((segment, axes));
    }
}

#[cfg(test)]
mod tests {
    use super::{into_buffer, LitsScan};
    use crate::consts::gray::*;
    use crate::data::{AxisSpec, Scan, VoxelBuffer};
    use crate::error::{PreconditionError, ScanError};
    use ndarray::{Array3, ArrayD, IxDyn, ShapeBuilder};

    #[test]
    fn test_into_buffer_fortran_layout() {
        // nifti 数据为 [W, H, D] 列优先.
        let (w, h, d) = (4, 3, 2);
        let raw: Vec<u8> = (0..24).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&[w, h, d]).f(), raw.clone()).unwrap();
        let b = into_buffer(data, 3).unwrap();
        assert_eq!(b.dims(), (4, 3, 2));
        assert_eq!(b.as_slice(), raw.as_slice());
        assert_eq!(b[(1, 2, 1)], 1 + 4 * (2 + 3));
    }

    #[test]
    fn test_into_buffer_not_volume() {
        let data = ArrayD::<f32>::zeros(IxDyn(&[2, 2, 2, 2]));
        assert!(matches!(into_buffer(data, 4), Err(ScanError::NotVolume(4))));
    }

    #[test]
    fn test_from_buffers_dims_mismatch() {
        let volume = VoxelBuffer::<f32>::zeros((2, 3, 4));
        let segment = VoxelBuffer::<u8>::zeros((3, 2, 4));
        let e = LitsScan::from_buffers(volume, AxisSpec::HOME, Some((segment, AxisSpec::HOME)))
            .unwrap_err();
        assert_eq!(
            e,
            PreconditionError::DimsMismatch {
                volume: (2, 3, 4),
                segment: (3, 2, 4)
            }
        );
    }

    #[test]
    fn test_label_statistics() {
        let volume = VoxelBuffer::<f32>::zeros((3, 2, 1));
        let segment =
            VoxelBuffer::new((3, 2, 1), vec![LITS_BACKGROUND, 1, 1, 2, 7, LITS_LIVER]).unwrap();
        let s =
            LitsScan::from_buffers(volume.clone(), AxisSpec::HOME, Some((segment, AxisSpec::HOME)))
                .unwrap();
        assert!(s.has_segment());
        assert_eq!(s.label_statistics(), [1, 3, 1]);
        assert_eq!(
            s.segment()
                .unwrap()
                .as_slice()
                .iter()
                .filter(|p| is_liver_or_tumor(**p))
                .count(),
            4
        );

        let s = LitsScan::from_buffers(volume, AxisSpec::HOME, None).unwrap();
        assert_eq!(s.label_statistics(), [0; 3]);
        assert_eq!(s.segment_axes(), None);
    }

    #[test]
    fn test_write_npy() {
        let dir = tempfile::tempdir().unwrap();
        let volume = VoxelBuffer::from_fn((4, 3, 2), |(x, y, z)| (x * 100 + y * 10 + z) as f32);
        let segment = VoxelBuffer::from_fn((4, 3, 2), |(x, _, _)| (x % 3) as u8);
        let s = LitsScan::from_buffers(
            volume.clone(),
            AxisSpec::HOME,
            Some((segment.clone(), AxisSpec::HOME)),
        )
        .unwrap();

        let vp = dir.path().join("volume.npy");
        let sp = dir.path().join("segment.npy");
        s.write_volume_npy(&vp).unwrap();
        s.write_segment_npy(&sp).unwrap();

        let v: Array3<f32> = ndarray_npy::read_npy(&vp).unwrap();
        assert_eq!(v, volume.into_array());
        let l: Array3<u8> = ndarray_npy::read_npy(&sp).unwrap();
        assert_eq!(l, segment.into_array());

        let no_seg =
            LitsScan::from_buffers(VoxelBuffer::zeros((1, 1, 1)), AxisSpec::HOME, None).unwrap();
        assert!(matches!(
            no_seg.write_segment_npy(dir.path().join("x.npy")),
            Err(ScanError::Precondition(PreconditionError::MissingSegment))
        ));
    }
}
