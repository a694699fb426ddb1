use super::Backend;
use crate::data::{IntensityWindow, Voxel, VoxelBuffer};
use crate::median::{clamp_to_edge, median_of, KernelSize};
use crate::plan::OrientationPlan;
use crate::{Idx2d, Idx3d};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;
    }
}

/// 加速执行路径. 直接在连续内存上运行逐体素内核.
///
/// 启用 `rayon` feature 时, 每个操作都以 parallel-for 的方式在所有体素上展开,
/// 体素之间没有任何顺序依赖; 否则按相同的内核顺序执行.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Accelerated;

/// 线性索引 -> `(x, y, z)`.
#[inline]
fn unravel(n: usize, (w, h, _): Idx3d) -> Idx3d {
    (n % w, (n / w) % h, n / (w * h))
}

/// `(x, y, z)` -> 线性索引.
#[inline]
fn ravel((x, y, z): Idx3d, (w, h, _): Idx3d) -> usize {
    x + w * (y + h * z)
}

/// 在一个水平切片 `plane` 上求 `(x, y)` 处的邻域中值.
#[inline]
fn median_at(
    plane: &[f32],
    (w, h): Idx2d,
    (x, y): Idx2d,
    k: KernelSize,
    scratch: &mut Vec<f32>,
) -> f32 {
    let r = k.radius();
    scratch.clear();
    for dy in 0..k.get() {
        let row = clamp_to_edge(y, dy, r, h) * w;
        for dx in 0..k.get() {
            scratch.push(plane[row + clamp_to_edge(x, dx, r, w)]);
        }
    }
    median_of(scratch)
}

impl Backend for Accelerated {
    #[inline]
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn normalize(&self, volume: &mut VoxelBuffer<f32>, window: &IntensityWindow) {
        let kernel = |v: &mut f32| *v = window.map(*v);
        #[cfg(feature = "rayon")]
        volume.as_slice_mut().par_iter_mut().for_each(kernel);
        #[cfg(not(feature = "rayon"))]
        volume.as_slice_mut().iter_mut().for_each(kernel);
    }

    fn reorient<T: Voxel>(
        &self,
        buffer: &VoxelBuffer<T>,
        plan: &OrientationPlan,
    ) -> VoxelBuffer<T> {
        if plan.is_identity() {
            return buffer.clone();
        }
        let in_dims = buffer.dims();
        let out_dims = plan.output_dims(in_dims);
        let src = buffer.as_slice();

        // 单次复合索引映射: 每个输出体素恰好读取一个输入体素.
        let kernel = |(n, v): (usize, &mut T)| {
            let pos = plan.source_index(unravel(n, out_dims), out_dims);
            *v = src[ravel(pos, in_dims)];
        };

        let mut out = VoxelBuffer::zeros(out_dims);
        #[cfg(feature = "rayon")]
        out.as_slice_mut().par_iter_mut().enumerate().for_each(kernel);
        #[cfg(not(feature = "rayon"))]
        out.as_slice_mut().iter_mut().enumerate().for_each(kernel);
        out
    }

    fn median(&self, volume: &mut VoxelBuffer<f32>, k: KernelSize) {
        if k.is_trivial() || volume.is_empty() {
            return;
        }
        let (w, h, _) = volume.dims();
        let plane_len = w * h;
        // 读写缓冲区分离, 避免同一切片内的读后写冲突.
        let src = volume.as_slice().to_vec();

        let kernel = |scratch: &mut Vec<f32>, (n, v): (usize, &mut f32)| {
            let z = n / plane_len;
            let i = n % plane_len;
            let plane = &src[z * plane_len..(z + 1) * plane_len];
            *v = median_at(plane, (w, h), (i % w, i / w), k, scratch);
        };

        #[cfg(feature = "rayon")]
        volume
            .as_slice_mut()
            .par_iter_mut()
            .enumerate()
            .for_each_init(|| Vec::with_capacity(k.area()), kernel);
        #[cfg(not(feature = "rayon"))]
        {
            let mut scratch = Vec::with_capacity(k.area());
            volume
                .as_slice_mut()
                .iter_mut()
                .enumerate()
                .for_each(|item| kernel(&mut scratch, item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ravel, unravel};

    #[test]
    fn test_ravel_unravel() {
        let dims = (3, 4, 5);
        for n in 0..60 {
            assert_eq!(ravel(unravel(n, dims), dims), n);
        }
        assert_eq!(unravel(3 + 3 * 2 + 12 * 4, dims), (0, 3, 4));
    }
}
