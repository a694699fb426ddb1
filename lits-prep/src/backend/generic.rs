use itertools::iproduct;
use ndarray::{Axis, Zip};

use super::Backend;
use crate::data::{IntensityWindow, Voxel, VoxelBuffer};
use crate::median::{clamp_to_edge, median_of, KernelSize};
use crate::plan::OrientationPlan;

/// 通用工具执行路径. 基于 `ndarray` 的组合操作, 单线程.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GenericToolkit;

/// 物理轴 (0 = 宽, 1 = 高, 2 = 深) 到 `ndarray` 轴 (形状为 `(深, 高, 宽)`) 的转换.
#[inline]
const fn nd_axis(physical: usize) -> usize {
    2 - physical
}

impl Backend for GenericToolkit {
    #[inline]
    fn name(&self) -> &'static str {
        "generic_toolkit"
    }

    fn normalize(&self, volume: &mut VoxelBuffer<f32>, window: &IntensityWindow) {
        volume.view_mut().mapv_inplace(|v| window.map(v));
    }

    fn reorient<T: Voxel>(
        &self,
        buffer: &VoxelBuffer<T>,
        plan: &OrientationPlan,
    ) -> VoxelBuffer<T> {
        if plan.is_identity() {
            return buffer.clone();
        }
        let source = plan.source();

        // 阶段 1: 轴重排. ndarray 输出轴 a 对应物理轴 2 - a.
        let mut view = buffer
            .view()
            .permuted_axes([0, 1, 2].map(|a| nd_axis(source[nd_axis(a)])));

        // 阶段 2: 轴反转.
        for (j, flip) in plan.flip().into_iter().enumerate() {
            if flip {
                view.invert_axis(Axis(nd_axis(j)));
            }
        }

        let out = VoxelBuffer::from_array(view.as_standard_layout().into_owned());
        debug_assert_eq!(out.dims(), plan.output_dims(buffer.dims()));
        out
    }

    fn median(&self, volume: &mut VoxelBuffer<f32>, k: KernelSize) {
        if k.is_trivial() || volume.is_empty() {
            return;
        }
        let r = k.radius();
        let (w, h, d) = volume.dims();
        let mut window = Vec::with_capacity(k.area());

        for z in 0..d {
            let src = volume.slice_at(z).to_owned();
            Zip::indexed(volume.slice_at_mut(z)).for_each(|(y, x), v| {
                window.clear();
                window.extend(iproduct!(0..k.get(), 0..k.get()).map(|(dy, dx)| {
                    src[(clamp_to_edge(y, dy, r, h), clamp_to_edge(x, dx, r, w))]
                }));
                *v = median_of(&mut window);
            });
        }
    }
}
