//! 两条执行路径的一致性测试.

use itertools::{iproduct, Itertools};
use lits_prep::prelude::*;

/// 确定性的伪随机 HU 值, 覆盖窗口内外.
fn hu(seed: usize) -> f32 {
    let v = seed.wrapping_mul(2_654_435_761) % 4001;
    v as f32 - 2000.0 + (seed % 7) as f32 * 0.125
}

fn volume(dims: Idx3d) -> VoxelBuffer<f32> {
    let (w, h, _) = dims;
    VoxelBuffer::from_fn(dims, |(x, y, z)| hu(x + w * (y + h * z)))
}

fn segment(dims: Idx3d) -> VoxelBuffer<u8> {
    let (w, h, _) = dims;
    VoxelBuffer::from_fn(dims, |(x, y, z)| ((x + w * (y + h * z)) % 251) as u8)
}

fn all_specs() -> Vec<AxisSpec> {
    iproduct!((0..3).permutations(3), [1, -1], [1, -1], [1, -1])
        .map(|(order, s0, s1, s2)| {
            AxisSpec::from_raw([order[0], order[1], order[2]], [s0, s1, s2]).unwrap()
        })
        .collect()
}

fn bits(b: &VoxelBuffer<f32>) -> Vec<u32> {
    b.as_slice().iter().map(|v| v.to_bits()).collect()
}

#[test]
fn test_parity_normalize() {
    let _ = simple_logger::init_with_level(log::Level::Warn);
    let windows = [
        IntensityWindow::new(-200.0, 200.0, 0.0, 255.0).unwrap(),
        IntensityWindow::from_liver_visual(),
        IntensityWindow::new(-1000.0, 3000.0, -1.0, 1.0).unwrap(),
        IntensityWindow::new(0.0, 1.0, 7.0, 7.0).unwrap(),
    ];
    let mut input = volume((7, 5, 3));
    input[(0, 0, 0)] = f32::NAN;
    input[(1, 0, 0)] = f32::INFINITY;
    input[(2, 0, 0)] = f32::NEG_INFINITY;

    for window in windows {
        let mut a = input.clone();
        let mut b = input.clone();
        GenericToolkit.normalize(&mut a, &window);
        Accelerated.normalize(&mut b, &window);
        assert_eq!(bits(&a), bits(&b));
        assert!(a
            .as_slice()
            .iter()
            .all(|&v| (window.out_min()..=window.out_max()).contains(&v)));
        assert_eq!(a[(0, 0, 0)], window.out_min());
        assert_eq!(a[(1, 0, 0)], window.out_max());
        assert_eq!(a[(2, 0, 0)], window.out_min());
    }
}

/// 48 × 48 种轴描述组合, 两种体素类型.
#[test]
fn test_parity_reorient() {
    let dims = (5, 3, 4);
    let v = volume(dims);
    let s = segment(dims);
    let specs = all_specs();
    assert_eq!(specs.len(), 48);

    for (current, desired) in iproduct!(specs.iter(), specs.iter()) {
        let plan = OrientationPlan::new(current, desired);
        let (a, b) = (
            GenericToolkit.reorient(&v, &plan),
            Accelerated.reorient(&v, &plan),
        );
        assert_eq!(a.dims(), plan.output_dims(dims));
        assert_eq!(a, b, "{current:?} -> {desired:?}");

        let (a, b) = (
            GenericToolkit.reorient(&s, &plan),
            Accelerated.reorient(&s, &plan),
        );
        assert_eq!(a, b, "{current:?} -> {desired:?}");

        // 重排是双射: 多重集不变.
        let mut before = s.as_slice().to_vec();
        let mut after = a.into_vec();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }
}

/// 任意两个轴描述之间, 先正向再反向重排得到原数据. 两种体素类型, 两条执行路径.
#[test]
fn test_reorient_round_trip() {
    let dims = (4, 6, 3);
    let v = volume(dims);
    let s = segment(dims);
    let specs = all_specs();
    for (current, desired) in iproduct!(specs.iter(), specs.iter()) {
        let plan = OrientationPlan::new(current, desired);
        let back = plan.inverse();
        for backend in [ExecutionPath::GenericToolkit, ExecutionPath::Accelerated] {
            let out = backend.reorient(&v, &plan);
            assert_eq!(
                backend.reorient(&out, &back),
                v,
                "{backend} {current:?} -> {desired:?}"
            );
            let out = backend.reorient(&s, &plan);
            assert_eq!(
                backend.reorient(&out, &back),
                s,
                "{backend} {current:?} -> {desired:?}"
            );
        }
    }
}

#[test]
fn test_parity_median() {
    let mut input = volume((9, 8, 3));
    input[(4, 4, 1)] = f32::NAN;
    for k in [1, 3, 5, 7, 11] {
        let k = KernelSize::new(k).unwrap();
        let mut a = input.clone();
        let mut b = input.clone();
        GenericToolkit.median(&mut a, k);
        Accelerated.median(&mut b, k);
        assert_eq!(bits(&a), bits(&b), "k = {}", k.get());
    }
}

#[test]
fn test_parity_preprocess() {
    let dims = (6, 5, 4);
    let window = IntensityWindow::new(-300.0, 400.0, 0.0, 1.0).unwrap();
    for axes in all_specs() {
        let scan = LitsScan::from_buffers(volume(dims), axes, Some((segment(dims), axes))).unwrap();
        let mut a = scan.clone();
        let mut b = scan;
        Processor::new(window, GenericToolkit).preprocess(&mut a);
        Processor::new(window, Accelerated).preprocess(&mut b);

        assert_eq!(a.volume_axes(), AxisSpec::HOME);
        assert_eq!(b.volume_axes(), AxisSpec::HOME);
        assert_eq!(a.volume(), b.volume());
        assert_eq!(a.segment(), b.segment());
        assert_eq!(a.label_statistics(), b.label_statistics());
    }
}

#[test]
fn test_config_dispatch() {
    let config = ProcessorConfig::parse(-200.0, 200.0, 0.0, 255.0, "itk").unwrap();
    let generic = Processor::from_config(config);
    let accelerated = Processor::from_config(ProcessorConfig {
        execution_path: "cuda".parse().unwrap(),
        ..config
    });
    assert_eq!(generic.backend().name(), "generic_toolkit");
    assert_eq!(accelerated.backend().name(), "accelerated");

    let axes = AxisSpec::from_raw([2, 1, 0], [-1, 1, -1]).unwrap();
    let dims = (3, 4, 5);
    let scan = LitsScan::from_buffers(volume(dims), axes, None).unwrap();
    let mut a = scan.clone();
    let mut b = scan;
    generic.preprocess(&mut a);
    accelerated.preprocess(&mut b);
    assert_eq!(a.volume().dims(), (5, 4, 3));
    assert_eq!(a.volume(), b.volume());
    generic.filter_median(&mut a, 3).unwrap();
    accelerated.filter_median(&mut b, 3).unwrap();
    assert_eq!(a.volume(), b.volume());
}
