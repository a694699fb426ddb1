//! 预处理器: 按扫描组织强度归一化、方向重排与中值滤波.

use log::{debug, trace};

use crate::backend::{Backend, ExecutionPath};
use crate::data::{AxisSpec, IntensityWindow, Scan};
use crate::error::{ConfigError, PreconditionError};
use crate::median::KernelSize;
use crate::plan::OrientationPlan;

/// 预处理器配置: 强度窗口与执行路径.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessorConfig {
    /// 强度窗口.
    pub window: IntensityWindow,

    /// 执行路径.
    pub execution_path: ExecutionPath,
}

impl ProcessorConfig {
    /// 直接初始化.
    #[inline]
    pub fn new(window: IntensityWindow, execution_path: ExecutionPath) -> Self {
        Self {
            window,
            execution_path,
        }
    }

    /// 以四个窗口参数和执行路径名称 (`"itk"` / `"cuda"` 等) 构建配置.
    ///
    /// 窗口非法或执行路径名称未知时返回对应的 [`ConfigError`], 不会静默回退.
    pub fn parse(
        lower: f32,
        upper: f32,
        out_min: f32,
        out_max: f32,
        approach: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            window: IntensityWindow::new(lower, upper, out_min, out_max)?,
            execution_path: approach.parse()?,
        })
    }
}

/// 预处理器.
///
/// 执行后端 `B` 在构建时选定, 之后不可更换. 强度窗口可以通过 `set_*`
/// 系列方法修改, 只影响之后的调用.
///
/// 所有操作都是同步的: 一次调用处理完一个缓冲区才返回.
/// 修改配置需要 `&mut self`, 而操作只需要 `&self`, 因此配置不会在操作进行中被修改.
#[derive(Clone, Debug)]
pub struct Processor<B: Backend = ExecutionPath> {
    window: IntensityWindow,
    backend: B,
}

impl Processor<ExecutionPath> {
    /// 从配置构建预处理器, 以运行时选定的执行路径分派.
    #[inline]
    pub fn from_config(config: ProcessorConfig) -> Self {
        Self::new(config.window, config.execution_path)
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> ProcessorConfig {
        ProcessorConfig::new(self.window, self.backend)
    }
}

impl<B: Backend> Processor<B> {
    /// 以强度窗口 `window` 和执行后端 `backend` 构建预处理器.
    #[inline]
    pub fn new(window: IntensityWindow, backend: B) -> Self {
        Self { window, backend }
    }

    /// 当前强度窗口.
    #[inline]
    pub fn window(&self) -> &IntensityWindow {
        &self.window
    }

    /// 执行后端.
    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 预处理的目标轴描述, 即 [`AxisSpec::HOME`].
    #[inline]
    pub fn home_axes(&self) -> AxisSpec {
        AxisSpec::HOME
    }

    /// 设置输入窗口下限. 非法时返回错误并保留原配置.
    pub fn set_low_threshold(&mut self, lower: f32) -> Result<(), ConfigError> {
        self.window = self.window.with_lower(lower)?;
        Ok(())
    }

    /// 设置输入窗口上限. 非法时返回错误并保留原配置.
    pub fn set_high_threshold(&mut self, upper: f32) -> Result<(), ConfigError> {
        self.window = self.window.with_upper(upper)?;
        Ok(())
    }

    /// 同时设置输入窗口上下限. 非法时返回错误并保留原配置.
    ///
    /// 当新旧窗口不重叠时, 分别调用 `set_low_threshold` 和 `set_high_threshold`
    /// 可能在中间状态触发校验错误, 此时应使用本方法.
    pub fn set_thresholds(&mut self, lower: f32, upper: f32) -> Result<(), ConfigError> {
        self.window = self.window.with_thresholds(lower, upper)?;
        Ok(())
    }

    /// 设置输出范围. 非法时返回错误并保留原配置.
    pub fn set_output_range(&mut self, out_min: f32, out_max: f32) -> Result<(), ConfigError> {
        self.window = self.window.with_output_range(out_min, out_max)?;
        Ok(())
    }

    /// 完整预处理: 先归一化扫描强度, 再将扫描 (以及存在时的分割标注)
    /// 重排到 [`AxisSpec::HOME`].
    ///
    /// 假设 header 中的轴顺序正确, 且后两个轴的方向正确; 左右轴的方向不可信, 不会被翻转.
    pub fn preprocess<S: Scan>(&self, scan: &mut S) {
        self.normalize(scan);
        let home = self.home_axes();
        self.reorient_volume(scan, &home);
        // 标注是可选的.
        if let Err(PreconditionError::MissingSegment) = self.reorient_segment(scan, &home) {
            trace!("[{}] 扫描不含标注", self.backend.name());
        }
    }

    /// 仅归一化扫描强度. 分割标注不受影响.
    pub fn normalize<S: Scan>(&self, scan: &mut S) {
        debug!(
            "[{}] 强度归一化: [{}, {}] -> [{}, {}]",
            self.backend.name(),
            self.window.lower(),
            self.window.upper(),
            self.window.out_min(),
            self.window.out_max()
        );
        self.backend.normalize(scan.volume_mut(), &self.window);
    }

    /// 将扫描从其当前轴描述重排到 `desired`.
    pub fn reorient_volume<S: Scan>(&self, scan: &mut S, desired: &AxisSpec) {
        let plan = OrientationPlan::new(&scan.volume_axes(), desired);
        if plan.is_identity() {
            trace!("[{}] 扫描无需重排", self.backend.name());
            return;
        }
        debug!(
            "[{}] 重排扫描: {:?} -> {:?}, permute = {}, flip = {}",
            self.backend.name(),
            plan.current(),
            plan.desired(),
            plan.needs_permute(),
            plan.needs_flip()
        );
        let out = self.backend.reorient(scan.volume(), &plan);
        scan.set_volume(out, *desired);
    }

    /// 将分割标注从其当前轴描述重排到 `desired`. 标注不会经过强度映射.
    ///
    /// 扫描中不存在标注时返回 `Err(PreconditionError::MissingSegment)`.
    pub fn reorient_segment<S: Scan>(
        &self,
        scan: &mut S,
        desired: &AxisSpec,
    ) -> Result<(), PreconditionError> {
        let (segment, axes) = scan
            .segment()
            .zip(scan.segment_axes())
            .ok_or(PreconditionError::MissingSegment)?;
        let plan = OrientationPlan::new(&axes, desired);
        if plan.is_identity() {
            trace!("[{}] 标注无需重排", self.backend.name());
            return Ok(());
        }
        debug!(
            "[{}] 重排标注: {:?} -> {:?}, permute = {}, flip = {}",
            self.backend.name(),
            plan.current(),
            plan.desired(),
            plan.needs_permute(),
            plan.needs_flip()
        );
        let out = self.backend.reorient(segment, &plan);
        scan.set_segment(out, *desired);
        Ok(())
    }

    /// 以 `k × k` 的正方形核逐水平切片对扫描进行中值滤波.
    ///
    /// `k` 不是正奇数时返回 `Err(ConfigError::InvalidKernel)`, 且不修改数据.
    pub fn filter_median<S: Scan>(&self, scan: &mut S, k: usize) -> Result<(), ConfigError> {
        let k = KernelSize::new(k)?;
        debug!("[{}] 中值滤波: k = {}", self.backend.name(), k.get());
        self.backend.median(scan.volume_mut(), k);
        Ok(())
    }
}
