//! ### English
//! Per-configuration choice between the external-surface path and the CPU-upload path.
//!
//! ### 中文
//! 按配置在外部 surface 路径与 CPU 上传路径之间做出选择。

use super::frame::DecodedFrame;

/// ### English
/// Which ingestion path processes frames until the next format change.
///
/// ### 中文
/// 在下一次格式变化之前由哪条摄取路径处理帧。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// ### English
    /// Zero-copy: decoder-owned textures are bound per frame.
    ///
    /// ### 中文
    /// 零拷贝：每帧绑定解码器持有的纹理。
    ExternalSurface,
    /// ### English
    /// Planar image data is uploaded into renderer-owned textures.
    ///
    /// ### 中文
    /// 平面图像数据上传到渲染器自有纹理。
    CpuUpload,
}

/// ### English
/// Shader variant the pipeline should load for the configured mode.
///
/// ### 中文
/// 管线应为当前配置模式加载的着色器变体。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShaderFormat {
    /// ### English
    /// Nothing configured yet.
    ///
    /// ### 中文
    /// 尚未配置。
    None = 0,
    /// ### English
    /// Standard NV12 (UV chroma byte order).
    ///
    /// ### 中文
    /// 标准 NV12（UV 色度字节序）。
    Nv12 = 1,
    /// ### English
    /// NV12 with swapped chroma channels (external VU surfaces sampled as RRG).
    ///
    /// ### 中文
    /// 交换色度通道的 NV12（外部 VU surface 以 RRG 方式采样）。
    Nv12Rrg = 2,
}

/// ### English
/// Caches the mode decided at configure time.
///
/// ### 中文
/// 缓存配置时决定的模式。
#[derive(Debug, Default)]
pub struct ModeSelector {
    cached: Option<RenderMode>,
}

impl ModeSelector {
    /// ### English
    /// Creates a selector with nothing cached.
    ///
    /// ### 中文
    /// 创建一个尚无缓存的选择器。
    pub fn new() -> Self {
        Self::default()
    }

    /// ### English
    /// Pure decision: which mode `frame` requires.
    ///
    /// ### 中文
    /// 纯决策：`frame` 需要哪种模式。
    pub fn detect_mode(frame: &DecodedFrame) -> RenderMode {
        frame.render_mode()
    }

    /// ### English
    /// Caches the mode required by `frame` and returns the previously cached mode.
    ///
    /// ### 中文
    /// 缓存 `frame` 所需的模式，并返回之前缓存的模式。
    pub fn configure(&mut self, frame: &DecodedFrame) -> Option<RenderMode> {
        self.cached.replace(Self::detect_mode(frame))
    }

    /// ### English
    /// Returns `true` iff `frame` requires a mode different from the cached one.
    ///
    /// A `true` result obliges the caller to tear down and recreate every slot. Before the first
    /// configuration nothing is cached and nothing needs tearing down, so this returns `false`.
    ///
    /// ### 中文
    /// 仅当 `frame` 所需模式与缓存模式不同时返回 `true`。
    ///
    /// 返回 `true` 时调用方必须销毁并重建所有槽位。首次配置前没有缓存、无需销毁，因此返回 `false`。
    pub fn config_changed(&self, frame: &DecodedFrame) -> bool {
        match self.cached {
            Some(cached) => cached != Self::detect_mode(frame),
            None => false,
        }
    }

    /// ### English
    /// Cached mode, `None` before the first configuration.
    ///
    /// ### 中文
    /// 已缓存的模式；首次配置前为 `None`。
    pub fn mode(&self) -> Option<RenderMode> {
        self.cached
    }

    /// ### English
    /// Shader variant for the cached mode.
    ///
    /// ### 中文
    /// 缓存模式对应的着色器变体。
    pub fn shader_format(&self) -> ShaderFormat {
        match self.cached {
            Some(RenderMode::ExternalSurface) => ShaderFormat::Nv12Rrg,
            Some(RenderMode::CpuUpload) => ShaderFormat::Nv12,
            None => ShaderFormat::None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.cached = None;
    }
}
