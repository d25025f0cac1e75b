//! ### English
//! Hardware-decode renderer: owns the slot pool and routes every frame through the configured
//! ingestion path.
//!
//! All methods must be called on the render thread that owns the GL context.
//!
//! ### 中文
//! 硬件解码渲染器：持有槽位池，并将每一帧路由到已配置的摄取路径。
//!
//! 所有方法都必须在持有 GL 上下文的渲染线程上调用。

use std::rc::Rc;
use std::sync::Arc;

use dpi::PhysicalSize;
use gleam::gl;

use crate::engine::error::RenderError;
use crate::engine::flags::{
    HWDEC_RENDER_FLAG_MASK, HWDEC_RENDER_FLAG_SKIP_GL_ERROR_CHECK,
    HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE,
};
use crate::engine::frame::{DecodedFrame, FramePayload, PixelFormat};
use crate::engine::gl::{FenceGl, TextureGl};
use crate::engine::mode::{ModeSelector, RenderMode, ShaderFormat};
use crate::engine::slot::{DEFAULT_BUFFER_COUNT, FrameBuffer, SlotPool};

use super::base::{BaseRenderer, RenderFeature, ScalingMethod};
use super::binder::TextureBinder;
use super::gl_context::GlContext;
use super::upload::{Nv12TextureFormats, Nv12Uploader, PlanarUploader};

mod hooks;
mod lifecycle;

pub use hooks::RenderHooks;

/// ### English
/// Initialization parameters for `HwDecRenderer`.
///
/// ### 中文
/// `HwDecRenderer` 的初始化参数。
pub struct HwDecRendererInit {
    /// ### English
    /// Texture seam for the render thread's current context.
    ///
    /// ### 中文
    /// 渲染线程当前上下文的纹理接口。
    pub texture_gl: Rc<dyn TextureGl>,
    /// ### English
    /// Fence seam, `None` when the context has no sync objects.
    ///
    /// ### 中文
    /// fence 接口；上下文不支持同步对象时为 `None`。
    pub fence_gl: Option<Rc<dyn FenceGl>>,
    /// ### English
    /// Generic renderer base answering capability queries.
    ///
    /// ### 中文
    /// 回答能力查询的通用渲染器基类。
    pub base: Box<dyn BaseRenderer>,
    /// ### English
    /// Planar uploader used by the CPU-upload path.
    ///
    /// ### 中文
    /// CPU 上传路径使用的平面上传器。
    pub uploader: Box<dyn PlanarUploader>,
    /// ### English
    /// Initial source (video) size; replaced on every `configure`.
    ///
    /// ### 中文
    /// 初始源（视频）尺寸；每次 `configure` 时替换。
    pub source_size: PhysicalSize<u32>,
    /// ### English
    /// Number of slots (clamped to `1..=MAX_BUFFER_COUNT`).
    ///
    /// ### 中文
    /// 槽位数量（会被限制在 `1..=MAX_BUFFER_COUNT`）。
    pub buffer_count: usize,
    /// ### English
    /// Texture target used for sampler-state updates (normally `GL_TEXTURE_2D`).
    ///
    /// ### 中文
    /// 采样器状态更新使用的纹理目标（通常为 `GL_TEXTURE_2D`）。
    pub texture_target: u32,
    /// ### English
    /// `HWDEC_RENDER_FLAG_*` bitmask; unknown bits are ignored.
    ///
    /// ### 中文
    /// `HWDEC_RENDER_FLAG_*` 位掩码；未知位会被忽略。
    pub flags: u32,
}

impl HwDecRendererInit {
    /// ### English
    /// Default parameters for a loaded context: NV12 uploader matching the context's texture
    /// formats, fences only when the context supports them.
    ///
    /// ### 中文
    /// 针对已加载上下文的默认参数：NV12 上传器匹配上下文的纹理格式，仅在支持时启用 fence。
    pub fn from_context(
        ctx: &GlContext,
        base: Box<dyn BaseRenderer>,
        source_size: PhysicalSize<u32>,
    ) -> Self {
        let caps = ctx.caps();
        let formats = Nv12TextureFormats::for_caps(caps.rg_textures);
        Self {
            texture_gl: ctx.texture_gl(),
            fence_gl: caps.fence_sync.then(|| ctx.fence_gl()),
            base,
            uploader: Box::new(Nv12Uploader::new(gl::TEXTURE_2D, formats)),
            source_size,
            buffer_count: DEFAULT_BUFFER_COUNT,
            texture_target: gl::TEXTURE_2D,
            flags: 0,
        }
    }
}

/// ### English
/// Per-frame buffer lifecycle for hardware-decoded video.
///
/// ### 中文
/// 硬件解码视频的逐帧缓冲生命周期。
pub struct HwDecRenderer {
    pub(super) gl: Rc<dyn TextureGl>,
    pub(super) fence_gl: Option<Rc<dyn FenceGl>>,
    base: Box<dyn BaseRenderer>,
    pub(super) uploader: Box<dyn PlanarUploader>,
    pub(super) binder: TextureBinder,
    pub(super) selector: ModeSelector,
    pub(super) pool: SlotPool,
    pub(super) source_size: PhysicalSize<u32>,
    pub(super) flags: u32,
    /// ### English
    /// Latched by an allocation failure; the hardware path stays off until a new renderer is
    /// created.
    ///
    /// ### 中文
    /// 分配失败时锁定；在创建新渲染器前硬件路径保持关闭。
    pub(super) hw_disabled: bool,
}

impl HwDecRenderer {
    pub fn new(init: HwDecRendererInit) -> Self {
        let flags = init.flags & HWDEC_RENDER_FLAG_MASK;
        let check_errors = flags & HWDEC_RENDER_FLAG_SKIP_GL_ERROR_CHECK == 0;
        Self {
            gl: init.texture_gl,
            fence_gl: init.fence_gl,
            base: init.base,
            uploader: init.uploader,
            binder: TextureBinder::new(init.texture_target, check_errors),
            selector: ModeSelector::new(),
            pool: SlotPool::new(init.buffer_count),
            source_size: init.source_size,
            flags,
            hw_disabled: false,
        }
    }

    /// ### English
    /// Effective flag bitmask (unknown bits masked off).
    ///
    /// ### 中文
    /// 生效的标志位掩码（未知位已屏蔽）。
    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub(super) fn render_fence_enabled(&self) -> bool {
        self.fence_gl.is_some() && self.flags & HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE == 0
    }

    /// ### English
    /// Whether this renderer can present `frame` at all.
    ///
    /// Returns `false` for every frame once an allocation failure disabled the hardware path.
    ///
    /// ### 中文
    /// 该渲染器是否能够呈现 `frame`。
    ///
    /// 一旦分配失败关闭了硬件路径，对所有帧都返回 `false`。
    pub fn handles_frame(&self, frame: &DecodedFrame) -> bool {
        if self.hw_disabled {
            return false;
        }
        match frame.payload() {
            FramePayload::ExternalSurface(surface) => surface.luma_texture != 0,
            FramePayload::CpuPlanar(image) => image.format == PixelFormat::Nv12,
        }
    }

    /// ### English
    /// Whether an allocation failure disabled the hardware path.
    ///
    /// ### 中文
    /// 分配失败是否已禁用硬件路径。
    pub fn is_hw_disabled(&self) -> bool {
        self.hw_disabled
    }

    /// ### English
    /// Feature query, passed through to the base renderer.
    ///
    /// ### 中文
    /// 特性查询，直接转发给基础渲染器。
    pub fn supports_feature(&self, feature: RenderFeature) -> bool {
        self.base.supports_feature(feature)
    }

    /// ### English
    /// Scaling query, passed through to the base renderer.
    ///
    /// ### 中文
    /// 缩放查询，直接转发给基础渲染器。
    pub fn supports_scaling(&self, method: ScalingMethod) -> bool {
        self.base.supports_scaling(method)
    }

    /// ### English
    /// Handles a configuration event: tears down every slot, then caches `frame`'s mode and the
    /// new source size. Slots must be recreated with `create_texture` afterwards.
    ///
    /// ### 中文
    /// 处理配置事件：销毁所有槽位，然后缓存 `frame` 的模式与新的源尺寸。
    /// 之后必须通过 `create_texture` 重新创建槽位。
    pub fn configure(&mut self, frame: &DecodedFrame, source_size: PhysicalSize<u32>) {
        self.pool.delete_all(&*self.gl);
        let previous = self.selector.configure(frame);
        self.source_size = source_size;
        tracing::info!(
            mode = ?self.selector.mode(),
            ?previous,
            width = source_size.width,
            height = source_size.height,
            "configured hwdec renderer"
        );
    }

    /// ### English
    /// `true` iff `frame` needs a different mode than the configured one.
    ///
    /// ### 中文
    /// 仅当 `frame` 需要的模式与已配置模式不同时返回 `true`。
    pub fn config_changed(&self, frame: &DecodedFrame) -> bool {
        self.selector.config_changed(frame)
    }

    /// ### English
    /// Configured mode, `None` before `configure`.
    ///
    /// ### 中文
    /// 已配置的模式；`configure` 之前为 `None`。
    pub fn mode(&self) -> Option<RenderMode> {
        self.selector.mode()
    }

    /// ### English
    /// Shader variant the pipeline should load.
    ///
    /// ### 中文
    /// 管线应加载的着色器变体。
    pub fn shader_format(&self) -> ShaderFormat {
        self.selector.shader_format()
    }

    /// ### English
    /// Configured source size.
    ///
    /// ### 中文
    /// 已配置的源尺寸。
    pub fn source_size(&self) -> PhysicalSize<u32> {
        self.source_size
    }

    /// ### English
    /// Number of slots in the pool.
    ///
    /// ### 中文
    /// 池中的槽位数量。
    pub fn slot_count(&self) -> usize {
        self.pool.len()
    }

    /// ### English
    /// Read access to slot `index`.
    ///
    /// ### 中文
    /// 只读访问槽位 `index`。
    pub fn slot(&self, index: usize) -> Result<&FrameBuffer, RenderError> {
        self.pool.get(index)
    }

    /// ### English
    /// Read access to every slot.
    ///
    /// ### 中文
    /// 只读访问所有槽位。
    pub fn slots(&self) -> impl Iterator<Item = &FrameBuffer> {
        self.pool.iter()
    }

    /// ### English
    /// Attaches `frame` to slot `index`, detaching (and releasing to the decoder) the previous
    /// occupant. The frame is processed by the next `upload_texture`.
    ///
    /// ### 中文
    /// 将 `frame` 挂到槽位 `index`，并解除（交还给解码器）之前的占用帧。
    /// 该帧会在下一次 `upload_texture` 时处理。
    pub fn add_frame(&mut self, index: usize, frame: Arc<DecodedFrame>) -> Result<(), RenderError> {
        self.pool.get_mut(index)?.attach(frame);
        Ok(())
    }

    /// ### English
    /// Validates `frame` first and leaves the slot untouched if it is not valid yet; otherwise
    /// `add_frame` followed by `upload_texture`.
    ///
    /// ### 中文
    /// 先校验 `frame`，若其尚未有效则不触碰槽位；否则依次执行 `add_frame` 与 `upload_texture`。
    pub fn bind_frame(&mut self, index: usize, frame: Arc<DecodedFrame>) -> Result<(), RenderError> {
        self.pool.get(index)?;
        if !frame.is_valid() {
            tracing::warn!(slot = index, frame_id = frame.id(), "skipping frame that is not valid yet");
            return Err(RenderError::InvalidDescriptor);
        }
        self.add_frame(index, frame)?;
        self.upload_texture(index)
    }
}

impl Drop for HwDecRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}
