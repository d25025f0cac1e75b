//! ### English
//! Decoded frames handed from the hardware decoder to the renderer.
//!
//! A frame is either a GPU-resident external surface (texture handles owned by the decoder) or a
//! CPU-side planar image that must be uploaded. The renderer only ever holds an `Arc` pin on a
//! frame while it occupies a slot, and reports back through the frame's `CompletionToken`.
//!
//! ### 中文
//! 由硬件解码器交给渲染器的已解码帧。
//!
//! 帧要么是驻留在 GPU 的外部 surface（纹理句柄归解码器所有），要么是需要上传的 CPU 平面图像。
//! 渲染器仅在帧占用槽位期间持有其 `Arc` 引用，并通过帧的 `CompletionToken` 回报状态。

mod events;

use std::sync::atomic::{AtomicBool, Ordering};

use dpi::PhysicalSize;

use super::mode::RenderMode;

pub use events::{CompletionToken, FrameEvent, FrameEventReceiver, FrameEventSender, frame_events};

/// ### English
/// Decoder-assigned frame identifier (echoed back in `FrameEvent`s).
///
/// ### 中文
/// 解码器分配的帧标识（在 `FrameEvent` 中回传）。
pub type FrameId = u64;

/// ### English
/// CPU planar pixel layouts.
///
/// ### 中文
/// CPU 平面像素布局。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// ### English
    /// Full-resolution Y plane + half-resolution interleaved UV plane.
    ///
    /// ### 中文
    /// 全分辨率 Y 平面 + 半分辨率交错 UV 平面。
    Nv12,
    /// ### English
    /// Three separate planes; not handled by this renderer.
    ///
    /// ### 中文
    /// 三个独立平面；本渲染器不处理。
    Yuv420p,
}

/// ### English
/// GPU-resident decoder output: a luma texture and one interleaved chroma texture.
///
/// ### 中文
/// 驻留 GPU 的解码输出：一个亮度纹理与一个交错色度纹理。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExternalSurface {
    /// ### English
    /// Luma (Y) texture ID, or 0 when the decoder did not export a GPU surface.
    ///
    /// ### 中文
    /// 亮度（Y）纹理 ID；解码器未导出 GPU surface 时为 0。
    pub luma_texture: u32,
    /// ### English
    /// Interleaved chroma (VU) texture ID.
    ///
    /// ### 中文
    /// 交错色度（VU）纹理 ID。
    pub chroma_texture: u32,
    /// ### English
    /// Allocated luma texture size (may include decoder padding).
    ///
    /// ### 中文
    /// 已分配的亮度纹理尺寸（可能包含解码器 padding）。
    pub texture_size: PhysicalSize<u32>,
}

/// ### English
/// CPU-side planar image awaiting upload.
///
/// ### 中文
/// 等待上传的 CPU 侧平面图像。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanarImage {
    pub format: PixelFormat,
    /// ### English
    /// Luma size in pixels.
    ///
    /// ### 中文
    /// 亮度尺寸（像素）。
    pub size: PhysicalSize<u32>,
    pub luma: Vec<u8>,
    /// ### English
    /// Bytes per luma row (>= width).
    ///
    /// ### 中文
    /// 每行亮度字节数（>= 宽度）。
    pub luma_stride: usize,
    pub chroma: Vec<u8>,
    /// ### English
    /// Bytes per interleaved chroma row (>= 2 * chroma width).
    ///
    /// ### 中文
    /// 每行交错色度字节数（>= 2 * 色度宽度）。
    pub chroma_stride: usize,
}

impl PlanarImage {
    /// ### English
    /// Builds a tightly-packed NV12 image.
    ///
    /// ### 中文
    /// 构造一个紧密排列的 NV12 图像。
    pub fn nv12(size: PhysicalSize<u32>, luma: Vec<u8>, chroma: Vec<u8>) -> Self {
        let luma_stride = size.width as usize;
        let chroma_stride = (size.width as usize).div_ceil(2) * 2;
        Self {
            format: PixelFormat::Nv12,
            size,
            luma,
            luma_stride,
            chroma,
            chroma_stride,
        }
    }
}

/// ### English
/// The two image representations a decoder can deliver.
///
/// ### 中文
/// 解码器可交付的两种图像表示。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FramePayload {
    ExternalSurface(ExternalSurface),
    CpuPlanar(PlanarImage),
}

/// ### English
/// One decoded frame. Owned by the decoder (shared via `Arc`); the renderer pins it only while it
/// occupies a slot and must never delete its external textures.
///
/// ### 中文
/// 一个已解码帧。归解码器所有（通过 `Arc` 共享）；渲染器仅在其占用槽位期间持有，
/// 且绝不能删除其外部纹理。
#[derive(Debug)]
pub struct DecodedFrame {
    id: FrameId,
    /// ### English
    /// Validity flag; the decoder may clear it after handoff (e.g. surface lost).
    ///
    /// ### 中文
    /// 有效标记；解码器可在交付后将其清除（例如 surface 丢失）。
    valid: AtomicBool,
    payload: FramePayload,
    completion: Option<CompletionToken>,
}

impl DecodedFrame {
    /// ### English
    /// Creates a valid frame without a completion token.
    ///
    /// ### 中文
    /// 创建一个有效且不带完成令牌的帧。
    pub fn new(id: FrameId, payload: FramePayload) -> Self {
        Self {
            id,
            valid: AtomicBool::new(true),
            payload,
            completion: None,
        }
    }

    /// ### English
    /// Attaches the completion token used to signal sampling/release back to the decoder.
    ///
    /// ### 中文
    /// 附加用于向解码器回报采样/释放的完成令牌。
    pub fn with_completion(mut self, token: CompletionToken) -> Self {
        self.completion = Some(token);
        self
    }

    /// ### English
    /// Decoder-assigned frame id.
    ///
    /// ### 中文
    /// 解码器分配的帧 ID。
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// ### English
    /// Image data carried by the frame.
    ///
    /// ### 中文
    /// 帧携带的图像数据。
    pub fn payload(&self) -> &FramePayload {
        &self.payload
    }

    /// ### English
    /// Current validity flag.
    ///
    /// ### 中文
    /// 当前的有效标记。
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// ### English
    /// Updates the validity flag (callable from any thread).
    ///
    /// ### 中文
    /// 更新有效标记（可在任意线程调用）。
    pub fn set_valid(&self, valid: bool) {
        self.valid.store(valid, Ordering::Release);
    }

    /// ### English
    /// Whether a completion token is attached.
    ///
    /// ### 中文
    /// 是否附加了完成令牌。
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// ### English
    /// External surface handles, if any.
    ///
    /// ### 中文
    /// 外部 surface 句柄（若有）。
    pub fn external_surface(&self) -> Option<&ExternalSurface> {
        match &self.payload {
            FramePayload::ExternalSurface(surface) => Some(surface),
            FramePayload::CpuPlanar(_) => None,
        }
    }

    /// ### English
    /// CPU planar image, if any.
    ///
    /// ### 中文
    /// CPU 平面图像（若有）。
    pub fn planar_image(&self) -> Option<&PlanarImage> {
        match &self.payload {
            FramePayload::CpuPlanar(image) => Some(image),
            FramePayload::ExternalSurface(_) => None,
        }
    }

    /// ### English
    /// Mode this frame requires: external surface iff a non-zero luma handle is exposed.
    ///
    /// ### 中文
    /// 该帧所需的模式：仅当暴露了非 0 的亮度句柄时为外部 surface 模式。
    pub fn render_mode(&self) -> RenderMode {
        match self.external_surface() {
            Some(surface) if surface.luma_texture != 0 => RenderMode::ExternalSurface,
            _ => RenderMode::CpuUpload,
        }
    }

    /// ### English
    /// Returns `true` only when a `Sampled` event carrying `fence` reached the decoder.
    ///
    /// ### 中文
    /// 仅当携带 `fence` 的 `Sampled` 事件送达解码器时返回 `true`。
    pub(crate) fn signal_sampled(&self, fence: u64) -> bool {
        self.completion
            .as_ref()
            .is_some_and(|token| token.signal_sampled(fence))
    }

    pub(crate) fn signal_released(&self) {
        if let Some(token) = &self.completion {
            token.signal_released();
        }
    }
}
