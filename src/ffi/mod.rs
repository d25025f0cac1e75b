//! ### English
//! C ABI surface for `hwdec_gl_render`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! Renderer functions must be called on the render thread that owns the GL context. Frame and
//! event-queue handles may be used from the decoder thread.
//!
//! ### 中文
//! `hwdec_gl_render` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 渲染器相关函数必须在持有 GL 上下文的渲染线程上调用；帧与事件队列句柄可在解码线程使用。
mod abi;
mod frame;
mod renderer;

use std::sync::Arc;

use crate::engine::{
    DecodedFrame, FrameEvent, FrameEventReceiver, FrameEventSender, HwDecRenderer, Plane,
};

/// ### English
/// Opaque renderer handle.
///
/// ### 中文
/// 不透明渲染器句柄。
pub struct HwDecRender {
    renderer: HwDecRenderer,
}

/// ### English
/// Opaque decoded-frame handle. Each handle holds one reference; the renderer keeps its own
/// reference while the frame occupies a slot.
///
/// ### 中文
/// 不透明解码帧句柄。每个句柄持有一个引用；帧占用槽位期间渲染器另持有一个引用。
pub struct HwDecFrame {
    frame: Arc<DecodedFrame>,
}

/// ### English
/// Opaque decoder-side event queue receiving `Sampled`/`Released` notifications.
///
/// ### 中文
/// 不透明的解码器侧事件队列，接收 `Sampled`/`Released` 通知。
pub struct HwDecEventQueue {
    sender: FrameEventSender,
    receiver: FrameEventReceiver,
}

/// ### English
/// `HwDecFrameEvent.kind`: the frame was sampled; `fence` is valid (or `0`).
///
/// ### 中文
/// `HwDecFrameEvent.kind`：帧已被采样；`fence` 有效（或为 `0`）。
pub const HWDEC_FRAME_EVENT_SAMPLED: u32 = 1;

/// ### English
/// `HwDecFrameEvent.kind`: the frame left its slot; the decoder may recycle its surface.
///
/// ### 中文
/// `HwDecFrameEvent.kind`：帧已离开槽位；解码器可回收其 surface。
pub const HWDEC_FRAME_EVENT_RELEASED: u32 = 2;

#[repr(C)]
/// ### English
/// One frame event returned to the decoder.
///
/// ### 中文
/// 返回给解码器的单个帧事件。
pub struct HwDecFrameEvent {
    pub kind: u32,
    pub frame_id: u64,
    /// ### English
    /// `GLsync` cast to `u64` for `HWDEC_FRAME_EVENT_SAMPLED`, else `0`.
    ///
    /// Ownership: the decoder owns this sync object. It should wait on it before reusing the
    /// surface and must delete it afterwards (`hwdec_render_delete_fence` or its own
    /// `glDeleteSync`).
    ///
    /// ### 中文
    /// `HWDEC_FRAME_EVENT_SAMPLED` 时为转成 `u64` 的 `GLsync`，否则为 `0`。
    ///
    /// 所有权：该 sync 对象归解码器所有。复用 surface 前应等待它，之后必须删除
    /// （调用 `hwdec_render_delete_fence` 或自行 `glDeleteSync`）。
    pub fence: u64,
}

#[repr(C)]
/// ### English
/// One plane of a slot, as consumed by the generic pipeline's geometry/shader stage.
///
/// ### 中文
/// 槽位的单个平面，供通用管线的几何/着色器阶段使用。
pub struct HwDecPlane {
    pub texture_id: u32,
    pub width: u32,
    pub height: u32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// ### English
/// C ABI version for `hwdec_gl_render`.
///
/// ### 中文
/// `hwdec_gl_render` 的 C ABI 版本号。
const HWDEC_RENDER_ABI_VERSION: u32 = 1;

impl From<FrameEvent> for HwDecFrameEvent {
    fn from(value: FrameEvent) -> Self {
        match value {
            FrameEvent::Sampled { frame_id, fence } => Self {
                kind: HWDEC_FRAME_EVENT_SAMPLED,
                frame_id,
                fence,
            },
            FrameEvent::Released { frame_id } => Self {
                kind: HWDEC_FRAME_EVENT_RELEASED,
                frame_id,
                fence: 0,
            },
        }
    }
}

impl From<&Plane> for HwDecPlane {
    fn from(value: &Plane) -> Self {
        Self {
            texture_id: value.texture.id,
            width: value.tex_size.width,
            height: value.tex_size.height,
            x1: value.rect.x1,
            y1: value.rect.y1,
            x2: value.rect.x2,
            y2: value.rect.y2,
        }
    }
}
