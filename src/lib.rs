//! ### English
//! `hwdec_gl_render` crate root.
//! Presents hardware-decoded video frames as GL textures. The Rust API lives under `engine`; the
//! C ABI is exported via `ffi`.
//!
//! ### 中文
//! `hwdec_gl_render` 的 crate 根。
//! 将硬件解码的视频帧以 GL 纹理形式呈现。Rust API 位于 `engine` 模块；C ABI 通过 `ffi` 导出。
pub mod engine;
mod ffi;

pub use engine::flags::{
    HWDEC_RENDER_FLAG_SKIP_GL_ERROR_CHECK, HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE,
};
pub use engine::{
    DecodedFrame, ExternalSurface, FenceGl, FrameEvent, FramePayload, HwDecRenderer,
    HwDecRendererInit, PlanarImage, RenderError, RenderHooks, RenderMode, ShaderFormat,
    TextureGl, frame_events,
};
