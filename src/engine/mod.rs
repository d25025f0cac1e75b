/// ### English
/// Engine internal modules (GL seams, decoded frames, slot pool, mode selection and rendering).
///
/// ### 中文
/// 引擎内部模块（GL 接口、解码帧、槽位池、模式选择与渲染）。
pub mod error;
pub mod flags;
pub mod frame;
pub mod gl;
pub mod mode;
pub mod rendering;
pub mod slot;
#[cfg(test)]
pub(crate) mod test_gl;

pub use error::RenderError;
pub use frame::{
    CompletionToken, DecodedFrame, ExternalSurface, FrameEvent, FrameEventReceiver,
    FrameEventSender, FrameId, FramePayload, PixelFormat, PlanarImage, frame_events,
};
pub use gl::{FenceGl, GleamTextureGl, GlowFenceGl, TextureGl};
pub use mode::{ModeSelector, RenderMode, ShaderFormat};
pub use rendering::{
    BaseRenderer, GlCaps, GlContext, HwDecRenderer, HwDecRendererInit, Nv12TextureFormats,
    Nv12Uploader, PlanarUploader, RenderFeature, RenderHooks, ScalingMethod, StaticCapabilities,
    TextureBinder,
};
pub use slot::{FrameBuffer, Ownership, Plane, PlaneRect, PlaneTexture, SlotPool};
