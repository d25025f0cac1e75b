//! ### English
//! Rendering module entry point.
//! Splits GL loading, the base-renderer seam, both buffer-ingestion paths and the renderer itself into
//! submodules.
//!
//! ### 中文
//! 渲染模块入口。
//! 将 GL 加载、基类渲染器接口、两条缓冲摄取路径以及渲染器本身拆分到子模块。

mod base;
mod binder;
mod gl_context;
mod renderer;
mod upload;

pub use base::{BaseRenderer, RenderFeature, ScalingMethod, StaticCapabilities};
pub use binder::TextureBinder;
pub use gl_context::{GlCaps, GlContext};
pub use renderer::{HwDecRenderer, HwDecRendererInit, RenderHooks};
pub use upload::{Nv12TextureFormats, Nv12Uploader, PlanarUploader};
