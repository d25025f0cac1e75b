//! ### English
//! Hook surface the generic render pipeline drives.
//!
//! ### 中文
//! 由通用渲染管线驱动的钩子接口。

use crate::engine::error::RenderError;

use super::HwDecRenderer;

/// ### English
/// Per-slot hooks called by the generic pipeline, in this order for each displayed frame:
/// `upload_texture`, render, `after_render`.
///
/// ### 中文
/// 通用管线调用的逐槽位钩子；每个显示帧的调用顺序为：`upload_texture`、渲染、`after_render`。
pub trait RenderHooks {
    fn create_texture(&mut self, index: usize) -> Result<(), RenderError>;
    fn delete_texture(&mut self, index: usize);
    fn upload_texture(&mut self, index: usize) -> Result<(), RenderError>;
    fn after_render(&mut self, index: usize);

    /// ### English
    /// `true` when the hook loaded its own shaders. The default lets the pipeline load the
    /// shaders for the reported `ShaderFormat`.
    ///
    /// ### 中文
    /// 钩子自行加载了着色器时返回 `true`。默认由管线按上报的 `ShaderFormat` 加载着色器。
    fn load_shaders_hook(&mut self) -> bool {
        false
    }

    /// ### English
    /// `true` when the hook rendered slot `index` itself.
    ///
    /// ### 中文
    /// 钩子自行渲染了槽位 `index` 时返回 `true`。
    fn render_hook(&mut self, _index: usize) -> bool {
        false
    }
}

impl RenderHooks for HwDecRenderer {
    fn create_texture(&mut self, index: usize) -> Result<(), RenderError> {
        HwDecRenderer::create_texture(self, index)
    }

    fn delete_texture(&mut self, index: usize) {
        HwDecRenderer::delete_texture(self, index);
    }

    fn upload_texture(&mut self, index: usize) -> Result<(), RenderError> {
        HwDecRenderer::upload_texture(self, index)
    }

    fn after_render(&mut self, index: usize) {
        HwDecRenderer::after_render(self, index);
    }
}
