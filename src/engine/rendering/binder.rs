//! ### English
//! External-surface path: binds decoder-owned textures into a slot's plane records.
//!
//! No allocation or upload happens here. Texture ids written by the binder are tagged `Borrowed`
//! and are never deleted by the renderer.
//!
//! ### 中文
//! 外部 surface 路径：将解码器持有的纹理绑定到槽位的平面记录中。
//!
//! 这里不做任何分配或上传。绑定器写入的纹理 ID 均标记为 `Borrowed`，渲染器绝不删除它们。

use gleam::gl;

use crate::engine::error::RenderError;
use crate::engine::gl::TextureGl;
use crate::engine::slot::{FrameBuffer, MAX_PLANES, PlaneTexture};

/// ### English
/// Sampler-state setup shared by every external texture bound per frame.
///
/// ### 中文
/// 每帧绑定外部纹理时共用的采样器状态设置。
#[derive(Clone, Copy, Debug)]
pub struct TextureBinder {
    texture_target: u32,
    check_errors: bool,
}

impl TextureBinder {
    pub fn new(texture_target: u32, check_errors: bool) -> Self {
        Self {
            texture_target,
            check_errors,
        }
    }

    /// ### English
    /// Binds the slot occupant's external textures.
    ///
    /// Fails with `InvalidDescriptor` (touching nothing) when the slot has no occupant, the occupant is
    /// not valid yet, or it lacks a luma or chroma handle. Fails with `BindFailure` if the driver
    /// reports an error while sampler state is reasserted; the slot's plane ids are then cleared.
    ///
    /// ### 中文
    /// 绑定槽位占用帧的外部纹理。
    ///
    /// 当槽位没有占用帧、占用帧尚未有效或缺少亮度/色度句柄时，返回 `InvalidDescriptor`（不触碰任何状态）。
    /// 若重设采样器状态时驱动报告错误，返回 `BindFailure`，并清空槽位的平面 ID。
    pub fn bind(&self, gl: &dyn TextureGl, buffer: &mut FrameBuffer) -> Result<(), RenderError> {
        let Some(frame) = buffer.occupant() else {
            return Err(RenderError::InvalidDescriptor);
        };
        if !frame.is_valid() {
            return Err(RenderError::InvalidDescriptor);
        }
        let Some(surface) = frame
            .external_surface()
            .copied()
            .filter(|surface| surface.luma_texture != 0 && surface.chroma_texture != 0)
        else {
            return Err(RenderError::InvalidDescriptor);
        };

        buffer.release_textures(gl);

        let (shift_x, shift_y) = buffer.chroma_shift();
        let planes = buffer.planes_mut();
        planes[0].tex_size = surface.texture_size;
        planes[1].tex_size.width = planes[0].tex_size.width >> shift_x;
        planes[1].tex_size.height = planes[0].tex_size.height >> shift_y;
        planes[2].tex_size = planes[1].tex_size;

        for plane in planes.iter_mut() {
            plane.pixels_per_texel = (1, 1);
        }

        planes[0].texture = PlaneTexture::borrowed(surface.luma_texture);
        planes[1].texture = PlaneTexture::borrowed(surface.chroma_texture);
        planes[2].texture = PlaneTexture::borrowed(surface.chroma_texture);

        let mut distinct = vec![surface.luma_texture];
        if surface.chroma_texture != surface.luma_texture {
            distinct.push(surface.chroma_texture);
        }
        for texture in distinct {
            if let Err(err) = self.reassert_sampler_state(gl, texture) {
                buffer.release_textures(gl);
                return Err(err);
            }
        }

        buffer.calculate_source_rects(MAX_PLANES);
        Ok(())
    }

    /// ### English
    /// External texture state is not assumed to persist across frames: linear filtering and
    /// clamp-to-edge wrapping are set on every bind.
    ///
    /// ### 中文
    /// 不假设外部纹理状态在帧之间保持：每次绑定都会设置线性过滤与 clamp-to-edge 环绕。
    fn reassert_sampler_state(&self, gl: &dyn TextureGl, texture: u32) -> Result<(), RenderError> {
        let target = self.texture_target;
        gl.bind_texture(target, texture);
        gl.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
        gl.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
        gl.bind_texture(target, 0);

        if !self.check_errors {
            return Ok(());
        }
        match gl.get_error() {
            gl::NO_ERROR => Ok(()),
            gl_error => Err(RenderError::BindFailure { texture, gl_error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dpi::PhysicalSize;

    use super::*;
    use crate::engine::frame::{DecodedFrame, ExternalSurface, FramePayload};
    use crate::engine::mode::RenderMode;
    use crate::engine::test_gl::{GlCall, RecordingGl};

    fn slot_with(frame: DecodedFrame) -> FrameBuffer {
        let mut buffer = FrameBuffer::default();
        buffer.init_geometry(RenderMode::ExternalSurface, PhysicalSize::new(1920, 1080));
        buffer.attach(Arc::new(frame));
        buffer
    }

    fn surface_frame(luma: u32, chroma: u32) -> DecodedFrame {
        DecodedFrame::new(
            1,
            FramePayload::ExternalSurface(ExternalSurface {
                luma_texture: luma,
                chroma_texture: chroma,
                texture_size: PhysicalSize::new(1920, 1080),
            }),
        )
    }

    #[test]
    fn binds_luma_and_aliased_chroma() {
        let gl = RecordingGl::new();
        let mut buffer = slot_with(surface_frame(42, 43));

        TextureBinder::new(gl::TEXTURE_2D, true)
            .bind(&gl, &mut buffer)
            .unwrap();

        let planes = buffer.planes();
        assert_eq!(buffer.texture_ids(), [42, 43, 43]);
        assert_eq!(planes[0].tex_size, PhysicalSize::new(1920, 1080));
        assert_eq!(planes[1].tex_size, PhysicalSize::new(960, 540));
        assert_eq!(planes[2].tex_size, PhysicalSize::new(960, 540));
        assert!(planes.iter().all(|plane| plane.pixels_per_texel == (1, 1)));
        assert_eq!(gl.bound_textures(), vec![42, 43]);
        assert!(gl.deleted().is_empty());
    }

    #[test]
    fn sampler_state_is_linear_and_clamped() {
        let gl = RecordingGl::new();
        let mut buffer = slot_with(surface_frame(42, 43));
        TextureBinder::new(gl::TEXTURE_2D, true)
            .bind(&gl, &mut buffer)
            .unwrap();

        let params: Vec<GlCall> = gl
            .calls()
            .into_iter()
            .filter(|call| matches!(call, GlCall::TexParameter(42, ..)))
            .collect();
        assert_eq!(
            params,
            vec![
                GlCall::TexParameter(42, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32),
                GlCall::TexParameter(42, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32),
                GlCall::TexParameter(42, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32),
                GlCall::TexParameter(42, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32),
            ]
        );
    }

    #[test]
    fn invalid_frame_touches_nothing() {
        let gl = RecordingGl::new();
        let frame = surface_frame(42, 43);
        frame.set_valid(false);
        let mut buffer = slot_with(frame);
        buffer.planes_mut()[0].texture = PlaneTexture::borrowed(7);

        let result = TextureBinder::new(gl::TEXTURE_2D, true).bind(&gl, &mut buffer);

        assert_eq!(result, Err(RenderError::InvalidDescriptor));
        assert_eq!(buffer.texture_ids(), [7, 0, 0]);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn surface_without_chroma_handle_is_invalid() {
        let gl = RecordingGl::new();
        let mut buffer = slot_with(surface_frame(42, 0));
        buffer.planes_mut()[0].texture = PlaneTexture::borrowed(7);

        let result = TextureBinder::new(gl::TEXTURE_2D, true).bind(&gl, &mut buffer);

        assert_eq!(result, Err(RenderError::InvalidDescriptor));
        assert_eq!(buffer.texture_ids(), [7, 0, 0]);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn empty_slot_is_invalid() {
        let gl = RecordingGl::new();
        let mut buffer = FrameBuffer::default();
        let result = TextureBinder::new(gl::TEXTURE_2D, true).bind(&gl, &mut buffer);
        assert_eq!(result, Err(RenderError::InvalidDescriptor));
    }

    #[test]
    fn driver_error_reports_bind_failure_and_clears_planes() {
        let gl = RecordingGl::new();
        gl.raise_error(gl::INVALID_OPERATION);
        let mut buffer = slot_with(surface_frame(42, 43));

        let result = TextureBinder::new(gl::TEXTURE_2D, true).bind(&gl, &mut buffer);

        assert_eq!(
            result,
            Err(RenderError::BindFailure {
                texture: 42,
                gl_error: gl::INVALID_OPERATION
            })
        );
        assert_eq!(buffer.texture_ids(), [0, 0, 0]);
        assert!(gl.deleted().is_empty());
    }

    #[test]
    fn error_check_can_be_skipped() {
        let gl = RecordingGl::new();
        gl.raise_error(gl::INVALID_OPERATION);
        let mut buffer = slot_with(surface_frame(42, 43));
        assert!(
            TextureBinder::new(gl::TEXTURE_2D, false)
                .bind(&gl, &mut buffer)
                .is_ok()
        );
    }
}
