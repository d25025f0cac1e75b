//! ### English
//! CPU-upload path: allocates renderer-owned textures and uploads planar NV12 images into them.
//!
//! ### 中文
//! CPU 上传路径：分配渲染器自有纹理，并将 NV12 平面图像上传到其中。

use std::borrow::Cow;

use dpi::PhysicalSize;
use gleam::gl;

use crate::engine::error::RenderError;
use crate::engine::frame::{PixelFormat, PlanarImage};
use crate::engine::gl::TextureGl;
use crate::engine::slot::{FrameBuffer, MAX_PLANES, PlaneTexture};

/// ### English
/// Generic planar-image uploader used by the CPU-upload path.
///
/// The core initializes the slot geometry before `create_textures`; deletion is handled by the
/// core through the planes' ownership tags.
///
/// ### 中文
/// CPU 上传路径使用的通用平面图像上传器。
///
/// 核心在调用 `create_textures` 前初始化槽位几何信息；删除由核心根据平面的所有权标签完成。
pub trait PlanarUploader {
    /// ### English
    /// Allocates owned textures for `slot` and records them (tagged `Owned`) in `buffer`.
    ///
    /// ### 中文
    /// 为 `slot` 分配自有纹理，并将其（标记为 `Owned`）记录到 `buffer` 中。
    fn create_textures(
        &mut self,
        gl: &dyn TextureGl,
        slot: usize,
        buffer: &mut FrameBuffer,
    ) -> Result<(), RenderError>;

    /// ### English
    /// Transfers `image` into the textures previously created for `buffer`.
    ///
    /// ### 中文
    /// 将 `image` 传输到之前为 `buffer` 创建的纹理中。
    fn upload(
        &mut self,
        gl: &dyn TextureGl,
        buffer: &mut FrameBuffer,
        image: &PlanarImage,
    ) -> Result<(), RenderError>;
}

/// ### English
/// Internal/external formats for the luma and interleaved chroma textures.
///
/// ### 中文
/// 亮度纹理与交错色度纹理使用的内部/外部格式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nv12TextureFormats {
    pub luma_internal: i32,
    pub luma_format: u32,
    pub chroma_internal: i32,
    pub chroma_format: u32,
}

impl Nv12TextureFormats {
    /// ### English
    /// `R8`/`RG8` when available, else GLES2 `LUMINANCE`/`LUMINANCE_ALPHA`.
    ///
    /// ### 中文
    /// 支持时使用 `R8`/`RG8`，否则使用 GLES2 的 `LUMINANCE`/`LUMINANCE_ALPHA`。
    pub fn for_caps(rg_textures: bool) -> Self {
        if rg_textures {
            Self {
                luma_internal: gl::R8 as i32,
                luma_format: gl::RED,
                chroma_internal: gl::RG8 as i32,
                chroma_format: gl::RG,
            }
        } else {
            Self {
                luma_internal: gl::LUMINANCE as i32,
                luma_format: gl::LUMINANCE,
                chroma_internal: gl::LUMINANCE_ALPHA as i32,
                chroma_format: gl::LUMINANCE_ALPHA,
            }
        }
    }
}

/// ### English
/// NV12 uploader: one single-channel luma texture + one two-channel chroma texture per slot.
///
/// ### 中文
/// NV12 上传器：每个槽位一个单通道亮度纹理 + 一个双通道色度纹理。
#[derive(Clone, Copy, Debug)]
pub struct Nv12Uploader {
    texture_target: u32,
    formats: Nv12TextureFormats,
}

impl Nv12Uploader {
    pub fn new(texture_target: u32, formats: Nv12TextureFormats) -> Self {
        Self {
            texture_target,
            formats,
        }
    }

    fn allocate(
        &self,
        gl: &dyn TextureGl,
        texture: u32,
        internal: i32,
        format: u32,
        size: PhysicalSize<u32>,
    ) {
        let target = self.texture_target;
        gl.bind_texture(target, texture);
        gl.tex_image_2d(target, internal, size, format, None);
        gl.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
        gl.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
        gl.bind_texture(target, 0);
    }

    fn transfer(
        &self,
        gl: &dyn TextureGl,
        texture: u32,
        format: u32,
        size: PhysicalSize<u32>,
        pixels: &[u8],
    ) {
        let target = self.texture_target;
        gl.bind_texture(target, texture);
        gl.tex_sub_image_2d(target, size, format, pixels);
        gl.bind_texture(target, 0);
    }
}

impl PlanarUploader for Nv12Uploader {
    fn create_textures(
        &mut self,
        gl: &dyn TextureGl,
        slot: usize,
        buffer: &mut FrameBuffer,
    ) -> Result<(), RenderError> {
        let size = buffer.source_size();
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::AllocationFailure {
                slot,
                reason: format!("zero source size {}x{}", size.width, size.height),
            });
        }

        let ids = gl.gen_textures(2);
        if ids.len() != 2 || ids.contains(&0) {
            let allocated: Vec<u32> = ids.iter().copied().filter(|&id| id != 0).collect();
            if !allocated.is_empty() {
                gl.delete_textures(&allocated);
            }
            return Err(RenderError::AllocationFailure {
                slot,
                reason: "glGenTextures returned no texture".to_string(),
            });
        }

        let (shift_x, shift_y) = buffer.chroma_shift();
        let chroma_size = PhysicalSize::new(size.width >> shift_x, size.height >> shift_y);
        let formats = self.formats;
        self.allocate(gl, ids[0], formats.luma_internal, formats.luma_format, size);
        self.allocate(gl, ids[1], formats.chroma_internal, formats.chroma_format, chroma_size);

        let planes = buffer.planes_mut();
        planes[0].texture = PlaneTexture::owned(ids[0]);
        planes[0].tex_size = size;
        for plane in &mut planes[1..] {
            plane.texture = PlaneTexture::owned(ids[1]);
            plane.tex_size = chroma_size;
        }
        for plane in planes.iter_mut() {
            plane.pixels_per_texel = (1, 1);
        }

        buffer.calculate_source_rects(MAX_PLANES);
        Ok(())
    }

    fn upload(
        &mut self,
        gl: &dyn TextureGl,
        buffer: &mut FrameBuffer,
        image: &PlanarImage,
    ) -> Result<(), RenderError> {
        if image.format != PixelFormat::Nv12 || image.size != buffer.source_size() {
            return Err(RenderError::InvalidDescriptor);
        }

        let planes = buffer.planes();
        let luma_size = planes[0].tex_size;
        let chroma_size = planes[1].tex_size;
        let luma = pack_rows(
            &image.luma,
            image.luma_stride,
            luma_size.width as usize,
            luma_size.height as usize,
        )
        .ok_or(RenderError::InvalidDescriptor)?;
        let chroma = pack_rows(
            &image.chroma,
            image.chroma_stride,
            chroma_size.width as usize * 2,
            chroma_size.height as usize,
        )
        .ok_or(RenderError::InvalidDescriptor)?;

        gl.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);
        let formats = self.formats;
        self.transfer(gl, planes[0].texture.id, formats.luma_format, luma_size, &luma);
        self.transfer(gl, planes[1].texture.id, formats.chroma_format, chroma_size, &chroma);
        gl.pixel_store_i(gl::UNPACK_ALIGNMENT, 4);
        Ok(())
    }
}

/// ### English
/// Returns `rows` rows of `row_bytes` each, tightly packed. Borrows when already packed; `None`
/// when `data` is too short or `stride < row_bytes`.
///
/// ### 中文
/// 返回紧密排列的 `rows` 行数据（每行 `row_bytes` 字节）。已紧密排列时直接借用；
/// 当 `data` 过短或 `stride < row_bytes` 时返回 `None`。
fn pack_rows(data: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Option<Cow<'_, [u8]>> {
    if stride < row_bytes {
        return None;
    }
    if rows == 0 || row_bytes == 0 {
        return Some(Cow::Borrowed(&[]));
    }
    let needed = stride * (rows - 1) + row_bytes;
    if data.len() < needed {
        return None;
    }
    if stride == row_bytes {
        return Some(Cow::Borrowed(&data[..row_bytes * rows]));
    }

    let mut packed = Vec::with_capacity(row_bytes * rows);
    for row in data.chunks(stride).take(rows) {
        packed.extend_from_slice(&row[..row_bytes]);
    }
    Some(Cow::Owned(packed))
}
