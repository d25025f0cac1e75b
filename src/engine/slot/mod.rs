//! ### English
//! Per-slot plane records for hardware-decoded frames.
//!
//! Every plane texture carries an explicit ownership tag: `Borrowed` ids belong to the decoder and
//! are only ever zeroed, `Owned` ids were allocated by this renderer and are deleted on release.
//!
//! ### 中文
//! 硬件解码帧的每槽位平面记录。
//!
//! 每个平面纹理都带有显式的所有权标签：`Borrowed` 的 ID 归解码器所有，只会被清零；
//! `Owned` 的 ID 由本渲染器分配，在释放时删除。

mod pool;

use std::sync::Arc;

use dpi::PhysicalSize;

use super::frame::DecodedFrame;
use super::gl::TextureGl;
use super::mode::RenderMode;

pub use pool::{DEFAULT_BUFFER_COUNT, MAX_BUFFER_COUNT, SlotPool};

/// ### English
/// Planes per frame: Y, U, V. NV12 chroma planes alias one interleaved texture.
///
/// ### 中文
/// 每帧的平面数：Y、U、V。NV12 的两个色度平面共用一个交错纹理。
pub const MAX_PLANES: usize = 3;

/// ### English
/// 4:2:0 chroma subsampling (log2) used by every NV-family format handled here.
///
/// ### 中文
/// 本模块处理的所有 NV 系列格式使用的 4:2:0 色度子采样（log2）。
pub const NV12_CHROMA_SHIFT: (u32, u32) = (1, 1);

/// ### English
/// Marks plane 0 of an external-mode slot as initialized before the first frame arrives.
///
/// ### 中文
/// 在第一帧到来前，将外部模式槽位的平面 0 标记为已初始化。
pub(crate) const PLACEHOLDER_TEXTURE_ID: u32 = 1;

/// ### English
/// Who is responsible for deleting a plane's texture.
///
/// ### 中文
/// 由谁负责删除平面纹理。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ownership {
    /// ### English
    /// Decoder-owned; never deleted by the renderer.
    ///
    /// ### 中文
    /// 归解码器所有；渲染器绝不删除。
    #[default]
    Borrowed,
    /// ### English
    /// Renderer-owned; deleted on release.
    ///
    /// ### 中文
    /// 归渲染器所有；释放时删除。
    Owned,
}

/// ### English
/// A texture id together with its ownership tag (`id == 0` means "no texture").
///
/// ### 中文
/// 纹理 ID 及其所有权标签（`id == 0` 表示“无纹理”）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneTexture {
    pub id: u32,
    pub ownership: Ownership,
}

impl PlaneTexture {
    /// ### English
    /// No texture.
    ///
    /// ### 中文
    /// 无纹理。
    pub const EMPTY: Self = Self {
        id: 0,
        ownership: Ownership::Borrowed,
    };

    /// ### English
    /// Decoder-owned texture id.
    ///
    /// ### 中文
    /// 解码器持有的纹理 ID。
    pub fn borrowed(id: u32) -> Self {
        Self {
            id,
            ownership: Ownership::Borrowed,
        }
    }

    /// ### English
    /// Renderer-owned texture id.
    ///
    /// ### 中文
    /// 渲染器自有的纹理 ID。
    pub fn owned(id: u32) -> Self {
        Self {
            id,
            ownership: Ownership::Owned,
        }
    }

    /// ### English
    /// Whether no texture is recorded.
    ///
    /// ### 中文
    /// 是否未记录纹理。
    pub fn is_empty(&self) -> bool {
        self.id == 0
    }
}

/// ### English
/// Normalized source-sampling rectangle for one plane.
///
/// ### 中文
/// 单个平面的归一化源采样矩形。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// ### English
/// One plane of a slot.
///
/// ### 中文
/// 槽位中的一个平面。
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Plane {
    pub texture: PlaneTexture,
    /// ### English
    /// Allocated texture size in texels.
    ///
    /// ### 中文
    /// 已分配的纹理尺寸（texel）。
    pub tex_size: PhysicalSize<u32>,
    /// ### English
    /// Image pixels packed per texel on each axis.
    ///
    /// ### 中文
    /// 每个轴上每个 texel 打包的图像像素数。
    pub pixels_per_texel: (u32, u32),
    pub rect: PlaneRect,
}

/// ### English
/// One ring slot: plane metadata plus a pin on the frame currently occupying it.
///
/// ### 中文
/// 环形缓冲中的一个槽位：平面元数据及当前占用该槽位的帧引用。
#[derive(Debug, Default)]
pub struct FrameBuffer {
    planes: [Plane; MAX_PLANES],
    source_size: PhysicalSize<u32>,
    chroma_shift: (u32, u32),
    /// ### English
    /// Mode the plane resources were created under (`None` = nothing created).
    ///
    /// ### 中文
    /// 创建平面资源时的模式（`None` = 未创建）。
    mode: Option<RenderMode>,
    occupant: Option<Arc<DecodedFrame>>,
    /// ### English
    /// Set by a successful bind/upload, cleared when the post-render signal fires.
    ///
    /// ### 中文
    /// 成功 bind/upload 时置位，渲染后信号发出时清除。
    sync_pending: bool,
}

impl FrameBuffer {
    /// ### English
    /// Plane records (luma, then two chroma planes).
    ///
    /// ### 中文
    /// 平面记录（亮度，随后是两个色度平面）。
    pub fn planes(&self) -> &[Plane; MAX_PLANES] {
        &self.planes
    }

    pub(crate) fn planes_mut(&mut self) -> &mut [Plane; MAX_PLANES] {
        &mut self.planes
    }

    /// ### English
    /// Texture id of every plane (`0` = none).
    ///
    /// ### 中文
    /// 每个平面的纹理 ID（`0` = 无）。
    pub fn texture_ids(&self) -> [u32; MAX_PLANES] {
        self.planes.map(|plane| plane.texture.id)
    }

    /// ### English
    /// Configured source image size.
    ///
    /// ### 中文
    /// 已配置的源图像尺寸。
    pub fn source_size(&self) -> PhysicalSize<u32> {
        self.source_size
    }

    /// ### English
    /// Log2 chroma subsampling on each axis.
    ///
    /// ### 中文
    /// 各轴色度下采样的 log2 值。
    pub fn chroma_shift(&self) -> (u32, u32) {
        self.chroma_shift
    }

    /// ### English
    /// Mode the slot was created under.
    ///
    /// ### 中文
    /// 槽位创建时所处的模式。
    pub fn mode(&self) -> Option<RenderMode> {
        self.mode
    }

    /// ### English
    /// Frame currently pinned in the slot.
    ///
    /// ### 中文
    /// 当前固定在槽位中的帧。
    pub fn occupant(&self) -> Option<&Arc<DecodedFrame>> {
        self.occupant.as_ref()
    }

    /// ### English
    /// Whether the next post-render hook will signal the occupant.
    ///
    /// ### 中文
    /// 下一次渲染后钩子是否会通知占用帧。
    pub fn sync_pending(&self) -> bool {
        self.sync_pending
    }

    pub(crate) fn set_sync_pending(&mut self, pending: bool) {
        self.sync_pending = pending;
    }

    /// ### English
    /// Whether a downstream geometry pass would treat this slot as initialized.
    ///
    /// ### 中文
    /// 下游几何处理是否会把该槽位视为已初始化。
    pub fn is_initialized(&self) -> bool {
        !self.planes[0].texture.is_empty()
    }

    /// ### English
    /// Number of renderer-owned texture ids currently recorded (aliases counted once).
    ///
    /// ### 中文
    /// 当前记录的渲染器自有纹理 ID 数量（别名只计一次）。
    pub fn owned_texture_count(&self) -> usize {
        self.owned_texture_ids().len()
    }

    fn owned_texture_ids(&self) -> Vec<u32> {
        let mut ids = Vec::with_capacity(MAX_PLANES);
        for plane in &self.planes {
            let texture = plane.texture;
            let owned = texture.ownership == Ownership::Owned && !texture.is_empty();
            if owned && !ids.contains(&texture.id) {
                ids.push(texture.id);
            }
        }
        ids
    }

    /// ### English
    /// Resets plane records and image geometry for a fresh slot in `mode`.
    ///
    /// ### 中文
    /// 为 `mode` 下的新槽位重置平面记录与图像几何信息。
    pub(crate) fn init_geometry(&mut self, mode: RenderMode, source_size: PhysicalSize<u32>) {
        self.planes = [Plane::default(); MAX_PLANES];
        self.source_size = source_size;
        self.chroma_shift = NV12_CHROMA_SHIFT;
        self.mode = Some(mode);
    }

    /// ### English
    /// Pins `frame` in this slot, releasing any different previous occupant first.
    ///
    /// ### 中文
    /// 将 `frame` 固定到该槽位；若之前的占用者不同，先将其释放。
    pub(crate) fn attach(&mut self, frame: Arc<DecodedFrame>) {
        if let Some(current) = &self.occupant {
            if Arc::ptr_eq(current, &frame) {
                return;
            }
        }
        self.detach_occupant();
        self.occupant = Some(frame);
    }

    /// ### English
    /// Unpins the occupant (if any) and tells the decoder it may recycle it.
    ///
    /// ### 中文
    /// 解除占用者的固定（若有），并通知解码器可回收该帧。
    pub(crate) fn detach_occupant(&mut self) {
        self.sync_pending = false;
        if let Some(frame) = self.occupant.take() {
            frame.signal_released();
        }
    }

    /// ### English
    /// Deletes owned textures and zeroes every plane id. Borrowed ids are never deleted.
    ///
    /// ### 中文
    /// 删除自有纹理，并将所有平面 ID 清零。借用的 ID 绝不删除。
    pub(crate) fn release_textures(&mut self, gl: &dyn TextureGl) {
        let owned = self.owned_texture_ids();
        if !owned.is_empty() {
            gl.delete_textures(&owned);
        }
        for plane in &mut self.planes {
            plane.texture = PlaneTexture::EMPTY;
        }
    }

    /// ### English
    /// Drops all metadata after textures were released; the slot returns to its pristine state.
    ///
    /// ### 中文
    /// 在纹理释放后丢弃所有元数据；槽位恢复初始状态。
    pub(crate) fn clear(&mut self) {
        self.planes = [Plane::default(); MAX_PLANES];
        self.source_size = PhysicalSize::default();
        self.chroma_shift = (0, 0);
        self.mode = None;
    }

    /// ### English
    /// Recomputes normalized sampling rects for the first `plane_count` planes from the source size
    /// versus the allocated texture size (accounts for decoder padding).
    ///
    /// ### 中文
    /// 根据源尺寸与已分配纹理尺寸重新计算前 `plane_count` 个平面的归一化采样矩形
    ///（考虑解码器 padding）。
    pub(crate) fn calculate_source_rects(&mut self, plane_count: usize) {
        let source = self.source_size;
        let chroma_shift = self.chroma_shift;
        for (index, plane) in self.planes.iter_mut().take(plane_count).enumerate() {
            let (shift_x, shift_y) = if index == 0 { (0, 0) } else { chroma_shift };
            let ppt_x = plane.pixels_per_texel.0.max(1) as f32;
            let ppt_y = plane.pixels_per_texel.1.max(1) as f32;
            let width = (source.width >> shift_x) as f32 / ppt_x;
            let height = (source.height >> shift_y) as f32 / ppt_y;

            plane.rect = if plane.tex_size.width == 0 || plane.tex_size.height == 0 {
                PlaneRect::default()
            } else {
                PlaneRect {
                    x1: 0.0,
                    y1: 0.0,
                    x2: width / plane.tex_size.width as f32,
                    y2: height / plane.tex_size.height as f32,
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_gl::RecordingGl;

    #[test]
    fn release_deletes_owned_once_and_zeroes_all() {
        let gl = RecordingGl::new();
        let mut buffer = FrameBuffer::default();
        buffer.init_geometry(RenderMode::CpuUpload, PhysicalSize::new(16, 16));
        buffer.planes_mut()[0].texture = PlaneTexture::owned(5);
        buffer.planes_mut()[1].texture = PlaneTexture::owned(6);
        buffer.planes_mut()[2].texture = PlaneTexture::owned(6);
        assert_eq!(buffer.owned_texture_count(), 2);

        buffer.release_textures(&gl);

        assert_eq!(gl.deleted(), vec![5, 6]);
        assert_eq!(buffer.texture_ids(), [0, 0, 0]);
    }

    #[test]
    fn release_never_deletes_borrowed() {
        let gl = RecordingGl::new();
        let mut buffer = FrameBuffer::default();
        buffer.init_geometry(RenderMode::ExternalSurface, PhysicalSize::new(16, 16));
        buffer.planes_mut()[0].texture = PlaneTexture::borrowed(42);
        buffer.planes_mut()[1].texture = PlaneTexture::borrowed(43);
        buffer.planes_mut()[2].texture = PlaneTexture::borrowed(43);

        buffer.release_textures(&gl);

        assert!(gl.deleted().is_empty());
        assert_eq!(buffer.texture_ids(), [0, 0, 0]);
    }

    #[test]
    fn source_rects_account_for_padding() {
        let mut buffer = FrameBuffer::default();
        buffer.init_geometry(RenderMode::ExternalSurface, PhysicalSize::new(1920, 1080));
        let planes = buffer.planes_mut();
        planes[0].tex_size = PhysicalSize::new(1920, 1088);
        planes[1].tex_size = PhysicalSize::new(960, 544);
        planes[2].tex_size = PhysicalSize::new(960, 544);
        for plane in planes.iter_mut() {
            plane.pixels_per_texel = (1, 1);
        }

        buffer.calculate_source_rects(MAX_PLANES);

        let luma = buffer.planes()[0].rect;
        assert_eq!(luma.x2, 1.0);
        assert!((luma.y2 - 1080.0 / 1088.0).abs() < f32::EPSILON);
        let chroma = buffer.planes()[1].rect;
        assert!((chroma.y2 - 540.0 / 544.0).abs() < f32::EPSILON);
        assert_eq!(buffer.planes()[2].rect, chroma);
    }
}
