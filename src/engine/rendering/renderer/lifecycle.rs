//! ### English
//! Slot lifecycle: create, upload/bind, post-render sync, release and teardown.
//!
//! ### 中文
//! 槽位生命周期：创建、上传/绑定、渲染后同步、释放与销毁。

use crate::engine::error::RenderError;
use crate::engine::mode::RenderMode;
use crate::engine::slot::{PLACEHOLDER_TEXTURE_ID, PlaneTexture};

use super::HwDecRenderer;

impl HwDecRenderer {
    /// ### English
    /// Prepares slot `index` for the configured mode.
    ///
    /// Prior state at the index is always deleted first. External-surface slots get no GPU
    /// allocation (only geometry and a placeholder plane-0 id); CPU-upload slots get owned
    /// textures from the uploader. An allocation failure disables the hardware path.
    ///
    /// ### 中文
    /// 为已配置的模式准备槽位 `index`。
    ///
    /// 总是先删除该索引上的旧状态。外部 surface 槽位不做 GPU 分配（只设置几何信息与平面 0 的占位 ID）；
    /// CPU 上传槽位由上传器分配自有纹理。分配失败会关闭硬件路径。
    pub fn create_texture(&mut self, index: usize) -> Result<(), RenderError> {
        let mode = self.selector.mode().ok_or(RenderError::NotConfigured)?;
        self.pool.get(index)?;
        self.pool.delete_slot(&*self.gl, index);

        let source_size = self.source_size;
        let buffer = self.pool.get_mut(index)?;
        buffer.init_geometry(mode, source_size);

        match mode {
            RenderMode::ExternalSurface => {
                buffer.planes_mut()[0].texture = PlaneTexture::borrowed(PLACEHOLDER_TEXTURE_ID);
                tracing::debug!(slot = index, "prepared external-surface slot");
                Ok(())
            }
            RenderMode::CpuUpload => {
                let result = self.uploader.create_textures(&*self.gl, index, buffer);
                match &result {
                    Ok(()) => tracing::debug!(slot = index, "created cpu-upload textures"),
                    Err(err) => {
                        self.hw_disabled = true;
                        tracing::warn!(slot = index, %err, "disabling hardware path");
                        self.pool.delete_slot(&*self.gl, index);
                    }
                }
                result
            }
        }
    }

    /// ### English
    /// Deletes slot `index` (idempotent, never fails).
    ///
    /// ### 中文
    /// 删除槽位 `index`（幂等，永不失败）。
    pub fn delete_texture(&mut self, index: usize) {
        self.pool.delete_slot(&*self.gl, index);
    }

    /// ### English
    /// Detaches the occupant of slot `index` and drops its textures, keeping its geometry.
    ///
    /// ### 中文
    /// 解除槽位 `index` 的占用帧并丢弃其纹理，但保留几何信息。
    pub fn release_texture(&mut self, index: usize) {
        self.pool.release_slot(&*self.gl, index);
    }

    /// ### English
    /// Processes the occupant of slot `index` through the configured path.
    ///
    /// On success the slot is marked for the next `after_render`. On failure the caller should
    /// skip rendering this frame.
    ///
    /// ### 中文
    /// 通过已配置的路径处理槽位 `index` 的占用帧。
    ///
    /// 成功时槽位会被标记，等待下一次 `after_render`。失败时调用方应跳过本帧渲染。
    pub fn upload_texture(&mut self, index: usize) -> Result<(), RenderError> {
        let configured = self.selector.mode().ok_or(RenderError::NotConfigured)?;
        let buffer = self.pool.get_mut(index)?;

        let Some(frame) = buffer.occupant().cloned() else {
            return Err(RenderError::InvalidDescriptor);
        };
        if !frame.is_valid() {
            tracing::warn!(slot = index, frame_id = frame.id(), "occupant is not valid yet");
            return Err(RenderError::InvalidDescriptor);
        }
        let required = frame.render_mode();
        if required != configured {
            return Err(RenderError::FrameModeMismatch {
                frame: required,
                configured,
            });
        }
        if buffer.mode() != Some(configured) {
            return Err(RenderError::SlotNotCreated { slot: index });
        }

        let result = match configured {
            RenderMode::ExternalSurface => self.binder.bind(&*self.gl, buffer),
            RenderMode::CpuUpload => match frame.planar_image() {
                Some(_) if !buffer.is_initialized() => {
                    Err(RenderError::SlotNotCreated { slot: index })
                }
                Some(image) => self.uploader.upload(&*self.gl, buffer, image),
                None => Err(RenderError::InvalidDescriptor),
            },
        };

        match &result {
            Ok(()) => buffer.set_sync_pending(true),
            Err(err) => tracing::warn!(slot = index, frame_id = frame.id(), %err, "upload failed"),
        }
        result
    }

    /// ### English
    /// Post-render hook for slot `index`.
    ///
    /// Signals the occupant's completion token exactly once per successful upload: with a fresh
    /// GL fence when fences are enabled, otherwise with `0` after a flush. Ownership of the fence
    /// moves to the decoder. If the decoder's receiver is gone the fence is deleted here instead.
    /// No-op on an empty slot or when nothing was uploaded since the last call.
    ///
    /// ### 中文
    /// 槽位 `index` 的渲染后钩子。
    ///
    /// 每次成功上传后恰好通知一次占用帧的完成令牌：启用 fence 时携带新插入的 GL fence，
    /// 否则在 flush 后携带 `0`。fence 的所有权转移给解码器；若解码器的接收端已不存在，则在此删除 fence。
    /// 槽位为空或自上次调用以来未上传时为空操作。
    pub fn after_render(&mut self, index: usize) {
        let fence_enabled = self.render_fence_enabled();
        let Ok(buffer) = self.pool.get_mut(index) else {
            return;
        };
        if !buffer.sync_pending() {
            return;
        }
        buffer.set_sync_pending(false);

        let Some(frame) = buffer.occupant() else {
            return;
        };
        if !frame.has_completion() {
            return;
        }

        let fence = match &self.fence_gl {
            Some(fence_gl) if fence_enabled => fence_gl.insert_fence(),
            _ => {
                self.gl.flush();
                0
            }
        };
        if frame.signal_sampled(fence) {
            tracing::debug!(slot = index, frame_id = frame.id(), fence, "signaled sampled frame");
            return;
        }

        tracing::debug!(
            slot = index,
            frame_id = frame.id(),
            fence,
            "decoder stopped listening, reclaiming fence"
        );
        match &self.fence_gl {
            Some(fence_gl) if fence != 0 => fence_gl.delete_fence(fence),
            _ => {}
        }
    }

    /// ### English
    /// Non-blocking poll of a fence handed out by `after_render`. `0` and fences from a renderer
    /// without fence support count as signaled.
    ///
    /// ### 中文
    /// 非阻塞查询 `after_render` 交出的 fence。`0` 以及不支持 fence 的渲染器视为已 signal。
    pub fn is_fence_signaled(&self, fence: u64) -> bool {
        match &self.fence_gl {
            Some(fence_gl) if fence != 0 => fence_gl.is_fence_signaled(fence),
            _ => true,
        }
    }

    /// ### English
    /// Deletes a fence handed out by `after_render` on behalf of the decoder (no-op for `0`).
    ///
    /// ### 中文
    /// 代解码器删除 `after_render` 交出的 fence（`0` 时为空操作）。
    pub fn delete_fence(&self, fence: u64) {
        if fence == 0 {
            return;
        }
        if let Some(fence_gl) = &self.fence_gl {
            fence_gl.delete_fence(fence);
        }
    }

    /// ### English
    /// Deletes every slot and forgets the configured mode (idempotent).
    ///
    /// ### 中文
    /// 删除所有槽位并清除已配置的模式（幂等）。
    pub fn destroy(&mut self) {
        self.pool.delete_all(&*self.gl);
        self.selector.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::sync::Arc;

    use dpi::PhysicalSize;
    use gleam::gl;

    use super::*;
    use crate::engine::flags::HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE;
    use crate::engine::frame::{
        DecodedFrame, ExternalSurface, FrameEvent, FrameEventReceiver, FramePayload, PlanarImage,
        frame_events,
    };
    use crate::engine::rendering::base::StaticCapabilities;
    use crate::engine::rendering::renderer::HwDecRendererInit;
    use crate::engine::rendering::upload::{Nv12TextureFormats, Nv12Uploader};
    use crate::engine::test_gl::{GlCall, RecordingGl};

    const SIZE: PhysicalSize<u32> = PhysicalSize::new(64, 32);

    fn renderer_with(gl: &Rc<RecordingGl>, buffer_count: usize, flags: u32) -> HwDecRenderer {
        HwDecRenderer::new(HwDecRendererInit {
            texture_gl: gl.clone(),
            fence_gl: Some(gl.clone()),
            base: Box::new(StaticCapabilities::nv12_defaults()),
            uploader: Box::new(Nv12Uploader::new(
                gl::TEXTURE_2D,
                Nv12TextureFormats::for_caps(true),
            )),
            source_size: SIZE,
            buffer_count,
            texture_target: gl::TEXTURE_2D,
            flags,
        })
    }

    fn external(id: u64) -> DecodedFrame {
        DecodedFrame::new(
            id,
            FramePayload::ExternalSurface(ExternalSurface {
                luma_texture: 42,
                chroma_texture: 43,
                texture_size: SIZE,
            }),
        )
    }

    fn planar(id: u64) -> DecodedFrame {
        DecodedFrame::new(
            id,
            FramePayload::CpuPlanar(PlanarImage::nv12(SIZE, vec![16; 64 * 32], vec![128; 64 * 16])),
        )
    }

    fn tracked(frame: DecodedFrame) -> (Arc<DecodedFrame>, FrameEventReceiver) {
        let (sender, receiver) = frame_events();
        let id = frame.id();
        (Arc::new(frame.with_completion(sender.token(id))), receiver)
    }

    #[test]
    fn create_requires_configuration() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 2, 0);
        assert_eq!(renderer.create_texture(0), Err(RenderError::NotConfigured));
    }

    #[test]
    fn external_create_allocates_nothing() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 2, 0);
        renderer.configure(&external(1), SIZE);

        renderer.create_texture(0).unwrap();

        let slot = renderer.slot(0).unwrap();
        assert!(slot.is_initialized());
        assert_eq!(slot.chroma_shift(), (1, 1));
        assert_eq!(slot.source_size(), SIZE);
        assert_eq!(slot.owned_texture_count(), 0);
        assert!(!gl.calls().iter().any(|call| matches!(call, GlCall::Gen(_))));
    }

    #[test]
    fn cpu_slot_uploads_and_signals_once_with_fence() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 2, 0);
        let (frame, events) = tracked(planar(5));
        renderer.configure(&frame, SIZE);
        renderer.create_texture(1).unwrap();

        renderer.add_frame(1, frame).unwrap();
        renderer.upload_texture(1).unwrap();
        renderer.after_render(1);
        renderer.after_render(1);

        let fences = gl.fences_inserted();
        assert_eq!(fences.len(), 1);
        assert_eq!(
            events.drain(),
            vec![FrameEvent::Sampled {
                frame_id: 5,
                fence: fences[0]
            }]
        );
    }

    #[test]
    fn unsafe_flag_signals_without_fence() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 1, HWDEC_RENDER_FLAG_UNSAFE_NO_RENDER_FENCE);
        let (frame, events) = tracked(external(8));
        renderer.configure(&frame, SIZE);
        renderer.create_texture(0).unwrap();

        renderer.bind_frame(0, frame).unwrap();
        renderer.after_render(0);

        assert!(gl.fences_inserted().is_empty());
        assert!(gl.calls().contains(&GlCall::Flush));
        assert_eq!(
            events.drain(),
            vec![FrameEvent::Sampled {
                frame_id: 8,
                fence: 0
            }]
        );
    }

    #[test]
    fn fence_is_reclaimed_when_decoder_stopped_listening() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 1, 0);
        let (frame, events) = tracked(external(6));
        drop(events);
        renderer.configure(&frame, SIZE);
        renderer.create_texture(0).unwrap();
        renderer.bind_frame(0, frame).unwrap();

        renderer.after_render(0);
        drop(renderer);

        let fences = gl.fences_inserted();
        assert_eq!(fences.len(), 1);
        assert!(gl.calls().contains(&GlCall::FenceDeleted(fences[0])));
    }

    #[test]
    fn after_render_on_empty_or_failed_slot_is_noop() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 2, 0);
        let (frame, events) = tracked(external(3));
        renderer.configure(&frame, SIZE);
        renderer.create_texture(0).unwrap();

        renderer.after_render(0);
        renderer.after_render(7);

        frame.set_valid(false);
        renderer.add_frame(0, frame.clone()).unwrap();
        assert_eq!(renderer.upload_texture(0), Err(RenderError::InvalidDescriptor));
        renderer.after_render(0);

        assert!(gl.fences_inserted().is_empty());
        assert!(events.drain().is_empty());
    }

    #[test]
    fn allocation_failure_disables_hardware_path() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 2, 0);
        let frame = planar(1);
        renderer.configure(&frame, SIZE);
        assert!(renderer.handles_frame(&frame));

        gl.fail_allocations(true);
        let err = renderer.create_texture(0).unwrap_err();

        assert!(matches!(err, RenderError::AllocationFailure { slot: 0, .. }));
        assert!(renderer.is_hw_disabled());
        assert!(!renderer.handles_frame(&frame));
        assert!(!renderer.handles_frame(&external(2)));
        assert_eq!(renderer.slot(0).unwrap().texture_ids(), [0, 0, 0]);
    }

    #[test]
    fn frame_of_other_mode_is_rejected() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 1, 0);
        renderer.configure(&planar(1), SIZE);
        renderer.create_texture(0).unwrap();

        renderer.add_frame(0, Arc::new(external(2))).unwrap();

        assert_eq!(
            renderer.upload_texture(0),
            Err(RenderError::FrameModeMismatch {
                frame: RenderMode::ExternalSurface,
                configured: RenderMode::CpuUpload,
            })
        );
    }

    #[test]
    fn upload_before_create_reports_missing_slot() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 1, 0);
        let frame = Arc::new(planar(1));
        renderer.configure(&frame, SIZE);

        renderer.add_frame(0, frame).unwrap();

        assert_eq!(
            renderer.upload_texture(0),
            Err(RenderError::SlotNotCreated { slot: 0 })
        );
    }

    #[test]
    fn reconfigure_tears_down_owned_textures() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 2, 0);
        renderer.configure(&planar(1), SIZE);
        renderer.create_texture(0).unwrap();
        renderer.create_texture(1).unwrap();

        renderer.configure(&external(2), SIZE);

        let mut deleted = gl.deleted();
        deleted.sort_unstable();
        assert_eq!(deleted, vec![100, 101, 102, 103]);
        for slot in renderer.slots() {
            assert_eq!(slot.texture_ids(), [0, 0, 0]);
            assert_eq!(slot.mode(), None);
        }
    }

    #[test]
    fn destroy_releases_occupants_and_is_idempotent() {
        let gl = Rc::new(RecordingGl::new());
        let mut renderer = renderer_with(&gl, 1, 0);
        let (frame, events) = tracked(external(4));
        renderer.configure(&frame, SIZE);
        renderer.create_texture(0).unwrap();
        renderer.bind_frame(0, frame).unwrap();

        renderer.destroy();
        renderer.destroy();

        assert_eq!(events.drain(), vec![FrameEvent::Released { frame_id: 4 }]);
        assert_eq!(renderer.mode(), None);
        assert!(gl.deleted().is_empty());
    }
}
