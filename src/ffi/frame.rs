//! ### English
//! C ABI bindings for decoded frames and the decoder-side event queue.
//!
//! ### 中文
//! 解码帧与解码器侧事件队列相关的 C ABI 绑定。

use std::sync::Arc;

use dpi::PhysicalSize;

use super::{HwDecEventQueue, HwDecFrame, HwDecFrameEvent};
use crate::engine::{
    DecodedFrame, ExternalSurface, FramePayload, PixelFormat, PlanarImage, frame_events,
};

/// ### English
/// Wraps `frame` into a handle, attaching a completion token from `queue` when non-NULL.
///
/// # Safety
/// `queue` must be NULL or a live handle from `hwdec_event_queue_create`.
///
/// ### 中文
/// 将 `frame` 包装为句柄；`queue` 非 NULL 时附加来自该队列的完成令牌。
///
/// # Safety
/// `queue` 必须为 NULL 或由 `hwdec_event_queue_create` 创建且仍存活的句柄。
unsafe fn into_handle(queue: *const HwDecEventQueue, frame: DecodedFrame) -> *mut HwDecFrame {
    let frame = if queue.is_null() {
        frame
    } else {
        let token = unsafe { (*queue).sender.token(frame.id()) };
        frame.with_completion(token)
    };
    Box::into_raw(Box::new(HwDecFrame {
        frame: Arc::new(frame),
    }))
}

#[unsafe(no_mangle)]
/// ### English
/// Creates an event queue. Frames created with this queue report `Sampled`/`Released` events
/// to it.
///
/// ### 中文
/// 创建事件队列。使用该队列创建的帧会向其报告 `Sampled`/`Released` 事件。
pub extern "C" fn hwdec_event_queue_create() -> *mut HwDecEventQueue {
    let (sender, receiver) = frame_events();
    Box::into_raw(Box::new(HwDecEventQueue { sender, receiver }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys an event queue. Frames still in flight keep working; their events are dropped and any
/// fence they would have carried is deleted by the renderer.
///
/// ### 中文
/// 销毁事件队列。仍在使用的帧不受影响，其事件会被丢弃，原本携带的 fence 由渲染器删除。
pub unsafe extern "C" fn hwdec_event_queue_destroy(queue: *mut HwDecEventQueue) {
    if queue.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(queue));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Pops one pending event into `out_event`. Returns `false` when the queue is empty.
///
/// ### 中文
/// 弹出一个待处理事件写入 `out_event`。队列为空时返回 `false`。
pub unsafe extern "C" fn hwdec_event_queue_poll(
    queue: *const HwDecEventQueue,
    out_event: *mut HwDecFrameEvent,
) -> bool {
    if queue.is_null() || out_event.is_null() {
        return false;
    }

    let Some(event) = (unsafe { (*queue).receiver.try_recv() }) else {
        return false;
    };
    unsafe {
        *out_event = event.into();
    }
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Creates a frame backed by decoder-owned GL textures (zero-copy path).
///
/// `luma_texture == 0` yields a frame without external handles, which selects the CPU-upload
/// mode and is not handled by the renderer. `queue` may be NULL (no completion events).
///
/// ### 中文
/// 创建由解码器持有的 GL 纹理支撑的帧（零拷贝路径）。
///
/// `luma_texture == 0` 会得到没有外部句柄的帧，它会选中 CPU 上传模式且不会被渲染器处理。
/// `queue` 可为 NULL（不产生完成事件）。
pub unsafe extern "C" fn hwdec_frame_create_external(
    queue: *const HwDecEventQueue,
    frame_id: u64,
    luma_texture: u32,
    chroma_texture: u32,
    width: u32,
    height: u32,
) -> *mut HwDecFrame {
    let frame = DecodedFrame::new(
        frame_id,
        FramePayload::ExternalSurface(ExternalSurface {
            luma_texture,
            chroma_texture,
            texture_size: PhysicalSize::new(width, height),
        }),
    );
    unsafe { into_handle(queue, frame) }
}

#[unsafe(no_mangle)]
/// ### English
/// Creates an NV12 frame by copying CPU-side planes (CPU-upload path).
///
/// `luma` must hold `luma_stride * height` bytes; `chroma` must hold
/// `chroma_stride * ceil(height / 2)` bytes. Returns NULL for NULL planes or zero sizes.
///
/// ### 中文
/// 通过拷贝 CPU 侧平面创建 NV12 帧（CPU 上传路径）。
///
/// `luma` 必须包含 `luma_stride * height` 字节；`chroma` 必须包含
/// `chroma_stride * ceil(height / 2)` 字节。平面为 NULL 或尺寸为 0 时返回 NULL。
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn hwdec_frame_create_nv12(
    queue: *const HwDecEventQueue,
    frame_id: u64,
    width: u32,
    height: u32,
    luma: *const u8,
    luma_stride: u32,
    chroma: *const u8,
    chroma_stride: u32,
) -> *mut HwDecFrame {
    if luma.is_null() || chroma.is_null() || width == 0 || height == 0 {
        return std::ptr::null_mut();
    }

    let luma_len = luma_stride as usize * height as usize;
    let chroma_len = chroma_stride as usize * (height as usize).div_ceil(2);
    let luma = unsafe { std::slice::from_raw_parts(luma, luma_len) }.to_vec();
    let chroma = unsafe { std::slice::from_raw_parts(chroma, chroma_len) }.to_vec();

    let image = PlanarImage {
        format: PixelFormat::Nv12,
        size: PhysicalSize::new(width, height),
        luma,
        luma_stride: luma_stride as usize,
        chroma,
        chroma_stride: chroma_stride as usize,
    };
    let frame = DecodedFrame::new(frame_id, FramePayload::CpuPlanar(image));
    unsafe { into_handle(queue, frame) }
}

#[unsafe(no_mangle)]
/// ### English
/// Updates the frame's validity flag (may be called from the decoder thread at any time).
///
/// ### 中文
/// 更新帧的有效标志（可随时在解码线程调用）。
pub unsafe extern "C" fn hwdec_frame_set_valid(frame: *const HwDecFrame, valid: bool) {
    if frame.is_null() {
        return;
    }
    unsafe { (*frame).frame.set_valid(valid) };
}

#[unsafe(no_mangle)]
/// ### English
/// Releases the caller's frame handle. The renderer keeps its own reference while the frame
/// occupies a slot.
///
/// ### 中文
/// 释放调用方的帧句柄。帧占用槽位期间渲染器仍保留其自身的引用。
pub unsafe extern "C" fn hwdec_frame_release(frame: *mut HwDecFrame) {
    if frame.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(frame));
    }
}
