//! ### English
//! C ABI bindings for the renderer lifecycle and pipeline hooks.
//!
//! ### 中文
//! 渲染器生命周期与管线钩子相关的 C ABI 绑定。

use std::ffi::{CStr, c_char, c_void};

use dpi::PhysicalSize;

use super::{HwDecFrame, HwDecPlane, HwDecRender};
use crate::engine::slot::MAX_PLANES;
use crate::engine::{
    BaseRenderer, GlContext, HwDecRenderer, HwDecRendererInit, RenderFeature, ScalingMethod,
    StaticCapabilities,
};

/// ### English
/// `GetProcAddress`-style loader supplied by the host.
///
/// ### 中文
/// 宿主提供的 `GetProcAddress` 风格加载函数。
pub type HwDecGetProcAddress = unsafe extern "C" fn(name: *const c_char) -> *const c_void;

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Capability callbacks of the host's generic renderer base. Raw values follow
/// `RenderFeature`/`ScalingMethod`.
///
/// ### 中文
/// 宿主通用渲染器基类的能力回调。原始值与 `RenderFeature`/`ScalingMethod` 一致。
pub struct HwDecCapabilityCallbacks {
    pub user_data: *mut c_void,
    pub supports_feature: Option<unsafe extern "C" fn(user_data: *mut c_void, feature: u32) -> bool>,
    pub supports_scaling: Option<unsafe extern "C" fn(user_data: *mut c_void, method: u32) -> bool>,
}

/// ### English
/// `BaseRenderer` answered by host callbacks; a missing callback answers `false`.
///
/// ### 中文
/// 由宿主回调回答的 `BaseRenderer`；缺失的回调一律返回 `false`。
struct CallbackCapabilities {
    callbacks: HwDecCapabilityCallbacks,
}

impl BaseRenderer for CallbackCapabilities {
    fn supports_feature(&self, feature: RenderFeature) -> bool {
        match self.callbacks.supports_feature {
            Some(callback) => unsafe { callback(self.callbacks.user_data, feature as u32) },
            None => false,
        }
    }

    fn supports_scaling(&self, method: ScalingMethod) -> bool {
        match self.callbacks.supports_scaling {
            Some(callback) => unsafe { callback(self.callbacks.user_data, method as u32) },
            None => false,
        }
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Creates a renderer for the GL context current on the calling thread.
///
/// `capabilities` may be NULL, in which case a fixed NV12 capability list is used.
/// `buffer_count == 0` selects the default slot count. `flags` is a `HWDEC_RENDER_FLAG_*` bitmask.
/// Returns NULL when `get_proc_address` is NULL.
///
/// ### 中文
/// 为调用线程上 current 的 GL 上下文创建渲染器。
///
/// `capabilities` 可为 NULL，此时使用固定的 NV12 能力列表。
/// `buffer_count == 0` 表示使用默认槽位数量。`flags` 为 `HWDEC_RENDER_FLAG_*` 位掩码。
/// 当 `get_proc_address` 为 NULL 时返回 NULL。
pub unsafe extern "C" fn hwdec_render_create(
    get_proc_address: Option<HwDecGetProcAddress>,
    capabilities: *const HwDecCapabilityCallbacks,
    width: u32,
    height: u32,
    buffer_count: u32,
    flags: u32,
) -> *mut HwDecRender {
    let Some(get_proc_address) = get_proc_address else {
        return std::ptr::null_mut();
    };

    let loader = |name: &CStr| unsafe { get_proc_address(name.as_ptr()) };
    let ctx = unsafe { GlContext::load(loader) };
    let base: Box<dyn BaseRenderer> = if capabilities.is_null() {
        Box::new(StaticCapabilities::nv12_defaults())
    } else {
        Box::new(CallbackCapabilities {
            callbacks: unsafe { *capabilities },
        })
    };

    let mut init = HwDecRendererInit::from_context(&ctx, base, PhysicalSize::new(width, height));
    if buffer_count != 0 {
        init.buffer_count = buffer_count as usize;
    }
    init.flags = flags;

    Box::into_raw(Box::new(HwDecRender {
        renderer: HwDecRenderer::new(init),
    }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a renderer created by `hwdec_render_create`.
///
/// Every slot is deleted and every occupant is released to its decoder. Must be called on the
/// render thread with the context current.
///
/// ### 中文
/// 销毁由 `hwdec_render_create` 创建的渲染器。
///
/// 所有槽位都会被删除，所有占用帧都会交还给解码器。必须在渲染线程且上下文 current 时调用。
pub unsafe extern "C" fn hwdec_render_destroy(render: *mut HwDecRender) {
    if render.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(render));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Configuration event: tears down all slots and caches `frame`'s mode and the source size.
///
/// ### 中文
/// 配置事件：销毁所有槽位，并缓存 `frame` 的模式与源尺寸。
pub unsafe extern "C" fn hwdec_render_configure(
    render: *mut HwDecRender,
    frame: *const HwDecFrame,
    width: u32,
    height: u32,
) -> bool {
    if render.is_null() || frame.is_null() {
        return false;
    }

    let frame = unsafe { &(*frame).frame };
    unsafe {
        (*render)
            .renderer
            .configure(frame, PhysicalSize::new(width, height))
    };
    true
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `true` iff `frame` requires a reconfiguration.
///
/// ### 中文
/// 仅当 `frame` 需要重新配置时返回 `true`。
pub unsafe extern "C" fn hwdec_render_config_changed(
    render: *const HwDecRender,
    frame: *const HwDecFrame,
) -> bool {
    if render.is_null() || frame.is_null() {
        return false;
    }
    unsafe { (*render).renderer.config_changed(&(*frame).frame) }
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `true` if the renderer can present `frame` (always `false` after an allocation
/// failure disabled the hardware path).
///
/// ### 中文
/// 渲染器能够呈现 `frame` 时返回 `true`（分配失败关闭硬件路径后始终为 `false`）。
pub unsafe extern "C" fn hwdec_render_handles_frame(
    render: *const HwDecRender,
    frame: *const HwDecFrame,
) -> bool {
    if render.is_null() || frame.is_null() {
        return false;
    }
    unsafe { (*render).renderer.handles_frame(&(*frame).frame) }
}

#[unsafe(no_mangle)]
/// ### English
/// Returns the `ShaderFormat` discriminant for the configured mode (`0` when unconfigured).
///
/// ### 中文
/// 返回当前配置模式对应的 `ShaderFormat` 取值（未配置时为 `0`）。
pub unsafe extern "C" fn hwdec_render_shader_format(render: *const HwDecRender) -> u32 {
    if render.is_null() {
        return 0;
    }
    unsafe { (*render).renderer.shader_format() as u32 }
}

#[unsafe(no_mangle)]
/// ### English
/// Capability pass-through; unknown feature values answer `false`.
///
/// ### 中文
/// 能力查询透传；未知特性取值返回 `false`。
pub unsafe extern "C" fn hwdec_render_supports_feature(
    render: *const HwDecRender,
    feature: u32,
) -> bool {
    if render.is_null() {
        return false;
    }
    let Some(feature) = RenderFeature::from_raw(feature) else {
        return false;
    };
    unsafe { (*render).renderer.supports_feature(feature) }
}

#[unsafe(no_mangle)]
/// ### English
/// Capability pass-through; unknown scaling values answer `false`.
///
/// ### 中文
/// 能力查询透传；未知缩放取值返回 `false`。
pub unsafe extern "C" fn hwdec_render_supports_scaling(
    render: *const HwDecRender,
    method: u32,
) -> bool {
    if render.is_null() {
        return false;
    }
    let Some(method) = ScalingMethod::from_raw(method) else {
        return false;
    };
    unsafe { (*render).renderer.supports_scaling(method) }
}

#[unsafe(no_mangle)]
/// ### English
/// `CreateTexture` hook. Returns `false` on failure.
///
/// ### 中文
/// `CreateTexture` 钩子。失败时返回 `false`。
pub unsafe extern "C" fn hwdec_render_create_texture(render: *mut HwDecRender, index: u32) -> bool {
    if render.is_null() {
        return false;
    }
    unsafe { (*render).renderer.create_texture(index as usize).is_ok() }
}

#[unsafe(no_mangle)]
/// ### English
/// `DeleteTexture` hook (idempotent).
///
/// ### 中文
/// `DeleteTexture` 钩子（幂等）。
pub unsafe extern "C" fn hwdec_render_delete_texture(render: *mut HwDecRender, index: u32) {
    if render.is_null() {
        return;
    }
    unsafe { (*render).renderer.delete_texture(index as usize) };
}

#[unsafe(no_mangle)]
/// ### English
/// Attaches `frame` to slot `index`. The renderer takes its own reference; the caller keeps
/// (and must still release) its handle.
///
/// ### 中文
/// 将 `frame` 挂到槽位 `index`。渲染器会持有自己的引用；调用方仍保留（并须自行释放）其句柄。
pub unsafe extern "C" fn hwdec_render_add_frame(
    render: *mut HwDecRender,
    index: u32,
    frame: *const HwDecFrame,
) -> bool {
    if render.is_null() || frame.is_null() {
        return false;
    }
    let frame = unsafe { (*frame).frame.clone() };
    unsafe { (*render).renderer.add_frame(index as usize, frame).is_ok() }
}

#[unsafe(no_mangle)]
/// ### English
/// `UploadTexture` hook. Returns `false` when the frame should be skipped.
///
/// ### 中文
/// `UploadTexture` 钩子。返回 `false` 时应跳过本帧。
pub unsafe extern "C" fn hwdec_render_upload_texture(render: *mut HwDecRender, index: u32) -> bool {
    if render.is_null() {
        return false;
    }
    unsafe { (*render).renderer.upload_texture(index as usize).is_ok() }
}

#[unsafe(no_mangle)]
/// ### English
/// `AfterRender` hook: call once right after slot `index` was sampled.
///
/// ### 中文
/// `AfterRender` 钩子：在槽位 `index` 被采样后立即调用一次。
pub unsafe extern "C" fn hwdec_render_after_render(render: *mut HwDecRender, index: u32) {
    if render.is_null() {
        return;
    }
    unsafe { (*render).renderer.after_render(index as usize) };
}

#[unsafe(no_mangle)]
/// ### English
/// Writes the planes of slot `index` into `out_planes` (capacity `capacity`).
///
/// Returns the number of planes written (`0` for NULL pointers or an out-of-range slot).
///
/// ### 中文
/// 将槽位 `index` 的平面写入 `out_planes`（容量为 `capacity`）。
///
/// 返回写入的平面数量（指针为 NULL 或槽位越界时为 `0`）。
pub unsafe extern "C" fn hwdec_render_slot_planes(
    render: *const HwDecRender,
    index: u32,
    out_planes: *mut HwDecPlane,
    capacity: u32,
) -> u32 {
    if render.is_null() || out_planes.is_null() || capacity == 0 {
        return 0;
    }

    let Ok(buffer) = (unsafe { (*render).renderer.slot(index as usize) }) else {
        return 0;
    };
    let count = (capacity as usize).min(MAX_PLANES);
    let planes_out = unsafe { std::slice::from_raw_parts_mut(out_planes, count) };
    for (out, plane) in planes_out.iter_mut().zip(buffer.planes()) {
        *out = plane.into();
    }
    count as u32
}

#[unsafe(no_mangle)]
/// ### English
/// Non-blocking poll of a fence handed out in a `Sampled` event. `0` counts as signaled.
///
/// ### 中文
/// 非阻塞查询 `Sampled` 事件中交出的 fence。`0` 视为已 signal。
pub unsafe extern "C" fn hwdec_render_fence_signaled(render: *const HwDecRender, fence: u64) -> bool {
    if render.is_null() {
        return false;
    }
    unsafe { (*render).renderer.is_fence_signaled(fence) }
}

#[unsafe(no_mangle)]
/// ### English
/// Deletes a fence handed out in a `Sampled` event (no-op for `0`).
///
/// ### 中文
/// 删除 `Sampled` 事件中交出的 fence（`0` 时为空操作）。
pub unsafe extern "C" fn hwdec_render_delete_fence(render: *const HwDecRender, fence: u64) {
    if render.is_null() {
        return;
    }
    unsafe { (*render).renderer.delete_fence(fence) };
}
