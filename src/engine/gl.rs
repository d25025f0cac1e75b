//! ### English
//! Narrow GL seams used by the slot pool, the texture binder and the CPU uploader.
//!
//! Only the handful of texture/sync entry points this crate needs are exposed, so the whole
//! buffer lifecycle can be driven by a recording fake in tests.
//!
//! ### 中文
//! 槽位池、纹理绑定器与 CPU 上传器使用的精简 GL 接口。
//!
//! 只暴露本 crate 需要的少量纹理/同步入口，使整个缓冲生命周期可以在测试中由记录型假实现驱动。

use std::rc::Rc;
use std::sync::Arc;

use dpi::PhysicalSize;
use gleam::gl::{self, Gl};
use glow::HasContext as _;

/// ### English
/// Texture-object operations (render thread only).
///
/// ### 中文
/// 纹理对象操作（仅限渲染线程）。
pub trait TextureGl {
    fn gen_textures(&self, n: usize) -> Vec<u32>;
    fn delete_textures(&self, textures: &[u32]);
    fn bind_texture(&self, target: u32, texture: u32);
    fn tex_parameter_i(&self, target: u32, pname: u32, param: i32);
    /// ### English
    /// Allocates (and optionally fills) level 0 storage of the bound texture.
    ///
    /// ### 中文
    /// 为当前绑定纹理分配（并可选填充）第 0 级存储。
    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: i32,
        size: PhysicalSize<u32>,
        format: u32,
        pixels: Option<&[u8]>,
    );
    /// ### English
    /// Replaces the full level 0 contents of the bound texture; `pixels` is tightly packed.
    ///
    /// ### 中文
    /// 替换当前绑定纹理第 0 级的全部内容；`pixels` 为紧密排列。
    fn tex_sub_image_2d(&self, target: u32, size: PhysicalSize<u32>, format: u32, pixels: &[u8]);
    fn pixel_store_i(&self, name: u32, param: i32);
    fn get_error(&self) -> u32;
    fn flush(&self);
}

/// ### English
/// Sync-object operations. Fences are `GLsync` handles cast to `u64`; `0` means "no fence".
///
/// ### 中文
/// 同步对象操作。fence 为转成 `u64` 的 `GLsync` 句柄；`0` 表示“无 fence”。
pub trait FenceGl {
    /// ### English
    /// Inserts a GPU-commands-complete fence and flushes, returning `0` on failure.
    ///
    /// ### 中文
    /// 插入 GPU 命令完成 fence 并 flush；失败返回 `0`。
    fn insert_fence(&self) -> u64;
    /// ### English
    /// Non-blocking poll of a fence.
    ///
    /// ### 中文
    /// 非阻塞地轮询 fence。
    fn is_fence_signaled(&self, fence: u64) -> bool;
    fn delete_fence(&self, fence: u64);
}

/// ### English
/// `TextureGl` backed by gleam.
///
/// ### 中文
/// 基于 gleam 的 `TextureGl` 实现。
pub struct GleamTextureGl {
    gl: Rc<dyn Gl>,
}

impl GleamTextureGl {
    pub fn new(gl: Rc<dyn Gl>) -> Self {
        Self { gl }
    }
}

impl TextureGl for GleamTextureGl {
    fn gen_textures(&self, n: usize) -> Vec<u32> {
        self.gl.gen_textures(n as gl::GLsizei)
    }

    fn delete_textures(&self, textures: &[u32]) {
        self.gl.delete_textures(textures);
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.gl.bind_texture(target, texture);
    }

    fn tex_parameter_i(&self, target: u32, pname: u32, param: i32) {
        self.gl.tex_parameter_i(target, pname, param);
    }

    fn tex_image_2d(
        &self,
        target: u32,
        internal_format: i32,
        size: PhysicalSize<u32>,
        format: u32,
        pixels: Option<&[u8]>,
    ) {
        self.gl.tex_image_2d(
            target,
            0,
            internal_format,
            size.width as gl::GLsizei,
            size.height as gl::GLsizei,
            0,
            format,
            gl::UNSIGNED_BYTE,
            pixels,
        );
    }

    fn tex_sub_image_2d(&self, target: u32, size: PhysicalSize<u32>, format: u32, pixels: &[u8]) {
        self.gl.tex_sub_image_2d(
            target,
            0,
            0,
            0,
            size.width as gl::GLsizei,
            size.height as gl::GLsizei,
            format,
            gl::UNSIGNED_BYTE,
            pixels,
        );
    }

    fn pixel_store_i(&self, name: u32, param: i32) {
        self.gl.pixel_store_i(name, param);
    }

    fn get_error(&self) -> u32 {
        self.gl.get_error()
    }

    fn flush(&self) {
        self.gl.flush();
    }
}

/// ### English
/// `FenceGl` backed by glow (`glFenceSync` / `glClientWaitSync` / `glDeleteSync`).
///
/// ### 中文
/// 基于 glow 的 `FenceGl` 实现（`glFenceSync` / `glClientWaitSync` / `glDeleteSync`）。
pub struct GlowFenceGl {
    glow: Arc<glow::Context>,
}

impl GlowFenceGl {
    pub fn new(glow: Arc<glow::Context>) -> Self {
        Self { glow }
    }

    #[inline]
    fn native(fence: u64) -> glow::NativeFence {
        glow::NativeFence(fence as usize as *mut _)
    }
}

impl FenceGl for GlowFenceGl {
    fn insert_fence(&self) -> u64 {
        let fence = unsafe { self.glow.fence_sync(glow::SYNC_GPU_COMMANDS_COMPLETE, 0) };
        unsafe { self.glow.flush() };
        match fence {
            Ok(sync) => sync.0 as usize as u64,
            Err(_) => 0,
        }
    }

    fn is_fence_signaled(&self, fence: u64) -> bool {
        if fence == 0 {
            return true;
        }
        let status = unsafe { self.glow.client_wait_sync(Self::native(fence), 0, 0) };
        status == glow::ALREADY_SIGNALED || status == glow::CONDITION_SATISFIED
    }

    fn delete_fence(&self, fence: u64) {
        if fence == 0 {
            return;
        }
        unsafe { self.glow.delete_sync(Self::native(fence)) };
    }
}
