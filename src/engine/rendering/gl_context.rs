//! ### English
//! GL function-table loader for the render thread.
//! Loads gleam (texture path) and glow (fence path) from one proc-address loader supplied by the
//! host and derives the capabilities the upload and sync paths depend on.
//!
//! ### 中文
//! 渲染线程的 GL 函数表加载器。
//! 通过宿主提供的同一个 proc-address 加载器加载 gleam（纹理路径）与 glow（fence 路径），
//! 并推导上传与同步路径依赖的能力。
use std::ffi::{CStr, CString, c_void};
use std::rc::Rc;
use std::sync::Arc;

use gleam::gl::{self, Gl};
use glow::HasContext as _;

use crate::engine::gl::{FenceGl, GleamTextureGl, GlowFenceGl, TextureGl};

pub(crate) fn parse_gl_version(version: &str) -> (u32, u32) {
    // Expected forms: `"4.6.0 ..."` or `"OpenGL ES 3.2 ..."`.
    let mut major = 0u32;
    let mut minor = 0u32;
    let number_token = version.split_whitespace().find(|t| {
        t.chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
    });
    if let Some(token) = number_token {
        let mut parts = token.split('.');
        if let Some(m) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            major = m;
        }
        if let Some(n) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            minor = n;
        }
    }
    (major, minor)
}

/// ### English
/// Capabilities derived from the GL version string.
///
/// ### 中文
/// 从 GL 版本字符串推导出的能力集。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlCaps {
    /// ### English
    /// Whether the context is OpenGL ES.
    ///
    /// ### 中文
    /// 是否为 OpenGL ES 上下文。
    pub is_gles: bool,
    /// ### English
    /// `(major, minor)` parsed from `GL_VERSION`.
    ///
    /// ### 中文
    /// 从 `GL_VERSION` 解析出的 `(major, minor)`。
    pub version: (u32, u32),
    /// ### English
    /// `R8`/`RG8` single/dual-channel textures are available (else `LUMINANCE`/`LUMINANCE_ALPHA`).
    ///
    /// ### 中文
    /// 是否支持 `R8`/`RG8` 单/双通道纹理（否则使用 `LUMINANCE`/`LUMINANCE_ALPHA`）。
    pub rg_textures: bool,
    /// ### English
    /// `glFenceSync` is available.
    ///
    /// ### 中文
    /// 是否支持 `glFenceSync`。
    pub fence_sync: bool,
}

impl GlCaps {
    /// ### English
    /// Desktop GL: RG textures since 3.0, sync objects since 3.2. GLES: both since 3.0.
    ///
    /// ### 中文
    /// 桌面 GL：RG 纹理自 3.0 起、同步对象自 3.2 起可用；GLES：两者均自 3.0 起可用。
    pub fn from_version_string(version: &str) -> Self {
        let is_gles = version.starts_with("OpenGL ES");
        let (major, minor) = parse_gl_version(version);
        let (rg_textures, fence_sync) = if is_gles {
            (major >= 3, major >= 3)
        } else {
            (major >= 3, major > 3 || (major == 3 && minor >= 2))
        };
        Self {
            is_gles,
            version: (major, minor),
            rg_textures,
            fence_sync,
        }
    }
}

/// ### English
/// Loaded GL function tables for the render thread's current context.
///
/// ### 中文
/// 渲染线程当前上下文已加载的 GL 函数表。
pub struct GlContext {
    /// ### English
    /// gleam GL API wrapper used for texture operations.
    ///
    /// ### 中文
    /// 用于纹理操作的 gleam GL API 封装。
    gl: Rc<dyn Gl>,
    /// ### English
    /// glow GL API used for fence/sync operations.
    ///
    /// ### 中文
    /// 用于 fence/sync 操作的 glow GL API。
    glow: Arc<glow::Context>,
    caps: GlCaps,
}

impl GlContext {
    /// ### English
    /// Loads GL entry points through `loader`.
    ///
    /// # Safety
    /// A GL context must be current on the calling thread, and `loader` must return valid
    /// function pointers (or null) for that context.
    ///
    /// ### 中文
    /// 通过 `loader` 加载 GL 入口点。
    ///
    /// # Safety
    /// 调用线程上必须有 current 的 GL 上下文，且 `loader` 必须为该上下文返回有效函数指针（或 null）。
    pub unsafe fn load(loader: impl Fn(&CStr) -> *const c_void) -> Self {
        let lookup = |name: &str| -> *const c_void {
            match CString::new(name) {
                Ok(cstr) => loader(cstr.as_c_str()),
                Err(_) => std::ptr::null(),
            }
        };

        let glow = unsafe { glow::Context::from_loader_function(lookup) };
        let gl_version = unsafe { glow.get_parameter_string(glow::VERSION) };
        let caps = GlCaps::from_version_string(&gl_version);

        let gl: Rc<dyn Gl> = unsafe {
            if caps.is_gles {
                gl::GlesFns::load_with(lookup)
            } else {
                gl::GlFns::load_with(lookup)
            }
        };

        tracing::info!(
            version = %gl_version,
            rg_textures = caps.rg_textures,
            fence_sync = caps.fence_sync,
            "loaded GL context"
        );

        Self {
            gl,
            glow: Arc::new(glow),
            caps,
        }
    }

    /// ### English
    /// Returns a texture seam over the gleam function table.
    ///
    /// ### 中文
    /// 返回基于 gleam 函数表的纹理接口。
    pub fn texture_gl(&self) -> Rc<dyn TextureGl> {
        Rc::new(GleamTextureGl::new(self.gl.clone()))
    }

    /// ### English
    /// Returns a fence seam over the glow function table.
    ///
    /// ### 中文
    /// 返回基于 glow 函数表的 fence 接口。
    pub fn fence_gl(&self) -> Rc<dyn FenceGl> {
        Rc::new(GlowFenceGl::new(self.glow.clone()))
    }

    /// ### English
    /// Capabilities derived from the GL version and extensions.
    ///
    /// ### 中文
    /// 根据 GL 版本与扩展推导出的能力。
    pub fn caps(&self) -> GlCaps {
        self.caps
    }
}
