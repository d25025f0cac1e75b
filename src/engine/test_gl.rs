//! ### English
//! Recording GL fake shared by unit tests.
//!
//! ### 中文
//! 单元测试共用的记录型 GL 假实现。

use std::cell::{Cell, RefCell};

use dpi::PhysicalSize;
use gleam::gl;

use super::gl::{FenceGl, TextureGl};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum GlCall {
    Gen(Vec<u32>),
    Delete(Vec<u32>),
    Bind(u32, u32),
    TexParameter(u32, u32, i32),
    TexImage {
        texture: u32,
        internal_format: i32,
        size: PhysicalSize<u32>,
        format: u32,
    },
    TexSubImage {
        texture: u32,
        size: PhysicalSize<u32>,
        format: u32,
        len: usize,
    },
    PixelStore(u32, i32),
    Flush,
    FenceInserted(u64),
    FenceDeleted(u64),
}

pub(crate) struct RecordingGl {
    calls: RefCell<Vec<GlCall>>,
    next_texture: Cell<u32>,
    next_fence: Cell<u64>,
    bound: Cell<u32>,
    /// Error returned by the next `get_error` call.
    pending_error: Cell<u32>,
    /// `gen_textures` returns zeros when set.
    fail_alloc: Cell<bool>,
}

impl RecordingGl {
    pub(crate) fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_texture: Cell::new(100),
            next_fence: Cell::new(0x1000),
            bound: Cell::new(0),
            pending_error: Cell::new(gl::NO_ERROR),
            fail_alloc: Cell::new(false),
        }
    }

    pub(crate) fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn deleted(&self) -> Vec<u32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                GlCall::Delete(ids) => Some(ids.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub(crate) fn bound_textures(&self) -> Vec<u32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                GlCall::Bind(_, id) if *id != 0 => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn fences_inserted(&self) -> Vec<u64> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                GlCall::FenceInserted(fence) => Some(*fence),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn raise_error(&self, error: u32) {
        self.pending_error.set(error);
    }

    pub(crate) fn fail_allocations(&self, fail: bool) {
        self.fail_alloc.set(fail);
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl TextureGl for RecordingGl {
    fn gen_textures(&self, n: usize) -> Vec<u32> {
        let ids: Vec<u32> = if self.fail_alloc.get() {
            vec![0; n]
        } else {
            (0..n)
                .map(|_| {
                    let id = self.next_texture.get();
                    self.next_texture.set(id + 1);
                    id
                })
                .collect()
        };
        self.record(GlCall::Gen(ids.clone()));
        ids
    }

    fn delete_textures(&self, textures: &[u32]) {
        self.record(GlCall::Delete(textures.to_vec()));
    }

    fn bind_texture(&self, target: u32, texture: u32) {
        self.bound.set(texture);
        self.record(GlCall::Bind(target, texture));
    }

    fn tex_parameter_i(&self, _target: u32, pname: u32, param: i32) {
        self.record(GlCall::TexParameter(self.bound.get(), pname, param));
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        internal_format: i32,
        size: PhysicalSize<u32>,
        format: u32,
        _pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage {
            texture: self.bound.get(),
            internal_format,
            size,
            format,
        });
    }

    fn tex_sub_image_2d(&self, _target: u32, size: PhysicalSize<u32>, format: u32, pixels: &[u8]) {
        self.record(GlCall::TexSubImage {
            texture: self.bound.get(),
            size,
            format,
            len: pixels.len(),
        });
    }

    fn pixel_store_i(&self, name: u32, param: i32) {
        self.record(GlCall::PixelStore(name, param));
    }

    fn get_error(&self) -> u32 {
        self.pending_error.replace(gl::NO_ERROR)
    }

    fn flush(&self) {
        self.record(GlCall::Flush);
    }
}

impl FenceGl for RecordingGl {
    fn insert_fence(&self) -> u64 {
        let fence = self.next_fence.get();
        self.next_fence.set(fence + 1);
        self.record(GlCall::FenceInserted(fence));
        self.record(GlCall::Flush);
        fence
    }

    fn is_fence_signaled(&self, _fence: u64) -> bool {
        true
    }

    fn delete_fence(&self, fence: u64) {
        self.record(GlCall::FenceDeleted(fence));
    }
}
