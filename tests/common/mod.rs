#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dpi::PhysicalSize;
use gleam::gl;
use hwdec_gl_render::engine::{
    FenceGl, HwDecRenderer, HwDecRendererInit, Nv12TextureFormats, Nv12Uploader,
    StaticCapabilities, TextureGl,
};
use tracing_subscriber::EnvFilter;

/// Routes renderer logs to the test harness (`RUST_LOG=debug cargo test` to see them).
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Minimal driver model: hands out ids, tracks live textures and live fences.
#[derive(Default)]
pub struct FakeDriver {
    next_id: Cell<u32>,
    live_textures: RefCell<Vec<u32>>,
    pub live_fences: RefCell<Vec<u64>>,
    pub bound: RefCell<Vec<u32>>,
}

impl FakeDriver {
    pub fn new() -> Rc<Self> {
        let driver = Self::default();
        driver.next_id.set(500);
        Rc::new(driver)
    }

    pub fn live_textures(&self) -> usize {
        self.live_textures.borrow().len()
    }
}

impl TextureGl for FakeDriver {
    fn gen_textures(&self, n: usize) -> Vec<u32> {
        (0..n)
            .map(|_| {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                self.live_textures.borrow_mut().push(id);
                id
            })
            .collect()
    }

    fn delete_textures(&self, textures: &[u32]) {
        let mut live = self.live_textures.borrow_mut();
        for id in textures {
            let position = live.iter().position(|live_id| live_id == id);
            assert!(position.is_some(), "double free or foreign texture {id}");
            if let Some(position) = position {
                live.swap_remove(position);
            }
        }
    }

    fn bind_texture(&self, _target: u32, texture: u32) {
        if texture != 0 {
            self.bound.borrow_mut().push(texture);
        }
    }

    fn tex_parameter_i(&self, _target: u32, _pname: u32, _param: i32) {}

    fn tex_image_2d(
        &self,
        _target: u32,
        _internal_format: i32,
        _size: PhysicalSize<u32>,
        _format: u32,
        _pixels: Option<&[u8]>,
    ) {
    }

    fn tex_sub_image_2d(
        &self,
        _target: u32,
        _size: PhysicalSize<u32>,
        _format: u32,
        _pixels: &[u8],
    ) {
    }

    fn pixel_store_i(&self, _name: u32, _param: i32) {}

    fn get_error(&self) -> u32 {
        gl::NO_ERROR
    }

    fn flush(&self) {}
}

impl FenceGl for FakeDriver {
    fn insert_fence(&self) -> u64 {
        let fence = 0x10_000 + self.live_fences.borrow().len() as u64 + 1;
        self.live_fences.borrow_mut().push(fence);
        fence
    }

    fn is_fence_signaled(&self, fence: u64) -> bool {
        self.live_fences.borrow().contains(&fence)
    }

    fn delete_fence(&self, fence: u64) {
        self.live_fences.borrow_mut().retain(|live| *live != fence);
    }
}

pub fn renderer(driver: &Rc<FakeDriver>, buffer_count: usize) -> HwDecRenderer {
    HwDecRenderer::new(HwDecRendererInit {
        texture_gl: driver.clone(),
        fence_gl: Some(driver.clone()),
        base: Box::new(StaticCapabilities::nv12_defaults()),
        uploader: Box::new(Nv12Uploader::new(
            gl::TEXTURE_2D,
            Nv12TextureFormats::for_caps(true),
        )),
        source_size: PhysicalSize::new(1920, 1080),
        buffer_count,
        texture_target: gl::TEXTURE_2D,
        flags: 0,
    })
}
