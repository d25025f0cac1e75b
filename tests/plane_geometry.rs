mod common;

use std::sync::Arc;

use dpi::PhysicalSize;
use hwdec_gl_render::engine::{DecodedFrame, ExternalSurface, FramePayload, PlanarImage};
use proptest::prelude::*;

use common::{FakeDriver, renderer};

fn surface(luma: u32, size: PhysicalSize<u32>) -> Arc<DecodedFrame> {
    Arc::new(DecodedFrame::new(
        1,
        FramePayload::ExternalSurface(ExternalSurface {
            luma_texture: luma,
            chroma_texture: luma + 1,
            texture_size: size,
        }),
    ))
}

proptest! {
    #[test]
    fn external_chroma_is_half_of_luma(width in 1u32..8192, height in 1u32..8192) {
        let driver = FakeDriver::new();
        let mut renderer = renderer(&driver, 1);
        let size = PhysicalSize::new(width, height);
        let frame = surface(42, size);
        renderer.configure(&frame, size);
        renderer.create_texture(0).unwrap();

        renderer.bind_frame(0, frame).unwrap();

        let planes = renderer.slot(0).unwrap().planes();
        prop_assert_eq!(planes[0].tex_size, size);
        prop_assert_eq!(planes[1].tex_size, PhysicalSize::new(width >> 1, height >> 1));
        prop_assert_eq!(planes[2].tex_size, planes[1].tex_size);
    }

    #[test]
    fn padded_textures_sample_a_sub_rect(
        width in 16u32..2048,
        height in 16u32..2048,
        pad in 0u32..64,
    ) {
        let driver = FakeDriver::new();
        let mut renderer = renderer(&driver, 1);
        let source = PhysicalSize::new(width, height);
        let frame = surface(42, PhysicalSize::new(width + pad, height + pad));
        renderer.configure(&frame, source);
        renderer.create_texture(0).unwrap();

        renderer.bind_frame(0, frame).unwrap();

        for plane in renderer.slot(0).unwrap().planes() {
            prop_assert!(plane.rect.x2 > 0.0 && plane.rect.x2 <= 1.0);
            prop_assert!(plane.rect.y2 > 0.0 && plane.rect.y2 <= 1.0);
        }
    }

    #[test]
    fn delete_always_zeroes_every_plane(cpu_mode in any::<bool>(), slot in 0usize..4) {
        let driver = FakeDriver::new();
        let mut renderer = renderer(&driver, 4);
        let size = PhysicalSize::new(32, 32);
        let frame = if cpu_mode {
            Arc::new(DecodedFrame::new(
                1,
                FramePayload::CpuPlanar(PlanarImage::nv12(size, vec![0; 1024], vec![0; 512])),
            ))
        } else {
            surface(42, size)
        };
        renderer.configure(&frame, size);
        renderer.create_texture(slot).unwrap();
        renderer.bind_frame(slot, frame).unwrap();

        renderer.delete_texture(slot);
        renderer.delete_texture(slot);

        prop_assert_eq!(renderer.slot(slot).unwrap().texture_ids(), [0, 0, 0]);
        prop_assert_eq!(driver.live_textures(), 0);
    }
}
