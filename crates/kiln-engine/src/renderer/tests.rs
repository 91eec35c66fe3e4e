use crate::backend::{Features, ShaderStage, SoftwareBackend, SoftwareInit, Tier};
use crate::batch::Sprite;
use crate::coords::{Color, Rect, Vec2};
use crate::error::{ErrorKind, MAX_ERRORS};
use crate::format::{PixelBuffer, PixelFormat};
use crate::target::BlendMode;
use crate::texture::Image;

use super::{Renderer, RendererInit};

const RED: Color = Color::rgba(255, 0, 0, 255);
const GREEN: Color = Color::rgba(0, 255, 0, 255);
const BLUE: Color = Color::rgba(0, 0, 255, 255);

fn quiet() -> RendererInit {
    RendererInit {
        log_errors: false,
        ..RendererInit::default()
    }
}

fn renderer_with(init: SoftwareInit, config: RendererInit) -> Renderer<SoftwareBackend> {
    Renderer::new(SoftwareBackend::new(init), config).unwrap()
}

fn renderer() -> Renderer<SoftwareBackend> {
    renderer_with(
        SoftwareInit {
            window_width: 8,
            window_height: 4,
            ..SoftwareInit::default()
        },
        quiet(),
    )
}

fn tier(tier: Tier) -> Renderer<SoftwareBackend> {
    renderer_with(
        SoftwareInit {
            tier,
            window_width: 8,
            window_height: 4,
            ..SoftwareInit::default()
        },
        quiet(),
    )
}

fn solid(w: u32, h: u32, color: Color) -> PixelBuffer {
    let mut buf = PixelBuffer::new(w, h, PixelFormat::rgba32());
    for y in 0..h {
        for x in 0..w {
            buf.set_pixel(x, y, color);
        }
    }
    buf
}

fn gradient(w: u32, h: u32, format: PixelFormat) -> PixelBuffer {
    let mut buf = PixelBuffer::new(w, h, format);
    for y in 0..h {
        for x in 0..w {
            buf.set_pixel(x, y, Color::rgba((x * 40) as u8, (y * 60) as u8, 7, 255));
        }
    }
    buf
}

/// Canvas image of `w`x`h` with a loaded target.
fn canvas(r: &mut Renderer<SoftwareBackend>, w: u32, h: u32) -> (Image, crate::target::Target) {
    let image = r.create_image(w, h, 4).unwrap();
    let target = r.load_target(&image).unwrap();
    (image, target)
}

/// Exclusive bounds `(x0, y0, x1, y1)` of pixels with non-zero alpha.
fn opaque_bounds(buf: &PixelBuffer) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..buf.height() {
        for x in 0..buf.width() {
            if buf.pixel(x, y).is_some_and(|c| c.a > 0) {
                bounds = Some(match bounds {
                    None => (x, y, x + 1, y + 1),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
                });
            }
        }
    }
    bounds
}

// ── blits ───────────────────────────────────────────────────────────────────

#[test]
fn blit_onto_cleared_target() {
    let mut r = renderer();
    let (_canvas, target) = canvas(&mut r, 100, 100);
    r.clear_color(target, Color::rgba(100, 0, 0, 0)).unwrap();

    let sprite = r.copy_image_from_pixels(&solid(64, 64, Color::WHITE)).unwrap();
    r.blit(&sprite, None, target, 50.0, 50.0).unwrap();

    assert_eq!(r.get_pixel(target, 50, 50).unwrap(), Color::WHITE);
    assert_eq!(r.get_pixel(target, 2, 2).unwrap(), Color::rgba(100, 0, 0, 0));
    assert_eq!(r.get_pixel(target, 17, 50).unwrap(), Color::rgba(100, 0, 0, 0));
    assert_eq!(r.get_pixel(target, 18, 50).unwrap(), Color::WHITE);
}

#[test]
fn quarter_turn_swaps_footprint() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(40, 20, Color::WHITE)).unwrap();

    let (_a, upright) = canvas(&mut r, 100, 100);
    r.blit_rotate(&sprite, None, upright, 50.0, 50.0, 0.0).unwrap();
    let upright_px = r.read_target_pixels(upright).unwrap();
    assert_eq!(opaque_bounds(&upright_px), Some((30, 40, 70, 60)));

    let (_b, turned) = canvas(&mut r, 100, 100);
    r.blit_rotate(&sprite, None, turned, 50.0, 50.0, 90.0).unwrap();
    let turned_px = r.read_target_pixels(turned).unwrap();
    assert_eq!(opaque_bounds(&turned_px), Some((40, 30, 60, 70)));
}

#[test]
fn scale_blit_grows_around_centre() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(10, 10, Color::WHITE)).unwrap();
    let (_c, target) = canvas(&mut r, 40, 40);

    r.blit_scale(&sprite, None, target, 20.0, 20.0, 2.0, 1.0).unwrap();
    let px = r.read_target_pixels(target).unwrap();
    assert_eq!(opaque_bounds(&px), Some((10, 15, 30, 25)));
}

#[test]
fn blit_rect_fills_destination() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(4, 4, GREEN)).unwrap();
    let (_c, target) = canvas(&mut r, 32, 32);

    r.blit_rect(&sprite, None, target, Rect::new(2.0, 3.0, 20.0, 10.0)).unwrap();
    let px = r.read_target_pixels(target).unwrap();
    assert_eq!(opaque_bounds(&px), Some((2, 3, 22, 13)));
    assert_eq!(px.pixel(10, 8), Some(GREEN));
}

#[test]
fn sub_rect_source_draws_only_that_region() {
    let mut r = renderer();
    let mut sheet = solid(8, 4, RED);
    for y in 0..4 {
        for x in 4..8 {
            sheet.set_pixel(x, y, BLUE);
        }
    }
    let sprite = r.copy_image_from_pixels(&sheet).unwrap();
    r.set_image_filter(&sprite, crate::texture::Filter::Nearest).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);

    r.blit(&sprite, Some(Rect::new(4.0, 0.0, 4.0, 4.0)), target, 8.0, 8.0)
        .unwrap();
    let px = r.read_target_pixels(target).unwrap();
    assert_eq!(opaque_bounds(&px), Some((6, 6, 10, 10)));
    assert_eq!(px.pixel(7, 7), Some(BLUE));
}

#[test]
fn batch_of_sprites_is_one_draw() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);
    let before = r.backend().stats().draw_calls;

    let sprites = [Sprite::at(2.0, 2.0), Sprite::at(8.0, 8.0), Sprite::at(13.0, 3.0)];
    r.blit_batch(&sprite, target, &sprites).unwrap();
    r.flush().unwrap();

    assert_eq!(r.backend().stats().draw_calls - before, 1);
    assert_eq!(r.get_pixel(target, 8, 8).unwrap(), RED);
    assert_eq!(r.get_pixel(target, 13, 3).unwrap(), RED);
}

#[test]
fn color_modulates_blits() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(4, 4, Color::WHITE)).unwrap();
    r.set_color(&sprite, GREEN).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);

    r.blit(&sprite, None, target, 4.0, 4.0).unwrap();
    assert_eq!(r.get_pixel(target, 4, 4).unwrap(), GREEN);
}

#[test]
fn invalid_source_rect_is_rejected() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(4, 4, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);

    let err = r
        .blit(&sprite, Some(Rect::new(0.0, 0.0, f32::NAN, 2.0)), target, 4.0, 4.0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(r.pending_vertices(), 0);
}

// ── batching ────────────────────────────────────────────────────────────────

#[test]
fn full_batch_flushes_in_order() {
    let config = RendererInit {
        blit_buffer_capacity: 12,
        ..quiet()
    };
    let mut r = renderer_with(SoftwareInit::default(), config);
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);
    let before = r.backend().stats().draw_calls;

    for i in 0..5 {
        r.blit(&sprite, None, target, 1.0 + 3.0 * i as f32, 1.0).unwrap();
    }
    r.flush().unwrap();

    // Two quads per batch: 5 blits need 3 submissions.
    assert_eq!(r.backend().stats().draw_calls - before, 3);
    assert_eq!(r.stats().flushes, 3);
    assert_eq!(r.stats().blits, 5);
}

#[test]
fn blits_within_capacity_are_one_draw() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);
    let before = r.backend().stats().draw_calls;

    for i in 0..4 {
        r.blit(&sprite, None, target, 2.0 + 3.0 * i as f32, 2.0).unwrap();
    }
    assert_eq!(r.pending_vertices(), 24);
    r.flush().unwrap();

    assert_eq!(r.backend().stats().draw_calls - before, 1);
    assert_eq!(r.pending_vertices(), 0);
}

#[test]
fn interleaved_targets_keep_draw_order() {
    let mut r = renderer();
    let red = r.copy_image_from_pixels(&solid(4, 4, RED)).unwrap();
    let green = r.copy_image_from_pixels(&solid(4, 4, GREEN)).unwrap();
    let blue = r.copy_image_from_pixels(&solid(4, 4, BLUE)).unwrap();
    let (_a, a) = canvas(&mut r, 10, 10);
    let (_b, b) = canvas(&mut r, 10, 10);

    r.blit(&red, None, a, 5.0, 5.0).unwrap();
    r.blit(&green, None, b, 5.0, 5.0).unwrap();
    r.blit(&blue, None, a, 5.0, 5.0).unwrap();

    assert_eq!(r.get_pixel(a, 5, 5).unwrap(), BLUE);
    assert_eq!(r.get_pixel(b, 5, 5).unwrap(), GREEN);
}

#[test]
fn repeated_binds_are_elided() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);
    r.blit(&sprite, None, target, 1.0, 1.0).unwrap();
    let before = r.backend().stats();

    for _ in 0..10 {
        r.blit(&sprite, None, target, 5.0, 5.0).unwrap();
    }

    let after = r.backend().stats();
    assert_eq!(after.texture_binds, before.texture_binds);
    assert_eq!(after.framebuffer_binds, before.framebuffer_binds);
}

#[test]
fn fixed_function_tier_submits_per_triangle() {
    let mut r = tier(Tier::FixedFunction);
    let sprite = r.copy_image_from_pixels(&solid(4, 4, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);
    let before = r.backend().stats().draw_calls;

    r.blit(&sprite, None, target, 4.0, 4.0).unwrap();
    r.flush().unwrap();

    assert_eq!(r.backend().stats().draw_calls - before, 2);
    assert_eq!(r.get_pixel(target, 4, 4).unwrap(), RED);
}

// ── images ──────────────────────────────────────────────────────────────────

#[test]
fn pixels_survive_upload_and_readback() {
    let mut r = renderer();
    for format in [PixelFormat::rgba32(), PixelFormat::rgb24(), PixelFormat::bgra32()] {
        let source = gradient(5, 3, format);
        let image = r.copy_image_from_pixels(&source).unwrap();
        let back = r.read_image_pixels(&image).unwrap();
        let expected = if format.has_alpha() {
            source.converted(PixelFormat::rgba32())
        } else {
            source.converted(PixelFormat::rgb24())
        };
        assert_eq!(back, expected, "{format:?}");
    }
}

#[test]
fn storage_pads_without_npot() {
    let features = Tier::VertexBuffers.default_features() - Features::NON_POWER_OF_TWO;
    let mut r = renderer_with(
        SoftwareInit {
            features: Some(features),
            ..SoftwareInit::default()
        },
        quiet(),
    );

    let source = gradient(100, 60, PixelFormat::rgba32());
    let image = r.copy_image_from_pixels(&source).unwrap();
    assert_eq!((image.width(), image.height()), (100, 60));
    assert_eq!((image.texture_width(), image.texture_height()), (128, 64));
    assert!(image.is_padded());
    assert_eq!(r.read_image_pixels(&image).unwrap(), source);
}

#[test]
fn readback_through_framebuffer_matches() {
    let mut r = tier(Tier::Embedded);
    assert!(!r.is_feature_enabled(Features::TEXTURE_READBACK));

    let source = gradient(5, 3, PixelFormat::rgba32());
    let image = r.copy_image_from_pixels(&source).unwrap();
    assert_eq!(r.read_image_pixels(&image).unwrap(), source);
    assert_eq!(r.backend().live_framebuffers(), 0);
}

#[test]
fn negative_update_rect_leaves_image_untouched() {
    let mut r = renderer();
    let source = gradient(4, 4, PixelFormat::rgba32());
    let image = r.copy_image_from_pixels(&source).unwrap();

    let err = r
        .update_image(&image, Some(Rect::new(0.0, 0.0, -1.0, 2.0)), &solid(4, 4, RED))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(r.read_image_pixels(&image).unwrap(), source);

    let record = r.pop_error().unwrap();
    assert_eq!(record.function, "update_image");
    assert_eq!(record.kind, ErrorKind::InvalidArgument);
}

#[test]
fn update_clips_to_image() {
    let mut r = renderer();
    let image = r.copy_image_from_pixels(&solid(4, 4, Color::BLACK)).unwrap();

    r.update_image(&image, Some(Rect::new(2.0, 2.0, 4.0, 4.0)), &solid(4, 4, RED))
        .unwrap();
    let px = r.read_image_pixels(&image).unwrap();
    assert_eq!(px.pixel(1, 1), Some(Color::BLACK));
    assert_eq!(px.pixel(2, 2), Some(RED));
    assert_eq!(px.pixel(3, 3), Some(RED));
}

#[test]
fn update_flushes_pending_blits_first() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(4, 4, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);

    r.blit(&sprite, None, target, 4.0, 4.0).unwrap();
    r.update_image(&sprite, None, &solid(4, 4, BLUE)).unwrap();
    r.flush().unwrap();

    assert_eq!(r.get_pixel(target, 4, 4).unwrap(), RED);
}

#[test]
fn invalid_channel_count() {
    let mut r = renderer();
    let err = r.create_image(4, 4, 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = r.create_image(0, 4, 4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn alias_shares_texture_until_last_owner() {
    let mut r = renderer();
    let image = r.create_image(4, 4, 4).unwrap();
    let alias = r.create_alias_image(&image).unwrap();
    assert!(alias.same_texture(&image));
    let textures = r.backend().live_textures();

    r.free_image(alias).unwrap();
    assert_eq!(r.live_images(), 1);
    assert_eq!(r.backend().live_textures(), textures);

    r.free_image(image).unwrap();
    assert_eq!(r.live_images(), 0);
    assert_eq!(r.backend().live_textures(), textures - 1);
}

#[test]
fn copy_is_independent() {
    let mut r = renderer();
    let source = r.copy_image_from_pixels(&solid(3, 3, RED)).unwrap();
    let copy = r.copy_image(&source).unwrap();
    assert!(!copy.same_texture(&source));

    r.update_image(&source, None, &solid(3, 3, BLUE)).unwrap();
    assert_eq!(r.read_image_pixels(&copy).unwrap(), solid(3, 3, RED));
}

#[test]
fn image_from_foreign_renderer_is_rejected() {
    let mut a = renderer();
    let mut b = renderer();
    let image = a.create_image(4, 4, 4).unwrap();
    let window = b.window().unwrap();

    let err = b.blit(&image, None, window, 1.0, 1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

// ── targets ─────────────────────────────────────────────────────────────────

#[test]
fn load_target_is_idempotent() {
    let mut r = renderer();
    let image = r.create_image(8, 8, 4).unwrap();
    let first = r.load_target(&image).unwrap();
    let second = r.load_target(&image).unwrap();

    assert_eq!(first, second);
    assert_eq!(image.target(), Some(first));
    assert_eq!(r.backend().live_framebuffers(), 1);
}

#[test]
fn free_target_keeps_image() {
    let mut r = renderer();
    let (image, target) = canvas(&mut r, 8, 8);
    r.free_target(target).unwrap();

    assert_eq!(image.target(), None);
    assert_eq!(r.backend().live_framebuffers(), 0);
    let err = r.clear(target).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NullArgument);

    assert!(r.read_image_pixels(&image).is_ok());
}

#[test]
fn freeing_image_destroys_its_target() {
    let mut r = renderer();
    let (image, target) = canvas(&mut r, 8, 8);
    r.free_image(image).unwrap();

    assert_eq!(r.live_targets(), 1);
    assert_eq!(r.clear(target).unwrap_err().kind(), ErrorKind::NullArgument);
}

#[test]
fn zero_area_clip_blocks_clear() {
    let mut r = renderer();
    let (_c, target) = canvas(&mut r, 8, 8);
    r.clear_color(target, RED).unwrap();

    r.set_clip(target, Rect::new(2.0, 2.0, 0.0, 5.0)).unwrap();
    r.clear_color(target, BLUE).unwrap();

    assert_eq!(r.get_pixel(target, 2, 2).unwrap(), RED);
}

#[test]
fn clip_limits_clear() {
    let mut r = renderer();
    let (_c, target) = canvas(&mut r, 8, 8);
    let previous = r.set_clip(target, Rect::new(0.0, 0.0, 4.0, 8.0)).unwrap();
    assert_eq!(previous, Rect::from_size(8.0, 8.0));

    r.clear_color(target, RED).unwrap();
    assert_eq!(r.get_pixel(target, 3, 3).unwrap(), RED);
    assert_eq!(r.get_pixel(target, 4, 3).unwrap(), Color::TRANSPARENT);

    r.unset_clip(target).unwrap();
    assert!(!r.clip(target).unwrap().enabled);
}

#[test]
fn get_pixel_outside_is_transparent() {
    let mut r = renderer();
    let (_c, target) = canvas(&mut r, 4, 4);
    r.clear_color(target, RED).unwrap();

    assert_eq!(r.get_pixel(target, -1, 0).unwrap(), Color::TRANSPARENT);
    assert_eq!(r.get_pixel(target, 4, 0).unwrap(), Color::TRANSPARENT);
    assert_eq!(r.get_pixel(target, 3, 3).unwrap(), RED);
}

#[test]
fn window_reads_top_down() {
    let mut r = renderer();
    let window = r.window().unwrap();
    r.rectangle_filled(window, Rect::new(0.0, 0.0, 8.0, 1.0), RED).unwrap();

    let px = r.read_target_pixels(window).unwrap();
    assert_eq!(px.pixel(0, 0), Some(RED));
    assert_eq!(px.pixel(0, 3), Some(Color::TRANSPARENT));
    assert_eq!(r.get_pixel(window, 5, 0).unwrap(), RED);

    r.flip().unwrap();
    assert_eq!(r.backend().snapshot().pixel(5, 0), Some(RED));
}

#[test]
fn virtual_resolution_scales_drawing() {
    let mut r = renderer();
    let window = r.window().unwrap();
    r.set_virtual_resolution(window, 4, 2).unwrap();
    r.rectangle_filled(window, Rect::new(0.0, 0.0, 1.0, 1.0), RED).unwrap();
    r.unset_virtual_resolution(window).unwrap();

    let px = r.read_target_pixels(window).unwrap();
    assert_eq!(opaque_bounds(&px), Some((0, 0, 2, 2)));
}

#[test]
fn camera_offsets_drawing() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);

    let camera = crate::target::Camera {
        x: 4.0,
        ..Default::default()
    };
    let previous = r.set_camera(target, Some(camera)).unwrap();
    assert_eq!(previous, crate::target::Camera::default());

    r.blit(&sprite, None, target, 8.0, 8.0).unwrap();
    let px = r.read_target_pixels(target).unwrap();
    assert_eq!(opaque_bounds(&px), Some((3, 7, 5, 9)));
}

#[test]
fn clip_and_camera_changes_flush_pending_blits() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);

    r.blit(&sprite, None, target, 12.0, 12.0).unwrap();
    r.set_clip(target, Rect::new(0.0, 0.0, 4.0, 4.0)).unwrap();
    r.blit(&sprite, None, target, 8.0, 8.0).unwrap();
    let camera = crate::target::Camera {
        x: 4.0,
        ..Default::default()
    };
    r.set_camera(target, Some(camera)).unwrap();
    assert_eq!(r.pending_vertices(), 0);
    r.flush().unwrap();

    assert_eq!(r.get_pixel(target, 12, 12).unwrap(), RED);
    assert_eq!(r.get_pixel(target, 8, 8).unwrap(), Color::TRANSPARENT);
}

#[test]
fn blending_change_flushes_pending_blits() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(4, 4, Color::rgba(0, 0, 255, 0))).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);
    r.clear_color(target, RED).unwrap();

    r.blit(&sprite, None, target, 2.0, 2.0).unwrap();
    r.set_blending(target, false).unwrap();
    assert_eq!(r.pending_vertices(), 0);

    assert_eq!(r.get_pixel(target, 2, 2).unwrap(), RED);
}

#[test]
fn program_change_flushes_pending_blits() {
    let mut r = renderer();
    let vs = r.compile_shader(ShaderStage::Vertex, crate::shader::DEFAULT_VERTEX_SOURCE);
    let fs = r.compile_shader(ShaderStage::Fragment, crate::shader::DEFAULT_TEXTURED_SOURCE);
    let program = r.link_shaders(vs, fs);
    let sprite = r.copy_image_from_pixels(&solid(2, 2, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);
    r.backend_mut().reset_stats();

    r.blit(&sprite, None, target, 4.0, 4.0).unwrap();
    assert_eq!(r.backend().stats().draw_calls, 0);
    r.activate_program(target, program).unwrap();

    assert_eq!(r.pending_vertices(), 0);
    assert_eq!(r.backend().stats().draw_calls, 1);
    assert_eq!(r.get_pixel(target, 4, 4).unwrap(), RED);
}

#[test]
fn unsupported_blend_mode_is_ignored() {
    let features = Tier::VertexArrays.default_features() - Features::BLEND_EQUATIONS;
    let mut r = renderer_with(
        SoftwareInit {
            tier: Tier::VertexArrays,
            features: Some(features),
            ..SoftwareInit::default()
        },
        quiet(),
    );
    let window = r.window().unwrap();

    r.set_blend_mode(window, BlendMode::Subtract).unwrap();
    assert_eq!(r.blend_mode(window).unwrap(), BlendMode::Normal);
    r.set_blend_mode(window, BlendMode::Add).unwrap();
    assert_eq!(r.blend_mode(window).unwrap(), BlendMode::Add);
}

#[test]
fn blending_off_replaces_alpha() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(4, 4, Color::rgba(0, 0, 255, 0))).unwrap();
    let (_c, target) = canvas(&mut r, 8, 8);
    r.clear_color(target, RED).unwrap();

    r.blit(&sprite, None, target, 2.0, 2.0).unwrap();
    assert_eq!(r.get_pixel(target, 2, 2).unwrap(), RED);

    r.set_blending(target, false).unwrap();
    r.blit(&sprite, None, target, 6.0, 6.0).unwrap();
    assert_eq!(r.get_pixel(target, 6, 6).unwrap(), Color::rgba(0, 0, 255, 0));
}

#[test]
fn flip_without_window_is_user_error() {
    let mut r = renderer();
    let window = r.window().unwrap();
    r.free_target(window).unwrap();

    assert_eq!(r.window(), None);
    assert_eq!(r.flip().unwrap_err().kind(), ErrorKind::UserError);
    assert_eq!(r.set_window_resolution(10, 10).unwrap_err().kind(), ErrorKind::UserError);
}

// ── shaders ─────────────────────────────────────────────────────────────────

#[test]
fn broken_shader_reports() {
    let mut r = renderer();
    let shader = r.compile_shader(ShaderStage::Fragment, "fn broken( {");

    assert!(shader.is_none());
    assert!(!r.shader_message().is_empty());
    let record = r.pop_error().unwrap();
    assert_eq!(record.function, "compile_shader");
    assert_eq!(record.kind, ErrorKind::BackendError);
}

#[test]
fn fixed_function_has_no_programs() {
    let mut r = tier(Tier::FixedFunction);
    assert!(r.default_program(true).is_none());

    let shader = r.compile_shader(ShaderStage::Vertex, crate::shader::DEFAULT_VERTEX_SOURCE);
    assert!(shader.is_none());
    assert_eq!(r.error_count(), 0);
}

#[test]
fn user_program_activates_and_frees() {
    let mut r = renderer();
    let vs = r.compile_shader(ShaderStage::Vertex, crate::shader::DEFAULT_VERTEX_SOURCE);
    let fs = r.compile_shader(ShaderStage::Fragment, crate::shader::DEFAULT_TEXTURED_SOURCE);
    let program = r.link_shaders(vs, fs);
    assert!(!program.is_none());
    assert!(!r.is_default_program(program));

    let window = r.window().unwrap();
    r.activate_program(window, program).unwrap();
    assert_eq!(r.active_program(window).unwrap(), program);

    r.free_program(program).unwrap();
    assert_eq!(r.active_program(window).unwrap(), r.default_program(true));
}

#[test]
fn default_program_activation_is_plain() {
    let mut r = renderer();
    let window = r.window().unwrap();
    let default = r.default_program(true);
    assert!(r.is_default_program(default));

    r.activate_program(window, default).unwrap();
    assert_eq!(r.active_program(window).unwrap(), default);
}

// ── errors ──────────────────────────────────────────────────────────────────

#[test]
fn error_queue_is_bounded() {
    let mut r = renderer();
    for _ in 0..MAX_ERRORS + 5 {
        let _ = r.create_image(1, 1, 9);
    }
    assert_eq!(r.error_count(), MAX_ERRORS);

    r.clear_errors();
    assert_eq!(r.pop_error(), None);
}

#[test]
fn errors_pop_most_recent_first() {
    let mut r = renderer();
    let window = r.window().unwrap();
    let _ = r.create_image(1, 1, 9);
    let _ = r.set_line_thickness(window, f32::NAN);

    assert_eq!(r.pop_error().unwrap().function, "set_line_thickness");
    assert_eq!(r.pop_error().unwrap().function, "create_image");
    assert_eq!(r.pop_error(), None);
}

// ── shapes ──────────────────────────────────────────────────────────────────

#[test]
fn shapes_draw_untextured() {
    let mut r = renderer();
    let (_c, target) = canvas(&mut r, 32, 32);

    r.circle_filled(target, Vec2::new(16.0, 16.0), 6.0, GREEN).unwrap();
    r.line(target, Vec2::new(0.0, 1.5), Vec2::new(32.0, 1.5), RED).unwrap();

    assert_eq!(r.get_pixel(target, 16, 16).unwrap(), GREEN);
    assert_eq!(r.get_pixel(target, 10, 1).unwrap(), RED);
    assert_eq!(r.get_pixel(target, 2, 30).unwrap(), Color::TRANSPARENT);
    assert_eq!(r.stats().shape_draws, 2);
}

#[test]
fn shapes_flush_pending_blits() {
    let mut r = renderer();
    let sprite = r.copy_image_from_pixels(&solid(8, 8, RED)).unwrap();
    let (_c, target) = canvas(&mut r, 16, 16);

    r.blit(&sprite, None, target, 8.0, 8.0).unwrap();
    r.rectangle_filled(target, Rect::new(6.0, 6.0, 4.0, 4.0), BLUE).unwrap();

    assert_eq!(r.get_pixel(target, 8, 8).unwrap(), BLUE);
    assert_eq!(r.get_pixel(target, 5, 5).unwrap(), RED);
}
