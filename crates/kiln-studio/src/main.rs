//! Kiln studio: a small scene exercising the renderer on a real window.
//!
//! Usage: `kiln-studio [IMAGE]`. Without an image a generated checkerboard
//! is used as the sprite.

use anyhow::{Context, Result};

use kiln_engine::backend::{Backend, GpuInit, ProgramHandle, ShaderStage, UniformValue, WgpuBackend};
use kiln_engine::batch::{BlitTransform, Sprite};
use kiln_engine::core::{App, AppControl, FrameCtx};
use kiln_engine::coords::{Color, Rect, Vec2};
use kiln_engine::format::{PixelBuffer, PixelFormat};
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::shader::DEFAULT_VERTEX_SOURCE;
use kiln_engine::target::{BlendMode, Target};
use kiln_engine::texture::{Filter, Image};
use kiln_engine::window::{Runtime, RuntimeConfig};
use kiln_engine::{Renderer, RendererInit};

const PULSE_SOURCE: &str = include_str!("../shaders/pulse.wgsl");
const CANVAS_SIZE: u32 = 256;

fn checkerboard(size: u32, cell: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(size, size, PixelFormat::rgba32());
    for y in 0..size {
        for x in 0..size {
            let on = (x / cell + y / cell) % 2 == 0;
            let color = if on {
                Color::rgb(240, 180, 60)
            } else {
                Color::rgba(40, 60, 120, 200)
            };
            buffer.set_pixel(x, y, color);
        }
    }
    buffer
}

struct Scene {
    image_path: Option<String>,
    sprite: Option<Image>,
    canvas: Option<(Image, Target)>,
    pulse: ProgramHandle,
    pulse_phase: Option<u32>,
}

impl Scene {
    fn new(image_path: Option<String>) -> Self {
        Self {
            image_path,
            sprite: None,
            canvas: None,
            pulse: ProgramHandle::NONE,
            pulse_phase: None,
        }
    }

    fn draw_canvas(&self, r: &mut Renderer<WgpuBackend<'_>>, sprite: &Image, t: f32) -> Result<()> {
        let Some((_, canvas)) = &self.canvas else {
            return Ok(());
        };
        let canvas = *canvas;
        let half = CANVAS_SIZE as f32 / 2.0;

        r.clear_color(canvas, Color::rgba(20, 20, 30, 255))?;
        r.set_clip(canvas, Rect::new(16.0, 16.0, CANVAS_SIZE as f32 - 32.0, CANVAS_SIZE as f32 - 32.0))?;
        r.blit_rotate(sprite, None, canvas, half, half, t * 45.0)?;
        r.unset_clip(canvas)?;

        r.circle(canvas, Vec2::new(half, half), half - 4.0, Color::WHITE)?;
        let frame = Rect::new(4.0, 4.0, CANVAS_SIZE as f32 - 8.0, CANVAS_SIZE as f32 - 8.0);
        r.rectangle_round(canvas, frame, 12.0, Color::rgb(255, 120, 90))?;
        Ok(())
    }

    fn draw_window(&self, r: &mut Renderer<WgpuBackend<'_>>, window: Target, sprite: &Image, t: f32) -> Result<()> {
        let (w, h) = r.backend().window_size();
        let (w, h) = (w as f32, h as f32);

        // Sprite field in one batch.
        let sprites: Vec<Sprite> = (0..12)
            .map(|i| {
                let a = t + i as f32 * std::f32::consts::TAU / 12.0;
                Sprite::at(w * 0.5 + a.cos() * w * 0.35, h * 0.5 + a.sin() * h * 0.35)
            })
            .collect();
        r.blit_batch(sprite, window, &sprites)?;

        if let Some((canvas, _)) = &self.canvas {
            r.blit_transform_x(
                canvas,
                None,
                window,
                BlitTransform {
                    x: w * 0.5,
                    y: h * 0.5,
                    pivot: Vec2::new(CANVAS_SIZE as f32 / 2.0, CANVAS_SIZE as f32 / 2.0),
                    angle: (t * 0.7).sin() * 10.0,
                    scale_x: 1.0,
                    scale_y: 1.0,
                },
            )?;
        }

        if !self.pulse.is_none() {
            r.activate_program(window, self.pulse)?;
            if let Some(location) = self.pulse_phase {
                r.set_uniform(self.pulse, location, UniformValue::Float(vec![t * 3.0, 0.0, 0.0, 0.0]))?;
            }
            r.blit_scale(sprite, None, window, w * 0.15, h * 0.15, 0.5, 0.5)?;
            r.deactivate_program(window)?;
        }

        r.set_blend_mode(window, BlendMode::Add)?;
        r.circle_filled(window, Vec2::new(w * 0.85, h * 0.15), 30.0 + (t * 2.0).sin() * 8.0, Color::rgba(80, 120, 255, 160))?;
        r.set_blend_mode(window, BlendMode::Normal)?;

        r.line(window, Vec2::new(0.0, h - 1.0), Vec2::new(w, h - 1.0), Color::rgb(200, 200, 200))?;
        r.polygon_filled(
            window,
            &[
                Vec2::new(w * 0.1, h * 0.9),
                Vec2::new(w * 0.2, h * 0.8),
                Vec2::new(w * 0.3, h * 0.9),
                Vec2::new(w * 0.2, h * 0.95),
            ],
            Color::rgba(90, 220, 140, 220),
        )?;
        Ok(())
    }

    fn compile_pulse(&mut self, r: &mut Renderer<WgpuBackend<'_>>) {
        let vertex = r.compile_shader(ShaderStage::Vertex, DEFAULT_VERTEX_SOURCE);
        let fragment = r.compile_shader(ShaderStage::Fragment, PULSE_SOURCE);
        let program = r.link_shaders(vertex, fragment);
        r.free_shader(vertex);
        r.free_shader(fragment);

        if program.is_none() {
            log::warn!("pulse program unavailable: {}", r.shader_message());
            return;
        }
        if let Some(tint) = r.uniform_location(program, "tint") {
            if let Err(e) = r.set_uniform(program, tint, UniformValue::Float(vec![1.0, 0.3, 0.2, 1.0])) {
                log::warn!("pulse tint: {e}");
            }
        }
        self.pulse_phase = r.uniform_location(program, "phase");
        self.pulse = program;
    }
}

impl App for Scene {
    fn on_init(&mut self, r: &mut Renderer<WgpuBackend<'_>>) -> Result<()> {
        let sprite = match &self.image_path {
            Some(path) => r.load_image(path).with_context(|| format!("failed to load {path}"))?,
            None => r.copy_image_from_pixels(&checkerboard(64, 8))?,
        };
        r.set_image_filter(&sprite, Filter::Nearest)?;

        let canvas = r.create_image(CANVAS_SIZE, CANVAS_SIZE, 4)?;
        let target = r.load_target(&canvas)?;
        r.set_line_thickness(target, 3.0)?;

        self.compile_pulse(r);
        log::info!(
            "studio: {}x{} sprite, tier {:?}, features {:?}",
            sprite.width(),
            sprite.height(),
            r.tier(),
            r.features()
        );

        self.sprite = Some(sprite);
        self.canvas = Some((canvas, target));
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(sprite) = self.sprite.clone() else {
            return AppControl::Exit;
        };
        let t = ctx.time.elapsed;

        if ctx.time.frame_index % 120 == 0 {
            let stats = ctx.renderer.stats();
            ctx.runtime
                .set_title(format!("kiln studio: {} flushes, {} blits", stats.flushes, stats.blits));
        }

        ctx.render(Color::rgb(12, 12, 16), |r, window| {
            self.draw_canvas(r, &sprite, t)?;
            self.draw_window(r, window, &sprite, t)
        })
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let image_path = std::env::args().nth(1);
    let config = RuntimeConfig {
        title: "kiln studio".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), RendererInit::default(), Scene::new(image_path))
}
