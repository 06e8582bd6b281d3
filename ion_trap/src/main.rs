//! Trapped-Ion Qubit Visualization
//!
//! Click ions to select up to two, then drive them with lasers.
//!
//! Controls:
//! - Left click: Select/deselect an ion
//! - C: Cool all ions to |0⟩
//! - P: π pulse on the selection
//! - H: π/2 pulse on the selection
//! - E: Entangle the two selected ions
//! - Escape: Dismiss a notice
//! - Arrow keys: Rotate view
//! - Mouse wheel: Zoom

use common::{screen_to_ndc, Camera3D, GraphicsContext};
use glam::Vec2;
use ion_trap::renderer::{scene_lines, scene_points, IonRenderer};
use ion_trap::ui::{
    draw_alert, draw_controls, draw_energy_popups, draw_equations_sidebar, UiAction,
    ION_TRAP_EQUATIONS,
};
use ion_trap::{DemoConfig, IonTrapDemo, PulseKind};
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: IonRenderer,
    demo: IonTrapDemo,
    camera: Camera3D,
    egui: EguiState,
    cursor: Option<Vec2>,
    /// Notice shown modally; scene input is ignored while set
    alert: Option<String>,
}

impl App {
    fn new(ctx: GraphicsContext) -> Self {
        let renderer = IonRenderer::new(&ctx, 1024, 256);
        let mut camera = Camera3D::new(ctx.aspect_ratio());
        camera.distance = 12.0;
        camera.pitch = 0.35;
        camera.update_orbital();

        let demo = IonTrapDemo::new(DemoConfig::default());

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Self {
            ctx,
            renderer,
            demo,
            camera,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
            cursor: None,
            alert: None,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
    }

    fn update(&mut self, dt: f32) {
        self.demo.step(dt);
        if let Some(message) = self.demo.take_alert() {
            self.alert = Some(message);
        }
    }

    fn apply(&mut self, action: UiAction) {
        // Refusals already surface through the demo's alert
        let _ = match action {
            UiAction::Cool => {
                self.demo.cool_ions();
                Ok(())
            }
            UiAction::Pulse(kind) => self.demo.pulse_laser(kind),
            UiAction::Entangle => self.demo.entangle_ions(),
        };
        if let Some(message) = self.demo.take_alert() {
            self.alert = Some(message);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);

        let points = scene_points(&self.demo);
        let num_points = self.renderer.update_points(&self.ctx.queue, &points);
        let lines = scene_lines(&self.demo);
        let num_lines = self.renderer.update_lines(&self.ctx.queue, &lines);

        // Build egui UI
        let size = self.ctx.size_f32();
        let mut action = None;
        let mut dismissed = false;
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            action = draw_controls(ctx, &self.demo);
            draw_equations_sidebar(ctx, ION_TRAP_EQUATIONS);
            draw_energy_popups(ctx, &self.demo, &self.camera, size);
            if let Some(message) = &self.alert {
                dismissed = draw_alert(ctx, message);
            }
        });

        if dismissed {
            self.alert = None;
        } else if self.alert.is_none() {
            if let Some(action) = action {
                self.apply(action);
            }
        }

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render_lines(&mut encoder, &view, num_lines, true);
        self.renderer.render_points(&mut encoder, &view, num_points, false);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_click(&mut self) {
        if self.alert.is_some() {
            return;
        }
        let Some(cursor) = self.cursor else {
            return;
        };
        let (width, height) = self.ctx.size_f32();
        let ndc = screen_to_ndc(cursor.x, cursor.y, width, height);
        self.demo.handle_click(ndc, &self.camera);
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        if self.alert.is_some() {
            if matches!(key, KeyCode::Escape | KeyCode::Enter) {
                self.alert = None;
            }
            return;
        }

        match key {
            KeyCode::KeyC => self.apply(UiAction::Cool),
            KeyCode::KeyP => self.apply(UiAction::Pulse(PulseKind::Pi)),
            KeyCode::KeyH => self.apply(UiAction::Pulse(PulseKind::HalfPi)),
            KeyCode::KeyE => self.apply(UiAction::Entangle),
            KeyCode::ArrowLeft => self.camera.orbit(-0.1, 0.0),
            KeyCode::ArrowRight => self.camera.orbit(0.1, 0.0),
            KeyCode::ArrowUp => self.camera.orbit(0.0, 0.1),
            KeyCode::ArrowDown => self.camera.orbit(0.0, -0.1),
            _ => {}
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn main() {
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Ion Trap - Laser Pulses and Entanglement",
        1280,
        720,
    ));

    let mut app = App::new(ctx);
    let mut last_time = std::time::Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { ref event, .. } => {
                    let consumed = app.handle_window_event(event);

                    // Cursor tracking must see every move, even over panels
                    if let WindowEvent::CursorMoved { position, .. } = event {
                        app.cursor = Some(Vec2::new(position.x as f32, position.y as f32));
                    }

                    if !consumed {
                        match event {
                            WindowEvent::CloseRequested => elwt.exit(),
                            WindowEvent::Resized(size) => app.resize(*size),
                            WindowEvent::MouseInput {
                                state: ElementState::Pressed,
                                button: MouseButton::Left,
                                ..
                            } => app.handle_click(),
                            WindowEvent::KeyboardInput {
                                event:
                                    KeyEvent {
                                        physical_key: PhysicalKey::Code(key),
                                        state,
                                        ..
                                    },
                                ..
                            } => app.handle_key(*key, *state),
                            WindowEvent::MouseWheel { delta, .. } => {
                                let scroll = match delta {
                                    MouseScrollDelta::LineDelta(_, y) => *y,
                                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                                };
                                app.handle_scroll(scroll);
                            }
                            WindowEvent::RedrawRequested => {
                                let now = std::time::Instant::now();
                                let dt = (now - last_time).as_secs_f32().min(0.1);
                                last_time = now;

                                app.update(dt);
                                match app.render() {
                                    Ok(_) => {}
                                    Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                    Err(e) => log::error!("Render error: {:?}", e),
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    app.ctx.window.request_redraw();
                }
                _ => {}
            }
        })
        .expect("Event loop error");
}
