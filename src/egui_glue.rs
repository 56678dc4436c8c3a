use std::sync::Arc;

use anyhow::Result;
use egui_winit::EventResponse;
use glutin::display::{GetGlDisplay, GlDisplay};

/// egui riding on the app's own glutin context: winit input translation on
/// the way in, a glow painter over the Skia framebuffer on the way out.
pub struct EguiGlue {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    painter: egui_glow::Painter,
    shapes: Vec<egui::epaint::ClippedShape>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl EguiGlue {
    /// The OpenGL context must be current and the GL loader initialized.
    pub fn new(
        window: &winit::window::Window,
        gl_context: &glutin::context::PossiblyCurrentContext,
    ) -> Result<Self> {
        let display = gl_context.display();
        let glow_context = unsafe {
            glow::Context::from_loader_function(|s| {
                let s = std::ffi::CString::new(s)
                    .expect("failed to construct CString for GL function pointer");
                display.get_proc_address(s.as_c_str()).cast()
            })
        };

        let painter = egui_glow::Painter::new(Arc::new(glow_context), "", None, false)?;

        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );

        Ok(Self {
            ctx,
            winit_state,
            painter,
            shapes: Default::default(),
            textures_delta: Default::default(),
            pixels_per_point: window.scale_factor() as f32,
        })
    }

    pub fn context(&self) -> &egui::Context {
        &self.ctx
    }

    /// Feed a winit event to egui. `consumed` on the response means the
    /// event should not be processed further by the app.
    pub fn on_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> EventResponse {
        self.winit_state.on_window_event(window, event)
    }

    /// Start a UI pass. Build panels against the returned context (a cheap
    /// clone), then call [`EguiGlue::end_pass`].
    pub fn begin_pass(&mut self, window: &winit::window::Window) -> egui::Context {
        let raw_input = self.winit_state.take_egui_input(window);
        self.ctx.begin_pass(raw_input);
        self.ctx.clone()
    }

    /// Finish the UI pass and stash its output for [`EguiGlue::paint`].
    pub fn end_pass(&mut self, window: &winit::window::Window) {
        // pixels_per_point must be read before end_pass clears the input state
        self.pixels_per_point = self.ctx.input(|i| i.pixels_per_point);

        let output = self.ctx.end_pass();
        self.winit_state
            .handle_platform_output(window, output.platform_output);
        self.shapes = output.shapes;
        self.textures_delta = output.textures_delta;
    }

    /// Paint the finished pass over whatever is in the current framebuffer.
    pub fn paint(&mut self, window: &winit::window::Window) {
        let pixels_per_point = self.pixels_per_point;
        let shapes = std::mem::take(&mut self.shapes);
        let textures_delta = std::mem::take(&mut self.textures_delta);

        let meshes = self.ctx.tessellate(shapes, pixels_per_point);
        let size = window.inner_size();
        self.painter.paint_and_update_textures(
            [size.width, size.height],
            pixels_per_point,
            &meshes,
            &textures_delta,
        );
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    /// True while egui is animating and wants another frame soon.
    pub fn wants_repaint(&self) -> bool {
        self.ctx.has_requested_repaint()
    }
}

impl Drop for EguiGlue {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}
