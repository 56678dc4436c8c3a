use anyhow::Result;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use gl::types::*;
use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext},
    display::{GetGlDisplay, GlDisplay},
    prelude::{GlSurface, NotCurrentGlContext},
    surface::{Surface as GlutinSurface, SurfaceAttributesBuilder, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use skia_safe::{
    gpu::{self, backend_render_targets, gl::FramebufferInfo, SurfaceOrigin},
    Color, ColorType, Surface,
};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, ModifiersState, NamedKey},
    window::Window,
};

use folio::config::Config;
use folio::egui_glue::EguiGlue;
use folio::session::{RecentEntry, SessionStore};
use folio::ui::{self, UiAction, UiState};
use folio::viewer::{Phase, Viewer};
use folio::worker::{Job, PageBitmap, RenderWorker};

/// Ensures DirectContext drops before Window (prevents AMD GPU segfaults).
struct Env {
    surface: Surface,
    gl_surface: GlutinSurface<WindowSurface>,
    gr_context: gpu::DirectContext,
    gl_context: PossiblyCurrentContext,
    window: Window,
    fb_info: FramebufferInfo,
    num_samples: usize,
    stencil_size: usize,
}

impl Drop for Env {
    fn drop(&mut self) {
        self.gr_context.release_resources_and_abandon();
    }
}

struct App {
    env: Env,
    egui: EguiGlue,
    config: Config,
    store: Option<SessionStore>,
    recents: Vec<RecentEntry>,
    viewer: Viewer,
    worker: RenderWorker,
    ui_state: UiState,
    /// Uploaded bitmaps of the last committed render, left to right.
    page_images: Vec<skia_safe::Image>,
    modifiers: ModifiersState,
}

impl App {
    fn open_document(&mut self, path: String) {
        log::info!("Opening {}", path);
        let job = self.viewer.open(path, self.store.as_ref());
        self.worker.submit(job);
        self.update_title();
        self.env.window.request_redraw();
    }

    fn submit(&mut self, job: Option<Job>) {
        if let Some(job) = job {
            self.worker.submit(job);
            self.env.window.request_redraw();
        }
    }

    fn dispatch(&mut self, action: UiAction, event_loop: &ActiveEventLoop) {
        match action {
            UiAction::OpenFile => {
                let picked = rfd::FileDialog::new()
                    .add_filter("Documents", &["pdf", "epub", "xps", "cbz"])
                    .pick_file();
                if let Some(path) = picked {
                    self.open_document(path.to_string_lossy().to_string());
                }
            }
            UiAction::OpenPath(path) => self.open_document(path),
            UiAction::Navigate(delta) => {
                let job = self.viewer.navigate(delta);
                self.submit(job);
            }
            UiAction::GoToPage(page) => {
                let job = self.viewer.go_to_page(page);
                self.submit(job);
            }
            UiAction::SetZoom(zoom) => {
                let job = self.viewer.set_zoom(zoom);
                self.submit(job);
            }
            UiAction::ToggleInvert => {
                let job = self.viewer.toggle_invert();
                self.submit(job);
            }
            UiAction::ToggleSpread => {
                let job = self.viewer.toggle_spread();
                self.submit(job);
            }
            UiAction::ToggleCenter => {
                self.viewer.toggle_center();
                self.env.window.request_redraw();
            }
            UiAction::Quit => event_loop.exit(),
        }
    }

    /// Drain worker completions; a committed render replaces the displayed
    /// bitmaps and refreshes the recent-documents list.
    fn pump_worker(&mut self) {
        let mut handled = false;
        while let Some(event) = self.worker.poll() {
            if let Some(bitmaps) = self.viewer.handle_event(event, self.store.as_ref()) {
                self.page_images = bitmaps.iter().filter_map(make_image).collect();
                self.refresh_recents();
            } else if self.viewer.phase == Phase::Empty {
                // Failed open: drop the previous document's bitmaps.
                self.page_images.clear();
            }
            handled = true;
        }
        if handled {
            self.update_title();
            self.env.window.request_redraw();
        }
    }

    fn refresh_recents(&mut self) {
        if let Some(store) = &self.store {
            match store.recent(self.config.recent_limit) {
                Ok(entries) => self.recents = entries,
                Err(e) => log::warn!("Failed to load recent documents: {}", e),
            }
        }
    }

    fn update_title(&mut self) {
        let title = match self.viewer.file_name() {
            Some(name) => format!("folio - {}", name),
            None => "folio".to_string(),
        };
        self.env.window.set_title(&title);
    }

    fn key_action(&self, key: &Key) -> Option<UiAction> {
        match key {
            Key::Named(NamedKey::PageDown) => Some(UiAction::Navigate(1)),
            Key::Named(NamedKey::PageUp) => Some(UiAction::Navigate(-1)),
            Key::Named(NamedKey::Home) => Some(UiAction::GoToPage(0)),
            Key::Named(NamedKey::End) => Some(UiAction::GoToPage(self.viewer.page_count - 1)),
            Key::Character(c) if c.as_str() == "+" || c.as_str() == "=" => {
                Some(UiAction::SetZoom(self.viewer.zoom * 1.25))
            }
            Key::Character(c) if c.as_str() == "-" => {
                Some(UiAction::SetZoom(self.viewer.zoom / 1.25))
            }
            Key::Character(c) if c.as_str() == "0" => Some(UiAction::SetZoom(1.0)),
            Key::Character(c) if c.as_str() == "i" => Some(UiAction::ToggleInvert),
            Key::Character(c) if c.as_str() == "d" => Some(UiAction::ToggleSpread),
            Key::Character(c) if c.as_str() == "c" => Some(UiAction::ToggleCenter),
            _ => None,
        }
    }
}

fn make_image(bitmap: &PageBitmap) -> Option<skia_safe::Image> {
    let info = skia_safe::ImageInfo::new(
        (bitmap.width as i32, bitmap.height as i32),
        skia_safe::ColorType::RGBA8888,
        skia_safe::AlphaType::Opaque,
        None,
    );
    let data = skia_safe::Data::new_copy(&bitmap.samples);
    skia_safe::images::raster_from_data(&info, data, bitmap.width as usize * 4)
}

/// Draw the committed page bitmaps into the content area left by the egui
/// panels. In spread mode the second page sits to the right of the first,
/// offset by the first's width.
fn paint_pages(
    canvas: &skia_safe::Canvas,
    images: &[skia_safe::Image],
    centered: bool,
    content_rect: egui::Rect,
    pixels_per_point: f32,
    oversample: f32,
) {
    if images.is_empty() {
        return;
    }

    let total_w: f32 = images.iter().map(|i| i.width() as f32).sum();
    let max_h: f32 = images.iter().map(|i| i.height() as f32).fold(0.0, f32::max);

    // Pages are rasterized at zoom * oversample, so on screen they shrink
    // back by the oversample factor (and scale up by the DPI factor).
    let draw_scale = pixels_per_point / oversample;

    let rect_x = content_rect.min.x * pixels_per_point;
    let rect_y = content_rect.min.y * pixels_per_point;
    let rect_w = content_rect.width() * pixels_per_point;
    let rect_h = content_rect.height() * pixels_per_point;

    let margin = 8.0 * pixels_per_point;
    let (origin_x, origin_y) = if centered {
        (
            rect_x + (rect_w - total_w * draw_scale) / 2.0,
            rect_y + (rect_h - max_h * draw_scale) / 2.0,
        )
    } else {
        (rect_x + margin, rect_y + margin)
    };

    canvas.save();
    canvas.translate((origin_x, origin_y));
    canvas.scale((draw_scale, draw_scale));

    let mut x = 0.0f32;
    for image in images {
        canvas.draw_image(image, (x, 0.0), None);
        x += image.width() as f32;
    }

    canvas.restore();
}

fn create_surface(
    window: &Window,
    fb_info: FramebufferInfo,
    gr_context: &mut gpu::DirectContext,
    num_samples: usize,
    stencil_size: usize,
) -> Surface {
    let size = window.inner_size();
    let size = (
        size.width.try_into().expect("Could not convert width"),
        size.height.try_into().expect("Could not convert height"),
    );
    let backend_render_target =
        backend_render_targets::make_gl(size, num_samples, stencil_size, fb_info);

    gpu::surfaces::wrap_backend_render_target(
        gr_context,
        &backend_render_target,
        SurfaceOrigin::BottomLeft,
        ColorType::RGBA8888,
        None,
        None,
    )
    .expect("Could not create skia surface")
}

impl ApplicationHandler for App {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.pump_worker();
        if self.viewer.phase == Phase::Loading || self.egui.wants_repaint() {
            self.env.window.request_redraw();
            event_loop
                .set_control_flow(ControlFlow::WaitUntil(Instant::now() + Duration::from_millis(16)));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let consumed = if !matches!(event, WindowEvent::RedrawRequested) {
            let response = self.egui.on_event(&self.env.window, &event);
            if response.repaint {
                self.env.window.request_redraw();
            }
            response.consumed
        } else {
            false
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                self.env.surface = create_surface(
                    &self.env.window,
                    self.env.fb_info,
                    &mut self.env.gr_context,
                    self.env.num_samples,
                    self.env.stencil_size,
                );
                let (width, height): (u32, u32) = physical_size.into();
                self.env.gl_surface.resize(
                    &self.env.gl_context,
                    NonZeroU32::new(width.max(1)).unwrap(),
                    NonZeroU32::new(height.max(1)).unwrap(),
                );
                self.env.window.request_redraw();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }

            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                if self.viewer.phase != Phase::Empty {
                    let scroll_y = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y as f64 * 30.0,
                        MouseScrollDelta::PixelDelta(pos) => pos.y,
                    };
                    let factor = 1.0 + scroll_y * 0.003;
                    self.dispatch(UiAction::SetZoom(self.viewer.zoom * factor), event_loop);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !consumed => {
                if event.state != ElementState::Pressed {
                    return;
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => event_loop.exit(),
                    Key::Named(NamedKey::F1) => {
                        self.ui_state.show_shortcuts = !self.ui_state.show_shortcuts;
                        self.env.window.request_redraw();
                    }
                    Key::Character(c)
                        if c.as_str() == "o" && self.modifiers.control_key() =>
                    {
                        self.dispatch(UiAction::OpenFile, event_loop);
                    }
                    Key::Character(c)
                        if c.as_str() == "q" && self.modifiers.control_key() =>
                    {
                        event_loop.exit();
                    }
                    key => {
                        if let Some(action) = self.key_action(key) {
                            self.dispatch(action, event_loop);
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                let size = self.env.window.inner_size();
                if size.width == 0 || size.height == 0 {
                    return;
                }

                // Run the UI pass first so this frame's content rect is known.
                let ctx = self.egui.begin_pass(&self.env.window);
                let actions = ui::build_ui(&ctx, &mut self.ui_state, &self.viewer, &self.recents);
                self.egui.end_pass(&self.env.window);

                let canvas = self.env.surface.canvas();
                canvas.clear(Color::from_argb(255, 40, 40, 40));
                paint_pages(
                    canvas,
                    &self.page_images,
                    self.viewer.centered,
                    self.ui_state.content_rect,
                    self.egui.pixels_per_point(),
                    self.config.render_oversample,
                );

                self.env.gr_context.flush_and_submit();
                self.egui.paint(&self.env.window);
                self.env
                    .gl_surface
                    .swap_buffers(&self.env.gl_context)
                    .expect("Could not swap buffers");

                for action in actions {
                    self.dispatch(action, event_loop);
                }
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load();

    let store = match SessionStore::open_default() {
        Ok(store) => Some(store),
        Err(e) => {
            log::error!("Session store unavailable, continuing without persistence: {e:#}");
            None
        }
    };

    let worker = RenderWorker::spawn(config.render_oversample);

    // Set up winit + glutin + skia
    let el = EventLoop::new()?;

    let window_attributes = Window::default_attributes()
        .with_inner_size(LogicalSize::new(1000.0, 800.0))
        .with_resizable(true)
        .with_title("folio");

    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_transparency(true);

    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attributes));
    let (window, gl_config) = display_builder
        .build(&el, template, |configs| {
            configs
                .reduce(|accum, config| {
                    let transparency_check = config.supports_transparency().unwrap_or(false)
                        & !accum.supports_transparency().unwrap_or(false);
                    if transparency_check || config.num_samples() < accum.num_samples() {
                        config
                    } else {
                        accum
                    }
                })
                .unwrap()
        })
        .unwrap();
    let window = window.expect("Could not create window with OpenGL context");
    let window_handle = window
        .window_handle()
        .expect("Failed to retrieve window handle");
    let raw_window_handle = window_handle.as_raw();

    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let fallback_context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(None))
        .build(Some(raw_window_handle));

    let not_current_gl_context = unsafe {
        gl_config
            .display()
            .create_context(&gl_config, &context_attributes)
            .unwrap_or_else(|_| {
                gl_config
                    .display()
                    .create_context(&gl_config, &fallback_context_attributes)
                    .expect("failed to create context")
            })
    };

    let (width, height): (u32, u32) = window.inner_size().into();
    let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width).unwrap(),
        NonZeroU32::new(height).unwrap(),
    );

    let gl_surface = unsafe {
        gl_config
            .display()
            .create_window_surface(&gl_config, &attrs)
            .expect("Could not create gl window surface")
    };

    let gl_context = not_current_gl_context
        .make_current(&gl_surface)
        .expect("Could not make GL context current");

    gl::load_with(|s| {
        gl_config
            .display()
            .get_proc_address(CString::new(s).unwrap().as_c_str())
    });
    let interface = skia_safe::gpu::gl::Interface::new_load_with(|name| {
        if name == "eglGetCurrentDisplay" {
            return std::ptr::null();
        }
        gl_config
            .display()
            .get_proc_address(CString::new(name).unwrap().as_c_str())
    })
    .expect("Could not create interface");

    let mut gr_context = skia_safe::gpu::direct_contexts::make_gl(interface, None)
        .expect("Could not create direct context");

    let fb_info = {
        let mut fboid: GLint = 0;
        unsafe { gl::GetIntegerv(gl::FRAMEBUFFER_BINDING, &mut fboid) };
        FramebufferInfo {
            fboid: fboid.try_into().unwrap(),
            format: skia_safe::gpu::gl::Format::RGBA8.into(),
            ..Default::default()
        }
    };

    let num_samples = gl_config.num_samples() as usize;
    let stencil_size = gl_config.stencil_size() as usize;

    let surface = create_surface(&window, fb_info, &mut gr_context, num_samples, stencil_size);

    let egui = EguiGlue::new(&window, &gl_context)?;
    egui.context().set_zoom_factor(config.ui_font_scale);

    let env = Env {
        surface,
        gl_surface,
        gr_context,
        gl_context,
        window,
        fb_info,
        num_samples,
        stencil_size,
    };

    let mut app = App {
        env,
        egui,
        config,
        store,
        recents: Vec::new(),
        viewer: Viewer::new(),
        worker,
        ui_state: UiState::default(),
        page_images: Vec::new(),
        modifiers: ModifiersState::empty(),
    };
    app.refresh_recents();

    if let Some(path) = std::env::args().nth(1) {
        app.open_document(path);
    }

    el.run_app(&mut app).expect("Couldn't run event loop");

    Ok(())
}
