use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_keyboard, delegate_layer, delegate_output, delegate_pointer,
    delegate_registry, delegate_seat, delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    seat::{
        keyboard::{KeyEvent, KeyboardHandler, Modifiers},
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            LayerShell, LayerShellHandler, LayerSurface, LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
    shm::{slot::SlotPool, Shm, ShmHandler},
};
use wayland_client::{
    globals::GlobalList,
    protocol::{wl_keyboard, wl_output, wl_pointer, wl_seat, wl_shm, wl_surface},
    Connection, QueueHandle,
};
use xkbcommon::xkb::{self, keysyms};

use crate::opener;
use crate::state::AppState;
use crate::ui::render::{self, Renderer, TITLE_BAR_HEIGHT};

const BTN_LEFT: u32 = 0x110;

pub struct WaylandApp {
    pub registry_state: RegistryState,
    pub seat_state: SeatState,
    pub output_state: OutputState,
    pub compositor_state: CompositorState,
    pub shm_state: Shm,
    pub layer_shell_state: LayerShell,

    pub layer_surface: Option<LayerSurface>,
    pub pool: Option<SlotPool>,
    pub width: u32,
    pub height: u32,
    pub first_configure: bool,
    pub should_exit: bool,

    pub state: AppState,
    pub renderer: Renderer,

    /// Geometry of the last drawn frame, used for pointer hit-testing.
    layout: Option<render::Layout>,
    /// Bring the selected cell into view on the next draw.
    scroll_to_selection: bool,
}

impl WaylandApp {
    pub fn new(
        _conn: &Connection,
        globals: &GlobalList,
        qh: &QueueHandle<Self>,
        state: AppState,
        renderer: Renderer,
    ) -> Self {
        let registry_state = RegistryState::new(globals);
        let seat_state = SeatState::new(globals, qh);
        let output_state = OutputState::new(globals, qh);
        let compositor_state = CompositorState::bind(globals, qh).expect("wl_compositor not available");
        let shm_state = Shm::bind(globals, qh).expect("wl_shm not available");
        let layer_shell_state = LayerShell::bind(globals, qh).expect("zwlr_layer_shell_v1 not available");

        let width = state.config.theme.width;
        let height = state.config.theme.height;

        Self {
            registry_state,
            seat_state,
            output_state,
            compositor_state,
            shm_state,
            layer_shell_state,
            layer_surface: None,
            pool: None,
            width,
            height,
            first_configure: true,
            should_exit: false,
            state,
            renderer,
            layout: None,
            scroll_to_selection: false,
        }
    }

    pub fn draw(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>) {
        if let Some(layer_surface) = &self.layer_surface {
            let width = self.width;
            let height = self.height;
            if width == 0 || height == 0 {
                return;
            }

            let Some(pool) = self.pool.as_mut() else { return };

            let (buffer, canvas) = pool
                .create_buffer(
                    width as i32,
                    height as i32,
                    (width * 4) as i32,
                    wl_shm::Format::Argb8888,
                )
                .expect("create buffer");

            let layout = render::layout(&self.state, width as f32);
            let viewport = (height as f32 - TITLE_BAR_HEIGHT).max(0.0);
            if self.scroll_to_selection {
                self.scroll_to_selection = false;
                if let Some(cell) = layout.cells.get(self.state.selected) {
                    if cell.top() < self.state.scroll {
                        self.state.scroll = cell.top();
                    } else if cell.top() + cell.height() > self.state.scroll + viewport {
                        self.state.scroll = cell.top() + cell.height() - viewport;
                    }
                }
            }
            let max_scroll = (layout.content_height - viewport).max(0.0);
            self.state.scroll = self.state.scroll.clamp(0.0, max_scroll);

            if let Some(mut pixmap) = tiny_skia::PixmapMut::from_bytes(canvas, width, height) {
                self.renderer.draw(&mut pixmap, &self.state, &layout);

                for chunk in canvas.chunks_exact_mut(4) {
                    chunk.swap(0, 2);
                }

                layer_surface.wl_surface().attach(Some(buffer.wl_buffer()), 0, 0);
                layer_surface.wl_surface().damage(0, 0, width as i32, height as i32);
                layer_surface.wl_surface().commit();
            }

            self.layout = Some(layout);
        }
    }

    /// Schedule a redraw through the compositor's frame callback.
    fn request_frame(&self, qh: &QueueHandle<Self>) {
        if let Some(layer_surface) = &self.layer_surface {
            layer_surface.wl_surface().frame(qh, layer_surface.wl_surface().clone());
            layer_surface.wl_surface().commit();
        }
    }

    fn open_selected_source(&self) {
        if let Some(flat) = self.state.detail {
            if let Some(entry) = self.state.entry(flat) {
                opener::open_source(&entry.source_path, &self.state.config);
            }
        }
    }

    fn handle_click(&mut self, x: f64, y: f64) {
        let x = x as f32;
        let y = y as f32;

        if self.state.detail.is_some() {
            let detail = render::detail_layout(self.width as f32, self.height as f32);
            if detail.open_button.contains(x, y) {
                self.open_selected_source();
            } else if detail.close_button.contains(x, y) || !detail.panel.contains(x, y) {
                self.state.detail = None;
            }
            return;
        }

        if y < TITLE_BAR_HEIGHT {
            return;
        }

        let Some(layout) = &self.layout else { return };
        let content_y = y - TITLE_BAR_HEIGHT + self.state.scroll;
        for (flat, cell) in layout.cells.iter().enumerate() {
            if cell.contains(x, content_y) {
                self.state.selected = flat;
                self.state.detail = Some(flat);
                return;
            }
        }
    }
}

/// `Rect::contains` on the point, spelled out since tiny-skia's `Rect` only
/// offers bounds accessors.
trait Contains {
    fn contains(&self, x: f32, y: f32) -> bool;
}

impl Contains for tiny_skia::Rect {
    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }
}

impl LayerShellHandler for WaylandApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.should_exit = true;
    }

    fn configure(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        if configure.new_size.0 > 0 {
            self.width = configure.new_size.0;
        }
        if configure.new_size.1 > 0 {
            self.height = configure.new_size.1;
        }

        if self.first_configure {
            self.first_configure = false;
            let pool = SlotPool::new(self.width as usize * self.height as usize * 4, &self.shm_state)
                .expect("Failed to create pool");
            self.pool = Some(pool);
        }

        if let Some(pool) = &mut self.pool {
            if pool.len() < (self.width * self.height * 4) as usize {
                pool.resize((self.width * self.height * 4) as usize).unwrap();
            }
        }

        self.draw(conn, qh);
    }
}

impl CompositorHandler for WaylandApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {}

    fn frame(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
        self.draw(conn, qh);
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {}

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {}

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {}
}

impl OutputHandler for WaylandApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }
    fn new_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
    fn update_output(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
    fn output_destroyed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _output: wl_output::WlOutput) {}
}

impl SeatHandler for WaylandApp {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        match capability {
            Capability::Keyboard => {
                let _ = self.seat_state.get_keyboard(qh, &seat, None);
            }
            Capability::Pointer => {
                let _ = self.seat_state.get_pointer(qh, &seat);
            }
            _ => {}
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _: &QueueHandle<Self>,
        _: wl_seat::WlSeat,
        _capability: Capability,
    ) {}

    fn remove_seat(&mut self, _: &Connection, _: &QueueHandle<Self>, _: wl_seat::WlSeat) {}
}

impl KeyboardHandler for WaylandApp {
    fn enter(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _: &wl_surface::WlSurface,
        _: u32,
        _: &[u32],
        _: &[xkb::Keysym],
    ) {}

    fn leave(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _: &wl_surface::WlSurface,
        _: u32,
    ) {}

    fn press_key(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _keyboard: &wl_keyboard::WlKeyboard,
        _serial: u32,
        event: KeyEvent,
    ) {
        let sym = event.keysym;
        let raw_sym = u32::from(sym);

        let columns = self.layout.as_ref().map(|l| l.columns).unwrap_or(1) as i32;
        let page = (self.height as f32 - TITLE_BAR_HEIGHT).max(0.0);

        match raw_sym {
            keysyms::KEY_Escape => {
                if self.state.detail.is_some() {
                    self.state.detail = None;
                } else {
                    self.should_exit = true;
                }
            }
            keysyms::KEY_Return => {
                if self.state.detail.is_some() {
                    self.open_selected_source();
                } else if self.state.selected_entry().is_some() {
                    self.state.detail = Some(self.state.selected);
                }
            }
            keysyms::KEY_Up => {
                self.state.move_selection(-columns);
                self.scroll_to_selection = true;
            }
            keysyms::KEY_Down => {
                self.state.move_selection(columns);
                self.scroll_to_selection = true;
            }
            keysyms::KEY_Left => {
                self.state.move_selection(-1);
                self.scroll_to_selection = true;
            }
            keysyms::KEY_Right => {
                self.state.move_selection(1);
                self.scroll_to_selection = true;
            }
            keysyms::KEY_Page_Up => {
                self.state.scroll -= page;
            }
            keysyms::KEY_Page_Down => {
                self.state.scroll += page;
            }
            _ => {}
        }

        self.request_frame(qh);
    }

    fn release_key(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _: u32,
        _: KeyEvent,
    ) {}

    fn update_modifiers(
        &mut self,
        _: &Connection,
        _: &QueueHandle<Self>,
        _: &wl_keyboard::WlKeyboard,
        _serial: u32,
        _modifiers: Modifiers,
        _layout: u32,
    ) {}
}

impl PointerHandler for WaylandApp {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        let mut needs_redraw = false;

        for event in events {
            match event.kind {
                PointerEventKind::Press { button: BTN_LEFT, .. } => {
                    let (x, y) = event.position;
                    self.handle_click(x, y);
                    needs_redraw = true;
                }
                PointerEventKind::Axis { vertical, .. } => {
                    if self.state.detail.is_none() {
                        self.state.scroll += vertical.absolute as f32;
                        needs_redraw = true;
                    }
                }
                _ => {}
            }
        }

        if needs_redraw {
            self.request_frame(qh);
        }
    }
}

impl ShmHandler for WaylandApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm_state
    }
}

delegate_compositor!(WaylandApp);
delegate_output!(WaylandApp);
delegate_shm!(WaylandApp);
delegate_seat!(WaylandApp);
delegate_keyboard!(WaylandApp);
delegate_pointer!(WaylandApp);
delegate_layer!(WaylandApp);
delegate_registry!(WaylandApp);

impl ProvidesRegistryState for WaylandApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    fn runtime_add_global(&mut self, _: &Connection, _: &QueueHandle<Self>, _: u32, _: &str, _: u32) {
    }
    fn runtime_remove_global(&mut self, _: &Connection, _: &QueueHandle<Self>, _: u32, _: &str) {
    }
}
