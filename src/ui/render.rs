use crate::config::ThemeConfig;
use crate::state::AppState;
use crate::ui::cache::IconCache;
use cosmic_text::{Align, Attrs, Buffer, FontSystem, Metrics, Shaping, SwashCache};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, PixmapMut, PixmapPaint, Rect, Stroke, Transform};

/// Height of the fixed bar at the top; the content area scrolls under it.
pub const TITLE_BAR_HEIGHT: f32 = 44.0;
const SECTION_HEADER_HEIGHT: f32 = 30.0;
const DETAIL_ROW_HEIGHT: f32 = 19.0;
const BUTTON_HEIGHT: f32 = 28.0;

/// Grid geometry for the current state and surface width.
///
/// Content coordinates start at 0 under the title bar; the renderer and the
/// pointer hit-testing both work from this one structure, so they can never
/// disagree about where a cell is.
pub struct Layout {
    pub columns: usize,
    pub content_height: f32,
    /// (label, content-space y) per group.
    pub headers: Vec<(String, f32)>,
    /// Cell rect per entry, indexed by flat entry index.
    pub cells: Vec<Rect>,
}

pub fn layout(state: &AppState, width: f32) -> Layout {
    let theme = &state.config.theme;
    let usable = (width - theme.padding * 2.0).max(theme.cell_width);
    let columns = (usable / theme.cell_width).floor().max(1.0) as usize;
    let cell_w = (theme.cell_width - theme.spacing).max(1.0);
    let cell_h = (theme.cell_height - theme.spacing).max(1.0);

    let mut y = theme.padding;
    let mut headers = Vec::new();
    let mut cells = Vec::new();

    for (root, entries) in &state.groups {
        headers.push((format!("{}  ({})", root.display(), entries.len()), y));
        y += SECTION_HEADER_HEIGHT;

        for i in 0..entries.len() {
            let col = i % columns;
            let row = i / columns;
            let x = theme.padding + col as f32 * theme.cell_width;
            let cell_y = y + row as f32 * theme.cell_height;
            // Geometry is clamped positive above, so this cannot fail.
            cells.push(Rect::from_xywh(x, cell_y, cell_w, cell_h).unwrap());
        }

        let rows = entries.len().div_ceil(columns);
        y += rows as f32 * theme.cell_height + theme.spacing;
    }

    Layout {
        columns,
        content_height: y + theme.padding,
        headers,
        cells,
    }
}

/// Geometry of the detail panel overlay, in screen coordinates.
pub struct DetailLayout {
    pub panel: Rect,
    pub open_button: Rect,
    pub close_button: Rect,
}

pub fn detail_layout(width: f32, height: f32) -> DetailLayout {
    let panel_w = (width - 80.0).clamp(240.0, 520.0);
    let panel_h = (height - 80.0).clamp(200.0, 400.0);
    let panel_x = (width - panel_w) / 2.0;
    let panel_y = (height - panel_h) / 2.0;

    let open_w = 150.0;
    let close_w = 80.0;
    let button_y = panel_y + panel_h - BUTTON_HEIGHT - 16.0;
    let close_x = panel_x + panel_w - close_w - 16.0;
    let open_x = close_x - open_w - 10.0;

    DetailLayout {
        panel: Rect::from_xywh(panel_x, panel_y, panel_w, panel_h).unwrap(),
        open_button: Rect::from_xywh(open_x, button_y, open_w, BUTTON_HEIGHT).unwrap(),
        close_button: Rect::from_xywh(close_x, button_y, close_w, BUTTON_HEIGHT).unwrap(),
    }
}

pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    pub icon_cache: IconCache,
}

impl Renderer {
    pub fn new(icon_cache: IconCache) -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            icon_cache,
        }
    }

    pub fn insert_icon(&mut self, name: String, pixmap: Option<Pixmap>) {
        self.icon_cache.insert(name, pixmap);
    }

    pub fn draw(&mut self, pixmap: &mut PixmapMut, state: &AppState, layout: &Layout) {
        let theme = &state.config.theme;
        let bg_color = ThemeConfig::parse_color(&theme.background);
        let border_color = ThemeConfig::parse_color(&theme.border_color);
        let text_color = ThemeConfig::parse_color(&theme.text);
        let muted_color = ThemeConfig::parse_color(&theme.muted_text);
        let sel_bg_color = ThemeConfig::parse_color(&theme.selection_background);
        let sel_text_color = ThemeConfig::parse_color(&theme.selection_text);
        let placeholder_color = ThemeConfig::parse_color(&theme.placeholder);

        pixmap.fill(Color::TRANSPARENT);

        let width = pixmap.width() as f32;
        let height = pixmap.height() as f32;

        let surface = Rect::from_xywh(0.0, 0.0, width, height).unwrap();
        self.draw_rounded_rect(pixmap, surface, theme.border_radius, bg_color, Some(border_color));

        if state.loading {
            self.draw_text_in(
                pixmap,
                "scanning application directories...",
                0.0,
                height / 2.0 - 10.0,
                width,
                24.0,
                15.0,
                muted_color,
                Some(Align::Center),
            );
        } else if state.groups.is_empty() {
            self.draw_text_in(
                pixmap,
                "no desktop entries found",
                0.0,
                height / 2.0 - 10.0,
                width,
                24.0,
                15.0,
                muted_color,
                Some(Align::Center),
            );
        } else {
            self.draw_content(
                pixmap,
                state,
                layout,
                text_color,
                muted_color,
                sel_bg_color,
                sel_text_color,
                placeholder_color,
            );
        }

        // The title bar is painted after the content so cells scrolling past
        // the top vanish under it.
        self.draw_title_bar(pixmap, state, width, bg_color, border_color, text_color, muted_color);

        if let Some(flat) = state.detail {
            if let Some(entry) = state.entry(flat) {
                self.draw_detail(
                    pixmap,
                    state,
                    entry,
                    width,
                    height,
                    bg_color,
                    border_color,
                    text_color,
                    muted_color,
                    sel_bg_color,
                    sel_text_color,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_content(
        &mut self,
        pixmap: &mut PixmapMut,
        state: &AppState,
        layout: &Layout,
        text_color: Color,
        muted_color: Color,
        sel_bg_color: Color,
        sel_text_color: Color,
        placeholder_color: Color,
    ) {
        let theme = &state.config.theme;
        let height = pixmap.height() as f32;
        let to_screen = TITLE_BAR_HEIGHT - state.scroll;

        for (label, y) in &layout.headers {
            let screen_y = y + to_screen;
            if screen_y + SECTION_HEADER_HEIGHT < 0.0 || screen_y > height {
                continue;
            }
            self.draw_text(pixmap, label, theme.padding, screen_y + 4.0, 15.0, muted_color);
        }

        let icon_size = theme.icon_size as f32;
        let radius = theme.border_radius / 2.0;

        for (flat, cell) in layout.cells.iter().enumerate() {
            let Some(entry) = state.entry(flat) else { break };
            let screen_top = cell.top() + to_screen;
            if screen_top + cell.height() < 0.0 || screen_top > height {
                continue;
            }
            let screen_cell = Rect::from_xywh(cell.left(), screen_top, cell.width(), cell.height()).unwrap();

            let selected = flat == state.selected;
            if selected {
                self.draw_rounded_rect(pixmap, screen_cell, radius, sel_bg_color, None);
            }

            let icon_x = screen_cell.left() + (screen_cell.width() - icon_size) / 2.0;
            let icon_y = screen_cell.top() + 8.0;

            let icon = self.icon_cache.get(&entry.icon);
            match icon {
                Some(icon_pixmap) => {
                    let icon_paint = PixmapPaint::default();
                    pixmap.draw_pixmap(
                        icon_x as i32,
                        icon_y as i32,
                        icon_pixmap.as_ref(),
                        &icon_paint,
                        Transform::identity(),
                        None,
                    );
                }
                None => {
                    // Blank placeholder for unresolved or still-loading icons.
                    if let Some(rect) = Rect::from_xywh(icon_x, icon_y, icon_size, icon_size) {
                        self.draw_rounded_rect(pixmap, rect, 6.0, placeholder_color, None);
                    }
                }
            }

            let name_color = if selected { sel_text_color } else { text_color };
            self.draw_text_in(
                pixmap,
                &entry.name,
                screen_cell.left() + 4.0,
                icon_y + icon_size + 6.0,
                screen_cell.width() - 8.0,
                32.0,
                12.0,
                name_color,
                Some(Align::Center),
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_title_bar(
        &mut self,
        pixmap: &mut PixmapMut,
        state: &AppState,
        width: f32,
        bg_color: Color,
        border_color: Color,
        text_color: Color,
        muted_color: Color,
    ) {
        let theme = &state.config.theme;

        let bar = Rect::from_xywh(0.0, 0.0, width, TITLE_BAR_HEIGHT).unwrap();
        self.draw_rounded_rect(pixmap, bar, theme.border_radius, bg_color, None);

        let mut paint = Paint::default();
        paint.set_color(border_color);
        if let Some(line) = Rect::from_xywh(0.0, TITLE_BAR_HEIGHT - 1.0, width, 1.0) {
            pixmap.fill_rect(line, &paint, Transform::identity(), None);
        }

        self.draw_text(pixmap, "deskview", theme.padding, 12.0, 18.0, text_color);

        let status = if state.loading {
            "scanning...".to_string()
        } else {
            format!("{} entries", state.entry_count())
        };
        self.draw_text_in(
            pixmap,
            &status,
            0.0,
            15.0,
            width - theme.padding,
            20.0,
            13.0,
            muted_color,
            Some(Align::Right),
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_detail(
        &mut self,
        pixmap: &mut PixmapMut,
        state: &AppState,
        entry: &crate::model::DesktopEntry,
        width: f32,
        height: f32,
        bg_color: Color,
        border_color: Color,
        text_color: Color,
        muted_color: Color,
        sel_bg_color: Color,
        sel_text_color: Color,
    ) {
        let theme = &state.config.theme;
        let detail = detail_layout(width, height);

        // Dim everything behind the panel.
        let mut scrim = Paint::default();
        scrim.set_color(Color::from_rgba8(0, 0, 0, 110));
        if let Some(full) = Rect::from_xywh(0.0, 0.0, width, height) {
            pixmap.fill_rect(full, &scrim, Transform::identity(), None);
        }

        self.draw_rounded_rect(pixmap, detail.panel, theme.border_radius, bg_color, Some(border_color));

        let x = detail.panel.left() + 16.0;
        let inner_w = detail.panel.width() - 32.0;
        let mut y = detail.panel.top() + 14.0;

        self.draw_text(pixmap, &entry.name, x, y, 17.0, text_color);
        y += 26.0;
        self.draw_text_in(
            pixmap,
            &entry.source_path.display().to_string(),
            x,
            y,
            inner_w,
            16.0,
            11.0,
            muted_color,
            None,
        );
        y += 24.0;

        let rows_bottom = detail.open_button.top() - 10.0;
        let available_rows = ((rows_bottom - y) / DETAIL_ROW_HEIGHT).max(0.0) as usize;
        let shown = entry.properties.len().min(available_rows);

        for (key, value) in entry.properties.iter().take(shown) {
            let label = if key.is_empty() { "(empty)" } else { key.as_str() };
            self.draw_text_in(pixmap, label, x, y, 130.0, DETAIL_ROW_HEIGHT, 12.0, muted_color, None);
            self.draw_text_in(
                pixmap,
                value,
                x + 140.0,
                y,
                inner_w - 140.0,
                DETAIL_ROW_HEIGHT,
                12.0,
                text_color,
                None,
            );
            y += DETAIL_ROW_HEIGHT;
        }
        if shown < entry.properties.len() {
            let more = format!("... {} more", entry.properties.len() - shown);
            self.draw_text(pixmap, &more, x, y, 11.0, muted_color);
        }

        self.draw_button(pixmap, detail.open_button, "open source file", sel_bg_color, sel_text_color);
        self.draw_button(pixmap, detail.close_button, "close", sel_bg_color, sel_text_color);
    }

    fn draw_button(&mut self, pixmap: &mut PixmapMut, rect: Rect, label: &str, bg: Color, fg: Color) {
        self.draw_rounded_rect(pixmap, rect, 6.0, bg, None);
        self.draw_text_in(
            pixmap,
            label,
            rect.left(),
            rect.top() + (rect.height() - 15.0) / 2.0,
            rect.width(),
            18.0,
            12.0,
            fg,
            Some(Align::Center),
        );
    }

    fn draw_rounded_rect(&self, pixmap: &mut PixmapMut, rect: Rect, radius: f32, fill: Color, stroke: Option<Color>) {
        let mut pb = PathBuilder::new();
        let x = rect.left();
        let y = rect.top();
        let w = rect.width();
        let h = rect.height();

        pb.move_to(x + radius, y);
        pb.line_to(x + w - radius, y);
        pb.quad_to(x + w, y, x + w, y + radius);
        pb.line_to(x + w, y + h - radius);
        pb.quad_to(x + w, y + h, x + w - radius, y + h);
        pb.line_to(x + radius, y + h);
        pb.quad_to(x, y + h, x, y + h - radius);
        pb.line_to(x, y + radius);
        pb.quad_to(x, y, x + radius, y);
        pb.close();

        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(fill);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, tiny_skia::FillRule::Winding, Transform::identity(), None);

            if let Some(s_color) = stroke {
                let mut s_paint = Paint::default();
                s_paint.set_color(s_color);
                s_paint.anti_alias = true;
                let stroke_obj = Stroke { width: 1.5, ..Default::default() };
                pixmap.stroke_path(&path, &s_paint, &stroke_obj, Transform::identity(), None);
            }
        }
    }

    fn draw_text(&mut self, pixmap: &mut PixmapMut, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let width = pixmap.width() as f32 - x;
        self.draw_text_in(pixmap, text, x, y, width, size * 1.5, size, color, None);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text_in(
        &mut self,
        pixmap: &mut PixmapMut,
        text: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        size: f32,
        color: Color,
        align: Option<Align>,
    ) {
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(size, size * 1.25));
        buffer.set_size(&mut self.font_system, Some(width), Some(height));
        buffer.set_text(&mut self.font_system, text, Attrs::new(), Shaping::Advanced);
        if align.is_some() {
            for line in buffer.lines.iter_mut() {
                line.set_align(align);
            }
        }
        buffer.shape_until_scroll(&mut self.font_system, false);

        let text_color = cosmic_text::Color::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        buffer.draw(&mut self.font_system, &mut self.swash_cache, text_color, |draw_x, draw_y, w, h, color| {
            let draw_x = draw_x + x as i32;
            let draw_y = draw_y + y as i32;
            if w == 0 || h == 0 {
                return;
            }
            if draw_x >= 0 && draw_y >= 0 && draw_x < pixmap.width() as i32 && draw_y < pixmap.height() as i32 {
                let paint = Paint {
                    shader: tiny_skia::Shader::SolidColor(tiny_skia::Color::from_rgba8(color.r(), color.g(), color.b(), color.a())),
                    ..Paint::default()
                };
                let rect = Rect::from_xywh(draw_x as f32, draw_y as f32, w as f32, h as f32);
                if let Some(r) = rect {
                    pixmap.fill_rect(r, &paint, Transform::identity(), None);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::DesktopEntry;
    use std::path::PathBuf;

    fn entry(name: &str) -> DesktopEntry {
        DesktopEntry {
            name: name.to_string(),
            icon: name.to_string(),
            source_path: PathBuf::from(format!("/apps/{}.desktop", name)),
            properties: Vec::new(),
        }
    }

    fn state_with(counts: &[usize]) -> AppState {
        let mut state = AppState::new(Config::default());
        let groups = counts
            .iter()
            .enumerate()
            .map(|(g, &n)| {
                let entries = (0..n).map(|i| entry(&format!("app-{}-{}", g, i))).collect();
                (PathBuf::from(format!("/root{}", g)), entries)
            })
            .collect();
        state.set_groups(groups);
        state
    }

    #[test]
    fn every_entry_gets_exactly_one_cell() {
        let state = state_with(&[7, 3]);
        let layout = layout(&state, 760.0);
        assert_eq!(layout.cells.len(), 10);
        assert_eq!(layout.headers.len(), 2);
    }

    #[test]
    fn rows_wrap_at_the_column_count() {
        let state = state_with(&[8]);
        let layout = layout(&state, 760.0);
        assert!(layout.columns >= 2);

        let first = layout.cells[0];
        let wrapped = layout.cells[layout.columns];
        assert_eq!(wrapped.left(), first.left());
        assert!(wrapped.top() > first.top());
    }

    #[test]
    fn content_height_covers_the_last_cell() {
        let state = state_with(&[5, 9]);
        let layout = layout(&state, 640.0);
        let last = layout.cells.last().unwrap();
        assert!(layout.content_height >= last.top() + last.height());
    }

    #[test]
    fn second_section_starts_below_the_first() {
        let state = state_with(&[4, 1]);
        let layout = layout(&state, 760.0);
        let first_header = layout.headers[0].1;
        let second_header = layout.headers[1].1;
        let last_of_first = layout.cells[3];
        assert!(second_header > first_header);
        assert!(second_header >= last_of_first.top() + last_of_first.height());
    }

    #[test]
    fn narrow_surface_still_has_one_column() {
        let state = state_with(&[3]);
        let layout = layout(&state, 60.0);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.cells.len(), 3);
    }

    #[test]
    fn detail_panel_fits_the_surface() {
        let detail = detail_layout(760.0, 560.0);
        assert!(detail.panel.width() <= 760.0);
        assert!(detail.open_button.top() > detail.panel.top());
        assert!(detail.close_button.right() <= detail.panel.right());
    }
}
