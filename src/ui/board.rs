use std::cell::RefCell;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;

use crate::game::CardFace;
use crate::game::state::HIDDEN_LABEL;

pub const CARD_SIZE: i32 = 100;
pub const TILE_GAP: i32 = 10;

const FACE_CLASSES: [&str; 3] = ["face-down", "face-up", "matched"];

fn face_class(face: CardFace) -> &'static str {
    match face {
        CardFace::FaceDown => "face-down",
        CardFace::FaceUp => "face-up",
        CardFace::Matched => "matched",
    }
}

/// One card button, bound to a single board index for its whole life.
pub struct CellView {
    pub button: gtk::Button,
    area: gtk::DrawingArea,
    label: Rc<RefCell<String>>,
}

impl CellView {
    fn new() -> Self {
        let label = Rc::new(RefCell::new(HIDDEN_LABEL.to_string()));

        let button = gtk::Button::builder()
            .css_classes(vec!["memory-card", "face-down"])
            .build();
        button.set_size_request(CARD_SIZE, CARD_SIZE);

        let area = gtk::DrawingArea::builder()
            .hexpand(true)
            .vexpand(true)
            .build();
        area.add_css_class("memory-card-label");

        let label_draw = label.clone();
        area.set_draw_func(move |area, cr, width, height| {
            draw_label(area, cr, width, height, &label_draw.borrow());
        });

        button.set_child(Some(&area));
        CellView {
            button,
            area,
            label,
        }
    }

    pub fn set_face(&self, label: &str, face: CardFace) {
        *self.label.borrow_mut() = label.to_string();
        for class in FACE_CLASSES {
            self.button.remove_css_class(class);
        }
        self.button.add_css_class(face_class(face));
        self.area.queue_draw();
    }
}

fn draw_label(area: &gtk::DrawingArea, cr: &cairo::Context, width: i32, height: i32, text: &str) {
    let is_hidden = text == HIDDEN_LABEL;
    let min_dim = width.min(height) as f64;
    let font_size = if is_hidden {
        min_dim * 0.34
    } else {
        min_dim * 0.40
    };

    cr.set_antialias(cairo::Antialias::Best);

    let layout = pangocairo::functions::create_layout(cr);
    let mut font_desc = pango::FontDescription::new();
    if is_hidden {
        font_desc.set_family("Cantarell, Noto Sans, sans");
        font_desc.set_weight(pango::Weight::Bold);
    } else {
        font_desc.set_family("Noto Color Emoji, Apple Color Emoji, Segoe UI Emoji, sans");
    }
    font_desc.set_size((font_size * pango::SCALE as f64) as i32);
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    #[allow(deprecated)]
    let fg = area.style_context().color();
    cr.set_source_rgba(
        fg.red() as f64,
        fg.green() as f64,
        fg.blue() as f64,
        fg.alpha() as f64,
    );

    let (text_width, text_height) = layout.pixel_size();
    cr.move_to(
        (width as f64 - text_width as f64) / 2.0,
        (height as f64 - text_height as f64) / 2.0,
    );
    pangocairo::functions::show_layout(cr, &layout);
}

/// Lays out `rows * cols` cards; the view at position `i` shows cell `i`.
pub fn build_board_grid(rows: usize, cols: usize) -> (gtk::Grid, Vec<CellView>) {
    let grid = gtk::Grid::new();
    grid.add_css_class("memory-board");
    grid.set_row_spacing(TILE_GAP as u32);
    grid.set_column_spacing(TILE_GAP as u32);
    grid.set_halign(gtk::Align::Center);
    grid.set_valign(gtk::Align::Center);

    let views: Vec<CellView> = (0..rows * cols).map(|_| CellView::new()).collect();
    for (index, view) in views.iter().enumerate() {
        let x = (index % cols) as i32;
        let y = (index / cols) as i32;
        grid.attach(&view.button, x, y, 1, 1);
    }

    (grid, views)
}
