use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use gtk4 as gtk;
use gtk4::glib;
use libadwaita as adw;

use super::board::CellView;
use super::dialogs::show_completion_dialog;
use crate::game::scheduler::{OnceTask, RepeatingTask};
use crate::game::{CardFace, EventLoop, Surface};

/// Game surface backed by the window's widgets.
pub struct GtkSurface {
    cells: Vec<CellView>,
    score_label: gtk::Label,
    time_label: gtk::Label,
    window: adw::ApplicationWindow,
}

impl GtkSurface {
    pub fn new(
        cells: Vec<CellView>,
        score_label: gtk::Label,
        time_label: gtk::Label,
        window: adw::ApplicationWindow,
    ) -> Self {
        GtkSurface {
            cells,
            score_label,
            time_label,
            window,
        }
    }

    pub fn cells(&self) -> &[CellView] {
        &self.cells
    }
}

impl Surface for GtkSurface {
    fn render(&self, index: usize, label: &str, face: CardFace) {
        self.cells[index].set_face(label, face);
    }

    fn set_score_text(&self, text: &str) {
        self.score_label.set_text(text);
    }

    fn set_time_text(&self, text: &str) {
        self.time_label.set_text(text);
    }

    fn show_completion_dialog(&self, title: &str, message: &str) {
        show_completion_dialog(&self.window, title, message);
    }
}

/// Timers on the default GLib main context.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlibLoop;

impl EventLoop for GlibLoop {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule_once(&self, delay: Duration, task: OnceTask) {
        glib::timeout_add_local_once(delay, task);
    }

    fn schedule_repeating(&self, interval: Duration, mut task: RepeatingTask) {
        glib::timeout_add_local(interval, move || match task() {
            ControlFlow::Continue(()) => glib::ControlFlow::Continue,
            ControlFlow::Break(()) => glib::ControlFlow::Break,
        });
    }
}
