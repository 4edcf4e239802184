use std::rc::Rc;

use gettextrs::{LocaleCategory, gettext};
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use tracing::{debug, warn};

use super::board::build_board_grid;
use super::dialogs::show_about_dialog;
use super::style::load_css;
use super::surface::{GlibLoop, GtkSurface};
use crate::game::controller::{score_text, time_text};
use crate::game::{GameConfig, GameController};

pub const APP_ID: &str = "io.github.memorypairs.MemoryPairs";
const GETTEXT_PACKAGE: &str = "memory-pairs";
const LOCALEDIR: &str = match option_env!("MEMORY_PAIRS_LOCALEDIR") {
    Some(dir) => dir,
    None => "/usr/share/locale",
};

fn init_gettext() {
    let _ = gettextrs::setlocale(LocaleCategory::LcAll, "");
    if let Err(err) = gettextrs::bindtextdomain(GETTEXT_PACKAGE, LOCALEDIR) {
        warn!(error = %err, "unable to bind text domain");
        return;
    }
    if let Err(err) = gettextrs::bind_textdomain_codeset(GETTEXT_PACKAGE, "UTF-8") {
        warn!(error = %err, "unable to set text domain codeset");
    }
    if let Err(err) = gettextrs::textdomain(GETTEXT_PACKAGE) {
        warn!(error = %err, "unable to switch text domain");
    }
}

pub fn run(config: GameConfig) -> glib::ExitCode {
    init_gettext();
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        if let Some(window) = app.active_window() {
            window.present();
            return;
        }
        load_css();
        install_app_actions(app);
        build_window(app, config.clone());
    });

    app.set_accels_for_action("app.quit", &["<Control>q"]);
    app.set_accels_for_action("win.new-game", &["<Control>n", "F5"]);
    app.run()
}

fn install_app_actions(app: &adw::Application) {
    let about_action = SimpleAction::new("about", None);
    about_action.connect_activate({
        let app = app.clone();
        move |_, _| {
            show_about_dialog(&app);
        }
    });
    app.add_action(&about_action);

    let quit_action = SimpleAction::new("quit", None);
    quit_action.connect_activate({
        let app = app.clone();
        move |_, _| app.quit()
    });
    app.add_action(&quit_action);
}

fn info_label(text: &str, halign: gtk::Align) -> gtk::Label {
    gtk::Label::builder()
        .label(text)
        .halign(halign)
        .hexpand(true)
        .css_classes(vec!["info-label"])
        .build()
}

fn build_window(app: &adw::Application, config: GameConfig) {
    let score_label = info_label(&score_text(0), gtk::Align::Start);
    let time_label = info_label(&time_text(0), gtk::Align::End);
    let info_bar = gtk::Box::new(gtk::Orientation::Horizontal, 0);
    info_bar.add_css_class("info-bar");
    info_bar.append(&score_label);
    info_bar.append(&time_label);

    let (board, cells) = build_board_grid(config.rows(), config.cols());

    let restart_bottom = gtk::Button::builder()
        .label(format!("🔄 {}", gettext("Restart")))
        .action_name("win.new-game")
        .halign(gtk::Align::Center)
        .css_classes(vec!["suggested-action", "pill"])
        .build();

    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(20);
    content.set_margin_end(20);
    content.append(&info_bar);
    content.append(&board);
    content.append(&restart_bottom);

    let title = gtk::Label::new(None);
    title.set_markup(&format!("<b>{}</b>", gettext("Memory Pairs")));
    let header = adw::HeaderBar::builder().title_widget(&title).build();

    let restart_button = gtk::Button::builder()
        .icon_name("view-refresh-symbolic")
        .action_name("win.new-game")
        .build();
    restart_button.set_tooltip_text(Some(&gettext("New Game")));
    header.pack_start(&restart_button);

    let menu_model = gio::Menu::new();
    menu_model.append(Some(&gettext("About Memory Pairs")), Some("app.about"));
    menu_model.append(Some(&gettext("Quit")), Some("app.quit"));
    let menu_button = gtk::MenuButton::builder()
        .icon_name("open-menu-symbolic")
        .menu_model(&menu_model)
        .build();
    header.pack_end(&menu_button);

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    let win = adw::ApplicationWindow::builder()
        .application(app)
        .title(gettext("Memory Pairs"))
        .resizable(false)
        .content(&toolbar)
        .build();

    let surface = Rc::new(GtkSurface::new(cells, score_label, time_label, win.clone()));
    let game = GameController::new(config, surface.clone(), Rc::new(GlibLoop));

    for (index, view) in surface.cells().iter().enumerate() {
        let game = game.clone();
        view.button.connect_clicked(move |_| game.on_cell_click(index));
    }

    let new_game_action = SimpleAction::new("new-game", None);
    new_game_action.connect_activate({
        let game = game.clone();
        move |_, _| {
            debug!("restart requested");
            game.new_game();
        }
    });
    win.add_action(&new_game_action);

    game.new_game();
    win.present();
}
