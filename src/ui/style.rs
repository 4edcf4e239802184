use gtk4 as gtk;

const CSS: &str = "
.info-bar { padding: 4px 12px; }
.info-label { font-size: 16pt; font-weight: bold; }
.memory-board { padding: 12px; border-radius: 12px; background-color: #2c3e50; }
.memory-card { border-radius: 12px; color: white; padding: 0; }
.memory-card.face-down { background: #3498db; }
.memory-card.face-up { background: #f39c12; }
.memory-card.matched { background: #27ae60; }
";

pub fn load_css() {
    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };

    let provider = gtk::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
