/**
 * OpenField Collect - desktop entry point
 *
 * Loads configuration, opens the offline queue and runs the collection form
 * with the sync center.
 */
use eframe::egui;
use openfield_collect::egui_app::capture::TICK_INTERVAL;
use openfield_collect::egui_app::theme::styles;
use openfield_collect::egui_app::{views, AppState, Config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("openfield_collect=info")),
        )
        .init();

    let config = Config::load()?;
    let state = AppState::new(config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([720.0, 520.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "OpenField Collect",
        options,
        Box::new(move |cc| {
            styles::apply_global_theme(&cc.egui_ctx);
            Ok(Box::new(CollectApp { state }))
        }),
    )?;
    Ok(())
}

struct CollectApp {
    state: AppState,
}

impl eframe::App for CollectApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.update();

        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        if let Some(path) = dropped.into_iter().next() {
            self.state.import_audio(path);
        }

        views::render_top_bar(ctx, &mut self.state);
        views::render_sync_panel(ctx, &mut self.state);
        views::render_main_panel(ctx, &mut self.state);

        if self.state.needs_tick() {
            ctx.request_repaint_after(TICK_INTERVAL);
        } else {
            // Background sync updates arrive without input events
            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        }
    }
}
