#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();
    lifegrid_ui::run_native()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
