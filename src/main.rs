use grid_monitor::components::app::App;
use grid_monitor::util::init_logging;
use grid_monitor::ViewerConfig;

fn main() {
    let config = ViewerConfig::from_document();
    let level = config.as_ref().map_or("info", |cfg| cfg.log_level.as_str());
    init_logging(level);
    if let Err(err) = &config {
        tracing::warn!(%err, "falling back to default viewer config");
    }
    yew::Renderer::<App>::with_props(grid_monitor::components::app::AppProps {
        config: config.unwrap_or_default(),
    })
    .render();
}
