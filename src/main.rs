use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::{info, warn};

use nsqtop::app::{self, App, View};
use nsqtop::data::duration::format_duration;
use nsqtop::logging::{self, LogTarget};
use nsqtop::ui::common::registries_label;
use nsqtop::{
    events, poller, ui, ChannelSource, ClusterClient, DataSource, Overrides, Pipeline, Settings,
    Thresholds,
};

/// Screen row of the table header, below the header bar, tabs and border.
const CONTENT_START_ROW: u16 = 3;

#[derive(Parser, Debug)]
#[command(name = "nsqtop", version)]
#[command(about = "Live terminal dashboard for NSQ clusters")]
struct Args {
    /// nsqlookupd HTTP address (comma separated or repeated, e.g. "127.0.0.1:4161")
    #[arg(short = 'l', long = "lookupd-http-address", value_name = "ADDR")]
    lookupd_http_address: Vec<String>,

    /// Refresh interval in seconds or as a duration (e.g. "2", "500ms") [default: 2]
    #[arg(short, long)]
    interval: Option<String>,

    /// Per-request HTTP timeout (e.g. "2s") [default: 2s]
    #[arg(long)]
    timeout: Option<String>,

    /// Channel depth shown as a warning [default: 100]
    #[arg(long)]
    depth_warn: Option<u64>,

    /// Channel depth shown as critical [default: 1000]
    #[arg(long)]
    depth_crit: Option<u64>,

    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file (the dashboard never logs to the terminal)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Sample the cluster twice, export to a JSON file and exit
    #[arg(short, long, value_name = "FILE")]
    export: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            lookupd_addresses: self.lookupd_http_address.clone(),
            interval: self.interval.clone(),
            timeout: self.timeout.clone(),
            depth_warn: self.depth_warn,
            depth_crit: self.depth_crit,
            config_file: self.config.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(&args.overrides())?;

    let target = LogTarget::select(args.log_file.as_deref(), args.export.is_some());
    let _guard = logging::init(&target)?;

    info!(
        registries = ?settings.lookupd_urls,
        interval = %format_duration(settings.interval),
        timeout = %format_duration(settings.timeout),
        "starting nsqtop"
    );

    let client = ClusterClient::builder()
        .registries(settings.lookupd_urls.iter().cloned())
        .timeout(settings.timeout)
        .build()?;

    let rt = tokio::runtime::Runtime::new()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_to_file(client, settings.interval, export_path));
    }

    let (tx, source) = ChannelSource::create(&registries_label(&settings.lookupd_urls));
    let handle = {
        let _runtime = rt.enter();
        poller::spawn(Pipeline::new(client, settings.interval), settings.interval, tx)
    };

    let result = run_tui(Box::new(source), settings.thresholds);

    rt.block_on(handle.shutdown());
    info!("nsqtop exiting");
    result
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, thresholds: Thresholds) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, thresholds);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5)
                        .intersection(area);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(8),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Channels => ui::channels::render(frame, app, chunks[2]),
                View::Nodes => ui::nodes::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, CONTENT_START_ROW),
                _ => {}
            }
        }

        // pick up a newly published cycle, if any
        app.reload_data();
    }

    Ok(())
}

/// Sample the cluster twice one interval apart so rates are populated, then
/// write the second cycle as JSON.
async fn export_to_file(client: ClusterClient, interval: Duration, export_path: &Path) -> Result<()> {
    let mut pipeline = Pipeline::new(client, interval);

    let first = pipeline.run_cycle().await;
    if let Some(ref err) = first.error {
        warn!(error = %err, "first export cycle failed");
    }

    tokio::time::sleep(interval).await;

    let data = pipeline.run_cycle().await;
    if let Some(err) = data.error {
        bail!(err);
    }

    app::write_export(&data, export_path)?;
    println!("Exported cluster state to: {}", export_path.display());
    Ok(())
}
