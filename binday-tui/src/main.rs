//! Terminal UI for binday: pick an address once, then watch collection countdowns.

mod app;
mod input;
mod ui;

use std::{
    fs::{self, File},
    io,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use binday_core::{
    clock::{Clock, SystemClock},
    config::EngineConfig,
    error::EngineError,
    model::{BinSchedule, PropertyId},
    service::BinDayService,
};
use binday_provider_wollongong::{http_client, plugin};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::app::{App, Choice, Next, Update};
use crate::input::Action;

const LOG_FILE: &str = "binday.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config = EngineConfig::from_env();
    init_logging(&config)?;

    // HTTP + service setup
    let client = http_client(&config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let wollongong = plugin(client, &config, Arc::clone(&clock));
    let service = Arc::new(BinDayService::with_clock(wollongong, &config, clock));
    info!(municipality = %service.municipality().name, data_dir = %config.data_dir.display(), "starting");

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

// Logs go to a file so they never draw over the alternate screen.
fn init_logging(config: &EngineConfig) -> Result<()> {
    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating {}", config.data_dir.display()))?;
    let path = config.data_dir.join(LOG_FILE);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    match app.property {
        Some(property) => load_dashboard(&mut app, &tx, property),
        None => load_choices(&mut app, &tx, Next::Localities),
    }

    loop {
        // Apply whatever background work finished since the last frame
        while let Ok(update) = rx.try_recv() {
            let schedule = match &update {
                Update::Schedule(property, resolution)
                    if app.property == Some(*property) && !resolution.schedule.is_empty() =>
                {
                    Some(resolution.schedule.clone())
                }
                _ => None,
            };
            app.apply(update);
            if let Some(schedule) = schedule {
                spawn_advisories(&app, &tx, schedule);
            }
        }

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Pick => match app.pick_current() {
                    Some(Next::Dashboard(property)) => {
                        if let Err(err) = app.service.complete_setup(property) {
                            app.error_message = Some(format!("Could not save address: {err}"));
                        }
                        load_dashboard(&mut app, &tx, property);
                    }
                    Some(next) => load_choices(&mut app, &tx, next),
                    None => {}
                },
                Action::Back => {
                    if let Some(next) = app.step_back() {
                        load_choices(&mut app, &tx, next);
                    }
                }
                Action::Refresh => {
                    if let Some(property) = app.property {
                        spawn_schedule(&mut app, &tx, property, true);
                    }
                }
                Action::Export => export_calendar(&mut app),
                Action::SearchMaterials => spawn_materials(&mut app, &tx),
                Action::ChangeAddress => {
                    app.begin_setup();
                    load_choices(&mut app, &tx, Next::Localities);
                }
            }
        }
    }

    Ok(())
}

fn send(tx: &UnboundedSender<Update>, update: Update) {
    if tx.send(update).is_err() {
        debug!("ui closed before update arrived");
    }
}

fn into_choices<T: Into<Choice>>(items: Vec<T>) -> Vec<Choice> {
    items.into_iter().map(Into::into).collect()
}

fn load_choices(app: &mut App, tx: &UnboundedSender<Update>, next: Next) {
    let step = app.setup_step;
    let service = Arc::clone(&app.service);
    let tx = tx.clone();
    app.is_loading = true;
    app.error_message = None;

    tokio::spawn(async move {
        let result = match next {
            Next::Localities => service.localities().await.map(into_choices),
            Next::Streets(locality) => service.streets(locality).await.map(into_choices),
            Next::Properties(street) => service.properties(street).await.map(into_choices),
            Next::Dashboard(_) => return,
        };
        let result = result.map_err(|err| format!("Loading {} list failed: {err}", step.title()));
        send(&tx, Update::Choices(step, result));
    });
}

fn load_dashboard(app: &mut App, tx: &UnboundedSender<Update>, property: PropertyId) {
    spawn_schedule(app, tx, property, false);

    let service = Arc::clone(&app.service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = service.upcoming_event().await;
        send(&tx, Update::Event(event));
    });
}

// Repeated requests for the property being fetched are dropped. A request for another
// property queues behind the running fetch on the resolver's lock.
fn spawn_schedule(app: &mut App, tx: &UnboundedSender<Update>, property: PropertyId, force: bool) {
    if !app.begin_schedule(property) {
        debug!(%property, "refresh already running");
        return;
    }

    let service = Arc::clone(&app.service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let resolution = if force {
            service.refresh(property).await
        } else {
            service.resolve(property).await
        };
        send(&tx, Update::Schedule(property, resolution));
    });
}

fn spawn_advisories(app: &App, tx: &UnboundedSender<Update>, schedule: BinSchedule) {
    let service = Arc::clone(&app.service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let advisories = service.advisories(&schedule).await;
        send(&tx, Update::Advisories(advisories));
    });
}

fn spawn_materials(app: &mut App, tx: &UnboundedSender<Update>) {
    let query = app.query.trim().to_owned();
    let service = Arc::clone(&app.service);
    let tx = tx.clone();
    app.is_loading = true;
    app.error_message = None;

    tokio::spawn(async move {
        let result = service
            .which_bin(&query)
            .await
            .map_err(|err| format!("Guide unavailable: {err}"));
        send(&tx, Update::Materials(result));
    });
}

fn export_calendar(app: &mut App) {
    let Some(resolution) = &app.resolution else {
        app.error_message = Some(EngineError::ExportEmpty.to_string());
        return;
    };

    match app.service.save_calendar(&resolution.schedule) {
        Ok(path) => {
            app.error_message = None;
            app.notice = Some(format!("Calendar saved to {}", path.display()));
        }
        Err(err) => app.error_message = Some(format!("Export failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use binday_core::{
        clock::FixedClock,
        model::{
            BinKind, Locality, LocalityId, Material, MunicipalEvent, NextCollection, Property,
            Street, StreetId, WeatherSample,
        },
        plugin::{MunicipalityMeta, MunicipalityPlugin},
        ports::{ForecastPort, PortError, ReferencePort, SchedulePort},
    };
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

    use super::*;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(11 * 3600).expect("valid offset")
    }

    fn now() -> DateTime<FixedOffset> {
        offset()
            .with_ymd_and_hms(2026, 10, 19, 8, 0, 0)
            .single()
            .expect("unambiguous")
    }

    fn organic_day(property: PropertyId) -> NaiveDate {
        let day = u32::try_from(20 + property.0).expect("small id");
        NaiveDate::from_ymd_opt(2026, 10, day).expect("valid date")
    }

    #[derive(Default)]
    struct SlowMunicipality {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReferencePort for SlowMunicipality {
        async fn localities(&self) -> Result<Vec<Locality>, PortError> {
            Ok(Vec::new())
        }

        async fn streets(&self, _locality: LocalityId) -> Result<Vec<Street>, PortError> {
            Ok(Vec::new())
        }

        async fn properties(&self, _street: StreetId) -> Result<Vec<Property>, PortError> {
            Ok(Vec::new())
        }

        async fn materials(&self) -> Result<Vec<Material>, PortError> {
            Ok(Vec::new())
        }

        async fn events(&self) -> Result<Vec<MunicipalEvent>, PortError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl SchedulePort for SlowMunicipality {
        async fn schedule(&self, property: PropertyId) -> Result<BinSchedule, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            let mut schedule = BinSchedule::new();
            let next = NextCollection::on(organic_day(property), offset()).expect("valid date");
            schedule.insert(BinKind::Organic, next);
            Ok(schedule)
        }
    }

    #[async_trait]
    impl ForecastPort for SlowMunicipality {
        async fn daily(&self, _days_ahead: u32) -> Result<WeatherSample, PortError> {
            Ok(WeatherSample {
                date: now().date_naive(),
                rainfall_mm: 0.0,
                wind_kmh: 0.0,
                weather_code: None,
            })
        }
    }

    fn app(dir: &tempfile::TempDir, fake: &Arc<SlowMunicipality>) -> App {
        let plugin = MunicipalityPlugin {
            meta: MunicipalityMeta {
                id: "test".to_owned(),
                name: "Test".to_owned(),
            },
            reference_port: Arc::clone(fake) as Arc<dyn ReferencePort>,
            schedule_port: Arc::clone(fake) as Arc<dyn SchedulePort>,
            forecast_port: Arc::clone(fake) as Arc<dyn ForecastPort>,
        };
        let config = EngineConfig::default().with_data_dir(dir.path());
        let service = BinDayService::with_clock(plugin, &config, Arc::new(FixedClock(now())));
        App::new(Arc::new(service))
    }

    #[tokio::test]
    async fn new_address_is_fetched_while_a_refresh_is_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fake = Arc::new(SlowMunicipality::default());
        let mut app = app(&dir, &fake);
        let (tx, mut rx) = mpsc::unbounded_channel();

        app.property = Some(PropertyId(1));
        spawn_schedule(&mut app, &tx, PropertyId(1), true);
        spawn_schedule(&mut app, &tx, PropertyId(1), true);

        // The user finishes setup for another address before the refresh lands.
        app.property = Some(PropertyId(8));
        load_dashboard(&mut app, &tx, PropertyId(8));

        let mut schedules = 0;
        while schedules < 2 {
            let update = tokio::time::timeout(StdDuration::from_secs(5), rx.recv())
                .await
                .expect("update in time")
                .expect("channel open");
            if matches!(update, Update::Schedule(..)) {
                schedules += 1;
            }
            app.apply(update);
        }

        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
        assert_eq!(app.refresh_pending, None);
        let shown = app
            .resolution
            .as_ref()
            .and_then(|resolution| resolution.schedule.get(BinKind::Organic))
            .map(NextCollection::day);
        assert_eq!(shown, Some(organic_day(PropertyId(8))));
    }
}
