//! Terminal dashboard for EcoTrack: monitor simulated bins, empty them, and plan collection routes.

mod app;
mod input;
mod log;
mod settings;
#[cfg(test)]
mod test_utils;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use ::log::info;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ecotrack_core::service::EcoTrack;
use ecotrack_provider_gemini::GeminiPort;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;

use crate::app::App;
use crate::input::Action;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Settings + logging
    let settings = Settings::load()?;
    log::init(&settings.log_level, &settings.log_file)?;

    // HTTP + service setup
    let client = Client::builder()
        .user_agent("ecotrack/0.1")
        .timeout(settings.request_timeout())
        .build()?;
    let gemini = settings.gemini();
    if gemini.api_key.is_none() {
        info!("No Gemini API key set, AI features will use their defaults");
    }
    let port = Arc::new(GeminiPort::new(client, gemini));
    let service = EcoTrack::new(port, settings.simulation());

    // App state
    let app = App::new(service);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Redraw every pass so simulated readings show up without input
        app.clamp_selection();
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::Login(role) => app.login(role),
                Action::Logout => app.logout(),
                Action::EmptySelectedBin => {
                    let Some(id) = app.selected_bin_id() else {
                        app.error_message = Some("No bin selected".into());
                        continue;
                    };
                    app.service.empty_bin(&id);
                    app.error_message = None;
                    app.status_message = Some(format!("{id} emptied"));
                }
                Action::PredictSelectedBin => {
                    let Some(id) = app.selected_bin_id() else {
                        app.error_message = Some("No bin selected".into());
                        continue;
                    };

                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.predict_overflow(&id).await;

                    app.is_loading = false;
                    app.status_message = res.map(|when| format!("{id} full by {when}"));
                }
                Action::OptimizeRoute => {
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.optimize_route().await;

                    app.is_loading = false;
                    match res {
                        Some(route) => {
                            app.route_list_index = 0;
                            app.status_message = Some(format!(
                                "Route {} with {} stops ready",
                                route.id,
                                route.stops.len()
                            ));
                        }
                        None => {
                            app.status_message =
                                Some("No bins above 50% fill, nothing to collect".into());
                        }
                    }
                }
                Action::ResetSimulation => {
                    app.service.reset_simulation();
                    app.bin_list_index = 0;
                    app.route_list_index = 0;
                    app.status_message = Some("Simulation reset to initial bins".into());
                }
            }
        }
    }

    app.logout();
    Ok(())
}
