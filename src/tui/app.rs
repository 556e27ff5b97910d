use std::sync::mpsc::Sender;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{info, warn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use tokio::runtime::Handle;

use crate::config::AppConfig;
use crate::guidance::GuidanceClient;
use crate::location::{resolve, source_from_config};
use crate::models::{PrayerType, School};
use crate::prayer_times::methods::{method_label, next_method};
use crate::prayer_times::{seconds_until, TimingClient};
use crate::session::{GuidanceRequest, Session, TimingRequest, View};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{guidance, header, next_prayer, prayers, progress, qibla, statusbar};

/// Degrees one arrow press turns the manual heading.
const HEADING_STEP: f64 = 5.0;

pub struct App {
    pub session: Session,
    pub config: AppConfig,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub status: Option<String>,

    timing_client: Option<Arc<TimingClient>>,
    guidance_client: Option<Arc<GuidanceClient>>,
    rt: Handle,
    tx: Sender<Event>,
    schedule_day: NaiveDate,
    heading: Option<f64>,
}

impl App {
    pub fn new(session: Session, config: AppConfig, rt: Handle, tx: Sender<Event>) -> Self {
        let timing_client = match TimingClient::new(&config.timing) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                warn!("Prayer times unavailable: {}", e);
                None
            }
        };
        let guidance_client = match GuidanceClient::new(&config.guidance) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                warn!("Guidance unavailable: {}", e);
                None
            }
        };

        App {
            session,
            config,
            focus_idx: 0,
            should_quit: false,
            show_help: false,
            status: None,
            timing_client,
            guidance_client,
            rt,
            tx,
            schedule_day: Local::now().date_naive(),
            heading: None,
        }
    }

    /// Forward heading changes into the event queue until the feed goes away.
    pub fn watch_heading(&self) {
        let mut subscription = self.session.heading().subscribe();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            while let Some(degrees) = subscription.changed().await {
                if tx.send(Event::Heading(degrees)).is_err() {
                    break;
                }
            }
        });
    }

    /// Kick off the one-shot location lookup; the answer arrives as `Event::Located`.
    pub fn locate(&self) {
        let source = source_from_config(&self.config);
        let fallback = self.config.location.coordinate();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let coordinate = resolve(source.as_ref(), &fallback).await;
            let _ = tx.send(Event::Located(coordinate));
        });
    }

    fn spawn_timing(&mut self, request: Option<TimingRequest>) {
        let Some(req) = request else { return };
        let Some(client) = self.timing_client.clone() else {
            self.session
                .apply_timing(req.seq, Err("prayer time client unavailable".to_string()));
            return;
        };
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let result = client
                .fetch(&req.location, req.method, req.school)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Event::Timing {
                seq: req.seq,
                result,
            });
        });
    }

    fn spawn_guidance(&mut self, request: Option<GuidanceRequest>) {
        let Some(req) = request else { return };
        let Some(client) = self.guidance_client.clone() else {
            self.session.apply_guidance(req.seq, Vec::new());
            return;
        };
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let recommendations = client
                .fetch(&req.history, req.next_prayer, &req.user_name)
                .await;
            let _ = tx.send(Event::Guidance {
                seq: req.seq,
                recommendations,
            });
        });
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Tick => self.tick(),
            Event::Located(coordinate) => {
                info!("Using location {}", coordinate.label());
                let req = self.session.set_location(coordinate);
                self.spawn_timing(req);
            }
            Event::Timing { seq, result } => {
                if self.session.apply_timing(seq, result) {
                    self.schedule_day = Local::now().date_naive();
                }
            }
            Event::Guidance {
                seq,
                recommendations,
            } => {
                self.session.apply_guidance(seq, recommendations);
            }
            Event::Heading(degrees) => self.heading = Some(degrees),
        }
    }

    fn tick(&mut self) {
        let today = Local::now().date_naive();
        if today != self.schedule_day {
            // past midnight the held schedule belongs to yesterday
            self.schedule_day = today;
            let req = self.session.issue_timing();
            self.spawn_timing(req);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            KeyCode::Tab => {
                let idx = View::ALL
                    .iter()
                    .position(|v| *v == self.session.view())
                    .unwrap_or(0);
                self.switch_view(View::ALL[(idx + 1) % View::ALL.len()]);
                return;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.switch_view(View::ALL[idx]);
                return;
            }
            _ => {}
        }

        match self.session.view() {
            View::Today => self.handle_today_key(key),
            View::Progress => {}
            View::Guidance => {
                if key.code == KeyCode::Char('r') {
                    let req = self.session.begin_guidance();
                    self.spawn_guidance(req);
                }
            }
            View::Qibla => match key.code {
                KeyCode::Left => self.session.heading().rotate(-HEADING_STEP),
                KeyCode::Right => self.session.heading().rotate(HEADING_STEP),
                _ => {}
            },
        }
    }

    fn switch_view(&mut self, view: View) {
        let req = self.session.enter_view(view);
        self.spawn_guidance(req);
    }

    fn handle_today_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.focus_idx + 1 < PrayerType::ALL.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('m') | KeyCode::Char(' ') | KeyCode::Enter => {
                let prayer = PrayerType::ALL[self.focus_idx];
                match self.session.toggle_today(prayer) {
                    Ok(done) => {
                        let verb = if done { "marked" } else { "unmarked" };
                        self.status = Some(format!("{} {}", prayer.display_name(), verb));
                    }
                    Err(e) => {
                        warn!("Saving progress failed: {:#}", e);
                        self.status = Some("Could not save progress".to_string());
                    }
                }
            }
            KeyCode::Char('c') => {
                let method = next_method(self.session.profile().calculation_method);
                match self.session.set_method(method) {
                    Ok(req) => {
                        self.status = Some(method_label(method));
                        self.spawn_timing(req);
                    }
                    Err(e) => warn!("Saving method failed: {:#}", e),
                }
            }
            KeyCode::Char('h') => {
                let school = match self.session.profile().school {
                    School::Standard => School::Hanafi,
                    School::Hanafi => School::Standard,
                };
                match self.session.set_school(school) {
                    Ok(req) => {
                        self.status = Some(format!("Asr: {}", school.display_name()));
                        self.spawn_timing(req);
                    }
                    Err(e) => warn!("Saving school failed: {:#}", e),
                }
            }
            KeyCode::Char('R') => {
                let req = self.session.issue_timing();
                self.spawn_timing(req);
            }
            _ => {}
        }
    }

    // ─── Drawing ─────────────────────────────────────────────────────────────

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        let schedule = self.session.schedule();
        let hijri = schedule.and_then(|s| s.hijri.as_ref()).map(|h| h.long_form());
        let gregorian = schedule.and_then(|s| s.readable_date.as_deref());
        let place = self
            .session
            .location()
            .map(|l| l.label())
            .unwrap_or_else(|| "locating…".to_string());

        header::render(
            frame,
            outer[0],
            hijri.as_deref(),
            gregorian,
            &place,
            self.session.view(),
        );
        statusbar::render(frame, outer[2], self.session.view(), self.status.as_deref());

        match self.session.view() {
            View::Today => self.draw_today(frame, outer[1]),
            View::Progress => progress::render(
                frame,
                outer[1],
                self.session.history(),
                &self.session.today_progress(),
            ),
            View::Guidance => guidance::render(
                frame,
                outer[1],
                self.session.guidance(),
                self.session.guidance_busy(),
                self.guidance_client
                    .as_ref()
                    .map(|c| c.is_configured())
                    .unwrap_or(false),
            ),
            View::Qibla => qibla::render(
                frame,
                outer[1],
                self.session.location(),
                self.session.qibla_bearing(),
                self.heading,
            ),
        }

        if self.show_help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_today(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // prayers
                Constraint::Length(4), // guidance preview
                Constraint::Min(0),
            ])
            .split(columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(columns[1]);

        let now = Local::now().time();
        let next = self.session.next_prayer_at(now);
        let countdown = self
            .session
            .schedule()
            .zip(next)
            .map(|(s, p)| (p, seconds_until(s, p, now)));

        prayers::render(
            frame,
            left[0],
            self.session.schedule(),
            &self.session.today_progress(),
            next,
            self.focus_idx,
        );
        guidance::render_preview(frame, left[1], self.session.guidance().first());
        next_prayer::render(frame, right[0], countdown, self.session.schedule_error());
        self.draw_day_marks(frame, right[1]);
    }

    fn draw_day_marks(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(" Day ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(theme::surface());

        let profile = self.session.profile();
        let mut lines = vec![Line::from(vec![
            Span::styled("  Method  ", theme::dim()),
            Span::styled(method_label(profile.calculation_method), theme::bold()),
        ])];
        lines.push(Line::from(vec![
            Span::styled("  Asr     ", theme::dim()),
            Span::styled(profile.school.display_name(), theme::bold()),
        ]));
        if let Some(schedule) = self.session.schedule() {
            lines.push(Line::from(""));
            for (label, time) in schedule.all_marks() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<8}", label), theme::dim()),
                    Span::styled(time.format("%H:%M").to_string(), theme::base()),
                ]));
            }
            if let Some(midnight) = schedule.midnight {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<8}", "Midnight"), theme::dim()),
                    Span::styled(midnight.format("%H:%M").to_string(), theme::dim()),
                ]));
            }
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: area.height / 2,
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[1-4] / Tab", "Switch view"),
            ("[↑ ↓]", "Select prayer"),
            ("[m] / Enter", "Toggle prayer performed"),
            ("[c]", "Next calculation method"),
            ("[h]", "Toggle Asr school"),
            ("[R]", "Refetch prayer times"),
            ("[r]", "New guidance"),
            ("[← →]", "Adjust heading"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, desc) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<13}", key), theme::gold()),
                Span::styled(desc, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(session: Session, config: AppConfig, rt: Handle) -> Result<()> {
    let events = EventHandler::new(1000);
    let mut app = App::new(session, config, rt, events.sender());
    app.watch_heading();
    app.locate();

    let mut terminal = ratatui::init();

    let outcome = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;
            app.handle_event(events.next()?);
            if app.should_quit {
                return Ok(());
            }
        }
    })();

    ratatui::restore();
    outcome
}
