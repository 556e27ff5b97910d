use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CEvent, KeyEvent};

use crate::models::{Coordinate, Recommendation};
use crate::prayer_times::DailySchedule;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    /// The startup location lookup finished.
    Located(Coordinate),
    /// A timing fetch finished; `seq` says which request it answers.
    Timing {
        seq: u64,
        result: Result<DailySchedule, String>,
    },
    /// A guidance fetch finished.
    Guidance {
        seq: u64,
        recommendations: Vec<Recommendation>,
    },
    /// The heading feed moved.
    Heading(f64),
}

/// Merges terminal input, ticks and background results into one queue.
pub struct EventHandler {
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let input_tx = tx.clone();

        thread::spawn(move || {
            let mut last_tick = std::time::Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::ZERO);

                if event::poll(timeout).unwrap_or(false) {
                    match event::read() {
                        Ok(CEvent::Key(key)) => {
                            if input_tx.send(Event::Key(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if input_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = std::time::Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// A handle background tasks use to post their results.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}
