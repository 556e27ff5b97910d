use tokio::sync::watch;

/// Device heading updates, collapsed to the most recent value.
///
/// Publishers overwrite; readers only ever see the latest heading, so a fast
/// sensor never builds a backlog.
#[derive(Debug)]
pub struct HeadingFeed {
    tx: watch::Sender<Option<f64>>,
}

impl HeadingFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Record a new heading in degrees clockwise from north.
    pub fn publish(&self, degrees: f64) {
        if !degrees.is_finite() {
            return;
        }
        let mut normalized = degrees.rem_euclid(360.0);
        // rem_euclid rounds tiny negatives up to exactly 360
        if normalized >= 360.0 {
            normalized = 0.0;
        }
        self.tx.send_replace(Some(normalized));
    }

    /// Nudge the current heading (0 when none has been seen yet).
    pub fn rotate(&self, delta: f64) {
        let current = self.latest().unwrap_or(0.0);
        self.publish(current + delta);
    }

    pub fn latest(&self) -> Option<f64> {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> HeadingSubscription {
        HeadingSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for HeadingFeed {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HeadingSubscription {
    rx: watch::Receiver<Option<f64>>,
}

impl HeadingSubscription {
    /// Wait for the next update. `None` once the feed is gone.
    pub async fn changed(&mut self) -> Option<f64> {
        match self.rx.changed().await {
            Ok(()) => *self.rx.borrow_and_update(),
            Err(_) => None,
        }
    }
}
