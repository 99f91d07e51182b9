//! User-facing alerts raised by failed fetches.
//!
//! Every alert is logged when raised and shown once: the page that
//! displays it drains the queue. Only the most recent `MAX_PENDING` are
//! kept while nobody looks.

use std::collections::VecDeque;

pub const MAX_PENDING: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct Alerts {
    pending: VecDeque<String>,
}

impl Alerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(alert = %message, "alerting user");
        if self.pending.len() == MAX_PENDING {
            self.pending.pop_front();
        }
        self.pending.push_back(message);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn peek(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn drain(&mut self) -> Vec<String> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_are_shown_once() {
        let mut alerts = Alerts::new();
        alerts.raise("backend down");
        alerts.raise(String::from("still down"));
        assert_eq!(alerts.peek().count(), 2);
        assert_eq!(alerts.drain(), vec!["backend down", "still down"]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_unread_alerts_keep_only_the_latest() {
        let mut alerts = Alerts::new();
        for i in 0..MAX_PENDING + 5 {
            alerts.raise(format!("failure {}", i));
        }
        let shown = alerts.drain();
        assert_eq!(shown.len(), MAX_PENDING);
        assert_eq!(shown.first().unwrap(), "failure 5");
        assert_eq!(shown.last().unwrap(), &format!("failure {}", MAX_PENDING + 4));
    }
}
