//! Toast alerts with timed expiry

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// How long an alert stays visible unless dismissed earlier
pub const ALERT_TTL_MS: u64 = 5_000;

/// Oldest alerts are dropped beyond this many
const MAX_VISIBLE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub created_at_ms: u64,
    pub expires_at_ms: u64,
}

/// Visible alerts, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertQueue {
    alerts: VecDeque<Alert>,
    next_id: u64,
    ttl_ms: u64,
}

impl Default for AlertQueue {
    fn default() -> Self {
        Self::new(ALERT_TTL_MS)
    }
}

impl AlertQueue {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            alerts: VecDeque::new(),
            next_id: 1,
            ttl_ms,
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Show an alert, returning its id
    pub fn push(&mut self, severity: Severity, message: impl Into<String>, now_ms: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        tracing::debug!("Alert {} ({}): {}", id, severity, message);

        if self.alerts.len() >= MAX_VISIBLE {
            self.alerts.pop_front();
        }
        self.alerts.push_back(Alert {
            id,
            severity,
            message,
            created_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(self.ttl_ms),
        });
        id
    }

    pub fn info(&mut self, message: impl Into<String>, now_ms: u64) -> u64 {
        self.push(Severity::Info, message, now_ms)
    }

    pub fn success(&mut self, message: impl Into<String>, now_ms: u64) -> u64 {
        self.push(Severity::Success, message, now_ms)
    }

    pub fn error(&mut self, message: impl Into<String>, now_ms: u64) -> u64 {
        self.push(Severity::Error, message, now_ms)
    }

    pub fn warning(&mut self, message: impl Into<String>, now_ms: u64) -> u64 {
        self.push(Severity::Warning, message, now_ms)
    }

    /// Close an alert early. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        before != self.alerts.len()
    }

    /// Drop every alert whose lifetime has elapsed, returning how many went
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.expires_at_ms > now_ms);
        before - self.alerts.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn latest(&self) -> Option<&Alert> {
        self.alerts.back()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_expire_after_five_seconds() {
        let mut queue = AlertQueue::default();
        queue.success("Tenant deleted", 1_000);
        assert_eq!(queue.expire(5_999), 0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.expire(6_000), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn dismissed_alert_is_gone_before_expiry() {
        let mut queue = AlertQueue::default();
        let id = queue.error("Failed", 0);
        queue.info("Other", 0);
        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.latest().unwrap().message, "Other");
    }

    #[test]
    fn only_elapsed_alerts_are_expired() {
        let mut queue = AlertQueue::default();
        queue.warning("old", 0);
        queue.info("new", 4_000);
        assert_eq!(queue.expire(5_000), 1);
        let left: Vec<_> = queue.visible().map(|a| a.message.as_str()).collect();
        assert_eq!(left, vec!["new"]);
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut queue = AlertQueue::new(100);
        let a = queue.info("a", 0);
        let b = queue.info("b", 0);
        assert!(b > a);
    }

    #[test]
    fn queue_is_bounded() {
        let mut queue = AlertQueue::default();
        for i in 0..30 {
            queue.info(format!("m{i}"), 0);
        }
        assert_eq!(queue.len(), MAX_VISIBLE);
        assert_eq!(queue.visible().next().unwrap().message, "m10");
    }
}
