// crates/pinball-rs/src/mode/delay.rs
use log::trace;

/// What a pending delay does when it comes due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DelayKind {
    /// Routed to `Mode::delay_fired` under the delay's name.
    Named,
    /// A hold-duration switch handler waiting out its dwell time.
    HoldHandler { handler: usize, switch: String },
}

/// A single-shot scheduled callback owned by a mode.
#[derive(Debug, Clone)]
pub struct PendingDelay {
    pub name: String,
    pub fire_at_us: u64,
    /// Scheduling order, used to break fire-time ties.
    seq: u64,
    pub(crate) kind: DelayKind,
}

/// The pending-delay list of one mode.
///
/// Delay names are stable keys: scheduling under an existing name replaces
/// the prior entry atomically. Anonymous delays get a generated unique name.
#[derive(Debug, Default)]
pub struct DelaySet {
    pending: Vec<PendingDelay>,
    next_seq: u64,
}

impl DelaySet {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedules a delay of `seconds` from `now_us`. A negative duration is
    /// treated as "fire now".
    pub fn schedule(&mut self, now_us: u64, seconds: f64, name: Option<&str>) -> String {
        self.schedule_kind(now_us, seconds, name, DelayKind::Named)
    }

    pub(crate) fn schedule_kind(
        &mut self,
        now_us: u64,
        seconds: f64,
        name: Option<&str>,
        kind: DelayKind,
    ) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        let name = match name {
            Some(n) => n.to_string(),
            None => format!("delay_{}", seq),
        };
        // Replace any prior entry under the same key (timer restart).
        self.pending.retain(|d| d.name != name);
        let fire_at_us = now_us + (seconds.max(0.0) * 1_000_000.0) as u64;
        trace!("[DELAY] '{}' scheduled for t+{}us", name, fire_at_us - now_us);
        self.pending.push(PendingDelay {
            name: name.clone(),
            fire_at_us,
            seq,
            kind,
        });
        name
    }

    /// Removes all pending delays under `name`. No-op if none exist.
    pub fn cancel(&mut self, name: &str) {
        let before = self.pending.len();
        self.pending.retain(|d| d.name != name);
        if self.pending.len() != before {
            trace!("[DELAY] '{}' cancelled", name);
        }
    }

    pub fn is_delayed(&self, name: &str) -> bool {
        self.pending.iter().any(|d| d.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns every delay due at `now_us`, in ascending
    /// fire-at order with scheduling-order ties. Callers invoke the
    /// callbacks after removal, so a callback may re-schedule the same name.
    pub fn take_due(&mut self, now_us: u64) -> Vec<PendingDelay> {
        let mut due: Vec<PendingDelay> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].fire_at_us <= now_us {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|d| (d.fire_at_us, d.seq));
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_delay_replaces_prior_entry() {
        let mut delays = DelaySet::new();
        delays.schedule(0, 1.0, Some("eject"));
        delays.schedule(0, 5.0, Some("eject"));
        // The first timer is gone; nothing due at its original deadline.
        assert!(delays.take_due(1_500_000).is_empty());
        let due = delays.take_due(5_000_000);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "eject");
    }

    #[test]
    fn test_anonymous_delays_get_unique_names() {
        let mut delays = DelaySet::new();
        let a = delays.schedule(0, 1.0, None);
        let b = delays.schedule(0, 1.0, None);
        assert_ne!(a, b);
        assert_eq!(delays.take_due(1_000_000).len(), 2);
    }

    #[test]
    fn test_cancel_is_a_noop_without_match() {
        let mut delays = DelaySet::new();
        delays.schedule(0, 1.0, Some("search"));
        delays.cancel("other");
        assert!(delays.is_delayed("search"));
        delays.cancel("search");
        assert!(!delays.is_delayed("search"));
    }

    #[test]
    fn test_due_ordering_by_deadline_then_schedule_order() {
        let mut delays = DelaySet::new();
        delays.schedule(0, 2.0, Some("b"));
        delays.schedule(0, 1.0, Some("a"));
        delays.schedule(0, 2.0, Some("c"));
        let names: Vec<String> = delays
            .take_due(2_000_000)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_negative_duration_fires_immediately() {
        let mut delays = DelaySet::new();
        delays.schedule(1_000, -3.0, Some("now"));
        assert_eq!(delays.take_due(1_000).len(), 1);
    }
}
