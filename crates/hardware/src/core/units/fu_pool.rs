//! Functional-unit resource pool.
//!
//! Each core owns one pool shared by all of its contexts. Issue acquires a
//! unit of the instruction's class; the unit stays busy for its issue interval
//! and is released by the per-cycle `tick`. Dividers are unpipelined (busy for
//! the full latency); every other class accepts a new operation each cycle.

use crate::config::FuConfig;
use crate::isa::decode::FuClass;

/// A unit granted to one issuing instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuHandle {
    /// Class of the unit.
    pub class: FuClass,
    /// Index of the unit within its class.
    pub unit: usize,
    /// Cycles from issue to result.
    pub latency: u64,
}

#[derive(Clone, Debug)]
struct UnitGroup {
    latency: u64,
    issue_interval: u64,
    busy: Vec<u64>,
}

/// Pool of functional units with per-unit busy counters.
#[derive(Clone, Debug)]
pub struct FuPool {
    groups: Vec<UnitGroup>,
}

impl FuPool {
    /// Builds a pool from configuration.
    pub fn new(config: &FuConfig) -> Self {
        let groups = FuClass::ALL
            .iter()
            .map(|&class| {
                let unit = config.unit(class);
                let issue_interval = match class {
                    FuClass::IntDiv | FuClass::FpDiv => unit.latency.max(1),
                    _ => 1,
                };
                UnitGroup {
                    latency: unit.latency,
                    issue_interval,
                    busy: vec![0; unit.count],
                }
            })
            .collect();
        Self { groups }
    }

    /// Claims an idle unit of `class`, or `None` if all are busy this cycle.
    pub fn acquire(&mut self, class: FuClass) -> Option<FuHandle> {
        let group = &mut self.groups[class.index()];
        let unit = group.busy.iter().position(|&b| b == 0)?;
        group.busy[unit] = group.issue_interval;
        Some(FuHandle {
            class,
            unit,
            latency: group.latency,
        })
    }

    /// Advances one cycle, decrementing every busy counter.
    pub fn tick(&mut self) {
        for group in &mut self.groups {
            for busy in &mut group.busy {
                *busy = busy.saturating_sub(1);
            }
        }
    }

    /// Number of idle units of `class`.
    pub fn idle(&self, class: FuClass) -> usize {
        self.groups[class.index()]
            .busy
            .iter()
            .filter(|&&b| b == 0)
            .count()
    }
}
