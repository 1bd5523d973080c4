//! Minimum-cost partition of content into encoding mode runs.
//!
//! Each symbology describes its modes with a [CostModel]. [segment] then runs
//! a shortest-path dynamic program over `(position, mode)` states and returns
//! the cheapest ordered list of [Segment]s covering the content exactly.

use core::fmt;
use core::ops::Range;

use crate::error::InputError;

/// Costs of encoding units in each mode of a symbology. Costs are in
/// arbitrary integer units, only their sums are compared.
pub trait CostModel {
    type Mode: Copy + Eq + fmt::Debug;

    /// Every mode, in priority order: on equal cost the earlier mode wins.
    fn modes(&self) -> &[Self::Mode];

    /// Cost of one unit in `mode`, `None` if the mode cannot represent it.
    fn unit_cost(&self, mode: Self::Mode, unit: u8) -> Option<u32>;

    /// Cost of opening the very first segment in `mode`.
    fn entry_cost(&self, mode: Self::Mode) -> u32;

    /// Cost of switching from `from` to `to` between two segments.
    fn latch_cost(&self, from: Self::Mode, to: Self::Mode) -> u32;

    /// Longest run a single segment of `mode` may hold. Longer runs are split
    /// into several segments, paying `latch_cost(mode, mode)` each time.
    fn max_run(&self, _mode: Self::Mode) -> Option<usize> {
        None
    }

    /// Runs of `mode` must have a length that is a multiple of this.
    fn run_step(&self, _mode: Self::Mode) -> usize {
        1
    }

    /// Whether `unit` fills a whole run step of `mode` by itself. Such a unit
    /// does not count towards the run length and may only sit on a step
    /// boundary of its run.
    fn whole_step(&self, _mode: Self::Mode, _unit: u8) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<M> {
    pub start: usize,
    pub len: usize,
    pub mode: M,
}

impl<M> Segment<M> {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation<M> {
    pub segments: Vec<Segment<M>>,
    pub cost: u64,
}

const INF: i64 = i64::MAX / 4;

#[derive(Clone, Copy)]
struct Entry {
    cost: i64,
    /// Mode index the previous segment ended in, `None` at the start.
    from: Option<usize>,
}

const NO_ENTRY: Entry = Entry { cost: INF, from: None };

/// Running minimum of `entry[j] - prefix[j]` over the open run starts of an
/// unbounded mode, one slot per run phase of `j` modulo the run step.
#[derive(Clone, Copy)]
struct Open {
    value: i64,
    start: usize,
}

/// Partitions `units` into the cheapest sequence of segments under `model`.
pub fn segment<C: CostModel>(model: &C, units: &[u8]) -> Result<Segmentation<C::Mode>, InputError> {
    let n = units.len();
    if n == 0 {
        return Err(InputError::EmptyContent);
    }

    let modes = model.modes();
    let m = modes.len();
    let idx = |i: usize, mode: usize| i * m + mode;

    // best[i][b]: cheapest encoding of units[..i] whose last segment is in b,
    // start[i][b]: where that last segment begins.
    let mut best = vec![INF; (n + 1) * m];
    let mut start = vec![0usize; (n + 1) * m];
    let mut entry = vec![NO_ENTRY; (n + 1) * m];

    // prefix[b][i]: summed unit costs of units[..i] in b, unrepresentable
    // units count as zero and are tracked through `last_bad` instead.
    let mut prefix = vec![0i64; (n + 1) * m];
    // phase[b][i]: units of units[..i] that advance a run of b
    let mut phase = vec![0usize; (n + 1) * m];
    let mut last_bad: Vec<Option<usize>> = vec![None; m];

    let steps: Vec<usize> = modes.iter().map(|&b| model.run_step(b).max(1)).collect();
    let max_runs: Vec<Option<usize>> = modes.iter().map(|&b| model.max_run(b)).collect();
    let mut open: Vec<Vec<Option<Open>>> = steps.iter().map(|&s| vec![None; s]).collect();

    for (b, &mode) in modes.iter().enumerate() {
        entry[idx(0, b)] = Entry { cost: model.entry_cost(mode) as i64, from: None };
        if max_runs[b].is_none() {
            open[b][0] = Some(Open { value: entry[idx(0, b)].cost, start: 0 });
        }
    }

    for i in 1..=n {
        let unit = units[i - 1];

        for (b, &mode) in modes.iter().enumerate() {
            let cost = model.unit_cost(mode, unit);
            let whole = model.whole_step(mode, unit);
            prefix[idx(i, b)] = prefix[idx(i - 1, b)] + cost.unwrap_or(0) as i64;
            phase[idx(i, b)] = phase[idx(i - 1, b)] + usize::from(!whole);
            if cost.is_none() {
                last_bad[b] = Some(i - 1);
                for slot in open[b].iter_mut() {
                    *slot = None;
                }
                continue;
            }

            let step = steps[b];
            let run_end = prefix[idx(i, b)];
            let mut choice: Option<(i64, usize)> = None;

            match max_runs[b] {
                None => {
                    let here = phase[idx(i, b)] % step;
                    if whole {
                        // runs that would put this unit mid-step
                        for (r, slot) in open[b].iter_mut().enumerate() {
                            if r != here {
                                *slot = None;
                            }
                        }
                    }
                    if let Some(o) = open[b][here] {
                        choice = Some((o.value + run_end, o.start));
                    }
                }
                Some(max_run) => {
                    // longest run first, ties keep the longer run
                    for j in i.saturating_sub(max_run)..i {
                        let e = entry[idx(j, b)].cost;
                        if e >= INF || last_bad[b].is_some_and(|bad| j <= bad) {
                            continue;
                        }
                        if !fits_steps(model, mode, &units[j..i], step) {
                            continue;
                        }
                        let total = e + run_end - prefix[idx(j, b)];
                        if choice.map_or(true, |(c, _)| total < c) {
                            choice = Some((total, j));
                        }
                    }
                }
            }

            if let Some((total, j)) = choice {
                best[idx(i, b)] = total;
                start[idx(i, b)] = j;
            }
        }

        if i == n {
            break;
        }

        // segments opening at i
        for (b, &to) in modes.iter().enumerate() {
            let mut e = NO_ENTRY;
            for (a, &from) in modes.iter().enumerate() {
                if a == b && max_runs[b].is_none() {
                    continue;
                }
                let prev = best[idx(i, a)];
                if prev >= INF {
                    continue;
                }
                let cost = prev + model.latch_cost(from, to) as i64;
                if cost < e.cost {
                    e = Entry { cost, from: Some(a) };
                }
            }
            entry[idx(i, b)] = e;

            if max_runs[b].is_none() && e.cost < INF {
                let value = e.cost - prefix[idx(i, b)];
                let slot = &mut open[b][phase[idx(i, b)] % steps[b]];
                if slot.map_or(true, |o| value < o.value) {
                    *slot = Some(Open { value, start: i });
                }
            }
        }
    }

    let mut last: Option<(i64, usize)> = None;
    for b in 0..m {
        let cost = best[idx(n, b)];
        if cost < INF && last.map_or(true, |(c, _)| cost < c) {
            last = Some((cost, b));
        }
    }

    let Some((cost, mut b)) = last else {
        return Err(unencodable(model, units));
    };

    let mut segments = Vec::new();
    let mut i = n;
    loop {
        let j = start[idx(i, b)];
        segments.push(Segment { start: j, len: i - j, mode: modes[b] });
        match entry[idx(j, b)].from {
            Some(a) if j > 0 => {
                b = a;
                i = j;
            }
            _ => break,
        }
    }
    segments.reverse();

    Ok(Segmentation { segments, cost: cost as u64 })
}

/// Whether `run` is a whole number of steps of `mode` with every whole-step
/// unit on a boundary.
fn fits_steps<C: CostModel>(model: &C, mode: C::Mode, run: &[u8], step: usize) -> bool {
    let mut k = 0;
    for &unit in run {
        if model.whole_step(mode, unit) {
            if k % step != 0 {
                return false;
            }
        } else {
            k += 1;
        }
    }
    k % step == 0
}

/// Locates the first unit no mode accepts; falls back to blaming the whole
/// content when every unit is individually representable.
fn unencodable<C: CostModel>(model: &C, units: &[u8]) -> InputError {
    let position = units
        .iter()
        .position(|&u| model.modes().iter().all(|&mode| model.unit_cost(mode, u).is_none()))
        .unwrap_or(units.len() - 1);

    InputError::UnencodableByte { value: units[position], position, symbology: "any mode" }
}
