use std::time::{Duration, Instant};

/// Accumulated per-phase timings for soft body substeps.
///
/// Owned by each body and reset at the start of every frame; the world sums
/// the per-body values into its own frame profile.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StepProfiler {
    pub predict_time: Duration,
    pub solve_time: Duration,
    pub collide_time: Duration,
    pub velocity_time: Duration,
    pub total_frame_time: Duration,

    pub substeps: u32,
    pub elements_solved: usize,
    pub skipped_projections: usize,
    pub floor_contacts: usize,
}

impl StepProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds another profile's counters and durations to this one.
    pub fn accumulate(&mut self, other: &StepProfiler) {
        self.predict_time += other.predict_time;
        self.solve_time += other.solve_time;
        self.collide_time += other.collide_time;
        self.velocity_time += other.velocity_time;
        self.substeps += other.substeps;
        self.elements_solved += other.elements_solved;
        self.skipped_projections += other.skipped_projections;
        self.floor_contacts += other.floor_contacts;
    }

    pub fn phase_time(&self) -> Duration {
        self.predict_time + self.solve_time + self.collide_time + self.velocity_time
    }

    /// Logs the breakdown at `info` level. Silent for empty frames.
    pub fn report(&self) {
        let total = if self.total_frame_time.is_zero() {
            self.phase_time()
        } else {
            self.total_frame_time
        };
        let total_us = total.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        let share = |d: Duration| (d.as_micros() as f32 / total_us) * 100.0;
        let ms = |d: Duration| d.as_secs_f32() * 1000.0;

        log::info!(
            "soft body frame: {:.2} ms over {} substeps, {} element solves ({} skipped projections), {} floor contacts",
            ms(total),
            self.substeps,
            self.elements_solved,
            self.skipped_projections,
            self.floor_contacts
        );
        log::info!(
            "  predict {:.2} ms ({:.1}%), solve {:.2} ms ({:.1}%), collide {:.2} ms ({:.1}%), velocity {:.2} ms ({:.1}%)",
            ms(self.predict_time),
            share(self.predict_time),
            ms(self.solve_time),
            share(self.solve_time),
            ms(self.collide_time),
            share(self.collide_time),
            ms(self.velocity_time),
            share(self.velocity_time)
        );
    }
}

/// Adds the elapsed time of a scope to a `Duration` accumulator.
pub struct PhaseTimer<'a> {
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(output: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for PhaseTimer<'a> {
    fn drop(&mut self) {
        *self.output += self.start.elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_timer_accumulates() {
        let mut slot = Duration::from_millis(2);
        {
            let _timer = PhaseTimer::new(&mut slot);
        }
        assert!(slot >= Duration::from_millis(2));
    }

    #[test]
    fn accumulate_sums_counters() {
        let mut a = StepProfiler {
            substeps: 2,
            elements_solved: 10,
            solve_time: Duration::from_micros(5),
            ..Default::default()
        };
        let b = a;
        a.accumulate(&b);
        assert_eq!(a.substeps, 4);
        assert_eq!(a.elements_solved, 20);
        assert_eq!(a.solve_time, Duration::from_micros(10));
        a.reset();
        assert_eq!(a, StepProfiler::default());
    }
}
