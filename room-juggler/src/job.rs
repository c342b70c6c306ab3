use crate::assignment::AssignmentState;
use crate::config::JuggleConfig;
use crate::input::Lists;
use crate::juggler::{JuggleError, JuggleOutcome, juggle};
use crate::model::{Gender, GuestId};
use crate::monitor::{CancelFlag, DEFAULT_PROGRESS_EVERY, LogMonitor, Monitor};
use crate::partition::{Partition, filter_genders};
use crate::problem::{ProblemError, RoomOccupancyProblem};
use crate::report::{JobReport, PartitionReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("{gender} partition: {source}")]
    Problem {
        gender: Gender,
        #[source]
        source: ProblemError,
    },
    #[error("{gender} partition: {source}")]
    Juggle {
        gender: Gender,
        #[source]
        source: JuggleError,
    },
}

/// One gender's problem together with its result, once solved.
#[derive(Debug, Clone)]
pub struct PartitionJob {
    pub gender: Gender,
    /// Maps the problem's dense guest ids back to the full guest list.
    pub original_guest_ids: Vec<GuestId>,
    pub problem: RoomOccupancyProblem,
    pub outcome: Option<JuggleOutcome>,
}

impl PartitionJob {
    pub fn new(partition: Partition) -> Result<Self, JobError> {
        let Partition {
            gender,
            guests,
            wishes,
            rooms,
            original_guest_ids,
        } = partition;
        let problem = RoomOccupancyProblem::new(guests, wishes, rooms)
            .map_err(|source| JobError::Problem { gender, source })?;
        Ok(Self {
            gender,
            original_guest_ids,
            problem,
            outcome: None,
        })
    }

    pub fn run<R, M>(
        &mut self,
        config: &JuggleConfig,
        rng: &mut R,
        monitor: &mut M,
    ) -> Result<&JuggleOutcome, JobError>
    where
        R: Rng + ?Sized,
        M: Monitor + ?Sized,
    {
        let _span = tracing::info_span!("partition", gender = %self.gender).entered();
        let gender = self.gender;
        let outcome = juggle(&self.problem, config, rng, monitor)
            .map_err(|source| JobError::Juggle { gender, source })?;
        Ok(self.outcome.insert(outcome))
    }

    pub fn state(&self) -> Option<&AssignmentState> {
        self.outcome.as_ref().map(|o| &o.state)
    }

    pub fn report(&self) -> PartitionReport {
        PartitionReport::new(self)
    }
}

/// Both gender partitions of one roster, solved independently.
#[derive(Debug, Clone)]
pub struct RoomJugglerJob {
    pub ropf: PartitionJob,
    pub ropm: PartitionJob,
    /// Temperature steps between two progress lines of a partition.
    pub progress_every: usize,
}

/// Seed of a partition's generator, derived from the job seed.
pub fn partition_seed(seed: u64, gender: Gender) -> u64 {
    match gender {
        Gender::F => seed,
        Gender::M => seed.wrapping_add(1),
    }
}

impl RoomJugglerJob {
    pub fn new(lists: &Lists) -> Result<Self, JobError> {
        let split = |gender| filter_genders(&lists.guests, &lists.wishes, &lists.rooms, gender);
        Ok(Self {
            ropf: PartitionJob::new(split(Gender::F))?,
            ropm: PartitionJob::new(split(Gender::M))?,
            progress_every: DEFAULT_PROGRESS_EVERY,
        })
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every;
        self
    }

    pub fn partitions(&self) -> [&PartitionJob; 2] {
        [&self.ropf, &self.ropm]
    }

    /// Solves both partitions on two threads. Each thread owns its partition
    /// and its own generator; `cancel` is the only thing they share.
    pub fn run(
        &mut self,
        config: &JuggleConfig,
        seed: u64,
        cancel: &CancelFlag,
    ) -> Result<(), JobError> {
        let Self {
            ropf,
            ropm,
            progress_every,
        } = self;
        let every = *progress_every;
        let results = std::thread::scope(|s| {
            let handles = [ropf, ropm].map(|job| {
                let cancel = cancel.clone();
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(partition_seed(seed, job.gender));
                    let mut monitor = LogMonitor::new(job.gender.as_str())
                        .every(every)
                        .with_cancel(cancel);
                    job.run(config, &mut rng, &mut monitor).map(|_| ())
                })
            });
            handles.map(|h| match h.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
        });
        for result in results {
            result?;
        }
        Ok(())
    }

    pub fn report(&self) -> JobReport {
        JobReport {
            partitions: self.partitions().map(PartitionJob::report).into(),
        }
    }
}
