//! Worker pool that classifies whole regions of sample points.
//!
//! Every worker thread creates one [`ClassifierState`] when it starts and
//! reuses it for every region it processes. Regions are delivered through
//! bounded channels and can be cancelled while queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use dashmap::DashMap;

use crate::classifier::BiomeClassifier;
use crate::field::SamplePoint;
use crate::state::{ClassifierState, ClassifierStats};
use crate::tag::TagSet;

/// Identifier of a region (typically one spatial chunk of the world).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u64);

/// A batch of sample points to classify.
#[derive(Clone, Debug)]
pub struct RegionTask {
    pub region: RegionId,
    pub points: Vec<SamplePoint>,
}

/// Classification result for one region.
#[derive(Debug)]
pub struct ClassifiedRegion {
    pub region: RegionId,
    /// One tag set per input point, in input order.
    pub tags: Vec<TagSet>,
    /// Classification time in microseconds (for profiling).
    pub classification_time_us: u64,
}

struct QueuedTask {
    task: RegionTask,
    cancelled: Arc<AtomicBool>,
}

/// Classifies regions on a fixed set of worker threads.
pub struct ClassificationPool {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<ClassifiedRegion>,
    /// Cancellation flag per queued or running region.
    active_tasks: Arc<DashMap<RegionId, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
    workers: Vec<JoinHandle<ClassifierStats>>,
}

impl ClassificationPool {
    /// Spawns `thread_count` workers sharing `classifier`'s rule table.
    ///
    /// - `max_concurrent`: queue capacity is `max_concurrent * 2`; further
    ///   submissions are handed back.
    /// - `result_capacity`: capacity of the completed-region channel.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if a worker thread cannot be spawned.
    pub fn new(
        classifier: BiomeClassifier,
        thread_count: usize,
        max_concurrent: usize,
        result_capacity: usize,
    ) -> std::io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTask>(max_concurrent.max(1) * 2);
        let (result_sender, result_receiver) = bounded::<ClassifiedRegion>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));
        let active_tasks = Arc::new(DashMap::new());

        let mut workers = Vec::with_capacity(thread_count);
        for index in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let active_tasks = Arc::clone(&active_tasks);
            let classifier = classifier.clone();

            let handle = std::thread::Builder::new()
                .name(format!("biome-worker-{index}"))
                .spawn(move || {
                    run_worker(&classifier, &receiver, &sender, &in_flight, &active_tasks)
                })?;
            workers.push(handle);
        }

        tracing::debug!(threads = workers.len(), "classification pool started");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks,
            in_flight,
            workers,
        })
    }

    /// Spawns [`default_thread_count`](Self::default_thread_count) workers.
    pub fn with_defaults(classifier: BiomeClassifier) -> std::io::Result<Self> {
        Self::new(classifier, Self::default_thread_count(), 64, 128)
    }

    /// One worker per core, leaving two cores for the rest of the pipeline
    /// (at least one worker).
    pub fn default_thread_count() -> usize {
        num_cpus::get().saturating_sub(2).max(1)
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues a region for classification.
    ///
    /// Returns `Err(task)` if the queue is full.
    pub fn submit(&self, task: RegionTask) -> Result<(), RegionTask> {
        let region = task.region;
        let cancelled = Arc::new(AtomicBool::new(false));
        // Workers cannot clear this region's slot while the entry guard is
        // held. A rejected task leaves an earlier queued copy's flag in place.
        let slot = self.active_tasks.entry(region);
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let queued = QueuedTask {
            task,
            cancelled: Arc::clone(&cancelled),
        };
        if let Err(e) = self.task_sender.try_send(queued) {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return Err(e.into_inner().task);
        }
        slot.insert(cancelled);
        Ok(())
    }

    /// Cancels a queued or running region. No-op once it has completed.
    pub fn cancel(&self, region: RegionId) {
        if let Some((_, cancelled)) = self.active_tasks.remove(&region) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drains every completed region without blocking.
    pub fn drain_results(&self) -> Vec<ClassifiedRegion> {
        let mut results = Vec::new();
        while let Ok(region) = self.result_receiver.try_recv() {
            results.push(region);
        }
        results
    }

    /// Waits up to `timeout` for the next completed region.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClassifiedRegion> {
        match self.result_receiver.recv_timeout(timeout) {
            Ok(region) => Some(region),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Regions queued or being classified.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if `region` is queued or being classified.
    pub fn is_pending(&self, region: RegionId) -> bool {
        self.active_tasks.contains_key(&region)
    }

    /// Stops the workers and returns their combined counters.
    ///
    /// Regions still queued are discarded, as are completed regions that
    /// were not drained.
    pub fn shutdown(self) -> ClassifierStats {
        let Self {
            task_sender,
            result_receiver,
            active_tasks,
            workers,
            ..
        } = self;

        for entry in active_tasks.iter() {
            entry.value().store(true, Ordering::Relaxed);
        }
        drop(task_sender);
        drop(result_receiver);

        let mut total = ClassifierStats::default();
        for handle in workers {
            match handle.join() {
                Ok(stats) => total += stats,
                Err(_) => tracing::error!("classification worker panicked"),
            }
        }
        tracing::debug!(
            points = total.points,
            unclassified = total.unclassified,
            clamped = total.clamped_values,
            "classification pool stopped"
        );
        total
    }
}

fn run_worker(
    classifier: &BiomeClassifier,
    receiver: &Receiver<QueuedTask>,
    sender: &Sender<ClassifiedRegion>,
    in_flight: &AtomicU64,
    active_tasks: &DashMap<RegionId, Arc<AtomicBool>>,
) -> ClassifierStats {
    let mut state = ClassifierState::new();

    while let Ok(queued) = receiver.recv() {
        let region = queued.task.region;
        if queued.cancelled.load(Ordering::Relaxed) {
            tracing::trace!(region = region.0, "skipping cancelled region");
            in_flight.fetch_sub(1, Ordering::Relaxed);
            continue;
        }

        let start = Instant::now();
        let points = &queued.task.points;
        let mut tags = vec![TagSet::new(); points.len()];
        classifier.classify_batch(&mut state, points, &mut tags);
        let elapsed = start.elapsed().as_micros() as u64;

        if !queued.cancelled.load(Ordering::Relaxed) {
            // Only clear our own entry; a resubmitted region owns a new flag.
            active_tasks.remove_if(&region, |_, flag| Arc::ptr_eq(flag, &queued.cancelled));
            let delivered = sender.send(ClassifiedRegion {
                region,
                tags,
                classification_time_us: elapsed,
            });
            if delivered.is_err() {
                in_flight.fetch_sub(1, Ordering::Relaxed);
                break;
            }
        }

        in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    let stats = state.stats();
    tracing::debug!(
        points = stats.points,
        saturated = stats.saturated,
        "classification worker exiting"
    );
    stats
}
