//! Load engine controller: lifecycle, retuning and snapshots

use crate::catalog::EndpointCatalog;
use crate::error::{EngineError, EngineResult};
use crate::intensity::{compute_worker_plan, WorkerPlan};
use crate::shutdown::{join_within, WorkerTracker, STOP_GRACE};
use crate::stats::{StatsAggregator, StatsSnapshot};
use crate::worker::Worker;
use parking_lot::Mutex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stress_config::{EngineConfig, StressConfig, Validatable};
use stress_http::{HttpExecutor, RequestExecutor};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default per-request timeout when none is configured
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Stopping,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Stopping => write!(f, "stopping"),
        }
    }
}

/// What a call to [`LoadEngine::stop`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StopReport {
    /// Workers that exited on their own
    pub workers_joined: usize,
    /// Workers aborted after the stop bound
    pub workers_aborted: usize,
    #[serde(with = "humantime_serde")]
    pub stop_latency: Duration,
}

struct WorkerSlot {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

struct ActiveRun {
    runtime: Handle,
    token: CancellationToken,
    delay_tx: watch::Sender<Duration>,
    workers: Vec<WorkerSlot>,
    /// Workers removed by a retune, joined at stop
    retired: Vec<JoinHandle<()>>,
    next_worker_id: usize,
    config: EngineConfig,
    plan: WorkerPlan,
}

struct Control {
    state: RunState,
    run: Option<ActiveRun>,
}

struct Shared {
    executor: Arc<dyn RequestExecutor>,
    catalog: EndpointCatalog,
    request_timeout: Duration,
    stats: Arc<StatsAggregator>,
    tracker: WorkerTracker,
    control: Mutex<Control>,
    state_tx: watch::Sender<RunState>,
}

impl Shared {
    fn set_state(&self, control: &mut Control, state: RunState) {
        control.state = state;
        self.state_tx.send_replace(state);
    }

    fn spawn_worker(&self, run: &mut ActiveRun) {
        let id = run.next_worker_id;
        run.next_worker_id += 1;

        let token = run.token.child_token();
        let worker = Worker {
            id,
            executor: Arc::clone(&self.executor),
            picker: self.catalog.picker(id),
            stats: Arc::clone(&self.stats),
            delay: run.delay_tx.subscribe(),
            request_timeout: self.request_timeout,
            token: token.clone(),
            guard: self.tracker.task_started(),
        };

        let handle = run.runtime.spawn(worker.run());
        run.workers.push(WorkerSlot { token, handle });
    }

    fn resize(&self, run: &mut ActiveRun, worker_count: usize) {
        match worker_count.cmp(&run.workers.len()) {
            Ordering::Greater => {
                for _ in run.workers.len()..worker_count {
                    self.spawn_worker(run);
                }
            }
            Ordering::Less => {
                run.retired.retain(|handle| !handle.is_finished());
                for slot in run.workers.drain(worker_count..) {
                    slot.token.cancel();
                    run.retired.push(slot.handle);
                }
            }
            Ordering::Equal => {}
        }
    }
}

/// Controller for a pool of load workers.
///
/// Cloning gives another handle to the same engine, so a presentation layer
/// can poll snapshots from one task while another drives start and stop.
#[derive(Clone)]
pub struct LoadEngine {
    shared: Arc<Shared>,
}

impl LoadEngine {
    pub fn builder() -> LoadEngineBuilder {
        LoadEngineBuilder::default()
    }

    /// Build an engine with a pooled HTTP executor from full configuration
    pub fn from_config(config: &StressConfig) -> EngineResult<Self> {
        config.http.validate()?;
        config.targets.validate()?;

        Self::builder()
            .executor(Arc::new(HttpExecutor::new(&config.http)?))
            .catalog(EndpointCatalog::from_config(&config.targets)?)
            .request_timeout(config.http.timeout)
            .build()
    }

    /// Validate `config`, reset statistics and spawn the workers.
    ///
    /// Must be called from inside a tokio runtime. Fails with
    /// [`EngineError::AlreadyRunning`] unless the engine is idle, leaving
    /// the running workers and counters untouched.
    pub fn start(&self, config: EngineConfig) -> EngineResult<WorkerPlan> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let mut control = self.shared.control.lock();
        if control.state != RunState::Idle {
            warn!("Start requested while engine is {}", control.state);
            return Err(EngineError::AlreadyRunning);
        }

        let plan = compute_worker_plan(&config);
        debug!(
            "Worker plan: {} workers, {:?} between requests",
            plan.worker_count, plan.per_request_delay
        );

        self.shared.stats.reset();

        let (delay_tx, _) = watch::channel(plan.per_request_delay);
        let mut run = ActiveRun {
            runtime,
            token: CancellationToken::new(),
            delay_tx,
            workers: Vec::with_capacity(plan.worker_count),
            retired: Vec::new(),
            next_worker_id: 0,
            config,
            plan,
        };
        self.shared.resize(&mut run, plan.worker_count);

        control.run = Some(run);
        self.shared.set_state(&mut control, RunState::Running);

        info!(
            "Load run started: intensity {}%, {} workers, {}ms base delay against {} endpoints",
            config.intensity_percent,
            plan.worker_count,
            config.delay_millis,
            self.shared.catalog.len()
        );

        Ok(plan)
    }

    /// Signal every worker to stop and wait for them.
    ///
    /// Workers still running after [`LoadEngine::stop_timeout`] are aborted
    /// and awaited, so no worker of this run outlives the transition to
    /// Idle. An executor that blocks its thread delays this until its poll
    /// returns. A no-op returning an empty report unless the engine is
    /// running. The engine is idle again once the join finishes, even if
    /// the returned future is dropped early.
    pub async fn stop(&self) -> StopReport {
        let run = {
            let mut control = self.shared.control.lock();
            if control.state != RunState::Running {
                debug!("Stop requested while engine is {}", control.state);
                return StopReport::default();
            }
            self.shared.set_state(&mut control, RunState::Stopping);
            control.run.take()
        };

        let Some(run) = run else {
            let mut control = self.shared.control.lock();
            self.shared.set_state(&mut control, RunState::Idle);
            return StopReport::default();
        };

        info!(
            "Stopping load run with {} workers",
            self.shared.tracker.active_task_count()
        );

        let shared = Arc::clone(&self.shared);
        let bound = self.stop_timeout();
        let runtime = run.runtime.clone();

        let reaper = runtime.spawn(async move {
            let started = Instant::now();
            run.token.cancel();

            let handles = run
                .workers
                .into_iter()
                .map(|slot| slot.handle)
                .chain(run.retired)
                .collect();
            let summary = join_within(handles, bound).await;

            shared.stats.mark_stopped();
            let mut control = shared.control.lock();
            shared.set_state(&mut control, RunState::Idle);

            StopReport {
                workers_joined: summary.joined,
                workers_aborted: summary.aborted,
                stop_latency: started.elapsed(),
            }
        });

        match reaper.await {
            Ok(report) => {
                info!(
                    "Load run stopped in {:?}: {} workers joined, {} aborted",
                    report.stop_latency, report.workers_joined, report.workers_aborted
                );
                report
            }
            Err(e) => {
                error!("Stop task failed: {}", e);
                self.shared.stats.mark_stopped();
                let mut control = self.shared.control.lock();
                self.shared.set_state(&mut control, RunState::Idle);
                StopReport::default()
            }
        }
    }

    /// Apply new pacing to the active run without resetting statistics.
    ///
    /// Workers pick up the new delay on their next sleep. The pool grows or
    /// shrinks to the new worker count; removed workers finish their
    /// current request first.
    pub fn retune(&self, config: EngineConfig) -> EngineResult<WorkerPlan> {
        config.validate()?;

        let mut control = self.shared.control.lock();
        if control.state != RunState::Running {
            return Err(EngineError::NotRunning);
        }
        let run = control.run.as_mut().ok_or(EngineError::NotRunning)?;

        let plan = compute_worker_plan(&config);
        run.delay_tx.send_replace(plan.per_request_delay);
        self.shared.resize(run, plan.worker_count);
        run.config = config;
        run.plan = plan;

        info!(
            "Load run retuned: intensity {}%, {} workers, {:?} between requests",
            config.intensity_percent, plan.worker_count, plan.per_request_delay
        );

        Ok(plan)
    }

    pub fn current_state(&self) -> RunState {
        self.shared.control.lock().state
    }

    /// Receiver notified on every state transition
    pub fn subscribe_state(&self) -> watch::Receiver<RunState> {
        self.shared.state_tx.subscribe()
    }

    /// Wait until the engine is idle
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe_state();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|state| *state == RunState::Idle).await;
    }

    /// Point-in-time statistics. Counters are monotonic within a run and
    /// reset at the next start.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        let mut snapshot = self.shared.stats.snapshot();
        snapshot.active_workers = self.shared.tracker.active_task_count();
        snapshot
    }

    /// Worker tasks currently alive, including ones finishing after a stop
    pub fn active_workers(&self) -> usize {
        self.shared.tracker.active_task_count()
    }

    /// Configuration and plan of the active run
    pub fn current_plan(&self) -> Option<(EngineConfig, WorkerPlan)> {
        self.shared
            .control
            .lock()
            .run
            .as_ref()
            .map(|run| (run.config, run.plan))
    }

    pub fn catalog(&self) -> &EndpointCatalog {
        &self.shared.catalog
    }

    pub fn request_timeout(&self) -> Duration {
        self.shared.request_timeout
    }

    /// Upper bound on how long [`LoadEngine::stop`] takes
    pub fn stop_timeout(&self) -> Duration {
        self.shared.request_timeout + STOP_GRACE
    }
}

impl fmt::Debug for LoadEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadEngine")
            .field("state", &self.current_state())
            .field("endpoints", &self.shared.catalog.len())
            .field("request_timeout", &self.shared.request_timeout)
            .field("active_workers", &self.active_workers())
            .finish()
    }
}

/// Builder for [`LoadEngine`]
#[derive(Default)]
pub struct LoadEngineBuilder {
    executor: Option<Arc<dyn RequestExecutor>>,
    catalog: Option<EndpointCatalog>,
    request_timeout: Option<Duration>,
}

impl LoadEngineBuilder {
    pub fn executor(mut self, executor: Arc<dyn RequestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn catalog(mut self, catalog: EndpointCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Missing executor defaults to a pooled HTTP executor, missing catalog
    /// to the built-in targets
    pub fn build(self) -> EngineResult<LoadEngine> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => Arc::new(HttpExecutor::new(&Default::default())?),
        };
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => EndpointCatalog::default_targets()?,
        };
        let (state_tx, _) = watch::channel(RunState::Idle);

        Ok(LoadEngine {
            shared: Arc::new(Shared {
                executor,
                catalog,
                request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
                stats: Arc::new(StatsAggregator::new()),
                tracker: WorkerTracker::new(),
                control: Mutex::new(Control {
                    state: RunState::Idle,
                    run: None,
                }),
                state_tx,
            }),
        })
    }
}
