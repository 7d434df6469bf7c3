//! The scenario monitor engine.
//!
//! One long-lived [`ScenarioMonitor`] owns the active-context map.
//! Application code reports phase starts/completions/failures; the
//! engine aggregates them per scenario and decides a single verdict
//! when all required phases complete, an explicit failure arrives, or
//! the scenario deadline elapses. `Emitted` is absorbing: every call
//! on an emitted or unknown scenario is a safe no-op.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use events::{EventBus, EventEnvelope, MonitorEvent};
use reporter::{HealthReporter, ReportContext};
use scenario_core::{
    Phase, PhaseTiming, Scenario, ScenarioDefinition, ScenarioRegistry, ScenarioSnapshot,
    VitalKind, WebVitals,
};

use crate::error::{MonitorError, Result};
use crate::timing::{PerformanceTimeline, TimingProvider};

fn scenario_start_mark(scenario: Scenario) -> String {
    format!("scenario_{scenario}_start")
}

fn phase_start_mark(scenario: Scenario, phase: Phase) -> String {
    format!("scenario_{scenario}_{phase}_start")
}

fn phase_end_mark(scenario: Scenario, phase: Phase) -> String {
    format!("scenario_{scenario}_{phase}_end")
}

fn phase_failed_mark(scenario: Scenario, phase: Phase) -> String {
    format!("scenario_{scenario}_{phase}_failed")
}

fn phase_duration_measure(scenario: Scenario, phase: Phase) -> String {
    format!("scenario_{scenario}_{phase}_duration")
}

/// Start/end marks for one required phase. The start mark is the
/// implicit baseline captured at scenario start; an explicit
/// `start_phase` call overwrites it. The end mark is set exactly once.
struct PhaseRecord {
    start_mark: String,
    end_mark: Option<String>,
}

struct ScenarioContext {
    scenario: Scenario,
    definition: ScenarioDefinition,
    start_mark: String,
    completed: Vec<Phase>,
    failed: Vec<Phase>,
    phases: HashMap<Phase, PhaseRecord>,
    timer: Option<JoinHandle<()>>,
    emitted: bool,
    expected_failure: bool,
}

struct MonitorInner {
    registry: ScenarioRegistry,
    timing: Arc<dyn TimingProvider>,
    reporter: Arc<dyn HealthReporter>,
    report_context: ReportContext,
    bus: EventBus,
    contexts: Mutex<HashMap<Scenario, ScenarioContext>>,
    vitals: Mutex<WebVitals>,
}

/// Tracks active scenarios and emits exactly one verdict per instance.
///
/// Cloning is cheap; all clones share the same state. Timeouts are
/// detached tokio tasks, so the monitor must live inside a tokio
/// runtime.
#[derive(Clone)]
pub struct ScenarioMonitor {
    inner: Arc<MonitorInner>,
}

impl ScenarioMonitor {
    pub fn new(
        registry: ScenarioRegistry,
        timing: Arc<dyn TimingProvider>,
        reporter: Arc<dyn HealthReporter>,
        report_context: ReportContext,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                registry,
                timing,
                reporter,
                report_context,
                bus: EventBus::new(),
                contexts: Mutex::new(HashMap::new()),
                vitals: Mutex::new(WebVitals::default()),
            }),
        }
    }

    /// Monitor over the built-in scenario registry and the in-process
    /// timeline.
    pub fn builtin(reporter: Arc<dyn HealthReporter>, report_context: ReportContext) -> Self {
        Self::new(
            ScenarioRegistry::builtin(),
            Arc::new(PerformanceTimeline::new()),
            reporter,
            report_context,
        )
    }

    /// Bus carrying one trace event per scenario transition.
    pub fn events(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Open a context for `scenario` and arm its timeout.
    ///
    /// Captures the scenario start mark and an implicit baseline start
    /// mark for every required phase, so callers are not obligated to
    /// call [`start_phase`](Self::start_phase) explicitly. A second
    /// `start` for an id that is already active is a no-op; the
    /// original context's timer retains ownership of the id until it
    /// emits. An unregistered scenario is a configuration error.
    pub fn start(&self, scenario: Scenario) -> Result<()> {
        let mut contexts = self.inner.contexts.lock().unwrap();
        if contexts.contains_key(&scenario) {
            return Ok(());
        }

        let definition = self
            .inner
            .registry
            .get(scenario)
            .ok_or(MonitorError::UnregisteredScenario { scenario })?
            .clone();

        let start_mark = scenario_start_mark(scenario);
        self.inner.timing.mark(&start_mark);

        let mut phases = HashMap::new();
        for &phase in &definition.required_phases {
            let mark = phase_start_mark(scenario, phase);
            self.inner.timing.mark(&mark);
            phases.insert(
                phase,
                PhaseRecord {
                    start_mark: mark,
                    end_mark: None,
                },
            );
        }

        debug!(
            scenario = %scenario,
            phases = ?definition.required_phases,
            timeout_ms = definition.timeout_ms,
            "scenario_start"
        );
        self.publish(MonitorEvent::ScenarioStart {
            scenario,
            required_phases: definition.required_phases.clone(),
            timeout_ms: definition.timeout_ms,
        });

        let timer = {
            let monitor = self.clone();
            let timeout = Duration::from_millis(definition.timeout_ms);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                monitor.on_timeout(scenario);
            })
        };

        contexts.insert(
            scenario,
            ScenarioContext {
                scenario,
                definition,
                start_mark,
                completed: Vec::new(),
                failed: Vec::new(),
                phases,
                timer: Some(timer),
                emitted: false,
                expected_failure: false,
            },
        );

        Ok(())
    }

    /// Re-capture a phase's start mark, overriding the implicit
    /// baseline taken at scenario start, so a caller that signals
    /// "real work begins here" gets a more precise duration.
    ///
    /// No-op if the scenario is unknown or emitted, the phase is not
    /// required, or the phase already completed.
    pub fn start_phase(&self, scenario: Scenario, phase: Phase) {
        let mut contexts = self.inner.contexts.lock().unwrap();
        let Some(ctx) = contexts.get_mut(&scenario) else {
            return;
        };
        if ctx.emitted || !ctx.definition.required_phases.contains(&phase) {
            return;
        }
        if let Some(record) = ctx.phases.get(&phase) {
            if record.end_mark.is_some() {
                return;
            }
        }

        let mark = phase_start_mark(scenario, phase);
        self.inner.timing.mark(&mark);
        ctx.phases.insert(
            phase,
            PhaseRecord {
                start_mark: mark,
                end_mark: None,
            },
        );

        debug!(scenario = %scenario, phase = %phase, "phase_start");
        self.publish(MonitorEvent::PhaseStart { scenario, phase });
    }

    /// Record a phase completion. When the last required phase
    /// completes, the definition's validator decides the verdict
    /// (default healthy) and the scenario emits.
    ///
    /// No-op if the scenario is unknown or emitted, the phase is not
    /// required, or the phase already completed.
    pub fn complete_phase(&self, scenario: Scenario, phase: Phase) {
        let mut contexts = self.inner.contexts.lock().unwrap();
        self.complete_phase_inner(&mut contexts, scenario, phase);
    }

    fn complete_phase_inner(
        &self,
        contexts: &mut HashMap<Scenario, ScenarioContext>,
        scenario: Scenario,
        phase: Phase,
    ) {
        let Some(ctx) = contexts.get_mut(&scenario) else {
            return;
        };
        if ctx.emitted || !ctx.definition.required_phases.contains(&phase) {
            return;
        }
        let Some(record) = ctx.phases.get_mut(&phase) else {
            return;
        };
        if record.end_mark.is_some() {
            return;
        }

        let end_mark = phase_end_mark(scenario, phase);
        self.inner.timing.mark(&end_mark);
        let duration_ms = match (
            self.inner.timing.mark_time(&record.start_mark),
            self.inner.timing.mark_time(&end_mark),
        ) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        };
        record.end_mark = Some(end_mark);
        ctx.completed.push(phase);

        debug!(
            scenario = %scenario,
            phase = %phase,
            duration_ms = ?duration_ms,
            completed = ctx.completed.len(),
            required = ctx.definition.required_phases.len(),
            "phase_complete"
        );
        self.publish(MonitorEvent::PhaseComplete {
            scenario,
            phase,
            duration_ms,
            completed_count: ctx.completed.len(),
            required_count: ctx.definition.required_phases.len(),
        });

        let all_done = ctx
            .definition
            .required_phases
            .iter()
            .all(|p| ctx.completed.contains(p));
        if all_done {
            let snapshot = self.build_snapshot(ctx, false);
            let healthy = ctx.definition.validate.map_or(true, |v| v(&snapshot));
            self.emit(contexts, scenario, healthy, false, Some(snapshot));
        }
    }

    /// Fail a phase: the given phase and every other not-yet-completed
    /// required phase are marked failed, and the scenario emits
    /// unhealthy immediately, bypassing the timer. Models an
    /// unexpected error, distinct from benign expiry.
    ///
    /// If an expected failure was flagged while this scenario was
    /// active, the failure is treated as a completion instead; the
    /// caller has declared it benign.
    pub fn fail_phase(&self, scenario: Scenario, phase: Phase) {
        let mut contexts = self.inner.contexts.lock().unwrap();

        let expected_failure = match contexts.get(&scenario) {
            Some(ctx) if !ctx.emitted => ctx.expected_failure,
            _ => return,
        };
        if expected_failure {
            debug!(
                scenario = %scenario,
                phase = %phase,
                "phase_fail under expected failure, completing instead"
            );
            self.complete_phase_inner(&mut contexts, scenario, phase);
            return;
        }

        let Some(ctx) = contexts.get_mut(&scenario) else {
            return;
        };

        self.inner.timing.mark(&phase_failed_mark(scenario, phase));
        for &required in &ctx.definition.required_phases {
            if !ctx.completed.contains(&required) && !ctx.failed.contains(&required) {
                ctx.failed.push(required);
            }
        }

        // Snapshot taken at the moment of failure, not at some later
        // inspection time.
        let snapshot = self.build_snapshot(ctx, false);

        warn!(
            scenario = %scenario,
            phase = %phase,
            failed = ?ctx.failed,
            completed = ?ctx.completed,
            "phase_fail"
        );
        self.publish(MonitorEvent::PhaseFail {
            scenario,
            phase,
            failed_phases: ctx.failed.clone(),
            completed_phases: ctx.completed.clone(),
        });

        self.emit(&mut contexts, scenario, false, false, Some(snapshot));
    }

    /// Flag every currently active scenario as expecting failure
    /// (auth, firewall, navigation away). A later timeout then emits
    /// healthy instead of unhealthy. Scenarios started after this
    /// call, or already emitted, are unaffected.
    pub fn mark_expected_failure(&self) {
        let mut contexts = self.inner.contexts.lock().unwrap();
        for (&scenario, ctx) in contexts.iter_mut() {
            if !ctx.emitted {
                ctx.expected_failure = true;
                debug!(scenario = %scenario, "expected_failure_marked");
                self.publish(MonitorEvent::ExpectedFailureMarked { scenario });
            }
        }
    }

    /// Feed point for the asynchronous web-vitals source. Values
    /// arrive at arbitrary times; snapshots copy whatever is known at
    /// emission.
    pub fn record_vital(&self, kind: VitalKind, value: f64) {
        self.inner.vitals.lock().unwrap().set(kind, value);
    }

    /// Drop all active contexts and cancel their timers without
    /// emitting. Test isolation / teardown.
    pub fn reset(&self) {
        let mut contexts = self.inner.contexts.lock().unwrap();
        for (_, mut ctx) in contexts.drain() {
            if let Some(timer) = ctx.timer.take() {
                timer.abort();
            }
            self.clear_instrumentation(&ctx);
        }
    }

    fn on_timeout(&self, scenario: Scenario) {
        let mut contexts = self.inner.contexts.lock().unwrap();
        let Some(ctx) = contexts.get(&scenario) else {
            return;
        };
        if ctx.emitted {
            return;
        }

        let missing: Vec<Phase> = ctx
            .definition
            .required_phases
            .iter()
            .filter(|p| !ctx.completed.contains(p))
            .copied()
            .collect();
        let expected_failure = ctx.expected_failure;

        debug!(
            scenario = %scenario,
            missing = ?missing,
            completed = ?ctx.completed,
            expected_failure,
            "scenario_timeout"
        );
        self.publish(MonitorEvent::ScenarioTimeout {
            scenario,
            missing_phases: missing,
            completed_phases: ctx.completed.clone(),
            expected_failure,
        });

        // An expected failure converts the timeout verdict to healthy.
        self.emit(&mut contexts, scenario, expected_failure, true, None);
    }

    /// Decide and deliver the verdict. The `emitted` check-and-set
    /// under the map lock is the single guard making this safe from
    /// its three call sites (completion, failure, timer).
    fn emit(
        &self,
        contexts: &mut HashMap<Scenario, ScenarioContext>,
        scenario: Scenario,
        healthy: bool,
        timed_out: bool,
        snapshot: Option<ScenarioSnapshot>,
    ) {
        match contexts.get_mut(&scenario) {
            Some(ctx) if !ctx.emitted => ctx.emitted = true,
            _ => return,
        }
        let Some(mut ctx) = contexts.remove(&scenario) else {
            return;
        };
        if let Some(timer) = ctx.timer.take() {
            timer.abort();
        }

        let snapshot = snapshot.unwrap_or_else(|| self.build_snapshot(&ctx, timed_out));

        debug!(
            scenario = %scenario,
            healthy,
            timed_out,
            duration_ms = snapshot.duration_ms,
            completed = ?snapshot.completed,
            failed = ?snapshot.failed,
            "scenario_end"
        );
        self.publish(MonitorEvent::ScenarioEnd {
            scenario,
            healthy,
            timed_out,
            duration_ms: snapshot.duration_ms,
            completed_phases: snapshot.completed.clone(),
            failed_phases: snapshot.failed.clone(),
            vitals: snapshot.vitals.clone(),
        });

        // Fire-and-forget: the transport outcome never feeds back into
        // scenario bookkeeping.
        let reporter = Arc::clone(&self.inner.reporter);
        let report_context = self.inner.report_context.clone();
        tokio::spawn(async move {
            if let Err(err) = reporter.report(scenario, &report_context, healthy).await {
                debug!(scenario = %scenario, error = %err, "health report delivery failed");
            }
        });

        self.clear_instrumentation(&ctx);
    }

    fn build_snapshot(&self, ctx: &ScenarioContext, timed_out: bool) -> ScenarioSnapshot {
        let timing = &self.inner.timing;

        let mut phase_timings = HashMap::new();
        for (&phase, record) in &ctx.phases {
            // Only phases with both marks get a timing entry.
            let Some(end_mark) = &record.end_mark else {
                continue;
            };
            let Some(end_at) = timing.mark_time(end_mark) else {
                continue;
            };
            let measure_name = phase_duration_measure(ctx.scenario, phase);
            let Some(duration_ms) = timing.measure(&measure_name, &record.start_mark, end_mark)
            else {
                continue;
            };
            phase_timings.insert(
                phase,
                PhaseTiming {
                    end_time: timing.wall_time(end_at),
                    duration_ms,
                },
            );
        }

        let now = timing.now();
        let started = timing.mark_time(&ctx.start_mark).unwrap_or(0.0);

        ScenarioSnapshot {
            scenario: ctx.scenario,
            start_time: timing.wall_time(started),
            end_time: timing.wall_time(now),
            duration_ms: now - started,
            completed: ctx.completed.clone(),
            failed: if ctx.failed.is_empty() {
                None
            } else {
                Some(ctx.failed.clone())
            },
            timed_out,
            vitals: self.inner.vitals.lock().unwrap().clone(),
            phase_timings,
        }
    }

    /// Marks accumulate in a global table; every emission path clears
    /// the ones this scenario created.
    fn clear_instrumentation(&self, ctx: &ScenarioContext) {
        let timing = &self.inner.timing;
        timing.clear_mark(&ctx.start_mark);
        for &phase in &ctx.definition.required_phases {
            if let Some(record) = ctx.phases.get(&phase) {
                timing.clear_mark(&record.start_mark);
                if let Some(end_mark) = &record.end_mark {
                    timing.clear_mark(end_mark);
                }
            }
            timing.clear_mark(&phase_failed_mark(ctx.scenario, phase));
            timing.clear_measure(&phase_duration_measure(ctx.scenario, phase));
        }
    }

    fn publish(&self, event: MonitorEvent) {
        self.inner.bus.publish(EventEnvelope::new(event));
    }
}
