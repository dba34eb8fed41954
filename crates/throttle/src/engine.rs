//! Tick-aggregation and rate-throttling decision logic.
//!
//! Fine-grained supervisor ticks accumulate into periods; each period
//! boundary advances the execution counter, and the task launches only
//! while that counter is within the per-cycle cap. When the counter
//! reaches the cycle length it is re-armed, opening the next cycle.
//! Both counters live in the injected [`CounterStore`], so the schedule
//! survives listener restarts.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use tickgate_core::{EventName, Outcome, ThrottleConfig};
use tickgate_store::{Counter, CounterStore, SlotId};

use crate::error::ThrottleError;
use crate::invoker::TaskInvoker;

/// Slot identity of the tick counter (ticks within the current period).
pub const TICK_SLOT: SlotId = 2;
/// Slot identity of the execution counter (periods within the current cycle).
pub const EXEC_SLOT: SlotId = 3;

/// Region width for the tick counter.
const TICK_SLOT_BYTES: usize = 2;
/// Region width for the execution counter.
const EXEC_SLOT_BYTES: usize = 8;

// ── Dispatch seam ────────────────────────────────────────────────────

/// Dispatch seam between the protocol loop and the engine.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventName) -> Result<Outcome, ThrottleError>;
}

// ── ThrottleEngine ───────────────────────────────────────────────────

pub struct ThrottleEngine {
    config: ThrottleConfig,
    store: Arc<dyn CounterStore>,
    invoker: Arc<dyn TaskInvoker>,
}

impl ThrottleEngine {
    pub fn new(
        config: ThrottleConfig,
        store: Arc<dyn CounterStore>,
        invoker: Arc<dyn TaskInvoker>,
    ) -> Self {
        Self {
            config,
            store,
            invoker,
        }
    }

    fn open_tick_counter(&self) -> Result<Box<dyn Counter>, ThrottleError> {
        Ok(self.store.open(TICK_SLOT, TICK_SLOT_BYTES)?)
    }

    fn open_exec_counter(&self) -> Result<Box<dyn Counter>, ThrottleError> {
        Ok(self.store.open(EXEC_SLOT, EXEC_SLOT_BYTES)?)
    }

    /// Re-arm path: the supervised process (re)started, so both counters
    /// start over. Guarantees no stale state is carried across a
    /// supervisor restart.
    fn rearm(&self) -> Result<Outcome, ThrottleError> {
        self.open_tick_counter()?.reset()?;
        self.open_exec_counter()?.reset()?;
        info!("counters re-armed");
        Ok(Outcome::Success)
    }

    /// Tick path: accumulate, detect the period boundary, gate the task
    /// launch against the cap, re-arm at the cycle boundary.
    async fn tick(&self) -> Result<Outcome, ThrottleError> {
        let mut tick_counter = self.open_tick_counter()?;
        let ticks = tick_counter.increment()?;
        if ticks < self.config.ticks_per_period {
            debug!(
                ticks,
                ticks_per_period = self.config.ticks_per_period,
                "tick accumulated"
            );
            return Ok(Outcome::Success);
        }

        // Period boundary: the next period counts from zero.
        tick_counter.reset()?;

        // The execution counter advances on every period boundary, capped
        // or not; the cycle reset below depends on it reaching
        // ticks_in_cycle exactly.
        let mut exec_counter = self.open_exec_counter()?;
        let executions = exec_counter.increment()?;
        let not_maxed = executions <= self.config.max_executions;
        let cycle_complete = executions == self.config.ticks_in_cycle;

        if not_maxed {
            info!(executions, "period boundary, launching task");
            if let Err(e) = self.invoker.invoke(&self.config.env_id).await {
                // The supervisor never sees launch failures; the tick
                // itself was handled.
                warn!(error = %e, "task launch failed");
            }
        }

        if cycle_complete {
            exec_counter.reset()?;
            info!("cycle complete, execution counter re-armed");
        }

        Ok(Outcome::Success)
    }
}

#[async_trait]
impl EventHandler for ThrottleEngine {
    async fn handle(&self, event: EventName) -> Result<Outcome, ThrottleError> {
        match event {
            EventName::ProcessStateRunning => self.rearm(),
            EventName::Tick5 => self.tick().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use tickgate_store::MemoryCounterStore;

    /// Records every launch instead of spawning a process.
    #[derive(Default)]
    struct RecordingInvoker {
        launches: Mutex<Vec<String>>,
    }

    impl RecordingInvoker {
        fn count(&self) -> usize {
            self.launches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TaskInvoker for RecordingInvoker {
        async fn invoke(&self, env_id: &str) -> Result<(), ThrottleError> {
            self.launches.lock().unwrap().push(env_id.to_string());
            Ok(())
        }
    }

    /// Always fails to launch.
    struct FailingInvoker;

    #[async_trait]
    impl TaskInvoker for FailingInvoker {
        async fn invoke(&self, _env_id: &str) -> Result<(), ThrottleError> {
            Err(ThrottleError::TaskLaunch("boom".into()))
        }
    }

    fn demo_config() -> ThrottleConfig {
        ThrottleConfig {
            ticks_per_period: 2,
            max_executions: 2,
            ticks_in_cycle: 6,
            env_id: "test".into(),
        }
    }

    fn engine_with(
        config: ThrottleConfig,
    ) -> (ThrottleEngine, MemoryCounterStore, Arc<RecordingInvoker>) {
        let store = MemoryCounterStore::new();
        let invoker = Arc::new(RecordingInvoker::default());
        let engine = ThrottleEngine::new(config, Arc::new(store.clone()), invoker.clone());
        (engine, store, invoker)
    }

    fn read_slot(store: &MemoryCounterStore, slot: SlotId, size: usize) -> u64 {
        store.open(slot, size).unwrap().read().unwrap()
    }

    #[tokio::test]
    async fn test_running_event_rearms_counters() {
        let (engine, store, _invoker) = engine_with(demo_config());

        let mut ticks = store.open(TICK_SLOT, TICK_SLOT_BYTES).unwrap();
        ticks.write(1).unwrap();
        let mut execs = store.open(EXEC_SLOT, EXEC_SLOT_BYTES).unwrap();
        execs.write(5).unwrap();

        let outcome = engine.handle(EventName::ProcessStateRunning).await.unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(read_slot(&store, TICK_SLOT, TICK_SLOT_BYTES), 0);
        assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), 0);
    }

    #[tokio::test]
    async fn test_tick_below_boundary_only_accumulates() {
        let (engine, store, invoker) = engine_with(demo_config());

        let outcome = engine.handle(EventName::Tick5).await.unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert_eq!(invoker.count(), 0);
        assert_eq!(read_slot(&store, TICK_SLOT, TICK_SLOT_BYTES), 1);
        assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), 0);
    }

    #[tokio::test]
    async fn test_period_boundary_launches_and_resets_ticks() {
        let (engine, store, invoker) = engine_with(demo_config());

        engine.handle(EventName::Tick5).await.unwrap();
        engine.handle(EventName::Tick5).await.unwrap();

        assert_eq!(invoker.count(), 1);
        assert_eq!(read_slot(&store, TICK_SLOT, TICK_SLOT_BYTES), 0);
        assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), 1);
    }

    #[tokio::test]
    async fn test_cap_enforced_across_full_cycle() {
        let (engine, store, invoker) = engine_with(demo_config());

        // 6 periods of 2 ticks each: launches on periods 1 and 2 only,
        // counter keeps advancing through the capped periods, and the
        // cycle boundary re-arms it.
        for period in 1..=6u64 {
            engine.handle(EventName::Tick5).await.unwrap();
            engine.handle(EventName::Tick5).await.unwrap();

            assert_eq!(invoker.count(), period.min(2) as usize);
            let expected = if period == 6 { 0 } else { period };
            assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), expected);
        }
    }

    #[tokio::test]
    async fn test_second_cycle_repeats_pattern() {
        let (engine, _store, invoker) = engine_with(demo_config());

        for _ in 0..24 {
            engine.handle(EventName::Tick5).await.unwrap();
        }

        // Two launches per cycle, two cycles.
        assert_eq!(invoker.count(), 4);
    }

    #[tokio::test]
    async fn test_restart_mid_cycle_starts_over() {
        let (engine, store, invoker) = engine_with(demo_config());

        // Three periods in: cap reached, one partial tick pending.
        for _ in 0..7 {
            engine.handle(EventName::Tick5).await.unwrap();
        }
        assert_eq!(invoker.count(), 2);

        engine.handle(EventName::ProcessStateRunning).await.unwrap();
        assert_eq!(read_slot(&store, TICK_SLOT, TICK_SLOT_BYTES), 0);
        assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), 0);

        // A fresh period launches again immediately.
        engine.handle(EventName::Tick5).await.unwrap();
        engine.handle(EventName::Tick5).await.unwrap();
        assert_eq!(invoker.count(), 3);
    }

    #[tokio::test]
    async fn test_launch_failure_still_reports_success() {
        let store = MemoryCounterStore::new();
        let engine = ThrottleEngine::new(
            demo_config(),
            Arc::new(store.clone()),
            Arc::new(FailingInvoker),
        );

        engine.handle(EventName::Tick5).await.unwrap();
        let outcome = engine.handle(EventName::Tick5).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        // The period still counted.
        assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), 1);
    }

    #[tokio::test]
    async fn test_capped_period_is_silent_but_counted() {
        let (engine, store, invoker) = engine_with(demo_config());

        // Periods 1..=3; the third is over the cap.
        for _ in 0..6 {
            engine.handle(EventName::Tick5).await.unwrap();
        }

        assert_eq!(invoker.count(), 2);
        assert_eq!(read_slot(&store, EXEC_SLOT, EXEC_SLOT_BYTES), 3);
    }
}
