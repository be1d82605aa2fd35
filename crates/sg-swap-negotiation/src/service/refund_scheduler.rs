//! # Refund Scheduler
//!
//! One-shot deadline tasks for funded swaps. When a deadline passes while
//! the record is still in the book, the record moves to `Refunding` and a
//! [`RefundNotice`] goes to the host.

use super::order_book::OrderBook;
use crate::algorithms::seconds_until;
use crate::domain::{ContractReference, LocalOrder, OrderHandle, RecordId, RefundNotice};
use crate::metrics::SwapMetrics;
use crate::ports::{NetworkClock, RefundReporter};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct ArmedRefund {
    generation: u64,
    task: JoinHandle<()>,
}

type TaskTable = Arc<Mutex<HashMap<RecordId, ArmedRefund>>>;

/// Deadline timers keyed by record.
///
/// Must be used from within a tokio runtime.
pub struct RefundScheduler {
    book: Arc<OrderBook>,
    clock: Arc<dyn NetworkClock>,
    reporter: Arc<dyn RefundReporter>,
    metrics: Arc<SwapMetrics>,
    tasks: TaskTable,
    generation: AtomicU64,
}

impl RefundScheduler {
    /// Create a scheduler over `book`.
    pub fn new(
        book: Arc<OrderBook>,
        clock: Arc<dyn NetworkClock>,
        reporter: Arc<dyn RefundReporter>,
        metrics: Arc<SwapMetrics>,
    ) -> Self {
        Self {
            book,
            clock,
            reporter,
            metrics,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Arm (or re-arm) the refund deadline for `handle`.
    ///
    /// `deadline` is adjusted network time in unix seconds. It is converted
    /// to a delay now, so later clock adjustments do not move it.
    pub fn schedule_refund(&self, handle: OrderHandle, deadline: u64) {
        let record = handle.record();
        let delay = seconds_until(deadline, self.clock.adjusted_time());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        let book = Arc::clone(&self.book);
        let reporter = Arc::clone(&self.reporter);
        let metrics = Arc::clone(&self.metrics);
        let tasks = Arc::clone(&self.tasks);

        // Hold the table lock across spawn so the task cannot clear its own
        // entry before it is inserted.
        let mut table = self.tasks.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay)).await;
            fire(&book, &handle, deadline, reporter.as_ref(), &metrics);
            let mut table = tasks.lock();
            if table.get(&record).map(|a| a.generation) == Some(generation) {
                table.remove(&record);
            }
        });
        if let Some(previous) = table.insert(record, ArmedRefund { generation, task }) {
            previous.task.abort();
            debug!("[swap] refund for {} re-armed", record);
        }
        debug!("[swap] refund for {} armed in {}s", record, delay);
    }

    /// Disarm the deadline for `handle`. `true` if one was armed.
    pub fn cancel_refund(&self, handle: &LocalOrder) -> bool {
        match self.tasks.lock().remove(&handle.record()) {
            Some(armed) => {
                armed.task.abort();
                debug!("[swap] refund for {} cancelled", handle.record());
                true
            }
            None => false,
        }
    }

    /// Report a contract that was funded but never committed to the book.
    pub fn report_orphaned(&self, handle: &LocalOrder, contract: ContractReference, deadline: u64) {
        warn!(
            "[swap] contract {} for {} funded by a lost race; reporting for refund",
            contract,
            handle.record()
        );
        self.reporter
            .report_refund(notice(handle, Some(contract), deadline));
        self.metrics.record_refund();
    }

    /// Number of armed deadlines.
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Is a deadline armed for `handle`?
    pub fn is_armed(&self, handle: &LocalOrder) -> bool {
        self.tasks.lock().contains_key(&handle.record())
    }
}

impl Drop for RefundScheduler {
    fn drop(&mut self) {
        for (_, armed) in self.tasks.lock().drain() {
            armed.task.abort();
        }
    }
}

fn fire(
    book: &OrderBook,
    handle: &LocalOrder,
    deadline: u64,
    reporter: &dyn RefundReporter,
    metrics: &SwapMetrics,
) {
    match book.begin_refund(handle) {
        Ok(from) => {
            info!(
                "[swap] refund deadline passed for {} ({}) in {}",
                handle.record(),
                handle.order(),
                from
            );
            reporter.report_refund(notice(handle, handle.our_contract(), deadline));
            metrics.record_refund();
        }
        Err(e) => {
            debug!("[swap] refund for {} not needed: {}", handle.record(), e);
        }
    }
}

fn notice(
    handle: &LocalOrder,
    contract: Option<ContractReference>,
    deadline: u64,
) -> RefundNotice {
    RefundNotice {
        record: handle.record(),
        order_id: handle.id(),
        order: handle.order().clone(),
        ticker: handle.order().base.clone(),
        contract,
        deadline,
    }
}
