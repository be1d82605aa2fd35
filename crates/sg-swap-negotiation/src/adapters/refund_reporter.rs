//! Refund Reporter Adapters

use crate::domain::RefundNotice;
use crate::ports::RefundReporter;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Forwards notices to a channel the host drains.
pub struct ChannelRefundReporter {
    tx: mpsc::UnboundedSender<RefundNotice>,
}

impl ChannelRefundReporter {
    /// Reporter plus the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RefundNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RefundReporter for ChannelRefundReporter {
    fn report_refund(&self, notice: RefundNotice) {
        if let Err(e) = self.tx.send(notice) {
            error!(
                "[swap] refund notice for {} lost: receiver closed",
                e.0.record
            );
        }
    }
}

/// Logs notices and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRefundReporter;

impl RefundReporter for LoggingRefundReporter {
    fn report_refund(&self, notice: RefundNotice) {
        warn!(
            record = %notice.record,
            order = %notice.order,
            ticker = %notice.ticker,
            deadline = notice.deadline,
            "[swap] refund required for contract {}",
            notice
                .contract
                .as_ref()
                .map_or("<none>", |c| c.as_str())
        );
    }
}
