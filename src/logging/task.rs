//! # The dedicated log task.
//!
//! Runs on its own event loop like any other task. Two private timers drive
//! it: a short repeating flush timer that drains the staged pipeline, and
//! (for TCP collectors) a reconnect timer that ticks the sink's connection
//! state machine. The terminate message performs a final drain so records
//! staged before shutdown still reach the sink.

use async_trait::async_trait;

use crate::envelope::{Envelope, Payload};
use crate::error::TaskError;
use crate::logging::Logger;
use crate::runtime::TaskContext;
use crate::tasks::{TaskHandler, TaskId};
use crate::timers::Repeat;

const FLUSH_TOKEN: u64 = 1;
const CONNECT_TOKEN: u64 = 2;

/// Task handler draining the asynchronous logging pipeline.
pub struct LogTask {
    logger: Logger,
}

impl LogTask {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl TaskHandler for LogTask {
    fn task_id(&self) -> TaskId {
        TaskId::SharedTsLog
    }

    async fn started(&mut self, ctx: &mut TaskContext) -> Result<(), TaskError> {
        ctx.start_timer(self.logger.flush_period(), Repeat::Forever, FLUSH_TOKEN)
            .ok_or_else(|| TaskError::fatal("log task cannot arm its flush timer"))?;
        if self.logger.needs_connect_timer() {
            // First tick happens one period in; attempt eagerly so startup
            // records are not held for a full reconnect period.
            self.logger.tick_connect();
            ctx.start_timer(self.logger.connect_period(), Repeat::Forever, CONNECT_TOKEN)
                .ok_or_else(|| TaskError::fatal("log task cannot arm its reconnect timer"))?;
        }
        Ok(())
    }

    async fn handle(
        &mut self,
        _ctx: &mut TaskContext,
        envelope: Envelope,
    ) -> Result<(), TaskError> {
        match envelope.payload() {
            Payload::TimerExpired(t) if t.token == FLUSH_TOKEN => {
                self.logger.flush();
            }
            Payload::TimerExpired(t) if t.token == CONNECT_TOKEN => {
                self.logger.tick_connect();
            }
            Payload::Terminate(_) => {
                self.logger.flush();
            }
            _ => {}
        }
        Ok(())
    }

    async fn terminated(&mut self, _ctx: &mut TaskContext) {
        // Whatever arrived between the terminate drain and teardown.
        self.logger.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::RuntimeConfig;
    use crate::logging::{LogConfig, Subsystem};
    use crate::runtime::MessagingRuntime;

    #[tokio::test]
    async fn flush_timer_drains_staged_records() {
        let logger = Logger::init(LogConfig {
            asynchronous: true,
            pool_size: 64,
            flush_period: Duration::from_millis(10),
            ..LogConfig::default()
        });

        let rt = MessagingRuntime::new(RuntimeConfig::default());
        rt.spawn(Box::new(LogTask::new(logger.clone())))
            .await
            .unwrap();

        for i in 0..20 {
            logger.info(Subsystem::Itti, format_args!("staged {i}"));
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(logger.outstanding(), 0);

        rt.broadcast_terminate(TaskId::Test1);
        rt.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn terminate_performs_final_drain() {
        let logger = Logger::init(LogConfig {
            asynchronous: true,
            pool_size: 64,
            // Flush timer far in the future: only terminate can drain.
            flush_period: Duration::from_secs(3600),
            ..LogConfig::default()
        });

        let rt = MessagingRuntime::new(RuntimeConfig::default());
        rt.spawn(Box::new(LogTask::new(logger.clone())))
            .await
            .unwrap();

        logger.info(Subsystem::Itti, format_args!("last words"));
        assert_eq!(logger.outstanding(), 1);

        rt.broadcast_terminate(TaskId::Test1);
        rt.shutdown().await.unwrap();
        assert_eq!(logger.outstanding(), 0);
    }
}
