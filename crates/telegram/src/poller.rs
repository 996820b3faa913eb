use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use presence_core::domain::user::Caller;

use crate::api::Update;
use crate::commands::{AttendanceService, CommandRouter, IncomingText};
use crate::replies::{self, Reply};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to poll updates: {0}")]
    Poll(String),
    #[error("transport failed to deliver reply: {0}")]
    Deliver(String),
}

/// Source of inbound updates. `offset` acknowledges every update before it,
/// matching the Bot API's `getUpdates` contract. Returning `None` means the
/// transport decided the stream is over (tests, shutdown); a live transport
/// returns an empty batch when the long poll times out quietly.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    async fn next_batch(&self, offset: Option<i64>)
        -> Result<Option<Vec<Update>>, TransportError>;
}

/// Delivers one reply to one chat.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// The poll loop: fetch a batch, route each message, deliver each reply.
/// A handler failure is answered with a generic failure reply and never
/// stops the loop; consecutive transport failures are retried with capped
/// exponential backoff until the policy is exhausted.
pub struct LongPollRunner<S> {
    transport: Arc<dyn UpdateTransport>,
    sink: Arc<dyn ReplySink>,
    router: CommandRouter<S>,
    reconnect_policy: ReconnectPolicy,
}

impl<S> LongPollRunner<S>
where
    S: AttendanceService,
{
    pub fn new(
        transport: Arc<dyn UpdateTransport>,
        sink: Arc<dyn ReplySink>,
        router: CommandRouter<S>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, sink, router, reconnect_policy }
    }

    pub async fn run(&self) -> Result<()> {
        let mut offset: Option<i64> = None;
        let mut consecutive_failures = 0_u32;

        loop {
            match self.transport.next_batch(offset).await {
                Ok(Some(updates)) => {
                    consecutive_failures = 0;
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Ok(None) => {
                    info!("update stream closed; stopping poll loop");
                    return Ok(());
                }
                Err(error) => {
                    warn!(
                        attempt = consecutive_failures,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %error,
                        "update poll failed"
                    );

                    if consecutive_failures >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "poll retries exhausted; stopping poll loop"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(consecutive_failures);
                    consecutive_failures += 1;
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        let update_id = update.update_id;
        let Some(message) = update.message else {
            debug!(update_id, "skipping update without a message");
            return;
        };
        let Some(text) = message.text else {
            debug!(update_id, "skipping message without text");
            return;
        };
        let Some(sender) = message.from else {
            debug!(update_id, "skipping message without a sender");
            return;
        };

        let chat_id = message.chat.id;
        let incoming = IncomingText {
            caller: Caller {
                tg_id: sender.id,
                handle: sender.username,
                display_name: sender.first_name,
            },
            text,
        };

        let reply = match self.router.route(&incoming).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(update_id, chat_id, error = %error, "command handling failed");
                replies::failure()
            }
        };

        if let Err(error) = self.sink.deliver(chat_id, &reply).await {
            warn!(update_id, chat_id, error = %error, "failed to deliver reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use presence_core::access::AdminPolicy;
    use presence_core::domain::status::StatusCode;
    use presence_core::domain::user::{Caller, OfficeShare, RosterEntry};

    use super::{
        LongPollRunner, ReconnectPolicy, ReplySink, TransportError, UpdateTransport,
    };
    use crate::api::{Chat, Message, Sender, Update};
    use crate::commands::{AttendanceService, CommandRouter, MarkOutcome, RouteError};
    use crate::replies::Reply;

    struct ScriptedTransport {
        batches: Mutex<VecDeque<Result<Option<Vec<Update>>, TransportError>>>,
        polls: Mutex<Vec<Option<i64>>>,
    }

    impl ScriptedTransport {
        fn new(batches: Vec<Result<Option<Vec<Update>>, TransportError>>) -> Self {
            Self { batches: Mutex::new(batches.into()), polls: Mutex::new(Vec::new()) }
        }

        async fn polls(&self) -> Vec<Option<i64>> {
            self.polls.lock().await.clone()
        }
    }

    #[async_trait]
    impl UpdateTransport for ScriptedTransport {
        async fn next_batch(
            &self,
            offset: Option<i64>,
        ) -> Result<Option<Vec<Update>>, TransportError> {
            self.polls.lock().await.push(offset);
            self.batches.lock().await.pop_front().unwrap_or(Ok(None))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        deliveries: Mutex<Vec<(i64, Reply)>>,
    }

    impl RecordingSink {
        async fn deliveries(&self) -> Vec<(i64, Reply)> {
            self.deliveries.lock().await.clone()
        }
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn deliver(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
            self.deliveries.lock().await.push((chat_id, reply.clone()));
            Ok(())
        }
    }

    /// Fails `today_status` so handler-failure paths can be exercised.
    struct FlakyService;

    #[async_trait]
    impl AttendanceService for FlakyService {
        async fn register_caller(&self, _caller: &Caller) -> Result<(), RouteError> {
            Ok(())
        }

        async fn mark_status(
            &self,
            _caller: &Caller,
            _code: StatusCode,
        ) -> Result<MarkOutcome, RouteError> {
            Err(RouteError::Service("unavailable".to_string()))
        }

        async fn today_status(&self, _caller: &Caller) -> Result<Option<String>, RouteError> {
            Err(RouteError::Service("unavailable".to_string()))
        }

        async fn roster_today(&self) -> Result<Vec<RosterEntry>, RouteError> {
            Ok(Vec::new())
        }

        async fn office_share(&self) -> Result<OfficeShare, RouteError> {
            Ok(OfficeShare::from_counts(0, 0))
        }

        async fn names_with_status(&self, _code: StatusCode) -> Result<Vec<String>, RouteError> {
            Ok(Vec::new())
        }
    }

    fn update(update_id: i64, tg_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(Message {
                from: Some(Sender {
                    id: tg_id,
                    first_name: "Avery".to_string(),
                    username: None,
                }),
                chat: Chat { id: tg_id },
                text: Some(text.to_string()),
            }),
        }
    }

    fn fast_policy(max_retries: u32) -> ReconnectPolicy {
        ReconnectPolicy { max_retries, base_delay_ms: 0, max_delay_ms: 0 }
    }

    fn runner(
        transport: Arc<ScriptedTransport>,
        sink: Arc<RecordingSink>,
        policy: ReconnectPolicy,
    ) -> LongPollRunner<FlakyService> {
        LongPollRunner::new(
            transport,
            sink,
            CommandRouter::new(FlakyService, AdminPolicy::new(4242, "ops_lead")),
            policy,
        )
    }

    #[tokio::test]
    async fn replies_are_delivered_and_offset_advances() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(Some(vec![update(10, 7, "/start")])),
            Ok(None),
        ]));
        let sink = Arc::new(RecordingSink::default());

        runner(transport.clone(), sink.clone(), fast_policy(1)).run().await.expect("run");

        let deliveries = sink.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, 7);
        assert_eq!(deliveries[0].1.text, "Hi! Pick an action:");

        assert_eq!(transport.polls().await, vec![None, Some(11)]);
    }

    #[tokio::test]
    async fn poll_failure_is_retried_then_loop_continues() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Poll("network down".to_string())),
            Ok(Some(vec![update(20, 7, "/start")])),
            Ok(None),
        ]));
        let sink = Arc::new(RecordingSink::default());

        runner(transport.clone(), sink.clone(), fast_policy(3)).run().await.expect("run");

        assert_eq!(sink.deliveries().await.len(), 1);
        assert_eq!(transport.polls().await.len(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_stop_the_loop() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Poll("down".to_string())),
            Err(TransportError::Poll("down".to_string())),
            Err(TransportError::Poll("down".to_string())),
        ]));
        let sink = Arc::new(RecordingSink::default());

        runner(transport.clone(), sink.clone(), fast_policy(2)).run().await.expect("run");

        assert_eq!(transport.polls().await.len(), 3);
        assert!(sink.deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn handler_failure_sends_generic_reply_and_keeps_serving() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(Some(vec![update(30, 7, "My status"), update(31, 7, "/start")])),
            Ok(None),
        ]));
        let sink = Arc::new(RecordingSink::default());

        runner(transport.clone(), sink.clone(), fast_policy(1)).run().await.expect("run");

        let deliveries = sink.deliveries().await;
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].1.text, "Something went wrong. Please try again.");
        assert_eq!(deliveries[1].1.text, "Hi! Pick an action:");
    }

    #[tokio::test]
    async fn updates_without_text_or_sender_are_skipped() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(Some(vec![
                Update { update_id: 40, message: None },
                Update {
                    update_id: 41,
                    message: Some(Message {
                        from: None,
                        chat: Chat { id: 7 },
                        text: Some("/start".to_string()),
                    }),
                },
            ])),
            Ok(None),
        ]));
        let sink = Arc::new(RecordingSink::default());

        runner(transport.clone(), sink.clone(), fast_policy(1)).run().await.expect("run");

        assert!(sink.deliveries().await.is_empty());
        // Skipped updates are still acknowledged.
        assert_eq!(transport.polls().await, vec![None, Some(42)]);
    }
}
