//! # 请求生命周期
//!
//! ## 设计思路
//!
//! 一次提交被拆成三段：
//! 1. 会话 `begin_submit` 校验并生成 `PendingSubmission`（拥有负载，不借用会话）
//! 2. `PredictionLifecycle::run` 执行唯一一次往返，得到 `SubmissionOutcome`
//! 3. 会话 `finish_submit` 按提交编号应用结果
//!
//! 中间段不持有会话的任何借用，前端因此可以在请求进行中继续读取输入。
//!
//! ## 实现思路
//!
//! - 传输失败 → `NetworkFailure`；其余交给 `classify_reply`。
//! - 往返耗时只写入日志，不重试。

use std::time::Instant;

use super::client::PredictionService;
use super::model::PredictionResult;
use super::wire::{SubmissionPayload, classify_reply};
use crate::failure::FailureOutcome;

/// 已通过校验、等待发送的提交。
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    id: u64,
    payload: SubmissionPayload,
}

impl PendingSubmission {
    pub fn new(id: u64, payload: SubmissionPayload) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// 一次提交的唯一结果。
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub id: u64,
    pub result: Result<PredictionResult, FailureOutcome>,
}

impl SubmissionOutcome {
    /// 直接构造结果（测试或外部驱动时使用）。
    pub fn new(id: u64, result: Result<PredictionResult, FailureOutcome>) -> Self {
        Self { id, result }
    }
}

/// 预测请求生命周期。
#[derive(Debug)]
pub struct PredictionLifecycle<S> {
    service: S,
}

impl<S: PredictionService> PredictionLifecycle<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// 执行一次往返并分类结果。
    pub async fn run(&self, pending: PendingSubmission) -> SubmissionOutcome {
        let start = Instant::now();
        log::info!(
            "🚀 提交 #{} 已发出（{} bytes）",
            pending.id,
            pending.payload.bytes.len()
        );

        let result = match self.service.send(&pending.payload).await {
            Ok(reply) => {
                log::debug!("📨 提交 #{} 收到响应：HTTP {}", pending.id, reply.status);
                classify_reply(&reply)
            }
            Err(e) => {
                log::warn!("⚠️ 提交 #{} 传输失败：{}", pending.id, e);
                Err(FailureOutcome::NetworkFailure(e.0))
            }
        };

        let elapsed = start.elapsed();
        match &result {
            Ok(prediction) => log::info!(
                "✅ 提交 #{} 完成 - label={} recipe={} total={}ms",
                pending.id,
                prediction.label,
                prediction.recipe.is_some(),
                elapsed.as_millis()
            ),
            Err(failure) => log::info!(
                "❌ 提交 #{} 失败 - {}（{}）total={}ms",
                pending.id,
                failure.kind(),
                failure.code(),
                elapsed.as_millis()
            ),
        }

        SubmissionOutcome {
            id: pending.id,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureKind;
    use crate::prediction::client::TransportError;
    use crate::prediction::wire::ServiceReply;
    use bytes::Bytes;
    use std::cell::Cell;

    struct ScriptedService {
        reply: Result<ServiceReply, TransportError>,
        calls: Cell<u32>,
    }

    impl PredictionService for ScriptedService {
        async fn send(&self, _payload: &SubmissionPayload) -> Result<ServiceReply, TransportError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    fn pending(id: u64) -> PendingSubmission {
        PendingSubmission::new(
            id,
            SubmissionPayload {
                bytes: Bytes::from_static(b"img"),
                media_type: "image/png".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn transport_failure_is_network_failure() {
        let lifecycle = PredictionLifecycle::new(ScriptedService {
            reply: Err(TransportError("connection refused".into())),
            calls: Cell::new(0),
        });

        let outcome = lifecycle.run(pending(3)).await;

        assert_eq!(outcome.id, 3);
        assert_eq!(outcome.result.unwrap_err().kind(), FailureKind::NetworkFailure);
        assert_eq!(lifecycle.service().calls.get(), 1);
    }

    #[tokio::test]
    async fn success_reply_yields_prediction() {
        let lifecycle = PredictionLifecycle::new(ScriptedService {
            reply: Ok(ServiceReply {
                status: 200,
                reason: Some("OK".into()),
                body: Bytes::from_static(br#"{"prediction":"ramen"}"#),
            }),
            calls: Cell::new(0),
        });

        let outcome = lifecycle.run(pending(1)).await;

        assert_eq!(outcome.result.expect("prediction").label, "ramen");
        assert_eq!(lifecycle.service().calls.get(), 1);
    }
}
