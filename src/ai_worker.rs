use crate::ai::{suggest_questions, SuggestionSource};
use crate::models::{ModuleId, Question};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRequest {
    pub module_id: ModuleId,
    pub module_title: String,
    pub sub_topic: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionResponse {
    pub module_id: ModuleId,
    pub sub_topic: String,
    pub outcome: Result<Vec<Question>, String>,
}

/// Answers every request exactly once, in order. Exits when the request
/// channel disconnects.
pub fn spawn_ai_worker(
    source: Arc<dyn SuggestionSource>,
    response_tx: Sender<SuggestionResponse>,
    request_rx: Receiver<SuggestionRequest>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("exam-prep::ai_worker".to_string())
        .spawn(move || {
            let runtime = tokio::runtime::Runtime::new();
            for request in request_rx.iter() {
                tracing::debug!(
                    "Worker received suggestion request for {} / {}",
                    request.module_title,
                    request.sub_topic
                );
                let outcome = match &runtime {
                    Ok(rt) => rt
                        .block_on(suggest_questions(
                            source.as_ref(),
                            &request.module_title,
                            &request.sub_topic,
                        ))
                        .map_err(|e| e.to_string()),
                    Err(e) => Err(format!("Failed to start async runtime: {}", e)),
                };
                if let Err(e) = &outcome {
                    tracing::warn!("Worker error: {}", e);
                }
                let response = SuggestionResponse {
                    module_id: request.module_id,
                    sub_topic: request.sub_topic,
                    outcome,
                };
                if response_tx.send(response).is_err() {
                    break;
                }
            }
            tracing::debug!("Worker channel disconnected, exiting");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::suggester::MockSuggestionSource;
    use std::time::Duration;

    fn request(sub_topic: &str) -> SuggestionRequest {
        SuggestionRequest {
            module_id: 3,
            module_title: "Scanning Networks".to_string(),
            sub_topic: sub_topic.to_string(),
        }
    }

    #[test]
    fn test_each_request_answered_once_in_order() {
        let source = Arc::new(MockSuggestionSource {
            response: Ok(r#"[{"question": "Q?", "options": ["a", "b"], "correctAnswer": "a"}]"#.to_string()),
            delay: Duration::from_millis(10),
        });
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();
        let handle = spawn_ai_worker(source, response_tx, request_rx).unwrap();

        request_tx.send(request("A")).unwrap();
        request_tx.send(request("B")).unwrap();
        drop(request_tx);

        let first = response_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = response_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(first.sub_topic, "A");
        assert_eq!(second.sub_topic, "B");
        assert_eq!(first.outcome.unwrap().len(), 1);

        handle.join().unwrap();
        assert!(response_rx.try_recv().is_err());
    }

    #[test]
    fn test_failures_come_back_as_messages() {
        let source = Arc::new(MockSuggestionSource {
            response: Err("offline".to_string()),
            delay: Duration::ZERO,
        });
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (response_tx, response_rx) = crossbeam_channel::unbounded();
        let _handle = spawn_ai_worker(source, response_tx, request_rx).unwrap();

        request_tx.send(request("A")).unwrap();
        let response = response_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            response.outcome,
            Err("Question suggestion failed: offline".to_string())
        );
    }
}
