//! End-to-end curation passes feeding the knowledge base.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use helpdesk_curation::{AnswerLengthEvaluator, CurationEngine, DrainPolicy, UncertaintyQueue};
use helpdesk_embeddings::HashingProvider;
use helpdesk_retrieval::RetrievalOrchestrator;

fn queued_queries() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Do you ship to Canada?", "We may ship there."),
        ("Can I ship my order overseas?", "Possibly, unsure."),
        ("What courier delivers my parcel?", "A courier does."),
        ("Is there a student discount?", "Maybe ask sales."),
        ("Do veterans get a discount?", "Not sure about that."),
        ("Can I pay with cryptocurrency?", "Probably not."),
        ("Do you accept bank transfers?", "Perhaps."),
        ("Is my payment data stored?", "It might be."),
        ("How do I delete my account?", "There is a way."),
        ("Can I change my account email?", "Likely yes."),
        ("Why was my account locked?", "Hard to say."),
        ("How do I export my account data?", "Somehow."),
    ]
}

async fn orchestrator() -> RetrievalOrchestrator {
    let orchestrator = RetrievalOrchestrator::builder()
        .with_provider(Arc::new(HashingProvider::new()))
        .build()
        .unwrap();
    orchestrator
        .seed(&["Our store hours are 9 AM to 5 PM, Monday to Friday.".to_string()])
        .await
        .unwrap();
    orchestrator
}

#[tokio::test]
async fn small_queue_short_circuits_and_promotes_everything() {
    let orchestrator = orchestrator().await;
    let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
    let mut queue = UncertaintyQueue::new(DrainPolicy::Clear);

    for (query, answer) in queued_queries().into_iter().take(3) {
        queue.record(query, answer, true);
    }

    let promoted = engine.run_pass(&mut queue, &orchestrator).await.unwrap();

    assert_eq!(promoted, 3);
    assert!(queue.is_empty());
    assert_eq!(orchestrator.stats().await.entries, 4);
}

#[tokio::test]
async fn full_queue_is_reduced_to_one_representative_per_cluster() {
    let orchestrator = orchestrator().await;
    let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
    let mut queue = UncertaintyQueue::new(DrainPolicy::Clear);

    let evaluator = AnswerLengthEvaluator::default();
    for (query, answer) in queued_queries() {
        queue.observe(query, answer, &evaluator);
    }
    assert_eq!(queue.len(), 12);

    let promoted = engine.run_pass(&mut queue, &orchestrator).await.unwrap();

    assert_eq!(promoted, 5);
    assert!(queue.is_empty());
    assert_eq!(orchestrator.stats().await.entries, 6);
}

#[tokio::test]
async fn snapshot_queue_reprocesses_the_same_cases() {
    let orchestrator = orchestrator().await;
    let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
    let mut queue = UncertaintyQueue::new(DrainPolicy::Snapshot);

    for (query, answer) in queued_queries().into_iter().take(2) {
        queue.record(query, answer, true);
    }

    let first = engine.run_pass(&mut queue, &orchestrator).await.unwrap();
    let second = engine.run_pass(&mut queue, &orchestrator).await.unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 2);
    assert_eq!(queue.len(), 2);
    assert_eq!(orchestrator.stats().await.entries, 5);
}

#[tokio::test]
async fn empty_queue_pass_is_a_no_op() {
    let orchestrator = orchestrator().await;
    let engine = CurationEngine::with_defaults(Arc::new(HashingProvider::new()));
    let mut queue = UncertaintyQueue::default();

    let promoted = engine.run_pass(&mut queue, &orchestrator).await.unwrap();

    assert_eq!(promoted, 0);
    assert_eq!(orchestrator.stats().await.entries, 1);
}
