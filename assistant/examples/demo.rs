//! Minimal end-to-end demo wired entirely to offline components.
//!
//! Run with: cargo run -p helpdesk-assistant --example demo

use std::sync::Arc;

use helpdesk_assistant::{Assistant, ExtractiveResponder, RetrievalOrchestrator};
use helpdesk_curation::CurationEngine;
use helpdesk_embeddings::{EmbeddingProvider, HashingProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(HashingProvider::new());

    let orchestrator = RetrievalOrchestrator::builder()
        .with_provider(Arc::clone(&provider))
        .build()?;
    orchestrator
        .seed(&[
            "Our store hours are 9 AM to 5 PM, Monday to Friday.".to_string(),
            "To reset your password, click on the 'Forgot Password' link on the login page."
                .to_string(),
            "We offer refunds within 30 days of purchase with a valid receipt.".to_string(),
            "Our product warranty covers manufacturing defects for one year from the date of purchase."
                .to_string(),
            "For technical support, please email support@example.com or call 0800-123-4567."
                .to_string(),
        ])
        .await?;

    let assistant = Assistant::builder()
        .with_orchestrator(orchestrator)
        .with_responder(Arc::new(ExtractiveResponder))
        .build()?;

    for query in [
        "What are your hours?",
        "How do I reset my password?",
        "Thanks, can I still get a refund?",
    ] {
        let reply = assistant.answer(query).await?;
        println!("Q: {query}");
        println!("A: {reply}\n");
    }

    let engine = CurationEngine::with_defaults(provider);
    let promoted = assistant.curate(&engine).await?;
    println!("curation pass promoted {promoted} cases");

    let summary = assistant.interaction_summary().await;
    println!(
        "answered {} queries, mean latency {:.1}ms",
        summary.total, summary.mean_response_ms
    );

    Ok(())
}
