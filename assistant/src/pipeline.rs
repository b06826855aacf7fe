//! The end-to-end answering pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use helpdesk_curation::{
    AnswerLengthEvaluator, CertaintyEvaluator, CurationEngine, UncertaintyQueue,
};
use helpdesk_retrieval::RetrievalOrchestrator;

use crate::analytics::{InteractionLog, InteractionSummary};
use crate::error::{AssistantError, Result};
use crate::responder::Responder;
use crate::sentiment::{
    DEFAULT_CONFIDENCE_THRESHOLD, LexiconAnalyzer, SentimentAnalyzer, gate, personalize,
};

/// Configuration for the assistant pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Confidence a sentiment label needs before it affects phrasing.
    pub sentiment_threshold: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            sentiment_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// The assistant: one `answer` call runs the whole pipeline.
///
/// Retrieval degrades gracefully (empty context), generation errors
/// propagate; mapping those to a user-facing apology is the host UI's
/// business, not ours.
pub struct Assistant {
    orchestrator: RetrievalOrchestrator,
    responder: Arc<dyn Responder>,
    analyzer: Arc<dyn SentimentAnalyzer>,
    evaluator: Arc<dyn CertaintyEvaluator>,
    queue: Arc<RwLock<UncertaintyQueue>>,
    log: RwLock<InteractionLog>,
    config: AssistantConfig,
}

impl Assistant {
    /// Create a new assistant builder.
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::new()
    }

    /// Answer a customer query.
    ///
    /// Retrieves context, generates a reply, phrases it to match the
    /// query's sentiment, and queues the raw answer for curation when the
    /// certainty evaluator flags it.
    pub async fn answer(&self, query: &str) -> Result<String> {
        let started = Instant::now();

        let context = self.orchestrator.get_context(query).await;
        let context_text = context.join(" ");
        let raw = self.responder.generate(&context_text, query).await?;

        let (label, score) = self.analyzer.analyze(query);
        let sentiment = gate(label, score, self.config.sentiment_threshold);
        let reply = personalize(&raw, sentiment, query);

        {
            let mut queue = self.queue.write().await;
            queue.observe(query, &raw, self.evaluator.as_ref());
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.log.write().await.record(query, elapsed_ms, sentiment);
        debug!("answered query in {elapsed_ms}ms with sentiment {sentiment:?}");

        Ok(reply)
    }

    /// One curation pass over the queued uncertain cases.
    ///
    /// The queue lock is held only long enough to drain, so answering is
    /// never blocked behind clustering.
    pub async fn curate(&self, engine: &CurationEngine) -> Result<usize> {
        let cases = {
            let mut queue = self.queue.write().await;
            queue.drain()
        };
        if cases.is_empty() {
            return Ok(0);
        }
        let representatives = engine.select_representatives(&cases).await?;
        engine.promote(&representatives, &self.orchestrator).await?;
        Ok(representatives.len())
    }

    /// Run curation passes on a fixed interval until the handle is aborted.
    pub fn spawn_curation(
        self: Arc<Self>,
        engine: CurationEngine,
        every: Duration,
    ) -> JoinHandle<()> {
        let assistant = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match assistant.curate(&engine).await {
                    Ok(promoted) if promoted > 0 => {
                        info!("curation pass promoted {promoted} cases");
                    }
                    Ok(_) => {}
                    Err(err) => warn!("curation pass failed: {err}"),
                }
            }
        })
    }

    /// The retrieval orchestrator, for seeding and stats.
    pub fn orchestrator(&self) -> &RetrievalOrchestrator {
        &self.orchestrator
    }

    /// Number of queued uncertain cases.
    pub async fn queued_cases(&self) -> usize {
        self.queue.read().await.len()
    }

    /// Aggregates over the interactions answered so far.
    pub async fn interaction_summary(&self) -> InteractionSummary {
        self.log.read().await.summary()
    }
}

/// Builder for the assistant pipeline.
pub struct AssistantBuilder {
    orchestrator: Option<RetrievalOrchestrator>,
    responder: Option<Arc<dyn Responder>>,
    analyzer: Arc<dyn SentimentAnalyzer>,
    evaluator: Arc<dyn CertaintyEvaluator>,
    queue: UncertaintyQueue,
    config: AssistantConfig,
}

impl AssistantBuilder {
    /// Create a new builder with offline defaults for the pluggable seams.
    pub fn new() -> Self {
        Self {
            orchestrator: None,
            responder: None,
            analyzer: Arc::new(LexiconAnalyzer),
            evaluator: Arc::new(AnswerLengthEvaluator::default()),
            queue: UncertaintyQueue::default(),
            config: AssistantConfig::default(),
        }
    }

    /// Set the retrieval orchestrator.
    pub fn with_orchestrator(mut self, orchestrator: RetrievalOrchestrator) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    /// Set the responder.
    pub fn with_responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Set the sentiment analyzer.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn SentimentAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set the certainty evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn CertaintyEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Set the uncertainty queue (drain policy included).
    pub fn with_queue(mut self, queue: UncertaintyQueue) -> Self {
        self.queue = queue;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the assistant.
    pub fn build(self) -> Result<Assistant> {
        let orchestrator = self
            .orchestrator
            .ok_or(AssistantError::OrchestratorNotConfigured)?;
        let responder = self.responder.ok_or(AssistantError::ResponderNotConfigured)?;
        Ok(Assistant {
            orchestrator,
            responder,
            analyzer: self.analyzer,
            evaluator: self.evaluator,
            queue: Arc::new(RwLock::new(self.queue)),
            log: RwLock::new(InteractionLog::new()),
            config: self.config,
        })
    }
}

impl Default for AssistantBuilder {
    fn default() -> Self {
        Self::new()
    }
}
