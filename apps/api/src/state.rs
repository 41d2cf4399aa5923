use std::sync::Arc;

use crate::analysis::session::SessionRegistry;
use crate::analysis::AnalysisEngine;
use crate::config::Config;
use crate::matching::KeywordScorer;
use crate::skills::SkillLexicon;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Lexicon, scorer and limits. The scorer is pluggable behind the
    /// `Scorer` trait; `KeywordScorer` is the default.
    pub engine: Arc<AnalysisEngine>,
    /// Analyzer view per session, plus supersession of in-flight analyses.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, lexicon: SkillLexicon) -> Self {
        let engine = AnalysisEngine::new(
            lexicon,
            Arc::new(KeywordScorer),
            config.max_file_bytes,
            config.max_files_per_request,
        );
        let sessions = SessionRegistry::new(config.max_sessions);
        AppState {
            config,
            engine: Arc::new(engine),
            sessions: Arc::new(sessions),
        }
    }
}
