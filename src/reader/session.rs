use std::sync::Arc;

use tracing::{info, warn};

use crate::error::LoadError;
use crate::models::DocumentSnapshot;
use crate::stages::{build_document, PipelineConfig};

use super::{Playback, ReaderConfig};

/// A reading session: the pipeline configuration plus playback over the
/// currently loaded snapshot
#[derive(Debug, Clone)]
pub struct Session {
    pipeline: PipelineConfig,
    playback: Playback,
}

impl Session {
    pub fn new(pipeline: PipelineConfig, reader: &ReaderConfig) -> Self {
        Self {
            pipeline,
            playback: Playback::new(Arc::new(DocumentSnapshot::empty()), reader),
        }
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    pub fn into_playback(self) -> Playback {
        self.playback
    }

    pub fn snapshot(&self) -> &Arc<DocumentSnapshot> {
        self.playback.snapshot()
    }

    /// Run the pipeline without touching the session
    pub fn prepare(&self, raw: &str) -> Arc<DocumentSnapshot> {
        Arc::new(build_document(raw, &self.pipeline))
    }

    /// Load the outcome of a document acquisition.
    ///
    /// The current snapshot and position are replaced only on success; a
    /// failed load, or text that yields no tokens, leaves them untouched.
    pub fn load_from(
        &mut self,
        acquired: Result<String, LoadError>,
        source_name: &str,
    ) -> Result<Arc<DocumentSnapshot>, LoadError> {
        let raw = acquired.inspect_err(|err| {
            warn!("Load of {} failed ({}): {}", source_name, err.category(), err);
        })?;

        let snapshot = self.prepare(&raw);
        if snapshot.document.is_empty() {
            warn!("Load of {} produced no tokens", source_name);
            return Err(LoadError::Empty {
                source_name: source_name.to_string(),
            });
        }

        info!(
            "Loaded {}: {} tokens in {} paragraphs",
            source_name,
            snapshot.total_tokens(),
            snapshot.paragraph_count()
        );
        self.playback.load(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Load raw text directly
    pub fn load_text(&mut self, raw: &str) -> Result<Arc<DocumentSnapshot>, LoadError> {
        self.load_from(Ok(raw.to_string()), "pasted text")
    }

    /// Drop the loaded document
    pub fn clear(&mut self) {
        self.playback.load(Arc::new(DocumentSnapshot::empty()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(PipelineConfig::default(), &ReaderConfig::default())
    }

    #[test]
    fn test_failed_load_keeps_prior_state() {
        let mut session = session();
        let first = session.load_text("one two three").unwrap();
        session.playback_mut().seek(2);

        let err = session
            .load_from(
                Err(LoadError::Network {
                    message: "timed out".to_string(),
                }),
                "https://example.com",
            )
            .unwrap_err();
        assert_eq!(err.category(), "network");
        assert_eq!(session.snapshot().id, first.id);
        assert_eq!(session.playback().state().current_index, 2);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let mut session = session();
        let first = session.load_text("kept").unwrap();
        let err = session.load_text("   \n\n ").unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
        assert_eq!(session.snapshot().id, first.id);
    }

    #[test]
    fn test_clear() {
        let mut session = session();
        session.load_text("one two").unwrap();
        session.clear();
        assert!(session.snapshot().document.is_empty());
    }
}
