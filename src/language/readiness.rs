//! One-time asynchronous grammar readiness.
//!
//! Loading a grammar touches the filesystem and compiles queries, so it runs
//! on a background thread. The result is delivered exactly once over a
//! oneshot channel; the language mode polls or awaits it.

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use super::grammar::Grammar;
use crate::config::LanguageConfig;
use crate::error::{HighlightError, HighlightResult};

/// Readiness of a language mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// A grammar that is still being loaded
#[derive(Debug)]
pub struct PendingGrammar {
    language: String,
    receiver: oneshot::Receiver<HighlightResult<Grammar>>,
}

impl PendingGrammar {
    /// A pending grammar resolved from the start
    pub fn resolved(language: impl Into<String>, result: HighlightResult<Grammar>) -> Self {
        let (sender, receiver) = oneshot::channel();
        // The receiver is alive, so sending cannot fail
        let _ = sender.send(result);
        Self {
            language: language.into(),
            receiver,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Take the result if the loader has finished
    pub fn try_take(&mut self) -> Option<HighlightResult<Grammar>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(self.loader_gone())),
        }
    }

    pub async fn wait(self) -> HighlightResult<Grammar> {
        let error = self.loader_gone();
        self.receiver.await.unwrap_or(Err(error))
    }

    /// Block the current thread until the loader finishes.
    ///
    /// Panics if called from within an asynchronous runtime.
    pub fn block(self) -> HighlightResult<Grammar> {
        let error = self.loader_gone();
        self.receiver.blocking_recv().unwrap_or(Err(error))
    }

    fn loader_gone(&self) -> HighlightError {
        HighlightError::language_load(&self.language, "loader exited without a result")
    }
}

pub struct GrammarLoader;

impl GrammarLoader {
    /// Load `language` from `config` on a background thread
    pub fn spawn(language: &str, config: LanguageConfig, search_paths: Vec<String>) -> PendingGrammar {
        let name = language.to_string();
        Self::spawn_with(language, move || Grammar::load(&name, &config, &search_paths))
    }

    /// Run an arbitrary grammar constructor on a background thread
    pub fn spawn_with<F>(language: &str, load: F) -> PendingGrammar
    where
        F: FnOnce() -> HighlightResult<Grammar> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let thread_language = language.to_string();
        let spawned = std::thread::Builder::new()
            .name(format!("irodori-load-{language}"))
            .spawn(move || {
                let result = load();
                if let Err(err) = &result {
                    log::error!(target: "irodori::language", "{}", err);
                }
                if sender.send(result).is_err() {
                    log::debug!(
                        target: "irodori::language",
                        "Grammar for {} loaded after its mode was dropped",
                        thread_language
                    );
                }
            });

        match spawned {
            Ok(_) => PendingGrammar {
                language: language.to_string(),
                receiver,
            },
            Err(err) => PendingGrammar::resolved(
                language,
                Err(HighlightError::language_load(
                    language,
                    format!("failed to spawn loader thread: {err}"),
                )),
            ),
        }
    }
}
