//! Text-generation collaborator seam.
//!
//! Stub generation and analysis may ask an external text generator for a
//! nicer answer. The generator is unreliable by nature: missing programs,
//! crashes and timeouts are ordinary outcomes, and callers always have a
//! local fallback.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::debug;
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::db::GeneratorConfig;

/// Environment variable through which the token budget reaches a command generator.
pub const MAX_TOKENS_ENV: &str = "WORKBENCH_MAX_TOKENS";

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Text generator unavailable: {0}")]
    Unavailable(String),
    #[error("Text generator timed out after {0:?}")]
    Timeout(Duration),
    #[error("Text generator failed: {0}")]
    Failed(String),
    #[error("Text generator I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait implemented by text-generation collaborators.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GeneratorError>;
    fn name(&self) -> &str;
}

/// Generator used when nothing is configured; every call reports `Unavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGenerator;

impl TextGenerator for NoopGenerator {
    fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable("no text generator configured".into()))
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Generator backed by an external program.
///
/// The prompt is written to the child's stdin and the generated text is read
/// from its stdout. The child is killed if it exceeds the configured timeout.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    config: GeneratorConfig,
}

impl CommandGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String, GeneratorError> {
        if self.config.command.trim().is_empty() {
            return Err(GeneratorError::Unavailable("generator command is empty".into()));
        }

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .env(MAX_TOKENS_ENV, max_tokens.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                GeneratorError::Unavailable(format!(
                    "failed to spawn {}: {e}",
                    self.config.command
                ))
            })?;

        // Feed stdin and drain stdout off-thread so a chatty or stuck child
        // cannot block us past the timeout.
        if let Some(mut stdin) = child.stdin.take() {
            let prompt = prompt.to_string();
            thread::spawn(move || {
                let _ = stdin.write_all(prompt.as_bytes());
            });
        }
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| GeneratorError::Failed("child stdout was not captured".into()))?;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let res = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(res);
        });

        let timeout = self.timeout();
        let output = match rx.recv_timeout(timeout) {
            Ok(res) => res?,
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GeneratorError::Timeout(timeout));
            }
        };

        let status = child.wait()?;
        if !status.success() {
            return Err(GeneratorError::Failed(format!(
                "{} exited with {status}",
                self.config.command
            )));
        }

        let text = String::from_utf8(output)
            .map_err(|_| GeneratorError::Failed("generator output is not valid UTF-8".into()))?;
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.config.command
    }
}

/// Explicitly passed handle to the workspace's text generator.
///
/// The concrete generator is built on first use and then reused; the
/// `OnceCell` guarantees a single construction even under concurrent access.
#[derive(Debug, Default)]
pub struct GeneratorHandle {
    config: Option<GeneratorConfig>,
    cell: OnceCell<Box<dyn TextGenerator>>,
}

impl std::fmt::Debug for dyn TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextGenerator({})", self.name())
    }
}

impl GeneratorHandle {
    pub fn new(config: Option<GeneratorConfig>) -> Self {
        Self { config, cell: OnceCell::new() }
    }

    /// Handle that never reaches a collaborator.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Wrap an already constructed generator (useful for tests and embedding).
    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(generator);
        Self { config: None, cell }
    }

    pub fn config(&self) -> Option<&GeneratorConfig> {
        self.config.as_ref()
    }

    /// Token budget to request from the generator.
    pub fn max_tokens(&self) -> usize {
        self.config.as_ref().map(|c| c.max_tokens).unwrap_or(crate::db::DEFAULT_MAX_TOKENS)
    }

    pub fn get(&self) -> &dyn TextGenerator {
        self.cell
            .get_or_init(|| match &self.config {
                Some(cfg) => {
                    debug!("initializing command text generator: {}", cfg.command);
                    Box::new(CommandGenerator::new(cfg.clone()))
                }
                None => Box::new(NoopGenerator),
            })
            .as_ref()
    }
}
