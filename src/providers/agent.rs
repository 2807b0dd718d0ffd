/*!
 * Subprocess agent provider.
 *
 * Drives a coding-agent CLI (`codex exec`) as the translation backend: the
 * prompt goes in on stdin, the output is constrained by a JSON schema and
 * written to a file the agent is told about. A non-zero exit fails the batch
 * attempt with the tail of the captured output for diagnosis.
 */

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::errors::ProviderError;
use crate::translator::system_instruction;

use super::{build_user_prompt, parse_translations, tail, TranslationProvider};

const DEFAULT_PROGRAM: &str = "codex";
const CAPTURE_TAIL_CHARS: usize = 2000;

/// Provider that shells out to an agent CLI for each batch
#[derive(Debug, Clone)]
pub struct AgentProvider {
    /// Agent executable name or path
    program: String,
    /// Optional model identifier forwarded to the agent
    model: Option<String>,
}

impl AgentProvider {
    /// Create a provider using the default agent executable.
    pub fn new(model: Option<String>) -> Self {
        Self::with_program(DEFAULT_PROGRAM, model)
    }

    /// Create a provider with an explicit executable.
    pub fn with_program(program: impl Into<String>, model: Option<String>) -> Self {
        Self {
            program: program.into(),
            model,
        }
    }
}

#[async_trait]
impl TranslationProvider for AgentProvider {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let dir = tempfile::tempdir()
            .map_err(|e| ProviderError::RequestFailed(format!("failed to create temp dir: {}", e)))?;
        let schema_path = dir.path().join("schema.json");
        let out_path = dir.path().join("out.json");

        let schema = json!({
            "type": "object",
            "properties": {
                "translations": {
                    "type": "array",
                    "items": { "type": "string" },
                }
            },
            "required": ["translations"],
            "additionalProperties": false,
        });
        std::fs::write(&schema_path, schema.to_string())
            .map_err(|e| ProviderError::RequestFailed(format!("failed to write schema: {}", e)))?;

        let prompt = format!("{}\n\n{}", system_instruction(), build_user_prompt(texts)?);

        let mut command = Command::new(&self.program);
        command
            .arg("exec")
            .arg("--skip-git-repo-check")
            .arg("--sandbox")
            .arg("workspace-write")
            .arg("--output-schema")
            .arg(&schema_path)
            .arg("--output-last-message")
            .arg(&out_path);
        if let Some(model) = &self.model {
            command.arg("-m").arg(model);
        }
        command
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| ProviderError::RequestFailed(format!("failed to spawn {}: {}", self.program, e)))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| ProviderError::RequestFailed(format!("failed to write agent prompt: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("failed to wait for agent: {}", e)))?;
        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::AgentFailed {
                exit_code: output.status.code().unwrap_or(-1),
                detail: format!(
                    "stdout: {} | stderr: {}",
                    tail(&stdout, CAPTURE_TAIL_CHARS),
                    tail(&stderr, CAPTURE_TAIL_CHARS)
                ),
            });
        }

        let raw = std::fs::read_to_string(&out_path)
            .map_err(|_| ProviderError::ParseError("agent output file missing".to_string()))?;
        parse_translations(&raw)
    }

    fn name(&self) -> &'static str {
        "agent"
    }
}
