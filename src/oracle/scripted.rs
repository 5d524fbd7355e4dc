// src/oracle/scripted.rs

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::OracleError;
use crate::oracle::Oracle;

/// Replays canned completions in order, then repeats the last one.
///
/// Used for offline runs and tests. Every prompt it receives is kept so
/// callers can check how many times the oracle was consulted.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Queue a transport failure as the next reply.
    pub fn then_fail(self, reason: &str) -> Self {
        self.lock_replies().push_back(Err(reason.to_string()));
        self
    }

    pub fn then_reply(self, text: &str) -> Self {
        self.lock_replies().push_back(Ok(text.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, String>>> {
        self.replies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Oracle for ScriptedOracle {
    fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let reply = match self.lock_replies().pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last.clone().unwrap_or_else(|| Ok(String::new())),
        };

        reply.map_err(OracleError::Unavailable)
    }
}
