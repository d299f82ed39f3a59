//! Conversation controller: one user message in, one `{tasks, reply}` out.
//!
//! Per session the controller moves through
//! `QUESTIONING -> READY -> GENERATED`, and from `GENERATED` handles edits,
//! regeneration, "start over" and ordinary follow-up talk. Every outward
//! response goes through the assembler, and every upstream failure is
//! replaced by a fallback so the user always gets an answer.

use std::sync::Arc;
use std::time::Duration;

use ts_domain::config::{ConversationConfig, LlmConfig};
use ts_domain::error::{Error, Result};
use ts_domain::task::{Task, TaskDomain};
use ts_domain::tool::Message;
use ts_domain::trace::{TaskSource, TraceEvent};
use ts_providers::{ChatRequest, ChatResponse, LlmProvider};
use ts_sessions::{EditRequest, Session, SessionStore};
use ts_tasks::fallback::fallback_task_at;
use ts_tasks::{
    assemble, assemble_dialogue, coerce_task, fallback_question, fallback_tasks, AssemblyOutcome, ModelTaskPayload,
    TaskLimits, TurnResponse,
};

use crate::insight::InsightProvider;

use super::intent::{self, FollowUp, ReadinessInput};
use super::prompts;
use super::session_lock::SessionLockMap;
use super::tools::{research_tool, run_research};

/// Reply used when follow-up conversation cannot reach the model.
pub const CONTINUE_FALLBACK_REPLY: &str = "I'm here to help with your tasks. You can ask me to \
     edit one (for example \"change task 2\") or to start over with a new project.";

/// Prefix that marks an edit the model returned unchanged.
const UPDATED_PREFIX: &str = "Updated: ";
const REVISION_NOTE: &str = "(Revised per your request.)";

/// What a branch of the state machine did with the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnKind {
    /// Asked a question or talked; the task set is untouched.
    Dialogue,
    /// Generated, regenerated or edited the task set.
    Generation,
}

/// Sampling settings applied to every model call.
#[derive(Debug, Clone, Copy)]
struct Sampling {
    temperature: f32,
    max_tokens: u32,
}

pub struct ConversationController {
    llm: Arc<dyn LlmProvider>,
    insight: Arc<dyn InsightProvider>,
    sessions: Arc<dyn SessionStore>,
    locks: SessionLockMap,
    config: ConversationConfig,
    limits: TaskLimits,
    sampling: Sampling,
}

impl ConversationController {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        insight: Arc<dyn InsightProvider>,
        sessions: Arc<dyn SessionStore>,
        config: ConversationConfig,
        llm_config: &LlmConfig,
    ) -> Self {
        Self {
            llm,
            insight,
            sessions,
            locks: SessionLockMap::new(),
            limits: TaskLimits::from(&config),
            config,
            sampling: Sampling {
                temperature: llm_config.temperature,
                max_tokens: llm_config.max_tokens,
            },
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Process one user message for `session_id`, creating the session on
    /// first use. Turns for the same session are serialized.
    ///
    /// Only a failure to acquire the session lock is returned as an error;
    /// model and insight failures are absorbed into fallbacks.
    pub async fn handle_message(&self, session_id: &str, message: &str) -> Result<TurnResponse> {
        let _permit = self
            .locks
            .acquire(session_id)
            .await
            .map_err(|e| Error::Session(e.to_string()))?;

        let (mut session, _) = self.sessions.get_or_create(session_id);
        session.push(Message::user(message));

        if session.domain().is_none() {
            let domain = intent::classify_domain(message);
            session.classify_once(domain);
            TraceEvent::DomainClassified {
                session_id: session_id.to_string(),
                domain,
            }
            .emit();
        }
        let domain = session.domain_or_general();

        let (raw, kind) = if session.has_tasks() {
            self.after_generation(&mut session, message).await
        } else {
            self.before_generation(&mut session, message).await
        };

        let assembly = match kind {
            TurnKind::Dialogue => assemble_dialogue(raw.reply),
            TurnKind::Generation => assemble(raw, domain, self.limits),
        };
        if kind == TurnKind::Generation
            && assembly.outcome == AssemblyOutcome::Tasks
            && session.last_task_set.as_ref() != Some(&assembly.response.tasks)
        {
            // Tasks recovered from reply text become the current set.
            session.store_generated_tasks(assembly.response.tasks.clone());
            TraceEvent::TasksGenerated {
                session_id: session_id.to_string(),
                source: TaskSource::Model,
                count: assembly.response.tasks.len(),
            }
            .emit();
        }

        self.sessions.save(session);
        Ok(assembly.response)
    }

    /// Remove a session. Waits for any in-flight turn on it to finish.
    pub async fn clear(&self, session_id: &str) -> Result<bool> {
        let existed = {
            let _permit = self
                .locks
                .acquire(session_id)
                .await
                .map_err(|e| Error::Session(e.to_string()))?;
            self.sessions.delete(session_id)
        };
        self.locks.forget(session_id);
        Ok(existed)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // QUESTIONING / READY
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn before_generation(
        &self,
        session: &mut Session,
        message: &str,
    ) -> (TurnResponse, TurnKind) {
        let readiness = intent::evaluate_readiness(
            &ReadinessInput {
                latest_message: message,
                user_messages: session.user_message_count(),
                questions_asked: session.progress.questions_asked(),
                last_reply_asked: session.last_assistant_text().is_some_and(intent::is_question),
                already_ready: session.progress.ready_for_tasks(),
            },
            &self.config,
        );
        TraceEvent::ReadinessEvaluated {
            session_id: session.session_id.clone(),
            user_messages: session.user_message_count(),
            questions_asked: session.progress.questions_asked(),
            ready: readiness.is_ready(),
            reason: readiness.as_str().to_string(),
        }
        .emit();

        if readiness.is_ready() {
            session.progress.mark_ready();
            return (self.generate(session, None).await, TurnKind::Generation);
        }
        self.ask_question(session).await
    }

    async fn ask_question(&self, session: &mut Session) -> (TurnResponse, TurnKind) {
        let req = self
            .request(prompts::questioning(session))
            .with_tools(vec![research_tool()]);
        let first = match self.llm.chat(&req).await {
            Ok(resp) => resp,
            Err(e) => {
                return (self.ask_fallback_question(session, &e.to_string()), TurnKind::Dialogue)
            }
        };

        let resp = if let Some(call) = first.tool_calls.first().cloned() {
            // One tool round-trip at most: the follow-up request carries no tools.
            session.push(Message::assistant_tool_calls(
                first.content.clone(),
                std::slice::from_ref(&call),
            ));
            let outcome = run_research(self.insight.as_ref(), &session.session_id, &call).await;
            session.push(Message::tool_result(
                call.call_id.clone(),
                call.tool_name.clone(),
                outcome.content,
            ));
            if let Some(found) = outcome.insight {
                if session.domain() == Some(TaskDomain::Website) {
                    session.cache_insight(found);
                }
            }

            match self.llm.chat(&self.request(prompts::questioning(session))).await {
                Ok(resp) => resp,
                Err(e) => {
                    return (self.ask_fallback_question(session, &e.to_string()), TurnKind::Dialogue)
                }
            }
        } else {
            first
        };

        self.finish_question(session, resp).await
    }

    async fn finish_question(
        &self,
        session: &mut Session,
        resp: ChatResponse,
    ) -> (TurnResponse, TurnKind) {
        let text = resp.content.trim();
        if intent::has_ready_marker(text) {
            tracing::debug!(session_id = %session.session_id, "model signalled readiness");
            session.progress.mark_ready();
            return (self.generate(session, None).await, TurnKind::Generation);
        }
        if text.is_empty() {
            return (
                self.ask_fallback_question(session, "empty model reply"),
                TurnKind::Dialogue,
            );
        }

        session.push(Message::assistant(text));
        if intent::is_question(text) {
            session.progress.record_question();
        }
        (TurnResponse::reply(text), TurnKind::Dialogue)
    }

    fn ask_fallback_question(&self, session: &mut Session, reason: &str) -> TurnResponse {
        tracing::warn!(session_id = %session.session_id, reason, "using fallback question");
        TraceEvent::FallbackUsed {
            session_id: session.session_id.clone(),
            branch: "question".into(),
            reason: reason.to_string(),
        }
        .emit();

        let question = fallback_question(session.domain_or_general());
        session.push(Message::assistant(question));
        session.progress.record_question();
        TurnResponse::reply(question)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Generation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn generate(&self, session: &mut Session, previous: Option<Vec<Task>>) -> TurnResponse {
        let domain = session.domain_or_general();
        let req = self
            .request(prompts::generation(session, previous.as_deref()))
            .json();

        let raw = match self.timed_chat(&req).await {
            Ok(resp) => resp.content,
            Err(e) => return self.fallback_generation(session, &e.to_string()),
        };

        let parsed = ModelTaskPayload::parse(&raw).into_response();
        let candidates = parsed.tasks.len();
        let assembly = assemble(parsed, domain, self.limits);
        match assembly.outcome {
            AssemblyOutcome::Tasks => {
                self.store_tasks(session, assembly.response.tasks, TaskSource::Model)
            }
            AssemblyOutcome::Questions => {
                TraceEvent::QuestionnaireDetected {
                    session_id: session.session_id.clone(),
                    candidates,
                }
                .emit();
                let reply = assembly.response.reply.unwrap_or_default();
                session.push(Message::assistant(reply.clone()));
                session.progress.record_question();
                TurnResponse::reply(reply)
            }
            AssemblyOutcome::Reply => self.fallback_generation(session, "no tasks in model output"),
        }
    }

    fn fallback_generation(&self, session: &mut Session, reason: &str) -> TurnResponse {
        tracing::warn!(session_id = %session.session_id, reason, "using fallback tasks");
        TraceEvent::FallbackUsed {
            session_id: session.session_id.clone(),
            branch: "generation".into(),
            reason: reason.to_string(),
        }
        .emit();
        let tasks = fallback_tasks(session.domain_or_general());
        self.store_tasks(session, tasks, TaskSource::Fallback)
    }

    fn store_tasks(&self, session: &mut Session, tasks: Vec<Task>, source: TaskSource) -> TurnResponse {
        session.push(Message::assistant(prompts::task_summary(&tasks)));
        session.store_generated_tasks(tasks.clone());
        TraceEvent::TasksGenerated {
            session_id: session.session_id.clone(),
            source,
            count: tasks.len(),
        }
        .emit();
        TurnResponse::tasks(tasks)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // GENERATED: edits, regeneration, follow-up talk
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    async fn after_generation(
        &self,
        session: &mut Session,
        message: &str,
    ) -> (TurnResponse, TurnKind) {
        let response = match intent::classify_follow_up(message) {
            FollowUp::StartOver => {
                tracing::debug!(session_id = %session.session_id, "starting over");
                session.start_over();
                self.generate(session, None).await
            }
            FollowUp::Edit { target_index } => {
                session.edit_request = Some(EditRequest { target_index });
                match target_index {
                    Some(index) => self.edit_task(session, index, message).await,
                    None => {
                        let previous = session.last_task_set.clone();
                        session.start_over();
                        self.generate(session, previous).await
                    }
                }
            }
            FollowUp::Continue => {
                return (self.continue_dialogue(session).await, TurnKind::Dialogue)
            }
        };
        (response, TurnKind::Generation)
    }

    async fn edit_task(&self, session: &mut Session, index: usize, instruction: &str) -> TurnResponse {
        let domain = session.domain_or_general();
        let Some(original) = session
            .last_task_set
            .as_ref()
            .and_then(|tasks| tasks.get(index))
            .cloned()
        else {
            return self.generate(session, None).await;
        };

        let req = self.request(prompts::edit(&original, instruction)).json();
        let candidate = match self.timed_chat(&req).await {
            Ok(resp) => ModelTaskPayload::parse(&resp.content).first_task(self.limits),
            Err(e) => {
                tracing::warn!(session_id = %session.session_id, error = %e, "task edit failed");
                None
            }
        };
        let mut edited = match candidate {
            Some(task) => coerce_task(task, index, self.limits),
            None => {
                TraceEvent::FallbackUsed {
                    session_id: session.session_id.clone(),
                    branch: "edit".into(),
                    reason: "no usable task in model output".into(),
                }
                .emit();
                fallback_task_at(domain, index)
            }
        };

        let forced_change = edited.same_content(&original);
        if forced_change {
            edited = force_change(&original);
        }

        session.replace_task(index, edited.clone());
        session.push(Message::assistant(format!(
            "Updated task {}: {} ({})",
            index + 1,
            edited.title,
            edited.time_estimate
        )));
        TraceEvent::TaskEdited {
            session_id: session.session_id.clone(),
            index,
            forced_change,
        }
        .emit();

        TurnResponse::tasks(session.last_task_set.clone().unwrap_or_default())
    }

    async fn continue_dialogue(&self, session: &mut Session) -> TurnResponse {
        let tasks = session.last_task_set.clone().unwrap_or_default();
        let reply = match self.llm.chat(&self.request(prompts::continuing(session, &tasks))).await {
            Ok(resp) if !resp.content.trim().is_empty() => resp.content.trim().to_string(),
            Ok(_) => self.fallback_reply(session, "empty model reply"),
            Err(e) => self.fallback_reply(session, &e.to_string()),
        };
        session.push(Message::assistant(reply.clone()));
        TurnResponse::reply(reply)
    }

    fn fallback_reply(&self, session: &Session, reason: &str) -> String {
        tracing::warn!(session_id = %session.session_id, reason, "using fallback reply");
        TraceEvent::FallbackUsed {
            session_id: session.session_id.clone(),
            branch: "continue".into(),
            reason: reason.to_string(),
        }
        .emit();
        CONTINUE_FALLBACK_REPLY.to_string()
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Model calls
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    fn request(&self, messages: Vec<Message>) -> ChatRequest {
        let mut req = ChatRequest::new(messages);
        req.temperature = Some(self.sampling.temperature);
        req.max_tokens = Some(self.sampling.max_tokens);
        req
    }

    /// Chat call raced against the generation timeout. Dropping the
    /// pending future on timeout also drops the in-flight HTTP request.
    async fn timed_chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let limit = Duration::from_millis(self.config.generation_timeout_ms);
        match tokio::time::timeout(limit, self.llm.chat(req)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "model did not answer within {}ms",
                self.config.generation_timeout_ms
            ))),
        }
    }
}

/// Make an unchanged edit visibly different while keeping its id.
fn force_change(original: &Task) -> Task {
    let title = if original.title.starts_with(UPDATED_PREFIX) {
        original.title.clone()
    } else {
        format!("{UPDATED_PREFIX}{}", original.title)
    };
    Task {
        id: original.id,
        title,
        description: format!("{} {REVISION_NOTE}", original.description.trim_end()),
        time_estimate: original.time_estimate.clone(),
    }
}
