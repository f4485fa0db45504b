//! Chat session with the tool-dispatch loop.
//!
//! One session per authenticated login: the conversation is an explicit
//! value, not process-global state. Each turn forwards the user's message to
//! the model, executes any tool calls it requests, feeds results back, and
//! repeats until the model produces a final answer or the iteration cap is
//! hit.

use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::error::{LeseError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use std::time::Duration;
use tracing::{debug, info};

/// System prompt template; `{name}` and `{id}` are filled from the
/// authenticated member.
const SYSTEM_PROMPT: &str = r#"You are 'Leo', the library assistant. Your personality is friendly, helpful, and proactive. Your goal is to make the user's library experience delightful and easy.

The logged-in member is {name} (Member ID {id}). Their ID is supplied automatically to tools like reserve_book and get_my_details; never ask for it.

Core rules:
1. For SPECIFIC book or author queries, you MUST use the 'search_books' tool.
2. For MOOD or GENRE requests, do NOT use the search tool; recommend from your own knowledge.
3. After a successful search, proactively ask whether the user wants to reserve a book. If they confirm, use the 'reserve_book' tool with the exact title.
4. If the user asks for their details, use the 'get_my_details' tool.
5. Adding books and members is for the administrator; politely decline for regular members.
6. Stay on topic: if asked a non-library question, politely decline with personality, e.g. "While I love a good chat, my expertise is really in books! How about we find your next great read?""#;

/// Upper bound on retained history messages (system prompt excluded from the
/// trim).
const MAX_HISTORY_MESSAGES: usize = 30;

/// Interactive chat session bound to one authenticated member.
pub struct ChatSession {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    tools: ToolContext,
    messages: Vec<ChatCompletionRequestMessage>,
    max_tool_iterations: usize,
}

/// Result of a single conversational turn.
#[derive(Debug)]
pub struct TurnResponse {
    /// The final answer shown to the user.
    pub content: String,
    /// Record of tool calls made during the turn.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model round-trips used.
    pub iterations: usize,
}

/// Record of one tool call made during a turn.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

impl ChatSession {
    /// Create a new session for an authenticated member.
    pub fn new(
        tools: ToolContext,
        model: &str,
        max_tool_iterations: usize,
        request_timeout: Duration,
    ) -> Result<Self> {
        let prompt = SYSTEM_PROMPT
            .replace("{name}", &tools.member.name)
            .replace("{id}", &tools.member.id.to_string());

        let system_message = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| LeseError::Assistant(e.to_string()))?;

        Ok(Self {
            client: create_client_with_timeout(request_timeout),
            model: model.to_string(),
            tools,
            messages: vec![system_message.into()],
            max_tool_iterations,
        })
    }

    /// Clear conversation history (keeps system prompt).
    pub fn clear_history(&mut self) {
        self.messages.truncate(1);
    }

    /// Send a message and drive the dispatch loop to a final answer.
    ///
    /// A failed turn (unknown tool, iteration cap, API error) is rolled back
    /// from history so the session stays consistent for a retry.
    pub async fn send_message(&mut self, user_input: &str) -> Result<TurnResponse> {
        let checkpoint = self.messages.len();
        match self.run_turn(user_input).await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.messages.truncate(checkpoint);
                Err(e)
            }
        }
    }

    async fn run_turn(&mut self, user_input: &str) -> Result<TurnResponse> {
        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user_input)
            .build()
            .map_err(|e| LeseError::Assistant(e.to_string()))?;
        self.messages.push(user_message.into());

        let mut iterations = 0;
        let mut records: Vec<ToolCallRecord> = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_tool_iterations {
                return Err(LeseError::Assistant(format!(
                    "Too many tool iterations ({})",
                    self.max_tool_iterations
                )));
            }

            debug!(
                "Dispatch iteration {}, {} messages",
                iterations,
                self.messages.len()
            );

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(self.messages.clone())
                .tools(tool_definitions())
                .build()
                .map_err(|e| LeseError::Assistant(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| LeseError::OpenAI(format!("Chat API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| LeseError::Assistant("No response from model".to_string()))?;

            match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => {
                    self.execute_tool_calls(calls.clone(), &mut records).await?;
                }
                _ => {
                    let content = self.finish_turn(choice.message.content.clone(), &records)?;

                    return Ok(TurnResponse {
                        content,
                        tool_calls: records,
                        iterations,
                    });
                }
            }
        }
    }

    /// Execute one batch of tool calls requested by the model, pushing the
    /// assistant tool-call message and one tool-result message per call.
    ///
    /// An unknown tool name is terminal for the turn: nothing in the batch
    /// executes and no message is pushed. Everything else (bad arguments,
    /// tool failures) is fed back to the model as a tool-result string.
    async fn execute_tool_calls(
        &mut self,
        tool_calls: Vec<ChatCompletionMessageToolCall>,
        records: &mut Vec<ToolCallRecord>,
    ) -> Result<()> {
        // Classify the whole batch up front so an unknown name aborts
        // before any tool runs
        let mut parsed = Vec::with_capacity(tool_calls.len());
        for tool_call in &tool_calls {
            match parse_tool_call(&tool_call.function.name, &tool_call.function.arguments) {
                Ok(tool) => parsed.push(Ok(tool)),
                Err(e @ LeseError::UnknownTool(_)) => return Err(e),
                Err(e) => parsed.push(Err(e)),
            }
        }

        let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
            .tool_calls(tool_calls.clone())
            .build()
            .map_err(|e| LeseError::Assistant(e.to_string()))?;
        self.messages.push(assistant_msg.into());

        for (tool_call, parsed) in tool_calls.iter().zip(parsed) {
            let name = &tool_call.function.name;
            let arguments = &tool_call.function.arguments;

            info!("Assistant calling tool: {} with args: {}", name, arguments);

            let result = match parsed {
                Ok(tool) => match self.tools.execute(&tool).await {
                    Ok(output) => output,
                    Err(e) => format!("Tool error: {}", e),
                },
                Err(e) => format!("Failed to parse tool call: {}", e),
            };

            let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(&tool_call.id)
                .content(result.clone())
                .build()
                .map_err(|e| LeseError::Assistant(e.to_string()))?;
            self.messages.push(tool_msg.into());

            records.push(ToolCallRecord {
                name: name.clone(),
                arguments: arguments.clone(),
                result,
            });
        }

        Ok(())
    }

    /// Close out a turn with the model's final content, falling back to the
    /// last tool result when the body is empty so the user still sees
    /// something useful.
    fn finish_turn(
        &mut self,
        content: Option<String>,
        records: &[ToolCallRecord],
    ) -> Result<String> {
        let content = content.unwrap_or_default();
        let content = if content.is_empty() {
            records.last().map(|r| r.result.clone()).unwrap_or_default()
        } else {
            content
        };

        self.add_assistant_message(&content)?;
        self.trim_history(MAX_HISTORY_MESSAGES);

        Ok(content)
    }

    /// Add an assistant text message to history.
    fn add_assistant_message(&mut self, content: &str) -> Result<()> {
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| LeseError::Assistant(e.to_string()))?;
        self.messages.push(msg.into());
        Ok(())
    }

    /// Trim conversation history to keep it manageable.
    fn trim_history(&mut self, max_messages: usize) {
        if self.messages.len() > max_messages {
            // Keep system message (index 0) and last N-1 messages
            let start = self.messages.len() - (max_messages - 1);
            let mut trimmed = vec![self.messages[0].clone()];
            trimmed.extend(self.messages[start..].iter().cloned());
            self.messages = trimmed;
        }
    }

    /// Number of messages currently held (system prompt included).
    pub fn history_len(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Member, SqliteCatalog};
    use crate::covers::CoverClient;
    use chrono::Utc;
    use std::sync::Arc;

    fn test_session() -> ChatSession {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        catalog.seed_demo_data().unwrap();
        let member = Member {
            id: 1,
            name: "Taha".to_string(),
            email: "taha@example.com".to_string(),
            join_date: Utc::now(),
        };
        let tools = ToolContext::new(catalog, CoverClient::disabled(), member);
        ChatSession::new(tools, "gpt-4o-mini", 10, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_system_prompt_carries_member_identity() {
        let session = test_session();
        assert_eq!(session.history_len(), 1);
        match &session.messages[0] {
            ChatCompletionRequestMessage::System(msg) => {
                let text = format!("{:?}", msg.content);
                assert!(text.contains("Taha"));
                assert!(text.contains("Member ID 1"));
            }
            _ => panic!("First message must be the system prompt"),
        }
    }

    #[test]
    fn test_clear_history_keeps_system_prompt() {
        let mut session = test_session();
        session.add_assistant_message("Hello!").unwrap();
        assert_eq!(session.history_len(), 2);

        session.clear_history();
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_trim_history_keeps_system_and_tail() {
        let mut session = test_session();
        for i in 0..40 {
            session.add_assistant_message(&format!("msg {}", i)).unwrap();
        }

        session.trim_history(MAX_HISTORY_MESSAGES);
        assert_eq!(session.history_len(), MAX_HISTORY_MESSAGES);
        assert!(matches!(
            session.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
    }

    fn fabricated_call(id: &str, name: &str, arguments: &str) -> ChatCompletionMessageToolCall {
        use async_openai::types::{ChatCompletionToolType, FunctionCall};

        ChatCompletionMessageToolCall {
            id: id.to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_tool_call_batch_executes_and_records() {
        let mut session = test_session();
        let before = session.history_len();
        let mut records = Vec::new();

        let batch = vec![fabricated_call(
            "call_1",
            "search_books",
            r#"{"query": "Hawking"}"#,
        )];
        session.execute_tool_calls(batch, &mut records).await.unwrap();

        // One assistant tool-call message plus one tool-result message
        assert_eq!(session.history_len(), before + 2);
        assert_eq!(records.len(), 1);
        assert!(records[0].result.contains("A Brief History of Time"));
        assert!(matches!(
            session.messages.last(),
            Some(ChatCompletionRequestMessage::Tool(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_tool_terminates_turn_without_further_calls() {
        let mut session = test_session();
        let before = session.history_len();
        let mut records = Vec::new();

        // The model asks for an unregistered tool followed by a valid one
        let batch = vec![
            fabricated_call("call_1", "suggest_books_by_mood", r#"{"mood": "curious"}"#),
            fabricated_call("call_2", "search_books", r#"{"query": "Hawking"}"#),
        ];
        let err = session.execute_tool_calls(batch, &mut records).await;

        match err {
            Err(LeseError::UnknownTool(name)) => assert_eq!(name, "suggest_books_by_mood"),
            other => panic!("Expected UnknownTool, got {:?}", other),
        }

        // The valid call never ran and no message was pushed
        assert!(records.is_empty());
        assert_eq!(session.history_len(), before);
    }

    #[tokio::test]
    async fn test_malformed_arguments_are_fed_back_not_terminal() {
        let mut session = test_session();
        let mut records = Vec::new();

        let batch = vec![fabricated_call("call_1", "reserve_book", r#"{}"#)];
        session.execute_tool_calls(batch, &mut records).await.unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].result.contains("Failed to parse tool call"));
    }

    #[test]
    fn test_empty_final_content_falls_back_to_last_tool_result() {
        let mut session = test_session();

        let records = vec![
            ToolCallRecord {
                name: "search_books".to_string(),
                arguments: r#"{"query": "Dune"}"#.to_string(),
                result: "No books were found in our catalog matching that query.".to_string(),
            },
            ToolCallRecord {
                name: "reserve_book".to_string(),
                arguments: r#"{"title": "Project Hail Mary"}"#.to_string(),
                result: "Success! A reservation for 'Project Hail Mary' has been placed for you."
                    .to_string(),
            },
        ];

        let content = session.finish_turn(None, &records).unwrap();
        assert!(content.starts_with("Success! A reservation"));

        let content = session.finish_turn(Some(String::new()), &records).unwrap();
        assert!(content.starts_with("Success! A reservation"));

        // A real answer passes through untouched
        let content = session
            .finish_turn(Some("Here you go.".to_string()), &records)
            .unwrap();
        assert_eq!(content, "Here you go.");
    }

    #[test]
    fn test_finish_turn_with_no_tools_and_no_content_is_empty() {
        let mut session = test_session();
        let content = session.finish_turn(None, &[]).unwrap();
        assert!(content.is_empty());
    }

    #[tokio::test]
    async fn test_failed_turn_rolls_back_history() {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        catalog.seed_demo_data().unwrap();
        let member = Member {
            id: 1,
            name: "Taha".to_string(),
            email: "taha@example.com".to_string(),
            join_date: Utc::now(),
        };
        let tools = ToolContext::new(catalog, CoverClient::disabled(), member);

        // A zero iteration cap fails the turn before any model call
        let mut session =
            ChatSession::new(tools, "gpt-4o-mini", 0, Duration::from_secs(5)).unwrap();

        let before = session.history_len();
        let err = session.send_message("hello").await;
        assert!(err.is_err());
        assert_eq!(session.history_len(), before);
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "search_books".to_string(),
            arguments: r#"{"query": "Dune"}"#.to_string(),
            result: "Found 1 books".to_string(),
        };
        assert_eq!(format!("{}", record), r#"search_books({"query": "Dune"})"#);
    }
}
