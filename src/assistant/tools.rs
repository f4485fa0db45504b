//! Tool definitions and implementations for the library assistant.

use crate::catalog::{Member, SqliteCatalog};
use crate::covers::CoverClient;
use crate::error::{LeseError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Available tools for the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    /// Search the catalog by title or author.
    SearchBooks { query: String },

    /// Reserve a book for the logged-in member.
    ReserveBook { title: String },

    /// Add a new book to the catalog.
    AddBook {
        title: String,
        author: String,
        genre: Option<String>,
        copies: i64,
    },

    /// Register a new library member.
    AddMember { name: String, email: String },

    /// Get the logged-in member's details.
    GetMyDetails,
}

/// Tool execution context: the catalog, the cover client, and the
/// authenticated member whose ID is supplied implicitly to member-scoped
/// tools.
pub struct ToolContext {
    pub catalog: Arc<SqliteCatalog>,
    pub covers: CoverClient,
    pub member: Member,
}

impl ToolContext {
    /// Create a new tool context for an authenticated member.
    pub fn new(catalog: Arc<SqliteCatalog>, covers: CoverClient, member: Member) -> Self {
        Self {
            catalog,
            covers,
            member,
        }
    }

    /// Execute a tool call and return the result as a string.
    ///
    /// Duplicate-key and availability failures come back as explanatory
    /// strings for the model, not as errors.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::SearchBooks { query } => self.execute_search_books(query).await,
            ToolCall::ReserveBook { title } => self.execute_reserve_book(title),
            ToolCall::AddBook {
                title,
                author,
                genre,
                copies,
            } => self.execute_add_book(title, author, genre.as_deref(), *copies),
            ToolCall::AddMember { name, email } => self.execute_add_member(name, email),
            ToolCall::GetMyDetails => self.execute_get_my_details(),
        }
    }

    async fn execute_search_books(&self, query: &str) -> Result<String> {
        let books = self.catalog.search_books(query)?;

        if books.is_empty() {
            return Ok(
                "No books were found in our catalog matching that query. \
                 You could ask me for a creative recommendation instead!"
                    .to_string(),
            );
        }

        let mut lines = Vec::with_capacity(books.len());
        for (i, book) in books.iter().enumerate() {
            let cover = self.covers.fetch_cover_url(&book.title, &book.author).await;
            let mut line = format!(
                "{}. '{}' by {} ({} | {} copies available)",
                i + 1,
                book.title,
                book.author,
                book.genre.as_deref().unwrap_or("Unknown genre"),
                book.copies,
            );
            if let Some(url) = cover {
                line.push_str(&format!("\n   Cover: {}", url));
            }
            lines.push(line);
        }

        Ok(format!(
            "Found {} books:\n\n{}",
            books.len(),
            lines.join("\n\n")
        ))
    }

    fn execute_reserve_book(&self, title: &str) -> Result<String> {
        match self.catalog.reserve_book(self.member.id, title) {
            Ok(_) => Ok(format!(
                "Success! A reservation for '{}' has been placed for you. \
                 You'll be notified when it's ready for pickup.",
                title
            )),
            Err(LeseError::BookNotFound(t)) => Ok(format!(
                "Error: No book titled '{}' was found in the catalog. \
                 Try searching first to get the exact title.",
                t
            )),
            Err(LeseError::NoCopiesAvailable(t)) => Ok(format!(
                "Sorry, all copies of '{}' are currently reserved.",
                t
            )),
            Err(e) => Err(e),
        }
    }

    fn execute_add_book(
        &self,
        title: &str,
        author: &str,
        genre: Option<&str>,
        copies: i64,
    ) -> Result<String> {
        match self.catalog.create_book(title, author, genre, copies) {
            Ok(_) => Ok(format!("Successfully added '{}' to the catalog.", title)),
            Err(LeseError::DuplicateTitle(t)) => Ok(format!(
                "Error: A book with the title '{}' already exists.",
                t
            )),
            Err(LeseError::InvalidInput(msg)) => Ok(format!("Error: {}.", msg)),
            Err(e) => Err(e),
        }
    }

    fn execute_add_member(&self, name: &str, email: &str) -> Result<String> {
        match self.catalog.create_member(name, email) {
            Ok(id) => Ok(format!(
                "Successfully added new member '{}' with Member ID: {}.",
                name, id
            )),
            Err(LeseError::DuplicateEmail(e)) => Ok(format!(
                "Error: A member with the email '{}' already exists.",
                e
            )),
            Err(LeseError::InvalidInput(msg)) => Ok(format!("Error: {}.", msg)),
            Err(e) => Err(e),
        }
    }

    fn execute_get_my_details(&self) -> Result<String> {
        let member = self
            .catalog
            .find_member_by_id(self.member.id)?
            .ok_or(LeseError::MemberNotFound(self.member.id))?;

        let reservations = self.catalog.reservations_for_member(member.id)?;
        let reservations_line = if reservations.is_empty() {
            "No active reservations.".to_string()
        } else {
            let titles: Vec<_> = reservations
                .iter()
                .map(|r| format!("'{}'", r.title))
                .collect();
            format!("Reserved books: {}", titles.join(", "))
        };

        Ok(format!(
            "Member ID: {}\nName: {}\nEmail: {}\nJoined: {}\n{}",
            member.id,
            member.name,
            member.email,
            member.join_date.format("%Y-%m-%d"),
            reservations_line
        ))
    }
}

/// Get OpenAI function/tool definitions for the assistant.
///
/// This is the single canonical registry; `parse_tool_call` accepts exactly
/// the names declared here.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "search_books".to_string(),
                description: Some(
                    "Searches the library catalog for books by title or author \
                    to find details and availability."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The title or author of the book to search for"
                        }
                    },
                    "required": ["query"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "reserve_book".to_string(),
                description: Some(
                    "Reserves a specific book for the currently logged-in user \
                    after they have been shown the details."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The exact title of the book to reserve"
                        }
                    },
                    "required": ["title"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "add_book".to_string(),
                description: Some(
                    "Adds a new book to the library catalog. Only for admin use.".to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "title": {
                            "type": "string",
                            "description": "The title of the book"
                        },
                        "author": {
                            "type": "string",
                            "description": "The author of the book"
                        },
                        "genre": {
                            "type": "string",
                            "description": "The genre of the book"
                        },
                        "copies": {
                            "type": "integer",
                            "description": "The number of copies to add",
                            "minimum": 1
                        }
                    },
                    "required": ["title", "author", "copies"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "add_member".to_string(),
                description: Some("Adds a new member to the library.".to_string()),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "The member's full name"
                        },
                        "email": {
                            "type": "string",
                            "description": "The member's email address"
                        }
                    },
                    "required": ["name", "email"]
                })),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "get_my_details".to_string(),
                description: Some(
                    "Retrieves the library member details for the currently \
                    logged-in user."
                        .to_string(),
                ),
                parameters: Some(serde_json::json!({
                    "type": "object",
                    "properties": {}
                })),
                strict: None,
            },
        },
    ]
}

/// Parse a tool call from the OpenAI response format.
///
/// An unknown tool name is a distinct [`LeseError::UnknownTool`] and aborts
/// the current turn; malformed arguments are an [`LeseError::Assistant`]
/// error that the dispatch loop feeds back to the model.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| LeseError::Assistant(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "search_books" => {
            let query = require_str(&args, "query")?;
            Ok(ToolCall::SearchBooks { query })
        }
        "reserve_book" => {
            let title = require_str(&args, "title")?;
            Ok(ToolCall::ReserveBook { title })
        }
        "add_book" => {
            let title = require_str(&args, "title")?;
            let author = require_str(&args, "author")?;
            let genre = args["genre"].as_str().map(|s| s.to_string());
            let copies = args["copies"].as_i64().unwrap_or(1);
            Ok(ToolCall::AddBook {
                title,
                author,
                genre,
                copies,
            })
        }
        "add_member" => {
            let name = require_str(&args, "name")?;
            let email = require_str(&args, "email")?;
            Ok(ToolCall::AddMember { name, email })
        }
        "get_my_details" => Ok(ToolCall::GetMyDetails),
        _ => Err(LeseError::UnknownTool(name.to_string())),
    }
}

fn require_str(args: &serde_json::Value, key: &str) -> Result<String> {
    args[key]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LeseError::Assistant(format!("Missing '{}' argument", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Member;
    use chrono::Utc;

    fn test_context() -> ToolContext {
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        catalog.seed_demo_data().unwrap();
        let member = Member {
            id: 1,
            name: "Taha".to_string(),
            email: "taha@example.com".to_string(),
            join_date: Utc::now(),
        };
        ToolContext::new(catalog, CoverClient::disabled(), member)
    }

    #[test]
    fn test_parse_search_books() {
        let tool = parse_tool_call("search_books", r#"{"query": "Physics"}"#).unwrap();
        match tool {
            ToolCall::SearchBooks { query } => assert_eq!(query, "Physics"),
            _ => panic!("Expected SearchBooks tool"),
        }
    }

    #[test]
    fn test_parse_add_book_defaults_copies() {
        let tool =
            parse_tool_call("add_book", r#"{"title": "Dune", "author": "Frank Herbert"}"#).unwrap();
        match tool {
            ToolCall::AddBook { copies, genre, .. } => {
                assert_eq!(copies, 1);
                assert!(genre.is_none());
            }
            _ => panic!("Expected AddBook tool"),
        }
    }

    #[test]
    fn test_parse_missing_argument_is_recoverable() {
        let err = parse_tool_call("reserve_book", r#"{}"#);
        assert!(matches!(err, Err(LeseError::Assistant(_))));
    }

    #[test]
    fn test_parse_unknown_tool_is_distinct() {
        let err = parse_tool_call("suggest_books_by_mood", r#"{"mood": "adventurous"}"#);
        match err {
            Err(LeseError::UnknownTool(name)) => assert_eq!(name, "suggest_books_by_mood"),
            other => panic!("Expected UnknownTool, got {:?}", other),
        }
    }

    #[test]
    fn test_definitions_and_parser_cover_the_same_set() {
        // The registry is canonical: every declared name must be accepted by
        // the parser, with arguments the schema marks as required.
        let sample_args = serde_json::json!({
            "query": "q", "title": "t", "author": "a",
            "copies": 1, "name": "n", "email": "e"
        })
        .to_string();

        for def in tool_definitions() {
            let parsed = parse_tool_call(&def.function.name, &sample_args);
            assert!(
                !matches!(parsed, Err(LeseError::UnknownTool(_))),
                "definition '{}' not handled by parser",
                def.function.name
            );
        }
    }

    #[tokio::test]
    async fn test_execute_search_books() {
        let ctx = test_context();
        let result = ctx
            .execute(&ToolCall::SearchBooks {
                query: "Hawking".to_string(),
            })
            .await
            .unwrap();
        assert!(result.contains("A Brief History of Time"));
        assert!(result.contains("Stephen Hawking"));
    }

    #[tokio::test]
    async fn test_execute_search_books_none_found() {
        let ctx = test_context();
        let result = ctx
            .execute(&ToolCall::SearchBooks {
                query: "Nothing Here".to_string(),
            })
            .await
            .unwrap();
        assert!(result.contains("No books were found"));
    }

    #[tokio::test]
    async fn test_execute_reserve_uses_session_member() {
        let ctx = test_context();
        let result = ctx
            .execute(&ToolCall::ReserveBook {
                title: "Project Hail Mary".to_string(),
            })
            .await
            .unwrap();
        assert!(result.starts_with("Success!"));

        let reservations = ctx.catalog.reservations_for_member(1).unwrap();
        assert_eq!(reservations.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_add_book_duplicate_is_a_string() {
        let ctx = test_context();
        let result = ctx
            .execute(&ToolCall::AddBook {
                title: "Project Hail Mary".to_string(),
                author: "Andy Weir".to_string(),
                genre: None,
                copies: 2,
            })
            .await
            .unwrap();
        assert!(result.contains("already exists"));
    }

    #[tokio::test]
    async fn test_execute_add_member_reports_new_id() {
        let ctx = test_context();
        let result = ctx
            .execute(&ToolCall::AddMember {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        assert!(result.contains("Member ID: 2"));

        let duplicate = ctx
            .execute(&ToolCall::AddMember {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        assert!(duplicate.contains("already exists"));
    }

    #[tokio::test]
    async fn test_execute_get_my_details() {
        let ctx = test_context();
        let result = ctx.execute(&ToolCall::GetMyDetails).await.unwrap();
        assert!(result.contains("Taha"));
        assert!(result.contains("taha@example.com"));
        assert!(result.contains("No active reservations"));
    }
}
