//! Chat API Handlers

use crate::chat::Reply;
use crate::core::ServerState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AppError, AppResult, CartSummary, ScoredEntry, SessionCookies};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Assigned by the widget on first message; one is minted here if the
    /// widget hasn't got one yet
    pub session_id: Option<String>,
    pub message: String,
}

/// Wire form of [`Reply`]
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatReply {
    Products {
        intro: String,
        products: Vec<ScoredEntry>,
    },
    Booking {
        url: String,
    },
    PlainText {
        content: String,
    },
    CartMutation {
        summary: CartSummary,
    },
}

#[derive(Debug, Serialize)]
pub struct ChatPayload {
    pub session_id: String,
    #[serde(flatten)]
    pub reply: ChatReply,
}

impl From<Reply> for ChatReply {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Products { intro, products } => Self::Products { intro, products },
            Reply::Booking { url } => Self::Booking { url },
            Reply::PlainText { content } => Self::PlainText { content },
            Reply::CartMutation { summary } => Self::CartMutation { summary },
        }
    }
}

/// POST /api/chat
pub async fn chat(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> AppResult<Response> {
    if request.message.trim().is_empty() {
        return Err(AppError::validation("message must not be empty"));
    }

    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if !state.limiter.check(&session_id) {
        return Err(AppError::rate_limited());
    }

    let cookies = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(SessionCookies::new)
        .unwrap_or_default();

    let result = state
        .orchestrator
        .respond(&session_id, &request.message, &cookies)
        .await;

    let payload = ChatPayload {
        session_id,
        reply: result.reply.into(),
    };
    let mut response = ApiResponse::success(payload).into_response();
    for cookie in result.set_cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    Ok(response)
}
