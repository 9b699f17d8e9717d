//! Chat Update Handler

use std::time::Instant;

use grocer::{
    customers::{ConversationId, CustomerId, CustomerProfile},
    menu::Input,
};
use grocer_app::storefront::Update;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{extensions::*, observability::observe_update};

/// Sender of a chat message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChatCustomer {
    pub id: i64,
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

/// How the message was produced in the chat client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MessageKind {
    Text,
    Command,
    Callback,
}

impl MessageKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Command => "command",
            Self::Callback => "callback",
        }
    }
}

/// Message content.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChatMessage {
    pub kind: MessageKind,
    pub body: String,
}

/// Inbound Chat Update Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateRequest {
    pub conversation_id: i64,
    pub customer: ChatCustomer,
    pub message: ChatMessage,
}

impl From<UpdateRequest> for Update {
    fn from(request: UpdateRequest) -> Self {
        let ChatMessage { kind, body } = request.message;

        let input = match kind {
            MessageKind::Text => Input::Text(body),
            MessageKind::Command => Input::Command(body),
            MessageKind::Callback => Input::Callback(body),
        };

        Update {
            conversation: ConversationId::new(request.conversation_id),
            customer: CustomerId::new(request.customer.id),
            profile: CustomerProfile {
                first_name: request.customer.first_name,
                last_name: request.customer.last_name,
                username: request.customer.username,
            },
            input,
        }
    }
}

/// Update Accepted Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateAcceptedResponse {
    /// Replies produced and handed to the messaging gateway
    pub replies: usize,
}

/// Chat Update Handler
#[endpoint(
    tags("chat"),
    summary = "Receive Chat Update",
    responses(
        (status_code = StatusCode::ACCEPTED, description = "Update processed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<UpdateRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UpdateAcceptedResponse>, StatusError> {
    let state = depot.state_or_500()?;
    let request = json.into_inner();
    let kind = request.message.kind.as_str();

    debug!(
        conversation = request.conversation_id,
        customer = request.customer.id,
        kind,
        "chat update received"
    );

    let started = Instant::now();
    let replies = state.storefront.handle(request.into()).await;

    observe_update(kind, replies, started.elapsed().as_secs_f64());

    res.status_code(StatusCode::ACCEPTED);

    Ok(Json(UpdateAcceptedResponse { replies }))
}
