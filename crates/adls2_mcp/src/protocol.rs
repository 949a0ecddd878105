use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::transport::{
    JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, Message,
    Transport,
};
use super::types::ErrorCode;

/// Method-name dispatch over a transport. Handlers are registered once at
/// build time; the maps are never mutated afterwards, so they are shared
/// without locking.
#[derive(Clone)]
pub struct Protocol<T: Transport> {
    transport: Arc<T>,
    request_handlers: Arc<HashMap<String, Box<dyn RequestHandler>>>,
    notification_handlers: Arc<HashMap<String, Box<dyn NotificationHandler>>>,
}

impl<T: Transport> Protocol<T> {
    pub fn builder(transport: T) -> ProtocolBuilder<T> {
        ProtocolBuilder::new(transport)
    }

    /// Serve requests until the transport fails (EOF on stdio).
    pub async fn listen(&self) -> Result<()> {
        debug!("Listening for requests");
        loop {
            let message: Message = self.transport.receive()?;
            match message {
                JsonRpcMessage::Request(request) => self.handle_request(request).await?,
                JsonRpcMessage::Notification(notification) => {
                    if let Some(handler) = self.notification_handlers.get(&notification.method) {
                        handler.handle(notification)?;
                    }
                }
                // A server never issues requests, so responses have no home.
                JsonRpcMessage::Response(response) => {
                    debug!("Ignoring unexpected response: {}", response.id);
                }
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Result<()> {
        let response = match self.request_handlers.get(&request.method) {
            Some(handler) => match handler.handle(request.clone()).await {
                Ok(response) => response,
                Err(e) => JsonRpcResponse {
                    id: request.id,
                    result: None,
                    error: Some(JsonRpcError {
                        code: ErrorCode::InternalError as i32,
                        message: e.to_string(),
                        data: None,
                    }),
                    ..Default::default()
                },
            },
            None => JsonRpcResponse {
                id: request.id,
                error: Some(JsonRpcError {
                    code: ErrorCode::MethodNotFound as i32,
                    message: format!("Method not found: {}", request.method),
                    data: None,
                }),
                ..Default::default()
            },
        };
        self.transport.send(&JsonRpcMessage::Response(response))
    }
}

pub struct ProtocolBuilder<T: Transport> {
    transport: T,
    request_handlers: HashMap<String, Box<dyn RequestHandler>>,
    notification_handlers: HashMap<String, Box<dyn NotificationHandler>>,
}

impl<T: Transport> ProtocolBuilder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            request_handlers: HashMap::new(),
            notification_handlers: HashMap::new(),
        }
    }

    /// Register a typed request handler. Handlers are async: storage-backed
    /// tools suspend on the remote call.
    pub fn request_handler<Req, Resp, Fut>(
        mut self,
        method: &str,
        handler: impl Fn(Req) -> Fut + Send + Sync + 'static,
    ) -> Self
    where
        Req: DeserializeOwned + Send + Sync + 'static,
        Resp: Serialize + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp>> + Send + 'static,
    {
        let handler = TypedRequestHandler {
            handler: Box::new(move |req: Req| -> BoxFuture<'static, Result<Resp>> {
                Box::pin(handler(req))
            }),
        };

        self.request_handlers
            .insert(method.to_string(), Box::new(handler));
        self
    }

    pub fn notification_handler<N>(
        mut self,
        method: &str,
        handler: impl Fn(N) -> Result<()> + Send + Sync + 'static,
    ) -> Self
    where
        N: DeserializeOwned + Send + Sync + 'static,
    {
        self.notification_handlers.insert(
            method.to_string(),
            Box::new(TypedNotificationHandler {
                handler: Box::new(handler),
            }),
        );
        self
    }

    pub fn build(self) -> Protocol<T> {
        Protocol {
            transport: Arc::new(self.transport),
            request_handlers: Arc::new(self.request_handlers),
            notification_handlers: Arc::new(self.notification_handlers),
        }
    }
}

// Wrapper for handler types using async trait
#[async_trait]
trait RequestHandler: Send + Sync {
    async fn handle(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse>;
}

trait NotificationHandler: Send + Sync {
    fn handle(&self, notification: JsonRpcNotification) -> Result<()>;
}

// Typed handler implementations
struct TypedRequestHandler<Req, Resp>
where
    Req: DeserializeOwned + Send + Sync + 'static,
    Resp: Serialize + Send + Sync + 'static,
{
    handler: Box<dyn Fn(Req) -> BoxFuture<'static, Result<Resp>> + Send + Sync>,
}

#[async_trait]
impl<Req, Resp> RequestHandler for TypedRequestHandler<Req, Resp>
where
    Req: DeserializeOwned + Send + Sync + 'static,
    Resp: Serialize + Send + Sync + 'static,
{
    async fn handle(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        // If params is None or null, deserialize as unit type using Value::Null
        let params: Req = match request.params {
            Some(value) if !value.is_null() => serde_json::from_value(value)?,
            _ => serde_json::from_value(serde_json::Value::Null)?,
        };
        let result = (self.handler)(params).await?;
        Ok(JsonRpcResponse {
            id: request.id,
            result: Some(serde_json::to_value(result)?),
            error: None,
            ..Default::default()
        })
    }
}

struct TypedNotificationHandler<N>
where
    N: DeserializeOwned + Send + Sync + 'static,
{
    handler: Box<dyn Fn(N) -> Result<()> + Send + Sync>,
}

impl<N> NotificationHandler for TypedNotificationHandler<N>
where
    N: DeserializeOwned + Send + Sync + 'static,
{
    fn handle(&self, notification: JsonRpcNotification) -> Result<()> {
        let params: N = match notification.params {
            Some(value) if !value.is_null() => serde_json::from_value(value)?,
            _ => serde_json::from_value(serde_json::Value::Null)?,
        };
        (self.handler)(params)
    }
}
