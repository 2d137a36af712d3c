//! Client wiring and the public call surface.

use std::sync::Arc;

use bytes::Bytes;

use waypoint_proto::envelope::LogicalRequest;
use waypoint_proto::error::Result;

use crate::auth::Reauthenticator;
use crate::batch::default_requests;
use crate::builder::EnvelopeBuilder;
use crate::config::ClientConfig;
use crate::dispatch::CallDispatcher;
use crate::handlers;
use crate::route::ResponseRouter;
use crate::session::Session;
use crate::sign::Signer;
use crate::transport::Transport;

/// The RPC client: one instance per logged-in session.
///
/// Calls may run concurrently; request-id assignment is atomic and the active
/// endpoint is shared dispatcher state.
pub struct RpcClient {
    session: Arc<Session>,
    builder: EnvelopeBuilder,
    dispatcher: CallDispatcher,
    router: ResponseRouter,
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
    reauth: Arc<dyn Reauthenticator>,
}

impl RpcClient {
    /// Build a client with the built-in response handlers registered.
    pub fn new(
        cfg: ClientConfig,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
        signer: Arc<dyn Signer>,
        reauth: Arc<dyn Reauthenticator>,
    ) -> Result<Self> {
        cfg.validate()?;

        let router = ResponseRouter::new();
        handlers::register_all(&router);

        Ok(Self {
            session,
            builder: EnvelopeBuilder::new(),
            dispatcher: CallDispatcher::new(&cfg),
            router,
            transport,
            signer,
            reauth,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Endpoint the next call will hit.
    pub fn endpoint(&self) -> String {
        self.dispatcher.endpoint()
    }

    /// Register an additional response handler.
    pub fn register_handler(&self, handler: Arc<dyn crate::route::ResponseHandler>) {
        self.router.register(handler);
    }

    /// Issue one user request with the default housekeeping batch appended.
    /// Returns the primary response payload.
    pub async fn call(&self, request: LogicalRequest) -> Result<Bytes> {
        let mut requests = Vec::with_capacity(6);
        requests.push(request);
        requests.extend(default_requests(&self.session)?);
        self.dispatch(requests).await
    }

    /// Issue a raw batch exactly as given; no default requests are appended.
    pub async fn call_batch(&self, requests: Vec<LogicalRequest>) -> Result<Bytes> {
        self.dispatch(requests).await
    }

    async fn dispatch(&self, requests: Vec<LogicalRequest>) -> Result<Bytes> {
        let envelope = self
            .builder
            .build(
                &self.session,
                requests,
                self.signer.as_ref(),
                self.reauth.as_ref(),
            )
            .await?;
        self.dispatcher
            .dispatch(
                &self.session,
                &envelope,
                self.transport.as_ref(),
                self.reauth.as_ref(),
                &self.router,
            )
            .await
    }
}
