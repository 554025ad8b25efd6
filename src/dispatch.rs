//! Side-effect execution
//!
//! `Dispatcher` turns the `Action`s returned by `App` into gateway calls or
//! export writes and reports each outcome back as an `AppEvent`. Every
//! failure is converted into the user-facing message the app displays, so
//! the state machine never sees raw `ApiError`s.

use crate::api::{Gateway, TestOutcome};
use crate::app::{Action, AppEvent};
use crate::auth::{AuthMode, AuthRequest};
use crate::export::ExportSink;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Dispatcher {
    gateway: Arc<dyn Gateway>,
    sink: Arc<ExportSink>,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn Gateway>, sink: ExportSink) -> Self {
        Self {
            gateway,
            sink: Arc::new(sink),
        }
    }

    /// Run `action` in the background and send its completion on `tx`.
    /// `None`, `Quit` and other local actions are ignored.
    pub fn spawn(&self, action: Action, tx: UnboundedSender<AppEvent>) {
        if matches!(action, Action::None | Action::Quit) {
            return;
        }
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Some(event) = dispatcher.perform(action).await
                && tx.send(event).is_err()
            {
                debug!("event loop gone, dropping completion");
            }
        });
    }

    /// Execute `action` and return the completion event, if it has one
    pub async fn perform(&self, action: Action) -> Option<AppEvent> {
        let gateway = &self.gateway;
        let event = match action {
            Action::None | Action::Quit => return None,
            Action::Authenticate { ticket, request } => {
                let (mode, result) = match request {
                    AuthRequest::Login(payload) => {
                        (AuthMode::Login, gateway.login(&payload).await)
                    }
                    AuthRequest::Register(payload) => {
                        let result = match gateway.register(&payload).await {
                            Ok(_) => gateway.login(&payload.login()).await,
                            Err(e) => Err(e),
                        };
                        (AuthMode::Signup, result)
                    }
                };
                AppEvent::AuthCompleted {
                    ticket,
                    result: result.map_err(|e| {
                        warn!(error = %e, "authentication failed");
                        mode.failure_message(&e)
                    }),
                }
            }
            Action::LoadConnections { ticket } => AppEvent::ConnectionsLoaded {
                ticket,
                result: gateway
                    .list_connections()
                    .await
                    .map_err(|e| e.user_message()),
            },
            Action::CreateConnection { ticket, draft } => AppEvent::ConnectionCreated {
                ticket,
                result: gateway
                    .create_connection(&draft)
                    .await
                    .map_err(|e| e.user_message()),
            },
            Action::UpdateConnection { ticket, id, draft } => AppEvent::ConnectionUpdated {
                ticket,
                result: gateway
                    .update_connection(id, &draft)
                    .await
                    .map_err(|e| e.user_message()),
            },
            Action::DeleteConnection { ticket, id } => AppEvent::ConnectionDeleted {
                ticket,
                id,
                result: gateway
                    .delete_connection(id)
                    .await
                    .map_err(|e| e.user_message()),
            },
            Action::TestConnection {
                ticket,
                form,
                connection_string,
            } => AppEvent::ConnectionTested {
                ticket,
                form,
                outcome: gateway
                    .test_connection(&connection_string)
                    .await
                    .unwrap_or_else(|e| TestOutcome::failed(e.user_message())),
            },
            Action::ExecuteQuery { ticket, request } => AppEvent::QueryCompleted {
                ticket,
                result: gateway.run_sql(&request).await.map_err(|e| {
                    warn!(error = %e, connection_id = request.connection_id, "query failed");
                    e.user_message()
                }),
            },
            Action::Export {
                ticket,
                format,
                content,
            } => {
                let sink = Arc::clone(&self.sink);
                let result =
                    tokio::task::spawn_blocking(move || sink.deliver(format, &content)).await;
                AppEvent::ExportFinished {
                    ticket,
                    result: match result {
                        Ok(Ok(path)) => Ok(path),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(e) => Err(e.to_string()),
                    },
                }
            }
        };
        Some(event)
    }
}
