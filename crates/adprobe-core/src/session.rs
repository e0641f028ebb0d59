use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    policy_for, AuthClient, CanonicalResult, ErrorCode, Operation, OperationKind, Transport,
};

#[derive(Debug, PartialEq, Eq)]
pub enum SessionState<'a> {
    Idle,
    Busy,
    Settled(&'a CanonicalResult),
}

/// Proof that an operation was started; handed back on settle.
#[derive(Debug)]
pub struct Ticket {
    id: u64,
    kind: OperationKind,
}

impl Ticket {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

/// Username and password typed into the form-login fields.
#[derive(Default)]
pub struct FormFields {
    pub username: String,
    pub password: String,
}

impl FormFields {
    pub fn clear(&mut self) {
        self.username.clear();
        self.password.clear();
    }
}

/// Current-result slot plus the busy flag.
///
/// Overlapping operations are tolerated: the machine stays busy while any is
/// in flight and the last one to settle owns the slot.
#[derive(Default)]
pub struct Session {
    current: Option<CanonicalResult>,
    in_flight: usize,
    next_ticket: u64,
    pub form: FormFields,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState<'_> {
        if self.in_flight > 0 {
            return SessionState::Busy;
        }
        match &self.current {
            Some(result) => SessionState::Settled(result),
            None => SessionState::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn current(&self) -> Option<&CanonicalResult> {
        self.current.as_ref()
    }

    pub fn begin(&mut self, kind: OperationKind) -> Ticket {
        self.in_flight += 1;
        self.next_ticket += 1;
        debug!(operation = kind.label(), ticket = self.next_ticket, "operation started");
        Ticket {
            id: self.next_ticket,
            kind,
        }
    }

    /// Like [`Session::begin`], but refuses while another operation is running.
    pub fn try_begin(&mut self, kind: OperationKind) -> Option<Ticket> {
        if self.is_busy() {
            debug!(operation = kind.label(), "ignored trigger while busy");
            return None;
        }
        Some(self.begin(kind))
    }

    pub fn settle(&mut self, ticket: Ticket, result: CanonicalResult) {
        self.in_flight = self.in_flight.saturating_sub(1);
        debug!(
            operation = ticket.kind.label(),
            ticket = ticket.id,
            success = result.is_success(),
            "operation settled"
        );
        if ticket.kind == OperationKind::Logout && result.is_success() {
            self.form.clear();
        }
        self.current = Some(result);
    }

    /// Runs one operation to completion, unless one is already running.
    pub async fn drive<T>(
        &mut self,
        client: &Arc<AuthClient<T>>,
        operation: Operation,
    ) -> Option<&CanonicalResult>
    where
        T: Transport + 'static,
    {
        let kind = operation.kind();
        let ticket = self.try_begin(kind)?;
        let client = Arc::clone(client);
        let handle = tokio::spawn(async move { client.execute(&operation).await });
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(operation = kind.label(), error = %err, "operation task failed");
                CanonicalResult::failure(
                    policy_for(kind).shape,
                    format!("{} failed unexpectedly", kind.label()),
                    Some(ErrorCode::UnexpectedError),
                )
            }
        };
        self.settle(ticket, result);
        self.current()
    }
}
