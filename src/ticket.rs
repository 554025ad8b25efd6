//! Request tickets
//!
//! Every asynchronous request is stamped with a `Ticket` from a single
//! process-wide `TicketIssuer`. A flow remembers the ticket of its
//! outstanding request in an `InFlight` slot and only accepts the completion
//! carrying that same ticket, so a response that arrives after its flow was
//! abandoned (edit cancelled, user logged out, newer request started) is
//! dropped instead of clobbering newer state.

/// Opaque, strictly increasing request stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out unique tickets and tracks the session epoch
#[derive(Debug, Default)]
pub struct TicketIssuer {
    next: u64,
    /// First ticket value belonging to the current epoch
    epoch_start: u64,
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket. Never reused for the life of the issuer.
    pub fn issue(&mut self) -> Ticket {
        self.next += 1;
        Ticket(self.next)
    }

    /// Start a new epoch: every ticket issued so far becomes stale.
    pub fn new_epoch(&mut self) {
        self.epoch_start = self.next + 1;
    }

    /// Whether `ticket` was issued during the current epoch
    pub fn is_current_epoch(&self, ticket: Ticket) -> bool {
        ticket.0 >= self.epoch_start
    }
}

/// The outstanding request of one flow, if any
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InFlight {
    ticket: Option<Ticket>,
}

impl InFlight {
    /// Record a new outstanding request, superseding any previous one.
    pub fn begin(&mut self, issuer: &mut TicketIssuer) -> Ticket {
        let ticket = issuer.issue();
        self.ticket = Some(ticket);
        ticket
    }

    /// Whether a request is outstanding
    pub fn is_busy(&self) -> bool {
        self.ticket.is_some()
    }

    /// Accept a completion. Returns true (and frees the slot) only when
    /// `ticket` is the outstanding one.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.ticket == Some(ticket) {
            self.ticket = None;
            true
        } else {
            false
        }
    }

    /// Forget the outstanding request; its completion will be ignored.
    pub fn abandon(&mut self) {
        self.ticket = None;
    }
}
