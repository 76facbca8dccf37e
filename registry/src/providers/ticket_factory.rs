//! Ticket factory trait.

use crate::ticket::{ProxyGrantingTicket, ServiceTicket, TicketGrantingTicket};
use ticketry_auth::Authentication;
use ticketry_core::Service;

/// Creates tickets with fresh, unique ids.
///
/// The factory only builds tickets and records parent/child links on the
/// parent; persisting them is the caller's job (`add_ticket` for the new
/// ticket, `update_ticket` for the modified parent).
pub trait TicketFactory: Send + Sync {
    /// Start an SSO session for `authentication`.
    fn create_ticket_granting_ticket(&self, authentication: Authentication) -> TicketGrantingTicket;

    /// Issue a service ticket from `ticket_granting_ticket` and record it as a child.
    fn grant_service_ticket(
        &self,
        ticket_granting_ticket: &mut TicketGrantingTicket,
        service: Service,
        from_new_login: bool,
    ) -> ServiceTicket;

    /// Issue a proxy-granting ticket to `service` and record it on `ticket_granting_ticket`.
    fn grant_proxy_granting_ticket(
        &self,
        ticket_granting_ticket: &mut TicketGrantingTicket,
        service: Service,
    ) -> ProxyGrantingTicket;
}
