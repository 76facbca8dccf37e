//! Registry constants.

/// Sentinel returned by ticket counters when the backing store cannot count.
pub const UNKNOWN_COUNT: i64 = i64::MIN;

/// Ticket id prefixes.
///
/// Generated ids have the form `{PREFIX}-{sequence}-{random}`.
pub mod ticket_prefixes {
    /// Ticket-granting ticket.
    pub const TICKET_GRANTING_TICKET: &str = "TGT";

    /// Service ticket.
    pub const SERVICE_TICKET: &str = "ST";

    /// Proxy-granting ticket.
    pub const PROXY_GRANTING_TICKET: &str = "PGT";

    /// Encoded (encrypted) ticket wrapper.
    pub const ENCODED_TICKET: &str = "ENC";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_count_is_minimum() {
        assert_eq!(UNKNOWN_COUNT, i64::MIN);
    }

    #[test]
    fn test_ticket_prefixes() {
        assert_eq!(ticket_prefixes::TICKET_GRANTING_TICKET, "TGT");
        assert_eq!(ticket_prefixes::SERVICE_TICKET, "ST");
        assert_eq!(ticket_prefixes::PROXY_GRANTING_TICKET, "PGT");
    }
}
