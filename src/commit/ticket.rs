//! Ticket-reference extraction from branch names.

use regex_lite::Regex;

/// A project-tracker ticket inferred from the current branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRef {
    pub prefix: String,
    pub number: String,
}

impl TicketRef {
    /// The canonical `PREFIX-NUMBER` key.
    pub fn key(&self) -> String {
        format!("{}-{}", self.prefix, self.number)
    }
}

/// Parse the first ticket reference out of a branch name.
///
/// `feature/SCRUM-123-login` yields `SCRUM-123`. Returns `None` when the
/// branch carries no uppercase `PREFIX-NUMBER` token.
pub fn parse_ticket(branch: &str) -> Option<TicketRef> {
    let Ok(re) = Regex::new(r"([A-Z][A-Z0-9]+)-([0-9]+)") else {
        return None;
    };
    let captures = re.captures(branch)?;
    Some(TicketRef {
        prefix: captures.get(1)?.as_str().to_string(),
        number: captures.get(2)?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticket_from_feature_branch() {
        let ticket = parse_ticket("feature/SCRUM-123-login").unwrap();
        assert_eq!(ticket.prefix, "SCRUM");
        assert_eq!(ticket.number, "123");
        assert_eq!(ticket.key(), "SCRUM-123");
    }

    #[test]
    fn parses_bare_ticket_branch() {
        let ticket = parse_ticket("ABC-7").unwrap();
        assert_eq!(ticket.key(), "ABC-7");
    }

    #[test]
    fn first_reference_wins() {
        let ticket = parse_ticket("fix/OPS-42-and-OPS-43").unwrap();
        assert_eq!(ticket.key(), "OPS-42");
    }

    #[test]
    fn lowercase_tokens_are_not_tickets() {
        assert!(parse_ticket("feature/add-login-2").is_none());
        assert!(parse_ticket("main").is_none());
    }

    #[test]
    fn single_letter_prefix_is_not_a_ticket() {
        assert!(parse_ticket("a/X-1").is_none());
    }
}
