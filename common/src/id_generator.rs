use rand::Rng;
use rand::distr::Alphanumeric;

const CONNECTION_ID_LENGTH: usize = 13;
const REQUEST_ID_LENGTH: usize = 8;

pub fn generate_connection_id() -> String {
    generate_token(CONNECTION_ID_LENGTH)
}

/// Short token correlating all log lines produced while handling one event.
pub fn generate_request_id() -> String {
    generate_token(REQUEST_ID_LENGTH)
}

fn generate_token(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_have_expected_length() {
        assert_eq!(generate_connection_id().len(), CONNECTION_ID_LENGTH);
        assert_eq!(generate_request_id().len(), REQUEST_ID_LENGTH);
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let first = generate_connection_id();
        let second = generate_connection_id();

        assert_ne!(first, second);
    }
}
