//! Logging Setup

use crate::FruitError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a global human-readable subscriber
pub fn init_logging(level: Level) -> Result<(), FruitError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| FruitError::Logging(e.to_string()))
}

/// Install a global subscriber emitting one JSON object per event
pub fn init_json_logging(level: Level) -> Result<(), FruitError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| FruitError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_fails() {
        // whichever call runs first wins; the other must report an error
        let first = init_logging(Level::DEBUG);
        let second = init_json_logging(Level::INFO);
        assert!(matches!(
            (first, second),
            (Ok(()), Err(FruitError::Logging(_)))
                | (Err(FruitError::Logging(_)), Err(FruitError::Logging(_)))
        ));
    }
}
