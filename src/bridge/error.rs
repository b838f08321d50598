use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Simulator frame is empty")]
    EmptyFrame,

    #[error("Invalid simulator grid size: {0}")]
    InvalidGridSize(i32),

    #[error("Simulator frame of {0} words does not hold whole (identity, location) pairs")]
    TruncatedPair(usize),

    #[error("Unknown object identity code: {0}")]
    UnknownIdentity(i32),

    #[error("Location {location} is outside the simulator grid of size {grid_size}")]
    LocationOutOfGrid { location: i32, grid_size: u32 },

    #[error("Simulator frame has no self object")]
    MissingSelf,

    #[error("Simulator frame has no target")]
    MissingTarget,

    #[error("Value {0} does not fit in a simulator frame word")]
    WordOverflow(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_identity_display() {
        assert_eq!(
            BridgeError::UnknownIdentity(9).to_string(),
            "Unknown object identity code: 9"
        );
    }

    #[test]
    fn location_out_of_grid_display() {
        let e = BridgeError::LocationOutOfGrid {
            location: -3,
            grid_size: 10,
        };
        assert_eq!(
            e.to_string(),
            "Location -3 is outside the simulator grid of size 10"
        );
    }

    #[test]
    fn truncated_pair_display() {
        assert!(BridgeError::TruncatedPair(4).to_string().contains("4 words"));
    }
}
