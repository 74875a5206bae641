use thiserror::Error;

pub type Result<T> = std::result::Result<T, MergeError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MergeError {
    /// A quadrilateral that breaks the merger's geometric preconditions.
    /// `index` is its position in the input, when known.
    #[error("invalid geometry{}: {reason}", at(.index))]
    InvalidGeometry { index: Option<usize>, reason: String },
    #[error("invalid merge option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

fn at(index: &Option<usize>) -> String {
    index
        .map(|index| format!(" at quadrilateral {index}"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_message_names_the_input() {
        let err = MergeError::InvalidGeometry {
            index: Some(3),
            reason: "bounding box 0x4 has no area".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid geometry at quadrilateral 3: bounding box 0x4 has no area"
        );
        let err = MergeError::InvalidGeometry {
            index: None,
            reason: "non-finite coordinate".into(),
        };
        assert_eq!(err.to_string(), "invalid geometry: non-finite coordinate");
    }
}
