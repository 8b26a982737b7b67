use std::fmt;

/// Where a pipeline run currently is
///
/// Runs move strictly forward, `Idle → Extracting → Styling → Composing →
/// Done`. There is no pause, re-entry or mid-stage cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Extracting,
    Styling,
    Composing,
    Done,
}

impl PipelineStage {
    /// The stage after this one, or `None` once done
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Extracting),
            Self::Extracting => Some(Self::Styling),
            Self::Styling => Some(Self::Composing),
            Self::Composing => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Styling => "styling",
            Self::Composing => "composing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_advance_linearly() {
        let mut stage = PipelineStage::Idle;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            seen.push(stage);
        }

        assert_eq!(
            seen,
            vec![
                PipelineStage::Idle,
                PipelineStage::Extracting,
                PipelineStage::Styling,
                PipelineStage::Composing,
                PipelineStage::Done,
            ]
        );
        assert!(stage.is_terminal());
    }
}
