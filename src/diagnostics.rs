// ABOUTME: Diagnostics accumulator for non-fatal warnings during an operation.
// ABOUTME: Collects problems that shouldn't fail a deploy but should be shown to the operator.

/// Collects non-fatal warnings during deployer operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings of one kind.
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// A non-fatal warning collected during an operation.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// An `after-*` hook failed.
    pub fn hook_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HookFailed,
            message: message.into(),
        }
    }

    /// The commit id for a staged revision could not be determined.
    pub fn commit_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CommitUnavailable,
            message: message.into(),
        }
    }

    /// An object marked gzip could not be decompressed and was copied raw.
    pub fn corrupt_object(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CorruptObject,
            message: message.into(),
        }
    }

    /// The current revision pointer could not be read as a revision.
    pub fn invalid_pointer(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::InvalidPointer,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    HookFailed,
    CommitUnavailable,
    CorruptObject,
    InvalidPointer,
}
