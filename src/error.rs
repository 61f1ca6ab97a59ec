/// Broad failure categories. Each maps to a stable process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments or configuration.
    Usage,
    /// Writing an output file failed.
    Io,
    /// A dataset could not be fetched, read, or parsed.
    Fetch,
    /// The topology document is missing an object or references bad arcs.
    MalformedTopology,
    /// A county has no matching education record.
    MissingJoinKey,
    /// Terminal setup, drawing, or event handling failed.
    Terminal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Usage => 2,
            ErrorKind::Io => 3,
            ErrorKind::Fetch => 4,
            ErrorKind::MalformedTopology => 5,
            ErrorKind::MissingJoinKey => 6,
            ErrorKind::Terminal => 7,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn topology(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedTopology, message)
    }

    /// A county feature whose fips has no education record.
    pub fn missing_join_key(fips: u32) -> Self {
        Self::new(
            ErrorKind::MissingJoinKey,
            format!("No education record for county FIPS {fips}."),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
