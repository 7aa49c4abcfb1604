use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PostResult<T> = Result<T, PostError>;
pub type PipelineResult<T> = PostResult<T>;
pub type ReaderResult<T> = PostResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostErrorCategory {
    Success,
    NotFound,
    InvalidArgument,
    InvalidInput,
    IoSystem,
    Internal,
}

impl PostErrorCategory {
    pub const fn exit_status(self) -> ExitStatus {
        match self {
            Self::Success => ExitStatus {
                exit_code: 0,
                category_name: "Success",
            },
            Self::NotFound => ExitStatus {
                exit_code: 1,
                category_name: "NotFound",
            },
            Self::InvalidArgument => ExitStatus {
                exit_code: 2,
                category_name: "InvalidArgument",
            },
            Self::InvalidInput => ExitStatus {
                exit_code: 2,
                category_name: "InvalidInput",
            },
            Self::IoSystem => ExitStatus {
                exit_code: 3,
                category_name: "IoSystem",
            },
            Self::Internal => ExitStatus {
                exit_code: 5,
                category_name: "Internal",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_status().exit_code
    }

    pub const fn category_name(self) -> &'static str {
        self.exit_status().category_name
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub exit_code: i32,
    pub category_name: &'static str,
}

/// Error carried through every pipeline.
///
/// `code` is a stable dotted identifier (for example `ARG.POINT_COORDINATES`)
/// that stays the same across message wording changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostError {
    category: PostErrorCategory,
    code: &'static str,
    message: String,
}

impl PostError {
    pub fn new(category: PostErrorCategory, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(PostErrorCategory::NotFound, code, message)
    }

    pub fn invalid_argument(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(PostErrorCategory::InvalidArgument, code, message)
    }

    pub fn invalid_input(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(PostErrorCategory::InvalidInput, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(PostErrorCategory::IoSystem, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(PostErrorCategory::Internal, code, message)
    }

    pub const fn category(&self) -> PostErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for PostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.category_name(),
            self.code,
            self.message
        )
    }
}

impl Error for PostError {}
