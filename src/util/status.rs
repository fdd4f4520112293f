use std::{fmt, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    NotFound,
    AlreadyExists,
    TableEnabled,
    UnknownFamily,
    InvalidArgument,
    Busy,
    IOError,
    Corruption,
}

#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: String,
}

impl Status {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Status {
            code: Code::NotFound,
            message: msg.into(),
        }
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Status {
            code: Code::AlreadyExists,
            message: msg.into(),
        }
    }

    pub fn table_enabled(msg: impl Into<String>) -> Self {
        Status {
            code: Code::TableEnabled,
            message: msg.into(),
        }
    }

    pub fn unknown_family(msg: impl Into<String>) -> Self {
        Status {
            code: Code::UnknownFamily,
            message: msg.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Status {
            code: Code::InvalidArgument,
            message: msg.into(),
        }
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Status {
            code: Code::Busy,
            message: msg.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Status {
            code: Code::IOError,
            message: msg.into(),
        }
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Status {
            code: Code::Corruption,
            message: msg.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.code == Code::AlreadyExists
    }

    pub fn is_table_enabled(&self) -> bool {
        self.code == Code::TableEnabled
    }

    pub fn is_unknown_family(&self) -> bool {
        self.code == Code::UnknownFamily
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }

    pub fn is_busy(&self) -> bool {
        self.code == Code::Busy
    }

    pub fn is_io_error(&self) -> bool {
        self.code == Code::IOError
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}

impl From<io::Error> for Status {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ResourceBusy | io::ErrorKind::WouldBlock => {
                Status::busy(err.to_string())
            }
            _ => Status::io_error(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::corruption(err.to_string())
    }
}

impl From<glob::PatternError> for Status {
    fn from(err: glob::PatternError) -> Self {
        Status::invalid_argument(format!("Invalid pattern: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Status>;
