//! Exception chains attached to log events
//!
//! `ThrownError` is an owned, cloneable copy of an error and its `source()`
//! chain, so events stay `Send` and can outlive the original error value.

use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ThrownError {
    kind: Option<String>,
    message: String,
    frames: Vec<String>,
    cause: Option<Box<ThrownError>>,
}

impl ThrownError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Copy an error and its whole `source()` chain.
    ///
    /// The top-level kind is the error's type name; causes reached through
    /// `dyn Error` have no known type and carry only their message.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        Self {
            kind: Some(std::any::type_name::<E>().to_string()),
            message: err.to_string(),
            frames: Vec::new(),
            cause: err.source().map(|source| Box::new(Self::from_dyn(source))),
        }
    }

    pub fn from_dyn(err: &(dyn Error + 'static)) -> Self {
        Self {
            kind: None,
            message: err.to_string(),
            frames: Vec::new(),
            cause: err.source().map(|source| Box::new(Self::from_dyn(source))),
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ThrownError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    #[must_use]
    pub fn with_frames<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frames = frames.into_iter().map(Into::into).collect();
        self
    }

    /// Record the current call stack as this error's frames
    #[must_use]
    pub fn with_captured_frames(mut self) -> Self {
        let backtrace = backtrace::Backtrace::new();
        self.frames = backtrace
            .frames()
            .iter()
            .flat_map(|frame| frame.symbols())
            .filter_map(|symbol| {
                let name = symbol.name()?.to_string();
                Some(match (symbol.filename(), symbol.lineno()) {
                    (Some(file), Some(line)) => format!("{} ({}:{})", name, file.display(), line),
                    _ => name,
                })
            })
            .collect();
        self
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn cause(&self) -> Option<&ThrownError> {
        self.cause.as_deref()
    }

    /// This error followed by each cause, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &ThrownError> {
        std::iter::successors(Some(self), |thrown| thrown.cause())
    }

    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Render as a stack trace.
    ///
    /// With `include_cause` every cause follows on a `Caused by:` line;
    /// otherwise only this error and its own frames are rendered.
    pub fn render(&self, include_cause: bool) -> String {
        let mut out = String::new();
        self.render_one(&mut out);
        if include_cause {
            for cause in self.chain().skip(1) {
                out.push_str("Caused by: ");
                cause.render_one(&mut out);
            }
        }
        out
    }

    fn render_one(&self, out: &mut String) {
        out.push_str(&self.to_string());
        out.push('\n');
        for frame in &self.frames {
            out.push_str("\tat ");
            out.push_str(frame);
            out.push('\n');
        }
    }
}

/// Header line: `kind: message`, or just the message when the kind is unknown
impl fmt::Display for ThrownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Some(kind) if self.message.is_empty() => write!(f, "{}", kind),
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
