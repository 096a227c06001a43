//! Validation mode and severity policy.
//!
//! Every finding is classified, and the mode decides how hard it lands.
//! Strict mode treats everything as fatal. Dev mode demotes orphan findings
//! to warnings so a vault under construction can still be worked on; all
//! integrity and constraint findings stay fatal in both modes.

use std::fmt;
use std::str::FromStr;

use crate::links::LinkErrorKind;
use crate::reach::ReachErrorKind;

/// Validation strictness mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Strict,
    #[default]
    Dev,
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    /// Anything other than `"strict"` selects dev mode.
    fn from_str(s: &str) -> Result<Mode, Self::Err> {
        match s {
            "strict" => Ok(Mode::Strict),
            _ => Ok(Mode::Dev),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Strict => write!(f, "strict"),
            Mode::Dev => write!(f, "dev"),
        }
    }
}

/// How hard a finding lands under a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    Warning,
}

/// The classes of findings the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueClass {
    Load,
    PropertyShape,
    ShapeExpression,
    DuplicateId,
    MisplacedReference,
    UnresolvedLink,
    DuplicateCid,
    NoRoots,
    Orphan,
}

impl LinkErrorKind {
    pub fn issue_class(self) -> IssueClass {
        match self {
            LinkErrorKind::DuplicateId => IssueClass::DuplicateId,
            LinkErrorKind::MisplacedReference => IssueClass::MisplacedReference,
            LinkErrorKind::UnresolvedLink => IssueClass::UnresolvedLink,
        }
    }
}

impl ReachErrorKind {
    pub fn issue_class(self) -> IssueClass {
        match self {
            ReachErrorKind::DuplicateCid => IssueClass::DuplicateCid,
            ReachErrorKind::NoRoots => IssueClass::NoRoots,
            ReachErrorKind::Orphan => IssueClass::Orphan,
        }
    }
}

/// The severity of a finding class under a mode.
pub fn severity(class: IssueClass, mode: Mode) -> Severity {
    match (class, mode) {
        (IssueClass::Orphan, Mode::Dev) => Severity::Warning,
        _ => Severity::Fatal,
    }
}
