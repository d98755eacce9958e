// Copyright 2026 The shader-stage Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shader stage resolution for GLSL compiler front ends.
//!
//! A compiler driver usually knows, or can guess, which pipeline stage a
//! GLSL source unit targets: the file extension (`.vert`, `.frag`, ...), an
//! explicit API argument, or nothing at all. The source itself may also carry
//! a `#pragma shader_stage(<stage>)` annotation. This crate reconciles the
//! two before the parser and code generator run: it returns the effective
//! [`Stage`], or an [`Error`] describing why no single stage can be chosen.
//!
//! The pragma is a line-oriented directive, independent of macro and
//! conditional preprocessing, so resolution works on raw or preprocessed
//! source alike.
//!
//! # Examples
//!
//! Resolve the stage of a source unit whose kind the caller left open:
//!
//! ```
//! use shader_stage::{resolve, RequestedStage, Stage};
//!
//! let source = "#version 310 es
//! #pragma shader_stage(vertex)
//! void main() { gl_Position = vec4(1.); }";
//!
//! let stage = resolve(RequestedStage::Unspecified, source).unwrap();
//! assert_eq!(Stage::Vertex, stage);
//! ```
//!
//! An explicit request that disagrees with the pragma is a conflict, never a
//! silent override:
//!
//! ```
//! use shader_stage::{resolve, Error, RequestedStage, Stage};
//!
//! let source = "#pragma shader_stage(fragment)\nvoid main() {}";
//! let err = resolve(RequestedStage::Explicit(Stage::Vertex), source).unwrap_err();
//! assert_eq!(
//!     Error::StageConflict {
//!         requested: Stage::Vertex,
//!         pragma: Stage::Fragment,
//!     },
//!     err
//! );
//! ```

use std::{error, fmt, result, str};

/// Error.
///
/// Each condition is a per-unit resolution failure: the caller is expected to
/// report it and skip compiling the offending unit, not abort the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No requested stage and no stage pragma in the source.
    UnresolvableStage,
    /// A stage pragma is present but its argument is not a recognized stage
    /// name.
    ///
    /// Contains the offending argument text.
    MalformedPragma(String),
    /// The caller mandated one stage and the source pragma declares another.
    StageConflict { requested: Stage, pragma: Stage },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnresolvableStage => {
                write!(
                    f,
                    "unable to determine shader stage: no stage was requested \
                     and the source has no shader_stage pragma"
                )
            }
            Error::MalformedPragma(ref arg) => {
                if arg.is_empty() {
                    write!(f, "malformed shader_stage pragma: missing stage name")
                } else {
                    write!(
                        f,
                        "malformed shader_stage pragma: '{arg}' is not a valid stage name"
                    )
                }
            }
            Error::StageConflict { requested, pragma } => {
                write!(
                    f,
                    "conflicting shader stages: requested '{requested}' but \
                     the source declares '{pragma}'"
                )
            }
        }
    }
}

impl error::Error for Error {}

/// Resolution status.
pub type Result<T> = result::Result<T, Error>;

/// A pipeline stage a shader program can target.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
    TessControl,
    TessEvaluation,
    Geometry,
    Compute,
}

impl Stage {
    /// Returns the identifier naming this stage inside a
    /// `#pragma shader_stage(...)` annotation.
    pub fn pragma_name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
            Stage::TessControl => "tesscontrol",
            Stage::TessEvaluation => "tesseval",
            Stage::Geometry => "geometry",
            Stage::Compute => "compute",
        }
    }

    /// Maps a file extension to a stage, following the glslc file naming
    /// convention (`foo.vert` is a vertex shader, `foo.comp` a compute
    /// shader, and so on).
    ///
    /// Returns `None` for extensions outside the convention, including
    /// generic ones like `glsl`.
    pub fn from_extension(ext: &str) -> Option<Stage> {
        match ext {
            "vert" => Some(Stage::Vertex),
            "frag" => Some(Stage::Fragment),
            "tesc" => Some(Stage::TessControl),
            "tese" => Some(Stage::TessEvaluation),
            "geom" => Some(Stage::Geometry),
            "comp" => Some(Stage::Compute),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.pragma_name())
    }
}

impl str::FromStr for Stage {
    type Err = Error;

    /// Parses a stage from its pragma identifier.
    fn from_str(s: &str) -> Result<Stage> {
        match s {
            "vertex" => Ok(Stage::Vertex),
            "fragment" => Ok(Stage::Fragment),
            "tesscontrol" => Ok(Stage::TessControl),
            "tesseval" => Ok(Stage::TessEvaluation),
            "geometry" => Ok(Stage::Geometry),
            "compute" => Ok(Stage::Compute),
            _ => Err(Error::MalformedPragma(s.to_string())),
        }
    }
}

/// The stage the caller expects before the source text is inspected.
///
/// * `Explicit` mandates a stage: a disagreeing source pragma is a
///   [`Error::StageConflict`].
/// * `Default` is a fallback: a source pragma, if present, takes precedence
///   without conflict.
/// * `Unspecified` leaves the choice entirely to the source pragma.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestedStage {
    Unspecified,
    Explicit(Stage),
    Default(Stage),
}

impl RequestedStage {
    /// Derives a request from a file name: `Explicit` when the extension
    /// names a stage, `Unspecified` otherwise.
    pub fn from_file_name(file_name: &str) -> RequestedStage {
        file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| Stage::from_extension(ext))
            .map_or(RequestedStage::Unspecified, RequestedStage::Explicit)
    }
}

/// Outcome of scanning source text for a stage-declaring pragma.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PragmaStage {
    /// No `#pragma shader_stage(...)` in the source.
    Absent,
    /// A pragma naming a recognized stage.
    Valid(Stage),
    /// A pragma whose argument is not a recognized stage name; contains the
    /// argument text.
    Malformed(String),
}

/// Scans source text for the first `#pragma shader_stage(<name>)` directive.
///
/// The scan is line oriented and whitespace tolerant: spaces and tabs are
/// accepted after `#`, around `shader_stage`, and around the parenthesized
/// identifier. Later occurrences are ignored; the first syntactic match
/// decides, whether its argument is valid or not.
pub fn find_stage_pragma(source: &str) -> PragmaStage {
    for line in source.lines() {
        if let Some(arg) = stage_pragma_argument(line) {
            return match arg.parse() {
                Ok(stage) => PragmaStage::Valid(stage),
                Err(_) => PragmaStage::Malformed(arg.to_string()),
            };
        }
    }
    PragmaStage::Absent
}

/// Returns the parenthesized argument if `line` is a shader_stage pragma.
///
/// A directive that names the shader_stage pragma but deviates from the
/// documented `(<identifier>)` form is reported with an empty argument,
/// which the caller classifies as malformed.
fn stage_pragma_argument(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?;
    let rest = rest.trim_start().strip_prefix("pragma")?;
    // "#pragmashader_stage" is not a pragma directive.
    let rest = rest.strip_prefix([' ', '\t'])?;
    let rest = rest.trim_start().strip_prefix("shader_stage")?;
    if rest
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        // A longer identifier, e.g. "shader_stages".
        return None;
    }
    let rest = rest.trim_start();
    let body = match rest.strip_prefix('(') {
        Some(body) => body,
        None => return Some(""),
    };
    let (arg, tail) = match body.split_once(')') {
        Some(split) => split,
        None => return Some(""),
    };
    if !tail.trim().is_empty() {
        return Some("");
    }
    Some(arg.trim())
}

/// Resolves the effective compilation stage of a source unit.
///
/// Reconciles the caller's request with the source's `shader_stage` pragma:
///
/// * `Unspecified` request: the pragma decides; its absence is
///   [`Error::UnresolvableStage`].
/// * `Explicit` request: the request decides, but a pragma naming a
///   different stage is [`Error::StageConflict`] rather than a silent
///   override in either direction.
/// * `Default` request: the pragma decides when present, the request
///   otherwise.
///
/// A pragma with an unrecognized argument is [`Error::MalformedPragma`] in
/// every case.
///
/// This is a pure function over its arguments and safe to call concurrently.
pub fn resolve(requested: RequestedStage, source: &str) -> Result<Stage> {
    match (requested, find_stage_pragma(source)) {
        (_, PragmaStage::Malformed(arg)) => Err(Error::MalformedPragma(arg)),
        (RequestedStage::Unspecified, PragmaStage::Valid(p)) => Ok(p),
        (RequestedStage::Unspecified, PragmaStage::Absent) => Err(Error::UnresolvableStage),
        (RequestedStage::Explicit(s), PragmaStage::Absent) => Ok(s),
        (RequestedStage::Explicit(s), PragmaStage::Valid(p)) => {
            if s == p {
                Ok(s)
            } else {
                Err(Error::StageConflict {
                    requested: s,
                    pragma: p,
                })
            }
        }
        (RequestedStage::Default(s), PragmaStage::Absent) => Ok(s),
        (RequestedStage::Default(_), PragmaStage::Valid(p)) => Ok(p),
    }
}
