//! Line-oriented **figure command** text format.
//!
//! The format is used for clipboard exchange of scene figures: every
//! non-blank line is one command, introduced by a keyword and followed by
//! whitespace-separated `x,y,z` coordinate triples. Each command maps to
//! exactly one figure on the consuming side.
//!
//! This crate is intentionally dependency-free so clipboard integrations
//! and scripting tools can consume the format without pulling in any
//! engine or GPU code.
//!
//! # Commands
//!
//! | Keyword | Triples | Meaning |
//! |---------|---------|---------|
//! | `POINT` | 1 | a single point figure |
//! | `LINE` | 2 | a line segment figure |
//! | `TRIANGLE` | 3 | a triangle figure |
//!
//! Lines starting with `#` are comments. Keywords are case-insensitive.
//!
//! # Quick start
//!
//! ```rust
//! use orrery_figcmd::{parse_str, FigCmd};
//!
//! let src = "POINT 0,0,0\nTRIANGLE 0,0,0 1,0,0 0,1,0";
//! let cmds = parse_str(src).unwrap();
//! assert_eq!(cmds.len(), 2);
//! assert!(matches!(cmds[1], FigCmd::Triangle(_)));
//! ```

pub mod cmd;
pub mod error;
pub mod parser;

pub use cmd::{Coord, FigCmd};
pub use error::ParseError;
pub use parser::parse_str;

/// Formats a command list back into text, one command per line.
///
/// `parse_str(&to_string(&cmds))` reproduces `cmds` exactly (coordinate
/// values permitting — formatting uses Rust's shortest-roundtrip float
/// output, which is lossless for `f32`).
pub fn to_string(cmds: &[FigCmd]) -> String {
    let mut out = String::new();
    for cmd in cmds {
        out.push_str(&cmd.to_string());
        out.push('\n');
    }
    out
}
