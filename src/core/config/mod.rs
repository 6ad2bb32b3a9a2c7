// ─── Launch-File Interpreter ───
// Turns the lines of a launch file into a `LaunchDescriptor`.

mod compare;
mod condition;
mod descriptor;
mod directive;
mod environment;
mod expand;
mod words;

pub use compare::{param_compare, parse_version_segments, version_compare, VersionSegment};
pub use condition::Conditional;
pub use descriptor::{LaunchDescriptor, NativeLib, Resource};
pub use directive::{Directive, Interpreter};
pub use environment::{Environment, OPAQUE_BASE};
pub use expand::expand;
pub use words::{is_comment_or_blank, split_words};

/// Launch-file language version implemented here. Files may `require` any
/// minor version up to this one within the same major version.
pub const MAJOR_VERSION: u32 = 1;
pub const MINOR_VERSION: u32 = 2;
