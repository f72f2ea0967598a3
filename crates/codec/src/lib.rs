//! # Shortid Codec
//!
//! Generation, parsing, and classification of display identifiers.
//!
//! Every persisted record carries an opaque store-assigned internal key.
//! Display identifiers are the short, human-readable second form:
//!
//! ```text
//! CLI_L8X5M2A7K
//! └┬┘ └──┬──┘└┬┘
//! prefix │    random suffix (fixed length)
//!        base-36 millis since epoch
//! ```
//!
//! ## Example
//!
//! ```
//! use shortid_codec::{generate, parse, EntityKind};
//!
//! let id = generate(EntityKind::Client);
//! let parsed = parse(&id).expect("generated ids always parse");
//! assert_eq!(parsed.kind, Some(EntityKind::Client));
//! assert_eq!(parsed.prefix.as_str(), "CLI");
//! ```

mod friendly;
mod generate;
mod kind;
mod parse;
mod resolve;

pub use friendly::user_facing_id;
pub use generate::{generate, generate_at, generate_for_prefix, ID_ALPHABET, SUFFIX_LEN};
pub use kind::{prefix_for, EntityKind, Prefix, PrefixLookup};
pub use parse::{is_well_formed, parse, ParsedId};
pub use resolve::{classify, IdShape, ResolverConfig};
