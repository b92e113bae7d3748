//! Core functionality for ls2sampler
//!
//! This crate turns the text printed by `ldms_ls -l [-v]` into a structured
//! [`Listing`] and renders it as `test_sampler` configuration directives.
//!
//! ```text
//! raw text -> LineClassifier -> ListingParser -> Listing -> Emitter -> directives
//! ```
//!
//! ```
//! use ls2sampler_core::{Emitter, SamplerSettings, SchemaRegistry, parse_listing};
//!
//! let text = "\
//! Schema Instance Flags Msize Dsize UID GID Perm Update Duration Info
//! S P/I C 10 20 0 0 -rwxr-xr-- 1.5 0.25
//! ====
//!
//! P/I: consistent, last update: T
//! D u32 m 7
//! ";
//! let listing = parse_listing(text)?;
//! assert_eq!(listing.get("I").unwrap().data()["m"].as_int(), Some(7));
//!
//! let settings = SamplerSettings::default();
//! let mut out = Vec::new();
//! Emitter::new(&settings).write_to(&listing, &mut SchemaRegistry::new(), &mut out)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod decoder;
pub mod emitter;
pub mod error;
pub mod model;
pub mod parser;


pub use classifier::{Line, LineClassifier};
pub use decoder::{ScalarType, Value, ValueType, decode};
pub use emitter::{Directive, Emitter, MetricSpec, SamplerSettings, SchemaRegistry};
pub use error::{DecodeError, EmitError, ErrorKind, ParseError};
pub use model::{Listing, Metric, SetMetadata, SetRecord, core_set_name};
pub use parser::{ListingParser, SectionState, parse_listing, read_listing};
