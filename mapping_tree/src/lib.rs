//! Crate for holding, merging and replaying mappings: tables giving classes, fields, methods, method arguments and
//! local variables a name in several namespaces.
//!
//! Everything producing or consuming mappings speaks the [visitor protocol][visitor]. The [`MappingTree`] is a
//! consumer that merges any number of passes, and a producer replaying its content in a configurable
//! [order][order::VisitOrder].
//!
//! ```
//! use mapping_tree::order::VisitOrder;
//! use mapping_tree::tree::entry::ClassEntry;
//! use mapping_tree::tree::names::Namespace;
//! use mapping_tree::MappingTree;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tree = MappingTree::new();
//! tree.set_src_namespace("official")?;
//! tree.set_dst_namespaces(vec!["named".to_owned()])?;
//!
//! let mut class = ClassEntry::new("a");
//! class.info.dst_names.set(0, Some("pkg/Main".to_owned()));
//! tree.add_class(class);
//!
//! let mut copy = MappingTree::new();
//! tree.accept(&mut copy, &VisitOrder::by_name())?;
//! assert_eq!(copy.class_by_name("pkg/Main", Namespace::Dst(0)).map(|c| c.src_name()), Some("a"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod visitor;

pub mod tree;
mod action;

pub mod order;
pub mod remapper;

pub use error::MappingError;
pub use tree::MappingTree;
