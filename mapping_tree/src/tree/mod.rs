//! The in-memory mapping tree.
//!
//! A [`MappingTree`] holds classes keyed by their source name, each with fields, methods, and for methods the
//! arguments and local variables. Every element has one name per destination namespace.
//!
//! The tree can be filled and queried directly, or through the [visitor protocol][crate::visitor]: a
//! `&mut MappingTree` is a [`MappingVisitor`][crate::visitor::MappingVisitor], and [`MappingTree::accept`] replays
//! the content into any other visitor.

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use log::trace;
use crate::error::MappingError;
use crate::remapper::ClassRemapper;
use crate::tree::entry::{ClassEntry, FieldEntry, MetadataEntry, MethodEntry};
use crate::tree::names::Namespace;
use crate::tree::pending::PendingPool;

pub mod entry;
pub(crate) mod lookup;
pub(crate) mod pending;
pub mod visit;
mod replay;

/// The default upper bound of passes [`MappingTree::accept`] replays before giving up.
pub const DEFAULT_MAX_PASSES: usize = 16;

pub mod names {
	use std::fmt::{Debug, Formatter};

	/// Describes a namespace of a mapping tree.
	///
	/// The source namespace is separate from the destination ones, whose index is their position in
	/// [`MappingTree::dst_namespaces`][super::MappingTree::dst_namespaces].
	#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
	pub enum Namespace {
		Src,
		Dst(usize),
	}

	/// The names of an element, one slot per destination namespace.
	///
	/// Reading a slot past the end gives `None`, writing one grows the slots. Slots past the end compare equal to empty
	/// ones.
	#[derive(Clone, Default)]
	pub struct DstNames {
		names: Vec<Option<String>>,
	}

	impl DstNames {
		pub fn new(len: usize) -> DstNames {
			DstNames { names: vec![None; len] }
		}

		pub fn len(&self) -> usize {
			self.names.len()
		}

		pub fn is_empty(&self) -> bool {
			self.names.is_empty()
		}

		pub fn get(&self, namespace: usize) -> Option<&str> {
			self.names.get(namespace)?.as_deref()
		}

		/// Sets the name for the given destination namespace, returning the old one.
		pub fn set(&mut self, namespace: usize, name: Option<String>) -> Option<String> {
			if namespace >= self.names.len() {
				if name.is_none() {
					return None;
				}
				self.names.resize(namespace + 1, None);
			}
			std::mem::replace(&mut self.names[namespace], name)
		}

		/// Iterates over the namespaces that have a name.
		pub fn iter(&self) -> impl Iterator<Item=(usize, &str)> + '_ {
			self.names.iter()
				.enumerate()
				.filter_map(|(namespace, name)| name.as_deref().map(|name| (namespace, name)))
		}

		pub(crate) fn resize(&mut self, len: usize) {
			self.names.resize(len, None);
		}

		/// At each position of `table` is the old namespace to take the name from.
		pub(crate) fn remap(&mut self, table: &[Option<usize>]) {
			self.names = table.iter()
				.map(|old| old.and_then(|old| self.names.get(old).cloned().flatten()))
				.collect();
		}

		pub(crate) fn copy_from(&mut self, other: &DstNames, replace: bool) {
			for (namespace, name) in other.iter() {
				if replace || self.get(namespace).is_none() {
					self.set(namespace, Some(name.to_owned()));
				}
			}
		}
	}

	impl PartialEq for DstNames {
		fn eq(&self, other: &Self) -> bool {
			self.iter().eq(other.iter())
		}
	}

	impl Eq for DstNames {}

	impl Debug for DstNames {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	impl<const N: usize> From<[Option<&str>; N]> for DstNames {
		fn from(value: [Option<&str>; N]) -> Self {
			DstNames { names: value.iter().map(|x| x.map(str::to_owned)).collect() }
		}
	}

}

/// A mutable mapping tree.
///
/// Filling it through several visitation passes merges them: a pass may use the tree's source namespace or any of
/// its destination namespaces as its own source namespace, and may bring new destination namespaces along.
#[derive(Debug, Clone)]
pub struct MappingTree {
	pub(crate) src_namespace: Option<String>,
	pub(crate) dst_namespaces: Vec<String>,
	pub(crate) metadata: Vec<MetadataEntry>,
	pub(crate) classes: IndexMap<String, ClassEntry>,
	/// Entries of passes over another namespace that couldn't be matched to a tree entry yet.
	pub(crate) pending: PendingPool,
	pub(crate) max_passes: usize,
}

impl Default for MappingTree {
	fn default() -> Self {
		MappingTree::new()
	}
}

impl PartialEq for MappingTree {
	fn eq(&self, other: &Self) -> bool {
		self.src_namespace == other.src_namespace &&
			self.dst_namespaces == other.dst_namespaces &&
			self.metadata == other.metadata &&
			self.classes == other.classes
	}
}

impl MappingTree {
	pub fn new() -> MappingTree {
		MappingTree {
			src_namespace: None,
			dst_namespaces: Vec::new(),
			metadata: Vec::new(),
			classes: IndexMap::new(),
			pending: PendingPool::default(),
			max_passes: DEFAULT_MAX_PASSES,
		}
	}

	pub fn src_namespace(&self) -> Option<&str> {
		self.src_namespace.as_deref()
	}

	pub fn dst_namespaces(&self) -> &[String] {
		&self.dst_namespaces
	}

	/// Returns the namespace with the given name, if the tree has it.
	pub fn namespace(&self, name: &str) -> Option<Namespace> {
		if self.src_namespace.as_deref() == Some(name) {
			Some(Namespace::Src)
		} else {
			self.dst_namespaces.iter()
				.position(|namespace| namespace == name)
				.map(Namespace::Dst)
		}
	}

	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		self.namespace(name)
			.ok_or_else(|| MappingError::UnknownNamespace { namespace: name.to_owned() }.into())
	}

	pub(crate) fn check_namespace(&self, namespace: Namespace) -> Result<()> {
		match namespace {
			Namespace::Dst(id) if id >= self.dst_namespaces.len() => {
				bail!("no destination namespace with id {id}, only got {:?}", self.dst_namespaces);
			},
			_ => Ok(()),
		}
	}

	/// Upper bound of passes [`MappingTree::accept`] replays if the visitor keeps asking for more.
	pub fn max_passes(&self) -> usize {
		self.max_passes
	}

	pub fn set_max_passes(&mut self, max_passes: usize) {
		self.max_passes = max_passes;
	}

	pub fn metadata(&self) -> &[MetadataEntry] {
		&self.metadata
	}

	/// All values of the given key, in insertion order.
	pub fn metadata_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item=&'a MetadataEntry> + 'a {
		self.metadata.iter().filter(move |entry| entry.key == key)
	}

	pub fn add_metadata(&mut self, entry: MetadataEntry) {
		self.metadata.push(entry);
	}

	/// Removes all entries with the given key, returning whether there was any.
	pub fn remove_metadata(&mut self, key: &str) -> bool {
		let len = self.metadata.len();
		self.metadata.retain(|entry| entry.key != key);
		self.metadata.len() != len
	}

	pub fn classes(&self) -> impl Iterator<Item=&ClassEntry> {
		self.classes.values()
	}

	pub fn classes_mut(&mut self) -> impl Iterator<Item=&mut ClassEntry> {
		self.classes.values_mut()
	}

	pub fn class(&self, src_name: &str) -> Option<&ClassEntry> {
		self.classes.get(src_name)
	}

	pub fn class_mut(&mut self, src_name: &str) -> Option<&mut ClassEntry> {
		self.classes.get_mut(src_name)
	}

	/// Finds a class by its name in the given namespace.
	pub fn class_by_name(&self, name: &str, namespace: Namespace) -> Option<&ClassEntry> {
		match namespace {
			Namespace::Src => self.classes.get(name),
			Namespace::Dst(id) => self.classes.values().find(|class| class.info.dst_names.get(id) == Some(name)),
		}
	}

	/// Adds a class, merging it into an existing one with the same source name.
	///
	/// When merging, the names and comments of `class` win over the existing ones.
	pub fn add_class(&mut self, mut class: ClassEntry) -> &mut ClassEntry {
		class.resize_dst_names(self.dst_namespaces.len());

		match self.classes.entry(class.src_name().to_owned()) {
			indexmap::map::Entry::Occupied(e) => {
				let existing = e.into_mut();
				existing.copy_from(&class, true);
				existing
			},
			indexmap::map::Entry::Vacant(e) => e.insert(class),
		}
	}

	pub fn remove_class(&mut self, src_name: &str) -> Option<ClassEntry> {
		self.classes.shift_remove(src_name)
	}

	pub fn field(&self, class_src_name: &str, src_name: &str, src_desc: Option<&str>) -> Option<&FieldEntry> {
		self.class(class_src_name)?.field(src_name, src_desc)
	}

	pub fn method(&self, class_src_name: &str, src_name: &str, src_desc: Option<&str>) -> Option<&MethodEntry> {
		self.class(class_src_name)?.method(src_name, src_desc)
	}

	/// Finds a field by the names of the class and field in the given namespace.
	///
	/// The descriptor is in the given namespace as well. A partial or missing descriptor on either side matches.
	pub fn field_by_name(&self, class_name: &str, name: &str, desc: Option<&str>, namespace: Namespace) -> Result<Option<&FieldEntry>> {
		self.check_namespace(namespace)?;
		let Some(class) = self.class_by_name(class_name, namespace) else {
			return Ok(None);
		};
		let remapper = self.class_names(Namespace::Src, namespace);
		Ok(lookup::find_member_in(class.fields_map(), name, desc, namespace, &remapper)?
			.and_then(|index| class.fields_map().get_index(index))
			.map(|(_, field)| field))
	}

	/// Finds a method by the names of the class and method in the given namespace.
	///
	/// See [`MappingTree::field_by_name`].
	pub fn method_by_name(&self, class_name: &str, name: &str, desc: Option<&str>, namespace: Namespace) -> Result<Option<&MethodEntry>> {
		self.check_namespace(namespace)?;
		let Some(class) = self.class_by_name(class_name, namespace) else {
			return Ok(None);
		};
		let remapper = self.class_names(Namespace::Src, namespace);
		Ok(lookup::find_member_in(class.methods_map(), name, desc, namespace, &remapper)?
			.and_then(|index| class.methods_map().get_index(index))
			.map(|(_, method)| method))
	}

	/// Maps class names between two namespaces, for every class that has a name in both.
	pub(crate) fn class_names(&self, from: Namespace, to: Namespace) -> IndexMap<String, String> {
		self.classes.values()
			.filter_map(|class| Some((class.name(from)?.to_owned(), class.name(to)?.to_owned())))
			.collect()
	}

	/// Computes the descriptor in another namespace, by replacing every class name in it.
	///
	/// Descriptors are only stored in the source namespace, the ones for destination namespaces are made on the fly
	/// from the current class names.
	pub fn map_desc(&self, desc: &str, from: Namespace, to: Namespace) -> Result<String> {
		self.check_namespace(from)?;
		self.check_namespace(to)?;
		if from == to {
			return Ok(desc.to_owned());
		}
		self.class_names(from, to)
			.map_desc(desc)
			.with_context(|| anyhow!("failed to map descriptor {desc:?} from {from:?} to {to:?}"))
	}

	pub(crate) fn resize_dst_names(&mut self, len: usize) {
		trace!("resizing destination names of {} classes to {len}", self.classes.len());
		for class in self.classes.values_mut() {
			class.resize_dst_names(len);
		}
		self.pending.resize_dst_names(len);
	}

	/// Number of pending classes and members still waiting for a pass that tells where they belong.
	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}

	/// Drops all pending entries, returning how many there were.
	pub fn discard_pending(&mut self) -> usize {
		let len = self.pending.len();
		self.pending = PendingPool::default();
		len
	}
}
