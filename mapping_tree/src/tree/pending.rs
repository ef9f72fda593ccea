//! Entries of passes over another namespace than the source namespace of the tree.
//!
//! Such a pass only knows the names in one of the destination namespaces (the "alternate" namespace). Elements it
//! declares that the tree can't find by that name yet are queued here, and resolved at the end of each pass once the
//! tree has learned more names. Entries that still can't be resolved are carried to the next pass.

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use crate::remapper::ClassRemapper;
use crate::tree::entry::{ArgEntry, ClassEntry, ElementInfo, FieldEntry, Member, MethodEntry, VarEntry};
use crate::tree::lookup;
use crate::tree::MappingTree;
use crate::tree::names::Namespace;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MemberKind {
	Field,
	Method,
}

impl MemberKind {
	pub(crate) fn of<T: Member>() -> MemberKind {
		if T::IS_METHOD { MemberKind::Method } else { MemberKind::Field }
	}
}

#[derive(Debug, Clone)]
pub(crate) struct PendingClass {
	pub(crate) alt_ns: usize,
	pub(crate) alt_name: String,
	/// Only known if a pass maps to the source namespace of the tree.
	pub(crate) src_name: Option<String>,
	pub(crate) info: ElementInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum PendingOwner {
	Tree(String),
	Pending(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct PendingMember {
	pub(crate) owner: PendingOwner,
	pub(crate) kind: MemberKind,
	pub(crate) alt_ns: usize,
	pub(crate) alt_name: String,
	pub(crate) alt_desc: Option<String>,
	pub(crate) src_name: Option<String>,
	pub(crate) info: ElementInfo,
	pub(crate) args: Vec<ArgEntry>,
	pub(crate) vars: Vec<VarEntry>,
}

type MemberIndexKey = (PendingOwner, MemberKind, usize, String, Option<String>);

/// Arena of pending entries, with side tables from the alternate names to the handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingPool {
	pub(crate) classes: Vec<PendingClass>,
	pub(crate) members: Vec<PendingMember>,
	class_index: IndexMap<(usize, String), usize>,
	member_index: IndexMap<MemberIndexKey, usize>,
}

impl PendingPool {
	pub(crate) fn len(&self) -> usize {
		self.classes.len() + self.members.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the handle of the pending class with the given alternate name, creating it if needed.
	pub(crate) fn queue_class(&mut self, alt_ns: usize, alt_name: &str, dst_len: usize) -> usize {
		let key = (alt_ns, alt_name.to_owned());
		if let Some(&index) = self.class_index.get(&key) {
			return index;
		}

		debug!("queueing pending class {alt_name:?}");
		let mut info = ElementInfo::new(dst_len);
		info.dst_names.set(alt_ns, Some(alt_name.to_owned()));
		self.push_class(PendingClass { alt_ns, alt_name: alt_name.to_owned(), src_name: None, info })
	}

	/// Returns the handle of the pending member with the given owner and alternate name, creating it if needed.
	pub(crate) fn queue_member(&mut self, owner: PendingOwner, kind: MemberKind, alt_ns: usize, alt_name: &str, alt_desc: Option<&str>, dst_len: usize)
			-> usize {
		let key = (owner.clone(), kind, alt_ns, alt_name.to_owned(), alt_desc.map(str::to_owned));
		if let Some(&index) = self.member_index.get(&key) {
			return index;
		}

		debug!("queueing pending {kind:?} {alt_name:?} {alt_desc:?} of {owner:?}");
		let mut info = ElementInfo::new(dst_len);
		info.dst_names.set(alt_ns, Some(alt_name.to_owned()));
		self.push_member(PendingMember {
			owner,
			kind,
			alt_ns,
			alt_name: alt_name.to_owned(),
			alt_desc: alt_desc.map(str::to_owned),
			src_name: None,
			info,
			args: Vec::new(),
			vars: Vec::new(),
		})
	}

	fn push_class(&mut self, class: PendingClass) -> usize {
		let index = self.classes.len();
		self.class_index.insert((class.alt_ns, class.alt_name.clone()), index);
		self.classes.push(class);
		index
	}

	fn push_member(&mut self, member: PendingMember) -> usize {
		let index = self.members.len();
		let key = (member.owner.clone(), member.kind, member.alt_ns, member.alt_name.clone(), member.alt_desc.clone());
		self.member_index.insert(key, index);
		self.members.push(member);
		index
	}

	/// Drops every entry queued after the pool had the given lengths.
	pub(crate) fn truncate(&mut self, classes: usize, members: usize) {
		self.classes.truncate(classes);
		self.members.truncate(members);
		self.class_index.truncate(classes);
		self.member_index.truncate(members);
	}

	pub(crate) fn resize_dst_names(&mut self, len: usize) {
		for class in &mut self.classes {
			class.info.dst_names.resize(len);
		}
		for member in &mut self.members {
			member.info.dst_names.resize(len);
			for arg in &mut member.args {
				arg.info.dst_names.resize(len);
			}
			for var in &mut member.vars {
				var.info.dst_names.resize(len);
			}
		}
	}

	/// Moves the names like [`DstNames::remap`][crate::tree::names::DstNames], dropping the entries whose alternate
	/// namespace is gone.
	pub(crate) fn remap_dst_names(&mut self, table: &[Option<usize>]) {
		let old = std::mem::take(self);
		let new_ns = |old_ns: usize| table.iter().position(|&x| x == Some(old_ns));

		let mut class_handles = vec![None; old.classes.len()];
		for (index, mut class) in old.classes.into_iter().enumerate() {
			let Some(alt_ns) = new_ns(class.alt_ns) else {
				warn!("dropping pending class {:?}, its namespace was removed", class.alt_name);
				continue;
			};
			class.alt_ns = alt_ns;
			class.info.dst_names.remap(table);
			class_handles[index] = Some(self.push_class(class));
		}

		for mut member in old.members {
			let owner = match member.owner {
				PendingOwner::Tree(name) => Some(PendingOwner::Tree(name)),
				PendingOwner::Pending(index) => class_handles[index].map(PendingOwner::Pending),
			};
			let (Some(owner), Some(alt_ns)) = (owner, new_ns(member.alt_ns)) else {
				warn!("dropping pending {:?} {:?}, its namespace was removed", member.kind, member.alt_name);
				continue;
			};
			member.owner = owner;
			member.alt_ns = alt_ns;
			member.info.dst_names.remap(table);
			for arg in &mut member.args {
				arg.info.dst_names.remap(table);
			}
			for var in &mut member.vars {
				var.info.dst_names.remap(table);
			}
			self.push_member(member);
		}
	}
}

/// Class names between the source namespace and one destination namespace, in both directions.
struct AltNames {
	alt_to_src: IndexMap<String, String>,
	src_to_alt: IndexMap<String, String>,
}

impl MappingTree {
	fn alt_names<'c>(&self, cache: &'c mut IndexMap<usize, AltNames>, alt_ns: usize) -> &'c AltNames {
		cache.entry(alt_ns).or_insert_with(|| AltNames {
			alt_to_src: self.class_names(Namespace::Dst(alt_ns), Namespace::Src),
			src_to_alt: self.class_names(Namespace::Src, Namespace::Dst(alt_ns)),
		})
	}

	/// Merges the pending entries into the tree, as far as the tree now knows where they belong.
	pub(crate) fn resolve_pending(&mut self) -> Result<()> {
		if self.pending.is_empty() {
			return Ok(());
		}
		let pending = std::mem::take(&mut self.pending);
		let dst_len = self.dst_namespaces.len();

		let mut cache = IndexMap::new();
		let mut class_names = vec![None; pending.classes.len()];
		let mut class_handles = vec![None; pending.classes.len()];
		let mut resolved = 0usize;

		for (index, class) in pending.classes.into_iter().enumerate() {
			let src_name = match &class.src_name {
				Some(src_name) => Some(src_name.clone()),
				None => self.alt_names(&mut cache, class.alt_ns).alt_to_src.get(&class.alt_name).cloned(),
			};

			match src_name {
				Some(src_name) => {
					let mut entry = ClassEntry::with_dst_len(&src_name, dst_len);
					entry.info = class.info;
					self.add_class(entry);
					class_names[index] = Some(src_name);
					resolved += 1;
				},
				None => {
					class_handles[index] = Some(self.pending.push_class(class));
				},
			}
		}

		// class names changed
		cache.clear();

		for member in pending.members {
			let owner = match &member.owner {
				PendingOwner::Tree(name) => Some(name.clone()),
				PendingOwner::Pending(index) => class_names[*index].clone(),
			};
			let Some(owner) = owner else {
				let mut member = member;
				if let PendingOwner::Pending(index) = member.owner {
					if let Some(handle) = class_handles[index] {
						member.owner = PendingOwner::Pending(handle);
						self.pending.push_member(member);
					}
				}
				continue;
			};

			match self.resolve_member(&mut cache, &owner, member)
				.with_context(|| anyhow!("failed to resolve pending member of class {owner:?}"))? {
				None => resolved += 1,
				Some(mut member) => {
					member.owner = PendingOwner::Tree(owner);
					self.pending.push_member(member);
				},
			}
		}

		debug!("resolved {resolved} pending entries");
		if !self.pending.is_empty() {
			warn!("carrying {} pending classes and {} pending members to the next pass, the tree doesn't know their source names yet",
				self.pending.classes.len(), self.pending.members.len());
		}
		Ok(())
	}

	/// Returns the member back if it can't be resolved yet.
	fn resolve_member(&mut self, cache: &mut IndexMap<usize, AltNames>, owner: &str, member: PendingMember) -> Result<Option<PendingMember>> {
		let alt_ns = Namespace::Dst(member.alt_ns);
		let names = self.alt_names(cache, member.alt_ns);

		let src_desc = member.alt_desc.as_deref()
			.map(|desc| names.alt_to_src.map_desc(desc))
			.transpose()?;

		let Some(class) = self.classes.get(owner) else {
			return Ok(Some(member));
		};

		let src_name = match &member.src_name {
			Some(src_name) => src_name.clone(),
			None => {
				let found = match member.kind {
					MemberKind::Field => lookup::find_member_in(class.fields_map(), &member.alt_name, member.alt_desc.as_deref(), alt_ns, &names.src_to_alt)?
						.and_then(|index| class.fields_map().get_index(index))
						.map(|(_, field)| field.src_name().to_owned()),
					MemberKind::Method => lookup::find_member_in(class.methods_map(), &member.alt_name, member.alt_desc.as_deref(), alt_ns, &names.src_to_alt)?
						.and_then(|index| class.methods_map().get_index(index))
						.map(|(_, method)| method.src_name().to_owned()),
				};
				match found {
					Some(src_name) => src_name,
					None => return Ok(Some(member)),
				}
			},
		};

		let Some(class) = self.classes.get_mut(owner) else {
			return Ok(Some(member));
		};
		match member.kind {
			MemberKind::Field => {
				let mut field = FieldEntry::new(&src_name, src_desc.as_deref());
				field.info = member.info;
				class.merge_member(field, true);
			},
			MemberKind::Method => {
				let mut method = MethodEntry::new(&src_name, src_desc.as_deref());
				method.info = member.info;
				for arg in member.args {
					method.add_arg(arg);
				}
				for var in member.vars {
					method.add_var(var);
				}
				class.merge_member(method, true);
			},
		}
		Ok(None)
	}
}
