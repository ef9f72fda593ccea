//! The tree as the consumer of a pass.
//!
//! `&mut MappingTree` is a [`MappingVisitor`]. The states of the pass hold the exclusive borrow of the tree, so the
//! tree can't be queried or changed directly while a pass is open. Dropping any state of the pass before
//! [`ContentVisitor::visit_end`] aborts the pass: what it already merged stays, its pending entries are dropped.
//!
//! ```
//! use std::ops::ControlFlow;
//! use mapping_tree::MappingTree;
//! use mapping_tree::visitor::{ContentVisitor, ElementVisitor, HeaderVisitor, MappingVisitor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tree = MappingTree::new();
//! let mut header = (&mut tree).visit_namespaces("a", &["b".to_owned()])?;
//! header.visit_metadata("k", None)?;
//! if let ControlFlow::Continue(content) = header.visit_content()? {
//! 	if let ControlFlow::Continue((_, mut class)) = content.visit_class("A")? {
//! 		class.visit_dst_name(0, "B")?;
//! 	}
//! }
//! assert!(tree.class("A").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! The tree can't be touched while a pass is open:
//!
//! ```compile_fail
//! use mapping_tree::MappingTree;
//! use mapping_tree::tree::entry::ClassEntry;
//! use mapping_tree::visitor::{HeaderVisitor, MappingVisitor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tree = MappingTree::new();
//! let mut header = (&mut tree).visit_namespaces("a", &["b".to_owned()])?;
//! tree.add_class(ClassEntry::new("A"));
//! header.visit_metadata("k", None)?;
//! # Ok(())
//! # }
//! ```
//!
//! And members can only be declared inside a class:
//!
//! ```compile_fail
//! use std::ops::ControlFlow;
//! use mapping_tree::MappingTree;
//! use mapping_tree::visitor::{ClassContentVisitor, HeaderVisitor, MappingVisitor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tree = MappingTree::new();
//! let header = (&mut tree).visit_namespaces("a", &[])?;
//! if let ControlFlow::Continue(content) = header.visit_content()? {
//! 	content.visit_field("f", Some("I"))?;
//! }
//! # Ok(())
//! # }
//! ```

use std::ops::ControlFlow;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use log::{debug, trace};
use crate::error::MappingError;
use crate::remapper::ClassRemapper;
use crate::tree::entry::{is_better_desc, ArgEntry, ClassEntry, ElementInfo, FieldEntry, Member, MetadataEntry, MethodEntry, VarEntry};
use crate::tree::lookup;
use crate::tree::MappingTree;
use crate::tree::names::Namespace;
use crate::tree::pending::{MemberKind, PendingOwner};
use crate::visitor::{
	ClassContentVisitor, ContentVisitor, ElementContentVisitor, ElementVisitor, HeaderVisitor, MappingFlags, MappingVisitor,
	MemberVisitor, MethodContentVisitor,
};

/// Where the names of a declared class go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassTarget {
	/// The source name of the class in the tree.
	Tree(String),
	Pending(usize),
}

/// Where the names of a declared field or method go.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum MemberTarget {
	/// The index into the fields or methods of the owning class in the tree.
	Tree(usize),
	Pending(usize),
}

struct PassState<'a> {
	tree: &'a mut MappingTree,
	/// The namespace of the tree the pass uses as its source namespace.
	src: Namespace,
	/// For each destination namespace of the pass, the namespace of the tree.
	dst_map: Vec<Namespace>,
	/// Only filled if `src` is a destination namespace.
	alt_to_src: IndexMap<String, String>,
	src_to_alt: IndexMap<String, String>,
	/// Length of the pending pool at the start of the pass.
	pending_mark: (usize, usize),
	finished: bool,
}

impl Drop for PassState<'_> {
	fn drop(&mut self) {
		if !self.finished {
			debug!("pass aborted, dropping its pending entries");
			let (classes, members) = self.pending_mark;
			self.tree.pending.truncate(classes, members);
		}
	}
}

fn namespace_collision(namespace: &str) -> MappingError {
	MappingError::NamespaceCollision { namespace: namespace.to_owned() }
}

/// Each element takes at most one comment per pass.
fn check_comment(commented: &mut bool, element: impl FnOnce() -> String) -> Result<()> {
	if std::mem::replace(commented, true) {
		bail!(MappingError::DuplicateComment { element: element() });
	}
	Ok(())
}

impl<'a> PassState<'a> {
	/// Validates the namespaces of the pass, and only then adds its new destination namespaces to the tree.
	fn new(tree: &'a mut MappingTree, src_namespace: &str, dst_namespaces: &[String]) -> Result<PassState<'a>> {
		for (index, namespace) in dst_namespaces.iter().enumerate() {
			if namespace == src_namespace {
				bail!(namespace_collision(namespace));
			}
			if dst_namespaces[..index].contains(namespace) {
				bail!(MappingError::DuplicateDstNamespace { namespace: namespace.clone() });
			}
		}

		let pending_mark = (tree.pending.classes.len(), tree.pending.members.len());

		let Some(tree_src) = tree.src_namespace.clone() else {
			debug!("first pass, adopting namespaces {src_namespace:?} -> {dst_namespaces:?}");
			tree.src_namespace = Some(src_namespace.to_owned());
			tree.dst_namespaces = dst_namespaces.to_vec();
			tree.resize_dst_names(dst_namespaces.len());

			return Ok(PassState {
				tree,
				src: Namespace::Src,
				dst_map: (0..dst_namespaces.len()).map(Namespace::Dst).collect(),
				alt_to_src: IndexMap::new(),
				src_to_alt: IndexMap::new(),
				pending_mark,
				finished: false,
			});
		};

		let src = if src_namespace == tree_src {
			Namespace::Src
		} else {
			tree.dst_namespaces.iter()
				.position(|namespace| namespace == src_namespace)
				.map(Namespace::Dst)
				.ok_or_else(|| MappingError::DisassociatedSrcNamespace { namespace: src_namespace.to_owned() })?
		};

		let mut new_namespaces = Vec::new();
		let mut dst_map = Vec::with_capacity(dst_namespaces.len());
		for namespace in dst_namespaces {
			let target = if *namespace == tree_src {
				Namespace::Src
			} else if let Some(id) = tree.dst_namespaces.iter().position(|x| x == namespace) {
				Namespace::Dst(id)
			} else {
				new_namespaces.push(namespace.clone());
				Namespace::Dst(tree.dst_namespaces.len() + new_namespaces.len() - 1)
			};
			dst_map.push(target);
		}

		if !new_namespaces.is_empty() {
			debug!("adding destination namespaces {new_namespaces:?}");
			tree.dst_namespaces.extend(new_namespaces);
			let len = tree.dst_namespaces.len();
			tree.resize_dst_names(len);
		}

		let (alt_to_src, src_to_alt) = match src {
			Namespace::Src => (IndexMap::new(), IndexMap::new()),
			Namespace::Dst(alt) => (tree.class_names(Namespace::Dst(alt), Namespace::Src), tree.class_names(Namespace::Src, Namespace::Dst(alt))),
		};

		debug!("merging pass {src_namespace:?} -> {dst_namespaces:?} onto {src:?} -> {dst_map:?}");
		Ok(PassState { tree, src, dst_map, alt_to_src, src_to_alt, pending_mark, finished: false })
	}

	fn dst_len(&self) -> usize {
		self.tree.dst_namespaces.len()
	}

	fn dst_namespace(&self, namespace: usize) -> Result<Namespace> {
		self.dst_map.get(namespace)
			.copied()
			.with_context(|| anyhow!("destination namespace {namespace} out of range, the pass only has {}", self.dst_map.len()))
	}

	fn declare_class(&mut self, name: &str) -> ClassTarget {
		let dst_len = self.dst_len();
		match self.src {
			Namespace::Src => {
				if !self.tree.classes.contains_key(name) {
					self.tree.classes.insert(name.to_owned(), ClassEntry::with_dst_len(name, dst_len));
				}
				ClassTarget::Tree(name.to_owned())
			},
			Namespace::Dst(alt) => match self.alt_to_src.get(name) {
				Some(src_name) => {
					trace!("class {name:?} is {src_name:?}");
					ClassTarget::Tree(src_name.clone())
				},
				None => ClassTarget::Pending(self.tree.pending.queue_class(alt, name, dst_len)),
			},
		}
	}

	fn class_mut(&mut self, name: &str) -> Result<&mut ClassEntry> {
		self.tree.classes.get_mut(name)
			.with_context(|| anyhow!("class {name:?} was removed during the pass"))
	}

	fn class_info(&mut self, target: &ClassTarget) -> Result<&mut ElementInfo> {
		match target {
			ClassTarget::Tree(name) => Ok(&mut self.class_mut(name)?.info),
			ClassTarget::Pending(index) => self.tree.pending.classes.get_mut(*index)
				.map(|class| &mut class.info)
				.with_context(|| anyhow!("no pending class {index}")),
		}
	}

	fn set_class_src_name(&mut self, target: &ClassTarget, name: &str) -> Result<()> {
		let current = match target {
			ClassTarget::Tree(src_name) => src_name.clone(),
			ClassTarget::Pending(index) => {
				let class = self.tree.pending.classes.get_mut(*index)
					.with_context(|| anyhow!("no pending class {index}"))?;
				match class.src_name.clone() {
					Some(src_name) => src_name,
					None => {
						class.src_name = Some(name.to_owned());
						return Ok(());
					},
				}
			},
		};
		if current != name {
			bail!(MappingError::SrcNameChange { element: format!("class {current:?}"), name: name.to_owned() });
		}
		Ok(())
	}

	fn declare_member<T: Member>(&mut self, class: &ClassTarget, name: &str, desc: Option<&str>) -> Result<MemberTarget> {
		let kind = MemberKind::of::<T>();
		let dst_len = self.dst_len();

		// a descriptor in a destination namespace is only mapped when pending entries get resolved, and must not fail there
		if let (Namespace::Dst(_), Some(desc)) = (self.src, desc) {
			self.alt_to_src.map_desc(desc)
				.with_context(|| anyhow!("invalid descriptor of {} {name:?}", T::KIND))?;
		}

		match (class, self.src) {
			(ClassTarget::Tree(owner), Namespace::Src) => {
				let class = self.class_mut(owner)?;
				let (members, presence) = T::members_of_mut(class);
				match lookup::find_member(members, *presence, name, desc) {
					Some(index) if is_better_desc(desc, members[index].src_desc()) => {
						let index = lookup::set_member_desc(members, presence, index, desc)
							.with_context(|| anyhow!("failed to upgrade descriptor of {} {name:?} in class {owner:?}", T::KIND))?;
						Ok(MemberTarget::Tree(index))
					},
					Some(index) => Ok(MemberTarget::Tree(index)),
					None => {
						let mut member = T::new(name, desc);
						member.resize_dst_names(dst_len);
						Ok(MemberTarget::Tree(lookup::add_member(members, presence, member)))
					},
				}
			},
			(ClassTarget::Tree(owner), Namespace::Dst(alt)) => {
				let class = self.tree.classes.get(owner)
					.with_context(|| anyhow!("class {owner:?} was removed during the pass"))?;
				let members = T::members_of(class);
				let found = lookup::find_member_in(members, name, desc, Namespace::Dst(alt), &self.src_to_alt)?
					.and_then(|index| Some((index, members.get_index(index)?.1)));

				match found {
					None => {
						let owner = PendingOwner::Tree(owner.clone());
						Ok(MemberTarget::Pending(self.tree.pending.queue_member(owner, kind, alt, name, desc, dst_len)))
					},
					Some((index, member)) => {
						if is_better_desc(desc, member.src_desc()) {
							// the descriptor can only be mapped once the pass told all class names
							let src_name = member.src_name().to_owned();
							let owner = PendingOwner::Tree(owner.clone());
							let pending = self.tree.pending.queue_member(owner, kind, alt, name, desc, dst_len);
							if let Some(pending) = self.tree.pending.members.get_mut(pending) {
								pending.src_name = Some(src_name);
							}
						}
						Ok(MemberTarget::Tree(index))
					},
				}
			},
			(ClassTarget::Pending(class), Namespace::Dst(alt)) => {
				let owner = PendingOwner::Pending(*class);
				Ok(MemberTarget::Pending(self.tree.pending.queue_member(owner, kind, alt, name, desc, dst_len)))
			},
			(ClassTarget::Pending(_), Namespace::Src) => bail!("pending class in a pass over the source namespace"),
		}
	}

	fn member_info<'b, T: Member + 'b>(&'b mut self, class: &ClassTarget, member: MemberTarget) -> Result<&'b mut ElementInfo> {
		match (class, member) {
			(ClassTarget::Tree(owner), MemberTarget::Tree(index)) => {
				let class = self.class_mut(owner)?;
				T::members_of_mut(class).0
					.get_index_mut(index)
					.map(|(_, member)| member.info_mut())
					.with_context(|| anyhow!("no {} with index {index} in class {owner:?}", T::KIND))
			},
			(_, MemberTarget::Pending(index)) => self.tree.pending.members.get_mut(index)
				.map(|member| &mut member.info)
				.with_context(|| anyhow!("no pending member {index}")),
			(ClassTarget::Pending(_), MemberTarget::Tree(_)) => bail!("tree member in a pending class"),
		}
	}

	fn set_member_src_name<T: Member>(&mut self, class: &ClassTarget, member: MemberTarget, name: &str) -> Result<()> {
		let current = match (class, member) {
			(ClassTarget::Tree(owner), MemberTarget::Tree(index)) => {
				let class = self.class_mut(owner)?;
				T::members_of_mut(class).0
					.get_index(index)
					.map(|(key, _)| key.clone())
					.with_context(|| anyhow!("no {} with index {index} in class {owner:?}", T::KIND))?
					.name
			},
			(_, MemberTarget::Pending(index)) => {
				let member = self.tree.pending.members.get_mut(index)
					.with_context(|| anyhow!("no pending member {index}"))?;
				match member.src_name.clone() {
					Some(src_name) => src_name,
					None => {
						member.src_name = Some(name.to_owned());
						return Ok(());
					},
				}
			},
			(ClassTarget::Pending(_), MemberTarget::Tree(_)) => bail!("tree member in a pending class"),
		};
		if current != name {
			bail!(MappingError::SrcNameChange { element: format!("{} {current:?}", T::KIND), name: name.to_owned() });
		}
		Ok(())
	}

	fn method_children(&mut self, class: &ClassTarget, method: MemberTarget) -> Result<(&mut Vec<ArgEntry>, &mut Vec<VarEntry>)> {
		match (class, method) {
			(ClassTarget::Tree(owner), MemberTarget::Tree(index)) => {
				let class = self.class_mut(owner)?;
				MethodEntry::members_of_mut(class).0
					.get_index_mut(index)
					.map(|(_, method)| method.args_and_vars_mut())
					.with_context(|| anyhow!("no method with index {index} in class {owner:?}"))
			},
			(_, MemberTarget::Pending(index)) => self.tree.pending.members.get_mut(index)
				.map(|member| (&mut member.args, &mut member.vars))
				.with_context(|| anyhow!("no pending member {index}")),
			(ClassTarget::Pending(_), MemberTarget::Tree(_)) => bail!("tree member in a pending class"),
		}
	}
}

impl<'a> MappingVisitor for &'a mut MappingTree {
	type Output = ();
	type Header = TreeHeader<'a>;

	fn flags(&self) -> MappingFlags {
		MappingFlags::none()
	}

	fn visit_namespaces(self, src_namespace: &str, dst_namespaces: &[String]) -> Result<TreeHeader<'a>> {
		let pass = PassState::new(self, src_namespace, dst_namespaces)?;
		Ok(TreeHeader { pass })
	}
}

pub struct TreeHeader<'a> {
	pass: PassState<'a>,
}

impl<'a> HeaderVisitor for TreeHeader<'a> {
	type Pass = &'a mut MappingTree;
	type Content = TreeContent<'a>;

	fn visit_metadata(&mut self, key: &str, value: Option<&str>) -> Result<()> {
		self.pass.tree.metadata.push(MetadataEntry::new(key, value));
		Ok(())
	}

	fn visit_content(self) -> Result<ControlFlow<TreeContent<'a>, TreeContent<'a>>> {
		Ok(ControlFlow::Continue(TreeContent { pass: self.pass, last_class: None }))
	}
}

pub struct TreeContent<'a> {
	pass: PassState<'a>,
	last_class: Option<String>,
}

impl<'a> ContentVisitor for TreeContent<'a> {
	type Pass = &'a mut MappingTree;
	type Class = TreeClass<'a>;
	type ClassContent = TreeClassContent<'a>;
	type ClassResidual = ();

	fn visit_class(mut self, src_name: &str) -> Result<ControlFlow<Self, ((), TreeClass<'a>)>> {
		if self.last_class.as_deref() == Some(src_name) {
			bail!(MappingError::DuplicateDeclaration { element: format!("class {src_name:?}") });
		}
		self.last_class = Some(src_name.to_owned());

		let target = self.pass.declare_class(src_name);
		Ok(ControlFlow::Continue(((), TreeClass { content: self, target, last_member: None, commented: false })))
	}

	fn finish_class(_this: (), class: TreeClassContent<'a>) -> Result<Self> {
		Ok(class.0.content)
	}

	fn visit_end(mut self) -> Result<ControlFlow<(), &'a mut MappingTree>> {
		self.pass.tree.resolve_pending()
			.context("failed to resolve pending entries")?;
		self.pass.finished = true;
		debug!("finished pass, tree has {} classes", self.pass.tree.classes.len());
		Ok(ControlFlow::Break(()))
	}
}

type MemberDecl = (MemberKind, String, Option<String>);

pub struct TreeClass<'a> {
	content: TreeContent<'a>,
	target: ClassTarget,
	last_member: Option<MemberDecl>,
	commented: bool,
}

impl<'a> ElementVisitor for TreeClass<'a> {
	type Content = TreeClassContent<'a>;

	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()> {
		let pass = &mut self.content.pass;
		match pass.dst_namespace(namespace)? {
			Namespace::Src => pass.set_class_src_name(&self.target, name),
			Namespace::Dst(id) => {
				pass.class_info(&self.target)?.dst_names.set(id, Some(name.to_owned()));
				Ok(())
			},
		}
	}

	fn visit_element_content(self) -> Result<ControlFlow<TreeClassContent<'a>, TreeClassContent<'a>>> {
		Ok(ControlFlow::Continue(TreeClassContent(self)))
	}
}

pub struct TreeClassContent<'a>(TreeClass<'a>);

impl TreeClassContent<'_> {
	fn check_member(&mut self, kind: MemberKind, name: &str, desc: Option<&str>) -> Result<()> {
		let decl = (kind, name.to_owned(), desc.map(str::to_owned));
		if self.0.last_member.as_ref() == Some(&decl) {
			bail!(MappingError::DuplicateDeclaration { element: format!("{kind:?} {name:?} {desc:?}") });
		}
		self.0.last_member = Some(decl);
		Ok(())
	}

	fn declare_member<T: Member>(&mut self, name: &str, desc: Option<&str>) -> Result<MemberTarget> {
		self.check_member(MemberKind::of::<T>(), name, desc)?;
		let TreeClass { content, target, .. } = &mut self.0;
		content.pass.declare_member::<T>(target, name, desc)
	}
}

impl ElementContentVisitor for TreeClassContent<'_> {
	fn visit_comment(&mut self, comment: &str) -> Result<()> {
		let TreeClass { content, target, commented, .. } = &mut self.0;
		check_comment(commented, || format!("class {:?}", content.last_class.as_deref().unwrap_or_default()))?;
		content.pass.class_info(target)?.comment = Some(comment.to_owned());
		Ok(())
	}
}

impl<'a> ClassContentVisitor for TreeClassContent<'a> {
	type Field = TreeField<'a>;
	type FieldContent = TreeFieldContent<'a>;
	type FieldResidual = ();
	type Method = TreeMethod<'a>;
	type MethodContent = TreeMethodContent<'a>;
	type MethodResidual = ();

	fn visit_field(mut self, src_name: &str, src_desc: Option<&str>) -> Result<ControlFlow<Self, ((), TreeField<'a>)>> {
		let target = self.declare_member::<FieldEntry>(src_name, src_desc)?;
		Ok(ControlFlow::Continue(((), TreeField { class: self, target, commented: false })))
	}

	fn finish_field(_this: (), field: TreeFieldContent<'a>) -> Result<Self> {
		Ok(field.0.class)
	}

	fn visit_method(mut self, src_name: &str, src_desc: Option<&str>) -> Result<ControlFlow<Self, ((), TreeMethod<'a>)>> {
		let target = self.declare_member::<MethodEntry>(src_name, src_desc)?;
		Ok(ControlFlow::Continue(((), TreeMethod { class: self, target, last_arg: None, last_var: None, commented: false })))
	}

	fn finish_method(_this: (), method: TreeMethodContent<'a>) -> Result<Self> {
		Ok(method.0.class)
	}
}

/// Sets a destination name of a member, or checks its source name.
fn visit_member_dst_name<T: Member>(class: &mut TreeClassContent<'_>, member: MemberTarget, namespace: usize, name: &str) -> Result<()> {
	let TreeClass { content, target, .. } = &mut class.0;
	let pass = &mut content.pass;
	match pass.dst_namespace(namespace)? {
		Namespace::Src => pass.set_member_src_name::<T>(target, member, name),
		Namespace::Dst(id) => {
			pass.member_info::<T>(target, member)?.dst_names.set(id, Some(name.to_owned()));
			Ok(())
		},
	}
}

fn visit_member_comment<T: Member>(class: &mut TreeClassContent<'_>, member: MemberTarget, commented: &mut bool, comment: &str) -> Result<()> {
	let TreeClass { content, target, last_member, .. } = &mut class.0;
	check_comment(commented, || match last_member {
		Some((_, name, desc)) => format!("{} {name:?} {desc:?}", T::KIND),
		None => T::KIND.to_owned(),
	})?;
	content.pass.member_info::<T>(target, member)?.comment = Some(comment.to_owned());
	Ok(())
}

pub struct TreeField<'a> {
	class: TreeClassContent<'a>,
	target: MemberTarget,
	commented: bool,
}

impl<'a> ElementVisitor for TreeField<'a> {
	type Content = TreeFieldContent<'a>;

	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()> {
		visit_member_dst_name::<FieldEntry>(&mut self.class, self.target, namespace, name)
	}

	fn visit_element_content(self) -> Result<ControlFlow<TreeFieldContent<'a>, TreeFieldContent<'a>>> {
		Ok(ControlFlow::Continue(TreeFieldContent(self)))
	}
}

impl MemberVisitor for TreeField<'_> {}

pub struct TreeFieldContent<'a>(TreeField<'a>);

impl ElementContentVisitor for TreeFieldContent<'_> {
	fn visit_comment(&mut self, comment: &str) -> Result<()> {
		let TreeField { class, target, commented } = &mut self.0;
		visit_member_comment::<FieldEntry>(class, *target, commented, comment)
	}
}

type ArgDecl = (Option<u32>, Option<u32>, Option<String>);
type VarDecl = (Option<u32>, Option<u32>, Option<u32>, Option<u32>, Option<String>);

pub struct TreeMethod<'a> {
	class: TreeClassContent<'a>,
	target: MemberTarget,
	last_arg: Option<ArgDecl>,
	last_var: Option<VarDecl>,
	commented: bool,
}

impl<'a> ElementVisitor for TreeMethod<'a> {
	type Content = TreeMethodContent<'a>;

	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()> {
		visit_member_dst_name::<MethodEntry>(&mut self.class, self.target, namespace, name)
	}

	fn visit_element_content(self) -> Result<ControlFlow<TreeMethodContent<'a>, TreeMethodContent<'a>>> {
		Ok(ControlFlow::Continue(TreeMethodContent(self)))
	}
}

impl MemberVisitor for TreeMethod<'_> {}

pub struct TreeMethodContent<'a>(TreeMethod<'a>);

impl<'a> TreeMethodContent<'a> {
	fn pass(&mut self) -> &mut PassState<'a> {
		&mut self.0.class.0.content.pass
	}

	fn children(&mut self) -> Result<(&mut Vec<ArgEntry>, &mut Vec<VarEntry>)> {
		let TreeMethod { class, target, .. } = &mut self.0;
		let TreeClass { content, target: class_target, .. } = &mut class.0;
		content.pass.method_children(class_target, *target)
	}

	fn declare_arg(&mut self, position: Option<u32>, lv_index: Option<u32>, name: Option<&str>) -> Result<usize> {
		// names of args and vars in the pass are in the source namespace of the pass
		let namespace = self.pass().src;
		let dst_len = self.pass().dst_len();

		let (args, _) = self.children()?;
		if let Some(index) = lookup::find_arg(args, position, lv_index, name, namespace) {
			let arg = &mut args[index];
			arg.complete(position, lv_index);
			if let Some(name) = name {
				arg.set_name(namespace, name);
			}
			return Ok(index);
		}

		let mut arg = ArgEntry::new(position, lv_index, None);
		arg.info.dst_names.resize(dst_len);
		if let Some(name) = name {
			arg.set_name(namespace, name);
		}
		args.push(arg);
		Ok(args.len() - 1)
	}

	fn declare_var(&mut self, lvt_row_index: Option<u32>, lv_index: Option<u32>, start_op_idx: Option<u32>, end_op_idx: Option<u32>, name: Option<&str>)
			-> Result<usize> {
		let namespace = self.pass().src;
		let dst_len = self.pass().dst_len();

		let (_, vars) = self.children()?;
		if let Some(index) = lookup::find_var(vars, lvt_row_index, lv_index, start_op_idx, end_op_idx, name, namespace) {
			let var = &mut vars[index];
			var.complete(lvt_row_index, lv_index, start_op_idx, end_op_idx);
			if let Some(name) = name {
				var.set_name(namespace, name);
			}
			return Ok(index);
		}

		let mut var = VarEntry::new(lvt_row_index, lv_index, start_op_idx, end_op_idx, None);
		var.info.dst_names.resize(dst_len);
		if let Some(name) = name {
			var.set_name(namespace, name);
		}
		vars.push(var);
		Ok(vars.len() - 1)
	}

	fn arg(&mut self, index: usize) -> Result<&mut ArgEntry> {
		self.children()?.0
			.get_mut(index)
			.with_context(|| anyhow!("no arg with index {index}"))
	}

	fn var(&mut self, index: usize) -> Result<&mut VarEntry> {
		self.children()?.1
			.get_mut(index)
			.with_context(|| anyhow!("no var with index {index}"))
	}
}

impl ElementContentVisitor for TreeMethodContent<'_> {
	fn visit_comment(&mut self, comment: &str) -> Result<()> {
		let TreeMethod { class, target, commented, .. } = &mut self.0;
		visit_member_comment::<MethodEntry>(class, *target, commented, comment)
	}
}

impl<'a> MethodContentVisitor for TreeMethodContent<'a> {
	type Arg = TreeArg<'a>;
	type ArgContent = TreeArgContent<'a>;
	type ArgResidual = ();
	type Var = TreeVar<'a>;
	type VarContent = TreeVarContent<'a>;
	type VarResidual = ();

	fn visit_arg(mut self, position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>) -> Result<ControlFlow<Self, ((), TreeArg<'a>)>> {
		let decl = (position, lv_index, src_name.map(str::to_owned));
		if decl != (None, None, None) && self.0.last_arg.as_ref() == Some(&decl) {
			bail!(MappingError::DuplicateDeclaration { element: format!("arg {position:?} {lv_index:?} {src_name:?}") });
		}
		self.0.last_arg = Some(decl);

		let index = self.declare_arg(position, lv_index, src_name)?;
		Ok(ControlFlow::Continue(((), TreeArg { method: self, index, commented: false })))
	}

	fn finish_arg(_this: (), arg: TreeArgContent<'a>) -> Result<Self> {
		Ok(arg.0.method)
	}

	fn visit_var(
		mut self,
		lvt_row_index: Option<u32>,
		lv_index: Option<u32>,
		start_op_idx: Option<u32>,
		end_op_idx: Option<u32>,
		src_name: Option<&str>,
	) -> Result<ControlFlow<Self, ((), TreeVar<'a>)>> {
		let decl = (lvt_row_index, lv_index, start_op_idx, end_op_idx, src_name.map(str::to_owned));
		if decl != (None, None, None, None, None) && self.0.last_var.as_ref() == Some(&decl) {
			bail!(MappingError::DuplicateDeclaration {
				element: format!("var {lvt_row_index:?} {lv_index:?} {start_op_idx:?} {end_op_idx:?} {src_name:?}"),
			});
		}
		self.0.last_var = Some(decl);

		let index = self.declare_var(lvt_row_index, lv_index, start_op_idx, end_op_idx, src_name)?;
		Ok(ControlFlow::Continue(((), TreeVar { method: self, index, commented: false })))
	}

	fn finish_var(_this: (), var: TreeVarContent<'a>) -> Result<Self> {
		Ok(var.0.method)
	}
}

pub struct TreeArg<'a> {
	method: TreeMethodContent<'a>,
	index: usize,
	commented: bool,
}

impl<'a> ElementVisitor for TreeArg<'a> {
	type Content = TreeArgContent<'a>;

	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()> {
		let namespace = self.method.pass().dst_namespace(namespace)?;
		self.method.arg(self.index)?.set_name(namespace, name);
		Ok(())
	}

	fn visit_element_content(self) -> Result<ControlFlow<TreeArgContent<'a>, TreeArgContent<'a>>> {
		Ok(ControlFlow::Continue(TreeArgContent(self)))
	}
}

pub struct TreeArgContent<'a>(TreeArg<'a>);

impl ElementContentVisitor for TreeArgContent<'_> {
	fn visit_comment(&mut self, comment: &str) -> Result<()> {
		let TreeArg { method, index, commented } = &mut self.0;
		check_comment(commented, || format!("arg {index}"))?;
		method.arg(*index)?.info.comment = Some(comment.to_owned());
		Ok(())
	}
}

pub struct TreeVar<'a> {
	method: TreeMethodContent<'a>,
	index: usize,
	commented: bool,
}

impl<'a> ElementVisitor for TreeVar<'a> {
	type Content = TreeVarContent<'a>;

	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()> {
		let namespace = self.method.pass().dst_namespace(namespace)?;
		self.method.var(self.index)?.set_name(namespace, name);
		Ok(())
	}

	fn visit_element_content(self) -> Result<ControlFlow<TreeVarContent<'a>, TreeVarContent<'a>>> {
		Ok(ControlFlow::Continue(TreeVarContent(self)))
	}
}

pub struct TreeVarContent<'a>(TreeVar<'a>);

impl ElementContentVisitor for TreeVarContent<'_> {
	fn visit_comment(&mut self, comment: &str) -> Result<()> {
		let TreeVar { method, index, commented } = &mut self.0;
		check_comment(commented, || format!("var {index}"))?;
		method.var(*index)?.info.comment = Some(comment.to_owned());
		Ok(())
	}
}
