//! The entries of a [`MappingTree`][super::MappingTree].
//!
//! All entries share an [`ElementInfo`] with the destination names and the comment. Fields and methods are keyed by
//! [`MemberKey`], their source name and source descriptor.

use anyhow::Result;
use indexmap::IndexMap;
use crate::error::MappingError;
use crate::tree::lookup;
use crate::tree::names::{DstNames, Namespace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
	pub key: String,
	pub value: Option<String>,
}

impl MetadataEntry {
	pub fn new(key: &str, value: Option<&str>) -> MetadataEntry {
		MetadataEntry {
			key: key.to_owned(),
			value: value.map(str::to_owned),
		}
	}
}

/// What every element has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
	pub dst_names: DstNames,
	pub comment: Option<String>,
}

impl ElementInfo {
	pub(crate) fn new(dst_len: usize) -> ElementInfo {
		ElementInfo {
			dst_names: DstNames::new(dst_len),
			comment: None,
		}
	}

	/// Copies the names and comment that `other` has, keeping ours unless `replace` is set.
	pub(crate) fn copy_from(&mut self, other: &ElementInfo, replace: bool) {
		self.dst_names.copy_from(&other.dst_names, replace);
		if let Some(comment) = &other.comment {
			if replace || self.comment.is_none() {
				self.comment = Some(comment.clone());
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
	pub name: String,
	pub desc: Option<String>,
}

impl MemberKey {
	pub fn new(name: &str, desc: Option<&str>) -> MemberKey {
		MemberKey {
			name: name.to_owned(),
			desc: desc.map(str::to_owned),
		}
	}
}

/// Which descriptor shapes the members of one kind in a class have.
///
/// Only a complete descriptor counts as present, a partial one like `(I)` counts as missing.
#[doc(hidden)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DescPresence {
	pub(crate) has_any_desc: bool,
	pub(crate) misses_any_desc: bool,
}

impl DescPresence {
	pub(crate) fn record(&mut self, desc: Option<&str>) {
		if is_full_desc(desc) {
			self.has_any_desc = true;
		} else {
			self.misses_any_desc = true;
		}
	}
}

/// Partial method descriptors only have the parameter types, like `(ILjava/lang/String;)`.
pub(crate) fn is_partial_desc(desc: &str) -> bool {
	desc.ends_with(')')
}

pub(crate) fn is_full_desc(desc: Option<&str>) -> bool {
	desc.is_some_and(|desc| !is_partial_desc(desc))
}

/// Whether `incoming` tells more than `stored`.
pub(crate) fn is_better_desc(incoming: Option<&str>, stored: Option<&str>) -> bool {
	match (incoming, stored) {
		(Some(_), None) => true,
		(Some(incoming), Some(stored)) => is_partial_desc(stored) && !is_partial_desc(incoming),
		(None, _) => false,
	}
}

/// Fields and methods.
pub trait Member: Clone {
	const IS_METHOD: bool;
	/// For messages.
	const KIND: &'static str;

	fn new(src_name: &str, src_desc: Option<&str>) -> Self;

	fn key(&self) -> &MemberKey;
	fn info(&self) -> &ElementInfo;
	fn info_mut(&mut self) -> &mut ElementInfo;

	fn src_name(&self) -> &str {
		&self.key().name
	}
	fn src_desc(&self) -> Option<&str> {
		self.key().desc.as_deref()
	}

	fn name(&self, namespace: Namespace) -> Option<&str> {
		match namespace {
			Namespace::Src => Some(self.src_name()),
			Namespace::Dst(id) => self.info().dst_names.get(id),
		}
	}

	#[doc(hidden)]
	fn set_key(&mut self, key: MemberKey);

	/// Copies the data of `other`, keeping ours unless `replace` is set. The key stays as it is.
	fn copy_from(&mut self, other: &Self, replace: bool);

	#[doc(hidden)]
	fn resize_dst_names(&mut self, len: usize);

	#[doc(hidden)]
	fn members_of(class: &ClassEntry) -> &IndexMap<MemberKey, Self>;
	#[doc(hidden)]
	fn members_of_mut(class: &mut ClassEntry) -> (&mut IndexMap<MemberKey, Self>, &mut DescPresence);
}

#[derive(Debug, Clone)]
pub struct ClassEntry {
	src_name: String,
	pub info: ElementInfo,
	fields: IndexMap<MemberKey, FieldEntry>,
	methods: IndexMap<MemberKey, MethodEntry>,
	field_descs: DescPresence,
	method_descs: DescPresence,
}

impl PartialEq for ClassEntry {
	fn eq(&self, other: &Self) -> bool {
		self.src_name == other.src_name &&
			self.info == other.info &&
			self.fields == other.fields &&
			self.methods == other.methods
	}
}

impl ClassEntry {
	pub fn new(src_name: &str) -> ClassEntry {
		ClassEntry::with_dst_len(src_name, 0)
	}

	pub(crate) fn with_dst_len(src_name: &str, dst_len: usize) -> ClassEntry {
		ClassEntry {
			src_name: src_name.to_owned(),
			info: ElementInfo::new(dst_len),
			fields: IndexMap::new(),
			methods: IndexMap::new(),
			field_descs: DescPresence::default(),
			method_descs: DescPresence::default(),
		}
	}

	pub fn src_name(&self) -> &str {
		&self.src_name
	}

	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		match namespace {
			Namespace::Src => Some(&self.src_name),
			Namespace::Dst(id) => self.info.dst_names.get(id),
		}
	}

	pub fn fields(&self) -> impl Iterator<Item=&FieldEntry> {
		self.fields.values()
	}

	pub fn fields_mut(&mut self) -> impl Iterator<Item=&mut FieldEntry> {
		self.fields.values_mut()
	}

	pub(crate) fn fields_map(&self) -> &IndexMap<MemberKey, FieldEntry> {
		&self.fields
	}

	pub fn methods(&self) -> impl Iterator<Item=&MethodEntry> {
		self.methods.values()
	}

	pub fn methods_mut(&mut self) -> impl Iterator<Item=&mut MethodEntry> {
		self.methods.values_mut()
	}

	pub(crate) fn methods_map(&self) -> &IndexMap<MemberKey, MethodEntry> {
		&self.methods
	}

	/// Finds a field, also matching fields with a missing descriptor, or a missing one against a present one.
	pub fn field(&self, src_name: &str, src_desc: Option<&str>) -> Option<&FieldEntry> {
		self.member(src_name, src_desc)
	}

	pub fn field_mut(&mut self, src_name: &str, src_desc: Option<&str>) -> Option<&mut FieldEntry> {
		self.member_mut(src_name, src_desc)
	}

	/// Adds a field, merging it into a matching one.
	///
	/// The data of `field` wins over the existing one, a better descriptor replaces a worse one.
	pub fn add_field(&mut self, field: FieldEntry) -> &mut FieldEntry {
		self.add_member(field)
	}

	pub fn remove_field(&mut self, src_name: &str, src_desc: Option<&str>) -> Option<FieldEntry> {
		self.remove_member(src_name, src_desc)
	}

	/// Changes the source descriptor of a field.
	///
	/// Fails if another field already has the new descriptor.
	pub fn set_field_desc(&mut self, src_name: &str, src_desc: Option<&str>, new_desc: Option<&str>) -> Result<bool> {
		self.set_member_desc::<FieldEntry>(src_name, src_desc, new_desc)
	}

	/// Finds a method, matching partial and missing descriptors as described for [`ClassEntry::field`].
	pub fn method(&self, src_name: &str, src_desc: Option<&str>) -> Option<&MethodEntry> {
		self.member(src_name, src_desc)
	}

	pub fn method_mut(&mut self, src_name: &str, src_desc: Option<&str>) -> Option<&mut MethodEntry> {
		self.member_mut(src_name, src_desc)
	}

	/// Adds a method, merging it into a matching one. See [`ClassEntry::add_field`].
	pub fn add_method(&mut self, method: MethodEntry) -> &mut MethodEntry {
		self.add_member(method)
	}

	pub fn remove_method(&mut self, src_name: &str, src_desc: Option<&str>) -> Option<MethodEntry> {
		self.remove_member(src_name, src_desc)
	}

	/// Changes the source descriptor of a method. See [`ClassEntry::set_field_desc`].
	pub fn set_method_desc(&mut self, src_name: &str, src_desc: Option<&str>, new_desc: Option<&str>) -> Result<bool> {
		self.set_member_desc::<MethodEntry>(src_name, src_desc, new_desc)
	}

	pub(crate) fn member<T: Member>(&self, src_name: &str, src_desc: Option<&str>) -> Option<&T> {
		let presence = if T::IS_METHOD { self.method_descs } else { self.field_descs };
		let members = T::members_of(self);
		let index = lookup::find_member(members, presence, src_name, src_desc)?;
		members.get_index(index).map(|(_, member)| member)
	}

	pub(crate) fn member_mut<T: Member>(&mut self, src_name: &str, src_desc: Option<&str>) -> Option<&mut T> {
		let (members, presence) = T::members_of_mut(self);
		let index = lookup::find_member(members, *presence, src_name, src_desc)?;
		members.get_index_mut(index).map(|(_, member)| member)
	}

	pub(crate) fn add_member<T: Member>(&mut self, mut member: T) -> &mut T {
		if member.info().dst_names.len() < self.info.dst_names.len() {
			member.resize_dst_names(self.info.dst_names.len());
		}
		let (members, presence) = T::members_of_mut(self);
		let index = lookup::add_member(members, presence, member);
		&mut members[index]
	}

	/// Like [`ClassEntry::add_member`], but also upgrades the descriptor of a matching member.
	pub(crate) fn merge_member<T: Member>(&mut self, member: T, replace: bool) -> &mut T {
		let (members, presence) = T::members_of_mut(self);
		let index = lookup::merge_member(members, presence, member, replace);
		&mut members[index]
	}

	fn remove_member<T: Member>(&mut self, src_name: &str, src_desc: Option<&str>) -> Option<T> {
		let (members, presence) = T::members_of_mut(self);
		let index = lookup::find_member(members, *presence, src_name, src_desc)?;
		members.shift_remove_index(index).map(|(_, member)| member)
	}

	fn set_member_desc<T: Member>(&mut self, src_name: &str, src_desc: Option<&str>, new_desc: Option<&str>) -> Result<bool> {
		let (members, presence) = T::members_of_mut(self);
		let Some(index) = lookup::find_member(members, *presence, src_name, src_desc) else {
			return Ok(false);
		};
		lookup::set_member_desc(members, presence, index, new_desc)?;
		Ok(true)
	}

	/// Copies the data of `other` into this class, merging fields and methods.
	pub fn copy_from(&mut self, other: &ClassEntry, replace: bool) {
		self.info.copy_from(&other.info, replace);

		for field in other.fields.values() {
			lookup::merge_member(&mut self.fields, &mut self.field_descs, field.clone(), replace);
		}
		for method in other.methods.values() {
			lookup::merge_member(&mut self.methods, &mut self.method_descs, method.clone(), replace);
		}
	}

	pub(crate) fn resize_dst_names(&mut self, len: usize) {
		self.info.dst_names.resize(len);
		for field in self.fields.values_mut() {
			field.resize_dst_names(len);
		}
		for method in self.methods.values_mut() {
			method.resize_dst_names(len);
		}
	}

	pub(crate) fn remap_dst_names(&mut self, table: &[Option<usize>]) {
		self.info.dst_names.remap(table);
		for field in self.fields.values_mut() {
			field.info.dst_names.remap(table);
		}
		for method in self.methods.values_mut() {
			method.info.dst_names.remap(table);
			for arg in &mut method.args {
				arg.info.dst_names.remap(table);
			}
			for var in &mut method.vars {
				var.info.dst_names.remap(table);
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
	key: MemberKey,
	pub info: ElementInfo,
}

impl FieldEntry {
	pub fn new(src_name: &str, src_desc: Option<&str>) -> FieldEntry {
		FieldEntry {
			key: MemberKey::new(src_name, src_desc),
			info: ElementInfo::default(),
		}
	}

	pub fn src_name(&self) -> &str {
		&self.key.name
	}

	pub fn src_desc(&self) -> Option<&str> {
		self.key.desc.as_deref()
	}

	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		Member::name(self, namespace)
	}
}

impl Member for FieldEntry {
	const IS_METHOD: bool = false;
	const KIND: &'static str = "field";

	fn new(src_name: &str, src_desc: Option<&str>) -> Self {
		FieldEntry::new(src_name, src_desc)
	}

	fn key(&self) -> &MemberKey {
		&self.key
	}
	fn info(&self) -> &ElementInfo {
		&self.info
	}
	fn info_mut(&mut self) -> &mut ElementInfo {
		&mut self.info
	}

	fn set_key(&mut self, key: MemberKey) {
		self.key = key;
	}

	fn copy_from(&mut self, other: &Self, replace: bool) {
		self.info.copy_from(&other.info, replace);
	}

	fn resize_dst_names(&mut self, len: usize) {
		self.info.dst_names.resize(len);
	}

	fn members_of(class: &ClassEntry) -> &IndexMap<MemberKey, Self> {
		&class.fields
	}
	fn members_of_mut(class: &mut ClassEntry) -> (&mut IndexMap<MemberKey, Self>, &mut DescPresence) {
		(&mut class.fields, &mut class.field_descs)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
	key: MemberKey,
	pub info: ElementInfo,
	args: Vec<ArgEntry>,
	vars: Vec<VarEntry>,
}

impl MethodEntry {
	pub fn new(src_name: &str, src_desc: Option<&str>) -> MethodEntry {
		MethodEntry {
			key: MemberKey::new(src_name, src_desc),
			info: ElementInfo::default(),
			args: Vec::new(),
			vars: Vec::new(),
		}
	}

	pub fn src_name(&self) -> &str {
		&self.key.name
	}

	pub fn src_desc(&self) -> Option<&str> {
		self.key.desc.as_deref()
	}

	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		Member::name(self, namespace)
	}

	pub fn args(&self) -> &[ArgEntry] {
		&self.args
	}

	pub fn args_mut(&mut self) -> impl Iterator<Item=&mut ArgEntry> {
		self.args.iter_mut()
	}

	pub(crate) fn args_and_vars_mut(&mut self) -> (&mut Vec<ArgEntry>, &mut Vec<VarEntry>) {
		(&mut self.args, &mut self.vars)
	}

	/// Finds an argument by position or lv index, skipping ones with a different name, or just by the name if the
	/// indices are unknown on either side.
	pub fn arg(&self, position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>) -> Option<&ArgEntry> {
		lookup::find_arg(&self.args, position, lv_index, src_name, Namespace::Src)
			.map(|index| &self.args[index])
	}

	pub fn arg_mut(&mut self, position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>) -> Option<&mut ArgEntry> {
		let index = lookup::find_arg(&self.args, position, lv_index, src_name, Namespace::Src)?;
		self.args.get_mut(index)
	}

	/// Adds an argument, merging it into a matching one, where the data of `arg` wins.
	pub fn add_arg(&mut self, mut arg: ArgEntry) -> &mut ArgEntry {
		if arg.info.dst_names.len() < self.info.dst_names.len() {
			arg.info.dst_names.resize(self.info.dst_names.len());
		}
		match lookup::find_arg(&self.args, arg.position, arg.lv_index, arg.src_name.as_deref(), Namespace::Src) {
			Some(index) => {
				let existing = &mut self.args[index];
				existing.copy_from(&arg, true);
				existing
			},
			None => {
				self.args.push(arg);
				let index = self.args.len() - 1;
				&mut self.args[index]
			},
		}
	}

	pub fn remove_arg(&mut self, position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>) -> Option<ArgEntry> {
		lookup::find_arg(&self.args, position, lv_index, src_name, Namespace::Src)
			.map(|index| self.args.remove(index))
	}

	pub fn vars(&self) -> &[VarEntry] {
		&self.vars
	}

	pub fn vars_mut(&mut self) -> impl Iterator<Item=&mut VarEntry> {
		self.vars.iter_mut()
	}

	/// Finds a variable by lvt row index, then by lv index where the live ranges fit best, then by name.
	pub fn var(&self, lvt_row_index: Option<u32>, lv_index: Option<u32>, start_op_idx: Option<u32>, end_op_idx: Option<u32>, src_name: Option<&str>)
			-> Option<&VarEntry> {
		lookup::find_var(&self.vars, lvt_row_index, lv_index, start_op_idx, end_op_idx, src_name, Namespace::Src)
			.map(|index| &self.vars[index])
	}

	pub fn var_mut(&mut self, lvt_row_index: Option<u32>, lv_index: Option<u32>, start_op_idx: Option<u32>, end_op_idx: Option<u32>, src_name: Option<&str>)
			-> Option<&mut VarEntry> {
		let index = lookup::find_var(&self.vars, lvt_row_index, lv_index, start_op_idx, end_op_idx, src_name, Namespace::Src)?;
		self.vars.get_mut(index)
	}

	/// Adds a variable, merging it into a matching one, where the data of `var` wins.
	pub fn add_var(&mut self, mut var: VarEntry) -> &mut VarEntry {
		if var.info.dst_names.len() < self.info.dst_names.len() {
			var.info.dst_names.resize(self.info.dst_names.len());
		}
		match lookup::find_var(&self.vars, var.lvt_row_index, var.lv_index, var.start_op_idx, var.end_op_idx, var.src_name.as_deref(), Namespace::Src) {
			Some(index) => {
				let existing = &mut self.vars[index];
				existing.copy_from(&var, true);
				existing
			},
			None => {
				self.vars.push(var);
				let index = self.vars.len() - 1;
				&mut self.vars[index]
			},
		}
	}

	pub fn remove_var(&mut self, lvt_row_index: Option<u32>, lv_index: Option<u32>, start_op_idx: Option<u32>, end_op_idx: Option<u32>, src_name: Option<&str>)
			-> Option<VarEntry> {
		lookup::find_var(&self.vars, lvt_row_index, lv_index, start_op_idx, end_op_idx, src_name, Namespace::Src)
			.map(|index| self.vars.remove(index))
	}
}

impl Member for MethodEntry {
	const IS_METHOD: bool = true;
	const KIND: &'static str = "method";

	fn new(src_name: &str, src_desc: Option<&str>) -> Self {
		MethodEntry::new(src_name, src_desc)
	}

	fn key(&self) -> &MemberKey {
		&self.key
	}
	fn info(&self) -> &ElementInfo {
		&self.info
	}
	fn info_mut(&mut self) -> &mut ElementInfo {
		&mut self.info
	}

	fn set_key(&mut self, key: MemberKey) {
		self.key = key;
	}

	fn copy_from(&mut self, other: &Self, replace: bool) {
		self.info.copy_from(&other.info, replace);

		for arg in &other.args {
			match lookup::find_arg(&self.args, arg.position, arg.lv_index, arg.src_name.as_deref(), Namespace::Src) {
				Some(index) => self.args[index].copy_from(arg, replace),
				None => self.args.push(arg.clone()),
			}
		}
		for var in &other.vars {
			match lookup::find_var(&self.vars, var.lvt_row_index, var.lv_index, var.start_op_idx, var.end_op_idx, var.src_name.as_deref(), Namespace::Src) {
				Some(index) => self.vars[index].copy_from(var, replace),
				None => self.vars.push(var.clone()),
			}
		}
	}

	fn resize_dst_names(&mut self, len: usize) {
		self.info.dst_names.resize(len);
		for arg in &mut self.args {
			arg.info.dst_names.resize(len);
		}
		for var in &mut self.vars {
			var.info.dst_names.resize(len);
		}
	}

	fn members_of(class: &ClassEntry) -> &IndexMap<MemberKey, Self> {
		&class.methods
	}
	fn members_of_mut(class: &mut ClassEntry) -> (&mut IndexMap<MemberKey, Self>, &mut DescPresence) {
		(&mut class.methods, &mut class.method_descs)
	}
}

/// A method argument. Any of position, lv index and source name may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgEntry {
	pub position: Option<u32>,
	pub lv_index: Option<u32>,
	pub src_name: Option<String>,
	pub info: ElementInfo,
}

impl ArgEntry {
	pub fn new(position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>) -> ArgEntry {
		ArgEntry {
			position,
			lv_index,
			src_name: src_name.map(str::to_owned),
			info: ElementInfo::default(),
		}
	}

	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		match namespace {
			Namespace::Src => self.src_name.as_deref(),
			Namespace::Dst(id) => self.info.dst_names.get(id),
		}
	}

	pub(crate) fn set_name(&mut self, namespace: Namespace, name: &str) {
		match namespace {
			Namespace::Src => self.src_name = Some(name.to_owned()),
			Namespace::Dst(id) => { self.info.dst_names.set(id, Some(name.to_owned())); },
		}
	}

	/// Fills in the indices that are unknown so far.
	pub(crate) fn complete(&mut self, position: Option<u32>, lv_index: Option<u32>) {
		if self.position.is_none() {
			self.position = position;
		}
		if self.lv_index.is_none() {
			self.lv_index = lv_index;
		}
	}

	pub fn copy_from(&mut self, other: &ArgEntry, replace: bool) {
		if other.position.is_some() && (replace || self.position.is_none()) {
			self.position = other.position;
		}
		if other.lv_index.is_some() && (replace || self.lv_index.is_none()) {
			self.lv_index = other.lv_index;
		}
		if other.src_name.is_some() && (replace || self.src_name.is_none()) {
			self.src_name.clone_from(&other.src_name);
		}
		self.info.copy_from(&other.info, replace);
	}
}

/// A local variable of a method, live in `[start_op_idx, end_op_idx)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarEntry {
	pub lvt_row_index: Option<u32>,
	pub lv_index: Option<u32>,
	pub start_op_idx: Option<u32>,
	pub end_op_idx: Option<u32>,
	pub src_name: Option<String>,
	pub info: ElementInfo,
}

impl VarEntry {
	pub fn new(lvt_row_index: Option<u32>, lv_index: Option<u32>, start_op_idx: Option<u32>, end_op_idx: Option<u32>, src_name: Option<&str>) -> VarEntry {
		VarEntry {
			lvt_row_index,
			lv_index,
			start_op_idx,
			end_op_idx,
			src_name: src_name.map(str::to_owned),
			info: ElementInfo::default(),
		}
	}

	pub fn name(&self, namespace: Namespace) -> Option<&str> {
		match namespace {
			Namespace::Src => self.src_name.as_deref(),
			Namespace::Dst(id) => self.info.dst_names.get(id),
		}
	}

	pub(crate) fn set_name(&mut self, namespace: Namespace, name: &str) {
		match namespace {
			Namespace::Src => self.src_name = Some(name.to_owned()),
			Namespace::Dst(id) => { self.info.dst_names.set(id, Some(name.to_owned())); },
		}
	}

	/// Fills in the lvt row index and the lv index with its range, if they are unknown so far.
	pub(crate) fn complete(&mut self, lvt_row_index: Option<u32>, lv_index: Option<u32>, start_op_idx: Option<u32>, end_op_idx: Option<u32>) {
		if self.lvt_row_index.is_none() {
			self.lvt_row_index = lvt_row_index;
		}
		if lv_index.is_some() && start_op_idx.is_some() && (self.lv_index.is_none() || self.start_op_idx.is_none()) {
			self.lv_index = lv_index;
			self.start_op_idx = start_op_idx;
			self.end_op_idx = end_op_idx;
		}
	}

	pub fn copy_from(&mut self, other: &VarEntry, replace: bool) {
		if other.lvt_row_index.is_some() && (replace || self.lvt_row_index.is_none()) {
			self.lvt_row_index = other.lvt_row_index;
		}
		if other.lv_index.is_some() && other.start_op_idx.is_some() && (replace || self.lv_index.is_none() || self.start_op_idx.is_none()) {
			self.lv_index = other.lv_index;
			self.start_op_idx = other.start_op_idx;
			self.end_op_idx = other.end_op_idx;
		}
		if other.src_name.is_some() && (replace || self.src_name.is_none()) {
			self.src_name.clone_from(&other.src_name);
		}
		self.info.copy_from(&other.info, replace);
	}
}

impl std::fmt::Display for MemberKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.desc {
			Some(desc) => write!(f, "{}{}", self.name, desc),
			None => write!(f, "{}", self.name),
		}
	}
}

pub(crate) fn conflicting_desc(key: &MemberKey, desc: Option<&str>) -> MappingError {
	MappingError::ConflictingDescriptor {
		element: key.to_string(),
		desc: desc.unwrap_or_default().to_owned(),
	}
}
