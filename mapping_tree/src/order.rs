//! The order in which [`MappingTree::accept`][crate::tree::MappingTree::accept] replays the entries.

use std::cmp::Ordering;
use crate::tree::entry::{ArgEntry, ClassEntry, FieldEntry, Member, MethodEntry, VarEntry};

pub mod alphanumeric;

pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// A stateless ordering policy for replaying a tree.
///
/// Every level without a comparator keeps the input order, which is the default. Sorting is stable, so entries
/// comparing equal keep their input order.
///
/// ```
/// use mapping_tree::order::VisitOrder;
/// let order = VisitOrder::by_name()
/// 	.classes_by_src_name_short_first()
/// 	.methods_first(true);
/// assert!(order.is_methods_first());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VisitOrder {
	classes: Option<Comparator<ClassEntry>>,
	fields: Option<Comparator<FieldEntry>>,
	methods: Option<Comparator<MethodEntry>>,
	args: Option<Comparator<ArgEntry>>,
	vars: Option<Comparator<VarEntry>>,
	methods_first: bool,
	method_vars_first: bool,
}

impl VisitOrder {
	pub fn by_input_order() -> VisitOrder {
		VisitOrder::default()
	}

	/// Classes by source name, members by source name and descriptor, args and vars by lv index.
	pub fn by_name() -> VisitOrder {
		VisitOrder::default()
			.classes_by_src_name()
			.fields_by_src_name_desc()
			.methods_by_src_name_desc()
			.args_by_lv_index()
			.vars_by_lv_index()
	}

	pub fn class_comparator(mut self, comparator: Comparator<ClassEntry>) -> VisitOrder {
		self.classes = Some(comparator);
		self
	}

	/// Nest-aware, see [`alphanumeric::compare_nest_aware`].
	pub fn classes_by_src_name(self) -> VisitOrder {
		self.class_comparator(|a, b| alphanumeric::compare_nest_aware(a.src_name(), b.src_name(), false))
	}

	pub fn classes_by_src_name_short_first(self) -> VisitOrder {
		self.class_comparator(|a, b| alphanumeric::compare_nest_aware(a.src_name(), b.src_name(), true))
	}

	pub fn field_comparator(mut self, comparator: Comparator<FieldEntry>) -> VisitOrder {
		self.fields = Some(comparator);
		self
	}

	pub fn fields_by_src_name_desc(self) -> VisitOrder {
		self.field_comparator(compare_by_src_name_desc)
	}

	pub fn fields_by_src_name_desc_short_first(self) -> VisitOrder {
		self.field_comparator(compare_by_src_name_desc_short_first)
	}

	pub fn method_comparator(mut self, comparator: Comparator<MethodEntry>) -> VisitOrder {
		self.methods = Some(comparator);
		self
	}

	pub fn methods_by_src_name_desc(self) -> VisitOrder {
		self.method_comparator(compare_by_src_name_desc)
	}

	pub fn methods_by_src_name_desc_short_first(self) -> VisitOrder {
		self.method_comparator(compare_by_src_name_desc_short_first)
	}

	pub fn arg_comparator(mut self, comparator: Comparator<ArgEntry>) -> VisitOrder {
		self.args = Some(comparator);
		self
	}

	/// Unknown positions come first.
	pub fn args_by_position(self) -> VisitOrder {
		self.arg_comparator(|a, b| a.position.cmp(&b.position))
	}

	pub fn args_by_lv_index(self) -> VisitOrder {
		self.arg_comparator(|a, b| a.lv_index.cmp(&b.lv_index))
	}

	pub fn var_comparator(mut self, comparator: Comparator<VarEntry>) -> VisitOrder {
		self.vars = Some(comparator);
		self
	}

	/// By lv index, then by the op range.
	pub fn vars_by_lv_index(self) -> VisitOrder {
		self.var_comparator(|a, b| {
			a.lv_index.cmp(&b.lv_index)
				.then_with(|| a.start_op_idx.cmp(&b.start_op_idx))
				.then_with(|| a.end_op_idx.cmp(&b.end_op_idx))
		})
	}

	pub fn vars_by_lvt_row_index(self) -> VisitOrder {
		self.var_comparator(|a, b| {
			a.lv_index.cmp(&b.lv_index)
				.then_with(|| a.lvt_row_index.cmp(&b.lvt_row_index))
		})
	}

	/// Whether methods come before the fields of a class.
	pub fn methods_first(mut self, methods_first: bool) -> VisitOrder {
		self.methods_first = methods_first;
		self
	}

	/// Whether vars come before the args of a method.
	pub fn method_vars_first(mut self, vars_first: bool) -> VisitOrder {
		self.method_vars_first = vars_first;
		self
	}

	pub fn is_methods_first(&self) -> bool {
		self.methods_first
	}

	pub fn is_method_vars_first(&self) -> bool {
		self.method_vars_first
	}

	pub fn sort_classes<'a>(&self, classes: impl IntoIterator<Item=&'a ClassEntry>) -> Vec<&'a ClassEntry> {
		sort(classes, self.classes)
	}

	pub fn sort_fields<'a>(&self, fields: impl IntoIterator<Item=&'a FieldEntry>) -> Vec<&'a FieldEntry> {
		sort(fields, self.fields)
	}

	pub fn sort_methods<'a>(&self, methods: impl IntoIterator<Item=&'a MethodEntry>) -> Vec<&'a MethodEntry> {
		sort(methods, self.methods)
	}

	pub fn sort_args<'a>(&self, args: impl IntoIterator<Item=&'a ArgEntry>) -> Vec<&'a ArgEntry> {
		sort(args, self.args)
	}

	pub fn sort_vars<'a>(&self, vars: impl IntoIterator<Item=&'a VarEntry>) -> Vec<&'a VarEntry> {
		sort(vars, self.vars)
	}
}

fn sort<'a, T>(items: impl IntoIterator<Item=&'a T>, comparator: Option<Comparator<T>>) -> Vec<&'a T> {
	let mut items: Vec<_> = items.into_iter().collect();
	if let Some(comparator) = comparator {
		items.sort_by(|a, b| comparator(a, b));
	}
	items
}

pub fn compare_by_src_name_desc<T: Member>(a: &T, b: &T) -> Ordering {
	alphanumeric::compare(a.src_name(), b.src_name())
		.then_with(|| alphanumeric::compare_missing_last(a.src_desc(), b.src_desc()))
}

pub fn compare_by_src_name_desc_short_first<T: Member>(a: &T, b: &T) -> Ordering {
	alphanumeric::compare_short_first(a.src_name(), b.src_name())
		.then_with(|| alphanumeric::compare_missing_last(a.src_desc(), b.src_desc()))
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::order::VisitOrder;
	use crate::tree::entry::{ArgEntry, ClassEntry, FieldEntry, VarEntry};

	#[test]
	fn classes() {
		let classes: Vec<_> = ["class_10", "class_2", "class_1", "a$b", "aa", "a"].into_iter().map(ClassEntry::new).collect();

		let sorted: Vec<_> = VisitOrder::by_name().sort_classes(&classes).into_iter().map(|c| c.src_name()).collect();
		assert_eq!(sorted, vec!["a", "a$b", "aa", "class_1", "class_2", "class_10"]);

		let sorted: Vec<_> = VisitOrder::by_input_order().sort_classes(&classes).into_iter().map(|c| c.src_name()).collect();
		assert_eq!(sorted, vec!["class_10", "class_2", "class_1", "a$b", "aa", "a"]);

		let sorted: Vec<_> = VisitOrder::default().classes_by_src_name_short_first()
			.sort_classes(&classes).into_iter().map(|c| c.src_name()).collect();
		assert_eq!(sorted, vec!["a", "a$b", "aa", "class_1", "class_2", "class_10"]);
	}

	#[test]
	fn members_by_name_then_desc() {
		let fields = vec![
			FieldEntry::new("b", None),
			FieldEntry::new("a", Some("J")),
			FieldEntry::new("b", Some("I")),
			FieldEntry::new("a10", Some("I")),
			FieldEntry::new("a9", Some("I")),
		];
		let sorted: Vec<_> = VisitOrder::by_name().sort_fields(&fields).into_iter()
			.map(|f| (f.src_name(), f.src_desc()))
			.collect();
		assert_eq!(sorted, vec![("a", Some("J")), ("a9", Some("I")), ("a10", Some("I")), ("b", Some("I")), ("b", None)]);

		let sorted: Vec<_> = VisitOrder::default().fields_by_src_name_desc_short_first().sort_fields(&fields).into_iter()
			.map(|f| f.src_name())
			.collect();
		assert_eq!(sorted, vec!["a", "b", "b", "a9", "a10"]);
	}

	#[test]
	fn args_and_vars() {
		let args = vec![
			ArgEntry::new(Some(1), Some(2), None),
			ArgEntry::new(None, Some(3), Some("x")),
			ArgEntry::new(Some(0), Some(1), None),
		];
		let sorted: Vec<_> = VisitOrder::default().args_by_position().sort_args(&args).into_iter().map(|a| a.position).collect();
		assert_eq!(sorted, vec![None, Some(0), Some(1)]);
		let sorted: Vec<_> = VisitOrder::by_name().sort_args(&args).into_iter().map(|a| a.lv_index).collect();
		assert_eq!(sorted, vec![Some(1), Some(2), Some(3)]);

		let vars = vec![
			VarEntry::new(Some(0), Some(4), Some(10), None, None),
			VarEntry::new(Some(2), Some(4), Some(2), Some(8), None),
			VarEntry::new(Some(1), Some(3), None, None, None),
		];
		let sorted: Vec<_> = VisitOrder::by_name().sort_vars(&vars).into_iter().map(|v| v.lvt_row_index).collect();
		assert_eq!(sorted, vec![Some(1), Some(2), Some(0)]);
		let sorted: Vec<_> = VisitOrder::default().vars_by_lvt_row_index().sort_vars(&vars).into_iter().map(|v| v.lvt_row_index).collect();
		assert_eq!(sorted, vec![Some(1), Some(0), Some(2)]);
	}
}
