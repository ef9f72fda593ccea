//! The visitor protocol every producer and consumer of mappings speaks.
//!
//! One pass goes through the states in this order:
//! ```txt,ignore
//! MappingVisitor -> HeaderVisitor -> ContentVisitor -> (class -> (field | method -> (arg | var)*)*)* -> end
//! ```
//! Each state is its own type and visiting consumes it, so calling a method out of order doesn't compile.
//!
//! Every element (class, field, method, arg, var) is visited the same way: the parent declares it (`visit_class`,
//! `visit_field`, ...) and gets back an [`ElementVisitor`] for the destination names. Calling
//! [`ElementVisitor::visit_element_content`] then turns that into the content visitor for the comment and the
//! children. The content visitor is handed back to the parent with the matching `finish_*` function.
//!
//! Declaring returns [`ControlFlow::Break`] with the parent if the consumer doesn't care about that element.
//! [`ControlFlow::Break`] from the content calls means that the children and comment are to be skipped, and the
//! element is to be finished right away.
//!
//! [`ContentVisitor::visit_end`] returns [`ControlFlow::Continue`] with the pre-pass visitor if the consumer wants
//! to see the whole pass again.

use std::ops::ControlFlow;
use anyhow::Result;

/// The start of a pass.
pub trait MappingVisitor: Sized {
	/// What the consumer produces once it doesn't want any more passes.
	type Output;
	type Header: HeaderVisitor<Pass = Self>;

	/// Queried by the producer before each pass.
	fn flags(&self) -> MappingFlags;

	fn visit_namespaces(self, src_namespace: &str, dst_namespaces: &[String]) -> Result<Self::Header>;
}

pub trait HeaderVisitor: Sized {
	type Pass: MappingVisitor;
	type Content: ContentVisitor<Pass = Self::Pass>;

	fn visit_metadata(&mut self, key: &str, value: Option<&str>) -> Result<()>;

	/// Returns [`ControlFlow::Break`] if the consumer doesn't want any classes in this pass.
	fn visit_content(self) -> Result<ControlFlow<Self::Content, Self::Content>>;
}

pub trait ContentVisitor: Sized {
	type Pass: MappingVisitor;
	type Class: ElementVisitor<Content = Self::ClassContent>;
	type ClassContent: ClassContentVisitor;
	type ClassResidual;

	fn visit_class(self, src_name: &str) -> Result<ControlFlow<Self, (Self::ClassResidual, Self::Class)>>;
	fn finish_class(this: Self::ClassResidual, class: Self::ClassContent) -> Result<Self>;

	/// Ends the pass.
	///
	/// Returns [`ControlFlow::Continue`] if the producer must repeat the pass, with the visitor to start it with.
	fn visit_end(self) -> Result<ControlFlow<<Self::Pass as MappingVisitor>::Output, Self::Pass>>;
}

/// A declared element, taking destination names.
pub trait ElementVisitor: Sized {
	type Content: ElementContentVisitor;

	/// `namespace` is the index into the destination namespaces of the pass.
	fn visit_dst_name(&mut self, namespace: usize, name: &str) -> Result<()>;

	/// Returns [`ControlFlow::Break`] if the consumer wants neither the comment nor the children.
	fn visit_element_content(self) -> Result<ControlFlow<Self::Content, Self::Content>>;
}

/// A declared field or method, additionally taking destination descriptors.
pub trait MemberVisitor: ElementVisitor {
	/// Consumers that don't compute descriptors themselves should set the `needs_dst_*_desc` flags.
	fn visit_dst_desc(&mut self, namespace: usize, desc: &str) -> Result<()> {
		let _ = (namespace, desc);
		Ok(())
	}
}

pub trait ElementContentVisitor: Sized {
	fn visit_comment(&mut self, comment: &str) -> Result<()>;
}

pub trait ClassContentVisitor: ElementContentVisitor {
	type Field: MemberVisitor<Content = Self::FieldContent>;
	type FieldContent: ElementContentVisitor;
	type FieldResidual;
	type Method: MemberVisitor<Content = Self::MethodContent>;
	type MethodContent: MethodContentVisitor;
	type MethodResidual;

	/// `src_desc` may be missing, and for methods it may be partial (only the parameter types, like `(IJ)`).
	fn visit_field(self, src_name: &str, src_desc: Option<&str>) -> Result<ControlFlow<Self, (Self::FieldResidual, Self::Field)>>;
	fn finish_field(this: Self::FieldResidual, field: Self::FieldContent) -> Result<Self>;

	fn visit_method(self, src_name: &str, src_desc: Option<&str>) -> Result<ControlFlow<Self, (Self::MethodResidual, Self::Method)>>;
	fn finish_method(this: Self::MethodResidual, method: Self::MethodContent) -> Result<Self>;
}

pub trait MethodContentVisitor: ElementContentVisitor {
	type Arg: ElementVisitor<Content = Self::ArgContent>;
	type ArgContent: ElementContentVisitor;
	type ArgResidual;
	type Var: ElementVisitor<Content = Self::VarContent>;
	type VarContent: ElementContentVisitor;
	type VarResidual;

	/// Any of `position`, `lv_index` and `src_name` may be unknown.
	fn visit_arg(self, position: Option<u32>, lv_index: Option<u32>, src_name: Option<&str>)
		-> Result<ControlFlow<Self, (Self::ArgResidual, Self::Arg)>>;
	fn finish_arg(this: Self::ArgResidual, arg: Self::ArgContent) -> Result<Self>;

	/// The variable is live in `[start_op_idx, end_op_idx)`, a missing end means until the end of the method.
	fn visit_var(
		self,
		lvt_row_index: Option<u32>,
		lv_index: Option<u32>,
		start_op_idx: Option<u32>,
		end_op_idx: Option<u32>,
		src_name: Option<&str>,
	) -> Result<ControlFlow<Self, (Self::VarResidual, Self::Var)>>;
	fn finish_var(this: Self::VarResidual, var: Self::VarContent) -> Result<Self>;
}

/// What a consumer needs from the producer.
///
/// Producers that can't honour a flag must fail instead of silently ignoring it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MappingFlags {
	/// The consumer may return [`ControlFlow::Continue`] from [`ContentVisitor::visit_end`].
	pub needs_multiple_passes: bool,
	/// Every element is declared at most once per pass.
	pub needs_element_uniqueness: bool,
	/// Every metadata key is visited at most once per pass.
	pub needs_metadata_uniqueness: bool,
	pub needs_src_field_desc: bool,
	pub needs_src_method_desc: bool,
	pub needs_dst_field_desc: bool,
	pub needs_dst_method_desc: bool,
}

impl MappingFlags {
	pub fn none() -> MappingFlags {
		Self::default()
	}
	pub fn all() -> MappingFlags {
		MappingFlags {
			needs_multiple_passes: true,
			needs_element_uniqueness: true,
			needs_metadata_uniqueness: true,
			needs_src_field_desc: true,
			needs_src_method_desc: true,
			needs_dst_field_desc: true,
			needs_dst_method_desc: true,
		}
	}
}
