//! Replaying the tree into a visitor.

use std::ops::ControlFlow;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use crate::error::MappingError;
use crate::order::VisitOrder;
use crate::remapper::ClassRemapper;
use crate::tree::entry::{ArgEntry, ClassEntry, FieldEntry, Member, MetadataEntry, MethodEntry, VarEntry};
use crate::tree::MappingTree;
use crate::tree::names::Namespace;
use crate::visitor::{
	ClassContentVisitor, ContentVisitor, ElementContentVisitor, ElementVisitor, HeaderVisitor, MappingFlags, MappingVisitor,
	MemberVisitor, MethodContentVisitor,
};

/// What one pass needs besides the tree.
struct Replay<'t> {
	order: &'t VisitOrder,
	flags: MappingFlags,
	/// Class names from the source namespace to each destination namespace, only if destination descriptors are needed.
	dst_classes: Vec<IndexMap<String, String>>,
}

impl MappingTree {
	/// Replays the content of the tree into `visitor`, in the given order.
	///
	/// The pass is repeated for as long as the visitor asks for another one, up to [`MappingTree::max_passes`] times,
	/// after which this fails with [`MappingError::TooManyPasses`].
	pub fn accept<V: MappingVisitor>(&self, visitor: V, order: &VisitOrder) -> Result<V::Output> {
		let mut visitor = visitor;
		for pass in 1..=self.max_passes {
			trace!("replay pass {pass}");
			match self.accept_pass(visitor, order).with_context(|| anyhow!("in replay pass {pass}"))? {
				ControlFlow::Break(output) => {
					debug!("replayed tree in {pass} passes");
					return Ok(output);
				},
				ControlFlow::Continue(next) => visitor = next,
			}
		}
		bail!(MappingError::TooManyPasses { max: self.max_passes })
	}

	fn accept_pass<V: MappingVisitor>(&self, visitor: V, order: &VisitOrder) -> Result<ControlFlow<V::Output, V>> {
		let flags = visitor.flags();
		let src_namespace = self.src_namespace.as_deref()
			.context("can't replay a tree without a source namespace")?;

		let dst_classes = if flags.needs_dst_field_desc || flags.needs_dst_method_desc {
			(0..self.dst_namespaces.len())
				.map(|id| self.class_names(Namespace::Src, Namespace::Dst(id)))
				.collect()
		} else {
			Vec::new()
		};
		let replay = Replay { order, flags, dst_classes };

		let mut header = visitor.visit_namespaces(src_namespace, &self.dst_namespaces)?;

		for entry in self.metadata_to_visit(flags) {
			header.visit_metadata(&entry.key, entry.value.as_deref())?;
		}

		let content = match header.visit_content()? {
			ControlFlow::Continue(mut content) => {
				for class in order.sort_classes(self.classes.values()) {
					content = replay.class(class, content)
						.with_context(|| anyhow!("failed to replay class {:?}", class.src_name()))?;
				}
				content
			},
			ControlFlow::Break(content) => content,
		};

		content.visit_end()
	}

	fn metadata_to_visit(&self, flags: MappingFlags) -> Vec<&MetadataEntry> {
		if !flags.needs_metadata_uniqueness {
			return self.metadata.iter().collect();
		}
		// the last value of each key wins, in the order of those last values
		let mut seen = IndexSet::new();
		let mut metadata: Vec<_> = self.metadata.iter()
			.rev()
			.filter(|entry| seen.insert(entry.key.as_str()))
			.collect();
		metadata.reverse();
		metadata
	}
}

impl Replay<'_> {
	fn class<C: ContentVisitor>(&self, class: &ClassEntry, content: C) -> Result<C> {
		let (residual, mut visitor) = match content.visit_class(class.src_name())? {
			ControlFlow::Continue(x) => x,
			ControlFlow::Break(content) => return Ok(content),
		};
		for (namespace, name) in class.info.dst_names.iter() {
			visitor.visit_dst_name(namespace, name)?;
		}

		let mut class_content = match visitor.visit_element_content()? {
			ControlFlow::Continue(class_content) => class_content,
			ControlFlow::Break(class_content) => return C::finish_class(residual, class_content),
		};
		if let Some(comment) = &class.info.comment {
			class_content.visit_comment(comment)?;
		}

		if self.order.is_methods_first() {
			class_content = self.methods(class, class_content)?;
			class_content = self.fields(class, class_content)?;
		} else {
			class_content = self.fields(class, class_content)?;
			class_content = self.methods(class, class_content)?;
		}

		C::finish_class(residual, class_content)
	}

	fn src_desc<'e, T: Member>(&self, member: &'e T, needs_src_desc: bool) -> Result<Option<&'e str>> {
		match member.src_desc() {
			None if needs_src_desc => bail!(MappingError::MissingSrcDescriptor { element: format!("{} {:?}", T::KIND, member.src_name()) }),
			desc => Ok(desc),
		}
	}

	fn dst_descs(&self, visitor: &mut impl MemberVisitor, desc: Option<&str>) -> Result<()> {
		if let Some(desc) = desc {
			for (namespace, classes) in self.dst_classes.iter().enumerate() {
				visitor.visit_dst_desc(namespace, &classes.map_desc(desc)?)?;
			}
		}
		Ok(())
	}

	fn fields<C: ClassContentVisitor>(&self, class: &ClassEntry, mut class_content: C) -> Result<C> {
		for field in self.order.sort_fields(class.fields()) {
			class_content = self.field(field, class_content)
				.with_context(|| anyhow!("failed to replay field {}", field.key()))?;
		}
		Ok(class_content)
	}

	fn field<C: ClassContentVisitor>(&self, field: &FieldEntry, class_content: C) -> Result<C> {
		let desc = self.src_desc(field, self.flags.needs_src_field_desc)?;

		let (residual, mut visitor) = match class_content.visit_field(field.src_name(), desc)? {
			ControlFlow::Continue(x) => x,
			ControlFlow::Break(class_content) => return Ok(class_content),
		};
		for (namespace, name) in field.info.dst_names.iter() {
			visitor.visit_dst_name(namespace, name)?;
		}
		if self.flags.needs_dst_field_desc {
			self.dst_descs(&mut visitor, desc)?;
		}

		let mut field_content = match visitor.visit_element_content()? {
			ControlFlow::Continue(field_content) => field_content,
			ControlFlow::Break(field_content) => return C::finish_field(residual, field_content),
		};
		if let Some(comment) = &field.info.comment {
			field_content.visit_comment(comment)?;
		}
		C::finish_field(residual, field_content)
	}

	fn methods<C: ClassContentVisitor>(&self, class: &ClassEntry, mut class_content: C) -> Result<C> {
		for method in self.order.sort_methods(class.methods()) {
			class_content = self.method(method, class_content)
				.with_context(|| anyhow!("failed to replay method {}", method.key()))?;
		}
		Ok(class_content)
	}

	fn method<C: ClassContentVisitor>(&self, method: &MethodEntry, class_content: C) -> Result<C> {
		let desc = self.src_desc(method, self.flags.needs_src_method_desc)?;

		let (residual, mut visitor) = match class_content.visit_method(method.src_name(), desc)? {
			ControlFlow::Continue(x) => x,
			ControlFlow::Break(class_content) => return Ok(class_content),
		};
		for (namespace, name) in method.info.dst_names.iter() {
			visitor.visit_dst_name(namespace, name)?;
		}
		if self.flags.needs_dst_method_desc {
			self.dst_descs(&mut visitor, desc)?;
		}

		let mut method_content = match visitor.visit_element_content()? {
			ControlFlow::Continue(method_content) => method_content,
			ControlFlow::Break(method_content) => return C::finish_method(residual, method_content),
		};
		if let Some(comment) = &method.info.comment {
			method_content.visit_comment(comment)?;
		}

		let args = self.order.sort_args(method.args());
		let vars = self.order.sort_vars(method.vars());
		if self.order.is_method_vars_first() {
			method_content = vars.into_iter().try_fold(method_content, |content, var| self.var(var, content))?;
			method_content = args.into_iter().try_fold(method_content, |content, arg| self.arg(arg, content))?;
		} else {
			method_content = args.into_iter().try_fold(method_content, |content, arg| self.arg(arg, content))?;
			method_content = vars.into_iter().try_fold(method_content, |content, var| self.var(var, content))?;
		}

		C::finish_method(residual, method_content)
	}

	fn arg<M: MethodContentVisitor>(&self, arg: &ArgEntry, method_content: M) -> Result<M> {
		let (residual, mut visitor) = match method_content.visit_arg(arg.position, arg.lv_index, arg.src_name.as_deref())? {
			ControlFlow::Continue(x) => x,
			ControlFlow::Break(method_content) => return Ok(method_content),
		};
		for (namespace, name) in arg.info.dst_names.iter() {
			visitor.visit_dst_name(namespace, name)?;
		}

		let mut arg_content = match visitor.visit_element_content()? {
			ControlFlow::Continue(arg_content) => arg_content,
			ControlFlow::Break(arg_content) => return M::finish_arg(residual, arg_content),
		};
		if let Some(comment) = &arg.info.comment {
			arg_content.visit_comment(comment)?;
		}
		M::finish_arg(residual, arg_content)
	}

	fn var<M: MethodContentVisitor>(&self, var: &VarEntry, method_content: M) -> Result<M> {
		let (residual, mut visitor) = match method_content.visit_var(var.lvt_row_index, var.lv_index, var.start_op_idx, var.end_op_idx, var.src_name.as_deref())? {
			ControlFlow::Continue(x) => x,
			ControlFlow::Break(method_content) => return Ok(method_content),
		};
		for (namespace, name) in var.info.dst_names.iter() {
			visitor.visit_dst_name(namespace, name)?;
		}

		let mut var_content = match visitor.visit_element_content()? {
			ControlFlow::Continue(var_content) => var_content,
			ControlFlow::Break(var_content) => return M::finish_var(residual, var_content),
		};
		if let Some(comment) = &var.info.comment {
			var_content.visit_comment(comment)?;
		}
		M::finish_var(residual, var_content)
	}
}
